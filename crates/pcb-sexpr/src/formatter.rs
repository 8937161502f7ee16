//! Writing S-expression trees back out in the layout KiCad uses for
//! `.kicad_pcb` files.
//!
//! - lists without nested lists stay on one line: `(start 10 20)`
//! - a list with nested lists puts its leading atoms on the opening line and
//!   every following child on its own line, indented with one tab per level
//! - runs of `(xy ..)` points share a line until it gets too long
//! - the closing paren of a multi-line list sits on its own line

use crate::{Sexpr, SexprKind};

const INDENT_CHAR: char = '\t';
const XY_COLUMN_LIMIT: usize = 99;

/// Format a tree; the returned string ends with a newline.
pub fn format_tree(sexpr: &Sexpr) -> String {
    let mut out = String::new();
    write_node(sexpr, 0, &mut out);
    out.push('\n');
    out
}

/// Format a list given as its items (head symbol first), as if it were a
/// parsed list node. Lets callers that own the children as a `Vec` avoid
/// rebuilding a tree just to print it.
pub fn format_list(items: &[Sexpr]) -> String {
    let mut out = String::new();
    if items.iter().any(Sexpr::is_list) {
        write_block(items, 0, &mut out);
    } else {
        write_inline(&Sexpr::list(items.to_vec()), &mut out);
    }
    out.push('\n');
    out
}

fn write_node(node: &Sexpr, depth: usize, out: &mut String) {
    match &node.kind {
        SexprKind::List(items) if items.iter().any(Sexpr::is_list) => {
            write_block(items, depth, out)
        }
        _ => write_inline(node, out),
    }
}

fn write_block(items: &[Sexpr], depth: usize, out: &mut String) {
    out.push('(');

    let head_len = items.iter().take_while(|item| !item.is_list()).count();
    for (idx, item) in items[..head_len].iter().enumerate() {
        if idx > 0 {
            out.push(' ');
        }
        write_inline(item, out);
    }

    let mut prev_was_xy = false;
    for item in &items[head_len..] {
        let is_xy = item.tag() == Some("xy");
        if is_xy && prev_was_xy && current_column(out) < XY_COLUMN_LIMIT {
            out.push(' ');
        } else {
            newline(depth + 1, out);
        }
        write_node(item, depth + 1, out);
        prev_was_xy = is_xy;
    }

    newline(depth, out);
    out.push(')');
}

fn write_inline(node: &Sexpr, out: &mut String) {
    match &node.kind {
        SexprKind::Symbol(s) => out.push_str(s),
        SexprKind::String(s) => out.push_str(&quote_string(s)),
        SexprKind::Int(n) => match node.raw_atom.as_deref() {
            Some(raw) => out.push_str(raw),
            None => out.push_str(&n.to_string()),
        },
        SexprKind::F64(f) => match node.raw_atom.as_deref() {
            Some(raw) => out.push_str(raw),
            None => out.push_str(&trim_float(f.to_string())),
        },
        SexprKind::List(items) => {
            out.push('(');
            for (idx, item) in items.iter().enumerate() {
                if idx > 0 {
                    out.push(' ');
                }
                write_inline(item, out);
            }
            out.push(')');
        }
    }
}

fn newline(depth: usize, out: &mut String) {
    out.push('\n');
    out.extend(std::iter::repeat_n(INDENT_CHAR, depth));
}

fn current_column(out: &str) -> usize {
    match out.rfind('\n') {
        Some(pos) => out.len() - pos - 1,
        None => out.len(),
    }
}

/// Quote a string value, escaping special characters.
pub fn quote_string(value: &str) -> String {
    let mut quoted = String::with_capacity(value.len() + 2);
    quoted.push('"');
    for ch in value.chars() {
        match ch {
            '"' => quoted.push_str("\\\""),
            '\\' => quoted.push_str("\\\\"),
            '\n' => quoted.push_str("\\n"),
            '\r' => quoted.push_str("\\r"),
            '\t' => quoted.push_str("\\t"),
            _ => quoted.push(ch),
        }
    }
    quoted.push('"');
    quoted
}

fn trim_float(s: String) -> String {
    if !s.contains('.') {
        return s;
    }
    let trimmed = s.trim_end_matches('0').trim_end_matches('.');
    if trimmed.is_empty() || trimmed == "-" {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}
