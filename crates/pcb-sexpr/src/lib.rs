//! A small S-expression reader/writer for KiCad board files.
//!
//! Atoms keep enough of their source form to be written back unchanged:
//! numeric atoms remember the exact lexeme they were parsed from, so a board
//! that is loaded, pruned and saved again only differs in the nodes that were
//! actually touched.
//!
//! - [`parse`] - read a single S-expression (the whole `.kicad_pcb` file)
//! - [`formatter::format_tree`] - write a tree back in KiCad's layout
//! - [`kicad`] - property-style query helpers shared by the board model

pub mod formatter;
pub mod kicad;

use std::fmt;
use thiserror::Error;

/// Find a direct child list `(name ...)` within a list of [`Sexpr`] nodes.
pub fn find_child_list<'a>(items: &'a [Sexpr], name: &str) -> Option<&'a [Sexpr]> {
    items
        .iter()
        .filter_map(Sexpr::as_list)
        .find(|list| list.first().and_then(Sexpr::as_sym) == Some(name))
}

/// Coerce a number atom into f64.
///
/// KiCad writes whole numbers without a decimal point, so coordinates show up
/// as both ints and floats.
pub fn number_as_f64(node: &Sexpr) -> Option<f64> {
    node.as_float().or_else(|| node.as_int().map(|v| v as f64))
}

/// Byte range of a node within the parsed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Span used for nodes built in memory rather than parsed.
    pub fn synthetic() -> Self {
        Self::default()
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SexprKind {
    /// Unquoted identifier, e.g. `gr_line` or `yes`
    Symbol(String),
    /// Quoted text with escapes already decoded
    String(String),
    Int(i64),
    F64(f64),
    List(Vec<Sexpr>),
}

#[derive(Debug, Clone)]
pub struct Sexpr {
    pub kind: SexprKind,
    pub span: Span,
    /// Original lexeme of a parsed numeric atom.
    pub raw_atom: Option<String>,
}

impl PartialEq for Sexpr {
    fn eq(&self, other: &Self) -> bool {
        // Source position and lexeme are not part of a node's value.
        self.kind == other.kind
    }
}

impl Sexpr {
    pub fn with_span(kind: SexprKind, span: Span) -> Self {
        Self {
            kind,
            span,
            raw_atom: None,
        }
    }

    fn synthetic(kind: SexprKind) -> Self {
        Self::with_span(kind, Span::synthetic())
    }

    pub fn symbol(s: impl Into<String>) -> Self {
        Self::synthetic(SexprKind::Symbol(s.into()))
    }

    pub fn string(s: impl Into<String>) -> Self {
        Self::synthetic(SexprKind::String(s.into()))
    }

    pub fn int(n: i64) -> Self {
        Self::synthetic(SexprKind::Int(n))
    }

    pub fn float(f: f64) -> Self {
        Self::synthetic(SexprKind::F64(f))
    }

    pub fn list(items: Vec<Sexpr>) -> Self {
        Self::synthetic(SexprKind::List(items))
    }

    pub fn is_list(&self) -> bool {
        matches!(self.kind, SexprKind::List(_))
    }

    /// Symbol or string content.
    ///
    /// Older KiCad versions write layer names unquoted, newer ones quote them,
    /// so callers that only care about the text use this.
    pub fn as_atom(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) | SexprKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sym(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::Symbol(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match &self.kind {
            SexprKind::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match &self.kind {
            SexprKind::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match &self.kind {
            SexprKind::F64(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Sexpr]> {
        match &self.kind {
            SexprKind::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_list_mut(&mut self) -> Option<&mut Vec<Sexpr>> {
        match &mut self.kind {
            SexprKind::List(items) => Some(items),
            _ => None,
        }
    }

    /// Head symbol of a list node: `gr_line` for `(gr_line ...)`.
    pub fn tag(&self) -> Option<&str> {
        self.as_list()?.first()?.as_sym()
    }

    /// Find a child list with the given head symbol.
    pub fn find_list(&self, name: &str) -> Option<&[Sexpr]> {
        find_child_list(self.as_list()?, name)
    }
}

impl fmt::Display for Sexpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let formatted = formatter::format_tree(self);
        write!(f, "{}", formatted.trim_end_matches('\n'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("unexpected ')' at byte {0}")]
    UnexpectedClose(usize),
    #[error("list opened at byte {0} is never closed")]
    UnclosedList(usize),
    #[error("string starting at byte {0} is never terminated")]
    UnterminatedString(usize),
    #[error("trailing content at byte {0}")]
    TrailingContent(usize),
}

/// Cursor over the input bytes. All delimiters are ASCII, so slicing the
/// input at delimiter positions always lands on char boundaries.
pub struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    pub fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    /// Parse exactly one expression; anything but whitespace or comments
    /// after it is an error.
    pub fn parse_document(&mut self) -> Result<Sexpr, ParseError> {
        let node = self.parse_node()?;
        self.skip_trivia();
        if self.pos < self.input.len() {
            return Err(ParseError::TrailingContent(self.pos));
        }
        Ok(node)
    }

    fn parse_node(&mut self) -> Result<Sexpr, ParseError> {
        self.skip_trivia();
        match self.peek() {
            None => Err(ParseError::UnexpectedEof),
            Some(b'(') => self.parse_list(),
            Some(b')') => Err(ParseError::UnexpectedClose(self.pos)),
            Some(b'"') => self.parse_string(),
            Some(_) => Ok(self.parse_bare_atom()),
        }
    }

    fn parse_list(&mut self) -> Result<Sexpr, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut items = Vec::new();

        loop {
            self.skip_trivia();
            match self.peek() {
                None => return Err(ParseError::UnclosedList(start)),
                Some(b')') => {
                    self.pos += 1;
                    break;
                }
                Some(_) => items.push(self.parse_node()?),
            }
        }

        if items.len() >= 10_000 {
            log::trace!("Parsed list of {} items at byte {start}", items.len());
        }

        Ok(Sexpr::with_span(
            SexprKind::List(items),
            Span::new(start, self.pos),
        ))
    }

    fn parse_string(&mut self) -> Result<Sexpr, ParseError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();
        let mut run_start = self.pos;

        loop {
            match self.peek() {
                None => return Err(ParseError::UnterminatedString(start)),
                Some(b'"') => {
                    value.push_str(&self.input[run_start..self.pos]);
                    self.pos += 1;
                    break;
                }
                Some(b'\\') => {
                    value.push_str(&self.input[run_start..self.pos]);
                    self.pos += 1;
                    let Some(escaped) = self.input[self.pos..].chars().next() else {
                        return Err(ParseError::UnterminatedString(start));
                    };
                    value.push(match escaped {
                        'n' => '\n',
                        'r' => '\r',
                        't' => '\t',
                        other => other,
                    });
                    self.pos += escaped.len_utf8();
                    run_start = self.pos;
                }
                Some(_) => self.pos += 1,
            }
        }

        Ok(Sexpr::with_span(
            SexprKind::String(value),
            Span::new(start, self.pos),
        ))
    }

    fn parse_bare_atom(&mut self) -> Sexpr {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() || b == b'(' || b == b')' || b == b'"' {
                break;
            }
            self.pos += 1;
        }

        let lexeme = &self.input[start..self.pos];
        let span = Span::new(start, self.pos);
        let kind = if let Ok(n) = lexeme.parse::<i64>() {
            SexprKind::Int(n)
        } else if let Some(f) = parse_float(lexeme) {
            SexprKind::F64(f)
        } else {
            return Sexpr::with_span(SexprKind::Symbol(lexeme.to_string()), span);
        };

        Sexpr {
            kind,
            span,
            raw_atom: Some(lexeme.to_string()),
        }
    }

    fn skip_trivia(&mut self) {
        while let Some(b) = self.peek() {
            if b.is_ascii_whitespace() {
                self.pos += 1;
            } else if b == b';' {
                // Comment runs to end of line
                while let Some(b) = self.peek() {
                    self.pos += 1;
                    if b == b'\n' {
                        break;
                    }
                }
            } else {
                break;
            }
        }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.pos).copied()
    }
}

/// Rust's float parser also accepts `inf`, `nan` and friends, which KiCad
/// uses as plain symbols (e.g. net names). Only digit-led lexemes count.
fn parse_float(lexeme: &str) -> Option<f64> {
    let digits = lexeme.trim_start_matches(['-', '+']);
    if !digits.starts_with(|c: char| c.is_ascii_digit() || c == '.') {
        return None;
    }
    lexeme.parse::<f64>().ok()
}

/// Parse a complete document holding a single S-expression.
pub fn parse(input: &str) -> Result<Sexpr, ParseError> {
    log::trace!("Parsing S-expression from {} bytes of input", input.len());
    let result = Parser::new(input).parse_document();
    if let Err(e) = &result {
        log::trace!("Failed to parse S-expression: {e}");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_atoms() {
        assert_eq!(
            parse("gr_line").unwrap().kind,
            SexprKind::Symbol("gr_line".to_string())
        );
        assert_eq!(parse("42").unwrap().kind, SexprKind::Int(42));
        assert_eq!(parse("-3.5").unwrap().kind, SexprKind::F64(-3.5));
        assert_eq!(
            parse("Edge.Cuts").unwrap().kind,
            SexprKind::Symbol("Edge.Cuts".to_string())
        );
    }

    #[test]
    fn float_like_symbols_stay_symbols() {
        assert_eq!(
            parse("inf").unwrap().kind,
            SexprKind::Symbol("inf".to_string())
        );
        assert_eq!(
            parse("NaN").unwrap().kind,
            SexprKind::Symbol("NaN".to_string())
        );
    }

    #[test]
    fn decodes_string_escapes() {
        assert_eq!(
            parse(r#""rev \"A\"\nline two""#).unwrap().kind,
            SexprKind::String("rev \"A\"\nline two".to_string())
        );
        assert_eq!(
            parse(r#""C:\\boards""#).unwrap().kind,
            SexprKind::String("C:\\boards".to_string())
        );
    }

    #[test]
    fn keeps_numeric_lexemes() {
        let node = parse("(start 100.000000 50)").unwrap();
        let items = node.as_list().unwrap();
        assert_eq!(items[1].raw_atom.as_deref(), Some("100.000000"));
        assert_eq!(items[2].raw_atom.as_deref(), Some("50"));
        assert_eq!(items[0].raw_atom, None);
    }

    #[test]
    fn nested_lists_and_lookup() {
        let board = parse(
            r#"(kicad_pcb (version 20221018)
                 (gr_line (start 0 0) (end 10 0) (layer "Edge.Cuts")))"#,
        )
        .unwrap();
        assert_eq!(board.tag(), Some("kicad_pcb"));

        let line = &board.as_list().unwrap()[2];
        assert_eq!(line.tag(), Some("gr_line"));
        let end = line.find_list("end").unwrap();
        assert_eq!(number_as_f64(&end[1]), Some(10.0));
        assert_eq!(line.find_list("layer").unwrap()[1].as_atom(), Some("Edge.Cuts"));
        assert!(line.find_list("width").is_none());
    }

    #[test]
    fn skips_comments() {
        let node = parse("; header\n(a ; inline\n b)").unwrap();
        assert_eq!(node.as_list().unwrap().len(), 2);
    }

    #[test]
    fn reports_errors() {
        assert_eq!(parse(""), Err(ParseError::UnexpectedEof));
        assert_eq!(parse("(a (b)"), Err(ParseError::UnclosedList(0)));
        assert_eq!(parse("(a \"oops)"), Err(ParseError::UnterminatedString(3)));
        assert_eq!(parse("(a) b"), Err(ParseError::TrailingContent(4)));
        assert_eq!(parse(")"), Err(ParseError::UnexpectedClose(0)));
    }

    #[test]
    fn tracks_spans_with_multibyte_text() {
        let input = r#"(gr_text "Ω ±5%" (at 1 2))"#;
        let node = parse(input).unwrap();
        assert_eq!(node.span, Span::new(0, input.len()));

        let items = node.as_list().unwrap();
        assert_eq!(&input[items[1].span.start..items[1].span.end], "\"Ω ±5%\"");
        assert_eq!(items[1].as_str(), Some("Ω ±5%"));
        assert_eq!(&input[items[2].span.start..items[2].span.end], "(at 1 2)");
    }
}
