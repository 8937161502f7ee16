//! Common KiCad-ish S-expression query helpers.
//!
//! KiCad formats are full of small list nodes that behave like key/value
//! properties: `(layer "Edge.Cuts")`, `(start 10 20)`, `(title "Panel")`.

use crate::{Sexpr, find_child_list, number_as_f64};

/// Find a direct child list `(tag ...)` within `list`.
pub fn child_list<'a>(list: &'a [Sexpr], tag: &str) -> Option<&'a [Sexpr]> {
    find_child_list(list, tag)
}

/// Find a string property `(tag "VALUE")` within `list`.
pub fn string_prop(list: &[Sexpr], tag: &str) -> Option<String> {
    child_list(list, tag)?
        .get(1)?
        .as_str()
        .map(|s| s.to_string())
}

/// Find a property whose value may be quoted or bare: `(layer Edge.Cuts)`
/// in older files, `(layer "Edge.Cuts")` in newer ones.
pub fn atom_prop<'a>(list: &'a [Sexpr], tag: &str) -> Option<&'a str> {
    child_list(list, tag)?.get(1)?.as_atom()
}

/// Find a coordinate property `(tag X Y ...)` within `list`.
pub fn point_prop(list: &[Sexpr], tag: &str) -> Option<(f64, f64)> {
    let items = child_list(list, tag)?;
    Some((number_as_f64(items.get(1)?)?, number_as_f64(items.get(2)?)?))
}

/// First `(xy X Y)` vertex of a `(polygon (pts ...))` or `(pts ...)` child.
pub fn first_xy(list: &[Sexpr]) -> Option<(f64, f64)> {
    let pts = match child_list(list, "polygon") {
        Some(polygon) => child_list(polygon, "pts")?,
        None => child_list(list, "pts")?,
    };
    point_prop(pts, "xy")
}
