//! KiCad-specific S-expression helpers.
//!
//! - [`props`] - "property-like" queries: `(tag "value")`, `(at x y)`, ...

pub mod props;

pub use props::{atom_prop, child_list, first_xy, point_prop, string_prop};
