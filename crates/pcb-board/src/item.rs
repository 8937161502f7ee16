//! Classification of top-level board items.

use pcb_sexpr::Sexpr;
use pcb_sexpr::kicad::{atom_prop, child_list, first_xy, point_prop};
use std::fmt;

use crate::units::Point;

/// Identity of a top-level board item. Ids are assigned once at load time
/// and never reused, so they stay valid while other items are removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub(crate) u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawingKind {
    /// `gr_line`
    Line,
    /// Other graphic shapes with a start/centre point: arcs, rects, circles,
    /// curves, polygons.
    Shape,
    /// Board text: `gr_text`, `gr_text_box`
    Text,
    /// Positioned annotations: dimensions and alignment targets
    Annotation,
}

impl DrawingKind {
    /// Segment-like drawings are located by their start point, everything
    /// else by its position.
    pub fn is_segment_like(self) -> bool {
        matches!(self, DrawingKind::Line | DrawingKind::Shape)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Drawing(DrawingKind),
    /// `footprint`, or `module` in pre-6 files
    Footprint,
    /// `segment`, `arc` and `via`
    Track,
    /// `zone`
    Zone,
    /// Header and bookkeeping nodes: `version`, `layers`, `net`, `setup`, ...
    Other,
}

impl ItemKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "gr_line" => ItemKind::Drawing(DrawingKind::Line),
            "gr_arc" | "gr_rect" | "gr_circle" | "gr_curve" | "gr_poly" | "gr_bbox" => {
                ItemKind::Drawing(DrawingKind::Shape)
            }
            "gr_text" | "gr_text_box" => ItemKind::Drawing(DrawingKind::Text),
            "dimension" | "target" => ItemKind::Drawing(DrawingKind::Annotation),
            "footprint" | "module" => ItemKind::Footprint,
            "segment" | "arc" | "via" => ItemKind::Track,
            "zone" => ItemKind::Zone,
            _ => ItemKind::Other,
        }
    }

    pub fn is_drawing(self) -> bool {
        matches!(self, ItemKind::Drawing(_))
    }
}

/// Owned snapshot of one top-level item.
///
/// Snapshots are detached from the board: callers can filter them freely
/// and then remove items by [`ItemId`].
#[derive(Debug, Clone, PartialEq)]
pub struct ItemView {
    pub id: ItemId,
    pub kind: ItemKind,
    pub tag: String,
    pub layer: Option<String>,
    /// `(start ..)`, falling back to `(center ..)`, `(at ..)` and the first
    /// polygon vertex, in that order. A via's start is its position.
    pub start: Option<Point>,
    pub end: Option<Point>,
    /// `(at ..)`, falling back to the first polygon vertex, the `(at ..)` of a
    /// nested `gr_text` (KiCad 5 dimensions) and then `start`.
    pub position: Option<Point>,
    /// The text of `gr_text` / `gr_text_box` items.
    pub text: Option<String>,
}

impl ItemView {
    pub(crate) fn from_node(id: ItemId, node: &Sexpr) -> Self {
        let items = node.as_list().unwrap_or_default();
        let tag = node.tag().unwrap_or_default().to_string();
        let kind = ItemKind::from_tag(&tag);

        let point = |name: &str| point_prop(items, name).map(|(x, y)| Point::from_mm(x, y));
        let first_vertex = || first_xy(items).map(|(x, y)| Point::from_mm(x, y));

        let start = point("start")
            .or_else(|| point("center"))
            .or_else(|| point("at"))
            .or_else(first_vertex);
        let nested_text = || {
            child_list(items, "gr_text")
                .and_then(|text| point_prop(text, "at"))
                .map(|(x, y)| Point::from_mm(x, y))
        };
        let position = point("at")
            .or_else(first_vertex)
            .or_else(nested_text)
            .or(start);

        let text = match kind {
            ItemKind::Drawing(DrawingKind::Text) => {
                items.get(1).and_then(Sexpr::as_str).map(str::to_string)
            }
            _ => None,
        };

        Self {
            id,
            kind,
            layer: atom_prop(items, "layer").map(str::to_string),
            start,
            end: point("end"),
            position,
            text,
            tag,
        }
    }

    pub fn on_layer(&self, layer: &str) -> bool {
        self.layer.as_deref() == Some(layer)
    }
}
