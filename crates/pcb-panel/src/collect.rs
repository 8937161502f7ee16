use log::debug;
use pcb_board::{Board, DrawingKind, ItemKind};

use crate::geometry::Segment;

/// Layer holding board outlines.
pub const EDGE_CUTS_LAYER: &str = "Edge.Cuts";

/// Every `gr_line` on `layer`, as a canonical [`Segment`].
///
/// Arcs, circles, polygons and text on the same layer are skipped: only
/// straight lines can close a rectangle.
pub fn collect_edge_cuts(board: &Board, layer: &str) -> Vec<Segment> {
    board
        .drawings()
        .into_iter()
        .filter(|item| item.kind == ItemKind::Drawing(DrawingKind::Line) && item.on_layer(layer))
        .filter_map(|item| match (item.start, item.end) {
            (Some(start), Some(end)) => Some(Segment::new(start, end)),
            _ => {
                debug!("Skipping {} {} without start/end", item.tag, item.id);
                None
            }
        })
        .collect()
}
