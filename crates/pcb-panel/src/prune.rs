use log::debug;
use pcb_board::{Board, ItemKind, ItemView, Point};
use std::fmt;

use crate::geometry::BoundingBox;

/// Items removed by one [`prune_outside`] call, per kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    pub drawings: usize,
    pub footprints: usize,
    pub tracks: usize,
    pub zones: usize,
}

impl PruneStats {
    pub fn total(&self) -> usize {
        self.drawings + self.footprints + self.tracks + self.zones
    }
}

impl fmt::Display for PruneStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} drawings, {} footprints, {} tracks, {} zones",
            self.drawings, self.footprints, self.tracks, self.zones
        )
    }
}

/// The point that decides whether an item stays.
fn reference_point(item: &ItemView) -> Option<Point> {
    match item.kind {
        ItemKind::Drawing(kind) if kind.is_segment_like() => item.start,
        ItemKind::Drawing(_) | ItemKind::Footprint | ItemKind::Zone => item.position,
        ItemKind::Track => item.start,
        ItemKind::Other => None,
    }
}

fn is_outside(item: &ItemView, bounds: &BoundingBox) -> bool {
    reference_point(item).is_some_and(|p| !bounds.contains(p))
}

fn remove_outside(board: &mut Board, items: Vec<ItemView>, bounds: &BoundingBox) -> usize {
    items
        .iter()
        .filter(|item| is_outside(item, bounds))
        .filter(|item| board.remove(item.id))
        .count()
}

/// Remove zones outside `bounds` one at a time.
///
/// Each pass walks the zone list from the end and removes the first zone
/// found outside; the scan then starts over on the shrunk list. Stops once a
/// full pass removes nothing.
fn remove_zones_outside(board: &mut Board, bounds: &BoundingBox) -> usize {
    let mut removed = 0;
    loop {
        let victim = (0..board.zone_count())
            .rev()
            .find(|&index| board.zone(index).is_some_and(|zone| is_outside(&zone, bounds)));
        match victim {
            Some(index) if board.remove_zone(index) => removed += 1,
            _ => break,
        }
    }
    removed
}

/// Strip everything whose reference point lies outside `bounds`.
///
/// Line-like drawings and tracks are judged by their start point; text,
/// annotations, footprints and zones by their position. Items without a
/// usable point are kept. Running this twice with the same box removes
/// nothing the second time.
pub fn prune_outside(board: &mut Board, bounds: &BoundingBox) -> PruneStats {
    let drawings = board.drawings();
    let drawings = remove_outside(board, drawings, bounds);
    let footprints = board.footprints();
    let footprints = remove_outside(board, footprints, bounds);
    let tracks = board.tracks();
    let tracks = remove_outside(board, tracks, bounds);
    let zones = remove_zones_outside(board, bounds);

    let stats = PruneStats {
        drawings,
        footprints,
        tracks,
        zones,
    };
    debug!("Pruned outside {bounds}: {stats}");
    stats
}
