//! Split a multi-board KiCad panel into one board file per outline.
//!
//! Closed rectangles are reconstructed from the straight lines on the edge
//! layer ([`detect`]). For every rectangle a copy of the panel is pruned down
//! to the items inside the rectangle's box ([`prune`]) and written out.

pub mod collect;
pub mod detect;
pub mod geometry;
pub mod prune;

use log::{debug, info};
use pcb_board::{Board, BoardError, save_board};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use collect::{EDGE_CUTS_LAYER, collect_edge_cuts};
pub use detect::{detect_rectangles, find_rectangles};
pub use geometry::{BoundingBox, Orientation, Rectangle, RectangleEdges, Segment};
pub use prune::{PruneStats, prune_outside};

/// Default outward growth of each outline before pruning, in internal units
/// (10 µm).
pub const DEFAULT_MARGIN: i64 = 10_000;

/// Default output file name; `{}` is replaced by the 1-based board index.
pub const DEFAULT_NAME_PATTERN: &str = "board-{}.kicad_pcb";

const INDEX_PLACEHOLDER: &str = "{}";

#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("Output name pattern `{0}` must contain `{{}}` for the board index")]
    NamePattern(String),

    #[error("Margin must not be negative, got {0}")]
    NegativeMargin(i64),

    #[error("Output directory {} does not exist", .0.display())]
    MissingOutputDir(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// Internal units added on every side of a detected outline.
    pub margin: i64,
    /// Layer holding the board outlines.
    pub edge_layer: String,
    /// Output file name pattern, see [`DEFAULT_NAME_PATTERN`].
    pub name_pattern: String,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            margin: DEFAULT_MARGIN,
            edge_layer: EDGE_CUTS_LAYER.to_string(),
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
        }
    }
}

impl PanelConfig {
    pub fn validate(&self) -> Result<(), PanelError> {
        if self.margin < 0 {
            return Err(PanelError::NegativeMargin(self.margin));
        }
        if !self.name_pattern.contains(INDEX_PLACEHOLDER) {
            return Err(PanelError::NamePattern(self.name_pattern.clone()));
        }
        Ok(())
    }

    /// File name of the `index`-th board (1-based).
    pub fn output_name(&self, index: usize) -> String {
        self.name_pattern
            .replacen(INDEX_PLACEHOLDER, &index.to_string(), 1)
    }
}

/// Outlines found on a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    /// Distinct straight segments on the edge layer.
    pub unique_edges: usize,
    pub rectangles: Vec<Rectangle>,
}

/// One board written by [`split_panel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedBoard {
    /// 1-based, in detection order.
    pub index: usize,
    pub rectangle: Rectangle,
    pub path: PathBuf,
    pub pruned: PruneStats,
}

pub fn detect_boards(panel: &Board, config: &PanelConfig) -> Detection {
    let segments = collect_edge_cuts(panel, &config.edge_layer);
    let unique_edges = segments.iter().collect::<HashSet<_>>().len();
    let rectangles = detect_rectangles(&segments, config.margin);
    debug!(
        "Identified {} PCB rectangles from {unique_edges} unique {}",
        rectangles.len(),
        config.edge_layer
    );
    Detection {
        unique_edges,
        rectangles,
    }
}

/// A copy of `panel` holding only what lies inside `rect`.
pub fn extract_board(panel: &Board, rect: &Rectangle) -> (Board, PruneStats) {
    let mut board = panel.clone();
    let stats = prune_outside(&mut board, &rect.bounds);
    (board, stats)
}

/// Write one pruned board per detected rectangle into `output_dir`.
///
/// Boards are written as they are produced; a failure leaves the earlier
/// files in place.
pub fn split_panel(
    panel: &Board,
    detection: &Detection,
    output_dir: &Path,
    config: &PanelConfig,
) -> Result<Vec<ExtractedBoard>, PanelError> {
    config.validate()?;
    if !output_dir.is_dir() {
        return Err(PanelError::MissingOutputDir(output_dir.to_path_buf()));
    }

    let mut written = Vec::with_capacity(detection.rectangles.len());
    for (i, rect) in detection.rectangles.iter().enumerate() {
        let index = i + 1;
        debug!("Extracting PCB #{index} at {}", rect.bounds);
        let (board, pruned) = extract_board(panel, rect);
        let path = output_dir.join(config.output_name(index));
        save_board(&path, &board)?;
        info!("Wrote {} ({pruned} removed)", path.display());
        written.push(ExtractedBoard {
            index,
            rectangle: *rect,
            path,
            pruned,
        });
    }
    Ok(written)
}
