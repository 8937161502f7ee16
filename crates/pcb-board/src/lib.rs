//! In-memory model of a KiCad `.kicad_pcb` file.
//!
//! The board is kept as its parsed S-expression tree. Top-level items are
//! classified on demand ([`ItemKind`]) and handed out as owned
//! [`ItemView`] snapshots; mutation goes through [`ItemId`]s. Nodes the model
//! does not understand are carried through untouched, so a load/save cycle
//! without edits reproduces the file's content.

pub mod item;
pub mod units;

use atomicwrites::{AtomicFile, OverwriteBehavior};
use log::debug;
use pcb_sexpr::kicad::{child_list, string_prop};
use pcb_sexpr::{ParseError, Sexpr, SexprKind, formatter};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

pub use item::{DrawingKind, ItemId, ItemKind, ItemView};
pub use units::{IU_PER_MM, Point};

/// File extension of KiCad board files.
pub const BOARD_EXTENSION: &str = "kicad_pcb";

const ROOT_TAG: &str = "kicad_pcb";

#[derive(Debug, Error)]
pub enum BoardError {
    #[error("Failed to read board file {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write board file {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed board file: {0}")]
    Parse(#[from] ParseError),

    #[error("Not a KiCad board: expected `({ROOT_TAG} ...)`, found `{0}`")]
    NotABoard(String),
}

/// `(title_block ...)` fields used for document metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TitleBlock {
    pub title: Option<String>,
    pub company: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Board {
    /// Root list items; `nodes[0]` is the `kicad_pcb` symbol.
    nodes: Vec<Sexpr>,
    /// Ids of `nodes[1..]`, index-aligned.
    ids: Vec<ItemId>,
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(source: &str) -> Result<Self, Self::Err> {
        let root = pcb_sexpr::parse(source)?;
        if root.tag() != Some(ROOT_TAG) {
            let found = root
                .tag()
                .map(str::to_string)
                .unwrap_or_else(|| root.to_string());
            return Err(BoardError::NotABoard(found));
        }

        let SexprKind::List(nodes) = root.kind else {
            return Err(BoardError::NotABoard(ROOT_TAG.to_string()));
        };
        let ids = (1..nodes.len() as u32).map(ItemId).collect();
        Ok(Self { nodes, ids })
    }
}

impl Board {
    fn children(&self) -> impl Iterator<Item = (ItemId, &Sexpr)> {
        self.ids.iter().copied().zip(self.nodes[1..].iter())
    }

    fn index_of(&self, id: ItemId) -> Option<usize> {
        self.ids.iter().position(|candidate| *candidate == id)
    }

    /// Snapshot of every top-level item, in file order.
    pub fn items(&self) -> Vec<ItemView> {
        self.children()
            .map(|(id, node)| ItemView::from_node(id, node))
            .collect()
    }

    fn items_where(&self, keep: impl Fn(ItemKind) -> bool) -> Vec<ItemView> {
        self.children()
            .filter(|(_, node)| keep(ItemKind::from_tag(node.tag().unwrap_or_default())))
            .map(|(id, node)| ItemView::from_node(id, node))
            .collect()
    }

    pub fn drawings(&self) -> Vec<ItemView> {
        self.items_where(ItemKind::is_drawing)
    }

    pub fn footprints(&self) -> Vec<ItemView> {
        self.items_where(|kind| kind == ItemKind::Footprint)
    }

    pub fn tracks(&self) -> Vec<ItemView> {
        self.items_where(|kind| kind == ItemKind::Track)
    }

    pub fn zones(&self) -> Vec<ItemView> {
        self.items_where(|kind| kind == ItemKind::Zone)
    }

    pub fn texts(&self) -> Vec<ItemView> {
        self.items_where(|kind| kind == ItemKind::Drawing(DrawingKind::Text))
    }

    pub fn zone_count(&self) -> usize {
        self.zones().len()
    }

    /// The `index`-th zone in file order.
    pub fn zone(&self, index: usize) -> Option<ItemView> {
        self.zones().into_iter().nth(index)
    }

    /// Remove an item. Returns `false` if it was already gone.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = self.nodes.remove(index + 1);
        self.ids.remove(index);
        debug!(
            "Removed {} {id} (source bytes {})",
            node.tag().unwrap_or("?"),
            node.span
        );
        true
    }

    /// Remove the `index`-th zone. Zone indices shift down after a removal.
    pub fn remove_zone(&mut self, index: usize) -> bool {
        match self.zone(index) {
            Some(zone) => self.remove(zone.id),
            None => false,
        }
    }

    /// Replace the text of a `gr_text` / `gr_text_box` item.
    pub fn set_text(&mut self, id: ItemId, text: &str) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let node = &mut self.nodes[index + 1];
        if ItemKind::from_tag(node.tag().unwrap_or_default())
            != ItemKind::Drawing(DrawingKind::Text)
        {
            return false;
        }
        match node.as_list_mut().and_then(|items| items.get_mut(1)) {
            Some(slot) if slot.as_str().is_some() => {
                *slot = Sexpr::string(text);
                true
            }
            _ => false,
        }
    }

    pub fn title_block(&self) -> TitleBlock {
        let Some(block) = child_list(&self.nodes, "title_block") else {
            return TitleBlock::default();
        };
        TitleBlock {
            title: string_prop(block, "title"),
            company: string_prop(block, "company"),
        }
    }

    pub fn to_kicad_string(&self) -> String {
        formatter::format_list(&self.nodes)
    }
}

pub fn load_board(path: &Path) -> Result<Board, BoardError> {
    debug!("Loading board {}", path.display());
    let source = std::fs::read_to_string(path).map_err(|source| BoardError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    source.parse()
}

/// Write a board, replacing any existing file atomically.
pub fn save_board(path: &Path, board: &Board) -> Result<(), BoardError> {
    debug!("Saving board {}", path.display());
    let content = board.to_kicad_string();
    AtomicFile::new(path, OverwriteBehavior::AllowOverwrite)
        .write(|f| {
            f.write_all(content.as_bytes())?;
            f.flush()
        })
        .map_err(|err| BoardError::Write {
            path: path.to_path_buf(),
            source: match err {
                atomicwrites::Error::Internal(e) | atomicwrites::Error::User(e) => e,
            },
        })
}
