//! `${VAR}` expansion in KiCad board text.
//!
//! A [`VariableRegistry`] maps names to values (built-ins plus user
//! overrides); [`expand_variables`] rewrites the text items of one board;
//! [`expand_files`] runs the whole batch from input discovery to writing
//! the expanded copies.

pub mod inputs;
pub mod registry;
pub mod scanner;

use chrono::format::{Item, StrftimeItems};
use log::{debug, info};
use pcb_board::{BoardError, ItemId, load_board, save_board};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use inputs::{discover_inputs, output_path, prepare_output_dir, same_file};
pub use registry::{
    BUILTIN_VARIABLES, BoardContext, VariableRegistry, help_epilog, parse_override,
};
pub use scanner::{expand_once, expand_variables};

pub const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Error)]
pub enum VarError {
    #[error("Unknown variable `{0}`")]
    UnknownVariable(String),

    #[error("Could not resolve variable `{name}`: {reason}")]
    Resolve { name: String, reason: String },

    #[error("Invalid variable `{0}`, expected NAME:VALUE")]
    InvalidOverride(String),

    #[error("Invalid date format `{0}`")]
    InvalidDateFormat(String),

    #[error("Variable `{0}` never finishes expanding")]
    Cycle(String),

    #[error("Could not update text item {0}")]
    TextUpdate(ItemId),
}

#[derive(Debug, Error)]
pub enum InputError {
    #[error("Provided file/dir `{}` doesn't exist", .0.display())]
    NotFound(PathBuf),

    #[error("Provided directory `{}` doesn't contain any .kicad_pcb files", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("Provided file `{}` doesn't have .kicad_pcb extension", .0.display())]
    WrongExtension(PathBuf),

    #[error("Neither output directory `{}` nor its parent exist", .0.display())]
    OutputParentMissing(PathBuf),

    #[error("Failed to read directory {}", path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: ignore::Error,
    },

    #[error("Failed to create output directory {}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum ExpandError {
    #[error(transparent)]
    Input(#[from] InputError),

    #[error("Will not overwrite input file `{}` with output of same path", .0.display())]
    OutputClash(PathBuf),

    #[error("Failed to expand variables in {}", path.display())]
    Variable {
        path: PathBuf,
        #[source]
        source: VarError,
    },

    #[error(transparent)]
    Var(#[from] VarError),

    #[error(transparent)]
    Board(#[from] BoardError),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandOptions {
    pub output_dir: PathBuf,
    /// Allow the output to replace its input.
    pub clobber: bool,
    /// strftime pattern for `${DATE}`.
    pub date_format: String,
    /// `NAME`/`VALUE` pairs that win over built-ins, applied in order.
    pub overrides: Vec<(String, String)>,
    /// Accepted for compatibility; revisions are always `git describe` output.
    pub rev_format: Option<String>,
}

impl Default for ExpandOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            clobber: false,
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            overrides: Vec::new(),
            rev_format: None,
        }
    }
}

/// Reject strftime patterns chrono cannot render.
pub fn validate_date_format(format: &str) -> Result<(), VarError> {
    if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
        return Err(VarError::InvalidDateFormat(format.to_string()));
    }
    Ok(())
}

/// Result of expanding one board file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandedFile {
    pub input: PathBuf,
    pub output: PathBuf,
    pub substitutions: usize,
}

fn expand_file(
    input: &Path,
    output: &Path,
    options: &ExpandOptions,
) -> Result<ExpandedFile, ExpandError> {
    let mut board = load_board(input)?;

    let context = BoardContext {
        path: input.to_path_buf(),
        title_block: board.title_block(),
    };
    let mut registry = VariableRegistry::with_builtins(context, &options.date_format);
    for (name, value) in &options.overrides {
        registry.set(name.as_str(), value.as_str());
    }

    let substitutions =
        expand_variables(&mut board, &registry).map_err(|source| ExpandError::Variable {
            path: input.to_path_buf(),
            source,
        })?;

    debug!("Will write output to {}", output.display());
    save_board(output, &board)?;
    Ok(ExpandedFile {
        input: input.to_path_buf(),
        output: output.to_path_buf(),
        substitutions,
    })
}

/// Expand every board named by `paths` into `options.output_dir`.
///
/// All arguments are validated before the first board is touched. Boards
/// are then processed in order and the run stops at the first failure,
/// leaving earlier outputs in place.
pub fn expand_files(
    paths: &[PathBuf],
    options: &ExpandOptions,
) -> Result<Vec<ExpandedFile>, ExpandError> {
    validate_date_format(&options.date_format)?;
    let inputs = discover_inputs(paths)?;
    prepare_output_dir(&options.output_dir)?;
    if let Some(format) = &options.rev_format {
        debug!("Ignoring revision format `{format}`");
    }

    let mut expanded = Vec::with_capacity(inputs.len());
    for input in &inputs {
        info!("Processing `{}'", input.display());
        let output = output_path(input, &options.output_dir);
        if !options.clobber && same_file(input, &output) {
            return Err(ExpandError::OutputClash(input.clone()));
        }
        expanded.push(expand_file(input, &output, options)?);
    }
    Ok(expanded)
}
