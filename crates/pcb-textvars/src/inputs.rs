//! Resolving command-line paths into board files and output locations.

use ignore::WalkBuilder;
use log::debug;
use pcb_board::BOARD_EXTENSION;
use std::fs;
use std::path::{Path, PathBuf};

use crate::InputError;

fn is_board_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == BOARD_EXTENSION)
}

/// Board files directly inside `dir`, sorted by path. Hidden files are skipped.
fn boards_in_dir(dir: &Path) -> Result<Vec<PathBuf>, InputError> {
    let mut builder = WalkBuilder::new(dir);
    builder.standard_filters(false).hidden(true).max_depth(Some(1));

    let mut boards = Vec::new();
    for result in builder.build() {
        let entry = result.map_err(|source| InputError::ReadDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() && is_board_file(path) {
            boards.push(path.to_path_buf());
        }
    }
    boards.sort();
    Ok(boards)
}

/// Turn file and directory arguments into the list of boards to process.
///
/// Directories contribute their `.kicad_pcb` files (not recursively). Every
/// argument is checked before anything is returned.
pub fn discover_inputs(paths: &[PathBuf]) -> Result<Vec<PathBuf>, InputError> {
    let mut inputs = Vec::new();
    for path in paths {
        if !path.exists() {
            return Err(InputError::NotFound(path.clone()));
        }
        if path.is_dir() {
            let boards = boards_in_dir(path)?;
            if boards.is_empty() {
                return Err(InputError::EmptyDirectory(path.clone()));
            }
            debug!("{} boards in {}", boards.len(), path.display());
            inputs.extend(boards);
        } else if is_board_file(path) {
            inputs.push(path.clone());
        } else {
            return Err(InputError::WrongExtension(path.clone()));
        }
    }
    Ok(inputs)
}

/// Make sure `dir` can receive output files.
///
/// An existing directory is used as is. A missing one is created when its
/// parent exists.
pub fn prepare_output_dir(dir: &Path) -> Result<(), InputError> {
    if dir.is_dir() {
        return Ok(());
    }
    let parent = match dir.parent() {
        Some(parent) if parent.as_os_str().is_empty() => Path::new("."),
        Some(parent) => parent,
        None => return Err(InputError::OutputParentMissing(dir.to_path_buf())),
    };
    if !parent.is_dir() {
        return Err(InputError::OutputParentMissing(dir.to_path_buf()));
    }
    debug!("Creating output directory {}", dir.display());
    fs::create_dir(dir).map_err(|source| InputError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Where the expanded copy of `input` goes: `output_dir/<file name>`.
pub fn output_path(input: &Path, output_dir: &Path) -> PathBuf {
    match input.file_name() {
        Some(name) => output_dir.join(name),
        None => output_dir.to_path_buf(),
    }
}

/// Whether writing `output` would replace `input` itself.
pub fn same_file(input: &Path, output: &Path) -> bool {
    let resolve = |path: &Path| {
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let parent = fs::canonicalize(parent).ok()?;
        Some(parent.join(path.file_name()?))
    };
    match (resolve(input), resolve(output)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}
