//! Named variables and how to compute them.

use chrono::Local;
use log::debug;
use once_cell::unsync::OnceCell;
use pcb_board::TitleBlock;
use std::collections::HashMap;
use std::fmt::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::VarError;

type Resolver = Box<dyn Fn() -> Result<String, VarError>>;

/// Built-in variables and their help text, sorted by name.
pub const BUILTIN_VARIABLES: &[(&str, &str)] = &[
    ("DATE", "Current (today's) date"),
    ("DOC_COMPANY", "Document `Company' set in file"),
    ("DOC_TITLE", "Document `Title' set in file"),
    ("FILENAME", "Board file name"),
    ("REV", "Current SCM revision of project"),
];

/// `--help` epilog listing the built-in variables.
pub fn help_epilog() -> String {
    let width = BUILTIN_VARIABLES
        .iter()
        .map(|(name, _)| name.len())
        .max()
        .unwrap_or_default();
    let mut out = String::from("Variables set by default:\n");
    for (name, description) in BUILTIN_VARIABLES {
        out.push_str(&format!("  - {name:<width$}    = {description}\n"));
    }
    out
}

/// Split a `NAME:VALUE` override on its first colon.
pub fn parse_override(raw: &str) -> Result<(String, String), VarError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.is_empty() => Ok((name.to_string(), value.to_string())),
        _ => Err(VarError::InvalidOverride(raw.to_string())),
    }
}

/// Facts about the board being processed that built-ins draw on.
#[derive(Debug, Clone, Default)]
pub struct BoardContext {
    pub path: PathBuf,
    pub title_block: TitleBlock,
}

/// Maps variable names to values.
///
/// Overrides set with [`VariableRegistry::set`] win over resolvers registered
/// under the same name.
#[derive(Default)]
pub struct VariableRegistry {
    resolvers: HashMap<String, Resolver>,
    overrides: HashMap<String, String>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry with every built-in wired to `context`.
    pub fn with_builtins(context: BoardContext, date_format: &str) -> Self {
        let mut registry = Self::new();

        let date_format = date_format.to_string();
        registry.register("DATE", move || {
            let mut date = String::new();
            write!(date, "{}", Local::now().format(&date_format))
                .map_err(|_| VarError::InvalidDateFormat(date_format.clone()))?;
            Ok(date)
        });

        let company = context.title_block.company.clone().unwrap_or_default();
        registry.register("DOC_COMPANY", move || Ok(company.clone()));

        let title = context.title_block.title.clone().unwrap_or_default();
        registry.register("DOC_TITLE", move || Ok(title.clone()));

        let filename = context
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        registry.register("FILENAME", move || Ok(filename.clone()));

        let dir = board_dir(&context.path);
        let revision = OnceCell::new();
        registry.register("REV", move || {
            revision.get_or_try_init(|| git_describe(&dir)).cloned()
        });

        registry
    }

    pub fn register(
        &mut self,
        name: &str,
        resolve: impl Fn() -> Result<String, VarError> + 'static,
    ) {
        self.resolvers.insert(name.to_string(), Box::new(resolve));
    }

    /// Set or override a variable with a fixed value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        debug!("Setting variable [{name}] => [{value}]");
        self.overrides.insert(name, value);
    }

    pub fn resolve(&self, name: &str) -> Result<String, VarError> {
        if let Some(value) = self.overrides.get(name) {
            return Ok(value.clone());
        }
        match self.resolvers.get(name) {
            Some(resolve) => resolve(),
            None => Err(VarError::UnknownVariable(name.to_string())),
        }
    }
}

fn board_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// `git describe --always --dirty` in `dir`.
fn git_describe(dir: &Path) -> Result<String, VarError> {
    let resolve_error = |reason: String| VarError::Resolve {
        name: "REV".to_string(),
        reason,
    };

    let out = Command::new("git")
        .arg("-C")
        .arg(dir)
        .args(["describe", "--always", "--dirty"])
        .output()
        .map_err(|e| resolve_error(format!("failed to run git: {e}")))?;
    if !out.status.success() {
        let stderr = String::from_utf8_lossy(&out.stderr);
        return Err(resolve_error(format!("git describe failed: {}", stderr.trim())));
    }
    let rev = String::from_utf8_lossy(&out.stdout).trim().to_string();
    debug!("Revision of {}: {rev}", dir.display());
    Ok(rev)
}
