use log::debug;
use once_cell::sync::Lazy;
use pcb_board::{Board, ItemId};
use std::collections::{HashMap, HashSet};
use regex::Regex;

use crate::{VarError, VariableRegistry};

/// One `${NAME}` with everything before and after it. The leading `.*` is
/// greedy, so the last placeholder in a text is the one captured.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^(.*)\$\{([A-Za-z0-9_-]+)\}(.*)$").expect("placeholder pattern is valid")
});

/// Passes after which a still-changing board is treated as a cycle.
pub const MAX_PASSES: usize = 1000;

struct Expansion {
    name: String,
    text: String,
}

fn expand_last(text: &str, registry: &VariableRegistry) -> Result<Option<Expansion>, VarError> {
    let Some(caps) = PLACEHOLDER.captures(text) else {
        return Ok(None);
    };
    let name = &caps[2];
    let value = registry.resolve(name)?;
    debug!("Translating ${{{name}}} -> `{value}'");
    Ok(Some(Expansion {
        name: name.to_string(),
        text: format!("{}{value}{}", &caps[1], &caps[3]),
    }))
}

/// Resolve one placeholder in `text`. `None` when there is nothing to expand.
pub fn expand_once(text: &str, registry: &VariableRegistry) -> Result<Option<String>, VarError> {
    Ok(expand_last(text, registry)?.map(|expansion| expansion.text))
}

/// Expand every `${NAME}` in the board's text items.
///
/// Each pass rewrites at most one placeholder per text item; passes repeat
/// until one changes nothing. Values are substituted literally, so a value
/// that itself contains `${...}` gets expanded on a later pass. A text that
/// comes back to a value it already held, or is still changing after
/// [`MAX_PASSES`], fails with [`VarError::Cycle`]. Returns the number of
/// substitutions made.
pub fn expand_variables(board: &mut Board, registry: &VariableRegistry) -> Result<usize, VarError> {
    let mut history: HashMap<ItemId, HashSet<String>> = HashMap::new();
    let mut total = 0;
    for _ in 0..MAX_PASSES {
        let mut changed = false;
        for item in board.texts() {
            let Some(text) = item.text else {
                continue;
            };
            debug!("Found text `{text}'");
            let Some(expansion) = expand_last(&text, registry)? else {
                continue;
            };
            let seen = history.entry(item.id).or_default();
            seen.insert(text);
            if !seen.insert(expansion.text.clone()) {
                return Err(VarError::Cycle(expansion.name));
            }
            if !board.set_text(item.id, &expansion.text) {
                return Err(VarError::TextUpdate(item.id));
            }
            changed = true;
            total += 1;
        }
        if !changed {
            return Ok(total);
        }
    }
    let name = board
        .texts()
        .into_iter()
        .filter_map(|item| item.text)
        .find_map(|text| PLACEHOLDER.captures(&text).map(|caps| caps[2].to_string()))
        .unwrap_or_default();
    Err(VarError::Cycle(name))
}
