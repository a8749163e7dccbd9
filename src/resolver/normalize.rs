use std::sync::LazyLock;

use regex::Regex;

use crate::error::{OuiError, Result};

// Three octets, each optionally followed by a single ':' or '-'.
// Unanchored: the first MAC-like run anywhere in the input wins.
static OUI_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:[0-9A-F]{2}[-:]?){3}").expect("OUI pattern is a valid regex")
});

/// Extract the canonical OUI key (`AABBCC`) from arbitrary MAC text.
///
/// The IEEE registry uses uppercase hex, so the input is uppercased before
/// scanning. `aa:bb:cc:dd:ee:ff`, `AA-BB-CC` and `mac=aabbcc01` all yield `AABBCC`.
pub fn normalize_oui(input: &str) -> Result<String> {
    let upper = input.to_uppercase();
    let found = OUI_PATTERN
        .find(&upper)
        .ok_or_else(|| OuiError::InvalidInput {
            input: input.to_string(),
        })?;

    Ok(found
        .as_str()
        .chars()
        .filter(|c| *c != ':' && *c != '-')
        .collect())
}
