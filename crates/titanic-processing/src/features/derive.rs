//! Per-passenger derived fields.

use once_cell::sync::Lazy;
use regex::Regex;

/// "Surname, Title. Given names" -> Title
static TITLE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^.*?, (.*?)\..*$").expect("Invalid regex: title pattern"));

/// Extract the honorific from a passenger name.
///
/// Returns `None` for names that do not follow the `"Surname, Title. ..."`
/// layout, or whose title is empty.
pub fn extract_title(name: &str) -> Option<String> {
    TITLE_PATTERN
        .captures(name)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .filter(|title| !title.is_empty())
        .map(str::to_string)
}

/// Deck letter from a cabin code, or `unknown` when there is no cabin.
pub fn extract_deck(cabin: Option<&str>, unknown: &str) -> String {
    cabin
        .map(str::trim)
        .and_then(|c| c.chars().next())
        .map(|c| c.to_string())
        .unwrap_or_else(|| unknown.to_string())
}

/// Embarkation port with the fixed fill value for missing entries.
pub fn fill_embarked(embarked: Option<&str>, fill: &str) -> String {
    embarked
        .map(str::trim)
        .filter(|e| !e.is_empty())
        .unwrap_or(fill)
        .to_string()
}
