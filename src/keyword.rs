//! Keyword normalization and parsing.
//!
//! Every keyword in the system passes through [`normalize`] before it is
//! stored or matched: trimmed, Unicode lower-cased, empty rejected. Matching
//! lower-cases the feed side only, so normalized storage is what makes the
//! substring test case-insensitive.

/// Normalizes a single raw keyword.
///
/// Returns `None` when the trimmed input is empty.
///
/// # Examples
///
/// ```
/// use ransomwatch::keyword::normalize;
///
/// assert_eq!(normalize("  Acme Corp "), Some("acme corp".to_string()));
/// assert_eq!(normalize("   "), None);
/// ```
#[must_use]
pub fn normalize(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

/// Parses a comma-separated keyword list as typed by an operator.
///
/// Blank segments are skipped; duplicates survive here and are collapsed
/// by [`merge`].
#[must_use]
pub fn parse_inline(text: &str) -> Vec<String> {
    text.split(',').filter_map(normalize).collect()
}

/// Parses the first column of a header-less keyword table.
///
/// One value per line, remaining columns ignored, blank cells skipped.
/// A double-quoted first cell may contain commas.
#[must_use]
pub fn parse_table(contents: &str) -> Vec<String> {
    contents
        .lines()
        .filter_map(|line| normalize(first_cell(line)))
        .collect()
}

fn first_cell(line: &str) -> &str {
    let trimmed = line.trim_start();
    if let Some(rest) = trimmed.strip_prefix('"') {
        if let Some(end) = rest.find('"') {
            return &rest[..end];
        }
    }
    trimmed.split(',').next().unwrap_or("")
}

/// Merges raw additions into an existing keyword set.
///
/// Each addition is normalized; the result is sorted and deduplicated.
/// The set stays unchanged in content when every addition is already
/// present or normalizes to empty.
pub fn merge(set: &mut Vec<String>, additions: impl IntoIterator<Item = String>) {
    set.extend(additions.into_iter().filter_map(|raw| normalize(&raw)));
    set.sort();
    set.dedup();
}
