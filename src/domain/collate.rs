//! Name collation for deterministic, human-friendly ordering.
//!
//! Names compare first by their folded form (canonical decomposition with
//! combining marks removed, lowercased), so "Álvaro" sorts next to "alvaro"
//! and before "Bruno". Ties on the folded form fall back to the raw string,
//! which keeps the ordering total and stable across runs.

use std::cmp::Ordering;

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Fold a name into its primary collation key.
pub fn fold(s: &str) -> String {
    s.nfd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}

/// Compare two names the way a locale-aware sort would for Latin scripts.
pub fn compare(a: &str, b: &str) -> Ordering {
    fold(a).cmp(&fold(b)).then_with(|| a.cmp(b))
}

/// True if `haystack` contains `needle` after folding both.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    fold(haystack).contains(&fold(needle))
}
