//! Case folding shared by cache ordering and search matching
//!
//! Folding is Unicode lowercase mapping (`char::to_lowercase`), which does not
//! depend on the process locale. The SQLite backend registers [`fold_key`] as
//! the `casefold` SQL function so that search and sort agree.

use std::cmp::Ordering;

/// Folded form of `s`
pub fn fold_key(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Compare two strings after folding, without allocating
pub fn fold_cmp(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
}

/// Case-insensitive substring test. An empty needle matches everything.
pub fn fold_contains(haystack: &str, needle: &str) -> bool {
    fold_key(haystack).contains(&fold_key(needle))
}
