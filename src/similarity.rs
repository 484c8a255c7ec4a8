//! Token-set name similarity on a 0-100 scale.
//!
//! The score treats each name as a set of word tokens, so it is insensitive
//! to word order and tolerant of one name being a token-superset of the
//! other ("marriott" vs "marriott downtown" scores 100). Clearly distinct
//! names score low.

use std::collections::BTreeSet;

use strsim::normalized_levenshtein;

/// Token-set similarity between two normalized names, in [0, 100].
///
/// Both inputs are tokenized on whitespace into sets; the sorted token
/// intersection is compared against each side's intersection-plus-remainder
/// string and the best edit-distance ratio of the three pairings wins.
/// Identical token sets and subset relations score 100.
pub fn token_set_ratio(a: &str, b: &str) -> u32 {
    let tokens_a: BTreeSet<&str> = a.split_whitespace().collect();
    let tokens_b: BTreeSet<&str> = b.split_whitespace().collect();
    if tokens_a.is_empty() || tokens_b.is_empty() {
        return 0;
    }

    let common: Vec<&str> = tokens_a.intersection(&tokens_b).copied().collect();
    let only_a: Vec<&str> = tokens_a.difference(&tokens_b).copied().collect();
    let only_b: Vec<&str> = tokens_b.difference(&tokens_a).copied().collect();

    let base = common.join(" ");
    let combined_a = join_parts(&base, &only_a);
    let combined_b = join_parts(&base, &only_b);

    let best = [
        normalized_levenshtein(&base, &combined_a),
        normalized_levenshtein(&base, &combined_b),
        normalized_levenshtein(&combined_a, &combined_b),
    ]
    .into_iter()
    .fold(0.0f64, f64::max);

    (best * 100.0).round() as u32
}

/// True when two normalized names clear `threshold` on the 0-100 scale.
///
/// An empty name carries no signal and never matches.
pub fn related_names(a: &str, b: &str, threshold: u32) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    token_set_ratio(a, b) >= threshold
}

fn join_parts(base: &str, rest: &[&str]) -> String {
    if rest.is_empty() {
        return base.to_string();
    }
    if base.is_empty() {
        return rest.join(" ");
    }
    format!("{base} {}", rest.join(" "))
}
