//! Text normalization helpers shared by blocking, matching, and enrichment.

use unicode_normalization::UnicodeNormalization;

use crate::constants::normalize::{ADDRESS_ABBREVIATIONS, CITY_SYNONYMS, NAME_STOPWORDS};

/// Collapse runs of whitespace into single spaces and trim.
pub fn normalize_inline_whitespace<T: AsRef<str>>(text: T) -> String {
    let mut normalized = String::new();
    let mut seen_space = false;
    for ch in text.as_ref().chars() {
        if ch.is_whitespace() {
            if !seen_space {
                normalized.push(' ');
                seen_space = true;
            }
        } else {
            normalized.push(ch);
            seen_space = false;
        }
    }
    normalized.trim().to_string()
}

/// Canonical comparison form of a free-text field.
///
/// Lowercases, folds Unicode to ASCII alphanumerics and spaces (NFKD),
/// expands address abbreviations, maps city nicknames to canonical
/// spellings, and collapses whitespace. Deterministic and locale-insensitive;
/// empty input maps to the empty string.
pub fn normalize_text(text: &str) -> String {
    let folded: String = text
        .trim()
        .to_lowercase()
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace() || *c == '.')
        .collect();
    let mut normalized = normalize_inline_whitespace(folded);
    for (abbr, full) in ADDRESS_ABBREVIATIONS {
        normalized = replace_word(&normalized, abbr, full);
    }
    for (nickname, canonical) in CITY_SYNONYMS {
        normalized = replace_word(&normalized, nickname, canonical);
    }
    // Abbreviation periods are spent; drop any stragglers.
    normalized.retain(|c| c != '.');
    normalize_inline_whitespace(normalized)
}

/// Comparison key for a property name.
///
/// Applies [`normalize_text`] and strips generic lodging words so that
/// "The Grand Hotel" and "Grand" compare on the distinctive tokens only.
pub fn normalize_name(name: &str) -> String {
    let normalized = normalize_text(name);
    let kept: Vec<&str> = normalized
        .split_whitespace()
        .filter(|token| !NAME_STOPWORDS.contains(token))
        .collect();
    kept.join(" ")
}

/// Replace whole-word occurrences of `from` with `to`.
///
/// Multi-word phrases match across their internal spaces, so
/// `washington dc` rewrites as a unit.
fn replace_word(text: &str, from: &str, to: &str) -> String {
    if !text.contains(from) {
        return text.to_string();
    }
    let mut result = String::with_capacity(text.len());
    let bytes = text.as_bytes();
    let mut pos = 0;
    while pos < text.len() {
        match text[pos..].find(from) {
            Some(offset) => {
                let start = pos + offset;
                let end = start + from.len();
                let boundary_before = start == 0 || bytes[start - 1] == b' ';
                let boundary_after = end == text.len() || bytes[end] == b' ';
                result.push_str(&text[pos..start]);
                if boundary_before && boundary_after {
                    result.push_str(to);
                } else {
                    result.push_str(from);
                }
                pos = end;
            }
            None => {
                result.push_str(&text[pos..]);
                break;
            }
        }
    }
    result
}
