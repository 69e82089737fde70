//! Search-key normalization for the catalog's full-text index.
//!
//! Titles are folded to plain ASCII at ingestion time and stored in the
//! index stripped down to lowercase alphanumerics. Query text must go
//! through the same pipeline or it will not match the index.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Symbol sequences that never appear in the index, with the word they
/// are spelled out as. Padded with spaces on substitution so a symbol
/// cannot glue two words together.
const SUBSTITUTIONS: &[(&str, &str)] = &[
    ("+", "plus"),
    ("&", "and"),
    ("™", ""),
    ("©", ""),
    ("®", ""),
];

/// Collapse consecutive occurrences of `ch` into a single one, then trim
/// surrounding whitespace.
pub fn normalize_repeated_chars(text: &str, ch: char) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c == ch {
            if !in_run {
                out.push(c);
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out.trim().to_string()
}

/// Normalize free text into its searchable form: symbols spelled out,
/// folded to ASCII, runs of spaces collapsed. Case is preserved.
pub fn valid_search_key(text: &str) -> String {
    let text = replace_invalid_chars(text);
    let text = fold_ascii(&text);
    normalize_repeated_chars(&text, ' ')
}

/// Produce the key stored in the `entries_fts.search_key` column:
/// searchable form, lowercased, with everything outside `[a-z0-9]`
/// removed.
///
/// Must stay in lockstep with the ingestion tool, otherwise index
/// matching silently degrades.
pub fn db_search_key(title: &str) -> String {
    let key = valid_search_key(title).to_lowercase();
    let key: String = key
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect();
    key.trim().to_string()
}

/// Quote a search key for the FTS5 MATCH operator.
///
/// Each whitespace-separated token of the normalized key becomes a
/// double-quoted string with embedded quotes doubled, so tokens match
/// literally instead of being parsed as FTS syntax. An empty result
/// means "no text filter", never "match nothing".
pub fn match_expression(search_key: &str) -> String {
    valid_search_key(search_key)
        .split_whitespace()
        .map(|word| format!("\"{}\"", word.replace('"', "\"\"")))
        .collect::<Vec<_>>()
        .join(" ")
}

fn replace_invalid_chars(text: &str) -> String {
    let mut out = text.to_string();
    for (symbol, word) in SUBSTITUTIONS {
        out = out.replace(symbol, &format!(" {word} "));
    }
    out
}

/// Fold to ASCII: NFKD-decompose, drop combining marks, then drop
/// anything still outside ASCII. Characters with no ASCII analogue are
/// dropped rather than replaced with placeholders.
fn fold_ascii(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .filter(char::is_ascii)
        .collect()
}
