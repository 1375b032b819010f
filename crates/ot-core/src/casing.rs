//! # Key Casing: snake_case to camelCase
//!
//! Word splitting follows the rules most JavaScript tooling uses for
//! `camelCase`, so keys produced here match what the OpenTrials web client
//! shows:
//!
//! - any non-alphanumeric character separates words (`brief_summary`);
//! - a lower-case letter followed by an upper-case one starts a new word
//!   (`briefSummary`);
//! - an upper-case run followed by upper+lower keeps the last capital for
//!   the next word (`HTMLParser` → `HTML`, `Parser`);
//! - letters and digits are separate words (`phase2trial` → `phase`, `2`,
//!   `trial`), except for ordinals: `1st`, `2nd`, `3rd` and `4th` style
//!   suffixes stay attached to their number (`phase_1st` → `phase1st`).
//!
//! The first word is lower-cased; later words are capitalized.

/// Split a key into its words.
fn words(key: &str) -> Vec<String> {
    let chars: Vec<char> = key.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }

        if let Some(prev) = current.chars().last() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = (prev.is_lowercase() && c.is_uppercase())
                || (prev.is_alphabetic() && c.is_numeric())
                || (prev.is_numeric()
                    && c.is_alphabetic()
                    && !is_ordinal_suffix(prev, &chars[i..]))
                || (prev.is_uppercase() && c.is_uppercase() && next_is_lower);
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }

    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// True if `rest` starts with the ordinal suffix for a number ending in
/// `digit` (`1` → `st`, `2` → `nd`, `3` → `rd`, otherwise `th`), in one
/// case, and the suffix ends the word.
fn is_ordinal_suffix(digit: char, rest: &[char]) -> bool {
    let suffix = match digit {
        '1' => "st",
        '2' => "nd",
        '3' => "rd",
        _ => "th",
    };
    let Some(head) = rest.get(..2) else {
        return false;
    };
    let head: String = head.iter().collect();
    let lower = head == suffix;
    if !lower && head != suffix.to_uppercase() {
        return false;
    }
    match rest.get(2) {
        None => true,
        Some(n) if n.is_numeric() => false,
        Some(n) if lower => !n.is_lowercase(),
        Some(n) => !n.is_uppercase(),
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Convert a key to camelCase.
///
/// Converting the output of a lower-case snake key again changes nothing.
/// That does not hold for arbitrary input: `a_aA` becomes `aAA`, whose
/// trailing capitals then read as one word (`aAa`). The normalizer never
/// renames a mapping twice, since its output keys carry no underscore.
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for (i, word) in words(key).iter().enumerate() {
        if i == 0 {
            out.push_str(&word.to_lowercase());
        } else {
            out.push_str(&capitalize(word));
        }
    }
    out
}

/// True if any key contains an underscore, i.e. the mapping still carries
/// API-style naming and should be rewritten.
pub fn needs_rewrite<'a>(mut keys: impl Iterator<Item = &'a str>) -> bool {
    keys.any(|k| k.contains('_'))
}
