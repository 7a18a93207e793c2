//! Team/event identity normalization and fuzzy matching.
//!
//! The odds page and the results page disagree on transliteration: the same
//! team shows up as "Ак Барс" on one and "Aк Бaрс" (with Latin homoglyphs)
//! on the other. Matching therefore runs over a normalized form, with a
//! subsequence-similarity fallback for names that still differ after
//! normalization.

use tracing::debug;

/// Minimum similarity ratio for a fuzzy match to be accepted.
pub const MATCH_THRESHOLD: f64 = 0.70;

/// Latin letters that render identically to Cyrillic ones in team names.
const HOMOGLYPHS: [(char, char); 9] = [
    ('c', 'с'),
    ('a', 'а'),
    ('e', 'е'),
    ('o', 'о'),
    ('p', 'р'),
    ('x', 'х'),
    ('y', 'у'),
    ('k', 'к'),
    ('b', 'б'),
];

/// Canonicalizes an event/team name for comparison.
///
/// Lowercases, folds Latin homoglyphs to their Cyrillic counterparts and
/// collapses internal whitespace. Pure; the result is never persisted.
#[must_use]
pub fn normalize(name: &str) -> String {
    let folded: String = name
        .to_lowercase()
        .chars()
        .map(|c| {
            HOMOGLYPHS
                .iter()
                .find(|(lat, _)| *lat == c)
                .map_or(c, |(_, cyr)| *cyr)
        })
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Similarity ratio in `[0, 1]` between two strings.
///
/// Defined as `2 * lcs(a, b) / (|a| + |b|)` over characters, where `lcs` is
/// the longest common subsequence length. Two empty strings are identical.
#[must_use]
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    // Two-row LCS table; names are short so O(n*m) is fine.
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in &a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                prev[j + 1].max(curr[j])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    let lcs = prev[b.len()];
    (2.0 * lcs as f64) / ((a.len() + b.len()) as f64)
}

/// Finds the best-matching candidate for `target`.
///
/// An exact match after normalization wins immediately (first one
/// encountered). Otherwise the candidate with the highest similarity ratio
/// is returned, provided that ratio exceeds [`MATCH_THRESHOLD`].
#[must_use]
pub fn find_best_match<'a, I>(target: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let normalized_target = normalize(target);

    let mut best: Option<&str> = None;
    let mut best_ratio = MATCH_THRESHOLD;

    for candidate in candidates {
        let normalized_candidate = normalize(candidate);

        if normalized_target == normalized_candidate {
            return Some(candidate);
        }

        let ratio = similarity(&normalized_target, &normalized_candidate);
        if ratio > best_ratio {
            best_ratio = ratio;
            best = Some(candidate);
        }
    }

    if let Some(matched) = best {
        debug!(query = %target, matched = %matched, ratio = best_ratio, "fuzzy name match");
    }
    best
}
