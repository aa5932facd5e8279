//! Fuzzy key lookup over a [`KnowledgeBase`].
//!
//! Similarity is the Ratcliff/Obershelp "gestalt" ratio: find the longest
//! common contiguous block, recurse on the pieces to its left and right, and
//! score `2 * matched / (len(a) + len(b))`. Lengths count Unicode scalar
//! values, so Turkish or accented keys are not penalised for their UTF-8 size.

use super::model::KnowledgeBase;
use crate::error::{GpdiError, Result};
use std::collections::HashMap;

/// Minimum similarity a key needs to count as a match.
pub const DEFAULT_THRESHOLD: f64 = 0.6;

/// A key selected by the matcher together with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match<'a> {
    pub key: &'a str,
    pub ratio: f64,
}

/// Single-best-match lookup with a fixed threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: f64,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    /// Creates a matcher; `threshold` must lie in `[0, 1]`.
    pub fn new(threshold: f64) -> Result<Self> {
        if !(0.0..=1.0).contains(&threshold) {
            return Err(GpdiError::config(format!(
                "similarity threshold must be within [0, 1], got {}",
                threshold
            )));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Returns the key most similar to `query`, if any clears the threshold.
    ///
    /// Keys are visited in the knowledge base's iteration order (ascending
    /// bytes) and only a strictly higher ratio replaces the current best, so
    /// on a tie the first key in that order wins.
    pub fn find_closest<'a>(&self, query: &str, base: &'a KnowledgeBase) -> Option<Match<'a>> {
        let mut best: Option<Match<'a>> = None;

        for key in base.keys() {
            if quick_ratio(query, key) < self.threshold {
                continue;
            }
            let ratio = similarity(query, key);
            if ratio < self.threshold {
                continue;
            }
            if best.is_none_or(|current| ratio > current.ratio) {
                best = Some(Match { key, ratio });
            }
        }

        tracing::debug!(
            query,
            matched = best.map(|m| m.key),
            ratio = best.map(|m| m.ratio),
            "fuzzy lookup"
        );
        best
    }
}

/// Shorthand for [`FuzzyMatcher::find_closest`] with the default threshold.
pub fn find_closest<'a>(query: &str, base: &'a KnowledgeBase) -> Option<&'a str> {
    FuzzyMatcher::default()
        .find_closest(query, base)
        .map(|m| m.key)
}

/// Gestalt similarity of two strings, in `[0, 1]`.
///
/// The pair is always evaluated with the lexicographically smaller string
/// first; the block search is order sensitive and this keeps
/// `similarity(a, b) == similarity(b, a)`.
pub fn similarity(a: &str, b: &str) -> f64 {
    let (first, second) = if a <= b { (a, b) } else { (b, a) };
    let first: Vec<char> = first.chars().collect();
    let second: Vec<char> = second.chars().collect();

    let total = first.len() + second.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_characters(&first, &second) as f64 / total as f64
}

/// Upper bound on [`similarity`] from character multiset overlap.
pub fn quick_ratio(a: &str, b: &str) -> f64 {
    let mut available: HashMap<char, usize> = HashMap::new();
    for c in b.chars() {
        *available.entry(c).or_default() += 1;
    }

    let mut shared = 0usize;
    let mut len_a = 0usize;
    for c in a.chars() {
        len_a += 1;
        if let Some(count) = available.get_mut(&c) {
            if *count > 0 {
                *count -= 1;
                shared += 1;
            }
        }
    }

    let total = len_a + b.chars().count();
    if total == 0 {
        return 1.0;
    }
    2.0 * shared as f64 / total as f64
}

/// Total size of the matching blocks between `a` and `b`.
fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b_index: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b_index.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_block(a, &b_index, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Among blocks of maximal size the one starting earliest in `a` wins, then
/// the one starting earliest in `b`. Returns `(i, j, size)`.
fn longest_block(
    a: &[char],
    b_index: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of the block ending at (i - 1, j), keyed by j
    let mut runs: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b_index.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let size = j
                    .checked_sub(1)
                    .and_then(|prev| runs.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, size);
                if size > best_size {
                    best_i = i + 1 - size;
                    best_j = j + 1 - size;
                    best_size = size;
                }
            }
        }
        runs = next_runs;
    }

    (best_i, best_j, best_size)
}
