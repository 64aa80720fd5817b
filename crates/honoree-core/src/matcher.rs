//! Token-based fuzzy name matching.
//!
//! A candidate's score is the best of three views of the two names, each on a
//! 0–100 scale built on normalized Levenshtein similarity:
//!
//! - **token sort**: tokens sorted alphabetically, so word order is ignored
//! - **token set**: shared tokens compared against each side's leftovers, so
//!   extra middle names or suffixes on one side cost little
//! - **partial**: the shorter name against every equally long window of the
//!   longer one
//!
//! Ties on the best score go to the earliest candidate. That is an artifact of
//! iteration order, not a resolution policy; callers with ambiguous
//! candidate lists should not rely on it.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default acceptance threshold.
pub const DEFAULT_THRESHOLD: u8 = 92;

/// A scored candidate name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Position of the candidate in the list it came from.
    pub index: usize,
    pub name: String,
    /// Similarity in `[0.0, 100.0]`, rounded to two decimals.
    pub score: f64,
}

/// Name scorer with an acceptance threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuzzyMatcher {
    threshold: u8,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

impl FuzzyMatcher {
    pub fn new(threshold: u8) -> CoreResult<Self> {
        if threshold > 100 {
            return Err(CoreError::InvalidThreshold(u32::from(threshold)));
        }
        Ok(Self { threshold })
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Similarity of two names in `[0.0, 100.0]`.
    pub fn score(&self, a: &str, b: &str) -> f64 {
        let a = normalize(a);
        let b = normalize(b);
        let best = token_sort_ratio(&a, &b)
            .max(token_set_ratio(&a, &b))
            .max(partial_ratio(&a, &b));
        (best * 100.0).round() / 100.0
    }

    /// The highest-scoring candidate, or `None` if it falls below the threshold.
    ///
    /// Blank candidates are skipped. On equal scores the first candidate wins.
    pub fn best_match<S: AsRef<str>>(&self, target: &str, candidates: &[S]) -> Option<MatchCandidate> {
        let mut best: Option<MatchCandidate> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            let name = candidate.as_ref();
            if name.trim().is_empty() {
                continue;
            }
            let score = self.score(target, name);
            if best.as_ref().map_or(true, |b| score > b.score) {
                best = Some(MatchCandidate {
                    index,
                    name: name.to_string(),
                    score,
                });
            }
        }

        match best {
            Some(b) if b.score >= f64::from(self.threshold) => {
                tracing::debug!("fuzzy match '{}' -> '{}' ({})", target, b.name, b.score);
                Some(b)
            }
            Some(b) => {
                tracing::debug!(
                    "no fuzzy match for '{}': best '{}' scored {} < {}",
                    target,
                    b.name,
                    b.score,
                    self.threshold
                );
                None
            }
            None => None,
        }
    }
}

fn normalize(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(" ")
}

fn ratio(a: &str, b: &str) -> f64 {
    strsim::normalized_levenshtein(a, b) * 100.0
}

fn token_sort_ratio(a: &str, b: &str) -> f64 {
    ratio(&sorted_tokens(a), &sorted_tokens(b))
}

fn sorted_tokens(s: &str) -> String {
    let mut tokens: Vec<&str> = s.split_whitespace().collect();
    tokens.sort_unstable();
    tokens.join(" ")
}

fn token_set_ratio(a: &str, b: &str) -> f64 {
    let set_a: BTreeSet<&str> = a.split_whitespace().collect();
    let set_b: BTreeSet<&str> = b.split_whitespace().collect();
    if set_a.is_empty() || set_b.is_empty() {
        return 0.0;
    }

    let shared: Vec<&str> = set_a.intersection(&set_b).copied().collect();
    let only_a: Vec<&str> = set_a.difference(&set_b).copied().collect();
    let only_b: Vec<&str> = set_b.difference(&set_a).copied().collect();

    // One name's tokens are a subset of the other's.
    if !shared.is_empty() && (only_a.is_empty() || only_b.is_empty()) {
        return 100.0;
    }

    let shared = shared.join(" ");
    let with_a = join_nonempty(&shared, &only_a.join(" "));
    let with_b = join_nonempty(&shared, &only_b.join(" "));

    let mut best = ratio(&with_a, &with_b);
    if !shared.is_empty() {
        best = best.max(ratio(&shared, &with_a)).max(ratio(&shared, &with_b));
    }
    best
}

fn join_nonempty(a: &str, b: &str) -> String {
    match (a.is_empty(), b.is_empty()) {
        (true, _) => b.to_string(),
        (_, true) => a.to_string(),
        _ => format!("{a} {b}"),
    }
}

fn partial_ratio(a: &str, b: &str) -> f64 {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (short, long) = if a_chars.len() <= b_chars.len() {
        (a_chars, b_chars)
    } else {
        (b_chars, a_chars)
    };

    if short.is_empty() {
        return if long.is_empty() { 100.0 } else { 0.0 };
    }

    let needle: String = short.iter().collect();
    let mut best = 0.0f64;
    for window in long.windows(short.len()) {
        let hay: String = window.iter().collect();
        best = best.max(ratio(&needle, &hay));
        if best >= 100.0 {
            break;
        }
    }
    best
}
