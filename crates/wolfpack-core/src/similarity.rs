//! Bag-of-characters cosine similarity for matching misheard event names.
//!
//! Each string becomes a vector of per-character occurrence counts over the
//! union of characters in both strings; similarity is the cosine of the
//! angle between the two vectors. Character substitutions from speech
//! transcription cost little, while character order is ignored entirely.
//! Comparison is case-sensitive.

use std::collections::BTreeMap;

use crate::error::{Result, SkillError};

/// Cosine similarity of the character-count vectors of `a` and `b`.
///
/// Returns a value in `[0, 1]`. An empty string has no magnitude, so any
/// comparison involving one yields `0.0`.
///
/// # Examples
///
/// ```
/// use wolfpack_core::similarity::similarity;
///
/// assert_eq!(similarity("listen", "silent"), 1.0);
/// assert_eq!(similarity("abc", "xyz"), 0.0);
/// assert_eq!(similarity("", "abc"), 0.0);
/// ```
pub fn similarity(a: &str, b: &str) -> f64 {
    let mut counts: BTreeMap<char, (u64, u64)> = BTreeMap::new();
    for ch in a.chars() {
        counts.entry(ch).or_default().0 += 1;
    }
    for ch in b.chars() {
        counts.entry(ch).or_default().1 += 1;
    }

    let (mut dot, mut norm_a, mut norm_b) = (0u64, 0u64, 0u64);
    for &(x, y) in counts.values() {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0 || norm_b == 0 {
        return 0.0;
    }

    // sqrt of the product keeps identical inputs at exactly 1.0
    let rating = dot as f64 / (norm_a as f64 * norm_b as f64).sqrt();
    rating.min(1.0)
}

/// A candidate chosen by [`best_match_scored`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMatch<'a> {
    pub candidate: &'a str,
    pub score: f64,
}

/// The candidate most similar to `query`.
///
/// Ties keep the earliest candidate in iteration order.
///
/// # Errors
///
/// Returns [`SkillError::EmptyCandidateSet`] if `candidates` yields nothing.
pub fn best_match<'a, I>(query: &str, candidates: I) -> Result<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    best_match_scored(query, candidates).map(|m| m.candidate)
}

/// Like [`best_match`], also returning the winning score.
pub fn best_match_scored<'a, I>(query: &str, candidates: I) -> Result<ScoredMatch<'a>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<ScoredMatch<'a>> = None;

    for candidate in candidates {
        let score = similarity(query, candidate);
        match best {
            Some(current) if score <= current.score => {}
            _ => best = Some(ScoredMatch { candidate, score }),
        }
    }

    let best = best.ok_or(SkillError::EmptyCandidateSet)?;
    tracing::debug!(query, candidate = best.candidate, score = best.score, "best match");
    Ok(best)
}
