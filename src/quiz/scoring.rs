//! Answer-to-result matching
//!
//! Scoring is a pure function of the catalog and the submitted answers: every
//! entry gets a match count, the highest count wins, and ties go to the entry
//! declared first in the catalog. When nothing matches at all the outcome is
//! undetermined.

use super::{ResultCatalog, ResultEntry};
use serde::Serialize;

/// The catalog entry a session was matched to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredResult {
    pub key: String,
    pub description: String,
    pub image: Option<String>,
    pub match_count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScoreOutcome {
    Determined(ScoredResult),
    Undetermined,
}

impl ScoreOutcome {
    pub fn key(&self) -> Option<&str> {
        match self {
            ScoreOutcome::Determined(result) => Some(&result.key),
            ScoreOutcome::Undetermined => None,
        }
    }
}

/// Match `answers` against every catalog entry and pick the best one.
///
/// Only a strictly greater count replaces the current best, so among equal
/// counts the first entry in declaration order wins.
pub fn score(catalog: &ResultCatalog, answers: &[String]) -> ScoreOutcome {
    let mut best: Option<(&str, &ResultEntry, usize)> = None;

    for (key, entry) in catalog.iter() {
        let count = entry.match_count(answers);
        if count > best.map_or(0, |(_, _, best_count)| best_count) {
            best = Some((key, entry, count));
        }
    }

    match best {
        Some((key, entry, match_count)) => ScoreOutcome::Determined(ScoredResult {
            key: key.to_string(),
            description: entry.description.clone(),
            image: entry.image.clone(),
            match_count,
        }),
        None => ScoreOutcome::Undetermined,
    }
}
