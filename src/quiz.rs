//! Quiz reference data
//!
//! The question set, the result catalog and the bot's message copy are loaded
//! once at startup from a single JSON document and are read-only afterwards.

mod messages;
pub mod scoring;

pub use messages::BotMessages;
pub use scoring::{score, ScoreOutcome, ScoredResult};

use serde::de::{MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors raised while loading quiz data. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum QuizDataError {
    #[error("Failed to read quiz data from {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Malformed quiz data: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Quiz data contains no questions")]
    NoQuestions,
    #[error("Question {index} is invalid: {reason}")]
    InvalidQuestion { index: usize, reason: &'static str },
    #[error("Result entry {key:?} lists no answers")]
    EmptyResultEntry { key: String },
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub text: String,
    /// Selectable options, in display order
    pub answers: Vec<String>,
}

/// Ordered list of questions, presented positionally
pub type QuestionSet = Vec<Question>;

/// One possible quiz outcome
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResultEntry {
    /// Option strings that count towards this entry
    pub answers: HashSet<String>,
    pub description: String,
    /// Image file relative to the images directory. Defaults to `<key>.jpg`.
    #[serde(default)]
    pub image: Option<String>,
}

impl ResultEntry {
    /// Number of submitted answers that belong to this entry's answer set.
    /// Repeated answers count once per occurrence.
    pub fn match_count(&self, submitted: &[String]) -> usize {
        submitted
            .iter()
            .filter(|answer| self.answers.contains(answer.as_str()))
            .count()
    }
}

/// Result entries keyed by result name, kept in declaration order.
///
/// Declaration order is the tie-break order used by scoring, so the catalog
/// never goes through a hashed map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResultCatalog {
    entries: Vec<(String, ResultEntry)>,
}

impl ResultCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. A repeated key keeps its original position and takes
    /// the new value.
    pub fn insert(&mut self, key: impl Into<String>, entry: ResultEntry) {
        let key = key.into();
        if let Some(slot) = self.entries.iter_mut().find(|slot| slot.0 == key) {
            slot.1 = entry;
        } else {
            self.entries.push((key, entry));
        }
    }

    #[cfg(test)]
    pub fn get(&self, key: &str) -> Option<&ResultEntry> {
        self.entries
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, entry)| entry)
    }

    /// Entries in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResultEntry)> {
        self.entries.iter().map(|(k, entry)| (k.as_str(), entry))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl<K: Into<String>> FromIterator<(K, ResultEntry)> for ResultCatalog {
    fn from_iter<I: IntoIterator<Item = (K, ResultEntry)>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for (key, entry) in iter {
            catalog.insert(key, entry);
        }
        catalog
    }
}

impl<'de> Deserialize<'de> for ResultCatalog {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct CatalogVisitor;

        impl<'de> Visitor<'de> for CatalogVisitor {
            type Value = ResultCatalog;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of result keys to result entries")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut catalog = ResultCatalog::new();
                while let Some((key, entry)) = map.next_entry::<String, ResultEntry>()? {
                    catalog.insert(key, entry);
                }
                Ok(catalog)
            }
        }

        deserializer.deserialize_map(CatalogVisitor)
    }
}

/// Everything the quiz needs, as loaded from the quiz document
#[derive(Debug, Clone, Deserialize)]
pub struct QuizData {
    pub questions: QuestionSet,
    #[serde(rename = "animals")]
    pub catalog: ResultCatalog,
    #[serde(default)]
    pub messages: BotMessages,
}

impl QuizData {
    /// Read and validate the quiz document at `path`
    pub fn load(path: impl AsRef<Path>) -> Result<Self, QuizDataError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| QuizDataError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, QuizDataError> {
        let data: Self = serde_json::from_str(raw)?;
        data.validate()?;
        Ok(data)
    }

    fn validate(&self) -> Result<(), QuizDataError> {
        if self.questions.is_empty() {
            return Err(QuizDataError::NoQuestions);
        }
        for (index, question) in self.questions.iter().enumerate() {
            if question.text.trim().is_empty() {
                return Err(QuizDataError::InvalidQuestion {
                    index,
                    reason: "question text is empty",
                });
            }
            if question.answers.is_empty() {
                return Err(QuizDataError::InvalidQuestion {
                    index,
                    reason: "question has no answer options",
                });
            }
        }
        if let Some((key, _)) = self.catalog.iter().find(|(_, e)| e.answers.is_empty()) {
            return Err(QuizDataError::EmptyResultEntry {
                key: key.to_string(),
            });
        }
        Ok(())
    }

    pub fn question(&self, index: usize) -> Option<&Question> {
        self.questions.get(index)
    }

    pub fn question_count(&self) -> usize {
        self.questions.len()
    }
}
