use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::config::ConfigError;
use crate::reply::{ChoiceButton, ChoiceData, ChoiceTag};

#[derive(Debug, Error)]
pub enum DefinitionError {
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("must contain at least one question")]
    Empty,
}

/// One question of the quiz users can take.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct QuizItem {
    pub question: String,
    pub answer: String,
    /// Offered as buttons when present. Whichever entry matches `answer`
    /// is tagged correct.
    #[serde(default)]
    pub choices: Vec<String>,
}

impl QuizItem {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices<I, S>(mut self, choices: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.choices = choices.into_iter().map(Into::into).collect();
        self
    }

    /// Case-insensitive comparison after trimming surrounding whitespace.
    pub fn is_correct(&self, given: &str) -> bool {
        given.trim().to_lowercase() == self.answer.trim().to_lowercase()
    }

    /// Buttons for this item when it is asked as question `index`.
    pub fn buttons(&self, index: usize) -> Vec<ChoiceButton> {
        self.choices
            .iter()
            .map(|label| {
                let tag = if self.is_correct(label) {
                    ChoiceTag::Correct
                } else {
                    ChoiceTag::Wrong
                };
                ChoiceButton {
                    label: label.clone(),
                    data: ChoiceData::new(tag, index),
                }
            })
            .collect()
    }
}

/// The fixed question set shared read-only by every quiz-taking session.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct QuizDefinition {
    items: Vec<QuizItem>,
}

impl Default for QuizDefinition {
    fn default() -> Self {
        Self::new(vec![
            QuizItem::new("What is the capital of France?", "Paris"),
            QuizItem::new("What is 2 + 2?", "4"),
            QuizItem::new("What is the largest planet in the solar system?", "Jupiter"),
        ])
    }
}

impl QuizDefinition {
    pub fn new(items: Vec<QuizItem>) -> Self {
        Self { items }
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let quiz_file = |reason: String| ConfigError::QuizFile {
            path: path.display().to_string(),
            reason,
        };
        let json = fs::read_to_string(path).map_err(|e| quiz_file(e.to_string()))?;
        Self::from_json(&json).map_err(|e| quiz_file(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, DefinitionError> {
        let definition: QuizDefinition = serde_json::from_str(json)?;
        if definition.is_empty() {
            return Err(DefinitionError::Empty);
        }
        Ok(definition)
    }

    pub fn get(&self, index: usize) -> Option<&QuizItem> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
