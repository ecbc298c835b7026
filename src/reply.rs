use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;

/// Correctness tag carried by a multiple-choice button.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceTag {
    Correct,
    Wrong,
}

impl ChoiceTag {
    pub fn as_str(self) -> &'static str {
        match self {
            ChoiceTag::Correct => "correct",
            ChoiceTag::Wrong => "wrong",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown choice tag '{0}'")]
pub struct UnknownChoiceTag(pub String);

impl FromStr for ChoiceTag {
    type Err = UnknownChoiceTag;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "correct" => Ok(ChoiceTag::Correct),
            "wrong" => Ok(ChoiceTag::Wrong),
            other => Err(UnknownChoiceTag(other.to_owned())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChoiceDataError {
    #[error(transparent)]
    Tag(#[from] UnknownChoiceTag),

    #[error("callback data '{0}' has no question index")]
    MissingQuestion(String),

    #[error("bad question index: {0}")]
    Question(#[from] ParseIntError),
}

/// Button callback payload: the tag plus the index of the question the
/// button was sent with, encoded as `tag:index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoiceData {
    pub tag: ChoiceTag,
    pub question: usize,
}

impl ChoiceData {
    pub fn new(tag: ChoiceTag, question: usize) -> Self {
        Self { tag, question }
    }
}

impl fmt::Display for ChoiceData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.tag.as_str(), self.question)
    }
}

impl FromStr for ChoiceData {
    type Err = ChoiceDataError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (tag, question) = s
            .split_once(':')
            .ok_or_else(|| ChoiceDataError::MissingQuestion(s.to_owned()))?;
        Ok(Self {
            tag: tag.parse()?,
            question: question.parse()?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceButton {
    pub label: String,
    pub data: ChoiceData,
}

/// A message the transport should deliver to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub choices: Vec<ChoiceButton>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            choices: Vec::new(),
        }
    }

    pub fn with_choices(text: impl Into<String>, choices: Vec<ChoiceButton>) -> Self {
        Self {
            text: text.into(),
            choices,
        }
    }
}
