use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::state::UserId;

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_DESCRIPTION: &str = "No description";

/// A quiz produced by the authoring flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quiz {
    uuid: Uuid,
    title: Option<String>,
    description: Option<String>,
    questions: Vec<String>,
}

/// What the author is told once a quiz is finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizSummary {
    pub title: String,
    pub description: String,
    pub question_count: usize,
}

impl fmt::Display for QuizSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Quiz created!\nTitle: {}\nDescription: {}\nQuestions: {}",
            self.title, self.description, self.question_count
        )
    }
}

impl fmt::Display for Quiz {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}\n{}\n\nQuestions:",
            self.title.as_deref().unwrap_or(DEFAULT_TITLE),
            self.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
        )?;
        for (i, question) in self.questions.iter().enumerate() {
            write!(f, "\n{}) {}", i + 1, question)?;
        }
        Ok(())
    }
}

impl Quiz {
    pub fn new(title: Option<String>, description: Option<String>, questions: Vec<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            title,
            description,
            questions,
        }
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn summary(&self) -> QuizSummary {
        QuizSummary {
            title: self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_owned()),
            description: self
                .description
                .clone()
                .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_owned()),
            question_count: self.questions.len(),
        }
    }
}

/// Process-wide home of finished quizzes, one per author.
pub trait QuizStore: Send + Sync + 'static {
    fn save(&self, user: UserId, quiz: Quiz) -> impl Future<Output = ()> + Send;

    fn get(&self, user: UserId) -> impl Future<Output = Option<Quiz>> + Send;
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryQuizStore {
    quizzes: Arc<RwLock<HashMap<UserId, Quiz>>>,
}

impl InMemoryQuizStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuizStore for InMemoryQuizStore {
    async fn save(&self, user: UserId, quiz: Quiz) {
        self.quizzes.write().await.insert(user, quiz);
    }

    async fn get(&self, user: UserId) -> Option<Quiz> {
        self.quizzes.read().await.get(&user).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_falls_back_to_defaults() {
        let quiz = Quiz::new(None, None, vec![]);
        assert_eq!(
            quiz.summary(),
            QuizSummary {
                title: "Untitled".into(),
                description: "No description".into(),
                question_count: 0,
            }
        );
    }

    #[test]
    fn quiz_renders_numbered_questions() {
        let quiz = Quiz::new(
            Some("Geo".into()),
            None,
            vec!["Capital of France?".into(), "Capital of Peru?".into()],
        );
        assert_eq!(
            quiz.to_string(),
            "Geo\nNo description\n\nQuestions:\n1) Capital of France?\n2) Capital of Peru?"
        );
    }

    #[tokio::test]
    async fn newer_quiz_replaces_older_one() {
        let store = InMemoryQuizStore::new();
        store.save(7, Quiz::new(Some("First".into()), None, vec![])).await;
        store.save(7, Quiz::new(Some("Second".into()), None, vec![])).await;

        let saved = store.get(7).await.unwrap();
        assert_eq!(saved.title(), Some("Second"));
        assert!(store.get(8).await.is_none());
    }
}
