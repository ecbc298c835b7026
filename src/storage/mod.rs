pub mod quiz;
pub mod session;

pub use quiz::{InMemoryQuizStore, Quiz, QuizStore, QuizSummary};
pub use session::{InMemorySessionStore, SessionStore};
