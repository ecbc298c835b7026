use conversation::Conversations;
use storage::{InMemoryQuizStore, InMemorySessionStore};

pub mod commands;
pub mod config;
pub mod conversation;
pub mod definition;
pub mod error;
pub mod health;
pub mod keyboard;
pub mod limiter;
pub mod machine;
pub mod reply;
pub mod schema;
pub mod state;
pub mod storage;

pub type BotConversations = Conversations<InMemorySessionStore, InMemoryQuizStore>;
type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>;
