use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::error::ConversationError;
use crate::limiter::{Decision, RateLimit, RateLimiter};
use crate::machine::{Command, ConversationStateMachine, Next, Transition, WELCOME};
use crate::reply::{ChoiceData, Reply};
use crate::state::UserId;
use crate::storage::{QuizStore, SessionStore};

const INVALID_STEP_REPLY: &str = "That can't be done right now. Type /cancel to start over.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    Command(Command),
    Text(String),
    Choice(ChoiceData),
}

/// One user action, already stripped of transport details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub user: UserId,
    pub kind: EventKind,
}

impl InboundEvent {
    pub fn command(user: UserId, command: Command) -> Self {
        Self {
            user,
            kind: EventKind::Command(command),
        }
    }

    pub fn text(user: UserId, text: impl Into<String>) -> Self {
        Self {
            user,
            kind: EventKind::Text(text.into()),
        }
    }

    pub fn choice(user: UserId, choice: ChoiceData) -> Self {
        Self {
            user,
            kind: EventKind::Choice(choice),
        }
    }
}

/// Runs inbound events through the state machine against the stores.
///
/// Events for the same user are applied one at a time; different users
/// proceed in parallel.
pub struct Conversations<S, Q> {
    machine: ConversationStateMachine,
    sessions: S,
    quizzes: Q,
    limiter: Option<RateLimiter>,
    locks: Mutex<HashMap<UserId, Arc<Mutex<()>>>>,
}

impl<S: SessionStore, Q: QuizStore> Conversations<S, Q> {
    pub fn new(machine: ConversationStateMachine, sessions: S, quizzes: Q) -> Self {
        Self {
            machine,
            sessions,
            quizzes,
            limiter: None,
            locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_rate_limit(mut self, limit: RateLimit) -> Self {
        self.limiter = Some(RateLimiter::new(limit));
        self
    }

    pub fn sessions(&self) -> &S {
        &self.sessions
    }

    #[instrument(level = "info", skip(self), fields(user = event.user))]
    pub async fn handle(&self, event: InboundEvent) -> Vec<Reply> {
        let user = event.user;

        if let Some(limiter) = &self.limiter {
            match limiter.check(user).await {
                Decision::Allowed { remaining } => debug!(remaining, "rate limit ok"),
                Decision::Denied { retry_after } => {
                    info!(?retry_after, "rate limited");
                    return vec![Reply::text(format!(
                        "Too many messages. Try again in {} seconds.",
                        retry_after.as_secs().max(1)
                    ))];
                }
            }
        }

        let lock = self.lock_for(user).await;
        let replies = {
            let _guard = lock.lock().await;
            let session = self.sessions.get(user).await;
            let result = match event.kind {
                EventKind::Command(command) => {
                    Ok(self.machine.on_command(session.as_ref(), command))
                }
                EventKind::Text(text) => self.machine.on_text(session, &text),
                EventKind::Choice(choice) => self.machine.on_choice(session, choice),
            };

            match result {
                Ok(transition) => self.apply(user, transition).await,
                Err(ConversationError::SessionNotFound) => {
                    debug!("no session, sending welcome");
                    vec![Reply::text(WELCOME)]
                }
                Err(err @ ConversationError::InvalidStep { .. }) => {
                    warn!(%err, "rejected event");
                    vec![Reply::text(INVALID_STEP_REPLY)]
                }
            }
        };
        self.release(user, lock).await;

        replies
    }

    /// The quiz `user` authored most recently.
    pub async fn saved_quiz(&self, user: UserId) -> Reply {
        match self.quizzes.get(user).await {
            Some(quiz) => Reply::text(quiz.to_string()),
            None => Reply::text("You haven't created a quiz yet. Type /create to make one."),
        }
    }

    async fn apply(&self, user: UserId, transition: Transition) -> Vec<Reply> {
        match transition.next {
            Next::Keep(session) => {
                debug!(step = ?session.step(), "session updated");
                self.sessions.put(user, session).await;
            }
            Next::Clear => {
                self.sessions.delete(user).await;
            }
        }

        if let Some(quiz) = transition.created {
            info!(quiz = %quiz.uuid(), questions = quiz.questions().len(), "saving quiz");
            self.quizzes.save(user, quiz).await;
        }

        transition.replies
    }

    async fn lock_for(&self, user: UserId) -> Arc<Mutex<()>> {
        self.locks.lock().await.entry(user).or_default().clone()
    }

    async fn release(&self, user: UserId, lock: Arc<Mutex<()>>) {
        let mut locks = self.locks.lock().await;
        // One reference in the map, one held here: nobody else is waiting.
        if Arc::strong_count(&lock) == 2 {
            locks.remove(&user);
        }
    }
}
