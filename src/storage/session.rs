use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::state::{Session, UserId};

/// Where per-user conversation progress lives between events.
pub trait SessionStore: Send + Sync + 'static {
    fn get(&self, user: UserId) -> impl Future<Output = Option<Session>> + Send;

    fn put(&self, user: UserId, session: Session) -> impl Future<Output = ()> + Send;

    fn delete(&self, user: UserId) -> impl Future<Output = Option<Session>> + Send;
}

/// Sessions held for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<UserId, Session>>>,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}

impl SessionStore for InMemorySessionStore {
    async fn get(&self, user: UserId) -> Option<Session> {
        self.sessions.read().await.get(&user).cloned()
    }

    async fn put(&self, user: UserId, session: Session) {
        self.sessions.write().await.insert(user, session);
    }

    async fn delete(&self, user: UserId) -> Option<Session> {
        self.sessions.write().await.remove(&user)
    }
}
