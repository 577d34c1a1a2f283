use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use super::state::SessionState;
use crate::error::AppError;

pub type SessionHandle = Arc<Mutex<SessionState>>;

/// In-memory session registry.
///
/// Each session sits behind its own lock, so transitions on one session never
/// wait on another.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, SessionHandle>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn create(&self) -> (Uuid, SessionHandle) {
        let id = Uuid::new_v4();
        let handle = Arc::new(Mutex::new(SessionState::new(id)));
        self.sessions.write().await.insert(id, Arc::clone(&handle));
        (id, handle)
    }

    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, AppError> {
        self.sessions
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
    }

    pub async fn remove(&self, id: Uuid) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| AppError::SessionNotFound(id.to_string()))
    }

    pub async fn count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Drop sessions idle for at least `max_idle` and return their ids.
    ///
    /// A session whose lock is held is mid-transition and is kept.
    pub async fn evict_idle(&self, max_idle: Duration) -> Vec<Uuid> {
        let mut sessions = self.sessions.write().await;

        let idle: Vec<Uuid> = sessions
            .iter()
            .filter_map(|(id, handle)| {
                let session = handle.try_lock().ok()?;
                (session.idle_for() >= max_idle).then_some(*id)
            })
            .collect();

        for id in &idle {
            sessions.remove(id);
        }
        idle
    }
}
