//! Session and profile collaborators used by the admin gate.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex};
use tracing::info;

use crate::remote::StoreError;

const AUTH_EVENT_CAPACITY: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Customer,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn(Session),
    SignedOut,
}

#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn current_session(&self) -> Result<Option<Session>, StoreError>;
    async fn sign_out(&self) -> Result<(), StoreError>;
    fn auth_events(&self) -> broadcast::Receiver<AuthEvent>;
}

/// The `profiles` table, reduced to the one column the gate reads.
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn role_of(&self, user_id: &str) -> Result<Option<Role>, StoreError>;
}

/// In-process auth backend implementing both collaborators.
pub struct MemoryAuth {
    session: Mutex<Option<Session>>,
    roles: Mutex<HashMap<String, Role>>,
    events: broadcast::Sender<AuthEvent>,
}

impl Default for MemoryAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryAuth {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Self {
            session: Mutex::new(None),
            roles: Mutex::new(HashMap::new()),
            events,
        }
    }

    pub async fn set_role(&self, user_id: impl Into<String>, role: Role) {
        self.roles.lock().await.insert(user_id.into(), role);
    }

    pub async fn sign_in(&self, session: Session) {
        info!(user_id = %session.user_id, "Signed in");
        *self.session.lock().await = Some(session.clone());
        let _ = self.events.send(AuthEvent::SignedIn(session));
    }
}

#[async_trait]
impl SessionProvider for MemoryAuth {
    async fn current_session(&self) -> Result<Option<Session>, StoreError> {
        Ok(self.session.lock().await.clone())
    }

    async fn sign_out(&self) -> Result<(), StoreError> {
        if self.session.lock().await.take().is_some() {
            info!("Signed out");
            let _ = self.events.send(AuthEvent::SignedOut);
        }
        Ok(())
    }

    fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

#[async_trait]
impl ProfileDirectory for MemoryAuth {
    async fn role_of(&self, user_id: &str) -> Result<Option<Role>, StoreError> {
        Ok(self.roles.lock().await.get(user_id).copied())
    }
}
