use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::{info, instrument, warn};

use super::AccessError;
use crate::auth::{AuthEvent, ProfileDirectory, Role, Session, SessionProvider};

/// Proof that the current session belongs to an admin. Only
/// [`AdminGate::authorize`] can produce one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminAccess {
    session: Session,
}

impl AdminAccess {
    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[derive(Clone)]
pub struct AdminGate {
    sessions: Arc<dyn SessionProvider>,
    profiles: Arc<dyn ProfileDirectory>,
}

impl AdminGate {
    pub fn new(sessions: Arc<dyn SessionProvider>, profiles: Arc<dyn ProfileDirectory>) -> Self {
        Self { sessions, profiles }
    }

    /// Checks that someone is signed in and that their profile role is admin.
    #[instrument(skip(self))]
    pub async fn authorize(&self) -> Result<AdminAccess, AccessError> {
        let session = self
            .sessions
            .current_session()
            .await
            .map_err(|e| AccessError::Lookup(e.to_string()))?
            .ok_or(AccessError::NotSignedIn)?;

        let role = self
            .profiles
            .role_of(&session.user_id)
            .await
            .map_err(|e| AccessError::Lookup(e.to_string()))?;

        match role {
            Some(Role::Admin) => {
                info!(user_id = %session.user_id, "Admin access granted");
                Ok(AdminAccess { session })
            }
            _ => {
                warn!(user_id = %session.user_id, ?role, "Admin access denied");
                Err(AccessError::Forbidden(session.user_id))
            }
        }
    }

    #[instrument(skip(self, access), fields(user_id = %access.session.user_id))]
    pub async fn sign_out(&self, access: AdminAccess) -> Result<(), AccessError> {
        self.sessions
            .sign_out()
            .await
            .map_err(|e| AccessError::Lookup(e.to_string()))
    }

    /// Sign-in/sign-out notifications; consumers re-run [`Self::authorize`].
    pub fn auth_events(&self) -> broadcast::Receiver<AuthEvent> {
        self.sessions.auth_events()
    }
}
