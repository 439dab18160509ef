use std::sync::Arc;
use tracing::{debug, info, warn};

use super::state::{has_valid_session, Session};
use super::storage::SessionStore;
use crate::api::{CareApi, LoginResponse, UserProfile};
use crate::constants::{CONNECTION_FAILED, LOGIN_FAILED, TOKEN_SLOT, USER_SLOT};
use crate::utils::CompanionError;

/// Owns the authentication state and its durable copy
pub struct SessionManager {
    api: Arc<dyn CareApi>,
    store: Arc<dyn SessionStore>,
    current: Option<Session>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn CareApi>, store: Arc<dyn SessionStore>) -> Self {
        Self {
            api,
            store,
            current: None,
        }
    }

    /// The session currently held in memory
    pub fn current(&self) -> Option<&Session> {
        self.current.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        has_valid_session(self.current())
    }

    /// The service boundary this manager authenticates against
    pub fn api(&self) -> Arc<dyn CareApi> {
        Arc::clone(&self.api)
    }

    /// Rebuild the session from the durable slots, without asking the service
    ///
    /// A restored token is trusted until the service rejects it; see
    /// [`SessionManager::verify_session`] for the opt-in round trip.
    pub fn restore_session(&mut self) -> Option<Session> {
        let token = match self.store.get(TOKEN_SLOT) {
            Ok(Some(token)) if !token.trim().is_empty() => token.trim().to_string(),
            Ok(_) => {
                debug!("No stored session token");
                self.current = None;
                return None;
            }
            Err(e) => {
                warn!(error = %e, "Could not read the stored session token");
                self.current = None;
                return None;
            }
        };

        let profile = match self.store.get(USER_SLOT) {
            Ok(Some(blob)) => serde_json::from_str::<UserProfile>(&blob)
                .map_err(|e| warn!(error = %e, "Stored user profile is unreadable"))
                .ok(),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "Could not read the stored user profile");
                None
            }
        };

        match profile {
            Some(profile) => {
                let session = Session::new(token, profile);
                info!(user_id = session.user_id, "Restored session");
                self.current = Some(session.clone());
                Some(session)
            }
            None => {
                // Token without a usable profile: the slots disagree, drop both
                warn!("Discarding stored token without a matching profile");
                if let Err(e) = self.clear_slots() {
                    warn!(error = %e, "Could not clear inconsistent session slots");
                }
                self.current = None;
                None
            }
        }
    }

    /// Check a restored session with `GET /auth/profile`
    ///
    /// Returns whether a session is still held afterwards. Only a 401/403
    /// clears it; an unreachable or failing service keeps it.
    pub async fn verify_session(&mut self) -> bool {
        let Some(token) = self.current.as_ref().map(|s| s.token.clone()) else {
            return false;
        };

        match self.api.profile(&token).await {
            Ok(profile) => {
                let refreshed = Session::new(token, profile);
                if let Err(e) = self.persist(&refreshed) {
                    warn!(error = %e, "Could not store the refreshed profile");
                }
                self.current = Some(refreshed);
                true
            }
            Err(CompanionError::Unauthorized(e)) => {
                warn!(error = %e, "Restored session was rejected");
                if let Err(e) = self.logout() {
                    warn!(error = %e, "Could not clear the rejected session");
                }
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not verify the restored session, keeping it");
                true
            }
        }
    }

    /// Sign in and persist the new session, replacing any previous one
    pub async fn login(&mut self, email: &str, password: &str) -> Result<Session, CompanionError> {
        let response = match self.api.login(email, password).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login request failed");
                return Err(CompanionError::AuthError(CONNECTION_FAILED.to_string()));
            }
        };

        let LoginResponse { token, user, error } = response;
        match (token, user) {
            (Some(token), Some(user)) if !token.is_empty() => {
                let session = Session::new(token, user);
                self.persist(&session)?;
                info!(user_id = session.user_id, "Signed in");
                self.current = Some(session.clone());
                Ok(session)
            }
            _ => {
                let message = error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| LOGIN_FAILED.to_string());
                info!(reason = %message, "Login refused");
                Err(CompanionError::AuthError(message))
            }
        }
    }

    /// Forget the session, in memory and on disk. Safe to call when signed out.
    pub fn logout(&mut self) -> Result<(), CompanionError> {
        let had_session = self.current.take().is_some();
        self.clear_slots()?;
        if had_session {
            info!("Signed out");
        }
        Ok(())
    }

    fn persist(&self, session: &Session) -> Result<(), CompanionError> {
        let profile = serde_json::to_string(&session.profile)?;
        let written = self
            .store
            .set(TOKEN_SLOT, &session.token)
            .and_then(|_| self.store.set(USER_SLOT, &profile));

        if written.is_err() {
            if let Err(e) = self.clear_slots() {
                warn!(error = %e, "Could not roll back a partially written session");
            }
        }
        written
    }

    fn clear_slots(&self) -> Result<(), CompanionError> {
        self.store.remove(TOKEN_SLOT)?;
        self.store.remove(USER_SLOT)
    }
}
