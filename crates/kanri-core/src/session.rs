use std::sync::{Arc, RwLock};

use chrono::Utc;

use crate::error::KanriError;
use crate::identity::Identity;
use crate::storage::{KeyValueStore, TOKEN_KEY};

/// Holds the bearer token and mirrors it into persistent storage.
///
/// The token is the only thing stored; identity is derived from it on every
/// read. After each mutation the in-memory token and the stored one are
/// identical, or the mutation failed and neither changed.
pub struct SessionStore {
    token: RwLock<Option<String>>,
    storage: Arc<dyn KeyValueStore>,
}

impl SessionStore {
    /// Read the persisted token once. No network validation happens here.
    pub fn load(storage: Arc<dyn KeyValueStore>) -> Self {
        let token = match storage.get(TOKEN_KEY) {
            Ok(token) => normalize(token),
            Err(e) => {
                tracing::warn!("Failed to read persisted token, starting signed out: {e}");
                None
            }
        };

        Self {
            token: RwLock::new(token),
            storage,
        }
    }

    /// Replace the token. `None` or an empty string signs out.
    pub fn set_token(&self, token: Option<String>) -> Result<(), KanriError> {
        let token = normalize(token);
        let mut current = self.token.write().unwrap_or_else(|e| e.into_inner());

        match &token {
            Some(value) => self.storage.set(TOKEN_KEY, value)?,
            None => self.storage.remove(TOKEN_KEY)?,
        }

        tracing::debug!(signed_in = token.is_some(), "Session token updated");
        *current = token;
        Ok(())
    }

    pub fn clear_session(&self) -> Result<(), KanriError> {
        self.set_token(None)
    }

    /// The raw token, for attaching to requests.
    pub fn token(&self) -> Option<String> {
        self.token.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Presence, not validity: an expired token still counts until the
    /// backend rejects it.
    pub fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .is_some()
    }

    /// Decode the token's claims. Undecodable tokens yield `None`.
    pub fn identity(&self) -> Option<Identity> {
        let token = self.token()?;
        match Identity::decode(&token) {
            Ok(identity) => {
                if identity.is_expired(Utc::now()) {
                    tracing::warn!("Session token is past its exp claim");
                }
                Some(identity)
            }
            Err(e) => {
                tracing::warn!("Invalid session token: {e}");
                None
            }
        }
    }

    pub fn admin_id(&self) -> Option<String> {
        self.identity()?.subject
    }

    pub fn admin_name(&self) -> Option<String> {
        self.identity()?.name
    }
}

fn normalize(token: Option<String>) -> Option<String> {
    token.filter(|t| !t.is_empty())
}
