use std::sync::Arc;

use kanri_api::{ApiError, ErrorBoundary};
use kanri_core::session::SessionStore;

use crate::guard::LOGIN_PATH;
use crate::navigator::Navigator;

/// Top-level boundary: an authentication failure anywhere ends the session
/// and sends the user to the login screen.
pub struct SessionBoundary {
    session: Arc<SessionStore>,
    navigator: Arc<Navigator>,
}

impl SessionBoundary {
    pub fn new(session: Arc<SessionStore>, navigator: Arc<Navigator>) -> Self {
        Self { session, navigator }
    }
}

impl ErrorBoundary for SessionBoundary {
    fn on_error(&self, error: &ApiError) {
        if !error.is_authentication() {
            return;
        }

        tracing::warn!("Unauthorized - clearing session and redirecting to login");
        if let Err(e) = self.session.clear_session() {
            tracing::error!("Failed to clear session after 401: {e}");
        }
        self.navigator.redirect(LOGIN_PATH);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::guard::RouteGuard;
    use kanri_core::storage::{KeyValueStore, MemoryStore, TOKEN_KEY};

    fn setup() -> (SessionBoundary, Arc<SessionStore>, Arc<Navigator>, Arc<MemoryStore>) {
        let storage = Arc::new(MemoryStore::new());
        let session = Arc::new(SessionStore::load(storage.clone()));
        session.set_token(Some("abc".into())).unwrap();
        let navigator = Arc::new(Navigator::new(RouteGuard::new(session.clone())));
        navigator.navigate("/dashboard/admins");
        let boundary = SessionBoundary::new(session.clone(), navigator.clone());
        (boundary, session, navigator, storage)
    }

    #[test]
    fn test_authentication_error_ends_session() {
        let (boundary, session, navigator, storage) = setup();
        boundary.on_error(&ApiError::from_status(401, None));

        assert!(!session.is_authenticated());
        assert_eq!(storage.get(TOKEN_KEY).unwrap(), None);
        assert_eq!(navigator.current(), LOGIN_PATH);
        assert_eq!(navigator.entries(), vec!["/", "/login"]);
    }

    #[test]
    fn test_other_errors_leave_session_alone() {
        let (boundary, session, navigator, _) = setup();
        boundary.on_error(&ApiError::from_status(403, None));
        boundary.on_error(&ApiError::from_status(500, None));
        boundary.on_error(&ApiError::network(true, "timed out"));

        assert!(session.is_authenticated());
        assert_eq!(navigator.current(), "/dashboard/admins");
    }
}
