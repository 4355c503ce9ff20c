use std::sync::Arc;

use kanri_core::session::SessionStore;

use crate::router::Route;

pub const LOGIN_PATH: &str = "/login";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Allow,
    /// Render the login route instead, replacing the history entry.
    Redirect(&'static str),
}

/// Gates protected routes on session presence.
///
/// Synchronous and local: an expired token still passes here and is caught
/// by the next 401.
#[derive(Clone)]
pub struct RouteGuard {
    session: Arc<SessionStore>,
}

impl RouteGuard {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self { session }
    }

    pub fn check(&self, route: &Route) -> GuardDecision {
        if !route.protected || self.session.is_authenticated() {
            return GuardDecision::Allow;
        }
        tracing::debug!(path = %route.path, "Guard denied protected route");
        GuardDecision::Redirect(LOGIN_PATH)
    }
}
