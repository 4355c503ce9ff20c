use std::sync::{Mutex, MutexGuard};

use serde::Serialize;

use crate::guard::{GuardDecision, RouteGuard};
use crate::router::{self, normalize_path, Layout, Page};

/// What ends up on screen after a navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub path: String,
    pub page: Page,
    pub layout: Layout,
    /// The guard sent us somewhere else.
    pub redirected: bool,
}

/// In-memory browser history with guard-aware rendering.
pub struct Navigator {
    history: Mutex<Vec<String>>,
    guard: RouteGuard,
}

impl Navigator {
    pub fn new(guard: RouteGuard) -> Self {
        Self {
            history: Mutex::new(vec!["/".to_string()]),
            guard,
        }
    }

    pub fn current(&self) -> String {
        self.history().last().cloned().unwrap_or_else(|| "/".to_string())
    }

    pub fn entries(&self) -> Vec<String> {
        self.history().clone()
    }

    pub fn push(&self, path: &str) {
        self.history().push(normalize_path(path));
    }

    pub fn replace(&self, path: &str) {
        let path = normalize_path(path);
        let mut history = self.history();
        match history.last_mut() {
            Some(last) => *last = path,
            None => history.push(path),
        }
    }

    /// Pop one entry. The first entry is never popped.
    pub fn back(&self) -> Option<String> {
        let mut history = self.history();
        if history.len() < 2 {
            return None;
        }
        history.pop();
        history.last().cloned()
    }

    /// Push `path` and render it.
    pub fn navigate(&self, path: &str) -> Rendered {
        self.push(path);
        self.render()
    }

    /// Replace the current entry with `path` and render it.
    pub fn redirect(&self, path: &str) -> Rendered {
        self.replace(path);
        self.render()
    }

    /// Resolve the current entry through the guard. A denied route is
    /// swapped for its redirect target in place.
    pub fn render(&self) -> Rendered {
        let route = router::resolve(&self.current());
        match self.guard.check(&route) {
            GuardDecision::Allow => Rendered {
                path: route.path,
                page: route.page,
                layout: route.layout,
                redirected: false,
            },
            GuardDecision::Redirect(target) => {
                self.replace(target);
                let route = router::resolve(target);
                Rendered {
                    path: route.path,
                    page: route.page,
                    layout: route.layout,
                    redirected: true,
                }
            }
        }
    }

    fn history(&self) -> MutexGuard<'_, Vec<String>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}
