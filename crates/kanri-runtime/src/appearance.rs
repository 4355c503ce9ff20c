use std::sync::{Arc, Mutex};
use std::time::Duration;

use kanri_core::theme::{Appearance, SystemAppearance, ThemeState, ThemeStore};

/// Re-runs `init_theme` whenever the OS color scheme changes.
pub struct AppearanceWatcher {
    theme: Arc<ThemeStore>,
    system: Arc<dyn SystemAppearance>,
    last: Mutex<Appearance>,
}

impl AppearanceWatcher {
    pub fn new(theme: Arc<ThemeStore>, system: Arc<dyn SystemAppearance>) -> Self {
        let last = Mutex::new(system.detect());
        Self {
            theme,
            system,
            last,
        }
    }

    /// One observation. Returns the new theme state if the system
    /// preference moved since the last poll.
    pub fn poll(&self) -> Option<ThemeState> {
        let seen = self.system.detect();
        {
            let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
            if *last == seen {
                return None;
            }
            *last = seen;
        }

        tracing::debug!(%seen, "System appearance changed");
        Some(self.theme.init_theme())
    }
}

/// Poll forever at `period`. Cancel by dropping or aborting the task.
pub async fn watch_system_appearance<F>(watcher: Arc<AppearanceWatcher>, period: Duration, mut on_change: F)
where
    F: FnMut(ThemeState) + Send,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        ticker.tick().await;
        if let Some(state) = watcher.poll() {
            on_change(state);
        }
    }
}
