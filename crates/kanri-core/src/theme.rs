//! Light/dark/system theme preference.
//!
//! `ThemeMode` is what the user chose and what gets persisted. `Appearance`
//! is what is actually shown: equal to the mode, except that `System`
//! follows the operating environment's color scheme.

use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::KanriError;
use crate::storage::{KeyValueStore, THEME_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemeMode {
    pub const ALL: &[ThemeMode] = &[Self::Light, Self::Dark, Self::System];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }
}

impl FromStr for ThemeMode {
    type Err = KanriError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Self::Light),
            "dark" => Ok(Self::Dark),
            "system" => Ok(Self::System),
            other => Err(KanriError::Config(format!("unknown theme mode: {other}"))),
        }
    }
}

impl std::fmt::Display for ThemeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete, displayable theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Appearance {
    Light,
    Dark,
}

impl Appearance {
    pub fn opposite(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// The explicit mode that pins this appearance.
    pub fn as_mode(self) -> ThemeMode {
        match self {
            Self::Light => ThemeMode::Light,
            Self::Dark => ThemeMode::Dark,
        }
    }
}

impl std::fmt::Display for Appearance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Light => "light",
            Self::Dark => "dark",
        })
    }
}

/// Source of the environment's color-scheme preference.
pub trait SystemAppearance: Send + Sync {
    fn detect(&self) -> Appearance;
}

/// Asks the OS through `dark-light`. Anything but an explicit dark answer
/// counts as light.
#[derive(Debug, Default, Clone, Copy)]
pub struct OsAppearance;

impl SystemAppearance for OsAppearance {
    fn detect(&self) -> Appearance {
        match dark_light::detect() {
            Ok(dark_light::Mode::Dark) => Appearance::Dark,
            Ok(_) => Appearance::Light,
            Err(e) => {
                tracing::debug!("Color scheme detection failed, assuming light: {e}");
                Appearance::Light
            }
        }
    }
}

/// Receives the resolved appearance: the document-level dark flag.
pub trait AppearanceSink: Send + Sync {
    fn apply(&self, appearance: Appearance);
}

/// Shared dark/light flag read by the presentation layer.
#[derive(Debug, Default)]
pub struct DarkFlag {
    dark: AtomicBool,
}

impl DarkFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dark(&self) -> bool {
        self.dark.load(Ordering::Relaxed)
    }
}

impl AppearanceSink for DarkFlag {
    fn apply(&self, appearance: Appearance) {
        self.dark.store(appearance.is_dark(), Ordering::Relaxed);
    }
}

/// Snapshot of the theme state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub current: Appearance,
}

pub struct ThemeStore {
    state: RwLock<ThemeState>,
    storage: Arc<dyn KeyValueStore>,
    system: Arc<dyn SystemAppearance>,
    sink: Arc<dyn AppearanceSink>,
}

impl ThemeStore {
    /// Build the initial state from the persisted mode. Nothing is applied to
    /// the sink until `init_theme` runs.
    pub fn load(
        storage: Arc<dyn KeyValueStore>,
        system: Arc<dyn SystemAppearance>,
        sink: Arc<dyn AppearanceSink>,
    ) -> Self {
        let mode = persisted_mode(storage.as_ref());
        let current = resolve(mode, system.as_ref());
        Self {
            state: RwLock::new(ThemeState { mode, current }),
            storage,
            system,
            sink,
        }
    }

    pub fn state(&self) -> ThemeState {
        *self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    pub fn mode(&self) -> ThemeMode {
        self.state().mode
    }

    pub fn current(&self) -> Appearance {
        self.state().current
    }

    /// Choose a mode, resolving `System` against the live preference.
    pub fn set_theme(&self, mode: ThemeMode) -> Result<ThemeState, KanriError> {
        self.update(|_| ThemeState {
            mode,
            current: resolve(mode, self.system.as_ref()),
        })
    }

    /// Flip light/dark. Leaves system-follow mode: the result is always an
    /// explicit mode.
    pub fn toggle_theme(&self) -> Result<ThemeState, KanriError> {
        self.update(|state| {
            let current = state.current.opposite();
            ThemeState {
                mode: current.as_mode(),
                current,
            }
        })
    }

    /// Re-read the persisted mode and re-resolve against the environment.
    /// Runs at startup and whenever the system color scheme changes.
    pub fn init_theme(&self) -> ThemeState {
        let mode = persisted_mode(self.storage.as_ref());
        let next = ThemeState {
            mode,
            current: resolve(mode, self.system.as_ref()),
        };

        *self.state.write().unwrap_or_else(|e| e.into_inner()) = next;
        self.sink.apply(next.current);
        next
    }

    /// Compute, persist and store the next state under one write lock.
    fn update(
        &self,
        next: impl FnOnce(ThemeState) -> ThemeState,
    ) -> Result<ThemeState, KanriError> {
        let mut state = self.state.write().unwrap_or_else(|e| e.into_inner());
        let next = next(*state);
        self.storage.set(THEME_KEY, next.mode.as_str())?;
        *state = next;
        drop(state);

        self.sink.apply(next.current);
        tracing::debug!(mode = %next.mode, current = %next.current, "Theme updated");
        Ok(next)
    }
}

fn resolve(mode: ThemeMode, system: &dyn SystemAppearance) -> Appearance {
    match mode {
        ThemeMode::Light => Appearance::Light,
        ThemeMode::Dark => Appearance::Dark,
        ThemeMode::System => system.detect(),
    }
}

/// Persisted mode, defaulting to `System` when absent, invalid or unreadable.
fn persisted_mode(storage: &dyn KeyValueStore) -> ThemeMode {
    match storage.get(THEME_KEY) {
        Ok(Some(saved)) => saved.parse().unwrap_or_else(|_| {
            tracing::debug!(%saved, "Ignoring invalid persisted theme");
            ThemeMode::System
        }),
        Ok(None) => ThemeMode::System,
        Err(e) => {
            tracing::warn!("Failed to read persisted theme: {e}");
            ThemeMode::System
        }
    }
}
