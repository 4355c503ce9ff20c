//! Wiring for the kanri dashboard: stores, request pipeline, routing and
//! the flows that tie them together.

pub mod appearance;
pub mod boundary;
pub mod forms;
pub mod guard;
pub mod navigator;
pub mod notices;
pub mod router;

use std::sync::Arc;

use kanri_api::{
    AdminApi, ApiError, HttpClient, Notice, NoticeKind, Notifier, RequestHook, TokenProvider,
    Transport,
};
use kanri_core::config::AppConfig;
use kanri_core::error::KanriError;
use kanri_core::session::SessionStore;
use kanri_core::storage::{FileStore, KeyValueStore};
use kanri_core::theme::{DarkFlag, OsAppearance, SystemAppearance, ThemeStore};

use appearance::AppearanceWatcher;
use boundary::SessionBoundary;
use forms::{FormErrors, LoginForm};
use guard::{RouteGuard, LOGIN_PATH};
use navigator::{Navigator, Rendered};
use notices::NoticeBoard;

pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error(transparent)]
    Core(#[from] KanriError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("invalid form: {0}")]
    Invalid(FormErrors),
    #[error("login rejected: {0}")]
    LoginRejected(String),
}

/// Feeds the session token to the HTTP client.
pub struct SessionTokens(pub Arc<SessionStore>);

impl TokenProvider for SessionTokens {
    fn bearer_token(&self) -> Option<String> {
        self.0.token()
    }
}

/// Everything a screen needs, built once per process.
pub struct Runtime<T = HttpClient> {
    config: AppConfig,
    session: Arc<SessionStore>,
    theme: Arc<ThemeStore>,
    dark: Arc<DarkFlag>,
    system: Arc<dyn SystemAppearance>,
    navigator: Arc<Navigator>,
    notices: Arc<NoticeBoard>,
    hook: RequestHook<T>,
}

impl Runtime<HttpClient> {
    /// Production wiring: file-backed storage in the data dir, real HTTP,
    /// OS color scheme.
    pub fn new(config: AppConfig) -> Result<Self, RuntimeError> {
        let storage: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(AppConfig::storage_path())?);
        Self::with_storage(config, storage)
    }

    pub fn with_storage(config: AppConfig, storage: Arc<dyn KeyValueStore>) -> Result<Self, RuntimeError> {
        let session = Arc::new(SessionStore::load(storage.clone()));
        let client = HttpClient::new(
            config.api.base_url.as_str(),
            Arc::new(SessionTokens(session.clone())),
        )?;
        Ok(Self::assemble(
            config,
            storage,
            session,
            Arc::new(client),
            Arc::new(OsAppearance),
        ))
    }
}

impl<T: Transport> Runtime<T> {
    /// Wire the pieces together and apply the persisted theme.
    pub fn assemble(
        config: AppConfig,
        storage: Arc<dyn KeyValueStore>,
        session: Arc<SessionStore>,
        transport: Arc<T>,
        system: Arc<dyn SystemAppearance>,
    ) -> Self {
        let dark = Arc::new(DarkFlag::new());
        let theme = Arc::new(ThemeStore::load(storage, system.clone(), dark.clone()));
        theme.init_theme();

        let navigator = Arc::new(Navigator::new(RouteGuard::new(session.clone())));
        let notices = Arc::new(NoticeBoard::new());
        let boundary = Arc::new(SessionBoundary::new(session.clone(), navigator.clone()));
        let hook = RequestHook::new(transport, notices.clone()).with_boundary(boundary);

        Self {
            config,
            session,
            theme,
            dark,
            system,
            navigator,
            notices,
            hook,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn theme(&self) -> &Arc<ThemeStore> {
        &self.theme
    }

    pub fn dark_flag(&self) -> &DarkFlag {
        &self.dark
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    /// The shared hook. Use [`RequestHook::fresh`] for isolated state.
    pub fn hook(&self) -> &RequestHook<T> {
        &self.hook
    }

    pub fn admin(&self) -> AdminApi<'_, T> {
        AdminApi::new(&self.hook)
    }

    pub fn appearance_watcher(&self) -> AppearanceWatcher {
        AppearanceWatcher::new(self.theme.clone(), self.system.clone())
    }

    pub fn navigate(&self, path: &str) -> Rendered {
        self.navigator.navigate(path)
    }

    /// Validate, authenticate, store the token, then enter the dashboard.
    pub async fn login(&self, form: LoginForm) -> Result<Rendered, RuntimeError> {
        let errors = form.validate();
        if !errors.is_empty() {
            return Err(RuntimeError::Invalid(errors));
        }

        let resp = self.admin().login(form.email.trim(), &form.password).await?;
        let token = resp
            .token
            .filter(|t| resp.is_success && !t.is_empty());

        let Some(token) = token else {
            let message = resp.message.unwrap_or_else(|| "Login failed".to_string());
            self.notices
                .notify(Notice::new(NoticeKind::Error, message.as_str()));
            return Err(RuntimeError::LoginRejected(message));
        };

        self.session.set_token(Some(token))?;
        tracing::info!("Signed in");
        self.notices
            .notify(Notice::new(NoticeKind::Success, "Login successful"));
        Ok(self.navigator.navigate(DASHBOARD_PATH))
    }

    pub fn logout(&self) -> Result<Rendered, RuntimeError> {
        self.session.clear_session()?;
        tracing::info!("Signed out");
        self.notices
            .notify(Notice::new(NoticeKind::Info, "You have been signed out"));
        Ok(self.navigator.redirect(LOGIN_PATH))
    }
}
