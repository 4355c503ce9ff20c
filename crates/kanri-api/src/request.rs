use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::{ApiError, NormalizedError};
use crate::notify::{ErrorBoundary, Notice, NoticeKind, Notifier};
use crate::transport::{ApiRequest, ApiResponse, ContentType, Method, RequestBody, Transport};

const DEFAULT_SUCCESS: &str = "Operation completed successfully";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

#[derive(Debug, Default)]
struct HookState {
    status: RequestStatus,
    error: Option<NormalizedError>,
}

/// Per-call knobs. `query` is only honored by GET.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
    /// Re-encode the body before sending. `None` sends it as built.
    pub content_type: Option<ContentType>,
    pub show_success_toast: Option<bool>,
    pub success_message: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn body(mut self, body: impl Into<RequestBody>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    pub fn show_success_toast(mut self, show: bool) -> Self {
        self.show_success_toast = Some(show);
        self
    }

    /// Shorthand for `show_success_toast(false)`.
    pub fn silent(self) -> Self {
        self.show_success_toast(false)
    }

    pub fn success_message(mut self, message: impl Into<String>) -> Self {
        self.success_message = Some(message.into());
        self
    }
}

/// Verb-level façade over a `Transport`.
///
/// Each instance tracks the state of its latest call. Overlapping calls on
/// one instance all reach the network, but whichever finishes last owns
/// `status`/`error`. Use [`RequestHook::fresh`] for isolated state.
/// Clones share state.
pub struct RequestHook<T> {
    transport: Arc<T>,
    notifier: Arc<dyn Notifier>,
    boundary: Option<Arc<dyn ErrorBoundary>>,
    state: Arc<Mutex<HookState>>,
}

impl<T> Clone for RequestHook<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
            notifier: Arc::clone(&self.notifier),
            boundary: self.boundary.clone(),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T: Transport> RequestHook<T> {
    pub fn new(transport: Arc<T>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            boundary: None,
            state: Arc::default(),
        }
    }

    pub fn with_boundary(mut self, boundary: Arc<dyn ErrorBoundary>) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Same transport, notifier and boundary; independent state.
    pub fn fresh(&self) -> Self {
        Self {
            state: Arc::default(),
            ..self.clone()
        }
    }

    pub fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub fn is_loading(&self) -> bool {
        self.state().status == RequestStatus::Loading
    }

    pub fn status(&self) -> RequestStatus {
        self.state().status
    }

    pub fn error(&self) -> Option<NormalizedError> {
        self.state().error.clone()
    }

    pub fn clear_error(&self) {
        self.state().error = None;
    }

    /// Untyped entry point: the verb arrives as a string and is validated
    /// before anything else happens.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let method = match method.parse::<Method>() {
            Ok(method) => method,
            Err(err) => {
                self.fail(&err);
                return Err(err);
            }
        };
        self.send(method, path, options).await
    }

    pub async fn send(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        {
            let mut state = self.state();
            state.status = RequestStatus::Loading;
            state.error = None;
        }

        let RequestOptions {
            query,
            body,
            content_type,
            show_success_toast,
            success_message,
        } = options;

        let body = match (body, content_type) {
            (Some(body), Some(content_type)) => match body.encode_as(content_type) {
                Ok(body) => Some(body),
                Err(err) => {
                    self.fail(&err);
                    return Err(err);
                }
            },
            (body, _) => body,
        };

        let mut request = ApiRequest::new(method, path);
        if method == Method::Get {
            request.query = query;
            if body.is_some() {
                tracing::debug!(path, "Ignoring body on GET request");
            }
        } else {
            if !query.is_empty() {
                tracing::debug!(%method, path, "Ignoring query parameters on non-GET request");
            }
            request.body = body;
        }

        match self.transport.send(request).await {
            Ok(response) => {
                self.state().status = RequestStatus::Success;

                if show_success_toast.unwrap_or_else(|| method.announces_success()) {
                    let message = success_message
                        .or_else(|| response.message().map(str::to_string))
                        .unwrap_or_else(|| DEFAULT_SUCCESS.to_string());
                    self.notifier.notify(Notice::new(NoticeKind::Success, message));
                }
                Ok(response)
            }
            Err(err) => {
                self.fail(&err);
                Err(err)
            }
        }
    }

    pub async fn get(&self, path: &str, options: RequestOptions) -> Result<ApiResponse, ApiError> {
        self.send(Method::Get, path, options).await
    }

    pub async fn post(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::Post, path, options.body(body)).await
    }

    pub async fn put(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::Put, path, options.body(body)).await
    }

    pub async fn patch(
        &self,
        path: &str,
        body: impl Into<RequestBody>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        self.send(Method::Patch, path, options.body(body)).await
    }

    pub async fn delete(
        &self,
        path: &str,
        body: Option<RequestBody>,
        options: RequestOptions,
    ) -> Result<ApiResponse, ApiError> {
        let options = RequestOptions { body, ..options };
        self.send(Method::Delete, path, options).await
    }

    /// Record, announce, then escalate. The caller still gets the error.
    fn fail(&self, err: &ApiError) {
        {
            let mut state = self.state();
            state.status = RequestStatus::Error;
            state.error = Some(err.normalized());
        }
        self.notifier
            .notify(Notice::new(NoticeKind::Error, err.to_string()));
        if let Some(boundary) = &self.boundary {
            boundary.on_error(err);
        }
    }

    fn state(&self) -> MutexGuard<'_, HookState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }
}
