use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use serde_json::Value;

use crate::error::ApiError;
use crate::transport::{ApiRequest, ApiResponse, FormPart, RequestBody, Transport};

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

const JSON: &str = "application/json";

/// Supplies the bearer token for outgoing requests.
pub trait TokenProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Never authenticates.
#[derive(Debug, Default, Clone, Copy)]
pub struct Anonymous;

impl TokenProvider for Anonymous {
    fn bearer_token(&self) -> Option<String> {
        None
    }
}

/// HTTP client for the kanri backend.
///
/// Classifies responses but never acts on them: a 401 comes back as
/// `ApiError::Authentication` and the caller's error boundary decides what
/// to do with the session.
pub struct HttpClient {
    base_url: String,
    http: Client,
    tokens: Arc<dyn TokenProvider>,
}

impl HttpClient {
    pub fn new(base_url: impl Into<String>, tokens: Arc<dyn TokenProvider>) -> Result<Self, ApiError> {
        Self::with_timeout(base_url, tokens, REQUEST_TIMEOUT)
    }

    fn with_timeout(
        base_url: impl Into<String>,
        tokens: Arc<dyn TokenProvider>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Validation(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
            tokens,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }

    /// Perform one request and classify the outcome.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let ApiRequest {
            method,
            path,
            query,
            body,
        } = request;

        let mut builder = self
            .http
            .request(method.to_reqwest(), self.url(&path))
            .header(ACCEPT, JSON);

        if !query.is_empty() {
            builder = builder.query(&query);
        }
        if let Some(token) = self.tokens.bearer_token().filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        builder = match body {
            Some(RequestBody::Json(value)) => builder.json(&value),
            Some(RequestBody::Multipart(parts)) => builder.multipart(build_form(parts)?),
            None => builder.header(CONTENT_TYPE, JSON),
        };

        tracing::debug!(%method, %path, "Sending request");

        let resp = builder.send().await.map_err(|e| {
            tracing::error!(%method, %path, timed_out = e.is_timeout(), "Network error - no response received: {e}");
            ApiError::network(e.is_timeout(), e)
        })?;

        let status = resp.status().as_u16();
        let headers: BTreeMap<String, String> = resp
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let text = resp
            .text()
            .await
            .map_err(|e| ApiError::network(e.is_timeout(), e))?;
        let data = parse_body(&text);

        if (200..300).contains(&status) {
            return Ok(ApiResponse {
                data,
                status,
                headers,
            });
        }

        match status {
            401 => tracing::warn!(%path, "Unauthorized - session rejected by server"),
            403 => tracing::error!(%path, "Forbidden - you do not have permission"),
            500..=599 => tracing::error!(status, %path, "Server error occurred"),
            _ => tracing::warn!(status, %path, "Request failed"),
        }

        let payload = (!data.is_null()).then_some(data);
        Err(ApiError::from_status(status, payload))
    }
}

impl Transport for HttpClient {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.execute(request).await
    }
}

/// Empty bodies become `null`; non-JSON bodies a JSON string.
fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn build_form(parts: Vec<FormPart>) -> Result<Form, ApiError> {
    let mut form = Form::new();
    for part in parts {
        form = match part {
            FormPart::Text { name, value } => form.text(name, value),
            FormPart::File {
                name,
                file_name,
                bytes,
                mime,
            } => {
                let mut file = Part::bytes(bytes).file_name(file_name);
                if let Some(mime) = mime {
                    file = file
                        .mime_str(&mime)
                        .map_err(|e| ApiError::Validation(format!("invalid MIME type {mime}: {e}")))?;
                }
                form.part(name, file)
            }
        };
    }
    Ok(form)
}
