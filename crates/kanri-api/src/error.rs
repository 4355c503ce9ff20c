use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

const GENERIC_MESSAGE: &str = "An error occurred";
const REAUTH_MESSAGE: &str = "Your session has expired. Please sign in again.";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action";
const SERVER_MESSAGE: &str = "Server error occurred. Please try again later.";
const NETWORK_MESSAGE: &str = "Network error - no response received";

/// Every way a request can fail, already normalized for display.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// Rejected locally; never reached the network.
    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Authentication {
        message: String,
        payload: Option<Value>,
    },

    #[error("{message}")]
    Permission {
        message: String,
        payload: Option<Value>,
    },

    #[error("{message}")]
    Server {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// A request was attempted but no response arrived.
    #[error("{message}")]
    Network { message: String, timed_out: bool },

    /// Other 4xx, or a business failure signaled in the body.
    #[error("{message}")]
    Application {
        status: u16,
        message: String,
        payload: Option<Value>,
    },

    /// The response arrived but did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

/// Uniform `{message, statusCode?, payload?}` shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedError {
    pub message: String,
    pub status_code: Option<u16>,
    pub payload: Option<Value>,
}

impl ApiError {
    /// Classify a non-2xx response.
    pub fn from_status(status: u16, payload: Option<Value>) -> Self {
        let body_message = payload.as_ref().and_then(message_from_body);
        match status {
            401 => Self::Authentication {
                message: REAUTH_MESSAGE.to_string(),
                payload,
            },
            403 => Self::Permission {
                message: body_message.unwrap_or_else(|| FORBIDDEN_MESSAGE.to_string()),
                payload,
            },
            500..=599 => Self::Server {
                status,
                message: body_message.unwrap_or_else(|| SERVER_MESSAGE.to_string()),
                payload,
            },
            _ => Self::Application {
                status,
                message: body_message.unwrap_or_else(|| GENERIC_MESSAGE.to_string()),
                payload,
            },
        }
    }

    /// A 2xx response whose body reports failure (`isSuccess: false`).
    pub fn rejected(status: u16, payload: Value) -> Self {
        let message = message_from_body(&payload).unwrap_or_else(|| GENERIC_MESSAGE.to_string());
        Self::Application {
            status,
            message,
            payload: Some(payload),
        }
    }

    pub fn network(timed_out: bool, detail: impl std::fmt::Display) -> Self {
        let message = if timed_out {
            format!("Request timed out: {detail}")
        } else {
            format!("{NETWORK_MESSAGE}: {detail}")
        };
        Self::Network { message, timed_out }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Authentication { .. } => Some(401),
            Self::Permission { .. } => Some(403),
            Self::Server { status, .. } | Self::Application { status, .. } => Some(*status),
            Self::Validation(_) | Self::Network { .. } | Self::Decode(_) => None,
        }
    }

    pub fn payload(&self) -> Option<&Value> {
        match self {
            Self::Authentication { payload, .. }
            | Self::Permission { payload, .. }
            | Self::Server { payload, .. }
            | Self::Application { payload, .. } => payload.as_ref(),
            Self::Validation(_) | Self::Network { .. } | Self::Decode(_) => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, Self::Authentication { .. })
    }

    pub fn normalized(&self) -> NormalizedError {
        NormalizedError {
            message: self.to_string(),
            status_code: self.status_code(),
            payload: self.payload().cloned(),
        }
    }
}

/// `message`, then `error`, from a JSON error body.
fn message_from_body(body: &Value) -> Option<String> {
    ["message", "error"].iter().find_map(|key| {
        body.get(*key)
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_statuses() {
        assert!(matches!(
            ApiError::from_status(401, None),
            ApiError::Authentication { .. }
        ));
        assert!(matches!(
            ApiError::from_status(403, None),
            ApiError::Permission { .. }
        ));
        assert!(matches!(
            ApiError::from_status(500, None),
            ApiError::Server { status: 500, .. }
        ));
        assert!(matches!(
            ApiError::from_status(503, None),
            ApiError::Server { status: 503, .. }
        ));
        assert!(matches!(
            ApiError::from_status(422, None),
            ApiError::Application { status: 422, .. }
        ));
    }

    #[test]
    fn test_message_prefers_body_fields() {
        let err = ApiError::from_status(400, Some(json!({ "message": "Email taken" })));
        assert_eq!(err.to_string(), "Email taken");

        let err = ApiError::from_status(404, Some(json!({ "error": "No such admin" })));
        assert_eq!(err.to_string(), "No such admin");

        let err = ApiError::from_status(400, Some(json!({ "message": "", "error": "fallback" })));
        assert_eq!(err.to_string(), "fallback");

        let err = ApiError::from_status(400, Some(json!("plain text")));
        assert_eq!(err.to_string(), GENERIC_MESSAGE);
    }

    #[test]
    fn test_authentication_message_is_generic() {
        let err = ApiError::from_status(401, Some(json!({ "message": "jwt expired" })));
        assert_eq!(err.to_string(), REAUTH_MESSAGE);
        assert_eq!(err.payload(), Some(&json!({ "message": "jwt expired" })));
    }

    #[test]
    fn test_normalized_shape() {
        let err = ApiError::from_status(403, Some(json!({ "message": "Nope" })));
        let normalized = err.normalized();
        assert_eq!(normalized.message, "Nope");
        assert_eq!(normalized.status_code, Some(403));

        let json = serde_json::to_value(&normalized).unwrap();
        assert_eq!(json["statusCode"], 403);

        let network = ApiError::network(false, "connection refused").normalized();
        assert_eq!(network.status_code, None);
        assert!(network.message.starts_with(NETWORK_MESSAGE));
    }

    #[test]
    fn test_rejected_business_failure() {
        let err = ApiError::rejected(200, json!({ "isSuccess": false, "message": "Invalid credentials" }));
        assert_eq!(err.status_code(), Some(200));
        assert_eq!(err.to_string(), "Invalid credentials");
    }
}
