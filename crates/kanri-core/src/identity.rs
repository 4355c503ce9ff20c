//! Decoding of the claims carried inside a JWT bearer token.
//!
//! Only the payload segment is read. Signatures are never checked here: the
//! backend is the authority on validity, the client just wants to know who
//! it is talking as.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("token is not a three-part JWT")]
    Malformed,

    #[error("payload is not valid base64url: {0}")]
    Base64(String),

    #[error("payload is not a JSON object: {0}")]
    Json(String),
}

/// Claims decoded from the session token.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub is_super_admin: bool,
    pub issued_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub claims: Map<String, Value>,
}

impl Identity {
    pub fn decode(token: &str) -> Result<Self, DecodeError> {
        let mut parts = token.split('.');
        let (Some(_header), Some(payload), Some(_signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(DecodeError::Malformed);
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| DecodeError::Base64(e.to_string()))?;
        let claims: Map<String, Value> =
            serde_json::from_slice(&bytes).map_err(|e| DecodeError::Json(e.to_string()))?;

        Ok(Self::from_claims(claims))
    }

    fn from_claims(claims: Map<String, Value>) -> Self {
        let subject = first_string(&claims, &["_id", "id", "sub"]);
        let name = first_string(&claims, &["name", "username"]);
        let email = first_string(&claims, &["email"]);

        let mut roles = Vec::new();
        if let Some(role) = claims.get("role").and_then(Value::as_str) {
            roles.push(role.to_string());
        }
        if let Some(list) = claims.get("roles").and_then(Value::as_array) {
            roles.extend(list.iter().filter_map(Value::as_str).map(str::to_string));
        }

        let is_super_admin = claims
            .get("isSuperAdmin")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        Self {
            subject,
            name,
            email,
            roles,
            is_super_admin,
            issued_at: timestamp(&claims, "iat"),
            expires_at: timestamp(&claims, "exp"),
            claims,
        }
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case(role))
    }

    /// Whether the `exp` claim lies in the past. Tokens without one never expire.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|exp| exp <= now)
    }
}

fn first_string(claims: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match claims.get(*key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn timestamp(claims: &Map<String, Value>, key: &str) -> Option<DateTime<Utc>> {
    let secs = claims.get(key)?.as_f64()?;
    DateTime::from_timestamp(secs as i64, 0)
}

/// Build an unsigned token around `claims`. Test helper for this crate and
/// its dependents.
#[doc(hidden)]
pub fn encode_unsigned(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.sig")
}
