use std::collections::BTreeMap;
use std::future::Future;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;

/// The verbs the backend understands. Anything else is rejected before a
/// request is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub const ALL: &[Method] = &[Self::Get, Self::Post, Self::Put, Self::Patch, Self::Delete];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }

    /// Mutating verbs announce success by default; reads stay quiet.
    pub fn announces_success(self) -> bool {
        !matches!(self, Self::Get)
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
        }
    }
}

impl FromStr for Method {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Self::Get),
            "post" => Ok(Self::Post),
            "put" => Ok(Self::Put),
            "patch" => Ok(Self::Patch),
            "delete" => Ok(Self::Delete),
            _ => Err(ApiError::Validation(format!("Unsupported HTTP method: {s}"))),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentType {
    #[default]
    Json,
    Multipart,
}

impl FromStr for ContentType {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "json" => Ok(Self::Json),
            "form-data" | "multipart" => Ok(Self::Multipart),
            other => Err(ApiError::Validation(format!("Unsupported content type: {other}"))),
        }
    }
}

/// One field of a multipart body.
#[derive(Debug, Clone, PartialEq)]
pub enum FormPart {
    Text {
        name: String,
        value: String,
    },
    File {
        name: String,
        file_name: String,
        bytes: Vec<u8>,
        mime: Option<String>,
    },
}

impl FormPart {
    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::Text {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    Json(Value),
    Multipart(Vec<FormPart>),
}

impl RequestBody {
    pub fn content_type(&self) -> ContentType {
        match self {
            Self::Json(_) => ContentType::Json,
            Self::Multipart(_) => ContentType::Multipart,
        }
    }

    /// Re-encode for the requested content type.
    ///
    /// A flat JSON object becomes one text part per field; `null` fields are
    /// skipped and non-string scalars are sent in their JSON form. Text-only
    /// multipart bodies become a JSON object of strings. Nested values and
    /// file parts cannot cross over.
    pub fn encode_as(self, content_type: ContentType) -> Result<Self, ApiError> {
        if self.content_type() == content_type {
            return Ok(self);
        }
        match self {
            Self::Json(Value::Object(fields)) => {
                let mut parts = Vec::with_capacity(fields.len());
                for (name, value) in fields {
                    let value = match value {
                        Value::Null => continue,
                        Value::String(s) => s,
                        Value::Bool(_) | Value::Number(_) => value.to_string(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(ApiError::Validation(format!(
                                "field {name} cannot be sent as form data"
                            )))
                        }
                    };
                    parts.push(FormPart::text(name, value));
                }
                Ok(Self::Multipart(parts))
            }
            Self::Json(_) => Err(ApiError::Validation(
                "only a JSON object can be sent as form data".into(),
            )),
            Self::Multipart(parts) => {
                let mut fields = serde_json::Map::with_capacity(parts.len());
                for part in parts {
                    match part {
                        FormPart::Text { name, value } => {
                            fields.insert(name, Value::String(value));
                        }
                        FormPart::File { name, .. } => {
                            return Err(ApiError::Validation(format!(
                                "file field {name} cannot be sent as JSON"
                            )))
                        }
                    }
                }
                Ok(Self::Json(Value::Object(fields)))
            }
        }
    }
}

impl From<Value> for RequestBody {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

impl From<Vec<FormPart>> for RequestBody {
    fn from(parts: Vec<FormPart>) -> Self {
        Self::Multipart(parts)
    }
}

/// A fully resolved call, ready for a transport.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }
}

/// A 2xx response.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub data: Value,
    pub status: u16,
    pub headers: BTreeMap<String, String>,
}

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self {
            data,
            status,
            headers: BTreeMap::new(),
        }
    }

    /// The body's `message` field, if any.
    pub fn message(&self) -> Option<&str> {
        self.data
            .get("message")
            .and_then(Value::as_str)
            .filter(|s| !s.trim().is_empty())
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ApiError> {
        serde_json::from_value(self.data.clone()).map_err(|e| ApiError::Decode(e.to_string()))
    }
}

/// Performs one request/response exchange.
pub trait Transport: Send + Sync {
    fn send(
        &self,
        request: ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parse() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("DELETE".parse::<Method>().unwrap(), Method::Delete);
        let err = "head".parse::<Method>().unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert_eq!(err.to_string(), "Unsupported HTTP method: head");
    }

    #[test]
    fn test_success_announcement_defaults() {
        assert!(!Method::Get.announces_success());
        for method in &Method::ALL[1..] {
            assert!(method.announces_success(), "{method}");
        }
    }

    #[test]
    fn test_content_type_parse() {
        assert_eq!("json".parse::<ContentType>().unwrap(), ContentType::Json);
        assert_eq!("form-data".parse::<ContentType>().unwrap(), ContentType::Multipart);
        assert_eq!("multipart".parse::<ContentType>().unwrap(), ContentType::Multipart);
        assert!("xml".parse::<ContentType>().is_err());
    }

    #[test]
    fn test_json_object_encodes_as_form_fields() {
        let body = RequestBody::Json(serde_json::json!({
            "name": "Ada",
            "age": 36,
            "active": true,
            "nickname": null,
        }));
        let RequestBody::Multipart(parts) = body.encode_as(ContentType::Multipart).unwrap() else {
            panic!("expected multipart");
        };
        let mut fields: Vec<(String, String)> = parts
            .into_iter()
            .map(|p| match p {
                FormPart::Text { name, value } => (name, value),
                FormPart::File { .. } => panic!("unexpected file part"),
            })
            .collect();
        fields.sort();
        assert_eq!(
            fields,
            vec![
                ("active".to_string(), "true".to_string()),
                ("age".to_string(), "36".to_string()),
                ("name".to_string(), "Ada".to_string()),
            ]
        );
    }

    #[test]
    fn test_encoding_rejects_what_cannot_cross_over() {
        let nested = RequestBody::Json(serde_json::json!({ "tabs": ["admins"] }));
        assert!(matches!(nested.encode_as(ContentType::Multipart), Err(ApiError::Validation(_))));

        let scalar = RequestBody::Json(serde_json::json!("hello"));
        assert!(matches!(scalar.encode_as(ContentType::Multipart), Err(ApiError::Validation(_))));

        let file = RequestBody::Multipart(vec![FormPart::File {
            name: "profileImage".into(),
            file_name: "me.png".into(),
            bytes: vec![1],
            mime: None,
        }]);
        assert!(matches!(file.encode_as(ContentType::Json), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_text_parts_encode_as_json_and_same_type_is_untouched() {
        let form = RequestBody::Multipart(vec![FormPart::text("email", "a@b.co")]);
        assert_eq!(
            form.encode_as(ContentType::Json).unwrap(),
            RequestBody::Json(serde_json::json!({ "email": "a@b.co" }))
        );

        let json = RequestBody::Json(serde_json::json!([1, 2]));
        assert_eq!(json.clone().encode_as(ContentType::Json).unwrap(), json);
    }

    #[test]
    fn test_response_message_and_decode() {
        #[derive(serde::Deserialize)]
        struct Body {
            count: u32,
        }

        let resp = ApiResponse::new(200, serde_json::json!({ "message": "Saved", "count": 3 }));
        assert_eq!(resp.message(), Some("Saved"));
        assert_eq!(resp.json::<Body>().unwrap().count, 3);

        let resp = ApiResponse::new(200, serde_json::json!([1, 2]));
        assert_eq!(resp.message(), None);
        assert!(matches!(resp.json::<Body>(), Err(ApiError::Decode(_))));
    }
}
