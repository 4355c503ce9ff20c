//! Typed admin endpoints on top of the request hook.

pub mod types;

use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::request::{RequestHook, RequestOptions};
use crate::transport::{ApiResponse, FormPart, RequestBody, Transport};

pub use types::{
    Admin, AdminPage, AdminUpdate, FilterResponse, LoginRequest, LoginResponse, PageInfo,
    PasswordChange, ProfileImage, ProfileUpdate,
};

const LOGIN: &str = "/admin/login";
const FILTER: &str = "/admin/get-by-filter";
const PROFILE: &str = "/admin/profile";
const CHANGE_PASSWORD: &str = "/admin/change-password";

/// Admin backend calls. Every call goes through the hook, so loading state,
/// notices and the error boundary apply as usual.
pub struct AdminApi<'a, T> {
    hook: &'a RequestHook<T>,
}

impl<'a, T: Transport> AdminApi<'a, T> {
    pub fn new(hook: &'a RequestHook<T>) -> Self {
        Self { hook }
    }

    /// The caller decides what to announce, so no success toast here.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let body = json_body(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let resp = self
            .hook
            .post(LOGIN, body, RequestOptions::new().silent())
            .await?;
        resp.json()
    }

    /// One page of admins. A response flagged unsuccessful yields an empty
    /// page rather than an error.
    pub async fn list(&self, page: u32, size: u32) -> Result<AdminPage, ApiError> {
        let options = RequestOptions::new()
            .query("page", page)
            .query("limit", size);
        let resp = self.hook.get(FILTER, options).await?;
        let filter: FilterResponse = resp.json()?;

        if !filter.is_success {
            tracing::error!(page, size, "API returned unsuccessful response");
            return Ok(AdminPage::default());
        }
        Ok(filter.filtered_data.unwrap_or_default())
    }

    pub async fn update(&self, id: &str, update: &AdminUpdate) -> Result<ApiResponse, ApiError> {
        let body = json_body(update)?;
        self.hook
            .put(&format!("/admin/{id}"), body, RequestOptions::new())
            .await
    }

    pub async fn delete(&self, id: &str) -> Result<ApiResponse, ApiError> {
        self.hook
            .delete(&format!("/admin/{id}"), None, RequestOptions::new())
            .await
    }

    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<ApiResponse, ApiError> {
        let mut parts = vec![
            FormPart::text("name", update.name),
            FormPart::text("email", update.email),
        ];
        if let Some(image) = update.image {
            parts.push(FormPart::File {
                name: "profileImage".to_string(),
                file_name: image.file_name,
                bytes: image.bytes,
                mime: image.mime,
            });
        }
        self.hook
            .put(
                PROFILE,
                RequestBody::Multipart(parts),
                RequestOptions::new().success_message("Profile updated successfully!"),
            )
            .await
    }

    pub async fn change_password(&self, change: &PasswordChange) -> Result<ApiResponse, ApiError> {
        let body = json_body(change)?;
        self.hook
            .patch(
                CHANGE_PASSWORD,
                body,
                RequestOptions::new().success_message("Password updated successfully!"),
            )
            .await
    }
}

fn json_body<S: Serialize>(value: &S) -> Result<Value, ApiError> {
    serde_json::to_value(value)
        .map_err(|e| ApiError::Validation(format!("failed to encode request body: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Notice, NoticeKind, Notifier};
    use crate::transport::{ApiRequest, Method};
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    struct Canned {
        reply: Value,
        seen: Mutex<Vec<ApiRequest>>,
    }

    impl Transport for Canned {
        async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
            self.seen.lock().unwrap().push(request);
            Ok(ApiResponse::new(200, self.reply.clone()))
        }
    }

    #[derive(Default)]
    struct Notices(Mutex<Vec<Notice>>);

    impl Notifier for Notices {
        fn notify(&self, notice: Notice) {
            self.0.lock().unwrap().push(notice);
        }
    }

    fn setup(reply: Value) -> (RequestHook<Canned>, Arc<Notices>) {
        let notices = Arc::new(Notices::default());
        let transport = Arc::new(Canned {
            reply,
            seen: Mutex::new(Vec::new()),
        });
        (RequestHook::new(transport, notices.clone()), notices)
    }

    fn last_request(hook: &RequestHook<Canned>) -> ApiRequest {
        hook.transport().seen.lock().unwrap().last().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_login_posts_credentials_quietly() {
        let (hook, notices) = setup(json!({ "isSuccess": true, "token": "abc" }));
        let resp = AdminApi::new(&hook).login("a@b.co", "secret1").await.unwrap();

        assert!(resp.is_success);
        assert_eq!(resp.token.as_deref(), Some("abc"));
        let req = last_request(&hook);
        assert_eq!(req.method, Method::Post);
        assert_eq!(req.path, LOGIN);
        assert_eq!(
            req.body,
            Some(RequestBody::Json(json!({ "email": "a@b.co", "password": "secret1" })))
        );
        assert!(notices.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_unwraps_filtered_data() {
        let (hook, _) = setup(json!({
            "isSuccess": true,
            "filteredData": {
                "admins": [{ "_id": "1", "name": "Ada", "email": "ada@example.com" }],
                "pagination": { "page": 2, "size": 25, "totalItems": 26, "totalPages": 2 }
            }
        }));
        let page = AdminApi::new(&hook).list(2, 25).await.unwrap();

        assert_eq!(page.admins.len(), 1);
        assert_eq!(page.pagination.total_items, 26);
        let req = last_request(&hook);
        assert_eq!(
            req.query,
            vec![("page".to_string(), "2".to_string()), ("limit".to_string(), "25".to_string())]
        );
    }

    #[tokio::test]
    async fn test_unsuccessful_list_is_empty_page() {
        let (hook, _) = setup(json!({ "isSuccess": false }));
        let page = AdminApi::new(&hook).list(1, 10).await.unwrap();
        assert!(page.admins.is_empty());
        assert_eq!(page.pagination.total_items, 0);
    }

    #[tokio::test]
    async fn test_malformed_list_is_decode_error() {
        let (hook, _) = setup(json!({ "isSuccess": true, "filteredData": { "admins": 3 } }));
        let err = AdminApi::new(&hook).list(1, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }

    #[tokio::test]
    async fn test_update_and_delete_target_admin_id() {
        let (hook, notices) = setup(json!({ "message": "Admin updated" }));
        let api = AdminApi::new(&hook);

        let update = AdminUpdate {
            name: "Ada".into(),
            email: "ada@example.com".into(),
        };
        api.update("42", &update).await.unwrap();
        let req = last_request(&hook);
        assert_eq!((req.method, req.path.as_str()), (Method::Put, "/admin/42"));

        api.delete("42").await.unwrap();
        let req = last_request(&hook);
        assert_eq!((req.method, req.path.as_str()), (Method::Delete, "/admin/42"));
        assert!(req.body.is_none());

        let notices = notices.0.lock().unwrap();
        assert_eq!(notices.len(), 2);
        assert!(notices.iter().all(|n| n.kind == NoticeKind::Success));
    }

    #[tokio::test]
    async fn test_profile_update_is_multipart() {
        let (hook, notices) = setup(Value::Null);
        let update = ProfileUpdate {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            image: Some(ProfileImage {
                file_name: "me.png".into(),
                bytes: vec![0x89, 0x50],
                mime: Some("image/png".into()),
            }),
        };
        AdminApi::new(&hook).update_profile(update).await.unwrap();

        let req = last_request(&hook);
        let Some(RequestBody::Multipart(parts)) = req.body else {
            panic!("expected multipart body");
        };
        let names: Vec<&str> = parts.iter().map(FormPart::name).collect();
        assert_eq!(names, vec!["name", "email", "profileImage"]);
        assert_eq!(
            notices.0.lock().unwrap()[0].message,
            "Profile updated successfully!"
        );
    }

    #[tokio::test]
    async fn test_change_password_patches() {
        let (hook, _) = setup(Value::Null);
        let change = PasswordChange {
            current_password: "old-pass".into(),
            new_password: "new-password".into(),
        };
        AdminApi::new(&hook).change_password(&change).await.unwrap();

        let req = last_request(&hook);
        assert_eq!(req.method, Method::Patch);
        assert_eq!(req.path, CHANGE_PASSWORD);
    }
}
