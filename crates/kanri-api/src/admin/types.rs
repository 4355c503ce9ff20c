use serde::{Deserialize, Serialize};

// ── Auth ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(default)]
    pub is_success: bool,
    pub token: Option<String>,
    pub message: Option<String>,
}

// ── Admin records ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Admin {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub is_super_admin: bool,
    #[serde(default)]
    pub access_tabs: Vec<String>,
    #[serde(rename = "is2FAEnabled", default)]
    pub two_factor_enabled: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    pub profile_image: Option<String>,
}

impl Admin {
    pub fn role_label(&self) -> &'static str {
        if self.is_super_admin {
            "Super Admin"
        } else {
            "Admin"
        }
    }

    /// Avatar letter: first character of the name, uppercased.
    pub fn initial(&self) -> char {
        self.name
            .trim()
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('?')
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub size: u32,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub total_pages: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AdminPage {
    #[serde(default)]
    pub admins: Vec<Admin>,
    #[serde(default)]
    pub pagination: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResponse {
    #[serde(default)]
    pub is_success: bool,
    pub filtered_data: Option<AdminPage>,
}

// ── Mutations ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AdminUpdate {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

/// Uploaded avatar for a profile update.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub mime: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub name: String,
    pub email: String,
    pub image: Option<ProfileImage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_filter_response() {
        let json = r#"{
            "isSuccess": true,
            "filteredData": {
                "admins": [
                    {
                        "_id": "692557cd13ebcecfb050aa84",
                        "name": "Super Admin",
                        "email": "superadmin@growth.com",
                        "isSuperAdmin": true,
                        "accessTabs": [],
                        "is2FAEnabled": false,
                        "createdAt": "2025-11-25T07:16:29.590Z",
                        "updatedAt": "2025-11-25T07:16:29.590Z"
                    }
                ],
                "pagination": { "page": 1, "size": 10, "totalItems": 1, "totalPages": 1 }
            }
        }"#;
        let resp: FilterResponse = serde_json::from_str(json).unwrap();
        assert!(resp.is_success);

        let page = resp.filtered_data.unwrap();
        assert_eq!(page.pagination.total_items, 1);
        let admin = &page.admins[0];
        assert_eq!(admin.id, "692557cd13ebcecfb050aa84");
        assert!(admin.is_super_admin);
        assert!(!admin.two_factor_enabled);
        assert_eq!(admin.role_label(), "Super Admin");
        assert_eq!(admin.initial(), 'S');
        assert!(admin.profile_image.is_none());
    }

    #[test]
    fn test_deserialize_minimal_admin() {
        let json = r#"{ "id": "7", "name": "  ren", "email": "ren@example.com" }"#;
        let admin: Admin = serde_json::from_str(json).unwrap();
        assert_eq!(admin.id, "7");
        assert_eq!(admin.role_label(), "Admin");
        assert_eq!(admin.initial(), 'R');
        assert!(admin.access_tabs.is_empty());
    }

    #[test]
    fn test_initial_of_blank_name() {
        let json = r#"{ "_id": "1", "name": "", "email": "x@y.z" }"#;
        let admin: Admin = serde_json::from_str(json).unwrap();
        assert_eq!(admin.initial(), '?');
    }

    #[test]
    fn test_deserialize_login_response() {
        let resp: LoginResponse =
            serde_json::from_str(r#"{ "isSuccess": true, "token": "abc" }"#).unwrap();
        assert!(resp.is_success);
        assert_eq!(resp.token.as_deref(), Some("abc"));

        let resp: LoginResponse =
            serde_json::from_str(r#"{ "message": "Invalid credentials" }"#).unwrap();
        assert!(!resp.is_success);
        assert!(resp.token.is_none());
    }

    #[test]
    fn test_password_change_wire_names() {
        let body = serde_json::to_value(PasswordChange {
            current_password: "old".into(),
            new_password: "newpassword".into(),
        })
        .unwrap();
        assert_eq!(body["currentPassword"], "old");
        assert_eq!(body["newPassword"], "newpassword");
    }
}
