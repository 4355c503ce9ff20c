use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use kanri_api::admin::{AdminUpdate, PasswordChange, ProfileImage, ProfileUpdate};

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").unwrap());

const MIN_LOGIN_PASSWORD: usize = 6;
const MIN_NEW_PASSWORD: usize = 8;
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Field name to message. Empty means the form is valid.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, String>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn add(&mut self, field: &'static str, message: &str) {
        self.0.insert(field, message.to_string());
    }
}

impl std::fmt::Display for FormErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, (field, message)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
        }
        Ok(())
    }
}

fn check_email(errors: &mut FormErrors, email: &str, invalid: &str) {
    if email.trim().is_empty() {
        errors.add("email", "Email is required");
    } else if !EMAIL_RE.is_match(email) {
        errors.add("email", invalid);
    }
}

#[derive(Debug, Clone, Default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        check_email(&mut errors, &self.email, "Please enter a valid email");
        if self.password.is_empty() {
            errors.add("password", "Password is required");
        } else if self.password.chars().count() < MIN_LOGIN_PASSWORD {
            errors.add("password", "Password must be at least 6 characters");
        }
        errors
    }
}

/// Edit dialog on the admin list.
#[derive(Debug, Clone, Default)]
pub struct AdminForm {
    pub name: String,
    pub email: String,
}

impl AdminForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        check_email(&mut errors, &self.email, "Email is invalid");
        errors
    }

    pub fn into_update(self) -> AdminUpdate {
        AdminUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub image: Option<ProfileImage>,
}

impl ProfileForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.name.trim().is_empty() {
            errors.add("name", "Name is required");
        }
        check_email(&mut errors, &self.email, "Email is invalid");
        if self
            .image
            .as_ref()
            .is_some_and(|image| image.bytes.len() > MAX_IMAGE_BYTES)
        {
            errors.add("image", "Image size should be less than 5MB");
        }
        errors
    }

    pub fn into_update(self) -> ProfileUpdate {
        ProfileUpdate {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            image: self.image,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
}

impl PasswordForm {
    pub fn validate(&self) -> FormErrors {
        let mut errors = FormErrors::default();
        if self.current_password.is_empty() {
            errors.add("currentPassword", "Current password is required");
        }
        if self.new_password.is_empty() {
            errors.add("newPassword", "New password is required");
        } else if self.new_password.chars().count() < MIN_NEW_PASSWORD {
            errors.add("newPassword", "Password must be at least 8 characters");
        }
        if self.new_password != self.confirm_password {
            errors.add("confirmPassword", "Passwords do not match");
        }
        errors
    }

    pub fn into_change(self) -> PasswordChange {
        PasswordChange {
            current_password: self.current_password,
            new_password: self.new_password,
        }
    }
}
