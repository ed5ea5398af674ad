//! Syntactic checks applied to request bodies before they reach the service.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use utoipa::ToSchema;

use crate::{entities::accounts::Privilege, handler::error::ApiError};

pub const FULL_NAME_MIN: usize = 2;
pub const FULL_NAME_MAX: usize = 128;
pub const PASSWORD_MIN: usize = 4;
pub const EMAIL_MAX: usize = 254;
pub const EMAIL_LOCAL_MAX: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();
static PHONE_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // WHATWG "valid email address": local@label(.label)*
        let pattern = r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";
        Regex::new(pattern).unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn phone_regex() -> &'static Regex {
    PHONE_RE.get_or_init(|| {
        Regex::new(r"^\+?[1-9][0-9]{7,14}$")
            .unwrap_or_else(|error| panic!("phone regex failed to compile: {error}"))
    })
}

/// Collects every field error in a request instead of stopping at the first.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field: field.to_string(),
            message: message.into(),
        });
    }

    /// Returns `false` (and records `message`) when `value` is blank.
    pub fn required(&mut self, field: &str, value: &str, message: &str) -> bool {
        if value.trim().is_empty() {
            self.reject(field, message);
            return false;
        }
        true
    }

    pub fn full_name(&mut self, field: &str, value: &str) {
        let length = value.chars().count();
        if !(FULL_NAME_MIN..=FULL_NAME_MAX).contains(&length) {
            self.reject(
                field,
                format!(
                    "Full name must be between {FULL_NAME_MIN} and {FULL_NAME_MAX} characters"
                ),
            );
        }
    }

    pub fn email(&mut self, field: &str, value: &str) {
        let local_len = value.split('@').next().map_or(0, str::len);
        if value.len() > EMAIL_MAX || local_len > EMAIL_LOCAL_MAX || !email_regex().is_match(value)
        {
            self.reject(field, "Email format is invalid");
        }
    }

    pub fn phone(&mut self, field: &str, value: &str) {
        if !phone_regex().is_match(value) {
            self.reject(field, "Invalid phone number format");
        }
    }

    pub fn password(&mut self, field: &str, value: &str, label: &str) {
        if value.chars().count() < PASSWORD_MIN {
            self.reject(
                field,
                format!("{label} must be at least {PASSWORD_MIN} characters"),
            );
        }
    }

    pub fn privilege(&mut self, field: &str, value: &str) -> Option<Privilege> {
        match Privilege::try_from(value) {
            Ok(privilege) => Some(privilege),
            Err(_) => {
                self.reject(field, "Privilege must be either 'admin' or 'user'");
                None
            }
        }
    }

    pub fn finish(self) -> Result<(), ApiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self.into_error())
        }
    }

    pub fn into_error(self) -> ApiError {
        ApiError::Validation(self.errors)
    }
}
