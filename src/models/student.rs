// src/models/student.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use validator::Validate;

use crate::utils::student::{validate_phone, validate_promoted_class};

/// Represents the 'students' table in the identity store.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,

    pub full_name: String,

    /// 10-digit contact number, unique per student.
    pub phone: String,

    pub email: String,

    /// Derived login name: `first.last` plus the last 4 phone digits.
    pub username: String,

    /// Argon2 password hash.
    /// Skipped during serialization to prevent leaking sensitive data.
    #[serde(skip)]
    pub password_hash: String,

    /// Raw class selection from signup, e.g. "9" or "11 jee".
    pub promoted_to_class: String,

    /// One-attempt lock flag. Flips 0 -> 1 exactly once, at test display.
    pub has_attempted: i64,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

impl Student {
    pub fn attempt_locked(&self) -> bool {
        self.has_attempted != 0
    }
}

/// DTO for student signup.
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 100, message = "Full name is required."))]
    pub full_name: String,

    #[validate(custom(function = validate_phone))]
    pub phone: String,

    #[validate(email(message = "Invalid email format."))]
    pub email: String,

    #[validate(length(min = 6, max = 128, message = "Password must be at least 6 characters."))]
    pub password: String,

    /// "9", "10", "11", "12" or "dropper".
    #[validate(custom(function = validate_promoted_class))]
    pub promoted_to_class: String,

    /// Required for class 11, 12 and droppers; ignored otherwise.
    pub stream: Option<String>,
}

/// DTO for student login.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 100))]
    pub username: String,
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}
