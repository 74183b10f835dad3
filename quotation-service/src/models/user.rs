//! User model for quotation-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// User role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Admin,
    User,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::User => "user",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "admin" => UserRole::Admin,
            _ => UserRole::User,
        }
    }
}

/// Application user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub active: bool,
    pub last_login_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// User representation safe to return to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanitizedUser {
    pub user_id: Uuid,
    pub email: String,
    pub display_name: String,
    pub role: String,
    pub active: bool,
    pub last_login_utc: Option<DateTime<Utc>>,
    pub created_utc: DateTime<Utc>,
}

impl User {
    pub fn sanitized(&self) -> SanitizedUser {
        SanitizedUser {
            user_id: self.user_id,
            email: self.email.clone(),
            display_name: self.display_name.clone(),
            role: self.role.clone(),
            active: self.active,
            last_login_utc: self.last_login_utc,
            created_utc: self.created_utc,
        }
    }

}

/// Input for creating a user.
#[derive(Debug, Clone)]
pub struct CreateUser {
    pub email: String,
    pub display_name: String,
    pub password_hash: String,
    pub role: UserRole,
    pub active: bool,
}

/// Input for updating a user.
#[derive(Debug, Clone)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

/// Single-use password reset token.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PasswordResetToken {
    pub token_id: Uuid,
    pub user_id: Uuid,
    pub token: String,
    pub expires_utc: DateTime<Utc>,
    pub used: bool,
    pub created_utc: DateTime<Utc>,
}
