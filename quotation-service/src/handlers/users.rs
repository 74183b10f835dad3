//! Admin user management handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{CreateUser, SanitizedUser, UpdateUser, UserRole},
    utils::{hash_password, Password, ValidatedJson},
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 1, message = "Display name is required"))]
    pub display_name: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[serde(default)]
    pub role: Option<UserRole>,
    #[serde(default)]
    pub active: Option<bool>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub role: Option<UserRole>,
    pub active: Option<bool>,
}

pub async fn list_users(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let users = state.db.list_users().await?;
    let sanitized: Vec<SanitizedUser> = users.iter().map(|u| u.sanitized()).collect();
    Ok(Json(sanitized))
}

pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let password_hash = hash_password(&Password::new(req.password))?;

    let input = CreateUser {
        email: req.email,
        display_name: req.display_name,
        password_hash: password_hash.into_string(),
        role: req.role.unwrap_or(UserRole::User),
        active: req.active.unwrap_or(true),
    };

    let user = state.db.create_user(&input).await?;

    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok(Json(user.sanitized()))
}

pub async fn update_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = UpdateUser {
        email: req.email,
        display_name: req.display_name,
        role: req.role,
        active: req.active,
    };

    let user = state
        .db
        .update_user(user_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok(Json(user.sanitized()))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_user(user_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
