use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::{
    cookie::{Cookie, SameSite},
    CookieJar,
};
use chrono::{Duration, Utc};
use rand::Rng;
use service_core::error::AppError;
use uuid::Uuid;

use crate::{
    dtos::auth::{LoginRequest, PasswordResetConfirm, PasswordResetRequest},
    middleware::{AuthUser, AUTH_COOKIE},
    utils::{hash_password, verify_password, Password, PasswordHashString, ValidatedJson},
    AppState,
};

fn session_cookie(token: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, token))
        .http_only(true)
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(time::Duration::seconds(max_age_seconds))
        .build()
}

/// Login with email and password, setting the session cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    ValidatedJson(req): ValidatedJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .db
        .get_user_by_email(&req.email)
        .await?
        .ok_or_else(|| AppError::Unauthorized(anyhow::anyhow!("Invalid email or password")))?;

    let password_ok = verify_password(
        &Password::new(req.password),
        &PasswordHashString::new(user.password_hash.clone()),
    );
    if !password_ok {
        return Err(AppError::Unauthorized(anyhow::anyhow!(
            "Invalid email or password"
        )));
    }

    if !user.active {
        return Err(AppError::Forbidden(anyhow::anyhow!(
            "Account is inactive. Please contact administrator."
        )));
    }

    let token = state.jwt.generate_token(&user)?;

    state.db.record_login(user.user_id).await?;

    tracing::info!(user_id = %user.user_id, "User logged in");

    let jar = jar.add(session_cookie(token, state.jwt.token_expiry_seconds()));

    Ok((jar, Json(user.sanitized())))
}

/// Logout by clearing the session cookie.
pub async fn logout(jar: CookieJar) -> Result<impl IntoResponse, AppError> {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));

    Ok((
        jar,
        Json(serde_json::json!({
            "message": "Logged out successfully"
        })),
    ))
}

/// Current user profile.
pub async fn me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let claims = user.0;
    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|e| AppError::InternalError(anyhow::anyhow!("Invalid subject claim: {}", e)))?;

    let user = state
        .db
        .get_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("User not found")))?;

    Ok(Json(user.sanitized()))
}

/// Request a password reset token for an email address.
///
/// The response is the same whether or not the account exists.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PasswordResetRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(user) = state.db.get_user_by_email(&req.email).await? {
        let token = {
            let mut rng = rand::thread_rng();
            let token_bytes: [u8; 32] = rng.gen();
            hex::encode(token_bytes)
        };
        let expires_utc = Utc::now() + Duration::hours(24);

        state
            .db
            .create_password_reset_token(user.user_id, &token, expires_utc)
            .await?;

        // No mail delivery in this deployment; the operator relays the link
        tracing::info!(user_id = %user.user_id, token = %token, "Password reset token issued");
    }

    Ok(Json(serde_json::json!({
        "message": "If the account exists, a password reset link has been issued"
    })))
}

/// Confirm a password reset with a previously issued token.
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<PasswordResetConfirm>,
) -> Result<impl IntoResponse, AppError> {
    let reset_token = state
        .db
        .get_valid_reset_token(&req.token)
        .await?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Invalid or expired reset token")))?;

    let password_hash = hash_password(&Password::new(req.new_password))?;

    let updated = state
        .db
        .set_user_password(reset_token.user_id, password_hash.as_str())
        .await?;
    if !updated {
        return Err(AppError::NotFound(anyhow::anyhow!("User not found")));
    }

    state.db.mark_reset_token_used(reset_token.token_id).await?;

    tracing::info!(user_id = %reset_token.user_id, "Password reset completed");

    Ok((
        StatusCode::OK,
        Json(serde_json::json!({
            "message": "Password has been reset"
        })),
    ))
}
