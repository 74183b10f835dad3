//! Company profile CRUD handlers.

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
    models::{CreateCompanyProfile, UpdateCompanyProfile},
    utils::ValidatedJson,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCompanyProfileRequest {
    #[validate(length(min = 1, message = "Company name is required"))]
    pub company_name: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub tax_id: String,
    #[serde(default)]
    pub contact_person: String,
    pub signature: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCompanyProfileRequest {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub contact_person: Option<String>,
    pub signature: Option<String>,
    pub is_default: Option<bool>,
}

pub async fn list_company_profiles(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let profiles = state.db.list_company_profiles().await?;
    Ok(Json(profiles))
}

pub async fn create_company_profile(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCompanyProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = CreateCompanyProfile {
        company_name: req.company_name,
        address: req.address,
        phone_number: req.phone_number,
        email: req.email,
        tax_id: req.tax_id,
        contact_person: req.contact_person,
        signature: req.signature,
        is_default: req.is_default,
    };

    let profile = state.db.create_company_profile(&input).await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

/// Default profile used to pre-fill new quotations.
pub async fn get_default_company_profile(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state
        .db
        .get_default_company_profile()
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("No default company profile set")))?;

    Ok(Json(profile))
}

pub async fn get_company_profile(
    State(state): State<AppState>,
    Path(company_profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let profile = state
        .db
        .get_company_profile(company_profile_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company profile not found")))?;

    Ok(Json(profile))
}

pub async fn update_company_profile(
    State(state): State<AppState>,
    Path(company_profile_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCompanyProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = UpdateCompanyProfile {
        company_name: req.company_name,
        address: req.address,
        phone_number: req.phone_number,
        email: req.email,
        tax_id: req.tax_id,
        contact_person: req.contact_person,
        signature: req.signature,
        is_default: req.is_default,
    };

    let profile = state
        .db
        .update_company_profile(company_profile_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Company profile not found")))?;

    Ok(Json(profile))
}

pub async fn delete_company_profile(
    State(state): State<AppState>,
    Path(company_profile_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_company_profile(company_profile_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Company profile not found"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}
