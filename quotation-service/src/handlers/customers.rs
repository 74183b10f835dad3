//! Customer CRUD handlers.

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
    models::{CreateCustomer, UpdateCustomer},
    utils::ValidatedJson,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCustomerRequest {
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
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCustomerRequest {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub contact_person: Option<String>,
}

pub async fn list_customers(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let customers = state.db.list_customers().await?;
    Ok(Json(customers))
}

pub async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = CreateCustomer {
        company_name: req.company_name,
        address: req.address,
        phone_number: req.phone_number,
        email: req.email,
        tax_id: req.tax_id,
        contact_person: req.contact_person,
    };

    let customer = state.db.create_customer(&input).await?;

    Ok((StatusCode::CREATED, Json(customer)))
}

pub async fn get_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let customer = state
        .db
        .get_customer(customer_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(customer))
}

pub async fn update_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCustomerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let input = UpdateCustomer {
        company_name: req.company_name,
        address: req.address,
        phone_number: req.phone_number,
        email: req.email,
        tax_id: req.tax_id,
        contact_person: req.contact_person,
    };

    let customer = state
        .db
        .update_customer(customer_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Customer not found")))?;

    Ok(Json(customer))
}

pub async fn delete_customer(
    State(state): State<AppState>,
    Path(customer_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_customer(customer_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Customer not found")));
    }

    Ok(StatusCode::NO_CONTENT)
}
