//! Quotation CRUD and pricing handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    models::{CreateQuotation, LineItem, QuotationDetail},
    pricing::{self, PricingTotals, ReverseCalculation},
    services::metrics::QUOTATIONS_TOTAL,
    utils::ValidatedJson,
    AppState,
};

/// Line item as submitted by the client. The amount is always recomputed
/// from quantity and price; a client-supplied amount is ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LineItemPayload {
    pub description: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
}

fn default_unit() -> String {
    "piece".to_string()
}

impl From<&LineItemPayload> for LineItem {
    fn from(payload: &LineItemPayload) -> Self {
        LineItem {
            description: payload.description.clone(),
            unit: payload.unit.clone(),
            quantity: payload.quantity,
            price_per_unit: payload.price_per_unit,
            amount: Decimal::ZERO,
        }
        .normalized()
    }
}

pub(crate) fn to_line_items(payloads: &[LineItemPayload]) -> Vec<LineItem> {
    payloads.iter().map(LineItem::from).collect()
}

pub(crate) fn map_pricing_error(err: pricing::PricingError) -> AppError {
    AppError::BadRequest(anyhow::anyhow!(err))
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuotationRequest {
    #[validate(length(min = 1, message = "Quotation number is required"))]
    pub quotation_number: String,
    pub issue_date: NaiveDate,
    pub customer_id: Uuid,
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub include_vat: bool,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub withholding: Decimal,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<LineItemPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuotationRequest {
    pub quotation_number: Option<String>,
    pub issue_date: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub include_vat: Option<bool>,
    pub discount: Option<Decimal>,
    pub withholding: Option<Decimal>,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    pub items: Option<Vec<LineItemPayload>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct ReverseCalculationRequest {
    pub desired_net: Option<Decimal>,
    #[serde(default)]
    pub items: Vec<LineItemPayload>,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub include_vat: bool,
}

#[derive(Debug, Serialize)]
pub struct ReverseCalculationResponse {
    #[serde(flatten)]
    pub reverse: ReverseCalculation,
    pub items: Vec<LineItem>,
    pub totals: PricingTotals,
}

pub async fn list_quotations(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let quotations = state.db.list_quotations().await?;
    Ok(Json(quotations))
}

pub async fn create_quotation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateQuotationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let items = to_line_items(&req.items);
    pricing::validate_inputs(&items, req.discount, req.withholding).map_err(map_pricing_error)?;

    let totals = pricing::compute_totals(&items, req.discount, req.include_vat, req.withholding);

    let input = CreateQuotation {
        quotation_number: req.quotation_number,
        issue_date: req.issue_date,
        customer_id: req.customer_id,
        company_id: req.company_id,
        include_vat: req.include_vat,
        discount: req.discount,
        withholding: req.withholding,
        customer_signature: req.customer_signature,
        seller_signature: req.seller_signature,
        items,
    };

    let quotation = state.db.create_quotation(&input, &totals).await?;

    QUOTATIONS_TOTAL.with_label_values(&["created"]).inc();

    let detail = state
        .db
        .get_quotation_detail(quotation.quotation_id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Quotation vanished after create")))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_quotation(
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .db
        .get_quotation_detail(quotation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quotation not found")))?;

    Ok(Json(detail))
}

pub async fn update_quotation(
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateQuotationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing: QuotationDetail = state
        .db
        .get_quotation_detail(quotation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quotation not found")))?;

    // Merge the patch over the stored state, then recompute the full
    // totals from the resulting items and toggles
    let items: Vec<LineItem> = match &req.items {
        Some(payloads) => to_line_items(payloads),
        None => existing.items.iter().map(LineItem::from).collect(),
    };
    let discount = req.discount.unwrap_or(existing.quotation.discount);
    let withholding = req.withholding.unwrap_or(existing.quotation.withholding);
    let include_vat = req.include_vat.unwrap_or(existing.quotation.include_vat);

    if items.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "At least one line item is required"
        )));
    }
    pricing::validate_inputs(&items, discount, withholding).map_err(map_pricing_error)?;

    let totals = pricing::compute_totals(&items, discount, include_vat, withholding);

    let input = CreateQuotation {
        quotation_number: req
            .quotation_number
            .unwrap_or(existing.quotation.quotation_number),
        issue_date: req.issue_date.unwrap_or(existing.quotation.issue_date),
        customer_id: req.customer_id.unwrap_or(existing.quotation.customer_id),
        company_id: req.company_id.or(existing.quotation.company_id),
        include_vat,
        discount,
        withholding,
        customer_signature: req
            .customer_signature
            .or(existing.quotation.customer_signature),
        seller_signature: req
            .seller_signature
            .or(existing.quotation.seller_signature),
        items,
    };

    let quotation = state
        .db
        .update_quotation(quotation_id, &input, &totals)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quotation not found")))?;

    QUOTATIONS_TOTAL.with_label_values(&["updated"]).inc();

    let detail = state
        .db
        .get_quotation_detail(quotation.quotation_id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Quotation vanished after update")))?;

    Ok(Json(detail))
}

pub async fn delete_quotation(
    State(state): State<AppState>,
    Path(quotation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_quotation(quotation_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!("Quotation not found")));
    }

    QUOTATIONS_TOTAL.with_label_values(&["deleted"]).inc();

    Ok(StatusCode::NO_CONTENT)
}

/// Reverse calculation: given the net amount the issuer wants to receive
/// after the 3% withholding deduction, compute the gross to bill,
/// redistribute it across the submitted items and return the resulting
/// totals. Nothing is persisted; the client applies the result to the form.
pub async fn reverse_calculation(
    ValidatedJson(req): ValidatedJson<ReverseCalculationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let desired_net = req
        .desired_net
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("Desired net amount is required")))?;

    let reverse = pricing::gross_from_desired_net(desired_net).map_err(map_pricing_error)?;

    let items = to_line_items(&req.items);
    pricing::validate_inputs(&items, req.discount, Decimal::ZERO).map_err(map_pricing_error)?;

    let adjusted = pricing::apply_gross_to_items(&items, reverse.gross_before_withholding);
    let totals = pricing::compute_totals(
        &adjusted,
        req.discount,
        req.include_vat,
        reverse.withholding_amount,
    );

    Ok(Json(ReverseCalculationResponse {
        reverse,
        items: adjusted,
        totals,
    }))
}
