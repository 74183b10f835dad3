//! Financial document handlers: CRUD, derivation from quotations and
//! document number generation.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service_core::error::AppError;
use uuid::Uuid;
use validator::Validate;

use crate::{
    handlers::quotations::{map_pricing_error, to_line_items, LineItemPayload},
    models::{CreateFinancialDocument, DocumentType, FinancialDocumentDetail, LineItem},
    pricing::{self, PricingTotals},
    services::metrics::DOCUMENTS_TOTAL,
    services::numbering,
    utils::ValidatedJson,
    AppState,
};

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFinancialDocumentRequest {
    #[validate(length(min = 1, message = "Document number is required"))]
    pub document_number: String,
    pub document_type: DocumentType,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub quotation_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub company_id: Option<Uuid>,
    #[serde(default)]
    pub include_vat: bool,
    #[serde(default)]
    pub discount: Decimal,
    #[serde(default)]
    pub withholding: Decimal,
    #[serde(default)]
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_reference: Option<String>,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    #[validate(length(min = 1, message = "At least one line item is required"))]
    pub items: Vec<LineItemPayload>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateFinancialDocumentRequest {
    pub document_number: Option<String>,
    pub document_type: Option<DocumentType>,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    pub customer_id: Option<Uuid>,
    pub company_id: Option<Uuid>,
    pub include_vat: Option<bool>,
    pub discount: Option<Decimal>,
    pub withholding: Option<Decimal>,
    pub is_paid: Option<bool>,
    pub payment_method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_reference: Option<String>,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    pub items: Option<Vec<LineItemPayload>>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateFromQuotationRequest {
    pub quotation_id: Uuid,
    pub document_type: DocumentType,
    #[validate(length(min = 1, message = "Document number is required"))]
    pub document_number: String,
    pub issue_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_reference: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GenerateDocumentNumberRequest {
    pub document_type: DocumentType,
}

#[derive(Debug, Serialize)]
pub struct DocumentNumberResponse {
    pub document_number: String,
}

pub async fn list_financial_documents(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let documents = state.db.list_financial_documents().await?;
    Ok(Json(documents))
}

pub async fn create_financial_document(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateFinancialDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let items = to_line_items(&req.items);
    pricing::validate_inputs(&items, req.discount, req.withholding).map_err(map_pricing_error)?;

    let totals = pricing::compute_totals(&items, req.discount, req.include_vat, req.withholding);

    let input = CreateFinancialDocument {
        document_number: req.document_number,
        document_type: req.document_type,
        issue_date: req.issue_date,
        due_date: req.due_date,
        quotation_id: req.quotation_id,
        customer_id: req.customer_id,
        company_id: req.company_id,
        include_vat: req.include_vat,
        discount: req.discount,
        withholding: req.withholding,
        is_paid: req.is_paid,
        payment_method: req.payment_method,
        payment_date: req.payment_date,
        payment_reference: req.payment_reference,
        customer_signature: req.customer_signature,
        seller_signature: req.seller_signature,
        items,
    };

    let document = state.db.create_financial_document(&input, &totals).await?;

    DOCUMENTS_TOTAL
        .with_label_values(&[&document.document_type])
        .inc();

    let detail = state
        .db
        .get_financial_document_detail(document.document_id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Document vanished after create")))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

/// Derive a financial document from an existing quotation, copying its
/// parties, totals snapshot, signatures and line items.
pub async fn create_from_quotation(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateFromQuotationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let quotation = state
        .db
        .get_quotation_detail(req.quotation_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Quotation not found")))?;

    let items: Vec<LineItem> = quotation.items.iter().map(LineItem::from).collect();

    // The stored totals snapshot is copied verbatim, not recomputed
    let totals = PricingTotals {
        subtotal: quotation.quotation.subtotal,
        discount: quotation.quotation.discount,
        after_discount: quotation.quotation.after_discount,
        vat: quotation.quotation.vat,
        total_amount: quotation.quotation.total_amount,
        withholding: quotation.quotation.withholding,
        net_total: quotation.quotation.net_total,
    };

    let input = CreateFinancialDocument {
        document_number: req.document_number,
        document_type: req.document_type,
        issue_date: req.issue_date.unwrap_or_else(|| Utc::now().date_naive()),
        due_date: req.due_date,
        quotation_id: Some(req.quotation_id),
        customer_id: quotation.quotation.customer_id,
        company_id: quotation.quotation.company_id,
        include_vat: quotation.quotation.include_vat,
        discount: quotation.quotation.discount,
        withholding: quotation.quotation.withholding,
        is_paid: req.is_paid,
        payment_method: req.payment_method,
        payment_date: req.payment_date,
        payment_reference: req.payment_reference,
        customer_signature: quotation.quotation.customer_signature.clone(),
        seller_signature: quotation.quotation.seller_signature.clone(),
        items,
    };

    let document = state.db.create_financial_document(&input, &totals).await?;

    DOCUMENTS_TOTAL
        .with_label_values(&[&document.document_type])
        .inc();

    let detail = state
        .db
        .get_financial_document_detail(document.document_id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Document vanished after create")))?;

    Ok((StatusCode::CREATED, Json(detail)))
}

pub async fn get_financial_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let detail = state
        .db
        .get_financial_document_detail(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Financial document not found")))?;

    Ok(Json(detail))
}

pub async fn update_financial_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateFinancialDocumentRequest>,
) -> Result<impl IntoResponse, AppError> {
    let existing: FinancialDocumentDetail = state
        .db
        .get_financial_document_detail(document_id)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Financial document not found")))?;

    let items: Vec<LineItem> = match &req.items {
        Some(payloads) => to_line_items(payloads),
        None => existing.items.iter().map(LineItem::from).collect(),
    };
    let discount = req.discount.unwrap_or(existing.document.discount);
    let withholding = req.withholding.unwrap_or(existing.document.withholding);
    let include_vat = req.include_vat.unwrap_or(existing.document.include_vat);

    if items.is_empty() {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "At least one line item is required"
        )));
    }
    pricing::validate_inputs(&items, discount, withholding).map_err(map_pricing_error)?;

    let totals = pricing::compute_totals(&items, discount, include_vat, withholding);

    let document_type = req
        .document_type
        .unwrap_or_else(|| DocumentType::from_string(&existing.document.document_type));

    let input = CreateFinancialDocument {
        document_number: req
            .document_number
            .unwrap_or(existing.document.document_number),
        document_type,
        issue_date: req.issue_date.unwrap_or(existing.document.issue_date),
        due_date: req.due_date.or(existing.document.due_date),
        quotation_id: existing.document.quotation_id,
        customer_id: req.customer_id.unwrap_or(existing.document.customer_id),
        company_id: req.company_id.or(existing.document.company_id),
        include_vat,
        discount,
        withholding,
        is_paid: req.is_paid.unwrap_or(existing.document.is_paid),
        payment_method: req.payment_method.or(existing.document.payment_method),
        payment_date: req.payment_date.or(existing.document.payment_date),
        payment_reference: req
            .payment_reference
            .or(existing.document.payment_reference),
        customer_signature: req
            .customer_signature
            .or(existing.document.customer_signature),
        seller_signature: req
            .seller_signature
            .or(existing.document.seller_signature),
        items,
    };

    let document = state
        .db
        .update_financial_document(document_id, &input, &totals)
        .await?
        .ok_or_else(|| AppError::NotFound(anyhow::anyhow!("Financial document not found")))?;

    let detail = state
        .db
        .get_financial_document_detail(document.document_id)
        .await?
        .ok_or_else(|| AppError::InternalError(anyhow::anyhow!("Document vanished after update")))?;

    Ok(Json(detail))
}

pub async fn delete_financial_document(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let deleted = state.db.delete_financial_document(document_id).await?;
    if !deleted {
        return Err(AppError::NotFound(anyhow::anyhow!(
            "Financial document not found"
        )));
    }

    Ok(StatusCode::NO_CONTENT)
}

/// Generate the next document number for a type: `PREFIX` + `YYMM` + `-` +
/// zero-padded sequence, restarting each calendar month.
pub async fn generate_document_number(
    State(state): State<AppState>,
    Json(req): Json<GenerateDocumentNumberRequest>,
) -> Result<impl IntoResponse, AppError> {
    let today = Utc::now().date_naive();
    let pattern = numbering::number_pattern(req.document_type, today);

    let latest = state.db.latest_document_number(&pattern).await?;
    let sequence = numbering::next_sequence(latest.as_deref());
    let document_number = numbering::format_document_number(req.document_type, today, sequence);

    Ok(Json(DocumentNumberResponse { document_number }))
}
