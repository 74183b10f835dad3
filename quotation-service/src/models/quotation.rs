//! Quotation model for quotation-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{CompanyProfile, Customer, LineItem, QuotationItem};

/// Quotation document with its persisted totals snapshot.
///
/// The totals columns are written by the pricing engine on every create and
/// update; reads never recompute them.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Quotation {
    pub quotation_id: Uuid,
    pub quotation_number: String,
    pub issue_date: NaiveDate,
    pub customer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub include_vat: bool,
    pub subtotal: Decimal,
    pub discount: Decimal,
    pub after_discount: Decimal,
    pub vat: Decimal,
    pub total_amount: Decimal,
    pub withholding: Decimal,
    pub net_total: Decimal,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Quotation with its relations, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct QuotationDetail {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub customer: Option<Customer>,
    pub company: Option<CompanyProfile>,
    pub items: Vec<QuotationItem>,
}

/// Input for creating a quotation. Totals are derived server-side from the
/// items, discount, VAT flag and withholding.
#[derive(Debug, Clone)]
pub struct CreateQuotation {
    pub quotation_number: String,
    pub issue_date: NaiveDate,
    pub customer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub include_vat: bool,
    pub discount: Decimal,
    pub withholding: Decimal,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    pub items: Vec<LineItem>,
}
