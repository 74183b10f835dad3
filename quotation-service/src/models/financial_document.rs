//! Financial document model for quotation-service.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::{CompanyProfile, Customer, DocumentItem, LineItem, Quotation};

/// Financial document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Invoice,
    Receipt,
    TaxInvoice,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "invoice",
            DocumentType::Receipt => "receipt",
            DocumentType::TaxInvoice => "tax_invoice",
        }
    }

    pub fn from_string(s: &str) -> Self {
        match s {
            "receipt" => DocumentType::Receipt,
            "tax_invoice" => DocumentType::TaxInvoice,
            _ => DocumentType::Invoice,
        }
    }

    /// Prefix used in generated document numbers.
    pub fn number_prefix(&self) -> &'static str {
        match self {
            DocumentType::Invoice => "INV",
            DocumentType::Receipt => "REC",
            DocumentType::TaxInvoice => "TAX",
        }
    }
}

/// Financial document derived from a quotation or created standalone,
/// with the same persisted totals snapshot as a quotation plus payment state.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FinancialDocument {
    pub document_id: Uuid,
    pub document_number: String,
    pub document_type: String,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub quotation_id: Option<Uuid>,
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
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_reference: Option<String>,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Financial document with its relations, as returned by the API.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialDocumentDetail {
    #[serde(flatten)]
    pub document: FinancialDocument,
    pub customer: Option<Customer>,
    pub company: Option<CompanyProfile>,
    pub quotation: Option<Quotation>,
    pub items: Vec<DocumentItem>,
}

/// Input for creating a financial document.
#[derive(Debug, Clone)]
pub struct CreateFinancialDocument {
    pub document_number: String,
    pub document_type: DocumentType,
    pub issue_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub quotation_id: Option<Uuid>,
    pub customer_id: Uuid,
    pub company_id: Option<Uuid>,
    pub include_vat: bool,
    pub discount: Decimal,
    pub withholding: Decimal,
    pub is_paid: bool,
    pub payment_method: Option<String>,
    pub payment_date: Option<NaiveDate>,
    pub payment_reference: Option<String>,
    pub customer_signature: Option<String>,
    pub seller_signature: Option<String>,
    pub items: Vec<LineItem>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_type_round_trip() {
        for t in [
            DocumentType::Invoice,
            DocumentType::Receipt,
            DocumentType::TaxInvoice,
        ] {
            assert_eq!(DocumentType::from_string(t.as_str()), t);
        }
    }

    #[test]
    fn unknown_document_type_defaults_to_invoice() {
        assert_eq!(DocumentType::from_string("credit_note"), DocumentType::Invoice);
    }
}
