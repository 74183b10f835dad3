//! Line item models shared by quotations and financial documents.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A single priced line as submitted by the client and consumed by the
/// pricing engine. The stored amount always equals quantity times price;
/// it is never edited independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub amount: Decimal,
}

impl LineItem {
    /// A freshly added row: one piece at zero price.
    pub fn empty() -> Self {
        Self {
            description: String::new(),
            unit: "piece".to_string(),
            quantity: Decimal::ONE,
            price_per_unit: Decimal::ZERO,
            amount: Decimal::ZERO,
        }
    }

    /// Amount contributed to the subtotal. A zero stored amount falls back
    /// to quantity times price.
    pub fn effective_amount(&self) -> Decimal {
        if self.amount.is_zero() {
            self.quantity * self.price_per_unit
        } else {
            self.amount
        }
    }

    /// Recompute the stored amount from quantity and price.
    pub fn normalized(mut self) -> Self {
        self.amount = self.quantity * self.price_per_unit;
        self
    }
}

/// Persisted line item belonging to a quotation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct QuotationItem {
    pub quotation_item_id: Uuid,
    pub quotation_id: Uuid,
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub amount: Decimal,
    pub position: i32,
    pub created_utc: DateTime<Utc>,
}

/// Persisted line item belonging to a financial document.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DocumentItem {
    pub document_item_id: Uuid,
    pub document_id: Uuid,
    pub description: String,
    pub unit: String,
    pub quantity: Decimal,
    pub price_per_unit: Decimal,
    pub amount: Decimal,
    pub position: i32,
    pub created_utc: DateTime<Utc>,
}

impl From<&QuotationItem> for LineItem {
    fn from(row: &QuotationItem) -> Self {
        LineItem {
            description: row.description.clone(),
            unit: row.unit.clone(),
            quantity: row.quantity,
            price_per_unit: row.price_per_unit,
            amount: row.amount,
        }
    }
}

impl From<&DocumentItem> for LineItem {
    fn from(row: &DocumentItem) -> Self {
        LineItem {
            description: row.description.clone(),
            unit: row.unit.clone(),
            quantity: row.quantity,
            price_per_unit: row.price_per_unit,
            amount: row.amount,
        }
    }
}
