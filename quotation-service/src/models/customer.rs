//! Customer model for quotation-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Customer company record.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Customer {
    pub customer_id: Uuid,
    pub company_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub tax_id: String,
    pub contact_person: String,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a customer.
#[derive(Debug, Clone)]
pub struct CreateCustomer {
    pub company_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub tax_id: String,
    pub contact_person: String,
}

/// Input for updating a customer.
#[derive(Debug, Clone)]
pub struct UpdateCustomer {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub contact_person: Option<String>,
}
