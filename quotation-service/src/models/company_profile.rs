//! Company profile model for quotation-service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Issuing company profile. The signature is a data-URL image captured in
/// the client and attached to printed documents.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CompanyProfile {
    pub company_profile_id: Uuid,
    pub company_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub tax_id: String,
    pub contact_person: String,
    pub signature: Option<String>,
    pub is_default: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

/// Input for creating a company profile.
#[derive(Debug, Clone)]
pub struct CreateCompanyProfile {
    pub company_name: String,
    pub address: String,
    pub phone_number: String,
    pub email: String,
    pub tax_id: String,
    pub contact_person: String,
    pub signature: Option<String>,
    pub is_default: bool,
}

/// Input for updating a company profile.
#[derive(Debug, Clone)]
pub struct UpdateCompanyProfile {
    pub company_name: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub tax_id: Option<String>,
    pub contact_person: Option<String>,
    pub signature: Option<String>,
    pub is_default: Option<bool>,
}
