//! HTTP handlers for quotation-service.

pub mod auth;
pub mod company_profiles;
pub mod customers;
pub mod financial_documents;
pub mod metrics;
pub mod quotations;
pub mod users;
