//! Database service for quotation-service.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use service_core::error::AppError;
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::models::{
    CompanyProfile, CreateCompanyProfile, CreateCustomer, CreateFinancialDocument, CreateQuotation,
    CreateUser, Customer, DocumentItem, FinancialDocument, FinancialDocumentDetail,
    PasswordResetToken, Quotation, QuotationDetail, QuotationItem, UpdateCompanyProfile,
    UpdateCustomer, UpdateUser, User,
};
use crate::pricing::PricingTotals;
use crate::services::metrics::DB_QUERY_DURATION;

const USER_COLUMNS: &str =
    "user_id, email, display_name, password_hash, role, active, last_login_utc, created_utc, updated_utc";

const CUSTOMER_COLUMNS: &str =
    "customer_id, company_name, address, phone_number, email, tax_id, contact_person, created_utc, updated_utc";

const COMPANY_PROFILE_COLUMNS: &str =
    "company_profile_id, company_name, address, phone_number, email, tax_id, contact_person, signature, is_default, created_utc, updated_utc";

const QUOTATION_COLUMNS: &str =
    "quotation_id, quotation_number, issue_date, customer_id, company_id, include_vat, \
     subtotal, discount, after_discount, vat, total_amount, withholding, net_total, \
     customer_signature, seller_signature, created_utc, updated_utc";

const DOCUMENT_COLUMNS: &str =
    "document_id, document_number, document_type, issue_date, due_date, quotation_id, customer_id, company_id, include_vat, \
     subtotal, discount, after_discount, vat, total_amount, withholding, net_total, \
     is_paid, payment_method, payment_date, payment_reference, \
     customer_signature, seller_signature, created_utc, updated_utc";

/// Database connection pool wrapper.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Create a new database connection pool.
    #[instrument(skip(database_url), fields(service = "quotation-service"))]
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
    ) -> Result<Self, AppError> {
        info!(
            max_connections = max_connections,
            min_connections = min_connections,
            "Connecting to PostgreSQL"
        );

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(Duration::from_secs(30))
            .idle_timeout(Duration::from_secs(600))
            .connect(database_url)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to connect: {}", e)))?;

        info!("PostgreSQL connection pool established");

        Ok(Self { pool })
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Check database health.
    #[instrument(skip(self))]
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Health check failed: {}", e)))?;
        Ok(())
    }

    /// Run database migrations.
    #[instrument(skip(self))]
    pub async fn run_migrations(&self) -> Result<(), AppError> {
        info!("Running database migrations");
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Migration failed: {}", e)))?;
        info!("Database migrations completed");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // User Operations
    // -------------------------------------------------------------------------

    /// Create a new user.
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn create_user(&self, input: &CreateUser) -> Result<User, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_user"])
            .start_timer();

        let user_id = Uuid::new_v4();
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (user_id, email, display_name, password_hash, role, active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&input.password_hash)
        .bind(input.role.as_str())
        .bind(input.active)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Email '{}' is already in use", input.email))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create user: {}", e)),
        })?;

        timer.observe_duration();

        info!(user_id = %user.user_id, "User created");

        Ok(user)
    }

    /// Get a user by ID.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user(&self, user_id: Uuid) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }

    /// Get a user by email.
    #[instrument(skip(self))]
    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_user_by_email"])
            .start_timer();

        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get user: {}", e)))?;

        timer.observe_duration();

        Ok(user)
    }

    /// List all users.
    #[instrument(skip(self))]
    pub async fn list_users(&self) -> Result<Vec<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_users"])
            .start_timer();

        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY created_utc"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list users: {}", e)))?;

        timer.observe_duration();

        Ok(users)
    }

    /// Update a user.
    #[instrument(skip(self, input), fields(user_id = %user_id))]
    pub async fn update_user(
        &self,
        user_id: Uuid,
        input: &UpdateUser,
    ) -> Result<Option<User>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_user"])
            .start_timer();

        let role = input.role.map(|r| r.as_str().to_string());

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
            SET email = COALESCE($2, email),
                display_name = COALESCE($3, display_name),
                role = COALESCE($4, role),
                active = COALESCE($5, active),
                updated_utc = NOW()
            WHERE user_id = $1
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(user_id)
        .bind(&input.email)
        .bind(&input.display_name)
        .bind(&role)
        .bind(input.active)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!("Email is already in use"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to update user: {}", e)),
        })?;

        timer.observe_duration();

        Ok(user)
    }

    /// Replace a user's password hash.
    #[instrument(skip(self, password_hash), fields(user_id = %user_id))]
    pub async fn set_user_password(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["set_user_password"])
            .start_timer();

        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_utc = NOW() WHERE user_id = $1",
        )
        .bind(user_id)
        .bind(password_hash)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to set password: {}", e)))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    /// Record a successful login.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn record_login(&self, user_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_login_utc = NOW() WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to record login: {}", e))
            })?;
        Ok(())
    }

    /// Delete a user.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn delete_user(&self, user_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_user"])
            .start_timer();

        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to delete user: {}", e)))?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Password Reset Token Operations
    // -------------------------------------------------------------------------

    /// Store a password reset token.
    #[instrument(skip(self, token), fields(user_id = %user_id))]
    pub async fn create_password_reset_token(
        &self,
        user_id: Uuid,
        token: &str,
        expires_utc: DateTime<Utc>,
    ) -> Result<PasswordResetToken, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_password_reset_token"])
            .start_timer();

        let token_id = Uuid::new_v4();
        let reset_token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            INSERT INTO password_reset_tokens (token_id, user_id, token, expires_utc)
            VALUES ($1, $2, $3, $4)
            RETURNING token_id, user_id, token, expires_utc, used, created_utc
            "#,
        )
        .bind(token_id)
        .bind(user_id)
        .bind(token)
        .bind(expires_utc)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create reset token: {}", e))
        })?;

        timer.observe_duration();

        Ok(reset_token)
    }

    /// Look up an unused, unexpired reset token.
    #[instrument(skip(self, token))]
    pub async fn get_valid_reset_token(
        &self,
        token: &str,
    ) -> Result<Option<PasswordResetToken>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_valid_reset_token"])
            .start_timer();

        let reset_token = sqlx::query_as::<_, PasswordResetToken>(
            r#"
            SELECT token_id, user_id, token, expires_utc, used, created_utc
            FROM password_reset_tokens
            WHERE token = $1 AND used = FALSE AND expires_utc > NOW()
            "#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get reset token: {}", e))
        })?;

        timer.observe_duration();

        Ok(reset_token)
    }

    /// Mark a reset token as used.
    #[instrument(skip(self), fields(token_id = %token_id))]
    pub async fn mark_reset_token_used(&self, token_id: Uuid) -> Result<(), AppError> {
        sqlx::query("UPDATE password_reset_tokens SET used = TRUE WHERE token_id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to mark token used: {}", e))
            })?;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Customer Operations
    // -------------------------------------------------------------------------

    /// Create a new customer.
    #[instrument(skip(self, input), fields(company_name = %input.company_name))]
    pub async fn create_customer(&self, input: &CreateCustomer) -> Result<Customer, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_customer"])
            .start_timer();

        let customer_id = Uuid::new_v4();
        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            INSERT INTO customers (customer_id, company_name, address, phone_number, email, tax_id, contact_person)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {CUSTOMER_COLUMNS}
            "#,
        ))
        .bind(customer_id)
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.contact_person)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to create customer: {}", e)))?;

        timer.observe_duration();

        info!(customer_id = %customer.customer_id, "Customer created");

        Ok(customer)
    }

    /// Get a customer by ID.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn get_customer(&self, customer_id: Uuid) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = $1"
        ))
        .bind(customer_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get customer: {}", e)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// List all customers.
    #[instrument(skip(self))]
    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_customers"])
            .start_timer();

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers ORDER BY company_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list customers: {}", e)))?;

        timer.observe_duration();

        Ok(customers)
    }

    /// Update a customer.
    #[instrument(skip(self, input), fields(customer_id = %customer_id))]
    pub async fn update_customer(
        &self,
        customer_id: Uuid,
        input: &UpdateCustomer,
    ) -> Result<Option<Customer>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_customer"])
            .start_timer();

        let customer = sqlx::query_as::<_, Customer>(&format!(
            r#"
            UPDATE customers
            SET company_name = COALESCE($2, company_name),
                address = COALESCE($3, address),
                phone_number = COALESCE($4, phone_number),
                email = COALESCE($5, email),
                tax_id = COALESCE($6, tax_id),
                contact_person = COALESCE($7, contact_person),
                updated_utc = NOW()
            WHERE customer_id = $1
            RETURNING {CUSTOMER_COLUMNS}
            "#,
        ))
        .bind(customer_id)
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.contact_person)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to update customer: {}", e)))?;

        timer.observe_duration();

        Ok(customer)
    }

    /// Delete a customer. Fails with a conflict when documents reference it.
    #[instrument(skip(self), fields(customer_id = %customer_id))]
    pub async fn delete_customer(&self, customer_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_customer"])
            .start_timer();

        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(customer_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Customer is referenced by existing quotations or documents"
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!("Failed to delete customer: {}", e)),
            })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Company Profile Operations
    // -------------------------------------------------------------------------

    /// Create a company profile. Setting it as default clears any previous
    /// default in the same transaction.
    #[instrument(skip(self, input), fields(company_name = %input.company_name))]
    pub async fn create_company_profile(
        &self,
        input: &CreateCompanyProfile,
    ) -> Result<CompanyProfile, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_company_profile"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        if input.is_default {
            sqlx::query("UPDATE company_profiles SET is_default = FALSE WHERE is_default = TRUE")
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(anyhow::anyhow!("Failed to clear defaults: {}", e))
                })?;
        }

        let company_profile_id = Uuid::new_v4();
        let profile = sqlx::query_as::<_, CompanyProfile>(&format!(
            r#"
            INSERT INTO company_profiles (
                company_profile_id, company_name, address, phone_number, email, tax_id,
                contact_person, signature, is_default
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING {COMPANY_PROFILE_COLUMNS}
            "#,
        ))
        .bind(company_profile_id)
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.contact_person)
        .bind(&input.signature)
        .bind(input.is_default)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to create company profile: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(company_profile_id = %profile.company_profile_id, "Company profile created");

        Ok(profile)
    }

    /// Get a company profile by ID.
    #[instrument(skip(self), fields(company_profile_id = %company_profile_id))]
    pub async fn get_company_profile(
        &self,
        company_profile_id: Uuid,
    ) -> Result<Option<CompanyProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_company_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, CompanyProfile>(&format!(
            "SELECT {COMPANY_PROFILE_COLUMNS} FROM company_profiles WHERE company_profile_id = $1"
        ))
        .bind(company_profile_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get company profile: {}", e))
        })?;

        timer.observe_duration();

        Ok(profile)
    }

    /// Get the default company profile, if one is set.
    #[instrument(skip(self))]
    pub async fn get_default_company_profile(&self) -> Result<Option<CompanyProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_default_company_profile"])
            .start_timer();

        let profile = sqlx::query_as::<_, CompanyProfile>(&format!(
            "SELECT {COMPANY_PROFILE_COLUMNS} FROM company_profiles WHERE is_default = TRUE LIMIT 1"
        ))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get default profile: {}", e))
        })?;

        timer.observe_duration();

        Ok(profile)
    }

    /// List all company profiles.
    #[instrument(skip(self))]
    pub async fn list_company_profiles(&self) -> Result<Vec<CompanyProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_company_profiles"])
            .start_timer();

        let profiles = sqlx::query_as::<_, CompanyProfile>(&format!(
            "SELECT {COMPANY_PROFILE_COLUMNS} FROM company_profiles ORDER BY company_name"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list company profiles: {}", e))
        })?;

        timer.observe_duration();

        Ok(profiles)
    }

    /// Update a company profile, clearing other defaults when this one
    /// becomes the default.
    #[instrument(skip(self, input), fields(company_profile_id = %company_profile_id))]
    pub async fn update_company_profile(
        &self,
        company_profile_id: Uuid,
        input: &UpdateCompanyProfile,
    ) -> Result<Option<CompanyProfile>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_company_profile"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        if input.is_default == Some(true) {
            sqlx::query(
                "UPDATE company_profiles SET is_default = FALSE WHERE is_default = TRUE AND company_profile_id <> $1",
            )
            .bind(company_profile_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to clear defaults: {}", e))
            })?;
        }

        let profile = sqlx::query_as::<_, CompanyProfile>(&format!(
            r#"
            UPDATE company_profiles
            SET company_name = COALESCE($2, company_name),
                address = COALESCE($3, address),
                phone_number = COALESCE($4, phone_number),
                email = COALESCE($5, email),
                tax_id = COALESCE($6, tax_id),
                contact_person = COALESCE($7, contact_person),
                signature = COALESCE($8, signature),
                is_default = COALESCE($9, is_default),
                updated_utc = NOW()
            WHERE company_profile_id = $1
            RETURNING {COMPANY_PROFILE_COLUMNS}
            "#,
        ))
        .bind(company_profile_id)
        .bind(&input.company_name)
        .bind(&input.address)
        .bind(&input.phone_number)
        .bind(&input.email)
        .bind(&input.tax_id)
        .bind(&input.contact_person)
        .bind(&input.signature)
        .bind(input.is_default)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to update company profile: {}", e))
        })?;

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        Ok(profile)
    }

    /// Delete a company profile.
    #[instrument(skip(self), fields(company_profile_id = %company_profile_id))]
    pub async fn delete_company_profile(&self, company_profile_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_company_profile"])
            .start_timer();

        let result = sqlx::query("DELETE FROM company_profiles WHERE company_profile_id = $1")
            .bind(company_profile_id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                    AppError::Conflict(anyhow::anyhow!(
                        "Company profile is referenced by existing quotations or documents"
                    ))
                }
                _ => AppError::DatabaseError(anyhow::anyhow!(
                    "Failed to delete company profile: {}",
                    e
                )),
            })?;

        timer.observe_duration();

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Quotation Operations
    // -------------------------------------------------------------------------

    /// Create a quotation together with its line items.
    #[instrument(skip(self, input, totals), fields(quotation_number = %input.quotation_number))]
    pub async fn create_quotation(
        &self,
        input: &CreateQuotation,
        totals: &PricingTotals,
    ) -> Result<Quotation, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_quotation"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let quotation_id = Uuid::new_v4();
        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            INSERT INTO quotations (
                quotation_id, quotation_number, issue_date, customer_id, company_id, include_vat,
                subtotal, discount, after_discount, vat, total_amount, withholding, net_total,
                customer_signature, seller_signature
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
            RETURNING {QUOTATION_COLUMNS}
            "#,
        ))
        .bind(quotation_id)
        .bind(&input.quotation_number)
        .bind(input.issue_date)
        .bind(input.customer_id)
        .bind(input.company_id)
        .bind(input.include_vat)
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.after_discount)
        .bind(totals.vat)
        .bind(totals.total_amount)
        .bind(totals.withholding)
        .bind(totals.net_total)
        .bind(&input.customer_signature)
        .bind(&input.seller_signature)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Quotation number '{}' already exists",
                    input.quotation_number
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(anyhow::anyhow!("Unknown customer or company profile"))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create quotation: {}", e)),
        })?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quotation_items (
                    quotation_item_id, quotation_id, description, unit, quantity, price_per_unit, amount, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(quotation.quotation_id)
            .bind(&item.description)
            .bind(&item.unit)
            .bind(item.quantity)
            .bind(item.price_per_unit)
            .bind(item.amount)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert quotation item: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(quotation_id = %quotation.quotation_id, "Quotation created");

        Ok(quotation)
    }

    /// Get a quotation by ID.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn get_quotation(&self, quotation_id: Uuid) -> Result<Option<Quotation>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_quotation"])
            .start_timer();

        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations WHERE quotation_id = $1"
        ))
        .bind(quotation_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get quotation: {}", e)))?;

        timer.observe_duration();

        Ok(quotation)
    }

    /// Get line items for a quotation, in position order.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn get_quotation_items(
        &self,
        quotation_id: Uuid,
    ) -> Result<Vec<QuotationItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_quotation_items"])
            .start_timer();

        let items = sqlx::query_as::<_, QuotationItem>(
            r#"
            SELECT quotation_item_id, quotation_id, description, unit, quantity, price_per_unit, amount, position, created_utc
            FROM quotation_items
            WHERE quotation_id = $1
            ORDER BY position, created_utc
            "#,
        )
        .bind(quotation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get quotation items: {}", e))
        })?;

        timer.observe_duration();

        Ok(items)
    }

    /// Get a quotation with its customer, company and items.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn get_quotation_detail(
        &self,
        quotation_id: Uuid,
    ) -> Result<Option<QuotationDetail>, AppError> {
        let quotation = match self.get_quotation(quotation_id).await? {
            Some(q) => q,
            None => return Ok(None),
        };

        let customer = self.get_customer(quotation.customer_id).await?;
        let company = match quotation.company_id {
            Some(company_id) => self.get_company_profile(company_id).await?,
            None => None,
        };
        let items = self.get_quotation_items(quotation_id).await?;

        Ok(Some(QuotationDetail {
            quotation,
            customer,
            company,
            items,
        }))
    }

    /// List all quotations with their relations, newest first.
    #[instrument(skip(self))]
    pub async fn list_quotations(&self) -> Result<Vec<QuotationDetail>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_quotations"])
            .start_timer();

        let quotations = sqlx::query_as::<_, Quotation>(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list quotations: {}", e)))?;

        let quotation_ids: Vec<Uuid> = quotations.iter().map(|q| q.quotation_id).collect();
        let items = sqlx::query_as::<_, QuotationItem>(
            r#"
            SELECT quotation_item_id, quotation_id, description, unit, quantity, price_per_unit, amount, position, created_utc
            FROM quotation_items
            WHERE quotation_id = ANY($1)
            ORDER BY position, created_utc
            "#,
        )
        .bind(&quotation_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list quotation items: {}", e))
        })?;

        let customers = self.customers_by_ids(&quotations.iter().map(|q| q.customer_id).collect::<Vec<_>>()).await?;
        let companies = self
            .company_profiles_by_ids(&quotations.iter().filter_map(|q| q.company_id).collect::<Vec<_>>())
            .await?;

        let mut items_by_quotation: HashMap<Uuid, Vec<QuotationItem>> = HashMap::new();
        for item in items {
            items_by_quotation
                .entry(item.quotation_id)
                .or_default()
                .push(item);
        }

        let details = quotations
            .into_iter()
            .map(|quotation| {
                let items = items_by_quotation
                    .remove(&quotation.quotation_id)
                    .unwrap_or_default();
                let customer = customers.get(&quotation.customer_id).cloned();
                let company = quotation
                    .company_id
                    .and_then(|id| companies.get(&id).cloned());
                QuotationDetail {
                    quotation,
                    customer,
                    company,
                    items,
                }
            })
            .collect();

        timer.observe_duration();

        Ok(details)
    }

    /// Overwrite a quotation and replace its line items.
    ///
    /// The caller supplies the fully merged state plus freshly computed
    /// totals, so every column is written unconditionally.
    #[instrument(skip(self, input, totals), fields(quotation_id = %quotation_id))]
    pub async fn update_quotation(
        &self,
        quotation_id: Uuid,
        input: &CreateQuotation,
        totals: &PricingTotals,
    ) -> Result<Option<Quotation>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_quotation"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let quotation = sqlx::query_as::<_, Quotation>(&format!(
            r#"
            UPDATE quotations
            SET quotation_number = $2,
                issue_date = $3,
                customer_id = $4,
                company_id = $5,
                include_vat = $6,
                subtotal = $7,
                discount = $8,
                after_discount = $9,
                vat = $10,
                total_amount = $11,
                withholding = $12,
                net_total = $13,
                customer_signature = $14,
                seller_signature = $15,
                updated_utc = NOW()
            WHERE quotation_id = $1
            RETURNING {QUOTATION_COLUMNS}
            "#,
        ))
        .bind(quotation_id)
        .bind(&input.quotation_number)
        .bind(input.issue_date)
        .bind(input.customer_id)
        .bind(input.company_id)
        .bind(input.include_vat)
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.after_discount)
        .bind(totals.vat)
        .bind(totals.total_amount)
        .bind(totals.withholding)
        .bind(totals.net_total)
        .bind(&input.customer_signature)
        .bind(&input.seller_signature)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Quotation number '{}' already exists",
                    input.quotation_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to update quotation: {}", e)),
        })?;

        let quotation = match quotation {
            Some(q) => q,
            None => return Ok(None),
        };

        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = $1")
            .bind(quotation_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to replace quotation items: {}", e))
            })?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO quotation_items (
                    quotation_item_id, quotation_id, description, unit, quantity, price_per_unit, amount, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(quotation_id)
            .bind(&item.description)
            .bind(&item.unit)
            .bind(item.quantity)
            .bind(item.price_per_unit)
            .bind(item.amount)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert quotation item: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(quotation_id = %quotation.quotation_id, "Quotation updated");

        Ok(Some(quotation))
    }

    /// Delete a quotation. Line items are cascade-deleted.
    #[instrument(skip(self), fields(quotation_id = %quotation_id))]
    pub async fn delete_quotation(&self, quotation_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_quotation"])
            .start_timer();

        let result = sqlx::query("DELETE FROM quotations WHERE quotation_id = $1")
            .bind(quotation_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete quotation: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() > 0 {
            info!(quotation_id = %quotation_id, "Quotation deleted");
        }

        Ok(result.rows_affected() > 0)
    }

    // -------------------------------------------------------------------------
    // Financial Document Operations
    // -------------------------------------------------------------------------

    /// Create a financial document together with its line items.
    #[instrument(skip(self, input, totals), fields(document_number = %input.document_number))]
    pub async fn create_financial_document(
        &self,
        input: &CreateFinancialDocument,
        totals: &PricingTotals,
    ) -> Result<FinancialDocument, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["create_financial_document"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let document_id = Uuid::new_v4();
        let document = sqlx::query_as::<_, FinancialDocument>(&format!(
            r#"
            INSERT INTO financial_documents (
                document_id, document_number, document_type, issue_date, due_date,
                quotation_id, customer_id, company_id, include_vat,
                subtotal, discount, after_discount, vat, total_amount, withholding, net_total,
                is_paid, payment_method, payment_date, payment_reference,
                customer_signature, seller_signature
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19, $20, $21, $22)
            RETURNING {DOCUMENT_COLUMNS}
            "#,
        ))
        .bind(document_id)
        .bind(&input.document_number)
        .bind(input.document_type.as_str())
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(input.quotation_id)
        .bind(input.customer_id)
        .bind(input.company_id)
        .bind(input.include_vat)
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.after_discount)
        .bind(totals.vat)
        .bind(totals.total_amount)
        .bind(totals.withholding)
        .bind(totals.net_total)
        .bind(input.is_paid)
        .bind(&input.payment_method)
        .bind(input.payment_date)
        .bind(&input.payment_reference)
        .bind(&input.customer_signature)
        .bind(&input.seller_signature)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Document number '{}' already exists",
                    input.document_number
                ))
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                AppError::BadRequest(anyhow::anyhow!(
                    "Unknown customer, company profile or quotation"
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to create document: {}", e)),
        })?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO document_items (
                    document_item_id, document_id, description, unit, quantity, price_per_unit, amount, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(document.document_id)
            .bind(&item.description)
            .bind(&item.unit)
            .bind(item.quantity)
            .bind(item.price_per_unit)
            .bind(item.amount)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert document item: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(document_id = %document.document_id, document_number = %document.document_number, "Financial document created");

        Ok(document)
    }

    /// Get a financial document by ID.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_financial_document(
        &self,
        document_id: Uuid,
    ) -> Result<Option<FinancialDocument>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_financial_document"])
            .start_timer();

        let document = sqlx::query_as::<_, FinancialDocument>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM financial_documents WHERE document_id = $1"
        ))
        .bind(document_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to get document: {}", e)))?;

        timer.observe_duration();

        Ok(document)
    }

    /// Get line items for a financial document, in position order.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_document_items(
        &self,
        document_id: Uuid,
    ) -> Result<Vec<DocumentItem>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["get_document_items"])
            .start_timer();

        let items = sqlx::query_as::<_, DocumentItem>(
            r#"
            SELECT document_item_id, document_id, description, unit, quantity, price_per_unit, amount, position, created_utc
            FROM document_items
            WHERE document_id = $1
            ORDER BY position, created_utc
            "#,
        )
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get document items: {}", e))
        })?;

        timer.observe_duration();

        Ok(items)
    }

    /// Get a financial document with its customer, company, source quotation
    /// and items.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn get_financial_document_detail(
        &self,
        document_id: Uuid,
    ) -> Result<Option<FinancialDocumentDetail>, AppError> {
        let document = match self.get_financial_document(document_id).await? {
            Some(d) => d,
            None => return Ok(None),
        };

        let customer = self.get_customer(document.customer_id).await?;
        let company = match document.company_id {
            Some(company_id) => self.get_company_profile(company_id).await?,
            None => None,
        };
        let quotation = match document.quotation_id {
            Some(quotation_id) => self.get_quotation(quotation_id).await?,
            None => None,
        };
        let items = self.get_document_items(document_id).await?;

        Ok(Some(FinancialDocumentDetail {
            document,
            customer,
            company,
            quotation,
            items,
        }))
    }

    /// List all financial documents with their relations, newest first.
    #[instrument(skip(self))]
    pub async fn list_financial_documents(
        &self,
    ) -> Result<Vec<FinancialDocumentDetail>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["list_financial_documents"])
            .start_timer();

        let documents = sqlx::query_as::<_, FinancialDocument>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM financial_documents ORDER BY created_utc DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to list documents: {}", e)))?;

        let document_ids: Vec<Uuid> = documents.iter().map(|d| d.document_id).collect();
        let items = sqlx::query_as::<_, DocumentItem>(
            r#"
            SELECT document_item_id, document_id, description, unit, quantity, price_per_unit, amount, position, created_utc
            FROM document_items
            WHERE document_id = ANY($1)
            ORDER BY position, created_utc
            "#,
        )
        .bind(&document_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to list document items: {}", e))
        })?;

        let customers = self
            .customers_by_ids(&documents.iter().map(|d| d.customer_id).collect::<Vec<_>>())
            .await?;
        let companies = self
            .company_profiles_by_ids(&documents.iter().filter_map(|d| d.company_id).collect::<Vec<_>>())
            .await?;
        let quotations = self
            .quotations_by_ids(&documents.iter().filter_map(|d| d.quotation_id).collect::<Vec<_>>())
            .await?;

        let mut items_by_document: HashMap<Uuid, Vec<DocumentItem>> = HashMap::new();
        for item in items {
            items_by_document
                .entry(item.document_id)
                .or_default()
                .push(item);
        }

        let details = documents
            .into_iter()
            .map(|document| {
                let items = items_by_document
                    .remove(&document.document_id)
                    .unwrap_or_default();
                let customer = customers.get(&document.customer_id).cloned();
                let company = document
                    .company_id
                    .and_then(|id| companies.get(&id).cloned());
                let quotation = document
                    .quotation_id
                    .and_then(|id| quotations.get(&id).cloned());
                FinancialDocumentDetail {
                    document,
                    customer,
                    company,
                    quotation,
                    items,
                }
            })
            .collect();

        timer.observe_duration();

        Ok(details)
    }

    /// Overwrite a financial document and replace its line items.
    #[instrument(skip(self, input, totals), fields(document_id = %document_id))]
    pub async fn update_financial_document(
        &self,
        document_id: Uuid,
        input: &CreateFinancialDocument,
        totals: &PricingTotals,
    ) -> Result<Option<FinancialDocument>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["update_financial_document"])
            .start_timer();

        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to begin transaction: {}", e))
        })?;

        let document = sqlx::query_as::<_, FinancialDocument>(&format!(
            r#"
            UPDATE financial_documents
            SET document_number = $2,
                document_type = $3,
                issue_date = $4,
                due_date = $5,
                customer_id = $6,
                company_id = $7,
                include_vat = $8,
                subtotal = $9,
                discount = $10,
                after_discount = $11,
                vat = $12,
                total_amount = $13,
                withholding = $14,
                net_total = $15,
                is_paid = $16,
                payment_method = $17,
                payment_date = $18,
                payment_reference = $19,
                customer_signature = $20,
                seller_signature = $21,
                updated_utc = NOW()
            WHERE document_id = $1
            RETURNING {DOCUMENT_COLUMNS}
            "#,
        ))
        .bind(document_id)
        .bind(&input.document_number)
        .bind(input.document_type.as_str())
        .bind(input.issue_date)
        .bind(input.due_date)
        .bind(input.customer_id)
        .bind(input.company_id)
        .bind(input.include_vat)
        .bind(totals.subtotal)
        .bind(totals.discount)
        .bind(totals.after_discount)
        .bind(totals.vat)
        .bind(totals.total_amount)
        .bind(totals.withholding)
        .bind(totals.net_total)
        .bind(input.is_paid)
        .bind(&input.payment_method)
        .bind(input.payment_date)
        .bind(&input.payment_reference)
        .bind(&input.customer_signature)
        .bind(&input.seller_signature)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::Conflict(anyhow::anyhow!(
                    "Document number '{}' already exists",
                    input.document_number
                ))
            }
            _ => AppError::DatabaseError(anyhow::anyhow!("Failed to update document: {}", e)),
        })?;

        let document = match document {
            Some(d) => d,
            None => return Ok(None),
        };

        sqlx::query("DELETE FROM document_items WHERE document_id = $1")
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to replace document items: {}", e))
            })?;

        for (position, item) in input.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO document_items (
                    document_item_id, document_id, description, unit, quantity, price_per_unit, amount, position
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(document_id)
            .bind(&item.description)
            .bind(&item.unit)
            .bind(item.quantity)
            .bind(item.price_per_unit)
            .bind(item.amount)
            .bind(position as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to insert document item: {}", e))
            })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to commit transaction: {}", e))
        })?;

        timer.observe_duration();

        info!(document_id = %document.document_id, "Financial document updated");

        Ok(Some(document))
    }

    /// Delete a financial document. Line items are cascade-deleted.
    #[instrument(skip(self), fields(document_id = %document_id))]
    pub async fn delete_financial_document(&self, document_id: Uuid) -> Result<bool, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["delete_financial_document"])
            .start_timer();

        let result = sqlx::query("DELETE FROM financial_documents WHERE document_id = $1")
            .bind(document_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(anyhow::anyhow!("Failed to delete document: {}", e))
            })?;

        timer.observe_duration();

        if result.rows_affected() > 0 {
            info!(document_id = %document_id, "Financial document deleted");
        }

        Ok(result.rows_affected() > 0)
    }

    /// Latest document number matching a `PREFIXYYMM-%` pattern, by string
    /// order. Used to derive the next sequence for the month.
    #[instrument(skip(self))]
    pub async fn latest_document_number(&self, pattern: &str) -> Result<Option<String>, AppError> {
        let timer = DB_QUERY_DURATION
            .with_label_values(&["latest_document_number"])
            .start_timer();

        let number: Option<String> = sqlx::query_scalar(
            r#"
            SELECT document_number
            FROM financial_documents
            WHERE document_number LIKE $1
            ORDER BY document_number DESC
            LIMIT 1
            "#,
        )
        .bind(pattern)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to get latest document number: {}", e))
        })?;

        timer.observe_duration();

        Ok(number)
    }

    // -------------------------------------------------------------------------
    // Relation helpers
    // -------------------------------------------------------------------------

    async fn customers_by_ids(
        &self,
        customer_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Customer>, AppError> {
        if customer_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let customers = sqlx::query_as::<_, Customer>(&format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE customer_id = ANY($1)"
        ))
        .bind(customer_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(anyhow::anyhow!("Failed to load customers: {}", e)))?;

        Ok(customers
            .into_iter()
            .map(|c| (c.customer_id, c))
            .collect())
    }

    async fn company_profiles_by_ids(
        &self,
        company_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, CompanyProfile>, AppError> {
        if company_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let profiles = sqlx::query_as::<_, CompanyProfile>(&format!(
            "SELECT {COMPANY_PROFILE_COLUMNS} FROM company_profiles WHERE company_profile_id = ANY($1)"
        ))
        .bind(company_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to load company profiles: {}", e))
        })?;

        Ok(profiles
            .into_iter()
            .map(|p| (p.company_profile_id, p))
            .collect())
    }

    async fn quotations_by_ids(
        &self,
        quotation_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, Quotation>, AppError> {
        if quotation_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let quotations = sqlx::query_as::<_, Quotation>(&format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations WHERE quotation_id = ANY($1)"
        ))
        .bind(quotation_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(anyhow::anyhow!("Failed to load quotations: {}", e))
        })?;

        Ok(quotations
            .into_iter()
            .map(|q| (q.quotation_id, q))
            .collect())
    }
}
