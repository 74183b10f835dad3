pub mod config;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod pricing;
pub mod services;
pub mod startup;
pub mod utils;

use axum::{
    extract::State,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    security_headers::security_headers_middleware, tracing::request_id_middleware,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::QuotationConfig;
use crate::services::{Database, JwtService};

#[derive(Clone)]
pub struct AppState {
    pub config: QuotationConfig,
    pub db: Database,
    pub jwt: JwtService,
}

pub fn build_router(state: AppState) -> Router {
    // Admin-only user management; auth runs before the role check
    let admin_routes = Router::new()
        .route(
            "/users",
            get(handlers::users::list_users).post(handlers::users::create_user),
        )
        .route(
            "/users/:user_id",
            get(handlers::users::get_user)
                .put(handlers::users::update_user)
                .delete(handlers::users::delete_user),
        )
        .layer(from_fn(middleware::admin_middleware))
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    // Routes available to any authenticated user
    let protected_routes = Router::new()
        .route("/users/me", get(handlers::auth::me))
        .route(
            "/customers",
            get(handlers::customers::list_customers).post(handlers::customers::create_customer),
        )
        .route(
            "/customers/:customer_id",
            get(handlers::customers::get_customer)
                .put(handlers::customers::update_customer)
                .delete(handlers::customers::delete_customer),
        )
        .route(
            "/company-profiles",
            get(handlers::company_profiles::list_company_profiles)
                .post(handlers::company_profiles::create_company_profile),
        )
        .route(
            "/company-profiles/default",
            get(handlers::company_profiles::get_default_company_profile),
        )
        .route(
            "/company-profiles/:company_profile_id",
            get(handlers::company_profiles::get_company_profile)
                .put(handlers::company_profiles::update_company_profile)
                .delete(handlers::company_profiles::delete_company_profile),
        )
        .route(
            "/quotations",
            get(handlers::quotations::list_quotations).post(handlers::quotations::create_quotation),
        )
        .route(
            "/quotations/reverse-calculation",
            post(handlers::quotations::reverse_calculation),
        )
        .route(
            "/quotations/:quotation_id",
            get(handlers::quotations::get_quotation)
                .put(handlers::quotations::update_quotation)
                .delete(handlers::quotations::delete_quotation),
        )
        .route(
            "/financial-documents",
            get(handlers::financial_documents::list_financial_documents)
                .post(handlers::financial_documents::create_financial_document),
        )
        .route(
            "/financial-documents/from-quotation",
            post(handlers::financial_documents::create_from_quotation),
        )
        .route(
            "/financial-documents/generate-document-number",
            post(handlers::financial_documents::generate_document_number),
        )
        .route(
            "/financial-documents/:document_id",
            get(handlers::financial_documents::get_financial_document)
                .put(handlers::financial_documents::update_financial_document)
                .delete(handlers::financial_documents::delete_financial_document),
        )
        .layer(from_fn_with_state(state.clone(), middleware::auth_middleware));

    let cors = CorsLayer::new()
        .allow_origin(
            state
                .config
                .security
                .allowed_origins
                .iter()
                .filter_map(|origin| {
                    origin
                        .parse::<axum::http::HeaderValue>()
                        .map_err(|e| {
                            tracing::error!("Invalid CORS origin '{}': {}", origin, e);
                            e
                        })
                        .ok()
                })
                .collect::<Vec<axum::http::HeaderValue>>(),
        )
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
        ])
        .allow_credentials(true);

    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(handlers::metrics::metrics))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route(
            "/auth/reset-password/request",
            post(handlers::auth::request_password_reset),
        )
        .route(
            "/auth/reset-password/confirm",
            post(handlers::auth::confirm_password_reset),
        )
        .merge(admin_routes)
        .merge(protected_routes)
        .with_state(state)
        .layer(from_fn(middleware::metrics_middleware))
        .layer(TraceLayer::new_for_http().make_span_with(
            |request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("-");

                tracing::info_span!(
                    "http_request",
                    request_id = %request_id,
                    method = %request.method(),
                    uri = %request.uri(),
                )
            },
        ))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors)
}

/// Service health check
pub async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        e
    })?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "quotation-service",
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {
            "postgres": "up"
        }
    })))
}
