//! API error types with HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use domain::RepositoryError;
use inventory::LedgerError;
use saga::{GatewayError, SagaError};

/// API-level error type that maps to HTTP responses.
#[derive(Debug)]
pub enum ApiError {
    /// No valid principal on the request.
    Unauthorized(String),
    /// Bad request from the client.
    BadRequest(String),
    /// Saga execution error (order surface).
    Saga(SagaError),
    /// Catalog lookup error (inventory surface).
    Gateway(GatewayError),
    /// Raw ledger error (inventory surface).
    Ledger(LedgerError),
    /// Internal server error.
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Saga(err) => saga_error_to_response(err),
            ApiError::Gateway(err) => gateway_error_to_response(err),
            ApiError::Ledger(err) => ledger_error_to_response(err),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "internal server error");
                (StatusCode::INTERNAL_SERVER_ERROR, msg)
            }
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

fn saga_error_to_response(err: SagaError) -> (StatusCode, String) {
    match &err {
        SagaError::EmptyOrder
        | SagaError::InvalidQuantity(_)
        | SagaError::ProductUnavailable(_)
        | SagaError::InsufficientStock(_)
        | SagaError::Order(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        SagaError::OrderNotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        SagaError::AccessDenied => (StatusCode::FORBIDDEN, err.to_string()),
        SagaError::CatalogUnreachable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
        SagaError::Repository(RepositoryError::NotFound(_)) => {
            (StatusCode::NOT_FOUND, err.to_string())
        }
        SagaError::Repository(_) => (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()),
    }
}

fn gateway_error_to_response(err: GatewayError) -> (StatusCode, String) {
    match &err {
        GatewayError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        GatewayError::Conflict { .. } => (StatusCode::CONFLICT, err.to_string()),
        GatewayError::Unavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, err.to_string()),
    }
}

fn ledger_error_to_response(err: LedgerError) -> (StatusCode, String) {
    match &err {
        LedgerError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
        LedgerError::InsufficientStock { .. }
        | LedgerError::OverRelease { .. }
        | LedgerError::InvalidQuantity { .. } => (StatusCode::CONFLICT, err.to_string()),
        LedgerError::WouldGoNegative { .. } => (StatusCode::BAD_REQUEST, err.to_string()),
        LedgerError::Database(db_err) => {
            tracing::error!(error = %db_err, "ledger database error");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal error".to_string(),
            )
        }
    }
}

impl From<SagaError> for ApiError {
    fn from(err: SagaError) -> Self {
        ApiError::Saga(err)
    }
}

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        ApiError::Gateway(err)
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError::Ledger(err)
    }
}
