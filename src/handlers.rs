use crate::errors::AppError;
use crate::loan_storage::LoanWriter;
use crate::models::SubmitLoanResponse;
use crate::validation::validate_loan_payload;
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use serde_json::json;
use std::sync::Arc;

/// Shared application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Writes validated submissions to the warehouse.
    pub writer: LoanWriter,
}

/// Health check endpoint.
///
/// Returns the service status and version. Does not touch the warehouse.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": "loan-risk-api",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// POST /submit-loan
///
/// Validates the risk assessment payload and stores it as one warehouse row.
///
/// Flow:
/// 1. Parse the body as untyped JSON.
/// 2. Check it against the column catalog (rejects before any warehouse call).
/// 3. Assign an identifier and timestamp, insert the present fields.
///
/// # Returns
///
/// * `Result<Json<SubmitLoanResponse>, AppError>` - The generated loan id, or
///   400 for malformed JSON, 413 for an oversized body, 422 for an invalid
///   payload and 500 when the warehouse write fails.
pub async fn submit_loan(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<SubmitLoanResponse>, AppError> {
    let Json(payload) = payload.map_err(|e| {
        let status = e.status();
        if status == StatusCode::BAD_REQUEST {
            AppError::BadRequest(e.body_text())
        } else {
            AppError::Rejected {
                status,
                message: e.body_text(),
            }
        }
    })?;
    tracing::info!("POST /submit-loan");

    let record = validate_loan_payload(&payload)?;
    tracing::debug!(
        "Payload accepted: lineOfBusiness={}, propertyType={}, loanType={}",
        record.line_of_business,
        record.property_type,
        record.loan_type
    );

    let loan_id = state.writer.submit(&record).await?;

    Ok(Json(SubmitLoanResponse::submitted(loan_id.to_string())))
}
