//! Transfer HTTP handler.
//!
//! - POST /api/v1/transfer - Move money between two accounts

use crate::{
    AppState,
    error::AppError,
    models::transaction::{TransactionResponse, TransferRequest},
    services::transfer_service,
    validation,
};
use axum::{Json, extract::State};

/// Transfer money between accounts.
///
/// # Request Body
///
/// ```json
/// {
///   "from": "550e8400-...",
///   "to": "660e8400-...",
///   "amount_cents": 3000
/// }
/// ```
///
/// # Atomicity
///
/// Both accounts are updated in a single database transaction.
/// Either both succeed or both fail.
///
/// # Response
///
/// - **Success (200 OK)**: the completed transaction record
/// - **Error (400)**: validation failures, insufficient funds, or a
///   currency mismatch
/// - **Error (404)**: one or both accounts not found
/// - **Error (500)**: storage fault or deadline exceeded
pub async fn create_transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<Json<TransactionResponse>, AppError> {
    // Invalid requests never reach storage
    let violations = validation::validate_transfer(&request);
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    // Both parses succeed for a request the validator passed
    let from = validation::parse_account_id("from", &request.from)
        .map_err(|violation| AppError::Validation(vec![violation]))?;
    let to = validation::parse_account_id("to", &request.to)
        .map_err(|violation| AppError::Validation(vec![violation]))?;

    let transaction = transfer_service::execute_transfer(
        &state.pool,
        from,
        to,
        request.amount_cents,
        state.config.operation_timeout(),
    )
    .await?;

    Ok(Json(transaction.into()))
}
