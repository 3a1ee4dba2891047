//! Account management HTTP handlers.
//!
//! This module implements the account-related API endpoints:
//! - POST /api/v1/accounts - Create new account
//! - GET /api/v1/accounts/:id/balance - Get account balance
//! - GET /api/v1/accounts/:id/transactions - Get transaction history

use crate::{
    AppState,
    error::AppError,
    models::{
        account::{AccountResponse, CreateAccountRequest},
        transaction::TransactionResponse,
    },
    services::account_service,
    validation,
};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use uuid::Uuid;

/// Create a new account.
///
/// # Endpoint
///
/// `POST /api/v1/accounts`
///
/// # Request Body
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",  // optional, generated if absent
///   "balance_cents": 10000,                         // optional, defaults to 0
///   "currency": "USD"
/// }
/// ```
///
/// # Response
///
/// - **Success (201 Created)**: the stored account, including the
///   database-assigned creation timestamp
/// - **Error (400)**: field-level validation failures
/// - **Error (409)**: an account with this id already exists
/// - **Error (500)**: storage fault or deadline exceeded
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<AccountResponse>), AppError> {
    let violations = validation::validate_new_account(&request);
    if !violations.is_empty() {
        return Err(AppError::Validation(violations));
    }

    // Generate an id server-side when the client did not supply one
    let account_id = match request.id.as_deref() {
        Some(id) => validation::parse_account_id("id", id)
            .map_err(|violation| AppError::Validation(vec![violation]))?,
        None => Uuid::new_v4(),
    };

    let account = account_service::create_account(
        &state.pool,
        account_id,
        request.balance_cents.unwrap_or(0),
        &request.currency,
        state.config.operation_timeout(),
    )
    .await?;

    Ok((StatusCode::CREATED, Json(account.into())))
}

/// Get an account's balance snapshot.
///
/// # Endpoint
///
/// `GET /api/v1/accounts/{id}/balance`
///
/// # Response
///
/// - **Success (200 OK)**: account id, balance, currency, creation timestamp
/// - **Error (400)**: malformed account id in the path
/// - **Error (404)**: account not found
pub async fn get_balance(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<AccountResponse>, AppError> {
    let account_id = validation::parse_account_id("id", &account_id)
        .map_err(|violation| AppError::Validation(vec![violation]))?;

    let account = account_service::get_account(&state.pool, account_id).await?;

    Ok(Json(account.into()))
}

/// Get an account's transaction history.
///
/// # Endpoint
///
/// `GET /api/v1/accounts/{id}/transactions`
///
/// # Ordering
///
/// Transactions where this account is source or destination, newest first,
/// capped at the configured history limit (default 100).
///
/// # Response
///
/// - **Success (200 OK)**: array of transactions (may be empty)
/// - **Error (400)**: malformed account id in the path
/// - **Error (404)**: account not found
pub async fn get_history(
    State(state): State<AppState>,
    Path(account_id): Path<String>,
) -> Result<Json<Vec<TransactionResponse>>, AppError> {
    let account_id = validation::parse_account_id("id", &account_id)
        .map_err(|violation| AppError::Validation(vec![violation]))?;

    let transactions =
        account_service::get_history(&state.pool, account_id, state.config.history_limit).await?;

    let responses: Vec<TransactionResponse> = transactions.into_iter().map(Into::into).collect();

    Ok(Json(responses))
}
