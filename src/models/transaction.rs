//! Transaction data models and API request/response types.
//!
//! This module defines:
//! - `Transaction`: Database entity representing a completed transfer
//! - `TransferRequest`: Request body for the transfer endpoint
//! - `TransactionResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Transaction status written for every transfer that reaches the insert
/// step. The schema also allows "pending" and "failed", but this service
/// records transfers synchronously inside the atomic unit, so only
/// completed rows are ever written.
pub const STATUS_COMPLETED: &str = "completed";

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. Each transaction:
/// - Has a monotonically assigned BIGSERIAL id
/// - References the source and destination accounts
/// - Stores the amount in cents (never floats!)
/// - Is immutable once written
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Unique identifier, assigned by storage in insertion order
    pub id: i64,

    /// Source account (balance decreased)
    pub from_account_id: Uuid,

    /// Destination account (balance increased)
    pub to_account_id: Uuid,

    /// Amount in cents
    ///
    /// Must be positive (enforced by CHECK constraint)
    pub amount_cents: i64,

    /// Transaction status, always "completed" for rows this service writes
    pub status: String,

    /// When transaction was created (assigned by the database)
    pub created_at: DateTime<Utc>,
}

/// Request to transfer money between accounts.
///
/// # JSON Example
///
/// ```json
/// {
///   "from": "550e8400-e29b-41d4-a716-446655440000",
///   "to": "660e8400-e29b-41d4-a716-446655440001",
///   "amount_cents": 25000
/// }
/// ```
///
/// The account ids arrive as strings and are checked by the validator, so a
/// malformed id produces a field-level violation instead of a
/// deserialization failure. A missing amount deserializes to 0 and is
/// likewise reported by the validator.
#[derive(Debug, Deserialize)]
pub struct TransferRequest {
    /// Account to transfer from (will decrease)
    pub from: String,

    /// Account to transfer to (will increase)
    pub to: String,

    /// Amount to transfer in cents
    #[serde(default)]
    pub amount_cents: i64,
}

/// Response returned for a completed transfer.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": 42,
///   "from_account_id": "550e8400-e29b-41d4-a716-446655440000",
///   "to_account_id": "660e8400-e29b-41d4-a716-446655440001",
///   "amount_cents": 25000,
///   "status": "completed",
///   "created_at": "2025-12-21T16:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct TransactionResponse {
    pub id: i64,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount_cents: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            id: transaction.id,
            from_account_id: transaction.from_account_id,
            to_account_id: transaction.to_account_id,
            amount_cents: transaction.amount_cents,
            status: transaction.status,
            created_at: transaction.created_at,
        }
    }
}
