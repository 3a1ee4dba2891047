//! Account data models and API request/response types.
//!
//! This module defines:
//! - `Account`: Database entity representing a ledger account
//! - `CreateAccountRequest`: Request body for creating accounts
//! - `AccountResponse`: Response body returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Currency codes accepted by the ledger.
///
/// The set is closed: account rows carry one of these codes and the
/// database CHECK constraint backstops the same list.
pub const SUPPORTED_CURRENCIES: [&str; 4] = ["USD", "EUR", "GBP", "KZT"];

/// Whether `code` belongs to the supported currency set.
pub fn is_supported_currency(code: &str) -> bool {
    SUPPORTED_CURRENCIES.contains(&code)
}

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table.
///
/// # Balance Storage
///
/// Balances are stored as `i64` cents to avoid floating-point precision issues.
///
/// For example:
/// - $10.50 is stored as 1050 cents
/// - $100.00 is stored as 10000 cents
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Unique identifier for this account
    pub id: Uuid,

    /// Current balance in cents (not dollars)
    ///
    /// Must be >= 0 (enforced by database CHECK constraint).
    /// Using i64 allows balances up to ~92 quadrillion dollars.
    pub balance_cents: i64,

    /// Currency code, one of [`SUPPORTED_CURRENCIES`]
    pub currency: String,

    /// Timestamp when account was created (assigned by the database)
    pub created_at: DateTime<Utc>,
}

/// Request body for creating a new account.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "balance_cents": 10000,
///   "currency": "USD"
/// }
/// ```
///
/// # Validation
///
/// - `id`: Optional; must be a well-formed UUID when supplied, otherwise one
///   is generated server-side
/// - `currency`: Required, one of the supported codes
/// - `balance_cents`: Optional, must be >= 0, defaults to 0
#[derive(Debug, Deserialize)]
pub struct CreateAccountRequest {
    /// Optional client-supplied account id
    pub id: Option<String>,

    /// Optional opening balance in cents (defaults to 0)
    pub balance_cents: Option<i64>,

    /// Currency code; validated against the supported set
    #[serde(default)]
    pub currency: String,
}

/// Response body for account endpoints.
///
/// # JSON Example
///
/// ```json
/// {
///   "id": "550e8400-e29b-41d4-a716-446655440000",
///   "balance_cents": 100000,
///   "currency": "USD",
///   "created_at": "2025-12-20T10:00:00Z"
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AccountResponse {
    /// Account unique identifier
    pub id: Uuid,

    /// Current balance in cents
    pub balance_cents: i64,

    /// Currency code
    pub currency: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            balance_cents: account.balance_cents,
            currency: account.currency,
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn supported_currencies_accepted() {
        for code in SUPPORTED_CURRENCIES {
            assert!(is_supported_currency(code));
        }
    }

    #[test]
    fn unknown_currencies_rejected() {
        assert!(!is_supported_currency("XYZ"));
        assert!(!is_supported_currency("usd"));
        assert!(!is_supported_currency(""));
    }

    #[test]
    fn create_request_defaults_optional_fields() {
        let request: CreateAccountRequest =
            serde_json::from_str(r#"{"currency": "USD"}"#).unwrap();
        assert!(request.id.is_none());
        assert!(request.balance_cents.is_none());
        assert_eq!(request.currency, "USD");
    }

    #[test]
    fn create_request_tolerates_missing_currency() {
        // Missing currency must reach the validator (as an empty string)
        // rather than fail JSON deserialization.
        let request: CreateAccountRequest = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(request.currency, "");
    }
}
