//! Request validation.
//!
//! The validators here are pure functions: they inspect a deserialized
//! request and return a list of field-level violations without touching the
//! database. An invalid request is a normal, reportable outcome, so every
//! rule is checked independently and all violations are reported together.

use serde_json::{Value, json};
use uuid::Uuid;

use crate::models::{
    account::{CreateAccountRequest, SUPPORTED_CURRENCIES, is_supported_currency},
    transaction::TransferRequest,
};

/// A single field-level validation violation.
///
/// Serialized into the `details` array of a `validation_failed` error
/// response.
///
/// ```json
/// { "field": "amount_cents", "message": "...", "value": 0 }
/// ```
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct FieldViolation {
    /// Name of the offending request field
    pub field: &'static str,

    /// Human-readable description of the rule that was broken
    pub message: String,

    /// The offending value, when there is one worth echoing back
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldViolation {
    fn new(field: &'static str, message: impl Into<String>, value: Value) -> Self {
        Self {
            field,
            message: message.into(),
            value: Some(value),
        }
    }
}

/// Whether `id` is a well-formed account identifier (UUID text form).
pub fn is_well_formed_id(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

/// Parse an account id, reporting a violation for `field` when malformed.
///
/// Used by handlers for path parameters and for ids the validator has
/// already vetted, so malformed ids surface as a field-level violation
/// rather than a router-level 404 or a panic.
pub fn parse_account_id(field: &'static str, id: &str) -> Result<Uuid, FieldViolation> {
    Uuid::parse_str(id).map_err(|_| {
        FieldViolation::new(field, "must be a well-formed account id (UUID)", json!(id))
    })
}

/// Validate a transfer request.
///
/// # Rules
///
/// - `from` and `to` must each be well-formed account ids
/// - `to` must differ from `from` (only checked once both are well-formed)
/// - `amount_cents` must be strictly positive
///
/// Returns an empty vector when the request is valid.
pub fn validate_transfer(request: &TransferRequest) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    let from_id = Uuid::parse_str(&request.from).ok();
    if from_id.is_none() {
        violations.push(FieldViolation::new(
            "from",
            "must be a well-formed account id (UUID)",
            json!(request.from),
        ));
    }

    let to_id = Uuid::parse_str(&request.to).ok();
    if to_id.is_none() {
        violations.push(FieldViolation::new(
            "to",
            "must be a well-formed account id (UUID)",
            json!(request.to),
        ));
    }

    // Compare parsed ids so case-variant spellings of the same id are
    // still caught here instead of by the storage constraint
    if let (Some(from_id), Some(to_id)) = (from_id, to_id) {
        if from_id == to_id {
            violations.push(FieldViolation::new(
                "to",
                "must differ from the source account",
                json!(request.to),
            ));
        }
    }

    if request.amount_cents <= 0 {
        violations.push(FieldViolation::new(
            "amount_cents",
            "must be present and strictly greater than zero",
            json!(request.amount_cents),
        ));
    }

    violations
}

/// Validate an account creation request.
///
/// # Rules
///
/// - `currency` must belong to the supported set
/// - `balance_cents`, when supplied, must be >= 0
/// - `id`, when supplied, must be a well-formed account id (one is
///   generated server-side otherwise)
pub fn validate_new_account(request: &CreateAccountRequest) -> Vec<FieldViolation> {
    let mut violations = Vec::new();

    if !is_supported_currency(&request.currency) {
        violations.push(FieldViolation::new(
            "currency",
            format!("must be one of: {}", SUPPORTED_CURRENCIES.join(", ")),
            json!(request.currency),
        ));
    }

    if let Some(balance_cents) = request.balance_cents {
        if balance_cents < 0 {
            violations.push(FieldViolation::new(
                "balance_cents",
                "must be greater than or equal to zero",
                json!(balance_cents),
            ));
        }
    }

    if let Some(ref id) = request.id {
        if !is_well_formed_id(id) {
            violations.push(FieldViolation::new(
                "id",
                "must be a well-formed account id (UUID)",
                json!(id),
            ));
        }
    }

    violations
}
