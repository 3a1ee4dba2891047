//! Transfer service - Core business logic for moving money between accounts.
//!
//! This service handles:
//! - Deadlock-free row locking of the two accounts involved
//! - Balance and currency invariant checks
//! - Atomic balance mutation and audit-record insertion
//! - Database transaction management with a bounded deadline
//!
//! # Atomicity Guarantees
//!
//! The locked reads, both balance updates, and the transaction-record insert
//! all happen within one PostgreSQL transaction. The database ensures
//! all-or-nothing execution: every early-return failure path rolls back, and
//! dropping the transaction (including on deadline expiry) rolls back too,
//! so there is no partial-commit path.
//!
//! # Deadlock Avoidance
//!
//! Row locks are always acquired in the total order given by [`lock_order`],
//! independent of transfer direction. Two concurrent transfers A→B and B→A
//! therefore contend on the same first lock instead of each waiting on the
//! lock the other holds. This ordering is the sole deadlock-avoidance
//! mechanism; there is no lock-timeout-and-retry fallback.

use std::time::Duration;

use sqlx::{Postgres, Transaction as DbTx};
use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{account::Account, transaction::Transaction},
};

/// Fix the order in which two account rows are locked.
///
/// Returns the pair sorted by id, so callers lock the smaller id first no
/// matter which side of the transfer it is on.
pub fn lock_order(a: Uuid, b: Uuid) -> (Uuid, Uuid) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Read one account with an exclusive row lock held until the enclosing
/// transaction commits or rolls back.
async fn lock_account(
    tx: &mut DbTx<'_, Postgres>,
    account_id: Uuid,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, balance_cents, currency, created_at
        FROM accounts
        WHERE id = $1
        FOR UPDATE
        "#,
    )
    .bind(account_id)
    .fetch_optional(&mut **tx)
    .await
}

/// Execute a transfer between two accounts.
///
/// # Process
///
/// 1. Start database transaction
/// 2. Lock both account rows, smaller id first ([`lock_order`])
/// 3. Verify both accounts exist and share a currency
/// 4. Verify the source balance covers the amount
/// 5. Debit source, credit destination
/// 6. Record a completed transaction (storage assigns id and timestamp)
/// 7. Commit (or rollback on any failure)
///
/// The whole operation runs under `deadline`; exceeding it drops the
/// database transaction, which rolls back, and reports a timeout fault.
///
/// # Arguments
///
/// * `pool` - Database connection pool
/// * `from` - Source account id (validated upstream)
/// * `to` - Destination account id (validated upstream)
/// * `amount_cents` - Amount to move (validated positive upstream)
/// * `deadline` - Wall-clock bound on the entire operation
///
/// # Errors
///
/// - `AccountNotFound`: either account doesn't exist
/// - `CurrencyMismatch`: the accounts hold different currencies
/// - `InsufficientFunds`: source balance is smaller than the amount
/// - `Timeout`: the deadline expired before commit
/// - `Database`: a storage error occurred
pub async fn execute_transfer(
    pool: &DbPool,
    from: Uuid,
    to: Uuid,
    amount_cents: i64,
    deadline: Duration,
) -> Result<Transaction, AppError> {
    match tokio::time::timeout(deadline, transfer_in_tx(pool, from, to, amount_cents)).await {
        Ok(result) => result,
        // The in-flight sqlx transaction was dropped with the future and
        // rolled back; nothing was committed.
        Err(_elapsed) => Err(AppError::Timeout),
    }
}

async fn transfer_in_tx(
    pool: &DbPool,
    from: Uuid,
    to: Uuid,
    amount_cents: i64,
) -> Result<Transaction, AppError> {
    // Start database transaction
    let mut tx = pool.begin().await?;

    // Lock both rows in id order, independent of transfer direction.
    // FOR UPDATE holds an exclusive lock on each row until commit/rollback.
    let (first, second) = lock_order(from, to);
    let first_account = lock_account(&mut tx, first).await?;
    let second_account = lock_account(&mut tx, second).await?;

    let (Some(first_account), Some(second_account)) = (first_account, second_account) else {
        tx.rollback().await?;
        return Err(AppError::AccountNotFound);
    };

    // Map the lock-ordered rows back to transfer direction
    let (source, destination) = if first == from {
        (first_account, second_account)
    } else {
        (second_account, first_account)
    };

    // The schema-level trigger backstops this; the authoritative check
    // lives here so the caller gets a precise error.
    if source.currency != destination.currency {
        tx.rollback().await?;
        return Err(AppError::CurrencyMismatch);
    }

    if source.balance_cents < amount_cents {
        tx.rollback().await?;
        return Err(AppError::InsufficientFunds);
    }

    // Update both balances atomically
    sqlx::query("UPDATE accounts SET balance_cents = balance_cents - $1 WHERE id = $2")
        .bind(amount_cents)
        .bind(from)
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE accounts SET balance_cents = balance_cents + $1 WHERE id = $2")
        .bind(amount_cents)
        .bind(to)
        .execute(&mut *tx)
        .await?;

    // Record the transaction; storage assigns the id and timestamp
    let transaction = sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (from_account_id, to_account_id, amount_cents, status)
        VALUES ($1, $2, $3, $4)
        RETURNING id, from_account_id, to_account_id, amount_cents, status, created_at
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(amount_cents)
    .bind(crate::models::transaction::STATUS_COMPLETED)
    .fetch_one(&mut *tx)
    .await?;

    // Commit ALL changes atomically
    // If this fails, everything rolls back
    tx.commit().await?;

    Ok(transaction)
}


/// End-to-end checks against a real PostgreSQL instance.
///
/// Run with: `cargo test -- --ignored` and DATABASE_URL pointing at a
/// database the test user may migrate and write to. Accounts are created
/// fresh per test, so reruns do not collide.
#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::models::transaction::STATUS_COMPLETED;
    use crate::services::account_service;

    const DEADLINE: Duration = Duration::from_secs(5);

    async fn test_pool() -> DbPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
        let pool = crate::db::create_pool(&url, 10).await.expect("connect");
        crate::db::run_migrations(&pool).await.expect("migrate");
        pool
    }

    async fn new_account(pool: &DbPool, balance_cents: i64, currency: &str) -> Uuid {
        let account =
            account_service::create_account(pool, Uuid::new_v4(), balance_cents, currency, DEADLINE)
                .await
                .expect("create account");
        account.id
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn transfer_moves_funds_and_records_completed_transaction() {
        let pool = test_pool().await;
        let alice = new_account(&pool, 10_000, "USD").await;
        let bob = new_account(&pool, 5_000, "USD").await;

        let transaction = execute_transfer(&pool, alice, bob, 3_000, DEADLINE)
            .await
            .expect("transfer succeeds");

        assert_eq!(transaction.from_account_id, alice);
        assert_eq!(transaction.to_account_id, bob);
        assert_eq!(transaction.amount_cents, 3_000);
        assert_eq!(transaction.status, STATUS_COMPLETED);

        let alice_account = account_service::get_account(&pool, alice).await.unwrap();
        let bob_account = account_service::get_account(&pool, bob).await.unwrap();
        assert_eq!(alice_account.balance_cents, 7_000);
        assert_eq!(bob_account.balance_cents, 8_000);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn insufficient_funds_leaves_balances_unchanged() {
        let pool = test_pool().await;
        let alice = new_account(&pool, 7_000, "USD").await;
        let bob = new_account(&pool, 8_000, "USD").await;

        let result = execute_transfer(&pool, alice, bob, 100_000, DEADLINE).await;
        assert!(matches!(result, Err(AppError::InsufficientFunds)));

        let alice_account = account_service::get_account(&pool, alice).await.unwrap();
        let bob_account = account_service::get_account(&pool, bob).await.unwrap();
        assert_eq!(alice_account.balance_cents, 7_000);
        assert_eq!(bob_account.balance_cents, 8_000);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn mismatched_currencies_are_rejected_without_mutation() {
        let pool = test_pool().await;
        let alice = new_account(&pool, 10_000, "USD").await;
        let bob = new_account(&pool, 10_000, "EUR").await;

        let result = execute_transfer(&pool, alice, bob, 1_000, DEADLINE).await;
        assert!(matches!(result, Err(AppError::CurrencyMismatch)));

        let alice_account = account_service::get_account(&pool, alice).await.unwrap();
        assert_eq!(alice_account.balance_cents, 10_000);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn unknown_account_fails_with_not_found() {
        let pool = test_pool().await;
        let alice = new_account(&pool, 10_000, "USD").await;

        let result = execute_transfer(&pool, alice, Uuid::new_v4(), 1_000, DEADLINE).await;
        assert!(matches!(result, Err(AppError::AccountNotFound)));

        let alice_account = account_service::get_account(&pool, alice).await.unwrap();
        assert_eq!(alice_account.balance_cents, 10_000);
    }

    /// Opposing transfers between the same pair must all complete: the
    /// id-ordered locking means no pair of workers can hold each other's
    /// row, and the balance sum across the pair is invariant.
    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn concurrent_opposing_transfers_complete_without_deadlock() {
        const WORKERS: usize = 20;
        const AMOUNT: i64 = 250;

        let pool = test_pool().await;
        let alice = new_account(&pool, 100_000, "USD").await;
        let bob = new_account(&pool, 100_000, "USD").await;

        let mut handles = Vec::with_capacity(WORKERS);
        for worker in 0..WORKERS {
            let pool = pool.clone();
            // Alternate direction so every pair of neighbors opposes
            let (from, to) = if worker % 2 == 0 { (alice, bob) } else { (bob, alice) };
            handles.push(tokio::spawn(async move {
                execute_transfer(&pool, from, to, AMOUNT, Duration::from_secs(30)).await
            }));
        }

        for handle in handles {
            handle.await.expect("task").expect("transfer");
        }

        let alice_account = account_service::get_account(&pool, alice).await.unwrap();
        let bob_account = account_service::get_account(&pool, bob).await.unwrap();
        // Equal counts in each direction cancel out exactly
        assert_eq!(alice_account.balance_cents, 100_000);
        assert_eq!(bob_account.balance_cents, 100_000);
        assert_eq!(
            alice_account.balance_cents + bob_account.balance_cents,
            200_000
        );
    }
}
