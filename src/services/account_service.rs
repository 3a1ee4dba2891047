//! Account service - creation and read-side queries.
//!
//! These operations are thin compared to the transfer path: creation is a
//! short existence-check-then-insert transaction, and the queries are single
//! reads against committed state. No balances are cached in-process; every
//! read goes to the database.

use std::time::Duration;

use uuid::Uuid;

use crate::{
    db::DbPool,
    error::AppError,
    models::{account::Account, transaction::Transaction},
};

/// Create a new account.
///
/// Runs an existence check and the insert inside one database transaction,
/// under the same wall-clock deadline as the transfer path, so a duplicate
/// id reliably produces a conflict instead of a constraint error.
///
/// # Errors
///
/// - `AccountExists`: an account with this id already exists
/// - `Timeout`: the deadline expired before commit
/// - `Database`: a storage error occurred
pub async fn create_account(
    pool: &DbPool,
    account_id: Uuid,
    balance_cents: i64,
    currency: &str,
    deadline: Duration,
) -> Result<Account, AppError> {
    match tokio::time::timeout(
        deadline,
        create_in_tx(pool, account_id, balance_cents, currency),
    )
    .await
    {
        Ok(result) => result,
        Err(_elapsed) => Err(AppError::Timeout),
    }
}

async fn create_in_tx(
    pool: &DbPool,
    account_id: Uuid,
    balance_cents: i64,
    currency: &str,
) -> Result<Account, AppError> {
    let mut tx = pool.begin().await?;

    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
        .bind(account_id)
        .fetch_one(&mut *tx)
        .await?;

    if exists {
        tx.rollback().await?;
        return Err(AppError::AccountExists);
    }

    // The database assigns created_at
    let account = sqlx::query_as::<_, Account>(
        r#"
        INSERT INTO accounts (id, balance_cents, currency)
        VALUES ($1, $2, $3)
        RETURNING id, balance_cents, currency, created_at
        "#,
    )
    .bind(account_id)
    .bind(balance_cents)
    .bind(currency)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(account)
}

/// Fetch an account snapshot by id.
///
/// # Errors
///
/// - `AccountNotFound`: no account with this id
/// - `Database`: a storage error occurred
pub async fn get_account(pool: &DbPool, account_id: Uuid) -> Result<Account, AppError> {
    sqlx::query_as::<_, Account>(
        r#"
        SELECT id, balance_cents, currency, created_at
        FROM accounts
        WHERE id = $1
        "#,
    )
    .bind(account_id)
    .fetch_optional(pool)
    .await?
    .ok_or(AppError::AccountNotFound)
}

/// Fetch the transaction history for an account, newest first.
///
/// Returns transactions where the account is either the source or the
/// destination, capped at `limit` rows. Fails with not-found when the
/// account itself does not exist (an empty history is a valid result only
/// for a real account).
pub async fn get_history(
    pool: &DbPool,
    account_id: Uuid,
    limit: i64,
) -> Result<Vec<Transaction>, AppError> {
    let exists: bool = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM accounts WHERE id = $1)")
        .bind(account_id)
        .fetch_one(pool)
        .await?;

    if !exists {
        return Err(AppError::AccountNotFound);
    }

    // Tie-break on id so rows created in the same instant keep a stable order
    let transactions = sqlx::query_as::<_, Transaction>(
        r#"
        SELECT id, from_account_id, to_account_id, amount_cents, status, created_at
        FROM transactions
        WHERE from_account_id = $1 OR to_account_id = $1
        ORDER BY created_at DESC, id DESC
        LIMIT $2
        "#,
    )
    .bind(account_id)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    Ok(transactions)
}

/// End-to-end checks against a real PostgreSQL instance.
///
/// Run with: `cargo test -- --ignored` and DATABASE_URL pointing at a
/// database the test user may migrate and write to.
#[cfg(test)]
mod db_tests {
    use super::*;
    use crate::services::transfer_service;

    const DEADLINE: Duration = Duration::from_secs(5);

    async fn test_pool() -> DbPool {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set for DB tests");
        let pool = crate::db::create_pool(&url, 10).await.expect("connect");
        crate::db::run_migrations(&pool).await.expect("migrate");
        pool
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn duplicate_account_id_conflicts() {
        let pool = test_pool().await;
        let account_id = Uuid::new_v4();

        create_account(&pool, account_id, 0, "USD", DEADLINE)
            .await
            .expect("first create succeeds");

        let result = create_account(&pool, account_id, 0, "USD", DEADLINE).await;
        assert!(matches!(result, Err(AppError::AccountExists)));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn balance_query_for_unknown_account_is_not_found() {
        let pool = test_pool().await;
        let result = get_account(&pool, Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::AccountNotFound)));

        let result = get_history(&pool, Uuid::new_v4(), 100).await;
        assert!(matches!(result, Err(AppError::AccountNotFound)));
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn history_is_newest_first_and_capped() {
        let pool = test_pool().await;
        let alice = create_account(&pool, Uuid::new_v4(), 10_000, "USD", DEADLINE)
            .await
            .unwrap()
            .id;
        let bob = create_account(&pool, Uuid::new_v4(), 10_000, "USD", DEADLINE)
            .await
            .unwrap()
            .id;

        let mut transfer_ids = Vec::new();
        for _ in 0..3 {
            let transaction = transfer_service::execute_transfer(&pool, alice, bob, 100, DEADLINE)
                .await
                .unwrap();
            transfer_ids.push(transaction.id);
        }

        let history = get_history(&pool, alice, 2).await.unwrap();
        assert_eq!(history.len(), 2);
        // Newest first: the last two transfers, in reverse insertion order
        assert_eq!(history[0].id, transfer_ids[2]);
        assert_eq!(history[1].id, transfer_ids[1]);
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a migrated PostgreSQL"]
    async fn repeated_reads_without_transfers_are_identical() {
        let pool = test_pool().await;
        let alice = create_account(&pool, Uuid::new_v4(), 5_000, "USD", DEADLINE)
            .await
            .unwrap()
            .id;

        let first = get_account(&pool, alice).await.unwrap();
        let second = get_account(&pool, alice).await.unwrap();
        assert_eq!(first.balance_cents, second.balance_cents);
        assert_eq!(first.created_at, second.created_at);

        let first_history = get_history(&pool, alice, 100).await.unwrap();
        let second_history = get_history(&pool, alice, 100).await.unwrap();
        assert_eq!(first_history.len(), second_history.len());
    }
}
