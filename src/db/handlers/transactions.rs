//! Read access to the append-only transaction ledger.
//!
//! Writes go through [`crate::db::handlers::Ledger`], which couples every
//! transaction row to the matching balance mutation.

use crate::types::{TransactionId, UserId, abbrev_uuid};
use crate::db::{
    errors::Result,
    models::transactions::{TransactionDBResponse, TransactionKind, TransactionStatus, TransactionSummaryDBResponse},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model
#[derive(Debug, Clone, FromRow)]
pub(crate) struct Transaction {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<Transaction> for TransactionDBResponse {
    fn from(tx: Transaction) -> Self {
        Self {
            id: tx.id,
            user_id: tx.user_id,
            kind: tx.kind,
            amount: tx.amount,
            description: tx.description,
            status: tx.status,
            created_at: tx.created_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct Summary {
    pub total_deposited: i64,
    pub total_spent: i64,
}

pub struct Transactions<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Transactions<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// List transactions for a specific user, newest first
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<TransactionDBResponse>> {
        let transactions =
            sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE user_id = $1 ORDER BY created_at DESC, id DESC")
                .bind(user_id)
                .fetch_all(&mut *self.db)
                .await?;

        Ok(transactions.into_iter().map(TransactionDBResponse::from).collect())
    }

    /// List all transactions across all users (admin view)
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<TransactionDBResponse>> {
        let transactions = sqlx::query_as::<_, Transaction>("SELECT * FROM transactions ORDER BY created_at DESC, id DESC")
            .fetch_all(&mut *self.db)
            .await?;

        Ok(transactions.into_iter().map(TransactionDBResponse::from).collect())
    }

    /// Aggregate a user's completed deposits and spends.
    ///
    /// `current_balance` is derived from the ledger (deposits minus spends),
    /// which equals the authoritative `users.credits` column whenever the
    /// ledger invariant holds.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn summary_for_user(&mut self, user_id: UserId) -> Result<TransactionSummaryDBResponse> {
        let summary = sqlx::query_as::<_, Summary>(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN kind = 'DEPOSIT' THEN amount ELSE 0 END), 0)::BIGINT AS total_deposited,
                COALESCE(SUM(CASE WHEN kind = 'SPEND' THEN amount ELSE 0 END), 0)::BIGINT AS total_spent
            FROM transactions
            WHERE user_id = $1 AND status = 'completed'
            "#,
        )
        .bind(user_id)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(TransactionSummaryDBResponse {
            total_deposited: summary.total_deposited,
            total_spent: summary.total_spent,
            current_balance: summary.total_deposited - summary.total_spent,
        })
    }
}
