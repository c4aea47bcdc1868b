//! The composite atomic ledger mutations.
//!
//! Every balance change flows through here, coupled to its transaction row
//! in a single database transaction:
//!
//! - [`Ledger::commit_generation`]: debit + SPEND transaction + asset record
//! - [`Ledger::grant_credits`]: credit + DEPOSIT transaction
//!
//! The debit is a conditional update (`... AND credits >= amount`) checked by
//! affected-row count, so two concurrent spends against the same balance
//! serialize on the user row and the loser observes the already-reduced
//! balance. The balance check the orchestrator performs before calling the
//! provider is advisory only; this is where correctness is enforced.

use crate::types::{AssetId, ModelId, UserId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::transactions::Transaction,
    models::{
        assets::{AssetCreateDBRequest, AssetDBResponse},
        transactions::{TransactionDBResponse, TransactionKind, TransactionStatus},
        users::UserDBResponse,
    },
};
use crate::api::models::users::Role;
use chrono::{DateTime, Utc};
use sqlx::{Connection, FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

// Database entity models for the rows returned inside the commit
#[derive(Debug, Clone, FromRow)]
struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: Option<String>,
    pub role: Role,
    pub credits: i64,
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, FromRow)]
struct AssetRow {
    pub id: AssetId,
    pub user_id: UserId,
    pub model_id: ModelId,
    pub prompt: String,
    pub result_url: String,
    pub cost: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful generation commit
#[derive(Debug, Clone)]
pub struct GenerationCommitDBResponse {
    pub asset: AssetDBResponse,
    /// The SPEND row; absent for zero-cost models, which debit nothing
    pub transaction: Option<TransactionDBResponse>,
    pub new_balance: i64,
}

pub struct Ledger<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Ledger<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Commit a successful generation: debit the user, append the SPEND
    /// transaction, record the asset. All three or none.
    ///
    /// Returns `Ok(None)` when the conditional debit matched no row, i.e. the
    /// balance no longer covers the cost (a concurrent spend won the race).
    /// No partial state is left behind in that case.
    #[instrument(
        skip(self, request),
        fields(user_id = %abbrev_uuid(&request.user_id), model_id = %abbrev_uuid(&request.model_id), cost = request.cost),
        err
    )]
    pub async fn commit_generation(
        &mut self,
        request: &AssetCreateDBRequest,
        description: &str,
    ) -> Result<Option<GenerationCommitDBResponse>> {
        let mut tx = self.db.begin().await?;

        let new_balance;
        let spend;
        if request.cost > 0 {
            // The balance check and debit as one atomic step. rows_affected == 0
            // means the balance was below the cost at debit time.
            let debited = sqlx::query_as::<_, User>(
                "UPDATE users SET credits = credits - $1 WHERE id = $2 AND credits >= $1 RETURNING *",
            )
            .bind(request.cost)
            .bind(request.user_id)
            .fetch_optional(&mut *tx)
            .await?;

            let Some(user) = debited else {
                // Implicit rollback on drop; nothing has been written.
                return Ok(None);
            };
            new_balance = user.credits;

            let transaction = sqlx::query_as::<_, Transaction>(
                r#"
                INSERT INTO transactions (user_id, kind, amount, description, status)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(request.user_id)
            .bind(TransactionKind::Spend)
            .bind(request.cost)
            .bind(description)
            .bind(TransactionStatus::Completed)
            .fetch_one(&mut *tx)
            .await?;
            spend = Some(TransactionDBResponse::from(transaction));
        } else {
            // Zero-cost models debit nothing and leave no SPEND row; the
            // transactions.amount > 0 constraint forbids one anyway.
            let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
                .bind(request.user_id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or(DbError::NotFound)?;
            new_balance = user.credits;
            spend = None;
        }

        let asset = sqlx::query_as::<_, AssetRow>(
            r#"
            INSERT INTO generated_assets (id, user_id, model_id, prompt, result_url, cost)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(request.user_id)
        .bind(request.model_id)
        .bind(&request.prompt)
        .bind(&request.result_url)
        .bind(request.cost)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(Some(GenerationCommitDBResponse {
            asset: AssetDBResponse {
                id: asset.id,
                user_id: asset.user_id,
                model_id: asset.model_id,
                prompt: asset.prompt,
                result_url: asset.result_url,
                cost: asset.cost,
                created_at: asset.created_at,
                model_name: None,
                user_name: None,
            },
            transaction: spend,
            new_balance,
        }))
    }

    /// Credit a user's balance and append the matching DEPOSIT transaction.
    /// Both or neither.
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id), amount), err)]
    pub async fn grant_credits(&mut self, user_id: UserId, amount: i64, description: &str) -> Result<(UserDBResponse, TransactionDBResponse)> {
        let mut tx = self.db.begin().await?;

        let user = sqlx::query_as::<_, User>("UPDATE users SET credits = credits + $1 WHERE id = $2 RETURNING *")
            .bind(amount)
            .bind(user_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(DbError::NotFound)?;

        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (user_id, kind, amount, description, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(TransactionKind::Deposit)
        .bind(amount)
        .bind(description)
        .bind(TransactionStatus::Completed)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok((
            UserDBResponse {
                id: user.id,
                name: user.name,
                email: user.email,
                role: user.role,
                credits: user.credits,
                avatar_url: user.avatar_url,
                joined_at: user.joined_at,
                last_login: user.last_login,
                password_hash: user.password_hash,
            },
            TransactionDBResponse::from(transaction),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Transactions, Users};
    use crate::test_utils::{create_test_model, create_test_user, create_test_user_with_credits};
    use sqlx::PgPool;

    fn commit_request(user_id: UserId, model_id: ModelId, cost: i64) -> AssetCreateDBRequest {
        AssetCreateDBRequest {
            user_id,
            model_id,
            prompt: "a red fox in snow".to_string(),
            result_url: "https://cdn.example.com/fox.jpg".to_string(),
            cost,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_commit_debits_exactly_once(pool: PgPool) {
        let user = create_test_user_with_credits(&pool, 100).await;
        let model = create_test_model(&pool, 50).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut ledger = Ledger::new(&mut conn);
        let commit = ledger
            .commit_generation(&commit_request(user.id, model.id, 50), "Generated content: Test Model")
            .await
            .unwrap()
            .expect("balance covers the cost");

        assert_eq!(commit.new_balance, 50);
        assert_eq!(commit.asset.cost, 50);
        let spend = commit.transaction.expect("non-zero cost records a SPEND");
        assert_eq!(spend.kind, TransactionKind::Spend);
        assert_eq!(spend.amount, 50);
        assert_eq!(spend.status, TransactionStatus::Completed);

        let mut users = Users::new(&mut conn);
        assert_eq!(users.get_by_id(user.id).await.unwrap().unwrap().credits, 50);

        let mut transactions = Transactions::new(&mut conn);
        assert_eq!(transactions.list_for_user(user.id).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_insufficient_balance_leaves_no_partial_state(pool: PgPool) {
        let user = create_test_user_with_credits(&pool, 30).await;
        let model = create_test_model(&pool, 50).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut ledger = Ledger::new(&mut conn);
        let commit = ledger
            .commit_generation(&commit_request(user.id, model.id, 50), "Generated content: Test Model")
            .await
            .unwrap();
        assert!(commit.is_none());

        // Balance, transaction log, and asset log are all untouched
        let mut users = Users::new(&mut conn);
        assert_eq!(users.get_by_id(user.id).await.unwrap().unwrap().credits, 30);
        let mut transactions = Transactions::new(&mut conn);
        assert!(transactions.list_for_user(user.id).await.unwrap().is_empty());
        let mut assets = crate::db::handlers::Assets::new(&mut conn);
        assert!(assets.list_for_user(user.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_zero_cost_commit_records_asset_only(pool: PgPool) {
        let user = create_test_user(&pool).await;
        let model = create_test_model(&pool, 0).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut ledger = Ledger::new(&mut conn);
        let commit = ledger
            .commit_generation(&commit_request(user.id, model.id, 0), "Generated content: Test Model")
            .await
            .unwrap()
            .expect("zero cost always commits");

        assert_eq!(commit.new_balance, 0);
        assert!(commit.transaction.is_none());

        let mut transactions = Transactions::new(&mut conn);
        assert!(transactions.list_for_user(user.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_grant_credits(pool: PgPool) {
        let user = create_test_user(&pool).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut ledger = Ledger::new(&mut conn);
        let (updated, transaction) = ledger.grant_credits(user.id, 500, "Admin grant").await.unwrap();

        assert_eq!(updated.credits, 500);
        assert_eq!(transaction.kind, TransactionKind::Deposit);
        assert_eq!(transaction.amount, 500);

        let mut transactions = Transactions::new(&mut conn);
        let log = transactions.list_for_user(user.id).await.unwrap();
        assert_eq!(log.len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_grant_credits_unknown_user(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut ledger = Ledger::new(&mut conn);
        let err = ledger.grant_credits(Uuid::new_v4(), 500, "Admin grant").await.unwrap_err();
        assert!(matches!(err, DbError::NotFound));
    }

    /// Two concurrent commits against a balance that covers only one: exactly
    /// one succeeds, the final balance is zero, and exactly one SPEND exists.
    #[sqlx::test]
    #[test_log::test]
    async fn test_concurrent_commits_cannot_double_spend(pool: PgPool) {
        let user = create_test_user_with_credits(&pool, 50).await;
        let model = create_test_model(&pool, 50).await;

        let commit = |pool: PgPool| {
            let request = commit_request(user.id, model.id, 50);
            async move {
                let mut conn = pool.acquire().await.unwrap();
                let mut ledger = Ledger::new(&mut conn);
                ledger.commit_generation(&request, "Generated content: Test Model").await.unwrap()
            }
        };

        let (first, second) = tokio::join!(
            tokio::spawn(commit(pool.clone())),
            tokio::spawn(commit(pool.clone()))
        );
        let outcomes = [first.unwrap(), second.unwrap()];

        let successes = outcomes.iter().filter(|o| o.is_some()).count();
        assert_eq!(successes, 1, "exactly one of two concurrent spends may win");

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert_eq!(users.get_by_id(user.id).await.unwrap().unwrap().credits, 0);
        let mut transactions = Transactions::new(&mut conn);
        assert_eq!(transactions.list_for_user(user.id).await.unwrap().len(), 1);
    }
}
