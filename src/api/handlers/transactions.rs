use axum::{
    Json,
    extract::{Path, State},
};

use crate::{
    AppState,
    api::models::{
        transactions::{TransactionResponse, TransactionSummaryResponse},
        users::CurrentUser,
    },
    auth::require_admin,
    db::handlers::Transactions,
    errors::Error,
    types::UserId,
};

/// The ledger is private: a caller may read their own history, admins may read anyone's.
fn require_self_or_admin(current_user: &CurrentUser, user_id: UserId) -> Result<(), Error> {
    if current_user.id == user_id {
        return Ok(());
    }
    require_admin(current_user).map_err(|_| Error::Forbidden {
        resource: "transactions".to_string(),
    })
}

/// List a user's transactions (self or admin only)
#[utoipa::path(
    get,
    path = "/api/transactions/user/{user_id}",
    tag = "transactions",
    params(("user_id" = String, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "The user's transactions", body = [TransactionResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your ledger"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_transactions(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<TransactionResponse>>, Error> {
    require_self_or_admin(&current_user, user_id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Transactions::new(&mut pool_conn);

    let transactions = repo.list_for_user(user_id).await?;

    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}

/// Summarize a user's deposits, spends, and derived balance (self or admin only)
#[utoipa::path(
    get,
    path = "/api/transactions/user/{user_id}/summary",
    tag = "transactions",
    params(("user_id" = String, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "The user's totals", body = TransactionSummaryResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - not your ledger"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user_transaction_summary(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(user_id): Path<UserId>,
) -> Result<Json<TransactionSummaryResponse>, Error> {
    require_self_or_admin(&current_user, user_id)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Transactions::new(&mut pool_conn);

    let summary = repo.summary_for_user(user_id).await?;

    Ok(Json(TransactionSummaryResponse::from(summary)))
}

/// List all transactions across users (admin only)
#[utoipa::path(
    get,
    path = "/api/transactions",
    tag = "transactions",
    responses(
        (status = 200, description = "All transactions", body = [TransactionResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_all_transactions(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<TransactionResponse>>, Error> {
    require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Transactions::new(&mut pool_conn);

    let transactions = repo.list_all().await?;

    Ok(Json(transactions.into_iter().map(TransactionResponse::from).collect()))
}
