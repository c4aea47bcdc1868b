use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    AppState,
    api::models::users::{AddCreditsRequest, AddCreditsResponse, CurrentUser, UserResponse},
    auth::require_admin,
    db::handlers::{Ledger, Users, users::UserFilter},
    errors::Error,
    types::UserId,
};

/// Query parameters for listing users
#[derive(Debug, Deserialize, IntoParams)]
pub struct ListUsersQuery {
    /// Number of users to skip
    pub skip: Option<i64>,
    /// Maximum number of users to return
    pub limit: Option<i64>,
}

/// List users (admin only)
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "users",
    params(ListUsersQuery),
    responses(
        (status = 200, description = "Users", body = [UserResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_users(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Query(query): Query<ListUsersQuery>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    require_admin(&current_user)?;

    let skip = query.skip.unwrap_or(0).max(0);
    let limit = query.limit.unwrap_or(100).clamp(1, 1000);

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let users = repo.list(&UserFilter::new(skip, limit)).await?;

    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// Get one user by ID (admin only)
#[utoipa::path(
    get,
    path = "/api/users/{id}",
    tag = "users",
    params(("id" = String, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "The user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_user(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
) -> Result<Json<UserResponse>, Error> {
    require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Users::new(&mut pool_conn);

    let user = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}

/// Grant credits to a user (admin only)
#[utoipa::path(
    put,
    path = "/api/users/{id}/credits",
    request_body = AddCreditsRequest,
    tag = "users",
    params(("id" = String, Path, description = "User ID (UUID)")),
    responses(
        (status = 200, description = "Credits added successfully", body = AddCreditsResponse),
        (status = 400, description = "Amount must be positive"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn add_credits(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<UserId>,
    Json(request): Json<AddCreditsRequest>,
) -> Result<Json<AddCreditsResponse>, Error> {
    require_admin(&current_user)?;

    if request.amount <= 0 {
        return Err(Error::BadRequest {
            message: "Amount must be a positive number".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut ledger = Ledger::new(&mut pool_conn);

    let (user, _transaction) = ledger
        .grant_credits(id, request.amount, "Admin credit grant")
        .await
        .map_err(|e| match e {
            crate::db::errors::DbError::NotFound => Error::NotFound {
                resource: "User".to_string(),
                id: id.to_string(),
            },
            other => Error::Database(other),
        })?;

    Ok(Json(AddCreditsResponse {
        message: "Credits added successfully".to_string(),
        user: UserResponse::from(user),
    }))
}
