use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::{
        generator::{AssetResponse, GenerateRequest, GenerateResponse},
        users::CurrentUser,
    },
    auth::require_admin,
    db::handlers::Assets,
    errors::Error,
    generation,
};

/// Generate content with a model, debiting the caller's credits
#[utoipa::path(
    post,
    path = "/api/generator/generate",
    request_body = GenerateRequest,
    tag = "generator",
    responses(
        (status = 200, description = "Content generated successfully", body = GenerateResponse),
        (status = 400, description = "Missing fields or insufficient credits"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Unknown model"),
        (status = 500, description = "Generation failed; no credits were spent"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn generate_content(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, Error> {
    let commit = generation::generate(&state, &current_user, &request).await?;

    Ok(Json(GenerateResponse {
        message: "Content generated successfully".to_string(),
        asset: AssetResponse::from(commit.asset),
    }))
}

/// List the caller's generated assets
#[utoipa::path(
    get,
    path = "/api/generator/assets",
    tag = "generator",
    responses(
        (status = 200, description = "The caller's assets", body = [AssetResponse]),
        (status = 401, description = "Unauthorized"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_assets(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<AssetResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Assets::new(&mut pool_conn);

    let assets = repo.list_for_user(current_user.id).await?;

    Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
}

/// List all generated assets across users (admin only)
#[utoipa::path(
    get,
    path = "/api/generator/assets/all",
    tag = "generator",
    responses(
        (status = 200, description = "All assets", body = [AssetResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_all_assets(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<AssetResponse>>, Error> {
    require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Assets::new(&mut pool_conn);

    let assets = repo.list_all().await?;

    Ok(Json(assets.into_iter().map(AssetResponse::from).collect()))
}
