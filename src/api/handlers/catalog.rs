use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    AppState,
    api::models::{
        catalog::{ModelCreate, ModelDeleteResponse, ModelMutationResponse, ModelResponse, ModelUpdate},
        users::CurrentUser,
    },
    auth::require_admin,
    db::handlers::{Catalog, Repository, catalog::CatalogFilter},
    errors::Error,
    types::ModelId,
};

/// List active models (the public catalog)
#[utoipa::path(
    get,
    path = "/api/models",
    tag = "models",
    responses(
        (status = 200, description = "Active models", body = [ModelResponse]),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn list_models(State(state): State<AppState>) -> Result<Json<Vec<ModelResponse>>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Catalog::new(&mut pool_conn);

    let models = repo.list(&CatalogFilter::active()).await?;

    Ok(Json(models.into_iter().map(ModelResponse::from).collect()))
}

/// List all models including those under maintenance (admin only)
#[utoipa::path(
    get,
    path = "/api/models/admin",
    tag = "models",
    responses(
        (status = 200, description = "All models", body = [ModelResponse]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn list_models_admin(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<Vec<ModelResponse>>, Error> {
    require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Catalog::new(&mut pool_conn);

    let models = repo.list(&CatalogFilter::all()).await?;

    Ok(Json(models.into_iter().map(ModelResponse::from).collect()))
}

/// Get one model by ID
#[utoipa::path(
    get,
    path = "/api/models/{id}",
    tag = "models",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "The model", body = ModelResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Model not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn get_model(
    State(state): State<AppState>,
    _current_user: CurrentUser,
    Path(id): Path<ModelId>,
) -> Result<Json<ModelResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Catalog::new(&mut pool_conn);

    let model = repo.get_by_id(id).await?.ok_or_else(|| Error::NotFound {
        resource: "Model".to_string(),
        id: id.to_string(),
    })?;

    Ok(Json(ModelResponse::from(model)))
}

/// Create a new model (admin only)
#[utoipa::path(
    post,
    path = "/api/models",
    request_body = ModelCreate,
    tag = "models",
    responses(
        (status = 201, description = "Model created successfully", body = ModelMutationResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn create_model(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Json(request): Json<ModelCreate>,
) -> Result<(StatusCode, Json<ModelMutationResponse>), Error> {
    require_admin(&current_user)?;

    if request.name.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Name, type, and cost_per_generation are required".to_string(),
        });
    }
    if request.cost_per_generation < 0 {
        return Err(Error::BadRequest {
            message: "cost_per_generation cannot be negative".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Catalog::new(&mut pool_conn);

    let model = repo.create(&request.into()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ModelMutationResponse {
            message: "Model created successfully".to_string(),
            model: ModelResponse::from(model),
        }),
    ))
}

/// Update a model (admin only)
#[utoipa::path(
    put,
    path = "/api/models/{id}",
    request_body = ModelUpdate,
    tag = "models",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "Model updated successfully", body = ModelMutationResponse),
        (status = 400, description = "Invalid fields"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Model not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn update_model(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ModelId>,
    Json(request): Json<ModelUpdate>,
) -> Result<Json<ModelMutationResponse>, Error> {
    require_admin(&current_user)?;

    if let Some(cost) = request.cost_per_generation {
        if cost < 0 {
            return Err(Error::BadRequest {
                message: "cost_per_generation cannot be negative".to_string(),
            });
        }
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Catalog::new(&mut pool_conn);

    let model = repo.update(id, &request.into()).await.map_err(|e| match e {
        crate::db::errors::DbError::NotFound => Error::NotFound {
            resource: "Model".to_string(),
            id: id.to_string(),
        },
        other => Error::Database(other),
    })?;

    Ok(Json(ModelMutationResponse {
        message: "Model updated successfully".to_string(),
        model: ModelResponse::from(model),
    }))
}

/// Delete a model (admin only)
#[utoipa::path(
    delete,
    path = "/api/models/{id}",
    tag = "models",
    params(("id" = String, Path, description = "Model ID (UUID)")),
    responses(
        (status = 200, description = "Model deleted successfully", body = ModelDeleteResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden - requires admin role"),
        (status = 404, description = "Model not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn delete_model(
    State(state): State<AppState>,
    current_user: CurrentUser,
    Path(id): Path<ModelId>,
) -> Result<Json<ModelDeleteResponse>, Error> {
    require_admin(&current_user)?;

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut repo = Catalog::new(&mut pool_conn);

    if !repo.delete(id).await? {
        return Err(Error::NotFound {
            resource: "Model".to_string(),
            id: id.to_string(),
        });
    }

    Ok(Json(ModelDeleteResponse {
        message: "Model deleted successfully".to_string(),
    }))
}
