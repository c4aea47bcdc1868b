//! Database repository for the AI model catalog.

use crate::types::{ModelId, abbrev_uuid};
use crate::db::{
    errors::{DbError, Result},
    handlers::repository::Repository,
    models::catalog::{ModelCreateDBRequest, ModelDBResponse, ModelKind, ModelStatus, ModelUpdateDBRequest},
};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing catalog models
#[derive(Debug, Clone)]
pub struct CatalogFilter {
    /// Restrict to `active` models (the non-admin view)
    pub only_active: bool,
}

impl CatalogFilter {
    pub fn active() -> Self {
        Self { only_active: true }
    }

    pub fn all() -> Self {
        Self { only_active: false }
    }
}

// Database entity model
#[derive(Debug, Clone, FromRow)]
struct AiModel {
    pub id: ModelId,
    pub name: String,
    pub kind: ModelKind,
    pub description: Option<String>,
    pub cost_per_generation: i64,
    pub status: ModelStatus,
    pub thumbnail_url: Option<String>,
    pub api_endpoint: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<AiModel> for ModelDBResponse {
    fn from(model: AiModel) -> Self {
        Self {
            id: model.id,
            name: model.name,
            kind: model.kind,
            description: model.description,
            cost_per_generation: model.cost_per_generation,
            status: model.status,
            thumbnail_url: model.thumbnail_url,
            api_endpoint: model.api_endpoint,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

pub struct Catalog<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Catalog<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }
}

#[async_trait::async_trait]
impl<'c> Repository for Catalog<'c> {
    type CreateRequest = ModelCreateDBRequest;
    type UpdateRequest = ModelUpdateDBRequest;
    type Response = ModelDBResponse;
    type Id = ModelId;
    type Filter = CatalogFilter;

    #[instrument(skip(self, request), fields(name = %request.name), err)]
    async fn create(&mut self, request: &Self::CreateRequest) -> Result<Self::Response> {
        let model_id = Uuid::new_v4();

        let model = sqlx::query_as::<_, AiModel>(
            r#"
            INSERT INTO ai_models (id, name, kind, description, cost_per_generation, status, thumbnail_url, api_endpoint)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(model_id)
        .bind(&request.name)
        .bind(request.kind)
        .bind(&request.description)
        .bind(request.cost_per_generation)
        .bind(request.status)
        .bind(&request.thumbnail_url)
        .bind(&request.api_endpoint)
        .fetch_one(&mut *self.db)
        .await?;

        Ok(ModelDBResponse::from(model))
    }

    #[instrument(skip(self), fields(model_id = %abbrev_uuid(&id)), err)]
    async fn get_by_id(&mut self, id: Self::Id) -> Result<Option<Self::Response>> {
        let model = sqlx::query_as::<_, AiModel>("SELECT * FROM ai_models WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.db)
            .await?;

        Ok(model.map(ModelDBResponse::from))
    }

    #[instrument(skip(self, filter), fields(only_active = filter.only_active), err)]
    async fn list(&mut self, filter: &Self::Filter) -> Result<Vec<Self::Response>> {
        let models = if filter.only_active {
            sqlx::query_as::<_, AiModel>("SELECT * FROM ai_models WHERE status = $1 ORDER BY created_at DESC")
                .bind(ModelStatus::Active)
                .fetch_all(&mut *self.db)
                .await?
        } else {
            sqlx::query_as::<_, AiModel>("SELECT * FROM ai_models ORDER BY created_at DESC")
                .fetch_all(&mut *self.db)
                .await?
        };

        Ok(models.into_iter().map(ModelDBResponse::from).collect())
    }

    #[instrument(skip(self), fields(model_id = %abbrev_uuid(&id)), err)]
    async fn delete(&mut self, id: Self::Id) -> Result<bool> {
        let result = sqlx::query("DELETE FROM ai_models WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    #[instrument(skip(self, request), fields(model_id = %abbrev_uuid(&id)), err)]
    async fn update(&mut self, id: Self::Id, request: &Self::UpdateRequest) -> Result<Self::Response> {
        // Atomic update with conditional field updates
        let model = sqlx::query_as::<_, AiModel>(
            r#"
            UPDATE ai_models SET
                name = COALESCE($2, name),
                kind = COALESCE($3, kind),
                description = COALESCE($4, description),
                cost_per_generation = COALESCE($5, cost_per_generation),
                status = COALESCE($6, status),
                thumbnail_url = COALESCE($7, thumbnail_url),
                api_endpoint = COALESCE($8, api_endpoint),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&request.name)
        .bind(request.kind)
        .bind(&request.description)
        .bind(request.cost_per_generation)
        .bind(request.status)
        .bind(&request.thumbnail_url)
        .bind(&request.api_endpoint)
        .fetch_optional(&mut *self.db)
        .await?
        .ok_or(DbError::NotFound)?;

        Ok(ModelDBResponse::from(model))
    }
}
