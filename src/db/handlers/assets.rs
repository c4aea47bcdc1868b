//! Read access to generated-asset records.
//!
//! Inserts go through [`crate::db::handlers::Ledger::commit_generation`],
//! which couples the asset row to the debit and SPEND transaction.

use crate::types::{AssetId, ModelId, UserId, abbrev_uuid};
use crate::db::{errors::Result, models::assets::AssetDBResponse};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgConnection};
use tracing::instrument;

// Database entity model, with display names joined from the owning tables
#[derive(Debug, Clone, FromRow)]
struct AssetRow {
    pub id: AssetId,
    pub user_id: UserId,
    pub model_id: ModelId,
    pub prompt: String,
    pub result_url: String,
    pub cost: i64,
    pub created_at: DateTime<Utc>,
    pub model_name: Option<String>,
    pub user_name: Option<String>,
}

impl From<AssetRow> for AssetDBResponse {
    fn from(row: AssetRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            model_id: row.model_id,
            prompt: row.prompt,
            result_url: row.result_url,
            cost: row.cost,
            created_at: row.created_at,
            model_name: row.model_name,
            user_name: row.user_name,
        }
    }
}

pub struct Assets<'c> {
    db: &'c mut PgConnection,
}

impl<'c> Assets<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// List a user's generated assets, newest first
    #[instrument(skip(self), fields(user_id = %abbrev_uuid(&user_id)), err)]
    pub async fn list_for_user(&mut self, user_id: UserId) -> Result<Vec<AssetDBResponse>> {
        let assets = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT ga.*, am.name AS model_name, u.name AS user_name
            FROM generated_assets ga
            LEFT JOIN ai_models am ON ga.model_id = am.id
            LEFT JOIN users u ON ga.user_id = u.id
            WHERE ga.user_id = $1
            ORDER BY ga.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *self.db)
        .await?;

        Ok(assets.into_iter().map(AssetDBResponse::from).collect())
    }

    /// List all generated assets across all users (admin view)
    #[instrument(skip(self), err)]
    pub async fn list_all(&mut self) -> Result<Vec<AssetDBResponse>> {
        let assets = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT ga.*, am.name AS model_name, u.name AS user_name
            FROM generated_assets ga
            LEFT JOIN ai_models am ON ga.model_id = am.id
            LEFT JOIN users u ON ga.user_id = u.id
            ORDER BY ga.created_at DESC
            "#,
        )
        .fetch_all(&mut *self.db)
        .await?;

        Ok(assets.into_iter().map(AssetDBResponse::from).collect())
    }

    /// Fetch one asset by ID
    #[instrument(skip(self), fields(asset_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: AssetId) -> Result<Option<AssetDBResponse>> {
        let asset = sqlx::query_as::<_, AssetRow>(
            r#"
            SELECT ga.*, am.name AS model_name, u.name AS user_name
            FROM generated_assets ga
            LEFT JOIN ai_models am ON ga.model_id = am.id
            LEFT JOIN users u ON ga.user_id = u.id
            WHERE ga.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;

        Ok(asset.map(AssetDBResponse::from))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::Ledger;
    use crate::db::models::assets::AssetCreateDBRequest;
    use crate::test_utils::{create_test_model, create_test_user_with_credits};
    use sqlx::PgPool;

    #[sqlx::test]
    #[test_log::test]
    async fn test_list_joins_display_names(pool: PgPool) {
        let user = create_test_user_with_credits(&pool, 100).await;
        let model = create_test_model(&pool, 50).await;

        let mut conn = pool.acquire().await.unwrap();
        let mut ledger = Ledger::new(&mut conn);
        ledger
            .commit_generation(&AssetCreateDBRequest {
                user_id: user.id,
                model_id: model.id,
                prompt: "a red fox in snow".to_string(),
                result_url: "https://cdn.example.com/fox.jpg".to_string(),
                cost: 50,
            }, "Generated content: Test Model")
            .await
            .unwrap();

        let mut repo = Assets::new(&mut conn);
        let assets = repo.list_for_user(user.id).await.unwrap();
        assert_eq!(assets.len(), 1);
        assert_eq!(assets[0].model_name.as_deref(), Some(model.name.as_str()));
        assert_eq!(assets[0].user_name.as_deref(), Some(user.name.as_str()));

        let all = repo.list_all().await.unwrap();
        assert_eq!(all.len(), 1);

        let by_id = repo.get_by_id(assets[0].id).await.unwrap().unwrap();
        assert_eq!(by_id.prompt, "a red fox in snow");
    }
}
