//! The generation orchestrator.
//!
//! One entry point, [`generate`], owns the business invariants of a
//! generation: never spend credits you don't have, and never leave a debit
//! without its matching transaction and asset (or vice versa).
//!
//! The flow is deliberately ordered around the provider call:
//!
//! 1. validate input and load the user and model
//! 2. advisory balance check, so requests that cannot be paid for never
//!    spend provider quota
//! 3. the provider call itself, with no database connection held across it
//! 4. the atomic commit: conditional debit + SPEND transaction + asset
//!    record, where the balance check is re-enforced under the row lock
//!
//! A provider failure between steps 3 and 4 leaves the ledger untouched.

use tracing::{info, instrument};

use crate::{
    AppState,
    api::models::{generator::GenerateRequest, users::CurrentUser},
    db::{
        handlers::{Catalog, Ledger, Repository, Users, ledger::GenerationCommitDBResponse},
        models::{assets::AssetCreateDBRequest, catalog::ModelKind},
    },
    errors::{Error, Result},
    types::abbrev_uuid,
};

/// Run one generation for the authenticated user.
///
/// Returns the committed asset together with the SPEND transaction and the
/// balance after debit. Fails without side effects if the user cannot pay,
/// the model is unknown, or the provider call does not produce a result
/// reference.
#[instrument(skip(state, request), fields(user_id = %abbrev_uuid(&user.id), model_id = %abbrev_uuid(&request.model_id)), err)]
pub async fn generate(state: &AppState, user: &CurrentUser, request: &GenerateRequest) -> Result<GenerationCommitDBResponse> {
    if request.prompt.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Model ID and prompt are required".to_string(),
        });
    }

    // Load the user and model, then release the connection before the
    // (potentially slow) provider call.
    let (balance, model) = {
        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;

        let mut users = Users::new(&mut conn);
        let db_user = users.get_by_id(user.id).await?.ok_or_else(|| Error::NotFound {
            resource: "User".to_string(),
            id: user.id.to_string(),
        })?;

        let mut catalog = Catalog::new(&mut conn);
        let model = catalog.get_by_id(request.model_id).await?.ok_or_else(|| Error::NotFound {
            resource: "Model".to_string(),
            id: request.model_id.to_string(),
        })?;

        (db_user.credits, model)
    };

    // Advisory check: final correctness is enforced at debit time, but there
    // is no point paying for a provider call the user cannot cover.
    if balance < model.cost_per_generation {
        return Err(Error::InsufficientCredits {
            balance,
            required: model.cost_per_generation,
        });
    }

    let result_url = match model.kind {
        ModelKind::TextToVideo => state.provider.text_to_video(&request.prompt).await,
        ModelKind::ImageToVideo => {
            let image_url = request.image_url.as_deref().ok_or_else(|| Error::BadRequest {
                message: "Image URL is required for image-to-video generation".to_string(),
            })?;
            state.provider.image_to_video(image_url, &request.prompt).await
        }
        ModelKind::TextToImage => state.provider.text_to_image(&request.prompt).await,
    }
    .map_err(|e| Error::GenerationFailed { message: e.to_string() })?;

    let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut ledger = Ledger::new(&mut conn);
    let commit = ledger
        .commit_generation(
            &AssetCreateDBRequest {
                user_id: user.id,
                model_id: model.id,
                prompt: request.prompt.clone(),
                result_url,
                cost: model.cost_per_generation,
            },
            &format!("Generated content: {}", model.name),
        )
        .await?;

    match commit {
        Some(commit) => {
            info!(
                "Generation committed: user {} spent {} on model {}",
                abbrev_uuid(&user.id),
                model.cost_per_generation,
                model.name
            );
            Ok(commit)
        }
        None => {
            // A concurrent spend emptied the balance between the advisory
            // check and the debit. Reload for an accurate error.
            let mut users = Users::new(&mut conn);
            let balance = users.get_by_id(user.id).await?.map(|u| u.credits).unwrap_or(0);
            Err(Error::InsufficientCredits {
                balance,
                required: model.cost_per_generation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::handlers::{Assets, Transactions};
    use crate::db::models::catalog::ModelStatus;
    use crate::db::models::transactions::TransactionKind;
    use crate::providers::{GenerationProvider, ProviderError};
    use crate::test_utils::{create_test_app_state, create_test_model, create_test_model_with, create_test_user_with_credits};
    use async_trait::async_trait;
    use sqlx::PgPool;
    use uuid::Uuid;

    /// Provider that always fails, for exercising the no-mutation guarantee
    struct FailingProvider;

    #[async_trait]
    impl GenerationProvider for FailingProvider {
        async fn text_to_video(&self, _prompt: &str) -> crate::providers::Result<String> {
            Err(ProviderError::Timeout)
        }

        async fn image_to_video(&self, _image_url: &str, _prompt: &str) -> crate::providers::Result<String> {
            Err(ProviderError::Api("server exploded".to_string()))
        }

        async fn text_to_image(&self, _prompt: &str) -> crate::providers::Result<String> {
            Err(ProviderError::InvalidResponse("{}".to_string()))
        }
    }

    fn request_for(model_id: Uuid, prompt: &str) -> GenerateRequest {
        GenerateRequest {
            model_id,
            prompt: prompt.to_string(),
            image_url: None,
        }
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_successful_generation_debits_and_records(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user_with_credits(&pool, 100).await;
        let model = create_test_model(&pool, 50).await;
        let current = CurrentUser::from(user);

        let commit = generate(&state, &current, &request_for(model.id, "a red fox in snow"))
            .await
            .unwrap();

        assert_eq!(commit.new_balance, 50);
        assert_eq!(commit.asset.cost, 50);
        assert_eq!(commit.asset.prompt, "a red fox in snow");
        let spend = commit.transaction.unwrap();
        assert_eq!(spend.kind, TransactionKind::Spend);
        assert_eq!(spend.amount, 50);

        let mut conn = pool.acquire().await.unwrap();
        let mut transactions = Transactions::new(&mut conn);
        assert_eq!(transactions.list_for_user(current.id).await.unwrap().len(), 1);
        let mut assets = Assets::new(&mut conn);
        assert_eq!(assets.list_for_user(current.id).await.unwrap().len(), 1);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_insufficient_credits_has_no_side_effects(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user_with_credits(&pool, 30).await;
        let model = create_test_model(&pool, 50).await;
        let current = CurrentUser::from(user);

        let err = generate(&state, &current, &request_for(model.id, "a prompt")).await.unwrap_err();
        assert!(matches!(err, Error::InsufficientCredits { balance: 30, required: 50 }));

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert_eq!(users.get_by_id(current.id).await.unwrap().unwrap().credits, 30);
        let mut transactions = Transactions::new(&mut conn);
        assert!(transactions.list_for_user(current.id).await.unwrap().is_empty());
        let mut assets = Assets::new(&mut conn);
        assert!(assets.list_for_user(current.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_provider_failure_leaves_ledger_unchanged(pool: PgPool) {
        let mut state = create_test_app_state(pool.clone());
        state.provider = std::sync::Arc::new(FailingProvider);
        let user = create_test_user_with_credits(&pool, 100).await;
        let model = create_test_model(&pool, 50).await;
        let current = CurrentUser::from(user);

        let err = generate(&state, &current, &request_for(model.id, "a prompt")).await.unwrap_err();
        assert!(matches!(err, Error::GenerationFailed { .. }));

        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert_eq!(users.get_by_id(current.id).await.unwrap().unwrap().credits, 100);
        let mut transactions = Transactions::new(&mut conn);
        assert!(transactions.list_for_user(current.id).await.unwrap().is_empty());
        let mut assets = Assets::new(&mut conn);
        assert!(assets.list_for_user(current.id).await.unwrap().is_empty());
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_image_to_video_requires_image_url(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user_with_credits(&pool, 100).await;
        let model = create_test_model_with(&pool, 50, ModelKind::ImageToVideo, ModelStatus::Active).await;
        let current = CurrentUser::from(user);

        let err = generate(&state, &current, &request_for(model.id, "gentle motion")).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));

        // The missing image is caught before the ledger is touched
        let mut conn = pool.acquire().await.unwrap();
        let mut users = Users::new(&mut conn);
        assert_eq!(users.get_by_id(current.id).await.unwrap().unwrap().credits, 100);
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_empty_prompt_rejected(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user_with_credits(&pool, 100).await;
        let model = create_test_model(&pool, 50).await;
        let current = CurrentUser::from(user);

        let err = generate(&state, &current, &request_for(model.id, "   ")).await.unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }

    #[sqlx::test]
    #[test_log::test]
    async fn test_unknown_model_is_not_found(pool: PgPool) {
        let state = create_test_app_state(pool.clone());
        let user = create_test_user_with_credits(&pool, 100).await;
        let current = CurrentUser::from(user);

        let err = generate(&state, &current, &request_for(Uuid::new_v4(), "a prompt")).await.unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }
}
