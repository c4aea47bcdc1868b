//! Test utilities: config, state, and entity factories.

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    auth::session,
    config::{Config, DummyProviderConfig, ProviderConfig},
    db::{
        handlers::{Catalog, Repository, Users},
        models::{
            catalog::{ModelCreateDBRequest, ModelDBResponse, ModelKind, ModelStatus},
            users::{UserCreateDBRequest, UserDBResponse},
        },
    },
    providers::create_provider,
};
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

pub fn create_test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 0,
        admin_email: "admin@test.com".to_string(),
        admin_password: None,
        secret_key: Some("test-secret-key-for-testing-only".to_string()),
        provider: ProviderConfig::Dummy(DummyProviderConfig::default()),
        seed_default_catalog: false,
        ..Default::default()
    }
}

pub fn create_test_app_state(pool: PgPool) -> AppState {
    let config = create_test_config();
    let provider = Arc::from(create_provider(config.provider.clone()));
    AppState {
        db: pool,
        config,
        provider,
    }
}

pub async fn create_test_user(pool: &PgPool) -> UserDBResponse {
    create_test_user_with_credits(pool, 0).await
}

pub async fn create_test_user_with_credits(pool: &PgPool, credits: i64) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let suffix = Uuid::new_v4().simple().to_string();

    users_repo
        .create(&UserCreateDBRequest {
            name: format!("Test User {suffix}"),
            email: format!("testuser_{suffix}@example.com"),
            role: Role::User,
            credits,
            avatar_url: None,
            password_hash: None,
        })
        .await
        .expect("Failed to create test user")
}

pub async fn create_test_admin(pool: &PgPool) -> UserDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut users_repo = Users::new(&mut conn);
    let suffix = Uuid::new_v4().simple().to_string();

    users_repo
        .create(&UserCreateDBRequest {
            name: format!("Test Admin {suffix}"),
            email: format!("testadmin_{suffix}@example.com"),
            role: Role::Admin,
            credits: 0,
            avatar_url: None,
            password_hash: None,
        })
        .await
        .expect("Failed to create test admin user")
}

pub async fn create_test_model(pool: &PgPool, cost: i64) -> ModelDBResponse {
    create_test_model_with(pool, cost, ModelKind::TextToImage, ModelStatus::Active).await
}

pub async fn create_test_model_with(pool: &PgPool, cost: i64, kind: ModelKind, status: ModelStatus) -> ModelDBResponse {
    let mut conn = pool.acquire().await.expect("Failed to acquire connection");
    let mut catalog = Catalog::new(&mut conn);

    catalog
        .create(&ModelCreateDBRequest {
            name: "Test Model".to_string(),
            kind,
            description: Some("A test model".to_string()),
            cost_per_generation: cost,
            status,
            thumbnail_url: None,
            api_endpoint: None,
        })
        .await
        .expect("Failed to create test model")
}

/// Authorization header for a user, as (name, value)
pub fn bearer_header(user: &UserDBResponse, config: &Config) -> (String, String) {
    let current = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current, config).expect("Failed to create session token");
    ("authorization".to_string(), format!("Bearer {token}"))
}
