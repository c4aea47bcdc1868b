//! # nexus-studio: Credits-Based Backend for AI Media Generation
//!
//! `nexus-studio` is the backend of a credits-based SaaS for AI media
//! generation. Users authenticate with JWT bearer tokens, spend prepaid
//! credits to invoke a third-party generation API (text-to-video,
//! image-to-video, text-to-image), and browse their generated assets and
//! transaction history. Admins manage user balances and the catalog of
//! offered models.
//!
//! ## Overview
//!
//! The non-trivial behavior of the system is the credit bookkeeping around
//! each call to the external provider. A generation request is validated and
//! checked against the user's balance, the provider is invoked, and only
//! after provider success are three writes committed as one database
//! transaction: the conditional balance debit, the SPEND ledger entry, and
//! the generated-asset record. A provider failure leaves the ledger
//! byte-for-byte unchanged, and concurrent requests against one balance
//! serialize on the conditional debit so a double spend is structurally
//! impossible. See the [`generation`] module for the orchestration and
//! [`db::handlers::Ledger`] for the atomic commit.
//!
//! ## Architecture
//!
//! The application is built on [Axum](https://github.com/tokio-rs/axum) for
//! the HTTP layer and uses PostgreSQL (via SQLx) for all persistence.
//!
//! The **API layer** ([`api`]) exposes the REST surface under `/api/*`:
//! authentication, the model catalog, the generator, the transaction ledger,
//! and admin user management. All endpoints carry OpenAPI annotations and the
//! rendered documentation is served at `/docs`.
//!
//! The **authentication layer** ([`auth`]) issues and verifies JWT session
//! tokens, hashes passwords with Argon2id, and provides the `CurrentUser`
//! extractor plus the admin role gate.
//!
//! The **database layer** ([`db`]) uses the repository pattern. Each entity
//! has a repository over a SQLx connection; the [`db::handlers::Ledger`]
//! repository owns the composite mutations that must be atomic.
//!
//! The **provider layer** ([`providers`]) abstracts the outbound generation
//! API behind a trait with one operation per model kind, with a real
//! (Freepik) implementation and a dummy one for development and tests.
//!
//! ## Quick Start
//!
//! ```no_run
//! use clap::Parser;
//! use nexus_studio::{Application, Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // Parse CLI arguments and load configuration
//!     let args = nexus_studio::config::Args::parse();
//!     let config = Config::load(&args)?;
//!
//!     // Initialize telemetry (structured logging)
//!     nexus_studio::telemetry::init_telemetry()?;
//!
//!     // Create and start the application
//!     let app = Application::new(config).await?;
//!
//!     // Run with graceful shutdown on Ctrl+C
//!     app.serve(async {
//!         tokio::signal::ctrl_c().await.expect("Failed to listen for Ctrl+C");
//!     }).await?;
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Database Setup
//!
//! The application requires a PostgreSQL database and automatically runs
//! migrations on startup:
//!
//! ```no_run
//! # use sqlx::PgPool;
//! # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
//! nexus_studio::migrator().run(&pool).await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Configuration
//!
//! See the [`config`] module for configuration options.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod generation;
mod openapi;
pub mod providers;
pub mod telemetry;
pub mod types;

#[cfg(test)]
pub mod test_utils;

use crate::{
    api::models::{catalog::ModelCreate, users::Role},
    auth::password,
    db::handlers::{Catalog, Ledger, Repository, Users, catalog::CatalogFilter},
    db::models::catalog::{ModelKind, ModelStatus},
    db::models::users::UserCreateDBRequest,
    openapi::ApiDoc,
    providers::GenerationProvider,
};
use axum::{
    Router,
    routing::{get, post, put},
};
pub use config::Config;
use sqlx::PgPool;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{Level, debug, info, instrument};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

pub use types::{AssetId, ModelId, TransactionId, UserId};

/// Application state shared across all request handlers.
///
/// # Fields
///
/// - `db`: PostgreSQL connection pool for application data
/// - `config`: Application configuration loaded from file/environment
/// - `provider`: The outbound generation provider
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub provider: Arc<dyn GenerationProvider>,
}

/// Get the database migrator
pub fn migrator() -> sqlx::migrate::Migrator {
    sqlx::migrate!("./migrations")
}

/// Create the initial admin user if it doesn't exist.
///
/// Idempotent: creates the admin on first startup, or updates the password if
/// the user already exists and a password is configured. The first-time grant
/// of admin credits goes through the ledger so a DEPOSIT row backs it.
///
/// Returns the user ID of the created or existing admin user.
#[instrument(skip_all)]
pub async fn create_initial_admin_user(email: &str, admin_password: Option<&str>, db: &PgPool) -> anyhow::Result<UserId> {
    // Hash password if provided
    let password_hash = match admin_password {
        Some(pwd) => Some(password::hash_string(pwd).map_err(|e| anyhow::anyhow!("Failed to hash admin password: {e}"))?),
        None => None,
    };

    // Use a transaction to ensure atomicity
    let mut tx = db.begin().await?;
    let mut user_repo = Users::new(&mut tx);

    // Check if user already exists
    if let Some(existing_user) = user_repo
        .get_by_email(email)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to check existing admin user: {e}"))?
    {
        // User exists - update password if provided
        if let Some(password_hash) = password_hash {
            sqlx::query("UPDATE users SET password_hash = $1 WHERE email = $2")
                .bind(password_hash)
                .bind(email)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        return Ok(existing_user.id);
    }

    // Create new admin user
    let created_user = user_repo
        .create(&UserCreateDBRequest {
            name: "System Admin".to_string(),
            email: email.to_string(),
            role: Role::Admin,
            credits: 0,
            avatar_url: None,
            password_hash,
        })
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create admin user: {e}"))?;

    let mut ledger = Ledger::new(&mut tx);
    ledger
        .grant_credits(created_user.id, 99_999, "Initial admin credits")
        .await
        .map_err(|e| anyhow::anyhow!("Failed to grant initial admin credits: {e}"))?;

    tx.commit().await?;
    info!("Created initial admin user {email}");
    Ok(created_user.id)
}

/// Seed the catalog with the default models (run only once).
///
/// Idempotent: a non-empty catalog is left untouched to preserve manual
/// changes.
#[instrument(skip_all)]
pub async fn seed_catalog(db: &PgPool) -> anyhow::Result<()> {
    let mut tx = db.begin().await?;
    let mut catalog = Catalog::new(&mut tx);

    if !catalog.list(&CatalogFilter::all()).await?.is_empty() {
        debug!("Catalog already seeded, skipping");
        tx.commit().await?;
        return Ok(());
    }

    info!("Seeding catalog with default models");

    let defaults = [
        ModelCreate {
            name: "Freepik Motion V1".to_string(),
            kind: ModelKind::TextToVideo,
            description: Some("Generate high-quality 5s videos from text prompts.".to_string()),
            cost_per_generation: 50,
            status: Some(ModelStatus::Active),
            thumbnail_url: Some("https://picsum.photos/400/225?random=1".to_string()),
            api_endpoint: None,
        },
        ModelCreate {
            name: "Freepik Animate Pro".to_string(),
            kind: ModelKind::ImageToVideo,
            description: Some("Bring static images to life with subtle motion.".to_string()),
            cost_per_generation: 80,
            status: Some(ModelStatus::Active),
            thumbnail_url: Some("https://picsum.photos/400/225?random=2".to_string()),
            api_endpoint: None,
        },
        ModelCreate {
            name: "Freepik Flux Realism".to_string(),
            kind: ModelKind::TextToImage,
            description: Some("Hyper-realistic image generation.".to_string()),
            cost_per_generation: 10,
            status: Some(ModelStatus::Active),
            thumbnail_url: Some("https://picsum.photos/400/225?random=3".to_string()),
            api_endpoint: None,
        },
    ];

    for model in defaults {
        catalog.create(&model.into()).await?;
    }

    tx.commit().await?;
    Ok(())
}

/// Liveness endpoint
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "message": "API is running",
        "timestamp": chrono::Utc::now(),
    }))
}

/// Build the application router with all endpoints and middleware.
///
/// - REST routes under `/api/*`
/// - OpenAPI documentation at `/docs`
/// - CORS (permissive, the UI is served separately)
/// - Tracing middleware
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health))
        // Authentication
        .route("/auth/register", post(api::handlers::auth::register))
        .route("/auth/login", post(api::handlers::auth::login))
        .route("/auth/me", get(api::handlers::auth::me))
        // Model catalog
        .route(
            "/models",
            get(api::handlers::catalog::list_models).post(api::handlers::catalog::create_model),
        )
        .route("/models/admin", get(api::handlers::catalog::list_models_admin))
        .route(
            "/models/{id}",
            get(api::handlers::catalog::get_model)
                .put(api::handlers::catalog::update_model)
                .delete(api::handlers::catalog::delete_model),
        )
        // Generator
        .route("/generator/generate", post(api::handlers::generator::generate_content))
        .route("/generator/assets", get(api::handlers::generator::get_assets))
        .route("/generator/assets/all", get(api::handlers::generator::get_all_assets))
        // Transactions
        .route("/transactions", get(api::handlers::transactions::get_all_transactions))
        .route("/transactions/user/{user_id}", get(api::handlers::transactions::get_user_transactions))
        .route(
            "/transactions/user/{user_id}/summary",
            get(api::handlers::transactions::get_user_transaction_summary),
        )
        // User management
        .route("/users", get(api::handlers::users::list_users))
        .route("/users/{id}", get(api::handlers::users::get_user))
        .route("/users/{id}/credits", put(api::handlers::users::add_credits))
        .with_state(state);

    Router::new()
        .nest("/api", api_routes)
        .merge(Scalar::with_url("/docs", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

/// Main application struct that owns all resources and lifecycle.
///
/// # Lifecycle
///
/// 1. **Create**: [`Application::new`] connects to the database, runs
///    migrations, seeds the initial admin and catalog, and builds the router
/// 2. **Serve**: [`Application::serve`] binds to a TCP port and starts
///    handling requests
/// 3. **Shutdown**: when the shutdown future resolves, in-flight requests
///    drain and database connections close
pub struct Application {
    router: Router,
    config: Config,
    pool: PgPool,
}

impl Application {
    /// Create a new application instance with all resources initialized
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        Self::new_with_pool(config, None).await
    }

    /// Create an application over an existing pool (used by tests)
    pub async fn new_with_pool(config: Config, pool: Option<PgPool>) -> anyhow::Result<Self> {
        debug!("Starting with configuration: {:#?}", config);

        let pool = match pool {
            Some(pool) => pool,
            None => {
                let settings = &config.database.pool;
                sqlx::postgres::PgPoolOptions::new()
                    .max_connections(settings.max_connections)
                    .min_connections(settings.min_connections)
                    .acquire_timeout(std::time::Duration::from_secs(settings.acquire_timeout_secs))
                    .connect(&config.database.url)
                    .await?
            }
        };

        migrator().run(&pool).await?;

        // Create initial admin user if it doesn't exist
        create_initial_admin_user(&config.admin_email, config.admin_password.as_deref(), &pool).await?;

        // Seed catalog with default models (only runs once)
        if config.seed_default_catalog {
            seed_catalog(&pool).await?;
        }

        let provider: Arc<dyn GenerationProvider> = Arc::from(providers::create_provider(config.provider.clone()));

        let state = AppState {
            db: pool.clone(),
            config: config.clone(),
            provider,
        };

        let router = build_router(state);

        Ok(Self { router, config, pool })
    }

    /// Convert application into a test server (for tests)
    #[cfg(test)]
    pub fn into_test_server(self) -> axum_test::TestServer {
        axum_test::TestServer::new(self.router).expect("Failed to create test server")
    }

    /// Start serving the application
    pub async fn serve<F>(self, shutdown: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let bind_addr = self.config.bind_address();
        let listener = TcpListener::bind(&bind_addr).await?;
        info!("Listening on http://{bind_addr}");

        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Closing database connections...");
        self.pool.close().await;

        Ok(())
    }
}
