//! OpenAPI documentation configuration.
//!
//! All handlers carry `utoipa::path` annotations; this module assembles them
//! into one spec, served at `/docs` by the router.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::api;

/// Bearer token security scheme shared by all authenticated endpoints.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "bearer_auth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "Session token authentication. Include the token from login or registration in the `Authorization` header:\n\n\
                            ```\nAuthorization: Bearer YOUR_TOKEN\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::auth::register,
        api::handlers::auth::login,
        api::handlers::auth::me,
        api::handlers::catalog::list_models,
        api::handlers::catalog::list_models_admin,
        api::handlers::catalog::get_model,
        api::handlers::catalog::create_model,
        api::handlers::catalog::update_model,
        api::handlers::catalog::delete_model,
        api::handlers::generator::generate_content,
        api::handlers::generator::get_assets,
        api::handlers::generator::get_all_assets,
        api::handlers::transactions::get_user_transactions,
        api::handlers::transactions::get_user_transaction_summary,
        api::handlers::transactions::get_all_transactions,
        api::handlers::users::list_users,
        api::handlers::users::get_user,
        api::handlers::users::add_credits,
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login, and session inspection"),
        (name = "models", description = "The catalog of offered generation models"),
        (name = "generator", description = "Credit-debited generations and generated assets"),
        (name = "transactions", description = "The append-only credit ledger"),
        (name = "users", description = "Admin user management and credit grants"),
    )
)]
pub struct ApiDoc;
