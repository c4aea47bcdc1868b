//! Authenticated-user extraction from request headers.

use crate::{
    api::models::users::CurrentUser,
    auth::session,
    errors::{Error, Result},
    AppState,
};
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::{debug, instrument, trace};

/// Extract the bearer token from the Authorization header, if present.
fn bearer_token(parts: &Parts) -> Option<Result<&str>> {
    let auth_header = parts.headers.get(axum::http::header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    // Only the Bearer scheme is supported
    match auth_str.strip_prefix("Bearer ") {
        Some(token) => Some(Ok(token)),
        None => Some(Err(Error::Unauthenticated {
            message: Some("Authorization header must use the Bearer scheme".to_string()),
        })),
    }
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let token = match bearer_token(parts) {
            Some(Ok(token)) => token,
            Some(Err(e)) => return Err(e),
            None => {
                trace!("No authentication credentials found in request");
                return Err(Error::Unauthenticated { message: None });
            }
        };

        let user = session::verify_session_token(token, &state.config)?;
        debug!("Found session authenticated user: {}", user.id);
        Ok(user)
    }
}
