use axum::{Json, extract::State, http::StatusCode};

use crate::{
    AppState,
    api::models::{
        auth::{AuthResponse, LoginRequest, RegisterRequest},
        users::{CurrentUser, Role, UserResponse},
    },
    auth::{password, session},
    db::{
        handlers::{Ledger, Users},
        models::users::UserCreateDBRequest,
    },
    errors::Error,
};

/// Register a new user account
#[utoipa::path(
    post,
    path = "/api/auth/register",
    request_body = RegisterRequest,
    tag = "auth",
    responses(
        (status = 201, description = "User registered successfully", body = AuthResponse),
        (status = 400, description = "Invalid input"),
        (status = 409, description = "User already exists"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(request): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), Error> {
    if !state.config.auth.allow_registration {
        return Err(Error::BadRequest {
            message: "User registration is disabled".to_string(),
        });
    }

    if request.name.trim().is_empty() || request.email.trim().is_empty() || request.password.is_empty() {
        return Err(Error::BadRequest {
            message: "All fields are required".to_string(),
        });
    }

    // Validate password length
    let password_config = &state.config.auth.password;
    if request.password.len() < password_config.min_length {
        return Err(Error::BadRequest {
            message: format!("Password must be at least {} characters", password_config.min_length),
        });
    }
    if request.password.len() > password_config.max_length {
        return Err(Error::BadRequest {
            message: format!("Password must be no more than {} characters", password_config.max_length),
        });
    }

    let mut tx = state.db.begin().await.map_err(|e| Error::Database(e.into()))?;

    // Check if user with this email already exists
    let mut user_repo = Users::new(&mut tx);
    if user_repo.get_by_email(&request.email).await?.is_some() {
        return Err(Error::Conflict {
            message: "User already exists".to_string(),
        });
    }

    // Hash the password on a blocking thread to avoid blocking async runtime
    let password = request.password.clone();
    let password_hash = tokio::task::spawn_blocking(move || password::hash_string(&password))
        .await
        .map_err(|e| Error::Internal {
            operation: format!("spawn password hashing task: {e}"),
        })??;

    // New users start with no credits; any initial grant goes through the
    // ledger so a DEPOSIT row backs it
    let created_user = user_repo
        .create(&UserCreateDBRequest {
            name: request.name,
            email: request.email,
            role: Role::User,
            credits: 0,
            avatar_url: None,
            password_hash: Some(password_hash),
        })
        .await?;

    let initial_credits = state.config.credits.initial_credits_for_new_users;
    let user_response = if initial_credits > 0 {
        let mut ledger = Ledger::new(&mut tx);
        let (credited, _transaction) = ledger
            .grant_credits(created_user.id, initial_credits, "Initial credits on account creation")
            .await?;
        UserResponse::from(credited)
    } else {
        UserResponse::from(created_user)
    };

    tx.commit().await.map_err(|e| Error::Database(e.into()))?;

    // Create session token
    let current_user = CurrentUser {
        id: user_response.id,
        name: user_response.name.clone(),
        email: user_response.email.clone(),
        role: user_response.role,
    };
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            message: "User registered successfully".to_string(),
            token,
            user: user_response,
        }),
    ))
}

/// Login with email (and password, when the account has one)
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    tag = "auth",
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 404, description = "User not found"),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn login(State(state): State<AppState>, Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>, Error> {
    if request.email.trim().is_empty() {
        return Err(Error::BadRequest {
            message: "Email is required".to_string(),
        });
    }

    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo.get_by_email(&request.email).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: request.email.clone(),
    })?;

    // Accounts with a password must present it; the seeded admin without one
    // may log in by email alone
    if let Some(password_hash) = user.password_hash.clone() {
        let password = request.password.clone().ok_or_else(|| Error::Unauthenticated {
            message: Some("Password is required".to_string()),
        })?;

        // Verify password on a blocking thread to avoid blocking async runtime
        let is_valid = tokio::task::spawn_blocking(move || password::verify_string(&password, &password_hash))
            .await
            .map_err(|e| Error::Internal {
                operation: format!("spawn password verification task: {e}"),
            })??;

        if !is_valid {
            return Err(Error::Unauthenticated {
                message: Some("Invalid email or password".to_string()),
            });
        }
    }

    user_repo.touch_last_login(user.id).await?;

    let current_user = CurrentUser::from(user.clone());
    let token = session::create_session_token(&current_user, &state.config)?;

    Ok(Json(AuthResponse {
        message: "Login successful".to_string(),
        token,
        user: UserResponse::from(user),
    }))
}

/// Get the current authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = "auth",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "User not found"),
    ),
    security(("bearer_auth" = []))
)]
#[tracing::instrument(skip_all)]
pub async fn me(State(state): State<AppState>, current_user: CurrentUser) -> Result<Json<UserResponse>, Error> {
    let mut pool_conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
    let mut user_repo = Users::new(&mut pool_conn);

    let user = user_repo.get_by_id(current_user.id).await?.ok_or_else(|| Error::NotFound {
        resource: "User".to_string(),
        id: current_user.id.to_string(),
    })?;

    Ok(Json(UserResponse::from(user)))
}
