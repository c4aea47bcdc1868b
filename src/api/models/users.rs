//! API request/response models for users.

use crate::db::models::users::UserDBResponse;
use crate::types::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Account role stored as TEXT in the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    Admin,
}

/// The authenticated caller, decoded from a session token.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CurrentUser {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// User response model. Never carries the password hash.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(value_type = Uuid)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub credits: i64,
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
}

impl From<UserDBResponse> for UserResponse {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            role: db.role,
            credits: db.credits,
            avatar_url: db.avatar_url,
            joined_at: db.joined_at,
            last_login: db.last_login,
        }
    }
}

impl From<UserDBResponse> for CurrentUser {
    fn from(db: UserDBResponse) -> Self {
        Self {
            id: db.id,
            name: db.name,
            email: db.email,
            role: db.role,
        }
    }
}

/// Admin request to grant credits to a user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCreditsRequest {
    /// Amount to deposit; must be positive
    pub amount: i64,
}

/// Response to a credit grant
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AddCreditsResponse {
    pub message: String,
    pub user: UserResponse,
}
