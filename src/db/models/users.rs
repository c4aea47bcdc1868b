//! Database models for users.

use crate::api::models::users::Role;
use crate::types::UserId;
use chrono::{DateTime, Utc};

/// Database request for creating a new user
#[derive(Debug, Clone)]
pub struct UserCreateDBRequest {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub credits: i64,
    pub avatar_url: Option<String>,
    pub password_hash: Option<String>,
}

/// Database response for a user
#[derive(Debug, Clone)]
pub struct UserDBResponse {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub credits: i64,
    pub avatar_url: Option<String>,
    pub joined_at: DateTime<Utc>,
    pub last_login: Option<DateTime<Utc>>,
    pub password_hash: Option<String>,
}

impl UserDBResponse {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
