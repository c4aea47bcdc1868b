//! Database models for generated assets.

use crate::types::{AssetId, ModelId, UserId};
use chrono::{DateTime, Utc};

/// Database request for recording a generated asset.
///
/// `cost` is the model's cost captured at generation time, not a live
/// reference to the catalog row.
#[derive(Debug, Clone)]
pub struct AssetCreateDBRequest {
    pub user_id: UserId,
    pub model_id: ModelId,
    pub prompt: String,
    pub result_url: String,
    pub cost: i64,
}

/// Database response for a generated asset.
///
/// `model_name` and `user_name` are joined from the catalog and user tables
/// on the listing paths; they are absent on the insert path.
#[derive(Debug, Clone)]
pub struct AssetDBResponse {
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
