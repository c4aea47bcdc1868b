//! API request/response models for ledger transactions.

use crate::db::models::transactions::{TransactionDBResponse, TransactionKind, TransactionStatus, TransactionSummaryDBResponse};
use crate::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionResponse {
    pub id: TransactionId,
    #[schema(value_type = Uuid)]
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

impl From<TransactionDBResponse> for TransactionResponse {
    fn from(db: TransactionDBResponse) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            kind: db.kind,
            amount: db.amount,
            description: db.description,
            status: db.status,
            created_at: db.created_at,
        }
    }
}

/// Aggregated totals over a user's completed transactions
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TransactionSummaryResponse {
    pub total_deposited: i64,
    pub total_spent: i64,
    pub current_balance: i64,
}

impl From<TransactionSummaryDBResponse> for TransactionSummaryResponse {
    fn from(db: TransactionSummaryDBResponse) -> Self {
        Self {
            total_deposited: db.total_deposited,
            total_spent: db.total_spent,
            current_balance: db.current_balance,
        }
    }
}
