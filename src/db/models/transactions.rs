//! Database models for ledger transactions.

use crate::types::{TransactionId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Transaction kind stored as TEXT in the database.
///
/// A DEPOSIT records an admin credit grant; a SPEND records the debit of one
/// successful generation. The ledger is append-only.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Deposit,
    Spend,
}

/// Transaction status stored as TEXT in the database.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, ToSchema)]
#[sqlx(type_name = "text", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Completed,
    Failed,
    Pending,
}

/// Database response for a ledger transaction
#[derive(Debug, Clone)]
pub struct TransactionDBResponse {
    pub id: TransactionId,
    pub user_id: UserId,
    pub kind: TransactionKind,
    pub amount: i64,
    pub description: Option<String>,
    pub status: TransactionStatus,
    pub created_at: DateTime<Utc>,
}

/// Aggregated per-user totals over completed transactions
#[derive(Debug, Clone)]
pub struct TransactionSummaryDBResponse {
    pub total_deposited: i64,
    pub total_spent: i64,
    pub current_balance: i64,
}
