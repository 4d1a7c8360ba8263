//! Audit log model and DTO.

use gsbot_core::types::{DbId, Snowflake, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `audit_logs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub action_type: String,
    pub group_id: Snowflake,
    pub actor_id: Snowflake,
    pub operation: String,
    pub target_name: Option<String>,
    pub details: serde_json::Value,
    pub occurred_at: Timestamp,
    pub created_at: Timestamp,
}

/// DTO for appending an audit entry.
#[derive(Debug, Clone)]
pub struct CreateAuditLog {
    pub action_type: String,
    pub group_id: Snowflake,
    pub actor_id: Snowflake,
    pub operation: String,
    pub target_name: Option<String>,
    pub details: serde_json::Value,
    pub occurred_at: Timestamp,
}
