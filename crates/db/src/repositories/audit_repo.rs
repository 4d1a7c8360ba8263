//! Repository for the `audit_logs` table (append-only).

use gsbot_core::types::{DbId, Snowflake};
use sqlx::PgPool;

use crate::models::audit::{AuditLog, CreateAuditLog};

const COLUMNS: &str = "id, action_type, group_id, actor_id, operation, target_name, details, \
     occurred_at, created_at";

/// Append and query audit entries.
pub struct AuditRepo;

impl AuditRepo {
    /// Append an audit entry, returning its id.
    pub async fn insert(pool: &PgPool, input: &CreateAuditLog) -> Result<DbId, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "INSERT INTO audit_logs (action_type, group_id, actor_id, operation, target_name,
                details, occurred_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING id",
        )
        .bind(&input.action_type)
        .bind(input.group_id)
        .bind(input.actor_id)
        .bind(&input.operation)
        .bind(&input.target_name)
        .bind(&input.details)
        .bind(input.occurred_at)
        .fetch_one(pool)
        .await
    }

    /// List the most recent entries for a group, newest first.
    pub async fn list_by_group(
        pool: &PgPool,
        group_id: Snowflake,
        limit: i64,
    ) -> Result<Vec<AuditLog>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs
             WHERE group_id = $1
             ORDER BY occurred_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(group_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
