//! Durable audit persistence service.
//!
//! [`AuditPersistence`] subscribes to the [`EventBus`](crate::bus::EventBus)
//! and writes every state-changing [`RosterEvent`] to `audit_logs`. It runs
//! as a long-lived background task and stops when the bus is dropped.

use gsbot_core::audit;
use gsbot_core::types::DbId;
use gsbot_db::models::audit::CreateAuditLog;
use gsbot_db::repositories::AuditRepo;
use gsbot_db::DbPool;
use tokio::sync::broadcast;

use crate::bus::RosterEvent;

/// Background service that persists audit events to the database.
pub struct AuditPersistence;

impl AuditPersistence {
    /// Run the persistence loop until the channel closes.
    ///
    /// Informational events (purge prompts, cancellations) are skipped.
    pub async fn run(pool: DbPool, mut receiver: broadcast::Receiver<RosterEvent>) {
        loop {
            match receiver.recv().await {
                Ok(event) if audit::is_persisted(&event.event_type) => {
                    if let Err(e) = Self::persist(&pool, &event).await {
                        tracing::error!(
                            error = %e,
                            event_type = %event.event_type,
                            group_id = event.group_id,
                            "Failed to persist audit event"
                        );
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!(
                        skipped = n,
                        "Audit persistence lagged, some events were not persisted"
                    );
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::info!("Event bus closed, audit persistence shutting down");
                    break;
                }
            }
        }
    }

    async fn persist(pool: &DbPool, event: &RosterEvent) -> Result<DbId, sqlx::Error> {
        AuditRepo::insert(pool, &to_audit_log(event)).await
    }
}

/// Map a bus event onto an `audit_logs` row.
pub fn to_audit_log(event: &RosterEvent) -> CreateAuditLog {
    let mut details = event.payload.clone();
    if let (Some(id), serde_json::Value::Object(map)) = (event.character_id, &mut details) {
        map.insert("character_id".to_string(), serde_json::json!(id));
    }
    CreateAuditLog {
        action_type: event.event_type.clone(),
        group_id: event.group_id,
        actor_id: event.actor_id,
        operation: event.operation.clone(),
        target_name: event.target_name.clone(),
        details,
        occurred_at: event.timestamp,
    }
}
