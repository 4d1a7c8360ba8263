//! Single deletes and confirmed group purges.

use gsbot_core::audit::{action_types, op_names};
use gsbot_core::confirmation::{PurgeHandshake, PurgeSignal, PurgeState, CONFIRM_TOKEN};
use gsbot_core::policy;
use gsbot_events::RosterEvent;
use tokio::sync::mpsc;
use tokio::time::{self, Instant};

use crate::confirm::Reply;
use crate::engine::Engine;
use crate::error::HandleError;
use crate::intent::{DeletedCharacter, DeletionReceipt, Intent};

impl Engine {
    /// Delete the resolved character and its history.
    pub(crate) async fn delete_one(&self, intent: &Intent) -> Result<DeletionReceipt, HandleError> {
        let operation = op_names::DELETE;
        let character = self.resolve_authorized(intent).await?;

        let removed = self
            .store
            .delete(character.id)
            .await
            .map_err(|source| HandleError::StoreWriteFailure { operation, source })?;
        if !removed {
            return Err(HandleError::NotFound {
                operation,
                actor_id: intent.actor.user_id,
                group_id: intent.group_id,
                target: character.display_name,
            });
        }

        tracing::info!(
            actor_id = intent.actor.user_id,
            group_id = intent.group_id,
            character_id = character.id,
            "{} has deleted {} ({})",
            intent.actor.user_id,
            character.display_name,
            character.char_name
        );
        self.bus.publish(
            RosterEvent::new(
                action_types::CHARACTER_DELETED,
                intent.group_id,
                intent.actor.user_id,
                operation,
                intent.now,
            )
            .with_target(character.display_name.clone(), character.id)
            .with_payload(serde_json::json!({ "char_name": character.char_name })),
        );

        Ok(DeletionReceipt {
            group_id: intent.group_id,
            deleted: 1,
            character: Some(DeletedCharacter {
                display_name: character.display_name,
                char_name: character.char_name,
            }),
        })
    }

    /// Delete every character in the group once the initiator confirms.
    pub(crate) async fn purge_group(&self, intent: &Intent) -> Result<DeletionReceipt, HandleError> {
        let operation = op_names::DELETE_ALL;
        let group_id = intent.group_id;

        if !policy::authorize_bulk(&intent.actor).is_allowed() {
            return Err(HandleError::Unauthorized {
                operation,
                actor_id: intent.actor.user_id,
                target: format!("group {group_id}"),
            });
        }

        let wait = self
            .hub
            .open(group_id, intent.actor.user_id, intent.now)
            .await
            .map_err(|pending| HandleError::Conflict {
                operation,
                reason: format!(
                    "a purge requested by {} is already awaiting confirmation",
                    pending.initiator
                ),
            })?;

        let result = self.run_purge(intent, wait.receiver).await;
        self.hub.close(group_id, wait.ticket).await;
        result
    }

    async fn run_purge(
        &self,
        intent: &Intent,
        mut replies: mpsc::UnboundedReceiver<Reply>,
    ) -> Result<DeletionReceipt, HandleError> {
        let operation = op_names::DELETE_ALL;
        let group_id = intent.group_id;
        let actor_id = intent.actor.user_id;
        let timeout = self.config.confirm_timeout;
        let mut handshake = PurgeHandshake::begin(group_id, actor_id);

        tracing::info!(
            actor_id,
            group_id,
            timeout_secs = timeout.as_secs(),
            "Purge requested, awaiting confirmation"
        );
        self.bus.publish(
            RosterEvent::new(
                action_types::PURGE_REQUESTED,
                group_id,
                actor_id,
                operation,
                intent.now,
            )
            .with_payload(serde_json::json!({
                "confirm_token": CONFIRM_TOKEN,
                "timeout_secs": timeout.as_secs(),
            })),
        );

        let deadline = Instant::now() + timeout;
        while *handshake.state() == PurgeState::AwaitingConfirmation {
            let signal = match time::timeout_at(deadline, replies.recv()).await {
                Ok(Some(Reply { actor_id, text })) => PurgeSignal::Reply { actor_id, text },
                Ok(None) | Err(_) => PurgeSignal::Deadline,
            };
            handshake
                .advance(signal)
                .map_err(|e| HandleError::from_core(operation, e))?;
        }

        match handshake.state().clone() {
            PurgeState::Confirmed => {
                let deleted = self
                    .store
                    .delete_by_group(group_id)
                    .await
                    .map_err(|source| HandleError::StoreWriteFailure { operation, source })?;
                handshake
                    .advance(PurgeSignal::Deleted { count: deleted })
                    .map_err(|e| HandleError::from_core(operation, e))?;

                tracing::info!(
                    actor_id,
                    group_id,
                    deleted,
                    "{} has purged group {}",
                    actor_id,
                    group_id
                );
                self.bus.publish(
                    RosterEvent::new(
                        action_types::CHARACTERS_PURGED,
                        group_id,
                        actor_id,
                        operation,
                        intent.now,
                    )
                    .with_payload(serde_json::json!({ "deleted": deleted })),
                );
                Ok(DeletionReceipt {
                    group_id,
                    deleted,
                    character: None,
                })
            }
            PurgeState::TimedOut => {
                self.publish_cancelled(intent, serde_json::json!({ "reason": "timed_out" }));
                Err(HandleError::Timeout { actor_id, group_id })
            }
            PurgeState::MismatchedReply { reply } => {
                self.publish_cancelled(
                    intent,
                    serde_json::json!({ "reason": "mismatched_reply", "reply": reply }),
                );
                Err(HandleError::Cancelled {
                    actor_id,
                    group_id,
                    reply,
                })
            }
            other => Err(HandleError::Internal {
                operation,
                reason: format!("purge loop exited while {}", other.as_str()),
            }),
        }
    }

    fn publish_cancelled(&self, intent: &Intent, payload: serde_json::Value) {
        tracing::info!(
            actor_id = intent.actor.user_id,
            group_id = intent.group_id,
            reason = %payload["reason"],
            "Purge cancelled, nothing deleted"
        );
        self.bus.publish(
            RosterEvent::new(
                action_types::PURGE_CANCELLED,
                intent.group_id,
                intent.actor.user_id,
                op_names::DELETE_ALL,
                intent.now,
            )
            .with_payload(payload),
        );
    }
}
