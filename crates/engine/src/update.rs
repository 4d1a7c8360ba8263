//! Attribute updates.

use gsbot_core::audit::action_types;
use gsbot_core::stats::{validate_pic_url, AttributeUpdate, ValidatedUpdate};
use gsbot_db::StoreError;
use gsbot_events::RosterEvent;

use crate::engine::Engine;
use crate::error::HandleError;
use crate::intent::{CharacterView, Intent, Operation};

impl Engine {
    /// Apply a single-character stat change and return the updated view.
    ///
    /// Nothing is written unless resolution, authorization, validation and
    /// (for `set_pic`) the upload all succeed. A change the store rejects
    /// against the current stats surfaces as `InvalidParameter`.
    pub(crate) async fn update(&self, intent: &Intent) -> Result<CharacterView, HandleError> {
        let operation = intent.operation.name();
        let character = self.resolve_authorized(intent).await?;
        let update = self.prepare_update(&intent.operation).await?;

        let updated = self
            .store
            .apply_update(character.id, &update, intent.now)
            .await
            .map_err(|source| match source {
                StoreError::Rejected(err) => HandleError::from_core(operation, err),
                source => HandleError::StoreWriteFailure { operation, source },
            })?
            // Deleted between resolution and the write.
            .ok_or_else(|| HandleError::NotFound {
                operation,
                actor_id: intent.actor.user_id,
                group_id: intent.group_id,
                target: character.display_name.clone(),
            })?;

        tracing::info!(
            actor_id = intent.actor.user_id,
            group_id = intent.group_id,
            character_id = updated.id,
            gear_score = updated.gear_score,
            "{} has updated {} on {}",
            intent.actor.user_id,
            operation,
            updated.display_name
        );
        self.bus.publish(
            RosterEvent::new(
                action_types::CHARACTER_UPDATED,
                intent.group_id,
                intent.actor.user_id,
                operation,
                intent.now,
            )
            .with_target(updated.display_name.clone(), updated.id)
            .with_payload(serde_json::to_value(update.inner()).unwrap_or_default()),
        );

        let history = self
            .store
            .list_history(updated.id)
            .await
            .map_err(|source| HandleError::StoreReadFailure { operation, source })?;
        Ok(CharacterView {
            character: updated,
            history,
        })
    }

    /// Turn the operation into a validated update, uploading the picture
    /// first for `set_pic`.
    async fn prepare_update(&self, op: &Operation) -> Result<ValidatedUpdate, HandleError> {
        let operation = op.name();
        let update = match op {
            Operation::SetPic { source } => {
                validate_pic_url(source).map_err(|e| HandleError::from_core(operation, e))?;
                let url = self
                    .uploader
                    .upload(source)
                    .await
                    .map_err(|source| HandleError::UploadFailure { operation, source })?;
                AttributeUpdate::SetPic { url }
            }
            other => other.stat_update().ok_or_else(|| HandleError::Internal {
                operation,
                reason: "operation is not an attribute update".to_string(),
            })?,
        };
        update
            .validate()
            .map_err(|e| HandleError::from_core(operation, e))
    }
}
