//! The [`Engine`] facade and request dispatch.

use std::sync::Arc;

use gsbot_core::policy::{self, Decision};
use gsbot_core::types::Snowflake;
use gsbot_db::models::character::Character;
use gsbot_db::CharacterStore;
use gsbot_events::EventBus;

use crate::config::EngineConfig;
use crate::confirm::{ConfirmationHub, Delivery};
use crate::error::HandleError;
use crate::intent::{Intent, Operation, Outcome};
use crate::resolver;
use crate::upload::PicUploader;

/// Resolves, authorizes and executes roster intents.
///
/// Shared across request handlers via `Arc<Engine>`; every method takes
/// `&self`.
pub struct Engine {
    pub(crate) store: Arc<dyn CharacterStore>,
    pub(crate) bus: Arc<EventBus>,
    pub(crate) uploader: Arc<dyn PicUploader>,
    pub(crate) hub: ConfirmationHub,
    pub(crate) config: EngineConfig,
}

impl Engine {
    pub fn new(
        store: Arc<dyn CharacterStore>,
        bus: Arc<EventBus>,
        uploader: Arc<dyn PicUploader>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            bus,
            uploader,
            hub: ConfirmationHub::new(),
            config,
        }
    }

    /// Execute one intent.
    ///
    /// `DeleteAll` does not return until the initiator confirms, replies with
    /// something else, or the confirmation window elapses.
    pub async fn handle(&self, intent: Intent) -> Result<Outcome, HandleError> {
        let operation = intent.operation.name();
        tracing::debug!(
            actor_id = intent.actor.user_id,
            group_id = intent.group_id,
            operation,
            target = %intent.target,
            "Handling intent"
        );

        let result = match &intent.operation {
            Operation::DeleteAll => self.purge_group(&intent).await.map(Outcome::Deleted),
            Operation::Delete => self.delete_one(&intent).await.map(Outcome::Deleted),
            _ => self.update(&intent).await.map(Outcome::Updated),
        };

        if let Err(e) = &result {
            tracing::warn!(
                actor_id = intent.actor.user_id,
                group_id = intent.group_id,
                operation,
                code = e.code(),
                error = %e,
                "Intent failed"
            );
        }
        result
    }

    /// Forward a chat reply to the purge pending in `group_id`, if any.
    pub async fn deliver_confirmation(
        &self,
        group_id: Snowflake,
        actor_id: Snowflake,
        text: &str,
    ) -> Delivery {
        self.hub.deliver(group_id, actor_id, text).await
    }

    /// Resolve the intent's target and check the actor may modify it.
    /// Resolution failures are reported before authorization.
    pub(crate) async fn resolve_authorized(
        &self,
        intent: &Intent,
    ) -> Result<Character, HandleError> {
        let operation = intent.operation.name();
        let resolution = resolver::resolve(
            self.store.as_ref(),
            &intent.actor,
            intent.group_id,
            &intent.target,
        )
        .await
        .map_err(|source| HandleError::StoreReadFailure { operation, source })?
        .ok_or_else(|| HandleError::NotFound {
            operation,
            actor_id: intent.actor.user_id,
            group_id: intent.group_id,
            target: intent.target.trim().to_string(),
        })?;

        match policy::authorize(&intent.actor, resolution.is_self) {
            Decision::Allow => Ok(resolution.character),
            Decision::Deny => Err(HandleError::Unauthorized {
                operation,
                actor_id: intent.actor.user_id,
                target: resolution.character.display_name,
            }),
        }
    }
}
