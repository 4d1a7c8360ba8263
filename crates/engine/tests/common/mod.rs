//! Shared harness for engine integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gsbot_core::policy::Actor;
use gsbot_core::types::Snowflake;
use gsbot_db::models::character::{Character, NewCharacter};
use gsbot_db::{CharacterStore, MemoryCharacterStore};
use gsbot_engine::{
    Engine, EngineConfig, HandleError, Intent, Operation, Outcome, PassthroughUploader,
    PicUploader, UploadError,
};
use gsbot_events::EventBus;

pub const GROUP: Snowflake = 10;

pub struct Harness {
    pub engine: Arc<Engine>,
    pub store: Arc<MemoryCharacterStore>,
    pub bus: Arc<EventBus>,
}

pub fn harness() -> Harness {
    harness_with_uploader(Arc::new(PassthroughUploader))
}

pub fn harness_with_uploader(uploader: Arc<dyn PicUploader>) -> Harness {
    let store = Arc::new(MemoryCharacterStore::new());
    let bus = Arc::new(EventBus::default());
    let config = EngineConfig {
        confirm_timeout: Duration::from_secs(10),
    };
    let engine = Arc::new(Engine::new(store.clone(), bus.clone(), uploader, config));
    Harness { engine, store, bus }
}

/// Insert a primary character with `aap=200, dp=50`.
pub async fn seed(store: &MemoryCharacterStore, owner_id: Snowflake, name: &str) -> Character {
    store
        .insert(&NewCharacter {
            owner_id,
            group_id: GROUP,
            display_name: name.to_string(),
            char_name: format!("{name}Char"),
            char_class: "Warrior".to_string(),
            level: 60,
            level_progress: 25.0,
            attack_power: 210,
            accessory_attack_power: 200,
            defense_power: 50,
            gear_pic_url: None,
            is_primary: None,
        })
        .await
        .unwrap()
}

pub fn intent(actor: Actor, target: &str, operation: Operation) -> Intent {
    Intent::new(actor, GROUP, target, operation, Utc::now())
}

pub fn expect_updated(result: Result<Outcome, HandleError>) -> gsbot_engine::CharacterView {
    match result {
        Ok(Outcome::Updated(view)) => view,
        other => panic!("expected an update, got {other:?}"),
    }
}

/// Uploader that always fails.
pub struct BrokenUploader;

#[async_trait]
impl PicUploader for BrokenUploader {
    async fn upload(&self, _source: &str) -> Result<String, UploadError> {
        Err(UploadError::Rejected {
            status: 503,
            body: "image host down".to_string(),
        })
    }
}
