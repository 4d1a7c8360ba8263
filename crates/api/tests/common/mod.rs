#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use gsbot_api::config::{LogFormat, ServerConfig};
use gsbot_api::router::build_app_router;
use gsbot_api::state::AppState;
use gsbot_db::models::character::{Character, NewCharacter};
use gsbot_db::{CharacterStore, MemoryCharacterStore};
use gsbot_engine::{Engine, EngineConfig, PassthroughUploader};
use gsbot_events::EventBus;
use http_body_util::BodyExt;
use tower::ServiceExt;

pub const GROUP: i64 = 10;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        confirm_timeout_secs: 10,
        cloud: None,
        pic_tag: "gsbot-test".to_string(),
        log_format: LogFormat::Text,
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryCharacterStore>,
    pub bus: Arc<EventBus>,
}

/// Build the full application router over an in-memory store, with the
/// same middleware stack production uses.
pub fn build_test_app() -> TestApp {
    let config = test_config();
    let store = Arc::new(MemoryCharacterStore::new());
    let bus = Arc::new(EventBus::default());
    let engine = Arc::new(Engine::new(
        store.clone(),
        bus.clone(),
        Arc::new(PassthroughUploader),
        EngineConfig {
            confirm_timeout: Duration::from_secs(config.confirm_timeout_secs),
        },
    ));
    let state = AppState {
        engine,
        pool: None,
    };
    TestApp {
        router: build_app_router(state, &config),
        store,
        bus,
    }
}

pub async fn seed(store: &MemoryCharacterStore, owner_id: i64, name: &str) -> Character {
    store
        .insert(&NewCharacter {
            owner_id,
            group_id: GROUP,
            display_name: name.to_string(),
            char_name: format!("{name}Char"),
            char_class: "Berserker".to_string(),
            level: 60,
            level_progress: 50.0,
            attack_power: 220,
            accessory_attack_power: 200,
            defense_power: 50,
            gear_pic_url: None,
            is_primary: None,
        })
        .await
        .unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    app.oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    app.oneshot(
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
    )
    .await
    .unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
