use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use gsbot_api::config::{LogFormat, ServerConfig};
use gsbot_api::router::build_app_router;
use gsbot_api::state::AppState;
use gsbot_db::PgCharacterStore;
use gsbot_engine::{CloudinaryUploader, Engine, PassthroughUploader, PicUploader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "gsbot_api=debug,gsbot_engine=debug,tower_http=debug";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Configuration ---
    let config = ServerConfig::from_env();

    // --- Tracing ---
    init_tracing(config.log_format);
    tracing::info!(host = %config.host, port = %config.port, "Loaded server configuration");
    if config.request_timeout_secs <= config.confirm_timeout_secs {
        tracing::warn!(
            request_timeout_secs = config.request_timeout_secs,
            confirm_timeout_secs = config.confirm_timeout_secs,
            "Request timeout does not exceed the confirmation window; purges will be cut off"
        );
    }

    // --- Database ---
    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let pool = gsbot_db::create_pool(&database_url)
        .await
        .expect("Failed to connect to database");
    tracing::info!("Database connection pool created");

    gsbot_db::health_check(&pool)
        .await
        .expect("Database health check failed");
    tracing::info!("Database health check passed");

    gsbot_db::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    tracing::info!("Database migrations applied");

    // --- Event bus ---
    let event_bus = Arc::new(gsbot_events::EventBus::default());
    let persistence_handle = tokio::spawn(gsbot_events::AuditPersistence::run(
        pool.clone(),
        event_bus.subscribe(),
    ));
    tracing::info!("Audit persistence started");

    // --- Engine ---
    let store = Arc::new(PgCharacterStore::new(pool.clone()));
    let engine = Arc::new(Engine::new(
        store,
        Arc::clone(&event_bus),
        build_uploader(&config),
        config.engine_config(),
    ));

    // --- App state ---
    let state = AppState {
        engine,
        pool: Some(pool.clone()),
    };
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    // --- Post-shutdown cleanup ---
    tracing::info!("Server stopped accepting connections, cleaning up");

    // The engine went down with the router; dropping the last bus handle
    // closes the channel and stops persistence.
    drop(event_bus);
    let _ = tokio::time::timeout(Duration::from_secs(5), persistence_handle).await;
    pool.close().await;
    tracing::info!("Graceful shutdown complete");
}

fn init_tracing(format: LogFormat) {
    let registry = tracing_subscriber::registry().with(
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
    );
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

fn build_uploader(config: &ServerConfig) -> Arc<dyn PicUploader> {
    match &config.cloud {
        Some(cloud) => {
            tracing::info!(cloud_name = %cloud.cloud_name, "Uploading gear pictures to Cloudinary");
            Arc::new(CloudinaryUploader::new(
                &cloud.cloud_name,
                cloud.upload_preset.clone(),
                config.pic_tag.clone(),
            ))
        }
        None => {
            tracing::info!("No image host configured, storing gear picture URLs as given");
            Arc::new(PassthroughUploader)
        }
    }
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
