use std::time::Duration;

use gsbot_core::confirmation::DEFAULT_CONFIRM_TIMEOUT_SECS;
use gsbot_engine::EngineConfig;

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }
}

/// Cloudinary account used for gear picture uploads.
#[derive(Debug, Clone)]
pub struct CloudConfig {
    pub cloud_name: String,
    pub upload_preset: String,
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// HTTP request timeout in seconds (default: `30`). Must exceed the
    /// confirmation window or purges are cut off before they can finish.
    pub request_timeout_secs: u64,
    /// Purge confirmation window in seconds (default: `10`).
    pub confirm_timeout_secs: u64,
    /// Image host for `set_pic`; `None` stores source URLs unchanged.
    pub cloud: Option<CloudConfig>,
    /// Tag attached to uploaded images (default: `gsbot`).
    pub pic_tag: String,
    pub log_format: LogFormat,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default    |
    /// |------------------------|------------|
    /// | `HOST`                 | `0.0.0.0`  |
    /// | `PORT`                 | `3000`     |
    /// | `REQUEST_TIMEOUT_SECS` | `30`       |
    /// | `CONFIRM_TIMEOUT_SECS` | `10`       |
    /// | `CLOUD_NAME`           | unset      |
    /// | `CLOUD_UPLOAD_PRESET`  | unset      |
    /// | `PIC_TAG`              | `gsbot`    |
    /// | `LOG_FORMAT`           | `text`     |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let confirm_timeout_secs: u64 = std::env::var("CONFIRM_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_CONFIRM_TIMEOUT_SECS.to_string())
            .parse()
            .expect("CONFIRM_TIMEOUT_SECS must be a valid u64");

        let cloud = match (
            std::env::var("CLOUD_NAME"),
            std::env::var("CLOUD_UPLOAD_PRESET"),
        ) {
            (Ok(cloud_name), Ok(upload_preset))
                if !cloud_name.is_empty() && !upload_preset.is_empty() =>
            {
                Some(CloudConfig {
                    cloud_name,
                    upload_preset,
                })
            }
            _ => None,
        };

        let pic_tag = std::env::var("PIC_TAG").unwrap_or_else(|_| "gsbot".into());

        let log_format =
            LogFormat::parse(&std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".into()));

        Self {
            host,
            port,
            request_timeout_secs,
            confirm_timeout_secs,
            cloud,
            pic_tag,
            log_format,
        }
    }

    /// The engine's slice of the configuration.
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            confirm_timeout: Duration::from_secs(self.confirm_timeout_secs),
        }
    }
}
