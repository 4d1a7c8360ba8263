use std::time::Duration;

use gsbot_core::confirmation::DEFAULT_CONFIRM_TIMEOUT_SECS;

/// Engine tunables.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How long a purge waits for the initiator's confirmation reply.
    pub confirm_timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            confirm_timeout: Duration::from_secs(DEFAULT_CONFIRM_TIMEOUT_SECS),
        }
    }
}
