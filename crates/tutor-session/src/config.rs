use serde::{Deserialize, Serialize};
use std::time::Duration;

fn default_reply_delay_ms() -> u64 {
    1500
}

/// Runtime knobs for the session store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Simulated latency before a scheduled reply fires, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
    /// Fixed seed for canned-reply selection; random when unset.
    #[serde(default)]
    pub reply_seed: Option<u64>,
}

impl StoreConfig {
    /// The reply delay as a [`Duration`].
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
            reply_seed: None,
        }
    }
}
