pub mod error;
pub mod manager;
pub mod model;

pub use error::PollingError;
pub use manager::PollingManager;
pub use model::AppConfig;

use serde::{Deserialize, Serialize};

/// Status of one live poller, as reported by the polling status endpoint.
/// Apps without an entry are not being polled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollerStatus {
    pub interval_secs: u64,
    pub active: bool,
}

/// Request to change an app's polling configuration
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigureAppRequest {
    pub poll_interval_secs: Option<i64>,
    pub is_active: Option<bool>,
}
