//! Runtime-configurable tuning parameters for halfcast.
//!
//! All values have sensible defaults. Override via environment variables
//! (prefixed `HALFCAST_`) or by constructing a custom `HalfcastConfig`.

use std::time::Duration;

/// Tuning parameters for broadcast polling and checkpoint waits.
#[derive(Debug, Clone)]
pub struct HalfcastConfig {
    /// Sleep between consecutive polls inside the checkpoint wait loops.
    ///
    /// Each poll performs at most one level of the dissemination tree, so
    /// this bounds how often a waiting caller re-enters the engine.
    pub poll_interval: Duration,

    /// Upper bound on any checkpoint wait before it fails with
    /// [`HalfcastError::Stalled`](crate::HalfcastError::Stalled).
    ///
    /// A non-responding peer stalls the tree forever at the protocol level;
    /// this timeout turns that hang into a reportable error.
    pub wait_timeout: Duration,
}

impl Default for HalfcastConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_micros(100),
            wait_timeout: Duration::from_secs(30),
        }
    }
}

impl HalfcastConfig {
    /// Load config from environment variables, falling back to defaults.
    ///
    /// Recognized variables:
    /// - `HALFCAST_POLL_INTERVAL_US`
    /// - `HALFCAST_WAIT_TIMEOUT_SECS`
    pub fn from_env() -> Self {
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("HALFCAST_POLL_INTERVAL_US") {
            if let Ok(us) = v.parse::<u64>() {
                cfg.poll_interval = Duration::from_micros(us);
            }
        }
        if let Ok(v) = std::env::var("HALFCAST_WAIT_TIMEOUT_SECS") {
            if let Ok(s) = v.parse::<u64>() {
                cfg.wait_timeout = Duration::from_secs(s);
            }
        }

        cfg
    }
}
