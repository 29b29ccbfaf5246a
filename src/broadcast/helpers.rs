use crate::config::HalfcastConfig;
use crate::error::{HalfcastError, Result};
use crate::fabric::RankDomain;
use crate::types::Checkpoint;

/// Sleep-poll this rank's own confirmation flag until its data has landed,
/// bounded by the configured wait timeout.
///
/// The blocking drivers return as soon as a rank has walked its tree levels,
/// which for a pure leaf can be before its inbound write was even issued;
/// callers use this to wait for their copy.
pub async fn wait_data_ready<T>(domain: &RankDomain<T>, config: &HalfcastConfig) -> Result<()>
where
    T: Copy + Default + Send + Sync + 'static,
{
    let deadline = tokio::time::Instant::now() + config.wait_timeout;
    while !domain.check_ready() {
        if tokio::time::Instant::now() >= deadline {
            tracing::warn!(rank = domain.rank(), "data wait stalled");
            return Err(HalfcastError::Stalled {
                checkpoint: Checkpoint::DataReady,
                timeout_ms: config.wait_timeout.as_millis() as u64,
            });
        }
        tokio::time::sleep(config.poll_interval).await;
    }
    Ok(())
}
