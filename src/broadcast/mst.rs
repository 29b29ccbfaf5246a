//! Synchronous recursive-halving driver (the blocking comparison baseline).
//!
//! Same dissemination tree as the asynchronous engine, but each forwarding
//! write is fully awaited before descending a level, so a rank gives the
//! caller no chance to overlap local work. Kept as the simpler special case
//! the engine is measured against.

use crate::broadcast::helpers::wait_data_ready;
use crate::config::HalfcastConfig;
use crate::error::Result;
use crate::fabric::RankDomain;
use crate::topology::Interval;
use crate::types::Rank;

/// Walk every level of the tree rooted at `root`, blocking on each
/// forwarding write this rank owes.
///
/// An explicit loop over levels rather than recursion: the interval shrinks
/// by half each iteration, so the walk is ⌈log2 N⌉ steps with no stack
/// growth. Returns once this rank's interval is a singleton; a leaf's own
/// inbound write may still be in flight at that point, so callers that need
/// the data follow up with [`wait_data_ready`].
///
/// The root must have been seeded before this is called on any rank.
pub async fn broadcast_mst<T>(
    domain: &RankDomain<T>,
    root: Rank,
    config: &HalfcastConfig,
) -> Result<()>
where
    T: Copy + Default + Send + Sync + 'static,
{
    let rank = domain.rank();
    let mut interval = Interval::full(domain.world_size(), root)?;

    while !interval.is_singleton() {
        if let Some(dest) = interval.forward_target(rank) {
            // Guard against forwarding before the previous level's write
            // into this rank has landed.
            wait_data_ready(domain, config).await?;
            domain.put_chained(dest)?.wait().await?;
            tracing::debug!(rank, dest, interval = %interval, "committed forwarding write");
        }
        interval = interval.step(rank);
    }

    Ok(())
}
