//! Naive linear baseline: the root writes the full buffer to every other
//! rank in turn, blocking on each write pair. O(N) writes from one rank,
//! against the tree drivers' ⌈log2 N⌉ depth.

use crate::error::{HalfcastError, Result};
use crate::fabric::RankDomain;
use crate::types::Rank;

/// Broadcast by direct writes from `root` to every other rank, in rank
/// order, each fully committed before the next is issued.
///
/// The root must have been seeded first. Non-root ranks return immediately;
/// they observe arrival through their confirmation flag
/// ([`wait_data_ready`](crate::broadcast::wait_data_ready)).
pub async fn broadcast_flat<T>(domain: &RankDomain<T>, root: Rank) -> Result<()>
where
    T: Copy + Default + Send + Sync + 'static,
{
    let world_size = domain.world_size();
    if root >= world_size {
        return Err(HalfcastError::InvalidRoot { root, world_size });
    }

    let rank = domain.rank();
    if rank != root {
        return Ok(());
    }
    if !domain.check_ready() {
        return Err(HalfcastError::DataNotReady { rank });
    }

    for dest in 0..world_size {
        if dest != root {
            domain.put_chained(dest)?.wait().await?;
            tracing::debug!(rank, dest, "committed direct write");
        }
    }

    Ok(())
}
