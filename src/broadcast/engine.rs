//! Asynchronous recursive-halving broadcast engine.
//!
//! A resumable state machine: each `poll()` performs at most one level of
//! the dissemination tree and never blocks, so the owning rank can run
//! arbitrary local work between polls without stalling the collective.

use crate::broadcast::pending::PendingPuts;
use crate::config::HalfcastConfig;
use crate::error::{HalfcastError, Result};
use crate::fabric::RankDomain;
use crate::topology::Interval;
use crate::types::{Checkpoint, Rank};

/// One rank's handle on an in-progress broadcast.
///
/// Construct one per rank over a freshly allocated world, seed the root,
/// then drive with [`poll()`](Self::poll) or the checkpoint waits. The
/// engine is single-shot: a fresh broadcast requires a fresh world and a
/// fresh engine.
pub struct AsyncBroadcast<T> {
    domain: RankDomain<T>,
    root: Rank,
    interval: Interval,
    pending: PendingPuts,
    config: HalfcastConfig,
}

impl<T> AsyncBroadcast<T>
where
    T: Copy + Default + Send + Sync + 'static,
{
    /// Construct an engine for the broadcast rooted at `root`.
    pub fn new(domain: RankDomain<T>, root: Rank) -> Result<Self> {
        Self::with_config(domain, root, HalfcastConfig::default())
    }

    /// Construct with explicit tuning parameters.
    pub fn with_config(
        domain: RankDomain<T>,
        root: Rank,
        config: HalfcastConfig,
    ) -> Result<Self> {
        let interval = Interval::full(domain.world_size(), root)?;
        Ok(Self {
            domain,
            root,
            interval,
            pending: PendingPuts::new(),
            config,
        })
    }

    /// This rank's identity.
    pub fn rank(&self) -> Rank {
        self.domain.rank()
    }

    /// The rank the broadcast originates from.
    pub fn root(&self) -> Rank {
        self.root
    }

    /// Borrow the underlying fabric domain (barriers, flag reads).
    pub fn fabric(&self) -> &RankDomain<T> {
        &self.domain
    }

    /// Mutably borrow the underlying fabric domain (sum-reduce).
    pub fn fabric_mut(&mut self) -> &mut RankDomain<T> {
        &mut self.domain
    }

    /// Seed the root's buffer with the payload, before any polling begins.
    ///
    /// Root only; `data` must fill the whole segment; at most once per
    /// broadcast instance.
    pub fn seed_root(&mut self, data: &[T]) -> Result<()> {
        let rank = self.domain.rank();
        if rank != self.root {
            return Err(HalfcastError::NotRoot {
                rank,
                root: self.root,
            });
        }
        self.domain.seed(data)
    }

    /// Drive the broadcast forward by at most one tree level. Non-blocking.
    ///
    /// Returns true once this rank's interval has collapsed to a singleton
    /// (no forwarding obligations remain); idempotent from then on. Returns
    /// false while levels remain, including when the only thing stopping
    /// progress is that this rank's own inbound write has not landed yet.
    pub fn poll(&mut self) -> Result<bool> {
        if self.interval.is_singleton() {
            return Ok(true);
        }

        let rank = self.domain.rank();
        if let Some(dest) = self.interval.forward_target(rank) {
            if !self.domain.check_ready() {
                // The previous level's write has not landed; forwarding now
                // would ship stale data. Retry on the next poll.
                return Ok(false);
            }
            let handle = self.domain.put_chained(dest)?;
            self.pending.push(handle);
            tracing::debug!(rank, dest, interval = %self.interval, "issued forwarding write");
        }

        self.interval = self.interval.step(rank);
        tracing::trace!(rank, interval = %self.interval, "descended one tree level");
        Ok(false)
    }

    /// True once this rank's own buffer holds valid broadcast data.
    /// A single flag read; never drives the broadcast forward.
    pub fn data_ready(&self) -> bool {
        self.domain.check_ready()
    }

    /// True once this rank has issued every forwarding write it will ever
    /// owe (its interval is a singleton).
    pub fn all_issued(&self) -> bool {
        self.interval.is_singleton()
    }

    /// Advance the completion tracker once and report whether every issued
    /// write (and its chained flag write) has landed remotely.
    ///
    /// The strongest checkpoint: after this, none of this rank's writes can
    /// race with a barrier or buffer reuse.
    pub fn all_committed(&mut self) -> bool {
        self.pending.advance()
    }

    /// Number of forwarding writes not yet observed complete.
    pub fn pending_writes(&self) -> usize {
        self.pending.len()
    }

    /// This rank's buffer, once it holds valid broadcast data.
    pub fn local_data(&self) -> Result<&[T]> {
        if !self.data_ready() {
            return Err(HalfcastError::DataNotReady {
                rank: self.domain.rank(),
            });
        }
        Ok(self.domain.local_slice())
    }

    /// Wait until this rank's own data has arrived.
    ///
    /// Keeps polling while it waits, so a mid-tree rank continues its
    /// forwarding duties during the wait.
    pub async fn wait_data(&mut self) -> Result<()> {
        self.wait_checkpoint(Checkpoint::DataReady, |e| {
            if e.data_ready() {
                Ok(true)
            } else {
                e.poll()?;
                Ok(false)
            }
        })
        .await
    }

    /// Wait until every forwarding write has been issued.
    pub async fn wait_all_issued(&mut self) -> Result<()> {
        self.wait_checkpoint(Checkpoint::AllIssued, Self::poll).await
    }

    /// Wait until every issued write has fully landed on its destination.
    pub async fn wait_all_committed(&mut self) -> Result<()> {
        self.wait_checkpoint(Checkpoint::AllCommitted, |e| Ok(e.all_committed()))
            .await
    }

    /// Sleep-poll `advance` until it reports the checkpoint holds, bounded
    /// by the configured wait timeout.
    async fn wait_checkpoint<F>(&mut self, checkpoint: Checkpoint, mut advance: F) -> Result<()>
    where
        F: FnMut(&mut Self) -> Result<bool>,
    {
        let deadline = tokio::time::Instant::now() + self.config.wait_timeout;
        loop {
            if advance(self)? {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                tracing::warn!(
                    rank = self.domain.rank(),
                    %checkpoint,
                    pending = self.pending.len(),
                    "checkpoint wait stalled"
                );
                return Err(HalfcastError::Stalled {
                    checkpoint,
                    timeout_ms: self.config.wait_timeout.as_millis() as u64,
                });
            }
            tokio::time::sleep(self.config.poll_interval).await;
        }
    }
}
