//! In-process remote-memory fabric.
//!
//! `SharedWorld::allocate` is the collective allocation step: every rank gets
//! a same-size data segment and a confirmation flag, and every rank can
//! address every other rank's segment. One-sided writes are carried out by
//! spawned delivery tasks, so issuing a write never blocks the caller and
//! completion is observed through a [`PutHandle`].
//!
//! The fabric plays the role an RDMA NIC or a PGAS runtime would play in a
//! multi-process deployment; running it in-process keeps the whole world
//! drivable from one test or benchmark (one tokio task per rank).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::error::{HalfcastError, Result};
use crate::fabric::PutHandle;
use crate::types::Rank;

/// One rank's remotely addressable allocation: a data segment plus the
/// confirmation flag guarding it.
struct Segment<T> {
    data: *mut T,
    len: usize,
    flag: AtomicI32,
}

impl<T: Copy + Default> Segment<T> {
    fn new(len: usize) -> Self {
        let boxed = vec![T::default(); len].into_boxed_slice();
        Self {
            data: Box::into_raw(boxed).cast::<T>(),
            len,
            flag: AtomicI32::new(0),
        }
    }
}

impl<T> Drop for Segment<T> {
    fn drop(&mut self) {
        // SAFETY: `data` came from `Box::into_raw` of a `len`-element boxed
        // slice in `new` and is freed exactly once, here.
        unsafe {
            drop(Box::from_raw(std::ptr::slice_from_raw_parts_mut(
                self.data, self.len,
            )));
        }
    }
}

// SAFETY: a segment is written remotely only by the unique forwarding parent
// the topology rule selects for it, and read by its owner only after an
// Acquire load of `flag` observes the parent's Release store. The protocol
// admits no concurrent writers to the same segment.
unsafe impl<T: Send> Send for Segment<T> {}
unsafe impl<T: Send + Sync> Sync for Segment<T> {}

#[derive(Default)]
struct ReduceSlot {
    sum: f64,
    contributed: u32,
    read: u32,
}

struct WorldInner<T> {
    segments: Vec<Segment<T>>,
    capacity: usize,
    barrier: tokio::sync::Barrier,
    /// Per-epoch accumulator slots for `sum_reduce`. Benchmarking only.
    reduce: Mutex<HashMap<u64, ReduceSlot>>,
}

impl<T: Copy> WorldInner<T> {
    /// Stage 1 of a one-sided write: copy `src`'s segment into `dst`'s.
    fn copy_segment(&self, src: usize, dst: usize) {
        debug_assert_ne!(src, dst);
        // SAFETY: both pointers are valid for `capacity` elements for the
        // lifetime of the world, and the segments are distinct allocations.
        // Exclusive write access to `dst` is guaranteed by the tree
        // partition (see the Send/Sync rationale on `Segment`).
        unsafe {
            std::ptr::copy_nonoverlapping(
                self.segments[src].data,
                self.segments[dst].data,
                self.capacity,
            );
        }
    }
}

/// Collective allocation entry point for the in-process fabric.
pub struct SharedWorld;

impl SharedWorld {
    /// Allocate a `capacity`-element data segment and a confirmation flag on
    /// every rank, returning one [`RankDomain`] handle per rank.
    ///
    /// All flags start at 0; buffers start zeroed (`T::default()`).
    pub fn allocate<T>(world_size: u32, capacity: usize) -> Result<Vec<RankDomain<T>>>
    where
        T: Copy + Default + Send + Sync + 'static,
    {
        if world_size == 0 {
            return Err(HalfcastError::EmptyWorld);
        }
        if capacity == 0 {
            return Err(HalfcastError::InvalidCapacity);
        }

        let inner = Arc::new(WorldInner {
            segments: (0..world_size).map(|_| Segment::new(capacity)).collect(),
            capacity,
            barrier: tokio::sync::Barrier::new(world_size as usize),
            reduce: Mutex::new(HashMap::new()),
        });

        Ok((0..world_size)
            .map(|rank| RankDomain {
                rank,
                world_size,
                epoch: 0,
                inner: Arc::clone(&inner),
            })
            .collect())
    }
}

/// Bound on how long `sum_reduce` waits for stragglers.
const REDUCE_TIMEOUT: Duration = Duration::from_secs(30);

/// One rank's handle onto the shared world.
///
/// Owns this rank's identity and gives one-sided access to every segment in
/// the world: local reads of its own buffer and flag, and remote writes into
/// other ranks' buffers and flags.
pub struct RankDomain<T> {
    rank: Rank,
    world_size: u32,
    /// Monotonic counter pairing this rank's `sum_reduce` calls with their
    /// world-wide accumulator slot.
    epoch: u64,
    inner: Arc<WorldInner<T>>,
}

impl<T> RankDomain<T>
where
    T: Copy + Default + Send + Sync + 'static,
{
    /// This rank's identity.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Number of ranks in the world.
    pub fn world_size(&self) -> u32 {
        self.world_size
    }

    /// Element capacity of every rank's data segment.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// This rank's local data segment.
    ///
    /// # Safety Contract
    ///
    /// The content is only meaningful once [`check_ready()`](Self::check_ready)
    /// returns true; before that, a forwarding parent may still be writing it.
    pub fn local_slice(&self) -> &[T] {
        let seg = &self.inner.segments[self.rank as usize];
        // SAFETY: `seg.data` is valid for `seg.len` elements for the lifetime
        // of the world (kept alive by `self.inner`).
        unsafe { std::slice::from_raw_parts(seg.data, seg.len) }
    }

    /// Seed this rank's segment with `data` and raise its flag, in one
    /// unsynchronized local step.
    ///
    /// This is how the true root injects the payload before any forwarding
    /// begins; the flag-based synchronization scheme does not guard it.
    pub fn seed(&mut self, data: &[T]) -> Result<()> {
        if data.len() != self.inner.capacity {
            return Err(HalfcastError::BufferSizeMismatch {
                expected: self.inner.capacity,
                actual: data.len(),
            });
        }
        let seg = &self.inner.segments[self.rank as usize];
        if seg.flag.load(Ordering::Acquire) == 1 {
            return Err(HalfcastError::AlreadySeeded { rank: self.rank });
        }
        // SAFETY: exclusive access. The flag is still 0, so no forwarding
        // parent has targeted this segment, and `&mut self` excludes local
        // aliasing.
        unsafe {
            std::ptr::copy_nonoverlapping(data.as_ptr(), seg.data, data.len());
        }
        seg.flag.store(1, Ordering::Release);
        Ok(())
    }

    /// One-sided read of `rank`'s confirmation flag.
    ///
    /// `rank` must be a member of this world.
    pub fn flag_value(&self, rank: Rank) -> i32 {
        self.inner.segments[rank as usize]
            .flag
            .load(Ordering::Acquire)
    }

    /// True once this rank's own buffer holds valid broadcast data.
    pub fn check_ready(&self) -> bool {
        self.flag_value(self.rank) == 1
    }

    /// Issue a non-blocking one-sided write of this rank's full segment into
    /// `dest`'s segment, chained so that `dest`'s confirmation flag is set to
    /// 1 only after the data write has fully landed.
    ///
    /// The chaining is what keeps the flag trustworthy: a downstream rank
    /// that observes flag == 1 can never read torn data.
    pub fn put_chained(&self, dest: Rank) -> Result<PutHandle> {
        if dest >= self.world_size {
            return Err(HalfcastError::InvalidRank {
                rank: dest,
                world_size: self.world_size,
            });
        }
        if dest == self.rank {
            return Err(HalfcastError::fabric("one-sided write to self"));
        }

        let world = Arc::clone(&self.inner);
        let src = self.rank as usize;
        let dst = dest as usize;
        let task = tokio::spawn(async move {
            tracing::trace!(src, dst, "delivering one-sided write");
            let copy = {
                let world = Arc::clone(&world);
                tokio::task::spawn_blocking(move || world.copy_segment(src, dst))
            };
            if let Err(e) = copy.await {
                // Leave the flag down: the destination will report a stall
                // rather than forward torn data.
                tracing::warn!(src, dst, "data write stage failed: {e}");
                return;
            }
            // Stage 2 is issued only after stage 1's completion was observed.
            world.segments[dst].flag.store(1, Ordering::Release);
        });
        Ok(PutHandle::new(task))
    }

    /// Collective barrier over all ranks. Benchmarking only, not required
    /// for broadcast correctness.
    pub async fn barrier(&self) {
        self.inner.barrier.wait().await;
    }

    /// Collective sum-reduction of one `f64` per rank. Benchmarking only.
    ///
    /// Every rank must call this the same number of times; calls are matched
    /// up world-wide by arrival order per rank.
    pub async fn sum_reduce(&mut self, value: f64) -> Result<f64> {
        let epoch = self.epoch;
        self.epoch += 1;

        {
            let mut slots = self
                .inner
                .reduce
                .lock()
                .map_err(|_| HalfcastError::LockPoisoned("reduce slots"))?;
            let slot = slots.entry(epoch).or_default();
            slot.sum += value;
            slot.contributed += 1;
        }

        let deadline = tokio::time::Instant::now() + REDUCE_TIMEOUT;
        loop {
            {
                let mut slots = self
                    .inner
                    .reduce
                    .lock()
                    .map_err(|_| HalfcastError::LockPoisoned("reduce slots"))?;
                let slot = slots
                    .get_mut(&epoch)
                    .ok_or_else(|| HalfcastError::fabric("sum-reduce slot vanished"))?;
                if slot.contributed == self.world_size {
                    let sum = slot.sum;
                    slot.read += 1;
                    if slot.read == self.world_size {
                        slots.remove(&epoch);
                    }
                    return Ok(sum);
                }
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(HalfcastError::fabric(format!(
                    "sum-reduce stalled after {}s: not all ranks contributed",
                    REDUCE_TIMEOUT.as_secs()
                )));
            }
            tokio::time::sleep(Duration::from_micros(100)).await;
        }
    }
}
