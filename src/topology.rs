//! The bisection rule of the recursive-halving dissemination tree.
//!
//! Every rank applies the same deterministic rule to the same initial
//! `(0, N-1, root)` state, so the whole world converges on an identical
//! tree without exchanging a single coordination message. The correctness
//! of the broadcast rests on nothing more than every rank evaluating the
//! same arithmetic here.

use crate::error::{HalfcastError, Result};
use crate::types::Rank;

/// One rank's view of the dissemination tree: the inclusive interval of
/// ranks it currently shares a root with, and that root.
///
/// The interval shrinks monotonically toward a singleton as levels are
/// applied. It is a plain value threaded through each poll rather than
/// hidden engine state, so several broadcasts (or a test) can walk the
/// tree independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Interval {
    left: Rank,
    right: Rank,
    root: Rank,
}

impl Interval {
    /// The full-world starting interval `[0, world_size - 1]` rooted at `root`.
    pub fn full(world_size: u32, root: Rank) -> Result<Self> {
        if world_size == 0 {
            return Err(HalfcastError::EmptyWorld);
        }
        if root >= world_size {
            return Err(HalfcastError::InvalidRoot { root, world_size });
        }
        Ok(Self {
            left: 0,
            right: world_size - 1,
            root,
        })
    }

    /// Left edge of the interval (inclusive).
    pub fn left(&self) -> Rank {
        self.left
    }

    /// Right edge of the interval (inclusive).
    pub fn right(&self) -> Rank {
        self.right
    }

    /// The rank currently holding valid data for this interval.
    pub fn root(&self) -> Rank {
        self.root
    }

    /// True once the interval owns exactly one rank: the terminal state.
    pub fn is_singleton(&self) -> bool {
        self.left == self.right
    }

    fn mid(&self) -> Rank {
        self.left + (self.right - self.left) / 2
    }

    /// Destination of this level's forwarding write: the boundary rank of
    /// the half that does not contain the current root.
    pub fn dest(&self) -> Rank {
        if self.root <= self.mid() {
            self.right
        } else {
            self.left
        }
    }

    /// The forwarding write this level requires of `rank`, if any.
    ///
    /// Only the current root forwards, and only while the interval still
    /// spans more than one rank.
    pub fn forward_target(&self, rank: Rank) -> Option<Rank> {
        if !self.is_singleton() && rank == self.root {
            Some(self.dest())
        } else {
            None
        }
    }

    /// Apply one level of the bisection rule from `rank`'s point of view.
    ///
    /// `rank` keeps the half it falls in; the root of that half is either
    /// the old root (if it landed on the same side) or this level's write
    /// destination. At the singleton fixed point this returns `self`
    /// unchanged.
    pub fn step(&self, rank: Rank) -> Self {
        if self.is_singleton() {
            return *self;
        }
        let mid = self.mid();
        let dest = self.dest();
        if rank <= mid {
            Self {
                left: self.left,
                right: mid,
                root: if self.root <= mid { self.root } else { dest },
            }
        } else {
            Self {
                left: mid + 1,
                right: self.right,
                root: if self.root <= mid { dest } else { self.root },
            }
        }
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]@{}", self.left, self.right, self.root)
    }
}

/// Depth of the dissemination tree: integer ceiling of log2(n).
/// Returns 0 for n <= 1.
pub fn tree_depth(n: u32) -> u32 {
    if n <= 1 {
        return 0;
    }
    // For n > 1: ceil(log2(n)) = 32 - (n-1).leading_zeros()
    u32::BITS - (n - 1).leading_zeros()
}
