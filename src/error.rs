use crate::types::{Checkpoint, Rank};

pub type Result<T> = std::result::Result<T, HalfcastError>;

#[derive(Debug, thiserror::Error)]
pub enum HalfcastError {
    #[error("invalid root {root}: world size is {world_size}")]
    InvalidRoot { root: Rank, world_size: u32 },

    #[error("invalid rank {rank}: world size is {world_size}")]
    InvalidRank { rank: Rank, world_size: u32 },

    #[error("world size must be at least 1")]
    EmptyWorld,

    #[error("buffer capacity must be greater than zero")]
    InvalidCapacity,

    #[error("buffer size mismatch: expected {expected} elements, got {actual}")]
    BufferSizeMismatch { expected: usize, actual: usize },

    #[error("rank {rank} tried to seed a broadcast rooted at rank {root}")]
    NotRoot { rank: Rank, root: Rank },

    #[error("rank {rank} already holds valid broadcast data")]
    AlreadySeeded { rank: Rank },

    #[error("rank {rank} has not received broadcast data yet")]
    DataNotReady { rank: Rank },

    #[error("wait for {checkpoint} stalled after {timeout_ms}ms")]
    Stalled {
        checkpoint: Checkpoint,
        timeout_ms: u64,
    },

    #[error("fabric error: {message}")]
    Fabric { message: String },

    #[error("internal lock poisoned: {0}")]
    LockPoisoned(&'static str),
}

impl HalfcastError {
    /// Create a `Fabric` error with just a message.
    pub fn fabric(msg: impl Into<String>) -> Self {
        Self::Fabric {
            message: msg.into(),
        }
    }
}
