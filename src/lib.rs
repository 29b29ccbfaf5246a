pub mod broadcast;
pub mod config;
pub mod error;
pub mod fabric;
pub mod topology;
pub mod types;

pub use broadcast::{AsyncBroadcast, PendingPuts, broadcast_flat, broadcast_mst, wait_data_ready};
pub use config::HalfcastConfig;
pub use error::{HalfcastError, Result};
pub use fabric::{PutHandle, RankDomain, SharedWorld};
pub use topology::{Interval, tree_depth};
pub use types::{Checkpoint, Rank};
