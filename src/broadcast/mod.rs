//! Broadcast drivers over the one-sided fabric.

mod engine;
mod flat;
mod helpers;
mod mst;
mod pending;

pub use engine::AsyncBroadcast;
pub use flat::broadcast_flat;
pub use helpers::wait_data_ready;
pub use mst::broadcast_mst;
pub use pending::PendingPuts;
