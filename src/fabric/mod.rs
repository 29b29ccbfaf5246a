//! One-sided remote-memory fabric consumed by the broadcast drivers.

mod put;
mod world;

pub use put::PutHandle;
pub use world::{RankDomain, SharedWorld};
