use std::sync::Arc;

use halfcast::{RankDomain, SharedWorld};

/// Helper: run `f` once per rank, each on its own task, over a freshly
/// allocated world. Panics in any rank task fail the test.
pub async fn run_world<T, F, Fut>(world_size: u32, capacity: usize, f: F)
where
    T: Copy + Default + Send + Sync + 'static,
    F: Fn(RankDomain<T>) -> Fut + Send + Sync + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let domains = SharedWorld::allocate::<T>(world_size, capacity).unwrap();

    let f = Arc::new(f);
    let mut handles = Vec::new();
    for d in domains {
        let f = Arc::clone(&f);
        handles.push(tokio::spawn(async move { f(d).await }));
    }
    for h in handles {
        h.await.unwrap();
    }
}
