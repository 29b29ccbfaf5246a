//! Synchronous recursive-halving broadcast benchmark.
//!
//! Each rank blocks on every forwarding write it owes, level by level.
//!
//! ```bash
//! cargo run --example mst
//! ```

use std::time::Instant;

use halfcast::{HalfcastConfig, SharedWorld, broadcast_mst, wait_data_ready};

const WORLD_SIZE: u32 = 8;
const BCAST_SIZE: usize = 1_000_000;
const PAYLOAD: i32 = 12;
const ROOT: u32 = 0;

#[tokio::main]
async fn main() -> halfcast::Result<()> {
    let domains = SharedWorld::allocate::<i32>(WORLD_SIZE, BCAST_SIZE)?;

    let mut tasks = Vec::new();
    for mut domain in domains {
        tasks.push(tokio::spawn(async move {
            let config = HalfcastConfig::from_env();
            let rank = domain.rank();

            domain.barrier().await;
            let begin = Instant::now();

            if rank == ROOT {
                domain.seed(&vec![PAYLOAD; BCAST_SIZE])?;
            }

            broadcast_mst(&domain, ROOT, &config).await?;
            wait_data_ready(&domain, &config).await?;
            println!("rank {rank}: data ready after {:.6}s", begin.elapsed().as_secs_f64());

            domain.barrier().await;
            if rank == ROOT {
                println!("broadcast took {:.6}s", begin.elapsed().as_secs_f64());
            }

            assert!(
                domain.local_slice().iter().all(|&v| v == PAYLOAD),
                "rank {rank} holds wrong data"
            );

            halfcast::Result::Ok(())
        }));
    }

    for t in tasks {
        t.await.expect("rank task panicked")?;
    }

    Ok(())
}
