//! Naive linear broadcast benchmark: the root writes to every rank in turn.
//!
//! ```bash
//! cargo run --example flat
//! ```

use std::time::Instant;

use halfcast::{HalfcastConfig, SharedWorld, broadcast_flat, wait_data_ready};

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

            broadcast_flat(&domain, ROOT).await?;
            wait_data_ready(&domain, &config).await?;

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
