//! Asynchronous recursive-halving broadcast benchmark.
//!
//! Every rank reports three checkpoint times: when its own data arrived,
//! when all of its forwarding writes were issued, and when they had all
//! committed. Pass `--kernel` to run a 500 ms stand-in local computation
//! between data arrival and the later checkpoints, demonstrating overlap.
//!
//! ```bash
//! cargo run --example overlap -- --kernel
//! ```

use std::time::{Duration, Instant};

use halfcast::{AsyncBroadcast, SharedWorld};

const WORLD_SIZE: u32 = 8;
const BCAST_SIZE: usize = 1_000_000;
const PAYLOAD: i32 = 12;

#[tokio::main]
async fn main() -> halfcast::Result<()> {
    let kernel = std::env::args().any(|a| a == "--kernel");

    let domains = SharedWorld::allocate::<i32>(WORLD_SIZE, BCAST_SIZE)?;

    let mut tasks = Vec::new();
    for domain in domains {
        tasks.push(tokio::spawn(async move {
            let rank = domain.rank();
            let mut bcast = AsyncBroadcast::new(domain, 0)?;

            bcast.fabric().barrier().await;
            let begin = Instant::now();

            if rank == 0 {
                bcast.seed_root(&vec![PAYLOAD; BCAST_SIZE])?;
            }

            bcast.wait_data().await?;
            println!(
                "(1) rank {rank}: data available after {:.6}s",
                begin.elapsed().as_secs_f64()
            );

            if kernel {
                // Stand-in for an independent local computation; broadcast
                // writes keep committing in the background.
                tokio::time::sleep(Duration::from_millis(500)).await;
                println!(
                    "(2) rank {rank}: kernel done after {:.6}s",
                    begin.elapsed().as_secs_f64()
                );
            }

            bcast.wait_all_issued().await?;
            println!(
                "(3) rank {rank}: all writes issued after {:.6}s",
                begin.elapsed().as_secs_f64()
            );

            bcast.wait_all_committed().await?;
            println!(
                "(4) rank {rank}: all writes committed after {:.6}s",
                begin.elapsed().as_secs_f64()
            );

            let elapsed = begin.elapsed().as_secs_f64();
            let total = bcast.fabric_mut().sum_reduce(elapsed).await?;
            bcast.fabric().barrier().await;
            if rank == 0 {
                println!(
                    "broadcast took {:.6}s wall, {:.6}s mean across {WORLD_SIZE} ranks",
                    begin.elapsed().as_secs_f64(),
                    total / f64::from(WORLD_SIZE)
                );
            }

            let data = bcast.local_data()?;
            assert!(data.iter().all(|&v| v == PAYLOAD), "rank {rank} holds wrong data");

            halfcast::Result::Ok(())
        }));
    }

    for t in tasks {
        t.await.expect("rank task panicked")?;
    }

    Ok(())
}
