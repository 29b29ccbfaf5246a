use std::time::Duration;

use halfcast::AsyncBroadcast;

use super::helpers::run_world;

/// Scenario: an unrelated local computation runs while the engine is being
/// polled. Whatever the kernel's duration, the final data must be correct;
/// overlap may only change wall-clock time.
async fn broadcast_with_kernel(kernel: Duration) {
    let expected: Vec<i32> = (0..64).map(|i| i * 3).collect();
    let payload = expected.clone();
    run_world::<i32, _, _>(4, 64, move |domain| {
        let payload = payload.clone();
        async move {
            let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
            let rank = bcast.rank();
            if rank == 0 {
                bcast.seed_root(&payload).unwrap();
            }

            // Drive the broadcast and the kernel concurrently; the engine
            // only ever advances between the kernel's scheduling points.
            let drive = async {
                loop {
                    if bcast.poll().unwrap() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_micros(100)).await;
                }
            };
            tokio::join!(drive, tokio::time::sleep(kernel));

            bcast.wait_data().await.unwrap();
            bcast.wait_all_committed().await.unwrap();
            assert_eq!(
                bcast.local_data().unwrap(),
                payload.as_slice(),
                "rank {rank} data corrupted by kernel overlap"
            );
        }
    })
    .await;
}

#[tokio::test]
async fn test_overlap_zero_length_kernel() {
    broadcast_with_kernel(Duration::ZERO).await;
}

#[tokio::test]
async fn test_overlap_long_kernel() {
    broadcast_with_kernel(Duration::from_millis(500)).await;
}

#[tokio::test]
async fn test_kernel_between_data_and_commit() {
    // The reference overlap pattern: consume the data as soon as it lands,
    // run the kernel, and only then settle the remaining commits.
    run_world::<i32, _, _>(4, 64, |domain| async move {
        let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
        if bcast.rank() == 0 {
            bcast.seed_root(&[21; 64]).unwrap();
        }

        bcast.wait_data().await.unwrap();
        let snapshot = bcast.local_data().unwrap().to_vec();

        tokio::time::sleep(Duration::from_millis(50)).await;

        bcast.wait_all_issued().await.unwrap();
        bcast.wait_all_committed().await.unwrap();
        assert_eq!(bcast.local_data().unwrap(), snapshot);
        assert_eq!(snapshot, vec![21; 64]);
    })
    .await;
}
