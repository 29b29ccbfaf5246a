use std::time::Duration;

use halfcast::{AsyncBroadcast, HalfcastConfig, HalfcastError, SharedWorld};

use super::helpers::run_world;

/// Drive one rank through a full broadcast: seed at the root, then wait out
/// all three checkpoints and verify the local copy.
async fn drive_and_verify(mut bcast: AsyncBroadcast<i32>, root: u32, expected: &[i32]) {
    let rank = bcast.rank();
    if rank == root {
        bcast.seed_root(expected).unwrap();
    }

    bcast.wait_data().await.unwrap();
    bcast.wait_all_issued().await.unwrap();
    bcast.wait_all_committed().await.unwrap();

    assert!(bcast.all_issued());
    assert_eq!(bcast.pending_writes(), 0);
    assert_eq!(
        bcast.local_data().unwrap(),
        expected,
        "rank {rank} broadcast from root {root} failed"
    );
}

#[tokio::test]
async fn test_single_rank_world() {
    // Scenario: N=1, the root is its own only leaf.
    run_world::<i32, _, _>(1, 8, |domain| async move {
        let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
        // Terminal before any work: the interval starts as a singleton.
        assert!(bcast.poll().unwrap());
        assert!(!bcast.data_ready());

        bcast.seed_root(&[3; 8]).unwrap();
        assert!(bcast.data_ready());
        assert!(bcast.all_committed());
        assert_eq!(bcast.local_data().unwrap(), &[3; 8]);
    })
    .await;
}

#[tokio::test]
async fn test_two_ranks_large_payload() {
    // Scenario: N=2, root 0, 1,000,000 elements all set to 12. A single
    // forwarding write carries the whole payload.
    let expected = vec![12i32; 1_000_000];
    run_world::<i32, _, _>(2, 1_000_000, move |domain| {
        let expected = expected.clone();
        async move {
            let bcast = AsyncBroadcast::new(domain, 0).unwrap();
            drive_and_verify(bcast, 0, &expected).await;
        }
    })
    .await;
}

#[tokio::test]
async fn test_broadcast_all_sizes_and_roots() {
    for world_size in [2u32, 3, 5, 8] {
        for root in [0, world_size - 1, world_size / 2] {
            let expected: Vec<i32> = (0..64).map(|i| i * 7 + root as i32).collect();
            let payload = expected.clone();
            run_world::<i32, _, _>(world_size, 64, move |domain| {
                let payload = payload.clone();
                async move {
                    let bcast = AsyncBroadcast::new(domain, root).unwrap();
                    drive_and_verify(bcast, root, &payload).await;
                }
            })
            .await;
        }
    }
}

#[tokio::test]
async fn test_nonzero_root_eight_ranks() {
    let expected = vec![99i32; 256];
    run_world::<i32, _, _>(8, 256, move |domain| {
        let expected = expected.clone();
        async move {
            let bcast = AsyncBroadcast::new(domain, 3).unwrap();
            drive_and_verify(bcast, 3, &expected).await;
        }
    })
    .await;
}

#[tokio::test]
async fn test_poll_idempotent_after_terminal() {
    run_world::<i32, _, _>(3, 16, |domain| async move {
        let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
        if bcast.rank() == 0 {
            bcast.seed_root(&[5; 16]).unwrap();
        }
        bcast.wait_data().await.unwrap();
        bcast.wait_all_issued().await.unwrap();
        bcast.wait_all_committed().await.unwrap();

        let snapshot = bcast.local_data().unwrap().to_vec();
        // Extra polls after the terminal state: still terminal, data intact.
        for _ in 0..10 {
            assert!(bcast.poll().unwrap());
            assert!(bcast.data_ready());
        }
        assert_eq!(bcast.local_data().unwrap(), snapshot);
    })
    .await;
}

#[tokio::test]
async fn test_data_ready_rises_exactly_once() {
    run_world::<i32, _, _>(4, 32, |domain| async move {
        let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
        let rank = bcast.rank();
        if rank == 0 {
            assert!(!bcast.data_ready());
            bcast.seed_root(&[1; 32]).unwrap();
        }

        let mut transitions = 0;
        let mut ready = bcast.data_ready();
        if ready {
            transitions += 1;
        }
        loop {
            let done = bcast.poll().unwrap();
            let now_ready = bcast.data_ready();
            assert!(ready <= now_ready, "rank {rank}: flag fell back to 0");
            if now_ready && !ready {
                transitions += 1;
            }
            ready = now_ready;
            if done && now_ready {
                break;
            }
            tokio::time::sleep(Duration::from_micros(100)).await;
        }
        assert_eq!(transitions, 1, "rank {rank}: flag rose more than once");

        bcast.wait_all_committed().await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn test_local_data_before_arrival_is_an_error() {
    run_world::<i32, _, _>(2, 8, |domain| async move {
        let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
        if bcast.rank() == 1 {
            assert!(matches!(
                bcast.local_data(),
                Err(HalfcastError::DataNotReady { rank: 1 })
            ));
        } else {
            bcast.seed_root(&[4; 8]).unwrap();
        }
        bcast.wait_data().await.unwrap();
        bcast.wait_all_issued().await.unwrap();
        bcast.wait_all_committed().await.unwrap();
    })
    .await;
}

#[tokio::test]
async fn test_seed_misuse_errors() {
    run_world::<i32, _, _>(2, 8, |domain| async move {
        let mut bcast = AsyncBroadcast::new(domain, 0).unwrap();
        match bcast.rank() {
            0 => {
                assert!(matches!(
                    bcast.seed_root(&[1; 4]),
                    Err(HalfcastError::BufferSizeMismatch {
                        expected: 8,
                        actual: 4
                    })
                ));
                bcast.seed_root(&[1; 8]).unwrap();
                assert!(matches!(
                    bcast.seed_root(&[2; 8]),
                    Err(HalfcastError::AlreadySeeded { rank: 0 })
                ));
            }
            _ => {
                assert!(matches!(
                    bcast.seed_root(&[1; 8]),
                    Err(HalfcastError::NotRoot { rank: 1, root: 0 })
                ));
            }
        }
        bcast.wait_data().await.unwrap();
        bcast.wait_all_issued().await.unwrap();
        bcast.wait_all_committed().await.unwrap();
        assert_eq!(bcast.local_data().unwrap(), &[1; 8]);
    })
    .await;
}

#[tokio::test]
async fn test_construct_rejects_out_of_range_root() {
    let mut domains = SharedWorld::allocate::<i32>(2, 8).unwrap();
    let domain = domains.remove(0);
    assert!(matches!(
        AsyncBroadcast::new(domain, 2),
        Err(HalfcastError::InvalidRoot {
            root: 2,
            world_size: 2
        })
    ));
}

#[tokio::test]
async fn test_unseeded_root_stalls_with_timeout() {
    // The root never seeds, so nothing ever lands anywhere. Every wait must
    // surface as a Stalled error rather than hanging.
    let config = HalfcastConfig {
        poll_interval: Duration::from_micros(100),
        wait_timeout: Duration::from_millis(100),
    };
    run_world::<i32, _, _>(2, 8, move |domain| {
        let config = config.clone();
        async move {
            let mut bcast = AsyncBroadcast::with_config(domain, 0, config).unwrap();
            let err = bcast.wait_data().await.unwrap_err();
            assert!(
                matches!(err, HalfcastError::Stalled { timeout_ms: 100, .. }),
                "unexpected error: {err}"
            );
        }
    })
    .await;
}
