// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Redundant execution with a quorum of successful replicas.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use hive_core::application::{execute_with_bft, BftExecutor};
use hive_core::domain::error::BftError;

#[tokio::test]
async fn test_three_replicas_tolerate_one_failure() {
    let result = execute_with_bft(
        |replica| async move {
            if replica == 0 {
                Err(anyhow!("replica {replica} crashed"))
            } else {
                Ok(replica * 10)
            }
        },
        3,
    )
    .await
    .unwrap();
    // first success in replica order
    assert_eq!(result, 10);
}

#[tokio::test]
async fn test_four_replicas_fail_with_two_failures() {
    let err = execute_with_bft(
        |replica| async move {
            if replica < 2 {
                Err(anyhow!("replica {replica} crashed"))
            } else {
                Ok(replica)
            }
        },
        4,
    )
    .await
    .unwrap_err();

    let BftError::ConsensusFailure {
        successes,
        required,
        replicas,
        first_error,
    } = err;
    assert_eq!(successes, 2);
    assert_eq!(required, 3);
    assert_eq!(replicas, 4);
    assert_eq!(first_error.as_deref(), Some("replica 0 crashed"));
}

#[tokio::test]
async fn test_all_replicas_run_even_when_some_fail_fast() {
    let completed = Arc::new(AtomicUsize::new(0));
    let executor = BftExecutor::new(5);

    let value = executor
        .execute(|replica| {
            let completed = completed.clone();
            async move {
                if replica == 4 {
                    return Err(anyhow!("fast failure"));
                }
                tokio::time::sleep(Duration::from_millis(5 * replica as u64)).await;
                completed.fetch_add(1, Ordering::SeqCst);
                Ok(format!("r{replica}"))
            }
        })
        .await
        .unwrap();

    assert_eq!(value, "r0");
    assert_eq!(completed.load(Ordering::SeqCst), 4);
}

#[tokio::test]
async fn test_zero_replicas_runs_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let executor = BftExecutor::default();
    assert_eq!(executor.default_replicas(), 3);

    let value = executor
        .execute_with_replicas(
            |_| {
                let calls = calls.clone();
                async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok::<_, anyhow::Error>("done")
                }
            },
            0,
        )
        .await
        .unwrap();
    assert_eq!(value, "done");
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_panicking_replica_counts_as_failure() {
    let result = execute_with_bft(
        |replica| async move {
            if replica == 1 {
                panic!("replica exploded");
            }
            Ok::<_, anyhow::Error>(replica + 100)
        },
        4,
    )
    .await;

    // 4 replicas: f = 1, need 3; the other three succeed
    assert_eq!(result.unwrap(), 100);

    let err = execute_with_bft(
        |replica| async move {
            if replica < 2 {
                panic!("replica exploded");
            }
            Ok::<_, anyhow::Error>(replica)
        },
        4,
    )
    .await
    .unwrap_err();
    match err {
        BftError::ConsensusFailure { successes, first_error, .. } => {
            assert_eq!(successes, 2);
            assert!(first_error.unwrap().contains("replica 0 panicked: replica exploded"));
        }
    }
}
