// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Queen task workflow against in-memory hive services.
//!
//! Covers registration, the allocation ballot (approve, reject, undecided),
//! result collection with timeout and cancellation, and cleanup on leave.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use hive_core::application::HiveServices;
use hive_core::domain::broadcast::MessagePriority;
use hive_core::domain::config::HiveConfig;
use hive_core::domain::error::StoreError;
use hive_core::domain::hive::{AgentId, HiveState, Topology};
use hive_core::domain::proposal::ProposalStatus;
use hive_core::domain::repository::HiveStore;
use hive_core::infrastructure::{InMemoryAgentStore, InMemoryHiveStore};
use hive_swarm::application::{submit_result, QueenCoordinator, TASK_ALLOCATION};
use hive_swarm::domain::{HiveTask, TaskPriority, TaskResult, WorkerContext};
use serde_json::json;
use tokio_util::sync::CancellationToken;

fn fast_config(task_timeout: Duration) -> HiveConfig {
    let mut config = HiveConfig::default();
    config.topology = Topology::Hierarchical;
    config.queen.poll_interval = Duration::from_millis(10);
    config.queen.task_timeout = task_timeout;
    config
}

async fn queen_with_workers(
    n: usize,
    task_timeout: Duration,
) -> (HiveServices, QueenCoordinator, Vec<AgentId>) {
    let services = HiveServices::in_memory();
    let queen = QueenCoordinator::new(&services, &fast_config(task_timeout), None);
    assert!(queen.register_queen().await.unwrap());

    let mut ids = Vec::new();
    for _ in 0..n {
        ids.push(queen.spawn_worker("tester", "test-execution").await.unwrap().agent_id);
    }
    (services, queen, ids)
}

#[tokio::test]
async fn test_register_queen_bootstraps_hive_once() {
    let services = HiveServices::in_memory();
    let queen = QueenCoordinator::new(&services, &fast_config(Duration::from_secs(1)), Some(AgentId::from("queen-1")));

    assert!(queen.register_queen().await.unwrap());
    assert!(!queen.register_queen().await.unwrap());

    let status = services.registry.status(false).await.unwrap();
    assert!(status.initialized);
    assert_eq!(status.topology, Topology::Hierarchical);
    assert_eq!(status.queen.unwrap().agent_id, AgentId::from("queen-1"));
    assert_eq!(status.worker_count, 1);
    assert!(queen.capabilities().contains(&"task-allocation".to_string()));
}

#[tokio::test]
async fn test_spawn_worker_derives_capabilities() {
    let (_services, queen, _) = queen_with_workers(0, Duration::from_secs(1)).await;

    let worker = queen.spawn_worker("auditor", "nightly security sweep").await.unwrap();
    assert_eq!(worker.context, WorkerContext::Security);
    assert!(worker.agent_id.as_str().starts_with("auditor-"));
    assert!(worker.capabilities.contains(&"vulnerability-detection".to_string()));
    assert_eq!(queen.workers().len(), 1);
}

#[tokio::test]
async fn test_approved_task_collects_all_results() {
    let (services, queen, workers) = queen_with_workers(3, Duration::from_secs(5)).await;
    let task = HiveTask::new("t-1", "run suite", workers.clone())
        .with_priority(TaskPriority::Critical)
        .with_payload(json!({"suite": "unit"}));

    let memory = services.memory.clone();
    let reporters = workers.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(30)).await;
        for (i, agent) in reporters.into_iter().enumerate() {
            let result = if i == 2 {
                TaskResult::failure(agent, "flaky")
            } else {
                TaskResult::success(agent, json!({"passed": 10}))
            };
            submit_result(&memory, "t-1", result).await.unwrap();
        }
    });

    let outcome = queen.coordinate_task(&task, CancellationToken::new()).await.unwrap();
    assert!(outcome.success);
    assert!(!outcome.timed_out);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.results.len(), 3);
    let verdict = outcome.aggregate.unwrap();
    assert_eq!(verdict.success_count, 2);
    assert_eq!(verdict.required, 2);

    let state = services.handle.snapshot().await.unwrap();
    let decided = state.voting.find_history(outcome.proposal_id).unwrap();
    assert_eq!(decided.proposal_type, TASK_ALLOCATION);
    let announcement = state.broadcasts.last().unwrap();
    assert_eq!(announcement.priority, MessagePriority::Critical);
    assert_eq!(announcement.from_id, *queen.queen_id());
    let body: serde_json::Value = serde_json::from_str(&announcement.message).unwrap();
    assert_eq!(body["taskId"], json!("t-1"));
}

#[tokio::test]
async fn test_rejected_allocation_does_not_broadcast() {
    let (services, queen, _) = queen_with_workers(1, Duration::from_secs(5)).await;
    let task = HiveTask::new(
        "t-2",
        "needs strangers",
        vec![AgentId::from("stranger-a"), AgentId::from("stranger-b")],
    );

    let outcome = queen.coordinate_task(&task, CancellationToken::new()).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("task allocation rejected"));
    assert!(outcome.aggregate.is_none());

    let state = services.handle.snapshot().await.unwrap();
    assert!(state.broadcasts.is_empty());
    let view = services.voting.status(outcome.proposal_id).await.unwrap();
    assert_eq!(view.status, ProposalStatus::Rejected);
}

#[tokio::test]
async fn test_undecided_allocation_stays_pending() {
    // queen + 4 workers: majority is 3, but only the queen and one worker vote
    let (services, queen, workers) = queen_with_workers(4, Duration::from_secs(5)).await;
    let task = HiveTask::new("t-3", "small job", vec![workers[0].clone()]);

    let outcome = queen.coordinate_task(&task, CancellationToken::new()).await.unwrap();
    assert!(!outcome.success);
    assert_eq!(outcome.error.as_deref(), Some("consensus not reached"));

    let view = services.voting.status(outcome.proposal_id).await.unwrap();
    assert_eq!(view.status, ProposalStatus::Pending);
    assert_eq!(view.votes.votes_for, 2);
}

#[tokio::test]
async fn test_timeout_returns_partial_results() {
    let (services, queen, workers) = queen_with_workers(3, Duration::from_millis(150)).await;
    let task = HiveTask::new("t-4", "slow job", workers.clone());

    submit_result(&services.memory, "t-4", TaskResult::success(workers[0].clone(), json!(1)))
        .await
        .unwrap();

    let outcome = queen.coordinate_task(&task, CancellationToken::new()).await.unwrap();
    assert!(outcome.timed_out);
    assert!(!outcome.cancelled);
    assert_eq!(outcome.results.len(), 1);
    // one success out of three assigned falls short of ceil(3/2) = 2
    assert!(!outcome.success);
}

#[tokio::test]
async fn test_cancellation_stops_polling() {
    let (_services, queen, workers) = queen_with_workers(2, Duration::from_secs(30)).await;
    let task = HiveTask::new("t-5", "abandoned", workers);

    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(40)).await;
        trigger.cancel();
    });

    let outcome = tokio::time::timeout(Duration::from_secs(5), queen.coordinate_task(&task, token))
        .await
        .expect("polling loop must observe cancellation")
        .unwrap();
    assert!(outcome.cancelled);
    assert!(!outcome.timed_out);
    assert!(outcome.results.is_empty());
}

#[tokio::test]
async fn test_submit_result_appends_under_concurrency() {
    let (services, _queen, _) = queen_with_workers(0, Duration::from_secs(1)).await;

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let memory = services.memory.clone();
            tokio::spawn(async move {
                submit_result(&memory, "t-6", TaskResult::success(AgentId::from(format!("w{i}")), json!(i))).await
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let stored = services.memory.get("task:t-6:results").await.unwrap();
    assert_eq!(stored.value.unwrap().as_array().unwrap().len(), 16);
}

#[tokio::test]
async fn test_leave_removes_workers_then_queen() {
    let (services, queen, workers) = queen_with_workers(3, Duration::from_secs(1)).await;
    // one worker already gone is not a failure
    services.registry.leave(&workers[1]).await.unwrap();

    let report = queen.leave().await.unwrap();
    assert!(report.is_clean());
    assert_eq!(report.removed, vec![workers[0].clone(), workers[2].clone()]);
    assert!(!queen.is_registered());
    assert!(queen.workers().is_empty());
    assert!(!services.registry.is_member(queen.queen_id()).await.unwrap());

    let status = services.registry.status(false).await.unwrap();
    assert!(status.queen.is_none());
}

#[tokio::test]
async fn test_repeated_report_does_not_complete_task() {
    let (services, queen, workers) = queen_with_workers(3, Duration::from_millis(150)).await;
    let task = HiveTask::new("t-7", "retrying worker", workers.clone());

    for attempt in 0..3 {
        submit_result(&services.memory, "t-7", TaskResult::success(workers[0].clone(), json!(attempt)))
            .await
            .unwrap();
    }
    submit_result(&services.memory, "t-7", TaskResult::success(AgentId::from("outsider"), json!({})))
        .await
        .unwrap();

    let outcome = queen.coordinate_task(&task, CancellationToken::new()).await.unwrap();
    assert!(outcome.timed_out);
    assert!(!outcome.success);
    assert_eq!(outcome.results.len(), 1);
    assert_eq!(outcome.results[0].output, json!(2));
    let verdict = outcome.aggregate.unwrap();
    assert_eq!(verdict.success_count, 1);
    assert_eq!(verdict.total_agents, 3);
}

#[tokio::test]
async fn test_zero_poll_interval_still_polls() {
    let config = HiveConfig::from_yaml_str("queen:\n  poll_interval: 0s\n  task_timeout: 1s\n").unwrap();
    let services = HiveServices::in_memory();
    let queen = QueenCoordinator::new(&services, &config, None);
    queen.register_queen().await.unwrap();
    let worker = queen.spawn_worker("coder", "refactor module").await.unwrap().agent_id;

    submit_result(&services.memory, "t-8", TaskResult::success(worker.clone(), json!("done")))
        .await
        .unwrap();

    let task = HiveTask::new("t-8", "instant", vec![worker]);
    let outcome = queen.coordinate_task(&task, CancellationToken::new()).await.unwrap();
    assert!(outcome.success);
    assert!(!outcome.timed_out);
}

/// Hive store whose next `failing_saves` saves fail.
struct FlakyStore {
    inner: InMemoryHiveStore,
    failing_saves: AtomicUsize,
}

#[async_trait]
impl HiveStore for FlakyStore {
    async fn load(&self) -> Result<HiveState, StoreError> {
        self.inner.load().await
    }

    async fn save(&self, state: &HiveState) -> Result<(), StoreError> {
        let remaining = self.failing_saves.load(Ordering::SeqCst);
        if remaining > 0 {
            self.failing_saves.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::Unavailable("disk full".into()));
        }
        self.inner.save(state).await
    }
}

#[tokio::test]
async fn test_leave_collects_worker_failures_and_continues() {
    let store = Arc::new(FlakyStore {
        inner: InMemoryHiveStore::new(),
        failing_saves: AtomicUsize::new(0),
    });
    let config = fast_config(Duration::from_secs(1));
    let services = HiveServices::new(store.clone(), Arc::new(InMemoryAgentStore::new()), &config);
    let queen = QueenCoordinator::new(&services, &config, None);
    queen.register_queen().await.unwrap();
    let first = queen.spawn_worker("w", "coverage").await.unwrap().agent_id;
    let second = queen.spawn_worker("w", "quality").await.unwrap().agent_id;

    store.failing_saves.store(1, Ordering::SeqCst);
    let report = queen.leave().await.unwrap();

    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].agent_id, first);
    assert!(report.failures[0].error.contains("disk full"));
    assert_eq!(report.removed, vec![second]);
    assert!(!services.registry.is_member(queen.queen_id()).await.unwrap());
}

#[tokio::test]
async fn test_leave_propagates_queen_removal_failure() {
    let store = Arc::new(FlakyStore {
        inner: InMemoryHiveStore::new(),
        failing_saves: AtomicUsize::new(0),
    });
    let config = fast_config(Duration::from_secs(1));
    let services = HiveServices::new(store.clone(), Arc::new(InMemoryAgentStore::new()), &config);
    let queen = QueenCoordinator::new(&services, &config, None);
    queen.register_queen().await.unwrap();

    store.failing_saves.store(1, Ordering::SeqCst);
    let err = queen.leave().await.unwrap_err();
    assert_eq!(err.code(), "STORE_ERROR");
    assert!(queen.is_registered());
}
