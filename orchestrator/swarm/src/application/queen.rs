// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Queen Coordinator
//!
//! The queen's task workflow over the hive services:
//!
//! 1. `register_queen` bootstraps the hive if needed and joins as specialist.
//! 2. `spawn_worker` joins a typed worker and remembers it for cleanup.
//! 3. `coordinate_task` proposes the allocation, runs the allocation ballot,
//!    broadcasts the task and polls shared memory for results.
//! 4. `leave` removes every spawned worker, then the queen.
//!
//! Polling honours a `CancellationToken`, so a caller that gives up on a task
//! never leaves a loop running.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use hive_core::application::{
    BroadcastChannel, HiveServices, SharedMemoryStore, VotingCoordinator, WorkerRegistry,
};
use hive_core::domain::config::{HiveConfig, QueenConfig};
use hive_core::domain::error::HiveError;
use hive_core::domain::hive::{AgentId, Topology, WorkerRole};
use hive_core::domain::proposal::{Decision, ProposalId};
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::time::{interval, sleep, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::task::{
    aggregate, distinct_agents, latest_per_agent, results_key, HiveTask, TaskOutcome, TaskResult,
};
use crate::domain::worker::{
    CleanupFailure, CleanupReport, SpawnedWorker, WorkerContext, QUEEN_CAPABILITIES,
};

/// Proposal type used for task allocation ballots.
pub const TASK_ALLOCATION: &str = "task-allocation";

// tokio intervals reject a zero period.
const MIN_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Default)]
struct LocalState {
    registered: bool,
    workers: Vec<SpawnedWorker>,
}

pub struct QueenCoordinator {
    queen_id: AgentId,
    topology: Topology,
    config: QueenConfig,
    registry: Arc<WorkerRegistry>,
    voting: Arc<VotingCoordinator>,
    broadcast: Arc<BroadcastChannel>,
    memory: Arc<SharedMemoryStore>,
    local: Mutex<LocalState>,
}

impl QueenCoordinator {
    /// Coordinator for `services`. The queen id defaults to a generated
    /// `queen-*` id.
    pub fn new(services: &HiveServices, config: &HiveConfig, queen_id: Option<AgentId>) -> Self {
        Self {
            queen_id: queen_id.unwrap_or_else(|| AgentId::generate("queen")),
            topology: config.topology,
            config: config.queen.clone(),
            registry: services.registry.clone(),
            voting: services.voting.clone(),
            broadcast: services.broadcast.clone(),
            memory: services.memory.clone(),
            local: Mutex::new(LocalState::default()),
        }
    }

    pub fn queen_id(&self) -> &AgentId {
        &self.queen_id
    }

    pub fn capabilities(&self) -> Vec<String> {
        QUEEN_CAPABILITIES.iter().map(|c| c.to_string()).collect()
    }

    pub fn is_registered(&self) -> bool {
        self.local.lock().registered
    }

    /// Workers spawned through this coordinator and not yet cleaned up.
    pub fn workers(&self) -> Vec<SpawnedWorker> {
        self.local.lock().workers.clone()
    }

    /// Join the hive as queen. Returns `false` when already registered.
    pub async fn register_queen(&self) -> Result<bool, HiveError> {
        if self.is_registered() {
            debug!(queen_id = %self.queen_id, "Queen already registered");
            return Ok(false);
        }

        if !self.registry.is_initialized().await? {
            self.registry
                .init(self.topology, Some(self.queen_id.clone()))
                .await?;
        }
        self.registry
            .join(self.queen_id.clone(), WorkerRole::Specialist)
            .await?;

        self.local.lock().registered = true;
        info!(
            queen_id = %self.queen_id,
            capabilities = ?QUEEN_CAPABILITIES,
            "Queen registered"
        );
        Ok(true)
    }

    /// Join a worker of `agent_type` whose capabilities are derived from
    /// `context`.
    pub async fn spawn_worker(
        &self,
        agent_type: &str,
        context: &str,
    ) -> Result<SpawnedWorker, HiveError> {
        let context = WorkerContext::detect(context);
        let worker = SpawnedWorker {
            agent_id: AgentId::generate(agent_type),
            agent_type: agent_type.to_string(),
            context,
            capabilities: context.capabilities(),
        };

        self.registry
            .join(worker.agent_id.clone(), WorkerRole::Worker)
            .await?;
        self.local.lock().workers.push(worker.clone());

        info!(
            agent_id = %worker.agent_id,
            agent_type,
            context = context.as_str(),
            "Queen spawned worker"
        );
        Ok(worker)
    }

    /// Allocate `task` by vote, broadcast it and collect results.
    ///
    /// Rejection, an undecided ballot, a timeout and cancellation are all
    /// reported in the returned [`TaskOutcome`]; only hive failures (for
    /// example an uninitialized hive) are errors.
    pub async fn coordinate_task(
        &self,
        task: &HiveTask,
        cancel: CancellationToken,
    ) -> Result<TaskOutcome, HiveError> {
        let proposal = self
            .voting
            .propose(
                TASK_ALLOCATION,
                json!({
                    "taskId": task.task_id,
                    "agents": task.required_agents,
                    "priority": task.priority,
                }),
                self.queen_id.clone(),
            )
            .await?;

        match self.run_allocation_ballot(proposal.id, task).await? {
            Some(Decision::Approved) => {}
            Some(Decision::Rejected) => {
                metrics::counter!("hive_tasks_coordinated_total", "outcome" => "rejected").increment(1);
                info!(task_id = %task.task_id, proposal_id = %proposal.id, "Task allocation rejected");
                return Ok(TaskOutcome::refused(&task.task_id, proposal.id, "task allocation rejected"));
            }
            None => {
                metrics::counter!("hive_tasks_coordinated_total", "outcome" => "undecided").increment(1);
                warn!(task_id = %task.task_id, proposal_id = %proposal.id, "Task allocation left pending");
                return Ok(TaskOutcome::refused(&task.task_id, proposal.id, "consensus not reached"));
            }
        }

        let announcement = json!({
            "type": "task",
            "taskId": task.task_id,
            "description": task.description,
            "priority": task.priority,
            "agents": task.required_agents,
            "payload": task.payload,
        });
        self.broadcast
            .broadcast(
                announcement.to_string(),
                task.priority.broadcast_priority(),
                self.queen_id.clone(),
            )
            .await?;

        let (results, timed_out, cancelled) = self.collect_results(task, &cancel).await?;
        let verdict = aggregate(&results, &task.required_agents);

        let outcome_label = if cancelled {
            "cancelled"
        } else if timed_out {
            "timed_out"
        } else {
            "completed"
        };
        metrics::counter!("hive_tasks_coordinated_total", "outcome" => outcome_label).increment(1);
        info!(
            task_id = %task.task_id,
            received = results.len(),
            expected = verdict.total_agents,
            success = verdict.success,
            outcome = outcome_label,
            "Task coordination finished"
        );

        Ok(TaskOutcome {
            task_id: task.task_id.clone(),
            proposal_id: proposal.id,
            success: verdict.success,
            error: None,
            results,
            aggregate: Some(verdict),
            timed_out,
            cancelled,
        })
    }

    /// Append `result` to the task's result list in one atomic update.
    pub async fn submit_result(&self, task_id: &str, result: TaskResult) -> Result<(), HiveError> {
        submit_result(&self.memory, task_id, result).await
    }

    /// Remove every spawned worker, then the queen. Removing the queen also
    /// clears the hive's queen designation.
    ///
    /// Per-worker failures are collected in the report and never stop the
    /// loop. Failing to remove the queen itself is an error.
    pub async fn leave(&self) -> Result<CleanupReport, HiveError> {
        let workers = std::mem::take(&mut self.local.lock().workers);
        let mut report = CleanupReport::default();

        for worker in workers {
            match self.registry.leave(&worker.agent_id).await {
                Ok(outcome) if outcome.removed => report.removed.push(worker.agent_id),
                Ok(_) => debug!(agent_id = %worker.agent_id, "Spawned worker already gone"),
                Err(e) => {
                    warn!(agent_id = %worker.agent_id, "Failed to remove worker: {}", e);
                    report.failures.push(CleanupFailure {
                        agent_id: worker.agent_id,
                        error: e.to_string(),
                    });
                }
            }
        }

        self.registry.leave(&self.queen_id).await?;
        self.local.lock().registered = false;

        info!(
            queen_id = %self.queen_id,
            removed = report.removed.len(),
            failures = report.failures.len(),
            "Queen left hive"
        );
        Ok(report)
    }

    /// Queen votes for, then each required agent votes for if it is a member
    /// and against otherwise. Stops as soon as the proposal is decided.
    async fn run_allocation_ballot(
        &self,
        proposal_id: ProposalId,
        task: &HiveTask,
    ) -> Result<Option<Decision>, HiveError> {
        let members: BTreeSet<AgentId> = self.registry.members().await?.into_iter().collect();

        let mut seen = BTreeSet::new();
        let ballot = std::iter::once((self.queen_id.clone(), true)).chain(
            task.required_agents
                .iter()
                .map(|agent| (agent.clone(), members.contains(agent))),
        );

        for (voter, choice) in ballot {
            if !seen.insert(voter.clone()) {
                continue;
            }
            let outcome = self.voting.vote(proposal_id, voter, choice).await?;
            if let Some(result) = outcome.decision {
                return Ok(Some(result.result));
            }
        }
        Ok(None)
    }

    /// Poll until every distinct assigned agent has reported. Only the latest
    /// report of each assigned agent is kept.
    async fn collect_results(
        &self,
        task: &HiveTask,
        cancel: &CancellationToken,
    ) -> Result<(Vec<TaskResult>, bool, bool), HiveError> {
        let key = task.results_key();
        let expected = distinct_agents(&task.required_agents);

        let deadline = sleep(self.config.task_timeout);
        tokio::pin!(deadline);
        let mut tick = interval(self.config.poll_interval.max(MIN_POLL_INTERVAL));
        tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut timed_out = false;
        let mut cancelled = false;
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!(task_id = %task.task_id, "Task polling cancelled");
                    cancelled = true;
                    break;
                }
                _ = &mut deadline => {
                    warn!(
                        task_id = %task.task_id,
                        timeout = ?self.config.task_timeout,
                        "Task timed out; returning partial results"
                    );
                    timed_out = true;
                    break;
                }
                _ = tick.tick() => {
                    let stored = read_results(&self.memory, &key).await?;
                    let results = latest_per_agent(stored, &task.required_agents);
                    debug!(task_id = %task.task_id, received = results.len(), expected, "Polled task results");
                    if results.len() >= expected {
                        return Ok((results, false, false));
                    }
                }
            }
        }

        let stored = read_results(&self.memory, &key).await?;
        let results = latest_per_agent(stored, &task.required_agents);
        Ok((results, timed_out, cancelled))
    }
}

/// Append `result` under the task's results key.
///
/// Exposed separately from the coordinator so workers holding only the
/// shared memory store can report.
pub async fn submit_result(
    memory: &SharedMemoryStore,
    task_id: &str,
    result: TaskResult,
) -> Result<(), HiveError> {
    let entry = serde_json::to_value(&result)
        .map_err(|e| HiveError::InvalidArgument(format!("unserializable task result: {e}")))?;
    memory
        .update(&results_key(task_id), move |current| match current {
            Some(Value::Array(mut items)) => {
                items.push(entry);
                Value::Array(items)
            }
            _ => Value::Array(vec![entry]),
        })
        .await?;
    debug!(task_id, agent_id = %result.agent_id, success = result.success, "Task result submitted");
    Ok(())
}

// Malformed entries are skipped so one bad writer cannot hide the others.
async fn read_results(memory: &SharedMemoryStore, key: &str) -> Result<Vec<TaskResult>, HiveError> {
    let stored = memory.get(key).await?;
    let Some(Value::Array(items)) = stored.value else {
        return Ok(Vec::new());
    };
    Ok(items
        .into_iter()
        .filter_map(|item| match serde_json::from_value::<TaskResult>(item) {
            Ok(result) => Some(result),
            Err(e) => {
                warn!(key, "Skipping malformed task result: {}", e);
                None
            }
        })
        .collect())
}
