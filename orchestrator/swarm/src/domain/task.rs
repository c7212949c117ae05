// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Task Domain Types
//!
//! - [`HiveTask`]: unit of work the queen allocates to a set of agents.
//! - [`TaskResult`]: one agent's report, collected from shared memory.
//! - [`AggregatedOutcome`]: task-level verdict over the collected results.
//! - [`TaskOutcome`]: everything `coordinate_task` learned about one task.
//!
//! Task success is a simple majority of the assigned agents,
//! `ceil(total / 2)`. It is unrelated to the BFT replica quorum and to the
//! proposal majority.

use chrono::{DateTime, Utc};
use hive_core::domain::broadcast::MessagePriority;
use hive_core::domain::hive::AgentId;
use hive_core::domain::proposal::ProposalId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskPriority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl TaskPriority {
    /// Broadcast priority for the task announcement. Only critical tasks are
    /// elevated; everything else goes out as `normal`.
    pub fn broadcast_priority(&self) -> MessagePriority {
        match self {
            TaskPriority::Critical => MessagePriority::Critical,
            _ => MessagePriority::Normal,
        }
    }
}

impl fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskPriority::Low => "low",
            TaskPriority::Normal => "normal",
            TaskPriority::High => "high",
            TaskPriority::Critical => "critical",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveTask {
    pub task_id: String,
    pub description: String,
    #[serde(default)]
    pub priority: TaskPriority,
    /// Agents expected to report a result
    pub required_agents: Vec<AgentId>,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl HiveTask {
    pub fn new(
        task_id: impl Into<String>,
        description: impl Into<String>,
        required_agents: Vec<AgentId>,
    ) -> Self {
        Self {
            task_id: task_id.into(),
            description: description.into(),
            priority: TaskPriority::Normal,
            required_agents,
            payload: serde_json::Value::Null,
        }
    }

    pub fn with_priority(mut self, priority: TaskPriority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Shared-memory key under which workers append their results.
    pub fn results_key(&self) -> String {
        results_key(&self.task_id)
    }
}

pub fn results_key(task_id: &str) -> String {
    format!("task:{task_id}:results")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    pub agent_id: AgentId,
    pub success: bool,
    #[serde(default)]
    pub output: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub completed_at: DateTime<Utc>,
}

impl TaskResult {
    pub fn success(agent_id: AgentId, output: serde_json::Value) -> Self {
        Self {
            agent_id,
            success: true,
            output,
            error: None,
            completed_at: Utc::now(),
        }
    }

    pub fn failure(agent_id: AgentId, error: impl Into<String>) -> Self {
        Self {
            agent_id,
            success: false,
            output: serde_json::Value::Null,
            error: Some(error.into()),
            completed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedOutcome {
    pub success: bool,
    pub success_count: usize,
    pub failure_count: usize,
    pub total_agents: usize,
    /// `ceil(total_agents / 2)`
    pub required: usize,
}

/// One result per assigned agent: the latest report wins, reports from agents
/// outside `assigned` are dropped. Order follows each agent's first report.
pub fn latest_per_agent(
    results: impl IntoIterator<Item = TaskResult>,
    assigned: &[AgentId],
) -> Vec<TaskResult> {
    let mut latest: Vec<TaskResult> = Vec::new();
    for result in results {
        if !assigned.contains(&result.agent_id) {
            continue;
        }
        match latest.iter_mut().find(|r| r.agent_id == result.agent_id) {
            Some(slot) => *slot = result,
            None => latest.push(result),
        }
    }
    latest
}

/// Number of distinct agents in an assignment list.
pub fn distinct_agents(assigned: &[AgentId]) -> usize {
    assigned.iter().collect::<BTreeSet<_>>().len()
}

/// Task-level verdict: successful when at least half of the distinct assigned
/// agents (rounded up) reported success in their latest result.
pub fn aggregate(results: &[TaskResult], assigned: &[AgentId]) -> AggregatedOutcome {
    let latest = latest_per_agent(results.iter().cloned(), assigned);
    let success_count = latest.iter().filter(|r| r.success).count();
    let total_agents = distinct_agents(assigned);
    let required = total_agents.div_ceil(2);
    AggregatedOutcome {
        success: success_count >= required,
        success_count,
        failure_count: latest.len() - success_count,
        total_agents,
        required,
    }
}

/// Everything `coordinate_task` learned about one task.
///
/// A timeout or cancellation is not an error: the outcome carries whatever
/// results had arrived, with `timed_out` or `cancelled` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskOutcome {
    pub task_id: String,
    pub proposal_id: ProposalId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub results: Vec<TaskResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aggregate: Option<AggregatedOutcome>,
    pub timed_out: bool,
    pub cancelled: bool,
}

impl TaskOutcome {
    pub(crate) fn refused(task_id: &str, proposal_id: ProposalId, reason: impl Into<String>) -> Self {
        Self {
            task_id: task_id.to_string(),
            proposal_id,
            success: false,
            error: Some(reason.into()),
            results: Vec::new(),
            aggregate: None,
            timed_out: false,
            cancelled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agents(n: usize) -> Vec<AgentId> {
        (0..n).map(|i| AgentId::from(format!("w-{i}"))).collect()
    }

    // First `successes` agents succeed, the next `failures` fail.
    fn results(assigned: &[AgentId], successes: usize, failures: usize) -> Vec<TaskResult> {
        let ok = assigned[..successes]
            .iter()
            .map(|a| TaskResult::success(a.clone(), serde_json::json!({})));
        let bad = assigned[successes..successes + failures]
            .iter()
            .map(|a| TaskResult::failure(a.clone(), "boom"));
        ok.chain(bad).collect()
    }

    #[test]
    fn test_aggregate_requires_half_rounded_up() {
        let three = agents(3);
        let verdict = aggregate(&results(&three, 2, 1), &three);
        assert_eq!(verdict.required, 2);
        assert!(verdict.success);

        let four = agents(4);
        let verdict = aggregate(&results(&four, 2, 2), &four);
        assert_eq!(verdict.required, 2);
        assert!(verdict.success);

        let five = agents(5);
        let verdict = aggregate(&results(&five, 2, 0), &five);
        assert_eq!(verdict.required, 3);
        assert!(!verdict.success);
        assert_eq!(verdict.failure_count, 0);
    }

    #[test]
    fn test_repeated_reports_count_once() {
        let assigned = agents(3);
        let repeated = vec![
            TaskResult::success(assigned[0].clone(), serde_json::json!(1)),
            TaskResult::success(assigned[0].clone(), serde_json::json!(2)),
            TaskResult::success(assigned[0].clone(), serde_json::json!(3)),
        ];
        let verdict = aggregate(&repeated, &assigned);
        assert_eq!(verdict.success_count, 1);
        assert!(!verdict.success);
    }

    #[test]
    fn test_latest_report_wins_and_outsiders_are_dropped() {
        let assigned = agents(2);
        let reports = vec![
            TaskResult::failure(assigned[0].clone(), "first try"),
            TaskResult::success(AgentId::from("outsider"), serde_json::json!({})),
            TaskResult::success(assigned[1].clone(), serde_json::json!({})),
            TaskResult::success(assigned[0].clone(), serde_json::json!({"retry": true})),
        ];

        let latest = latest_per_agent(reports.clone(), &assigned);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0].agent_id, assigned[0]);
        assert!(latest[0].success);

        let verdict = aggregate(&reports, &assigned);
        assert_eq!(verdict.success_count, 2);
        assert_eq!(verdict.failure_count, 0);
        assert!(verdict.success);
    }

    #[test]
    fn test_duplicate_assignment_counts_distinct_agents() {
        let a = AgentId::from("w-0");
        assert_eq!(distinct_agents(&[a.clone(), a.clone(), AgentId::from("w-1")]), 2);
    }

    #[test]
    fn test_only_critical_is_elevated() {
        assert_eq!(TaskPriority::Critical.broadcast_priority(), MessagePriority::Critical);
        assert_eq!(TaskPriority::High.broadcast_priority(), MessagePriority::Normal);
        assert_eq!(TaskPriority::Low.broadcast_priority(), MessagePriority::Normal);
    }

    #[test]
    fn test_results_key_format() {
        let task = HiveTask::new("t-42", "run tests", vec![]);
        assert_eq!(task.results_key(), "task:t-42:results");
    }
}
