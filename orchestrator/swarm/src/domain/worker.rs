// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Worker capability profiles and cleanup reporting.

use hive_core::domain::hive::AgentId;
use serde::{Deserialize, Serialize};

/// Capabilities every spawned worker advertises.
pub const BASE_CAPABILITIES: [&str; 2] = ["task-execution", "result-reporting"];

/// Capabilities the queen registers with.
pub const QUEEN_CAPABILITIES: [&str; 4] = [
    "coordination",
    "task-allocation",
    "consensus",
    "result-aggregation",
];

/// Specialization bucket a worker is spawned for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkerContext {
    TestGeneration,
    TestExecution,
    Coverage,
    Quality,
    Security,
    #[default]
    General,
}

impl WorkerContext {
    const BUCKETS: [WorkerContext; 5] = [
        WorkerContext::TestGeneration,
        WorkerContext::TestExecution,
        WorkerContext::Coverage,
        WorkerContext::Quality,
        WorkerContext::Security,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkerContext::TestGeneration => "test-generation",
            WorkerContext::TestExecution => "test-execution",
            WorkerContext::Coverage => "coverage",
            WorkerContext::Quality => "quality",
            WorkerContext::Security => "security",
            WorkerContext::General => "general",
        }
    }

    /// First bucket whose name occurs in `context` (case-insensitive);
    /// `General` when none does.
    pub fn detect(context: &str) -> Self {
        let context = context.to_ascii_lowercase();
        Self::BUCKETS
            .into_iter()
            .find(|bucket| context.contains(bucket.as_str()))
            .unwrap_or_default()
    }

    fn specialties(&self) -> &'static [&'static str] {
        match self {
            WorkerContext::TestGeneration => &["test-generation", "code-analysis"],
            WorkerContext::TestExecution => &["test-execution", "parallel-execution"],
            WorkerContext::Coverage => &["coverage-analysis", "gap-detection"],
            WorkerContext::Quality => &["quality-assessment", "code-review"],
            WorkerContext::Security => &["security-scanning", "vulnerability-detection"],
            WorkerContext::General => &[],
        }
    }

    /// Base capabilities followed by the bucket's specialties, without
    /// duplicates.
    pub fn capabilities(&self) -> Vec<String> {
        let mut caps: Vec<String> = BASE_CAPABILITIES.iter().map(|c| c.to_string()).collect();
        for cap in self.specialties() {
            if !caps.iter().any(|c| c == cap) {
                caps.push(cap.to_string());
            }
        }
        caps
    }
}

impl std::str::FromStr for WorkerContext {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::detect(s))
    }
}

/// A worker spawned by the queen and tracked for bulk cleanup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnedWorker {
    pub agent_id: AgentId,
    pub agent_type: String,
    pub context: WorkerContext,
    pub capabilities: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupFailure {
    pub agent_id: AgentId,
    pub error: String,
}

/// Result of the queen leaving: workers removed and per-worker failures that
/// did not stop the cleanup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanupReport {
    pub removed: Vec<AgentId>,
    pub failures: Vec<CleanupFailure>,
}

impl CleanupReport {
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}
