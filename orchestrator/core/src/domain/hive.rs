// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Hive Aggregate
//!
//! [`HiveState`] is the single root aggregate mutated by every hive operation.
//! It is persisted as one document (camelCase JSON) by a `HiveStore`.
//!
//! ## Lifecycle
//!
//! | Transition | Trigger |
//! |------------|---------|
//! | fresh → initialized | `WorkerRegistry::init` |
//! | initialized → initialized | re-`init` (topology and queen overwritten, workers kept) |
//! | initialized → fresh (history kept) | `WorkerRegistry::shutdown` |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::domain::broadcast::BroadcastMessage;
use crate::domain::proposal::VotingState;

/// Unique identifier of an initialized hive. A new one is minted on every `init`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HiveId(pub Uuid);

impl HiveId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for HiveId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for HiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a worker agent or of the queen.
///
/// Agent ids are opaque strings chosen by callers (`join`) or generated
/// (`spawn`); generated ids embed a UUID so concurrent spawns never collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a collision-resistant id of the form `{prefix}-{uuid}`.
    pub fn generate(prefix: &str) -> Self {
        Self(format!("{}-{}", prefix, Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for AgentId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Communication topology of the hive. Informational only; routing is always
/// through the shared broadcast log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Topology {
    #[default]
    Mesh,
    Hierarchical,
    Ring,
    Star,
}

impl fmt::Display for Topology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Topology::Mesh => "mesh",
            Topology::Hierarchical => "hierarchical",
            Topology::Ring => "ring",
            Topology::Star => "star",
        };
        f.write_str(s)
    }
}

impl FromStr for Topology {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mesh" => Ok(Topology::Mesh),
            "hierarchical" => Ok(Topology::Hierarchical),
            "ring" => Ok(Topology::Ring),
            "star" => Ok(Topology::Star),
            other => Err(format!("unknown topology '{other}'")),
        }
    }
}

/// Role a member plays in the hive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerRole {
    #[default]
    Worker,
    Specialist,
    Scout,
}

impl fmt::Display for WorkerRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerRole::Worker => "worker",
            WorkerRole::Specialist => "specialist",
            WorkerRole::Scout => "scout",
        };
        f.write_str(s)
    }
}

impl FromStr for WorkerRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "worker" => Ok(WorkerRole::Worker),
            "specialist" => Ok(WorkerRole::Specialist),
            "scout" => Ok(WorkerRole::Scout),
            other => Err(format!("unknown role '{other}'")),
        }
    }
}

/// Current queen designation. Not a replicated election: `term` is always 1
/// after `init`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueenInfo {
    pub agent_id: AgentId,
    pub elected_at: DateTime<Utc>,
    pub term: u64,
}

/// Root aggregate persisted by a `HiveStore`.
///
/// # Invariants
///
/// - `workers` is ordered by join time and never contains duplicates.
/// - A proposal id is either in `voting.pending` or has a matching entry in
///   `voting.history`, never both.
/// - `broadcasts` never holds more than [`crate::domain::broadcast::BROADCAST_CAPACITY`] entries.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hive_id: Option<HiveId>,
    pub initialized: bool,
    #[serde(default)]
    pub topology: Topology,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub queen: Option<QueenInfo>,
    #[serde(default)]
    pub workers: Vec<AgentId>,
    #[serde(default)]
    pub voting: VotingState,
    #[serde(default)]
    pub shared_memory: BTreeMap<String, serde_json::Value>,
    #[serde(default)]
    pub broadcasts: Vec<BroadcastMessage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl HiveState {
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            hive_id: None,
            initialized: false,
            topology: Topology::default(),
            queen: None,
            workers: Vec::new(),
            voting: VotingState::default(),
            shared_memory: BTreeMap::new(),
            broadcasts: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    pub fn has_worker(&self, agent_id: &AgentId) -> bool {
        self.workers.iter().any(|w| w == agent_id)
    }

    /// Add a member. Returns `false` when it was already present.
    pub fn add_worker(&mut self, agent_id: AgentId) -> bool {
        if self.has_worker(&agent_id) {
            return false;
        }
        self.workers.push(agent_id);
        true
    }

    /// Remove a member. Returns `false` when it was absent.
    pub fn remove_worker(&mut self, agent_id: &AgentId) -> bool {
        let before = self.workers.len();
        self.workers.retain(|w| w != agent_id);
        self.workers.len() != before
    }

    /// Clear everything except the consensus history. Returns the workers
    /// that were members so their agent records can be released.
    pub fn reset_for_shutdown(&mut self) -> Vec<AgentId> {
        self.initialized = false;
        self.hive_id = None;
        self.queen = None;
        self.voting.pending.clear();
        self.shared_memory.clear();
        self.broadcasts.clear();
        std::mem::take(&mut self.workers)
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for HiveState {
    fn default() -> Self {
        Self::new()
    }
}
