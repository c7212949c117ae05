// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::broadcast::{MessageId, MessagePriority};
use crate::domain::hive::{AgentId, HiveId, Topology, WorkerRole};
use crate::domain::proposal::{Decision, ProposalId, VoteCount};

/// Domain events published on the hive `EventBus` after each committed change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HiveEvent {
    HiveInitialized {
        hive_id: HiveId,
        topology: Topology,
        queen_id: AgentId,
        initialized_at: DateTime<Utc>,
    },
    WorkerJoined {
        agent_id: AgentId,
        role: WorkerRole,
        worker_count: usize,
        joined_at: DateTime<Utc>,
    },
    WorkerLeft {
        agent_id: AgentId,
        worker_count: usize,
        left_at: DateTime<Utc>,
    },
    WorkersSpawned {
        agent_ids: Vec<AgentId>,
        role: WorkerRole,
        agent_type: String,
        spawned_at: DateTime<Utc>,
    },
    ProposalCreated {
        proposal_id: ProposalId,
        proposal_type: String,
        proposed_by: AgentId,
        proposed_at: DateTime<Utc>,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter_id: AgentId,
        vote: bool,
        cast_at: DateTime<Utc>,
    },
    ProposalDecided {
        proposal_id: ProposalId,
        result: Decision,
        votes: VoteCount,
        decided_at: DateTime<Utc>,
    },
    MessageBroadcast {
        message_id: MessageId,
        message: String,
        priority: MessagePriority,
        from_id: AgentId,
        recipients: usize,
        sent_at: DateTime<Utc>,
    },
    MemoryUpdated {
        key: String,
        deleted: bool,
        updated_at: DateTime<Utc>,
    },
    HiveShutdown {
        removed_workers: usize,
        forced: bool,
        shutdown_at: DateTime<Utc>,
    },
}
