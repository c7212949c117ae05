// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Worker Registry
//!
//! Membership and lifecycle of the hive:
//!
//! | Operation | Requires init | Notes |
//! |-----------|---------------|-------|
//! | `init` | no | overwrites topology and queen, keeps workers |
//! | `join` | yes | idempotent |
//! | `leave` | no | absent id is reported, not an error |
//! | `spawn` | yes | count clamped to `1..=20`, creates agent records |
//! | `shutdown` | yes | refuses to discard pending proposals unless forced |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::state::HiveHandle;
use crate::domain::broadcast::BroadcastMessage;
use crate::domain::error::HiveError;
use crate::domain::events::HiveEvent;
use crate::domain::hive::{AgentId, HiveId, QueenInfo, Topology, WorkerRole};
use crate::domain::proposal::ProposalId;
use crate::domain::repository::{AgentRecord, AgentStore};

/// Upper bound on agents created by a single `spawn` call.
pub const MAX_SPAWN_COUNT: usize = 20;

const RECENT_BROADCASTS_IN_STATUS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinOutcome {
    pub agent_id: AgentId,
    /// `false` when the agent was already a member
    pub joined: bool,
    pub worker_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveOutcome {
    pub agent_id: AgentId,
    /// `false` when the agent was not a member
    pub removed: bool,
    pub worker_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnRequest {
    /// Requested number of agents; clamped to `1..=MAX_SPAWN_COUNT`
    pub count: i64,
    pub role: WorkerRole,
    pub agent_type: String,
    pub prefix: String,
}

impl Default for SpawnRequest {
    fn default() -> Self {
        Self {
            count: 1,
            role: WorkerRole::Worker,
            agent_type: "worker".to_string(),
            prefix: "worker".to_string(),
        }
    }
}

impl SpawnRequest {
    pub fn effective_count(&self) -> usize {
        self.count.clamp(1, MAX_SPAWN_COUNT as i64) as usize
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnOutcome {
    pub agent_ids: Vec<AgentId>,
    pub worker_count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownOutcome {
    pub removed_workers: Vec<AgentId>,
    pub discarded_proposals: Vec<ProposalId>,
    /// Agent records actually deleted from the agent store
    pub released_records: usize,
    pub forced: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiveStatus {
    pub initialized: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hive_id: Option<HiveId>,
    pub topology: Topology,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub queen: Option<QueenInfo>,
    pub worker_count: usize,
    pub pending_proposals: usize,
    pub history_count: usize,
    pub memory_keys: usize,
    pub broadcast_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workers: Option<Vec<AgentId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending: Option<Vec<crate::application::voting::ProposalSummary>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_broadcasts: Option<Vec<BroadcastMessage>>,
}

pub struct WorkerRegistry {
    hive: HiveHandle,
    agents: Arc<dyn AgentStore>,
}

impl WorkerRegistry {
    pub fn new(hive: HiveHandle, agents: Arc<dyn AgentStore>) -> Self {
        Self { hive, agents }
    }

    /// Initialize (or re-initialize) the hive.
    ///
    /// Re-init overwrites topology and queen and mints a new hive id; existing
    /// workers are kept. The queen defaults to a generated `queen-*` id.
    pub async fn init(&self, topology: Topology, queen_id: Option<AgentId>) -> Result<HiveId, HiveError> {
        let queen_id = queen_id.unwrap_or_else(|| AgentId::generate("queen"));
        let hive_id = HiveId::new();
        let now = Utc::now();

        let queen = queen_id.clone();
        let reinit = self
            .hive
            .mutate(move |state| {
                let reinit = state.initialized;
                state.hive_id = Some(hive_id);
                state.topology = topology;
                state.queen = Some(QueenInfo {
                    agent_id: queen,
                    elected_at: now,
                    term: 1,
                });
                state.initialized = true;
                Ok(reinit)
            })
            .await?;

        if reinit {
            warn!(%hive_id, "Hive re-initialized; previous topology and queen overwritten");
        }
        info!(%hive_id, %topology, queen_id = %queen_id, "Hive initialized");
        self.hive.publish(HiveEvent::HiveInitialized {
            hive_id,
            topology,
            queen_id,
            initialized_at: now,
        });
        Ok(hive_id)
    }

    /// Add `agent_id` to the hive. Joining twice is a no-op.
    pub async fn join(&self, agent_id: AgentId, role: WorkerRole) -> Result<JoinOutcome, HiveError> {
        let id = agent_id.clone();
        let (joined, worker_count) = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                let joined = state.add_worker(id);
                Ok((joined, state.worker_count()))
            })
            .await?;

        if joined {
            info!(agent_id = %agent_id, %role, worker_count, "Worker joined hive");
            self.hive.publish(HiveEvent::WorkerJoined {
                agent_id: agent_id.clone(),
                role,
                worker_count,
                joined_at: Utc::now(),
            });
        } else {
            debug!(agent_id = %agent_id, "Worker already a member");
        }

        Ok(JoinOutcome {
            agent_id,
            joined,
            worker_count,
        })
    }

    /// Remove `agent_id`. Always safe to call; `removed` is `false` when the
    /// agent was not a member. If `agent_id` is the designated queen the
    /// designation is cleared.
    pub async fn leave(&self, agent_id: &AgentId) -> Result<LeaveOutcome, HiveError> {
        let id = agent_id.clone();
        let (removed, worker_count) = self
            .hive
            .mutate(move |state| {
                let removed = state.remove_worker(&id);
                if state.queen.as_ref().is_some_and(|q| q.agent_id == id) {
                    state.queen = None;
                }
                Ok((removed, state.worker_count()))
            })
            .await?;

        if removed {
            info!(agent_id = %agent_id, worker_count, "Worker left hive");
            self.hive.publish(HiveEvent::WorkerLeft {
                agent_id: agent_id.clone(),
                worker_count,
                left_at: Utc::now(),
            });
        } else {
            debug!(agent_id = %agent_id, "Leave requested for non-member");
        }

        Ok(LeaveOutcome {
            agent_id: agent_id.clone(),
            removed,
            worker_count,
        })
    }

    /// Create agent records and join them in one membership update.
    pub async fn spawn(&self, request: SpawnRequest) -> Result<SpawnOutcome, HiveError> {
        if !self.is_initialized().await? {
            return Err(HiveError::NotInitialized);
        }

        let count = request.effective_count();
        if count as i64 != request.count {
            debug!(requested = request.count, effective = count, "Spawn count clamped");
        }

        let mut created = Vec::with_capacity(count);
        for _ in 0..count {
            let record = AgentRecord::new(
                AgentId::generate(&request.prefix),
                request.agent_type.clone(),
                request.role,
            );
            if let Err(e) = self.agents.create(&record).await {
                self.release_records(&created).await;
                return Err(e.into());
            }
            created.push(record.id);
        }

        let ids = created.clone();
        let joined = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                for id in ids {
                    state.add_worker(id);
                }
                Ok(state.worker_count())
            })
            .await;

        let worker_count = match joined {
            Ok(count) => count,
            Err(e) => {
                self.release_records(&created).await;
                return Err(e);
            }
        };

        metrics::counter!("hive_workers_spawned_total").increment(created.len() as u64);
        info!(
            spawned = created.len(),
            worker_count,
            agent_type = %request.agent_type,
            role = %request.role,
            "Spawned workers"
        );
        self.hive.publish(HiveEvent::WorkersSpawned {
            agent_ids: created.clone(),
            role: request.role,
            agent_type: request.agent_type,
            spawned_at: Utc::now(),
        });

        Ok(SpawnOutcome {
            agent_ids: created,
            worker_count,
        })
    }

    /// Tear the hive down, keeping only the consensus history.
    ///
    /// A graceful, unforced shutdown refuses while proposals are pending so
    /// unresolved consensus state is never discarded silently.
    pub async fn shutdown(&self, graceful: bool, force: bool) -> Result<ShutdownOutcome, HiveError> {
        let (removed_workers, discarded_proposals) = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                let pending = state.voting.pending.len();
                if graceful && pending > 0 && !force {
                    return Err(HiveError::InsufficientQuorum { pending });
                }
                let discarded: Vec<ProposalId> = state.voting.pending.iter().map(|p| p.id).collect();
                Ok((state.reset_for_shutdown(), discarded))
            })
            .await?;

        let released_records = self.release_records(&removed_workers).await;
        let forced = force || !graceful;

        if !discarded_proposals.is_empty() {
            warn!(discarded = discarded_proposals.len(), "Pending proposals discarded by forced shutdown");
        }
        info!(removed = removed_workers.len(), released_records, forced, "Hive shut down");
        self.hive.publish(HiveEvent::HiveShutdown {
            removed_workers: removed_workers.len(),
            forced,
            shutdown_at: Utc::now(),
        });

        Ok(ShutdownOutcome {
            removed_workers,
            discarded_proposals,
            released_records,
            forced,
        })
    }

    pub async fn status(&self, verbose: bool) -> Result<HiveStatus, HiveError> {
        self.hive
            .read(move |state| HiveStatus {
                initialized: state.initialized,
                hive_id: state.hive_id,
                topology: state.topology,
                queen: state.queen.clone(),
                worker_count: state.worker_count(),
                pending_proposals: state.voting.pending.len(),
                history_count: state.voting.history.len(),
                memory_keys: state.shared_memory.len(),
                broadcast_count: state.broadcasts.len(),
                created_at: state.created_at,
                updated_at: state.updated_at,
                workers: verbose.then(|| state.workers.clone()),
                pending: verbose.then(|| {
                    state
                        .voting
                        .pending
                        .iter()
                        .map(crate::application::voting::ProposalSummary::from)
                        .collect()
                }),
                recent_broadcasts: verbose.then(|| {
                    let skip = state.broadcasts.len().saturating_sub(RECENT_BROADCASTS_IN_STATUS);
                    state.broadcasts[skip..].to_vec()
                }),
            })
            .await
    }

    pub async fn is_initialized(&self) -> Result<bool, HiveError> {
        self.hive.read(|state| state.initialized).await
    }

    pub async fn members(&self) -> Result<Vec<AgentId>, HiveError> {
        self.hive.read(|state| state.workers.clone()).await
    }

    pub async fn is_member(&self, agent_id: &AgentId) -> Result<bool, HiveError> {
        let id = agent_id.clone();
        self.hive.read(move |state| state.has_worker(&id)).await
    }

    // Best-effort: failures are logged, never returned.
    async fn release_records(&self, ids: &[AgentId]) -> usize {
        let mut released = 0;
        for id in ids {
            match self.agents.delete(id).await {
                Ok(true) => released += 1,
                Ok(false) => debug!(agent_id = %id, "No agent record to release"),
                Err(e) => warn!(agent_id = %id, "Failed to release agent record: {}", e),
            }
        }
        released
    }
}
