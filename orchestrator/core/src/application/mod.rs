// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod state;
pub mod registry;
pub mod voting;
pub mod broadcast;
pub mod memory;
pub mod bft;
pub mod tools;

pub use state::HiveHandle;
pub use registry::{
    HiveStatus, JoinOutcome, LeaveOutcome, ShutdownOutcome, SpawnOutcome, SpawnRequest,
    WorkerRegistry, MAX_SPAWN_COUNT,
};
pub use voting::{ProposalStatusView, ProposalSummary, VotingCoordinator, VotingOverview};
pub use broadcast::{BroadcastChannel, BroadcastReceipt};
pub use memory::{MemoryValue, SharedMemoryStore};
pub use bft::{execute_with_bft, BftExecutor};
pub use tools::{HiveTools, ToolError, ToolResponse};

use std::sync::Arc;

use crate::domain::config::HiveConfig;
use crate::domain::repository::{AgentStore, HiveStore};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::repositories::{InMemoryAgentStore, InMemoryHiveStore};

/// All hive services wired to one shared `HiveHandle`.
#[derive(Clone)]
pub struct HiveServices {
    pub handle: HiveHandle,
    pub registry: Arc<WorkerRegistry>,
    pub voting: Arc<VotingCoordinator>,
    pub broadcast: Arc<BroadcastChannel>,
    pub memory: Arc<SharedMemoryStore>,
    pub bft: Arc<BftExecutor>,
}

impl HiveServices {
    pub fn new(
        store: Arc<dyn HiveStore>,
        agents: Arc<dyn AgentStore>,
        config: &HiveConfig,
    ) -> Self {
        let handle = HiveHandle::new(store, EventBus::new(config.event_bus_capacity));
        Self {
            registry: Arc::new(WorkerRegistry::new(handle.clone(), agents)),
            voting: Arc::new(VotingCoordinator::new(handle.clone())),
            broadcast: Arc::new(BroadcastChannel::new(handle.clone())),
            memory: Arc::new(SharedMemoryStore::new(handle.clone())),
            bft: Arc::new(BftExecutor::new(config.bft.replicas)),
            handle,
        }
    }

    /// Services backed by in-memory stores and default configuration.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryHiveStore::new()),
            Arc::new(InMemoryAgentStore::new()),
            &HiveConfig::default(),
        )
    }

    /// The failure-as-data operation surface over these services.
    pub fn tools(&self) -> HiveTools {
        HiveTools::new(
            self.registry.clone(),
            self.voting.clone(),
            self.broadcast.clone(),
            self.memory.clone(),
        )
    }
}
