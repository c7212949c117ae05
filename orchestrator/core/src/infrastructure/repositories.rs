// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Store Implementations
//!
//! Lightweight implementations of the domain store contracts for tests,
//! embedded use, and single-process hosts:
//! - **InMemoryHiveStore** - keeps one `HiveState` document
//! - **InMemoryAgentStore** - HashMap-backed agent records
//!
//! # Architecture
//!
//! - **Layer:** Infrastructure
//! - **Purpose:** Persist and retrieve the hive aggregate
//! - **Pattern:** Repository (DDD), Adapter (Hexagonal Architecture)

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::error::StoreError;
use crate::domain::hive::{AgentId, HiveState};
use crate::domain::repository::{AgentRecord, AgentStore, HiveStore};

#[derive(Clone, Default)]
pub struct InMemoryHiveStore {
    state: Arc<RwLock<HiveState>>,
}

impl InMemoryHiveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with an existing state document.
    pub fn with_state(state: HiveState) -> Self {
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }
}

#[async_trait]
impl HiveStore for InMemoryHiveStore {
    async fn load(&self) -> Result<HiveState, StoreError> {
        Ok(self.state.read().clone())
    }

    async fn save(&self, state: &HiveState) -> Result<(), StoreError> {
        *self.state.write() = state.clone();
        Ok(())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryAgentStore {
    agents: Arc<RwLock<HashMap<AgentId, AgentRecord>>>,
}

impl InMemoryAgentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.agents.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.read().is_empty()
    }
}

#[async_trait]
impl AgentStore for InMemoryAgentStore {
    async fn create(&self, record: &AgentRecord) -> Result<(), StoreError> {
        self.agents.write().insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn get(&self, id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        Ok(self.agents.read().get(id).cloned())
    }

    async fn delete(&self, id: &AgentId) -> Result<bool, StoreError> {
        Ok(self.agents.write().remove(id).is_some())
    }
}
