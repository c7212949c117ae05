// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Store Interfaces
//!
//! Persistence contracts for the hive, defined in the domain layer and
//! implemented in `crate::infrastructure`.
//!
//! | Trait | Holds | Implementations |
//! |-------|-------|----------------|
//! | `HiveStore` | `HiveState` document | `InMemoryHiveStore`, `JsonFileHiveStore` |
//! | `AgentStore` | per-agent `AgentRecord` | `InMemoryAgentStore`, `JsonFileAgentStore` |
//!
//! Stores do no locking of their own beyond what keeps a single call
//! consistent. Read-modify-write atomicity is provided by
//! `crate::application::HiveHandle`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::error::StoreError;
use crate::domain::hive::{AgentId, HiveState, WorkerRole};

/// Persistence backend for the hive aggregate.
#[async_trait]
pub trait HiveStore: Send + Sync {
    /// Load the current state; a store with nothing saved yields `HiveState::new()`.
    async fn load(&self) -> Result<HiveState, StoreError>;

    /// Replace the persisted state.
    async fn save(&self, state: &HiveState) -> Result<(), StoreError>;
}

/// Metadata for an agent created by `spawn`. The registry itself only tracks ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentRecord {
    pub id: AgentId,
    pub agent_type: String,
    pub role: WorkerRole,
    pub created_at: DateTime<Utc>,
}

impl AgentRecord {
    pub fn new(id: AgentId, agent_type: impl Into<String>, role: WorkerRole) -> Self {
        Self {
            id,
            agent_type: agent_type.into(),
            role,
            created_at: Utc::now(),
        }
    }
}

/// External agent-metadata store.
#[async_trait]
pub trait AgentStore: Send + Sync {
    /// Create (or replace) an agent record.
    async fn create(&self, record: &AgentRecord) -> Result<(), StoreError>;

    /// Find an agent record by id
    async fn get(&self, id: &AgentId) -> Result<Option<AgentRecord>, StoreError>;

    /// Delete an agent record. Returns whether it existed.
    async fn delete(&self, id: &AgentId) -> Result<bool, StoreError>;
}
