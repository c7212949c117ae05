// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Shared Memory Store
//!
//! Flat last-write-wins key/value scratch space in `HiveState.sharedMemory`.
//! No expiry, no size limit, any JSON value. Writes require an initialized
//! hive; reads do not.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::state::HiveHandle;
use crate::domain::error::HiveError;
use crate::domain::events::HiveEvent;

/// Result of a `get`; `exists` separates an absent key from a stored `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryValue {
    pub key: String,
    pub value: Option<serde_json::Value>,
    pub exists: bool,
}

pub struct SharedMemoryStore {
    hive: HiveHandle,
}

impl SharedMemoryStore {
    pub fn new(hive: HiveHandle) -> Self {
        Self { hive }
    }

    pub async fn get(&self, key: &str) -> Result<MemoryValue, HiveError> {
        let key = key.to_string();
        self.hive
            .read(move |state| {
                let value = state.shared_memory.get(&key).cloned();
                MemoryValue {
                    exists: value.is_some(),
                    value,
                    key,
                }
            })
            .await
    }

    pub async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), HiveError> {
        let k = key.to_string();
        self.hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                state.shared_memory.insert(k, value);
                Ok(())
            })
            .await?;

        debug!(key, "Shared memory key set");
        self.publish_update(key, false);
        Ok(())
    }

    /// Remove `key`. Returns whether it existed.
    pub async fn delete(&self, key: &str) -> Result<bool, HiveError> {
        let k = key.to_string();
        let existed = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                Ok(state.shared_memory.remove(&k).is_some())
            })
            .await?;

        if existed {
            debug!(key, "Shared memory key deleted");
            self.publish_update(key, true);
        }
        Ok(existed)
    }

    /// All keys in lexical order.
    pub async fn list(&self) -> Result<Vec<String>, HiveError> {
        self.hive
            .read(|state| state.shared_memory.keys().cloned().collect())
            .await
    }

    /// Atomically replace the value under `key` with `f(current)`.
    ///
    /// Used for appends from concurrent writers (e.g. task results), where a
    /// separate get + set would lose updates.
    pub async fn update<F>(&self, key: &str, f: F) -> Result<serde_json::Value, HiveError>
    where
        F: FnOnce(Option<serde_json::Value>) -> serde_json::Value + Send,
    {
        let k = key.to_string();
        let updated = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                let next = f(state.shared_memory.remove(&k));
                state.shared_memory.insert(k, next.clone());
                Ok(next)
            })
            .await?;

        self.publish_update(key, false);
        Ok(updated)
    }

    fn publish_update(&self, key: &str, deleted: bool) {
        self.hive.publish(HiveEvent::MemoryUpdated {
            key: key.to_string(),
            deleted,
            updated_at: Utc::now(),
        });
    }
}
