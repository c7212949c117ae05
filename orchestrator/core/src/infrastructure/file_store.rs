// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! JSON File Stores
//!
//! File-backed implementations used by the `hive` CLI so that hive state
//! survives between invocations.
//!
//! Writes go to a sibling `*.tmp` file which is then renamed over the
//! target, so a crash mid-write never leaves a truncated document behind.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::debug;

use crate::domain::error::StoreError;
use crate::domain::hive::{AgentId, HiveState};
use crate::domain::repository::{AgentRecord, AgentStore, HiveStore};

async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(StoreError::Io(e)),
    }
}

async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<(), StoreError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    let bytes = serde_json::to_vec_pretty(value)?;
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    tokio::fs::write(&tmp, &bytes).await?;
    tokio::fs::rename(&tmp, path).await?;
    debug!(path = %path.display(), bytes = bytes.len(), "Wrote JSON document");
    Ok(())
}

/// `HiveStore` persisting the whole `HiveState` as one camelCase JSON document.
pub struct JsonFileHiveStore {
    path: PathBuf,
}

impl JsonFileHiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl HiveStore for JsonFileHiveStore {
    async fn load(&self) -> Result<HiveState, StoreError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    async fn save(&self, state: &HiveState) -> Result<(), StoreError> {
        write_json_atomic(&self.path, state).await
    }
}

/// `AgentStore` keeping all records in a single JSON map keyed by agent id.
pub struct JsonFileAgentStore {
    path: PathBuf,
    // serializes read-modify-write of the map within this process
    lock: Mutex<()>,
}

impl JsonFileAgentStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load_all(&self) -> Result<BTreeMap<AgentId, AgentRecord>, StoreError> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }
}

#[async_trait]
impl AgentStore for JsonFileAgentStore {
    async fn create(&self, record: &AgentRecord) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        let mut agents = self.load_all().await?;
        agents.insert(record.id.clone(), record.clone());
        write_json_atomic(&self.path, &agents).await
    }

    async fn get(&self, id: &AgentId) -> Result<Option<AgentRecord>, StoreError> {
        let _guard = self.lock.lock().await;
        Ok(self.load_all().await?.remove(id))
    }

    async fn delete(&self, id: &AgentId) -> Result<bool, StoreError> {
        let _guard = self.lock.lock().await;
        let mut agents = self.load_all().await?;
        let existed = agents.remove(id).is_some();
        if existed {
            write_json_atomic(&self.path, &agents).await?;
        }
        Ok(existed)
    }
}
