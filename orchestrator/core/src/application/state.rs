// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Serialized access to the hive aggregate.
//!
//! Every public hive operation is one read-modify-write against `HiveState`.
//! `HiveHandle` runs each of them behind a single async writer lock so that
//! concurrent votes on the same proposal cannot lose updates or both observe
//! "quorum not yet reached".

use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::error::HiveError;
use crate::domain::events::HiveEvent;
use crate::domain::hive::HiveState;
use crate::domain::repository::HiveStore;
use crate::infrastructure::event_bus::EventBus;

#[derive(Clone)]
pub struct HiveHandle {
    store: Arc<dyn HiveStore>,
    lock: Arc<Mutex<()>>,
    event_bus: EventBus,
}

impl HiveHandle {
    pub fn new(store: Arc<dyn HiveStore>, event_bus: EventBus) -> Self {
        Self {
            store,
            lock: Arc::new(Mutex::new(())),
            event_bus,
        }
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn publish(&self, event: HiveEvent) {
        self.event_bus.publish(event);
    }

    /// Run `f` against a consistent snapshot of the state.
    pub async fn read<T, F>(&self, f: F) -> Result<T, HiveError>
    where
        F: FnOnce(&HiveState) -> T + Send,
    {
        let _guard = self.lock.lock().await;
        let state = self.store.load().await?;
        Ok(f(&state))
    }

    /// Load, apply `f` and save as one critical section.
    ///
    /// The state is saved only when `f` returns `Ok`; an operation that
    /// refuses (for example a blocked shutdown) leaves the stored state
    /// exactly as it was.
    pub async fn mutate<T, F>(&self, f: F) -> Result<T, HiveError>
    where
        F: FnOnce(&mut HiveState) -> Result<T, HiveError> + Send,
        T: Send,
    {
        let _guard = self.lock.lock().await;
        let mut state = self.store.load().await?;
        let result = f(&mut state)?;
        state.touch();
        self.store.save(&state).await?;
        Ok(result)
    }

    /// Full copy of the current state.
    pub async fn snapshot(&self) -> Result<HiveState, HiveError> {
        self.read(|state| state.clone()).await
    }
}
