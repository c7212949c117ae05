// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Swarm Domain Layer
//!
//! Pure types for queen-driven task allocation. No I/O dependencies.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`task`] | `HiveTask`, `TaskResult`, `AggregatedOutcome`, `TaskOutcome` |
//! | [`worker`] | `WorkerContext`, `SpawnedWorker`, `CleanupReport` |

pub mod task;
pub mod worker;

pub use task::*;
pub use worker::*;
