// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `hive-swarm` — Queen Task Coordination
//!
//! Composes the `hive-core` services into the queen's task workflow:
//! register, spawn typed workers, put a task allocation to a vote, broadcast
//! the task, collect results from shared memory and aggregate a verdict.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `HiveTask`, `TaskResult`, `aggregate`, `WorkerContext` |
//! | [`application`] | Application | `QueenCoordinator` |
//!
//! ## Key Concepts
//!
//! - **Allocation ballot**: the queen proposes `task-allocation`; the queen
//!   and every required agent vote, and the task only runs once the proposal
//!   is approved.
//! - **Result collection**: workers append to `task:{taskId}:results`; the
//!   queen polls until every required agent reported, the task timeout
//!   elapses, or the caller cancels.

pub mod domain;
pub mod application;

pub use domain::*;
