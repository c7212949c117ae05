// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `hive-core` — Hive Coordination Primitives
//!
//! State model and services for a hive of worker agents coordinated by a
//! single designated queen.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `HiveState`, `Proposal`, quorum arithmetic, store contracts, config |
//! | [`application`] | Application | `WorkerRegistry`, `VotingCoordinator`, `BroadcastChannel`, `SharedMemoryStore`, `BftExecutor`, `HiveTools` |
//! | [`infrastructure`] | Infrastructure | In-memory and JSON-file stores, `EventBus` |
//!
//! Every state-changing operation goes through [`application::HiveHandle::mutate`],
//! which serializes load → modify → save behind a single writer lock.

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use domain::*;
