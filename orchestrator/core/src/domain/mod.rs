// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Hive Domain Layer
//!
//! Pure domain types. No I/O dependencies beyond the store contracts in
//! [`repository`].
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`hive`] | `HiveState`, `HiveId`, `AgentId`, `Topology`, `QueenInfo` |
//! | [`proposal`] | `Proposal`, `ConsensusResult`, `VotingState`, `majority_threshold` |
//! | [`broadcast`] | `BroadcastMessage`, `MessagePriority` |
//! | [`bft`] | `BftQuorum` |
//! | [`events`] | `HiveEvent` |
//! | [`repository`] | `HiveStore`, `AgentStore`, `AgentRecord` |
//! | [`config`] | `HiveConfig` |
//! | [`error`] | `HiveError`, `StoreError`, `BftError` |

pub mod hive;
pub mod proposal;
pub mod broadcast;
pub mod bft;
pub mod events;
pub mod repository;
pub mod config;
pub mod error;

pub use hive::*;
pub use proposal::*;
pub use broadcast::*;
pub use bft::*;
pub use error::*;
