// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Hive error taxonomy.
//!
//! `HiveError` is what the registry, voting and memory services return.
//! The tool surface turns it into failure data using [`HiveError::code`];
//! it never crosses that boundary as a Rust error.

use crate::domain::hive::AgentId;
use crate::domain::proposal::ProposalId;

/// Errors raised by persistence collaborators (`HiveStore`, `AgentStore`).
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Record not found: {0}")]
    NotFound(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Errors produced by hive coordination operations.
#[derive(Debug, thiserror::Error)]
pub enum HiveError {
    #[error("Hive is not initialized")]
    NotInitialized,

    #[error("Proposal not found: {0}")]
    ProposalNotFound(ProposalId),

    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    #[error("Cannot shut down with {pending} pending consensus proposal(s); use force to override")]
    InsufficientQuorum { pending: usize },

    #[error("A key is required for memory action '{action}'")]
    KeyRequired { action: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl HiveError {
    /// Stable machine-readable code used in tool responses.
    pub fn code(&self) -> &'static str {
        match self {
            HiveError::NotInitialized => "NOT_INITIALIZED",
            HiveError::ProposalNotFound(_) => "PROPOSAL_NOT_FOUND",
            HiveError::AgentNotFound(_) => "AGENT_NOT_FOUND",
            HiveError::InsufficientQuorum { .. } => "INSUFFICIENT_QUORUM",
            HiveError::KeyRequired { .. } => "KEY_REQUIRED",
            HiveError::InvalidArgument(_) => "INVALID_ARGUMENT",
            HiveError::Store(_) => "STORE_ERROR",
        }
    }
}

/// Failure of a redundant BFT execution round.
#[derive(Debug, thiserror::Error)]
pub enum BftError {
    #[error(
        "BFT consensus failed: {successes}/{replicas} replicas succeeded, {required} required{}",
        .first_error.as_ref().map(|e| format!(" (first error: {e})")).unwrap_or_default()
    )]
    ConsensusFailure {
        successes: usize,
        required: usize,
        replicas: usize,
        first_error: Option<String>,
    },
}
