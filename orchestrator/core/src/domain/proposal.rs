// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Proposals and Quorum Arithmetic
//!
//! A [`Proposal`] moves `pending → approved` or `pending → rejected`; decided
//! proposals leave `pending` and are recorded as an immutable
//! [`ConsensusResult`] in `history`.
//!
//! The quorum is recomputed on every vote from the membership size at that
//! moment, so workers joining or leaving mid-vote move the threshold.
//!
//! | Members | Majority |
//! |---------|----------|
//! | 0 | 1 |
//! | 1 | 1 |
//! | 2 | 2 |
//! | 3 | 2 |
//! | 4 | 3 |
//! | 5 | 3 |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::domain::error::HiveError;
use crate::domain::hive::AgentId;

/// Unique identifier of a [`Proposal`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub Uuid);

impl ProposalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for ProposalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProposalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Terminal outcome of a proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approved,
    Rejected,
}

impl From<Decision> for ProposalStatus {
    fn from(decision: Decision) -> Self {
        match decision {
            Decision::Approved => ProposalStatus::Approved,
            Decision::Rejected => ProposalStatus::Rejected,
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Decision::Approved => f.write_str("approved"),
            Decision::Rejected => f.write_str("rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoteCount {
    #[serde(rename = "for")]
    pub votes_for: usize,
    #[serde(rename = "against")]
    pub votes_against: usize,
}

/// Strict majority for `worker_count` members: `floor(n / 2) + 1`.
///
/// A tally of exactly half can never resolve, so a tie cannot decide a
/// proposal in both directions.
pub fn majority_threshold(worker_count: usize) -> usize {
    worker_count / 2 + 1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proposal {
    pub id: ProposalId,
    #[serde(rename = "type")]
    pub proposal_type: String,
    pub value: serde_json::Value,
    pub proposed_by: AgentId,
    pub proposed_at: DateTime<Utc>,
    /// Latest vote per voter; re-voting overwrites.
    #[serde(default)]
    pub votes: BTreeMap<AgentId, bool>,
    pub status: ProposalStatus,
}

impl Proposal {
    pub fn new(proposal_type: impl Into<String>, value: serde_json::Value, proposed_by: AgentId) -> Self {
        Self {
            id: ProposalId::new(),
            proposal_type: proposal_type.into(),
            value,
            proposed_by,
            proposed_at: Utc::now(),
            votes: BTreeMap::new(),
            status: ProposalStatus::Pending,
        }
    }

    pub fn tally(&self) -> VoteCount {
        let votes_for = self.votes.values().filter(|v| **v).count();
        VoteCount {
            votes_for,
            votes_against: self.votes.len() - votes_for,
        }
    }

    /// Decision reached by `tally` under `majority`, if any. Approval is
    /// checked first.
    pub fn evaluate(tally: VoteCount, majority: usize) -> Option<Decision> {
        if tally.votes_for >= majority {
            Some(Decision::Approved)
        } else if tally.votes_against >= majority {
            Some(Decision::Rejected)
        } else {
            None
        }
    }
}

/// Immutable audit record of a decided proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsensusResult {
    pub proposal_id: ProposalId,
    #[serde(rename = "type")]
    pub proposal_type: String,
    pub result: Decision,
    pub votes: VoteCount,
    pub decided_at: DateTime<Utc>,
}

/// Outcome of a single `vote` call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteOutcome {
    pub proposal_id: ProposalId,
    pub votes_for: usize,
    pub votes_against: usize,
    pub majority: usize,
    pub status: ProposalStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub decision: Option<ConsensusResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VotingState {
    #[serde(default)]
    pub pending: Vec<Proposal>,
    #[serde(default)]
    pub history: Vec<ConsensusResult>,
}

impl VotingState {
    pub fn find_pending(&self, id: ProposalId) -> Option<&Proposal> {
        self.pending.iter().find(|p| p.id == id)
    }

    pub fn find_history(&self, id: ProposalId) -> Option<&ConsensusResult> {
        self.history.iter().find(|r| r.proposal_id == id)
    }

    /// Record `voter`'s choice and resolve the proposal if the tally crosses
    /// the majority for `worker_count` members.
    ///
    /// Recording, evaluation and the pending → history move all happen in
    /// this one call; callers must hold the hive writer lock around it.
    pub fn cast_vote(
        &mut self,
        id: ProposalId,
        voter: AgentId,
        choice: bool,
        worker_count: usize,
    ) -> Result<VoteOutcome, HiveError> {
        let index = self
            .pending
            .iter()
            .position(|p| p.id == id)
            .ok_or(HiveError::ProposalNotFound(id))?;

        let proposal = &mut self.pending[index];
        proposal.votes.insert(voter, choice);

        let tally = proposal.tally();
        let majority = majority_threshold(worker_count);

        let Some(decision) = Proposal::evaluate(tally, majority) else {
            return Ok(VoteOutcome {
                proposal_id: id,
                votes_for: tally.votes_for,
                votes_against: tally.votes_against,
                majority,
                status: ProposalStatus::Pending,
                decision: None,
            });
        };

        let mut proposal = self.pending.remove(index);
        proposal.status = decision.into();

        let result = ConsensusResult {
            proposal_id: proposal.id,
            proposal_type: proposal.proposal_type,
            result: decision,
            votes: tally,
            decided_at: Utc::now(),
        };
        self.history.push(result.clone());

        Ok(VoteOutcome {
            proposal_id: id,
            votes_for: tally.votes_for,
            votes_against: tally.votes_against,
            majority,
            status: decision.into(),
            decision: Some(result),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending_state() -> (VotingState, ProposalId) {
        let mut state = VotingState::default();
        let proposal = Proposal::new("deploy", json!({"action": "deploy"}), AgentId::from("queen"));
        let id = proposal.id;
        state.pending.push(proposal);
        (state, id)
    }

    #[test]
    fn test_majority_threshold_is_strictly_more_than_half() {
        for n in 0..50usize {
            let majority = majority_threshold(n);
            assert_eq!(majority, n / 2 + 1);
            assert!(majority * 2 > n);
        }
    }

    #[test]
    fn test_half_tally_never_resolves() {
        let (mut state, id) = pending_state();
        let outcome = state.cast_vote(id, AgentId::from("w1"), true, 4).unwrap();
        assert_eq!(outcome.status, ProposalStatus::Pending);
        let outcome = state.cast_vote(id, AgentId::from("w2"), true, 4).unwrap();
        assert_eq!(outcome.votes_for, 2);
        assert_eq!(outcome.status, ProposalStatus::Pending);
        assert!(state.history.is_empty());
    }

    #[test]
    fn test_revote_overwrites_previous_choice() {
        let (mut state, id) = pending_state();
        state.cast_vote(id, AgentId::from("w1"), true, 5).unwrap();
        let outcome = state.cast_vote(id, AgentId::from("w1"), false, 5).unwrap();
        assert_eq!(outcome.votes_for, 0);
        assert_eq!(outcome.votes_against, 1);
    }

    #[test]
    fn test_rejection_moves_to_history() {
        let (mut state, id) = pending_state();
        state.cast_vote(id, AgentId::from("w1"), false, 3).unwrap();
        let outcome = state.cast_vote(id, AgentId::from("w2"), false, 3).unwrap();
        assert_eq!(outcome.status, ProposalStatus::Rejected);
        assert!(state.pending.is_empty());
        let record = state.find_history(id).unwrap();
        assert_eq!(record.result, Decision::Rejected);
        assert_eq!(record.votes, VoteCount { votes_for: 0, votes_against: 2 });
    }

    #[test]
    fn test_vote_on_unknown_proposal_fails() {
        let mut state = VotingState::default();
        let err = state
            .cast_vote(ProposalId::new(), AgentId::from("w1"), true, 3)
            .unwrap_err();
        assert!(matches!(err, HiveError::ProposalNotFound(_)));
    }

    #[test]
    fn test_vote_counts_serialize_as_for_against() {
        let json = serde_json::to_value(VoteCount { votes_for: 2, votes_against: 1 }).unwrap();
        assert_eq!(json, json!({"for": 2, "against": 1}));
    }
}
