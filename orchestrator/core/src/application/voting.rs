// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Voting Coordinator
//!
//! Proposal lifecycle over the hive state. Quorum arithmetic lives in
//! [`crate::domain::proposal`]; this service adds the initialization guard,
//! the critical section, events and metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::application::state::HiveHandle;
use crate::domain::error::HiveError;
use crate::domain::events::HiveEvent;
use crate::domain::hive::AgentId;
use crate::domain::proposal::{
    ConsensusResult, Proposal, ProposalId, ProposalStatus, VoteCount, VoteOutcome,
};

/// Number of decided proposals returned by [`VotingCoordinator::list`].
pub const RECENT_HISTORY_LIMIT: usize = 5;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalSummary {
    pub id: ProposalId,
    #[serde(rename = "type")]
    pub proposal_type: String,
    pub proposed_at: DateTime<Utc>,
    pub vote_count: usize,
}

impl From<&Proposal> for ProposalSummary {
    fn from(proposal: &Proposal) -> Self {
        Self {
            id: proposal.id,
            proposal_type: proposal.proposal_type.clone(),
            proposed_at: proposal.proposed_at,
            vote_count: proposal.votes.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingOverview {
    pub pending: Vec<ProposalSummary>,
    /// Last decided proposals, oldest first
    pub recent_history: Vec<ConsensusResult>,
    pub total_decided: usize,
}

/// Where a proposal was found and how it stands.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalStatusView {
    pub proposal_id: ProposalId,
    pub status: ProposalStatus,
    pub votes: VoteCount,
    /// `true` when the proposal has been decided and was found in history
    pub historical: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proposal: Option<Proposal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ConsensusResult>,
}

pub struct VotingCoordinator {
    hive: HiveHandle,
}

impl VotingCoordinator {
    pub fn new(hive: HiveHandle) -> Self {
        Self { hive }
    }

    /// Open a new pending proposal.
    pub async fn propose(
        &self,
        proposal_type: impl Into<String>,
        value: serde_json::Value,
        proposed_by: AgentId,
    ) -> Result<Proposal, HiveError> {
        let proposal = Proposal::new(proposal_type, value, proposed_by);
        let stored = proposal.clone();
        self.hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                state.voting.pending.push(stored);
                Ok(())
            })
            .await?;

        metrics::counter!("hive_proposals_total").increment(1);
        info!(
            proposal_id = %proposal.id,
            proposal_type = %proposal.proposal_type,
            proposed_by = %proposal.proposed_by,
            "Proposal created"
        );
        self.hive.publish(HiveEvent::ProposalCreated {
            proposal_id: proposal.id,
            proposal_type: proposal.proposal_type.clone(),
            proposed_by: proposal.proposed_by.clone(),
            proposed_at: proposal.proposed_at,
        });
        Ok(proposal)
    }

    /// Record `voter`'s choice and resolve the proposal if quorum is reached.
    ///
    /// The majority is taken from the membership size at the moment of this
    /// vote. Voting again replaces the voter's earlier choice.
    pub async fn vote(
        &self,
        proposal_id: ProposalId,
        voter: AgentId,
        choice: bool,
    ) -> Result<VoteOutcome, HiveError> {
        let voter_id = voter.clone();
        let outcome = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                let worker_count = state.worker_count();
                state.voting.cast_vote(proposal_id, voter_id, choice, worker_count)
            })
            .await?;

        metrics::counter!("hive_votes_total").increment(1);
        debug!(
            proposal_id = %proposal_id,
            voter = %voter,
            choice,
            votes_for = outcome.votes_for,
            votes_against = outcome.votes_against,
            majority = outcome.majority,
            "Vote recorded"
        );
        self.hive.publish(HiveEvent::VoteCast {
            proposal_id,
            voter_id: voter,
            vote: choice,
            cast_at: Utc::now(),
        });

        if let Some(result) = &outcome.decision {
            metrics::counter!("hive_proposals_decided_total", "result" => result.result.to_string())
                .increment(1);
            info!(
                proposal_id = %proposal_id,
                result = %result.result,
                votes_for = result.votes.votes_for,
                votes_against = result.votes.votes_against,
                "Proposal decided"
            );
            self.hive.publish(HiveEvent::ProposalDecided {
                proposal_id,
                result: result.result,
                votes: result.votes,
                decided_at: result.decided_at,
            });
        }

        Ok(outcome)
    }

    /// Look a proposal up in `pending`, then in `history`.
    pub async fn status(&self, proposal_id: ProposalId) -> Result<ProposalStatusView, HiveError> {
        self.hive
            .read(move |state| {
                if let Some(proposal) = state.voting.find_pending(proposal_id) {
                    return Ok(ProposalStatusView {
                        proposal_id,
                        status: proposal.status,
                        votes: proposal.tally(),
                        historical: false,
                        proposal: Some(proposal.clone()),
                        result: None,
                    });
                }
                state
                    .voting
                    .find_history(proposal_id)
                    .map(|result| ProposalStatusView {
                        proposal_id,
                        status: result.result.into(),
                        votes: result.votes,
                        historical: true,
                        proposal: None,
                        result: Some(result.clone()),
                    })
                    .ok_or(HiveError::ProposalNotFound(proposal_id))
            })
            .await?
    }

    /// Pending proposals plus the most recent decisions.
    pub async fn list(&self) -> Result<VotingOverview, HiveError> {
        self.hive
            .read(|state| {
                let history = &state.voting.history;
                let skip = history.len().saturating_sub(RECENT_HISTORY_LIMIT);
                VotingOverview {
                    pending: state.voting.pending.iter().map(ProposalSummary::from).collect(),
                    recent_history: history[skip..].to_vec(),
                    total_decided: history.len(),
                }
            })
            .await
    }
}
