// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Proposal voting commands
//!
//! Commands: propose, vote, status, list

use clap::{Subcommand, ValueEnum};
use hive_core::application::tools::{VotingAction, VotingParams};
use hive_core::application::{HiveTools, ToolResponse};
use hive_core::domain::hive::AgentId;

use super::json_arg;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Ballot {
    For,
    Against,
}

#[derive(Debug, Subcommand)]
pub enum VotingCommand {
    /// Open a new proposal
    Propose {
        /// Proposal type, e.g. config-change
        #[arg(short = 't', long = "type", value_name = "TYPE")]
        proposal_type: String,

        /// Proposal payload (JSON, or a plain string)
        #[arg(long)]
        value: Option<String>,

        #[arg(long = "by", value_name = "AGENT_ID")]
        proposer: Option<String>,
    },

    /// Cast (or replace) a vote
    Vote {
        #[arg(value_name = "PROPOSAL_ID")]
        proposal_id: String,

        #[arg(long, value_name = "AGENT_ID")]
        voter: String,

        #[arg(value_enum)]
        ballot: Ballot,
    },

    /// Show a pending or decided proposal
    Status {
        #[arg(value_name = "PROPOSAL_ID")]
        proposal_id: String,
    },

    /// Pending proposals and the latest decisions
    List,
}

pub async fn execute(command: VotingCommand, tools: &HiveTools) -> ToolResponse {
    let params = match command {
        VotingCommand::Propose {
            proposal_type,
            value,
            proposer,
        } => VotingParams {
            proposal_type: Some(proposal_type),
            value: value.as_deref().map(json_arg),
            proposer_id: proposer.map(AgentId::from),
            ..VotingParams::new(VotingAction::Propose)
        },
        VotingCommand::Vote {
            proposal_id,
            voter,
            ballot,
        } => VotingParams {
            proposal_id: Some(proposal_id),
            voter_id: Some(AgentId::from(voter)),
            vote: Some(ballot == Ballot::For),
            ..VotingParams::new(VotingAction::Vote)
        },
        VotingCommand::Status { proposal_id } => VotingParams {
            proposal_id: Some(proposal_id),
            ..VotingParams::new(VotingAction::Status)
        },
        VotingCommand::List => VotingParams::new(VotingAction::List),
    };
    tools.voting(params).await
}
