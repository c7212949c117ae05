// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Hive Tool Surface
//!
//! Transport-agnostic operation surface: `init`, `status`, `join`, `leave`,
//! `spawn`, `voting`, `broadcast`, `shutdown`, `memory`.
//!
//! Every operation returns a [`ToolResponse`]. Failures are data
//! (`success: false` plus a stable error code) and never surface as Rust
//! errors, so a CLI or RPC layer can pass them straight through.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use crate::application::broadcast::BroadcastChannel;
use crate::application::memory::SharedMemoryStore;
use crate::application::registry::{SpawnRequest, WorkerRegistry};
use crate::application::voting::VotingCoordinator;
use crate::domain::broadcast::MessagePriority;
use crate::domain::error::HiveError;
use crate::domain::hive::{AgentId, Topology, WorkerRole};
use crate::domain::proposal::ProposalId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolError {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ToolError>,
}

impl ToolResponse {
    pub fn ok(data: impl Serialize) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Self {
                success: true,
                data: Some(data),
                error: None,
            },
            Err(e) => Self::failure("SERIALIZATION_ERROR", e.to_string()),
        }
    }

    pub fn failure(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(ToolError {
                code: code.into(),
                message: message.into(),
            }),
        }
    }

    /// Error code when this is a failure.
    pub fn error_code(&self) -> Option<&str> {
        self.error.as_ref().map(|e| e.code.as_str())
    }
}

impl From<HiveError> for ToolResponse {
    fn from(err: HiveError) -> Self {
        ToolResponse::failure(err.code(), err.to_string())
    }
}

fn respond<T: Serialize>(result: Result<T, HiveError>) -> ToolResponse {
    match result {
        Ok(data) => ToolResponse::ok(data),
        Err(e) => e.into(),
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitParams {
    #[serde(default)]
    pub topology: Topology,
    #[serde(default)]
    pub queen_id: Option<AgentId>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusParams {
    #[serde(default)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinParams {
    pub agent_id: AgentId,
    #[serde(default)]
    pub role: WorkerRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaveParams {
    pub agent_id: AgentId,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpawnParams {
    pub count: Option<i64>,
    pub role: Option<WorkerRole>,
    pub agent_type: Option<String>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VotingAction {
    Propose,
    Vote,
    Status,
    List,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VotingParams {
    pub action: VotingAction,
    #[serde(default)]
    pub proposal_id: Option<String>,
    #[serde(default, rename = "type")]
    pub proposal_type: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub proposer_id: Option<AgentId>,
    #[serde(default)]
    pub voter_id: Option<AgentId>,
    #[serde(default)]
    pub vote: Option<bool>,
}

impl VotingParams {
    pub fn new(action: VotingAction) -> Self {
        Self {
            action,
            proposal_id: None,
            proposal_type: None,
            value: None,
            proposer_id: None,
            voter_id: None,
            vote: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastParams {
    pub message: String,
    #[serde(default)]
    pub priority: MessagePriority,
    #[serde(default)]
    pub from_id: Option<AgentId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShutdownParams {
    #[serde(default = "default_graceful")]
    pub graceful: bool,
    #[serde(default)]
    pub force: bool,
}

fn default_graceful() -> bool {
    true
}

impl Default for ShutdownParams {
    fn default() -> Self {
        Self {
            graceful: true,
            force: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryAction {
    Get,
    Set,
    Delete,
    List,
}

impl MemoryAction {
    fn as_str(&self) -> &'static str {
        match self {
            MemoryAction::Get => "get",
            MemoryAction::Set => "set",
            MemoryAction::Delete => "delete",
            MemoryAction::List => "list",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryParams {
    pub action: MemoryAction,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub value: Option<Value>,
}

const DEFAULT_PROPOSER: &str = "system";
const DEFAULT_SENDER: &str = "system";

pub struct HiveTools {
    registry: Arc<WorkerRegistry>,
    voting: Arc<VotingCoordinator>,
    broadcast: Arc<BroadcastChannel>,
    memory: Arc<SharedMemoryStore>,
}

impl HiveTools {
    pub fn new(
        registry: Arc<WorkerRegistry>,
        voting: Arc<VotingCoordinator>,
        broadcast: Arc<BroadcastChannel>,
        memory: Arc<SharedMemoryStore>,
    ) -> Self {
        Self {
            registry,
            voting,
            broadcast,
            memory,
        }
    }

    /// Invoke an operation by name with JSON parameters.
    pub async fn dispatch(&self, tool: &str, params: Value) -> ToolResponse {
        debug!(tool, "Dispatching hive tool");
        // absent params behave like an empty object
        let params = if params.is_null() { json!({}) } else { params };

        macro_rules! parse {
            ($ty:ty) => {
                match serde_json::from_value::<$ty>(params) {
                    Ok(p) => p,
                    Err(e) => {
                        return HiveError::InvalidArgument(format!("{tool}: {e}")).into();
                    }
                }
            };
        }

        match tool {
            "init" => self.init(parse!(InitParams)).await,
            "status" => self.status(parse!(StatusParams)).await,
            "join" => self.join(parse!(JoinParams)).await,
            "leave" => self.leave(parse!(LeaveParams)).await,
            "spawn" => self.spawn(parse!(SpawnParams)).await,
            "voting" => self.voting(parse!(VotingParams)).await,
            "broadcast" => self.broadcast(parse!(BroadcastParams)).await,
            "shutdown" => self.shutdown(parse!(ShutdownParams)).await,
            "memory" => self.memory(parse!(MemoryParams)).await,
            other => ToolResponse::failure("UNKNOWN_TOOL", format!("Unknown hive tool '{other}'")),
        }
    }

    pub async fn init(&self, params: InitParams) -> ToolResponse {
        let topology = params.topology;
        respond(
            self.registry
                .init(topology, params.queen_id)
                .await
                .map(|hive_id| json!({ "hiveId": hive_id, "topology": topology })),
        )
    }

    pub async fn status(&self, params: StatusParams) -> ToolResponse {
        respond(self.registry.status(params.verbose).await)
    }

    pub async fn join(&self, params: JoinParams) -> ToolResponse {
        respond(self.registry.join(params.agent_id, params.role).await)
    }

    pub async fn leave(&self, params: LeaveParams) -> ToolResponse {
        match self.registry.leave(&params.agent_id).await {
            Ok(outcome) if outcome.removed => ToolResponse::ok(outcome),
            Ok(outcome) => HiveError::AgentNotFound(outcome.agent_id).into(),
            Err(e) => e.into(),
        }
    }

    pub async fn spawn(&self, params: SpawnParams) -> ToolResponse {
        let defaults = SpawnRequest::default();
        let request = SpawnRequest {
            count: params.count.unwrap_or(defaults.count),
            role: params.role.unwrap_or(defaults.role),
            agent_type: params.agent_type.unwrap_or(defaults.agent_type),
            prefix: params.prefix.unwrap_or(defaults.prefix),
        };
        respond(self.registry.spawn(request).await)
    }

    pub async fn voting(&self, params: VotingParams) -> ToolResponse {
        match params.action {
            VotingAction::Propose => {
                let Some(proposal_type) = params.proposal_type else {
                    return HiveError::InvalidArgument("type is required to propose".into()).into();
                };
                let proposer = params
                    .proposer_id
                    .unwrap_or_else(|| AgentId::from(DEFAULT_PROPOSER));
                respond(
                    self.voting
                        .propose(proposal_type, params.value.unwrap_or(Value::Null), proposer)
                        .await,
                )
            }
            VotingAction::Vote => {
                let proposal_id = match parse_proposal_id(params.proposal_id.as_deref()) {
                    Ok(id) => id,
                    Err(failure) => return failure,
                };
                let (Some(voter), Some(vote)) = (params.voter_id, params.vote) else {
                    return HiveError::InvalidArgument("voterId and vote are required".into()).into();
                };
                respond(self.voting.vote(proposal_id, voter, vote).await)
            }
            VotingAction::Status => match parse_proposal_id(params.proposal_id.as_deref()) {
                Ok(id) => respond(self.voting.status(id).await),
                Err(failure) => failure,
            },
            VotingAction::List => respond(self.voting.list().await),
        }
    }

    pub async fn broadcast(&self, params: BroadcastParams) -> ToolResponse {
        let from = params.from_id.unwrap_or_else(|| AgentId::from(DEFAULT_SENDER));
        respond(
            self.broadcast
                .broadcast(params.message, params.priority, from)
                .await,
        )
    }

    pub async fn shutdown(&self, params: ShutdownParams) -> ToolResponse {
        respond(self.registry.shutdown(params.graceful, params.force).await)
    }

    pub async fn memory(&self, params: MemoryParams) -> ToolResponse {
        let action = params.action;
        let key = params.key.filter(|k| !k.is_empty());
        let key_required = || -> ToolResponse {
            HiveError::KeyRequired {
                action: action.as_str().to_string(),
            }
            .into()
        };

        match (action, key) {
            (MemoryAction::List, _) => respond(
                self.memory
                    .list()
                    .await
                    .map(|keys| json!({ "count": keys.len(), "keys": keys })),
            ),
            (_, None) => key_required(),
            (MemoryAction::Get, Some(key)) => respond(self.memory.get(&key).await),
            (MemoryAction::Set, Some(key)) => respond(
                self.memory
                    .set(&key, params.value.unwrap_or(Value::Null))
                    .await
                    .map(|_| json!({ "key": key, "stored": true })),
            ),
            (MemoryAction::Delete, Some(key)) => respond(
                self.memory
                    .delete(&key)
                    .await
                    .map(|deleted| json!({ "key": key, "deleted": deleted })),
            ),
        }
    }
}

// Proposal ids are opaque to callers: an id this hive never minted is simply
// not found.
fn parse_proposal_id(raw: Option<&str>) -> Result<ProposalId, ToolResponse> {
    let raw = raw.ok_or_else(|| ToolResponse::from(HiveError::InvalidArgument("proposalId is required".into())))?;
    raw.parse::<ProposalId>().map_err(|_| {
        ToolResponse::failure("PROPOSAL_NOT_FOUND", format!("Proposal not found: {raw}"))
    })
}
