// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tool surface: every failure comes back as `success: false` with a code.

use hive_core::application::tools::{
    BroadcastParams, InitParams, LeaveParams, MemoryAction, MemoryParams, ShutdownParams,
    VotingAction, VotingParams,
};
use hive_core::application::{HiveServices, HiveTools};
use hive_core::domain::broadcast::MessagePriority;
use hive_core::domain::hive::AgentId;
use serde_json::{json, Value};

async fn initialized_tools() -> (HiveServices, HiveTools) {
    let services = HiveServices::in_memory();
    let tools = services.tools();
    let response = tools.init(InitParams::default()).await;
    assert!(response.success, "{response:?}");
    (services, tools)
}

fn data(response: &hive_core::application::ToolResponse) -> &Value {
    assert!(response.success, "expected success, got {response:?}");
    response.data.as_ref().unwrap()
}

#[tokio::test]
async fn test_memory_scenario() {
    let (_services, tools) = initialized_tools().await;

    let set = tools
        .memory(MemoryParams {
            action: MemoryAction::Set,
            key: Some("config".into()),
            value: Some(json!({"maxWorkers": 5})),
        })
        .await;
    assert!(set.success);

    let get = tools
        .memory(MemoryParams {
            action: MemoryAction::Get,
            key: Some("config".into()),
            value: None,
        })
        .await;
    assert_eq!(data(&get)["value"], json!({"maxWorkers": 5}));
    assert_eq!(data(&get)["exists"], json!(true));

    let delete = tools
        .memory(MemoryParams {
            action: MemoryAction::Delete,
            key: Some("config".into()),
            value: None,
        })
        .await;
    assert_eq!(data(&delete)["deleted"], json!(true));

    let missing = tools
        .memory(MemoryParams {
            action: MemoryAction::Get,
            key: Some("config".into()),
            value: None,
        })
        .await;
    assert_eq!(data(&missing)["exists"], json!(false));
    assert_eq!(data(&missing)["value"], Value::Null);
}

#[tokio::test]
async fn test_memory_without_key_is_key_required() {
    let (_services, tools) = initialized_tools().await;
    for action in [MemoryAction::Get, MemoryAction::Set, MemoryAction::Delete] {
        let response = tools
            .memory(MemoryParams {
                action,
                key: None,
                value: Some(json!(1)),
            })
            .await;
        assert!(!response.success);
        assert_eq!(response.error_code(), Some("KEY_REQUIRED"));
    }

    let list = tools
        .memory(MemoryParams {
            action: MemoryAction::List,
            key: None,
            value: None,
        })
        .await;
    assert_eq!(data(&list)["count"], json!(0));
}

#[tokio::test]
async fn test_broadcast_log_keeps_last_hundred() {
    let (services, tools) = initialized_tools().await;
    for i in 0..150 {
        let response = tools
            .broadcast(BroadcastParams {
                message: format!("msg-{i}"),
                priority: MessagePriority::Normal,
                from_id: Some(AgentId::from("queen")),
            })
            .await;
        assert!(response.success);
    }

    let state = services.handle.snapshot().await.unwrap();
    assert_eq!(state.broadcasts.len(), 100);
    assert_eq!(state.broadcasts[0].message, "msg-50");
    assert_eq!(state.broadcasts[99].message, "msg-149");
}

#[tokio::test]
async fn test_leave_unknown_agent_fails_with_code() {
    let services = HiveServices::in_memory();
    let response = services
        .tools()
        .leave(LeaveParams {
            agent_id: AgentId::from("nobody"),
        })
        .await;
    assert!(!response.success);
    assert_eq!(response.error_code(), Some("AGENT_NOT_FOUND"));
}

#[tokio::test]
async fn test_operations_before_init_report_not_initialized() {
    let tools = HiveServices::in_memory().tools();

    let broadcast = tools
        .broadcast(BroadcastParams {
            message: "early".into(),
            priority: MessagePriority::High,
            from_id: None,
        })
        .await;
    assert_eq!(broadcast.error_code(), Some("NOT_INITIALIZED"));

    let shutdown = tools.shutdown(ShutdownParams::default()).await;
    assert_eq!(shutdown.error_code(), Some("NOT_INITIALIZED"));

    let mut propose = VotingParams::new(VotingAction::Propose);
    propose.proposal_type = Some("early".into());
    assert_eq!(tools.voting(propose).await.error_code(), Some("NOT_INITIALIZED"));
}

#[tokio::test]
async fn test_dispatch_voting_scenario() {
    let (_services, tools) = initialized_tools().await;
    for id in ["w1", "w2", "w3"] {
        let joined = tools.dispatch("join", json!({"agentId": id})).await;
        assert!(joined.success, "{joined:?}");
    }

    let proposed = tools
        .dispatch(
            "voting",
            json!({"action": "propose", "type": "config-change", "value": {"x": 1}, "proposerId": "w1"}),
        )
        .await;
    let proposal_id = data(&proposed)["id"].as_str().unwrap().to_string();

    for voter in ["w1", "w2"] {
        tools
            .dispatch(
                "voting",
                json!({"action": "vote", "proposalId": proposal_id, "voterId": voter, "vote": true}),
            )
            .await;
    }

    let status = tools
        .dispatch("voting", json!({"action": "status", "proposalId": proposal_id}))
        .await;
    let status = data(&status);
    assert_eq!(status["status"], json!("approved"));
    assert_eq!(status["historical"], json!(true));
    assert_eq!(status["result"]["votes"], json!({"for": 2, "against": 0}));
}

#[tokio::test]
async fn test_dispatch_rejects_bad_input() {
    let tools = HiveServices::in_memory().tools();

    let unknown = tools.dispatch("teleport", Value::Null).await;
    assert_eq!(unknown.error_code(), Some("UNKNOWN_TOOL"));

    let malformed = tools.dispatch("join", json!({"role": "worker"})).await;
    assert_eq!(malformed.error_code(), Some("INVALID_ARGUMENT"));

    let missing_id = tools.dispatch("voting", json!({"action": "status"})).await;
    assert_eq!(missing_id.error_code(), Some("INVALID_ARGUMENT"));
}

#[tokio::test]
async fn test_foreign_proposal_id_is_not_found() {
    let (_services, tools) = initialized_tools().await;

    let status = tools
        .dispatch("voting", json!({"action": "status", "proposalId": "p-123"}))
        .await;
    assert_eq!(status.error_code(), Some("PROPOSAL_NOT_FOUND"));

    let vote = tools
        .dispatch(
            "voting",
            json!({"action": "vote", "proposalId": "p-123", "voterId": "w1", "vote": true}),
        )
        .await;
    assert_eq!(vote.error_code(), Some("PROPOSAL_NOT_FOUND"));
}

#[tokio::test]
async fn test_init_hive_id_matches_status() {
    let tools = HiveServices::in_memory().tools();

    let init = tools.dispatch("init", json!({"topology": "mesh"})).await;
    let hive_id = data(&init)["hiveId"].clone();
    assert!(hive_id.is_string());

    let status = tools.dispatch("status", json!({})).await;
    assert_eq!(data(&status)["hiveId"], hive_id);
}

#[tokio::test]
async fn test_spawn_defaults_and_clamp_via_dispatch() {
    let (_services, tools) = initialized_tools().await;

    let one = tools.dispatch("spawn", Value::Null).await;
    assert_eq!(data(&one)["agentIds"].as_array().unwrap().len(), 1);

    let capped = tools.dispatch("spawn", json!({"count": 99, "prefix": "bee"})).await;
    let ids = data(&capped)["agentIds"].as_array().unwrap();
    assert_eq!(ids.len(), 20);
    assert!(ids[0].as_str().unwrap().starts_with("bee-"));
}
