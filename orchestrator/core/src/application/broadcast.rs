// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Broadcast Channel
//!
//! Fire-and-forget messaging against the shared hive log. Each message is
//! appended to the bounded log in `HiveState` (oldest evicted past 100) and
//! pushed to live `EventBus` subscribers. There is no per-recipient delivery
//! tracking; `recipients` is the membership size at send time.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::application::state::HiveHandle;
use crate::domain::broadcast::{append_bounded, BroadcastMessage, MessageId, MessagePriority};
use crate::domain::error::HiveError;
use crate::domain::events::HiveEvent;
use crate::domain::hive::AgentId;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BroadcastReceipt {
    pub message_id: MessageId,
    pub recipients: usize,
    pub priority: MessagePriority,
}

pub struct BroadcastChannel {
    hive: HiveHandle,
}

impl BroadcastChannel {
    pub fn new(hive: HiveHandle) -> Self {
        Self { hive }
    }

    pub async fn broadcast(
        &self,
        message: impl Into<String>,
        priority: MessagePriority,
        from_id: AgentId,
    ) -> Result<BroadcastReceipt, HiveError> {
        let entry = BroadcastMessage::new(message, priority, from_id);
        let stored = entry.clone();
        let recipients = self
            .hive
            .mutate(move |state| {
                if !state.initialized {
                    return Err(HiveError::NotInitialized);
                }
                append_bounded(&mut state.broadcasts, stored);
                Ok(state.worker_count())
            })
            .await?;

        metrics::counter!("hive_broadcasts_total", "priority" => priority.as_str()).increment(1);
        info!(
            message_id = %entry.message_id,
            %priority,
            from = %entry.from_id,
            recipients,
            "Message broadcast"
        );
        self.hive.publish(HiveEvent::MessageBroadcast {
            message_id: entry.message_id,
            message: entry.message,
            priority,
            from_id: entry.from_id,
            recipients,
            sent_at: entry.timestamp,
        });

        Ok(BroadcastReceipt {
            message_id: entry.message_id,
            recipients,
            priority,
        })
    }

    /// Up to `limit` most recent messages, oldest first.
    pub async fn recent(&self, limit: usize) -> Result<Vec<BroadcastMessage>, HiveError> {
        self.hive
            .read(move |state| {
                let skip = state.broadcasts.len().saturating_sub(limit);
                state.broadcasts[skip..].to_vec()
            })
            .await
    }
}
