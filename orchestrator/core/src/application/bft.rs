// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! BFT Executor
//!
//! Runs an operation redundantly and accepts the outcome once enough
//! replicas succeed.
//!
//! # Semantics
//!
//! - All replicas start concurrently and every one is awaited; a failing
//!   replica never cancels the others. A replica future that panics counts
//!   as a failed replica.
//! - Success requires `BftQuorum::required` successful replicas.
//! - The value returned is the first success in replica-index order.
//!   Replica outputs are NOT compared with each other: this is
//!   quorum-of-success, not value agreement.

use futures::future::join_all;
use futures::FutureExt;
use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use tracing::{debug, info, warn};

use crate::domain::bft::{BftQuorum, DEFAULT_BFT_REPLICAS};
use crate::domain::error::BftError;

pub struct BftExecutor {
    default_replicas: usize,
}

impl BftExecutor {
    pub fn new(default_replicas: usize) -> Self {
        Self {
            default_replicas: default_replicas.max(1),
        }
    }

    pub fn default_replicas(&self) -> usize {
        self.default_replicas
    }

    /// Execute with the configured default replica count.
    pub async fn execute<T, F, Fut>(&self, operation: F) -> Result<T, BftError>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        execute_with_bft(operation, self.default_replicas).await
    }

    pub async fn execute_with_replicas<T, F, Fut>(
        &self,
        operation: F,
        replicas: usize,
    ) -> Result<T, BftError>
    where
        F: Fn(usize) -> Fut,
        Fut: Future<Output = anyhow::Result<T>>,
    {
        execute_with_bft(operation, replicas).await
    }
}

impl Default for BftExecutor {
    fn default() -> Self {
        Self::new(DEFAULT_BFT_REPLICAS)
    }
}

/// Run `operation(replica_index)` `replica_count` times concurrently and
/// return the first successful value if the BFT quorum of successes is met.
pub async fn execute_with_bft<T, F, Fut>(operation: F, replica_count: usize) -> Result<T, BftError>
where
    F: Fn(usize) -> Fut,
    Fut: Future<Output = anyhow::Result<T>>,
{
    let quorum = BftQuorum::for_replicas(replica_count);
    debug!(
        replicas = quorum.replicas,
        max_faults = quorum.max_faults,
        required = quorum.required,
        "Starting BFT round"
    );

    let outcomes = join_all(
        (0..quorum.replicas).map(|replica| AssertUnwindSafe(operation(replica)).catch_unwind()),
    )
    .await;

    let mut first_success = None;
    let mut first_error = None;
    let mut successes = 0;
    for (replica, outcome) in outcomes.into_iter().enumerate() {
        let outcome = outcome.unwrap_or_else(|panic| {
            Err(anyhow::anyhow!("replica {replica} panicked: {}", panic_message(panic.as_ref())))
        });
        match outcome {
            Ok(value) => {
                successes += 1;
                if first_success.is_none() {
                    first_success = Some(value);
                }
            }
            Err(e) => {
                warn!(replica, "BFT replica failed: {:#}", e);
                if first_error.is_none() {
                    first_error = Some(format!("{e:#}"));
                }
            }
        }
    }

    match first_success {
        Some(value) if quorum.is_met(successes) => {
            metrics::counter!("hive_bft_rounds_total", "outcome" => "success").increment(1);
            info!(successes, replicas = quorum.replicas, required = quorum.required, "BFT quorum reached");
            Ok(value)
        }
        _ => {
            metrics::counter!("hive_bft_rounds_total", "outcome" => "failure").increment(1);
            warn!(successes, replicas = quorum.replicas, required = quorum.required, "BFT quorum not reached");
            Err(BftError::ConsensusFailure {
                successes,
                required: quorum.required,
                replicas: quorum.replicas,
                first_error,
            })
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
