// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! BFT quorum sizing for redundant execution.
//!
//! `faults = floor((replicas - 1) / 3)`, `required = 2 * faults + 1`.
//! Note this is not the textbook "2f+1 of 3f+1": three replicas tolerate
//! zero faults yet need only one success.

use serde::{Deserialize, Serialize};

/// Default number of replicas for `BftExecutor`.
pub const DEFAULT_BFT_REPLICAS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BftQuorum {
    pub replicas: usize,
    pub max_faults: usize,
    pub required: usize,
}

impl BftQuorum {
    /// Quorum for `replicas` runs. A replica count of zero is treated as one.
    pub fn for_replicas(replicas: usize) -> Self {
        let replicas = replicas.max(1);
        let max_faults = (replicas - 1) / 3;
        Self {
            replicas,
            max_faults,
            required: 2 * max_faults + 1,
        }
    }

    pub fn is_met(&self, successes: usize) -> bool {
        successes >= self.required
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worked_values() {
        let cases = [(3, 0, 1), (4, 1, 3), (5, 1, 3), (7, 2, 5)];
        for (replicas, faults, required) in cases {
            let q = BftQuorum::for_replicas(replicas);
            assert_eq!(q.max_faults, faults, "faults for {replicas}");
            assert_eq!(q.required, required, "required for {replicas}");
        }
    }

    #[test]
    fn test_zero_replicas_clamped() {
        let q = BftQuorum::for_replicas(0);
        assert_eq!(q.replicas, 1);
        assert_eq!(q.required, 1);
    }
}
