// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Hive Configuration
//
// YAML configuration for a hive host:
// - Default topology used when the queen bootstraps a hive
// - Locations of the persisted hive state and agent records
// - BFT replica default
// - Queen task polling cadence and timeout

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::bft::DEFAULT_BFT_REPLICAS;
use crate::domain::hive::Topology;

/// Top-level hive configuration document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HiveConfig {
    /// Topology applied when a hive is bootstrapped by the queen
    #[serde(default)]
    pub topology: Topology,

    /// Path of the persisted hive state document
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,

    /// Path of the persisted agent records
    #[serde(default = "default_agents_path")]
    pub agents_path: PathBuf,

    /// Buffered events per subscriber before lagging
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,

    #[serde(default)]
    pub bft: BftConfig,

    #[serde(default)]
    pub queen: QueenConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BftConfig {
    /// Replicas per redundant execution when the caller does not specify
    #[serde(default = "default_bft_replicas")]
    pub replicas: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueenConfig {
    /// Delay between result polls while a task is running
    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,

    /// How long to wait for worker results before returning partial results
    #[serde(default = "default_task_timeout", with = "humantime_serde")]
    pub task_timeout: Duration,
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".hive/state.json")
}

fn default_agents_path() -> PathBuf {
    PathBuf::from(".hive/agents.json")
}

fn default_event_bus_capacity() -> usize {
    256
}

fn default_bft_replicas() -> usize {
    DEFAULT_BFT_REPLICAS
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

fn default_task_timeout() -> Duration {
    Duration::from_millis(30_000)
}

impl Default for BftConfig {
    fn default() -> Self {
        Self {
            replicas: default_bft_replicas(),
        }
    }
}

impl Default for QueenConfig {
    fn default() -> Self {
        Self {
            poll_interval: default_poll_interval(),
            task_timeout: default_task_timeout(),
        }
    }
}

impl Default for HiveConfig {
    fn default() -> Self {
        Self {
            topology: Topology::default(),
            state_path: default_state_path(),
            agents_path: default_agents_path(),
            event_bus_capacity: default_event_bus_capacity(),
            bft: BftConfig::default(),
            queen: QueenConfig::default(),
        }
    }
}

impl HiveConfig {
    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Parse configuration from YAML string
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. HIVE_CONFIG_PATH environment variable
    /// 2. ./hive-config.yaml (working directory)
    /// 3. ~/.hive/config.yaml (user home)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("HIVE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./hive-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".hive").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        None
    }

    /// Load configuration with discovery, fallback to default. The result is
    /// validated.
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must load
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path).map_err(|e| {
                anyhow::anyhow!("Failed to load config at {:?}: {}", path, e)
            })?;
            config.apply_env_overrides();
            config.validate()?;
            return Ok(config);
        }

        let mut config = if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            Self::from_yaml_file(config_path)?
        } else {
            tracing::debug!("No configuration file found, using defaults");
            Self::default()
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the services cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.bft.replicas == 0 {
            anyhow::bail!("bft.replicas must be at least 1");
        }
        if self.event_bus_capacity == 0 {
            anyhow::bail!("event_bus_capacity must be at least 1");
        }
        if self.queen.poll_interval.is_zero() {
            anyhow::bail!("queen.poll_interval must be greater than zero");
        }
        if self.queen.task_timeout < self.queen.poll_interval {
            anyhow::bail!(
                "queen.task_timeout ({:?}) is shorter than queen.poll_interval ({:?})",
                self.queen.task_timeout,
                self.queen.poll_interval
            );
        }
        Ok(())
    }

    /// Apply HIVE_STATE_PATH / HIVE_AGENTS_PATH overrides
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var("HIVE_STATE_PATH") {
            self.state_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("HIVE_AGENTS_PATH") {
            self.agents_path = PathBuf::from(path);
        }
    }
}
