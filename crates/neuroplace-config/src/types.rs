// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration type definitions
//!
//! Each struct maps to a section of `neuroplace.toml`. Missing sections and
//! fields fall back to their `Default`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Hardware limit on cores per chip, used as the default and validation bound
pub use neuroplace_hardware::MAX_CORES_PER_CHIP;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct NeuroplaceConfig {
    pub allocator: AllocatorConfig,
    pub traffic: TrafficConfig,
    pub logging: LoggingConfig,
}

/// Placement strategy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Greedy,
    RoundRobin,
    GreedyComms,
}

impl Strategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::RoundRobin => "round_robin",
            Self::GreedyComms => "greedy_comms",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "greedy" => Ok(Self::Greedy),
            "round_robin" | "roundrobin" => Ok(Self::RoundRobin),
            "greedy_comms" | "greedycomms" => Ok(Self::GreedyComms),
            other => Err(ConfigError::InvalidValue(format!(
                "unknown strategy '{}' (expected greedy, round_robin or greedy_comms)",
                other
            ))),
        }
    }
}

/// Allocator selection and chip budget
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AllocatorConfig {
    pub strategy: Strategy,
    pub cores_per_chip: usize,
    pub n_chips: usize,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            strategy: Strategy::Greedy,
            cores_per_chip: MAX_CORES_PER_CHIP,
            n_chips: 1,
        }
    }
}

/// Optional firing-rate input for communication-aware placement
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TrafficConfig {
    /// JSON file mapping ensemble names to per-neuron rates
    pub rates_path: Option<PathBuf>,
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Directory for JSON log files (only used with file logging enabled)
    pub log_dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
        }
    }
}
