// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration validation
//!
//! Every rule is checked and all violations are reported together.

use crate::{ConfigError, ConfigResult, NeuroplaceConfig, Strategy, MAX_CORES_PER_CHIP};

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validation errors that can occur during config validation
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValidationError {
    OutOfRange {
        field: String,
        value: usize,
        min: usize,
        max: usize,
    },
    InvalidValue { field: String, reason: String },
    Conflict { field: String, reason: String },
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{} = {} is outside valid range ({}-{})",
                field, value, min, max
            ),
            Self::InvalidValue { field, reason } => {
                write!(f, "Invalid configuration value for {}: {}", field, reason)
            }
            Self::Conflict { field, reason } => {
                write!(f, "Conflicting configuration for {}: {}", field, reason)
            }
        }
    }
}

/// Validate the complete configuration
///
/// # Errors
///
/// Returns `ConfigError::ValidationError` listing every violation
pub fn validate_config(config: &NeuroplaceConfig) -> ConfigResult<()> {
    let mut errors = Vec::new();

    validate_allocator(config, &mut errors);
    validate_traffic(config, &mut errors);
    validate_logging(config, &mut errors);

    if !errors.is_empty() {
        let error_messages = errors
            .iter()
            .map(|e| format!("  - {}", e))
            .collect::<Vec<_>>()
            .join("\n");

        return Err(ConfigError::ValidationError(format!(
            "Configuration validation failed:\n{}",
            error_messages
        )));
    }

    Ok(())
}

fn validate_allocator(config: &NeuroplaceConfig, errors: &mut Vec<ConfigValidationError>) {
    let cores_per_chip = config.allocator.cores_per_chip;
    if !(1..=MAX_CORES_PER_CHIP).contains(&cores_per_chip) {
        errors.push(ConfigValidationError::OutOfRange {
            field: "allocator.cores_per_chip".to_string(),
            value: cores_per_chip,
            min: 1,
            max: MAX_CORES_PER_CHIP,
        });
    }

    if config.allocator.n_chips == 0 {
        errors.push(ConfigValidationError::InvalidValue {
            field: "allocator.n_chips".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
}

fn validate_traffic(config: &NeuroplaceConfig, errors: &mut Vec<ConfigValidationError>) {
    if config.traffic.rates_path.is_some() && config.allocator.strategy != Strategy::GreedyComms {
        errors.push(ConfigValidationError::Conflict {
            field: "traffic.rates_path".to_string(),
            reason: format!(
                "rates only steer greedy_comms placement, strategy is {}",
                config.allocator.strategy
            ),
        });
    }
}

fn validate_logging(config: &NeuroplaceConfig, errors: &mut Vec<ConfigValidationError>) {
    let level = config.logging.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigValidationError::InvalidValue {
            field: "logging.level".to_string(),
            reason: format!("must be one of {}", LOG_LEVELS.join(", ")),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&NeuroplaceConfig::default()).is_ok());
    }

    #[test]
    fn test_cores_per_chip_range() {
        let mut config = NeuroplaceConfig::default();
        config.allocator.cores_per_chip = 200;

        let result = validate_config(&config);
        assert!(result.is_err());
        if let Err(ConfigError::ValidationError(msg)) = result {
            assert!(msg.contains("allocator.cores_per_chip"));
            assert!(msg.contains("1-128"));
        }
    }

    #[test]
    fn test_cores_per_chip_bound_follows_hardware_limit() {
        let hardware_max = neuroplace_hardware::capacity::MAX_CORES_PER_CHIP;
        let mut config = NeuroplaceConfig::default();
        assert_eq!(config.allocator.cores_per_chip, hardware_max);

        config.allocator.cores_per_chip = hardware_max;
        assert!(validate_config(&config).is_ok());
        config.allocator.cores_per_chip = hardware_max + 1;
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn test_rates_require_greedy_comms() {
        let mut config = NeuroplaceConfig::default();
        config.traffic.rates_path = Some(PathBuf::from("rates.json"));
        assert!(validate_config(&config).is_err());

        config.allocator.strategy = Strategy::GreedyComms;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_all_violations_reported() {
        let mut config = NeuroplaceConfig::default();
        config.allocator.cores_per_chip = 0;
        config.allocator.n_chips = 0;
        config.logging.level = "loud".to_string();

        match validate_config(&config) {
            Err(ConfigError::ValidationError(msg)) => {
                assert!(msg.contains("allocator.cores_per_chip"));
                assert!(msg.contains("allocator.n_chips"));
                assert!(msg.contains("logging.level"));
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_log_level_case_insensitive() {
        let mut config = NeuroplaceConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(validate_config(&config).is_ok());
    }
}
