// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Configuration file loading with override support
//!
//! Three tiers, later ones winning:
//! 1. TOML file (base values)
//! 2. Environment variables (runtime overrides)
//! 3. CLI arguments (explicit user overrides)

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{ConfigError, ConfigResult, NeuroplaceConfig, Strategy};

/// Default configuration file name
pub const CONFIG_FILE_NAME: &str = "neuroplace.toml";

/// Environment variable naming an explicit configuration file
pub const CONFIG_PATH_ENV: &str = "NEUROPLACE_CONFIG_PATH";

/// Find the neuroplace configuration file
///
/// Search order:
/// 1. `NEUROPLACE_CONFIG_PATH` environment variable
/// 2. Current working directory: `./neuroplace.toml`
/// 3. Parent directories (up to 5 levels)
///
/// # Errors
///
/// Returns `ConfigError::FileNotFound` if no config file is found in any location
pub fn find_config_file() -> ConfigResult<PathBuf> {
    if let Ok(env_path) = env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(env_path);
        if path.exists() {
            return Ok(path);
        }
        return Err(ConfigError::FileNotFound(format!(
            "Config file specified by {} not found: {}",
            CONFIG_PATH_ENV,
            path.display()
        )));
    }

    let mut search_paths = Vec::new();
    if let Ok(cwd) = env::current_dir() {
        search_paths.push(cwd.join(CONFIG_FILE_NAME));
        let mut current = cwd.as_path();
        for _ in 0..5 {
            match current.parent() {
                Some(parent) => {
                    search_paths.push(parent.join(CONFIG_FILE_NAME));
                    current = parent;
                }
                None => break,
            }
        }
    }

    if let Some(path) = search_paths.iter().find(|p| p.exists()) {
        return Ok(path.clone());
    }

    let search_list = search_paths
        .iter()
        .map(|p| format!("  - {}", p.display()))
        .collect::<Vec<_>>()
        .join("\n");

    Err(ConfigError::FileNotFound(format!(
        "'{}' not found in any of these locations:\n{}\n\nSet {} to specify a custom location.",
        CONFIG_FILE_NAME, search_list, CONFIG_PATH_ENV
    )))
}

/// Load configuration from TOML file
///
/// # Arguments
///
/// * `config_path` - Optional path to config file. If `None`, will search for config file.
/// * `cli_args` - Optional CLI argument overrides
///
/// # Errors
///
/// Returns error if the config file is not found, contains invalid TOML, or an
/// override value cannot be parsed. Range checks are left to
/// [`crate::validate_config`].
pub fn load_config(
    config_path: Option<&Path>,
    cli_args: Option<&HashMap<String, String>>,
) -> ConfigResult<NeuroplaceConfig> {
    let config_file = match config_path {
        Some(path) => path.to_path_buf(),
        None => find_config_file()?,
    };

    let content = fs::read_to_string(&config_file)?;
    let mut config: NeuroplaceConfig = toml::from_str(&content)?;

    apply_environment_overrides(&mut config)?;
    if let Some(cli) = cli_args {
        apply_cli_overrides(&mut config, cli)?;
    }

    Ok(config)
}

fn parse_value<T: FromStr>(source: &str, value: &str) -> ConfigResult<T> {
    value.trim().parse::<T>().map_err(|_| {
        ConfigError::InvalidValue(format!("{} = '{}' could not be parsed", source, value))
    })
}

/// Apply environment variable overrides to configuration
///
/// Supported environment variables:
/// - `NEUROPLACE_STRATEGY` -> `allocator.strategy`
/// - `NEUROPLACE_CORES_PER_CHIP` -> `allocator.cores_per_chip`
/// - `NEUROPLACE_N_CHIPS` -> `allocator.n_chips`
/// - `NEUROPLACE_RATES_PATH` -> `traffic.rates_path`
/// - `NEUROPLACE_LOG_LEVEL` -> `logging.level`
/// - `NEUROPLACE_LOG_DIR` -> `logging.log_dir`
pub fn apply_environment_overrides(config: &mut NeuroplaceConfig) -> ConfigResult<()> {
    if let Ok(value) = env::var("NEUROPLACE_STRATEGY") {
        config.allocator.strategy = value.parse::<Strategy>()?;
    }
    if let Ok(value) = env::var("NEUROPLACE_CORES_PER_CHIP") {
        config.allocator.cores_per_chip = parse_value("NEUROPLACE_CORES_PER_CHIP", &value)?;
    }
    if let Ok(value) = env::var("NEUROPLACE_N_CHIPS") {
        config.allocator.n_chips = parse_value("NEUROPLACE_N_CHIPS", &value)?;
    }
    if let Ok(value) = env::var("NEUROPLACE_RATES_PATH") {
        config.traffic.rates_path = Some(PathBuf::from(value));
    }
    if let Ok(value) = env::var("NEUROPLACE_LOG_LEVEL") {
        config.logging.level = value;
    }
    if let Ok(value) = env::var("NEUROPLACE_LOG_DIR") {
        config.logging.log_dir = Some(PathBuf::from(value));
    }
    Ok(())
}

/// Apply CLI argument overrides to configuration
///
/// # Arguments
///
/// * `config` - Configuration to modify
/// * `cli_args` - Map of CLI arguments (e.g., `{"strategy": "greedy_comms", "n_chips": "4"}`)
pub fn apply_cli_overrides(
    config: &mut NeuroplaceConfig,
    cli_args: &HashMap<String, String>,
) -> ConfigResult<()> {
    if let Some(value) = cli_args.get("strategy") {
        config.allocator.strategy = value.parse::<Strategy>()?;
    }
    if let Some(value) = cli_args.get("cores_per_chip") {
        config.allocator.cores_per_chip = parse_value("--cores-per-chip", value)?;
    }
    if let Some(value) = cli_args.get("n_chips") {
        config.allocator.n_chips = parse_value("--n-chips", value)?;
    }
    if let Some(value) = cli_args.get("rates_path") {
        config.traffic.rates_path = Some(PathBuf::from(value));
    }
    if let Some(value) = cli_args.get("log_level") {
        config.logging.level = value.clone();
    }
    Ok(())
}
