// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Place a JSON model onto a board and print the placement summary.
//!
//! Settings come from `neuroplace.toml` (or `--config`), then `NEUROPLACE_*`
//! environment variables, then the flags below.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::process;

use anyhow::{bail, Context, Result};
use neuroplace::allocator::{build_allocator, ens_to_block_rates, measure_interchip_conns};
use neuroplace::config::{
    apply_cli_overrides, apply_environment_overrides, load_config, validate_config,
    NeuroplaceConfig,
};
use neuroplace::io::{load_ensemble_rates, load_model};
use neuroplace::observability::{debug_flags_help, init_logging, parse_debug_flags};
use tracing::{info, warn};

struct Args {
    model: PathBuf,
    config: Option<PathBuf>,
    overrides: HashMap<String, String>,
}

fn usage_and_exit() -> ! {
    eprintln!(
        "Usage: place_model --model <model.json> [--config <neuroplace.toml>]\n\
         \x20                  [--strategy greedy|round_robin|greedy_comms] [--n-chips <n>]\n\
         \x20                  [--cores-per-chip <n>] [--rates <rates.json>] [--log-level <level>]\n\n{}",
        debug_flags_help()
    );
    process::exit(2);
}

fn parse_args() -> Args {
    let mut model = None;
    let mut config = None;
    let mut overrides = HashMap::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        let key = match arg.as_str() {
            "--model" => {
                model = Some(PathBuf::from(args.next().unwrap_or_else(|| usage_and_exit())));
                continue;
            }
            "--config" => {
                config = Some(PathBuf::from(args.next().unwrap_or_else(|| usage_and_exit())));
                continue;
            }
            "--strategy" => "strategy",
            "--n-chips" => "n_chips",
            "--cores-per-chip" => "cores_per_chip",
            "--rates" => "rates_path",
            "--log-level" => "log_level",
            "-h" | "--help" => usage_and_exit(),
            other if other.starts_with("--debug-") => continue,
            other => {
                eprintln!("Unknown argument: {other}");
                usage_and_exit();
            }
        };
        let value = args.next().unwrap_or_else(|| usage_and_exit());
        overrides.insert(key.to_string(), value);
    }

    let Some(model) = model else { usage_and_exit() };
    Args {
        model,
        config,
        overrides,
    }
}

/// Config file if one is given or found, else defaults; overrides apply either way
fn resolve_config(args: &Args) -> Result<NeuroplaceConfig> {
    let config = match load_config(args.config.as_deref(), Some(&args.overrides)) {
        Ok(config) => config,
        Err(neuroplace::config::ConfigError::FileNotFound(_)) if args.config.is_none() => {
            let mut config = NeuroplaceConfig::default();
            apply_environment_overrides(&mut config)?;
            apply_cli_overrides(&mut config, &args.overrides)?;
            config
        }
        Err(err) => return Err(err).context("Failed to load configuration"),
    };
    validate_config(&config)?;
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    let debug_flags = parse_debug_flags();
    let _log_guard = init_logging(
        &debug_flags,
        &config.logging.level,
        config.logging.log_dir.clone(),
    )?;

    let model = load_model(&args.model)?;

    let block_rates = match &config.traffic.rates_path {
        Some(path) => {
            let ens_rates = load_ensemble_rates(path)?;
            Some(ens_to_block_rates(&model, &ens_rates)?)
        }
        None => None,
    };

    let allocator = build_allocator(&config.allocator, block_rates.clone())?;
    let board = allocator
        .allocate(&model, config.allocator.n_chips)
        .with_context(|| format!("{} allocation failed", allocator.name()))?;

    let stats = measure_interchip_conns(&board, block_rates.as_ref())?;
    info!(
        "Placed {} blocks on {} chips / {} cores; interchip traffic {:.3} of {:.3} ({:.1}%)",
        model.n_blocks(),
        board.n_chips(),
        board.n_cores(),
        stats.interchip,
        stats.total(),
        100.0 * stats.interchip_fraction()
    );
    if board.n_chips() < config.allocator.n_chips {
        warn!(
            "Only {} of {} budgeted chips were used",
            board.n_chips(),
            config.allocator.n_chips
        );
    }

    let summary = board.summary();
    if summary.chips.is_empty() && model.n_blocks() > 0 {
        bail!("Allocation produced an empty board for a non-empty model");
    }
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn main() {
    let args = parse_args();
    if let Err(err) = run(args) {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}
