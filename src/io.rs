// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! JSON file loading for models and ensemble rates.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array1;
use tracing::debug;

use crate::allocator::EnsembleRates;
use crate::hardware::Model;

/// Load and validate a model written with `serde_json`
pub fn load_model(path: &Path) -> Result<Model> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read model file {}", path.display()))?;
    let mut model: Model = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse model file {}", path.display()))?;
    model.reindex();
    model
        .validate()
        .with_context(|| format!("Invalid model in {}", path.display()))?;
    debug!(
        "Loaded model from {}: {} inputs, {} blocks, {} probes",
        path.display(),
        model.inputs().len(),
        model.n_blocks(),
        model.probes().len()
    );
    Ok(model)
}

/// Load `{ "<ensemble>": [rate, ...] }` into per-ensemble rate arrays
pub fn load_ensemble_rates(path: &Path) -> Result<EnsembleRates> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read rates file {}", path.display()))?;
    parse_ensemble_rates(&raw).with_context(|| format!("Failed to parse rates file {}", path.display()))
}

/// Parse the rates JSON object
pub fn parse_ensemble_rates(raw: &str) -> Result<EnsembleRates> {
    let parsed: BTreeMap<String, Vec<f64>> = serde_json::from_str(raw)?;
    Ok(parsed
        .into_iter()
        .map(|(name, rates)| (name, Array1::from(rates)))
        .collect())
}
