// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Per-core configuration records.
//!
//! Each core has a small number of configuration slots per record kind; many
//! compartments (or synapses) share one slot when their records are equal.
//! All records are plain integer values so they hash and compare by value.

use serde::{Deserialize, Serialize};

/// Compartment dynamics configuration (decays, refractory delay, noise)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompartmentConfig {
    pub decay_u: i32,
    pub decay_v: i32,
    pub refract_delay: i32,
    pub enable_noise: bool,
}

/// Spike threshold configuration (mantissa only, the exponent is fixed)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VthConfig {
    pub vth: i32,
}

/// Pre-synaptic trace configuration for learning synapses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TraceConfig {
    pub tau: i32,
    pub spike_int: i32,
    pub spike_frac: i32,
}
