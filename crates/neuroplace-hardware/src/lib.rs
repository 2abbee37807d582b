// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuroplace Hardware Shapes
//!
//! Everything the allocator reads and writes, with no placement logic:
//! - **Capacity**: chip and core limits of the target hardware
//! - **Model**: the input graph (blocks, synapses, axons, inputs, probes)
//! - **Board**: the placement output (chips -> cores -> blocks + configs)
//! - **Configs**: value records shared between compartments/synapses of a core
//! - **Discretize**: threshold and trace magnitude quantization
//!
//! Synapses are identified by [`SynapseId`] handles assigned by the
//! [`Model`] arena, so ownership lookups never depend on memory addresses.

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod board;
pub mod capacity;
pub mod configs;
pub mod discretize;
pub mod error;
pub mod ids;
pub mod model;

pub use board::{BlockLocation, Board, BoardSummary, Chip, ChipSummary, Core, CoreSummary};
pub use capacity::{DEFAULT_CORES_PER_CHIP, MAX_COMPARTMENTS, MAX_CORES_PER_CHIP};
pub use configs::{CompartmentConfig, TraceConfig, VthConfig};
pub use discretize::{threshold_to_mantissa_exponent, trace_magnitude_to_int_frac};
pub use error::{HardwareError, HardwareResult};
pub use ids::{BlockId, SynapseId};
pub use model::{Axon, Block, Compartment, Ensemble, Input, Model, Probe, Synapse};
