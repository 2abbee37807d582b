// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Error types for hardware shape operations

use crate::ids::{BlockId, SynapseId};

/// Result type for hardware shape operations
pub type HardwareResult<T> = Result<T, HardwareError>;

/// Errors raised while building models or quantizing parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HardwareError {
    #[error("Threshold {vth} does not fit the mantissa range 1..={max} (mantissa {mantissa})")]
    ThresholdOutOfRange { vth: f64, mantissa: i64, max: i32 },

    #[error("Trace magnitude {magnitude} is outside 0.0..{max}")]
    TraceMagnitudeOutOfRange { magnitude: f64, max: f64 },

    #[error("Compartment array '{field}' has length {actual}, expected {expected}")]
    CompartmentLengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown block: {0}")]
    UnknownBlock(BlockId),

    #[error("Synapse {0} was not issued by this model")]
    ForeignSynapse(SynapseId),
}
