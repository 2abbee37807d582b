// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Error types for allocation.

Every variant is fatal for the allocation call that raised it; no partial
board is ever returned.
*/

use neuroplace_hardware::{BlockId, HardwareError, SynapseId};

/// Result type for allocation operations
pub type AllocResult<T> = Result<T, AllocError>;

/// Errors that can occur while placing a model onto a board
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AllocError {
    #[error("{block} does not fit on one core: {n_compartments} compartments (max {max})")]
    BlockTooLarge {
        block: BlockId,
        n_compartments: usize,
        max: usize,
    },

    #[error("The network needs more chips than requested ({n_chips})")]
    ChipBudgetExceeded { n_chips: usize },

    #[error("Chips cannot have more than {max} cores (requested {requested})")]
    InvalidCoresPerChip { requested: usize, max: usize },

    #[error("{0} not in block rates")]
    MissingBlockRates(BlockId),

    #[error("Rates for {block} have length {actual}, expected {expected}")]
    RateLengthMismatch {
        block: BlockId,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown ensemble: {0}")]
    UnknownEnsemble(String),

    #[error("Rates for ensemble '{ensemble}' have length {actual}, expected {expected}")]
    EnsembleRateLengthMismatch {
        ensemble: String,
        expected: usize,
        actual: usize,
    },

    #[error("Compartment map of {block} references neuron {index}, ensemble has {n_neurons}")]
    CompartmentIndexOutOfRange {
        block: BlockId,
        index: usize,
        n_neurons: usize,
    },

    #[error("Ensemble '{ensemble}' has {n_blocks} output blocks but no compartment map for {block}")]
    AmbiguousEnsembleRates {
        ensemble: String,
        block: BlockId,
        n_blocks: usize,
    },

    #[error("{synapse} is owned by both block {first} and block {second}")]
    DuplicateSynapse {
        synapse: SynapseId,
        first: usize,
        second: usize,
    },

    #[error("Axon '{axon}' of block {block} targets {synapse}, which no block owns")]
    DanglingAxon {
        block: usize,
        axon: String,
        synapse: SynapseId,
    },

    #[error(transparent)]
    Hardware(#[from] HardwareError),
}
