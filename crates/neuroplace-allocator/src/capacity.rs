// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Capacity checks run before anything is placed.

use neuroplace_hardware::{Block, MAX_COMPARTMENTS, MAX_CORES_PER_CHIP};

use crate::error::{AllocError, AllocResult};

/// Reject a block that cannot fit on a single core
pub fn check_block_fits(block: &Block) -> AllocResult<()> {
    let n_compartments = block.n_compartments();
    if n_compartments > MAX_COMPARTMENTS {
        return Err(AllocError::BlockTooLarge {
            block: block.id(),
            n_compartments,
            max: MAX_COMPARTMENTS,
        });
    }
    Ok(())
}

/// Validate a per-chip core budget (`1..=MAX_CORES_PER_CHIP`)
pub fn check_cores_per_chip(cores_per_chip: usize) -> AllocResult<usize> {
    if cores_per_chip == 0 || cores_per_chip > MAX_CORES_PER_CHIP {
        return Err(AllocError::InvalidCoresPerChip {
            requested: cores_per_chip,
            max: MAX_CORES_PER_CHIP,
        });
    }
    Ok(cores_per_chip)
}
