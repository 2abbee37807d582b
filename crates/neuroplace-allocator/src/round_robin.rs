// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Round-robin spreading: block `t` goes to chip `t mod n_chips`.

use neuroplace_hardware::{Board, Model, DEFAULT_CORES_PER_CHIP};
use tracing::{info, warn};

use crate::allocator::{block_to_new_core, input_to_board, probes_to_board, Allocator};
use crate::capacity::check_cores_per_chip;
use crate::error::{AllocError, AllocResult};

/// Spreads blocks over as many chips as the budget allows, one core per block.
///
/// Chips are created the first time their index comes up, so a model with
/// fewer blocks than `n_chips` only gets one chip per block. A chip that
/// already holds `cores_per_chip` cores means the budget is too small.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundRobin {
    cores_per_chip: usize,
}

impl RoundRobin {
    pub fn new() -> Self {
        Self {
            cores_per_chip: DEFAULT_CORES_PER_CHIP,
        }
    }

    pub fn with_cores_per_chip(cores_per_chip: usize) -> AllocResult<Self> {
        Ok(Self {
            cores_per_chip: check_cores_per_chip(cores_per_chip)?,
        })
    }

    #[inline]
    pub fn cores_per_chip(&self) -> usize {
        self.cores_per_chip
    }
}

impl Default for RoundRobin {
    fn default() -> Self {
        Self::new()
    }
}

impl Allocator for RoundRobin {
    fn allocate<'m>(&self, model: &'m Model, n_chips: usize) -> AllocResult<Board<'m>> {
        let mut board = Board::new();
        input_to_board(model, &mut board);

        let n_blocks = model.n_blocks();
        if n_blocks > 0 && n_chips == 0 {
            return Err(AllocError::ChipBudgetExceeded { n_chips });
        }
        if n_chips > n_blocks {
            warn!(
                "Round-robin budget of {} chips exceeds {} blocks; only {} chips will be used",
                n_chips, n_blocks, n_blocks
            );
        }

        for (t, block) in model.blocks().iter().enumerate() {
            let chip_index = t % n_chips;
            if chip_index >= board.n_chips() {
                board.new_chip();
            }
            let chip = board
                .chip_mut(chip_index)
                .ok_or(AllocError::ChipBudgetExceeded { n_chips })?;
            if chip.n_cores() >= self.cores_per_chip {
                return Err(AllocError::ChipBudgetExceeded { n_chips });
            }
            block_to_new_core(block, chip)?;
        }

        probes_to_board(model, &mut board);
        info!("Round-robin allocation across {} chips", board.n_chips());
        Ok(board)
    }

    fn name(&self) -> &'static str {
        "round_robin"
    }
}
