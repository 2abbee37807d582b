// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Greedy packing: fill one chip's cores in block order, then open the next.

use neuroplace_hardware::{Board, Chip, Model, DEFAULT_CORES_PER_CHIP};
use tracing::info;

use crate::allocator::{block_to_new_core, input_to_board, probes_to_board, Allocator};
use crate::capacity::check_cores_per_chip;
use crate::error::{AllocError, AllocResult};

/// Assigns each block to the current chip until it holds `cores_per_chip`
/// cores, then moves on to a new chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Greedy {
    cores_per_chip: usize,
}

impl Greedy {
    /// # Errors
    ///
    /// `cores_per_chip` must be in `1..=MAX_CORES_PER_CHIP`.
    pub fn new(cores_per_chip: usize) -> AllocResult<Self> {
        Ok(Self {
            cores_per_chip: check_cores_per_chip(cores_per_chip)?,
        })
    }

    #[inline]
    pub fn cores_per_chip(&self) -> usize {
        self.cores_per_chip
    }

    /// Whether `chip` has room for another core
    #[inline]
    pub fn has_room(&self, chip: &Chip<'_>) -> bool {
        chip.n_cores() < self.cores_per_chip
    }
}

impl Default for Greedy {
    fn default() -> Self {
        Self {
            cores_per_chip: DEFAULT_CORES_PER_CHIP,
        }
    }
}

/// Open a new chip, refusing to go past the `n_chips` budget
pub(crate) fn new_chip_within_budget<'b, 'm>(
    board: &'b mut Board<'m>,
    n_chips: usize,
) -> AllocResult<&'b mut Chip<'m>> {
    if board.n_chips() >= n_chips {
        return Err(AllocError::ChipBudgetExceeded { n_chips });
    }
    Ok(board.new_chip())
}

impl Allocator for Greedy {
    fn allocate<'m>(&self, model: &'m Model, n_chips: usize) -> AllocResult<Board<'m>> {
        let mut board = Board::new();
        input_to_board(model, &mut board);

        for block in model.blocks() {
            let current = board.n_chips().checked_sub(1);
            let chip_index = match current {
                Some(index) if self.has_room(&board.chips()[index]) => index,
                _ => new_chip_within_budget(&mut board, n_chips)?.index(),
            };
            let chip = board
                .chip_mut(chip_index)
                .ok_or(AllocError::ChipBudgetExceeded { n_chips })?;
            block_to_new_core(block, chip)?;
        }

        probes_to_board(model, &mut board);
        info!("Greedy allocation across {} chips", board.n_chips());
        Ok(board)
    }

    fn name(&self) -> &'static str {
        "greedy"
    }
}
