// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Communication-aware greedy packing.

Like [`Greedy`], chips are filled one at a time, but the next block is the
one that talks the most with what is already on the current chip. New chips
(and new clusters on a chip whose contents have no remaining neighbours) are
seeded with a block nobody sends to, so forward-connected subgraphs tend to
stay together.

Candidates are visited in ascending block index, and a candidate only
replaces the current best on a strictly larger affinity, so ties always go
to the lowest index.
*/

use std::collections::BTreeSet;

use neuroplace_hardware::{Block, Board, Model};
use tracing::{debug, info};

use crate::allocator::{block_to_new_core, input_to_board, probes_to_board, Allocator};
use crate::error::{AllocError, AllocResult};
use crate::greedy::{new_chip_within_budget, Greedy};
use crate::traffic::{compute_block_conns, no_pre_blocks, BlockConns, BlockRates};

/// Greedy packing that keeps heavily-connected blocks on the same chip
#[derive(Debug, Clone)]
pub struct GreedyComms {
    greedy: Greedy,
    block_rates: Option<BlockRates>,
}

impl GreedyComms {
    /// # Errors
    ///
    /// `cores_per_chip` must be in `1..=MAX_CORES_PER_CHIP`.
    pub fn new(cores_per_chip: usize, block_rates: Option<BlockRates>) -> AllocResult<Self> {
        Ok(Self {
            greedy: Greedy::new(cores_per_chip)?,
            block_rates,
        })
    }

    #[inline]
    pub fn cores_per_chip(&self) -> usize {
        self.greedy.cores_per_chip()
    }

    pub fn block_rates(&self) -> Option<&BlockRates> {
        self.block_rates.as_ref()
    }
}

impl Default for GreedyComms {
    fn default() -> Self {
        Self {
            greedy: Greedy::default(),
            block_rates: None,
        }
    }
}

/// Lowest-index unallocated block with no incoming traffic, else `lowest`
fn seed_block(no_pre: &[usize], unallocated: &BTreeSet<usize>, lowest: usize) -> usize {
    no_pre
        .iter()
        .copied()
        .find(|idx| unallocated.contains(idx))
        .unwrap_or(lowest)
}

/// Unallocated block with the strongest link (either direction) to `chip_blocks`.
///
/// `None` when nothing left connects to the chip's contents.
fn most_connected_block(
    block_conns: &BlockConns,
    chip_blocks: &[usize],
    unallocated: &BTreeSet<usize>,
) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for &j in unallocated {
        let affinity = chip_blocks
            .iter()
            .map(|&i| {
                let out = block_conns[i].get(&j).copied().unwrap_or(0.0);
                let back = block_conns[j].get(&i).copied().unwrap_or(0.0);
                out.max(back)
            })
            .fold(0.0_f64, f64::max);
        if affinity > best.map_or(0.0, |(_, max_conn)| max_conn) {
            best = Some((j, affinity));
        }
    }
    best.map(|(j, _)| j)
}

impl Allocator for GreedyComms {
    fn allocate<'m>(&self, model: &'m Model, n_chips: usize) -> AllocResult<Board<'m>> {
        let blocks: Vec<&'m Block> = model.blocks().iter().collect();
        let block_conns = compute_block_conns(&blocks, self.block_rates.as_ref())?;
        let no_pre = no_pre_blocks(&block_conns);
        debug!("{} of {} blocks have no incoming traffic", no_pre.len(), blocks.len());

        let mut board = Board::new();
        input_to_board(model, &mut board);

        let mut unallocated: BTreeSet<usize> = (0..blocks.len()).collect();
        let mut chip_index: Option<usize> = None;
        let mut chip_blocks: Vec<usize> = Vec::new();

        while let Some(&lowest) = unallocated.first() {
            let current = chip_index
                .and_then(|index| board.chip(index))
                .filter(|chip| self.greedy.has_room(chip))
                .map(|chip| chip.index());

            let (target, block_idx) = match current {
                None => {
                    let chip = new_chip_within_budget(&mut board, n_chips)?;
                    chip_blocks.clear();
                    (chip.index(), seed_block(&no_pre, &unallocated, lowest))
                }
                Some(index) => {
                    let picked = most_connected_block(&block_conns, &chip_blocks, &unallocated)
                        .unwrap_or_else(|| seed_block(&no_pre, &unallocated, lowest));
                    (index, picked)
                }
            };

            let chip = board
                .chip_mut(target)
                .ok_or(AllocError::ChipBudgetExceeded { n_chips })?;
            block_to_new_core(blocks[block_idx], chip)?;

            unallocated.remove(&block_idx);
            chip_blocks.push(block_idx);
            chip_index = Some(target);
        }

        probes_to_board(model, &mut board);
        info!(
            "Greedy-comms allocation across {} chips ({} blocks)",
            board.n_chips(),
            blocks.len()
        );
        Ok(board)
    }

    fn name(&self) -> &'static str {
        "greedy_comms"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traffic::CONNECTION_EPSILON;
    use neuroplace_hardware::{Axon, BlockId, BlockLocation};

    /// Blocks with one-compartment bodies and the given directed edges
    fn graph(n_blocks: usize, edges: &[(usize, usize, usize)]) -> Model {
        let mut model = Model::new();
        let mut blocks: Vec<Block> = (0..n_blocks)
            .map(|i| Block::new(format!("b{i}"), 1))
            .collect();
        let inputs: Vec<_> = (0..n_blocks)
            .map(|i| {
                let synapse = model.new_synapse(format!("b{i}_in"), 1);
                blocks[i].add_synapse(synapse)
            })
            .collect();
        for &(src, dst, n_axons) in edges {
            blocks[src].add_axon(Axon::new(format!("b{src}->b{dst}"), inputs[dst], n_axons));
        }
        for block in blocks {
            model.add_block(block).unwrap();
        }
        model
    }

    fn chip_of(board: &Board<'_>, block: usize) -> usize {
        board.block_location(BlockId(block as u32)).unwrap().chip
    }

    #[test]
    fn test_chain_split_when_chip_holds_one_core() {
        let model = graph(2, &[(0, 1, 4)]);
        let board = GreedyComms::new(1, None).unwrap().allocate(&model, 2).unwrap();
        assert_eq!(board.n_chips(), 2);
        assert_ne!(chip_of(&board, 0), chip_of(&board, 1));
    }

    #[test]
    fn test_chain_shares_chip_with_room() {
        let model = graph(2, &[(0, 1, 4)]);
        let board = GreedyComms::new(2, None).unwrap().allocate(&model, 1).unwrap();
        assert_eq!(board.n_chips(), 1);
        assert_eq!(chip_of(&board, 0), chip_of(&board, 1));
    }

    #[test]
    fn test_no_pre_block_seeds_first_chip() {
        // b2 -> b0 -> b1: only b2 has no incoming traffic
        let model = graph(3, &[(2, 0, 1), (0, 1, 1)]);
        let board = GreedyComms::new(1, None).unwrap().allocate(&model, 3).unwrap();
        assert_eq!(chip_of(&board, 2), 0);
    }

    #[test]
    fn test_seed_prefers_unallocated_no_pre_block() {
        let unallocated: BTreeSet<usize> = [1, 2, 4].into_iter().collect();
        assert_eq!(seed_block(&[0, 4], &unallocated, 1), 4);
        assert_eq!(seed_block(&[0, 3], &unallocated, 1), 1);
        assert_eq!(seed_block(&[], &unallocated, 1), 1);
    }

    #[test]
    fn test_unconnected_room_is_filled_with_no_pre_block() {
        // 0 -> 1 and 3 -> 2: once {0, 1} is placed nothing links to chip 0,
        // so its last core goes to the source b3 rather than the lower b2
        let model = graph(4, &[(0, 1, 1), (3, 2, 1)]);
        let board = GreedyComms::new(3, None).unwrap().allocate(&model, 2).unwrap();
        assert_eq!(
            board.block_location(BlockId(3)),
            Some(BlockLocation { chip: 0, core: 2 })
        );
        assert_eq!(
            board.block_location(BlockId(2)),
            Some(BlockLocation { chip: 1, core: 0 })
        );
    }

    #[test]
    fn test_clusters_stay_together() {
        // Two chains {0 -> 2} and {1 -> 3}; greedy order would split both
        let model = graph(4, &[(0, 2, 8), (1, 3, 8)]);
        let board = GreedyComms::new(2, None).unwrap().allocate(&model, 2).unwrap();
        assert_eq!(chip_of(&board, 0), chip_of(&board, 2));
        assert_eq!(chip_of(&board, 1), chip_of(&board, 3));
        assert_ne!(chip_of(&board, 0), chip_of(&board, 1));
    }

    #[test]
    fn test_strongest_link_wins_and_ties_go_to_lowest_index() {
        // 0 -> 1 (2 axons), 0 -> 2 (5 axons), 0 -> 3 (5 axons)
        let model = graph(4, &[(0, 1, 2), (0, 2, 5), (0, 3, 5)]);
        let board = GreedyComms::new(2, None).unwrap().allocate(&model, 2).unwrap();
        assert_eq!(chip_of(&board, 0), 0);
        assert_eq!(chip_of(&board, 2), 0);
        assert_eq!(chip_of(&board, 3), 1);
        assert_eq!(chip_of(&board, 1), 1);
    }

    #[test]
    fn test_rates_steer_placement() {
        // 0 -> 1 and 0 -> 2 with equal axon counts; rates make 0 -> 2 dominant
        let mut model = Model::new();
        let mut b0 = Block::new("b0", 2);
        let mut b1 = Block::new("b1", 1);
        let mut b2 = Block::new("b2", 1);
        let in1 = b1.add_synapse(model.new_synapse("b1_in", 1));
        let in2 = b2.add_synapse(model.new_synapse("b2_in", 1));
        b0.add_axon(Axon::new("b0->b1", in1, 1).with_compartment_map(vec![0, -1]));
        b0.add_axon(Axon::new("b0->b2", in2, 1).with_compartment_map(vec![-1, 0]));
        for block in [b0, b1, b2] {
            model.add_block(block).unwrap();
        }

        let mut rates = BlockRates::new();
        rates.insert(BlockId(0), ndarray::array![1.0, 50.0]);
        rates.insert(BlockId(1), ndarray::array![0.0]);
        rates.insert(BlockId(2), ndarray::array![0.0]);
        let board = GreedyComms::new(2, Some(rates))
            .unwrap()
            .allocate(&model, 2)
            .unwrap();
        assert_eq!(chip_of(&board, 0), chip_of(&board, 2));
        assert_ne!(chip_of(&board, 0), chip_of(&board, 1));
    }

    #[test]
    fn test_budget_checked_when_opening_chip() {
        let model = graph(3, &[]);
        assert_eq!(
            GreedyComms::new(1, None).unwrap().allocate(&model, 2).unwrap_err(),
            AllocError::ChipBudgetExceeded { n_chips: 2 }
        );
    }

    #[test]
    fn test_missing_rates_fail_before_placement() {
        let model = graph(2, &[(0, 1, 1)]);
        let allocator = GreedyComms::new(2, Some(BlockRates::new())).unwrap();
        assert_eq!(
            allocator.allocate(&model, 1).unwrap_err(),
            AllocError::MissingBlockRates(BlockId(0))
        );
    }

    #[test]
    fn test_epsilon_edge_counts_as_affinity() {
        let mut conns: BlockConns = vec![Default::default(); 3];
        conns[0].insert(2, CONNECTION_EPSILON);
        let unallocated: BTreeSet<usize> = [1, 2].into_iter().collect();
        assert_eq!(most_connected_block(&conns, &[0], &unallocated), Some(2));
        assert_eq!(most_connected_block(&conns, &[1], &[2].into()), None);
    }
}
