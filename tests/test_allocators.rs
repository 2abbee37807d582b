// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! End-to-end placement tests across all strategies.
//!
//! These tests build small models through the public API and check the
//! placement guarantees every strategy makes.

use neuroplace::prelude::*;
use neuroplace::config::AllocatorConfig;
use neuroplace::hardware::{BlockLocation, MAX_COMPARTMENTS};

/// `n` one-compartment blocks chained b0 -> b1 -> ... with `n_axons` per link
fn chain(n: usize, n_axons: usize) -> Model {
    let mut model = Model::new();
    let mut blocks: Vec<Block> = (0..n).map(|i| Block::new(format!("b{i}"), 1)).collect();
    let targets: Vec<SynapseId> = blocks
        .iter_mut()
        .enumerate()
        .map(|(i, block)| block.add_synapse(model.new_synapse(format!("b{i}_in"), n_axons)))
        .collect();
    for i in 1..n {
        blocks[i - 1].add_axon(Axon::new(format!("b{}->b{i}", i - 1), targets[i], n_axons));
    }
    for block in blocks {
        model.add_block(block).unwrap();
    }
    model
}

fn all_strategies(cores_per_chip: usize) -> Vec<Box<dyn Allocator>> {
    [Strategy::Greedy, Strategy::RoundRobin, Strategy::GreedyComms]
        .into_iter()
        .map(|strategy| {
            let config = AllocatorConfig {
                strategy,
                cores_per_chip,
                n_chips: 1,
            };
            build_allocator(&config, None).unwrap()
        })
        .collect()
}

#[test]
fn test_every_block_lands_once_within_core_limit() {
    let model = chain(9, 2);
    for allocator in all_strategies(4) {
        let board = allocator.allocate(&model, 9).unwrap();
        let mut placed: Vec<BlockId> = board.placed_blocks().map(|(_, b)| b.id()).collect();
        placed.sort();
        assert_eq!(placed, (0..9).map(BlockId).collect::<Vec<_>>(), "{}", allocator.name());
        assert!(board.chips().iter().all(|c| c.n_cores() <= 4), "{}", allocator.name());
    }
}

#[test]
fn test_greedy_chip_count_is_ceiling() {
    for (n_blocks, cores_per_chip, expected) in [(1, 1, 1), (5, 2, 3), (8, 4, 2), (9, 4, 3)] {
        let model = chain(n_blocks, 1);
        let board = Greedy::new(cores_per_chip)
            .unwrap()
            .allocate(&model, n_blocks)
            .unwrap();
        assert_eq!(board.n_chips(), expected);
    }
}

#[test]
fn test_round_robin_spreads_blocks() {
    let model = chain(10, 1);
    let board = RoundRobin::new().allocate(&model, 4).unwrap();
    for t in 0..10u32 {
        assert_eq!(board.block_location(BlockId(t)).unwrap().chip, t as usize % 4);
    }
}

#[test]
fn test_budget_error_below_block_count() {
    let n_blocks = 6;
    let model = chain(n_blocks, 1);
    for allocator in all_strategies(1) {
        for n_chips in 0..n_blocks {
            assert!(
                matches!(
                    allocator.allocate(&model, n_chips),
                    Err(AllocError::ChipBudgetExceeded { .. })
                ),
                "{} with {} chips",
                allocator.name(),
                n_chips
            );
        }
        for n_chips in [n_blocks, n_blocks + 3] {
            let board = allocator.allocate(&model, n_chips).unwrap();
            assert_eq!(board.n_chips(), n_blocks, "{}", allocator.name());
        }
    }
}

#[test]
fn test_oversize_block_always_rejected() {
    let mut model = chain(2, 1);
    model.add_block(Block::new("huge", MAX_COMPARTMENTS + 1)).unwrap();
    for allocator in all_strategies(128) {
        assert!(matches!(
            allocator.allocate(&model, 8),
            Err(AllocError::BlockTooLarge { n_compartments, .. }) if n_compartments == MAX_COMPARTMENTS + 1
        ));
    }
}

#[test]
fn test_greedy_comms_chain_split_and_merge() {
    let model = chain(2, 3);

    let split = GreedyComms::new(1, None).unwrap().allocate(&model, 2).unwrap();
    assert_eq!(split.n_chips(), 2);

    let merged = GreedyComms::new(2, None).unwrap().allocate(&model, 2).unwrap();
    assert_eq!(merged.n_chips(), 1);
    assert_eq!(
        merged.block_location(BlockId(1)),
        Some(BlockLocation { chip: 0, core: 1 })
    );
}

#[test]
fn test_greedy_comms_beats_greedy_on_interleaved_chains() {
    // Two chains whose blocks are interleaved in model order: 0->2->4 and 1->3->5
    let mut model = Model::new();
    let mut blocks: Vec<Block> = (0..6).map(|i| Block::new(format!("b{i}"), 1)).collect();
    let targets: Vec<SynapseId> = blocks
        .iter_mut()
        .enumerate()
        .map(|(i, block)| block.add_synapse(model.new_synapse(format!("b{i}_in"), 4)))
        .collect();
    for (src, dst) in [(0, 2), (2, 4), (1, 3), (3, 5)] {
        blocks[src].add_axon(Axon::new(format!("{src}->{dst}"), targets[dst], 4));
    }
    for block in blocks {
        model.add_block(block).unwrap();
    }

    let greedy = Greedy::new(3).unwrap().allocate(&model, 2).unwrap();
    let comms = GreedyComms::new(3, None).unwrap().allocate(&model, 2).unwrap();
    let greedy_stats = measure_interchip_conns(&greedy, None).unwrap();
    let comms_stats = measure_interchip_conns(&comms, None).unwrap();

    assert_eq!(comms_stats.interchip, 0.0);
    assert!(greedy_stats.interchip > comms_stats.interchip);
    assert!((greedy_stats.total() - comms_stats.total()).abs() < 1e-9);
}

#[test]
fn test_inputs_and_probes_attached_to_board() {
    let mut model = chain(3, 1);
    model.add_input(Input {
        label: "stimulus".to_string(),
        n_neurons: 10,
    });
    model.add_probe(Probe {
        label: "spikes".to_string(),
        target: Some(BlockId(2)),
    });

    for allocator in all_strategies(2) {
        let board = allocator.allocate(&model, 3).unwrap();
        assert_eq!(board.inputs().len(), 1);
        assert_eq!(board.probes().len(), 1);
        let summary = board.summary();
        assert_eq!(summary.n_inputs, 1);
        assert_eq!(summary.n_probes, 1);
    }
}

#[test]
fn test_shared_configs_collapse_per_core() {
    let mut model = Model::new();
    let mut block = Block::new("mixed", 10);
    for i in 0..10 {
        block.compartment.decay_u[i] = (i % 3) as i32;
        block.compartment.vth[i] = if i % 2 == 0 { 64.0 } else { 640.0 };
    }
    model.add_block(block).unwrap();

    let board = Greedy::default().allocate(&model, 1).unwrap();
    let core = &board.chips()[0].cores()[0];
    assert_eq!(core.compartment_cfgs().len(), 3);
    assert_eq!(core.compartment_cfg_idxs()[0].len(), 10);
    assert_eq!(core.vth_cfgs().len(), 2);
    assert_eq!(core.vth_cfgs()[core.vth_cfg_idxs()[0][1]].vth, 10);
}

#[test]
fn test_board_summary_serializes() {
    let model = chain(3, 1);
    let board = Greedy::new(2).unwrap().allocate(&model, 2).unwrap();
    let json = serde_json::to_value(board.summary()).unwrap();
    assert_eq!(json["chips"].as_array().unwrap().len(), 2);
    assert_eq!(json["chips"][0]["cores"][1]["labels"][0], "b1");
}
