// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
The `Allocator` trait and the placement steps every strategy shares.

A strategy only decides *which chip* a block goes to. Putting the block on a
fresh core of that chip, collapsing its configuration records and attaching
inputs and probes is the same for all of them and lives here.
*/

use neuroplace_config::{AllocatorConfig, Strategy};
use neuroplace_hardware::{Block, Board, Chip, Model};
use tracing::{debug, info};

use crate::capacity::check_block_fits;
use crate::cfgs::{core_compartment_cfgs, core_stdp_pre_cfgs, core_vth_cfgs};
use crate::error::AllocResult;
use crate::greedy::Greedy;
use crate::greedy_comms::GreedyComms;
use crate::round_robin::RoundRobin;
use crate::traffic::BlockRates;

/// A placement strategy: maps a model's blocks onto at most `n_chips` chips.
///
/// Implementations never return a partial board; any failure aborts the call.
pub trait Allocator: Send + Sync {
    fn allocate<'m>(&self, model: &'m Model, n_chips: usize) -> AllocResult<Board<'m>>;

    /// Short strategy name used in log lines
    fn name(&self) -> &'static str;
}

/// Place `block` on a new core of `chip` and fill in the core's configs.
///
/// Fails before touching the chip if the block cannot fit on one core.
pub fn block_to_new_core<'m>(block: &'m Block, chip: &mut Chip<'m>) -> AllocResult<()> {
    check_block_fits(block)?;

    let chip_index = chip.index();
    let core = chip.new_core();
    core.add_block(block);

    let (compartment_cfgs, compartment_cfg_idxs) = core_compartment_cfgs(core)?;
    for cfg in compartment_cfgs {
        core.add_compartment_cfg(cfg);
    }
    core.set_compartment_cfg_idxs(compartment_cfg_idxs);

    let (vth_cfgs, vth_cfg_idxs) = core_vth_cfgs(core)?;
    for cfg in vth_cfgs {
        core.add_vth_cfg(cfg);
    }
    core.set_vth_cfg_idxs(vth_cfg_idxs);

    for synapse in &block.synapses {
        core.add_synapse(synapse);
    }

    let (stdp_pre_cfgs, stdp_pre_cfg_idxs) = core_stdp_pre_cfgs(core)?;
    for cfg in stdp_pre_cfgs {
        core.add_stdp_pre_cfg(cfg);
    }
    core.set_stdp_pre_cfg_idxs(stdp_pre_cfg_idxs);

    debug!(
        "Placed {} on chip {} core {} ({} compartment cfgs, {} vth cfgs, {} trace cfgs)",
        block,
        chip_index,
        core.index(),
        core.compartment_cfgs().len(),
        core.vth_cfgs().len(),
        core.stdp_pre_cfgs().len()
    );
    Ok(())
}

/// Attach every model input to the board, in model order
pub fn input_to_board<'m>(model: &'m Model, board: &mut Board<'m>) {
    for input in model.inputs() {
        board.add_input(input);
    }
}

/// Attach every model probe to the board, in model order
pub fn probes_to_board<'m>(model: &'m Model, board: &mut Board<'m>) {
    for probe in model.probes() {
        board.add_probe(probe);
    }
}

/// Build the strategy named in the configuration.
///
/// `block_rates` only affects the communication-aware strategy.
pub fn build_allocator(
    config: &AllocatorConfig,
    block_rates: Option<BlockRates>,
) -> AllocResult<Box<dyn Allocator>> {
    let allocator: Box<dyn Allocator> = match config.strategy {
        Strategy::Greedy => Box::new(Greedy::new(config.cores_per_chip)?),
        Strategy::RoundRobin => Box::new(RoundRobin::with_cores_per_chip(config.cores_per_chip)?),
        Strategy::GreedyComms => Box::new(GreedyComms::new(config.cores_per_chip, block_rates)?),
    };
    info!(
        "Built {} allocator ({} cores per chip)",
        allocator.name(),
        config.cores_per_chip
    );
    Ok(allocator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AllocError;
    use neuroplace_hardware::{Axon, BlockId, Input, Probe, MAX_COMPARTMENTS};

    #[test]
    fn test_block_to_new_core_fills_configs() {
        let mut model = Model::new();
        let mut block = Block::new("a", 3);
        block.compartment.decay_u = vec![1, 1, 2];
        let mut syn = model.new_synapse("a_in", 3);
        syn.enable_learning(4, 2.0);
        block.add_synapse(syn);
        model.add_block(block).unwrap();

        let mut board = Board::new();
        block_to_new_core(&model.blocks()[0], board.new_chip()).unwrap();

        let core = &board.chips()[0].cores()[0];
        assert_eq!(core.blocks().len(), 1);
        assert_eq!(core.compartment_cfgs().len(), 2);
        assert_eq!(core.compartment_cfg_idxs(), &[vec![0, 0, 1]]);
        assert_eq!(core.vth_cfgs().len(), 1);
        assert_eq!(core.synapses().len(), 1);
        assert_eq!(core.stdp_pre_cfgs().len(), 1);
        assert_eq!(core.stdp_pre_cfg_idxs(), &[Some(0)]);
    }

    #[test]
    fn test_oversize_block_leaves_chip_untouched() {
        let mut model = Model::new();
        model
            .add_block(Block::new("big", MAX_COMPARTMENTS + 1))
            .unwrap();
        let mut board = Board::new();
        let chip = board.new_chip();
        let err = block_to_new_core(&model.blocks()[0], chip).unwrap_err();
        assert!(matches!(err, AllocError::BlockTooLarge { .. }));
        assert_eq!(chip.n_cores(), 0);
    }

    #[test]
    fn test_inputs_and_probes_keep_model_order() {
        let mut model = Model::new();
        model.add_input(Input { label: "in0".into(), n_neurons: 2 });
        model.add_input(Input { label: "in1".into(), n_neurons: 3 });
        let a = model.add_block(Block::new("a", 1)).unwrap();
        model.add_probe(Probe { label: "p".into(), target: Some(a) });

        let mut board = Board::new();
        input_to_board(&model, &mut board);
        probes_to_board(&model, &mut board);
        let labels: Vec<_> = board.inputs().iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["in0", "in1"]);
        assert_eq!(board.probes()[0].target, Some(BlockId(0)));
    }

    #[test]
    fn test_build_allocator_follows_strategy() {
        let mut config = AllocatorConfig::default();
        for (strategy, name) in [
            (Strategy::Greedy, "greedy"),
            (Strategy::RoundRobin, "round_robin"),
            (Strategy::GreedyComms, "greedy_comms"),
        ] {
            config.strategy = strategy;
            assert_eq!(build_allocator(&config, None).unwrap().name(), name);
        }

        config.cores_per_chip = 0;
        config.strategy = Strategy::Greedy;
        assert!(matches!(
            build_allocator(&config, None),
            Err(AllocError::InvalidCoresPerChip { requested: 0, .. })
        ));
    }

    #[test]
    fn test_boxed_allocator_places_chain() {
        let mut model = Model::new();
        let mut a = Block::new("a", 1);
        let mut b = Block::new("b", 1);
        let b_in = b.add_synapse(model.new_synapse("b_in", 1));
        a.add_axon(Axon::new("a->b", b_in, 1));
        model.add_block(a).unwrap();
        model.add_block(b).unwrap();

        let config = AllocatorConfig::default();
        let board = build_allocator(&config, None)
            .unwrap()
            .allocate(&model, 1)
            .unwrap();
        assert_eq!(board.n_chips(), 1);
        assert_eq!(board.n_cores(), 2);
    }
}
