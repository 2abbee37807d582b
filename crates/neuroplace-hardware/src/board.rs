// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Placement output: a board of chips, each an ordered list of cores.
//!
//! A [`Board`] borrows the [`crate::Model`] it was allocated from; cores hold
//! references to their blocks and synapses plus the deduplicated
//! configuration records and the index mappings into them.

use serde::Serialize;

use crate::configs::{CompartmentConfig, TraceConfig, VthConfig};
use crate::ids::{BlockId, SynapseId};
use crate::model::{Block, Input, Probe, Synapse};

/// Hardware core holding one or more blocks and their configuration slots
#[derive(Debug, Clone, Default)]
pub struct Core<'m> {
    index: usize,
    blocks: Vec<&'m Block>,
    synapses: Vec<&'m Synapse>,
    compartment_cfgs: Vec<CompartmentConfig>,
    vth_cfgs: Vec<VthConfig>,
    stdp_pre_cfgs: Vec<TraceConfig>,
    /// Per block (same order as `blocks`): compartment -> `compartment_cfgs` slot
    compartment_cfg_idxs: Vec<Vec<usize>>,
    /// Per block (same order as `blocks`): compartment -> `vth_cfgs` slot
    vth_cfg_idxs: Vec<Vec<usize>>,
    /// Per synapse (same order as `synapses`): `stdp_pre_cfgs` slot, if learning
    stdp_pre_cfg_idxs: Vec<Option<usize>>,
}

impl<'m> Core<'m> {
    fn new(index: usize) -> Self {
        Self {
            index,
            ..Self::default()
        }
    }

    /// Position of this core on its chip
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn add_block(&mut self, block: &'m Block) {
        self.blocks.push(block);
    }

    pub fn add_synapse(&mut self, synapse: &'m Synapse) {
        self.synapses.push(synapse);
    }

    pub fn add_compartment_cfg(&mut self, cfg: CompartmentConfig) -> usize {
        self.compartment_cfgs.push(cfg);
        self.compartment_cfgs.len() - 1
    }

    pub fn add_vth_cfg(&mut self, cfg: VthConfig) -> usize {
        self.vth_cfgs.push(cfg);
        self.vth_cfgs.len() - 1
    }

    pub fn add_stdp_pre_cfg(&mut self, cfg: TraceConfig) -> usize {
        self.stdp_pre_cfgs.push(cfg);
        self.stdp_pre_cfgs.len() - 1
    }

    pub fn set_compartment_cfg_idxs(&mut self, idxs: Vec<Vec<usize>>) {
        self.compartment_cfg_idxs = idxs;
    }

    pub fn set_vth_cfg_idxs(&mut self, idxs: Vec<Vec<usize>>) {
        self.vth_cfg_idxs = idxs;
    }

    pub fn set_stdp_pre_cfg_idxs(&mut self, idxs: Vec<Option<usize>>) {
        self.stdp_pre_cfg_idxs = idxs;
    }

    pub fn blocks(&self) -> &[&'m Block] {
        &self.blocks
    }

    pub fn synapses(&self) -> &[&'m Synapse] {
        &self.synapses
    }

    pub fn compartment_cfgs(&self) -> &[CompartmentConfig] {
        &self.compartment_cfgs
    }

    pub fn vth_cfgs(&self) -> &[VthConfig] {
        &self.vth_cfgs
    }

    pub fn stdp_pre_cfgs(&self) -> &[TraceConfig] {
        &self.stdp_pre_cfgs
    }

    pub fn compartment_cfg_idxs(&self) -> &[Vec<usize>] {
        &self.compartment_cfg_idxs
    }

    pub fn vth_cfg_idxs(&self) -> &[Vec<usize>] {
        &self.vth_cfg_idxs
    }

    pub fn stdp_pre_cfg_idxs(&self) -> &[Option<usize>] {
        &self.stdp_pre_cfg_idxs
    }

    /// Trace config slot of a synapse on this core (`None` if absent or not learning)
    pub fn stdp_pre_cfg_idx(&self, synapse: SynapseId) -> Option<usize> {
        let pos = self.synapses.iter().position(|s| s.id() == synapse)?;
        self.stdp_pre_cfg_idxs.get(pos).copied().flatten()
    }

    /// Total compartments across all blocks on this core
    pub fn n_compartments(&self) -> usize {
        self.blocks.iter().map(|b| b.n_compartments()).sum()
    }
}

/// Chip: ordered cores, created on demand by the allocator
#[derive(Debug, Clone, Default)]
pub struct Chip<'m> {
    index: usize,
    cores: Vec<Core<'m>>,
}

impl<'m> Chip<'m> {
    /// Position of this chip on the board
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn new_core(&mut self) -> &mut Core<'m> {
        let index = self.cores.len();
        self.cores.push(Core::new(index));
        &mut self.cores[index]
    }

    pub fn cores(&self) -> &[Core<'m>] {
        &self.cores
    }

    #[inline]
    pub fn n_cores(&self) -> usize {
        self.cores.len()
    }
}

/// Where a block landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockLocation {
    pub chip: usize,
    pub core: usize,
}

/// Allocation result: chips plus the inputs and probes attached directly
#[derive(Debug, Clone, Default)]
pub struct Board<'m> {
    chips: Vec<Chip<'m>>,
    inputs: Vec<&'m Input>,
    probes: Vec<&'m Probe>,
}

impl<'m> Board<'m> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_chip(&mut self) -> &mut Chip<'m> {
        let index = self.chips.len();
        self.chips.push(Chip {
            index,
            cores: Vec::new(),
        });
        &mut self.chips[index]
    }

    pub fn add_input(&mut self, input: &'m Input) {
        self.inputs.push(input);
    }

    pub fn add_probe(&mut self, probe: &'m Probe) {
        self.probes.push(probe);
    }

    pub fn chips(&self) -> &[Chip<'m>] {
        &self.chips
    }

    pub fn chip(&self, index: usize) -> Option<&Chip<'m>> {
        self.chips.get(index)
    }

    pub fn chip_mut(&mut self, index: usize) -> Option<&mut Chip<'m>> {
        self.chips.get_mut(index)
    }

    pub fn inputs(&self) -> &[&'m Input] {
        &self.inputs
    }

    pub fn probes(&self) -> &[&'m Probe] {
        &self.probes
    }

    #[inline]
    pub fn n_chips(&self) -> usize {
        self.chips.len()
    }

    pub fn n_cores(&self) -> usize {
        self.chips.iter().map(Chip::n_cores).sum()
    }

    /// Every placed block with its location, in chip then core order
    pub fn placed_blocks(&self) -> impl Iterator<Item = (BlockLocation, &'m Block)> + '_ {
        self.chips.iter().flat_map(|chip| {
            chip.cores.iter().flat_map(move |core| {
                let location = BlockLocation {
                    chip: chip.index,
                    core: core.index,
                };
                core.blocks.iter().map(move |&block| (location, block))
            })
        })
    }

    pub fn block_location(&self, block: BlockId) -> Option<BlockLocation> {
        self.placed_blocks()
            .find(|(_, b)| b.id() == block)
            .map(|(location, _)| location)
    }

    pub fn summary(&self) -> BoardSummary {
        BoardSummary {
            n_inputs: self.inputs.len(),
            n_probes: self.probes.len(),
            chips: self
                .chips
                .iter()
                .map(|chip| ChipSummary {
                    index: chip.index,
                    cores: chip
                        .cores
                        .iter()
                        .map(|core| CoreSummary {
                            index: core.index,
                            blocks: core.blocks.iter().map(|b| b.id()).collect(),
                            labels: core.blocks.iter().map(|b| b.label.clone()).collect(),
                            n_compartments: core.n_compartments(),
                            n_synapses: core.synapses.len(),
                            n_compartment_cfgs: core.compartment_cfgs.len(),
                            n_vth_cfgs: core.vth_cfgs.len(),
                            n_stdp_pre_cfgs: core.stdp_pre_cfgs.len(),
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Owned, serializable digest of a [`Board`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardSummary {
    pub n_inputs: usize,
    pub n_probes: usize,
    pub chips: Vec<ChipSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChipSummary {
    pub index: usize,
    pub cores: Vec<CoreSummary>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoreSummary {
    pub index: usize,
    pub blocks: Vec<BlockId>,
    pub labels: Vec<String>,
    pub n_compartments: usize,
    pub n_synapses: usize,
    pub n_compartment_cfgs: usize,
    pub n_vth_cfgs: usize,
    pub n_stdp_pre_cfgs: usize,
}
