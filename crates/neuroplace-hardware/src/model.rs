// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Input graph consumed by the allocators.
//!
//! A [`Model`] is an arena: blocks get their [`BlockId`] from their position
//! and synapses get a [`SynapseId`] from [`Model::new_synapse`]. Axons refer
//! to their target synapse by id, which is how the allocator resolves the
//! block an axon projects into.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{HardwareError, HardwareResult};
use crate::ids::{BlockId, SynapseId};

/// Threshold used by [`Compartment::new`] (mantissa 1 at the fixed exponent).
pub const DEFAULT_VTH: f64 = 64.0;

/// Per-compartment parameters of a block, stored as parallel arrays.
///
/// Decays and refractory delays are already in hardware units; thresholds
/// are quantized when a block is placed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub decay_u: Vec<i32>,
    pub decay_v: Vec<i32>,
    pub refract_delay: Vec<i32>,
    pub enable_noise: Vec<bool>,
    pub vth: Vec<f64>,
}

impl Compartment {
    /// Create `n_compartments` compartments with zero decay, a refractory
    /// delay of 1, no noise, and [`DEFAULT_VTH`].
    pub fn new(n_compartments: usize) -> Self {
        Self {
            decay_u: vec![0; n_compartments],
            decay_v: vec![0; n_compartments],
            refract_delay: vec![1; n_compartments],
            enable_noise: vec![false; n_compartments],
            vth: vec![DEFAULT_VTH; n_compartments],
        }
    }

    #[inline]
    pub fn n_compartments(&self) -> usize {
        self.decay_u.len()
    }

    /// Set the same dynamics on every compartment
    pub fn configure_uniform(&mut self, decay_u: i32, decay_v: i32, refract_delay: i32, vth: f64) {
        self.decay_u.fill(decay_u);
        self.decay_v.fill(decay_v);
        self.refract_delay.fill(refract_delay);
        self.vth.fill(vth);
    }

    /// Check that every parameter array has one entry per compartment
    pub fn validate(&self) -> HardwareResult<()> {
        let expected = self.n_compartments();
        let lengths = [
            ("decay_v", self.decay_v.len()),
            ("refract_delay", self.refract_delay.len()),
            ("enable_noise", self.enable_noise.len()),
            ("vth", self.vth.len()),
        ];
        for (field, actual) in lengths {
            if actual != expected {
                return Err(HardwareError::CompartmentLengthMismatch {
                    field,
                    expected,
                    actual,
                });
            }
        }
        Ok(())
    }
}

/// Incoming connection record owned by exactly one block.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synapse {
    id: SynapseId,
    pub label: String,
    /// Number of input axons this synapse accepts
    pub n_axons: usize,
    #[serde(default)]
    pub learning: bool,
    #[serde(default)]
    pub tracing_tau: i32,
    #[serde(default)]
    pub tracing_mag: f64,
}

impl Synapse {
    #[inline]
    pub fn id(&self) -> SynapseId {
        self.id
    }

    /// Turn on pre-synaptic tracing with the given time constant and spike magnitude
    pub fn enable_learning(&mut self, tracing_tau: i32, tracing_mag: f64) {
        self.learning = true;
        self.tracing_tau = tracing_tau;
        self.tracing_mag = tracing_mag;
    }
}

/// Outgoing projection from a block into a target synapse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axon {
    pub label: String,
    pub target: SynapseId,
    pub n_axons: usize,
    /// Source compartment -> target axon index, `-1` for no connection.
    /// `None` means compartment `i` drives axon `i` for `i < n_axons`.
    #[serde(default)]
    pub compartment_map: Option<Vec<i32>>,
}

impl Axon {
    pub fn new(label: impl Into<String>, target: SynapseId, n_axons: usize) -> Self {
        Self {
            label: label.into(),
            target,
            n_axons,
            compartment_map: None,
        }
    }

    pub fn with_compartment_map(mut self, compartment_map: Vec<i32>) -> Self {
        self.compartment_map = Some(compartment_map);
        self
    }

    /// Target axon index for a source compartment, or `-1` if it does not connect
    pub fn map_axon(&self, compartment_idx: usize) -> i32 {
        match &self.compartment_map {
            Some(map) => map.get(compartment_idx).copied().unwrap_or(-1),
            None if compartment_idx < self.n_axons => compartment_idx as i32,
            None => -1,
        }
    }

    /// Map every compartment index of a source block of size `n_compartments`
    pub fn map_axons(&self, n_compartments: usize) -> Vec<i32> {
        (0..n_compartments).map(|i| self.map_axon(i)).collect()
    }
}

/// Group of compartments that must be placed on a single core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default = "unassigned_block_id")]
    id: BlockId,
    pub label: String,
    pub compartment: Compartment,
    #[serde(default)]
    pub synapses: Vec<Synapse>,
    #[serde(default)]
    pub axons: Vec<Axon>,
}

fn unassigned_block_id() -> BlockId {
    BlockId(u32::MAX)
}

impl Block {
    pub fn new(label: impl Into<String>, n_compartments: usize) -> Self {
        Self {
            id: unassigned_block_id(),
            label: label.into(),
            compartment: Compartment::new(n_compartments),
            synapses: Vec::new(),
            axons: Vec::new(),
        }
    }

    /// Id assigned by [`Model::add_block`]
    #[inline]
    pub fn id(&self) -> BlockId {
        self.id
    }

    #[inline]
    pub fn n_compartments(&self) -> usize {
        self.compartment.n_compartments()
    }

    pub fn add_synapse(&mut self, synapse: Synapse) -> SynapseId {
        let id = synapse.id();
        self.synapses.push(synapse);
        id
    }

    pub fn add_axon(&mut self, axon: Axon) {
        self.axons.push(axon);
    }

    pub fn synapse(&self, id: SynapseId) -> Option<&Synapse> {
        self.synapses.iter().find(|s| s.id() == id)
    }
}

impl std::fmt::Display for Block {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} '{}'", self.id, self.label)
    }
}

/// Off-chip input source, attached to the board as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Input {
    pub label: String,
    pub n_neurons: usize,
}

/// Output probe, attached to the board as-is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Probe {
    pub label: String,
    #[serde(default)]
    pub target: Option<BlockId>,
}

/// High-level neuron group whose output blocks receive its firing rates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ensemble {
    pub name: String,
    pub n_neurons: usize,
    pub out_blocks: Vec<BlockId>,
}

/// Input graph: ordered inputs, blocks and probes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Model {
    #[serde(default)]
    inputs: Vec<Input>,
    #[serde(default)]
    blocks: Vec<Block>,
    #[serde(default)]
    probes: Vec<Probe>,
    #[serde(default)]
    ensembles: Vec<Ensemble>,
    /// Compartment indices (within its ensemble) each split block represents
    #[serde(default)]
    block_comp_map: BTreeMap<BlockId, Vec<usize>>,
    #[serde(default)]
    next_synapse_id: u32,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a fresh synapse with a model-unique id
    pub fn new_synapse(&mut self, label: impl Into<String>, n_axons: usize) -> Synapse {
        let id = SynapseId(self.next_synapse_id);
        self.next_synapse_id += 1;
        Synapse {
            id,
            label: label.into(),
            n_axons,
            learning: false,
            tracing_tau: 0,
            tracing_mag: 0.0,
        }
    }

    pub fn add_input(&mut self, input: Input) {
        self.inputs.push(input);
    }

    /// Insert a block, assigning its [`BlockId`]
    ///
    /// # Errors
    ///
    /// Fails if the compartment arrays disagree in length or if a synapse was
    /// not issued by [`Model::new_synapse`].
    pub fn add_block(&mut self, mut block: Block) -> HardwareResult<BlockId> {
        self.check_block(&block)?;
        let id = BlockId(self.blocks.len() as u32);
        block.id = id;
        self.blocks.push(block);
        Ok(id)
    }

    pub fn add_probe(&mut self, probe: Probe) {
        self.probes.push(probe);
    }

    /// Register an ensemble and the blocks its neurons were split into
    pub fn add_ensemble(
        &mut self,
        name: impl Into<String>,
        n_neurons: usize,
        out_blocks: Vec<BlockId>,
    ) -> HardwareResult<()> {
        for &block in &out_blocks {
            if self.block(block).is_none() {
                return Err(HardwareError::UnknownBlock(block));
            }
        }
        self.ensembles.push(Ensemble {
            name: name.into(),
            n_neurons,
            out_blocks,
        });
        Ok(())
    }

    /// Record which ensemble neurons a block's compartments stand for
    pub fn set_block_compartments(
        &mut self,
        block: BlockId,
        compartment_idxs: Vec<usize>,
    ) -> HardwareResult<()> {
        let n_compartments = self
            .block(block)
            .ok_or(HardwareError::UnknownBlock(block))?
            .n_compartments();
        if compartment_idxs.len() != n_compartments {
            return Err(HardwareError::CompartmentLengthMismatch {
                field: "block_comp_map",
                expected: n_compartments,
                actual: compartment_idxs.len(),
            });
        }
        self.block_comp_map.insert(block, compartment_idxs);
        Ok(())
    }

    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn probes(&self) -> &[Probe] {
        &self.probes
    }

    pub fn ensembles(&self) -> &[Ensemble] {
        &self.ensembles
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.get(id.index())
    }

    pub fn ensemble(&self, name: &str) -> Option<&Ensemble> {
        self.ensembles.iter().find(|e| e.name == name)
    }

    pub fn block_compartments(&self, id: BlockId) -> Option<&[usize]> {
        self.block_comp_map.get(&id).map(Vec::as_slice)
    }

    pub fn n_blocks(&self) -> usize {
        self.blocks.len()
    }

    /// Rebuild the arena bookkeeping of a model that did not go through the
    /// builder API (e.g. a hand-written JSON file).
    ///
    /// Blocks take their positional ids and synapse ids continue after the
    /// largest id already present.
    pub fn reindex(&mut self) {
        for (idx, block) in self.blocks.iter_mut().enumerate() {
            block.id = BlockId(idx as u32);
        }
        let max_synapse = self
            .blocks
            .iter()
            .flat_map(|b| b.synapses.iter())
            .map(|s| s.id.0.saturating_add(1))
            .max()
            .unwrap_or(0);
        self.next_synapse_id = self.next_synapse_id.max(max_synapse);
    }

    /// Re-check a model that did not go through the builder API (e.g. loaded from JSON)
    pub fn validate(&self) -> HardwareResult<()> {
        for (idx, block) in self.blocks.iter().enumerate() {
            if block.id.index() != idx {
                return Err(HardwareError::UnknownBlock(block.id));
            }
            self.check_block(block)?;
        }
        for ensemble in &self.ensembles {
            if let Some(&missing) = ensemble.out_blocks.iter().find(|b| self.block(**b).is_none()) {
                return Err(HardwareError::UnknownBlock(missing));
            }
        }
        Ok(())
    }

    fn check_block(&self, block: &Block) -> HardwareResult<()> {
        block.compartment.validate()?;
        for synapse in &block.synapses {
            if synapse.id.0 >= self.next_synapse_id {
                return Err(HardwareError::ForeignSynapse(synapse.id));
            }
        }
        Ok(())
    }
}
