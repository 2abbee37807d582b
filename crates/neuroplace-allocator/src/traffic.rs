// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Inter-block traffic estimation.

`compute_block_conns` turns a list of blocks into a directed weight table
`conns[i][j]`: how much block `i` sends to block `j` through its axons.
Without rates the weight is the axon count; with per-compartment firing
rates it is the summed rate of the source compartments that actually connect.

Every connected pair starts at [`CONNECTION_EPSILON`], so an edge whose
source is currently silent is still visible to the communication-aware
allocator.
*/

use std::collections::BTreeMap;

use ahash::AHashMap;
use ndarray::{Array1, Axis};
use neuroplace_hardware::{Axon, Block, BlockId, Board, HardwareError, Model, SynapseId};
use serde::Serialize;
use tracing::debug;

use crate::error::{AllocError, AllocResult};

/// Starting weight of every connected pair
pub const CONNECTION_EPSILON: f64 = 1e-16;

/// `conns[i]` maps target block index `j` to the traffic weight from `i` to `j`
pub type BlockConns = Vec<BTreeMap<usize, f64>>;

/// Per-block firing rates, one entry per compartment
pub type BlockRates = AHashMap<BlockId, Array1<f64>>;

/// Per-ensemble firing rates, one entry per neuron
pub type EnsembleRates = AHashMap<String, Array1<f64>>;

/// Convert ensemble rates into rates for the blocks each ensemble was split into
pub fn ens_to_block_rates(model: &Model, ens_rates: &EnsembleRates) -> AllocResult<BlockRates> {
    let mut block_rates = BlockRates::new();

    for (name, rates) in ens_rates {
        let ensemble = model
            .ensemble(name)
            .ok_or_else(|| AllocError::UnknownEnsemble(name.clone()))?;
        if rates.len() != ensemble.n_neurons {
            return Err(AllocError::EnsembleRateLengthMismatch {
                ensemble: name.clone(),
                expected: ensemble.n_neurons,
                actual: rates.len(),
            });
        }

        for &block_id in &ensemble.out_blocks {
            let block = model
                .block(block_id)
                .ok_or(HardwareError::UnknownBlock(block_id))?;

            match model.block_compartments(block_id) {
                None => {
                    if ensemble.out_blocks.len() != 1 {
                        return Err(AllocError::AmbiguousEnsembleRates {
                            ensemble: name.clone(),
                            block: block_id,
                            n_blocks: ensemble.out_blocks.len(),
                        });
                    }
                    if block.n_compartments() != ensemble.n_neurons {
                        return Err(AllocError::RateLengthMismatch {
                            block: block_id,
                            expected: block.n_compartments(),
                            actual: rates.len(),
                        });
                    }
                    block_rates.insert(block_id, rates.clone());
                }
                Some(comp_idxs) => {
                    if let Some(&index) = comp_idxs.iter().find(|&&k| k >= rates.len()) {
                        return Err(AllocError::CompartmentIndexOutOfRange {
                            block: block_id,
                            index,
                            n_neurons: rates.len(),
                        });
                    }
                    block_rates.insert(block_id, rates.select(Axis(0), comp_idxs));
                }
            }
        }
    }

    Ok(block_rates)
}

/// Compute the directed traffic between every pair of connected blocks.
///
/// Block indices are positions in `blocks`. Self connections are ignored.
pub fn compute_block_conns(
    blocks: &[&Block],
    block_rates: Option<&BlockRates>,
) -> AllocResult<BlockConns> {
    let mut synapse_block_map: AHashMap<SynapseId, usize> = AHashMap::new();
    for (i, block) in blocks.iter().enumerate() {
        for synapse in &block.synapses {
            if let Some(&first) = synapse_block_map.get(&synapse.id()) {
                return Err(AllocError::DuplicateSynapse {
                    synapse: synapse.id(),
                    first,
                    second: i,
                });
            }
            synapse_block_map.insert(synapse.id(), i);
        }
    }

    let mut block_conns: BlockConns = vec![BTreeMap::new(); blocks.len()];
    for (i, block_i) in blocks.iter().enumerate() {
        for axon in &block_i.axons {
            let j = *synapse_block_map
                .get(&axon.target)
                .ok_or_else(|| AllocError::DanglingAxon {
                    block: i,
                    axon: axon.label.clone(),
                    synapse: axon.target,
                })?;

            if i == j {
                continue;
            }

            let weight = match block_rates {
                None => axon.n_axons as f64,
                Some(rates) => rate_weight(block_i, axon, rates)?,
            };
            *block_conns[i].entry(j).or_insert(CONNECTION_EPSILON) += weight;
        }
    }

    debug!(
        "Traffic between {} blocks: {} connected pairs",
        blocks.len(),
        block_conns.iter().map(BTreeMap::len).sum::<usize>()
    );

    Ok(block_conns)
}

/// Summed rate of the source compartments this axon carries
fn rate_weight(block: &Block, axon: &Axon, block_rates: &BlockRates) -> AllocResult<f64> {
    let rates = block_rates
        .get(&block.id())
        .ok_or(AllocError::MissingBlockRates(block.id()))?;
    let n_compartments = block.n_compartments();
    if rates.len() != n_compartments {
        return Err(AllocError::RateLengthMismatch {
            block: block.id(),
            expected: n_compartments,
            actual: rates.len(),
        });
    }
    Ok(rates
        .iter()
        .enumerate()
        .filter(|&(k, _)| axon.map_axon(k) >= 0)
        .map(|(_, rate)| rate)
        .sum())
}

/// Indices of blocks that receive no traffic from any other block
pub fn no_pre_blocks(block_conns: &BlockConns) -> Vec<usize> {
    let mut incoming = vec![0.0_f64; block_conns.len()];
    for targets in block_conns {
        for (&j, &weight) in targets {
            incoming[j] += weight;
        }
    }
    incoming
        .iter()
        .enumerate()
        .filter(|&(_, &total)| total == 0.0)
        .map(|(j, _)| j)
        .collect()
}

/// Sum of every pairwise weight in a traffic table
pub fn total_traffic(block_conns: &BlockConns) -> f64 {
    block_conns.iter().flat_map(|targets| targets.values()).sum()
}

/// Placement quality: traffic that stays on a chip vs traffic that crosses chips
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct InterchipStats {
    pub interchip: f64,
    pub intrachip: f64,
    pub interchip_pairs: Vec<(BlockId, BlockId)>,
    pub intrachip_pairs: Vec<(BlockId, BlockId)>,
}

impl InterchipStats {
    pub fn total(&self) -> f64 {
        self.interchip + self.intrachip
    }

    /// Share of the traffic that crosses chip boundaries (0 when there is no traffic)
    pub fn interchip_fraction(&self) -> f64 {
        let total = self.total();
        if total > 0.0 {
            self.interchip / total
        } else {
            0.0
        }
    }
}

/// Measure how much of the model's traffic crosses chip boundaries on a board
pub fn measure_interchip_conns(
    board: &Board<'_>,
    block_rates: Option<&BlockRates>,
) -> AllocResult<InterchipStats> {
    let placed: Vec<_> = board.placed_blocks().collect();
    let blocks: Vec<&Block> = placed.iter().map(|&(_, block)| block).collect();
    let block_conns = compute_block_conns(&blocks, block_rates)?;

    let mut stats = InterchipStats::default();
    for (i, targets) in block_conns.iter().enumerate() {
        let chip_i = placed[i].0.chip;
        for (&j, &weight) in targets {
            if i == j {
                continue;
            }
            let pair = (blocks[i].id(), blocks[j].id());
            if placed[j].0.chip == chip_i {
                stats.intrachip += weight;
                stats.intrachip_pairs.push(pair);
            } else {
                stats.interchip += weight;
                stats.interchip_pairs.push(pair);
            }
        }
    }

    Ok(stats)
}
