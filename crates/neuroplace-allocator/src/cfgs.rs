// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

/*!
Per-core configuration deduplication.

A core has a handful of configuration slots per record kind. After a block
lands on a core, every compartment (or synapse) record is collapsed onto the
distinct values and each element gets the index of its slot.

Slots are numbered in first-seen order: blocks in core order, elements in
block order.
*/

use std::hash::Hash;

use ahash::AHashMap;
use neuroplace_hardware::{
    threshold_to_mantissa_exponent, trace_magnitude_to_int_frac, Block, CompartmentConfig, Core,
    TraceConfig, VthConfig,
};

use crate::error::AllocResult;

/// Deduplicated records plus, per block on the core, element -> slot index
pub type CfgTable<C> = (Vec<C>, Vec<Vec<usize>>);

/// Deduplicate the records `list_cfgs` produces for every block on `core`
pub fn compute_cfgs<C, F>(core: &Core<'_>, mut list_cfgs: F) -> AllocResult<CfgTable<C>>
where
    C: Clone + Eq + Hash,
    F: FnMut(&Block) -> AllocResult<Vec<C>>,
{
    let mut cfgs: Vec<C> = Vec::new();
    let mut slots: AHashMap<C, usize> = AHashMap::new();
    let mut cfg_idxs = Vec::with_capacity(core.blocks().len());

    for block in core.blocks() {
        let plist = list_cfgs(*block)?;
        let mut idxs = Vec::with_capacity(plist.len());
        for cfg in plist {
            let slot = *slots.entry(cfg.clone()).or_insert_with(|| {
                cfgs.push(cfg);
                cfgs.len() - 1
            });
            idxs.push(slot);
        }
        cfg_idxs.push(idxs);
    }

    Ok((cfgs, cfg_idxs))
}

/// Compute all compartment configs needed for a core
pub fn core_compartment_cfgs(core: &Core<'_>) -> AllocResult<CfgTable<CompartmentConfig>> {
    compute_cfgs(core, |block| {
        let c = &block.compartment;
        Ok((0..c.n_compartments())
            .map(|i| CompartmentConfig {
                decay_u: c.decay_u[i],
                decay_v: c.decay_v[i],
                refract_delay: c.refract_delay[i],
                enable_noise: c.enable_noise[i],
            })
            .collect())
    })
}

/// Compute all threshold configs needed for a core
pub fn core_vth_cfgs(core: &Core<'_>) -> AllocResult<CfgTable<VthConfig>> {
    compute_cfgs(core, |block| {
        block
            .compartment
            .vth
            .iter()
            .map(|&vth| -> AllocResult<VthConfig> {
                let (mantissa, _) = threshold_to_mantissa_exponent(vth)?;
                Ok(VthConfig { vth: mantissa })
            })
            .collect()
    })
}

/// Compute the pre-synaptic trace configs for the learning synapses on a core.
///
/// The index list follows `core.synapses()`; non-learning synapses get `None`.
pub fn core_stdp_pre_cfgs(core: &Core<'_>) -> AllocResult<(Vec<TraceConfig>, Vec<Option<usize>>)> {
    let mut cfgs: Vec<TraceConfig> = Vec::new();
    let mut slots: AHashMap<TraceConfig, usize> = AHashMap::new();
    let mut cfg_idxs = Vec::with_capacity(core.synapses().len());

    for synapse in core.synapses() {
        if !synapse.learning {
            cfg_idxs.push(None);
            continue;
        }
        let (spike_int, spike_frac) = trace_magnitude_to_int_frac(synapse.tracing_mag)?;
        let trace_cfg = TraceConfig {
            tau: synapse.tracing_tau,
            spike_int,
            spike_frac,
        };
        let slot = *slots.entry(trace_cfg).or_insert_with(|| {
            cfgs.push(trace_cfg);
            cfgs.len() - 1
        });
        cfg_idxs.push(Some(slot));
    }

    Ok((cfgs, cfg_idxs))
}
