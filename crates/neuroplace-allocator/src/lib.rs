// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # Neuroplace Allocator
//!
//! Places the blocks of a [`Model`](neuroplace_hardware::Model) onto the
//! chips and cores of a [`Board`](neuroplace_hardware::Board).
//!
//! ## Strategies
//! - [`Greedy`]: fill chips in block order (fewest chips)
//! - [`RoundRobin`]: block `t` on chip `t mod n_chips` (widest spread)
//! - [`GreedyComms`]: fill chips with the blocks that talk to each other most
//!
//! Every strategy runs the same per-core steps once a block lands: one new
//! core per block, then deduplication of compartment, threshold and trace
//! configuration records into the core's shared slots.
//!
//! ## Example
//!
//! ```rust,no_run
//! use neuroplace_allocator::{Allocator, Greedy};
//! use neuroplace_hardware::{Block, Model};
//!
//! let mut model = Model::new();
//! model.add_block(Block::new("layer0", 100)).unwrap();
//! let board = Greedy::new(2).unwrap().allocate(&model, 1).unwrap();
//! assert_eq!(board.n_cores(), 1);
//! ```

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod allocator;
pub mod capacity;
pub mod cfgs;
pub mod error;
pub mod greedy;
pub mod greedy_comms;
pub mod round_robin;
pub mod traffic;

pub use allocator::{block_to_new_core, build_allocator, input_to_board, probes_to_board, Allocator};
pub use capacity::{check_block_fits, check_cores_per_chip};
pub use cfgs::{compute_cfgs, core_compartment_cfgs, core_stdp_pre_cfgs, core_vth_cfgs, CfgTable};
pub use error::{AllocError, AllocResult};
pub use greedy::Greedy;
pub use greedy_comms::GreedyComms;
pub use round_robin::RoundRobin;
pub use traffic::{
    compute_block_conns, ens_to_block_rates, measure_interchip_conns, no_pre_blocks,
    total_traffic, BlockConns, BlockRates, EnsembleRates, InterchipStats, CONNECTION_EPSILON,
};
