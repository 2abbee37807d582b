// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neuroplace - Neuromorphic Block Placement
//!
//! Maps a model's compartment blocks onto the chips and cores of a
//! neuromorphic board, then collapses each core's per-compartment parameters
//! onto the few shared configuration slots the hardware provides.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use neuroplace::prelude::*;
//!
//! let mut model = Model::new();
//! let mut pre = Block::new("pre", 100);
//! let mut post = Block::new("post", 100);
//! let post_in = post.add_synapse(model.new_synapse("post_in", 100));
//! pre.add_axon(Axon::new("pre->post", post_in, 100));
//! model.add_block(pre)?;
//! model.add_block(post)?;
//!
//! let board = GreedyComms::new(2, None)?.allocate(&model, 1)?;
//! assert_eq!(board.n_chips(), 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Feature Flags
//!
//! - **`observability`** (default): logging setup and debug flags
//! - **`file-logging`**: JSON log file output
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Foundation: neuroplace-hardware, neuroplace-config     │
//! │  (Model, Board, capacity, discretization, settings)     │
//! └─────────────────────────────────────────────────────────┘
//!                         ↓
//! ┌─────────────────────────────────────────────────────────┐
//! │  Algorithms: neuroplace-allocator                       │
//! │  (Greedy, RoundRobin, GreedyComms, dedup, traffic)      │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub use neuroplace_allocator as allocator;
pub use neuroplace_config as config;
pub use neuroplace_hardware as hardware;

#[cfg(feature = "observability")]
pub use neuroplace_observability as observability;

pub mod io;

/// Prelude - commonly used types and traits
pub mod prelude {
    pub use crate::allocator::{
        build_allocator, ens_to_block_rates, measure_interchip_conns, AllocError, AllocResult,
        Allocator, BlockRates, EnsembleRates, Greedy, GreedyComms, InterchipStats, RoundRobin,
    };
    pub use crate::config::{NeuroplaceConfig, Strategy};
    pub use crate::hardware::{
        Axon, Block, BlockId, Board, BoardSummary, Input, Model, Probe, Synapse, SynapseId,
    };
}
