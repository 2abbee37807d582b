// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Hardware capacity limits.
//!
//! | Limit | Value |
//! |-------|-------|
//! | Cores per chip | 128 |
//! | Compartments per core | 1024 |

/// Maximum number of cores a single chip provides.
pub const MAX_CORES_PER_CHIP: usize = 128;

/// Maximum number of compartments a single core can hold.
pub const MAX_COMPARTMENTS: usize = 1024;

/// Default `cores_per_chip` for allocators (use the whole chip).
pub const DEFAULT_CORES_PER_CHIP: usize = MAX_CORES_PER_CHIP;
