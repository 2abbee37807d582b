// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! # neuroplace-observability
//!
//! Logging setup shared by the neuroplace tools, with per-crate debug flags.
//!
//! ## Features
//! - `file-logging`: JSON log file next to the console output

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod init;

pub use cli::*;
pub use init::*;

/// Known neuroplace crate names for debug flags
pub const KNOWN_CRATES: &[&str] = &[
    "neuroplace",
    "neuroplace-hardware",
    "neuroplace-allocator",
    "neuroplace-config",
    "neuroplace-observability",
];
