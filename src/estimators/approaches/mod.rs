// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod common_nd;
pub mod kernel;
pub mod transform;

// Unified re-exports so tests and users can import
// kdetools::estimators::approaches::* ergonomically.
pub use common_nd::{Dataset, KdeData, gridcount};
pub use kernel::{Bandwidth, BandwidthMethod, BandwidthOptions, Kde, KdeConfig, Kernel, Tkde, TkdeConfig};
pub use transform::{LevelCrossings, TrData, TrDataOptions};
