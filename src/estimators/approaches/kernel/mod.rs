// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod bandwidth; // selectors hns, hos, hmns, hste, hstt, hscv, hldpi
pub mod kde;
mod kernel; // kernel family, moments and Gaussian derivatives
pub mod tkde;

pub use bandwidth::{Bandwidth, BandwidthMethod, BandwidthOptions};
pub use kde::{Kde, KdeConfig};
pub use kernel::*; // re-export Kernel, KernelStats
pub use tkde::{Tkde, TkdeConfig};
