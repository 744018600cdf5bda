// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

// Common N-D dataset utilities shared by the kernel estimators and the bandwidth selectors

pub mod dataset;
pub mod gridcount;

pub use dataset::{Dataset, KdeData};
pub use gridcount::gridcount;
