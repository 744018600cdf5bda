// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod approaches;
pub mod density;
pub mod diagnostics;
pub mod traits;
pub mod utils;

pub use diagnostics::{Diagnostic, Estimate};
pub use traits::DensityEstimator;
