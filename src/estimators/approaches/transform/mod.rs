// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod level_crossings;
pub mod trdata;

pub use level_crossings::LevelCrossings;
pub use trdata::{TrData, TrDataOptions};
