// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

pub mod fft;
pub mod interpolate;
pub mod linalg;
pub mod spline;
pub mod stats;
