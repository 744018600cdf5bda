// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # kdetools
//!
//! Kernel density estimation with automatic bandwidth selection, binned FFT
//! evaluation, transformation estimators and Gaussian transforms estimated
//! from level-crossing intensities.
//!
//! ## Quick Start
//!
//! ```rust
//! use kdetools::estimators::density::Density;
//! use kdetools::estimators::traits::DensityEstimator;
//! use kdetools::estimators::approaches::kernel::Kernel;
//! use ndarray::array;
//!
//! let data = array![0.75, 0.73, 0.94, 0.08, 2.32, 1.10, 0.77, 0.60, 1.37, 1.75];
//! let kde = Density::kde(data, Kernel::Gaussian, 0.5).unwrap();
//!
//! // Density on the default grid of 128 points
//! let f = kde.eval_grid(&[]).unwrap().value;
//! assert_eq!(f.shape(), &[128]);
//! ```
//!
//! ## Features
//!
//! | Component | Contents |
//! |-----------|----------|
//! | Kernels | Epanechnikov, biweight, triweight (radial and product), rectangular, triangular, Gaussian, Laplace, logistic |
//! | Bandwidth selectors | hns, hos, hmns, hste, hstt, hscv, hldpi |
//! | Estimators | fixed and adaptive KDE, transformation KDE |
//! | Evaluation | direct at points or on grids, binned FFT grids |
//! | Transforms | Gaussian transform from level-crossing intensities |
//!
//! ## Architecture
//!
//! The library follows a layered architecture:
//!
//! 1. **Public API Layer**: The `Density` factory and the `DensityEstimator` trait
//! 2. **Estimation Approaches**: Kernel estimators, bandwidth selectors and transforms
//! 3. **Core Infrastructure**: Datasets, linear binning, diagnostics
//! 4. **Numerical Utilities**: Percentiles, FFT convolution, smoothing splines, interpolation
//!
//! ## Diagnostics
//!
//! Non-fatal conditions (non-converged iterations, boundary optima, suspicious
//! transforms) never abort a computation. They are returned next to the value
//! in an [`Estimate`] and logged through the `log` facade.

pub mod error;
pub mod estimators;

pub use error::{KdeError, Result};
pub use estimators::approaches::{
    Bandwidth, BandwidthMethod, BandwidthOptions, Dataset, Kde, KdeConfig, Kernel, LevelCrossings,
    Tkde, TkdeConfig, TrData, TrDataOptions,
};
pub use estimators::density::Density;
pub use estimators::diagnostics::{Diagnostic, Estimate};
pub use estimators::traits::DensityEstimator;
