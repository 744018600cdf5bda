// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error type shared by every fallible operation in the crate.
//!
//! Errors are reserved for caller-side misuse and invalid configuration.
//! Data-quality problems and non-convergence are not errors; they travel as
//! [`Diagnostic`](crate::estimators::diagnostics::Diagnostic) values next to
//! the computed result.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum KdeError {
    #[error("Unknown kernel '{0}'.")]
    UnknownKernel(String),

    #[error("Not implemented: {0}.")]
    NotImplemented(String),

    #[error("Dimension mismatch: expected {expected}, got {got}.")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid bandwidth: {0}.")]
    InvalidBandwidth(String),

    #[error("Bandwidth matrix is not positive definite.")]
    NotPositiveDefinite,

    #[error("Data in dimension {dim} lies outside the range of the grid.")]
    DataOutsideGrid { dim: usize },

    #[error("Percentile {0} must lie in [0, 100].")]
    PercentileOutOfRange(f64),

    #[error("Insufficient data: got {got} samples, need at least {min}.")]
    InsufficientData { got: usize, min: usize },

    #[error("Kernel '{kernel}' is not supported in {dim} dimensions.")]
    UnsupportedKernelDimension { kernel: String, dim: usize },

    #[error("Interpolation onto custom axes is not supported in {dim} dimensions.")]
    UnsupportedInterpolation { dim: usize },

    #[error("Invalid input: {0}.")]
    InvalidInput(String),
}

pub type Result<T> = std::result::Result<T, KdeError>;
