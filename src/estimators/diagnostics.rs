// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Non-fatal conditions raised while estimating.
//!
//! A computation that hits one of these still returns its full result. The
//! conditions are collected in an [`Estimate`] so callers can inspect them,
//! and each one is also logged once through the `log` facade at the point
//! where it arises.

use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// A fixed-point bandwidth iteration stopped at `maxit` before reaching tolerance.
    NotConverged {
        method: &'static str,
        dim: usize,
        iterations: usize,
    },
    /// Cross-validation picked the smallest candidate bandwidth.
    OptimumBelowSearchRange { dim: usize, h: f64 },
    /// Cross-validation picked the largest candidate bandwidth.
    OptimumAboveSearchRange { dim: usize, h: f64 },
    /// The Jacobian-scaled density of a power transform jumps sharply.
    PowerTransformSpikes { max_jump: f64 },
    /// The fitted transform is still not strictly increasing after the repair loop.
    NotSufficientlySmoothed { attempts: usize },
    CdfExceedsOne,
    /// The sampled pdf holds too little mass to place levels reliably.
    SparselySampled { max_cdf: f64 },
    LowestLevelNearZero,
    HighestLevelNearHundred,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::NotConverged {
                method,
                dim,
                iterations,
            } => write!(
                f,
                "{method}: maximum number of iterations ({iterations}) reached in dimension {dim}; \
                 the bandwidth may be inaccurate"
            ),
            Diagnostic::OptimumBelowSearchRange { dim, h } => write!(
                f,
                "optimum is probably lower than hs={h} in dimension {dim}"
            ),
            Diagnostic::OptimumAboveSearchRange { dim, h } => write!(
                f,
                "optimum is probably higher than hs={h} in dimension {dim}"
            ),
            Diagnostic::PowerTransformSpikes { max_jump } => write!(
                f,
                "numerical problems may have occurred due to the power transformation \
                 (largest jump in density {max_jump}); check the shape of the pdf"
            ),
            Diagnostic::NotSufficientlySmoothed { attempts } => write!(
                f,
                "the crossing intensity is not sufficiently smoothed; the transform is not \
                 strictly increasing after {attempts} repair attempts"
            ),
            Diagnostic::CdfExceedsOne => write!(f, "the sum of the pdf mass exceeds one"),
            Diagnostic::SparselySampled { max_cdf } => write!(
                f,
                "the pdf is too sparsely sampled (total mass {max_cdf} < 0.95)"
            ),
            Diagnostic::LowestLevelNearZero => {
                write!(f, "the lowest level is close to 0%")
            }
            Diagnostic::HighestLevelNearHundred => {
                write!(f, "the highest level is close to 100%")
            }
        }
    }
}

impl Diagnostic {
    /// Log the condition and hand it back for collection.
    pub(crate) fn emit(self) -> Self {
        log::warn!("{self}");
        self
    }
}

/// A computed value together with the non-fatal conditions met on the way.
#[derive(Debug, Clone)]
pub struct Estimate<T> {
    pub value: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Estimate<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            diagnostics: Vec::new(),
        }
    }

    pub fn with_diagnostics(value: T, diagnostics: Vec<Diagnostic>) -> Self {
        Self { value, diagnostics }
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Apply `f` to the value, keeping the diagnostics.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Estimate<U> {
        Estimate {
            value: f(self.value),
            diagnostics: self.diagnostics,
        }
    }

    /// Drop the diagnostics and return the bare value.
    pub fn into_value(self) -> T {
        self.value
    }
}
