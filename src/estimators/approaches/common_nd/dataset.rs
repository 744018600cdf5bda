// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};

use crate::error::{KdeError, Result};

/// Input data representation for density estimation
///
/// This enum allows the estimators to accept both 1D and 2D data arrays.
pub enum KdeData {
    /// One-dimensional data: Array1<f64> where each element is a sample
    OneDimensional(Array1<f64>),

    /// Multi-dimensional data laid out `D×N`: rows are dimensions, columns are samples
    MultiDimensional(Array2<f64>),
}

impl From<Array1<f64>> for KdeData {
    fn from(array: Array1<f64>) -> Self {
        KdeData::OneDimensional(array)
    }
}

impl From<Array2<f64>> for KdeData {
    fn from(array: Array2<f64>) -> Self {
        KdeData::MultiDimensional(array)
    }
}

impl From<Vec<f64>> for KdeData {
    fn from(values: Vec<f64>) -> Self {
        KdeData::OneDimensional(Array1::from(values))
    }
}

/// Shared `D×N` sample container used by every continuous estimator.
#[derive(Debug, Clone)]
pub struct Dataset {
    data: Array2<f64>,
}

impl Dataset {
    pub fn new(data: impl Into<KdeData>) -> Result<Self> {
        match data.into() {
            KdeData::OneDimensional(a) => Self::from_array1(a),
            KdeData::MultiDimensional(a) => Self::from_array2(a),
        }
    }

    pub fn from_array1(data: Array1<f64>) -> Result<Self> {
        let n = data.len();
        let a2 = data
            .into_shape_with_order((1, n))
            .map_err(|e| KdeError::InvalidInput(e.to_string()))?;
        Self::from_array2(a2)
    }

    /// Build from a `D×N` array (one dimension per row).
    pub fn from_array2(data: Array2<f64>) -> Result<Self> {
        let (d, n) = data.dim();
        if d == 0 || n == 0 {
            return Err(KdeError::InsufficientData { got: n, min: 1 });
        }
        if data.iter().any(|v| !v.is_finite()) {
            return Err(KdeError::InvalidInput("data contains non-finite values".into()));
        }
        Ok(Self { data })
    }

    /// Build from an `N×D` array (one sample per row).
    pub fn from_rows(samples: ArrayView2<'_, f64>) -> Result<Self> {
        Self::from_array2(samples.t().to_owned())
    }

    /// Number of dimensions `D`.
    pub fn dim(&self) -> usize {
        self.data.nrows()
    }

    /// Number of samples `N`.
    pub fn n(&self) -> usize {
        self.data.ncols()
    }

    /// Return a `D×N` view of the samples
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.data.view()
    }

    /// All samples of dimension `k`.
    pub fn row(&self, k: usize) -> ArrayView1<'_, f64> {
        self.data.row(k)
    }

    pub fn min(&self) -> Array1<f64> {
        self.data
            .map_axis(Axis(1), |r| r.iter().copied().fold(f64::INFINITY, f64::min))
    }

    pub fn max(&self) -> Array1<f64> {
        self.data
            .map_axis(Axis(1), |r| r.iter().copied().fold(f64::NEG_INFINITY, f64::max))
    }

    /// Apply `f(dim, value)` to every entry, producing a new dataset.
    pub fn map_dims(&self, f: impl Fn(usize, f64) -> f64) -> Result<Self> {
        let mapped = Array2::from_shape_fn(self.data.dim(), |(k, i)| f(k, self.data[(k, i)]));
        Self::from_array2(mapped)
    }

    pub fn into_inner(self) -> Array2<f64> {
        self.data
    }
}
