// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, Array2, ArrayD, ArrayView2, CowArray, Ix2, IxDyn};

use crate::error::{KdeError, Result};
use crate::estimators::diagnostics::Estimate;

pub trait DensityEstimator {
    /// Dimensionality `D` of the estimated density.
    fn dim(&self) -> usize;

    /// The evaluation axes used when none are given: `inc` points spanning `[xmin, xmax]` per dimension.
    fn default_axes(&self) -> Vec<Array1<f64>>;

    /// Density at the columns of the `D×M` array `points`.
    ///
    /// A single point passed as a `1×D` row is accepted as well.
    fn eval_points(&self, points: ArrayView2<'_, f64>) -> Result<Estimate<Array1<f64>>>;

    /// Density on the grid spanned by `axes`, shaped `(len(axes[0]), …, len(axes[D-1]))`.
    ///
    /// An empty slice evaluates on [`default_axes`](Self::default_axes).
    fn eval_grid(&self, axes: &[Array1<f64>]) -> Result<Estimate<ArrayD<f64>>> {
        let axes = self.resolve_axes(axes)?;
        let points = meshgrid_points(&axes);
        let shape: Vec<usize> = axes.iter().map(|a| a.len()).collect();
        let values = self.eval_points(points.view())?;
        let diagnostics = values.diagnostics;
        let grid = values
            .value
            .into_shape_with_order(IxDyn(&shape))
            .map_err(|e| KdeError::InvalidInput(e.to_string()))?;
        Ok(Estimate::with_diagnostics(grid, diagnostics))
    }

    /// Binned FFT approximation of [`eval_grid`](Self::eval_grid).
    fn eval_grid_fast(&self, axes: &[Array1<f64>]) -> Result<Estimate<ArrayD<f64>>>;

    /// `axes`, or the default axes when empty; checks there is one axis per dimension.
    fn resolve_axes(&self, axes: &[Array1<f64>]) -> Result<Vec<Array1<f64>>> {
        if axes.is_empty() {
            return Ok(self.default_axes());
        }
        if axes.len() != self.dim() {
            return Err(KdeError::DimensionMismatch {
                expected: self.dim(),
                got: axes.len(),
            });
        }
        Ok(axes.to_vec())
    }
}

/// All grid nodes of `axes` as columns of a `D×M` array, last axis varying fastest.
pub fn meshgrid_points(axes: &[Array1<f64>]) -> Array2<f64> {
    let d = axes.len();
    let m: usize = axes.iter().map(|a| a.len()).product();
    let mut points = Array2::zeros((d, m));
    for col in 0..m {
        let mut rest = col;
        for k in (0..d).rev() {
            let len = axes[k].len();
            points[(k, col)] = axes[k][rest % len];
            rest /= len;
        }
    }
    points
}

/// `points` as a `d×M` array, reshaping a lone `1×d` row into a column.
pub(crate) fn coerce_points<'a>(
    points: ArrayView2<'a, f64>,
    d: usize,
) -> Result<CowArray<'a, f64, Ix2>> {
    let (rows, cols) = points.dim();
    if rows == d {
        return Ok(CowArray::from(points));
    }
    if rows == 1 && cols == d {
        return Ok(CowArray::from(points.t().to_owned()));
    }
    Err(KdeError::DimensionMismatch {
        expected: d,
        got: rows,
    })
}
