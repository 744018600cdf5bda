// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Transformation Kernel Density Estimation
//!
//! Skewed, positive data are often easier to smooth after a power or log
//! transform. Every axis `k` is mapped through
//!
//! ```text
//! t(x; L) = sign(L)·x^L   for L ≠ 0
//! t(x; 0) = ln x
//! ```
//!
//! a [`Kde`] is built on the transformed samples, and the density is carried
//! back with the Jacobian of the transform:
//!
//! f_X(x) = f_Y(t(x)) ∏_k |t'_k(x_k)|,   |t'(x; L)| = |L|·x^(L-1),   |t'(x; 0)| = 1/x
//!
//! Axes with `L = 1` are left untouched, so an all-ones transform reproduces
//! the plain estimate.

use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis, IxDyn};

use super::kde::{Kde, KdeConfig, default_limits, regrid};
use crate::error::{KdeError, Result};
use crate::estimators::approaches::common_nd::{Dataset, KdeData};
use crate::estimators::diagnostics::{Diagnostic, Estimate};
use crate::estimators::traits::{DensityEstimator, coerce_points, meshgrid_points};
use crate::estimators::utils::stats::linspace;

/// Largest jump between neighbouring density values before the transform is suspected of blowing up.
const SPIKE_THRESHOLD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct TkdeConfig {
    /// Settings of the estimate in transformed coordinates.
    ///
    /// `xmin` and `xmax` are given in data coordinates.
    pub kde: KdeConfig,
    /// Transform exponents, one per axis or a single shared one; `None` means no transform.
    pub l2: Option<Array1<f64>>,
}

impl TkdeConfig {
    pub fn with_kde(mut self, kde: KdeConfig) -> Self {
        self.kde = kde;
        self
    }

    pub fn with_l2(mut self, l2: Array1<f64>) -> Self {
        self.l2 = Some(l2);
        self
    }
}

fn forward(x: f64, l2: f64) -> f64 {
    if l2 == 0.0 {
        x.ln()
    } else if l2 == 1.0 {
        x
    } else {
        l2.signum() * x.powf(l2)
    }
}

fn backward(t: f64, l2: f64) -> f64 {
    if l2 == 0.0 {
        t.exp()
    } else if l2 == 1.0 {
        t
    } else {
        (l2.signum() * t).powf(1.0 / l2)
    }
}

/// `|t'(x)|` of one axis.
fn jacobian(x: f64, l2: f64) -> f64 {
    if l2 == 0.0 {
        1.0 / x
    } else {
        l2.abs() * x.powf(l2 - 1.0)
    }
}

/// Kernel density estimator in power- or log-transformed coordinates.
#[derive(Debug, Clone)]
pub struct Tkde {
    /// Estimate on the transformed samples.
    tkde: Kde,
    /// Untransformed samples.
    dataset: Dataset,
    /// Per-axis exponents, `None` when no axis is transformed.
    l2: Option<Array1<f64>>,
    xmin: Array1<f64>,
    xmax: Array1<f64>,
}

impl Tkde {
    pub fn new(data: impl Into<KdeData>, config: TkdeConfig) -> Result<Self> {
        Self::from_dataset(Dataset::new(data)?, config)
    }

    pub fn from_dataset(dataset: Dataset, config: TkdeConfig) -> Result<Self> {
        let d = dataset.dim();
        let l2 = match config.l2 {
            None => None,
            Some(v) if v.len() == 1 => Some(Array1::from_elem(d, v[0])),
            Some(v) if v.len() == d => Some(v),
            Some(v) => {
                return Err(KdeError::DimensionMismatch {
                    expected: d,
                    got: v.len(),
                });
            }
        };
        if let Some(l2) = &l2 {
            if l2.iter().any(|v| !v.is_finite()) {
                return Err(KdeError::InvalidInput("transform exponents must be finite".into()));
            }
        }

        let (mut xmin, mut xmax) = default_limits(&dataset)?;
        if let Some(v) = &config.kde.xmin {
            xmin = broadcast_limit(v, d)?;
        }
        if let Some(v) = &config.kde.xmax {
            xmax = broadcast_limit(v, d)?;
        }

        let Some(l2) = l2 else {
            let inner = KdeConfig {
                xmin: Some(xmin.clone()),
                xmax: Some(xmax.clone()),
                ..config.kde
            };
            return Ok(Tkde {
                tkde: Kde::from_dataset(dataset.clone(), inner)?,
                dataset,
                l2: None,
                xmin,
                xmax,
            });
        };

        let amin = dataset.min();
        for k in 0..d {
            if l2[k] != 1.0 {
                xmin[k] = xmin[k].max(amin[k] / 100.0);
            }
        }
        for k in 0..d {
            if l2[k] != 1.0 && !(amin[k] > 0.0) {
                return Err(KdeError::InvalidInput(format!(
                    "transformed axis {k} requires strictly positive data"
                )));
            }
        }

        let tdata = dataset.map_dims(|k, x| forward(x, l2[k]))?;
        let mut tmin = Array1::zeros(d);
        let mut tmax = Array1::zeros(d);
        for k in 0..d {
            let (a, b) = (forward(xmin[k], l2[k]), forward(xmax[k], l2[k]));
            tmin[k] = a.min(b);
            tmax[k] = a.max(b);
        }
        log::debug!("tkde: transformed box {tmin} ..= {tmax}");
        let inner = KdeConfig {
            xmin: Some(tmin),
            xmax: Some(tmax),
            ..config.kde
        };
        Ok(Tkde {
            tkde: Kde::from_dataset(tdata, inner)?,
            dataset,
            l2: Some(l2),
            xmin,
            xmax,
        })
    }

    /// The estimator working on the transformed samples.
    pub fn inner(&self) -> &Kde {
        &self.tkde
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn l2(&self) -> Option<&Array1<f64>> {
        self.l2.as_ref()
    }

    pub fn xmin(&self) -> &Array1<f64> {
        &self.xmin
    }

    pub fn xmax(&self) -> &Array1<f64> {
        &self.xmax
    }

    /// Axes the fast grid is computed on: the inner default axes mapped back to data coordinates, ascending.
    pub fn fast_axes(&self) -> Vec<Array1<f64>> {
        let targs = self.tkde.default_axes();
        match &self.l2 {
            None => targs,
            Some(l2) => targs
                .iter()
                .enumerate()
                .map(|(k, axis)| {
                    let mut back = axis.mapv(|t| backward(t, l2[k]));
                    if back.len() > 1 && back[0] > back[back.len() - 1] {
                        back.invert_axis(Axis(0));
                    }
                    back
                })
                .collect(),
        }
    }

    /// Multiply the transformed-space density by the Jacobian at the data-space `points`.
    ///
    /// `row_len` is the length of the last grid axis; jumps are only measured
    /// between neighbours within a row of that length.
    fn scale_pdf(
        &self,
        mut pdf: Array1<f64>,
        points: ArrayView2<'_, f64>,
        row_len: usize,
    ) -> Estimate<Array1<f64>> {
        let Some(l2) = &self.l2 else {
            return Estimate::new(pdf);
        };
        for (k, &v) in l2.iter().enumerate() {
            if v == 1.0 {
                continue;
            }
            for (f, &x) in pdf.iter_mut().zip(points.row(k).iter()) {
                *f *= jacobian(x, v);
            }
        }
        let mut diagnostics = Vec::new();
        let max_jump = max_row_jump(&pdf, row_len);
        if max_jump > SPIKE_THRESHOLD {
            diagnostics.push(Diagnostic::PowerTransformSpikes { max_jump }.emit());
        }
        Estimate::with_diagnostics(pdf, diagnostics)
    }

    /// Direct evaluation at data-space `points` laid out in rows of `row_len`.
    fn eval_rows(&self, points: ArrayView2<'_, f64>, row_len: usize) -> Result<Estimate<Array1<f64>>> {
        let points = coerce_points(points, self.dim())?;
        let Some(l2) = &self.l2 else {
            return self.tkde.eval_points(points.view());
        };
        let tpoints = Array2::from_shape_fn(points.dim(), |(k, j)| forward(points[(k, j)], l2[k]));
        let tf = self.tkde.eval_points(tpoints.view())?;
        let mut scaled = self.scale_pdf(tf.value, points.view(), row_len);
        let mut diagnostics = tf.diagnostics;
        diagnostics.append(&mut scaled.diagnostics);
        Ok(Estimate::with_diagnostics(scaled.value, diagnostics))
    }
}

/// Largest absolute difference between neighbours inside consecutive rows of `row_len` values.
fn max_row_jump(values: &Array1<f64>, row_len: usize) -> f64 {
    let Some(flat) = values.as_slice() else {
        return 0.0;
    };
    flat.chunks(row_len.max(1))
        .flat_map(|row| row.windows(2).map(|w| (w[1] - w[0]).abs()))
        .fold(0.0, f64::max)
}

fn broadcast_limit(v: &Array1<f64>, d: usize) -> Result<Array1<f64>> {
    match v.len() {
        1 => Ok(Array1::from_elem(d, v[0])),
        len if len == d => Ok(v.clone()),
        len => Err(KdeError::DimensionMismatch {
            expected: d,
            got: len,
        }),
    }
}

impl DensityEstimator for Tkde {
    fn dim(&self) -> usize {
        self.dataset.dim()
    }

    fn default_axes(&self) -> Vec<Array1<f64>> {
        let inc = self.tkde.inc();
        (0..self.dim())
            .map(|k| linspace(self.xmin[k], self.xmax[k], inc))
            .collect()
    }

    fn eval_points(&self, points: ArrayView2<'_, f64>) -> Result<Estimate<Array1<f64>>> {
        // A list of points is a single row.
        self.eval_rows(points, usize::MAX)
    }

    fn eval_grid(&self, axes: &[Array1<f64>]) -> Result<Estimate<ArrayD<f64>>> {
        let axes = self.resolve_axes(axes)?;
        let points = meshgrid_points(&axes);
        let shape: Vec<usize> = axes.iter().map(|a| a.len()).collect();
        let row_len = shape.last().copied().unwrap_or(1);
        let values = self.eval_rows(points.view(), row_len)?;
        let diagnostics = values.diagnostics;
        let grid = values
            .value
            .into_shape_with_order(IxDyn(&shape))
            .map_err(|e| KdeError::InvalidInput(e.to_string()))?;
        Ok(Estimate::with_diagnostics(grid, diagnostics))
    }

    /// Fast grid in transformed coordinates, mapped back to the data axes.
    ///
    /// With no `axes` the result lies on [`Tkde::fast_axes`]; otherwise it is
    /// interpolated onto `axes` with zero fill (one or two dimensions).
    fn eval_grid_fast(&self, axes: &[Array1<f64>]) -> Result<Estimate<ArrayD<f64>>> {
        let Some(l2) = &self.l2 else {
            return self.tkde.eval_grid_fast(axes);
        };
        if !axes.is_empty() && axes.len() != self.dim() {
            return Err(KdeError::DimensionMismatch {
                expected: self.dim(),
                got: axes.len(),
            });
        }
        if !axes.is_empty() && self.dim() > 2 {
            return Err(KdeError::UnsupportedInterpolation { dim: self.dim() });
        }
        let tf = self.tkde.eval_grid_fast(&[])?.value;
        let targs = self.tkde.default_axes();
        let mut args: Vec<Array1<f64>> = targs
            .iter()
            .enumerate()
            .map(|(k, axis)| axis.mapv(|t| backward(t, l2[k])))
            .collect();

        let shape = tf.shape().to_vec();
        let points = meshgrid_points(&args);
        let flat = Array1::from_iter(tf.iter().copied());
        let row_len = shape.last().copied().unwrap_or(1);
        let scaled = self.scale_pdf(flat, points.view(), row_len);
        let diagnostics = scaled.diagnostics;
        let mut f = scaled
            .value
            .into_shape_with_order(shape)
            .map_err(|e| KdeError::InvalidInput(e.to_string()))?;

        for (k, axis) in args.iter_mut().enumerate() {
            if axis.len() > 1 && axis[0] > axis[axis.len() - 1] {
                axis.invert_axis(Axis(0));
                f.invert_axis(Axis(k));
            }
        }
        if axes.is_empty() {
            return Ok(Estimate::with_diagnostics(f, diagnostics));
        }
        Ok(Estimate::with_diagnostics(regrid(&f, &args, axes)?, diagnostics))
    }
}
