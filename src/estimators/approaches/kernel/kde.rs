// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Kernel Density Estimation
//!
//! ## Theoretical Background
//!
//! Given `N` samples `x_i ∈ R^D` and a bandwidth matrix `H`, the kernel
//! density estimate is
//!
//! f̂(x) = 1/(N·det H) ∑ K(H⁻¹(x - x_i)) / c_K(D)
//!
//! where `K` is the unnormalised kernel and `c_K(D)` its normaliser
//! ([`Kernel::norm_factor`]).
//!
//! ## Adaptive Estimation
//!
//! With a sensitivity `0 < α ≤ 1` every sample receives its own scale
//!
//! λ_i = (f̃(x_i) / g)^(-α),   g = exp((1/N) ∑ ln f̃(x_i))
//!
//! from a fixed-bandwidth pilot estimate `f̃`, so that the kernel widens in
//! sparse regions:
//!
//! f̂(x) = 1/(N·det H) ∑ λ_i^(-D) K(H⁻¹(x - x_i)/λ_i) / c_K(D)
//!
//! ## Fast Grid Evaluation
//!
//! [`DensityEstimator::eval_grid_fast`] bins the samples linearly onto the
//! default grid (`inc` nodes per axis over `[xmin, xmax]`), samples the kernel
//! on a periodic support of `2·inc` nodes per axis and convolves both through
//! FFT. The pilot scales `λ_i` are not used on this path.

use ndarray::{Array1, Array2, ArrayD, ArrayView2, Axis, Ix1, Ix2, IxDyn, Slice};

use super::bandwidth::{Bandwidth, BandwidthMethod, BandwidthOptions, select};
use super::kernel::Kernel;
use crate::error::{KdeError, Result};
use crate::estimators::approaches::common_nd::{Dataset, KdeData, gridcount};
use crate::estimators::diagnostics::{Diagnostic, Estimate};
use crate::estimators::traits::{DensityEstimator, coerce_points};
use crate::estimators::utils::fft::circular_convolve;
use crate::estimators::utils::interpolate::{interp1_fill, interp2_grid};
use crate::estimators::utils::linalg::{det, inv, is_positive_definite};
use crate::estimators::utils::stats::{linspace, robust_sigma};

/// Construction parameters of a [`Kde`].
#[derive(Debug, Clone, PartialEq)]
pub struct KdeConfig {
    /// Fixed bandwidth; selected with `method` when `None`.
    pub bandwidth: Option<Bandwidth>,
    pub kernel: Kernel,
    /// Selector used for missing or non-positive bandwidths.
    pub method: BandwidthMethod,
    pub bandwidth_options: BandwidthOptions,
    /// Adaptive sensitivity, `0` for a fixed bandwidth.
    pub alpha: f64,
    /// Lower corner of the default evaluation box.
    pub xmin: Option<Array1<f64>>,
    /// Upper corner of the default evaluation box.
    pub xmax: Option<Array1<f64>>,
    /// Number of default grid nodes per axis.
    pub inc: usize,
}

impl Default for KdeConfig {
    fn default() -> Self {
        Self {
            bandwidth: None,
            kernel: Kernel::Gaussian,
            method: BandwidthMethod::Hns,
            bandwidth_options: BandwidthOptions::default(),
            alpha: 0.0,
            xmin: None,
            xmax: None,
            inc: 128,
        }
    }
}

impl KdeConfig {
    pub fn with_bandwidth(mut self, bandwidth: impl Into<Bandwidth>) -> Self {
        self.bandwidth = Some(bandwidth.into());
        self
    }

    pub fn with_kernel(mut self, kernel: Kernel) -> Self {
        self.kernel = kernel;
        self
    }

    pub fn with_method(mut self, method: BandwidthMethod) -> Self {
        self.method = method;
        self
    }

    pub fn with_bandwidth_options(mut self, options: BandwidthOptions) -> Self {
        self.bandwidth_options = options;
        self
    }

    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// A length-1 vector applies to every dimension.
    pub fn with_xmin(mut self, xmin: Array1<f64>) -> Self {
        self.xmin = Some(xmin);
        self
    }

    /// A length-1 vector applies to every dimension.
    pub fn with_xmax(mut self, xmax: Array1<f64>) -> Self {
        self.xmax = Some(xmax);
        self
    }

    pub fn with_inc(mut self, inc: usize) -> Self {
        self.inc = inc;
        self
    }
}

/// Kernel density estimator over a fixed dataset.
///
/// Every derived quantity is computed in [`Kde::new`]; the estimator is
/// immutable afterwards.
#[derive(Debug, Clone)]
pub struct Kde {
    dataset: Dataset,
    kernel: Kernel,
    bandwidth: Bandwidth,
    inv_hs: Array2<f64>,
    /// `det(H)·N`
    norm_factor: f64,
    alpha: f64,
    lambda: Array1<f64>,
    xmin: Array1<f64>,
    xmax: Array1<f64>,
    inc: usize,
    diagnostics: Vec<Diagnostic>,
}

/// Resolved bandwidth with its inverse and determinant.
struct Smoothing {
    bandwidth: Bandwidth,
    inv_hs: Array2<f64>,
    deth: f64,
    diagnostics: Vec<Diagnostic>,
}

fn broadcast(v: &Array1<f64>, d: usize, what: &str) -> Result<Array1<f64>> {
    match v.len() {
        1 => Ok(Array1::from_elem(d, v[0])),
        len if len == d => Ok(v.clone()),
        len => Err(KdeError::InvalidInput(format!(
            "{what} has {len} entries for {d} dimensions"
        ))),
    }
}

/// Bandwidth vector for a single row, as chosen by `method`.
fn select_row(
    dataset: &Dataset,
    row: usize,
    kernel: Kernel,
    method: BandwidthMethod,
    opts: &BandwidthOptions,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<f64> {
    let data = dataset.row(row).insert_axis(Axis(0));
    let estimate = select(method, data, kernel, opts)?;
    diagnostics.extend(estimate.diagnostics);
    match estimate.value {
        Bandwidth::Scalar(h) => Ok(h),
        Bandwidth::Diagonal(h) => Ok(h[0]),
        Bandwidth::Matrix(h) => Ok(h[(0, 0)]),
    }
}

fn diagonal_smoothing(
    mut h: Array1<f64>,
    dataset: &Dataset,
    config: &KdeConfig,
    mut diagnostics: Vec<Diagnostic>,
) -> Result<Smoothing> {
    let d = dataset.dim();
    if h.len() != d {
        return Err(KdeError::DimensionMismatch {
            expected: d,
            got: h.len(),
        });
    }
    for k in 0..d {
        if h[k] <= 0.0 {
            h[k] = select_row(
                dataset,
                k,
                config.kernel,
                config.method,
                &config.bandwidth_options,
                &mut diagnostics,
            )?;
        }
    }
    if let Some(bad) = h.iter().find(|&&v| !(v > 0.0 && v.is_finite())) {
        return Err(KdeError::InvalidBandwidth(format!(
            "bandwidth entries must be positive and finite, got {bad}"
        )));
    }
    let inv_hs = Array2::from_diag(&h.mapv(|v| 1.0 / v));
    let deth = h.product();
    Ok(Smoothing {
        bandwidth: Bandwidth::Diagonal(h),
        inv_hs,
        deth,
        diagnostics,
    })
}

fn matrix_smoothing(h: Array2<f64>, diagnostics: Vec<Diagnostic>) -> Result<Smoothing> {
    let deth = det(h.view())?;
    if !(deth > 0.0) || !is_positive_definite(h.view()) {
        return Err(KdeError::NotPositiveDefinite);
    }
    let inv_hs = inv(h.view())?;
    Ok(Smoothing {
        bandwidth: Bandwidth::Matrix(h),
        inv_hs,
        deth,
        diagnostics,
    })
}

fn compute_smoothing(dataset: &Dataset, config: &KdeConfig) -> Result<Smoothing> {
    let d = dataset.dim();
    let (h, diagnostics) = match &config.bandwidth {
        Some(h) => (h.clone(), Vec::new()),
        None => {
            let estimate = select(
                config.method,
                dataset.view(),
                config.kernel,
                &config.bandwidth_options,
            )?;
            (estimate.value, estimate.diagnostics)
        }
    };
    match h {
        Bandwidth::Scalar(v) => {
            diagonal_smoothing(Array1::from_elem(d, v), dataset, config, diagnostics)
        }
        Bandwidth::Diagonal(v) if v.len() == 1 => {
            diagonal_smoothing(Array1::from_elem(d, v[0]), dataset, config, diagnostics)
        }
        Bandwidth::Diagonal(v) => diagonal_smoothing(v, dataset, config, diagnostics),
        Bandwidth::Matrix(m) if m.dim() == (1, 1) => {
            diagonal_smoothing(Array1::from_elem(d, m[(0, 0)]), dataset, config, diagnostics)
        }
        Bandwidth::Matrix(m) => {
            if m.dim() != (d, d) {
                return Err(KdeError::DimensionMismatch {
                    expected: d,
                    got: m.nrows(),
                });
            }
            matrix_smoothing(m, diagnostics)
        }
    }
}

/// Default evaluation box `min - 2σ ..= max + 2σ` with `σ = min(std, IQR/1.34)`.
pub(crate) fn default_limits(dataset: &Dataset) -> Result<(Array1<f64>, Array1<f64>)> {
    let d = dataset.dim();
    let mut xmin = dataset.min();
    let mut xmax = dataset.max();
    for k in 0..d {
        let offset = 2.0 * robust_sigma(dataset.row(k), 1.34)?;
        xmin[k] -= offset;
        xmax[k] += offset;
    }
    Ok((xmin, xmax))
}

impl Kde {
    pub fn new(data: impl Into<KdeData>, config: KdeConfig) -> Result<Self> {
        Self::from_dataset(Dataset::new(data)?, config)
    }

    pub fn from_dataset(dataset: Dataset, config: KdeConfig) -> Result<Self> {
        let d = dataset.dim();
        if !(config.alpha >= 0.0 && config.alpha.is_finite()) {
            return Err(KdeError::InvalidInput(format!(
                "alpha must be a finite non-negative number, got {}",
                config.alpha
            )));
        }
        if config.inc < 2 {
            return Err(KdeError::InvalidInput(
                "inc must be at least 2".into(),
            ));
        }
        let (mut xmin, mut xmax) = default_limits(&dataset)?;
        if let Some(v) = &config.xmin {
            xmin = broadcast(v, d, "xmin")?;
        }
        if let Some(v) = &config.xmax {
            xmax = broadcast(v, d, "xmax")?;
        }

        let smoothing = compute_smoothing(&dataset, &config)?;
        let n = dataset.n();
        let mut kde = Kde {
            kernel: config.kernel,
            bandwidth: smoothing.bandwidth,
            inv_hs: smoothing.inv_hs,
            norm_factor: smoothing.deth * n as f64,
            alpha: config.alpha,
            lambda: Array1::ones(n),
            xmin,
            xmax,
            inc: config.inc,
            diagnostics: smoothing.diagnostics,
            dataset,
        };

        if kde.alpha > 0.0 {
            let pilot = kde.eval_dataset();
            if pilot.iter().any(|&f| !(f > 0.0)) {
                return Err(KdeError::InvalidInput(
                    "pilot density vanishes at a sample; use a kernel with wider support".into(),
                ));
            }
            let log_mean = pilot.mapv(f64::ln).sum() / n as f64;
            let g = log_mean.exp();
            let alpha = kde.alpha;
            kde.lambda = pilot.mapv(|f| (f / g).powf(-alpha));
            log::debug!("adaptive kde: geometric mean pilot density {g:.6e}");
        }
        Ok(kde)
    }

    /// Fixed-bandwidth density at the samples themselves.
    fn eval_dataset(&self) -> Array1<f64> {
        let points = self.dataset.view();
        self.sum_kernels(points)
    }

    /// Unchecked `D×M` evaluation.
    ///
    /// The outer loop runs over the smaller of the samples and the points.
    fn sum_kernels(&self, points: ArrayView2<'_, f64>) -> Array1<f64> {
        let (d, m) = points.dim();
        let n = self.dataset.n();
        let data = self.dataset.view();
        let mut diff = vec![0.0; d];
        let mut t = vec![0.0; d];
        let mut contribution = |i: usize, j: usize| -> f64 {
            let lambda = self.lambda[i];
            for k in 0..d {
                diff[k] = (data[(k, i)] - points[(k, j)]) / lambda;
            }
            for r in 0..d {
                t[r] = (0..d).map(|c| self.inv_hs[(r, c)] * diff[c]).sum();
            }
            self.kernel.eval_point(&t) / lambda.powi(d as i32)
        };
        let mut result = Array1::<f64>::zeros(m);
        if m < n {
            for j in 0..m {
                result[j] = (0..n).map(|i| contribution(i, j)).sum::<f64>();
            }
        } else {
            for i in 0..n {
                for j in 0..m {
                    result[j] += contribution(i, j);
                }
            }
        }
        result / (self.norm_factor * self.kernel.norm_factor(d))
    }

    pub fn kernel(&self) -> Kernel {
        self.kernel
    }

    /// The bandwidth in use, either per dimension or as a full matrix.
    pub fn bandwidth(&self) -> &Bandwidth {
        &self.bandwidth
    }

    pub fn inv_bandwidth(&self) -> &Array2<f64> {
        &self.inv_hs
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    /// Per-sample adaptive scales, all ones for a fixed bandwidth.
    pub fn lambda(&self) -> &Array1<f64> {
        &self.lambda
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn n(&self) -> usize {
        self.dataset.n()
    }

    pub fn xmin(&self) -> &Array1<f64> {
        &self.xmin
    }

    pub fn xmax(&self) -> &Array1<f64> {
        &self.xmax
    }

    pub fn inc(&self) -> usize {
        self.inc
    }

    /// Conditions met while selecting the bandwidth.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Kernel sampled on the periodic `(2·inc)^D` support, offset `j` for
    /// `j < inc` and `j - 2inc` above, already divided by the normalisers.
    fn periodic_kernel(&self, dx: &Array1<f64>) -> ArrayD<f64> {
        let d = self.dim();
        let inc = self.inc;
        let nfft = 2 * inc;
        let scale = self.norm_factor * self.kernel.norm_factor(d);
        let mut offset = vec![0.0; d];
        let mut t = vec![0.0; d];
        ArrayD::from_shape_fn(IxDyn(&vec![nfft; d]), |idx| {
            for k in 0..d {
                let j = idx[k] as f64;
                let shift = if idx[k] < inc { j } else { j - nfft as f64 };
                offset[k] = shift * dx[k];
            }
            for r in 0..d {
                t[r] = (0..d).map(|c| self.inv_hs[(r, c)] * offset[c]).sum();
            }
            self.kernel.eval_point(&t) / scale
        })
    }

    /// FFT estimate on the default axes.
    fn fast_default_grid(&self) -> Result<ArrayD<f64>> {
        let d = self.dim();
        let inc = self.inc;
        let axes = self.default_axes();
        let mut grid = Array2::zeros((d, inc));
        for (k, axis) in axes.iter().enumerate() {
            grid.row_mut(k).assign(axis);
        }
        let dx = Array1::from_shape_fn(d, |k| grid[(k, 1)] - grid[(k, 0)]);

        let counts = gridcount(self.dataset.view(), grid.view())?;
        let mut padded = ArrayD::zeros(IxDyn(&vec![2 * inc; d]));
        padded
            .slice_each_axis_mut(|_| Slice::from(0..inc))
            .assign(&counts);
        let kw = self.periodic_kernel(&dx);
        let z = circular_convolve(padded.view(), kw.view())?;
        Ok(z
            .slice_each_axis(|_| Slice::from(0..inc))
            .mapv(|v| if v > 0.0 { v } else { 0.0 }))
    }
}

/// Interpolate a grid result sampled on `from` onto `to` with zero fill.
pub(crate) fn regrid(f: &ArrayD<f64>, from: &[Array1<f64>], to: &[Array1<f64>]) -> Result<ArrayD<f64>> {
    match from.len() {
        1 => {
            let f1 = f
                .view()
                .into_dimensionality::<Ix1>()
                .map_err(|e| KdeError::InvalidInput(e.to_string()))?;
            let xp = from[0].view();
            Ok(to[0]
                .mapv(|x| interp1_fill(x, xp, f1, 0.0))
                .into_dyn())
        }
        2 => {
            let f2 = f
                .view()
                .into_dimensionality::<Ix2>()
                .map_err(|e| KdeError::InvalidInput(e.to_string()))?;
            Ok(interp2_grid(
                to[0].view(),
                to[1].view(),
                from[0].view(),
                from[1].view(),
                f2,
                0.0,
            )
            .into_dyn())
        }
        dim => Err(KdeError::UnsupportedInterpolation { dim }),
    }
}

impl DensityEstimator for Kde {
    fn dim(&self) -> usize {
        self.dataset.dim()
    }

    fn default_axes(&self) -> Vec<Array1<f64>> {
        (0..self.dim())
            .map(|k| linspace(self.xmin[k], self.xmax[k], self.inc))
            .collect()
    }

    fn eval_points(&self, points: ArrayView2<'_, f64>) -> Result<Estimate<Array1<f64>>> {
        let points = coerce_points(points, self.dim())?;
        Ok(Estimate::new(self.sum_kernels(points.view())))
    }

    fn eval_grid_fast(&self, axes: &[Array1<f64>]) -> Result<Estimate<ArrayD<f64>>> {
        let defaults = self.default_axes();
        let custom = !axes.is_empty() && axes != defaults.as_slice();
        if custom && axes.len() != self.dim() {
            return Err(KdeError::DimensionMismatch {
                expected: self.dim(),
                got: axes.len(),
            });
        }
        if custom && self.dim() > 2 {
            return Err(KdeError::UnsupportedInterpolation { dim: self.dim() });
        }
        let f = self.fast_default_grid()?;
        if !custom {
            return Ok(Estimate::new(f));
        }
        Ok(Estimate::new(regrid(&f, &defaults, axes)?))
    }
}
