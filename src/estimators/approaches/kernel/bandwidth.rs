// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Bandwidth Selection
//!
//! Data-driven choice of the smoothing parameter `h` for a kernel density
//! estimate. Every selector works on `D×N` data and returns one bandwidth per
//! dimension, except the multivariate normal scale rule which returns a full
//! `D×D` matrix.
//!
//! ## Theoretical Background
//!
//! The AMISE optimal bandwidth of a one-dimensional estimate is
//!
//! h_AMISE = ( R(K) / (mu2(K)² · ψ₄ · n) )^(1/5),    ψ_r = ∫ f^(r/2)(x)² dx
//!
//! The selectors differ in how they estimate the unknown density functional:
//!
//! - **hns** / **hos**: plug in a normal density (optionally oversmoothed by 1/0.93).
//! - **hmns**: normal reference rule for a full bandwidth matrix.
//! - **hste**: solve the equation `h = (R/(mu2² ψ₄(γ(h)) n))^(1/5)` by fixed-point iteration,
//!   with `ψ₄` estimated from binned data and Gaussian derivative kernels.
//! - **hstt**: Scott-Tapia-Thompson fixed point with `ψ₄` from second finite
//!   differences of the estimate itself.
//! - **hscv**: smoothed cross-validation score minimised over a candidate grid.
//! - **hldpi**: L-stage direct plug-in, descending from a normal-scale `ψ_{2L+4}`.
//!
//! Functionals `ψ_r` are estimated on a linear-binned grid of `inc` nodes
//! spanning the data range padded by one eighth of the range on either side,
//! using the FFT convolution in [`crate::estimators::utils::fft`].
//!
//! Reference: Wand, M.P. and Jones, M.C. (1995) *Kernel Smoothing*, Chapman and Hall.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use std::f64::consts::PI;
use std::str::FromStr;

use super::kernel::Kernel;
use crate::error::{KdeError, Result};
use crate::estimators::approaches::common_nd::gridcount::gridcount;
use crate::estimators::diagnostics::{Diagnostic, Estimate};
use crate::estimators::utils::fft::{binned_convolution, binned_functional};
use crate::estimators::utils::linalg::sqrtm_symmetric;
use crate::estimators::utils::stats::{cov, linspace, robust_sigma, sphere_volume};

/// Smoothing parameter of a kernel estimate.
#[derive(Debug, Clone, PartialEq)]
pub enum Bandwidth {
    /// The same bandwidth in every dimension.
    Scalar(f64),
    /// One bandwidth per dimension.
    Diagonal(Array1<f64>),
    /// Full `D×D` bandwidth matrix.
    Matrix(Array2<f64>),
}

impl From<f64> for Bandwidth {
    fn from(h: f64) -> Self {
        Bandwidth::Scalar(h)
    }
}

impl From<Array1<f64>> for Bandwidth {
    fn from(h: Array1<f64>) -> Self {
        Bandwidth::Diagonal(h)
    }
}

impl From<Array2<f64>> for Bandwidth {
    fn from(h: Array2<f64>) -> Self {
        Bandwidth::Matrix(h)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BandwidthMethod {
    /// Normal scale rule.
    #[default]
    Hns,
    /// Oversmoothing rule.
    Hos,
    /// Multivariate normal scale rule (full matrix).
    Hmns,
    /// Two-stage solve-the-equation.
    Hste,
    /// Scott-Tapia-Thompson.
    Hstt,
    /// Smoothed cross-validation.
    Hscv,
    /// L-stage direct plug-in.
    Hldpi,
}

impl BandwidthMethod {
    pub fn name(&self) -> &'static str {
        match self {
            BandwidthMethod::Hns => "hns",
            BandwidthMethod::Hos => "hos",
            BandwidthMethod::Hmns => "hmns",
            BandwidthMethod::Hste => "hste",
            BandwidthMethod::Hstt => "hstt",
            BandwidthMethod::Hscv => "hscv",
            BandwidthMethod::Hldpi => "hldpi",
        }
    }
}

impl FromStr for BandwidthMethod {
    type Err = KdeError;

    fn from_str(s: &str) -> Result<Self> {
        Ok(match s.trim().to_lowercase().as_str() {
            "hns" => BandwidthMethod::Hns,
            "hos" => BandwidthMethod::Hos,
            "hmns" => BandwidthMethod::Hmns,
            "hste" => BandwidthMethod::Hste,
            "hstt" => BandwidthMethod::Hstt,
            "hscv" => BandwidthMethod::Hscv,
            "hldpi" => BandwidthMethod::Hldpi,
            other => {
                return Err(KdeError::InvalidInput(format!(
                    "unknown bandwidth method '{other}'"
                )));
            }
        })
    }
}

/// Tuning of the iterative and binned selectors.
#[derive(Debug, Clone, PartialEq)]
pub struct BandwidthOptions {
    /// Number of grid nodes used for binning.
    pub inc: usize,
    /// Maximum number of fixed-point iterations.
    pub maxit: usize,
    /// Relative tolerance of the fixed-point iterations.
    pub releps: f64,
    /// Absolute tolerance of the fixed-point iterations.
    pub abseps: f64,
    /// Candidate bandwidths for `hscv`, in units of the robust standard deviation.
    pub hvec: Option<Array1<f64>>,
    /// Number of stages `L` of `hldpi` (at most 4).
    pub stages: usize,
}

impl Default for BandwidthOptions {
    fn default() -> Self {
        Self {
            inc: 128,
            maxit: 100,
            releps: 0.01,
            abseps: 0.0,
            hvec: None,
            stages: 2,
        }
    }
}

impl BandwidthOptions {
    pub fn with_inc(mut self, inc: usize) -> Self {
        self.inc = inc;
        self
    }

    pub fn with_maxit(mut self, maxit: usize) -> Self {
        self.maxit = maxit;
        self
    }

    pub fn with_releps(mut self, releps: f64) -> Self {
        self.releps = releps;
        self
    }

    pub fn with_abseps(mut self, abseps: f64) -> Self {
        self.abseps = abseps;
        self
    }

    pub fn with_hvec(mut self, hvec: Array1<f64>) -> Self {
        self.hvec = Some(hvec);
        self
    }

    pub fn with_stages(mut self, stages: usize) -> Self {
        self.stages = stages;
        self
    }
}

/// `(8√π R / (3 mu2² n))^(1/5)`, the normal-scale bandwidth of unit-variance data.
fn amise_constant(kernel: Kernel, n: usize) -> f64 {
    let s = kernel.stats();
    (8.0 * PI.sqrt() * s.r / (3.0 * s.mu2 * s.mu2 * n as f64)).powf(0.2)
}

/// `R / (mu2² n)`, the constant of the solve-the-equation rule.
fn ste_constant(kernel: Kernel, n: usize) -> f64 {
    let s = kernel.stats();
    s.r / (s.mu2 * s.mu2 * n as f64)
}

fn sample_count(data: ArrayView2<'_, f64>) -> Result<usize> {
    let n = data.ncols();
    if n < 2 || data.nrows() == 0 {
        return Err(KdeError::InsufficientData { got: n, min: 2 });
    }
    Ok(n)
}

/// Robust scale `min(std, IQR/1.349)` of every dimension.
fn robust_scales(data: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    data.rows()
        .into_iter()
        .map(|row| robust_sigma(row, 1.349))
        .collect()
}

/// Normal scale rule.
///
/// `h_i = (8√π R / (3 mu2² n))^(1/5) · min(std_i, IQR_i/1.349)`
///
/// # Errors
///
/// Requires at least two samples.
pub fn hns(data: ArrayView2<'_, f64>, kernel: Kernel) -> Result<Array1<f64>> {
    let n = sample_count(data)?;
    Ok(robust_scales(data)? * amise_constant(kernel, n))
}

/// Oversmoothing rule, `hns / 0.93`.
pub fn hos(data: ArrayView2<'_, f64>, kernel: Kernel) -> Result<Array1<f64>> {
    Ok(hns(data, kernel)? / 0.93)
}

/// Multivariate normal scale rule, `a · sqrtm(cov) · n^(-1/(d+4))`.
///
/// In one dimension this is [`hns`]. Only the Epanechnikov and Gaussian
/// kernels are supported for every `d`; biweight and triweight for `d <= 2`.
pub fn hmns(data: ArrayView2<'_, f64>, kernel: Kernel) -> Result<Bandwidth> {
    let (d, n) = data.dim();
    if d == 1 {
        return Ok(Bandwidth::Diagonal(hns(data, kernel)?));
    }
    sample_count(data)?;
    let df = d as f64;
    let a = match kernel {
        Kernel::Epanechnikov => {
            (8.0 * (df + 4.0) * (2.0 * PI.sqrt()).powi(d as i32) / sphere_volume(d, 1.0))
                .powf(1.0 / (4.0 + df))
        }
        Kernel::Biweight if d <= 2 => 2.7779,
        Kernel::Triweight if d <= 2 => 3.12,
        Kernel::Gaussian => (4.0 / (df + 2.0)).powf(1.0 / (df + 4.0)),
        other => {
            return Err(KdeError::UnsupportedKernelDimension {
                kernel: other.name().to_string(),
                dim: d,
            });
        }
    };
    let root = sqrtm_symmetric(cov(data).view())?;
    Ok(Bandwidth::Matrix(root * (a * (n as f64).powf(-1.0 / (df + 4.0)))))
}

/// One dimension of the data binned on the padded range, optionally rescaled.
struct BinnedAxis {
    /// Linear-binned counts on `inc` nodes.
    counts: Array1<f64>,
    /// Node offsets `0, Δ, …, (inc-1)Δ`.
    offsets: Array1<f64>,
    delta: f64,
}

impl BinnedAxis {
    /// Bin `row / scale` on `[min - range/8, max + range/8] / scale`.
    fn new(row: ArrayView1<'_, f64>, scale: f64, inc: usize) -> Result<Self> {
        if inc < 2 {
            return Err(KdeError::InvalidInput(
                "the binning grid needs at least two nodes".into(),
            ));
        }
        let min = row.iter().copied().fold(f64::INFINITY, f64::min);
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let range = max - min;
        if !(range > 0.0) || !(scale > 0.0) {
            return Err(KdeError::InvalidInput(
                "data must have a non-zero spread".into(),
            ));
        }
        let ax = (min - range / 8.0) / scale;
        let bx = (max + range / 8.0) / scale;
        let grid = linspace(ax, bx, inc).insert_axis(ndarray::Axis(0));
        let scaled = row.mapv(|v| v / scale).insert_axis(ndarray::Axis(0));
        let counts = gridcount(scaled.view(), grid.view())?
            .into_dimensionality::<ndarray::Ix1>()
            .map_err(|e| KdeError::InvalidInput(e.to_string()))?;
        Ok(Self {
            counts,
            offsets: linspace(0.0, bx - ax, inc),
            delta: (bx - ax) / (inc - 1) as f64,
        })
    }

    /// Binned estimate of `Σ_i Σ_j φ^(r)((x_i - x_j)/g)` with `r = 4 + 2·index`.
    fn gaussian_functional(&self, g: f64, index: usize) -> Result<f64> {
        let t = self.offsets.mapv(|v| v / g);
        let kw = Kernel::Gaussian.gaussian_derivative_at(t.view(), index)?;
        binned_functional(self.counts.view(), kw.view())
    }
}

/// Two-stage solve-the-equation bandwidth.
///
/// # Arguments
///
/// * `data` - `D×N` samples
/// * `kernel` - Kernel the bandwidth is intended for
/// * `h0` - Starting bandwidth per dimension, [`hns`] when `None`
/// * `opts` - Grid size and iteration control
///
/// # Returns
///
/// One bandwidth per dimension; a [`Diagnostic::NotConverged`] is attached
/// for every dimension whose iteration hit `maxit`.
pub fn hste(
    data: ArrayView2<'_, f64>,
    kernel: Kernel,
    h0: Option<ArrayView1<'_, f64>>,
    opts: &BandwidthOptions,
) -> Result<Estimate<Array1<f64>>> {
    let (d, n) = (data.nrows(), sample_count(data)?);
    let nf = n as f64;
    let amise = amise_constant(kernel, n);
    let ste = ste_constant(kernel, n);
    let sigma = hns(data, kernel)? / amise;
    let h0 = match h0 {
        Some(h0) if h0.len() == d => h0.to_owned(),
        Some(h0) => {
            return Err(KdeError::DimensionMismatch {
                expected: d,
                got: h0.len(),
            });
        }
        None => &sigma * amise,
    };

    let gauss = Kernel::Gaussian;
    let mu2 = gauss.stats().mu2;
    let r_gauss = gauss.stats().r;
    let ste2 = ste_constant(gauss, n);
    let k0 = gauss.deriv4_6_8_10(0.0, 2)?;
    let (k40, k60) = (k0[0], k0[1]);
    let sqrt_pi = PI.sqrt();

    let mut h = Array1::zeros(d);
    let mut diagnostics = Vec::new();
    for dim in 0..d {
        let s = sigma[dim];
        let binned = BinnedAxis::new(data.row(dim), 1.0, opts.inc)?;

        let psi6_ns = -15.0 / (16.0 * sqrt_pi * s.powi(7));
        let psi8_ns = 105.0 / (32.0 * sqrt_pi * s.powi(9));
        let g1 = (-2.0 * k40 / (mu2 * psi6_ns * nf)).powf(1.0 / 7.0);
        let g2 = (-2.0 * k60 / (mu2 * psi8_ns * nf)).powf(1.0 / 9.0);

        let pairs = nf * (nf - 1.0);
        let psi6 = binned.gaussian_functional(g2, 1)? / (pairs * g2.powi(7));
        let psi4 = binned.gaussian_functional(g1, 0)? / (pairs * g1.powi(5));

        let mut h1 = h0[dim];
        let mut h_old = 0.0;
        let mut count = 0;
        while (h_old - h1).abs() > (opts.releps * h1).max(opts.abseps) && count < opts.maxit {
            count += 1;
            h_old = h1;
            let gamma = ((2.0 * k40 * mu2 * psi4 * h1.powi(5)) / (-psi6 * r_gauss)).powf(1.0 / 7.0);
            let psi4_gamma = binned.gaussian_functional(gamma, 0)? / (pairs * gamma.powi(5));
            h1 = (ste2 / psi4_gamma).powf(0.2);
        }
        if count >= opts.maxit {
            diagnostics.push(
                Diagnostic::NotConverged {
                    method: "hste",
                    dim,
                    iterations: count,
                }
                .emit(),
            );
        }
        h[dim] = h1 * (ste / ste2).powf(0.2);
        log::debug!("hste: dim {dim} converged to h = {} after {count} iterations", h[dim]);
    }
    Ok(Estimate::with_diagnostics(h, diagnostics))
}

/// Scott-Tapia-Thompson bandwidth.
///
/// Iterates `h ← (R/(mu2² ψ₄ n))^(1/5)` where `ψ₄ = ∫ f''²` is computed by
/// finite differences from the binned estimate `f` built with the chosen
/// kernel at the current `h`. Starts from `h0`, or [`hns`] if not given.
pub fn hstt(
    data: ArrayView2<'_, f64>,
    kernel: Kernel,
    h0: Option<ArrayView1<'_, f64>>,
    opts: &BandwidthOptions,
) -> Result<Estimate<Array1<f64>>> {
    let (d, n) = (data.nrows(), sample_count(data)?);
    let nf = n as f64;
    let amise = amise_constant(kernel, n);
    let ste = ste_constant(kernel, n);
    let sigma = hns(data, kernel)? / amise;
    let mut h = match h0 {
        Some(h0) if h0.len() == d => h0.to_owned(),
        Some(h0) => {
            return Err(KdeError::DimensionMismatch {
                expected: d,
                got: h0.len(),
            });
        }
        None => &sigma * amise,
    };
    let norm = kernel.norm_factor(1);

    let mut diagnostics = Vec::new();
    for dim in 0..d {
        let s = sigma[dim];
        let binned = BinnedAxis::new(data.row(dim), s, opts.inc)?;
        let delta = binned.delta;
        let inc = opts.inc;

        let mut h1 = h[dim] / s;
        let mut h_old = 0.0;
        let mut count = 1;
        while (h_old - h1).abs() > (opts.releps * h1).max(opts.abseps) && count < opts.maxit {
            count += 1;
            h_old = h1;
            let kw = binned
                .offsets
                .mapv(|v| kernel.eval_1d(v / h1) / (nf * h1 * norm));
            let f = binned_convolution(binned.counts.view(), kw.view())?;
            let psi4 = delta
                * (1..inc - 1)
                    .map(|i| {
                        let dd = (f[i + 1] - 2.0 * f[i] + f[i - 1]) / (delta * delta);
                        dd * dd
                    })
                    .sum::<f64>();
            h1 = (ste / psi4).powf(0.2);
        }
        if count >= opts.maxit {
            diagnostics.push(
                Diagnostic::NotConverged {
                    method: "hstt",
                    dim,
                    iterations: count,
                }
                .emit(),
            );
        }
        h[dim] = h1 * s;
        log::debug!("hstt: dim {dim} reached h = {} after {count} iterations", h[dim]);
    }
    Ok(Estimate::with_diagnostics(h, diagnostics))
}

/// Normalised Gaussian density `φ(y/σ)/σ`.
fn gauss_scaled(y: f64, sigma: f64) -> f64 {
    (-0.5 * (y / sigma) * (y / sigma)).exp() / ((2.0 * PI).sqrt() * sigma)
}

/// Smoothed cross-validation bandwidth.
///
/// The score is always built from Gaussian kernels; for another target
/// kernel the minimiser is rescaled by `(R/mu2²)` of that kernel relative
/// to the Gaussian one. Boundary minimisers are flagged with
/// [`Diagnostic::OptimumBelowSearchRange`] or
/// [`Diagnostic::OptimumAboveSearchRange`].
pub fn hscv(
    data: ArrayView2<'_, f64>,
    kernel: Kernel,
    opts: &BandwidthOptions,
) -> Result<Estimate<Array1<f64>>> {
    let (d, n) = (data.nrows(), sample_count(data)?);
    let nf = n as f64;
    let amise = amise_constant(kernel, n);
    let ste = ste_constant(kernel, n);
    let sigma = hns(data, kernel)? / amise;

    let mut hvec = match &opts.hvec {
        Some(hv) if !hv.is_empty() => hv.clone(),
        Some(_) => return Err(KdeError::InvalidInput("hvec must not be empty".into())),
        None => {
            let big_h = amise / 0.93;
            linspace(0.25 * big_h, big_h, opts.maxit.max(2))
        }
    };

    let gauss = Kernel::Gaussian;
    let mu2 = gauss.stats().mu2;
    let ste2 = ste_constant(gauss, n);
    hvec.mapv_inplace(|v| v * (ste2 / ste).powf(0.2));
    let steps = hvec.len();

    let k0 = gauss.deriv4_6_8_10(0.0, 4)?;
    let (k40, k60, k80, k100) = (k0[0], k0[1], k0[2], k0[3]);
    let sqrt_pi = PI.sqrt();
    let psi8_ns = 105.0 / (32.0 * sqrt_pi);
    let psi12_ns = 3465.0 / (512.0 * sqrt_pi);
    let g1 = (-2.0 * k60 / (mu2 * psi8_ns * nf)).powf(1.0 / 9.0);
    let g2 = (-2.0 * k100 / (mu2 * psi12_ns * nf)).powf(1.0 / 13.0);

    let mut h = Array1::zeros(d);
    let mut diagnostics = Vec::new();
    for dim in 0..d {
        let s = sigma[dim];
        let binned = BinnedAxis::new(data.row(dim), s, opts.inc)?;
        let n2 = nf * nf;

        let psi6 = binned.gaussian_functional(g1, 1)? / (n2 * g1.powi(7));
        let psi10 = binned.gaussian_functional(g2, 3)? / (n2 * g2.powi(11));
        let g3 = (-2.0 * k40 / (mu2 * psi6 * nf)).powf(1.0 / 7.0);
        let g4 = (-2.0 * k80 / (mu2 * psi10 * nf)).powf(1.0 / 11.0);
        let psi4 = binned.gaussian_functional(g3, 0)? / (n2 * g3.powi(5));
        let psi8 = binned.gaussian_functional(g4, 2)? / (n2 * g4.powi(9));

        let constant = (441.0 / (64.0 * PI)).powf(1.0 / 18.0)
            * (4.0 * PI).powf(-0.2)
            * psi4.powf(-0.4)
            * psi8.powf(-1.0 / 9.0);

        let datan: Vec<f64> = data.row(dim).iter().map(|v| v / s).collect();
        let score: Vec<f64> = hvec
            .iter()
            .map(|&hi| {
                let g = constant * nf.powf(-23.0 / 45.0) * hi.powi(-2);
                let sig1 = (2.0 * hi * hi + 2.0 * g * g).sqrt();
                let sig2 = (hi * hi + 2.0 * g * g).sqrt();
                let sig3 = (2.0 * g * g).sqrt();
                let term = |y: f64| {
                    gauss_scaled(y, sig1) - 2.0 * gauss_scaled(y, sig2) + gauss_scaled(y, sig3)
                };
                let diagonal = nf * term(0.0);
                let mut off_diagonal = 0.0;
                for i in 0..n {
                    for j in (i + 1)..n {
                        off_diagonal += term(datan[i] - datan[j]);
                    }
                }
                let term2 = diagonal + 2.0 * off_diagonal;
                1.0 / (nf * hi * 2.0 * sqrt_pi) + term2 / n2
            })
            .collect();

        let idx = score
            .iter()
            .enumerate()
            .fold(0, |best, (i, &v)| if v < score[best] { i } else { best });
        h[dim] = hvec[idx] * (ste / ste2).powf(0.2) * s;
        if idx == 0 {
            diagnostics.push(Diagnostic::OptimumBelowSearchRange { dim, h: h[dim] }.emit());
        } else if idx == steps - 1 {
            diagnostics.push(Diagnostic::OptimumAboveSearchRange { dim, h: h[dim] }.emit());
        }
    }
    Ok(Estimate::with_diagnostics(h, diagnostics))
}

/// Normal-scale value of `ψ_r = ∫ f^(r/2)(x)² dx` for a unit-variance normal density.
///
/// `ψ_r = (-1)^(r/2) · r! / ((r/2)! · 2^(r+1) · √π)`
fn psi_normal_scale(r: usize) -> f64 {
    let half = r / 2;
    let sign = if half % 2 == 0 { 1.0 } else { -1.0 };
    // r!/(r/2)! = (half+1)(half+2)…r
    let ratio: f64 = ((half + 1)..=r).map(|k| k as f64).product();
    sign * ratio / (2f64.powi(r as i32 + 1) * PI.sqrt())
}

/// L-stage direct plug-in bandwidth.
///
/// Starts from the normal-scale `ψ_{2L+4}` and refines `ψ_{2L+2}, …, ψ₄` one
/// stage at a time with Gaussian derivative kernels at pilot widths
/// `g = (-2 φ^(r)(0) / (mu2 ψ_{r+2} n))^(1/(r+3))`.
pub fn hldpi(
    data: ArrayView2<'_, f64>,
    kernel: Kernel,
    opts: &BandwidthOptions,
) -> Result<Array1<f64>> {
    let (d, n) = (data.nrows(), sample_count(data)?);
    let stages = opts.stages;
    if stages > 4 {
        return Err(KdeError::InvalidInput(format!(
            "hldpi supports at most 4 stages, got {stages}"
        )));
    }
    let nf = n as f64;
    let amise = amise_constant(kernel, n);
    let ste = ste_constant(kernel, n);
    let sigma = hns(data, kernel)? / amise;

    let gauss = Kernel::Gaussian;
    let mu2 = gauss.stats().mu2;
    let kd = if stages > 0 {
        gauss.deriv4_6_8_10(0.0, stages)?
    } else {
        Vec::new()
    };

    let mut h = Array1::zeros(d);
    for dim in 0..d {
        let s = sigma[dim];
        let binned = BinnedAxis::new(data.row(dim), s, opts.inc)?;
        let mut psi = psi_normal_scale(2 * stages + 4);
        for ix in (0..stages).rev() {
            let order = 2 * ix + 4;
            let gi = (-2.0 * kd[ix] / (mu2 * psi * nf)).powf(1.0 / (order + 3) as f64);
            psi = binned.gaussian_functional(gi, ix)? / (nf * nf * gi.powi(order as i32 + 1));
        }
        h[dim] = s * (ste / psi).powf(0.2);
    }
    Ok(h)
}

/// Bandwidth of `method` for `data`, routed to the matching selector.
pub fn select(
    method: BandwidthMethod,
    data: ArrayView2<'_, f64>,
    kernel: Kernel,
    opts: &BandwidthOptions,
) -> Result<Estimate<Bandwidth>> {
    let estimate = match method {
        BandwidthMethod::Hns => Estimate::new(Bandwidth::Diagonal(hns(data, kernel)?)),
        BandwidthMethod::Hos => Estimate::new(Bandwidth::Diagonal(hos(data, kernel)?)),
        BandwidthMethod::Hmns => Estimate::new(hmns(data, kernel)?),
        BandwidthMethod::Hste => hste(data, kernel, None, opts)?.map(Bandwidth::Diagonal),
        BandwidthMethod::Hstt => hstt(data, kernel, None, opts)?.map(Bandwidth::Diagonal),
        BandwidthMethod::Hscv => hscv(data, kernel, opts)?.map(Bandwidth::Diagonal),
        BandwidthMethod::Hldpi => Estimate::new(Bandwidth::Diagonal(hldpi(data, kernel, opts)?)),
    };
    log::debug!("{} bandwidth: {:?}", method.name(), estimate.value);
    Ok(estimate)
}

impl Kernel {
    /// Normal-scale bandwidth of this kernel for `D×N` data.
    pub fn estimate_amise_bandwidth(&self, data: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
        hns(data, *self)
    }

    /// Bandwidth of this kernel chosen by `method`.
    pub fn get_smoothing(
        &self,
        method: BandwidthMethod,
        data: ArrayView2<'_, f64>,
        opts: &BandwidthOptions,
    ) -> Result<Estimate<Bandwidth>> {
        select(method, data, *self, opts)
    }
}
