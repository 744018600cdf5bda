// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Gaussian Transformation from Level Crossings
//!
//! ## Theoretical Background
//!
//! A non-Gaussian process `X` is modelled as `X = G(Y)` for a stationary
//! Gaussian process `Y` and a monotone `G = g⁻¹`. Monotone transforms map
//! upcrossings of level `u` by `X` onto upcrossings of `g(u)` by `Y`, so the
//! normalised cumulative crossing curve of `X` is a distribution function
//! whose normal scores give `g` directly:
//!
//! g(u) = Φ⁻¹(F_c(u)) - Φ⁻¹(F_c(u_0))
//!
//! where `u_0` is the most crossed level. The raw normal scores are noisy, so
//! a smoothing spline is fitted to them on a fixed standardised domain.
//!
//! ## References
//!
//! - Rychlik, I., Johannesson, P. and Leadbetter, M.R. (1997). Modelling and
//!   statistical analysis of ocean wave data using transformed Gaussian
//!   processes. Marine Structures 10, 13-47.

use ndarray::{Array1, ArrayView1, s};
use statrs::function::erf::erfc_inv;
use std::f64::consts::SQRT_2;

use super::level_crossings::{LevelCrossings, argmax};
use crate::error::{KdeError, Result};
use crate::estimators::diagnostics::{Diagnostic, Estimate};
use crate::estimators::utils::interpolate::{interp1, interp_extrap};
use crate::estimators::utils::spline::SmoothSpline;
use crate::estimators::utils::stats::{cumtrapz, linspace, trapz};

/// Number of re-smoothing attempts for a non-monotone transform.
const REPAIR_ATTEMPTS: usize = 5;

/// Standard normal quantile.
pub(crate) fn ndtri(p: f64) -> f64 {
    -SQRT_2 * erfc_inv(2.0 * p)
}

/// Monotone transform `g`, tabulated as `data = g(args)`.
///
/// `args` are levels in data units, `data` the matching standard-normal levels.
#[derive(Debug, Clone, PartialEq)]
pub struct TrData {
    pub args: Array1<f64>,
    pub data: Array1<f64>,
    /// Mean of the originating process.
    pub mean: f64,
    /// Standard deviation of the originating process.
    pub sigma: f64,
}

impl TrData {
    pub fn new(args: Array1<f64>, data: Array1<f64>, mean: f64, sigma: f64) -> Result<Self> {
        if args.len() != data.len() {
            return Err(KdeError::DimensionMismatch {
                expected: args.len(),
                got: data.len(),
            });
        }
        if args.len() < 2 {
            return Err(KdeError::InsufficientData {
                got: args.len(),
                min: 2,
            });
        }
        Ok(Self {
            args,
            data,
            mean,
            sigma,
        })
    }

    /// Map data levels to standard-normal levels, `y = g(x)`.
    pub fn dat2gauss(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        x.mapv(|v| interp_extrap(v, self.args.view(), self.data.view()))
    }

    /// Map standard-normal levels back to data levels, `x = g⁻¹(y)`.
    ///
    /// Only meaningful for a monotone transform.
    pub fn gauss2dat(&self, y: ArrayView1<'_, f64>) -> Array1<f64> {
        y.mapv(|v| interp_extrap(v, self.data.view(), self.args.view()))
    }

    /// Integrated squared distance between `g` and the linear transform on ±5 standard deviations.
    pub fn dist2gauss(&self) -> f64 {
        let xn = linspace(-5.0, 5.0, 513);
        let x = xn.mapv(|v| self.sigma * v + self.mean);
        let yn = self.dat2gauss(x.view());
        let sq = (&xn - &yn).mapv(|v| v * v);
        trapz(sq.view(), xn.view())
    }

    pub fn is_monotone(&self) -> bool {
        self.data.windows(2).into_iter().all(|w| w[1] > w[0])
    }

    /// Number of non-increasing steps of the tabulated transform.
    pub fn monotonicity_violations(&self) -> usize {
        self.data
            .windows(2)
            .into_iter()
            .filter(|w| !(w[1] > w[0]))
            .count()
    }
}

/// Settings of [`LevelCrossings::trdata`].
#[derive(Debug, Clone, PartialEq)]
pub struct TrDataOptions {
    /// Smoothing of the crossing intensity when locating the mode, in `[0, 1]`.
    pub csm: f64,
    /// Smoothing of the transform, in `[0, 1]`; smaller is smoother.
    pub gsm: f64,
    /// Standardised domain `(start, stop, count)` the transform is tabulated on.
    pub param: (f64, f64, usize),
    /// Continue the fitted transform linearly beyond the crossing data.
    pub lin_extrap: bool,
    /// Decimate the crossing curve to this many levels when it is longer.
    pub ntr: Option<usize>,
    /// Number of extreme levels at each end left out of the transform fit.
    pub ne: usize,
    /// Variance weights of the crossing intensity, stretched over the levels.
    pub cvar: Array1<f64>,
    /// Variance weights of the empirical transform, stretched over the levels.
    pub gvar: Array1<f64>,
    /// Re-smooth a transform that is not strictly increasing.
    pub chkder: bool,
}

impl Default for TrDataOptions {
    fn default() -> Self {
        Self {
            csm: 0.9,
            gsm: 0.05,
            param: (-5.0, 5.0, 513),
            lin_extrap: true,
            ntr: None,
            ne: 7,
            cvar: Array1::ones(1),
            gvar: Array1::ones(1),
            chkder: true,
        }
    }
}

impl TrDataOptions {
    pub fn with_csm(mut self, csm: f64) -> Self {
        self.csm = csm;
        self
    }

    pub fn with_gsm(mut self, gsm: f64) -> Self {
        self.gsm = gsm;
        self
    }

    pub fn with_param(mut self, start: f64, stop: f64, count: usize) -> Self {
        self.param = (start, stop, count);
        self
    }

    pub fn with_lin_extrap(mut self, lin_extrap: bool) -> Self {
        self.lin_extrap = lin_extrap;
        self
    }

    pub fn with_ntr(mut self, ntr: usize) -> Self {
        self.ntr = Some(ntr);
        self
    }

    pub fn with_ne(mut self, ne: usize) -> Self {
        self.ne = ne;
        self
    }

    pub fn with_cvar(mut self, cvar: Array1<f64>) -> Self {
        self.cvar = cvar;
        self
    }

    pub fn with_gvar(mut self, gvar: Array1<f64>) -> Self {
        self.gvar = gvar;
        self
    }

    pub fn with_chkder(mut self, chkder: bool) -> Self {
        self.chkder = chkder;
        self
    }

    fn validate(&self) -> Result<()> {
        for (name, v) in [("csm", self.csm), ("gsm", self.gsm)] {
            if !(0.0..=1.0).contains(&v) {
                return Err(KdeError::InvalidInput(format!(
                    "{name} must lie in [0, 1], got {v}"
                )));
            }
        }
        let (start, stop, count) = self.param;
        if !(stop > start) || count < 2 {
            return Err(KdeError::InvalidInput(format!(
                "invalid transform domain ({start}, {stop}, {count})"
            )));
        }
        for (name, v) in [("cvar", &self.cvar), ("gvar", &self.gvar)] {
            if v.is_empty() || v.iter().any(|&w| !(w >= 0.0 && w.is_finite())) {
                return Err(KdeError::InvalidInput(format!(
                    "{name} must hold finite non-negative variances"
                )));
            }
        }
        Ok(())
    }
}

/// Variance weights stretched linearly over `n` points.
fn stretch(weights: &Array1<f64>, n: usize) -> Array1<f64> {
    if weights.len() == 1 {
        return Array1::from_elem(n, weights[0]);
    }
    let from = linspace(0.0, 1.0, weights.len());
    linspace(0.0, 1.0, n).mapv(|t| interp1(t, from.view(), weights.view()))
}

fn argmin_distance(values: ArrayView1<'_, f64>, target: f64) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if (v - target).abs() < (values[best] - target).abs() {
            best = i;
        }
    }
    best
}

impl LevelCrossings {
    /// Estimate the Gaussian transform `g` from the crossing curve.
    ///
    /// Returns the smoothed transform tabulated on `param` standard
    /// deviations around the mean, and the empirical one on the crossing
    /// levels.
    pub fn trdata(&self, opts: &TrDataOptions) -> Result<Estimate<(TrData, TrData)>> {
        opts.validate()?;
        let mean = self.mean();
        let sigma = self.stdev();
        let mut ne = opts.ne;
        let mut ner = 0;

        let (lc1, lc2) = match opts.ntr {
            Some(ntr) if ntr > 0 && self.len() > ntr => {
                let n = self.len();
                if 2 * ne + 2 > n {
                    return Err(KdeError::InsufficientData {
                        got: n,
                        min: 2 * ne + 2,
                    });
                }
                // The end corrections integrate `ne + 1` decimated levels at each side.
                let min_ntr = (2 * ne + 2).max(3);
                if ntr < min_ntr {
                    return Err(KdeError::InsufficientData {
                        got: ntr,
                        min: min_ntr,
                    });
                }
                let x0 = linspace(self.levels()[ne], self.levels()[n - 1 - ne], ntr);
                let c0 = x0.mapv(|x| interp1(x, self.levels(), self.counts()));
                ner = ne;
                ne = 0;
                (x0, c0)
            }
            _ => (self.levels().to_owned(), self.counts().to_owned()),
        };
        let ncr = lc1.len();
        if ncr < 2 * ne + 3 {
            return Err(KdeError::InsufficientData {
                got: ncr,
                min: 2 * ne + 3,
            });
        }
        let gvar = stretch(&opts.gvar, ncr);
        let cvar = stretch(&opts.cvar, ncr);

        let (start, stop, count) = opts.param;
        let uu = linspace(start, stop, count);
        let g1 = uu.mapv(|u| sigma * u + mean);

        // Crossing mass cut away by decimation at either end.
        let (cor1, cor2) = if ner > 0 {
            let lo = s![..ner + 1];
            let hi = s![ncr - ner - 1..];
            (
                trapz(lc2.slice(&lo), lc1.slice(&lo)),
                trapz(lc2.slice(&hi), lc1.slice(&hi)),
            )
        } else {
            (0.0, 0.0)
        };

        let cum = cumtrapz(lc2.view(), lc1.view());
        let mut lc22 = Array1::zeros(ncr);
        for i in 1..ncr {
            lc22[i] = cum[i - 1] + cor1;
        }
        let total = lc22[ncr - 1] + cor2 + 1.0;
        lc22.mapv_inplace(|v| (v + 0.5) / total);
        let lc11 = lc1.mapv(|u| (u - mean) / sigma);

        let imin = argmin_distance(lc22.view(), 0.15);
        let imax = argmin_distance(lc22.view(), 0.85);
        let (lo, hi) = (imin.min(imax), imin.max(imax));
        let inde = s![lo..hi + 1];
        let u0 = if hi > lo {
            let mode_fit = SmoothSpline::fit(
                lc11.slice(&inde),
                lc2.slice(&inde),
                Some(opts.csm),
                opts.lin_extrap,
                Some(cvar.slice(&inde)),
            )?;
            let smoothed = mode_fit.eval_array(lc11.slice(&inde));
            ndtri(lc22[lo + argmax(smoothed.view())])
        } else {
            ndtri(lc22[lo])
        };
        log::debug!("trdata: mode level {u0:.6} on the normal scale");

        let scores = lc22.mapv(|p| ndtri(p) - u0);
        let empirical = TrData::new(lc1.clone(), scores.clone(), mean, sigma)?;

        let inds = s![ne..ncr - ne];
        let fit = SmoothSpline::fit(
            lc11.slice(&inds),
            scores.slice(&inds),
            Some(opts.gsm),
            opts.lin_extrap,
            Some(gvar.slice(&inds)),
        )?;
        let mut g = TrData::new(g1, fit.eval_array(uu.view()), mean, sigma)?;

        let mut diagnostics = Vec::new();
        if opts.chkder && !g.is_monotone() {
            g = repair_monotonicity(g, uu.view(), opts)?;
            if !g.is_monotone() {
                diagnostics.push(
                    Diagnostic::NotSufficientlySmoothed {
                        attempts: REPAIR_ATTEMPTS,
                    }
                    .emit(),
                );
            }
        }
        Ok(Estimate::with_diagnostics((g, empirical), diagnostics))
    }
}

/// Growth of the repair smoothing penalty between attempts.
const REPAIR_PENALTY_GROWTH: f64 = 100.0;
/// Variance inflation of levels next to a non-increasing step, per attempt.
const REPAIR_VARIANCE_BOOST: f64 = 10.0;

/// Re-smooth `g` with extra variance where it fails to increase, keeping the best attempt.
///
/// Every attempt smooths harder than the last, so a transform with an
/// increasing trend ends up close to its weighted least-squares line.
fn repair_monotonicity(g: TrData, uu: ArrayView1<'_, f64>, opts: &TrDataOptions) -> Result<TrData> {
    let n = uu.len();
    let base = stretch(&opts.gvar, n).mapv(|v| v.max(f64::EPSILON));
    let p0 = opts.gsm.min(0.5);
    let mut best = g.clone();
    let mut current = g;
    for attempt in 0..REPAIR_ATTEMPTS {
        if current.is_monotone() {
            break;
        }
        let dy: Vec<f64> = current.data.windows(2).into_iter().map(|w| w[1] - w[0]).collect();
        let drop_max = dy
            .iter()
            .filter(|&&d| d <= 0.0)
            .fold(0.0_f64, |acc, &d| acc.max(-d));
        let scale = REPAIR_VARIANCE_BOOST * (attempt + 1) as f64;
        let var = Array1::from_shape_fn(n, |i| {
            let steps = [i.checked_sub(1), (i + 1 < n).then_some(i)];
            let drop = steps
                .iter()
                .flatten()
                .filter(|&&j| dy[j] <= 0.0)
                .map(|&j| -dy[j])
                .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |a| a.max(d))));
            match drop {
                Some(d) => {
                    let rel = if drop_max > 0.0 { d / drop_max } else { 0.0 };
                    base[i] * (1.0 + scale * (1.0 + rel))
                }
                None => base[i],
            }
        });
        // p = p0 / (p0 + (1 - p0) * growth^k) stays below one and shrinks every attempt.
        let penalty = REPAIR_PENALTY_GROWTH.powi(attempt as i32);
        let p = p0 / (p0 + (1.0 - p0) * penalty);
        let fit = SmoothSpline::fit(uu, current.data.view(), Some(p), opts.lin_extrap, Some(var.view()))?;
        current.data = fit.eval_array(uu);
        log::debug!(
            "trdata: repair attempt {} (p = {p:.3e}) leaves {} non-increasing steps",
            attempt + 1,
            current.monotonicity_violations()
        );
        if current.monotonicity_violations() < best.monotonicity_violations() {
            best = current.clone();
        }
    }
    Ok(best)
}
