// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Descriptive statistics and quadrature used by the bandwidth selectors,
//! the evaluators and the transformation estimator.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, ArrayViewD, Axis};
use statrs::function::gamma::gamma;
use std::f64::consts::PI;

use crate::error::{KdeError, Result};
use crate::estimators::diagnostics::{Diagnostic, Estimate};
use crate::estimators::utils::interpolate::interp_extrap;

/// Rule mapping a probability `p` and a sample size `n` to a fractional index
/// into the sorted sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PercentileMethod {
    /// `p(n-1)`: linear interpolation between order statistics.
    #[default]
    Linear,
    /// `pn - 1/2`: piecewise linear where `F(x_(k)) = (k-1/2)/n`.
    Hazen,
    /// `pn - 1`: empirical distribution.
    Empirical,
    /// `p(n+1) - 1`: Weibull plotting positions.
    Weibull,
    /// `p(n+1/3) - 2/3`: approximately median-unbiased.
    MedianUnbiased,
    /// `p(n+1/4) - 5/8`: approximately unbiased for normal samples.
    NormalUnbiased,
}

impl PercentileMethod {
    /// Method by its classical number 1..=6.
    pub fn from_number(method: u8) -> Result<Self> {
        Ok(match method {
            1 => Self::Linear,
            2 => Self::Hazen,
            3 => Self::Empirical,
            4 => Self::Weibull,
            5 => Self::MedianUnbiased,
            6 => Self::NormalUnbiased,
            other => {
                return Err(KdeError::InvalidInput(format!(
                    "percentile method {other} is not one of 1..=6"
                )));
            }
        })
    }

    fn index(self, p: f64, n: f64) -> f64 {
        match self {
            Self::Linear => p * (n - 1.0),
            Self::Hazen => p * n - 0.5,
            Self::Empirical => p * n - 1.0,
            Self::Weibull => p * (n + 1.0) - 1.0,
            Self::MedianUnbiased => p * (n + 1.0 / 3.0) - 2.0 / 3.0,
            Self::NormalUnbiased => p * (n + 0.25) - 0.625,
        }
    }
}

fn sorted_copy(data: ArrayView1<'_, f64>) -> Vec<f64> {
    let mut v = data.to_vec();
    v.sort_by(|a, b| a.total_cmp(b));
    v
}

fn percentile_sorted(sorted: &[f64], q: f64, method: PercentileMethod) -> Result<f64> {
    if !(0.0..=100.0).contains(&q) {
        return Err(KdeError::PercentileOutOfRange(q));
    }
    let n = sorted.len();
    if n == 0 {
        return Err(KdeError::InsufficientData { got: 0, min: 1 });
    }
    if q == 0.0 {
        return Ok(sorted[0]);
    }
    if q == 100.0 {
        return Ok(sorted[n - 1]);
    }
    let index = method
        .index(q / 100.0, n as f64)
        .clamp(0.0, (n - 1) as f64);
    let i = index.floor() as usize;
    if i + 1 >= n || index == i as f64 {
        return Ok(sorted[i]);
    }
    let w = index - i as f64;
    Ok(sorted[i] * (1.0 - w) + sorted[i + 1] * w)
}

/// The `q`-th percentile (`0 <= q <= 100`) of `data`.
pub fn percentile(data: ArrayView1<'_, f64>, q: f64, method: PercentileMethod) -> Result<f64> {
    percentile_sorted(&sorted_copy(data), q, method)
}

/// Several percentiles of the same sample, sorting only once.
pub fn percentiles(
    data: ArrayView1<'_, f64>,
    qs: &[f64],
    method: PercentileMethod,
) -> Result<Vec<f64>> {
    let sorted = sorted_copy(data);
    qs.iter()
        .map(|&q| percentile_sorted(&sorted, q, method))
        .collect()
}

/// Interquartile range `|P75 - P25|` using linear interpolation.
pub fn iqrange(data: ArrayView1<'_, f64>) -> Result<f64> {
    let q = percentiles(data, &[25.0, 75.0], PercentileMethod::Linear)?;
    Ok((q[1] - q[0]).abs())
}

pub fn mean(data: ArrayView1<'_, f64>) -> f64 {
    data.sum() / data.len() as f64
}

/// Standard deviation with `ddof` degrees of freedom removed from the divisor.
pub fn std(data: ArrayView1<'_, f64>, ddof: usize) -> f64 {
    let n = data.len();
    if n <= ddof {
        return f64::NAN;
    }
    let m = mean(data);
    let ss: f64 = data.iter().map(|&v| (v - m) * (v - m)).sum();
    (ss / (n - ddof) as f64).sqrt()
}

/// Robust spread `min(std, iqr/divisor)`, falling back to `std` for a vanishing IQR.
pub fn robust_sigma(data: ArrayView1<'_, f64>, divisor: f64) -> Result<f64> {
    let n = data.len();
    if n < 2 {
        return Err(KdeError::InsufficientData { got: n, min: 2 });
    }
    let s = std(data, 1);
    let iqr = iqrange(data)?;
    Ok(if iqr > 0.0 { s.min(iqr / divisor) } else { s })
}

/// Sample covariance (divisor `n-1`) of `D×N` data, one variable per row.
pub fn cov(data: ArrayView2<'_, f64>) -> Array2<f64> {
    let (d, n) = data.dim();
    let means = data.mean_axis(Axis(1)).unwrap_or_else(|| Array1::zeros(d));
    let centered = data.to_owned() - &means.insert_axis(Axis(1));
    centered.dot(&centered.t()) / (n as f64 - 1.0)
}

/// `n` evenly spaced samples over `[start, stop]`, endpoints included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Array1<f64> {
    Array1::linspace(start, stop, n)
}

/// Trapezoidal integral of `y` sampled at `x`.
pub fn trapz(y: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>) -> f64 {
    (1..y.len().min(x.len()))
        .map(|i| 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]))
        .sum()
}

/// Running trapezoidal integral; element `i` is the integral over `x[0]..x[i+1]`.
pub fn cumtrapz(y: ArrayView1<'_, f64>, x: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = y.len().min(x.len());
    let mut out = Array1::zeros(n.saturating_sub(1));
    let mut acc = 0.0;
    for i in 1..n {
        acc += 0.5 * (y[i] + y[i - 1]) * (x[i] - x[i - 1]);
        out[i - 1] = acc;
    }
    out
}

/// Volume of a `d`-dimensional ball of radius `r`.
///
/// `V_d(r) = r^d · 2π^(d/2) / (d·Γ(d/2))`
pub fn sphere_volume(d: usize, r: f64) -> f64 {
    let df = d as f64;
    r.powi(d as i32) * 2.0 * PI.powf(df / 2.0) / (df * gamma(df / 2.0))
}

/// Integration weights of a sampled axis: half the distance to each neighbour.
fn cell_widths(x: ArrayView1<'_, f64>) -> Array1<f64> {
    let n = x.len();
    let mut w = Array1::zeros(n);
    for i in 1..n {
        let half = 0.5 * (x[i] - x[i - 1]);
        w[i - 1] += half;
        w[i] += half;
    }
    w
}

/// Density levels enclosing `p` percent of the mass of a sampled pdf.
///
/// The pdf values are visited in order of decreasing height and their mass
/// is accumulated; the level for `p` is the height at which the accumulated
/// mass reaches `p/100`. With `x1` (and `x2` for a 2-D pdf indexed `[i, j]`
/// along `x1[i]`, `x2[j]`) the mass of each sample is weighted by its cell
/// area, otherwise every sample counts as a unit cell.
///
/// # Errors
///
/// Negative pdf values and percentages outside `[0, 100]` are rejected.
pub fn qlevels(
    pdf: ArrayViewD<'_, f64>,
    p: &[f64],
    x1: Option<ArrayView1<'_, f64>>,
    x2: Option<ArrayView1<'_, f64>>,
) -> Result<Estimate<Array1<f64>>> {
    if pdf.iter().any(|&v| v < 0.0) {
        return Err(KdeError::InvalidInput(
            "not a pdf since one or more values are negative".into(),
        ));
    }
    if let Some(&bad) = p.iter().find(|&&v| !(0.0..=100.0).contains(&v)) {
        return Err(KdeError::PercentileOutOfRange(bad));
    }
    if pdf.is_empty() {
        return Ok(Estimate::new(Array1::zeros(0)));
    }

    let ndim = pdf.ndim();
    let values: Vec<f64> = pdf.iter().copied().collect();
    let n = values.len();

    let masses: Vec<f64> = match (x1, x2, ndim) {
        (Some(x1), _, 1) => {
            if x1.len() != n {
                return Err(KdeError::DimensionMismatch {
                    expected: n,
                    got: x1.len(),
                });
            }
            let w = cell_widths(x1);
            values.iter().zip(w.iter()).map(|(f, w)| f * w).collect()
        }
        (Some(x1), Some(x2), 2) => {
            let w1 = cell_widths(x1);
            let w2 = cell_widths(x2);
            let (n1, n2) = (pdf.shape()[0], pdf.shape()[1]);
            if n1 != x1.len() || n2 != x2.len() {
                return Err(KdeError::DimensionMismatch {
                    expected: n1 * n2,
                    got: x1.len() * x2.len(),
                });
            }
            pdf.indexed_iter()
                .map(|(ix, &f)| f * w1[ix[0]] * w2[ix[1]])
                .collect()
        }
        _ => values.clone(),
    };

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| values[b].total_cmp(&values[a]));
    let heights: Vec<f64> = order.iter().map(|&i| values[i]).collect();
    let mut cdf: Vec<f64> = order
        .iter()
        .scan(0.0, |acc, &i| {
            *acc += masses[i];
            Some(*acc)
        })
        .collect();

    let total = cdf[n - 1];
    let shrink = n as f64 / (n as f64 + 1.5e-8);
    if total > 0.0 {
        cdf.iter_mut().for_each(|c| *c = *c / total * shrink);
    }

    let mut diagnostics = Vec::new();
    let max_cdf = cdf.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if max_cdf > 1.0 {
        diagnostics.push(Diagnostic::CdfExceedsOne.emit());
    } else if max_cdf < 0.95 {
        diagnostics.push(Diagnostic::SparselySampled { max_cdf }.emit());
    }

    // Keep only points where the cumulative mass strictly increases.
    let mut fx = Vec::with_capacity(n);
    let mut fy = Vec::with_capacity(n);
    for i in 0..n {
        let next = if i + 1 < n { cdf[i + 1] } else { 1.0 };
        if next - cdf[i] > 0.0 {
            fx.push(cdf[i]);
            fy.push(heights[i]);
        }
    }
    if fx.is_empty() {
        fx.push(cdf[n - 1]);
        fy.push(heights[n - 1]);
    }
    let fx = Array1::from(fx);
    let fy = Array1::from(fy);

    let mut levels: Array1<f64> = p
        .iter()
        .map(|&pi| interp_extrap(pi / 100.0, fx.view(), fy.view()))
        .collect();

    let pmax = heights[0];
    let pmin = heights[n - 1];
    if levels.iter().any(|&u| u >= pmax) {
        diagnostics.push(Diagnostic::LowestLevelNearZero.emit());
    }
    if levels.iter().any(|&u| u <= pmin) {
        diagnostics.push(Diagnostic::HighestLevelNearHundred.emit());
        levels.mapv_inplace(|u| u.max(0.0));
    }
    Ok(Estimate::with_diagnostics(levels, diagnostics))
}
