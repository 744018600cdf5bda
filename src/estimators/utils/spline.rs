// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Cubic Smoothing Spline
//!
//! Fits the piecewise cubic `f` minimising
//!
//! ```text
//! p · Σ_i (y_i - f(x_i))² / var_i + (1 - p) · ∫ f''(t)² dt
//! ```
//!
//! in Reinsch form. With `h_i = x_{i+1} - x_i`, the tridiagonal matrix `R`
//! (diagonal `2(h_j + h_{j+1})`, off-diagonal `h_{j+1}`) and the `n×(n-2)`
//! second-difference matrix `Q`, the knot curvatures solve
//!
//! ```text
//! (6(1-p)·QᵀDQ + p·R) u = Δ(Δy/h),     D = diag(var)
//! ```
//!
//! which is symmetric positive definite and pentadiagonal, so it is solved
//! with a banded LDLᵀ factorisation in `O(n)`.
//!
//! `p = 0` gives the least-squares straight line, `p = 1` the natural
//! interpolating cubic spline. Leaving `p` unset picks
//! `p = 1 / (1 + tr(QᵀDQ) / (100·tr(R)²))`.
//!
//! With linear extrapolation the spline continues outside `[x_0, x_{n-1}]`
//! along the tangent at the end knots instead of the end cubics.

use ndarray::{Array1, Array2, ArrayView1};

use crate::error::{KdeError, Result};

/// Symmetric band matrix storing `a[(i, k)] = A[i, i-k]` for `k <= bandwidth`.
struct SymmetricBand {
    lower: Array2<f64>,
}

impl SymmetricBand {
    fn zeros(n: usize, bandwidth: usize) -> Self {
        Self {
            lower: Array2::zeros((n, bandwidth + 1)),
        }
    }

    fn n(&self) -> usize {
        self.lower.nrows()
    }

    fn bandwidth(&self) -> usize {
        self.lower.ncols() - 1
    }

    /// Solve `A x = rhs` by an in-place LDLᵀ factorisation.
    fn solve(mut self, rhs: &Array1<f64>) -> Result<Array1<f64>> {
        let n = self.n();
        let m = self.bandwidth();
        let mut diag = Array1::<f64>::zeros(n);

        for i in 0..n {
            let lo = i.saturating_sub(m);
            let mut d = self.lower[(i, 0)];
            for k in lo..i {
                let lik = self.lower[(i, i - k)];
                d -= lik * lik * diag[k];
            }
            if !(d > 0.0) || !d.is_finite() {
                return Err(KdeError::InvalidInput(
                    "smoothing spline system is not positive definite".into(),
                ));
            }
            diag[i] = d;
            for j in (i + 1)..n.min(i + m + 1) {
                let mut v = self.lower[(j, j - i)];
                for k in j.saturating_sub(m)..i {
                    v -= self.lower[(j, j - k)] * self.lower[(i, i - k)] * diag[k];
                }
                self.lower[(j, j - i)] = v / d;
            }
        }

        let mut x = rhs.clone();
        for i in 0..n {
            for k in i.saturating_sub(m)..i {
                x[i] -= self.lower[(i, i - k)] * x[k];
            }
        }
        for i in 0..n {
            x[i] /= diag[i];
        }
        for i in (0..n).rev() {
            for j in (i + 1)..n.min(i + m + 1) {
                x[i] -= self.lower[(j, j - i)] * x[j];
            }
        }
        Ok(x)
    }
}

/// Piecewise cubic `a_i + b_i t + c_i t² + d_i t³` with `t = x - x_i` on `[x_i, x_{i+1}]`.
#[derive(Debug, Clone)]
pub struct SmoothSpline {
    breaks: Array1<f64>,
    a: Array1<f64>,
    b: Array1<f64>,
    c: Array1<f64>,
    d: Array1<f64>,
    p: f64,
    lin_extrap: bool,
}

impl SmoothSpline {
    /// Fit a smoothing spline through `(x, y)`.
    ///
    /// # Arguments
    ///
    /// * `x` - Abscissae, sorted internally if needed; must be distinct
    /// * `y` - Ordinates, same length as `x`
    /// * `p` - Smoothing parameter in `[0, 1]`; `None` or negative selects it automatically
    /// * `lin_extrap` - Continue linearly outside the data range
    /// * `var` - Per-point variance weights; `None` weighs every point equally
    pub fn fit(
        x: ArrayView1<'_, f64>,
        y: ArrayView1<'_, f64>,
        p: Option<f64>,
        lin_extrap: bool,
        var: Option<ArrayView1<'_, f64>>,
    ) -> Result<Self> {
        let n = x.len();
        if n < 2 {
            return Err(KdeError::InsufficientData { got: n, min: 2 });
        }
        if y.len() != n {
            return Err(KdeError::DimensionMismatch {
                expected: n,
                got: y.len(),
            });
        }
        let var = match var {
            Some(v) if v.len() == n => v.to_owned(),
            Some(v) if v.len() == 1 => Array1::from_elem(n, v[0]),
            Some(v) => {
                return Err(KdeError::DimensionMismatch {
                    expected: n,
                    got: v.len(),
                });
            }
            None => Array1::ones(n),
        };

        let mut order: Vec<usize> = (0..n).collect();
        order.sort_by(|&i, &j| x[i].total_cmp(&x[j]));
        let xs: Array1<f64> = order.iter().map(|&i| x[i]).collect();
        let ys: Array1<f64> = order.iter().map(|&i| y[i]).collect();
        let var: Array1<f64> = order.iter().map(|&i| var[i]).collect();

        let dx: Array1<f64> = (0..n - 1).map(|i| xs[i + 1] - xs[i]).collect();
        if dx.iter().any(|&h| !(h > 0.0)) {
            return Err(KdeError::InvalidInput(
                "smoothing spline abscissae must be distinct and finite".into(),
            ));
        }
        let dydx: Array1<f64> = (0..n - 1).map(|i| (ys[i + 1] - ys[i]) / dx[i]).collect();

        if n == 2 {
            return Ok(Self {
                breaks: xs,
                a: Array1::from_elem(1, ys[0]),
                b: Array1::from_elem(1, dydx[0]),
                c: Array1::zeros(1),
                d: Array1::zeros(1),
                p: p.unwrap_or(1.0).clamp(0.0, 1.0),
                lin_extrap,
            });
        }

        let dx1 = dx.mapv(|h| 1.0 / h);
        let (u, p) = Self::solve_curvatures(p, &var, &dydx, &dx, &dx1)?;

        // a = y - 6(1-p) D Q u
        let a_full: Array1<f64> = if p < 1.0 {
            let mut padded_u = Array1::zeros(n);
            padded_u.slice_mut(ndarray::s![1..n - 1]).assign(&u);
            let slopes: Array1<f64> = (0..n - 1)
                .map(|i| (padded_u[i + 1] - padded_u[i]) * dx1[i])
                .collect();
            (0..n)
                .map(|i| {
                    let left = if i > 0 { slopes[i - 1] } else { 0.0 };
                    let right = if i < n - 1 { slopes[i] } else { 0.0 };
                    ys[i] - 6.0 * (1.0 - p) * var[i] * (right - left)
                })
                .collect()
        } else {
            ys.clone()
        };

        let mut c = Array1::zeros(n - 1);
        for j in 1..n - 1 {
            c[j] = 3.0 * p * u[j - 1];
        }
        let d: Array1<f64> = (0..n - 1)
            .map(|i| {
                let next = if i + 1 < n - 1 { c[i + 1] } else { 0.0 };
                (next - c[i]) * dx1[i] / 3.0
            })
            .collect();
        let b: Array1<f64> = (0..n - 1)
            .map(|i| (a_full[i + 1] - a_full[i]) * dx1[i] - (c[i] + d[i] * dx[i]) * dx[i])
            .collect();
        let a = a_full.slice(ndarray::s![..n - 1]).to_owned();

        Ok(Self {
            breaks: xs,
            a,
            b,
            c,
            d,
            p,
            lin_extrap,
        })
    }

    /// Knot curvatures `u` (length `n-2`) and the smoothing parameter actually used.
    fn solve_curvatures(
        p: Option<f64>,
        var: &Array1<f64>,
        dydx: &Array1<f64>,
        dx: &Array1<f64>,
        dx1: &Array1<f64>,
    ) -> Result<(Array1<f64>, f64)> {
        let m = dx.len() - 1;

        let mut r = SymmetricBand::zeros(m, 2);
        for j in 0..m {
            r.lower[(j, 0)] = 2.0 * (dx[j] + dx[j + 1]);
            if j + 1 < m {
                r.lower[(j + 1, 1)] = dx[j + 1];
            }
        }

        // Column j of Q holds (dx1[j], -(dx1[j]+dx1[j+1]), dx1[j+1]) at rows j..=j+2.
        let q = |j: usize| -> [f64; 3] { [dx1[j], -(dx1[j] + dx1[j + 1]), dx1[j + 1]] };
        let mut qdq = SymmetricBand::zeros(m, 2);
        for j in 0..m {
            let qj = q(j);
            qdq.lower[(j, 0)] =
                var[j] * qj[0] * qj[0] + var[j + 1] * qj[1] * qj[1] + var[j + 2] * qj[2] * qj[2];
            if j + 1 < m {
                let qk = q(j + 1);
                qdq.lower[(j + 1, 1)] = var[j + 1] * qj[1] * qk[0] + var[j + 2] * qj[2] * qk[1];
            }
            if j + 2 < m {
                let qk = q(j + 2);
                qdq.lower[(j + 2, 2)] = var[j + 2] * qj[2] * qk[0];
            }
        }

        let p = match p {
            Some(p) if p >= 0.0 => p.min(1.0),
            _ => {
                let tr_qdq: f64 = qdq.lower.column(0).sum();
                let tr_r: f64 = r.lower.column(0).sum();
                1.0 / (1.0 + tr_qdq / (100.0 * tr_r * tr_r))
            }
        };

        let system = if p >= 1.0 {
            r
        } else if p == 0.0 {
            qdq.lower.mapv_inplace(|v| 6.0 * v);
            qdq
        } else {
            let mut mixed = SymmetricBand::zeros(m, 2);
            mixed.lower = &qdq.lower * (6.0 * (1.0 - p)) + &r.lower * p;
            mixed
        };

        let rhs: Array1<f64> = (0..m).map(|j| dydx[j + 1] - dydx[j]).collect();
        let u = system.solve(&rhs)?;
        Ok((u, p))
    }

    /// Smoothing parameter used in the fit.
    pub fn smoothing(&self) -> f64 {
        self.p
    }

    pub fn breaks(&self) -> ArrayView1<'_, f64> {
        self.breaks.view()
    }

    fn piece(&self, i: usize, t: f64) -> f64 {
        self.a[i] + t * (self.b[i] + t * (self.c[i] + t * self.d[i]))
    }

    fn piece_slope(&self, i: usize, t: f64) -> f64 {
        self.b[i] + t * (2.0 * self.c[i] + 3.0 * t * self.d[i])
    }

    pub fn eval(&self, x: f64) -> f64 {
        let n = self.breaks.len();
        let last = n - 2;
        let x0 = self.breaks[0];
        let xn = self.breaks[n - 1];
        if self.lin_extrap {
            if x < x0 {
                return self.a[0] + self.b[0] * (x - x0);
            }
            if x > xn {
                let h = xn - self.breaks[last];
                return self.piece(last, h) + self.piece_slope(last, h) * (x - xn);
            }
        }
        let i = match self.breaks.as_slice() {
            Some(s) => s.partition_point(|&v| v <= x),
            None => self.breaks.iter().take_while(|&&v| v <= x).count(),
        }
        .saturating_sub(1)
        .min(last);
        self.piece(i, x - self.breaks[i])
    }

    pub fn eval_array(&self, x: ArrayView1<'_, f64>) -> Array1<f64> {
        x.mapv(|v| self.eval(v))
    }
}
