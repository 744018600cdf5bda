// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Smoothing Kernels
//!
//! A kernel `K` is a non-negative weight function with unit integral once
//! divided by its normalisation factor:
//!
//! ∫ K(x) / c_d dx = 1,    x ∈ ℝ^d
//!
//! ## Supported Kernel Types
//!
//! 1. **Radial family** (Epanechnikov, biweight, triweight):
//!    `K(x) = (1 - ‖x‖²/r²)_+^p` with `p = 1, 2, 3`. The normaliser follows
//!    from the volume of the d-ball `V_d(r)`:
//!
//!    c_d = 2^p · p! · V_d(r) / ∏_{k = d+2, d+4, …, d+2p} k
//!
//! 2. **Product family**: the one-dimensional radial shape applied to every
//!    axis and multiplied, normalised by `c_1^d`.
//!
//! 3. **Rectangular**, **triangular**, **Laplace** and **logistic** product
//!    kernels, and the **Gaussian** kernel `exp(-‖x‖²/2σ²)` with `σ = r/4`.
//!
//! ## Kernel Statistics
//!
//! Every bandwidth formula depends on the kernel only through three numbers,
//! computed for the one-dimensional kernel:
//!
//! - `mu2 = ∫ x² K(x) dx`
//! - `R = ∫ K(x)² dx`
//! - `Rdd = ∫ K''(x)² dx` (infinite for kernels that are not twice differentiable)
//!
//! ## Gaussian Derivatives
//!
//! The plug-in and cross-validation selectors need the even derivatives of
//! the standard normal density `φ`. They are `φ^(k)(t) = P_k(t)·φ(t)` with
//! polynomials generated by `P_{k+1}(t) = P_k'(t) - t·P_k(t)`, starting from
//! `P_4(t) = t⁴ - 6t² + 3`.

use ndarray::{Array1, ArrayView1, ArrayView2, Axis};
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use crate::error::{KdeError, Result};
use crate::estimators::utils::stats::sphere_volume;

/// Scalar kernel moments `(mu2, R, Rdd)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KernelStats {
    pub mu2: f64,
    pub r: f64,
    pub rdd: f64,
}

/// The closed set of smoothing kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Kernel {
    Epanechnikov,
    Biweight,
    Triweight,
    ProductEpanechnikov,
    ProductBiweight,
    ProductTriweight,
    Rectangular,
    Triangular,
    #[default]
    Gaussian,
    Laplace,
    Logistic,
}

impl Kernel {
    pub const ALL: [Kernel; 11] = [
        Kernel::Epanechnikov,
        Kernel::Biweight,
        Kernel::Triweight,
        Kernel::ProductEpanechnikov,
        Kernel::ProductBiweight,
        Kernel::ProductTriweight,
        Kernel::Rectangular,
        Kernel::Triangular,
        Kernel::Gaussian,
        Kernel::Laplace,
        Kernel::Logistic,
    ];

    /// Look a kernel up by name. Only the first four letters are significant,
    /// case-insensitively, e.g. `"gauss"`, `"Epanechnikov"`, `"p1biweight"`.
    pub fn from_name(name: &str) -> Result<Self> {
        let key: String = name.trim().to_lowercase().chars().take(4).collect();
        Ok(match key.as_str() {
            "epan" => Kernel::Epanechnikov,
            "biwe" => Kernel::Biweight,
            "triw" => Kernel::Triweight,
            "p1ep" => Kernel::ProductEpanechnikov,
            "p1bi" => Kernel::ProductBiweight,
            "p1tr" => Kernel::ProductTriweight,
            "rect" => Kernel::Rectangular,
            "tria" => Kernel::Triangular,
            "gaus" => Kernel::Gaussian,
            "lapl" => Kernel::Laplace,
            "logi" => Kernel::Logistic,
            _ => return Err(KdeError::UnknownKernel(name.to_string())),
        })
    }

    pub fn name(&self) -> &'static str {
        match self {
            Kernel::Epanechnikov => "epanechnikov",
            Kernel::Biweight => "biweight",
            Kernel::Triweight => "triweight",
            Kernel::ProductEpanechnikov => "p1epanechnikov",
            Kernel::ProductBiweight => "p1biweight",
            Kernel::ProductTriweight => "p1triweight",
            Kernel::Rectangular => "rectangular",
            Kernel::Triangular => "triangular",
            Kernel::Gaussian => "gaussian",
            Kernel::Laplace => "laplace",
            Kernel::Logistic => "logistic",
        }
    }

    /// Support radius, or the nominal width for kernels with unbounded support.
    pub fn radius(&self) -> f64 {
        match self {
            Kernel::Gaussian => 4.0,
            Kernel::Laplace | Kernel::Logistic => 7.0,
            _ => 1.0,
        }
    }

    /// Exponent `p` of the radial and product families.
    pub fn exponent(&self) -> Option<i32> {
        match self {
            Kernel::Epanechnikov | Kernel::ProductEpanechnikov => Some(1),
            Kernel::Biweight | Kernel::ProductBiweight => Some(2),
            Kernel::Triweight | Kernel::ProductTriweight => Some(3),
            _ => None,
        }
    }

    pub fn effective_support(&self) -> (f64, f64) {
        let r = self.radius();
        (-r, r)
    }

    pub fn stats(&self) -> KernelStats {
        let sqrt_pi = PI.sqrt();
        let (mu2, r, rdd) = match self {
            Kernel::Epanechnikov | Kernel::ProductEpanechnikov => (0.2, 0.6, f64::INFINITY),
            Kernel::Biweight | Kernel::ProductBiweight => (1.0 / 7.0, 5.0 / 7.0, 45.0 / 2.0),
            Kernel::Triweight | Kernel::ProductTriweight => {
                (1.0 / 9.0, 350.0 / 429.0, f64::INFINITY)
            }
            Kernel::Rectangular => (1.0 / 3.0, 0.5, f64::INFINITY),
            Kernel::Triangular => (1.0 / 6.0, 2.0 / 3.0, f64::INFINITY),
            Kernel::Laplace => (2.0, 0.25, f64::INFINITY),
            Kernel::Logistic => (PI * PI / 3.0, 1.0 / 6.0, 1.0 / 42.0),
            Kernel::Gaussian => (1.0, 0.5 / sqrt_pi, 0.375 / sqrt_pi),
        };
        KernelStats { mu2, r, rdd }
    }

    /// Unnormalised kernel weight of a single `d`-dimensional point.
    pub fn eval_point(&self, x: &[f64]) -> f64 {
        let r = self.radius();
        match self {
            Kernel::Epanechnikov | Kernel::Biweight | Kernel::Triweight => {
                let p = self.exponent().unwrap_or(1);
                let dist2: f64 = x.iter().map(|v| v * v).sum::<f64>() / (r * r);
                (1.0 - dist2).max(0.0).powi(p)
            }
            Kernel::ProductEpanechnikov | Kernel::ProductBiweight | Kernel::ProductTriweight => {
                let p = self.exponent().unwrap_or(1);
                x.iter()
                    .map(|v| (1.0 - (v / r) * (v / r)).max(0.0).powi(p))
                    .product()
            }
            Kernel::Rectangular => {
                if x.iter().all(|v| v.abs() <= r) {
                    1.0
                } else {
                    0.0
                }
            }
            Kernel::Triangular => x.iter().map(|v| (1.0 - v.abs()).max(0.0)).product(),
            Kernel::Gaussian => {
                let sigma = r / 4.0;
                let dist2: f64 = x.iter().map(|v| (v / sigma) * (v / sigma)).sum();
                (-0.5 * dist2).exp()
            }
            Kernel::Laplace => (-x.iter().map(|v| v.abs()).sum::<f64>()).exp(),
            Kernel::Logistic => x
                .iter()
                .map(|v| {
                    let e = (-v.abs()).exp();
                    e / ((1.0 + e) * (1.0 + e))
                })
                .product(),
        }
    }

    /// One-dimensional unnormalised kernel weight.
    pub fn eval_1d(&self, t: f64) -> f64 {
        self.eval_point(&[t])
    }

    /// Unnormalised kernel weights of the columns of a `d×m` array.
    pub fn eval(&self, x: ArrayView2<'_, f64>) -> Array1<f64> {
        let mut point = vec![0.0; x.nrows()];
        x.axis_iter(Axis(1))
            .map(|col| {
                for (p, v) in point.iter_mut().zip(col.iter()) {
                    *p = *v;
                }
                self.eval_point(&point)
            })
            .collect()
    }

    /// Normaliser `c_d` so that `K(x) / c_d` integrates to one in `d` dimensions.
    pub fn norm_factor(&self, d: usize) -> f64 {
        let df = d as f64;
        let r = self.radius();
        match self {
            Kernel::Epanechnikov | Kernel::Biweight | Kernel::Triweight => {
                Self::radial_norm(self.exponent().unwrap_or(1), d, r)
            }
            Kernel::ProductEpanechnikov | Kernel::ProductBiweight | Kernel::ProductTriweight => {
                Self::radial_norm(self.exponent().unwrap_or(1), 1, r).powi(d as i32)
            }
            Kernel::Rectangular => (2.0 * r).powi(d as i32),
            Kernel::Triangular | Kernel::Logistic => 1.0,
            Kernel::Gaussian => {
                let sigma = r / 4.0;
                (2.0 * PI).powf(df / 2.0) * sigma.powi(d as i32)
            }
            Kernel::Laplace => 2f64.powi(d as i32),
        }
    }

    fn radial_norm(p: i32, d: usize, r: f64) -> f64 {
        let mut factorial = 1.0;
        for k in 2..=p {
            factorial *= k as f64;
        }
        let denominator: f64 = (0..p).map(|k| (d as i32 + 2 + 2 * k) as f64).product();
        2f64.powi(p) * factorial * sphere_volume(d, r) / denominator
    }

    /// Even derivatives `φ⁽⁴⁾, φ⁽⁶⁾, φ⁽⁸⁾, φ⁽¹⁰⁾` of the standard normal density at `t`.
    ///
    /// Returns the first `numout` (1..=4) of them.
    ///
    /// # Errors
    ///
    /// Only defined for the Gaussian kernel.
    pub fn deriv4_6_8_10(&self, t: f64, numout: usize) -> Result<Vec<f64>> {
        self.check_derivatives(numout)?;
        Ok(gaussian_derivatives(t, numout))
    }

    /// Derivative `φ^(4 + 2·index)` evaluated at every element of `t`.
    pub(crate) fn gaussian_derivative_at(
        &self,
        t: ArrayView1<'_, f64>,
        index: usize,
    ) -> Result<Array1<f64>> {
        self.check_derivatives(index + 1)?;
        Ok(t.mapv(|v| gaussian_derivatives(v, index + 1)[index]))
    }

    fn check_derivatives(&self, numout: usize) -> Result<()> {
        if *self != Kernel::Gaussian {
            return Err(KdeError::NotImplemented(format!(
                "derivatives of the {} kernel",
                self.name()
            )));
        }
        if !(1..=4).contains(&numout) {
            return Err(KdeError::InvalidInput(format!(
                "numout must lie in 1..=4, got {numout}"
            )));
        }
        Ok(())
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Kernel {
    type Err = KdeError;

    fn from_str(s: &str) -> Result<Self> {
        Kernel::from_name(s)
    }
}

/// Hermite-type polynomial of a normal-density derivative, coefficients in ascending powers.
#[derive(Debug, Clone)]
struct DerivativePolynomial(Vec<f64>);

impl DerivativePolynomial {
    fn fourth() -> Self {
        DerivativePolynomial(vec![3.0, 0.0, -6.0, 0.0, 1.0])
    }

    /// `P ↦ P' - t·P`, the polynomial of the next derivative.
    fn next(&self) -> Self {
        let c = &self.0;
        let mut out = vec![0.0; c.len() + 1];
        for (k, &ck) in c.iter().enumerate().skip(1) {
            out[k - 1] += k as f64 * ck;
        }
        for (k, &ck) in c.iter().enumerate() {
            out[k + 1] -= ck;
        }
        DerivativePolynomial(out)
    }

    fn eval(&self, t: f64) -> f64 {
        self.0.iter().rev().fold(0.0, |acc, &c| acc * t + c)
    }
}

fn gaussian_derivatives(t: f64, numout: usize) -> Vec<f64> {
    let phi = (-0.5 * t * t).exp() / (2.0 * PI).sqrt();
    let mut poly = DerivativePolynomial::fourth();
    let mut out = Vec::with_capacity(numout);
    out.push(poly.eval(t) * phi);
    for _ in 1..numout {
        poly = poly.next().next();
        out.push(poly.eval(t) * phi);
    }
    out
}
