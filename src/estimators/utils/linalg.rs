// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Small dense linear algebra on `D×D` bandwidth matrices, bridged to `nalgebra`.

use nalgebra::DMatrix;
use ndarray::{Array2, ArrayView2};

use crate::error::{KdeError, Result};

fn to_nalgebra(a: ArrayView2<'_, f64>) -> DMatrix<f64> {
    let (r, c) = a.dim();
    DMatrix::from_fn(r, c, |i, j| a[(i, j)])
}

fn to_ndarray(m: &DMatrix<f64>) -> Array2<f64> {
    Array2::from_shape_fn((m.nrows(), m.ncols()), |(i, j)| m[(i, j)])
}

fn ensure_square(a: ArrayView2<'_, f64>) -> Result<usize> {
    let (r, c) = a.dim();
    if r != c {
        return Err(KdeError::DimensionMismatch {
            expected: r,
            got: c,
        });
    }
    Ok(r)
}

pub fn det(a: ArrayView2<'_, f64>) -> Result<f64> {
    ensure_square(a)?;
    Ok(to_nalgebra(a).determinant())
}

pub fn inv(a: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    ensure_square(a)?;
    to_nalgebra(a)
        .try_inverse()
        .map(|m| to_ndarray(&m))
        .ok_or_else(|| KdeError::InvalidBandwidth("bandwidth matrix is singular".into()))
}

/// Symmetric and admits a Cholesky factorisation.
pub fn is_positive_definite(a: ArrayView2<'_, f64>) -> bool {
    let Ok(n) = ensure_square(a) else {
        return false;
    };
    for i in 0..n {
        for j in 0..i {
            let scale = a[(i, j)].abs().max(a[(j, i)].abs()).max(1.0);
            if (a[(i, j)] - a[(j, i)]).abs() > 1e-10 * scale {
                return false;
            }
        }
    }
    to_nalgebra(a).cholesky().is_some()
}

/// Principal square root of a symmetric positive semi-definite matrix.
pub fn sqrtm_symmetric(a: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    ensure_square(a)?;
    let eig = to_nalgebra(a).symmetric_eigen();
    if eig.eigenvalues.iter().any(|&l| l < -1e-12) {
        return Err(KdeError::NotPositiveDefinite);
    }
    let sqrt_vals = DMatrix::from_diagonal(&eig.eigenvalues.map(|l| l.max(0.0).sqrt()));
    let root = &eig.eigenvectors * sqrt_vals * eig.eigenvectors.transpose();
    Ok(to_ndarray(&root))
}
