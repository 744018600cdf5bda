// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! # Linear Binning
//!
//! Spreads the unit mass of every sample over the corners of the grid cell
//! that contains it. In one dimension a sample at `x` with `X_b <= x <= X_{b+1}`
//! contributes
//!
//! ```text
//! (X_{b+1} - x) / Δ_b  to node b      and      (x - X_b) / Δ_b  to node b+1
//! ```
//!
//! and in `D` dimensions the corner `b + β`, `β ∈ {0,1}^D`, receives the
//! product of the per-axis fractions. The counts are therefore non-negative
//! and sum to the number of samples.
//!
//! The returned array has one axis per dimension with `c[[i_0, …, i_{D-1}]]`
//! belonging to the node `(X_0[i_0], …, X_{D-1}[i_{D-1}])`.

use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, IxDyn};

use crate::error::{KdeError, Result};

/// Lower node index and upper-node fraction of `x` on the sorted axis `grid`.
fn locate(grid: ArrayView1<'_, f64>, x: f64, dim: usize) -> Result<(usize, f64)> {
    let inc = grid.len();
    if !(x >= grid[0] && x <= grid[inc - 1]) {
        return Err(KdeError::DataOutsideGrid { dim });
    }
    let upper = match grid.as_slice() {
        Some(s) => s.partition_point(|&v| v <= x),
        None => grid.iter().take_while(|&&v| v <= x).count(),
    };
    let b = upper.saturating_sub(1).min(inc - 2);
    let width = grid[b + 1] - grid[b];
    let frac = if width > 0.0 {
        ((x - grid[b]) / width).clamp(0.0, 1.0)
    } else {
        0.0
    };
    Ok((b, frac))
}

fn validate(data: ArrayView2<'_, f64>, grid: ArrayView2<'_, f64>) -> Result<()> {
    let (d, _) = data.dim();
    let (gd, inc) = grid.dim();
    if d != gd {
        return Err(KdeError::DimensionMismatch {
            expected: d,
            got: gd,
        });
    }
    if inc < 2 {
        return Err(KdeError::InvalidInput(
            "grid must hold at least two nodes per dimension".into(),
        ));
    }
    for k in 0..gd {
        let axis = grid.row(k);
        if axis.windows(2).into_iter().any(|w| !(w[1] > w[0])) {
            return Err(KdeError::InvalidInput(format!(
                "grid axis {k} is not strictly increasing"
            )));
        }
    }
    Ok(())
}

/// Linear-binned counts of `D×N` data on the `D×inc` grid `grid`.
///
/// # Errors
///
/// `DimensionMismatch` when data and grid disagree on `D`, `DataOutsideGrid`
/// when a sample lies outside `[grid[k, 0], grid[k, inc-1]]`.
pub fn gridcount(data: ArrayView2<'_, f64>, grid: ArrayView2<'_, f64>) -> Result<ArrayD<f64>> {
    validate(data, grid)?;
    match data.nrows() {
        1 => Ok(gridcount_1d(data.row(0), grid.row(0))?.into_dyn()),
        2 => Ok(gridcount_2d(data, grid)?.into_dyn()),
        _ => gridcount_nd(data, grid),
    }
}

fn gridcount_1d(data: ArrayView1<'_, f64>, grid: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
    let mut c = Array1::zeros(grid.len());
    for &x in data.iter() {
        let (b, w) = locate(grid, x, 0)?;
        c[b] += 1.0 - w;
        c[b + 1] += w;
    }
    Ok(c)
}

fn gridcount_2d(data: ArrayView2<'_, f64>, grid: ArrayView2<'_, f64>) -> Result<Array2<f64>> {
    let inc = grid.ncols();
    let mut c = Array2::zeros((inc, inc));
    for (x, y) in data.row(0).iter().zip(data.row(1).iter()) {
        let (bx, wx) = locate(grid.row(0), *x, 0)?;
        let (by, wy) = locate(grid.row(1), *y, 1)?;
        c[(bx, by)] += (1.0 - wx) * (1.0 - wy);
        c[(bx + 1, by)] += wx * (1.0 - wy);
        c[(bx, by + 1)] += (1.0 - wx) * wy;
        c[(bx + 1, by + 1)] += wx * wy;
    }
    Ok(c)
}

/// General `D` by enumerating the `2^D` cell corners as bit patterns.
fn gridcount_nd(data: ArrayView2<'_, f64>, grid: ArrayView2<'_, f64>) -> Result<ArrayD<f64>> {
    let (d, n) = data.dim();
    let inc = grid.ncols();
    let mut c = ArrayD::zeros(IxDyn(&vec![inc; d]));
    let mut lower = vec![0usize; d];
    let mut frac = vec![0.0; d];
    let mut index = vec![0usize; d];
    for i in 0..n {
        for k in 0..d {
            let (b, w) = locate(grid.row(k), data[(k, i)], k)?;
            lower[k] = b;
            frac[k] = w;
        }
        for pattern in 0..(1usize << d) {
            let mut weight = 1.0;
            for k in 0..d {
                let upper = (pattern >> k) & 1 == 1;
                index[k] = lower[k] + usize::from(upper);
                weight *= if upper { frac[k] } else { 1.0 - frac[k] };
            }
            c[IxDyn(&index)] += weight;
        }
    }
    Ok(c)
}
