// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Piecewise-linear interpolation on sorted abscissae.
//!
//! All routines assume `xp` is strictly increasing and `xp.len() == fp.len() >= 1`.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

/// Index `i` of the interval `[xp[i], xp[i+1]]` holding `x`, clamped to `0..=len-2`.
fn bracket(xp: ArrayView1<'_, f64>, x: f64) -> usize {
    let n = xp.len();
    let upper = xp
        .as_slice()
        .map(|s| s.partition_point(|&v| v <= x))
        .unwrap_or_else(|| xp.iter().take_while(|&&v| v <= x).count());
    upper.saturating_sub(1).min(n.saturating_sub(2))
}

fn lerp(xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>, i: usize, x: f64) -> f64 {
    let (x0, x1) = (xp[i], xp[i + 1]);
    let (y0, y1) = (fp[i], fp[i + 1]);
    if x1 == x0 {
        return y0;
    }
    y0 + (x - x0) * (y1 - y0) / (x1 - x0)
}

/// Linear interpolation holding the end values constant outside `[xp[0], xp[last]]`.
pub fn interp1(x: f64, xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>) -> f64 {
    let n = xp.len();
    if n == 1 || x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    lerp(xp, fp, bracket(xp, x), x)
}

/// Linear interpolation continuing the first and last segments outside the data range.
pub fn interp_extrap(x: f64, xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>) -> f64 {
    if xp.len() == 1 {
        return fp[0];
    }
    lerp(xp, fp, bracket(xp, x), x)
}

pub fn interp1_array(
    x: ArrayView1<'_, f64>,
    xp: ArrayView1<'_, f64>,
    fp: ArrayView1<'_, f64>,
) -> Array1<f64> {
    x.mapv(|v| interp1(v, xp, fp))
}

pub fn interp_extrap_array(
    x: ArrayView1<'_, f64>,
    xp: ArrayView1<'_, f64>,
    fp: ArrayView1<'_, f64>,
) -> Array1<f64> {
    x.mapv(|v| interp_extrap(v, xp, fp))
}

/// Linear interpolation returning `fill` outside `[xp[0], xp[last]]`.
pub fn interp1_fill(x: f64, xp: ArrayView1<'_, f64>, fp: ArrayView1<'_, f64>, fill: f64) -> f64 {
    let n = xp.len();
    if x < xp[0] || x > xp[n - 1] || x.is_nan() {
        return fill;
    }
    interp1(x, xp, fp)
}

/// Bilinear interpolation of `values[(i, j)]` sampled at `(xa[i], ya[j])`.
///
/// Queries outside the rectangle spanned by the axes evaluate to `fill`.
pub fn interp2_bilinear(
    x: f64,
    y: f64,
    xa: ArrayView1<'_, f64>,
    ya: ArrayView1<'_, f64>,
    values: ArrayView2<'_, f64>,
    fill: f64,
) -> f64 {
    let (nx, ny) = (xa.len(), ya.len());
    if nx < 2 || ny < 2 {
        return fill;
    }
    if x < xa[0] || x > xa[nx - 1] || y < ya[0] || y > ya[ny - 1] || x.is_nan() || y.is_nan() {
        return fill;
    }
    let i = bracket(xa, x);
    let j = bracket(ya, y);
    let tx = (x - xa[i]) / (xa[i + 1] - xa[i]);
    let ty = (y - ya[j]) / (ya[j + 1] - ya[j]);
    (1.0 - tx) * (1.0 - ty) * values[(i, j)]
        + tx * (1.0 - ty) * values[(i + 1, j)]
        + (1.0 - tx) * ty * values[(i, j + 1)]
        + tx * ty * values[(i + 1, j + 1)]
}

/// Bilinear interpolation onto the full rectilinear grid `qx × qy`.
pub fn interp2_grid(
    qx: ArrayView1<'_, f64>,
    qy: ArrayView1<'_, f64>,
    xa: ArrayView1<'_, f64>,
    ya: ArrayView1<'_, f64>,
    values: ArrayView2<'_, f64>,
    fill: f64,
) -> Array2<f64> {
    Array2::from_shape_fn((qx.len(), qy.len()), |(i, j)| {
        interp2_bilinear(qx[i], qy[j], xa, ya, values, fill)
    })
}
