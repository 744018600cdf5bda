// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

//! FFT based circular convolution of binned data with sampled kernels.
//!
//! ## Mirrored kernel layout
//!
//! A symmetric kernel sampled at the non-negative offsets `0, Δ, …, (inc-1)Δ`
//! is laid out on a periodic support of length `2·inc` as
//!
//! ```text
//! index:  0      1   …  inc-1        inc   inc+1        …  2inc-1
//! value:  kw[0]  kw[1] … kw[inc-1]   0     kw[inc-1]    …  kw[1]
//! ```
//!
//! so that index `j` holds the kernel at offset `j` for `j < inc` and at
//! offset `j - 2inc` above. Binned counts are zero padded to the same length,
//! which keeps the circular wrap-around out of the first `inc` outputs.

use ndarray::{Array1, ArrayD, ArrayView1, ArrayViewD, Axis, s};
use rustfft::{FftPlanner, num_complex::Complex};

use crate::error::{KdeError, Result};

/// Transform an N-d complex array in place along every axis.
///
/// The inverse transform is normalised by the total number of elements.
pub fn fftn_inplace(data: &mut ArrayD<Complex<f64>>, inverse: bool) {
    let mut planner = FftPlanner::<f64>::new();
    for axis in 0..data.ndim() {
        let len = data.len_of(Axis(axis));
        if len <= 1 {
            continue;
        }
        let fft = if inverse {
            planner.plan_fft_inverse(len)
        } else {
            planner.plan_fft_forward(len)
        };
        let mut buffer: Vec<Complex<f64>> = vec![Complex::new(0.0, 0.0); len];
        for mut lane in data.lanes_mut(Axis(axis)) {
            for (b, v) in buffer.iter_mut().zip(lane.iter()) {
                *b = *v;
            }
            fft.process(&mut buffer);
            let scale = if inverse { 1.0 / len as f64 } else { 1.0 };
            for (v, b) in lane.iter_mut().zip(buffer.iter()) {
                *v = *b * scale;
            }
        }
    }
}

fn to_complex(data: ArrayViewD<'_, f64>) -> ArrayD<Complex<f64>> {
    data.mapv(|v| Complex::new(v, 0.0))
}

/// Real part of the circular convolution of two equally shaped arrays.
pub fn circular_convolve(a: ArrayViewD<'_, f64>, b: ArrayViewD<'_, f64>) -> Result<ArrayD<f64>> {
    if a.shape() != b.shape() {
        return Err(KdeError::InvalidInput(format!(
            "cannot convolve arrays of shape {:?} and {:?}",
            a.shape(),
            b.shape()
        )));
    }
    let mut fa = to_complex(a);
    let mut fb = to_complex(b);
    fftn_inplace(&mut fa, false);
    fftn_inplace(&mut fb, false);
    fa.zip_mut_with(&fb, |x, y| *x *= *y);
    fftn_inplace(&mut fa, true);
    Ok(fa.mapv(|z| z.re))
}

/// Periodic support of length `2·inc` holding a symmetric kernel sampled at
/// non-negative offsets.
pub fn mirrored_kernel(kw: ArrayView1<'_, f64>) -> Array1<f64> {
    let inc = kw.len();
    let mut support = Array1::zeros(2 * inc);
    for j in 0..inc {
        support[j] = kw[j];
    }
    for j in 1..inc {
        support[2 * inc - j] = kw[j];
    }
    support
}

/// Convolution `(counts ⊛ K)[k]` at the `inc` grid nodes.
///
/// `counts` are linear-binned data on `inc` equally spaced nodes and `kw`
/// the kernel sampled at the node offsets `0, Δ, …, (inc-1)Δ`.
pub fn binned_convolution(counts: ArrayView1<'_, f64>, kw: ArrayView1<'_, f64>) -> Result<Array1<f64>> {
    let inc = counts.len();
    if kw.len() != inc {
        return Err(KdeError::DimensionMismatch {
            expected: inc,
            got: kw.len(),
        });
    }
    let mut padded_counts = Array1::zeros(2 * inc);
    padded_counts.slice_mut(s![..inc]).assign(&counts);
    let kernel_support = mirrored_kernel(kw);
    let convolution = circular_convolve(
        padded_counts.view().into_dyn(),
        kernel_support.view().into_dyn(),
    )?;
    Ok(convolution.iter().take(inc).copied().collect())
}

/// Binned approximation of `Σ_i Σ_j K(x_i - x_j)`, i.e. `Σ_k counts[k]·(counts ⊛ K)[k]`.
pub fn binned_functional(counts: ArrayView1<'_, f64>, kw: ArrayView1<'_, f64>) -> Result<f64> {
    let convolution = binned_convolution(counts, kw)?;
    Ok(counts.dot(&convolution))
}
