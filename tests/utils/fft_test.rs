// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use ndarray::{Array2, array};

use kdetools::estimators::utils::fft::{
    binned_convolution, binned_functional, circular_convolve, mirrored_kernel,
};

#[test]
fn mirrored_layout() {
    let kw = array![1.0, 0.5, 0.25];
    assert_eq!(mirrored_kernel(kw.view()).to_vec(), vec![1.0, 0.5, 0.25, 0.0, 0.25, 0.5]);
}

#[test]
fn binned_convolution_places_kernel_at_sample() {
    let kw = array![1.0, 0.5, 0.25, 0.1];
    let left = binned_convolution(array![1.0, 0.0, 0.0, 0.0].view(), kw.view()).unwrap();
    let right = binned_convolution(array![0.0, 0.0, 0.0, 1.0].view(), kw.view()).unwrap();
    for (a, b) in left.iter().zip([1.0, 0.5, 0.25, 0.1]) {
        assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
    }
    for (a, b) in right.iter().zip([0.1, 0.25, 0.5, 1.0]) {
        assert_abs_diff_eq!(*a, b, epsilon = 1e-12);
    }
}

#[test]
fn binned_functional_matches_double_sum() {
    let counts = array![2.0, 0.0, 1.0];
    let kw = array![1.0, 0.5, 0.25];
    // Σ_k Σ_m c_k c_m K(|k-m|)
    let expected = 2.0 * 2.0 * 1.0 + 1.0 * 1.0 * 1.0 + 2.0 * 2.0 * 1.0 * 0.25;
    assert_abs_diff_eq!(
        binned_functional(counts.view(), kw.view()).unwrap(),
        expected,
        epsilon = 1e-12
    );
}

#[test]
fn two_dimensional_circular_convolution() {
    let mut delta = Array2::zeros((4, 4));
    delta[(1, 2)] = 1.0;
    let kernel = Array2::from_shape_fn((4, 4), |(i, j)| (i * 4 + j) as f64);
    let out = circular_convolve(delta.view().into_dyn(), kernel.view().into_dyn()).unwrap();
    for i in 0..4 {
        for j in 0..4 {
            let expected = kernel[((i + 3) % 4, (j + 2) % 4)];
            assert_abs_diff_eq!(out[[i, j]], expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn shapes_must_agree() {
    let a = Array2::<f64>::zeros((2, 3)).into_dyn();
    let b = Array2::<f64>::zeros((3, 2)).into_dyn();
    assert!(circular_convolve(a.view(), b.view()).is_err());
    assert!(binned_convolution(array![1.0, 2.0].view(), array![1.0].view()).is_err());
}
