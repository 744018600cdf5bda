// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use ndarray::{Array2, array};
use rstest::rstest;

use kdetools::KdeError;
use kdetools::estimators::approaches::common_nd::gridcount;

use crate::test_helpers::{generate_uniform_data, rayleigh_row};

fn uniform_grid(d: usize, inc: usize, lo: f64, hi: f64) -> Array2<f64> {
    let axis = ndarray::Array1::linspace(lo, hi, inc);
    Array2::from_shape_fn((d, inc), |(_, j)| axis[j])
}

#[test]
fn one_dimensional_counts_sum_to_sample_size() {
    let data = rayleigh_row();
    let grid = array![[0.0, 0.5, 1.0, 1.5, 2.0, 2.5]];
    let c = gridcount(data.view(), grid.view()).unwrap();
    assert_eq!(c.shape(), &[6]);
    assert_abs_diff_eq!(c.sum(), 20.0, epsilon = 1e-12);
    assert!(c.iter().all(|&v| v >= 0.0));
}

#[test]
fn sample_mass_is_split_between_neighbouring_nodes() {
    let data = array![[0.25, 1.0]];
    let grid = array![[0.0, 1.0, 2.0]];
    let c = gridcount(data.view(), grid.view()).unwrap();
    assert_abs_diff_eq!(c[[0]], 0.75, epsilon = 1e-15);
    assert_abs_diff_eq!(c[[1]], 1.25, epsilon = 1e-15);
    assert_abs_diff_eq!(c[[2]], 0.0, epsilon = 1e-15);
}

#[test]
fn uneven_spacing_uses_local_cell_width() {
    let data = array![[1.5]];
    let grid = array![[0.0, 1.0, 3.0]];
    let c = gridcount(data.view(), grid.view()).unwrap();
    assert_abs_diff_eq!(c[[1]], 0.75, epsilon = 1e-15);
    assert_abs_diff_eq!(c[[2]], 0.25, epsilon = 1e-15);
}

#[test]
fn samples_on_the_last_node_stay_in_range() {
    let data = array![[2.0, 0.0]];
    let grid = array![[0.0, 1.0, 2.0]];
    let c = gridcount(data.view(), grid.view()).unwrap();
    assert_eq!(c.iter().copied().collect::<Vec<_>>(), vec![1.0, 0.0, 1.0]);
}

#[test]
fn two_dimensional_corners_use_product_weights() {
    let data = array![[0.25], [0.5]];
    let grid = array![[0.0, 1.0], [0.0, 1.0]];
    let c = gridcount(data.view(), grid.view()).unwrap();
    assert_eq!(c.shape(), &[2, 2]);
    assert_abs_diff_eq!(c[[0, 0]], 0.75 * 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(c[[1, 0]], 0.25 * 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(c[[0, 1]], 0.75 * 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(c[[1, 1]], 0.25 * 0.5, epsilon = 1e-15);
}

#[rstest]
#[case(1, 16)]
#[case(2, 12)]
#[case(3, 8)]
#[case(4, 5)]
fn counts_preserve_mass(#[case] d: usize, #[case] inc: usize) {
    let data = generate_uniform_data(57, d, -1.0, 1.0, 3 + d as u64);
    let grid = uniform_grid(d, inc, -1.0, 1.0);
    let c = gridcount(data.view(), grid.view()).unwrap();
    assert_eq!(c.ndim(), d);
    assert!(c.shape().iter().all(|&s| s == inc));
    assert_abs_diff_eq!(c.sum(), 57.0, epsilon = 1e-9);
    assert!(c.iter().all(|&v| v >= 0.0));
}

#[test]
fn higher_dimensions_agree_with_two_dimensional_path() {
    let data = generate_uniform_data(30, 2, 0.0, 1.0, 8);
    let grid = uniform_grid(2, 6, 0.0, 1.0);
    let c2 = gridcount(data.view(), grid.view()).unwrap();

    // Third axis where every sample sits on the first node.
    let mut data3 = Array2::zeros((3, 30));
    data3.slice_mut(ndarray::s![0..2, ..]).assign(&data);
    let grid3 = uniform_grid(3, 6, 0.0, 1.0);
    let c3 = gridcount(data3.view(), grid3.view()).unwrap();
    let slice = c3.slice(ndarray::s![.., .., 0]);
    for (a, b) in c2.iter().zip(slice.iter()) {
        assert_abs_diff_eq!(*a, *b, epsilon = 1e-12);
    }
}

#[test]
fn data_outside_grid_is_rejected() {
    let data = array![[0.5, 3.0]];
    let grid = array![[0.0, 1.0, 2.0]];
    assert!(matches!(
        gridcount(data.view(), grid.view()),
        Err(KdeError::DataOutsideGrid { dim: 0 })
    ));

    let data = array![[0.5], [-0.1]];
    let grid = array![[0.0, 1.0], [0.0, 1.0]];
    assert!(matches!(
        gridcount(data.view(), grid.view()),
        Err(KdeError::DataOutsideGrid { dim: 1 })
    ));
}

#[test]
fn grid_dimension_must_match_data() {
    let data = array![[0.5], [0.5]];
    let grid = array![[0.0, 1.0]];
    assert!(matches!(
        gridcount(data.view(), grid.view()),
        Err(KdeError::DimensionMismatch { expected: 2, got: 1 })
    ));
}
