// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{Array1, Array2, Axis, array};

use kdetools::KdeError;
use kdetools::estimators::approaches::kernel::bandwidth;
use kdetools::estimators::approaches::kernel::{Bandwidth, Kde, KdeConfig, Kernel};
use kdetools::estimators::density::Density;
use kdetools::estimators::traits::DensityEstimator;

use crate::test_helpers::{
    assert_all_close, generate_gaussian_data, rayleigh_data, rayleigh_max, rayleigh_row, trapz,
};

const FIXED_PDF: [f64; 10] = [
    0.20397350, 0.40252503, 0.54595078, 0.52219649, 0.39062130, 0.26381501, 0.16407362,
    0.08270612, 0.02991145, 0.00720821,
];

const ADAPTIVE_PDF: [f64; 10] = [
    0.17252055, 0.41014271, 0.61349072, 0.57023834, 0.37198073, 0.21409279, 0.12738463,
    0.07460326, 0.03956191, 0.01887164,
];

fn fixture_points() -> Array1<f64> {
    Array1::linspace(0.0, rayleigh_max() + 1.0, 10)
}

fn max_abs_diff(a: &Array1<f64>, b: &Array1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0, f64::max)
}

#[test]
fn fixed_bandwidth_gaussian_values() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default().with_bandwidth(0.5)).unwrap();
    let x = fixture_points();
    let f = kde.eval_points(x.view().insert_axis(Axis(0))).unwrap();
    assert!(f.is_clean());
    assert_all_close(&f.value, &FIXED_PDF, 1e-6, "fixed_bandwidth_gaussian_values");
}

#[test]
fn adaptive_gaussian_values() {
    let config = KdeConfig::default().with_bandwidth(0.5).with_alpha(0.5);
    let kde = Kde::new(rayleigh_data(), config).unwrap();
    let x = fixture_points();
    let f = kde.eval_points(x.view().insert_axis(Axis(0))).unwrap().value;
    assert_all_close(&f, &ADAPTIVE_PDF, 1e-6, "adaptive_gaussian_values");
}

#[test]
fn grid_and_points_agree_in_one_dimension() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default().with_bandwidth(0.5)).unwrap();
    let x = fixture_points();
    let grid = kde
        .eval_grid(&[x.clone()])
        .unwrap()
        .value
        .into_dimensionality::<ndarray::Ix1>()
        .unwrap();
    assert_all_close(&grid, &FIXED_PDF, 1e-6, "grid_and_points_agree_in_one_dimension");
}

#[test]
fn default_estimate_integrates_to_one() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default()).unwrap();
    let axis = kde.default_axes().remove(0);
    let f = kde.eval_grid(&[]).unwrap().value;
    assert_eq!(f.shape(), &[128]);
    let f = f.into_dimensionality::<ndarray::Ix1>().unwrap();
    assert_abs_diff_eq!(trapz(&f, &axis), 1.0, epsilon = 0.02);
}

#[test]
fn default_box_is_two_robust_sigmas_wide() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default()).unwrap();
    let data = rayleigh_data();
    let sigma = kdetools::estimators::utils::stats::robust_sigma(data.view(), 1.34).unwrap();
    assert_relative_eq!(kde.xmin()[0], 0.07841119 - 2.0 * sigma, max_relative = 1e-12);
    assert_relative_eq!(kde.xmax()[0], rayleigh_max() + 2.0 * sigma, max_relative = 1e-12);
}

#[test]
fn automatic_bandwidth_uses_normal_scale() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default()).unwrap();
    let hns = bandwidth::hns(rayleigh_row().view(), Kernel::Gaussian).unwrap();
    assert_eq!(kde.bandwidth(), &Bandwidth::Diagonal(hns));
    assert!(kde.diagnostics().is_empty());
}

#[test]
fn non_positive_bandwidth_entries_are_recomputed() {
    let data = generate_gaussian_data(100, 2, 0.0, 1.0, 11);
    let config = KdeConfig::default().with_bandwidth(array![0.4, -1.0]);
    let kde = Kde::new(data.clone(), config).unwrap();
    let Bandwidth::Diagonal(h) = kde.bandwidth() else {
        panic!("expected a diagonal bandwidth");
    };
    let row = data.row(1).to_owned().insert_axis(Axis(0));
    let expected = bandwidth::hns(row.view(), Kernel::Gaussian).unwrap();
    assert_eq!(h[0], 0.4);
    assert_relative_eq!(h[1], expected[0], max_relative = 1e-12);
}

#[test]
fn scalar_bandwidth_is_broadcast() {
    let data = generate_gaussian_data(30, 3, 0.0, 1.0, 5);
    let kde = Kde::new(data, KdeConfig::default().with_bandwidth(0.7)).unwrap();
    assert_eq!(kde.bandwidth(), &Bandwidth::Diagonal(array![0.7, 0.7, 0.7]));
    assert_relative_eq!(kde.inv_bandwidth()[(2, 2)], 1.0 / 0.7, max_relative = 1e-15);
}

#[test]
fn bandwidth_matrix_must_be_positive_definite() {
    let data = generate_gaussian_data(30, 2, 0.0, 1.0, 9);
    let indefinite = array![[1.0, 2.0], [2.0, 1.0]];
    let result = Kde::new(data.clone(), KdeConfig::default().with_bandwidth(indefinite));
    assert!(matches!(result, Err(KdeError::NotPositiveDefinite)));

    let spd = array![[0.5, 0.1], [0.1, 0.4]];
    let kde = Kde::new(data, KdeConfig::default().with_bandwidth(spd.clone())).unwrap();
    assert_eq!(kde.bandwidth(), &Bandwidth::Matrix(spd));
}

#[test]
fn full_matrix_matches_diagonal_matrix() {
    let data = generate_gaussian_data(40, 2, 0.0, 1.0, 13);
    let diag = Kde::new(data.clone(), KdeConfig::default().with_bandwidth(array![0.5, 0.3])).unwrap();
    let full = Kde::new(
        data,
        KdeConfig::default().with_bandwidth(array![[0.5, 0.0], [0.0, 0.3]]),
    )
    .unwrap();
    let points = array![[0.0, 0.5, -1.0], [0.2, -0.3, 1.1]];
    let a = diag.eval_points(points.view()).unwrap().value;
    let b = full.eval_points(points.view()).unwrap().value;
    for (x, y) in a.iter().zip(b.iter()) {
        assert_relative_eq!(*x, *y, max_relative = 1e-12);
    }
}

#[test]
fn few_and_many_points_give_the_same_values() {
    let data = generate_gaussian_data(20, 2, 0.0, 1.0, 7);
    let kde = Kde::new(data, KdeConfig::default()).unwrap();
    let few = array![[0.0, 0.5, -1.0], [0.2, -0.3, 1.1]];
    let many = Array2::from_shape_fn((2, 60), |(k, j)| few[(k, j % 3)]);
    let a = kde.eval_points(few.view()).unwrap().value;
    let b = kde.eval_points(many.view()).unwrap().value;
    for (j, v) in b.iter().enumerate() {
        assert_relative_eq!(*v, a[j % 3], max_relative = 1e-12);
    }
}

#[test]
fn eval_grid_uses_matrix_indexing() {
    let data = generate_gaussian_data(50, 2, 0.0, 1.0, 21);
    let kde = Kde::new(data, KdeConfig::default()).unwrap();
    let x0 = Array1::linspace(-1.0, 1.0, 5);
    let x1 = Array1::linspace(-2.0, 2.0, 7);
    let grid = kde.eval_grid(&[x0.clone(), x1.clone()]).unwrap().value;
    assert_eq!(grid.shape(), &[5, 7]);
    for i in [0, 2, 4] {
        for j in [1, 3, 6] {
            let point = array![[x0[i]], [x1[j]]];
            let direct = kde.eval_points(point.view()).unwrap().value[0];
            assert_relative_eq!(grid[[i, j]], direct, max_relative = 1e-12);
        }
    }
}

#[test]
fn single_point_row_is_reshaped() {
    let data = generate_gaussian_data(50, 2, 0.0, 1.0, 17);
    let kde = Kde::new(data, KdeConfig::default()).unwrap();
    let column = kde.eval_points(array![[0.3], [-0.2]].view()).unwrap().value;
    let row = kde.eval_points(array![[0.3, -0.2]].view()).unwrap().value;
    assert_eq!(row.len(), 1);
    assert_eq!(column[0], row[0]);
}

#[test]
fn points_of_wrong_dimension_are_rejected() {
    let data = generate_gaussian_data(50, 2, 0.0, 1.0, 17);
    let kde = Kde::new(data, KdeConfig::default()).unwrap();
    let points = Array2::zeros((3, 4));
    assert!(matches!(
        kde.eval_points(points.view()),
        Err(KdeError::DimensionMismatch { expected: 2, got: 3 })
    ));
    assert!(matches!(
        kde.eval_grid(&[Array1::linspace(0.0, 1.0, 3)]),
        Err(KdeError::DimensionMismatch { expected: 2, got: 1 })
    ));
}

#[test]
fn adaptive_scales_have_unit_geometric_mean() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default().with_bandwidth(0.5).with_alpha(0.5))
        .unwrap();
    let log_sum: f64 = kde.lambda().iter().map(|l| l.ln()).sum();
    assert_abs_diff_eq!(log_sum, 0.0, epsilon = 1e-10);
    // Sparse samples get wider kernels.
    let outlier = 4; // 2.32291887
    let dense = 1; // 0.72779194
    assert!(kde.lambda()[outlier] > kde.lambda()[dense]);
}

#[test]
fn negative_alpha_is_rejected() {
    assert!(Kde::new(rayleigh_data(), KdeConfig::default().with_alpha(-0.1)).is_err());
}

#[test]
fn fast_grid_agrees_with_direct_grid_1d() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default().with_bandwidth(0.5)).unwrap();
    let direct = kde
        .eval_grid(&[])
        .unwrap()
        .value
        .into_dimensionality::<ndarray::Ix1>()
        .unwrap();
    let fast = kde
        .eval_grid_fast(&[])
        .unwrap()
        .value
        .into_dimensionality::<ndarray::Ix1>()
        .unwrap();
    let peak = direct.iter().copied().fold(0.0, f64::max);
    assert!(max_abs_diff(&direct, &fast) < 0.03 * peak);
    assert!(fast.iter().all(|&v| v >= 0.0));
}

#[test]
fn fast_grid_agrees_with_direct_grid_2d() {
    let data = generate_gaussian_data(200, 2, 0.0, 1.0, 99);
    let kde = Kde::new(data, KdeConfig::default().with_inc(64)).unwrap();
    let direct = kde.eval_grid(&[]).unwrap().value;
    let fast = kde.eval_grid_fast(&[]).unwrap().value;
    assert_eq!(fast.shape(), &[64, 64]);
    let peak = direct.iter().copied().fold(0.0, f64::max);
    let worst = direct
        .iter()
        .zip(fast.iter())
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max);
    assert!(worst < 0.05 * peak, "worst {worst} vs peak {peak}");
}

#[test]
fn fast_grid_interpolates_custom_axes() {
    let kde = Kde::new(rayleigh_data(), KdeConfig::default().with_bandwidth(0.5)).unwrap();
    let x = Array1::linspace(0.0, rayleigh_max() + 1.0, 10);
    let fast = kde
        .eval_grid_fast(&[x.clone()])
        .unwrap()
        .value
        .into_dimensionality::<ndarray::Ix1>()
        .unwrap();
    let direct = kde.eval_points(x.view().insert_axis(Axis(0))).unwrap().value;
    assert_eq!(fast.len(), 10);
    assert!(max_abs_diff(&direct, &fast) < 0.02);

    let outside = kde.eval_grid_fast(&[array![-10.0, 10.0]]).unwrap().value;
    assert_eq!(outside.iter().copied().collect::<Vec<_>>(), vec![0.0, 0.0]);
}

#[test]
fn fast_grid_custom_axes_above_two_dimensions_is_unsupported() {
    let data = generate_gaussian_data(30, 3, 0.0, 1.0, 1);
    let kde = Kde::new(data, KdeConfig::default().with_inc(8)).unwrap();
    let axis = Array1::linspace(-1.0, 1.0, 4);
    assert!(matches!(
        kde.eval_grid_fast(&[axis.clone(), axis.clone(), axis]),
        Err(KdeError::UnsupportedInterpolation { dim: 3 })
    ));
    assert_eq!(kde.eval_grid_fast(&[]).unwrap().value.shape(), &[8, 8, 8]);
}

#[test]
fn density_factory_builds_estimators() {
    let kde = Density::kde(rayleigh_data(), Kernel::Epanechnikov, 0.6).unwrap();
    assert_eq!(kde.kernel(), Kernel::Epanechnikov);
    assert_eq!(kde.dim(), 1);
    assert_eq!(kde.n(), 20);

    let auto = Density::kde(rayleigh_data(), Kernel::Gaussian, 0.0).unwrap();
    let hns = bandwidth::hns(rayleigh_row().view(), Kernel::Gaussian).unwrap();
    assert_eq!(auto.bandwidth(), &Bandwidth::Diagonal(hns));

    let tkde = Density::tkde(rayleigh_data(), 0.5, 0.5).unwrap();
    assert_eq!(tkde.dim(), 1);
}

#[test]
fn empty_data_is_rejected() {
    let data: Array1<f64> = Array1::zeros(0);
    assert!(matches!(
        Kde::new(data, KdeConfig::default()),
        Err(KdeError::InsufficientData { .. })
    ));
}
