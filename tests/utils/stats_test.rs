// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{Array1, array};
use rstest::rstest;
use std::f64::consts::PI;

use kdetools::KdeError;
use kdetools::estimators::diagnostics::Diagnostic;
use kdetools::estimators::utils::stats::{
    PercentileMethod, cov, cumtrapz, iqrange, percentile, percentiles, qlevels, robust_sigma,
    sphere_volume, std, trapz,
};

#[rstest]
#[case(PercentileMethod::Linear, 2.5)]
#[case(PercentileMethod::Hazen, 2.5)]
#[case(PercentileMethod::Empirical, 2.0)]
#[case(PercentileMethod::Weibull, 2.5)]
#[case(PercentileMethod::MedianUnbiased, 2.5)]
#[case(PercentileMethod::NormalUnbiased, 2.5)]
fn median_of_four_values(#[case] method: PercentileMethod, #[case] expected: f64) {
    let data = array![4.0, 1.0, 3.0, 2.0];
    assert_abs_diff_eq!(percentile(data.view(), 50.0, method).unwrap(), expected, epsilon = 1e-12);
}

#[rstest]
#[case(PercentileMethod::Linear, 1.75)]
#[case(PercentileMethod::Hazen, 1.5)]
#[case(PercentileMethod::Weibull, 1.25)]
fn lower_quartile_depends_on_method(#[case] method: PercentileMethod, #[case] expected: f64) {
    let data = array![1.0, 2.0, 3.0, 4.0];
    assert_abs_diff_eq!(percentile(data.view(), 25.0, method).unwrap(), expected, epsilon = 1e-12);
}

#[test]
fn percentile_extremes_and_errors() {
    let data = array![5.0, -1.0, 3.0];
    assert_eq!(percentile(data.view(), 0.0, PercentileMethod::Weibull).unwrap(), -1.0);
    assert_eq!(percentile(data.view(), 100.0, PercentileMethod::Hazen).unwrap(), 5.0);
    assert!(matches!(
        percentile(data.view(), 101.0, PercentileMethod::Linear),
        Err(KdeError::PercentileOutOfRange(_))
    ));
    let empty: Array1<f64> = Array1::zeros(0);
    assert!(percentile(empty.view(), 50.0, PercentileMethod::Linear).is_err());
    assert!(PercentileMethod::from_number(7).is_err());
    assert_eq!(PercentileMethod::from_number(2).unwrap(), PercentileMethod::Hazen);

    let qs = percentiles(data.view(), &[0.0, 50.0, 100.0], PercentileMethod::Linear).unwrap();
    assert_eq!(qs, vec![-1.0, 3.0, 5.0]);
}

#[test]
fn spread_measures() {
    let data = array![1.0, 2.0, 3.0, 4.0, 5.0];
    assert_abs_diff_eq!(iqrange(data.view()).unwrap(), 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(std(data.view(), 1), 2.5f64.sqrt(), epsilon = 1e-12);
    // min(1.5811, 2/1.34)
    assert_abs_diff_eq!(robust_sigma(data.view(), 1.34).unwrap(), 2.0 / 1.34, epsilon = 1e-12);

    let flat = array![1.0, 1.0, 1.0, 1.0, 9.0];
    assert_abs_diff_eq!(
        robust_sigma(flat.view(), 1.34).unwrap(),
        std(flat.view(), 1),
        epsilon = 1e-12
    );
    assert!(robust_sigma(array![1.0].view(), 1.34).is_err());
}

#[test]
fn covariance_of_rows() {
    let data = array![[1.0, 2.0, 3.0], [2.0, 4.0, 6.0]];
    let c = cov(data.view());
    assert_abs_diff_eq!(c[(0, 0)], 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(c[(0, 1)], 2.0, epsilon = 1e-12);
    assert_abs_diff_eq!(c[(1, 1)], 4.0, epsilon = 1e-12);
}

#[test]
fn trapezoidal_rules() {
    let x = Array1::linspace(0.0, 1.0, 101);
    let y = x.mapv(|v| 2.0 * v);
    assert_abs_diff_eq!(trapz(y.view(), x.view()), 1.0, epsilon = 1e-12);
    let c = cumtrapz(y.view(), x.view());
    assert_eq!(c.len(), 100);
    assert_abs_diff_eq!(c[49], 0.25, epsilon = 1e-12);
    assert_abs_diff_eq!(c[99], 1.0, epsilon = 1e-12);
}

#[test]
fn unit_sphere_volumes() {
    assert_relative_eq!(sphere_volume(1, 1.0), 2.0, max_relative = 1e-12);
    assert_relative_eq!(sphere_volume(2, 1.0), PI, max_relative = 1e-12);
    assert_relative_eq!(sphere_volume(3, 2.0), 4.0 / 3.0 * PI * 8.0, max_relative = 1e-12);
}

fn normal_pdf(x: &Array1<f64>) -> Array1<f64> {
    x.mapv(|v| (-0.5 * v * v).exp() / (2.0 * PI).sqrt())
}

#[test]
fn half_mass_level_of_normal_density() {
    let x = Array1::linspace(-8.0, 8.0, 2001);
    let pdf = normal_pdf(&x).into_dyn();
    let levels = qlevels(pdf.view(), &[50.0, 95.0], Some(x.view()), None).unwrap();
    assert!(levels.is_clean());
    assert_relative_eq!(levels.value[0], 0.31777657, max_relative = 0.01);
    // φ(1.96)
    assert_relative_eq!(levels.value[1], 0.05844094, max_relative = 0.02);
    assert!(levels.value[0] > levels.value[1]);
}

#[test]
fn two_dimensional_levels_use_cell_areas() {
    let x = Array1::linspace(-6.0, 6.0, 121);
    let g = normal_pdf(&x);
    let pdf = ndarray::Array2::from_shape_fn((121, 121), |(i, j)| g[i] * g[j]).into_dyn();
    let levels = qlevels(pdf.view(), &[50.0], Some(x.view()), Some(x.view())).unwrap();
    // Half of the mass of a bivariate normal lies inside r² = 2 ln 2.
    let expected = 0.25 / PI;
    assert_relative_eq!(levels.value[0], expected, max_relative = 0.02);
}

#[test]
fn qlevels_flags_suspicious_requests() {
    let pdf = array![0.1, 0.2, 0.4, 0.2, 0.1].into_dyn();
    let all = qlevels(pdf.view(), &[100.0], None, None).unwrap();
    assert!(all
        .diagnostics
        .iter()
        .any(|d| matches!(d, Diagnostic::HighestLevelNearHundred)));
    assert!(all.value[0] >= 0.0);

    assert!(matches!(
        qlevels(pdf.view(), &[120.0], None, None),
        Err(KdeError::PercentileOutOfRange(_))
    ));
    let negative = array![0.1, -0.2].into_dyn();
    assert!(qlevels(negative.view(), &[50.0], None, None).is_err());
}
