// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::assert_abs_diff_eq;
use ndarray::{Array1, array};

use kdetools::estimators::utils::spline::SmoothSpline;

#[test]
fn unit_smoothing_interpolates() {
    let x = Array1::linspace(0.0, 3.0, 7);
    let y = x.mapv(f64::sin);
    let s = SmoothSpline::fit(x.view(), y.view(), Some(1.0), false, None).unwrap();
    assert_eq!(s.smoothing(), 1.0);
    for (xi, yi) in x.iter().zip(y.iter()) {
        assert_abs_diff_eq!(s.eval(*xi), *yi, epsilon = 1e-12);
    }
    assert_abs_diff_eq!(s.eval(1.25), 1.25f64.sin(), epsilon = 5e-3);
}

#[test]
fn zero_smoothing_gives_least_squares_line() {
    let x = array![0.0, 1.0, 2.0, 3.0, 4.0];
    let y = x.mapv(|v| v * v);
    let s = SmoothSpline::fit(x.view(), y.view(), Some(0.0), true, None).unwrap();
    assert_abs_diff_eq!(s.eval(2.5), 4.0 * 2.5 - 2.0, epsilon = 1e-9);
    assert_abs_diff_eq!(s.eval(5.0), 18.0, epsilon = 1e-9);
    assert_abs_diff_eq!(s.eval(-1.0), -6.0, epsilon = 1e-9);
}

#[test]
fn linear_extrapolation_continues_end_slopes() {
    let x = array![0.0, 1.0, 2.0, 3.0];
    let y = array![0.0, 1.0, 0.0, 1.0];
    let s = SmoothSpline::fit(x.view(), y.view(), Some(1.0), true, None).unwrap();
    let (f0, f1, f2) = (s.eval(0.0), s.eval(-1.0), s.eval(-2.0));
    assert_abs_diff_eq!(f2 - 2.0 * f1 + f0, 0.0, epsilon = 1e-12);
    let (g0, g1, g2) = (s.eval(3.0), s.eval(4.0), s.eval(5.0));
    assert_abs_diff_eq!(g2 - 2.0 * g1 + g0, 0.0, epsilon = 1e-12);
}

#[test]
fn unsorted_input_is_sorted() {
    let x = array![2.0, 0.0, 1.0, 3.0];
    let y = array![4.0, 0.0, 1.0, 9.0];
    let s = SmoothSpline::fit(x.view(), y.view(), Some(1.0), false, None).unwrap();
    assert_eq!(s.breaks().to_vec(), vec![0.0, 1.0, 2.0, 3.0]);
    assert_abs_diff_eq!(s.eval(2.0), 4.0, epsilon = 1e-12);
}

#[test]
fn automatic_smoothing_lies_inside_unit_interval() {
    let x = Array1::linspace(0.0, 1.0, 20);
    let y = x.mapv(|v: f64| v + 0.1 * (13.0 * v).sin());
    let s = SmoothSpline::fit(x.view(), y.view(), None, false, None).unwrap();
    assert!(s.smoothing() > 0.0 && s.smoothing() < 1.0);
    let fitted = s.eval_array(x.view());
    assert_eq!(fitted.len(), 20);
}

#[test]
fn rejects_bad_input() {
    assert!(SmoothSpline::fit(array![1.0].view(), array![1.0].view(), None, false, None).is_err());
    assert!(
        SmoothSpline::fit(array![0.0, 1.0].view(), array![1.0].view(), None, false, None).is_err()
    );
    assert!(
        SmoothSpline::fit(
            array![0.0, 1.0, 1.0].view(),
            array![1.0, 2.0, 3.0].view(),
            None,
            false,
            None
        )
        .is_err()
    );
}
