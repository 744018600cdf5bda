// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use approx::{assert_abs_diff_eq, assert_relative_eq};
use ndarray::{Array1, array};

use kdetools::KdeError;
use kdetools::estimators::approaches::transform::{LevelCrossings, TrData, TrDataOptions};
use kdetools::estimators::diagnostics::Diagnostic;

use super::level_crossings_test::gaussian_crossings;

fn gaussian_level_crossings() -> LevelCrossings {
    let (levels, counts) = gaussian_crossings(0.0, 1.0);
    LevelCrossings::new(levels, counts, None, None).unwrap()
}

#[test]
fn gaussian_crossings_give_nearly_linear_transform() {
    let lc = gaussian_level_crossings();
    let estimate = lc.trdata(&TrDataOptions::default()).unwrap();
    let (g, empirical) = &estimate.value;

    assert_eq!(g.args.len(), 513);
    assert_abs_diff_eq!(g.args[0], -5.0, epsilon = 1e-6);
    assert_abs_diff_eq!(g.args[512], 5.0, epsilon = 1e-6);
    assert_eq!(empirical.args, lc.levels().to_owned());

    assert!(
        g.is_monotone()
            || estimate
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::NotSufficientlySmoothed { .. }))
    );

    let y = g.dat2gauss(array![-1.0, 0.0, 1.0].view());
    assert_abs_diff_eq!(y[1], 0.0, epsilon = 0.1);
    assert_abs_diff_eq!(y[0], -1.0, epsilon = 0.2);
    assert_abs_diff_eq!(y[2], 1.0, epsilon = 0.2);
}

#[test]
fn empirical_transform_is_centred_on_the_mode() {
    let lc = gaussian_level_crossings();
    let (_, empirical) = lc.trdata(&TrDataOptions::default()).unwrap().value;
    assert_abs_diff_eq!(empirical.data[100], 0.0, epsilon = 0.1);
    assert!(empirical.is_monotone());
}

#[test]
fn decimation_shortens_the_empirical_transform() {
    let lc = gaussian_level_crossings();
    let opts = TrDataOptions::default().with_ntr(50);
    let (g, empirical) = lc.trdata(&opts).unwrap().value;
    assert_eq!(empirical.args.len(), 50);
    assert_relative_eq!(empirical.args[0], lc.levels()[7], max_relative = 1e-12);
    assert_relative_eq!(empirical.args[49], lc.levels()[193], max_relative = 1e-12);
    assert_eq!(g.args.len(), 513);
}

#[test]
fn decimation_below_the_end_corrections_is_rejected() {
    let lc = gaussian_level_crossings();
    for ntr in [2, 5, 15] {
        assert!(matches!(
            lc.trdata(&TrDataOptions::default().with_ntr(ntr)),
            Err(KdeError::InsufficientData { min: 16, .. })
        ));
    }
    let (_, empirical) = lc
        .trdata(&TrDataOptions::default().with_ntr(16))
        .unwrap()
        .value;
    assert_eq!(empirical.args.len(), 16);
}

/// Gaussian crossing curve with no crossings at levels inside `(0.5, 1.5)`.
fn gapped_level_crossings() -> LevelCrossings {
    let (levels, mut counts) = gaussian_crossings(0.0, 1.0);
    for (c, &u) in counts.iter_mut().zip(levels.iter()) {
        if u > 0.5 && u < 1.5 {
            *c = 0.0;
        }
    }
    LevelCrossings::new(levels, counts, Some(0.0), Some(1.0)).unwrap()
}

#[test]
fn flat_crossing_band_is_smoothed_into_increasing_transform() {
    let lc = gapped_level_crossings();
    let opts = TrDataOptions::default().with_gsm(0.999).with_ne(0);

    let raw = lc.trdata(&opts.clone().with_chkder(false)).unwrap();
    assert!(raw.value.0.monotonicity_violations() > 0);
    assert!(raw.is_clean());

    let repaired = lc.trdata(&opts).unwrap();
    let (g, _) = &repaired.value;
    assert_eq!(g.monotonicity_violations(), 0);
    assert!(g.is_monotone());
    assert!(repaired.is_clean());
    assert_eq!(g.args, raw.value.0.args);
}

#[test]
fn repair_keeps_the_transform_increasing_for_every_smoothing() {
    let lc = gapped_level_crossings();
    for gsm in [0.99, 0.9999, 1.0] {
        let opts = TrDataOptions::default().with_gsm(gsm).with_ne(0);
        let estimate = lc.trdata(&opts).unwrap();
        assert!(estimate.value.0.is_monotone(), "gsm = {gsm}");
        assert!(
            !estimate
                .diagnostics
                .iter()
                .any(|d| matches!(d, Diagnostic::NotSufficientlySmoothed { .. })),
            "gsm = {gsm}"
        );
    }
}

#[test]
fn custom_domain_sets_tabulation() {
    let lc = gaussian_level_crossings();
    let opts = TrDataOptions::default().with_param(-3.0, 3.0, 61);
    let (g, _) = lc.trdata(&opts).unwrap().value;
    assert_eq!(g.args.len(), 61);
    assert_abs_diff_eq!(g.args[60], 3.0, epsilon = 1e-6);
}

#[test]
fn invalid_options_are_rejected() {
    let lc = gaussian_level_crossings();
    assert!(matches!(
        lc.trdata(&TrDataOptions::default().with_gsm(1.5)),
        Err(KdeError::InvalidInput(_))
    ));
    assert!(matches!(
        lc.trdata(&TrDataOptions::default().with_param(1.0, -1.0, 10)),
        Err(KdeError::InvalidInput(_))
    ));
    assert!(matches!(
        lc.trdata(&TrDataOptions::default().with_cvar(array![1.0, -1.0])),
        Err(KdeError::InvalidInput(_))
    ));
}

#[test]
fn tabulated_transform_maps_both_ways() {
    let g = TrData::new(array![0.0, 1.0, 2.0], array![-1.0, 0.0, 3.0], 1.0, 1.0).unwrap();
    let y = g.dat2gauss(array![0.5, 1.5, 3.0].view());
    assert_abs_diff_eq!(y[0], -0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(y[1], 1.5, epsilon = 1e-15);
    assert_abs_diff_eq!(y[2], 6.0, epsilon = 1e-15);
    let x = g.gauss2dat(array![-0.5, 1.5].view());
    assert_abs_diff_eq!(x[0], 0.5, epsilon = 1e-15);
    assert_abs_diff_eq!(x[1], 1.5, epsilon = 1e-15);
    assert!(g.is_monotone());
}

#[test]
fn identity_transform_has_no_distance_to_gaussian() {
    let x = Array1::linspace(-6.0, 6.0, 13);
    let g = TrData::new(x.clone(), x, 0.0, 1.0).unwrap();
    assert_abs_diff_eq!(g.dist2gauss(), 0.0, epsilon = 1e-12);

    let skewed = TrData::new(array![-6.0, 0.0, 6.0], array![-3.0, 0.0, 6.0], 0.0, 1.0).unwrap();
    assert!(skewed.dist2gauss() > 1.0);
}

#[test]
fn mismatched_tables_are_rejected() {
    assert!(matches!(
        TrData::new(array![0.0, 1.0], array![0.0], 0.0, 1.0),
        Err(KdeError::DimensionMismatch { expected: 2, got: 1 })
    ));
}
