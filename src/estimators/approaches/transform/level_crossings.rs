// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::{Array1, ArrayView1};

use crate::error::{KdeError, Result};

/// Number of levels left out at the low end when fitting the Gaussian parameters.
const FIT_SKIP_LOW: usize = 10;
/// Number of levels left out at the high end when fitting the Gaussian parameters.
const FIT_SKIP_HIGH: usize = 9;

/// Upcrossing counts of a process at increasing levels.
///
/// For a stationary Gaussian process with mean `m` and standard deviation `s`
/// Rice's formula gives a crossing intensity proportional to
/// `exp(-(u - m)² / 2s²)`. When `mean` or `stdev` are not supplied they are
/// read off the curve by fitting a line to the signed root
/// `±sqrt(2·|ln c(u) - ln c_max|)`, which is `(u - m)/s` in the Gaussian case.
#[derive(Debug, Clone, PartialEq)]
pub struct LevelCrossings {
    levels: Array1<f64>,
    counts: Array1<f64>,
    mean: f64,
    stdev: f64,
}

impl LevelCrossings {
    /// # Arguments
    ///
    /// * `levels` - Strictly increasing crossing levels
    /// * `counts` - Non-negative number of upcrossings at each level
    /// * `mean` - Mean of the process, estimated from the curve when `None`
    /// * `stdev` - Standard deviation of the process, estimated from the curve when `None`
    pub fn new(
        levels: Array1<f64>,
        counts: Array1<f64>,
        mean: Option<f64>,
        stdev: Option<f64>,
    ) -> Result<Self> {
        let n = levels.len();
        if counts.len() != n {
            return Err(KdeError::DimensionMismatch {
                expected: n,
                got: counts.len(),
            });
        }
        if n < 3 {
            return Err(KdeError::InsufficientData { got: n, min: 3 });
        }
        if levels.windows(2).into_iter().any(|w| !(w[1] > w[0])) {
            return Err(KdeError::InvalidInput(
                "crossing levels must be strictly increasing".into(),
            ));
        }
        if counts.iter().any(|&c| !(c >= 0.0 && c.is_finite())) {
            return Err(KdeError::InvalidInput(
                "crossing counts must be finite and non-negative".into(),
            ));
        }
        if !counts.iter().any(|&c| c > 0.0) {
            return Err(KdeError::InvalidInput("no level is ever crossed".into()));
        }

        let (mean, stdev) = match (mean, stdev) {
            (Some(m), Some(s)) => (m, s),
            (m, s) => {
                let (slope, intercept) = fit_gaussian_line(levels.view(), counts.view())?;
                let stdev = s.unwrap_or(1.0 / slope);
                let mean = m.unwrap_or(-intercept / slope);
                log::debug!("level crossings: fitted mean {mean:.6}, stdev {stdev:.6}");
                (mean, stdev)
            }
        };
        if !(stdev > 0.0 && stdev.is_finite() && mean.is_finite()) {
            return Err(KdeError::InvalidInput(format!(
                "invalid process parameters: mean {mean}, stdev {stdev}"
            )));
        }
        Ok(Self {
            levels,
            counts,
            mean,
            stdev,
        })
    }

    pub fn levels(&self) -> ArrayView1<'_, f64> {
        self.levels.view()
    }

    pub fn counts(&self) -> ArrayView1<'_, f64> {
        self.counts.view()
    }

    pub fn mean(&self) -> f64 {
        self.mean
    }

    pub fn stdev(&self) -> f64 {
        self.stdev
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Index of the most crossed level (first one on ties).
    pub fn argmax(&self) -> usize {
        argmax(self.counts.view())
    }

    /// Crossing intensity of a Gaussian process with the same mean, deviation and peak count.
    pub fn normal_intensity(&self) -> Array1<f64> {
        let cmax = self.counts[self.argmax()];
        self.levels.mapv(|u| {
            let x = (u - self.mean) / self.stdev;
            cmax * (-0.5 * x * x).exp()
        })
    }
}

pub(crate) fn argmax(values: ArrayView1<'_, f64>) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Least-squares line through the signed log-crossing roots over the interior levels.
fn fit_gaussian_line(levels: ArrayView1<'_, f64>, counts: ArrayView1<'_, f64>) -> Result<(f64, f64)> {
    let n = levels.len();
    let icmax = argmax(counts);
    let logcros: Vec<f64> = counts
        .iter()
        .map(|&c| if c == 0.0 { f64::INFINITY } else { -c.ln() })
        .collect();
    let logcmin = logcros[icmax];
    let roots: Vec<f64> = logcros
        .iter()
        .enumerate()
        .map(|(i, &l)| {
            let r = (2.0 * (l - logcmin).abs()).sqrt();
            if i <= icmax { -r } else { r }
        })
        .collect();

    let hi = n.saturating_sub(FIT_SKIP_HIGH);
    let (mut sx, mut sy, mut sxx, mut sxy, mut m) = (0.0, 0.0, 0.0, 0.0, 0usize);
    for i in FIT_SKIP_LOW..hi {
        let (x, y) = (levels[i], roots[i]);
        if !y.is_finite() {
            continue;
        }
        sx += x;
        sy += y;
        sxx += x * x;
        sxy += x * y;
        m += 1;
    }
    if m < 2 {
        return Err(KdeError::InsufficientData {
            got: m,
            min: 2,
        });
    }
    let mf = m as f64;
    let denom = mf * sxx - sx * sx;
    if denom == 0.0 {
        return Err(KdeError::InvalidInput(
            "cannot fit process parameters to a single level".into(),
        ));
    }
    let slope = (mf * sxy - sx * sy) / denom;
    let intercept = (sy - slope * sx) / mf;
    Ok((slope, intercept))
}
