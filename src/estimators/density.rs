// SPDX-FileCopyrightText: 2025-2026 Carlson Büth <code@cbueth.de>
//
// SPDX-License-Identifier: MIT OR Apache-2.0

use ndarray::Array1;

use crate::error::Result;
use crate::estimators::approaches::common_nd::KdeData;
use crate::estimators::approaches::kernel::{Kde, KdeConfig, Kernel, Tkde, TkdeConfig};

/// Density estimation methods for continuous data
///
/// This struct provides static methods for creating density estimators,
/// mirroring how the estimator types are meant to be reached from user code.
pub struct Density;

impl Density {
    /// Creates a kernel density estimator with a fixed bandwidth
    ///
    /// # Arguments
    ///
    /// * `data` - Samples, either 1D or laid out `D×N`
    /// * `kernel` - Kernel to smooth with
    /// * `bandwidth` - Bandwidth applied to every dimension; non-positive values select it with the normal scale rule
    ///
    /// # Returns
    ///
    /// A ready estimator, or an error for invalid data or bandwidth
    pub fn kde(data: impl Into<KdeData>, kernel: Kernel, bandwidth: f64) -> Result<Kde> {
        Kde::new(
            data,
            KdeConfig::default()
                .with_kernel(kernel)
                .with_bandwidth(bandwidth),
        )
    }

    /// Creates a kernel density estimator from a full configuration
    ///
    /// # Arguments
    ///
    /// * `data` - Samples, either 1D or laid out `D×N`
    /// * `config` - Kernel, bandwidth or selector, adaptivity and evaluation box
    pub fn kde_with_config(data: impl Into<KdeData>, config: KdeConfig) -> Result<Kde> {
        Kde::new(data, config)
    }

    /// Creates a transformation kernel density estimator
    ///
    /// # Arguments
    ///
    /// * `data` - Strictly positive samples, either 1D or laid out `D×N`
    /// * `bandwidth` - Bandwidth in transformed coordinates
    /// * `l2` - Transform exponent shared by all dimensions (`0` for the log transform)
    pub fn tkde(data: impl Into<KdeData>, bandwidth: f64, l2: f64) -> Result<Tkde> {
        Tkde::new(
            data,
            TkdeConfig::default()
                .with_kde(KdeConfig::default().with_bandwidth(bandwidth))
                .with_l2(Array1::from_elem(1, l2)),
        )
    }

    /// Creates a transformation kernel density estimator from a full configuration
    pub fn tkde_with_config(data: impl Into<KdeData>, config: TkdeConfig) -> Result<Tkde> {
        Tkde::new(data, config)
    }
}
