// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers for `no_std` builds.
//!
//! `core` has no `f64::round`, `f64::sin` and friends, so chart code calls them through this
//! trait, which forwards to `libm` when `std` is off.

/// Float math helpers for `f64` in `no_std` mode.
pub(crate) trait FloatExt {
    fn round(self) -> Self;
    fn powi(self, n: i32) -> Self;
    fn sin(self) -> Self;
    fn cos(self) -> Self;
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
impl FloatExt for f64 {
    fn round(self) -> Self {
        libm::round(self)
    }

    fn powi(self, n: i32) -> Self {
        libm::pow(self, f64::from(n))
    }

    fn sin(self) -> Self {
        libm::sin(self)
    }

    fn cos(self) -> Self {
        libm::cos(self)
    }
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("vizgraph_charts requires either the `std` or `libm` feature");
