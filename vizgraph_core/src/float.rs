// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Float helpers for `no_std` builds.
//!
//! Rust's float math methods like `f64::log10` and `f64::powf` are not available in `core`.
//! We provide a small trait that dispatches to either `std` or `libm` depending on features.

/// Float math helpers for `f64` in `no_std` mode.
pub(crate) trait FloatExt {
    fn floor(self) -> Self;
    fn ceil(self) -> Self;
    fn round(self) -> Self;
    fn log10(self) -> Self;
    fn powf(self, n: Self) -> Self;
}

#[cfg(all(not(feature = "std"), feature = "libm"))]
impl FloatExt for f64 {
    fn floor(self) -> Self {
        libm::floor(self)
    }

    fn ceil(self) -> Self {
        libm::ceil(self)
    }

    fn round(self) -> Self {
        libm::round(self)
    }

    fn log10(self) -> Self {
        libm::log10(self)
    }

    fn powf(self, n: Self) -> Self {
        libm::pow(self, n)
    }
}

#[cfg(all(not(feature = "std"), not(feature = "libm")))]
compile_error!("vizgraph_core requires either the `std` or `libm` feature");
