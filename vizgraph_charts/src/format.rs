// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Label formatting.

extern crate alloc;

use alloc::format;
use alloc::string::{String, ToString};

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

/// Formats a tick value with just enough decimals to tell ticks `step` apart.
pub fn format_tick(value: f64, step: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    format_fixed(value, decimals_for_step(step))
}

/// Formats `part / whole` as a whole percentage (`"25%"`). A zero whole reads `"0%"`.
pub fn format_percent(part: f64, whole: f64) -> String {
    let ratio = if whole > 0.0 { part / whole } else { 0.0 };
    format!("{}%", format_fixed(ratio * 100.0, 0))
}

fn format_fixed(value: f64, decimals: usize) -> String {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(9));
    let rounded = (value * factor).round() / factor;
    // `-0` reads badly on an axis.
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{rounded:.decimals$}")
}

/// The smallest number of decimals (at most 6) that makes `step` integral.
fn decimals_for_step(step: f64) -> usize {
    let step = step.abs();
    if step == 0.0 || !step.is_finite() {
        return 0;
    }
    (0..=6_usize)
        .find(|d| {
            let scaled = step * 10_f64.powi(i32::try_from(*d).unwrap_or(6));
            (scaled - scaled.round()).abs() <= 1e-9 * scaled.abs().max(1.0)
        })
        .unwrap_or(6)
}
