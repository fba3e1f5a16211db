// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canonical field names.
//!
//! Normalized rows use the first five; layout transforms write the rest.

/// The numeric amount of a row.
pub const AMOUNT: &str = "amount";
/// The series (stack layer, pie slice, inner group) a row belongs to.
pub const TYPE: &str = "type";
/// The category a row is plotted at.
pub const PERIOD: &str = "period";
/// The row's display color.
pub const COLOR: &str = "color";
/// An optional secondary color.
pub const SUB_COLOR: &str = "subColor";

/// The group key a layout row belongs to.
pub const KEY: &str = "key";
/// The group total.
pub const TOTAL: &str = "total";
/// The index of the originating group.
pub const INDEX: &str = "index";
/// The value a pie arc represents.
pub const VALUE: &str = "value";
/// Stack segment baseline.
pub const Y0: &str = "y0";
/// Stack segment top.
pub const Y1: &str = "y1";
/// Pie arc start angle, in radians clockwise from 12 o'clock.
pub const START_ANGLE: &str = "startAngle";
/// Pie arc end angle.
pub const END_ANGLE: &str = "endAngle";
