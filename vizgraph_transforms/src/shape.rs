// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The single layout dispatch shared by every chart shape.

extern crate alloc;

use alloc::vec::Vec;

use vizgraph_core::Table;

use crate::group::{GroupedRow, group_by};
use crate::pie::{PieArc, build_pie};
use crate::stack::{Series, StackOrder, build_stack};

/// Which layout a chart uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ChartShape {
    /// Stacked bars.
    Stack,
    /// Side-by-side grouped bars.
    Group,
    /// Pie slices.
    Pie,
}

/// The layout produced by [`build_shape`].
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeOutput {
    /// Grouped rows and their stacked series.
    Stack {
        /// The groups the series index into.
        grouped: Vec<GroupedRow>,
        /// One series per type.
        series: Vec<Series>,
    },
    /// Grouped rows, unchanged.
    Group(Vec<GroupedRow>),
    /// One arc per group.
    Pie(Vec<PieArc>),
}

/// Returns the grouped rows unchanged.
pub fn build_group(grouped: Vec<GroupedRow>) -> Vec<GroupedRow> {
    grouped
}

/// Groups `table` by `key` and runs the layout selected by `shape`.
pub fn build_shape(shape: ChartShape, table: &Table, key: &str, order: &StackOrder) -> ShapeOutput {
    let grouped = group_by(table, key);
    match shape {
        ChartShape::Stack => {
            let series = build_stack(table, &grouped, order);
            ShapeOutput::Stack { grouped, series }
        }
        ChartShape::Group => ShapeOutput::Group(build_group(grouped)),
        ChartShape::Pie => ShapeOutput::Pie(build_pie(&grouped)),
    }
}
