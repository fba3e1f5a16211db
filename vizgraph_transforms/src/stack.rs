// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Zero-baseline stacking of grouped rows.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use vizgraph_core::Table;

use crate::field;
use crate::group::{GroupedRow, series_keys_by};

/// Order in which series are stacked from the baseline up.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum StackOrder {
    /// First-seen series order of the ungrouped table.
    #[default]
    Input,
    /// [`StackOrder::Input`], reversed.
    Reverse,
    /// An explicit order. Series present in the table but not listed are stacked above
    /// the listed ones, in first-seen order.
    Keys(Vec<String>),
}

impl StackOrder {
    /// Returns the `type` series keys to stack, bottom first.
    pub fn keys(&self, table: &Table) -> Vec<String> {
        self.keys_by(table, field::TYPE)
    }

    /// Returns the keys of the series field `series` to stack, bottom first.
    pub fn keys_by(&self, table: &Table, series: &str) -> Vec<String> {
        let present = series_keys_by(table, series);
        match self {
            Self::Input => present,
            Self::Reverse => {
                let mut keys = present;
                keys.reverse();
                keys
            }
            Self::Keys(listed) => {
                let mut keys = listed.clone();
                keys.extend(present.into_iter().filter(|k| !listed.contains(k)));
                keys
            }
        }
    }
}

/// One stacked segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackPoint {
    /// Segment baseline.
    pub y0: f64,
    /// Segment top.
    pub y1: f64,
    /// Index of the originating [`GroupedRow`].
    pub group: usize,
}

impl StackPoint {
    /// Returns the segment height.
    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }
}

/// The segments of one series, one per group.
#[derive(Clone, Debug, PartialEq)]
pub struct Series {
    /// The series key.
    pub key: String,
    /// One segment per grouped row, in group order.
    pub points: Vec<StackPoint>,
}

/// Stacks `grouped` by `type`.
///
/// See [`build_stack_by`].
pub fn build_stack(table: &Table, grouped: &[GroupedRow], order: &StackOrder) -> Vec<Series> {
    build_stack_by(table, grouped, order, field::TYPE)
}

/// Stacks `grouped` by the series field `series`.
///
/// A series that is absent from a group gets a `[0, 0]` segment there, and the segments
/// above it are not shifted. `grouped` should come from
/// [`group_by_series`](crate::group_by_series) over the same series field.
pub fn build_stack_by(
    table: &Table,
    grouped: &[GroupedRow],
    order: &StackOrder,
    series: &str,
) -> Vec<Series> {
    let keys = order.keys_by(table, series);
    let mut stacked: Vec<Series> = keys
        .into_iter()
        .map(|key| Series {
            key,
            points: Vec::with_capacity(grouped.len()),
        })
        .collect();

    for (group_index, group) in grouped.iter().enumerate() {
        let mut baseline = 0.0;
        for s in &mut stacked {
            let point = match group.amount(&s.key) {
                Some(amount) => {
                    let y0 = baseline;
                    baseline += amount;
                    StackPoint {
                        y0,
                        y1: baseline,
                        group: group_index,
                    }
                }
                None => StackPoint {
                    y0: 0.0,
                    y1: 0.0,
                    group: group_index,
                },
            };
            s.points.push(point);
        }
    }

    log::debug!(
        "build_stack: {} `{series}` series over {} groups",
        stacked.len(),
        grouped.len()
    );
    stacked
}
