// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pie layout of grouped totals.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::f64::consts::TAU;

use crate::group::GroupedRow;

/// One slice of a pie.
///
/// Angles are in radians, clockwise from 12 o'clock.
#[derive(Clone, Debug, PartialEq)]
pub struct PieArc {
    /// Start angle.
    pub start_angle: f64,
    /// End angle.
    pub end_angle: f64,
    /// Index of the originating [`GroupedRow`].
    pub index: usize,
    /// Key of the originating group.
    pub data_key: String,
    /// The group total this arc represents.
    pub value: f64,
}

impl PieArc {
    /// Returns the angular extent.
    pub fn sweep(&self) -> f64 {
        self.end_angle - self.start_angle
    }

    /// Returns the angle halfway through the arc.
    pub fn mid_angle(&self) -> f64 {
        (self.start_angle + self.end_angle) * 0.5
    }
}

/// Lays out one arc per group.
///
/// Arcs are returned in input order, but the circle is swept from 12 o'clock in descending
/// order of value, so the largest slice starts at angle 0. Equal values keep input order.
/// Zero totals produce zero-width arcs rather than being dropped. When the grand total is
/// not positive every arc is zero-width at angle 0.
pub fn build_pie(grouped: &[GroupedRow]) -> Vec<PieArc> {
    let grand: f64 = grouped.iter().map(|g| g.total).sum();
    let scale = if grand > 0.0 && grand.is_finite() {
        TAU / grand
    } else {
        0.0
    };

    let mut arcs: Vec<PieArc> = grouped
        .iter()
        .enumerate()
        .map(|(index, group)| PieArc {
            start_angle: 0.0,
            end_angle: 0.0,
            index,
            data_key: group.data_key.clone(),
            value: group.total,
        })
        .collect();

    let mut sweep_order: Vec<usize> = (0..arcs.len()).collect();
    sweep_order.sort_by(|&a, &b| arcs[b].value.total_cmp(&arcs[a].value));
    let mut prefix = 0.0;
    for i in sweep_order {
        let arc = &mut arcs[i];
        arc.start_angle = prefix * scale;
        prefix += arc.value;
        arc.end_angle = prefix * scale;
    }
    arcs
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn group(key: &str, total: f64) -> GroupedRow {
        GroupedRow {
            data_key: key.into(),
            total,
            members: Vec::new(),
            series_field: "type".into(),
        }
    }

    #[test]
    fn sweeps_cover_the_circle() {
        let grouped = vec![group("a", 1.0), group("b", 0.3), group("c", 2.7), group("d", 0.0)];
        let arcs = build_pie(&grouped);
        assert_eq!(arcs.len(), 4);
        let total: f64 = arcs.iter().map(PieArc::sweep).sum();
        assert!((total - TAU).abs() < 1e-9, "sweep sum {total}");
        let mut by_angle = arcs.clone();
        by_angle.sort_by(|a, b| a.start_angle.total_cmp(&b.start_angle));
        for pair in by_angle.windows(2) {
            assert_eq!(pair[0].end_angle, pair[1].start_angle);
        }
        assert_eq!(arcs[3].sweep(), 0.0);
        assert_eq!(arcs[3].data_key, "d");
    }

    #[test]
    fn largest_value_sweeps_first() {
        let grouped = vec![group("a", 1.0), group("b", 3.0), group("c", 1.0)];
        let arcs = build_pie(&grouped);
        let keys: Vec<_> = arcs.iter().map(|a| a.data_key.as_str()).collect();
        assert_eq!(keys, ["a", "b", "c"], "arcs stay in input order");
        assert_eq!(arcs[1].start_angle, 0.0);
        assert_eq!(arcs[0].start_angle, arcs[1].end_angle);
        assert_eq!(arcs[2].start_angle, arcs[0].end_angle, "ties keep input order");
        assert!((arcs[2].end_angle - TAU).abs() < 1e-9);
    }

    #[test]
    fn all_zero_totals_collapse_to_zero() {
        let arcs = build_pie(&[group("a", 0.0), group("b", 0.0)]);
        assert_eq!(arcs.len(), 2);
        for arc in &arcs {
            assert_eq!((arc.start_angle, arc.end_angle), (0.0, 0.0));
        }
    }

    #[test]
    fn empty_input_has_no_arcs() {
        assert!(build_pie(&[]).is_empty());
    }
}
