// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transform IR types.
//!
//! A [`Transform`] maps a table to a table, flattening the group/stack/pie layouts back into
//! rows so that they can feed scales, marks and facets. Output fields are named by the
//! constants in [`crate::field`].

extern crate alloc;

use alloc::string::String;

use vizgraph_core::{Row, Table, Value};

use crate::field;
use crate::group::group_by_series;
use crate::pie::build_pie;
use crate::stack::{StackOrder, build_stack_by};

/// Comparison operators for numeric predicates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// `<`
    Lt,
    /// `<=`
    Le,
    /// `>`
    Gt,
    /// `>=`
    Ge,
    /// `==` (exact float equality)
    Eq,
    /// `!=` (exact float inequality)
    Ne,
}

/// A row predicate used by [`Transform::Filter`].
///
/// Rows where the field is missing or not a number never match.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Field to read.
    pub field: String,
    /// Comparison operator.
    pub op: CompareOp,
    /// Right-hand constant.
    pub value: f64,
}

impl Predicate {
    /// Creates a predicate.
    pub fn new(field: impl Into<String>, op: CompareOp, value: f64) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    /// Evaluates the predicate for a numeric value.
    pub fn eval(&self, v: f64) -> bool {
        match self.op {
            CompareOp::Lt => v < self.value,
            CompareOp::Le => v <= self.value,
            CompareOp::Gt => v > self.value,
            CompareOp::Ge => v >= self.value,
            CompareOp::Eq => v == self.value,
            CompareOp::Ne => v != self.value,
        }
    }

    /// Evaluates the predicate for a row.
    pub fn matches(&self, row: &Row) -> bool {
        row.f64(&self.field).is_some_and(|v| self.eval(v))
    }
}

/// A table transform.
#[derive(Debug, Clone, PartialEq)]
pub enum Transform {
    /// Keep only rows that satisfy a predicate.
    Filter {
        /// Predicate to apply per row.
        predicate: Predicate,
    },
    /// One row per group: the key (under both `key` and the group field), `total` and `index`.
    GroupTotals {
        /// Field to group by.
        key: String,
        /// Field that tells a group's members apart.
        series: String,
    },
    /// The deduplicated members of each group, in group order, annotated with the group's
    /// `key`, `total` and `index`.
    Group {
        /// Field to group by.
        key: String,
        /// Field that tells a group's members apart.
        series: String,
    },
    /// One row per (series, group) pair, series-major, with `y0`/`y1` stack offsets.
    ///
    /// Present members are carried through; absent ones become rows with only the series
    /// field, the group field and a zero `amount`. Every row also gets `key`, `total` and
    /// `index`.
    Stack {
        /// Field to group by.
        key: String,
        /// Field whose keys are the stacked series.
        series: String,
        /// Series order, bottom first.
        order: StackOrder,
    },
    /// One row per group with `startAngle`/`endAngle`, the group total as `value`, and the
    /// grand total as `total`.
    Pie {
        /// Field to group by.
        key: String,
    },
}

fn index_value(index: usize) -> Value {
    Value::Num(index as f64)
}

impl Transform {
    /// A [`Transform::GroupTotals`] over `type` members.
    pub fn group_totals(key: impl Into<String>) -> Self {
        Self::GroupTotals {
            key: key.into(),
            series: field::TYPE.into(),
        }
    }

    /// A [`Transform::Group`] over `type` members.
    pub fn group(key: impl Into<String>) -> Self {
        Self::Group {
            key: key.into(),
            series: field::TYPE.into(),
        }
    }

    /// A [`Transform::Stack`] of `type` series in input order.
    pub fn stack(key: impl Into<String>) -> Self {
        Self::Stack {
            key: key.into(),
            series: field::TYPE.into(),
            order: StackOrder::Input,
        }
    }

    /// A [`Transform::Pie`].
    pub fn pie(key: impl Into<String>) -> Self {
        Self::Pie { key: key.into() }
    }

    /// Sets the series field of a grouping transform; other transforms are returned as is.
    pub fn with_series(mut self, field: impl Into<String>) -> Self {
        match &mut self {
            Self::GroupTotals { series, .. }
            | Self::Group { series, .. }
            | Self::Stack { series, .. } => *series = field.into(),
            Self::Filter { .. } | Self::Pie { .. } => {}
        }
        self
    }

    /// Sets the series order of a [`Transform::Stack`]; other transforms are returned as is.
    pub fn with_order(mut self, order: StackOrder) -> Self {
        if let Self::Stack { order: current, .. } = &mut self {
            *current = order;
        }
        self
    }

    /// Applies the transform.
    pub fn apply(&self, table: &Table) -> Table {
        let out: Table = match self {
            Self::Filter { predicate } => table
                .iter()
                .filter(|row| predicate.matches(row))
                .cloned()
                .collect(),
            Self::GroupTotals { key, series } => group_by_series(table, key, series)
                .into_iter()
                .enumerate()
                .map(|(i, group)| {
                    Row::new()
                        .with(key.as_str(), group.data_key.as_str())
                        .with(field::KEY, group.data_key)
                        .with(field::TOTAL, group.total)
                        .with(field::INDEX, index_value(i))
                })
                .collect(),
            Self::Group { key, series } => {
                let mut out = Table::new();
                for (i, group) in group_by_series(table, key, series).into_iter().enumerate() {
                    for member in group.members {
                        out.push(
                            member
                                .with(field::KEY, group.data_key.as_str())
                                .with(field::TOTAL, group.total)
                                .with(field::INDEX, index_value(i)),
                        );
                    }
                }
                out
            }
            Self::Stack { key, series, order } => {
                let grouped = group_by_series(table, key, series);
                let stacked = build_stack_by(table, &grouped, order, series);
                let mut out = Table::new();
                for s in &stacked {
                    for point in &s.points {
                        let group = &grouped[point.group];
                        let base = group.member(&s.key).cloned().unwrap_or_else(|| {
                            Row::new()
                                .with(series.as_str(), s.key.as_str())
                                .with(key.as_str(), group.data_key.as_str())
                                .with(field::AMOUNT, 0.0)
                        });
                        out.push(
                            base.with(field::KEY, group.data_key.as_str())
                                .with(field::Y0, point.y0)
                                .with(field::Y1, point.y1)
                                .with(field::TOTAL, group.total)
                                .with(field::INDEX, index_value(point.group)),
                        );
                    }
                }
                out
            }
            Self::Pie { key } => {
                let grouped = group_by_series(table, key, key);
                let grand: f64 = grouped.iter().map(|g| g.total).sum();
                build_pie(&grouped)
                    .into_iter()
                    .map(|arc| {
                        Row::new()
                            .with(key.as_str(), arc.data_key.as_str())
                            .with(field::KEY, arc.data_key)
                            .with(field::VALUE, arc.value)
                            .with(field::TOTAL, grand)
                            .with(field::START_ANGLE, arc.start_angle)
                            .with(field::END_ANGLE, arc.end_angle)
                            .with(field::INDEX, index_value(arc.index))
                    })
                    .collect()
            }
        };
        log::trace!("{self:?}: {} rows -> {} rows", table.len(), out.len());
        out
    }
}

/// Applies transforms in sequence.
pub fn apply_all(transforms: &[Transform], table: &Table) -> Table {
    let mut out: Option<Table> = None;
    for t in transforms {
        out = Some(t.apply(out.as_ref().unwrap_or(table)));
    }
    out.unwrap_or_else(|| table.clone())
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;
    use alloc::vec::Vec;

    use super::*;

    fn jan_feb() -> Table {
        Table::from_rows(vec![
            Row::new().with("period", "Jan").with("type", "A").with("amount", 10.0),
            Row::new().with("period", "Jan").with("type", "B").with("amount", 5.0),
            Row::new().with("period", "Feb").with("type", "A").with("amount", 3.0),
        ])
    }

    #[test]
    fn stack_rows_are_series_major_with_offsets() {
        let out = Transform::stack("period").apply(&jan_feb());
        let rows: Vec<_> = out
            .iter()
            .map(|r| {
                (
                    r.str("type").unwrap(),
                    r.str("key").unwrap(),
                    r.f64("y0").unwrap(),
                    r.f64("y1").unwrap(),
                )
            })
            .collect();
        assert_eq!(
            rows,
            [
                ("A", "Jan", 0.0, 10.0),
                ("A", "Feb", 0.0, 3.0),
                ("B", "Jan", 10.0, 15.0),
                ("B", "Feb", 0.0, 0.0),
            ]
        );
        assert_eq!(out.rows()[3].str("period"), Some("Feb"));
        assert_eq!(out.rows()[3].f64("amount"), Some(0.0));
        assert_eq!(out.rows()[2].f64("total"), Some(15.0));
    }

    #[test]
    fn group_totals_and_members() {
        let totals = Transform::group_totals("period").apply(&jan_feb());
        assert_eq!(totals.column_f64("total"), [15.0, 3.0]);
        assert_eq!(totals.distinct_keys("period"), ["Jan", "Feb"]);

        let members = Transform::group("period").apply(&jan_feb());
        assert_eq!(members.len(), 3);
        assert_eq!(members.column_f64("index"), [0.0, 0.0, 1.0]);
    }

    #[test]
    fn pie_rows_carry_angles_and_grand_total() {
        let out = Transform::pie("type").apply(&jan_feb());
        assert_eq!(out.distinct_keys("key"), ["A", "B"]);
        assert_eq!(out.column_f64("value"), [13.0, 5.0]);
        assert_eq!(out.column_f64("total"), [18.0, 18.0]);
        let end = out.rows()[1].f64("endAngle").unwrap();
        assert!((end - core::f64::consts::TAU).abs() < 1e-9, "end {end}");
    }

    #[test]
    fn stack_honors_the_series_field() {
        let table = Table::from_rows(vec![
            Row::new()
                .with("period", "Jan")
                .with("type", "A")
                .with("region", "north")
                .with("amount", 4.0),
            Row::new()
                .with("period", "Jan")
                .with("type", "A")
                .with("region", "south")
                .with("amount", 6.0),
            Row::new()
                .with("period", "Feb")
                .with("type", "B")
                .with("region", "north")
                .with("amount", 1.0),
        ]);
        let out = Transform::stack("period").with_series("region").apply(&table);
        let rows: Vec<_> = out
            .iter()
            .map(|r| (r.str("region").unwrap(), r.f64("y0").unwrap(), r.f64("y1").unwrap()))
            .collect();
        assert_eq!(
            rows,
            [
                ("north", 0.0, 4.0),
                ("north", 0.0, 1.0),
                ("south", 4.0, 10.0),
                ("south", 0.0, 0.0),
            ]
        );
        assert_eq!(out.rows()[3].str("type"), None, "absent rows carry only the series field");

        let totals = Transform::group_totals("period")
            .with_series("region")
            .apply(&table);
        assert_eq!(totals.column_f64("total"), [10.0, 1.0]);
    }

    #[test]
    fn filter_then_totals() {
        let pipeline = [
            Transform::Filter {
                predicate: Predicate::new("amount", CompareOp::Gt, 4.0),
            },
            Transform::group_totals("period"),
        ];
        let out = apply_all(&pipeline, &jan_feb());
        assert_eq!(out.len(), 1);
        assert_eq!(out.column_f64("total"), [15.0]);
        assert_eq!(apply_all(&[], &jan_feb()), jan_feb());
    }
}
