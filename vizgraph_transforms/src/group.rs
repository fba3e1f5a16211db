// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Grouping canonical rows by a key field.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;

use hashbrown::{HashMap, HashSet};
use hashbrown::hash_map::Entry;
use vizgraph_core::{Row, Table};

use crate::field;

/// Rows sharing one key, with at most one member per series.
#[derive(Clone, Debug, PartialEq)]
pub struct GroupedRow {
    /// The group key.
    pub data_key: String,
    /// Sum of the members' amounts.
    pub total: f64,
    /// One row per distinct series, in first-seen order.
    pub members: Vec<Row>,
    /// The field that names a member's series.
    pub series_field: String,
}

impl GroupedRow {
    /// Returns the member for a series.
    pub fn member(&self, series: &str) -> Option<&Row> {
        self.members
            .iter()
            .find(|r| series_in(r, &self.series_field) == series)
    }

    /// Returns the amount of a series, if it is present in this group.
    pub fn amount(&self, series: &str) -> Option<f64> {
        self.member(series).map(amount_of)
    }
}

/// The series key of a row; rows without a `type` belong to the empty series.
pub fn series_of(row: &Row) -> String {
    series_in(row, field::TYPE)
}

fn series_in(row: &Row, series: &str) -> String {
    row.key(series).unwrap_or_default()
}

pub(crate) fn amount_of(row: &Row) -> f64 {
    row.f64(field::AMOUNT).unwrap_or(0.0)
}

/// Returns the distinct `type` series of a table, in first-seen order.
pub fn series_keys(table: &Table) -> Vec<String> {
    series_keys_by(table, field::TYPE)
}

/// Returns the distinct keys of the series field `series`, in first-seen order.
pub fn series_keys_by(table: &Table, series: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    table
        .iter()
        .map(|row| series_in(row, series))
        .filter(|k| seen.insert(k.clone()))
        .collect()
}

/// Groups rows by the key of `key`, with members told apart by `type`.
///
/// See [`group_by_series`].
pub fn group_by(table: &Table, key: &str) -> Vec<GroupedRow> {
    group_by_series(table, key, field::TYPE)
}

/// Groups rows by the key of `key`, in first-seen key order.
///
/// A repeated `(key, series)` pair replaces the earlier member in place. When grouping by
/// the series field itself, members are told apart by `period` instead. Rows without the
/// key field fall into the group with the empty key.
pub fn group_by_series(table: &Table, key: &str, series: &str) -> Vec<GroupedRow> {
    let member_field = if key == series { field::PERIOD } else { series };
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(GroupedRow, HashMap<String, usize>)> = Vec::new();
    let mut replaced = 0_usize;

    for row in table {
        let data_key = row.key(key).unwrap_or_default();
        let slot = match index.entry(data_key) {
            Entry::Occupied(e) => *e.get(),
            Entry::Vacant(e) => {
                groups.push((
                    GroupedRow {
                        data_key: e.key().clone(),
                        total: 0.0,
                        members: Vec::new(),
                        series_field: series.into(),
                    },
                    HashMap::new(),
                ));
                *e.insert(groups.len() - 1)
            }
        };
        let (group, members) = &mut groups[slot];
        match members.entry(row.key(member_field).unwrap_or_default()) {
            Entry::Occupied(e) => {
                group.members[*e.get()] = row.clone();
                replaced += 1;
            }
            Entry::Vacant(e) => {
                group.members.push(row.clone());
                e.insert(group.members.len() - 1);
            }
        }
    }

    if replaced > 0 {
        log::debug!("group_by `{key}` over `{series}`: {replaced} duplicate rows replaced");
    }

    groups
        .into_iter()
        .map(|(mut group, _)| {
            group.total = group.members.iter().map(amount_of).sum();
            group
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn row(period: &str, series: &str, amount: f64) -> Row {
        Row::new()
            .with("period", period)
            .with("type", series)
            .with("amount", amount)
    }

    #[test]
    fn groups_keep_first_seen_order_and_sum_totals() {
        let table = Table::from_rows(vec![
            row("Feb", "A", 3.0),
            row("Jan", "A", 10.0),
            row("Jan", "B", 5.0),
        ]);
        let groups = group_by(&table, "period");
        let keys: Vec<_> = groups.iter().map(|g| g.data_key.as_str()).collect();
        assert_eq!(keys, ["Feb", "Jan"]);
        assert_eq!(groups[1].total, 15.0);
        assert_eq!(groups[1].amount("B"), Some(5.0));
        assert_eq!(groups[0].amount("B"), None);
    }

    #[test]
    fn duplicate_series_is_last_write_wins() {
        let table = Table::from_rows(vec![
            row("Jan", "A", 1.0),
            row("Jan", "B", 4.0),
            row("Jan", "A", 2.0),
        ]);
        let groups = group_by(&table, "period");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].total, 6.0);
        let order: Vec<_> = groups[0].members.iter().map(series_of).collect();
        assert_eq!(order, ["A", "B"], "replacement keeps the original slot");
        assert_eq!(groups[0].amount("A"), Some(2.0));
    }

    #[test]
    fn rows_missing_type_share_the_empty_series() {
        let table = Table::from_rows(vec![
            Row::new().with("period", "Jan").with("amount", 1.0),
            row("Jan", "A", 2.0),
        ]);
        assert_eq!(series_keys(&table), ["", "A"]);
        let groups = group_by(&table, "period");
        assert_eq!(groups[0].total, 3.0);
        assert_eq!(groups[0].amount(""), Some(1.0));
    }

    #[test]
    fn grouping_by_type_keeps_one_member_per_period() {
        let table = Table::from_rows(vec![
            row("Jan", "A", 1.0),
            row("Feb", "A", 2.0),
            row("Feb", "A", 5.0),
        ]);
        let groups = group_by(&table, "type");
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].members.len(), 2);
        assert_eq!(groups[0].total, 6.0);
    }

    #[test]
    fn custom_series_field_tells_members_apart() {
        let table = Table::from_rows(vec![
            row("Jan", "A", 1.0).with("region", "north"),
            row("Jan", "A", 2.0).with("region", "south"),
            row("Feb", "B", 4.0).with("region", "north"),
        ]);
        assert_eq!(series_keys_by(&table, "region"), ["north", "south"]);

        let groups = group_by_series(&table, "period", "region");
        assert_eq!(groups[0].members.len(), 2, "same type, different regions");
        assert_eq!(groups[0].total, 3.0);
        assert_eq!(groups[0].amount("south"), Some(2.0));
        assert_eq!(groups[0].amount("A"), None);

        // Keyed by `type`, the two January rows collapse into one member.
        assert_eq!(group_by(&table, "period")[0].total, 2.0);
    }

    #[test]
    fn empty_table_has_no_groups() {
        assert!(group_by(&Table::new(), "period").is_empty());
    }
}
