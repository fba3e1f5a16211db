// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Row-oriented tables of primitive values.
//!
//! Tables are small, owned and ordered. Row order is the source order and every transform
//! preserves it unless it explicitly regroups.

extern crate alloc;

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::fmt;

use hashbrown::{HashMap, HashSet};
use peniko::Color;

/// A primitive cell value.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// A number.
    Num(f64),
    /// A string.
    Str(String),
}

impl Value {
    /// Returns the numeric value, if this is a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(*v),
            Self::Str(_) => None,
        }
    }

    /// Returns the string value, if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Num(_) => None,
            Self::Str(s) => Some(s),
        }
    }

    /// Renders this value as a grouping/band key.
    ///
    /// Strings are used as-is; numbers use their `Display` form (`3.0` becomes `"3"`).
    pub fn to_key(&self) -> String {
        match self {
            Self::Num(v) => v.to_string(),
            Self::Str(s) => s.clone(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Num(v) => write!(f, "{v}"),
            Self::Str(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Num(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Str(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// A mapping from field name to [`Value`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Row {
    fields: HashMap<String, Value>,
}

impl Row {
    /// Creates an empty row.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Row::insert`].
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Sets a field, replacing any previous value.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Removes a field, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.fields.remove(name)
    }

    /// Returns a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Returns `true` if the row has a field with this name.
    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Returns a numeric field. String fields are not parsed.
    pub fn f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    /// Returns a string field.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Returns a field rendered as a key (see [`Value::to_key`]).
    pub fn key(&self, name: &str) -> Option<String> {
        self.get(name).map(Value::to_key)
    }

    /// Iterates over `(name, value)` pairs in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the row has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

/// An ordered sequence of [`Row`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a table from rows, keeping their order.
    pub fn from_rows(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Appends a row.
    pub fn push(&mut self, row: Row) {
        self.rows.push(row);
    }

    /// Returns the rows in order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Consumes the table, returning its rows.
    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates over rows in order.
    pub fn iter(&self) -> core::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns the distinct keys of a field in first-seen order.
    ///
    /// Rows without the field are skipped.
    pub fn distinct_keys(&self, field: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for key in self.rows.iter().filter_map(|r| r.key(field)) {
            if seen.insert(key.clone()) {
                out.push(key);
            }
        }
        out
    }

    /// Returns the numeric values of a field, in row order.
    ///
    /// Rows where the field is missing or not a number are skipped.
    pub fn column_f64(&self, field: &str) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.f64(field)).collect()
    }
}

impl FromIterator<Row> for Table {
    fn from_iter<I: IntoIterator<Item = Row>>(iter: I) -> Self {
        Self {
            rows: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a Row;
    type IntoIter = core::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Named tables bound to a render pass.
pub type Tables = HashMap<String, Table>;

/// Parses a CSS color string (`"#f00"`, `"steelblue"`, `"rgb(…)"`).
pub fn parse_css_color(s: &str) -> Option<Color> {
    peniko::color::parse_color(s)
        .ok()
        .map(|c| c.to_alpha_color::<peniko::color::Srgb>())
}
