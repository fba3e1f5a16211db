// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Normalizing arbitrary records into canonical rows.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use vizgraph_core::{Row, Table, Value};

use crate::field;

/// Errors returned by [`reduce_data`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransformError {
    /// A mapped source field is missing from the first record.
    Schema {
        /// The source field name that was looked up.
        field: String,
        /// The canonical field it maps to.
        canonical: &'static str,
    },
}

impl fmt::Display for TransformError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Schema { field, canonical } => {
                write!(f, "record has no field `{field}` (mapped to `{canonical}`)")
            }
        }
    }
}

impl core::error::Error for TransformError {}

/// Which source fields feed the canonical row fields.
///
/// The default maps every canonical field to a source field of the same name and leaves
/// `subColor` unmapped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldMap {
    /// Source of `amount`.
    pub amount: String,
    /// Source of `type`.
    pub series: String,
    /// Source of `period`.
    pub period: String,
    /// Source of `color`.
    pub color: String,
    /// Source of `subColor`, when mapped.
    pub sub_color: Option<String>,
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            amount: field::AMOUNT.into(),
            series: field::TYPE.into(),
            period: field::PERIOD.into(),
            color: field::COLOR.into(),
            sub_color: None,
        }
    }
}

impl FieldMap {
    /// Sets the source of `amount`.
    pub fn with_amount(mut self, source: impl Into<String>) -> Self {
        self.amount = source.into();
        self
    }

    /// Sets the source of `type`.
    pub fn with_series(mut self, source: impl Into<String>) -> Self {
        self.series = source.into();
        self
    }

    /// Sets the source of `period`.
    pub fn with_period(mut self, source: impl Into<String>) -> Self {
        self.period = source.into();
        self
    }

    /// Sets the source of `color`.
    pub fn with_color(mut self, source: impl Into<String>) -> Self {
        self.color = source.into();
        self
    }

    /// Maps `subColor` from a source field.
    pub fn with_sub_color(mut self, source: impl Into<String>) -> Self {
        self.sub_color = Some(source.into());
        self
    }

    fn required(&self) -> impl Iterator<Item = (&str, &'static str)> {
        [
            (self.amount.as_str(), field::AMOUNT),
            (self.series.as_str(), field::TYPE),
            (self.period.as_str(), field::PERIOD),
            (self.color.as_str(), field::COLOR),
        ]
        .into_iter()
        .chain(self.sub_color.as_deref().map(|s| (s, field::SUB_COLOR)))
    }
}

/// Coerces a raw amount to a finite, non-negative number.
///
/// Returns the amount and whether the raw value had to be changed.
fn coerce_amount(raw: Option<&Value>) -> (f64, bool) {
    match raw {
        Some(Value::Num(v)) if v.is_finite() && *v >= 0.0 => (*v, false),
        Some(Value::Str(s)) => match s.trim().parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => (v, true),
            _ => (0.0, true),
        },
        _ => (0.0, true),
    }
}

/// Maps records onto canonical rows.
///
/// Only the first record is checked for the mapped fields; later records missing a field
/// simply lack it (and a missing amount becomes 0). Fields outside the mapping are copied
/// through, but never over a canonical field.
pub fn reduce_data(records: &[Row], map: &FieldMap) -> Result<Table, TransformError> {
    if let Some(first) = records.first()
        && let Some((source, canonical)) = map.required().find(|(s, _)| !first.contains(s))
    {
        return Err(TransformError::Schema {
            field: source.into(),
            canonical,
        });
    }

    let mut coerced = 0_usize;
    let rows: Vec<Row> = records
        .iter()
        .map(|record| {
            let mut row = Row::new();
            for (name, value) in record.iter() {
                row.insert(name, value.clone());
            }
            let (amount, changed) = coerce_amount(record.get(&map.amount));
            if changed {
                coerced += 1;
            }
            row.insert(field::AMOUNT, amount);
            for (source, canonical) in map.required().skip(1) {
                match record.get(source) {
                    Some(v) => row.insert(canonical, v.clone()),
                    None => {
                        row.remove(canonical);
                    }
                }
            }
            row
        })
        .collect();

    if coerced > 0 {
        log::debug!("reduce_data: coerced {coerced} of {} amounts", rows.len());
    }
    Ok(Table::from_rows(rows))
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::vec;

    use super::*;

    fn record(amount: impl Into<Value>) -> Row {
        Row::new()
            .with("amount", amount)
            .with("type", "A")
            .with("period", "Jan")
            .with("color", "#f00")
    }

    #[test]
    fn amounts_are_coerced() {
        let records = vec![
            record(3.5),
            record(" 12 "),
            record("abc"),
            record(-4.0),
            record(f64::NAN),
            record("-2"),
        ];
        let table = reduce_data(&records, &FieldMap::default()).unwrap();
        assert_eq!(table.column_f64("amount"), [3.5, 12.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_field_on_first_record_is_a_schema_error() {
        let records = vec![Row::new().with("amount", 1.0).with("type", "A")];
        let err = reduce_data(&records, &FieldMap::default()).unwrap_err();
        assert_eq!(
            err,
            TransformError::Schema {
                field: "period".into(),
                canonical: "period"
            }
        );

        let mapped = FieldMap::default().with_sub_color("shade");
        let err = reduce_data(&[record(1.0)], &mapped).unwrap_err();
        assert_eq!(
            err,
            TransformError::Schema {
                field: "shade".into(),
                canonical: "subColor"
            }
        );
    }

    #[test]
    fn renamed_sources_and_extra_fields_carry_through() {
        let records = vec![
            Row::new()
                .with("value", "7")
                .with("kind", "B")
                .with("month", "Feb")
                .with("fill", "blue")
                .with("note", "kept")
                .with("type", "shadowed"),
        ];
        let map = FieldMap::default()
            .with_amount("value")
            .with_series("kind")
            .with_period("month")
            .with_color("fill");
        let table = reduce_data(&records, &map).unwrap();
        let row = &table.rows()[0];
        assert_eq!(row.f64("amount"), Some(7.0));
        assert_eq!(row.str("type"), Some("B"));
        assert_eq!(row.str("period"), Some("Feb"));
        assert_eq!(row.str("color"), Some("blue"));
        assert_eq!(row.str("note"), Some("kept"));
    }

    #[test]
    fn empty_input_is_empty_output() {
        let table = reduce_data(&[], &FieldMap::default()).unwrap();
        assert!(table.is_empty());
    }
}
