// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Record normalization and chart layouts over `vizgraph_core` tables.
//!
//! This crate provides:
//! - [`reduce_data`], mapping arbitrary records onto canonical rows (see [`field`]),
//! - the layouts behind every chart shape ([`group_by`], [`build_stack`], [`build_pie`],
//!   dispatched by [`build_shape`]), and
//! - a small [`Transform`] IR that flattens those layouts back into tables so that they can
//!   drive facets.
//!
//! Everything here is a pure function of its inputs. Row order is preserved unless a layout
//! regroups, and regrouping is always first-seen ordered.

#![no_std]

extern crate alloc;

pub mod field;
mod group;
mod pie;
mod schema;
mod shape;
mod stack;
mod transform;

pub use group::{GroupedRow, group_by, group_by_series, series_keys, series_keys_by, series_of};
pub use pie::{PieArc, build_pie};
pub use schema::{FieldMap, TransformError, reduce_data};
pub use shape::{ChartShape, ShapeOutput, build_group, build_shape};
pub use stack::{Series, StackOrder, StackPoint, build_stack, build_stack_by};
pub use transform::{CompareOp, Predicate, Transform, apply_all};
