// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `vizgraph_core`: the declarative half of a chart.
//!
//! This crate provides:
//! - row-oriented data ([`Table`], [`Row`], [`Value`])
//! - scale declarations and their pure resolution ([`ScaleSpec`], [`Scale`], [`Scales`])
//! - mark declarations with constant or per-datum encodings ([`MarkSpec`], [`Encoding`])
//! - the scene graph ([`SceneNode`], [`Facet`], [`AxisSpec`])
//!
//! Nothing here renders. A render pass (see `vizgraph_charts`) freezes a [`SceneNode`],
//! resolves its scales against bound tables, evaluates every mark encoding and hands the
//! result to a renderer.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod encoding;
#[cfg(not(feature = "std"))]
mod float;
mod scale;
mod scene;
mod table;

pub use encoding::{
    AttrValue, Channel, ElementAttributes, EncodeCtx, Encoding, EncodingError, MarkSpec,
    MarkType, resolve_channel, resolve_mark,
};
pub use scale::{
    DomainSource, KeySource, RangeSpec, Scale, ScaleBand, ScaleError, ScaleKind, ScaleLinear,
    ScaleOrdinal, ScaleSpec, Scales, resolve_band, resolve_color, resolve_domain,
};
pub use scene::{
    AxisOrient, AxisSpec, Facet, FacetInstance, FrozenNodeError, GroupBy, SceneChange,
    SceneNode,
};
pub use table::{Row, Table, Tables, Value, parse_css_color};
