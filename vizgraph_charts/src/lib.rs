// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render orchestration and chart presets for `vizgraph_core`.
//!
//! This crate sits between a declared scene and whatever draws it:
//! - [`Orchestrator`] freezes a [`vizgraph_core::SceneNode`], resolves it against bound
//!   tables into an [`IntermediateNode`] tree and hands that tree to a [`Renderer`].
//! - Axes are resolved into [`AxisGuide`]s (tick positions and labels) during the same pass.
//! - [`ChartSpec`] builds the scene for stacked, grouped and pie charts.
//!
//! Renderers are injected; this crate never draws. Text is unshaped.

#![no_std]

extern crate alloc;
#[cfg(feature = "std")]
extern crate std;

mod axis;
mod chart_spec;
#[cfg(test)]
mod chart_tests;
#[cfg(not(feature = "std"))]
mod float;
mod format;
mod orchestrator;
mod palette;
mod renderer;

pub use axis::{AxisError, AxisGuide, Tick, resolve_axis};
pub use chart_spec::{ChartSpec, Orientation};
pub use format::{format_percent, format_tick};
pub use orchestrator::{
    ChartOptions, IntermediateNode, MarkNode, NodeMetadata, NodePath, Orchestrator, RenderError,
    ResolveError, ResolveFailure, SkipReason, resolve,
};
pub use palette::{PALETTE, default_palette, palette_from_table};
pub use renderer::{ChannelEvent, Channels, RenderFailure, Renderer};
