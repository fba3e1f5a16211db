// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render passes: from a [`SceneNode`] and bound tables to an [`IntermediateNode`] tree.
//!
//! Per node, resolution runs in a fixed order: scales (in declaration order, on top of the
//! scales inherited from the parent), marks, faceted children, then axes. The resulting tree
//! carries everything a [`Renderer`] needs and nothing that refers back to the scene.
//!
//! A table that is named but not bound is not fatal: the node is emitted empty with
//! [`SkipReason::MissingTable`] and a warning is logged. Any other failure aborts the pass
//! and reports the path of the node that failed.

extern crate alloc;

use alloc::borrow::Cow;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Point, Size};
use smallvec::SmallVec;
use vizgraph_core::{
    ElementAttributes, EncodingError, MarkSpec, MarkType, ScaleError, Scales, SceneNode, Table,
    Tables, resolve_mark,
};

use crate::axis::{AxisError, AxisGuide, resolve_axis};
use crate::renderer::{Channels, Renderer};

/// Size and placement of a render pass.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChartOptions {
    /// Total width.
    pub width: f64,
    /// Total height.
    pub height: f64,
    /// Inset on every side; the view is the remaining area.
    pub padding: f64,
    /// Position of the view; defaults to `(padding, padding)`.
    pub origin: Option<Point>,
    /// Treat unbound tables as errors instead of skipping the node.
    pub strict_tables: bool,
}

impl ChartOptions {
    /// Creates options for a `width` × `height` chart with no padding.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            padding: 0.0,
            origin: None,
            strict_tables: false,
        }
    }

    /// Sets the padding.
    pub fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the view origin.
    pub fn with_origin(mut self, origin: Point) -> Self {
        self.origin = Some(origin);
        self
    }

    /// Makes unbound tables an error.
    pub fn with_strict_tables(mut self, strict: bool) -> Self {
        self.strict_tables = strict;
        self
    }

    /// Returns the view size: the total size minus padding on both sides, never negative.
    pub fn view(&self) -> Size {
        Size::new(
            (self.width - 2.0 * self.padding).max(0.0),
            (self.height - 2.0 * self.padding).max(0.0),
        )
    }

    /// Returns the view origin.
    pub fn origin(&self) -> Point {
        self.origin
            .unwrap_or(Point::new(self.padding, self.padding))
    }

    /// Checks that every size is finite and non-negative.
    pub fn validate(&self) -> Result<(), ResolveError> {
        let checks = [
            (self.width, "width"),
            (self.height, "height"),
            (self.padding, "padding"),
        ];
        for (value, name) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(ResolveError::InvalidOptions(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        if let Some(origin) = self.origin
            && !(origin.x.is_finite() && origin.y.is_finite())
        {
            return Err(ResolveError::InvalidOptions(format!(
                "origin must be finite, got {origin:?}"
            )));
        }
        Ok(())
    }
}

/// The position of a node in the resolved tree: `root/layers[A]/…`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct NodePath {
    segments: SmallVec<[String; 4]>,
}

impl NodePath {
    /// A path with a single segment.
    pub fn root(name: impl Into<String>) -> Self {
        let mut segments = SmallVec::new();
        segments.push(name.into());
        Self { segments }
    }

    /// Returns this path extended by one segment.
    pub fn child(&self, segment: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(segment.into());
        Self { segments }
    }

    /// Returns the segments, root first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            f.write_str(segment)?;
        }
        Ok(())
    }
}

/// Identifies what raised an event or failed: a node, optionally one of its marks, and
/// optionally one element of that mark.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NodeMetadata {
    /// Path of the node.
    pub path: NodePath,
    /// Index of the mark within the node.
    pub mark: Option<usize>,
    /// Index of the element within the mark.
    pub element: Option<usize>,
}

/// Why a node or mark was emitted without content.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SkipReason {
    /// The named table is not bound for this pass.
    MissingTable {
        /// The table name.
        table: String,
    },
}

/// A resolved mark.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkNode {
    /// Mark type.
    pub kind: MarkType,
    /// Mark name, if declared.
    pub name: Option<String>,
    /// One entry per datum, in table order.
    pub elements: Vec<ElementAttributes>,
    /// Set when the mark's own table was not bound.
    pub skipped: Option<SkipReason>,
}

/// A resolved scene node.
#[derive(Clone, Debug, PartialEq)]
pub struct IntermediateNode {
    /// Path from the root.
    pub path: NodePath,
    /// Name of the scene node this was resolved from.
    pub name: String,
    /// The facet group key this instance was created for.
    pub facet_key: Option<String>,
    /// Offset from the parent's origin (the root's is the chart origin).
    pub origin: Point,
    /// View size.
    pub view: Size,
    /// Scales visible to this node, inherited ones included.
    pub scales: Scales,
    /// Resolved axes.
    pub axes: Vec<AxisGuide>,
    /// Resolved marks, in declaration order.
    pub marks: Vec<MarkNode>,
    /// Facet instances of the child nodes, in declaration then group order.
    pub children: Vec<IntermediateNode>,
    /// Set when the node's table was not bound.
    pub skipped: Option<SkipReason>,
}

impl IntermediateNode {
    /// Visits this node and its descendants, depth first.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Self)) {
        f(self);
        for child in &self.children {
            child.walk(f);
        }
    }

    /// Finds a descendant (or this node) by path.
    pub fn find(&self, path: &NodePath) -> Option<&Self> {
        if &self.path == path {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(path))
    }
}

/// Errors that abort a render pass.
#[derive(Clone, Debug, PartialEq)]
pub enum ResolveError {
    /// A table is not bound and [`ChartOptions::strict_tables`] is set.
    MissingTable {
        /// The table name.
        table: String,
    },
    /// A scale failed to resolve.
    Scale(ScaleError),
    /// A mark encoding failed.
    Encoding {
        /// Index of the mark within its node.
        mark: usize,
        /// The encoding failure.
        error: EncodingError,
    },
    /// An axis failed to resolve.
    Axis(AxisError),
    /// The chart options are unusable.
    InvalidOptions(String),
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingTable { table } => write!(f, "table `{table}` is not bound"),
            Self::Scale(e) => write!(f, "scale: {e}"),
            Self::Encoding { mark, error } => write!(f, "mark {mark}: {error}"),
            Self::Axis(e) => write!(f, "axis: {e}"),
            Self::InvalidOptions(reason) => write!(f, "invalid chart options: {reason}"),
        }
    }
}

impl core::error::Error for ResolveError {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        match self {
            Self::Scale(e) => Some(e),
            Self::Encoding { error, .. } => Some(error),
            Self::Axis(e) => Some(e),
            Self::MissingTable { .. } | Self::InvalidOptions(_) => None,
        }
    }
}

/// A [`ResolveError`] and the path of the node it happened in.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolveFailure {
    /// Path of the failing node.
    pub path: NodePath,
    /// What went wrong.
    pub error: ResolveError,
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "at `{}`: {}", self.path, self.error)
    }
}

impl core::error::Error for ResolveFailure {
    fn source(&self) -> Option<&(dyn core::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Errors returned by [`Orchestrator::render`].
#[derive(Clone, Debug, PartialEq)]
pub enum RenderError<E> {
    /// Resolution failed; the renderer was not called.
    Resolve(ResolveFailure),
    /// The renderer failed.
    Renderer {
        /// Path of the node the renderer reported.
        path: NodePath,
        /// The renderer's error.
        error: E,
    },
}

impl<E: fmt::Display> fmt::Display for RenderError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Resolve(e) => write!(f, "resolve failed {e}"),
            Self::Renderer { path, error } => write!(f, "renderer failed at `{path}`: {error}"),
        }
    }
}

impl<E: fmt::Debug + fmt::Display> core::error::Error for RenderError<E> {}

impl<E> From<ResolveFailure> for RenderError<E> {
    fn from(value: ResolveFailure) -> Self {
        Self::Resolve(value)
    }
}

struct Pass<'a> {
    tables: &'a Tables,
    strict: bool,
}

impl Pass<'_> {
    /// Looks up a named table. `Ok(None)` means "skip": not bound, and not strict.
    fn table(&self, name: &str, path: &NodePath) -> Result<Option<&Table>, ResolveFailure> {
        match self.tables.get(name) {
            Some(table) => Ok(Some(table)),
            None if self.strict => Err(ResolveFailure {
                path: path.clone(),
                error: ResolveError::MissingTable { table: name.into() },
            }),
            None => {
                log::warn!("{path}: table `{name}` is not bound; skipping");
                Ok(None)
            }
        }
    }

    fn mark(
        &self,
        index: usize,
        mark: &MarkSpec,
        table: &Table,
        scales: &Scales,
        view: Size,
        path: &NodePath,
    ) -> Result<MarkNode, ResolveFailure> {
        let table = match &mark.table {
            Some(name) => match self.table(name, path)? {
                Some(t) => t,
                None => {
                    return Ok(MarkNode {
                        kind: mark.kind,
                        name: mark.name.clone(),
                        elements: Vec::new(),
                        skipped: Some(SkipReason::MissingTable {
                            table: name.clone(),
                        }),
                    });
                }
            },
            None => table,
        };
        let elements = resolve_mark(mark, table, scales, view).map_err(|error| ResolveFailure {
            path: path.clone(),
            error: ResolveError::Encoding { mark: index, error },
        })?;
        Ok(MarkNode {
            kind: mark.kind,
            name: mark.name.clone(),
            elements,
            skipped: None,
        })
    }

    fn node(
        &self,
        node: &SceneNode,
        path: NodePath,
        facet_key: Option<String>,
        table: Option<Cow<'_, Table>>,
        inherited: &Scales,
        origin: Point,
        view: Size,
    ) -> Result<IntermediateNode, ResolveFailure> {
        let mut out = IntermediateNode {
            path,
            name: node.name().into(),
            facet_key,
            origin,
            view,
            scales: inherited.clone(),
            axes: Vec::new(),
            marks: Vec::new(),
            children: Vec::new(),
            skipped: None,
        };

        // A node's own binding wins over the table handed down by its facet.
        let table: Cow<'_, Table> = match node.table() {
            Some(name) => match self.table(name, &out.path)? {
                Some(t) => Cow::Borrowed(t),
                None => {
                    out.skipped = Some(SkipReason::MissingTable { table: name.into() });
                    return Ok(out);
                }
            },
            None => table.unwrap_or_default(),
        };

        let fail = |path: &NodePath, error| ResolveFailure {
            path: path.clone(),
            error,
        };

        for spec in node.scales() {
            let scale = spec
                .resolve(&table, view, &out.scales)
                .map_err(|e| fail(&out.path, ResolveError::Scale(e)))?;
            out.scales.insert(spec.name.clone(), scale);
        }

        for (index, mark) in node.marks().iter().enumerate() {
            let resolved = self.mark(index, mark, &table, &out.scales, view, &out.path)?;
            out.marks.push(resolved);
        }

        for (facet, child) in node.children() {
            let source = match &facet.table {
                Some(name) => match self.table(name, &out.path)? {
                    Some(t) => t,
                    None => {
                        out.children.push(IntermediateNode {
                            path: out.path.child(facet.name.as_str()),
                            name: child.name().into(),
                            facet_key: None,
                            origin: Point::ZERO,
                            view,
                            scales: out.scales.clone(),
                            axes: Vec::new(),
                            marks: Vec::new(),
                            children: Vec::new(),
                            skipped: Some(SkipReason::MissingTable { table: name.clone() }),
                        });
                        continue;
                    }
                },
                None => &*table,
            };
            for instance in facet.instances(source) {
                let segment = match &instance.key {
                    Some(key) => format!("{}[{key}]", facet.name),
                    None => facet.name.clone(),
                };
                let resolved = self.node(
                    child,
                    out.path.child(segment),
                    instance.key,
                    Some(Cow::Owned(instance.table)),
                    &out.scales,
                    Point::ZERO,
                    view,
                )?;
                out.children.push(resolved);
            }
        }

        for axis in node.axes() {
            let guide = resolve_axis(axis, &out.scales, view)
                .map_err(|e| fail(&out.path, ResolveError::Axis(e)))?;
            out.axes.push(guide);
        }

        log::trace!(
            "{}: {} scales, {} marks, {} children, {} axes",
            out.path,
            out.scales.len(),
            out.marks.len(),
            out.children.len(),
            out.axes.len()
        );
        Ok(out)
    }
}

/// Resolves `node` against `tables` without freezing it or rendering.
pub fn resolve(
    node: &SceneNode,
    options: &ChartOptions,
    tables: &Tables,
) -> Result<IntermediateNode, ResolveFailure> {
    let path = NodePath::root(node.name());
    options.validate().map_err(|error| ResolveFailure {
        path: path.clone(),
        error,
    })?;
    let pass = Pass {
        tables,
        strict: options.strict_tables,
    };
    pass.node(
        node,
        path,
        None,
        None,
        &Scales::new(),
        options.origin(),
        options.view(),
    )
}

/// Drives render passes through an injected [`Renderer`].
#[derive(Debug)]
pub struct Orchestrator<R> {
    renderer: R,
}

impl<R: Renderer> Orchestrator<R> {
    /// Creates an orchestrator around a renderer.
    pub fn new(renderer: R) -> Self {
        Self { renderer }
    }

    /// Returns the renderer.
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Consumes the orchestrator, returning the renderer.
    pub fn into_renderer(self) -> R {
        self.renderer
    }

    /// Resolves `node` without freezing it.
    pub fn resolve(
        &self,
        node: &SceneNode,
        options: &ChartOptions,
        tables: &Tables,
    ) -> Result<IntermediateNode, ResolveFailure> {
        resolve(node, options, tables)
    }

    /// Freezes `node`, resolves it and hands the tree to the renderer.
    ///
    /// Renderer errors are passed through untouched, tagged with the path the renderer
    /// reported.
    pub fn render(
        &mut self,
        node: &SceneNode,
        options: &ChartOptions,
        tables: &Tables,
        channels: &Channels,
    ) -> Result<R::Output, RenderError<R::Error>> {
        node.freeze();
        let tree = resolve(node, options, tables)?;
        log::debug!("rendering `{}`", tree.path);
        self.renderer
            .render(&tree, channels)
            .map_err(|f| RenderError::Renderer {
                path: f.path,
                error: f.error,
            })
    }
}
