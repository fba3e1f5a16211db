// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The declarative scene graph.
//!
//! A [`SceneNode`] owns scale, axis and mark declarations plus faceted children. Nodes are
//! assembled through fallible mutators that notify subscribers with a [`SceneChange`]; once a
//! node has been rendered it is frozen and every mutator returns [`FrozenNodeError`].

extern crate alloc;

use alloc::boxed::Box;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;

use crate::encoding::{MarkSpec, MarkType};
use crate::scale::ScaleSpec;
use crate::table::{Row, Table, Value};

/// Which side of the view an axis is drawn on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AxisOrient {
    /// Above the view, ticks pointing up.
    Top,
    /// Below the view, ticks pointing down.
    Bottom,
    /// Left of the view, ticks pointing left.
    Left,
    /// Right of the view, ticks pointing right.
    Right,
}

impl AxisOrient {
    /// Returns `true` for top and bottom axes.
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Top | Self::Bottom)
    }
}

type TickFormatFn = dyn Fn(f64, f64) -> String;

/// An axis declaration.
#[derive(Clone)]
pub struct AxisSpec {
    /// Name of the scale the axis renders.
    pub scale: String,
    /// Axis side.
    pub orient: AxisOrient,
    /// Requested number of ticks for continuous scales.
    pub tick_count: usize,
    /// Tick line length.
    pub tick_size: f64,
    /// Gap between tick line and label.
    pub tick_padding: f64,
    /// Optional title.
    pub title: Option<String>,
    /// Whether grid lines span the view at each tick.
    pub grid: bool,
    /// Custom label formatter, called with `(value, tick step)`.
    pub formatter: Option<Arc<TickFormatFn>>,
}

impl fmt::Debug for AxisSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AxisSpec")
            .field("scale", &self.scale)
            .field("orient", &self.orient)
            .field("tick_count", &self.tick_count)
            .field("tick_size", &self.tick_size)
            .field("tick_padding", &self.tick_padding)
            .field("title", &self.title)
            .field("grid", &self.grid)
            .field("formatter", &self.formatter.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

impl AxisSpec {
    /// Creates an axis for `scale` with 10 ticks of size 6 and padding 3.
    pub fn new(scale: impl Into<String>, orient: AxisOrient) -> Self {
        Self {
            scale: scale.into(),
            orient,
            tick_count: 10,
            tick_size: 6.0,
            tick_padding: 3.0,
            title: None,
            grid: false,
            formatter: None,
        }
    }

    /// Sets the requested tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Sets the tick line length.
    pub fn with_tick_size(mut self, tick_size: f64) -> Self {
        self.tick_size = tick_size;
        self
    }

    /// Sets the tick label padding.
    pub fn with_tick_padding(mut self, tick_padding: f64) -> Self {
        self.tick_padding = tick_padding;
        self
    }

    /// Sets the axis title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Enables grid lines.
    pub fn with_grid(mut self, grid: bool) -> Self {
        self.grid = grid;
        self
    }

    /// Sets a label formatter, called with `(value, tick step)`.
    pub fn with_formatter(mut self, f: impl Fn(f64, f64) -> String + 'static) -> Self {
        self.formatter = Some(Arc::new(f));
        self
    }
}

type KeyFn = dyn Fn(&Row) -> Value;
type TransformFn = dyn Fn(&Table) -> Table;

/// How a facet partitions its rows.
#[derive(Clone)]
pub enum GroupBy {
    /// Group by the key of a field. Rows without the field are dropped.
    Field(String),
    /// Group by a computed key.
    Compute(Arc<KeyFn>),
}

impl GroupBy {
    fn key(&self, row: &Row) -> Option<String> {
        match self {
            Self::Field(field) => row.key(field),
            Self::Compute(f) => Some(f(row).to_key()),
        }
    }
}

impl fmt::Debug for GroupBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Compute(_) => f.debug_tuple("Compute").field(&"<fn>").finish(),
        }
    }
}

/// Describes how a child node is instantiated from data.
///
/// The optional `transform` runs first, over the whole source table. The result is then
/// partitioned by `group_by` into one instance per distinct key, in first-seen order.
#[derive(Clone)]
pub struct Facet {
    /// Facet name, used in node paths.
    pub name: String,
    /// Bound table to read instead of the parent's table.
    pub table: Option<String>,
    /// Partitioning of the (transformed) rows.
    pub group_by: Option<GroupBy>,
    transform: Option<Arc<TransformFn>>,
}

impl fmt::Debug for Facet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Facet")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("group_by", &self.group_by)
            .field("transform", &self.transform.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

/// One instance of a facet: its group key (if grouped) and its rows.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetInstance {
    /// The group key, or `None` for an ungrouped facet.
    pub key: Option<String>,
    /// The rows of this instance.
    pub table: Table,
}

impl Facet {
    /// Creates an ungrouped facet with no transform.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            group_by: None,
            transform: None,
        }
    }

    /// Reads rows from a named bound table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Groups rows by a field.
    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = Some(GroupBy::Field(field.into()));
        self
    }

    /// Groups rows by a computed key.
    pub fn with_group_by_fn(mut self, f: impl Fn(&Row) -> Value + 'static) -> Self {
        self.group_by = Some(GroupBy::Compute(Arc::new(f)));
        self
    }

    /// Sets the table transform applied before grouping.
    pub fn with_transform(mut self, f: impl Fn(&Table) -> Table + 'static) -> Self {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Splits `source` into facet instances.
    ///
    /// Without `group_by` there is exactly one instance. With `group_by`, an empty table
    /// yields no instances.
    pub fn instances(&self, source: &Table) -> Vec<FacetInstance> {
        let table = match &self.transform {
            Some(f) => f(source),
            None => source.clone(),
        };
        let Some(group_by) = &self.group_by else {
            return vec![FacetInstance { key: None, table }];
        };

        let mut index: HashMap<String, usize> = HashMap::new();
        let mut out: Vec<FacetInstance> = Vec::new();
        for row in table.into_rows() {
            let Some(key) = group_by.key(&row) else {
                continue;
            };
            match index.entry(key) {
                Entry::Occupied(e) => out[*e.get()].table.push(row),
                Entry::Vacant(e) => {
                    out.push(FacetInstance {
                        key: Some(e.key().clone()),
                        table: Table::from_rows(vec![row]),
                    });
                    e.insert(out.len() - 1);
                }
            }
        }
        out
    }
}

/// A structural change made through a [`SceneNode`] mutator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SceneChange {
    /// A table name was bound.
    TableBound {
        /// The bound table name.
        table: String,
    },
    /// A scale was declared.
    ScaleAdded {
        /// Scale name.
        name: String,
    },
    /// An axis was declared.
    AxisAdded {
        /// Name of the axis scale.
        scale: String,
    },
    /// A mark was declared.
    MarkAdded {
        /// Mark type.
        kind: MarkType,
    },
    /// A faceted child was attached.
    ChildAdded {
        /// Facet name.
        facet: String,
    },
}

/// A node was mutated after it was first rendered.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrozenNodeError {
    /// Name of the frozen node.
    pub node: String,
}

impl fmt::Display for FrozenNodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "scene node `{}` is frozen after its first render", self.node)
    }
}

impl core::error::Error for FrozenNodeError {}

type Listener = Box<dyn FnMut(&SceneChange)>;

/// A node of the scene graph.
pub struct SceneNode {
    name: String,
    table: Option<String>,
    scales: Vec<ScaleSpec>,
    axes: Vec<AxisSpec>,
    marks: Vec<MarkSpec>,
    children: Vec<(Facet, SceneNode)>,
    frozen: Cell<bool>,
    listeners: Vec<Listener>,
}

impl fmt::Debug for SceneNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SceneNode")
            .field("name", &self.name)
            .field("table", &self.table)
            .field("scales", &self.scales)
            .field("axes", &self.axes)
            .field("marks", &self.marks)
            .field("children", &self.children)
            .field("frozen", &self.frozen.get())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl SceneNode {
    /// Creates an empty, unfrozen node.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            scales: Vec::new(),
            axes: Vec::new(),
            marks: Vec::new(),
            children: Vec::new(),
            frozen: Cell::new(false),
            listeners: Vec::new(),
        }
    }

    /// Returns the node name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the bound table name.
    pub fn table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// Returns the scale declarations in resolution order.
    pub fn scales(&self) -> &[ScaleSpec] {
        &self.scales
    }

    /// Returns the axis declarations.
    pub fn axes(&self) -> &[AxisSpec] {
        &self.axes
    }

    /// Returns the mark declarations.
    pub fn marks(&self) -> &[MarkSpec] {
        &self.marks
    }

    /// Returns the faceted children.
    pub fn children(&self) -> &[(Facet, Self)] {
        &self.children
    }

    /// Returns `true` once the node has been rendered.
    pub fn is_frozen(&self) -> bool {
        self.frozen.get()
    }

    /// Freezes this node and its descendants. Idempotent.
    pub fn freeze(&self) {
        if self.frozen.replace(true) {
            return;
        }
        log::debug!("freezing scene node `{}`", self.name);
        for (_, child) in &self.children {
            child.freeze();
        }
    }

    /// Registers a listener for structural changes.
    pub fn subscribe(&mut self, listener: impl FnMut(&SceneChange) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    fn mutate(
        &mut self,
        change: SceneChange,
        apply: impl FnOnce(&mut Self),
    ) -> Result<&mut Self, FrozenNodeError> {
        if self.frozen.get() {
            return Err(FrozenNodeError {
                node: self.name.clone(),
            });
        }
        apply(self);
        for listener in &mut self.listeners {
            listener(&change);
        }
        Ok(self)
    }

    /// Binds the node to a named table.
    pub fn bind_table(&mut self, table: impl Into<String>) -> Result<&mut Self, FrozenNodeError> {
        let table = table.into();
        let change = SceneChange::TableBound {
            table: table.clone(),
        };
        self.mutate(change, |node| node.table = Some(table))
    }

    /// Declares a scale. Scales resolve in declaration order.
    pub fn add_scale(&mut self, scale: ScaleSpec) -> Result<&mut Self, FrozenNodeError> {
        let change = SceneChange::ScaleAdded {
            name: scale.name.clone(),
        };
        self.mutate(change, |node| node.scales.push(scale))
    }

    /// Declares an axis.
    pub fn add_axis(&mut self, axis: AxisSpec) -> Result<&mut Self, FrozenNodeError> {
        let change = SceneChange::AxisAdded {
            scale: axis.scale.clone(),
        };
        self.mutate(change, |node| node.axes.push(axis))
    }

    /// Declares a mark.
    pub fn add_mark(&mut self, mark: MarkSpec) -> Result<&mut Self, FrozenNodeError> {
        let change = SceneChange::MarkAdded { kind: mark.kind };
        self.mutate(change, |node| node.marks.push(mark))
    }

    /// Attaches a child node, instantiated once per facet instance at render time.
    pub fn add_child(&mut self, facet: Facet, child: Self) -> Result<&mut Self, FrozenNodeError> {
        let change = SceneChange::ChildAdded {
            facet: facet.name.clone(),
        };
        self.mutate(change, |node| node.children.push((facet, child)))
    }
}
