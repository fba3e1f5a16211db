// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart presets.
//!
//! A [`ChartSpec`] assembles the scene graph for one of the [`ChartShape`]s over a table of
//! canonical rows (see `vizgraph_transforms::reduce_data`). Every preset shares the same
//! skeleton: scales and axes on the root node, and the data-bearing marks on faceted
//! children whose facet transform is the shape's layout.
//!
//! Scale names are fixed: `x`, `y` and `x2` for positions and `color` for fills.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use peniko::Color;
use peniko::color::palette::css;
use vizgraph_core::{
    AxisOrient, AxisSpec, Channel, DomainSource, EncodeCtx, Facet, FrozenNodeError, KeySource,
    MarkSpec, MarkType, RangeSpec, ScaleSpec, SceneNode,
};
use vizgraph_transforms::{ChartShape, StackOrder, Transform, field};

use crate::format::{format_percent, format_tick};
use crate::palette::{PALETTE, default_palette};

/// Bar direction for stacked charts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Orientation {
    /// Bars grow upwards from a bottom band axis.
    #[default]
    Vertical,
    /// Bars grow rightwards from a left band axis.
    Horizontal,
}

/// A chart preset.
#[derive(Clone, Debug, PartialEq)]
pub struct ChartSpec {
    /// Layout.
    pub shape: ChartShape,
    /// Bar direction (stacked charts only).
    pub orientation: Orientation,
    /// Name of the bound table of canonical rows.
    pub table: String,
    /// Category field (bands for bars).
    pub group_by: String,
    /// Series field (stack layers, inner bands, pie slices).
    pub series_field: String,
    /// Fill palette over the series; `None` uses [`default_palette`].
    pub palette: Option<Vec<Color>>,
    /// Band padding, as a fraction of the band step.
    pub band_padding: f64,
    /// Requested ticks on the value axis.
    pub tick_count: usize,
    /// Whether value labels are drawn.
    pub labels: bool,
    /// Stack layer order.
    pub stack_order: StackOrder,
    /// Pie radius inset from half the shorter view side.
    pub radius_offset: f64,
}

/// Offset of a value label above its bar.
const LABEL_OFFSET: f64 = 9.0;
/// Pie slices whose rounded percentage is at or below this are left unlabelled.
const MIN_LABEL_PERCENT: f64 = 5.0;
/// Font size of the pie total, and its distance below the view.
const OVERVIEW_SIZE: f64 = 18.0;

impl ChartSpec {
    /// Creates a preset with defaults: `period` bands, `type` series, 0.1 band padding,
    /// 10 value ticks, labels on and a 15 unit pie inset.
    pub fn new(shape: ChartShape, table: impl Into<String>) -> Self {
        Self {
            shape,
            orientation: Orientation::Vertical,
            table: table.into(),
            group_by: field::PERIOD.into(),
            series_field: field::TYPE.into(),
            palette: None,
            band_padding: 0.1,
            tick_count: 10,
            labels: true,
            stack_order: StackOrder::Input,
            radius_offset: 15.0,
        }
    }

    /// A stacked bar chart.
    pub fn stack(table: impl Into<String>) -> Self {
        Self::new(ChartShape::Stack, table)
    }

    /// A grouped bar chart.
    pub fn group(table: impl Into<String>) -> Self {
        Self::new(ChartShape::Group, table)
    }

    /// A pie chart; slices are the series.
    pub fn pie(table: impl Into<String>) -> Self {
        Self::new(ChartShape::Pie, table)
    }

    /// Sets the bar direction.
    pub fn with_orientation(mut self, orientation: Orientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Sets the category field.
    pub fn with_group_by(mut self, field: impl Into<String>) -> Self {
        self.group_by = field.into();
        self
    }

    /// Sets the series field.
    pub fn with_series_field(mut self, field: impl Into<String>) -> Self {
        self.series_field = field.into();
        self
    }

    /// Sets the fill palette. An empty palette falls back to the default.
    pub fn with_palette(mut self, palette: Vec<Color>) -> Self {
        self.palette = (!palette.is_empty()).then_some(palette);
        self
    }

    /// Sets the band padding.
    pub fn with_band_padding(mut self, padding: f64) -> Self {
        self.band_padding = padding;
        self
    }

    /// Sets the value axis tick count.
    pub fn with_tick_count(mut self, tick_count: usize) -> Self {
        self.tick_count = tick_count;
        self
    }

    /// Turns value labels on or off.
    pub fn with_labels(mut self, labels: bool) -> Self {
        self.labels = labels;
        self
    }

    /// Sets the stack layer order.
    pub fn with_stack_order(mut self, order: StackOrder) -> Self {
        self.stack_order = order;
        self
    }

    /// Sets the pie radius inset.
    pub fn with_radius_offset(mut self, offset: f64) -> Self {
        self.radius_offset = offset;
        self
    }

    fn palette(&self) -> Vec<Color> {
        self.palette.clone().unwrap_or_else(|| default_palette(PALETTE.len()))
    }

    fn color_scale(&self) -> ScaleSpec {
        ScaleSpec::ordinal(
            "color",
            KeySource::Field(self.series_field.clone()),
            self.palette(),
        )
    }

    /// Builds the scene graph.
    pub fn build(&self) -> Result<SceneNode, FrozenNodeError> {
        log::debug!("building {:?} chart over `{}`", self.shape, self.table);
        let mut root = SceneNode::new(match self.shape {
            ChartShape::Stack => "stack",
            ChartShape::Group => "group",
            ChartShape::Pie => "pie",
        });
        root.bind_table(self.table.as_str())?;
        match self.shape {
            ChartShape::Stack => self.build_stack(&mut root)?,
            ChartShape::Group => self.build_group(&mut root)?,
            ChartShape::Pie => self.build_pie(&mut root)?,
        }
        Ok(root)
    }

    fn build_stack(&self, root: &mut SceneNode) -> Result<(), FrozenNodeError> {
        let key = self.group_by.clone();
        let series = self.series_field.clone();
        let totals = Transform::group_totals(key.as_str()).with_series(series.as_str());
        let domain_totals = totals.clone();
        let stacked_totals =
            DomainSource::compute(move |t| domain_totals.apply(t).column_f64(field::TOTAL));
        let horizontal = self.orientation == Orientation::Horizontal;
        let (band, value) = if horizontal { ("y", "x") } else { ("x", "y") };

        let band_scale = if horizontal {
            ScaleSpec::band(band, key.as_str(), RangeSpec::Height).with_reverse(true)
        } else {
            ScaleSpec::band(band, key.as_str(), RangeSpec::Width)
        };
        let value_range = if horizontal {
            RangeSpec::Width
        } else {
            RangeSpec::Height
        };
        root.add_scale(band_scale.with_padding(self.band_padding))?
            .add_scale(
                ScaleSpec::linear(value, stacked_totals, value_range).with_nice(self.tick_count),
            )?
            .add_scale(self.color_scale())?;
        if horizontal {
            root.add_axis(AxisSpec::new("y", AxisOrient::Left))?
                .add_axis(AxisSpec::new("x", AxisOrient::Bottom).with_tick_count(self.tick_count))?;
        } else {
            root.add_axis(AxisSpec::new("x", AxisOrient::Bottom))?
                .add_axis(AxisSpec::new("y", AxisOrient::Left).with_tick_count(self.tick_count))?;
        }

        let fill_series = series.clone();
        let bar = MarkSpec::new(MarkType::Rect)
            .with_name("bar")
            .with_try_compute(Channel::Fill, move |ctx| ctx.color("color", &fill_series));
        let bar = if horizontal {
            bar.with_try_compute(Channel::Y, |ctx| ctx.band("y", field::KEY))
                .with_try_compute(Channel::Height, |ctx| ctx.bandwidth("y"))
                .with_try_compute(Channel::X, |ctx| ctx.linear("x", ctx.num(field::Y0)?))
                .with_try_compute(Channel::Width, |ctx| span(ctx, "x"))
        } else {
            bar.with_try_compute(Channel::X, |ctx| ctx.band("x", field::KEY))
                .with_try_compute(Channel::Width, |ctx| ctx.bandwidth("x"))
                .with_try_compute(Channel::Y, |ctx| ctx.linear("y", ctx.num(field::Y1)?))
                .with_try_compute(Channel::Height, |ctx| span(ctx, "y").map(|h| -h))
        };
        let mut layer = SceneNode::new("layer");
        layer.add_mark(bar)?;
        let stack = Transform::stack(key.as_str())
            .with_series(series.as_str())
            .with_order(self.stack_order.clone());
        root.add_child(
            Facet::new("layers")
                .with_transform(move |t| stack.apply(t))
                .with_group_by(series.as_str()),
            layer,
        )?;

        if self.labels {
            let label = MarkSpec::new(MarkType::Text)
                .with_name("total")
                .with_const(Channel::Fill, css::GRAY)
                .with_compute(Channel::Text, |ctx| {
                    format_tick(ctx.datum.f64(field::TOTAL).unwrap_or(0.0), 1.0)
                })
                .with_try_compute(Channel::FontSize, move |ctx| {
                    Ok::<_, String>(ctx.bandwidth(band)? / 4.0)
                });
            let label = if horizontal {
                label
                    .with_const(Channel::Align, "left")
                    .with_const(Channel::Baseline, "middle")
                    .with_try_compute(Channel::X, |ctx| {
                        Ok::<_, String>(ctx.linear("x", ctx.num(field::TOTAL)?)? + LABEL_OFFSET)
                    })
                    .with_try_compute(Channel::Y, |ctx| band_center(ctx, "y"))
            } else {
                label
                    .with_const(Channel::Align, "center")
                    .with_try_compute(Channel::X, |ctx| band_center(ctx, "x"))
                    .with_try_compute(Channel::Y, |ctx| {
                        Ok::<_, String>(ctx.linear("y", ctx.num(field::TOTAL)?)? - LABEL_OFFSET)
                    })
            };
            let mut totals_node = SceneNode::new("totals");
            totals_node.add_mark(label)?;
            root.add_child(
                Facet::new("totals").with_transform(move |t| totals.apply(t)),
                totals_node,
            )?;
        }
        Ok(())
    }

    fn build_group(&self, root: &mut SceneNode) -> Result<(), FrozenNodeError> {
        let key = self.group_by.clone();
        root.add_scale(
            ScaleSpec::band("x", key.as_str(), RangeSpec::Width).with_padding(self.band_padding),
        )?
        .add_scale(
            ScaleSpec::band(
                "x2",
                KeySource::Field(self.series_field.clone()),
                RangeSpec::Bandwidth("x".into()),
            )
            .with_padding(self.band_padding),
        )?
        .add_scale(
            ScaleSpec::linear("y", field::AMOUNT, RangeSpec::Height).with_nice(self.tick_count),
        )?
        .add_scale(self.color_scale())?
        .add_axis(AxisSpec::new("x", AxisOrient::Bottom))?
        .add_axis(AxisSpec::new("y", AxisOrient::Left).with_tick_count(self.tick_count))?;

        let series = self.series_field.clone();
        let fill_series = series.clone();
        let bar = MarkSpec::new(MarkType::Rect)
            .with_name("bar")
            .with_try_compute(Channel::X, move |ctx| {
                Ok::<_, String>(ctx.band("x", field::KEY)? + ctx.band("x2", &series)?)
            })
            .with_try_compute(Channel::Width, |ctx| ctx.bandwidth("x2"))
            .with_try_compute(Channel::Y, |ctx| ctx.linear("y", ctx.num(field::AMOUNT)?))
            .with_try_compute(Channel::Height, |ctx| {
                Ok::<_, String>(ctx.linear("y", 0.0)? - ctx.linear("y", ctx.num(field::AMOUNT)?)?)
            })
            .with_try_compute(Channel::Fill, move |ctx| ctx.color("color", &fill_series));

        let mut group = SceneNode::new("group");
        group.add_mark(bar)?;
        if self.labels {
            let series = self.series_field.clone();
            group.add_mark(
                MarkSpec::new(MarkType::Text)
                    .with_name("amount")
                    .with_const(Channel::Fill, css::GRAY)
                    .with_const(Channel::Align, "center")
                    .with_const(Channel::FontWeight, "bold")
                    .with_compute(Channel::Text, |ctx| {
                        let amount = ctx.datum.f64(field::AMOUNT).unwrap_or(0.0);
                        if amount > 0.0 {
                            format_tick(amount, 1.0)
                        } else {
                            String::new()
                        }
                    })
                    .with_try_compute(Channel::X, move |ctx| {
                        let inner = ctx.band("x2", &series)? + ctx.bandwidth("x2")? * 0.5;
                        Ok::<_, String>(ctx.band("x", field::KEY)? + inner)
                    })
                    .with_try_compute(Channel::Y, |ctx| {
                        Ok::<_, String>(ctx.linear("y", ctx.num(field::AMOUNT)?)? - LABEL_OFFSET)
                    })
                    .with_try_compute(Channel::FontSize, |ctx| {
                        Ok::<_, String>(ctx.bandwidth("x2")? * 0.5)
                    }),
            )?;
        }
        let members = Transform::group(key.as_str()).with_series(self.series_field.as_str());
        root.add_child(
            Facet::new("groups")
                .with_transform(move |t| members.apply(t))
                .with_group_by(field::KEY),
            group,
        )?;
        Ok(())
    }

    fn build_pie(&self, root: &mut SceneNode) -> Result<(), FrozenNodeError> {
        let key = self.series_field.clone();
        let offset = self.radius_offset;
        let outer = move |ctx: &EncodeCtx<'_>| {
            (ctx.view.width.min(ctx.view.height) * 0.5 - offset).max(0.0)
        };
        root.add_scale(self.color_scale())?;

        let mut arcs = SceneNode::new("arcs");
        arcs.add_mark(
            MarkSpec::new(MarkType::Arc)
                .with_name("arc")
                .with_compute(Channel::X, |ctx| ctx.view.width * 0.5)
                .with_compute(Channel::Y, |ctx| ctx.view.height * 0.5)
                .with_try_compute(Channel::StartAngle, |ctx| ctx.num(field::START_ANGLE))
                .with_try_compute(Channel::EndAngle, |ctx| ctx.num(field::END_ANGLE))
                .with_const(Channel::InnerRadius, 0.0)
                .with_compute(Channel::OuterRadius, outer)
                .with_const(Channel::Stroke, css::WHITE)
                .with_try_compute(Channel::Fill, |ctx| ctx.color("color", field::KEY)),
        )?;
        if self.labels {
            // Centroid of a full-radius arc: halfway out along the mid angle.
            let centroid = move |ctx: &EncodeCtx<'_>| -> Result<(f64, f64), String> {
                let mid = (ctx.num(field::START_ANGLE)? + ctx.num(field::END_ANGLE)?) * 0.5;
                let r = outer(ctx) * 0.5;
                Ok((
                    ctx.view.width * 0.5 + r * mid.sin(),
                    ctx.view.height * 0.5 - r * mid.cos(),
                ))
            };
            arcs.add_mark(
                MarkSpec::new(MarkType::Text)
                    .with_name("label")
                    .with_const(Channel::Align, "center")
                    .with_const(Channel::Baseline, "middle")
                    .with_const(Channel::Fill, css::WHITE)
                    .with_try_compute(Channel::Text, |ctx| {
                        let value = ctx.num(field::VALUE)?;
                        let total = ctx.num(field::TOTAL)?;
                        let percent = if total > 0.0 {
                            (value / total * 100.0).round()
                        } else {
                            0.0
                        };
                        Ok::<_, String>(if percent > MIN_LABEL_PERCENT {
                            format_percent(value, total)
                        } else {
                            String::new()
                        })
                    })
                    .with_try_compute(Channel::X, move |ctx| centroid(ctx).map(|p| p.0))
                    .with_try_compute(Channel::Y, move |ctx| centroid(ctx).map(|p| p.1)),
            )?;
        }
        let pie = Transform::pie(key.as_str());
        let overview_pie = pie.clone();
        root.add_child(
            Facet::new("arcs").with_transform(move |t| pie.apply(t)),
            arcs,
        )?;

        // Every arc row carries the grand total; the first one is enough.
        let mut overview = SceneNode::new("overview");
        overview.add_mark(
            MarkSpec::new(MarkType::Text)
                .with_name("total")
                .with_const(Channel::Align, "center")
                .with_const(Channel::Baseline, "hanging")
                .with_const(Channel::FontSize, OVERVIEW_SIZE)
                .with_try_compute(Channel::Text, |ctx| {
                    Ok::<_, String>(format!("Total: {}", ctx.num(field::TOTAL)?))
                })
                .with_compute(Channel::X, |ctx| ctx.view.width * 0.5)
                .with_compute(Channel::Y, |ctx| ctx.view.height + OVERVIEW_SIZE),
        )?;
        root.add_child(
            Facet::new("overview").with_transform(move |t| {
                overview_pie.apply(t).into_rows().into_iter().take(1).collect()
            }),
            overview,
        )?;
        Ok(())
    }
}

/// Length of `[y0, y1]` in range space for the linear scale `scale`.
fn span(ctx: &EncodeCtx<'_>, scale: &str) -> Result<f64, String> {
    Ok(ctx.linear(scale, ctx.num(field::Y1)?)? - ctx.linear(scale, ctx.num(field::Y0)?)?)
}

fn band_center(ctx: &EncodeCtx<'_>, scale: &str) -> Result<f64, String> {
    Ok(ctx.band(scale, field::KEY)? + ctx.bandwidth(scale)? * 0.5)
}
