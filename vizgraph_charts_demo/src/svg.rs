// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A small SVG [`Renderer`] for `vizgraph_charts_demo`.

use std::f64::consts::FRAC_PI_2;
use std::fmt::{self, Write as _};

use kurbo::{BezPath, Circle, Rect, Shape};
use peniko::Color;
use peniko::color::palette::css;
use vizgraph_charts::{
    AxisGuide, ChannelEvent, Channels, IntermediateNode, MarkNode, NodeMetadata, NodePath,
    RenderFailure, Renderer,
};
use vizgraph_core::{AxisOrient, Channel, ElementAttributes, MarkType};

/// Errors raised while writing SVG.
#[derive(Debug)]
pub(crate) enum SvgError {
    /// An element lacks a channel its mark type needs.
    MissingChannel {
        mark: MarkType,
        channel: Channel,
        element: usize,
    },
    /// A mark type this renderer does not draw.
    Unsupported(MarkType),
    Fmt(fmt::Error),
}

impl fmt::Display for SvgError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingChannel {
                mark,
                channel,
                element,
            } => write!(
                f,
                "{} element {element} has no `{channel}`",
                mark.name()
            ),
            Self::Unsupported(mark) => write!(f, "cannot draw `{}` marks", mark.name()),
            Self::Fmt(e) => write!(f, "formatting failed: {e}"),
        }
    }
}

impl std::error::Error for SvgError {}

impl From<fmt::Error> for SvgError {
    fn from(value: fmt::Error) -> Self {
        Self::Fmt(value)
    }
}

/// Writes one SVG document per render.
#[derive(Debug)]
pub(crate) struct SvgRenderer {
    width: f64,
    height: f64,
    tolerance: f64,
}

impl SvgRenderer {
    pub(crate) fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            tolerance: 0.1,
        }
    }

    fn node(
        &self,
        out: &mut String,
        node: &IntermediateNode,
        channels: &Channels,
    ) -> Result<(), RenderFailure<SvgError>> {
        self.draw(out, node, channels)
            .map_err(|e| failure(&node.path, e))?;
        for child in &node.children {
            self.node(out, child, channels)?;
        }
        out.push_str("</g>\n");
        Ok(())
    }

    /// Opens the node's group and draws its axes and marks.
    fn draw(
        &self,
        out: &mut String,
        node: &IntermediateNode,
        channels: &Channels,
    ) -> Result<(), SvgError> {
        writeln!(
            out,
            r#"<g class="{}" transform="translate({} {})">"#,
            escape_xml(&node.name),
            node.origin.x,
            node.origin.y
        )?;
        for axis in &node.axes {
            write_axis(out, axis)?;
        }
        for (index, mark) in node.marks.iter().enumerate() {
            self.mark(out, mark)?;
            if !channels.listens("draw") {
                continue;
            }
            for el in &mark.elements {
                let meta = NodeMetadata {
                    path: node.path.clone(),
                    mark: Some(index),
                    element: Some(el.index),
                };
                channels.emit(
                    "draw",
                    &ChannelEvent {
                        node: &meta,
                        event: &mark.kind,
                    },
                );
            }
        }
        Ok(())
    }

    fn mark(&self, out: &mut String, mark: &MarkNode) -> Result<(), SvgError> {
        for el in &mark.elements {
            match mark.kind {
                MarkType::Rect => {
                    let x = required(mark.kind, el, Channel::X)?;
                    let y = required(mark.kind, el, Channel::Y)?;
                    let w = required(mark.kind, el, Channel::Width)?;
                    let h = required(mark.kind, el, Channel::Height)?;
                    // Negative extents flip the rect around its anchor.
                    let r = Rect::new(x, y, x + w, y + h).abs();
                    write!(
                        out,
                        r#"<rect x="{}" y="{}" width="{}" height="{}""#,
                        r.x0,
                        r.y0,
                        r.width(),
                        r.height()
                    )?;
                    write_paint(out, el)?;
                    out.push_str("/>\n");
                }
                MarkType::Arc => {
                    let center = kurbo::Point::new(
                        required(mark.kind, el, Channel::X)?,
                        required(mark.kind, el, Channel::Y)?,
                    );
                    let start = required(mark.kind, el, Channel::StartAngle)?;
                    let end = required(mark.kind, el, Channel::EndAngle)?;
                    let outer = required(mark.kind, el, Channel::OuterRadius)?;
                    let inner = el.f64(Channel::InnerRadius).unwrap_or(0.0);
                    // Arc angles run clockwise from 12 o'clock; kurbo's start at 3 o'clock.
                    let path: BezPath = Circle::new(center, outer)
                        .segment(inner, start - FRAC_PI_2, end - start)
                        .path_elements(self.tolerance)
                        .collect();
                    write!(out, r#"<path d="{}""#, path.to_svg())?;
                    write_paint(out, el)?;
                    out.push_str("/>\n");
                }
                MarkType::Text => {
                    let text = el.text(Channel::Text).unwrap_or_default();
                    if text.is_empty() {
                        continue;
                    }
                    let anchor = match el.text(Channel::Align) {
                        Some("center") => "middle",
                        Some("right") => "end",
                        _ => "start",
                    };
                    write!(
                        out,
                        r#"<text x="{}" y="{}" font-size="{}" text-anchor="{anchor}""#,
                        required(mark.kind, el, Channel::X)?,
                        required(mark.kind, el, Channel::Y)?,
                        el.f64(Channel::FontSize).unwrap_or(10.0),
                    )?;
                    if let Some(baseline) = el.text(Channel::Baseline) {
                        write!(out, r#" dominant-baseline="{}""#, escape_xml(baseline))?;
                    }
                    if let Some(weight) = el.text(Channel::FontWeight) {
                        write!(out, r#" font-weight="{}""#, escape_xml(weight))?;
                    }
                    write_color(out, "fill", el.color(Channel::Fill).unwrap_or(css::BLACK))?;
                    writeln!(out, ">{}</text>", escape_xml(text))?;
                }
                other => return Err(SvgError::Unsupported(other)),
            }
        }
        Ok(())
    }
}

impl Renderer for SvgRenderer {
    type Output = String;
    type Error = SvgError;

    fn render(
        &mut self,
        tree: &IntermediateNode,
        channels: &Channels,
    ) -> Result<String, RenderFailure<SvgError>> {
        let mut out = String::new();
        writeln!(
            out,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" font-family="sans-serif">"#,
            w = self.width,
            h = self.height
        )
        .map_err(|e| failure(&tree.path, e.into()))?;
        self.node(&mut out, tree, channels)
            .inspect_err(|f| log::debug!("svg render failed at {}: {}", f.path, f.error))?;
        out.push_str("</svg>\n");
        Ok(out)
    }
}

fn failure(path: &NodePath, error: SvgError) -> RenderFailure<SvgError> {
    RenderFailure {
        path: path.clone(),
        error,
    }
}

fn required(mark: MarkType, el: &ElementAttributes, channel: Channel) -> Result<f64, SvgError> {
    el.f64(channel).ok_or(SvgError::MissingChannel {
        mark,
        channel,
        element: el.index,
    })
}

fn write_axis(out: &mut String, axis: &AxisGuide) -> fmt::Result {
    let horizontal = axis.orient.is_horizontal();
    // Ticks and labels grow away from the plot.
    let dir = match axis.orient {
        AxisOrient::Top | AxisOrient::Left => -1.0,
        AxisOrient::Bottom | AxisOrient::Right => 1.0,
    };
    writeln!(
        out,
        r#"<g class="axis" transform="translate({} {})" font-size="10" fill="{}">"#,
        axis.translate.x,
        axis.translate.y,
        hex(css::DIM_GRAY)
    )?;
    let (r0, r1) = axis.range;
    let (x1, y1, x2, y2) = if horizontal {
        (r0, 0.0, r1, 0.0)
    } else {
        (0.0, r0, 0.0, r1)
    };
    writeln!(
        out,
        r#"<line x1="{x1}" y1="{y1}" x2="{x2}" y2="{y2}" stroke="{}"/>"#,
        hex(css::DIM_GRAY)
    )?;
    let offset = dir * (axis.tick_size + axis.tick_padding);
    for tick in &axis.ticks {
        let p = tick.position;
        if horizontal {
            writeln!(
                out,
                r#"<line x1="{p}" x2="{p}" y2="{}" stroke="{}"/>"#,
                dir * axis.tick_size,
                hex(css::DIM_GRAY)
            )?;
            let baseline = if dir > 0.0 { "hanging" } else { "alphabetic" };
            writeln!(
                out,
                r#"<text x="{p}" y="{offset}" text-anchor="middle" dominant-baseline="{baseline}">{}</text>"#,
                escape_xml(&tick.label)
            )?;
        } else {
            writeln!(
                out,
                r#"<line y1="{p}" y2="{p}" x2="{}" stroke="{}"/>"#,
                dir * axis.tick_size,
                hex(css::DIM_GRAY)
            )?;
            let anchor = if dir > 0.0 { "start" } else { "end" };
            writeln!(
                out,
                r#"<text x="{offset}" y="{p}" text-anchor="{anchor}" dominant-baseline="middle">{}</text>"#,
                escape_xml(&tick.label)
            )?;
        }
        if let Some(length) = axis.grid_length {
            let (gx, gy) = if horizontal {
                (0.0, -dir * length)
            } else {
                (-dir * length, 0.0)
            };
            let (ax, ay) = if horizontal { (p, 0.0) } else { (0.0, p) };
            writeln!(
                out,
                r#"<line x1="{ax}" y1="{ay}" x2="{}" y2="{}" stroke="{}" stroke-opacity="0.3"/>"#,
                ax + gx,
                ay + gy,
                hex(css::LIGHT_GRAY)
            )?;
        }
    }
    if let Some(title) = &axis.title {
        writeln!(out, "<text>{}</text>", escape_xml(title))?;
    }
    out.push_str("</g>\n");
    Ok(())
}

fn write_paint(out: &mut String, el: &ElementAttributes) -> fmt::Result {
    write_color(out, "fill", el.color(Channel::Fill).unwrap_or(css::BLACK))?;
    if let Some(stroke) = el.color(Channel::Stroke) {
        write_color(out, "stroke", stroke)?;
        write!(
            out,
            r#" stroke-width="{}""#,
            el.f64(Channel::StrokeWidth).unwrap_or(1.0)
        )?;
    }
    if let Some(opacity) = el.f64(Channel::Opacity) {
        write!(out, r#" opacity="{opacity}""#)?;
    }
    Ok(())
}

fn hex(color: Color) -> String {
    let rgba = color.to_rgba8();
    format!("#{:02x}{:02x}{:02x}", rgba.r, rgba.g, rgba.b)
}

fn write_color(out: &mut String, name: &str, color: Color) -> fmt::Result {
    write!(out, r#" {name}="{}""#, hex(color))?;
    let alpha = color.to_rgba8().a;
    if alpha != 255 {
        write!(out, r#" {name}-opacity="{}""#, f64::from(alpha) / 255.0)?;
    }
    Ok(())
}

fn escape_xml(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
