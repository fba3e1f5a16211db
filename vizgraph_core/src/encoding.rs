// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mark specifications and per-element encoding resolution.
//!
//! Every visual channel of a [`MarkSpec`] is an [`Encoding`]: either a constant, or a
//! function evaluated once per datum with an [`EncodeCtx`]. Resolving a mark against a
//! table yields one [`ElementAttributes`] per row, in row order.

extern crate alloc;

use alloc::format;
use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use kurbo::Size;
use peniko::Color;
use smallvec::SmallVec;

use crate::scale::Scales;
use crate::table::{Row, Table};

/// A visual channel of a mark.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[allow(missing_docs, reason = "channel names are self-describing")]
pub enum Channel {
    X,
    X2,
    Y,
    Y2,
    Width,
    Height,
    Opacity,
    Fill,
    FillOpacity,
    Stroke,
    StrokeWidth,
    StartAngle,
    EndAngle,
    PadAngle,
    InnerRadius,
    OuterRadius,
    CornerRadius,
    Text,
    FontSize,
    FontWeight,
    Angle,
    Dx,
    Dy,
    Align,
    Baseline,
    Tooltip,
    ZIndex,
    Cursor,
}

impl Channel {
    /// Returns the channel's attribute name (`"fillOpacity"`, `"startAngle"`, …).
    pub fn name(self) -> &'static str {
        match self {
            Self::X => "x",
            Self::X2 => "x2",
            Self::Y => "y",
            Self::Y2 => "y2",
            Self::Width => "width",
            Self::Height => "height",
            Self::Opacity => "opacity",
            Self::Fill => "fill",
            Self::FillOpacity => "fillOpacity",
            Self::Stroke => "stroke",
            Self::StrokeWidth => "strokeWidth",
            Self::StartAngle => "startAngle",
            Self::EndAngle => "endAngle",
            Self::PadAngle => "padAngle",
            Self::InnerRadius => "innerRadius",
            Self::OuterRadius => "outerRadius",
            Self::CornerRadius => "cornerRadius",
            Self::Text => "text",
            Self::FontSize => "fontSize",
            Self::FontWeight => "fontWeight",
            Self::Angle => "angle",
            Self::Dx => "dx",
            Self::Dy => "dy",
            Self::Align => "align",
            Self::Baseline => "baseline",
            Self::Tooltip => "tooltip",
            Self::ZIndex => "zIndex",
            Self::Cursor => "cursor",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The visual primitive a mark draws.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs, reason = "mark type names are self-describing")]
pub enum MarkType {
    Arc,
    Area,
    Group,
    Image,
    Line,
    Path,
    Rect,
    Rule,
    Symbol,
    Text,
    Trail,
    Shape,
}

impl MarkType {
    /// Returns the lowercase mark type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Arc => "arc",
            Self::Area => "area",
            Self::Group => "group",
            Self::Image => "image",
            Self::Line => "line",
            Self::Path => "path",
            Self::Rect => "rect",
            Self::Rule => "rule",
            Self::Symbol => "symbol",
            Self::Text => "text",
            Self::Trail => "trail",
            Self::Shape => "shape",
        }
    }
}

/// A resolved attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttrValue {
    /// A number (positions, sizes, angles, opacities).
    Num(f64),
    /// Text content or a keyword (`"middle"`, `"pointer"`).
    Text(String),
    /// A color.
    Color(Color),
    /// A flag.
    Bool(bool),
}

impl AttrValue {
    /// Returns the number, if this is one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Num(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the text, if this is text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the color, if this is one.
    pub fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the flag, if this is one.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<f64> for AttrValue {
    fn from(value: f64) -> Self {
        Self::Num(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        Self::Text(value.into())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Color> for AttrValue {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Inputs visible to a computed encoding for one element.
#[derive(Clone, Copy, Debug)]
pub struct EncodeCtx<'a> {
    /// The datum this element is drawn for.
    pub datum: &'a Row,
    /// The datum's index in the mark's table.
    pub index: usize,
    /// The size of the node's view.
    pub view: Size,
    /// The scales resolved for the node.
    pub scales: &'a Scales,
}

impl EncodeCtx<'_> {
    /// Reads a numeric field of the datum.
    pub fn num(&self, field: &str) -> Result<f64, String> {
        self.datum
            .f64(field)
            .ok_or_else(|| format!("field `{field}` is missing or not a number"))
    }

    /// Reads a field of the datum as a key.
    pub fn key(&self, field: &str) -> Result<String, String> {
        self.datum
            .key(field)
            .ok_or_else(|| format!("field `{field}` is missing"))
    }

    /// Maps a value through a linear scale.
    pub fn linear(&self, scale: &str, value: f64) -> Result<f64, String> {
        self.scales
            .linear(scale)
            .map(|s| s.map(value))
            .ok_or_else(|| format!("no linear scale `{scale}`"))
    }

    /// Maps the datum's `field` through a band scale, returning the band start.
    pub fn band(&self, scale: &str, field: &str) -> Result<f64, String> {
        let key = self.key(field)?;
        let band = self
            .scales
            .band(scale)
            .ok_or_else(|| format!("no band scale `{scale}`"))?;
        band.map(&key)
            .ok_or_else(|| format!("key `{key}` is not in the domain of `{scale}`"))
    }

    /// Returns the bandwidth of a band scale.
    pub fn bandwidth(&self, scale: &str) -> Result<f64, String> {
        self.scales
            .band(scale)
            .map(|s| s.bandwidth())
            .ok_or_else(|| format!("no band scale `{scale}`"))
    }

    /// Maps the datum's `field` through an ordinal color scale.
    pub fn color(&self, scale: &str, field: &str) -> Result<Color, String> {
        let key = self.key(field)?;
        let ordinal = self
            .scales
            .ordinal(scale)
            .ok_or_else(|| format!("no color scale `{scale}`"))?;
        ordinal
            .map(&key)
            .ok_or_else(|| format!("key `{key}` is not in the domain of `{scale}`"))
    }
}

type ComputeFn<T> = dyn Fn(&EncodeCtx<'_>) -> Result<T, String>;

/// A channel value: constant, or computed per datum.
pub enum Encoding<T> {
    /// The same value for every element.
    Const(T),
    /// A function of the element's [`EncodeCtx`]. An `Err` aborts resolution.
    Compute(Arc<ComputeFn<T>>),
}

impl<T> Encoding<T> {
    /// Creates an infallible computed encoding.
    pub fn compute(f: impl Fn(&EncodeCtx<'_>) -> T + 'static) -> Self {
        Self::Compute(Arc::new(move |ctx| Ok(f(ctx))))
    }

    /// Creates a fallible computed encoding.
    pub fn try_compute(f: impl Fn(&EncodeCtx<'_>) -> Result<T, String> + 'static) -> Self {
        Self::Compute(Arc::new(f))
    }
}

impl<T: Clone> Clone for Encoding<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Const(v) => Self::Const(v.clone()),
            Self::Compute(f) => Self::Compute(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Encoding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(v) => f.debug_tuple("Const").field(v).finish(),
            Self::Compute(_) => f.debug_tuple("Compute").field(&"<fn>").finish(),
        }
    }
}

/// A user encoding function failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodingError {
    /// The channel being resolved.
    pub channel: Channel,
    /// The index of the element (row) being resolved.
    pub index: usize,
    /// The message returned by the encoding function.
    pub message: String,
}

impl fmt::Display for EncodingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "encoding `{}` failed for element {}: {}",
            self.channel, self.index, self.message
        )
    }
}

impl core::error::Error for EncodingError {}

/// A mark declaration: a type, an optional table binding, and channel encodings.
#[derive(Clone, Debug)]
pub struct MarkSpec {
    /// The primitive drawn for each element.
    pub kind: MarkType,
    /// Optional name, echoed on resolved marks.
    pub name: Option<String>,
    /// Table to draw from, looked up in the bound tables. Defaults to the node's table.
    pub table: Option<String>,
    encodings: Vec<(Channel, Encoding<AttrValue>)>,
}

impl MarkSpec {
    /// Creates a mark with no encodings.
    pub fn new(kind: MarkType) -> Self {
        Self {
            kind,
            name: None,
            table: None,
            encodings: Vec::new(),
        }
    }

    /// Sets the mark's name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Binds the mark to a named table.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    /// Sets a channel encoding, replacing any previous one for the channel.
    pub fn with(mut self, channel: Channel, encoding: Encoding<AttrValue>) -> Self {
        match self.encodings.iter_mut().find(|(c, _)| *c == channel) {
            Some(slot) => slot.1 = encoding,
            None => self.encodings.push((channel, encoding)),
        }
        self
    }

    /// Sets a constant channel value.
    pub fn with_const(self, channel: Channel, value: impl Into<AttrValue>) -> Self {
        self.with(channel, Encoding::Const(value.into()))
    }

    /// Sets an infallible computed channel.
    pub fn with_compute<V: Into<AttrValue>>(
        self,
        channel: Channel,
        f: impl Fn(&EncodeCtx<'_>) -> V + 'static,
    ) -> Self {
        self.with(channel, Encoding::compute(move |ctx| f(ctx).into()))
    }

    /// Sets a fallible computed channel.
    pub fn with_try_compute<V: Into<AttrValue>>(
        self,
        channel: Channel,
        f: impl Fn(&EncodeCtx<'_>) -> Result<V, String> + 'static,
    ) -> Self {
        self.with(channel, Encoding::try_compute(move |ctx| f(ctx).map(Into::into)))
    }

    /// Removes a channel encoding.
    pub fn without(mut self, channel: Channel) -> Self {
        self.encodings.retain(|(c, _)| *c != channel);
        self
    }

    /// Returns the encoding for a channel.
    pub fn encoding(&self, channel: Channel) -> Option<&Encoding<AttrValue>> {
        self.encodings
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, e)| e)
    }

    /// Iterates over declared channels in declaration order.
    pub fn encodings(&self) -> impl Iterator<Item = (Channel, &Encoding<AttrValue>)> {
        self.encodings.iter().map(|(c, e)| (*c, e))
    }
}

/// The resolved attributes of one mark element.
#[derive(Clone, Debug, PartialEq)]
pub struct ElementAttributes {
    /// Index of the datum in the mark's table.
    pub index: usize,
    /// Resolved channels, in declaration order. Undeclared channels are absent.
    pub attrs: SmallVec<[(Channel, AttrValue); 8]>,
}

impl ElementAttributes {
    /// Returns a channel value.
    pub fn get(&self, channel: Channel) -> Option<&AttrValue> {
        self.attrs
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, v)| v)
    }

    /// Returns a numeric channel value.
    pub fn f64(&self, channel: Channel) -> Option<f64> {
        self.get(channel).and_then(AttrValue::as_f64)
    }

    /// Returns a text channel value.
    pub fn text(&self, channel: Channel) -> Option<&str> {
        self.get(channel).and_then(AttrValue::as_text)
    }

    /// Returns a color channel value.
    pub fn color(&self, channel: Channel) -> Option<Color> {
        self.get(channel).and_then(AttrValue::as_color)
    }
}

/// Resolves one channel for one element.
pub fn resolve_channel<T: Clone>(
    channel: Channel,
    encoding: &Encoding<T>,
    ctx: &EncodeCtx<'_>,
) -> Result<T, EncodingError> {
    match encoding {
        Encoding::Const(v) => Ok(v.clone()),
        Encoding::Compute(f) => f(ctx).map_err(|message| EncodingError {
            channel,
            index: ctx.index,
            message,
        }),
    }
}

/// Resolves every declared channel of `mark` for every row of `table`.
///
/// The first failing encoding aborts resolution.
pub fn resolve_mark(
    mark: &MarkSpec,
    table: &Table,
    scales: &Scales,
    view: Size,
) -> Result<Vec<ElementAttributes>, EncodingError> {
    log::trace!(
        "resolving {} mark {:?} over {} rows",
        mark.kind.name(),
        mark.name,
        table.len()
    );
    table
        .iter()
        .enumerate()
        .map(|(index, datum)| {
            let ctx = EncodeCtx {
                datum,
                index,
                view,
                scales,
            };
            let attrs = mark
                .encodings()
                .map(|(channel, encoding)| {
                    resolve_channel(channel, encoding, &ctx).map(|v| (channel, v))
                })
                .collect::<Result<SmallVec<_>, _>>()?;
            Ok(ElementAttributes { index, attrs })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use peniko::color::palette::css;

    use super::*;
    use crate::scale::{Scale, ScaleLinear};

    fn table() -> Table {
        Table::from_rows(vec![
            Row::new().with("v", 1.0),
            Row::new().with("v", 2.0),
            Row::new().with("v", 3.0),
        ])
    }

    #[test]
    fn constants_repeat_and_undeclared_channels_are_absent() {
        let mark = MarkSpec::new(MarkType::Rect).with_const(Channel::Fill, css::RED);
        let out = resolve_mark(&mark, &table(), &Scales::new(), Size::new(10.0, 10.0)).unwrap();
        assert_eq!(out.len(), 3);
        for (i, el) in out.iter().enumerate() {
            assert_eq!(el.index, i);
            assert_eq!(el.color(Channel::Fill), Some(css::RED));
            assert!(el.get(Channel::X).is_none(), "x was never declared");
        }
    }

    #[test]
    fn computed_channels_see_scales_and_datum() {
        let mut scales = Scales::new();
        scales.insert(
            "y",
            Scale::Linear(ScaleLinear::new((0.0, 4.0), (100.0, 0.0))),
        );
        let mark = MarkSpec::new(MarkType::Rect)
            .with_try_compute(Channel::Y, |ctx| {
                let v = ctx.num("v")?;
                ctx.linear("y", v)
            })
            .with_compute(Channel::Text, |ctx| ctx.index.to_string());
        let out = resolve_mark(&mark, &table(), &scales, Size::new(10.0, 100.0)).unwrap();
        let ys: Vec<_> = out.iter().filter_map(|e| e.f64(Channel::Y)).collect();
        assert_eq!(ys, [75.0, 50.0, 25.0]);
        assert_eq!(out[2].text(Channel::Text), Some("2"));
    }

    #[test]
    fn encoding_errors_carry_channel_and_index() {
        let mark = MarkSpec::new(MarkType::Text).with_try_compute(Channel::Text, |ctx| {
            if ctx.index == 1 {
                Err("boom".to_string())
            } else {
                Ok("ok")
            }
        });
        let err = resolve_mark(&mark, &table(), &Scales::new(), Size::ZERO).unwrap_err();
        assert_eq!(
            err,
            EncodingError {
                channel: Channel::Text,
                index: 1,
                message: "boom".into()
            }
        );
    }

    #[test]
    fn with_replaces_and_without_removes() {
        let mark = MarkSpec::new(MarkType::Rect)
            .with_const(Channel::X, 1.0)
            .with_const(Channel::Y, 2.0)
            .with_const(Channel::X, 5.0)
            .without(Channel::Y);
        let channels: Vec<_> = mark.encodings().map(|(c, _)| c).collect();
        assert_eq!(channels, [Channel::X]);
        let out = resolve_mark(&mark, &table(), &Scales::new(), Size::ZERO).unwrap();
        assert_eq!(out[0].f64(Channel::X), Some(5.0));
    }

    #[test]
    fn resolution_is_deterministic() {
        let mark = MarkSpec::new(MarkType::Rect).with_try_compute(Channel::Height, |ctx| {
            Ok::<_, String>(ctx.num("v")? * 2.0)
        });
        let a = resolve_mark(&mark, &table(), &Scales::new(), Size::ZERO).unwrap();
        let b = resolve_mark(&mark, &table(), &Scales::new(), Size::ZERO).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn channel_names_are_camel_case() {
        assert_eq!(Channel::FillOpacity.name(), "fillOpacity");
        assert_eq!(Channel::ZIndex.to_string(), "zIndex");
    }
}
