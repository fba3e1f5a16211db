// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis guide resolution.
//!
//! An [`AxisSpec`] names a scale and a side; resolving it against the node's scales yields an
//! [`AxisGuide`]: tick positions in view coordinates, their labels, and where the axis sits.

extern crate alloc;

use alloc::string::String;
use alloc::vec::Vec;
use core::fmt;

use kurbo::{Size, Vec2};
use vizgraph_core::{AxisOrient, AxisSpec, Scale, Scales};

use crate::format::format_tick;

/// Errors returned by [`resolve_axis`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AxisError {
    /// The axis names a scale that is not resolved for this node.
    UnknownScale(String),
    /// The axis names a color scale, which has no positions.
    NotPositional(String),
}

impl fmt::Display for AxisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScale(name) => write!(f, "axis scale `{name}` is not defined"),
            Self::NotPositional(name) => {
                write!(f, "axis scale `{name}` is a color scale and cannot be drawn")
            }
        }
    }
}

impl core::error::Error for AxisError {}

/// One tick of an axis.
#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    /// Offset along the axis, in view coordinates.
    pub position: f64,
    /// Label text.
    pub label: String,
}

/// A resolved axis.
#[derive(Clone, Debug, PartialEq)]
pub struct AxisGuide {
    /// Name of the scale the axis renders.
    pub scale: String,
    /// Axis side.
    pub orient: AxisOrient,
    /// Offset of the axis line from the view origin.
    pub translate: Vec2,
    /// Extent of the axis line along the axis.
    pub range: (f64, f64),
    /// Ticks, in scale order.
    pub ticks: Vec<Tick>,
    /// Tick line length.
    pub tick_size: f64,
    /// Gap between tick line and label.
    pub tick_padding: f64,
    /// Optional title.
    pub title: Option<String>,
    /// Grid line length across the view, when grid lines are enabled.
    pub grid_length: Option<f64>,
}

fn tick_step(ticks: &[f64]) -> f64 {
    let step = ticks
        .windows(2)
        .map(|w| (w[1] - w[0]).abs())
        .fold(f64::INFINITY, f64::min);
    if step.is_finite() { step } else { 0.0 }
}

/// Resolves an axis against the scales visible to a node with view size `view`.
///
/// Linear scales get "nice" ticks inside their domain, labelled with step-aware decimals
/// unless the axis has a formatter. Band scales get one tick per key at the band center.
pub fn resolve_axis(spec: &AxisSpec, scales: &Scales, view: Size) -> Result<AxisGuide, AxisError> {
    let scale = scales
        .get(&spec.scale)
        .ok_or_else(|| AxisError::UnknownScale(spec.scale.clone()))?;

    let (range, ticks) = match scale {
        Scale::Linear(linear) => {
            let values = linear.ticks(spec.tick_count);
            let step = tick_step(&values);
            let ticks = values
                .into_iter()
                .map(|v| Tick {
                    position: linear.map(v),
                    label: match &spec.formatter {
                        Some(f) => f(v, step),
                        None => format_tick(v, step),
                    },
                })
                .collect();
            (linear.range(), ticks)
        }
        Scale::Band(band) => {
            let half = band.bandwidth() * 0.5;
            let ticks = band
                .keys()
                .iter()
                .enumerate()
                .filter_map(|(i, key)| {
                    Some(Tick {
                        position: band.position(i)? + half,
                        label: key.clone(),
                    })
                })
                .collect();
            (band.range(), ticks)
        }
        Scale::Ordinal(_) => return Err(AxisError::NotPositional(spec.scale.clone())),
    };

    let translate = match spec.orient {
        AxisOrient::Bottom => Vec2::new(0.0, view.height),
        AxisOrient::Right => Vec2::new(view.width, 0.0),
        AxisOrient::Top | AxisOrient::Left => Vec2::ZERO,
    };
    let grid_length = spec.grid.then(|| {
        if spec.orient.is_horizontal() {
            view.height
        } else {
            view.width
        }
    });

    Ok(AxisGuide {
        scale: spec.scale.clone(),
        orient: spec.orient,
        translate,
        range,
        ticks,
        tick_size: spec.tick_size,
        tick_padding: spec.tick_padding,
        title: spec.title.clone(),
        grid_length,
    })
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::format;
    use alloc::string::ToString;
    use alloc::vec;

    use peniko::color::palette::css;
    use vizgraph_core::{ScaleBand, ScaleLinear, ScaleOrdinal};

    use super::*;

    fn scales() -> Scales {
        let mut scales = Scales::new();
        scales.insert(
            "y",
            Scale::Linear(ScaleLinear::new((0.0, 20.0), (100.0, 0.0))),
        );
        scales.insert(
            "x",
            Scale::Band(ScaleBand::new(
                vec!["Jan".to_string(), "Feb".to_string()],
                (0.0, 200.0),
            )),
        );
        scales.insert(
            "c",
            Scale::Ordinal(ScaleOrdinal::new(vec!["A".into()], vec![css::RED])),
        );
        scales
    }

    #[test]
    fn linear_axis_uses_nice_ticks() {
        let spec = AxisSpec::new("y", AxisOrient::Left).with_tick_count(4);
        let guide = resolve_axis(&spec, &scales(), Size::new(200.0, 100.0)).unwrap();
        let labels: Vec<_> = guide.ticks.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, ["0", "5", "10", "15", "20"]);
        assert_eq!(guide.ticks[0].position, 100.0);
        assert_eq!(guide.translate, Vec2::ZERO);
    }

    #[test]
    fn band_axis_ticks_sit_at_band_centers() {
        let spec = AxisSpec::new("x", AxisOrient::Bottom).with_grid(true);
        let guide = resolve_axis(&spec, &scales(), Size::new(200.0, 100.0)).unwrap();
        let ticks: Vec<_> = guide
            .ticks
            .iter()
            .map(|t| (t.position, t.label.as_str()))
            .collect();
        assert_eq!(ticks, [(50.0, "Jan"), (150.0, "Feb")]);
        assert_eq!(guide.translate, Vec2::new(0.0, 100.0));
        assert_eq!(guide.grid_length, Some(100.0));
    }

    #[test]
    fn custom_formatter_is_used_for_linear_ticks() {
        let spec = AxisSpec::new("y", AxisOrient::Right)
            .with_tick_count(2)
            .with_formatter(|v, _| format!("${v}"));
        let guide = resolve_axis(&spec, &scales(), Size::new(200.0, 100.0)).unwrap();
        assert_eq!(guide.ticks[1].label, "$10");
        assert_eq!(guide.translate, Vec2::new(200.0, 0.0));
    }

    #[test]
    fn color_and_unknown_scales_are_errors() {
        let view = Size::new(1.0, 1.0);
        assert_eq!(
            resolve_axis(&AxisSpec::new("c", AxisOrient::Left), &scales(), view),
            Err(AxisError::NotPositional("c".into()))
        );
        assert_eq!(
            resolve_axis(&AxisSpec::new("nope", AxisOrient::Left), &scales(), view),
            Err(AxisError::UnknownScale("nope".into()))
        );
    }
}
