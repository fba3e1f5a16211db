// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scale declarations and their resolution against bound data.
//!
//! A [`ScaleSpec`] names a domain source and a range; [`ScaleSpec::resolve`] reads the
//! node's bound [`Table`] and view size and produces a concrete [`Scale`]. Resolution is a
//! pure function of its inputs: there is no shared palette and no cache.

extern crate alloc;

use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use hashbrown::HashMap;
use kurbo::Size;
use peniko::Color;

#[cfg(not(feature = "std"))]
use crate::float::FloatExt;

use crate::table::Table;

/// Errors returned by [`ScaleSpec::resolve`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScaleError {
    /// A range refers to a scale that has not been resolved (yet).
    UnknownScale {
        /// The scale being resolved.
        scale: String,
        /// The missing scale it refers to.
        reference: String,
    },
    /// A `Bandwidth` range refers to a scale that is not a band scale.
    NotBandScale {
        /// The scale being resolved.
        scale: String,
        /// The non-band scale it refers to.
        reference: String,
    },
}

impl fmt::Display for ScaleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownScale { scale, reference } => {
                write!(f, "scale `{scale}` refers to unknown scale `{reference}`")
            }
            Self::NotBandScale { scale, reference } => {
                write!(f, "scale `{scale}` needs `{reference}` to be a band scale")
            }
        }
    }
}

impl core::error::Error for ScaleError {}

/// A linear mapping from a continuous domain to a continuous range.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScaleLinear {
    domain: (f64, f64),
    range: (f64, f64),
    round: bool,
}

impl ScaleLinear {
    /// Creates a new scale mapping `domain` values to `range` values.
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self {
            domain,
            range,
            round: false,
        }
    }

    /// Rounds mapped outputs to whole units (d3's `rangeRound`).
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    /// Extends the domain to the enclosing "nice" tick values for `count` ticks.
    pub fn nice(mut self, count: usize) -> Self {
        let ticks = nice_ticks(self.domain.0, self.domain.1, count);
        if let (Some(&first), Some(&last)) = (ticks.first(), ticks.last())
            && ticks.len() >= 2
        {
            self.domain = if self.domain.0 <= self.domain.1 {
                (first, last)
            } else {
                (last, first)
            };
        }
        self
    }

    /// Maps a value from domain space into range space.
    pub fn map(&self, x: f64) -> f64 {
        let (d0, d1) = self.domain;
        let (r0, r1) = self.range;
        let denom = d1 - d0;
        if denom == 0.0 {
            return r0;
        }
        let t = (x - d0) / denom;
        let v = r0 + t * (r1 - r0);
        if self.round { v.round() } else { v }
    }

    /// Returns the domain.
    pub fn domain(&self) -> (f64, f64) {
        self.domain
    }

    /// Returns the range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns "nice" tick values that fall inside the domain.
    pub fn ticks(&self, count: usize) -> Vec<f64> {
        let (lo, hi) = if self.domain.0 <= self.domain.1 {
            self.domain
        } else {
            (self.domain.1, self.domain.0)
        };
        let eps = 1e-9 * (hi - lo).abs().max(1.0);
        nice_ticks(lo, hi, count)
            .into_iter()
            .filter(|v| *v >= lo - eps && *v <= hi + eps)
            .collect()
    }
}

fn nice_ticks(mut min: f64, mut max: f64, count: usize) -> Vec<f64> {
    if count == 0 {
        return Vec::new();
    }
    if min == max {
        return alloc::vec![min];
    }
    if min > max {
        core::mem::swap(&mut min, &mut max);
    }
    let span = max - min;
    let step0 = span / count.max(1) as f64;
    let step = nice_step(step0);
    if step == 0.0 {
        return alloc::vec![min, max];
    }

    let start = (min / step).floor() * step;
    let stop = (max / step).ceil() * step;

    let n_f = ((stop - start) / step).round();
    let n = if n_f.is_finite() && n_f >= 0.0 {
        let n_f = n_f.min(10_000.0);
        #[allow(
            clippy::cast_possible_truncation,
            reason = "guarded by finite/non-negative checks and capped at 10k"
        )]
        {
            n_f as u64
        }
    } else {
        0
    };
    (0..=n).map(|i| start + step * i as f64).collect()
}

fn nice_step(step: f64) -> f64 {
    if !step.is_finite() || step <= 0.0 {
        return 0.0;
    }
    let power = step.log10().floor();
    let base = 10_f64.powf(power);
    let error = step / base;
    let nice = if error >= 7.5 {
        10.0
    } else if error >= 3.5 {
        5.0
    } else if error >= 1.5 {
        2.0
    } else {
        1.0
    };
    nice * base
}

/// A discrete band scale: ordered keys mapped to equal-width bands.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleBand {
    keys: Vec<String>,
    range: (f64, f64),
    padding_inner: f64,
    padding_outer: f64,
    round: bool,
}

impl ScaleBand {
    /// Creates a band scale with no padding.
    pub fn new(keys: Vec<String>, range: (f64, f64)) -> Self {
        Self {
            keys,
            range,
            padding_inner: 0.0,
            padding_outer: 0.0,
            round: false,
        }
    }

    /// Sets inner and outer padding as fractions of the step, clamped to `[0, 1]`.
    pub fn with_padding(mut self, inner: f64, outer: f64) -> Self {
        self.padding_inner = clamp_unit(inner);
        self.padding_outer = clamp_unit(outer);
        self
    }

    /// Rounds the step and band start to whole units.
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    /// Returns the keys, in band order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the configured range.
    pub fn range(&self) -> (f64, f64) {
        self.range
    }

    /// Returns the band index of a key.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }

    fn layout(&self) -> (f64, f64, f64) {
        let (r0, r1) = self.range;
        let (lo, hi) = if r1 < r0 { (r1, r0) } else { (r0, r1) };
        let n = self.keys.len() as f64;
        let mut step = (hi - lo) / (n - self.padding_inner + 2.0 * self.padding_outer).max(1.0);
        if self.round {
            step = step.floor();
        }
        let mut start = lo + (hi - lo - step * (n - self.padding_inner)) * 0.5;
        let mut bandwidth = step * (1.0 - self.padding_inner);
        if self.round {
            start = start.round();
            bandwidth = bandwidth.round();
        }
        (start, step, bandwidth)
    }

    /// Returns the distance between the starts of adjacent bands.
    pub fn step(&self) -> f64 {
        self.layout().1
    }

    /// Returns the width of each band.
    pub fn bandwidth(&self) -> f64 {
        self.layout().2
    }

    /// Returns the start position of the band at `index`.
    pub fn position(&self, index: usize) -> Option<f64> {
        let n = self.keys.len();
        if index >= n {
            return None;
        }
        let (start, step, _) = self.layout();
        let slot = if self.range.1 < self.range.0 {
            n - 1 - index
        } else {
            index
        };
        Some(start + step * slot as f64)
    }

    /// Returns the start position of the band for `key`.
    pub fn map(&self, key: &str) -> Option<f64> {
        self.position(self.index_of(key)?)
    }
}

fn clamp_unit(v: f64) -> f64 {
    if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }
}

/// An ordinal color scale: keys mapped onto a (cycled) palette.
#[derive(Clone, Debug, PartialEq)]
pub struct ScaleOrdinal {
    keys: Vec<String>,
    palette: Vec<Color>,
}

impl ScaleOrdinal {
    /// Creates an ordinal scale.
    pub fn new(keys: Vec<String>, palette: Vec<Color>) -> Self {
        Self { keys, palette }
    }

    /// Returns the keys in domain order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the palette.
    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// Returns the color for the key at `index`, cycling the palette.
    pub fn color_at(&self, index: usize) -> Option<Color> {
        if self.palette.is_empty() {
            return None;
        }
        Some(self.palette[index % self.palette.len()])
    }

    /// Returns the color for `key`, or `None` if the key is not in the domain.
    pub fn map(&self, key: &str) -> Option<Color> {
        let index = self.keys.iter().position(|k| k == key)?;
        self.color_at(index)
    }
}

/// A resolved scale.
#[derive(Clone, Debug, PartialEq)]
pub enum Scale {
    /// Continuous linear scale.
    Linear(ScaleLinear),
    /// Positional band scale.
    Band(ScaleBand),
    /// Ordinal color scale.
    Ordinal(ScaleOrdinal),
}

impl Scale {
    /// Returns the linear scale, if this is one.
    pub fn as_linear(&self) -> Option<&ScaleLinear> {
        match self {
            Self::Linear(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the band scale, if this is one.
    pub fn as_band(&self) -> Option<&ScaleBand> {
        match self {
            Self::Band(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the ordinal scale, if this is one.
    pub fn as_ordinal(&self) -> Option<&ScaleOrdinal> {
        match self {
            Self::Ordinal(s) => Some(s),
            _ => None,
        }
    }
}

/// The resolved scales visible to one scene node during a render pass.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scales {
    scales: HashMap<String, Scale>,
}

impl Scales {
    /// Creates an empty scale map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a scale, returning the one it shadows.
    pub fn insert(&mut self, name: impl Into<String>, scale: Scale) -> Option<Scale> {
        self.scales.insert(name.into(), scale)
    }

    /// Returns a scale by name.
    pub fn get(&self, name: &str) -> Option<&Scale> {
        self.scales.get(name)
    }

    /// Returns a linear scale by name.
    pub fn linear(&self, name: &str) -> Option<&ScaleLinear> {
        self.get(name).and_then(Scale::as_linear)
    }

    /// Returns a band scale by name.
    pub fn band(&self, name: &str) -> Option<&ScaleBand> {
        self.get(name).and_then(Scale::as_band)
    }

    /// Returns an ordinal color scale by name.
    pub fn ordinal(&self, name: &str) -> Option<&ScaleOrdinal> {
        self.get(name).and_then(Scale::as_ordinal)
    }

    /// Returns the number of scales.
    pub fn len(&self) -> usize {
        self.scales.len()
    }

    /// Returns `true` if there are no scales.
    pub fn is_empty(&self) -> bool {
        self.scales.is_empty()
    }
}

/// Resolves a continuous `(min, max)` domain from observed values.
///
/// Non-finite values are ignored. When no finite value remains, or when every value is
/// zero, the domain is `(0, 1)` so that the scale never collapses to a single point.
pub fn resolve_domain(values: impl IntoIterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if !v.is_finite() {
            continue;
        }
        min = min.min(v);
        max = max.max(v);
    }
    if !min.is_finite() || (min == 0.0 && max == 0.0) {
        return (0.0, 1.0);
    }
    (min, max)
}

/// Resolves a band scale over ordered distinct `keys`.
///
/// `padding` is used for both the inner and outer padding.
pub fn resolve_band(keys: Vec<String>, range: (f64, f64), padding: f64) -> ScaleBand {
    ScaleBand::new(keys, range).with_padding(padding, padding)
}

/// Resolves an ordinal color scale; the palette wraps around when it is shorter than `keys`.
pub fn resolve_color(keys: Vec<String>, palette: Vec<Color>) -> ScaleOrdinal {
    ScaleOrdinal::new(keys, palette)
}

type DomainFn = dyn Fn(&Table) -> Vec<f64>;

/// Where a continuous scale reads its domain values from.
#[derive(Clone)]
pub enum DomainSource {
    /// Numeric values of a field in the bound table.
    Field(String),
    /// Fixed values (the domain is their extent).
    Values(Vec<f64>),
    /// Values computed from the bound table (for example stacked totals).
    Compute(Arc<DomainFn>),
}

impl DomainSource {
    /// Creates a computed domain source.
    pub fn compute(f: impl Fn(&Table) -> Vec<f64> + 'static) -> Self {
        Self::Compute(Arc::new(f))
    }

    /// Returns the domain values for a table.
    pub fn values(&self, table: &Table) -> Vec<f64> {
        match self {
            Self::Field(field) => table.column_f64(field),
            Self::Values(values) => values.clone(),
            Self::Compute(f) => f(table),
        }
    }
}

impl fmt::Debug for DomainSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(field) => f.debug_tuple("Field").field(field).finish(),
            Self::Values(values) => f.debug_tuple("Values").field(values).finish(),
            Self::Compute(_) => f.debug_tuple("Compute").field(&"<fn>").finish(),
        }
    }
}

impl From<&str> for DomainSource {
    fn from(value: &str) -> Self {
        Self::Field(value.into())
    }
}

/// Where a discrete scale reads its keys from.
#[derive(Clone, Debug, PartialEq)]
pub enum KeySource {
    /// Distinct keys of a field in the bound table, in first-seen order.
    Field(String),
    /// Fixed keys.
    Keys(Vec<String>),
}

impl KeySource {
    /// Returns the keys for a table.
    pub fn keys(&self, table: &Table) -> Vec<String> {
        match self {
            Self::Field(field) => table.distinct_keys(field),
            Self::Keys(keys) => keys.clone(),
        }
    }
}

impl From<&str> for KeySource {
    fn from(value: &str) -> Self {
        Self::Field(value.into())
    }
}

/// The output range of a positional scale.
#[derive(Clone, Debug, PartialEq)]
pub enum RangeSpec {
    /// `(0, width)` of the node's view.
    Width,
    /// `(height, 0)` of the node's view, so larger values sit higher.
    Height,
    /// A fixed range.
    Explicit(f64, f64),
    /// `(0, bandwidth)` of a previously resolved band scale.
    Bandwidth(String),
}

/// The kind-specific part of a [`ScaleSpec`].
#[derive(Clone, Debug)]
pub enum ScaleKind {
    /// Continuous linear scale.
    Linear {
        /// Domain values.
        domain: DomainSource,
        /// Whether the domain is extended to include zero.
        zero: bool,
        /// Extend the domain to nice values for this tick count.
        nice: Option<usize>,
    },
    /// Positional band scale.
    Band {
        /// Band keys.
        domain: KeySource,
        /// Inner and outer padding, as a fraction of the step.
        padding: f64,
    },
    /// Ordinal color scale.
    Ordinal {
        /// Color keys.
        domain: KeySource,
        /// Palette, cycled when shorter than the domain.
        palette: Vec<Color>,
    },
}

/// A named scale declaration owned by a scene node.
#[derive(Clone, Debug)]
pub struct ScaleSpec {
    /// Scale name, referenced by encodings and axes.
    pub name: String,
    /// Kind and domain.
    pub kind: ScaleKind,
    /// Output range (ignored by ordinal scales).
    pub range: RangeSpec,
    /// Whether the resolved range is flipped.
    pub reverse: bool,
    /// Whether outputs are rounded to whole units.
    pub round: bool,
}

impl ScaleSpec {
    fn with_kind(name: impl Into<String>, kind: ScaleKind, range: RangeSpec) -> Self {
        Self {
            name: name.into(),
            kind,
            range,
            reverse: false,
            round: false,
        }
    }

    /// Declares a linear scale. Zero is included in the domain by default.
    pub fn linear(
        name: impl Into<String>,
        domain: impl Into<DomainSource>,
        range: RangeSpec,
    ) -> Self {
        Self::with_kind(
            name,
            ScaleKind::Linear {
                domain: domain.into(),
                zero: true,
                nice: None,
            },
            range,
        )
    }

    /// Declares a band scale with `0.1` padding.
    pub fn band(name: impl Into<String>, domain: impl Into<KeySource>, range: RangeSpec) -> Self {
        Self::with_kind(
            name,
            ScaleKind::Band {
                domain: domain.into(),
                padding: 0.1,
            },
            range,
        )
    }

    /// Declares an ordinal color scale.
    pub fn ordinal(
        name: impl Into<String>,
        domain: impl Into<KeySource>,
        palette: Vec<Color>,
    ) -> Self {
        Self::with_kind(
            name,
            ScaleKind::Ordinal {
                domain: domain.into(),
                palette,
            },
            RangeSpec::Explicit(0.0, 0.0),
        )
    }

    /// Sets whether a linear domain includes zero. No effect on other kinds.
    pub fn with_zero(mut self, include_zero: bool) -> Self {
        if let ScaleKind::Linear { zero, .. } = &mut self.kind {
            *zero = include_zero;
        }
        self
    }

    /// Extends a linear domain to nice values for `tick_count` ticks.
    pub fn with_nice(mut self, tick_count: usize) -> Self {
        if let ScaleKind::Linear { nice, .. } = &mut self.kind {
            *nice = Some(tick_count);
        }
        self
    }

    /// Sets band padding. No effect on other kinds.
    pub fn with_padding(mut self, value: f64) -> Self {
        if let ScaleKind::Band { padding, .. } = &mut self.kind {
            *padding = value;
        }
        self
    }

    /// Flips the resolved range.
    pub fn with_reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Rounds outputs to whole units.
    pub fn with_round(mut self, round: bool) -> Self {
        self.round = round;
        self
    }

    fn resolve_range(&self, view: Size, resolved: &Scales) -> Result<(f64, f64), ScaleError> {
        let (r0, r1) = match &self.range {
            RangeSpec::Width => (0.0, view.width),
            RangeSpec::Height => (view.height, 0.0),
            RangeSpec::Explicit(r0, r1) => (*r0, *r1),
            RangeSpec::Bandwidth(reference) => match resolved.get(reference) {
                Some(Scale::Band(band)) => (0.0, band.bandwidth()),
                Some(_) => {
                    return Err(ScaleError::NotBandScale {
                        scale: self.name.clone(),
                        reference: reference.clone(),
                    });
                }
                None => {
                    return Err(ScaleError::UnknownScale {
                        scale: self.name.clone(),
                        reference: reference.clone(),
                    });
                }
            },
        };
        Ok(if self.reverse { (r1, r0) } else { (r0, r1) })
    }

    /// Resolves this declaration against a bound table and view.
    ///
    /// `resolved` holds the scales already resolved for the node (and inherited from its
    /// ancestors); it is only read for [`RangeSpec::Bandwidth`].
    pub fn resolve(
        &self,
        table: &Table,
        view: Size,
        resolved: &Scales,
    ) -> Result<Scale, ScaleError> {
        match &self.kind {
            ScaleKind::Linear { domain, zero, nice } => {
                let (mut d0, mut d1) = resolve_domain(domain.values(table));
                if *zero {
                    d0 = d0.min(0.0);
                    d1 = d1.max(0.0);
                }
                let range = self.resolve_range(view, resolved)?;
                let mut scale = ScaleLinear::new((d0, d1), range).with_round(self.round);
                if let Some(count) = nice {
                    scale = scale.nice(*count);
                }
                Ok(Scale::Linear(scale))
            }
            ScaleKind::Band { domain, padding } => {
                let range = self.resolve_range(view, resolved)?;
                Ok(Scale::Band(
                    resolve_band(domain.keys(table), range, *padding).with_round(self.round),
                ))
            }
            ScaleKind::Ordinal { domain, palette } => Ok(Scale::Ordinal(resolve_color(
                domain.keys(table),
                palette.clone(),
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use alloc::string::ToString;
    use alloc::vec;

    use peniko::color::palette::css;

    use super::*;
    use crate::table::Row;

    fn keys(ks: &[&str]) -> Vec<String> {
        ks.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn all_zero_domain_falls_back_to_unit() {
        assert_eq!(resolve_domain([0.0, 0.0, 0.0]), (0.0, 1.0));
        assert_eq!(resolve_domain([0.0, f64::NAN]), (0.0, 1.0));
        assert_eq!(resolve_domain(Vec::new()), (0.0, 1.0));
        assert_eq!(resolve_domain([0.0, 4.0, 2.0]), (0.0, 4.0));
    }

    #[test]
    fn linear_maps_endpoints_and_rounds() {
        let s = ScaleLinear::new((0.0, 10.0), (100.0, 0.0));
        assert_eq!(s.map(0.0), 100.0);
        assert_eq!(s.map(10.0), 0.0);
        assert_eq!(s.map(5.0), 50.0);
        let r = ScaleLinear::new((0.0, 3.0), (0.0, 10.0)).with_round(true);
        assert_eq!(r.map(1.0), 3.0);
    }

    #[test]
    fn nice_extends_domain_to_tick_bounds() {
        let s = ScaleLinear::new((0.0, 97.0), (0.0, 1.0)).nice(10);
        assert_eq!(s.domain(), (0.0, 100.0));
        let ticks = s.ticks(5);
        assert_eq!(ticks, [0.0, 20.0, 40.0, 60.0, 80.0, 100.0]);
    }

    #[test]
    fn band_layout_matches_padding_rules() {
        let band = resolve_band(keys(&["a", "b"]), (0.0, 100.0), 0.0);
        assert_eq!(band.bandwidth(), 50.0);
        assert_eq!(band.map("a"), Some(0.0));
        assert_eq!(band.map("b"), Some(50.0));
        assert_eq!(band.map("z"), None);

        // step = 100 / (2 - 0.2 + 0.4) = 45.45..; bands are centered in the range.
        let padded = resolve_band(keys(&["a", "b"]), (0.0, 100.0), 0.2);
        let step = 100.0 / 2.2;
        assert!((padded.step() - step).abs() < 1e-9, "step {}", padded.step());
        assert!((padded.bandwidth() - step * 0.8).abs() < 1e-9);
        let a = padded.map("a").unwrap();
        let b = padded.map("b").unwrap();
        assert!((a - step * 0.2).abs() < 1e-9, "a {a}");
        assert!((b - a - step).abs() < 1e-9);
        assert!((100.0 - (b + padded.bandwidth()) - a).abs() < 1e-9, "symmetric");
    }

    #[test]
    fn reversed_band_range_puts_first_key_last() {
        let band = resolve_band(keys(&["a", "b"]), (100.0, 0.0), 0.0);
        assert_eq!(band.map("a"), Some(50.0));
        assert_eq!(band.map("b"), Some(0.0));
    }

    #[test]
    fn color_palette_wraps_around() {
        let scale = resolve_color(keys(&["a", "b", "c"]), vec![css::RED, css::BLUE]);
        assert_eq!(scale.map("a"), Some(css::RED));
        assert_eq!(scale.map("b"), Some(css::BLUE));
        assert_eq!(scale.map("c"), Some(css::RED));
        assert_eq!(scale.map("d"), None);
    }

    #[test]
    fn spec_resolution_is_repeatable() {
        let table = Table::from_rows(vec![
            Row::new().with("k", "x").with("v", 3.0),
            Row::new().with("k", "y").with("v", 7.0),
        ]);
        let view = Size::new(200.0, 100.0);
        let spec = ScaleSpec::linear("y", "v", RangeSpec::Height);
        let a = spec.resolve(&table, view, &Scales::new()).unwrap();
        let b = spec.resolve(&table, view, &Scales::new()).unwrap();
        assert_eq!(a, b);
        let y = a.as_linear().unwrap();
        assert_eq!(y.domain(), (0.0, 7.0));
        assert_eq!(y.range(), (100.0, 0.0));
    }

    #[test]
    fn bandwidth_range_reads_an_earlier_band() {
        let table = Table::from_rows(vec![
            Row::new().with("p", "jan").with("t", "a"),
            Row::new().with("p", "feb").with("t", "b"),
        ]);
        let view = Size::new(200.0, 100.0);
        let mut scales = Scales::new();
        let x = ScaleSpec::band("x", "p", RangeSpec::Width).with_padding(0.0);
        scales.insert("x", x.resolve(&table, view, &scales).unwrap());

        let x2 = ScaleSpec::band("x2", "t", RangeSpec::Bandwidth("x".into())).with_padding(0.0);
        let inner = x2.resolve(&table, view, &scales).unwrap();
        assert_eq!(inner.as_band().unwrap().range(), (0.0, 100.0));

        let missing = ScaleSpec::band("x3", "t", RangeSpec::Bandwidth("nope".into()));
        assert_eq!(
            missing.resolve(&table, view, &scales),
            Err(ScaleError::UnknownScale {
                scale: "x3".into(),
                reference: "nope".into()
            })
        );
    }
}
