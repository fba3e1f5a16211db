// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Categorical palettes.

extern crate alloc;

use alloc::vec::Vec;

use hashbrown::HashSet;
use peniko::Color;
use peniko::color::palette::css;
use vizgraph_core::{Table, parse_css_color};

/// The fallback categorical palette, taken from named CSS colors.
pub const PALETTE: [Color; 8] = [
    css::CORNFLOWER_BLUE,
    css::ORANGE,
    css::MEDIUM_SEA_GREEN,
    css::CRIMSON,
    css::GOLDENROD,
    css::SLATE_BLUE,
    css::DARK_CYAN,
    css::HOT_PINK,
];

/// Returns `count` colors from [`PALETTE`], repeating it as needed.
pub fn default_palette(count: usize) -> Vec<Color> {
    (0..count).map(|i| PALETTE[i % PALETTE.len()]).collect()
}

/// Returns the distinct CSS colors of `field`, in first-seen order.
///
/// Values that do not parse as colors are skipped. An empty result means the table carries
/// no usable colors.
pub fn palette_from_table(table: &Table, field: &str) -> Vec<Color> {
    let mut seen = HashSet::new();
    table
        .iter()
        .filter_map(|row| row.str(field))
        .filter(|s| seen.insert(*s))
        .filter_map(|s| {
            let color = parse_css_color(s);
            if color.is_none() {
                log::warn!("ignoring unparseable color `{s}` in `{field}`");
            }
            color
        })
        .collect()
}

#[cfg(test)]
mod tests {
    extern crate std;

    use vizgraph_core::Row;

    use super::*;

    #[test]
    fn default_palette_repeats() {
        let colors = default_palette(10);
        assert_eq!(colors.len(), 10);
        assert_eq!(colors[8], PALETTE[0]);
    }

    #[test]
    fn table_colors_are_distinct_and_parsed() {
        let table: Table = ["#ff0000", "nonsense", "#ff0000", "blue"]
            .into_iter()
            .map(|c| Row::new().with("color", c))
            .collect();
        let colors = palette_from_table(&table, "color");
        assert_eq!(colors.len(), 2);
        assert_eq!(colors[1].to_rgba8().b, 255);
    }
}
