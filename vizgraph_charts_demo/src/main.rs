// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chart demos for `vizgraph_charts`: stacked, grouped and pie charts written as SVG files.

mod svg;

use std::cell::Cell;
use std::error::Error;
use std::rc::Rc;

use vizgraph_charts::{
    ChartOptions, ChartSpec, Channels, Orchestrator, Orientation, palette_from_table,
};
use vizgraph_core::{Row, Table, Tables};
use vizgraph_transforms::{FieldMap, reduce_data, series_keys};

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 400.0;

/// Monthly units sold per product, as a spreadsheet export would carry them.
fn sales_records() -> Vec<Row> {
    let products = [
        ("Widgets", "#4e79a7"),
        ("Gadgets", "#f28e2b"),
        ("Gizmos", "#59a14f"),
    ];
    let months = ["Jan", "Feb", "Mar", "Apr", "May", "Jun"];
    let sold = [
        [12.0, 7.0, 3.0],
        [15.0, 9.0, 0.0],
        [9.0, 11.0, 4.0],
        [18.0, 6.0, 8.0],
        [21.0, 10.0, 5.0],
        [17.0, 13.0, 9.0],
    ];
    months
        .iter()
        .zip(sold)
        .flat_map(|(month, row)| {
            products
                .iter()
                .zip(row)
                .map(move |((product, color), units)| {
                    Row::new()
                        .with("month", *month)
                        .with("product", *product)
                        // Amounts arrive as text and are coerced on import.
                        .with("units", units.to_string())
                        .with("hex", *color)
                })
        })
        .collect()
}

fn render(
    name: &str,
    spec: &ChartSpec,
    tables: &Tables,
    channels: &Channels,
) -> Result<(), Box<dyn Error>> {
    let root = spec.build()?;
    let options = ChartOptions::new(WIDTH, HEIGHT).with_padding(40.0);
    let mut orchestrator = Orchestrator::new(svg::SvgRenderer::new(WIDTH, HEIGHT));
    let svg = orchestrator.render(&root, &options, tables, channels)?;
    let file = format!("vizgraph_{name}.svg");
    std::fs::write(&file, svg)?;
    println!("wrote {file}");
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let map = FieldMap::default()
        .with_period("month")
        .with_series("product")
        .with_amount("units")
        .with_color("hex");
    let sales: Table = reduce_data(&sales_records(), &map)?;
    log::info!(
        "{} rows over series {:?}",
        sales.len(),
        series_keys(&sales)
    );
    let palette = palette_from_table(&sales, "color");

    let mut tables = Tables::new();
    tables.insert("sales".into(), sales);

    let drawn = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&drawn);
    let channels = Channels::new().on("draw", move |_| counter.set(counter.get() + 1));

    let charts = [
        ("stack", ChartSpec::stack("sales").with_palette(palette.clone())),
        (
            "stack_horizontal",
            ChartSpec::stack("sales")
                .with_orientation(Orientation::Horizontal)
                .with_palette(palette.clone()),
        ),
        ("group", ChartSpec::group("sales").with_palette(palette.clone())),
        ("pie", ChartSpec::pie("sales").with_palette(palette)),
    ];
    for (name, spec) in &charts {
        render(name, spec, &tables, &channels)?;
    }
    log::info!("drew {} elements", drawn.get());
    Ok(())
}
