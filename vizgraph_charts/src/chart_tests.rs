// Copyright 2025 the Vizgraph Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end tests: presets through the orchestrator into a test renderer.

extern crate std;

use alloc::string::{String, ToString};
use alloc::vec;
use alloc::vec::Vec;
use core::f64::consts::TAU;

use vizgraph_core::{Channel, FrozenNodeError, MarkSpec, MarkType, Row, Table, Tables};
use vizgraph_transforms::{FieldMap, StackOrder, build_stack, group_by, reduce_data};

use crate::{
    ChartOptions, ChartSpec, Channels, IntermediateNode, NodePath, Orchestrator, Orientation,
    PALETTE, RenderError, RenderFailure, Renderer, SkipReason,
};

fn sales() -> Table {
    let records = [
        ("Jan", "A", 10.0),
        ("Jan", "B", 5.0),
        ("Feb", "A", 3.0),
    ]
    .into_iter()
    .map(|(month, product, sold)| {
        Row::new()
            .with("month", month)
            .with("product", product)
            .with("sold", sold)
            .with("color", "#336699")
    })
    .collect::<Vec<_>>();
    let map = FieldMap::default()
        .with_period("month")
        .with_series("product")
        .with_amount("sold");
    reduce_data(&records, &map).unwrap()
}

fn canonical(period: &str, series: &str, amount: f64) -> Row {
    Row::new()
        .with("period", period)
        .with("type", series)
        .with("amount", amount)
}

fn tables(table: Table) -> Tables {
    let mut tables = Tables::new();
    tables.insert("sales".to_string(), table);
    tables
}

/// Lists every node path with its element count.
#[derive(Debug, Default)]
struct Outline;

impl Renderer for Outline {
    type Output = Vec<(String, usize)>;
    type Error = &'static str;

    fn render(
        &mut self,
        tree: &IntermediateNode,
        _channels: &Channels,
    ) -> Result<Self::Output, RenderFailure<Self::Error>> {
        let mut out = Vec::new();
        tree.walk(&mut |node| {
            let elements: usize = node.marks.iter().map(|m| m.elements.len()).sum();
            out.push((node.path.to_string(), elements));
        });
        Ok(out)
    }
}

/// Fails on the first node that draws text.
#[derive(Debug)]
struct NoFonts;

impl Renderer for NoFonts {
    type Output = ();
    type Error = &'static str;

    fn render(
        &mut self,
        tree: &IntermediateNode,
        _channels: &Channels,
    ) -> Result<(), RenderFailure<Self::Error>> {
        let mut failed = None;
        tree.walk(&mut |node| {
            if failed.is_none() && node.marks.iter().any(|m| m.kind == MarkType::Text) {
                failed = Some(node.path.clone());
            }
        });
        match failed {
            Some(path) => Err(RenderFailure {
                path,
                error: "no fonts available",
            }),
            None => Ok(()),
        }
    }
}

fn rect(tree: &IntermediateNode, path: &NodePath, index: usize) -> (f64, f64, f64, f64) {
    let node = tree.find(path).unwrap();
    let el = &node.marks[0].elements[index];
    (
        el.f64(Channel::X).unwrap(),
        el.f64(Channel::Y).unwrap(),
        el.f64(Channel::Width).unwrap(),
        el.f64(Channel::Height).unwrap(),
    )
}

#[test]
fn stacked_layers_fill_absent_series_with_zero() {
    let table = sales();
    let grouped = group_by(&table, "period");
    let series = build_stack(&table, &grouped, &StackOrder::Input);
    let spans: Vec<(&str, Vec<(f64, f64)>)> = series
        .iter()
        .map(|s| {
            (
                s.key.as_str(),
                s.points.iter().map(|p| (p.y0, p.y1)).collect(),
            )
        })
        .collect();
    assert_eq!(
        spans,
        [
            ("A", vec![(0.0, 10.0), (0.0, 3.0)]),
            ("B", vec![(10.0, 15.0), (0.0, 0.0)]),
        ]
    );
}

#[test]
fn string_amounts_and_mapped_colors_stack() {
    let records = [
        ("Jan", "A", "10", "#ff0000"),
        ("Jan", "B", "5", "#00ff00"),
        ("Feb", "A", "3", "#ff0000"),
    ]
    .into_iter()
    .map(|(period, series, amount, bgcolor)| {
        Row::new()
            .with("period", period)
            .with("type", series)
            .with("amount", amount)
            .with("bgcolor", bgcolor)
    })
    .collect::<Vec<_>>();
    let table = reduce_data(&records, &FieldMap::default().with_color("bgcolor")).unwrap();
    assert_eq!(table.column_f64("amount"), [10.0, 5.0, 3.0]);
    assert_eq!(table.rows()[1].str("color"), Some("#00ff00"));

    let grouped = group_by(&table, "period");
    let series = build_stack(&table, &grouped, &StackOrder::Input);
    let spans: Vec<(&str, Vec<[f64; 2]>)> = series
        .iter()
        .map(|s| (s.key.as_str(), s.points.iter().map(|p| [p.y0, p.y1]).collect()))
        .collect();
    assert_eq!(
        spans,
        [
            ("A", vec![[0.0, 10.0], [0.0, 3.0]]),
            ("B", vec![[10.0, 15.0], [0.0, 0.0]]),
        ]
    );
}

#[test]
fn stacked_preset_draws_stacked_rects() {
    let root = ChartSpec::stack("sales").build().unwrap();
    let options = ChartOptions::new(200.0, 160.0).with_padding(0.0);
    let tree = crate::resolve(&root, &options, &tables(sales())).unwrap();

    // Totals are 15 and 3; ten nice ticks extend the domain to 16, so one unit is 10px.
    assert_eq!(tree.scales.linear("y").unwrap().domain(), (0.0, 16.0));

    let stack = NodePath::root("stack");
    let a = stack.child("layers[A]");
    let b = stack.child("layers[B]");
    let (ax, ay, aw, ah) = rect(&tree, &a, 0);
    assert_eq!((ay, ah), (60.0, 100.0));
    let (bx, by, bw, bh) = rect(&tree, &b, 0);
    assert_eq!((by, bh), (10.0, 50.0));
    assert_eq!((ax, aw), (bx, bw));
    assert_eq!(rect(&tree, &a, 1).3, 30.0);
    assert_eq!(rect(&tree, &b, 1).3, 0.0);

    let fill = |path: &NodePath| {
        tree.find(path).unwrap().marks[0].elements[0]
            .color(Channel::Fill)
            .unwrap()
    };
    assert_eq!(fill(&a), PALETTE[0]);
    assert_eq!(fill(&b), PALETTE[1]);

    let totals = tree.find(&stack.child("totals")).unwrap();
    let labels: Vec<_> = totals.marks[0]
        .elements
        .iter()
        .map(|e| e.text(Channel::Text).unwrap())
        .collect();
    assert_eq!(labels, ["15", "3"]);

    let axes: Vec<_> = tree.axes.iter().map(|a| a.scale.as_str()).collect();
    assert_eq!(axes, ["x", "y"]);
}

#[test]
fn stacks_follow_a_custom_series_field() {
    // Both January rows share a `type`; only `region` tells them apart.
    let table = Table::from_rows(vec![
        canonical("Jan", "A", 4.0).with("region", "north"),
        canonical("Jan", "A", 6.0).with("region", "south"),
        canonical("Feb", "B", 1.0).with("region", "north"),
    ]);
    let root = ChartSpec::stack("sales")
        .with_series_field("region")
        .build()
        .unwrap();
    let options = ChartOptions::new(200.0, 100.0).with_padding(0.0);
    let tree = crate::resolve(&root, &options, &tables(table)).unwrap();
    assert_eq!(tree.scales.linear("y").unwrap().domain(), (0.0, 10.0));

    let stack = NodePath::root("stack");
    let north = stack.child("layers[north]");
    let south = stack.child("layers[south]");
    assert_eq!(rect(&tree, &north, 0).1, 60.0);
    assert_eq!(rect(&tree, &north, 0).3, 40.0);
    assert_eq!(rect(&tree, &south, 0).1, 0.0);
    assert_eq!(rect(&tree, &south, 0).3, 60.0);
    assert_eq!(rect(&tree, &south, 1).3, 0.0);

    let fill = tree.find(&south).unwrap().marks[0].elements[0].color(Channel::Fill);
    assert_eq!(fill, Some(PALETTE[1]));

    let totals = tree.find(&stack.child("totals")).unwrap();
    let labels: Vec<_> = totals.marks[0]
        .elements
        .iter()
        .map(|e| e.text(Channel::Text).unwrap())
        .collect();
    assert_eq!(labels, ["10", "1"]);
}

#[test]
fn horizontal_stacks_grow_rightwards() {
    let root = ChartSpec::stack("sales")
        .with_orientation(Orientation::Horizontal)
        .with_labels(false)
        .build()
        .unwrap();
    let options = ChartOptions::new(160.0, 200.0).with_padding(0.0);
    let tree = crate::resolve(&root, &options, &tables(sales())).unwrap();
    let b = NodePath::root("stack").child("layers[B]");
    let (x, y, w, h) = rect(&tree, &b, 0);
    assert_eq!((x, w), (100.0, 50.0));
    let (_, feb_y, _, _) = rect(&tree, &b, 1);
    assert!(y < feb_y, "first period sits at the top");
    assert!(h > 0.0);
}

#[test]
fn grouped_bars_sit_side_by_side() {
    let root = ChartSpec::group("sales").build().unwrap();
    let options = ChartOptions::new(200.0, 100.0).with_padding(0.0);
    let tree = crate::resolve(&root, &options, &tables(sales())).unwrap();

    let jan = tree
        .find(&NodePath::root("group").child("groups[Jan]"))
        .unwrap();
    let bars = &jan.marks[0].elements;
    assert_eq!(bars.len(), 2);
    let x0 = bars[0].f64(Channel::X).unwrap();
    let x1 = bars[1].f64(Channel::X).unwrap();
    let w = bars[0].f64(Channel::Width).unwrap();
    assert!(x1 >= x0 + w, "bars overlap: {x0} {x1} {w}");
    assert_eq!(
        bars[0].f64(Channel::Y).unwrap() + bars[0].f64(Channel::Height).unwrap(),
        100.0
    );

    let labels: Vec<_> = jan.marks[1]
        .elements
        .iter()
        .map(|e| e.text(Channel::Text).unwrap())
        .collect();
    assert_eq!(labels, ["10", "5"]);
}

#[test]
fn pie_arcs_cover_the_circle() {
    let mut table = sales();
    table.push(
        Row::new()
            .with("period", "Feb")
            .with("type", "C")
            .with("amount", 0.2),
    );
    let root = ChartSpec::pie("sales").build().unwrap();
    let options = ChartOptions::new(100.0, 80.0).with_padding(0.0);
    let tree = crate::resolve(&root, &options, &tables(table)).unwrap();

    let arcs = tree.find(&NodePath::root("pie").child("arcs")).unwrap();
    let slices = &arcs.marks[0].elements;
    assert_eq!(slices.len(), 3);
    let sweep: f64 = slices
        .iter()
        .map(|e| e.f64(Channel::EndAngle).unwrap() - e.f64(Channel::StartAngle).unwrap())
        .sum();
    assert!((sweep - TAU).abs() < 1e-9);
    assert_eq!(slices[0].f64(Channel::OuterRadius), Some(25.0));

    let labels: Vec<_> = arcs.marks[1]
        .elements
        .iter()
        .map(|e| e.text(Channel::Text).unwrap())
        .collect();
    assert_eq!(labels, ["71%", "27%", ""]);
}

#[test]
fn pie_shows_the_grand_total() {
    let root = ChartSpec::pie("sales").build().unwrap();
    let tree = crate::resolve(&root, &ChartOptions::new(100.0, 80.0), &tables(sales())).unwrap();
    let overview = tree.find(&NodePath::root("pie").child("overview")).unwrap();
    let texts: Vec<_> = overview.marks[0]
        .elements
        .iter()
        .map(|e| e.text(Channel::Text).unwrap())
        .collect();
    assert_eq!(texts, ["Total: 18"]);
}

#[test]
fn pie_labels_hide_slices_that_round_to_five_percent() {
    let table = Table::from_rows(vec![
        canonical("Jan", "A", 89.0),
        canonical("Jan", "B", 5.4),
        canonical("Jan", "C", 5.6),
    ]);
    let root = ChartSpec::pie("sales").build().unwrap();
    let tree = crate::resolve(&root, &ChartOptions::new(100.0, 100.0), &tables(table)).unwrap();
    let arcs = tree.find(&NodePath::root("pie").child("arcs")).unwrap();
    let labels: Vec<_> = arcs.marks[1]
        .elements
        .iter()
        .map(|e| e.text(Channel::Text).unwrap())
        .collect();
    assert_eq!(labels, ["89%", "", "6%"]);
}

#[test]
fn resolving_twice_gives_the_same_tree() {
    let options = ChartOptions::new(240.0, 160.0);
    let tables = tables(sales());
    for spec in [
        ChartSpec::stack("sales"),
        ChartSpec::group("sales"),
        ChartSpec::pie("sales"),
    ] {
        let root = spec.build().unwrap();
        let first = crate::resolve(&root, &options, &tables).unwrap();
        let second = crate::resolve(&root, &options, &tables).unwrap();
        assert_eq!(first, second, "{:?} chart", spec.shape);
    }
}

#[test]
fn rendering_is_repeatable() {
    let root = ChartSpec::stack("sales").build().unwrap();
    let options = ChartOptions::new(300.0, 200.0);
    let tables = tables(sales());
    let mut orchestrator = Orchestrator::new(Outline);
    let first = orchestrator
        .render(&root, &options, &tables, &Channels::new())
        .unwrap();
    let second = orchestrator
        .render(&root, &options, &tables, &Channels::new())
        .unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first,
        [
            ("stack".to_string(), 0),
            ("stack/layers[A]".to_string(), 2),
            ("stack/layers[B]".to_string(), 2),
            ("stack/totals".to_string(), 2),
        ]
    );
}

#[test]
fn rendered_scenes_are_frozen() {
    let mut root = ChartSpec::group("sales").build().unwrap();
    let mut orchestrator = Orchestrator::new(Outline);
    orchestrator
        .render(
            &root,
            &ChartOptions::new(100.0, 100.0),
            &tables(sales()),
            &Channels::new(),
        )
        .unwrap();
    let err = root.add_mark(MarkSpec::new(MarkType::Rule)).unwrap_err();
    assert_eq!(
        err,
        FrozenNodeError {
            node: "group".into()
        }
    );
}

#[test]
fn unbound_tables_render_an_empty_chart() {
    let root = ChartSpec::pie("elsewhere").build().unwrap();
    let mut orchestrator = Orchestrator::new(Outline);
    let outline = orchestrator
        .render(
            &root,
            &ChartOptions::new(100.0, 100.0),
            &tables(sales()),
            &Channels::new(),
        )
        .unwrap();
    assert_eq!(outline, [("pie".to_string(), 0)]);

    let tree = crate::resolve(&root, &ChartOptions::new(100.0, 100.0), &Tables::new()).unwrap();
    assert_eq!(
        tree.skipped,
        Some(SkipReason::MissingTable {
            table: "elsewhere".into()
        })
    );
}

#[test]
fn renderer_errors_name_the_failing_node() {
    let root = ChartSpec::stack("sales").build().unwrap();
    let mut orchestrator = Orchestrator::new(NoFonts);
    let err = orchestrator
        .render(
            &root,
            &ChartOptions::new(100.0, 100.0),
            &tables(sales()),
            &Channels::new(),
        )
        .unwrap_err();
    match err {
        RenderError::Renderer { path, error } => {
            assert_eq!(path.to_string(), "stack/totals");
            assert_eq!(error, "no fonts available");
        }
        RenderError::Resolve(e) => panic!("unexpected resolve failure: {e}"),
    }
}
