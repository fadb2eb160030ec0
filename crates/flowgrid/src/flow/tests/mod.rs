mod compiler;

use super::compile::NodeSpec;
use super::layout;
use super::types::{
    ConnectorGeometry, FlowLayout, GridCell, LayoutOptions, NodeKind, Segment, ShapeSize,
};

/// Shape size used throughout: 120x60 with 20px padding gives 140x80 cells.
const SHAPE: ShapeSize = ShapeSize {
    width: 120.0,
    height: 60.0,
};

/// Helper to create a NodeSpec of the default shape size.
fn spec(kind: NodeKind, order: &str) -> NodeSpec {
    NodeSpec {
        kind,
        size: SHAPE,
        order: order.to_string(),
    }
}

fn process(order: &str) -> NodeSpec {
    spec(NodeKind::Process, order)
}

fn decision(order: &str) -> NodeSpec {
    spec(NodeKind::Decision, order)
}

/// Layout options starting at `G6` with the given row gap.
fn options(gap: u32) -> LayoutOptions {
    LayoutOptions {
        start: GridCell::new(6, 6),
        vertical_gap: gap,
        cell_padding: 20.0,
        ..LayoutOptions::default()
    }
}

/// Run the full pipeline, panicking with the error on failure.
fn run(specs: &[NodeSpec], options: &LayoutOptions) -> FlowLayout {
    match layout(specs, options) {
        Ok(layout) => layout,
        Err(e) => panic!("layout failed: {e}"),
    }
}

/// Cells in node order.
fn cells(layout: &FlowLayout) -> Vec<GridCell> {
    layout.placements.iter().map(|p| p.cell).collect()
}

/// The connector for a specific edge.
fn connector(layout: &FlowLayout, origin: usize, target: usize) -> &ConnectorGeometry {
    layout
        .connectors
        .iter()
        .find(|c| c.edge.origin == origin && c.edge.target == target)
        .unwrap_or_else(|| panic!("no connector {origin} -> {target}"))
}

/// Segments as (axis letter, x, y, length) tuples for compact assertions.
fn segs(connector: &ConnectorGeometry) -> Vec<(char, f64, f64, f64)> {
    connector
        .segments
        .iter()
        .map(|s: &Segment| {
            let axis = match s.axis {
                super::types::Axis::Horizontal => 'H',
                super::types::Axis::Vertical => 'V',
            };
            (axis, s.offset_x, s.offset_y, s.length)
        })
        .collect()
}

/// Assert no two nodes share a cell.
fn assert_unique_cells(layout: &FlowLayout) {
    let mut seen = std::collections::HashSet::new();
    for placement in &layout.placements {
        assert!(
            seen.insert(placement.cell),
            "node {} shares {} with an earlier node",
            placement.node,
            placement.cell
        );
    }
}
