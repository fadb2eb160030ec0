use std::collections::{BTreeSet, HashMap};
use std::fmt;

use rayon::prelude::*;

use super::types::{
    ArrowDirection, Arrowhead, Axis, Bend, CellSize, ConnectorGeometry, Edge, EdgeLabel, GridCell,
    Node, Orientation, Placement, RouteOptions, Segment, ShapeSize,
};

/// Lengths below this are treated as zero and their segments dropped.
const EPSILON: f64 = 1e-9;

/// Why an edge could not be anchored to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorFault {
    /// The node has no placement (or is not a known node at all).
    MissingPlacement(usize),
    /// Origin and target were placed in the same cell.
    SharedCell(GridCell),
}

impl fmt::Display for AnchorFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPlacement(node) => write!(f, "node {node} has no placement"),
            Self::SharedCell(cell) => write!(f, "both ends are placed in {cell}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoutingError {
    /// Never produced by a successful compile + place; surfaces a defect upstream.
    #[error("edge {origin} -> {target}: {fault}")]
    InvalidAnchor {
        origin: usize,
        target: usize,
        fault: AnchorFault,
    },
}

/// Pixel bounds of a shape centered in its cell.
#[derive(Debug, Clone, Copy)]
struct ShapeBox {
    cell_left: f64,
    cell_right: f64,
    cell_top: f64,
    cell_bottom: f64,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    center_x: f64,
    center_y: f64,
}

impl ShapeBox {
    fn new(cell: GridCell, size: ShapeSize, grid: CellSize) -> Self {
        let (cell_left, cell_top) = cell_corner(cell, grid);
        let left = cell_left + (grid.width - size.width) / 2.0;
        let top = cell_top + (grid.height - size.height) / 2.0;
        Self {
            cell_left,
            cell_right: cell_left + grid.width,
            cell_top,
            cell_bottom: cell_top + grid.height,
            left,
            right: left + size.width,
            top,
            bottom: top + size.height,
            center_x: cell_left + grid.width / 2.0,
            center_y: cell_top + grid.height / 2.0,
        }
    }

    /// Middle of the padding band above the shape.
    fn band_above(&self) -> f64 {
        (self.cell_top + self.top) / 2.0
    }

    /// Middle of the padding band below the shape.
    fn band_below(&self) -> f64 {
        (self.bottom + self.cell_bottom) / 2.0
    }

    /// Middle of the padding gutter beside the shape, on the right or left.
    fn gutter(&self, right: bool) -> f64 {
        if right {
            (self.right + self.cell_right) / 2.0
        } else {
            (self.cell_left + self.left) / 2.0
        }
    }
}

/// Top-left pixel corner of a cell.
fn cell_corner(cell: GridCell, grid: CellSize) -> (f64, f64) {
    (
        f64::from(cell.column) * grid.width,
        f64::from(cell.row) * grid.height,
    )
}

/// Where a connector meets its target shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Entry {
    Top,
    Bottom,
    Side,
}

/// Polyline through absolute pixel points, ending at the target.
fn sideways_path(
    origin: &ShapeBox,
    target: &ShapeBox,
    rightward: bool,
    entry: Entry,
) -> (Vec<(f64, f64)>, ArrowDirection) {
    let exit_x = if rightward { origin.right } else { origin.left };
    match entry {
        Entry::Side => {
            let entry_x = if rightward { target.left } else { target.right };
            let direction = if rightward {
                ArrowDirection::Right
            } else {
                ArrowDirection::Left
            };
            (
                vec![(exit_x, origin.center_y), (entry_x, origin.center_y)],
                direction,
            )
        }
        Entry::Top if origin.center_y < target.top => (
            vec![
                (exit_x, origin.center_y),
                (target.center_x, origin.center_y),
                (target.center_x, target.top),
            ],
            ArrowDirection::Down,
        ),
        Entry::Top => {
            // Target top is level with or above the exit: run up the gutter and
            // across the band above the target.
            let channel = target.band_above().min(origin.band_above());
            (
                detour(origin, target, rightward, channel, target.top),
                ArrowDirection::Down,
            )
        }
        Entry::Bottom if origin.center_y > target.bottom => (
            vec![
                (exit_x, origin.center_y),
                (target.center_x, origin.center_y),
                (target.center_x, target.bottom),
            ],
            ArrowDirection::Up,
        ),
        Entry::Bottom => {
            let channel = target.band_below().max(origin.band_below());
            (
                detour(origin, target, rightward, channel, target.bottom),
                ArrowDirection::Up,
            )
        }
    }
}

/// Side exit, along the origin's gutter to `channel`, across to the target
/// column, then into the target edge at `entry_y`.
fn detour(
    origin: &ShapeBox,
    target: &ShapeBox,
    rightward: bool,
    channel: f64,
    entry_y: f64,
) -> Vec<(f64, f64)> {
    let exit_x = if rightward { origin.right } else { origin.left };
    let gutter = origin.gutter(rightward);
    vec![
        (exit_x, origin.center_y),
        (gutter, origin.center_y),
        (gutter, channel),
        (target.center_x, channel),
        (target.center_x, entry_y),
    ]
}

/// Path between two shapes in one column that cannot take the straight line:
/// out of the origin's side, along its gutter, across the padding band on the
/// target's entry side, and into that edge.
fn stacked_path(
    origin: &ShapeBox,
    target: &ShapeBox,
    rightward: bool,
    entry: Entry,
) -> (Vec<(f64, f64)>, ArrowDirection) {
    match entry {
        Entry::Bottom => (
            detour(origin, target, rightward, target.band_below(), target.bottom),
            ArrowDirection::Up,
        ),
        Entry::Top | Entry::Side => (
            detour(origin, target, rightward, target.band_above(), target.top),
            ArrowDirection::Down,
        ),
    }
}

/// Convert absolute points into segments relative to `anchor`'s corner.
fn to_segments(points: &[(f64, f64)], anchor: (f64, f64)) -> Vec<Segment> {
    points
        .windows(2)
        .filter_map(|pair| {
            let ((x1, y1), (x2, y2)) = (pair[0], pair[1]);
            let (axis, length) = if (y1 - y2).abs() < EPSILON {
                (Axis::Horizontal, (x2 - x1).abs())
            } else {
                (Axis::Vertical, (y2 - y1).abs())
            };
            if length < EPSILON {
                return None;
            }
            Some(Segment {
                offset_x: x1.min(x2) - anchor.0,
                offset_y: y1.min(y2) - anchor.1,
                length,
                axis,
            })
        })
        .collect()
}

/// Compute the connector geometry for one edge between two placed nodes.
///
/// Orientation comes from the signed column and row deltas. A downward edge in one
/// column is a single vertical line anchored at the origin cell, unless `blocked`
/// says another shape sits between the two ends. Blocked and upward same-column
/// edges leave the origin's side, run up or down its padding gutter and enter the
/// target through the padding band chosen by the label's [`Bend`]; they anchor at
/// the upper cell so offsets stay non-negative. A configured `arrow_length` applies
/// to one-row vertical lines only and never overshoots the target.
///
/// Column changes run a horizontal leg from the origin's near side at mid-height;
/// leftward connectors anchor at the target cell so all horizontal offsets stay
/// non-negative.
///
/// Plain connectors enter the target from the top when it lies below, from the
/// bottom when it lies above, and from the side when it shares the origin's row.
/// Branch connectors enter from the side selected by their label's [`Bend`],
/// detouring through the padding gutter and band when the target is on the
/// wrong side.
#[allow(clippy::too_many_arguments)]
pub fn route_edge(
    edge: Edge,
    origin: GridCell,
    target: GridCell,
    origin_size: ShapeSize,
    target_size: ShapeSize,
    grid: CellSize,
    options: &RouteOptions,
    blocked: bool,
) -> Result<ConnectorGeometry, RoutingError> {
    let dc = origin.column_delta(target);
    let dr = origin.row_delta(target);
    if dc == 0 && dr == 0 {
        return Err(RoutingError::InvalidAnchor {
            origin: edge.origin,
            target: edge.target,
            fault: AnchorFault::SharedCell(origin),
        });
    }

    let from = ShapeBox::new(origin, origin_size, grid);
    let to = ShapeBox::new(target, target_size, grid);

    let (orientation, anchor, points, direction) = if dc == 0 && dr > 0 && !blocked {
        let span = to.top - from.bottom;
        let length = match options.arrow_length {
            Some(length) if dr == 1 => length.min(span),
            _ => span,
        };
        (
            Orientation::Down,
            origin,
            vec![(from.center_x, from.bottom), (from.center_x, from.bottom + length)],
            ArrowDirection::Down,
        )
    } else if dc == 0 {
        // False branches take the left gutter so a decision's two loops never share one.
        let rightward = edge.label != EdgeLabel::False;
        let entry = match options.bend_for(edge.label) {
            Some(Bend::Down) => Entry::Top,
            Some(Bend::Up) => Entry::Bottom,
            None if dr > 0 => Entry::Top,
            None => Entry::Bottom,
        };
        let (points, direction) = stacked_path(&from, &to, rightward, entry);
        if dr > 0 {
            (Orientation::Down, origin, points, direction)
        } else {
            (Orientation::Up, target, points, direction)
        }
    } else {
        let rightward = dc > 0;
        let entry = match options.bend_for(edge.label) {
            Some(Bend::Down) => Entry::Top,
            Some(Bend::Up) => Entry::Bottom,
            None if dr > 0 => Entry::Top,
            None if dr < 0 => Entry::Bottom,
            None => Entry::Side,
        };
        let (points, direction) = sideways_path(&from, &to, rightward, entry);
        if rightward {
            (Orientation::Rightward, origin, points, direction)
        } else {
            (Orientation::Leftward, target, points, direction)
        }
    };

    let segments = to_segments(&points, cell_corner(anchor, grid));
    let arrowhead = options.arrowhead.and_then(|size| {
        let &(tip_x, tip_y) = points.last()?;
        let (cell_x, cell_y) = cell_corner(target, grid);
        Some(Arrowhead {
            cell: target,
            offset_x: tip_x - cell_x,
            offset_y: tip_y - cell_y,
            direction,
            size,
        })
    });

    tracing::trace!(
        origin = edge.origin,
        target = edge.target,
        label = %edge.label,
        ?orientation,
        %anchor,
        segments = segments.len(),
        "routed connector"
    );

    Ok(ConnectorGeometry {
        edge,
        orientation,
        anchor,
        segments,
        arrowhead,
    })
}

/// Route all edges of a placed diagram.
///
/// Every placement is known before routing starts, so edges are independent and
/// are routed in parallel via rayon. The output keeps edge order.
///
/// # Arguments
/// * `nodes` — Compiled nodes (for shape sizes).
/// * `placements` — One placement per node from the placement pass.
/// * `edges` — Resolved edges from the compiler.
/// * `grid` — Uniform cell size in pixels.
/// * `options` — Branch bends, arrow length and arrowhead size.
///
/// # Returns
/// One `ConnectorGeometry` per edge, or the first `InvalidAnchor` failure.
pub fn route_edges(
    nodes: &[Node],
    placements: &[Placement],
    edges: &[Edge],
    grid: CellSize,
    options: &RouteOptions,
) -> Result<Vec<ConnectorGeometry>, RoutingError> {
    let cells: HashMap<usize, GridCell> = placements.iter().map(|p| (p.node, p.cell)).collect();
    let sizes: HashMap<usize, ShapeSize> = nodes.iter().map(|n| (n.index, n.size)).collect();
    let occupied = occupancy(placements);

    let anchor_of = |edge: &Edge, node: usize| {
        cells
            .get(&node)
            .zip(sizes.get(&node))
            .map(|(&cell, &size)| (cell, size))
            .ok_or(RoutingError::InvalidAnchor {
                origin: edge.origin,
                target: edge.target,
                fault: AnchorFault::MissingPlacement(node),
            })
    };

    edges
        .par_iter()
        .map(|edge| {
            let (origin, origin_size) = anchor_of(edge, edge.origin)?;
            let (target, target_size) = anchor_of(edge, edge.target)?;
            route_edge(
                *edge,
                origin,
                target,
                origin_size,
                target_size,
                grid,
                options,
                column_blocked(&occupied, origin, target),
            )
        })
        .collect()
}

/// Occupied cells as `(column, row)` pairs, ordered for per-column range queries.
pub fn occupancy(placements: &[Placement]) -> BTreeSet<(u32, u32)> {
    placements
        .iter()
        .map(|p| (p.cell.column, p.cell.row))
        .collect()
}

/// Whether a shape sits strictly between two cells of the same column.
pub fn column_blocked(occupied: &BTreeSet<(u32, u32)>, a: GridCell, b: GridCell) -> bool {
    if a.column != b.column {
        return false;
    }
    let (low, high) = (a.row.min(b.row), a.row.max(b.row));
    if high - low < 2 {
        return false;
    }
    occupied
        .range((a.column, low + 1)..(a.column, high))
        .next()
        .is_some()
}
