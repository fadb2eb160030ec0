use std::collections::{BTreeMap, HashMap};

use super::cell::MAX_COLUMN;
use super::types::{GridCell, Node, Placement};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementError {
    #[error("node {node}: lane {lane} resolves to column {column}, outside the sheet")]
    InvalidLane { node: usize, lane: i32, column: i64 },
    #[error("vertical gap must be at least 1 row")]
    ZeroGap,
    #[error("node {node} was assigned {cell}, which node {occupant} already occupies")]
    CellCollision {
        node: usize,
        cell: GridCell,
        occupant: usize,
    },
}

impl PlacementError {
    /// Collisions mean the allocator broke its own invariant; lane errors are bad input.
    pub fn is_internal(&self) -> bool {
        matches!(self, Self::CellCollision { .. })
    }
}

/// Next free row per column, threaded through one placement pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCursor {
    next_free: BTreeMap<u32, u32>,
}

impl ColumnCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next free row recorded for a column, if anything was placed there.
    pub fn next_free(&self, column: u32) -> Option<u32> {
        self.next_free.get(&column).copied()
    }

    /// Record that `row` of `column` is taken; the column continues `gap` rows below.
    pub fn advance(&mut self, column: u32, row: u32, gap: u32) {
        self.next_free.insert(column, row.saturating_add(gap));
    }

    /// Columns touched so far, left to right.
    pub fn columns(&self) -> impl Iterator<Item = u32> + '_ {
        self.next_free.keys().copied()
    }
}

/// Accumulator for the placement fold.
struct PlacementPass {
    start: GridCell,
    gap: u32,
    cursor: ColumnCursor,
    placements: Vec<Placement>,
    occupied: HashMap<GridCell, usize>,
}

impl PlacementPass {
    fn new(start: GridCell, gap: u32, capacity: usize) -> Self {
        Self {
            start,
            gap,
            cursor: ColumnCursor::new(),
            placements: Vec::with_capacity(capacity),
            occupied: HashMap::with_capacity(capacity),
        }
    }

    fn place(mut self, node: &Node) -> Result<Self, PlacementError> {
        let column = i64::from(self.start.column) + i64::from(node.lane) - 1;
        if column < 0 || column > i64::from(MAX_COLUMN) {
            return Err(PlacementError::InvalidLane {
                node: node.index,
                lane: node.lane,
                column,
            });
        }
        let column = column as u32;

        let row = match self.placements.last() {
            None => self.start.row,
            Some(prev) if prev.cell.column == column => self
                .cursor
                .next_free(column)
                .unwrap_or(prev.cell.row.saturating_add(self.gap)),
            // A new column starts level with the last placed node so branches fan out,
            // but never above the column's next free row.
            Some(prev) => prev
                .cell
                .row
                .max(self.cursor.next_free(column).unwrap_or(0)),
        };

        let cell = GridCell { column, row };
        if let Some(&occupant) = self.occupied.get(&cell) {
            return Err(PlacementError::CellCollision {
                node: node.index,
                cell,
                occupant,
            });
        }

        tracing::trace!(node = node.index, lane = node.lane, %cell, "placed node");
        self.occupied.insert(cell, node.index);
        self.cursor.advance(column, row, self.gap);
        self.placements.push(Placement {
            node: node.index,
            cell,
        });
        Ok(self)
    }
}

/// Assign every node a grid cell, in input order.
///
/// Node `i` lands in column `start.column + lane - 1`. The first node takes
/// `start.row`; a node that stays in the previous node's column takes that column's
/// next free row, and a node that switches column inherits the previous node's row
/// or the column's next free row, whichever is lower on the sheet. Each placement
/// pushes its column's next free row down by `vertical_gap`, so rows strictly
/// increase within every column.
pub fn place_nodes(
    nodes: &[Node],
    start: GridCell,
    vertical_gap: u32,
) -> Result<Vec<Placement>, PlacementError> {
    place_with_cursor(nodes, start, vertical_gap).map(|(placements, _)| placements)
}

/// Like [`place_nodes`], also returning the final column cursor.
pub fn place_with_cursor(
    nodes: &[Node],
    start: GridCell,
    vertical_gap: u32,
) -> Result<(Vec<Placement>, ColumnCursor), PlacementError> {
    if vertical_gap == 0 && !nodes.is_empty() {
        return Err(PlacementError::ZeroGap);
    }
    let pass = nodes.iter().try_fold(
        PlacementPass::new(start, vertical_gap, nodes.len()),
        PlacementPass::place,
    )?;
    Ok((pass.placements, pass.cursor))
}
