pub mod draw_list;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::flow::types::{CellSize, ConnectorGeometry, FlowLayout, GridCell, NodeKind, ShapeSize};
use crate::flow::units::{pixels_to_column_units, pixels_to_row_units};

/// A shape ready to draw: its cell, kind, size, and the pixel offset that centers
/// it inside the cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeDraw {
    pub node: usize,
    pub cell: GridCell,
    pub kind: NodeKind,
    pub size: ShapeSize,
    pub offset_x: f64,
    pub offset_y: f64,
}

/// Why a layout could not be rendered.
#[derive(Debug, thiserror::Error)]
pub enum RenderError<E> {
    #[error("placement refers to node {node}, which the layout does not contain")]
    MissingNode { node: usize },
    #[error("drawing surface failed: {0}")]
    Surface(E),
}

/// A drawing surface for laid-out flowcharts.
///
/// Column widths and row heights arrive in the surface's native units (characters
/// and points, see [`crate::flow::units`]); shape and connector geometry in pixels.
pub trait Renderer {
    type Error;

    fn set_column_width(&mut self, column: u32, units: f64) -> Result<(), Self::Error>;

    fn set_row_height(&mut self, row: u32, units: f64) -> Result<(), Self::Error>;

    fn draw_shape(&mut self, shape: &ShapeDraw) -> Result<(), Self::Error>;

    fn draw_connector(&mut self, connector: &ConnectorGeometry) -> Result<(), Self::Error>;
}

/// Drive a renderer over a finished layout.
///
/// Every column and row between the outermost placements is sized to the layout's
/// cell size, so connector offsets measured in uniform cells stay valid on the
/// surface. Shapes are drawn before connectors. A placement whose node is not in
/// `layout.nodes` fails with [`RenderError::MissingNode`] before anything is drawn.
pub fn render_layout<R: Renderer>(
    layout: &FlowLayout,
    renderer: &mut R,
) -> Result<(), RenderError<R::Error>> {
    let CellSize { width, height } = layout.cell_size;

    let shapes = layout
        .placements
        .iter()
        .map(|placement| {
            layout
                .nodes
                .get(placement.node)
                .filter(|node| node.index == placement.node)
                .map(|node| ShapeDraw {
                    node: node.index,
                    cell: placement.cell,
                    kind: node.kind,
                    size: node.size,
                    offset_x: (width - node.size.width) / 2.0,
                    offset_y: (height - node.size.height) / 2.0,
                })
                .ok_or(RenderError::MissingNode {
                    node: placement.node,
                })
        })
        .collect::<Result<Vec<_>, RenderError<R::Error>>>()?;

    let columns: BTreeSet<u32> = layout.placements.iter().map(|p| p.cell.column).collect();
    let rows: BTreeSet<u32> = layout.placements.iter().map(|p| p.cell.row).collect();

    if let (Some(&first), Some(&last)) = (columns.first(), columns.last()) {
        let units = pixels_to_column_units(width);
        for column in first..=last {
            renderer
                .set_column_width(column, units)
                .map_err(RenderError::Surface)?;
        }
    }
    if let (Some(&first), Some(&last)) = (rows.first(), rows.last()) {
        let units = pixels_to_row_units(height);
        for row in first..=last {
            renderer
                .set_row_height(row, units)
                .map_err(RenderError::Surface)?;
        }
    }

    for shape in &shapes {
        renderer.draw_shape(shape).map_err(RenderError::Surface)?;
    }

    for connector in &layout.connectors {
        renderer
            .draw_connector(connector)
            .map_err(RenderError::Surface)?;
    }

    tracing::debug!(
        shapes = shapes.len(),
        connectors = layout.connectors.len(),
        "layout rendered"
    );
    Ok(())
}
