use std::convert::Infallible;

use serde::Serialize;

use super::{Renderer, ShapeDraw};
use crate::flow::cell::column_name;
use crate::flow::serialize::connector_to_string;
use crate::flow::types::ConnectorGeometry;

/// One recorded renderer call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum DrawCommand {
    ColumnWidth { column: String, units: f64 },
    RowHeight { row: u32, units: f64 },
    Shape(ShapeDraw),
    Connector(ConnectorGeometry),
}

/// A renderer that records draw calls instead of drawing, for export or inspection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shapes(&self) -> impl Iterator<Item = &ShapeDraw> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    pub fn connectors(&self) -> impl Iterator<Item = &ConnectorGeometry> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Connector(connector) => Some(connector),
            _ => None,
        })
    }

    /// One line per command, in recording order.
    pub fn to_text(&self) -> String {
        self.commands
            .iter()
            .map(|command| match command {
                DrawCommand::ColumnWidth { column, units } => {
                    format!("column {column} width {units:.2}")
                }
                DrawCommand::RowHeight { row, units } => format!("row {row} height {units:.2}"),
                DrawCommand::Shape(shape) => format!(
                    "shape #{} {} {} +({},{}) {}x{}",
                    shape.node,
                    shape.kind.preset_name(),
                    shape.cell,
                    shape.offset_x,
                    shape.offset_y,
                    shape.size.width,
                    shape.size.height
                ),
                DrawCommand::Connector(connector) => {
                    format!("connector {}", connector_to_string(connector))
                }
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Renderer for DrawList {
    type Error = Infallible;

    fn set_column_width(&mut self, column: u32, units: f64) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::ColumnWidth {
            column: column_name(column),
            units,
        });
        Ok(())
    }

    fn set_row_height(&mut self, row: u32, units: f64) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::RowHeight { row, units });
        Ok(())
    }

    fn draw_shape(&mut self, shape: &ShapeDraw) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Shape(*shape));
        Ok(())
    }

    fn draw_connector(&mut self, connector: &ConnectorGeometry) -> Result<(), Self::Error> {
        self.commands.push(DrawCommand::Connector(connector.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod unit_tests {
    use super::*;
    use crate::flow::compile::compile_lists;
    use crate::flow::layout_compiled;
    use crate::flow::types::{GridCell, LayoutOptions, ShapeSize};
    use crate::flow::units::{column_units_to_pixels, row_units_to_pixels};
    use crate::flow::types::{CellSize, FlowLayout, Placement};
    use crate::render::{RenderError, render_layout};

    fn draw(shapes: &[&str], orders: &[&str]) -> DrawList {
        let flow = compile_lists(shapes, orders, ShapeSize::new(120.0, 60.0)).unwrap();
        let options = LayoutOptions {
            start: GridCell::new(6, 6),
            vertical_gap: 2,
            cell_padding: 20.0,
            ..LayoutOptions::default()
        };
        let layout = layout_compiled(flow, &options).unwrap();
        let mut list = DrawList::new();
        render_layout(&layout, &mut list).unwrap();
        list
    }

    #[test]
    fn sizes_every_column_and_row_between_placements() {
        // Nodes at G6, G8, H8: columns G..H, rows 6..8 (row 7 is a gap row).
        let list = draw(&["process", "process", "process"], &["1", "1", "2"]);
        let columns: Vec<&str> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::ColumnWidth { column, .. } => Some(column.as_str()),
                _ => None,
            })
            .collect();
        let rows: Vec<u32> = list
            .commands
            .iter()
            .filter_map(|c| match c {
                DrawCommand::RowHeight { row, .. } => Some(*row),
                _ => None,
            })
            .collect();
        assert_eq!(columns, vec!["G", "H"]);
        assert_eq!(rows, vec![6, 7, 8]);
    }

    #[test]
    fn native_units_convert_back_to_cell_pixels() {
        let list = draw(&["process", "process"], &["1", "1"]);
        for command in &list.commands {
            match command {
                DrawCommand::ColumnWidth { units, .. } => {
                    assert!((column_units_to_pixels(*units) - 140.0).abs() <= 1.0);
                }
                DrawCommand::RowHeight { units, .. } => {
                    assert!((row_units_to_pixels(*units) - 80.0).abs() <= 1.0);
                }
                _ => {}
            }
        }
    }

    #[test]
    fn shapes_are_centered_in_cells() {
        let list = draw(&["terminator", "process"], &["1", "1"]);
        let shapes: Vec<&ShapeDraw> = list.shapes().collect();
        assert_eq!(shapes.len(), 2);
        assert_eq!(shapes[0].cell, GridCell::new(6, 6));
        assert_eq!(shapes[0].offset_x, 10.0);
        assert_eq!(shapes[0].offset_y, 10.0);
    }

    #[test]
    fn connectors_follow_shapes() {
        let list = draw(&["process", "process", "process"], &["1", "1", "1"]);
        let first_connector = list
            .commands
            .iter()
            .position(|c| matches!(c, DrawCommand::Connector(_)))
            .unwrap();
        let last_shape = list
            .commands
            .iter()
            .rposition(|c| matches!(c, DrawCommand::Shape(_)))
            .unwrap();
        assert!(last_shape < first_connector);
        assert_eq!(list.connectors().count(), 2);
    }

    #[test]
    fn text_form_names_presets_and_cells() {
        let list = draw(&["terminator", "process"], &["1", "1"]);
        let text = list.to_text();
        assert!(text.contains("shape #0 flowChartTerminator G6 +(10,10) 120x60"));
        assert!(text.contains("row 8 height 60.00"));
        assert!(text.lines().last().unwrap().starts_with("connector 0->1:next down @G6"));
    }

    #[test]
    fn placement_without_a_node_is_reported() {
        let flow = compile_lists(&["process"], &["1"], ShapeSize::new(120.0, 60.0)).unwrap();
        let layout = FlowLayout {
            nodes: flow.nodes,
            edges: Vec::new(),
            placements: vec![
                Placement {
                    node: 0,
                    cell: GridCell::new(6, 6),
                },
                Placement {
                    node: 5,
                    cell: GridCell::new(6, 7),
                },
            ],
            connectors: Vec::new(),
            cell_size: CellSize {
                width: 140.0,
                height: 80.0,
            },
        };
        let mut list = DrawList::new();
        let err = render_layout(&layout, &mut list).unwrap_err();
        assert!(matches!(err, RenderError::MissingNode { node: 5 }));
        assert!(list.commands.is_empty());
    }
}
