pub mod cell;
pub mod compile;
pub mod connector;
pub mod grid;
pub mod serialize;
pub mod types;
pub mod units;

#[cfg(test)]
mod tests;

use compile::{CompileError, CompiledFlow, NodeSpec, compile};
use connector::{RoutingError, route_edges};
use grid::{PlacementError, place_nodes};
use types::{CellSize, FlowLayout, LayoutOptions};

/// Any failure of a `compile -> place -> route` run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FlowError {
    #[error(transparent)]
    Compile(#[from] CompileError),
    #[error(transparent)]
    Placement(#[from] PlacementError),
    #[error(transparent)]
    Routing(#[from] RoutingError),
}

impl FlowError {
    /// True for invariant violations inside the engine (cell collisions, unanchored
    /// edges), false for errors caused by the caller's input.
    pub fn is_internal(&self) -> bool {
        match self {
            Self::Compile(_) => false,
            Self::Placement(e) => e.is_internal(),
            Self::Routing(_) => true,
        }
    }
}

/// Lay out a flowchart: compile the specs, place every node, then route every edge.
///
/// All-or-nothing: any failure returns an error and no partial layout.
pub fn layout(specs: &[NodeSpec], options: &LayoutOptions) -> Result<FlowLayout, FlowError> {
    let flow = compile(specs)?;
    layout_compiled(flow, options)
}

/// Placement and routing passes over an already compiled flow.
pub fn layout_compiled(
    flow: CompiledFlow,
    options: &LayoutOptions,
) -> Result<FlowLayout, FlowError> {
    let CompiledFlow { nodes, edges } = flow;

    let placements = place_nodes(&nodes, options.start, options.vertical_gap)?;
    tracing::debug!(
        nodes = nodes.len(),
        start = %options.start,
        gap = options.vertical_gap,
        "placement pass complete"
    );

    let cell_size = CellSize::fit(&nodes, options.cell_padding);
    let connectors = route_edges(&nodes, &placements, &edges, cell_size, &options.routing)?;
    tracing::debug!(
        edges = edges.len(),
        cell_width = cell_size.width,
        cell_height = cell_size.height,
        "routing pass complete"
    );

    Ok(FlowLayout {
        nodes,
        edges,
        placements,
        connectors,
        cell_size,
    })
}
