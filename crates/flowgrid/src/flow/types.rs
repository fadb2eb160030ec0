use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A cell on the host sheet.
///
/// Columns are zero-based (`A` = 0) and rows are one-based (`6` is row 6), which
/// matches how the sheet addresses cells: `G6` is `GridCell { column: 6, row: 6 }`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub column: u32,
    pub row: u32,
}

impl GridCell {
    pub fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Signed column delta from `self` to `other`.
    pub fn column_delta(self, other: GridCell) -> i64 {
        i64::from(other.column) - i64::from(self.column)
    }

    /// Signed row delta from `self` to `other`.
    pub fn row_delta(self, other: GridCell) -> i64 {
        i64::from(other.row) - i64::from(self.row)
    }
}

impl Ord for GridCell {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row).then(self.column.cmp(&other.column))
    }
}

impl PartialOrd for GridCell {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Debug for GridCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(col{}, row{})", self.column, self.row)
    }
}

/// Flowchart shape kinds understood by the layout engine.
///
/// Only `Decision` changes layout semantics (it owns a true and a false branch);
/// every other kind is placed and linked sequentially.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NodeKind {
    Process,
    Decision,
    Terminator,
    InputOutput,
    PredefinedProcess,
    Document,
    ManualInput,
    Preparation,
    Connector,
    Delay,
}

impl NodeKind {
    pub fn all() -> &'static [NodeKind] {
        &[
            NodeKind::Process,
            NodeKind::Decision,
            NodeKind::Terminator,
            NodeKind::InputOutput,
            NodeKind::PredefinedProcess,
            NodeKind::Document,
            NodeKind::ManualInput,
            NodeKind::Preparation,
            NodeKind::Connector,
            NodeKind::Delay,
        ]
    }

    /// Short name used on the command line and in request files.
    pub fn short_name(self) -> &'static str {
        match self {
            Self::Process => "process",
            Self::Decision => "decision",
            Self::Terminator => "terminator",
            Self::InputOutput => "io",
            Self::PredefinedProcess => "predefined-process",
            Self::Document => "document",
            Self::ManualInput => "manual-input",
            Self::Preparation => "preparation",
            Self::Connector => "connector",
            Self::Delay => "delay",
        }
    }

    /// The sheet's preset shape name for this kind.
    pub fn preset_name(self) -> &'static str {
        match self {
            Self::Process => "flowChartProcess",
            Self::Decision => "flowChartDecision",
            Self::Terminator => "flowChartTerminator",
            Self::InputOutput => "flowChartInputOutput",
            Self::PredefinedProcess => "flowChartPredefinedProcess",
            Self::Document => "flowChartDocument",
            Self::ManualInput => "flowChartManualInput",
            Self::Preparation => "flowChartPreparation",
            Self::Connector => "flowChartConnector",
            Self::Delay => "flowChartDelay",
        }
    }

    /// Resolve a shape name. Accepts short names, a few aliases and preset names,
    /// case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        let lowered = name.to_ascii_lowercase();
        let kind = match lowered.as_str() {
            "process" | "rect" => Self::Process,
            "decision" => Self::Decision,
            "terminator" | "start" | "end" => Self::Terminator,
            "io" | "data" | "input-output" | "inputoutput" => Self::InputOutput,
            "predefined-process" | "subroutine" => Self::PredefinedProcess,
            "document" => Self::Document,
            "manual-input" => Self::ManualInput,
            "preparation" => Self::Preparation,
            "connector" => Self::Connector,
            "delay" => Self::Delay,
            _ => {
                return Self::all()
                    .iter()
                    .copied()
                    .find(|kind| kind.preset_name().eq_ignore_ascii_case(name));
            }
        };
        Some(kind)
    }

    pub fn is_decision(self) -> bool {
        matches!(self, Self::Decision)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.short_name())
    }
}

/// Shape dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeSize {
    pub width: f64,
    pub height: f64,
}

impl ShapeSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Uniform cell dimensions in pixels. Every column and row of the diagram uses it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CellSize {
    pub width: f64,
    pub height: f64,
}

impl CellSize {
    /// Cell large enough for the widest and tallest shape plus `padding` on each axis.
    pub fn fit(nodes: &[Node], padding: f64) -> Self {
        let width = nodes.iter().map(|n| n.size.width).fold(0.0, f64::max);
        let height = nodes.iter().map(|n| n.size.height).fold(0.0, f64::max);
        Self {
            width: width + padding,
            height: height + padding,
        }
    }
}

/// A compiled diagram step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Zero-based position in the input.
    pub index: usize,
    pub kind: NodeKind,
    pub size: ShapeSize,
    /// One-based lane (column offset from the start column).
    pub lane: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeLabel {
    Default,
    True,
    False,
}

impl EdgeLabel {
    /// Whether this edge is one of a decision's two branches.
    pub fn is_branch(self) -> bool {
        !matches!(self, Self::Default)
    }
}

impl fmt::Display for EdgeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => write!(f, "next"),
            Self::True => write!(f, "true"),
            Self::False => write!(f, "false"),
        }
    }
}

/// A directed link between two nodes, by input index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub origin: usize,
    pub target: usize,
    pub label: EdgeLabel,
}

/// A node's resolved grid position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Placement {
    pub node: usize,
    pub cell: GridCell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
}

/// Connector orientation, chosen from the signed column and row deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Down,
    Up,
    Rightward,
    Leftward,
}

/// Which way an arrowhead points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArrowDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Which side of the target a branch connector enters from.
///
/// `Down` enters through the target's top edge (arrowhead pointing down),
/// `Up` through its bottom edge (arrowhead pointing up).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Bend {
    Up,
    Down,
}

impl Bend {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            _ => None,
        }
    }
}

impl fmt::Display for Bend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}

/// One straight line of a connector.
///
/// `offset_x`/`offset_y` locate the segment's start (its minimum-coordinate end)
/// relative to the top-left corner of the connector's anchor cell, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub offset_x: f64,
    pub offset_y: f64,
    pub length: f64,
    pub axis: Axis,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ArrowheadSize {
    pub width: f64,
    pub height: f64,
}

impl Default for ArrowheadSize {
    fn default() -> Self {
        Self {
            width: 6.0,
            height: 9.0,
        }
    }
}

/// Arrowhead at the end of a connector. The tip sits at (`offset_x`, `offset_y`)
/// relative to the top-left corner of `cell`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Arrowhead {
    pub cell: GridCell,
    pub offset_x: f64,
    pub offset_y: f64,
    pub direction: ArrowDirection,
    pub size: ArrowheadSize,
}

/// The line and arrowhead primitives describing one edge between two placed nodes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorGeometry {
    pub edge: Edge,
    pub orientation: Orientation,
    pub anchor: GridCell,
    pub segments: Vec<Segment>,
    pub arrowhead: Option<Arrowhead>,
}

impl ConnectorGeometry {
    /// Sum of all segment lengths in pixels.
    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(|s| s.length).sum()
    }
}

/// Options for the routing pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOptions {
    /// Entry side for `True` branches that change column.
    pub true_bend: Bend,
    /// Entry side for `False` branches that change column.
    pub false_bend: Bend,
    /// Fixed length for straight vertical connectors. Derived from the row
    /// distance and shape heights when unset.
    pub arrow_length: Option<f64>,
    /// Arrowhead dimensions; `None` draws bare lines.
    pub arrowhead: Option<ArrowheadSize>,
}

impl RouteOptions {
    /// The configured bend for a branch label, `None` for plain connectors.
    pub fn bend_for(&self, label: EdgeLabel) -> Option<Bend> {
        match label {
            EdgeLabel::Default => None,
            EdgeLabel::True => Some(self.true_bend),
            EdgeLabel::False => Some(self.false_bend),
        }
    }
}

impl Default for RouteOptions {
    fn default() -> Self {
        Self {
            true_bend: Bend::Down,
            false_bend: Bend::Up,
            arrow_length: None,
            arrowhead: Some(ArrowheadSize::default()),
        }
    }
}

/// Options for one `compile -> place -> route` invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutOptions {
    /// Cell of the first node.
    pub start: GridCell,
    /// Rows between consecutive nodes of one column.
    pub vertical_gap: u32,
    /// Pixels added to the largest shape on each axis to size the cells.
    pub cell_padding: f64,
    pub routing: RouteOptions,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            start: GridCell::new(6, 6),
            vertical_gap: 1,
            cell_padding: 20.0,
            routing: RouteOptions::default(),
        }
    }
}

/// Output of a full layout: everything a renderer needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowLayout {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    pub placements: Vec<Placement>,
    pub connectors: Vec<ConnectorGeometry>,
    pub cell_size: CellSize,
}

impl FlowLayout {
    /// Placement of a node by input index.
    pub fn placement_of(&self, node: usize) -> Option<&Placement> {
        self.placements.iter().find(|p| p.node == node)
    }

    /// All connectors leaving a node.
    pub fn connectors_from(&self, node: usize) -> impl Iterator<Item = &ConnectorGeometry> {
        self.connectors.iter().filter(move |c| c.edge.origin == node)
    }
}
