use std::fmt;

use serde::{Deserialize, Serialize};

use super::types::{Edge, EdgeLabel, Node, NodeKind, ShapeSize};

/// One node as supplied by the caller, before validation.
///
/// `order` is the raw order spec: `"<lane>"` for ordinary nodes and
/// `"<lane>:<true target>,<false target>"` for decisions. Targets are zero-based
/// input indices.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub kind: NodeKind,
    pub size: ShapeSize,
    pub order: String,
}

/// Validated nodes plus the resolved edge list, ready for placement and routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledFlow {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
}

/// Which numeric field of an order spec failed to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderField {
    Lane,
    TrueTarget,
    FalseTarget,
}

impl fmt::Display for OrderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lane => write!(f, "lane"),
            Self::TrueTarget => write!(f, "true branch target"),
            Self::FalseTarget => write!(f, "false branch target"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("got {shapes} shapes but {orders} order specs; the counts must match")]
    CountMismatch { shapes: usize, orders: usize },
    #[error("node {node}: unknown shape '{name}'")]
    UnknownShape { node: usize, name: String },
    #[error("node {node}: invalid {field} '{value}' in order spec")]
    MalformedOrder {
        node: usize,
        field: OrderField,
        value: String,
    },
    #[error(
        "node {node} ({kind}): expected {} branch targets, found {found}",
        expected_targets(.kind)
    )]
    BranchArityMismatch {
        node: usize,
        kind: NodeKind,
        found: usize,
    },
    #[error("node {node}: branch target {target} is not another node (valid indices 0..{node_count})")]
    DanglingTarget {
        node: usize,
        target: usize,
        node_count: usize,
    },
}

fn expected_targets(kind: &NodeKind) -> &'static str {
    if kind.is_decision() { "exactly 2" } else { "no" }
}

/// Lane and, for decisions, the (true, false) targets of one order spec.
struct ParsedOrder {
    lane: i32,
    branches: Option<(usize, usize)>,
}

fn parse_field<T: std::str::FromStr>(
    node: usize,
    field: OrderField,
    value: &str,
) -> Result<T, CompileError> {
    value.trim().parse().map_err(|_| CompileError::MalformedOrder {
        node,
        field,
        value: value.trim().to_string(),
    })
}

fn parse_order(node: usize, kind: NodeKind, raw: &str) -> Result<ParsedOrder, CompileError> {
    let raw = raw.trim();
    let Some((lane, targets)) = raw.split_once(':') else {
        if kind.is_decision() {
            return Err(CompileError::BranchArityMismatch {
                node,
                kind,
                found: 0,
            });
        }
        return Ok(ParsedOrder {
            lane: parse_field(node, OrderField::Lane, raw)?,
            branches: None,
        });
    };

    let targets: Vec<&str> = targets
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect();
    if !kind.is_decision() || targets.len() != 2 {
        return Err(CompileError::BranchArityMismatch {
            node,
            kind,
            found: targets.len(),
        });
    }

    let lane = parse_field(node, OrderField::Lane, lane)?;
    let on_true = parse_field(node, OrderField::TrueTarget, targets[0])?;
    let on_false = parse_field(node, OrderField::FalseTarget, targets[1])?;
    Ok(ParsedOrder {
        lane,
        branches: Some((on_true, on_false)),
    })
}

fn check_target(node: usize, target: usize, node_count: usize) -> Result<usize, CompileError> {
    if target >= node_count || target == node {
        return Err(CompileError::DanglingTarget {
            node,
            target,
            node_count,
        });
    }
    Ok(target)
}

/// Validate node specs and resolve the edge list.
///
/// Decisions get a `True` and a `False` edge to their explicit targets. Every other
/// node links to the next node in input order, except the last one.
pub fn compile(specs: &[NodeSpec]) -> Result<CompiledFlow, CompileError> {
    let node_count = specs.len();
    let mut nodes = Vec::with_capacity(node_count);
    let mut edges = Vec::with_capacity(node_count + 1);

    for (index, spec) in specs.iter().enumerate() {
        let order = parse_order(index, spec.kind, &spec.order)?;
        nodes.push(Node {
            index,
            kind: spec.kind,
            size: spec.size,
            lane: order.lane,
        });

        match order.branches {
            Some((on_true, on_false)) => {
                edges.push(Edge {
                    origin: index,
                    target: check_target(index, on_true, node_count)?,
                    label: EdgeLabel::True,
                });
                edges.push(Edge {
                    origin: index,
                    target: check_target(index, on_false, node_count)?,
                    label: EdgeLabel::False,
                });
            }
            None if index + 1 < node_count => edges.push(Edge {
                origin: index,
                target: index + 1,
                label: EdgeLabel::Default,
            }),
            None => {}
        }
    }

    Ok(CompiledFlow { nodes, edges })
}

/// Compile from parallel lists of shape names and order specs, all shapes sharing
/// one size.
pub fn compile_lists<S: AsRef<str>, O: AsRef<str>>(
    shapes: &[S],
    orders: &[O],
    size: ShapeSize,
) -> Result<CompiledFlow, CompileError> {
    if shapes.len() != orders.len() {
        return Err(CompileError::CountMismatch {
            shapes: shapes.len(),
            orders: orders.len(),
        });
    }

    let specs = shapes
        .iter()
        .zip(orders)
        .enumerate()
        .map(|(node, (shape, order))| {
            let kind =
                NodeKind::from_name(shape.as_ref()).ok_or_else(|| CompileError::UnknownShape {
                    node,
                    name: shape.as_ref().trim().to_string(),
                })?;
            Ok(NodeSpec {
                kind,
                size,
                order: order.as_ref().to_string(),
            })
        })
        .collect::<Result<Vec<_>, CompileError>>()?;

    compile(&specs)
}
