use super::*;
use crate::flow::compile::{CompileError, OrderField, compile, compile_lists};
use crate::flow::types::{Edge, EdgeLabel};

fn edge(origin: usize, target: usize, label: EdgeLabel) -> Edge {
    Edge {
        origin,
        target,
        label,
    }
}

#[test]
fn sequential_nodes_link_to_the_next() {
    let flow = compile(&[process("1"), process("1"), process("2")]).unwrap();
    assert_eq!(
        flow.edges,
        vec![
            edge(0, 1, EdgeLabel::Default),
            edge(1, 2, EdgeLabel::Default),
        ]
    );
    assert_eq!(flow.nodes[2].lane, 2);
}

#[test]
fn decision_emits_true_then_false() {
    let flow = compile(&[
        process("1"),
        decision("1:2,4"),
        process("1"),
        process("1"),
        process("2"),
    ])
    .unwrap();
    let from_decision: Vec<Edge> = flow.edges.iter().filter(|e| e.origin == 1).copied().collect();
    assert_eq!(
        from_decision,
        vec![edge(1, 2, EdgeLabel::True), edge(1, 4, EdgeLabel::False)]
    );
    // The decision has no implicit sequential edge.
    assert_eq!(flow.edges.len(), 5);
}

#[test]
fn last_node_has_no_outgoing_edge() {
    let flow = compile(&[process("1")]).unwrap();
    assert!(flow.edges.is_empty());
}

#[test]
fn whitespace_in_order_specs_is_ignored() {
    let flow = compile(&[decision(" 2 : 1 , 2 "), process("1"), process("1")]).unwrap();
    assert_eq!(flow.nodes[0].lane, 2);
    assert_eq!(flow.edges[0], edge(0, 1, EdgeLabel::True));
    assert_eq!(flow.edges[1], edge(0, 2, EdgeLabel::False));
}

#[test]
fn shape_and_order_counts_must_match() {
    let err = compile_lists(
        &["process", "decision", "process", "process"],
        &["1", "1:2,3", "1"],
        SHAPE,
    )
    .unwrap_err();
    assert_eq!(
        err,
        CompileError::CountMismatch {
            shapes: 4,
            orders: 3
        }
    );
}

#[test]
fn unknown_shape_is_reported_by_index() {
    let err = compile_lists(&["process", "hexagon"], &["1", "1"], SHAPE).unwrap_err();
    assert_eq!(
        err,
        CompileError::UnknownShape {
            node: 1,
            name: "hexagon".to_string()
        }
    );
}

#[test]
fn shape_names_accept_presets_and_aliases() {
    let flow = compile_lists(
        &["flowChartTerminator", "Decision", "data", "subroutine", "process"],
        &["1", "1:2,3", "1", "2", "2"],
        SHAPE,
    )
    .unwrap();
    let kinds: Vec<NodeKind> = flow.nodes.iter().map(|n| n.kind).collect();
    assert_eq!(
        kinds,
        vec![
            NodeKind::Terminator,
            NodeKind::Decision,
            NodeKind::InputOutput,
            NodeKind::PredefinedProcess,
            NodeKind::Process,
        ]
    );
}

#[test]
fn malformed_lane() {
    let err = compile(&[process("x")]).unwrap_err();
    assert_eq!(
        err,
        CompileError::MalformedOrder {
            node: 0,
            field: OrderField::Lane,
            value: "x".to_string()
        }
    );
}

#[test]
fn malformed_branch_targets() {
    let err = compile(&[decision("1:a,1"), process("1")]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::MalformedOrder {
            node: 0,
            field: OrderField::TrueTarget,
            ..
        }
    ));

    let err = compile(&[decision("1:1,-1"), process("1")]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::MalformedOrder {
            field: OrderField::FalseTarget,
            ..
        }
    ));
}

#[test]
fn decision_without_targets() {
    let err = compile(&[decision("1"), process("1")]).unwrap_err();
    assert_eq!(
        err,
        CompileError::BranchArityMismatch {
            node: 0,
            kind: NodeKind::Decision,
            found: 0
        }
    );
    assert!(err.to_string().contains("expected exactly 2 branch targets"));
}

#[test]
fn decision_with_one_target() {
    let err = compile(&[decision("1:1"), process("1")]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::BranchArityMismatch { found: 1, .. }
    ));
}

#[test]
fn decision_with_three_targets() {
    let err = compile(&[decision("1:1,2,3"), process("1"), process("1"), process("1")])
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::BranchArityMismatch { found: 3, .. }
    ));
}

#[test]
fn non_decision_with_targets() {
    let err = compile(&[process("1:1,2"), process("1"), process("1")]).unwrap_err();
    assert_eq!(
        err,
        CompileError::BranchArityMismatch {
            node: 0,
            kind: NodeKind::Process,
            found: 2
        }
    );
    assert!(err.to_string().contains("expected no branch targets"));
}

#[test]
fn target_past_the_end_dangles() {
    let err = compile(&[decision("1:1,7"), process("1")]).unwrap_err();
    assert_eq!(
        err,
        CompileError::DanglingTarget {
            node: 0,
            target: 7,
            node_count: 2
        }
    );
}

#[test]
fn decision_targeting_itself_dangles() {
    let err = compile(&[process("1"), decision("1:1,0")]).unwrap_err();
    assert!(matches!(
        err,
        CompileError::DanglingTarget {
            node: 1,
            target: 1,
            ..
        }
    ));
}

#[test]
fn first_error_wins() {
    // Node 0 is malformed; node 1's dangling target is never reached.
    let err = compile(&[process("?"), decision("1:9,9")]).unwrap_err();
    assert!(matches!(err, CompileError::MalformedOrder { node: 0, .. }));
}
