mod common;

use std::sync::Arc;

use heddle::graphs::{GraphBuildError, WorkflowBuilder};
use heddle::message::Message;
use heddle::nodes::CollectorNode;
use heddle::types::NodeId;

use common::nodes::{EchoNode, JoinProbeNode};
use common::test_config;

fn linear_builder() -> WorkflowBuilder {
    WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", EchoNode)
        .set_entry("a")
        .add_edge("a", "b")
        .add_terminal("b")
        .with_config(test_config())
}

#[test]
fn compiles_a_linear_graph() {
    let workflow = linear_builder().compile().expect("valid graph");
    assert_eq!(workflow.entry().as_str(), "a");
    assert_eq!(workflow.terminals(), &[NodeId::from("b")]);

    let a = workflow.node(&NodeId::from("a")).unwrap();
    assert!(!a.is_terminal());
    assert_eq!(a.edges().len(), 1);
    assert_eq!(a.edges()[0].target(), &NodeId::from("b"));

    let b = workflow.node(&NodeId::from("b")).unwrap();
    assert!(b.is_terminal());
    assert!(b.edges().is_empty());
}

#[test]
fn missing_entry_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_terminal("a")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::MissingEntry));
}

#[test]
fn unknown_entry_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .set_entry("ghost")
        .add_terminal("a")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::UnknownEntry { .. }));
}

#[test]
fn missing_terminal_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .set_entry("a")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::MissingTerminal));
}

#[test]
fn unknown_terminal_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .set_entry("a")
        .add_terminal("ghost")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::UnknownTerminal { .. }));
}

#[test]
fn unresolved_edge_target_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .set_entry("a")
        .add_terminal("a")
        .add_edge("a", "ghost")
        .compile()
        .unwrap_err();
    assert!(matches!(
        err,
        GraphBuildError::UnknownEdgeTarget { ref to, .. } if to.as_str() == "ghost"
    ));
}

#[test]
fn unresolved_edge_source_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .set_entry("a")
        .add_terminal("a")
        .add_edge("ghost", "a")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::UnknownEdgeSource { .. }));
}

#[test]
fn reachable_dead_end_is_a_build_error() {
    // b is reachable, not terminal, and has no way forward.
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", EchoNode)
        .set_entry("a")
        .add_edge("a", "b")
        .add_terminal("a")
        .compile()
        .unwrap_err();
    assert!(matches!(
        err,
        GraphBuildError::DeadEnd { ref id } if id.as_str() == "b"
    ));
}

#[test]
fn unreachable_node_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_node("island", EchoNode)
        .set_entry("a")
        .add_terminal("a")
        .add_terminal("island")
        .compile()
        .unwrap_err();
    assert!(matches!(
        err,
        GraphBuildError::UnreachableNode { ref id } if id.as_str() == "island"
    ));
}

#[test]
fn join_without_inbound_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_join_node("j", JoinProbeNode::default())
        .set_entry("a")
        .add_edge("a", "a")
        .add_terminal("j")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::JoinWithoutInbound { .. }));
}

#[test]
fn batch_behavior_outside_join_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_node("merge", CollectorNode::joining_with(", "))
        .set_entry("a")
        .add_edge("a", "merge")
        .add_terminal("merge")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::BatchInputOutsideJoin { .. }));
}

#[test]
fn single_behavior_on_join_is_a_build_error() {
    let err = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_join_node("j", EchoNode)
        .set_entry("a")
        .add_edge("a", "j")
        .add_terminal("j")
        .compile()
        .unwrap_err();
    assert!(matches!(err, GraphBuildError::SingleInputOnJoin { .. }));
}

#[test]
fn join_threshold_derives_from_wiring() {
    let workflow = WorkflowBuilder::new()
        .add_node("split", EchoNode)
        .add_node("w1", EchoNode)
        .add_node("w2", EchoNode)
        .add_join_node("j", JoinProbeNode::default())
        .set_entry("split")
        .add_parallel_edge("split", "w1")
        .add_parallel_edge("split", "w2")
        .add_edge("w1", "j")
        .add_edge("w2", "j")
        .add_terminal("j")
        .with_config(test_config())
        .compile()
        .expect("valid graph");

    let join = workflow.node(&NodeId::from("j")).unwrap();
    assert!(join.is_join());
    assert_eq!(join.expected_inbound(), 2);
}

#[test]
fn duplicate_edges_are_allowed_and_counted() {
    let workflow = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", EchoNode)
        .set_entry("a")
        .add_edge("a", "b")
        .add_edge("a", "b")
        .add_terminal("b")
        .with_config(test_config())
        .compile()
        .expect("valid graph");
    assert_eq!(workflow.node(&NodeId::from("a")).unwrap().edges().len(), 2);
    assert_eq!(
        workflow.node(&NodeId::from("b")).unwrap().expected_inbound(),
        2
    );
}

#[test]
fn edges_keep_registration_order() {
    let pred = Arc::new(|m: &Message| m.content.contains("x"));
    let workflow = WorkflowBuilder::new()
        .add_node("a", EchoNode)
        .add_node("b", EchoNode)
        .add_node("c", EchoNode)
        .set_entry("a")
        .add_edge_when("a", "b", pred.clone())
        .add_edge_when("a", "c", pred)
        .add_edge("b", "c")
        .add_terminal("c")
        .compile()
        .expect("valid graph");

    let a = workflow.node(&NodeId::from("a")).unwrap();
    let targets: Vec<_> = a.edges().iter().map(|e| e.target().as_str()).collect();
    assert_eq!(targets, vec!["b", "c"]);
}

#[test]
fn visualization_enumerates_every_node_and_edge() {
    let workflow = WorkflowBuilder::new()
        .add_node("split", EchoNode)
        .add_node("w1", EchoNode)
        .add_node("w2", EchoNode)
        .add_join_node("j", JoinProbeNode::default())
        .set_entry("split")
        .add_parallel_edge("split", "w1")
        .add_parallel_edge("split", "w2")
        .add_edge("w1", "j")
        .add_edge("w2", "j")
        .add_terminal("j")
        .compile()
        .expect("valid graph");

    let dot = workflow.visualize();
    assert!(dot.starts_with("digraph"));
    for node in ["split", "w1", "w2", "j"] {
        assert!(dot.contains(&format!("\"{node}\"")), "missing node {node}");
    }
    assert!(dot.contains("\"split\" -> \"w1\""));
    assert!(dot.contains("\"split\" -> \"w2\""));
    assert!(dot.contains("\"w1\" -> \"j\""));
    assert!(dot.contains("\"w2\" -> \"j\""));
    // Parallel edges are visually distinct; roles are annotated.
    assert!(dot.contains("style=dashed"));
    assert!(dot.contains("split (entry)"));
    assert!(dot.contains("j (join, terminal)"));
}
