mod common;

use std::sync::Arc;

use parking_lot::Mutex;

use heddle::event_bus::EventBus;
use heddle::message::Message;
use heddle::node::{Node, NodeError, NodeInput};
use heddle::nodes::{AgentNode, CollectorNode, DecisionNode, GuardNode, TransformNode};

use common::nodes::RecordingNode;
use common::providers::{InspectingClient, KeywordModerator, ScriptedClient};
use common::run_context;

fn invoke_ctx(bus: &EventBus) -> heddle::context::NodeContext {
    run_context(bus).node_context("under-test".into(), 1)
}

#[tokio::test]
async fn transform_maps_a_single_message() {
    let bus = EventBus::new(16);
    let node = TransformNode::map(|m| Message::assistant(&m.content.to_uppercase()));

    let out = node
        .invoke(NodeInput::Single(Message::user("hello")), invoke_ctx(&bus))
        .await
        .expect("transform ok");
    assert_eq!(out.content, "HELLO");
}

#[tokio::test]
async fn transform_map_rejects_join_batches() {
    let bus = EventBus::new(16);
    let node = TransformNode::map(|m| m.clone());

    let err = node
        .invoke(
            NodeInput::Joined(vec![Message::user("a"), Message::user("b")]),
            invoke_ctx(&bus),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::MissingInput { .. }));
}

#[tokio::test]
async fn guard_passes_clean_content_through() {
    let bus = EventBus::new(16);
    let node = GuardNode::new(Arc::new(KeywordModerator { needle: "banned" }));

    let input = Message::user("perfectly fine request");
    let out = node
        .invoke(NodeInput::Single(input.clone()), invoke_ctx(&bus))
        .await
        .expect("clean content passes");
    assert_eq!(out, input);
}

#[tokio::test]
async fn guard_rejects_flagged_content() {
    let bus = EventBus::new(16);
    let node = GuardNode::new(Arc::new(KeywordModerator { needle: "banned" }));

    let err = node
        .invoke(
            NodeInput::Single(Message::user("this is banned content")),
            invoke_ctx(&bus),
        )
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::Rejected { .. }));
}

#[tokio::test]
async fn agent_prepends_its_system_prompt() {
    let bus = EventBus::new(16);
    let client = Arc::new(InspectingClient::default());
    let node = AgentNode::new(client.clone()).with_system_prompt("You are terse.");

    node.invoke(NodeInput::Single(Message::user("hi")), invoke_ctx(&bus))
        .await
        .expect("agent ok");

    let seen = client.seen.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].len(), 2);
    assert!(seen[0][0].has_role(Message::SYSTEM));
    assert_eq!(seen[0][0].content, "You are terse.");
    assert_eq!(seen[0][1], Message::user("hi"));
}

#[tokio::test]
async fn decision_hands_off_to_the_named_arm() {
    let bus = EventBus::new(16);
    let log = Arc::new(Mutex::new(Vec::new()));
    let client = Arc::new(ScriptedClient::new(["billing"]));
    let node = DecisionNode::new(client)
        .arm(
            "billing",
            "invoices and payments",
            Arc::new(RecordingNode::new("billing", log.clone())),
        )
        .arm(
            "support",
            "technical problems",
            Arc::new(RecordingNode::new("support", log.clone())),
        );

    let out = node
        .invoke(
            NodeInput::Single(Message::user("my invoice is wrong")),
            invoke_ctx(&bus),
        )
        .await
        .expect("decision ok");

    assert_eq!(*log.lock(), vec!["billing"]);
    assert!(out.content.ends_with("billing"));
}

#[tokio::test]
async fn decision_falls_back_to_the_default_arm() {
    let bus = EventBus::new(16);
    let log = Arc::new(Mutex::new(Vec::new()));
    let client = Arc::new(ScriptedClient::new(["no idea, sorry"]));
    let node = DecisionNode::new(client)
        .arm(
            "billing",
            "invoices and payments",
            Arc::new(RecordingNode::new("billing", log.clone())),
        )
        .arm(
            "support",
            "technical problems",
            Arc::new(RecordingNode::new("support", log.clone())),
        )
        .with_default("support");

    node.invoke(
        NodeInput::Single(Message::user("hmm")),
        invoke_ctx(&bus),
    )
    .await
    .expect("decision ok");

    assert_eq!(*log.lock(), vec!["support"]);
}

#[tokio::test]
async fn decision_without_arms_is_a_validation_error() {
    let bus = EventBus::new(16);
    let client = Arc::new(ScriptedClient::new([]));
    let node = DecisionNode::new(client);

    let err = node
        .invoke(NodeInput::Single(Message::user("hi")), invoke_ctx(&bus))
        .await
        .unwrap_err();
    assert!(matches!(err, NodeError::ValidationFailed(_)));
}

#[tokio::test]
async fn collector_combines_in_arrival_order() {
    let bus = EventBus::new(16);
    let node = CollectorNode::joining_with(" | ");

    let out = node
        .invoke(
            NodeInput::Joined(vec![
                Message::assistant("first"),
                Message::assistant("second"),
                Message::assistant("third"),
            ]),
            invoke_ctx(&bus),
        )
        .await
        .expect("collector ok");
    assert_eq!(out.content, "first | second | third");
}

#[tokio::test]
async fn collector_treats_single_input_as_batch_of_one() {
    let bus = EventBus::new(16);
    let node = CollectorNode::joining_with(" | ");

    let out = node
        .invoke(
            NodeInput::Single(Message::assistant("alone")),
            invoke_ctx(&bus),
        )
        .await
        .expect("collector ok");
    assert_eq!(out.content, "alone");
}
