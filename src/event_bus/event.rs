use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Scope label attached to the diagnostic emitted when a run finishes,
/// errors, or is cancelled. Stream consumers can treat it as end-of-run.
pub const RUN_END_SCOPE: &str = "__heddle_run_end__";

/// A progress event emitted during workflow execution.
///
/// Events are tagged with enough metadata to be multiplexed onto one
/// channel and demultiplexed by consumers: node events carry
/// `(run_id, node_id, step)`, stream events carry `(run_id, node_id)` plus
/// a finality marker, diagnostics carry only a scope.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Event {
    /// Node-scoped progress message.
    Node(NodeEvent),
    /// Engine-level diagnostic (run lifecycle, routing warnings).
    Diagnostic(DiagnosticEvent),
    /// Model-call streaming delta republished by an agent node.
    Stream(StreamEvent),
}

impl Event {
    /// Builds a node-scoped progress event.
    pub fn node(
        run_id: impl Into<String>,
        node_id: impl Into<String>,
        step: u64,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Event::Node(NodeEvent {
            run_id: run_id.into(),
            node_id: node_id.into(),
            step,
            scope: scope.into(),
            message: message.into(),
        })
    }

    /// Builds an engine-level diagnostic event.
    pub fn diagnostic(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Event::Diagnostic(DiagnosticEvent {
            scope: scope.into(),
            message: message.into(),
        })
    }

    /// Builds a non-final streaming delta.
    pub fn stream_delta(
        run_id: impl Into<String>,
        node_id: impl Into<String>,
        chunk: impl Into<String>,
    ) -> Self {
        Event::Stream(StreamEvent::new(run_id, node_id, chunk, false))
    }

    /// Builds the final streaming chunk for a model call.
    pub fn stream_final(
        run_id: impl Into<String>,
        node_id: impl Into<String>,
        chunk: impl Into<String>,
    ) -> Self {
        Event::Stream(StreamEvent::new(run_id, node_id, chunk, true))
    }

    /// The scope label of this event, when it has one.
    #[must_use]
    pub fn scope_label(&self) -> Option<&str> {
        match self {
            Event::Node(node) => Some(&node.scope),
            Event::Diagnostic(diag) => Some(&diag.scope),
            Event::Stream(_) => None,
        }
    }

    /// The human-readable payload of this event.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Event::Node(node) => &node.message,
            Event::Diagnostic(diag) => &diag.message,
            Event::Stream(stream) => &stream.chunk,
        }
    }

    /// The node id this event is tagged with, when any.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        match self {
            Event::Node(node) => Some(&node.node_id),
            Event::Stream(stream) => Some(&stream.node_id),
            Event::Diagnostic(_) => None,
        }
    }

    /// The run id this event is tagged with, when any.
    #[must_use]
    pub fn run_id(&self) -> Option<&str> {
        match self {
            Event::Node(node) => Some(&node.run_id),
            Event::Stream(stream) => Some(&stream.run_id),
            Event::Diagnostic(_) => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Event::Node(node) => write!(
                f,
                "[{}@{} {}] {}",
                node.node_id, node.step, node.scope, node.message
            ),
            Event::Diagnostic(diag) => write!(f, "[{}] {}", diag.scope, diag.message),
            Event::Stream(stream) => {
                if stream.is_final {
                    write!(f, "[{} stream end] {}", stream.node_id, stream.chunk)
                } else {
                    write!(f, "[{} stream] {}", stream.node_id, stream.chunk)
                }
            }
        }
    }
}

/// Progress message emitted by a node through its context.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct NodeEvent {
    pub run_id: String,
    pub node_id: String,
    pub step: u64,
    pub scope: String,
    pub message: String,
}

/// Engine-level diagnostic with no node attribution.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub scope: String,
    pub message: String,
}

/// A streaming delta from a model-call collaborator, republished onto the
/// run's channel by the agent node that owns the call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct StreamEvent {
    pub run_id: String,
    pub node_id: String,
    pub chunk: String,
    pub is_final: bool,
    pub timestamp: DateTime<Utc>,
}

impl StreamEvent {
    fn new(
        run_id: impl Into<String>,
        node_id: impl Into<String>,
        chunk: impl Into<String>,
        is_final: bool,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            node_id: node_id.into(),
            chunk: chunk.into(),
            is_final,
            timestamp: Utc::now(),
        }
    }
}
