//! The node contract: one typed unit of work in a workflow graph.
//!
//! A [`Node`] consumes its input (a single message, or an arrival-ordered
//! batch at a join barrier) together with a [`NodeContext`], and produces
//! one output message asynchronously. Behaviors are plain strategy objects
//! — agent calls, pure transforms, content guards, decision steps all
//! implement the same trait, and the scheduler never needs to know which
//! is which.

use async_trait::async_trait;
use miette::Diagnostic;
use thiserror::Error;

use crate::context::NodeContext;
use crate::event_bus::EmitterError;
use crate::message::Message;
use crate::providers::ProviderError;

/// Declared input shape of a node behavior, checked at graph-build time.
///
/// Join-marked nodes receive [`NodeInput::Joined`]; everything else
/// receives [`NodeInput::Single`]. A behavior that only handles one shape
/// declares it so that mis-wiring is a build error, not a runtime surprise.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputArity {
    /// Exactly one inbound message per invocation.
    Single,
    /// An arrival-ordered batch released by a join barrier.
    Batch,
    /// Either shape is acceptable.
    Any,
}

/// Input delivered to a node invocation.
#[derive(Clone, Debug)]
pub enum NodeInput {
    /// Output of a single upstream node (or the run's initial message).
    Single(Message),
    /// Buffered outputs of all expected inbound branches, in the order the
    /// branches completed. Order is not stable across runs.
    Joined(Vec<Message>),
}

impl NodeInput {
    /// The single inbound message, if this is not a join batch.
    #[must_use]
    pub fn as_single(&self) -> Option<&Message> {
        match self {
            NodeInput::Single(msg) => Some(msg),
            NodeInput::Joined(_) => None,
        }
    }

    /// First message regardless of shape.
    #[must_use]
    pub fn first(&self) -> Option<&Message> {
        match self {
            NodeInput::Single(msg) => Some(msg),
            NodeInput::Joined(msgs) => msgs.first(),
        }
    }

    /// Number of inbound messages.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            NodeInput::Single(_) => 1,
            NodeInput::Joined(msgs) => msgs.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Consume the input into a flat message list.
    #[must_use]
    pub fn into_messages(self) -> Vec<Message> {
        match self {
            NodeInput::Single(msg) => vec![msg],
            NodeInput::Joined(msgs) => msgs,
        }
    }
}

/// Core trait defining executable workflow nodes.
///
/// # Constraints
///
/// - Must be safe to invoke concurrently with *other* nodes of the same
///   run; reentrancy with itself is only required when the graph routes a
///   cycle through it.
/// - Side effects are confined to the context: atomic property updates and
///   event emission. Anything else belongs behind a collaborator trait.
/// - An error aborts this branch only; whether the run survives is the
///   scheduler's decision, not the node's.
///
/// # Examples
///
/// ```
/// use heddle::node::{Node, NodeError, NodeInput};
/// use heddle::context::NodeContext;
/// use heddle::message::Message;
/// use async_trait::async_trait;
///
/// struct Shout;
///
/// #[async_trait]
/// impl Node for Shout {
///     async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
///         let msg = input.as_single().ok_or(NodeError::MissingInput { what: "single message" })?;
///         ctx.emit("shout", "raising voice")?;
///         Ok(Message::assistant(&msg.content.to_uppercase()))
///     }
/// }
/// ```
#[async_trait]
pub trait Node: Send + Sync {
    /// Execute this node against its inbound message(s).
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError>;

    /// Declared input shape, validated against join markings at build time.
    fn input_arity(&self) -> InputArity {
        InputArity::Single
    }
}

/// Errors that abort a node's branch.
#[derive(Debug, Error, Diagnostic)]
pub enum NodeError {
    /// Expected input data is missing or has the wrong shape.
    #[error("missing expected input: {what}")]
    #[diagnostic(
        code(heddle::node::missing_input),
        help("Check that the upstream node produced the required data.")
    )]
    MissingInput { what: &'static str },

    /// A collaborator call failed.
    #[error(transparent)]
    #[diagnostic(code(heddle::node::provider))]
    Provider(#[from] ProviderError),

    /// A guard classified the content as disallowed; the branch ends here.
    #[error("content rejected: {reason}")]
    #[diagnostic(code(heddle::node::rejected))]
    Rejected { reason: String },

    /// JSON serialization/deserialization error.
    #[error(transparent)]
    #[diagnostic(code(heddle::node::serde_json))]
    Serde(#[from] serde_json::Error),

    /// Input validation failed.
    #[error("validation failed: {0}")]
    #[diagnostic(
        code(heddle::node::validation),
        help("Check input data format and required fields.")
    )]
    ValidationFailed(String),

    /// Event channel communication error.
    #[error("event channel error: {0}")]
    #[diagnostic(code(heddle::node::event_channel))]
    EventChannel(#[from] EmitterError),
}
