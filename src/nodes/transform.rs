use std::sync::Arc;

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::message::Message;
use crate::node::{InputArity, Node, NodeError, NodeInput};

/// A pure transformation step: no external call, no suspension beyond the
/// scheduler's own.
///
/// # Examples
///
/// ```
/// use heddle::nodes::TransformNode;
/// use heddle::message::Message;
///
/// let upper = TransformNode::map(|msg| Message::assistant(&msg.content.to_uppercase()));
/// ```
pub struct TransformNode {
    f: Arc<dyn Fn(NodeInput) -> Result<Message, NodeError> + Send + Sync>,
}

impl TransformNode {
    /// Wrap a fallible transformation over the raw input.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(NodeInput) -> Result<Message, NodeError> + Send + Sync + 'static,
    {
        Self { f: Arc::new(f) }
    }

    /// Wrap an infallible message-to-message mapping. Join batches are
    /// rejected with [`NodeError::MissingInput`].
    pub fn map<F>(f: F) -> Self
    where
        F: Fn(&Message) -> Message + Send + Sync + 'static,
    {
        Self::new(move |input| {
            let msg = input.as_single().ok_or(NodeError::MissingInput {
                what: "single message",
            })?;
            Ok(f(msg))
        })
    }
}

#[async_trait]
impl Node for TransformNode {
    async fn invoke(&self, input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        (self.f)(input)
    }

    fn input_arity(&self) -> InputArity {
        InputArity::Any
    }
}
