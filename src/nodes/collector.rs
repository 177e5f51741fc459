use std::sync::Arc;

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::message::Message;
use crate::node::{InputArity, Node, NodeError, NodeInput};

/// Combines a join barrier's buffered branch outputs into one message.
///
/// Registered on a join-marked node, it runs exactly once per barrier
/// release with the batch in arrival order. A `Single` input is treated as
/// a batch of one, which keeps a join with a single expected inbound edge
/// legal.
pub struct CollectorNode {
    combine: Arc<dyn Fn(Vec<Message>) -> Message + Send + Sync>,
}

impl CollectorNode {
    /// Combine with an arbitrary closure over the arrival-ordered batch.
    pub fn new<F>(combine: F) -> Self
    where
        F: Fn(Vec<Message>) -> Message + Send + Sync + 'static,
    {
        Self {
            combine: Arc::new(combine),
        }
    }

    /// Convenience combiner: join every branch's content with `separator`
    /// into a single assistant message.
    pub fn joining_with(separator: &str) -> Self {
        let separator = separator.to_string();
        Self::new(move |messages| {
            let joined = messages
                .iter()
                .map(|m| m.content.as_str())
                .collect::<Vec<_>>()
                .join(&separator);
            Message::assistant(&joined)
        })
    }
}

#[async_trait]
impl Node for CollectorNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        let batch = input.into_messages();
        ctx.emit("collect", format!("combining {} branch outputs", batch.len()))?;
        Ok((self.combine)(batch))
    }

    fn input_arity(&self) -> InputArity {
        InputArity::Batch
    }
}
