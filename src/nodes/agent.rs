use std::sync::Arc;

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::message::Message;
use crate::node::{InputArity, Node, NodeError, NodeInput};
use crate::providers::ChatClient;

/// Delegates to a remote model-call collaborator.
///
/// The run's cancellation token is forwarded into the call, and the
/// collaborator's progress deltas are published on the run's event channel
/// already tagged with this node's id (via the [`ProgressSender`]
/// derived from the node context).
///
/// [`ProgressSender`]: crate::event_bus::ProgressSender
pub struct AgentNode {
    client: Arc<dyn ChatClient>,
    system_prompt: Option<String>,
}

impl AgentNode {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            system_prompt: None,
        }
    }

    /// Prepend a system prompt to every call this node issues.
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }
}

#[async_trait]
impl Node for AgentNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        let mut messages = Vec::with_capacity(input.len() + 1);
        if let Some(prompt) = &self.system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend(input.into_messages());

        ctx.emit("agent", "dispatching model call")?;
        let reply = self
            .client
            .complete(messages, ctx.cancellation().clone(), ctx.progress())
            .await?;
        Ok(reply)
    }

    fn input_arity(&self) -> InputArity {
        InputArity::Any
    }
}
