use std::sync::Arc;

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::message::Message;
use crate::node::{Node, NodeError, NodeInput};
use crate::providers::Moderator;

/// Content filter backed by a classification collaborator.
///
/// On a flagged verdict the branch ends abnormally with
/// [`NodeError::Rejected`]; otherwise the inbound message passes through
/// unchanged.
pub struct GuardNode {
    moderator: Arc<dyn Moderator>,
}

impl GuardNode {
    pub fn new(moderator: Arc<dyn Moderator>) -> Self {
        Self { moderator }
    }
}

#[async_trait]
impl Node for GuardNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        let message = input.as_single().ok_or(NodeError::MissingInput {
            what: "single message",
        })?;

        let verdict = self.moderator.classify(&message.content).await?;
        if verdict.flagged {
            ctx.emit("guard", "content flagged; rejecting branch")?;
            return Err(NodeError::Rejected {
                reason: "content flagged by moderator".to_string(),
            });
        }

        Ok(message.clone())
    }
}
