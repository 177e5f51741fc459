use std::sync::Arc;

use async_trait::async_trait;

use crate::context::NodeContext;
use crate::message::Message;
use crate::node::{Node, NodeError, NodeInput};
use crate::providers::ChatClient;

/// One candidate behavior a [`DecisionNode`] may hand off to.
pub struct DecisionArm {
    name: String,
    description: String,
    behavior: Arc<dyn Node>,
}

impl DecisionArm {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        behavior: Arc<dyn Node>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            behavior,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Intra-node dynamic dispatch (the handoff pattern).
///
/// At invocation time the node issues its own model sub-call to choose one
/// of several named arms, then executes the chosen arm's behavior and
/// returns its result. This changes a node's effective behavior between
/// invocations without changing graph topology — distinct from the
/// inter-node branching performed by advancers.
///
/// If the sub-call's reply names no arm, the designated default arm runs
/// (the first arm when none was designated).
pub struct DecisionNode {
    client: Arc<dyn ChatClient>,
    arms: Vec<DecisionArm>,
    default_arm: Option<String>,
}

impl DecisionNode {
    pub fn new(client: Arc<dyn ChatClient>) -> Self {
        Self {
            client,
            arms: Vec::new(),
            default_arm: None,
        }
    }

    /// Register a candidate arm. Order matters only for the implicit
    /// default (first arm).
    #[must_use]
    pub fn arm(
        mut self,
        name: impl Into<String>,
        description: impl Into<String>,
        behavior: Arc<dyn Node>,
    ) -> Self {
        self.arms.push(DecisionArm::new(name, description, behavior));
        self
    }

    /// Designate the arm that runs when the choice cannot be resolved.
    #[must_use]
    pub fn with_default(mut self, name: impl Into<String>) -> Self {
        self.default_arm = Some(name.into());
        self
    }

    fn choice_prompt(&self, input: &Message) -> Message {
        let mut text = String::from(
            "Pick exactly one handler for the request below. \
             Reply with the handler name only.\n\nHandlers:\n",
        );
        for arm in &self.arms {
            text.push_str(&format!("- {}: {}\n", arm.name, arm.description));
        }
        text.push_str(&format!("\nRequest: {}", input.content));
        Message::system(&text)
    }

    fn resolve_arm(&self, reply: &str) -> Option<&DecisionArm> {
        let reply = reply.trim().to_lowercase();
        // Exact name first, then containment, then the default.
        self.arms
            .iter()
            .find(|arm| arm.name.to_lowercase() == reply)
            .or_else(|| {
                self.arms
                    .iter()
                    .find(|arm| reply.contains(&arm.name.to_lowercase()))
            })
            .or_else(|| match &self.default_arm {
                Some(name) => self.arms.iter().find(|arm| &arm.name == name),
                None => self.arms.first(),
            })
    }
}

#[async_trait]
impl Node for DecisionNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        let message = input.as_single().ok_or(NodeError::MissingInput {
            what: "single message",
        })?;
        if self.arms.is_empty() {
            return Err(NodeError::ValidationFailed(
                "decision node has no arms".to_string(),
            ));
        }

        let prompt = vec![self.choice_prompt(message), message.clone()];
        let reply = self
            .client
            .complete(prompt, ctx.cancellation().clone(), ctx.progress())
            .await?;

        let arm = self
            .resolve_arm(&reply.content)
            .ok_or_else(|| NodeError::ValidationFailed("no arm resolved".to_string()))?;
        ctx.emit("decision", format!("handing off to '{}'", arm.name))?;
        tracing::debug!(node = %ctx.node_id(), arm = %arm.name, "decision resolved");

        arm.behavior.invoke(input, ctx).await
    }
}
