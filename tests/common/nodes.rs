use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::json;

use heddle::context::NodeContext;
use heddle::message::Message;
use heddle::node::{InputArity, Node, NodeError, NodeInput};

/// Echoes the inbound content back as an assistant message.
#[derive(Debug, Clone)]
pub struct EchoNode;

#[async_trait]
impl Node for EchoNode {
    async fn invoke(&self, input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        let msg = input.first().ok_or(NodeError::MissingInput {
            what: "inbound message",
        })?;
        Ok(Message::assistant(&msg.content))
    }
}

/// Appends its label to the content and records the invocation, so tests
/// can assert both the composed value and the invocation order.
#[derive(Clone)]
pub struct RecordingNode {
    pub label: &'static str,
    pub log: Arc<Mutex<Vec<String>>>,
}

impl RecordingNode {
    pub fn new(label: &'static str, log: Arc<Mutex<Vec<String>>>) -> Self {
        Self { label, log }
    }
}

#[async_trait]
impl Node for RecordingNode {
    async fn invoke(&self, input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        let msg = input.first().ok_or(NodeError::MissingInput {
            what: "inbound message",
        })?;
        self.log.lock().push(self.label.to_string());
        Ok(Message::assistant(&format!("{} {}", msg.content, self.label)))
    }
}

/// Always fails; used to drive error-propagation paths.
#[derive(Debug, Clone, Default)]
pub struct FailingNode;

#[async_trait]
impl Node for FailingNode {
    async fn invoke(&self, _input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        Err(NodeError::MissingInput { what: "test_key" })
    }
}

/// Counts invocations and passes the message through.
#[derive(Clone, Default)]
pub struct CountingNode {
    pub hits: Arc<AtomicUsize>,
}

#[async_trait]
impl Node for CountingNode {
    async fn invoke(&self, input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let msg = input.first().ok_or(NodeError::MissingInput {
            what: "inbound message",
        })?;
        Ok(msg.clone())
    }
}

/// Echoes after a delay; tags its output so completion order is visible.
#[derive(Debug, Clone)]
pub struct SlowEchoNode {
    pub delay: Duration,
    pub tag: &'static str,
}

#[async_trait]
impl Node for SlowEchoNode {
    async fn invoke(&self, _input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        tokio::time::sleep(self.delay).await;
        Ok(Message::assistant(self.tag))
    }
}

/// Sleeps, then records a property marker — unless the run's cancellation
/// token fires first, in which case it stops without the side effect.
#[derive(Debug, Clone)]
pub struct CancelAwareNode {
    pub delay: Duration,
    pub marker: &'static str,
}

#[async_trait]
impl Node for CancelAwareNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        tokio::select! {
            _ = ctx.cancellation().cancelled() => {
                Ok(Message::assistant("stopped"))
            }
            _ = tokio::time::sleep(self.delay) => {
                ctx.properties().put(self.marker, json!(true));
                let msg = input.first().ok_or(NodeError::MissingInput {
                    what: "inbound message",
                })?;
                Ok(msg.clone())
            }
        }
    }
}

/// Writes a fixed property and passes the message through.
#[derive(Clone)]
pub struct PropertyWriteNode {
    pub key: &'static str,
    pub value: serde_json::Value,
}

#[async_trait]
impl Node for PropertyWriteNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        ctx.properties().put(self.key, self.value.clone());
        let msg = input.first().ok_or(NodeError::MissingInput {
            what: "inbound message",
        })?;
        Ok(msg.clone())
    }
}

/// Atomically increments a counter property and passes through.
#[derive(Debug, Clone)]
pub struct CounterPropertyNode {
    pub key: &'static str,
}

#[async_trait]
impl Node for CounterPropertyNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        ctx.properties().update(self.key, |cur| {
            json!(cur.and_then(|v| v.as_i64()).unwrap_or(0) + 1)
        });
        let msg = input.first().ok_or(NodeError::MissingInput {
            what: "inbound message",
        })?;
        Ok(msg.clone())
    }
}

/// Batch-capable join target that counts barrier releases and joins the
/// branch contents with `+`.
#[derive(Clone, Default)]
pub struct JoinProbeNode {
    pub hits: Arc<AtomicUsize>,
}

#[async_trait]
impl Node for JoinProbeNode {
    async fn invoke(&self, input: NodeInput, _ctx: NodeContext) -> Result<Message, NodeError> {
        self.hits.fetch_add(1, Ordering::SeqCst);
        let joined = input
            .into_messages()
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("+");
        Ok(Message::assistant(&joined))
    }

    fn input_arity(&self) -> InputArity {
        InputArity::Batch
    }
}

/// Emits one progress event and echoes.
#[derive(Debug, Clone)]
pub struct EmittingNode;

#[async_trait]
impl Node for EmittingNode {
    async fn invoke(&self, input: NodeInput, ctx: NodeContext) -> Result<Message, NodeError> {
        ctx.emit("work", "processing input")?;
        let msg = input.first().ok_or(NodeError::MissingInput {
            what: "inbound message",
        })?;
        Ok(Message::assistant(&msg.content))
    }
}
