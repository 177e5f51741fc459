//! Collaborator contracts consumed by built-in node behaviors.
//!
//! The engine never talks to a model vendor directly: agent and decision
//! nodes call a [`ChatClient`], guard nodes call a [`Moderator`], and
//! sessions can persist history through a [`ConversationStore`]. Transport
//! concerns — request shaping, retries, streaming wire formats — live
//! entirely behind these traits.

use std::sync::Arc;

use async_trait::async_trait;
use miette::Diagnostic;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::event_bus::ProgressSender;
use crate::message::Message;

/// Errors surfaced by collaborator calls.
///
/// Retries for transient failures are the collaborator's responsibility;
/// whatever error reaches the engine is final for that branch.
#[derive(Debug, Error, Diagnostic)]
pub enum ProviderError {
    /// The underlying call failed.
    #[error("provider call failed ({provider}): {message}")]
    #[diagnostic(code(heddle::provider::call))]
    Call {
        provider: &'static str,
        message: String,
    },

    /// The call observed the run's cancellation signal and stopped.
    #[error("provider call cancelled")]
    #[diagnostic(code(heddle::provider::cancelled))]
    Cancelled,

    /// The collaborator produced a response the caller could not use.
    #[error("malformed provider response: {0}")]
    #[diagnostic(code(heddle::provider::malformed))]
    Malformed(String),

    /// No conversation is stored under the requested key.
    #[error("unknown conversation key: {0}")]
    #[diagnostic(code(heddle::provider::unknown_key))]
    UnknownKey(String),
}

/// Classification verdict returned by a [`Moderator`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    /// Whether the classified text was flagged.
    pub flagged: bool,
}

/// A remote model-call collaborator.
///
/// `complete` receives the conversation so far, the run's cancellation
/// token (to be observed cooperatively), and a [`ProgressSender`] already
/// tagged with the calling node's identity. Implementations may publish
/// zero or more deltas before returning the final message.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: Vec<Message>,
        cancel: CancellationToken,
        progress: ProgressSender,
    ) -> Result<Message, ProviderError>;
}

/// A content-classification collaborator used by guard nodes.
#[async_trait]
pub trait Moderator: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Verdict, ProviderError>;
}

/// Durable conversation history, keyed by caller-chosen identifiers.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    async fn load(&self, key: &str) -> Result<Vec<Message>, ProviderError>;
    async fn save(&self, key: &str, history: &[Message]) -> Result<(), ProviderError>;
}

/// Volatile [`ConversationStore`] for tests and single-process use.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    conversations: Arc<RwLock<FxHashMap<String, Vec<Message>>>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn load(&self, key: &str) -> Result<Vec<Message>, ProviderError> {
        self.conversations
            .read()
            .get(key)
            .cloned()
            .ok_or_else(|| ProviderError::UnknownKey(key.to_string()))
    }

    async fn save(&self, key: &str, history: &[Message]) -> Result<(), ProviderError> {
        self.conversations
            .write()
            .insert(key.to_string(), history.to_vec());
        Ok(())
    }
}
