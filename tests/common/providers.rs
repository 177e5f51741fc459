use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use heddle::event_bus::ProgressSender;
use heddle::message::Message;
use heddle::providers::{ChatClient, Moderator, ProviderError, Verdict};

/// Chat collaborator returning scripted replies in order; echoes the last
/// inbound message when the script runs dry. Optionally publishes progress
/// deltas before the final reply.
#[derive(Clone, Default)]
pub struct ScriptedClient {
    replies: Arc<Mutex<VecDeque<String>>>,
    with_deltas: bool,
}

impl ScriptedClient {
    pub fn new(replies: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(
                replies.into_iter().map(str::to_string).collect(),
            )),
            with_deltas: false,
        }
    }

    pub fn streaming(replies: impl IntoIterator<Item = &'static str>) -> Self {
        let mut client = Self::new(replies);
        client.with_deltas = true;
        client
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        cancel: CancellationToken,
        progress: ProgressSender,
    ) -> Result<Message, ProviderError> {
        if cancel.is_cancelled() {
            return Err(ProviderError::Cancelled);
        }
        let reply = self.replies.lock().pop_front().unwrap_or_else(|| {
            messages
                .last()
                .map(|m| format!("reply to: {}", m.content))
                .unwrap_or_else(|| "empty".to_string())
        });
        if self.with_deltas {
            let _ = progress.delta(&reply[..reply.len() / 2]);
            let _ = progress.finish(&reply);
        }
        Ok(Message::assistant(&reply))
    }
}

/// Records every message list it was called with, replying "ok".
#[derive(Clone, Default)]
pub struct InspectingClient {
    pub seen: Arc<Mutex<Vec<Vec<Message>>>>,
}

#[async_trait]
impl ChatClient for InspectingClient {
    async fn complete(
        &self,
        messages: Vec<Message>,
        _cancel: CancellationToken,
        _progress: ProgressSender,
    ) -> Result<Message, ProviderError> {
        self.seen.lock().push(messages);
        Ok(Message::assistant("ok"))
    }
}

/// Flags any text containing the configured needle.
#[derive(Debug, Clone)]
pub struct KeywordModerator {
    pub needle: &'static str,
}

#[async_trait]
impl Moderator for KeywordModerator {
    async fn classify(&self, text: &str) -> Result<Verdict, ProviderError> {
        Ok(Verdict {
            flagged: text.contains(self.needle),
        })
    }
}
