use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;

use super::event::Event;

/// Cloneable handle for publishing events onto a run's bounded channel.
///
/// Emission is synchronous and never blocks: when the channel buffer is
/// full the event is dropped and counted rather than stalling the
/// producing node. See [`EventBus::dropped_events`](super::EventBus::dropped_events).
#[derive(Clone, Debug)]
pub struct EventEmitter {
    sender: flume::Sender<Event>,
    dropped: Arc<AtomicUsize>,
}

/// Errors that can occur when emitting an event.
#[derive(Debug, Error)]
pub enum EmitterError {
    #[error("event channel closed")]
    Closed,
}

impl EventEmitter {
    pub(crate) fn new(sender: flume::Sender<Event>, dropped: Arc<AtomicUsize>) -> Self {
        Self { sender, dropped }
    }

    /// Publish an event without blocking.
    ///
    /// A full buffer drops the event (counted, trace-logged); only a
    /// disconnected channel is an error.
    pub fn emit(&self, event: Event) -> Result<(), EmitterError> {
        match self.sender.try_send(event) {
            Ok(()) => Ok(()),
            Err(flume::TrySendError::Full(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("event buffer full; dropping event");
                Ok(())
            }
            Err(flume::TrySendError::Disconnected(_)) => Err(EmitterError::Closed),
        }
    }

    /// Number of events dropped so far because the buffer was full.
    #[must_use]
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Tagged handle handed to model-call collaborators for progress deltas.
///
/// Wraps an [`EventEmitter`] with the identity of the run and node that own
/// the call, so every delta lands on the channel already attributed.
#[derive(Clone, Debug)]
pub struct ProgressSender {
    emitter: EventEmitter,
    run_id: String,
    node_id: String,
}

impl ProgressSender {
    pub fn new(emitter: EventEmitter, run_id: impl Into<String>, node_id: impl Into<String>) -> Self {
        Self {
            emitter,
            run_id: run_id.into(),
            node_id: node_id.into(),
        }
    }

    /// Publish an intermediate chunk of model output.
    pub fn delta(&self, chunk: impl Into<String>) -> Result<(), EmitterError> {
        self.emitter
            .emit(Event::stream_delta(&self.run_id, &self.node_id, chunk))
    }

    /// Publish the final chunk of model output.
    pub fn finish(&self, chunk: impl Into<String>) -> Result<(), EmitterError> {
        self.emitter
            .emit(Event::stream_final(&self.run_id, &self.node_id, chunk))
    }
}
