use std::io::{self, Result as IoResult, Stdout, Write};
use std::sync::Arc;

use parking_lot::Mutex;

use super::event::Event;

/// Abstraction over an output target that consumes full Event objects.
pub trait EventSink: Sync + Send {
    /// Handle a structured event. Sink decides how to serialize/format it.
    fn handle(&mut self, event: &Event) -> IoResult<()>;
}

/// Stdout sink writing one display-formatted line per event.
pub struct StdOutSink {
    handle: Stdout,
}

impl Default for StdOutSink {
    fn default() -> Self {
        Self {
            handle: io::stdout(),
        }
    }
}

impl EventSink for StdOutSink {
    fn handle(&mut self, event: &Event) -> IoResult<()> {
        writeln!(self.handle, "{event}")?;
        self.handle.flush()
    }
}

/// In-memory sink for testing and snapshots.
#[derive(Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Event>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a snapshot of all captured events.
    pub fn snapshot(&self) -> Vec<Event> {
        self.entries.lock().clone()
    }

    /// Clear all captured events.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl EventSink for MemorySink {
    fn handle(&mut self, event: &Event) -> IoResult<()> {
        self.entries.lock().push(event.clone());
        Ok(())
    }
}

/// Channel-based sink for streaming to async consumers (e.g., web clients).
///
/// Forwarding never blocks the listener: a full bounded receiver drops the
/// event with an error the bus logs and moves past.
pub struct ChannelSink {
    tx: flume::Sender<Event>,
}

impl ChannelSink {
    pub fn new(tx: flume::Sender<Event>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelSink {
    fn handle(&mut self, event: &Event) -> IoResult<()> {
        self.tx
            .try_send(event.clone())
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "event subscriber unavailable"))
    }
}
