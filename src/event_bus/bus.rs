use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::{sync::oneshot, task};

use super::emitter::EventEmitter;
use super::event::Event;
use super::sink::{ChannelSink, EventSink, StdOutSink};

/// Default capacity of the bounded event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Receives events from workflow nodes and broadcasts them to sinks.
///
/// The bus owns a **bounded** channel: producers emit without blocking and
/// events are dropped (and counted) when consumers fall behind, so a slow
/// sink can never stall a run. A background listener task drains the
/// channel and fans each event out to every registered [`EventSink`].
pub struct EventBus {
    sinks: Arc<Mutex<Vec<Box<dyn EventSink>>>>,
    event_channel: (flume::Sender<Event>, flume::Receiver<Event>),
    dropped: Arc<AtomicUsize>,
    listener: Arc<Mutex<Option<ListenerState>>>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::with_sink(DEFAULT_EVENT_CAPACITY, StdOutSink::default())
    }
}

impl EventBus {
    /// Create an EventBus with no sinks attached.
    pub fn new(capacity: usize) -> Self {
        Self::with_sinks(capacity, Vec::new())
    }

    /// Create an EventBus with a single sink.
    pub fn with_sink<T>(capacity: usize, sink: T) -> Self
    where
        T: EventSink + 'static,
    {
        Self::with_sinks(capacity, vec![Box::new(sink)])
    }

    /// Create an EventBus with multiple sinks.
    pub fn with_sinks(capacity: usize, sinks: Vec<Box<dyn EventSink>>) -> Self {
        Self {
            sinks: Arc::new(Mutex::new(sinks)),
            event_channel: flume::bounded(capacity.max(1)),
            dropped: Arc::new(AtomicUsize::new(0)),
            listener: Arc::new(Mutex::new(None)),
        }
    }

    /// Dynamically add a sink (useful for per-request streaming).
    pub fn add_sink<T: EventSink + 'static>(&self, sink: T) {
        self.sinks.lock().push(Box::new(sink));
    }

    /// Add an already-boxed sink.
    pub fn add_boxed_sink(&self, sink: Box<dyn EventSink>) {
        self.sinks.lock().push(sink);
    }

    /// Get an emitter handle so producers can publish events.
    pub fn emitter(&self) -> EventEmitter {
        EventEmitter::new(self.event_channel.0.clone(), self.dropped.clone())
    }

    /// Subscribe to the event feed.
    ///
    /// Registers an internal channel sink and returns its receiving end.
    /// Only events published after the subscription are observed.
    pub fn subscribe(&self) -> flume::Receiver<Event> {
        let (tx, rx) = flume::unbounded();
        self.add_sink(ChannelSink::new(tx));
        rx
    }

    /// Number of events dropped so far because the channel was full.
    #[must_use]
    pub fn dropped_events(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Spawn a background task that drains the channel into all sinks.
    /// Idempotent: calling multiple times has no effect.
    pub fn listen_for_events(&self) {
        let mut guard = self.listener.lock();
        if guard.is_some() {
            return; // Already listening
        }

        let receiver = self.event_channel.1.clone();
        let sinks = self.sinks.clone();
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel();

        let handle = task::spawn(async move {
            loop {
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    recv = receiver.recv_async() => match recv {
                        Err(_) => break,
                        Ok(event) => {
                            let mut sinks_guard = sinks.lock();
                            for sink in sinks_guard.iter_mut() {
                                if let Err(e) = sink.handle(&event) {
                                    tracing::debug!(error = %e, "event sink error");
                                }
                            }
                        }
                    }
                }
            }
        });

        *guard = Some(ListenerState {
            shutdown_tx,
            handle,
        });
    }

    /// Stop the background listener task, draining nothing further.
    pub async fn stop_listener(&self) {
        let state = { self.listener.lock().take() };
        if let Some(state) = state {
            let _ = state.shutdown_tx.send(());
            let _ = state.handle.await;
        }
    }
}

impl Drop for EventBus {
    fn drop(&mut self) {
        if let Some(state) = self.listener.lock().take() {
            let _ = state.shutdown_tx.send(());
            state.handle.abort();
        }
    }
}

struct ListenerState {
    shutdown_tx: oneshot::Sender<()>,
    handle: task::JoinHandle<()>,
}
