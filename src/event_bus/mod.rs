//! Bounded, multiplexed progress events for workflow runs.
//!
//! Every run publishes onto one [`EventBus`]: node progress messages,
//! engine diagnostics, and model-call streaming deltas, each tagged with
//! enough identity (`run_id`, `node_id`, step) to demultiplex downstream.
//! Emission never blocks a producing node; see [`EventEmitter`] for the
//! drop-and-count backpressure policy.

pub mod bus;
pub mod emitter;
pub mod event;
pub mod sink;

pub use bus::{DEFAULT_EVENT_CAPACITY, EventBus};
pub use emitter::{EmitterError, EventEmitter, ProgressSender};
pub use event::{DiagnosticEvent, Event, NodeEvent, RUN_END_SCOPE, StreamEvent};
pub use sink::{ChannelSink, EventSink, MemorySink, StdOutSink};
