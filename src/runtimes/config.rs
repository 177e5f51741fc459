//! Runtime configuration for compiled workflows.

use crate::event_bus::{DEFAULT_EVENT_CAPACITY, EventBus, MemorySink, StdOutSink};

/// Default bound on scheduler steps per run.
///
/// Cycles are legal (handoff loops route back to earlier nodes), unbounded
/// ones are not; the limit converts a runaway loop into a diagnosable
/// error. Override per workflow or via the `HEDDLE_MAX_STEPS` environment
/// variable.
pub const DEFAULT_MAX_STEPS: u64 = 64;

/// Execution parameters carried by a compiled workflow.
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    /// Upper bound on scheduler steps per run.
    pub max_steps: u64,
    /// Maximum node invocations in flight per step.
    pub concurrency_limit: usize,
    /// Capacity of the bounded event channel.
    pub event_capacity: usize,
    /// Sinks attached to the event bus built for each session/run.
    pub sinks: Vec<SinkConfig>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_steps: resolve_max_steps(),
            concurrency_limit: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            event_capacity: DEFAULT_EVENT_CAPACITY,
            sinks: vec![SinkConfig::StdOut],
        }
    }
}

fn resolve_max_steps() -> u64 {
    dotenvy::dotenv().ok();
    std::env::var("HEDDLE_MAX_STEPS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_MAX_STEPS)
}

/// Declarative sink selection, resolved when the event bus is built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SinkConfig {
    StdOut,
    Memory,
}

impl RuntimeConfig {
    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn with_concurrency_limit(mut self, limit: usize) -> Self {
        self.concurrency_limit = limit.max(1);
        self
    }

    #[must_use]
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity.max(1);
        self
    }

    #[must_use]
    pub fn with_sinks(mut self, sinks: Vec<SinkConfig>) -> Self {
        self.sinks = sinks;
        self
    }

    /// Drop all configured sinks; events remain observable via
    /// [`EventBus::subscribe`].
    #[must_use]
    pub fn without_sinks(mut self) -> Self {
        self.sinks.clear();
        self
    }

    /// Build an event bus according to this configuration.
    #[must_use]
    pub fn build_event_bus(&self) -> EventBus {
        let bus = EventBus::new(self.event_capacity);
        for sink in &self.sinks {
            match sink {
                SinkConfig::StdOut => bus.add_sink(StdOutSink::default()),
                SinkConfig::Memory => bus.add_sink(MemorySink::new()),
            }
        }
        bus
    }
}
