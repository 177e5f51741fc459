#![allow(dead_code)]

pub mod nodes;
pub mod providers;

use heddle::context::{PropertyStore, RunContext};
use heddle::event_bus::{Event, EventBus, RUN_END_SCOPE};
use heddle::runtimes::RuntimeConfig;
use tokio_util::sync::CancellationToken;

/// Runtime config for tests: no stdout sink noise, small fixed limits.
pub fn test_config() -> RuntimeConfig {
    init_tracing();
    RuntimeConfig::default()
        .without_sinks()
        .with_concurrency_limit(4)
}

/// Install the crate's telemetry stack once per test binary, honoring
/// `RUST_LOG` for debugging noisy failures.
pub fn init_tracing() {
    heddle::telemetry::init();
}

/// A fresh run context wired to the given bus.
pub fn run_context(bus: &EventBus) -> RunContext {
    RunContext::new(
        "run-test",
        CancellationToken::new(),
        PropertyStore::new(),
        bus.emitter(),
    )
}

/// A run context whose token is already cancelled.
pub fn cancelled_context(bus: &EventBus) -> RunContext {
    let token = CancellationToken::new();
    token.cancel();
    RunContext::new("run-test", token, PropertyStore::new(), bus.emitter())
}

/// Drain a subscription until the run-end diagnostic arrives (or time out),
/// returning everything observed including the terminator.
pub async fn drain_until_run_end(rx: &flume::Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        let next = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            rx.recv_async(),
        )
        .await;
        match next {
            Ok(Ok(event)) => {
                let is_end = event.scope_label() == Some(RUN_END_SCOPE);
                events.push(event);
                if is_end {
                    return events;
                }
            }
            _ => return events,
        }
    }
}
