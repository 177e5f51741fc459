//! Runtime layer: configuration and the session façade.
//!
//! The split mirrors the rest of the crate: [`Workflow`](crate::workflow::Workflow)
//! is the graph structure, [`Session`] is the long-lived runtime
//! environment around it (history, properties, event bus, cancellation).

pub mod config;
pub mod session;

pub use config::{DEFAULT_MAX_STEPS, RuntimeConfig, SinkConfig};
pub use session::{CancelHandle, Session, SessionError};
