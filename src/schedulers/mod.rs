//! Frontier-driven concurrent execution of compiled workflows.

pub mod scheduler;

pub use scheduler::{RunOutcome, RunReport, Scheduler, SchedulerError};
