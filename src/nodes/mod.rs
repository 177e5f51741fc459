//! Built-in node behaviors.
//!
//! Each behavior is a plain [`Node`](crate::node::Node) implementation;
//! there is no hierarchy. New kinds of steps are added by implementing the
//! trait, never by touching the scheduler.

mod agent;
mod collector;
mod decision;
mod guard;
mod transform;

pub use agent::AgentNode;
pub use collector::CollectorNode;
pub use decision::{DecisionArm, DecisionNode};
pub use guard::GuardNode;
pub use transform::TransformNode;
