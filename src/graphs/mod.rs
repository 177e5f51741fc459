//! Graph definition and compilation for workflow execution.
//!
//! The entry point is [`WorkflowBuilder`]: register node behaviors, mark
//! joins and terminals, designate the entry, wire predicate-gated
//! [`Advancer`]s, and [`compile`](WorkflowBuilder::compile) into an
//! executable [`Workflow`](crate::workflow::Workflow). Compilation is
//! where every structural invariant is enforced — see
//! [`GraphBuildError`] for the full catalogue.
//!
//! # Quick start
//!
//! ```
//! use std::sync::Arc;
//! use heddle::graphs::WorkflowBuilder;
//! use heddle::nodes::{CollectorNode, TransformNode};
//! use heddle::message::Message;
//!
//! // Fan out to two workers, join their outputs, finish.
//! let workflow = WorkflowBuilder::new()
//!     .add_node("split", TransformNode::map(|m| m.clone()))
//!     .add_node("upper", TransformNode::map(|m| Message::assistant(&m.content.to_uppercase())))
//!     .add_node("lower", TransformNode::map(|m| Message::assistant(&m.content.to_lowercase())))
//!     .add_join_node("merge", CollectorNode::joining_with(" / "))
//!     .set_entry("split")
//!     .add_parallel_edge("split", "upper")
//!     .add_parallel_edge("split", "lower")
//!     .add_edge("upper", "merge")
//!     .add_edge("lower", "merge")
//!     .add_terminal("merge")
//!     .compile()
//!     .expect("valid graph");
//!
//! let dot = workflow.visualize();
//! assert!(dot.contains("\"split\" -> \"upper\""));
//! ```

mod builder;
mod compilation;
mod edges;

pub use builder::WorkflowBuilder;
pub use compilation::GraphBuildError;
pub use edges::{AdvancePredicate, Advancer};
