//! # heddle: predicate-routed agent workflow engine
//!
//! heddle runs autonomous agent workflows as graphs: a caller submits one
//! message, the engine routes it through typed processing nodes — model
//! calls, pure transforms, content guards, decision steps — and returns a
//! final message. Branching is data-dependent (predicates over node
//! output), fan-out is concurrent, joins are barriers, cancellation is
//! cooperative, and progress streams out on a bounded event channel.
//!
//! ## Core concepts
//!
//! - **Node**: one async unit of work (`invoke(input, ctx) -> message`)
//! - **Advancer**: a predicate-gated edge from a node's output to a target
//! - **Workflow**: the compiled registry of nodes and wiring, validated at
//!   build time
//! - **Scheduler**: drives frontiers of ready nodes concurrently, with
//!   barrier joins and fail-fast error propagation
//! - **Session**: "submit → reply" over one workflow, with history and
//!   properties that persist across runs
//!
//! ## Quick start
//!
//! ```
//! use heddle::graphs::WorkflowBuilder;
//! use heddle::message::Message;
//! use heddle::nodes::TransformNode;
//! use heddle::runtimes::{RuntimeConfig, Session};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let workflow = WorkflowBuilder::new()
//!     .add_node("shout", TransformNode::map(|m| Message::assistant(&m.content.to_uppercase())))
//!     .set_entry("shout")
//!     .add_terminal("shout")
//!     .with_config(RuntimeConfig::default().without_sinks())
//!     .compile()
//!     .expect("valid graph");
//!
//! let mut session = Session::new(workflow);
//! let reply = session.submit("hello there").await.expect("run succeeds");
//! assert_eq!(reply.content, "HELLO THERE");
//! assert_eq!(session.history().len(), 2);
//! # }
//! ```
//!
//! ## Fan-out and joins
//!
//! Several advancers matching the same output schedule their targets
//! concurrently in the next frontier. A join-marked node buffers one
//! output per wired inbound edge and runs once, with the batch in the
//! order branches completed. See [`graphs`] for the wiring API and
//! [`schedulers`] for the execution rules.
//!
//! ## Collaborators
//!
//! Model calls, content classification, and conversation persistence are
//! contracts ([`providers`]), not dependencies: the engine ships no vendor
//! SDK, and collaborator retries/transport stay behind those traits.
//!
//! ## Module guide
//!
//! - [`message`] — conversation primitives
//! - [`node`] — the node contract and error taxonomy
//! - [`nodes`] — built-in behaviors (agent, transform, guard, decision, collector)
//! - [`context`] — run context, property store, per-node view
//! - [`graphs`] — builder, advancers, build-time validation
//! - [`workflow`] — the compiled graph and DOT export
//! - [`schedulers`] — frontier driver
//! - [`runtimes`] — configuration and the session façade
//! - [`event_bus`] — bounded progress-event channel and sinks
//! - [`providers`] — collaborator contracts

pub mod context;
pub mod event_bus;
pub mod graphs;
pub mod message;
pub mod node;
pub mod nodes;
pub mod providers;
pub mod runtimes;
pub mod schedulers;
pub mod telemetry;
pub mod types;
pub mod utils;
pub mod workflow;
