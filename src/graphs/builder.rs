//! Fluent construction of workflow graphs.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use super::edges::{AdvancePredicate, Advancer};
use crate::node::Node;
use crate::runtimes::RuntimeConfig;
use crate::types::NodeId;

pub(crate) struct NodeDraft {
    pub(crate) behavior: Arc<dyn Node>,
    pub(crate) join: bool,
}

/// Builder for workflow graphs.
///
/// Register nodes, designate the entry and terminal nodes, wire advancers,
/// then [`compile`](Self::compile) into an immutable
/// [`Workflow`](crate::workflow::Workflow). All structural problems —
/// unknown targets, missing entry/terminal, join and arity mis-wirings,
/// unreachable or dead-end nodes — are reported at compile time, never
/// during a run.
///
/// # Examples
///
/// ```
/// use heddle::graphs::WorkflowBuilder;
/// use heddle::nodes::TransformNode;
/// use heddle::message::Message;
///
/// let workflow = WorkflowBuilder::new()
///     .add_node("shout", TransformNode::map(|m| Message::assistant(&m.content.to_uppercase())))
///     .add_node("sign", TransformNode::map(|m| Message::assistant(&format!("{} -- bot", m.content))))
///     .set_entry("shout")
///     .add_edge("shout", "sign")
///     .add_terminal("sign")
///     .compile()
///     .expect("valid graph");
/// assert_eq!(workflow.entry().as_str(), "shout");
/// ```
pub struct WorkflowBuilder {
    pub(crate) nodes: FxHashMap<NodeId, NodeDraft>,
    pub(crate) order: Vec<NodeId>,
    pub(crate) edges: Vec<(NodeId, Advancer)>,
    pub(crate) entry: Option<NodeId>,
    pub(crate) terminals: Vec<NodeId>,
    pub(crate) config: RuntimeConfig,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: FxHashMap::default(),
            order: Vec::new(),
            edges: Vec::new(),
            entry: None,
            terminals: Vec::new(),
            config: RuntimeConfig::default(),
        }
    }

    /// Register a node behavior under `id`.
    ///
    /// Re-registering an id replaces the behavior and logs a warning.
    #[must_use]
    pub fn add_node(mut self, id: impl Into<NodeId>, behavior: impl Node + 'static) -> Self {
        self.insert_node(id.into(), Arc::new(behavior), false);
        self
    }

    /// Register a join node: it buffers one output per inbound edge and
    /// runs once with the arrival-ordered batch.
    #[must_use]
    pub fn add_join_node(mut self, id: impl Into<NodeId>, behavior: impl Node + 'static) -> Self {
        self.insert_node(id.into(), Arc::new(behavior), true);
        self
    }

    /// Register an already-shared behavior.
    #[must_use]
    pub fn add_shared_node(mut self, id: impl Into<NodeId>, behavior: Arc<dyn Node>) -> Self {
        self.insert_node(id.into(), behavior, false);
        self
    }

    fn insert_node(&mut self, id: NodeId, behavior: Arc<dyn Node>, join: bool) {
        if self.nodes.insert(id.clone(), NodeDraft { behavior, join }).is_some() {
            tracing::warn!(node = %id, "node re-registered; replacing previous behavior");
        } else {
            self.order.push(id);
        }
    }

    /// Designate the node where every run starts.
    #[must_use]
    pub fn set_entry(mut self, id: impl Into<NodeId>) -> Self {
        self.entry = Some(id.into());
        self
    }

    /// Designate a terminal node: its output lands in the run's results and
    /// its advancers are never evaluated. A graph may have several.
    #[must_use]
    pub fn add_terminal(mut self, id: impl Into<NodeId>) -> Self {
        let id = id.into();
        if !self.terminals.contains(&id) {
            self.terminals.push(id);
        }
        self
    }

    /// Wire an unconditional advancer from `from` to `to`.
    #[must_use]
    pub fn add_edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges.push((from.into(), Advancer::always(to)));
        self
    }

    /// Wire an advancer gated by `predicate` over the source's output.
    #[must_use]
    pub fn add_edge_when(
        mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        predicate: AdvancePredicate,
    ) -> Self {
        self.edges.push((from.into(), Advancer::new(to, predicate)));
        self
    }

    /// Wire an unconditional fan-out advancer.
    #[must_use]
    pub fn add_parallel_edge(mut self, from: impl Into<NodeId>, to: impl Into<NodeId>) -> Self {
        self.edges
            .push((from.into(), Advancer::parallel(to, Arc::new(|_| true))));
        self
    }

    /// Wire a fan-out advancer gated by `predicate`.
    #[must_use]
    pub fn add_parallel_edge_when(
        mut self,
        from: impl Into<NodeId>,
        to: impl Into<NodeId>,
        predicate: AdvancePredicate,
    ) -> Self {
        self.edges
            .push((from.into(), Advancer::parallel(to, predicate)));
        self
    }

    /// Override the runtime configuration for the compiled workflow.
    #[must_use]
    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }
}
