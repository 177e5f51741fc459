//! The compiled, immutable workflow graph.
//!
//! Produced by [`WorkflowBuilder::compile`](crate::graphs::WorkflowBuilder::compile);
//! consumed by the scheduler. Nodes are created once at build time and
//! live as long as the workflow does.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;

use crate::context::{PropertyStore, RunContext};
use crate::graphs::Advancer;
use crate::message::Message;
use crate::node::Node;
use crate::runtimes::RuntimeConfig;
use crate::schedulers::{RunReport, Scheduler, SchedulerError};
use crate::types::NodeId;
use crate::utils::ids::IdGenerator;

/// A registered node with its compiled attributes and outgoing advancers.
pub struct CompiledNode {
    pub(crate) behavior: Arc<dyn Node>,
    pub(crate) join: bool,
    pub(crate) terminal: bool,
    pub(crate) expected_inbound: usize,
    pub(crate) edges: Vec<Advancer>,
}

impl CompiledNode {
    /// Whether this node buffers inbound branches behind a barrier.
    #[must_use]
    pub fn is_join(&self) -> bool {
        self.join
    }

    /// Whether this node's output lands in the run's results.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    /// Number of inbound edges wired to this node; the barrier threshold
    /// when [`is_join`](Self::is_join) is true.
    #[must_use]
    pub fn expected_inbound(&self) -> usize {
        self.expected_inbound
    }

    /// Outgoing advancers in registration order.
    #[must_use]
    pub fn edges(&self) -> &[Advancer] {
        &self.edges
    }

    /// Shared handle to the behavior, for invocation off the registry.
    pub(crate) fn behavior_handle(&self) -> Arc<dyn Node> {
        Arc::clone(&self.behavior)
    }
}

/// An immutable, validated workflow graph ready for execution.
pub struct Workflow {
    nodes: FxHashMap<NodeId, CompiledNode>,
    order: Vec<NodeId>,
    entry: NodeId,
    terminals: Vec<NodeId>,
    config: RuntimeConfig,
}

impl std::fmt::Debug for Workflow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Workflow")
            .field("order", &self.order)
            .field("entry", &self.entry)
            .field("terminals", &self.terminals)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Workflow {
    /// Internal (crate) factory keeping the node table private.
    pub(crate) fn from_parts(
        nodes: FxHashMap<NodeId, CompiledNode>,
        order: Vec<NodeId>,
        entry: NodeId,
        terminals: Vec<NodeId>,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            nodes,
            order,
            entry,
            terminals,
            config,
        }
    }

    /// The node every run starts from.
    #[must_use]
    pub fn entry(&self) -> &NodeId {
        &self.entry
    }

    /// The designated terminal nodes.
    #[must_use]
    pub fn terminals(&self) -> &[NodeId] {
        &self.terminals
    }

    #[must_use]
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Look up a compiled node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&CompiledNode> {
        self.nodes.get(id)
    }

    /// Node ids in registration order.
    pub fn node_ids(&self) -> impl Iterator<Item = &NodeId> {
        self.order.iter()
    }

    /// Render the graph as a DOT digraph.
    ///
    /// Every registered node and every advancer appears exactly once, so
    /// the output is a complete description of the topology for external
    /// renderers. Entry/terminal/join roles are noted in the node labels;
    /// parallel advancers are dashed.
    ///
    /// # Examples
    ///
    /// ```
    /// # use heddle::graphs::WorkflowBuilder;
    /// # use heddle::nodes::TransformNode;
    /// # let workflow = WorkflowBuilder::new()
    /// #     .add_node("a", TransformNode::map(|m| m.clone()))
    /// #     .add_node("b", TransformNode::map(|m| m.clone()))
    /// #     .set_entry("a")
    /// #     .add_edge("a", "b")
    /// #     .add_terminal("b")
    /// #     .compile()
    /// #     .unwrap();
    /// let dot = workflow.visualize();
    /// assert!(dot.starts_with("digraph"));
    /// assert!(dot.contains("\"a\" -> \"b\""));
    /// ```
    #[must_use]
    pub fn visualize(&self) -> String {
        let mut out = String::from("digraph workflow {\n    rankdir=LR;\n");
        for id in &self.order {
            let node = &self.nodes[id];
            let mut roles = Vec::new();
            if *id == self.entry {
                roles.push("entry");
            }
            if node.join {
                roles.push("join");
            }
            if node.terminal {
                roles.push("terminal");
            }
            let label = if roles.is_empty() {
                id.to_string()
            } else {
                format!("{} ({})", id, roles.join(", "))
            };
            out.push_str(&format!("    \"{id}\" [shape=box, label=\"{label}\"];\n"));
        }
        for id in &self.order {
            for adv in &self.nodes[id].edges {
                if adv.is_parallel() {
                    out.push_str(&format!(
                        "    \"{id}\" -> \"{}\" [style=dashed];\n",
                        adv.target()
                    ));
                } else {
                    out.push_str(&format!("    \"{id}\" -> \"{}\";\n", adv.target()));
                }
            }
        }
        out.push_str("}\n");
        out
    }

    /// Execute one run against a fresh, workflow-owned context.
    ///
    /// Convenience wrapper for one-shot invocations: builds an event bus
    /// from the configured sinks, a fresh property store, and a default
    /// scheduler. Use a [`Session`](crate::runtimes::Session) when history
    /// or properties must persist across submissions.
    pub async fn run_once(&self, input: Message) -> Result<RunReport, SchedulerError> {
        let bus = self.config.build_event_bus();
        bus.listen_for_events();
        let ctx = RunContext::new(
            IdGenerator::new().run_id(),
            CancellationToken::new(),
            PropertyStore::new(),
            bus.emitter(),
        );
        let scheduler = Scheduler::new(self.config.concurrency_limit);
        scheduler.run(self, input, &ctx).await
    }
}
