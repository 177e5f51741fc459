//! Graph validation and compilation into an executable [`Workflow`].
//!
//! Every structural invariant is enforced here, at build time. A compiled
//! workflow never discovers an unresolved target, a missing entry, or a
//! mis-typed join while a run is in flight.

use miette::Diagnostic;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;

use super::builder::WorkflowBuilder;
use super::edges::Advancer;
use crate::node::InputArity;
use crate::types::NodeId;
use crate::workflow::{CompiledNode, Workflow};

/// Errors detected while compiling a graph. All of these are caller
/// mistakes in the wiring, reported before any run starts.
#[derive(Debug, Error, Diagnostic)]
pub enum GraphBuildError {
    #[error("no entry node designated")]
    #[diagnostic(
        code(heddle::graph::missing_entry),
        help("Call set_entry with the id of a registered node.")
    )]
    MissingEntry,

    #[error("entry node '{id}' is not registered")]
    #[diagnostic(code(heddle::graph::unknown_entry))]
    UnknownEntry { id: NodeId },

    #[error("no terminal node designated")]
    #[diagnostic(
        code(heddle::graph::missing_terminal),
        help("Call add_terminal with at least one registered node id.")
    )]
    MissingTerminal,

    #[error("terminal node '{id}' is not registered")]
    #[diagnostic(code(heddle::graph::unknown_terminal))]
    UnknownTerminal { id: NodeId },

    #[error("edge source '{from}' is not registered")]
    #[diagnostic(code(heddle::graph::unknown_edge_source))]
    UnknownEdgeSource { from: NodeId },

    #[error("edge target '{to}' (from '{from}') is not registered")]
    #[diagnostic(
        code(heddle::graph::unknown_edge_target),
        help("Register the target node before compiling, or fix the id.")
    )]
    UnknownEdgeTarget { from: NodeId, to: NodeId },

    #[error("join node '{id}' has no inbound edges")]
    #[diagnostic(
        code(heddle::graph::join_without_inbound),
        help("A join barrier needs at least one inbound edge to derive its expected count.")
    )]
    JoinWithoutInbound { id: NodeId },

    #[error("node '{id}' declares batch input but is not join-marked")]
    #[diagnostic(
        code(heddle::graph::input_mismatch),
        help("Register batch-consuming behaviors with add_join_node.")
    )]
    BatchInputOutsideJoin { id: NodeId },

    #[error("join node '{id}' declares single-message input")]
    #[diagnostic(
        code(heddle::graph::input_mismatch),
        help("A join delivers an ordered batch; use a batch-capable behavior.")
    )]
    SingleInputOnJoin { id: NodeId },

    #[error("node '{id}' is not reachable from the entry node")]
    #[diagnostic(code(heddle::graph::unreachable))]
    UnreachableNode { id: NodeId },

    #[error("non-terminal node '{id}' has no outgoing edges")]
    #[diagnostic(
        code(heddle::graph::dead_end),
        help("Mark the node terminal or wire an advancer out of it.")
    )]
    DeadEnd { id: NodeId },
}

impl WorkflowBuilder {
    /// Compile the wiring into an executable [`Workflow`].
    ///
    /// Checks, in order: entry and terminal designations resolve, every
    /// edge endpoint resolves, join nodes have inbound edges and
    /// batch-capable behaviors (and only join nodes consume batches),
    /// every registered node is reachable from the entry, and every
    /// reachable non-terminal node has a way forward.
    pub fn compile(self) -> Result<Workflow, GraphBuildError> {
        let entry = self.entry.clone().ok_or(GraphBuildError::MissingEntry)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphBuildError::UnknownEntry { id: entry });
        }

        if self.terminals.is_empty() {
            return Err(GraphBuildError::MissingTerminal);
        }
        for terminal in &self.terminals {
            if !self.nodes.contains_key(terminal) {
                return Err(GraphBuildError::UnknownTerminal {
                    id: terminal.clone(),
                });
            }
        }

        // Group advancers per source (registration order) and count inbound
        // edges per target; join thresholds derive from the wiring alone.
        let mut outgoing: FxHashMap<NodeId, Vec<Advancer>> = FxHashMap::default();
        let mut inbound: FxHashMap<NodeId, usize> = FxHashMap::default();
        for (from, advancer) in self.edges {
            if !self.nodes.contains_key(&from) {
                return Err(GraphBuildError::UnknownEdgeSource { from });
            }
            let target = advancer.target().clone();
            if !self.nodes.contains_key(&target) {
                return Err(GraphBuildError::UnknownEdgeTarget { from, to: target });
            }
            *inbound.entry(target).or_insert(0) += 1;
            outgoing.entry(from).or_default().push(advancer);
        }

        for (id, draft) in &self.nodes {
            let expected = inbound.get(id).copied().unwrap_or(0);
            if draft.join && expected == 0 {
                return Err(GraphBuildError::JoinWithoutInbound { id: id.clone() });
            }
            match (draft.join, draft.behavior.input_arity()) {
                (false, InputArity::Batch) => {
                    return Err(GraphBuildError::BatchInputOutsideJoin { id: id.clone() });
                }
                (true, InputArity::Single) => {
                    return Err(GraphBuildError::SingleInputOnJoin { id: id.clone() });
                }
                _ => {}
            }
        }

        // Reachability from the entry over the wired advancers.
        let mut reachable: FxHashSet<NodeId> = FxHashSet::default();
        let mut queue = vec![entry.clone()];
        while let Some(id) = queue.pop() {
            if !reachable.insert(id.clone()) {
                continue;
            }
            if let Some(advancers) = outgoing.get(&id) {
                for adv in advancers {
                    if !reachable.contains(adv.target()) {
                        queue.push(adv.target().clone());
                    }
                }
            }
        }
        for id in &self.order {
            if !reachable.contains(id) {
                return Err(GraphBuildError::UnreachableNode { id: id.clone() });
            }
        }

        // Best-effort liveness: a reachable non-terminal node with zero
        // outgoing advancers can never move the run forward.
        for id in &self.order {
            let is_terminal = self.terminals.contains(id);
            let has_exit = outgoing.get(id).is_some_and(|advs| !advs.is_empty());
            if !is_terminal && !has_exit {
                return Err(GraphBuildError::DeadEnd { id: id.clone() });
            }
        }

        let terminals = self.terminals;
        let mut compiled: FxHashMap<NodeId, CompiledNode> = FxHashMap::default();
        for (id, draft) in self.nodes {
            let terminal = terminals.contains(&id);
            if terminal && outgoing.get(&id).is_some_and(|advs| !advs.is_empty()) {
                // Legal but almost certainly a mistake; the scheduler will
                // never evaluate these advancers.
                tracing::warn!(node = %id, "terminal node has outgoing edges; they will be ignored");
            }
            let expected_inbound = inbound.get(&id).copied().unwrap_or(0);
            compiled.insert(
                id.clone(),
                CompiledNode {
                    behavior: draft.behavior,
                    join: draft.join,
                    terminal,
                    expected_inbound,
                    edges: outgoing.remove(&id).unwrap_or_default(),
                },
            );
        }

        Ok(Workflow::from_parts(
            compiled,
            self.order,
            entry,
            terminals,
            self.config,
        ))
    }
}
