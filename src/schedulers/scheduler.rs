//! The frontier scheduler: drives a run from the entry node to completion.
//!
//! Execution proceeds in steps. Each step invokes every (node, input) pair
//! of the current frontier concurrently, collects completions in the order
//! they finish, routes each output through its node's advancers, and
//! assembles the next frontier. Join nodes buffer inbound outputs until
//! their wired threshold is reached. The run ends when the frontier
//! drains, when the cancellation token fires, on the first node error
//! (fail-fast), or when the step limit is exceeded.

use futures_util::StreamExt;
use miette::Diagnostic;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tracing::instrument;

use crate::context::RunContext;
use crate::event_bus::{Event, RUN_END_SCOPE};
use crate::message::Message;
use crate::node::{NodeError, NodeInput};
use crate::types::NodeId;
use crate::workflow::Workflow;

/// How a run finished, when it finished without error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RunOutcome {
    /// The frontier drained. Carries every terminal output in completion
    /// order; may be empty when no advancer matched along the way.
    Completed(Vec<Message>),
    /// The cancellation signal fired before the frontier drained. In-flight
    /// invocations were not force-killed; no further work was scheduled.
    Cancelled,
}

/// Result of a finished run.
#[derive(Clone, Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    /// Number of scheduler steps the run consumed.
    pub steps: u64,
}

impl RunReport {
    /// The final message of a completed run (last terminal completion).
    #[must_use]
    pub fn last(&self) -> Option<&Message> {
        match &self.outcome {
            RunOutcome::Completed(results) => results.last(),
            RunOutcome::Cancelled => None,
        }
    }
}

/// Errors that abort a run.
#[derive(Debug, Error, Diagnostic)]
pub enum SchedulerError {
    /// A node's behavior failed. Under the fail-fast policy this cancels
    /// the run's token and surfaces exactly once.
    #[error("node '{id}' failed at step {step}: {source}")]
    #[diagnostic(code(heddle::scheduler::node_run))]
    NodeRun {
        id: NodeId,
        step: u64,
        #[source]
        source: NodeError,
    },

    /// The frontier id no longer resolves — a compiled workflow should
    /// make this impossible; kept as a defect signal rather than a panic.
    #[error("frontier references unknown node '{id}'")]
    #[diagnostic(code(heddle::scheduler::unknown_node))]
    UnknownNode { id: NodeId },

    /// The run consumed more steps than the configured bound; a cycle
    /// without an exit predicate is the usual cause.
    #[error("step limit exceeded after {limit} steps")]
    #[diagnostic(
        code(heddle::scheduler::step_limit),
        help("Raise RuntimeConfig::max_steps or add an exit edge to the cycle.")
    )]
    StepLimitExceeded { limit: u64 },
}

/// Drives compiled workflows, invoking each frontier concurrently up to a
/// configurable in-flight limit.
#[derive(Clone, Debug)]
pub struct Scheduler {
    limit: usize,
}

impl Default for Scheduler {
    fn default() -> Self {
        let limit = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self::new(limit)
    }
}

impl Scheduler {
    /// Create a scheduler that keeps at most `limit` node invocations in
    /// flight per step.
    #[must_use]
    pub fn new(limit: usize) -> Self {
        Self {
            limit: limit.max(1),
        }
    }

    /// Execute one run of `workflow` starting from its entry node.
    ///
    /// Ordering guarantees: a purely sequential chain preserves causal
    /// order; branches of the same frontier have no relative order; a join
    /// barrier releases only after all expected branches completed, with
    /// its input in completion order (not stable across runs).
    #[instrument(skip(self, workflow, input, ctx), fields(run_id = %ctx.run_id()), err)]
    pub async fn run(
        &self,
        workflow: &Workflow,
        input: Message,
        ctx: &RunContext,
    ) -> Result<RunReport, SchedulerError> {
        let max_steps = workflow.config().max_steps;
        let mut frontier: Vec<(NodeId, NodeInput)> =
            vec![(workflow.entry().clone(), NodeInput::Single(input))];
        let mut join_buffers: FxHashMap<NodeId, Vec<Message>> = FxHashMap::default();
        let mut step: u64 = 0;

        while !frontier.is_empty() {
            if ctx.is_cancelled() {
                tracing::info!(step, "cancellation observed; run stops");
                self.emit_run_end(ctx, "cancelled", step);
                return Ok(RunReport {
                    outcome: RunOutcome::Cancelled,
                    steps: step,
                });
            }

            step += 1;
            if step > max_steps {
                self.emit_run_end(ctx, "step_limit", step);
                return Err(SchedulerError::StepLimitExceeded { limit: max_steps });
            }

            tracing::debug!(step, width = frontier.len(), "dispatching frontier");
            let batch = std::mem::take(&mut frontier);

            // Invoke the whole frontier concurrently, bounded by the
            // in-flight limit, collecting completions as they finish.
            // Fail fast: the first error cancels the token immediately so
            // siblings still running (or queued in this frontier) observe
            // it cooperatively; their completions are drained and
            // discarded, and the error surfaces exactly once.
            let invocations = batch.into_iter().map(|(id, input)| {
                let behavior = workflow.node(&id).map(|n| n.behavior_handle());
                let node_ctx = ctx.node_context(id.clone(), step);
                async move {
                    let result = match behavior {
                        Some(behavior) => behavior.invoke(input, node_ctx).await,
                        None => Err(NodeError::MissingInput {
                            what: "registered node",
                        }),
                    };
                    (id, result)
                }
            });
            let mut invocations =
                futures_util::stream::iter(invocations).buffer_unordered(self.limit);

            let mut completed: Vec<(NodeId, Message)> = Vec::new();
            let mut failure: Option<(NodeId, NodeError)> = None;
            while let Some((id, result)) = invocations.next().await {
                match result {
                    Ok(output) => completed.push((id, output)),
                    Err(err) => {
                        if failure.is_none() {
                            ctx.cancel();
                            failure = Some((id, err));
                        } else {
                            tracing::debug!(node = %id, error = %err, "additional branch error after fail-fast");
                        }
                    }
                }
            }
            drop(invocations);
            if let Some((id, source)) = failure {
                self.emit_run_end(ctx, "error", step);
                return Err(SchedulerError::NodeRun { id, step, source });
            }

            // Route completions (in completion order) into the next frontier.
            for (id, output) in completed {
                let node = workflow
                    .node(&id)
                    .ok_or_else(|| SchedulerError::UnknownNode { id: id.clone() })?;

                if node.is_terminal() {
                    tracing::debug!(node = %id, "terminal output recorded");
                    ctx.push_result(output);
                    continue;
                }

                let matched: Vec<_> = node.edges().iter().filter(|a| a.matches(&output)).collect();
                if matched.is_empty() {
                    tracing::debug!(node = %id, "no advancer matched; branch ends without output");
                    continue;
                }
                if matched.len() > 1 && matched.iter().any(|a| !a.is_parallel()) {
                    tracing::warn!(
                        node = %id,
                        matches = matched.len(),
                        "multiple advancers matched with non-parallel edges among them"
                    );
                }

                for adv in matched {
                    let target = adv.target().clone();
                    let target_node = workflow
                        .node(&target)
                        .ok_or_else(|| SchedulerError::UnknownNode { id: target.clone() })?;

                    if target_node.is_join() {
                        let buffer = join_buffers.entry(target.clone()).or_default();
                        buffer.push(output.clone());
                        if buffer.len() >= target_node.expected_inbound() {
                            let inputs = std::mem::take(buffer);
                            tracing::debug!(node = %target, inputs = inputs.len(), "join barrier released");
                            push_deduped(&mut frontier, target, NodeInput::Joined(inputs));
                        }
                    } else {
                        push_deduped(&mut frontier, target, NodeInput::Single(output.clone()));
                    }
                }
            }
        }

        for (id, buffer) in join_buffers {
            if !buffer.is_empty() {
                tracing::debug!(
                    node = %id,
                    buffered = buffer.len(),
                    "run ended with partial join buffer; discarding"
                );
            }
        }

        self.emit_run_end(ctx, "completed", step);
        Ok(RunReport {
            outcome: RunOutcome::Completed(ctx.results()),
            steps: step,
        })
    }

    fn emit_run_end(&self, ctx: &RunContext, status: &str, step: u64) {
        let message = format!("run={} status={status} step={step}", ctx.run_id());
        if ctx.emitter().emit(Event::diagnostic(RUN_END_SCOPE, message)).is_err() {
            tracing::debug!(status, step, "event channel closed before run end diagnostic");
        }
    }
}

/// Push a pair onto the next frontier unless the node is already present;
/// the frontier is deduplicated by node identity, first input wins.
fn push_deduped(frontier: &mut Vec<(NodeId, NodeInput)>, id: NodeId, input: NodeInput) {
    if frontier.iter().any(|(existing, _)| existing == &id) {
        tracing::debug!(node = %id, "node already in next frontier; deduplicating");
        return;
    }
    frontier.push((id, input));
}
