//! The session façade: "submit a message, get a reply" over one workflow.
//!
//! A [`Session`] binds a compiled [`Workflow`] to state that outlives any
//! single run: the conversation history and a shared [`PropertyStore`].
//! Each `submit` creates a fresh run (new run id, fresh results, its own
//! cancellation token) while reusing that persistent state. History is
//! only ever mutated between runs — before dispatch and after completion —
//! so it needs no locking beyond append-only discipline.

use std::sync::Arc;

use miette::Diagnostic;
use parking_lot::Mutex;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::context::{PropertyStore, RunContext};
use crate::event_bus::{Event, EventBus};
use crate::message::Message;
use crate::providers::{ConversationStore, ProviderError};
use crate::schedulers::{RunOutcome, Scheduler, SchedulerError};
use crate::utils::ids::IdGenerator;
use crate::workflow::Workflow;

/// Errors surfaced to callers of [`Session::submit`].
#[derive(Debug, Error, Diagnostic)]
pub enum SessionError {
    /// The run was cancelled. Distinct from failure: no result exists and
    /// none was expected.
    #[error("run cancelled")]
    #[diagnostic(code(heddle::session::cancelled))]
    Cancelled,

    /// The run completed but no terminal node produced output (every
    /// branch ended on a non-matching predicate).
    #[error("run completed without terminal output")]
    #[diagnostic(
        code(heddle::session::no_output),
        help("Check the advancer predicates along the path to the terminal nodes.")
    )]
    NoOutput,

    /// No conversation store is attached to this session.
    #[error("no conversation store attached")]
    #[diagnostic(code(heddle::session::no_store))]
    NoStore,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Scheduler(#[from] SchedulerError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] ProviderError),
}

/// Cloneable handle that cancels the session's in-flight run, if any.
///
/// Obtained from [`Session::cancel_handle`] so another task can interrupt
/// a `submit` that is being awaited elsewhere.
#[derive(Clone, Debug, Default)]
pub struct CancelHandle {
    slot: Arc<Mutex<Option<CancellationToken>>>,
}

impl CancelHandle {
    /// Cancel the in-flight run. A no-op when no run is active; future
    /// runs are unaffected.
    pub fn cancel(&self) {
        if let Some(token) = self.slot.lock().as_ref() {
            token.cancel();
        }
    }

    /// Whether a run is currently in flight.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.slot.lock().is_some()
    }
}

/// Long-lived wrapper binding one workflow to persistent conversation
/// state across repeated submissions.
pub struct Session {
    workflow: Arc<Workflow>,
    scheduler: Scheduler,
    history: Vec<Message>,
    properties: PropertyStore,
    event_bus: EventBus,
    run_slot: CancelHandle,
    store: Option<Arc<dyn ConversationStore>>,
    ids: IdGenerator,
}

impl Session {
    /// Create a session over a compiled workflow. The event bus is built
    /// from the workflow's configured sinks and starts listening
    /// immediately.
    #[must_use]
    pub fn new(workflow: Workflow) -> Self {
        let event_bus = workflow.config().build_event_bus();
        event_bus.listen_for_events();
        let scheduler = Scheduler::new(workflow.config().concurrency_limit);
        Self {
            workflow: Arc::new(workflow),
            scheduler,
            history: Vec::new(),
            properties: PropertyStore::new(),
            event_bus,
            run_slot: CancelHandle::default(),
            store: None,
            ids: IdGenerator::new(),
        }
    }

    /// Attach a conversation persistence collaborator.
    #[must_use]
    pub fn with_store(mut self, store: Arc<dyn ConversationStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Submit one message and await the final reply.
    ///
    /// Appends the user message to history, runs the graph, appends the
    /// reply (the last terminal output by completion order) and returns
    /// it. A completed run with no terminal output is reported as
    /// [`SessionError::NoOutput`]; a cancelled run as
    /// [`SessionError::Cancelled`].
    pub async fn submit(&mut self, text: &str) -> Result<Message, SessionError> {
        let results = self.run_graph(Message::user(text)).await?;
        let reply = results.last().cloned().ok_or(SessionError::NoOutput)?;
        self.history.push(reply.clone());
        Ok(reply)
    }

    /// Submit one message and collect every terminal output of the run
    /// (fan-in callers). Only the last output joins the history.
    pub async fn submit_all(&mut self, text: &str) -> Result<Vec<Message>, SessionError> {
        let results = self.run_graph(Message::user(text)).await?;
        if results.is_empty() {
            return Err(SessionError::NoOutput);
        }
        if let Some(last) = results.last() {
            self.history.push(last.clone());
        }
        Ok(results)
    }

    async fn run_graph(&mut self, user: Message) -> Result<Vec<Message>, SessionError> {
        self.history.push(user.clone());

        let token = CancellationToken::new();
        *self.run_slot.slot.lock() = Some(token.clone());
        let ctx = RunContext::new(
            self.ids.run_id(),
            token,
            self.properties.clone(),
            self.event_bus.emitter(),
        );

        tracing::info!(run_id = %ctx.run_id(), "run started");
        let report = self.scheduler.run(&self.workflow, user, &ctx).await;
        *self.run_slot.slot.lock() = None;

        match report?.outcome {
            RunOutcome::Completed(results) => Ok(results),
            RunOutcome::Cancelled => Err(SessionError::Cancelled),
        }
    }

    /// Cancel the in-flight run, if any. Only the current run is affected.
    pub fn cancel(&self) {
        self.run_slot.cancel();
    }

    /// Handle for cancelling from another task.
    #[must_use]
    pub fn cancel_handle(&self) -> CancelHandle {
        self.run_slot.clone()
    }

    /// Snapshot copy of the conversation history.
    #[must_use]
    pub fn history(&self) -> Vec<Message> {
        self.history.clone()
    }

    /// Empty the conversation history. Graph wiring and session properties
    /// are untouched.
    pub fn clear(&mut self) {
        self.history.clear();
    }

    /// The session-scoped property store, shared with every run.
    #[must_use]
    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    /// Subscribe to the session's event feed (progress, diagnostics,
    /// streaming deltas), tagged per `(run_id, node_id)`.
    #[must_use]
    pub fn events(&self) -> flume::Receiver<Event> {
        self.event_bus.subscribe()
    }

    /// Events dropped so far because the bounded channel was full.
    #[must_use]
    pub fn dropped_events(&self) -> usize {
        self.event_bus.dropped_events()
    }

    /// Replace the history with the conversation stored under `key`.
    pub async fn load_history(&mut self, key: &str) -> Result<(), SessionError> {
        let store = self.store.as_ref().ok_or(SessionError::NoStore)?;
        self.history = store.load(key).await?;
        Ok(())
    }

    /// Persist the current history under `key`.
    pub async fn save_history(&self, key: &str) -> Result<(), SessionError> {
        let store = self.store.as_ref().ok_or(SessionError::NoStore)?;
        store.save(key, &self.history).await?;
        Ok(())
    }
}
