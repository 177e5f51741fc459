//! Run-scoped shared state threaded through every node invocation.
//!
//! A [`RunContext`] is created per run and carries the four things every
//! branch may touch concurrently: the cancellation token, the shared
//! [`PropertyStore`], the event emitter, and the append-only results list.
//! Nodes receive a [`NodeContext`] — the same state plus their own
//! identity — so emitted events and property updates are attributable.

use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::event_bus::{EmitterError, Event, EventEmitter, ProgressSender};
use crate::message::Message;
use crate::types::NodeId;

/// Key/value store shared by all branches of a run (and, through the
/// session, across runs).
///
/// Two branches of the same frontier may write the same key at the same
/// time, so every operation here is atomic under a single lock
/// acquisition; there is deliberately no way to read a value and write it
/// back in two steps through this API.
///
/// # Examples
///
/// ```
/// use heddle::context::PropertyStore;
/// use serde_json::json;
///
/// let props = PropertyStore::new();
/// props.put("attempts", json!(0));
/// let bumped = props.update("attempts", |v| {
///     json!(v.and_then(|v| v.as_i64()).unwrap_or(0) + 1)
/// });
/// assert_eq!(bumped, json!(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct PropertyStore {
    inner: Arc<RwLock<FxHashMap<String, Value>>>,
}

impl PropertyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a value by key (cloned).
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Value> {
        self.inner.read().get(key).cloned()
    }

    /// Insert or overwrite a value. One lock acquisition, atomic.
    pub fn put(&self, key: impl Into<String>, value: Value) {
        self.inner.write().insert(key.into(), value);
    }

    /// Remove a key, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<Value> {
        self.inner.write().remove(key)
    }

    /// Atomically compute a new value from the current one and store it.
    ///
    /// The closure runs under the write lock; keep it cheap.
    pub fn update<F>(&self, key: impl Into<String>, f: F) -> Value
    where
        F: FnOnce(Option<&Value>) -> Value,
    {
        let key = key.into();
        let mut guard = self.inner.write();
        let next = f(guard.get(&key));
        guard.insert(key, next.clone());
        next
    }

    /// Store `new` only if the current value equals `expected`.
    ///
    /// `expected = None` means "only insert if absent". Returns whether the
    /// swap happened.
    pub fn compare_and_swap(
        &self,
        key: impl Into<String>,
        expected: Option<&Value>,
        new: Value,
    ) -> bool {
        let key = key.into();
        let mut guard = self.inner.write();
        if guard.get(&key) == expected {
            guard.insert(key, new);
            true
        } else {
            false
        }
    }

    /// Insert every entry of the iterator under one lock acquisition.
    pub fn merge(&self, entries: impl IntoIterator<Item = (String, Value)>) {
        let mut guard = self.inner.write();
        for (k, v) in entries {
            guard.insert(k, v);
        }
    }

    /// Point-in-time copy of the whole map.
    #[must_use]
    pub fn snapshot(&self) -> FxHashMap<String, Value> {
        self.inner.read().clone()
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.read().contains_key(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

/// Per-run execution state shared by every branch.
///
/// Cheap to clone: all fields are handles. The scheduler creates one per
/// run; the session supplies the property store so named properties
/// persist across runs.
#[derive(Clone, Debug)]
pub struct RunContext {
    run_id: String,
    cancel: CancellationToken,
    properties: PropertyStore,
    emitter: EventEmitter,
    results: Arc<Mutex<Vec<Message>>>,
}

impl RunContext {
    pub fn new(
        run_id: impl Into<String>,
        cancel: CancellationToken,
        properties: PropertyStore,
        emitter: EventEmitter,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            cancel,
            properties,
            emitter,
            results: Arc::new(Mutex::new(Vec::new())),
        }
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// The run's cancellation token; nested collaborator calls inherit it.
    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Signal cancellation to every branch of this run.
    pub(crate) fn cancel(&self) {
        self.cancel.cancel();
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyStore {
        &self.properties
    }

    pub(crate) fn emitter(&self) -> &EventEmitter {
        &self.emitter
    }

    /// Append a terminal node's output. Results keep completion order.
    pub(crate) fn push_result(&self, message: Message) {
        self.results.lock().push(message);
    }

    /// Snapshot of the results accumulated so far, in completion order.
    #[must_use]
    pub fn results(&self) -> Vec<Message> {
        self.results.lock().clone()
    }

    /// Most recently completed terminal output, if any.
    #[must_use]
    pub fn last_result(&self) -> Option<Message> {
        self.results.lock().last().cloned()
    }

    /// Derive the per-invocation view handed to a node.
    #[must_use]
    pub fn node_context(&self, node_id: NodeId, step: u64) -> NodeContext {
        NodeContext {
            node_id,
            step,
            run: self.clone(),
        }
    }
}

/// Execution context passed to nodes during workflow execution.
///
/// Adds node identity and the current step number on top of the run-wide
/// state, so events emitted here arrive pre-tagged.
#[derive(Clone, Debug)]
pub struct NodeContext {
    node_id: NodeId,
    step: u64,
    run: RunContext,
}

impl NodeContext {
    #[must_use]
    pub fn node_id(&self) -> &NodeId {
        &self.node_id
    }

    #[must_use]
    pub fn step(&self) -> u64 {
        self.step
    }

    #[must_use]
    pub fn run_id(&self) -> &str {
        self.run.run_id()
    }

    #[must_use]
    pub fn properties(&self) -> &PropertyStore {
        self.run.properties()
    }

    #[must_use]
    pub fn cancellation(&self) -> &CancellationToken {
        self.run.cancellation()
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.run.is_cancelled()
    }

    /// Emit a node-scoped event enriched with this context's metadata.
    pub fn emit(
        &self,
        scope: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<(), EmitterError> {
        self.run.emitter().emit(Event::node(
            self.run.run_id(),
            self.node_id.as_str(),
            self.step,
            scope,
            message,
        ))
    }

    /// Progress handle for model-call collaborators, pre-tagged with this
    /// node's identity.
    #[must_use]
    pub fn progress(&self) -> ProgressSender {
        ProgressSender::new(
            self.run.emitter().clone(),
            self.run.run_id(),
            self.node_id.as_str(),
        )
    }
}
