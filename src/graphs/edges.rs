//! Advancers: predicate-gated transitions between nodes.
//!
//! Each node owns its outgoing advancers in registration order. Per output
//! the scheduler evaluates **every** predicate — never first-match-wins —
//! and each match contributes its target to the next frontier; that is how
//! simultaneous matches produce fan-out.

use std::fmt;
use std::sync::Arc;

use crate::message::Message;
use crate::types::NodeId;

/// Predicate over a node's output deciding whether an advancer fires.
///
/// # Examples
///
/// ```
/// use heddle::graphs::AdvancePredicate;
/// use std::sync::Arc;
///
/// let non_empty: AdvancePredicate = Arc::new(|msg| !msg.content.is_empty());
/// let mentions_code: AdvancePredicate = Arc::new(|msg| msg.content.contains("```"));
/// ```
pub type AdvancePredicate = Arc<dyn Fn(&Message) -> bool + Send + Sync + 'static>;

/// A predicate-gated transition from one node's output to a target node.
///
/// The `parallel` flag marks an edge as an intentional fan-out branch.
/// Matching behavior is identical either way; the flag exists so that
/// several simultaneous matches on non-parallel edges can be reported as
/// probable mis-wiring, and so visualizations can distinguish fan-out.
#[derive(Clone)]
pub struct Advancer {
    predicate: AdvancePredicate,
    target: NodeId,
    parallel: bool,
}

impl Advancer {
    /// Create a sequential advancer gated by `predicate`.
    pub fn new(target: impl Into<NodeId>, predicate: AdvancePredicate) -> Self {
        Self {
            predicate,
            target: target.into(),
            parallel: false,
        }
    }

    /// Create a parallel (fan-out) advancer gated by `predicate`.
    pub fn parallel(target: impl Into<NodeId>, predicate: AdvancePredicate) -> Self {
        Self {
            predicate,
            target: target.into(),
            parallel: true,
        }
    }

    /// Create an advancer whose predicate is always true.
    pub fn always(target: impl Into<NodeId>) -> Self {
        Self::new(target, Arc::new(|_| true))
    }

    /// Evaluate this advancer's predicate against a node output.
    #[must_use]
    pub fn matches(&self, output: &Message) -> bool {
        (self.predicate)(output)
    }

    #[must_use]
    pub fn target(&self) -> &NodeId {
        &self.target
    }

    #[must_use]
    pub fn is_parallel(&self) -> bool {
        self.parallel
    }
}

impl fmt::Debug for Advancer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Advancer")
            .field("target", &self.target)
            .field("parallel", &self.parallel)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_matches_any_output() {
        let adv = Advancer::always("next");
        assert!(adv.matches(&Message::assistant("")));
        assert!(!adv.is_parallel());
        assert_eq!(adv.target(), &NodeId::from("next"));
    }

    #[test]
    fn predicate_gates_the_transition() {
        let adv = Advancer::parallel("worker", Arc::new(|m: &Message| m.content.len() > 3));
        assert!(adv.matches(&Message::assistant("long enough")));
        assert!(!adv.matches(&Message::assistant("no")));
        assert!(adv.is_parallel());
    }
}
