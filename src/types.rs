//! Core identifier types for the heddle workflow engine.
//!
//! A [`NodeId`] names a registered processing node within a workflow graph.
//! Ids are assigned once at build time and used as registry keys, event tags,
//! and visualization labels.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identifier for a node in a workflow graph.
///
/// Ids are plain strings under the hood; pick something descriptive and
/// unique within the workflow (a step name, a service name, a role).
///
/// # Examples
///
/// ```
/// use heddle::types::NodeId;
///
/// let planner = NodeId::from("planner");
/// assert_eq!(planner.as_str(), "planner");
/// assert_eq!(planner, NodeId::new("planner"));
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    /// Creates a node id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl AsRef<str> for NodeId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
