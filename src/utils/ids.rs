//! Identifier generation for runs and sessions.

use uuid::Uuid;

/// Generates unique run and session identifiers.
///
/// Backed by UUID v4; the prefixes keep ids self-describing in logs and
/// event streams.
///
/// # Examples
///
/// ```
/// use heddle::utils::ids::IdGenerator;
///
/// let ids = IdGenerator::new();
/// let run = ids.run_id();
/// assert!(run.starts_with("run-"));
/// ```
#[derive(Clone, Debug, Default)]
pub struct IdGenerator;

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates a fresh run identifier.
    #[must_use]
    pub fn run_id(&self) -> String {
        format!("run-{}", Uuid::new_v4().simple())
    }

    /// Generates a fresh session identifier.
    #[must_use]
    pub fn session_id(&self) -> String {
        format!("session-{}", Uuid::new_v4().simple())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let ids = IdGenerator::new();
        assert_ne!(ids.run_id(), ids.run_id());
        assert!(ids.session_id().starts_with("session-"));
    }
}
