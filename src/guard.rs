//! Precondition collection.
//!
//! Guards are checked all at once so a refused operation reports every violated rule, not
//! just the first.

use crate::error::{DrawError, DrawResult};
use tracing::warn;

#[derive(Debug, Default)]
pub(crate) struct Guards {
    violations: Vec<String>,
}

impl Guards {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Records `message` unless `ok` holds.
    pub(crate) fn check(&mut self, ok: bool, message: impl FnOnce() -> String) -> &mut Self {
        if !ok {
            self.violations.push(message());
        }
        self
    }

    pub(crate) fn into_violations(self) -> Vec<String> {
        self.violations
    }

    pub(crate) fn finish(self, operation: &'static str) -> DrawResult<()> {
        if self.violations.is_empty() {
            return Ok(());
        }
        warn!(operation, violations = ?self.violations, "Guard rejected");
        Err(DrawError::Precondition(self.violations))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collects_every_violation() {
        let mut guards = Guards::new();
        guards
            .check(true, || "never".into())
            .check(false, || "first".into())
            .check(false, || "second".into());
        assert_eq!(
            guards.finish("test").unwrap_err(),
            DrawError::Precondition(vec!["first".into(), "second".into()])
        );
    }
}
