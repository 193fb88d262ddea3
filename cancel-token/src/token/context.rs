//! Execution-context identity for tokens.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Identifies the cooperative scheduler a token is bound to.
///
/// Tokens may only be chained — and operations only raced — within a single
/// execution context. The binding is established at construction and fixed
/// for the token's lifetime.
///
/// [`ContextId::ambient`] is the process-wide default, modelling the one
/// runtime a process normally drives. Callers running more than one scheduler
/// mint a distinct identity per scheduler with [`ContextId::fresh`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

impl ContextId {
    /// Returns the process-wide default context.
    #[must_use]
    pub const fn ambient() -> Self {
        Self(0)
    }

    /// Mints a context identity distinct from every other, including the
    /// ambient one.
    #[must_use]
    pub fn fresh() -> Self {
        Self(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::ambient()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ctx-{}", self.0)
    }
}
