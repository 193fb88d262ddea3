//! Cancellation tokens: one-shot triggers, chaining, and cancellable races.

mod context;

pub use context::ContextId;

use crate::errors::CancelTokenError;
use crate::race::race_and_cleanup;
use futures::future::BoxFuture;
use futures::FutureExt;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, trace};

/// A one-shot cancellation signal, optionally composed from other tokens.
///
/// A token is triggered at most once; re-triggering is a no-op. Tokens
/// compose into a tree via [`chain`](CancelToken::chain): the composite is
/// triggered whenever any of its operands (recursively) is, while triggering
/// the composite itself never marks the operands — causality flows from leaf
/// to ancestor only.
///
/// Cloning a token is cheap and yields a handle to the same underlying
/// signal; clones compare equal.
#[derive(Clone)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

struct Inner {
    name: String,
    context: ContextId,
    /// One-shot flag; only ever flips false -> true.
    triggered: watch::Sender<bool>,
    /// Chained operands, fixed at construction. Empty for leaf tokens.
    children: Vec<CancelToken>,
}

impl CancelToken {
    /// Creates a leaf token bound to the ambient execution context.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::bound(name, ContextId::ambient())
    }

    /// Creates a leaf token bound to an explicit execution context.
    #[must_use]
    pub fn bound(name: impl Into<String>, context: ContextId) -> Self {
        Self::build(name.into(), context, Vec::new())
    }

    fn build(name: String, context: ContextId, children: Vec<CancelToken>) -> Self {
        let (triggered, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                name,
                context,
                triggered,
                children,
            }),
        }
    }

    /// Returns the token's diagnostic name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Returns the execution context the token is bound to.
    #[must_use]
    pub fn context(&self) -> ContextId {
        self.inner.context
    }

    /// Fires the token, waking every waiter suspended on it or on any
    /// composite ancestor that contains it.
    ///
    /// Synchronous and non-blocking; safe to call from inside any task.
    /// Idempotent: triggering an already-triggered token changes nothing,
    /// including after the token was consumed by a completed race.
    pub fn trigger(&self) {
        let was_triggered = self.inner.triggered.send_replace(true);
        if !was_triggered {
            trace!(token = %self.inner.name, "token triggered");
        }
    }

    /// Returns whether this token or any descendant has been triggered.
    #[must_use]
    pub fn triggered(&self) -> bool {
        *self.inner.triggered.borrow() || self.inner.children.iter().any(Self::triggered)
    }

    /// Resolves the specific token whose own trigger flag satisfies
    /// [`triggered`](CancelToken::triggered), or `None` when nothing fired.
    ///
    /// Resolution is deterministic: a token's own flag wins over its
    /// children; among children, the first in chaining order whose subtree is
    /// triggered wins, resolved depth-first.
    #[must_use]
    pub fn triggered_token(&self) -> Option<CancelToken> {
        if *self.inner.triggered.borrow() {
            return Some(self.clone());
        }
        self.inner.children.iter().find_map(Self::triggered_token)
    }

    /// Composes this token with another into a new composite token that is
    /// triggered whenever either operand (recursively) is.
    ///
    /// Neither operand is modified; the composite owns clones of both as its
    /// children, so the tree stays acyclic by construction. Fails with
    /// [`CancelTokenError::EventLoopMismatch`] — before any construction —
    /// when the operands are bound to different execution contexts.
    pub fn chain(&self, other: &CancelToken) -> Result<CancelToken, CancelTokenError> {
        if self.inner.context != other.inner.context {
            return Err(CancelTokenError::EventLoopMismatch {
                left_name: self.inner.name.clone(),
                left_context: self.inner.context,
                right_name: other.inner.name.clone(),
                right_context: other.inner.context,
            });
        }
        let name = format!("{}:{}", self.inner.name, other.inner.name);
        trace!(
            left = %self.inner.name,
            right = %other.inner.name,
            composite = %name,
            "tokens chained"
        );
        Ok(Self::build(
            name,
            self.inner.context,
            vec![self.clone(), other.clone()],
        ))
    }

    /// Returns a future that resolves once the token (or any descendant) is
    /// triggered.
    ///
    /// Implemented as a race between the token's own trigger signal and each
    /// child's `wait`, recursively. Every branch is a future owned by the
    /// race, never a detached task: when one branch wins, the losers are
    /// dropped — cancelled and settled — before the future resolves, and
    /// dropping the returned future itself unwinds every nested branch the
    /// same way. No background waiter survives the call by any exit path.
    ///
    /// Restartable: each call subscribes to the trigger signal afresh.
    pub fn wait(&self) -> BoxFuture<'_, ()> {
        async move {
            if self.triggered() {
                return;
            }
            let mut branches: Vec<BoxFuture<'_, ()>> =
                Vec::with_capacity(self.inner.children.len() + 1);
            branches.push(self.own_triggered().boxed());
            for child in &self.inner.children {
                branches.push(child.wait());
            }
            race_and_cleanup(branches).await;
        }
        .boxed()
    }

    /// Suspends until this token's own flag flips.
    async fn own_triggered(&self) {
        let mut rx = self.inner.triggered.subscribe();
        // wait_for only fails when the sender is dropped, and `self` keeps it
        // alive for the duration of the borrow.
        let _ = rx.wait_for(|&fired| fired).await;
    }

    /// Races the supplied operations against this token's [`wait`] and an
    /// optional timeout, returning the first operation's output with every
    /// losing branch cancelled and settled before the call returns.
    ///
    /// Resolution, first event wins:
    ///
    /// - an operation finishes: its output is returned unchanged (callers
    ///   racing fallible work use `T = Result<_, _>`; an `Err` output is
    ///   surfaced as-is, never wrapped);
    /// - the token fires: [`CancelTokenError::OperationCancelled`] carrying
    ///   the resolved triggered token;
    /// - the deadline elapses: [`CancelTokenError::Timeout`];
    /// - the caller drops the returned future: every operation, the token
    ///   wait, and the timer are dropped with it.
    ///
    /// If the token is already triggered on entry, this fails immediately
    /// with `OperationCancelled` without polling any operation. On every exit
    /// path the race owns all branches, so nothing stays scheduled once the
    /// call returns.
    ///
    /// [`wait`]: CancelToken::wait
    pub async fn cancellable_wait<'a, T: 'a>(
        &'a self,
        operations: impl IntoIterator<Item = BoxFuture<'a, T>>,
        timeout: Option<Duration>,
    ) -> Result<T, CancelTokenError> {
        if let Some(token) = self.triggered_token() {
            debug!(token = %token.name(), "cancellable wait refused: token already triggered");
            return Err(CancelTokenError::OperationCancelled(token));
        }

        let mut branches: Vec<BoxFuture<'a, Option<T>>> = operations
            .into_iter()
            .map(|operation| operation.map(Some).boxed())
            .collect();
        branches.push(self.wait().map(|()| None).boxed());

        let race = race_and_cleanup(branches);
        let (outcome, _) = match timeout {
            Some(limit) => tokio::time::timeout(limit, race).await.map_err(|_| {
                debug!(token = %self.inner.name, ?limit, "cancellable wait timed out");
                CancelTokenError::Timeout(limit)
            })?,
            None => race.await,
        };

        match outcome {
            Some(output) => Ok(output),
            None => {
                // The token branch won, so a trigger must be observable; the
                // fallback only guards against the flag racing out from under
                // a multi-threaded caller.
                let token = self.triggered_token().unwrap_or_else(|| self.clone());
                debug!(token = %token.name(), "cancellable wait cancelled by token");
                Err(CancelTokenError::OperationCancelled(token))
            }
        }
    }
}

impl PartialEq for CancelToken {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Eq for CancelToken {}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken")
            .field("name", &self.inner.name)
            .field("context", &self.inner.context)
            .field("triggered", &self.triggered())
            .finish()
    }
}

impl fmt::Display for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner.name)
    }
}
