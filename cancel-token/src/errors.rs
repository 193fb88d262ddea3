//! Error types for token chaining and cancellable waits.
//!
//! The taxonomy mirrors the outcomes a caller can branch on: a structural
//! chaining error, cancellation by a token, and a timeout. A failure raised
//! by a raced operation is not represented here — it travels unchanged in the
//! operation's own output type — and external cancellation of a pending call
//! is the drop of its future, which carries no error value.

use crate::token::{CancelToken, ContextId};
use std::time::Duration;
use thiserror::Error;

/// The error type for cancel-token operations.
#[derive(Debug, Clone, Error)]
pub enum CancelTokenError {
    /// Two tokens bound to different execution contexts were chained.
    ///
    /// Raised synchronously by [`CancelToken::chain`] before any composite
    /// token is constructed; neither operand is modified.
    #[error(
        "cannot chain `{left_name}` ({left_context}) with `{right_name}` ({right_context}): \
         tokens are bound to different execution contexts"
    )]
    EventLoopMismatch {
        /// Name of the token `chain` was invoked on.
        left_name: String,
        /// Execution context of the token `chain` was invoked on.
        left_context: ContextId,
        /// Name of the other operand.
        right_name: String,
        /// Execution context of the other operand.
        right_context: ContextId,
    },

    /// The token (or one of its descendants) fired before any raced operation
    /// finished.
    ///
    /// Carries the specific token whose own trigger flag caused the
    /// cancellation. This is a normal control-flow outcome of
    /// [`CancelToken::cancellable_wait`], not a defect.
    #[error("operation cancelled by token `{0}`")]
    OperationCancelled(CancelToken),

    /// The deadline elapsed before any operation or the token finished.
    #[error("no operation completed within {0:?}")]
    Timeout(Duration),
}

impl CancelTokenError {
    /// Returns the token that caused an [`OperationCancelled`] outcome.
    ///
    /// [`OperationCancelled`]: CancelTokenError::OperationCancelled
    #[must_use]
    pub fn cancelling_token(&self) -> Option<&CancelToken> {
        match self {
            Self::OperationCancelled(token) => Some(token),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display_names_both_tokens() {
        let err = CancelTokenError::EventLoopMismatch {
            left_name: "a".to_string(),
            left_context: ContextId::ambient(),
            right_name: "b".to_string(),
            right_context: ContextId::fresh(),
        };
        let rendered = err.to_string();
        assert!(rendered.contains("`a`"));
        assert!(rendered.contains("`b`"));
        assert!(rendered.contains("different execution contexts"));
    }

    #[test]
    fn test_operation_cancelled_display_names_token() {
        let token = CancelToken::new("worker");
        let err = CancelTokenError::OperationCancelled(token);
        assert_eq!(err.to_string(), "operation cancelled by token `worker`");
    }

    #[test]
    fn test_cancelling_token_accessor() {
        let token = CancelToken::new("worker");
        let err = CancelTokenError::OperationCancelled(token.clone());
        assert_eq!(err.cancelling_token(), Some(&token));
        assert!(CancelTokenError::Timeout(Duration::from_secs(1))
            .cancelling_token()
            .is_none());
    }
}
