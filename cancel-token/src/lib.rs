//! # Cancel Token
//!
//! A Rust implementation of the `asyncio-cancel-token` cancellation pattern.
//!
//! Cancel Token provides a cooperative cancellation primitive for structured
//! concurrent code:
//!
//! - **One-shot tokens**: A [`token::CancelToken`] is triggered at most once;
//!   re-triggering is a no-op
//! - **Chaining**: Tokens compose into a tree — a chained token is triggered
//!   when any of its operands is
//! - **Cancellable races**: Arbitrary operations race against a token (and an
//!   optional timeout), with every losing branch cancelled and settled before
//!   the call returns
//!
//! ## Quick Start
//!
//! ```rust
//! use std::time::Duration;
//! use futures::FutureExt;
//! use cancel_token::prelude::*;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), CancelTokenError> {
//! let shutdown = CancelToken::new("shutdown");
//! let request = CancelToken::new("request");
//! let combined = shutdown.chain(&request)?;
//!
//! let work = async { "payload" }.boxed();
//! let result = combined
//!     .cancellable_wait([work], Some(Duration::from_secs(1)))
//!     .await?;
//! assert_eq!(result, "payload");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod errors;
pub mod token;

mod race;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::errors::CancelTokenError;
    pub use crate::token::{CancelToken, ContextId};
}
