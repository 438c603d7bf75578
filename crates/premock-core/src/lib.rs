//! Scoped interception and call verification for free functions.
//!
//! Production code reaches a dependency through a forwarding entry point
//! (`ut_send` instead of `send`, for instance). Tests swap what that entry
//! point does for the duration of a scope, then check how it was called.
//!
//! # Architecture
//!
//! ```text
//! redirected call -> forwarding entry (intercept!) -> Slot (thread-local)
//!                 -> current callable: real fn | replacement | Mock recorder
//! ```
//!
//! - **Signature** (`signature`): parameter tuple, return type and callable type of `fn(..) -> R`
//! - **Slot** (`slot`): per-thread cell holding the current callable
//! - **Scoped override** (`scope`): RAII guard that installs and restores a callable
//! - **Mock** (`mock`): recording override with programmable return values
//! - **Param checker** (`checker`): argument checks over one verification window
//! - **Renderer** (`render`, `diff`): diagnostic text for mismatched arguments
//! - **Configuration** (`config`) and **structured log** (`structured_log`): JSONL events
//!
//! ```
//! use premock_core::{intercept, mock, replace};
//!
//! fn lookup(key: u32) -> i64 {
//!     i64::from(key) * 2
//! }
//!
//! intercept! {
//!     fn ut_lookup(key: u32) -> i64 {
//!         slot: lookup_slot,
//!         real: lookup,
//!     }
//! }
//!
//! {
//!     replace!(lookup_slot, |_: u32| -1);
//!     assert_eq!(ut_lookup(7), -1);
//! }
//! assert_eq!(ut_lookup(7), 14);
//!
//! let recorder = mock!(lookup_slot);
//! recorder.return_values([10, 20]);
//! assert_eq!(ut_lookup(1) + ut_lookup(2) + ut_lookup(3), 50);
//! recorder
//!     .expect_called(3)?
//!     .with_value_list([(1,), (2,), (3,)])?;
//! # Ok::<(), premock_core::VerifyError>(())
//! ```

#![deny(unsafe_code)]

#[macro_use]
mod macros;

pub mod checker;
pub mod config;
pub mod diff;
pub mod error;
pub mod mock;
pub mod render;
pub mod scope;
pub mod signature;
pub mod slot;
pub mod structured_log;

pub use checker::ParamChecker;
pub use error::VerifyError;
pub use mock::Mock;
pub use scope::{ScopedOverride, replace};
pub use signature::{Implementation, Signature};
pub use slot::{Slot, SlotCell};
