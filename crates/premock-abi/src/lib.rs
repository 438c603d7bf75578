// Forwarding entries accept raw pointers from C callers and hand them to the
// slot untouched, so per-function safety docs would only restate libc's.
#![allow(clippy::missing_safety_doc)]
//! # premock-abi
//!
//! Unmangled `ut_*` entry points for common OS calls.
//!
//! C code whose call sites were redirected at build time (`send` -> `ut_send`)
//! links this crate as a static library. Each entry forwards to its slot,
//! which starts out bound to the real `libc` function; tests reach the slot
//! through the matching `mock_*` accessor.
//!
//! ```text
//! C caller -> ut_send (this crate) -> slot -> libc::send | replacement | Mock
//! ```

pub mod socket_abi;
pub mod unistd_abi;

pub use socket_abi::{mock_connect, mock_recv, mock_send, mock_socket};
pub use unistd_abi::{mock_close, mock_read, mock_write};
