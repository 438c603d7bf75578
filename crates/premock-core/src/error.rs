//! Verification failures.

use thiserror::Error;

use crate::diff::render_diff;

/// A failed call-count or argument assertion on a recorder.
///
/// Returned, never swallowed: a test that propagates it with `?` or panics on
/// it unwinds through the live guards, which still restore every slot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerifyError {
    #[error("`{symbol}` expected to be called {expected} time(s) but was called {actual} time(s)")]
    CallCount {
        symbol: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error(
        "`{symbol}` expected-argument list has {expected} tuple(s) but the checked window has {actual} call(s)"
    )]
    ListSize {
        symbol: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("`{symbol}` arguments of call {index} do not match\n{}", render_diff(.expected, .actual))]
    ValueMismatch {
        symbol: &'static str,
        index: usize,
        expected: String,
        actual: String,
    },
    #[error("`{symbol}` has no recorded calls to check values against")]
    NoCalls { symbol: &'static str },
    #[error("`{symbol}` range {start}..{end} does not fit a window of {window} call(s)")]
    WindowRange {
        symbol: &'static str,
        start: usize,
        end: usize,
        window: usize,
    },
}

impl VerifyError {
    /// Name of the intercepted symbol the failure belongs to.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::CallCount { symbol, .. }
            | Self::ListSize { symbol, .. }
            | Self::ValueMismatch { symbol, .. }
            | Self::NoCalls { symbol }
            | Self::WindowRange { symbol, .. } => *symbol,
        }
    }

    /// Stable event label used in structured logs.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CallCount { .. } => "call_count",
            Self::ListSize { .. } => "list_size",
            Self::ValueMismatch { .. } => "value_mismatch",
            Self::NoCalls { .. } => "no_calls",
            Self::WindowRange { .. } => "window_range",
        }
    }
}
