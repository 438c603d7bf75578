//! Argument checks over one verification window.

use std::fmt;
use std::ops::Range;

use crate::error::VerifyError;
use crate::signature::Signature;
use crate::slot::Slot;
use crate::structured_log::{LogLevel, Outcome, emit_with, events};

/// Snapshot of the argument tuples recorded in one verification window.
///
/// Produced by a successful [`Mock::expect_called`](crate::Mock::expect_called).
/// Every check consumes the checker, so each window is checked once.
#[must_use = "a checker does nothing until one of its `with_*` checks runs"]
pub struct ParamChecker<S: Signature> {
    slot: Slot<S>,
    calls: Vec<S::Args>,
}

impl<S: Signature> ParamChecker<S> {
    pub(crate) fn new(slot: Slot<S>, calls: Vec<S::Args>) -> Self {
        Self { slot, calls }
    }

    /// Number of calls in the window.
    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    /// Recorded argument tuples in call order.
    #[must_use]
    pub fn calls(&self) -> &[S::Args] {
        &self.calls
    }

    #[must_use]
    pub fn into_calls(self) -> Vec<S::Args> {
        self.calls
    }

    fn fail(&self, err: VerifyError) -> VerifyError {
        emit_with(LogLevel::Warn, events::VERIFY_FAIL, self.slot.symbol(), |entry| {
            let entry = entry
                .with_outcome(Outcome::Fail)
                .with_details(serde_json::json!({ "kind": err.kind() }));
            match &err {
                VerifyError::ListSize {
                    expected, actual, ..
                } => entry.with_counts(*expected, *actual),
                _ => entry,
            }
        });
        err
    }

    fn mismatch(&self, index: usize, expected: &S::Args, actual: &S::Args) -> VerifyError {
        self.fail(VerifyError::ValueMismatch {
            symbol: self.slot.symbol(),
            index,
            expected: self.slot.render_args(expected),
            actual: self.slot.render_args(actual),
        })
    }
}

impl<S: Signature> ParamChecker<S>
where
    S::Args: PartialEq,
{
    /// Compare `expected` against the most recent call in the window.
    pub fn with_values(self, expected: S::Args) -> Result<(), VerifyError> {
        let Some(actual) = self.calls.last() else {
            return Err(self.fail(VerifyError::NoCalls {
                symbol: self.slot.symbol(),
            }));
        };
        if *actual != expected {
            return Err(self.mismatch(self.calls.len() - 1, &expected, actual));
        }
        Ok(())
    }

    /// Compare `expected` against every call in the window, in order.
    pub fn with_value_list<I>(self, expected: I) -> Result<(), VerifyError>
    where
        I: IntoIterator<Item = S::Args>,
    {
        let window = self.calls.len();
        self.with_value_list_in(expected, 0..window)
    }

    /// Compare `expected` against calls `range.start..range.end` of the window.
    pub fn with_value_list_in<I>(self, expected: I, range: Range<usize>) -> Result<(), VerifyError>
    where
        I: IntoIterator<Item = S::Args>,
    {
        let symbol = self.slot.symbol();
        let window = self.calls.len();
        if range.start > range.end || range.end > window {
            return Err(self.fail(VerifyError::WindowRange {
                symbol,
                start: range.start,
                end: range.end,
                window,
            }));
        }

        let expected: Vec<S::Args> = expected.into_iter().collect();
        if expected.len() != range.len() {
            return Err(self.fail(VerifyError::ListSize {
                symbol,
                expected: expected.len(),
                actual: range.len(),
            }));
        }

        let actual = &self.calls[range.clone()];
        if let Some(offset) = expected.iter().zip(actual).position(|(e, a)| e != a) {
            return Err(self.mismatch(range.start + offset, &expected[offset], &actual[offset]));
        }
        Ok(())
    }
}

impl<S: Signature> fmt::Debug for ParamChecker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self
            .calls
            .iter()
            .map(|args| self.slot.render_args(args))
            .collect();
        f.debug_struct("ParamChecker")
            .field("symbol", &self.slot.symbol())
            .field("calls", &rendered)
            .finish()
    }
}
