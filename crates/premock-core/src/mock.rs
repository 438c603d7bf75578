//! Call recorder and verifier.
//!
//! A [`Mock`] owns a [`ScopedOverride`] whose replacement is the recorder's
//! own closure: every call appends its argument tuple to the current
//! verification window and answers with the next programmed return value.
//!
//! ```text
//! Armed --call--> Recording --expect_called(n) ok--> window cleared, Recording
//!                           \--expect_called(n) err--> window kept
//! ```

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::checker::ParamChecker;
use crate::error::VerifyError;
use crate::scope::ScopedOverride;
use crate::signature::Signature;
use crate::slot::Slot;
use crate::structured_log::{LogLevel, Outcome, emit_with, events};

struct Recording<S: Signature> {
    window: Vec<S::Args>,
    returns: VecDeque<S::Output>,
    total: usize,
}

impl<S: Signature> Recording<S>
where
    S::Output: Default + Clone,
{
    fn record(&mut self, args: S::Args) -> S::Output {
        self.window.push(args);
        self.total += 1;
        self.next_return()
    }

    // FIFO; the last remaining value is sticky.
    fn next_return(&mut self) -> S::Output {
        if self.returns.len() > 1
            && let Some(value) = self.returns.pop_front()
        {
            return value;
        }
        self.returns.front().cloned().unwrap_or_default()
    }
}

/// Recording stand-in for one intercepted symbol.
///
/// The slot is restored when the recorder is dropped, whether or not any
/// verification ran.
#[must_use = "the recorder stops intercepting as soon as it is dropped"]
pub struct Mock<S: Signature> {
    state: Rc<RefCell<Recording<S>>>,
    scope: ScopedOverride<S>,
}

impl<S: Signature> Mock<S>
where
    S::Output: Default + Clone,
{
    /// Arm a recorder on `slot`: empty window, empty return queue.
    pub fn new(slot: Slot<S>) -> Self {
        let state = Rc::new(RefCell::new(Recording::<S> {
            window: Vec::new(),
            returns: VecDeque::new(),
            total: 0,
        }));
        let recorder = Rc::clone(&state);
        let callable = S::from_tuple_fn(move |args| recorder.borrow_mut().record(args));
        let scope = ScopedOverride::install(slot, callable);
        emit_with(LogLevel::Info, events::MOCK_ARMED, slot.symbol(), |entry| {
            entry.with_depth(slot.depth())
        });
        Self { state, scope }
    }

    /// Answer every call with `value`.
    pub fn return_value(&self, value: S::Output) -> &Self {
        self.return_values([value])
    }

    /// Replace the pending return queue. An empty iterator makes subsequent
    /// calls return `S::Output::default()`.
    pub fn return_values<I>(&self, values: I) -> &Self
    where
        I: IntoIterator<Item = S::Output>,
    {
        self.state.borrow_mut().returns = values.into_iter().collect();
        self
    }
}

impl<S: Signature> Mock<S> {
    /// Check that exactly `n` calls happened since the last successful check.
    ///
    /// On success the window is cleared and its calls are handed to the
    /// returned [`ParamChecker`]. On failure the window is left intact.
    pub fn expect_called(&self, n: usize) -> Result<ParamChecker<S>, VerifyError> {
        let symbol = self.slot().symbol();
        let actual = self.state.borrow().window.len();
        if actual != n {
            let err = VerifyError::CallCount {
                symbol,
                expected: n,
                actual,
            };
            emit_with(LogLevel::Warn, events::VERIFY_FAIL, symbol, |entry| {
                entry
                    .with_counts(n, actual)
                    .with_outcome(Outcome::Fail)
                    .with_details(serde_json::json!({ "kind": err.kind() }))
            });
            return Err(err);
        }
        let calls = std::mem::take(&mut self.state.borrow_mut().window);
        emit_with(LogLevel::Info, events::VERIFY_PASS, symbol, |entry| {
            entry.with_counts(n, actual).with_outcome(Outcome::Pass)
        });
        Ok(ParamChecker::new(self.slot(), calls))
    }

    pub fn expect_called_once(&self) -> Result<ParamChecker<S>, VerifyError> {
        self.expect_called(1)
    }

    pub fn expect_not_called(&self) -> Result<(), VerifyError> {
        self.expect_called(0).map(drop)
    }

    /// Calls recorded since the last successful verification.
    #[must_use]
    pub fn calls_in_window(&self) -> usize {
        self.state.borrow().window.len()
    }

    /// Calls recorded over the recorder's whole lifetime.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.state.borrow().total
    }

    #[must_use]
    pub fn slot(&self) -> Slot<S> {
        self.scope.slot()
    }
}

impl<S: Signature> fmt::Debug for Mock<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("Mock")
            .field("symbol", &self.slot().symbol())
            .field("window", &state.window.len())
            .field("pending_returns", &state.returns.len())
            .field("total", &state.total)
            .finish()
    }
}
