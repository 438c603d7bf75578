//! Scoped overrides.
//!
//! [`ScopedOverride`] installs a replacement into a [`Slot`] and restores the
//! exact callable it displaced when dropped, including during unwinding.
//! Guards on the same slot nest: releasing them in reverse order walks back
//! through each earlier replacement to the real implementation. A guard
//! released while a newer one is still live only removes its own
//! replacement; the newer one stays in force and the release is logged at
//! warn level.

use std::fmt;
use std::rc::Rc;

use crate::signature::{Implementation, Signature};
use crate::slot::Slot;
use crate::structured_log::{LogLevel, emit_with, events};

/// Live replacement of one slot on the current thread.
///
/// Not `Send`: the override belongs to the thread that installed it.
#[must_use = "the override is removed as soon as the guard is dropped"]
pub struct ScopedOverride<S: Signature> {
    slot: Slot<S>,
    token: Option<u64>,
}

impl<S: Signature> ScopedOverride<S> {
    /// Install `replacement` into `slot` on this thread.
    pub fn acquire<F: Implementation<S>>(slot: Slot<S>, replacement: F) -> Self {
        Self::install(slot, replacement.into_callable())
    }

    pub(crate) fn install(slot: Slot<S>, callable: Rc<S::Callable>) -> Self {
        let (token, depth) = slot.push(callable);
        emit_with(
            LogLevel::Debug,
            events::OVERRIDE_INSTALLED,
            slot.symbol(),
            |entry| entry.with_depth(depth),
        );
        Self {
            slot,
            token: Some(token),
        }
    }

    #[must_use]
    pub fn slot(&self) -> Slot<S> {
        self.slot
    }

    /// Remove the override now instead of at end of scope.
    pub fn restore(self) {
        drop(self);
    }
}

impl<S: Signature> Drop for ScopedOverride<S> {
    fn drop(&mut self) {
        let Some(token) = self.token.take() else {
            return;
        };
        // Thread-local storage may already be torn down when a guard is
        // leaked into another thread-local's destructor.
        let Some(release) = self.slot.pop(token) else {
            return;
        };
        let level = if release.in_order {
            LogLevel::Debug
        } else {
            LogLevel::Warn
        };
        emit_with(level, events::OVERRIDE_RESTORED, self.slot.symbol(), |entry| {
            let entry = entry.with_depth(release.depth);
            if release.in_order {
                entry
            } else {
                entry.with_details(serde_json::json!({ "out_of_order": true }))
            }
        });
    }
}

impl<S: Signature> fmt::Debug for ScopedOverride<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScopedOverride")
            .field("symbol", &self.slot.symbol())
            .field("active", &self.token.is_some())
            .finish()
    }
}

/// Install `replacement` into `slot` until the returned guard is dropped.
///
/// Most callers use the [`replace!`](crate::replace!) macro, which binds the
/// guard to the enclosing block.
pub fn replace<S, F>(slot: Slot<S>, replacement: F) -> ScopedOverride<S>
where
    S: Signature,
    F: Implementation<S>,
{
    ScopedOverride::acquire(slot, replacement)
}
