//! Interception slots.
//!
//! A slot is the per-thread cell that decides what an intercepted symbol does.
//! Each thread lazily gets its own [`SlotCell`], initialised to the real
//! implementation, so tests running on different threads can intercept the
//! same symbol without seeing each other's overrides. Code under test that
//! spawns its own threads therefore reaches the real implementation from
//! those threads.
//!
//! The cell is only mutated through [`ScopedOverride`](crate::ScopedOverride);
//! [`Slot`] itself exposes reads and invocation.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::thread::LocalKey;

use crate::mock::Mock;
use crate::scope::ScopedOverride;
use crate::signature::{Implementation, Signature};

/// Thread-local storage behind a [`Slot`].
///
/// Live overrides are kept as a stack keyed by a per-cell token. The top of
/// the stack is what the slot forwards to; an empty stack means the real
/// implementation captured at construction.
pub struct SlotCell<S: Signature> {
    real: Rc<S::Callable>,
    overrides: RefCell<Vec<(u64, Rc<S::Callable>)>>,
    next_token: Cell<u64>,
}

impl<S: Signature> SlotCell<S> {
    #[must_use]
    pub fn new(initial: Rc<S::Callable>) -> Self {
        Self {
            real: initial,
            overrides: RefCell::new(Vec::new()),
            next_token: Cell::new(0),
        }
    }

    fn current(&self) -> Rc<S::Callable> {
        self.overrides
            .borrow()
            .last()
            .map_or_else(|| Rc::clone(&self.real), |(_, top)| Rc::clone(top))
    }
}

/// Outcome of releasing one override.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Release {
    /// Overrides still live after the release.
    pub depth: usize,
    /// False when a newer override was still live on top of the released one.
    pub in_order: bool,
}

/// Handle to one intercepted symbol's slot on the calling thread.
///
/// Handles are produced by the accessor function `intercept!` generates and
/// are cheap to copy; every method resolves the calling thread's cell.
pub struct Slot<S: Signature> {
    key: &'static LocalKey<SlotCell<S>>,
    symbol: &'static str,
    real: fn() -> Rc<S::Callable>,
    render: fn(&S::Args) -> String,
}

impl<S: Signature> Clone for Slot<S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: Signature> Copy for Slot<S> {}

impl<S: Signature> fmt::Debug for Slot<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("symbol", &self.symbol)
            .field("arity", &S::ARITY)
            .finish()
    }
}

impl<S: Signature> Slot<S> {
    #[doc(hidden)]
    pub const fn new(
        key: &'static LocalKey<SlotCell<S>>,
        symbol: &'static str,
        real: fn() -> Rc<S::Callable>,
        render: fn(&S::Args) -> String,
    ) -> Self {
        Self {
            key,
            symbol,
            real,
            render,
        }
    }

    /// Name of the forwarding entry point this slot serves.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        self.symbol
    }

    /// Invoke whatever currently occupies the slot.
    ///
    /// The callable is cloned out before the call so the implementation may
    /// itself install or drop overrides on this slot. Once the thread's
    /// storage has been torn down (a call from another thread-local's
    /// destructor) the real implementation is invoked.
    #[inline]
    pub fn call(&self, args: S::Args) -> S::Output {
        let current = self.current();
        S::call(&*current, args)
    }

    /// The callable currently installed on this thread.
    ///
    /// Falls back to a fresh real callable after thread-local teardown.
    #[must_use]
    pub fn current(&self) -> Rc<S::Callable> {
        self.key
            .try_with(SlotCell::current)
            .unwrap_or_else(|_| (self.real)())
    }

    /// A fresh callable bound to the real implementation.
    #[must_use]
    pub fn real(&self) -> Rc<S::Callable> {
        (self.real)()
    }

    /// Number of overrides currently live on this thread.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.key
            .try_with(|cell| cell.overrides.borrow().len())
            .unwrap_or(0)
    }

    /// True when the slot forwards to the real implementation on this thread.
    ///
    /// Compares the installed callable against the one captured when the
    /// thread's cell was created, so a replacement that merely wraps the real
    /// function still counts as an override.
    #[must_use]
    pub fn is_real(&self) -> bool {
        self.key
            .try_with(|cell| Rc::ptr_eq(&cell.current(), &cell.real))
            .unwrap_or(true)
    }

    /// Render an argument tuple the way mismatch diagnostics do.
    #[must_use]
    pub fn render_args(&self, args: &S::Args) -> String {
        (self.render)(args)
    }

    /// Install `replacement` until the returned guard is dropped.
    pub fn replace<F: Implementation<S>>(self, replacement: F) -> ScopedOverride<S> {
        ScopedOverride::acquire(self, replacement)
    }

    /// Start recording calls until the returned recorder is dropped.
    pub fn mock(self) -> Mock<S>
    where
        S::Output: Default + Clone,
    {
        Mock::new(self)
    }

    /// Push `next` on top of the live overrides. Returns the token that
    /// releases it and the new depth.
    pub(crate) fn push(&self, next: Rc<S::Callable>) -> (u64, usize) {
        self.key.with(|cell| {
            let token = cell.next_token.get();
            cell.next_token.set(token.wrapping_add(1));
            let mut overrides = cell.overrides.borrow_mut();
            overrides.push((token, next));
            (token, overrides.len())
        })
    }

    /// Remove the override pushed under `token`, wherever it sits in the
    /// stack. Returns `None` if the thread's storage is already gone or the
    /// token is not live.
    pub(crate) fn pop(&self, token: u64) -> Option<Release> {
        let (removed, release) = self
            .key
            .try_with(|cell| {
                let mut overrides = cell.overrides.borrow_mut();
                let index = overrides.iter().rposition(|(t, _)| *t == token)?;
                let in_order = index + 1 == overrides.len();
                let (_, removed) = overrides.remove(index);
                let depth = overrides.len();
                Some((removed, Release { depth, in_order }))
            })
            .ok()
            .flatten()?;
        // Released after the borrow ends: it may own a recorder whose drop
        // touches this slot.
        drop(removed);
        Some(release)
    }
}
