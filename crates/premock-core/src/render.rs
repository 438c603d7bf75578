//! Diagnostic rendering of recorded values.
//!
//! Whether a type has a textual form is decided statically per type through
//! autoref-based method resolution: [`RenderText`] is implemented on
//! `Probe<T>` when `T: Debug`, and [`RenderPlaceholder`] on `&Probe<T>` for
//! every `T`. A call of the form `(&Probe(&value)).render_value()` picks the
//! by-value candidate first, so `Debug` types render their text and all other
//! types fall through to [`PLACEHOLDER`]. The probe only works where the
//! value's type is concrete, which is why [`render!`](crate::render!) is a
//! macro and why `intercept!` builds each symbol's tuple renderer at
//! expansion time.
//!
//! Rendering is used only for mismatch diagnostics and never participates in
//! equality.

use std::fmt;

/// Text produced for values whose type has no textual form.
pub const PLACEHOLDER: &str = "<cannot print>";

#[doc(hidden)]
pub struct Probe<'a, T: ?Sized>(pub &'a T);

#[doc(hidden)]
pub trait RenderText {
    fn render_value(&self) -> String;
}

impl<T: fmt::Debug + ?Sized> RenderText for Probe<'_, T> {
    fn render_value(&self) -> String {
        format!("{:?}", self.0)
    }
}

#[doc(hidden)]
pub trait RenderPlaceholder {
    fn render_value(&self) -> String;
}

impl<T: ?Sized> RenderPlaceholder for &Probe<'_, T> {
    fn render_value(&self) -> String {
        PLACEHOLDER.to_owned()
    }
}

/// Join already-rendered tuple elements as `(a, b, c)`.
#[must_use]
pub fn render_tuple(elements: &[String]) -> String {
    format!("({})", elements.join(", "))
}

/// Render a value for diagnostics: its `Debug` text, or [`PLACEHOLDER`].
///
/// ```
/// struct Opaque;
/// assert_eq!(premock_core::render!(42_i32), "42");
/// assert_eq!(premock_core::render!(Opaque), "<cannot print>");
/// ```
#[macro_export]
macro_rules! render {
    ($value:expr) => {{
        #[allow(unused_imports)]
        use $crate::render::{RenderPlaceholder as _, RenderText as _};
        (&$crate::render::Probe(&$value)).render_value()
    }};
}
