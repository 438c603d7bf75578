//! Code generation for intercepted symbols.

/// Declare forwarding entry points and their slots.
///
/// Each item names the entry point callers reach, the accessor for its slot
/// and the real implementation the slot starts with. The entry point keeps
/// the exact parameter list and return type; its only job is to invoke the
/// slot's current callable with the arguments, in order.
///
/// The `unsafe extern "C" fn` form exports an unmangled C-ABI symbol; the plain
/// `fn` form produces an ordinary Rust function.
///
/// ```
/// use premock_core::{intercept, mock};
///
/// fn checksum(data: u32) -> u32 {
///     data.count_ones()
/// }
///
/// intercept! {
///     fn ut_checksum(data: u32) -> u32 {
///         slot: checksum_slot,
///         real: checksum,
///     }
/// }
///
/// fn frame(data: u32) -> u32 {
///     ut_checksum(data) + 1
/// }
///
/// assert_eq!(frame(0b111), 4);
/// let recorder = mock!(checksum_slot);
/// recorder.return_value(41);
/// assert_eq!(frame(5), 42);
/// recorder.expect_called_once().unwrap().with_values((5,)).unwrap();
/// ```
#[macro_export]
macro_rules! intercept {
    () => {};
    (
        $(#[$meta:meta])*
        $vis:vis unsafe extern "C" fn $name:ident($($arg:ident : $ty:ty),* $(,)?) $(-> $ret:ty)? {
            slot: $slot:ident,
            real: $real:expr $(,)?
        }
        $($rest:tt)*
    ) => {
        $crate::__intercept_slot! {
            $vis $slot, $name, ($($arg : $ty),*) $(-> $ret)?, $real
        }

        $(#[$meta])*
        #[unsafe(no_mangle)]
        $vis unsafe extern "C" fn $name($($arg: $ty),*) $(-> $ret)? {
            $slot().call(($($arg,)*))
        }

        $crate::intercept! { $($rest)* }
    };
    (
        $(#[$meta:meta])*
        $vis:vis fn $name:ident($($arg:ident : $ty:ty),* $(,)?) $(-> $ret:ty)? {
            slot: $slot:ident,
            real: $real:expr $(,)?
        }
        $($rest:tt)*
    ) => {
        $crate::__intercept_slot! {
            $vis $slot, $name, ($($arg : $ty),*) $(-> $ret)?, $real
        }

        $(#[$meta])*
        $vis fn $name($($arg: $ty),*) $(-> $ret)? {
            $slot().call(($($arg,)*))
        }

        $crate::intercept! { $($rest)* }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __intercept_slot {
    ($vis:vis $slot:ident, $name:ident, ($($arg:ident : $ty:ty),*) $(-> $ret:ty)?, $real:expr) => {
        #[doc = concat!("Slot behind `", stringify!($name), "` on the calling thread.")]
        $vis fn $slot() -> $crate::Slot<fn($($ty),*) $(-> $ret)?> {
            #[allow(unused_unsafe, clippy::redundant_closure)]
            fn __premock_real() -> ::std::rc::Rc<dyn Fn($($ty),*) $(-> $ret)?> {
                $crate::Implementation::<fn($($ty),*) $(-> $ret)?>::into_callable(
                    |$($arg: $ty),*| unsafe { $real($($arg),*) },
                )
            }

            #[allow(unused_variables)]
            fn __premock_render(
                args: &<fn($($ty),*) $(-> $ret)? as $crate::Signature>::Args,
            ) -> ::std::string::String {
                let ($($arg,)*) = args;
                $crate::render::render_tuple(&[$($crate::render!(*$arg)),*])
            }

            ::std::thread_local! {
                static __PREMOCK_SLOT: $crate::SlotCell<fn($($ty),*) $(-> $ret)?> =
                    $crate::SlotCell::new(__premock_real());
            }

            $crate::Slot::new(
                &__PREMOCK_SLOT,
                stringify!($name),
                __premock_real,
                __premock_render,
            )
        }
    };
}

/// Replace a slot's implementation until the end of the enclosing block.
///
/// ```
/// # use premock_core::{intercept, replace};
/// # fn double(x: i32) -> i32 { x * 2 }
/// # intercept! { fn ut_double(x: i32) -> i32 { slot: double_slot, real: double } }
/// {
///     replace!(double_slot, |x: i32| x + 100);
///     assert_eq!(ut_double(1), 101);
/// }
/// assert_eq!(ut_double(1), 2);
/// ```
#[macro_export]
macro_rules! replace {
    ($slot:path, $replacement:expr $(,)?) => {
        let _premock_guard = $crate::replace($slot(), $replacement);
    };
}

/// Arm a [`Mock`](crate::Mock) on a slot accessor generated by [`intercept!`].
#[macro_export]
macro_rules! mock {
    ($slot:path $(,)?) => {
        $crate::Mock::new($slot())
    };
}
