//! Compile-time signature extraction.
//!
//! [`Signature`] is implemented for plain function-pointer types
//! `fn(A1, .., An) -> R` with `n` in `0..=12`. It names the argument tuple
//! stored by recorders, the return type, and the unsized callable type a slot
//! holds. Anything that is not a plain `fn` pointer type has no impl, so
//! misuse is rejected by the type checker rather than at runtime.

use std::rc::Rc;

/// Type-level description of an intercepted free function.
pub trait Signature: Copy + 'static {
    /// Parameters as an owned tuple, in declaration order.
    type Args: 'static;
    /// Return type (`()` for functions without one).
    type Output: 'static;
    /// Unsized callable able to hold any implementation of the signature.
    type Callable: ?Sized + 'static;

    /// Number of parameters.
    const ARITY: usize;

    /// Invoke `callable` with the unpacked `args`.
    fn call(callable: &Self::Callable, args: Self::Args) -> Self::Output;

    /// Adapt a tuple-taking function into the n-ary callable.
    fn from_tuple_fn<F>(f: F) -> Rc<Self::Callable>
    where
        F: Fn(Self::Args) -> Self::Output + 'static;
}

/// Anything that can be installed into a slot of signature `S`.
///
/// Blanket-implemented for every `Fn` whose parameters and result match `S`
/// exactly, which covers closures, function items and function pointers.
/// Closure parameters need type annotations: the expected signature is
/// selected through this trait, not through a direct `Fn` bound.
pub trait Implementation<S: Signature> {
    fn into_callable(self) -> Rc<S::Callable>;
}

macro_rules! count_params {
    () => { 0usize };
    ($head:ident $($tail:ident)*) => { 1usize + count_params!($($tail)*) };
}

macro_rules! signature_impls {
    ($( [$($arg:ident : $ty:ident),*] )*) => {
        $(
            impl<R: 'static, $($ty: 'static),*> Signature for fn($($ty),*) -> R {
                type Args = ($($ty,)*);
                type Output = R;
                type Callable = dyn Fn($($ty),*) -> R;

                const ARITY: usize = count_params!($($ty)*);

                #[inline]
                fn call(callable: &Self::Callable, args: Self::Args) -> R {
                    let ($($arg,)*) = args;
                    callable($($arg),*)
                }

                fn from_tuple_fn<F>(f: F) -> Rc<Self::Callable>
                where
                    F: Fn(Self::Args) -> R + 'static,
                {
                    Rc::new(move |$($arg: $ty),*| f(($($arg,)*)))
                }
            }

            impl<F, R: 'static, $($ty: 'static),*> Implementation<fn($($ty),*) -> R> for F
            where
                F: Fn($($ty),*) -> R + 'static,
            {
                fn into_callable(self) -> Rc<dyn Fn($($ty),*) -> R> {
                    Rc::new(self)
                }
            }
        )*
    };
}

signature_impls! {
    []
    [a0: A0]
    [a0: A0, a1: A1]
    [a0: A0, a1: A1, a2: A2]
    [a0: A0, a1: A1, a2: A2, a3: A3]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8, a9: A9]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8, a9: A9, a10: A10]
    [a0: A0, a1: A1, a2: A2, a3: A3, a4: A4, a5: A5, a6: A6, a7: A7, a8: A8, a9: A9, a10: A10, a11: A11]
}
