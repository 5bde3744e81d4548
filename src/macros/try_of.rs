//! The `try_of!` macro.

/// Block form of [`Try::of`](crate::Try::of).
///
/// The block's value is the success value. Inside it, `?` accepts any error
/// type that converts into `Box<dyn Error + Send + Sync>`, so different error
/// types can be mixed without converting them first.
///
/// ```
/// use try_this::{try_of, Try};
/// use std::num::ParseIntError;
///
/// let sum: Try<i32> = try_of! {
///     let a: i32 = "1".parse()?;
///     let b: i32 = "2".parse()?;
///     a + b
/// };
/// assert_eq!(sum.get(), 3);
///
/// let bad: Try<i32> = try_of! { "x".parse::<i32>()? };
/// assert!(bad.get_cause().is::<ParseIntError>());
/// ```
///
/// A failed [`Cause`](crate::Cause) propagated with `?` keeps its trace:
///
/// ```
/// use try_this::{try_of, Cause, Try};
///
/// let inner: Try<i32> = Try::failure(Cause::msg("inner").here());
/// let outer: Try<i32> = try_of! { inner.into_result()? + 1 };
/// assert_eq!(outer.get_cause().depth(), 2);
/// ```
#[macro_export]
macro_rules! try_of {
    ($($body:tt)*) => {
        $crate::__of_boxed(|| -> ::core::result::Result<_, $crate::__BoxedError> {
            ::core::result::Result::Ok({ $($body)* })
        })
    };
}
