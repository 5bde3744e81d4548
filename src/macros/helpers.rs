//! Hidden helpers the exported macros expand to.

use core::panic::Location;

use crate::cause::{BoxedError, Cause};
use crate::r#try::{capture_at, Try};

/// Error type of `try_of!` bodies: any std error converts into it with `?`.
#[doc(hidden)]
pub type __BoxedError = BoxedError;

/// Capture a `try_of!` body, unwrapping a boxed [`Cause`] instead of
/// nesting it.
#[doc(hidden)]
#[track_caller]
#[inline]
pub fn __of_boxed<T, F>(body: F) -> Try<T>
where
    F: FnOnce() -> core::result::Result<T, BoxedError>,
{
    capture_at(Location::caller(), || body().map_err(Cause::from_box))
}
