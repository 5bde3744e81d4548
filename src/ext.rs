//! Extension trait for Result types.

use std::error::Error as StdError;

use core::panic::Location;

use crate::cause::Cause;
use crate::r#try::Try;

/// Convert a `Result` into a [`Try`], tracing the failure at the caller.
pub trait IntoTry<T> {
    /// `Ok` becomes `Success`, `Err` becomes `Failure` with a frame at the
    /// caller's location.
    fn into_try(self) -> Try<T>;

    /// As [`into_try`](Self::into_try), with a context message on failure.
    fn into_try_with(self, ctx: impl Into<String>) -> Try<T>;
}

impl<T, E> IntoTry<T> for core::result::Result<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    #[track_caller]
    fn into_try(self) -> Try<T> {
        let loc = Location::caller();
        match self {
            Ok(value) => Try::Success(value),
            Err(e) => Try::Failure(Cause::wrap(e).at(loc)),
        }
    }

    #[track_caller]
    fn into_try_with(self, ctx: impl Into<String>) -> Try<T> {
        let loc = Location::caller();
        match self {
            Ok(value) => Try::Success(value),
            Err(e) => Try::Failure(Cause::wrap(e).at(loc).ctx(ctx)),
        }
    }
}
