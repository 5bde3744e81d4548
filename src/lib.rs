//! try-this - failing computations as values
//!
//! # Overview
//!
//! [`Try<T>`] holds the outcome of a computation that already ran: either
//! `Success(value)` or `Failure(cause)`. Errors and panics raised by the
//! computation, or by any closure given to a combinator, are captured at
//! that boundary and travel as data. The captured [`Cause`] is the original
//! error, with a trace of where it was captured.
//!
//! # Quick Start
//!
//! ```
//! use try_this::Try;
//!
//! let port: Try<u16> = Try::of(|| "80a".parse::<u16>())
//!     .context("reading port")
//!     .recover(|_| 8080);
//! assert_eq!(port.get(), 8080);
//! ```
//!
//! # Operations
//!
//! ## Construction
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `Try::success(v)` / `Try::failure(e)` | Build a resolved `Try` |
//! | `Try::of(\|\| ..)` | Run a fallible computation now |
//! | `Try::run(\|\| ..)` | Same, for a computation without a value |
//! | `try_of! { .. }` | Block form, `?` accepts any std error |
//! | `with_resources(\|\| ..).of(\|r\| ..)` | Acquire, use, release exactly once |
//!
//! ## Transformation
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `map(f)` / `try_map(f)` | Transform a success value |
//! | `flat_map(f)` | Chain a computation returning `Try` |
//! | `filter_try(p)` / `filter_try_or(p, e)` | Fail a success the predicate rejects |
//!
//! ## Recovery
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `failed()` | Swap: the cause becomes the value |
//! | `recover(f)` / `recover_with(f)` | Recover from any failure |
//! | `recover_from(\|e: E\| ..)` | Recover only from root errors of type `E` |
//! | `recover_value::<E>(v)` | Substitute a constant for `E` failures |
//! | `recover_if(p, f)` | Recover when a predicate accepts the cause |
//! | `map_failure(f)` | Replace the cause |
//! | `or_else(t)` / `or_else_with(f)` | Fall back to another `Try` |
//!
//! ## Side effects
//!
//! | Operation | Description |
//! |-----------|-------------|
//! | `and_then(f)` | Effect on success; failure of `f` fails the `Try` |
//! | `and_finally(f)` | Cleanup that always runs, never masks a failure |
//! | `on_success(f)` / `on_failure(f)` | Peek without changing the outcome |
//! | `context(msg)` / `attach(k, v)` | Annotate a failure's trace |
//!
//! # Features
//!
//! - `serde`: serialization for [`Cause`], [`Value`] and [`Try`]
//! - `tracing`: debug events for captured panics and suppressed cleanup
//!   failures

// Lets `#[derive(Resource)]` expand to `::try_this::..` inside this crate too.
extern crate self as try_this;

// ============================================================
// Modules
// ============================================================

mod cause;
mod ext;
mod kinds;
mod log;
mod macros;
mod resource;
mod r#try;
mod value;

// ============================================================
// Re-exports
// ============================================================

pub use cause::{BoxedError, Cause, FrameView, DEFAULT_CONTEXT_LIMIT, DEFAULT_FRAME_LIMIT};
pub use ext::IntoTry;
pub use kinds::{Message, NoSuchElement, Panicked};
pub use r#try::Try;
pub use resource::{with_resources, Closing, Resource, WithResources};
pub use value::{IntoValue, Value};

/// Derive [`Resource`] for a struct: fields close in reverse declaration
/// order, `#[resource(skip)]` fields are dropped without closing.
pub use try_this_macros::Resource;

// Internal helpers for macros
#[doc(hidden)]
pub use macros::{__BoxedError, __of_boxed};
#[doc(hidden)]
pub use resource::{__release_into, __released};

// ============================================================
// Type aliases
// ============================================================

/// Result type alias.
///
/// Closures given to combinators return `Result<U>`, so `?` works on the
/// std error types [`Cause`] converts from.
pub type Result<T, E = Cause> = core::result::Result<T, E>;

/// `Ok`/`Err` constructors with the error type fixed to [`Cause`].
///
/// Useful where inference cannot see the error type, such as
/// `Try::of(|| Ok(1))`.
#[allow(non_snake_case)]
pub mod result {
    use super::Cause;

    /// Result type alias.
    pub type Result<T> = core::result::Result<T, Cause>;

    /// Create an `Ok` result.
    #[inline]
    pub fn Ok<T>(v: T) -> Result<T> {
        core::result::Result::Ok(v)
    }

    /// Create an `Err` result with automatic conversion to `Cause`.
    #[inline]
    pub fn Err<T>(e: impl Into<Cause>) -> Result<T> {
        core::result::Result::Err(e.into())
    }
}
