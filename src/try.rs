//! The `Try` type and its combinators.
//!
//! Every closure handed to a combinator runs behind a capture boundary: an
//! `Err` it returns, or a panic it raises, becomes a `Failure` and never
//! escapes. The only ways a cause leaves a `Try` are [`Try::get`] and
//! [`Try::get_cause`], which panic on the wrong variant, and the
//! non-panicking accessors.

use std::error::Error as StdError;
use std::panic::{self, AssertUnwindSafe};

use core::fmt;
use core::panic::Location;

use crate::cause::Cause;
use crate::kinds::NoSuchElement;
use crate::log;
use crate::value::IntoValue;
use crate::Result;

/// Outcome of a computation that may fail.
///
/// A `Try` is always fully resolved: the computation ran to completion when
/// the `Try` was created. Combinators consume `self` and return a new `Try`.
///
/// # Examples
///
/// ```
/// use try_this::Try;
///
/// let parsed = Try::of(|| "1".parse::<i32>()).map(|n| n * 10);
/// assert_eq!(parsed.get(), 10);
///
/// let parsed = Try::of(|| "a".parse::<i32>()).recover(|_| -1);
/// assert_eq!(parsed.get(), -1);
/// ```
#[must_use = "a Try may hold a failure that should be handled"]
#[derive(Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum Try<T> {
    /// The computation returned a value.
    Success(T),
    /// The computation failed with this cause.
    Failure(Cause),
}

// ============================================================
// Capture boundary
// ============================================================

/// Run `f`, turning an `Err` or a panic into a `Failure` traced at `loc`.
pub(crate) fn capture_at<U, E, F>(loc: &'static Location<'static>, f: F) -> Try<U>
where
    F: FnOnce() -> core::result::Result<U, E>,
    E: StdError + Send + Sync + 'static,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Try::Success(value),
        Ok(Err(e)) => Try::Failure(Cause::wrap(e).at(loc)),
        Err(payload) => {
            let cause = Cause::from_panic(payload).at(loc);
            log::captured_panic(&cause);
            Try::Failure(cause)
        }
    }
}

/// [`capture_at`] at the caller's location.
#[track_caller]
pub(crate) fn capture<U, E, F>(f: F) -> Try<U>
where
    F: FnOnce() -> core::result::Result<U, E>,
    E: StdError + Send + Sync + 'static,
{
    capture_at(Location::caller(), f)
}

// ============================================================
// Construction
// ============================================================

impl<T> Try<T> {
    /// A successful `Try` holding `value`.
    #[inline]
    pub fn success(value: T) -> Self {
        Try::Success(value)
    }

    /// A failed `Try` holding `cause`.
    ///
    /// A [`Cause`] is stored as is, keeping its trace.
    #[inline]
    pub fn failure<E>(cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Try::Failure(Cause::wrap(cause))
    }

    /// Run `supplier` now and capture its outcome.
    ///
    /// `Ok(v)` becomes `Success(v)`. `Err(e)` or a panic becomes a
    /// `Failure` whose root is `e` (or [`Panicked`](crate::Panicked)),
    /// with a trace frame at the caller.
    ///
    /// ```
    /// use try_this::Try;
    /// use std::num::ParseIntError;
    ///
    /// let t = Try::of(|| "a".parse::<i32>());
    /// assert!(t.is_failure());
    /// assert!(t.get_cause().is::<ParseIntError>());
    /// ```
    #[track_caller]
    pub fn of<E, F>(supplier: F) -> Self
    where
        F: FnOnce() -> Result<T, E>,
        E: StdError + Send + Sync + 'static,
    {
        capture(supplier)
    }
}

impl Try<()> {
    /// Run `procedure` now for its effect; success carries `()`.
    #[track_caller]
    pub fn run<E, F>(procedure: F) -> Self
    where
        F: FnOnce() -> Result<(), E>,
        E: StdError + Send + Sync + 'static,
    {
        capture(procedure)
    }
}

// ============================================================
// Queries
// ============================================================

impl<T> Try<T> {
    #[inline]
    pub fn is_success(&self) -> bool {
        matches!(self, Try::Success(_))
    }

    #[inline]
    pub fn is_failure(&self) -> bool {
        matches!(self, Try::Failure(_))
    }

    /// Return the value, or re-raise the captured cause.
    ///
    /// # Panics
    ///
    /// Panics on `Failure`. The panic payload is the [`Cause`] itself, so a
    /// surrounding [`Try::of`] (or any combinator) captures the very same
    /// cause again.
    #[track_caller]
    pub fn get(self) -> T {
        match self {
            Try::Success(value) => value,
            Try::Failure(cause) => panic::panic_any(cause),
        }
    }

    /// Return the captured cause.
    ///
    /// # Panics
    ///
    /// Panics on `Success`.
    #[track_caller]
    pub fn get_cause(self) -> Cause {
        match self {
            Try::Success(_) => panic!("called `Try::get_cause()` on a `Success` value"),
            Try::Failure(cause) => cause,
        }
    }

    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            Try::Success(value) => Some(value),
            Try::Failure(_) => None,
        }
    }

    #[inline]
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            Try::Success(_) => None,
            Try::Failure(cause) => Some(cause),
        }
    }

    #[inline]
    pub fn ok(self) -> Option<T> {
        match self {
            Try::Success(value) => Some(value),
            Try::Failure(_) => None,
        }
    }

    #[inline]
    pub fn err(self) -> Option<Cause> {
        match self {
            Try::Success(_) => None,
            Try::Failure(cause) => Some(cause),
        }
    }

    /// Borrow the contents as a `Result`.
    #[inline]
    pub fn as_ref(&self) -> core::result::Result<&T, &Cause> {
        match self {
            Try::Success(value) => Ok(value),
            Try::Failure(cause) => Err(cause),
        }
    }

    /// Convert into a `Result`, for use with `?`.
    #[inline]
    pub fn into_result(self) -> Result<T> {
        match self {
            Try::Success(value) => Ok(value),
            Try::Failure(cause) => Err(cause),
        }
    }

    pub fn get_or_else(self, default: T) -> T {
        match self {
            Try::Success(value) => value,
            Try::Failure(_) => default,
        }
    }

    pub fn get_or_else_with<F>(self, f: F) -> T
    where
        F: FnOnce(Cause) -> T,
    {
        match self {
            Try::Success(value) => value,
            Try::Failure(cause) => f(cause),
        }
    }

    /// Collapse both variants into one value.
    pub fn fold<U, FF, FS>(self, on_failure: FF, on_success: FS) -> U
    where
        FF: FnOnce(Cause) -> U,
        FS: FnOnce(T) -> U,
    {
        match self {
            Try::Success(value) => on_success(value),
            Try::Failure(cause) => on_failure(cause),
        }
    }
}

// ============================================================
// Transformation
// ============================================================

impl<T> Try<T> {
    /// Apply `f` to a success value. A panic in `f` becomes a `Failure`.
    #[track_caller]
    pub fn map<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(T) -> U,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => capture_at(loc, move || Ok::<U, Cause>(f(value))),
            Try::Failure(cause) => Try::Failure(cause),
        }
    }

    /// Apply a fallible `f` to a success value.
    ///
    /// ```
    /// use try_this::Try;
    ///
    /// let t = Try::success("12").try_map(|s| Ok(s.parse::<u8>()?));
    /// assert_eq!(t.get(), 12);
    /// ```
    #[track_caller]
    pub fn try_map<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(T) -> Result<U>,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => capture_at(loc, move || f(value)),
            Try::Failure(cause) => Try::Failure(cause),
        }
    }

    /// Chain a computation that itself produces a `Try`. The inner `Try`
    /// is returned directly, never nested.
    #[track_caller]
    pub fn flat_map<U, F>(self, f: F) -> Try<U>
    where
        F: FnOnce(T) -> Try<U>,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => capture_at(loc, move || Ok::<Try<U>, Cause>(f(value))).flatten(),
            Try::Failure(cause) => Try::Failure(cause),
        }
    }

    /// Keep a success only if `predicate` holds for it.
    ///
    /// - predicate returns `Err` or panics: that becomes the cause
    /// - predicate returns `false`: [`NoSuchElement`] naming the value
    /// - `Failure`: unchanged, predicate not called
    ///
    /// ```
    /// use try_this::{NoSuchElement, Try};
    ///
    /// let t = Try::success(1).filter_try(|v| Ok(*v > 10));
    /// let cause = t.get_cause();
    /// assert!(cause.is::<NoSuchElement>());
    /// assert_eq!(cause.message(), "Predicate does not hold for 1");
    /// ```
    #[track_caller]
    pub fn filter_try<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> Result<bool>,
        T: fmt::Debug,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => match capture_at(loc, || predicate(&value)) {
                Try::Success(true) => Try::Success(value),
                Try::Success(false) => {
                    Try::Failure(Cause::wrap(NoSuchElement::predicate_failed(&value)).at(loc))
                }
                Try::Failure(cause) => Try::Failure(cause),
            },
            Try::Failure(cause) => Try::Failure(cause),
        }
    }

    /// Like [`filter_try`](Self::filter_try), with `error_fn` supplying the
    /// cause when the predicate returns `false`.
    ///
    /// An error from the predicate wins over `error_fn`, which then never
    /// runs. If `error_fn` panics, that panic becomes the cause.
    #[track_caller]
    pub fn filter_try_or<P, G, E>(self, predicate: P, error_fn: G) -> Self
    where
        P: FnOnce(&T) -> Result<bool>,
        G: FnOnce(&T) -> E,
        E: StdError + Send + Sync + 'static,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => match capture_at(loc, || predicate(&value)) {
                Try::Success(true) => Try::Success(value),
                Try::Success(false) => {
                    match capture_at(loc, || Ok::<E, Cause>(error_fn(&value))) {
                        Try::Success(e) => Try::Failure(Cause::wrap(e).at(loc)),
                        Try::Failure(cause) => Try::Failure(cause),
                    }
                }
                Try::Failure(cause) => Try::Failure(cause),
            },
            Try::Failure(cause) => Try::Failure(cause),
        }
    }

    /// [`filter_try`](Self::filter_try) with an infallible predicate.
    #[track_caller]
    pub fn filter<P>(self, predicate: P) -> Self
    where
        P: FnOnce(&T) -> bool,
        T: fmt::Debug,
    {
        self.filter_try(|value| Ok(predicate(value)))
    }
}

impl<T> Try<Try<T>> {
    /// Remove one level of nesting.
    pub fn flatten(self) -> Try<T> {
        match self {
            Try::Success(inner) => inner,
            Try::Failure(cause) => Try::Failure(cause),
        }
    }
}

// ============================================================
// Recovery
// ============================================================

impl<T> Try<T> {
    /// Swap the variants: the cause of a `Failure` becomes the value.
    ///
    /// A `Success` turns into a `Failure` holding [`NoSuchElement`].
    #[track_caller]
    pub fn failed(self) -> Try<Cause> {
        match self {
            Try::Success(_) => {
                Try::Failure(Cause::wrap(NoSuchElement::success_failed()).at(Location::caller()))
            }
            Try::Failure(cause) => Try::Success(cause),
        }
    }

    /// Recover from any failure with `f`. A panic in `f` becomes the new
    /// cause.
    #[track_caller]
    pub fn recover<F>(self, f: F) -> Self
    where
        F: FnOnce(Cause) -> T,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => capture_at(loc, move || Ok::<T, Cause>(f(cause))),
        }
    }

    /// Recover from any failure with a computation producing a `Try`.
    #[track_caller]
    pub fn recover_with<F>(self, f: F) -> Self
    where
        F: FnOnce(Cause) -> Try<T>,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => capture_at(loc, move || Ok::<Try<T>, Cause>(f(cause))).flatten(),
        }
    }

    /// Recover only when the root error is an `E`; `f` receives it by value.
    ///
    /// Any other failure is returned unchanged, same cause.
    ///
    /// ```
    /// use try_this::Try;
    /// use std::num::ParseIntError;
    ///
    /// let t = Try::of(|| "a".parse::<i32>()).recover_from(|_: ParseIntError| -1);
    /// assert_eq!(t.get(), -1);
    /// ```
    #[track_caller]
    pub fn recover_from<E, F>(self, f: F) -> Self
    where
        E: StdError + 'static,
        F: FnOnce(E) -> T,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => match cause.downcast::<E>() {
                Ok(e) => capture_at(loc, move || Ok::<T, Cause>(f(e))),
                Err(cause) => Try::Failure(cause),
            },
        }
    }

    /// Typed recovery with a computation producing a `Try`.
    #[track_caller]
    pub fn recover_from_with<E, F>(self, f: F) -> Self
    where
        E: StdError + 'static,
        F: FnOnce(E) -> Try<T>,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => match cause.downcast::<E>() {
                Ok(e) => capture_at(loc, move || Ok::<Try<T>, Cause>(f(e))).flatten(),
                Err(cause) => Try::Failure(cause),
            },
        }
    }

    /// Replace a failure whose root error is an `E` with `value`.
    pub fn recover_value<E>(self, value: T) -> Self
    where
        E: StdError + 'static,
    {
        match self {
            Try::Failure(cause) if cause.is::<E>() => Try::Success(value),
            other => other,
        }
    }

    /// Recover when `predicate` accepts the cause.
    ///
    /// For matching that a concrete type cannot express, such as an
    /// `io::ErrorKind` or a variant of an error enum.
    #[track_caller]
    pub fn recover_if<P, F>(self, predicate: P, f: F) -> Self
    where
        P: FnOnce(&Cause) -> bool,
        F: FnOnce(Cause) -> T,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => match capture_at(loc, || Ok::<bool, Cause>(predicate(&cause))) {
                Try::Success(true) => capture_at(loc, move || Ok::<T, Cause>(f(cause))),
                Try::Success(false) => Try::Failure(cause),
                Try::Failure(raised) => Try::Failure(raised),
            },
        }
    }

    /// Replace the cause of a failure.
    #[track_caller]
    pub fn map_failure<E, F>(self, f: F) -> Self
    where
        F: FnOnce(Cause) -> E,
        E: StdError + Send + Sync + 'static,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => match capture_at(loc, move || Ok::<E, Cause>(f(cause))) {
                Try::Success(e) => Try::Failure(Cause::wrap(e)),
                Try::Failure(raised) => Try::Failure(raised),
            },
        }
    }

    /// `self` if it succeeded, otherwise `other`.
    pub fn or_else(self, other: Try<T>) -> Self {
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(_) => other,
        }
    }

    /// `self` if it succeeded, otherwise the `Try` built by `other`.
    ///
    /// `other` only runs on failure; a panic in it becomes the cause.
    #[track_caller]
    pub fn or_else_with<F>(self, other: F) -> Self
    where
        F: FnOnce() -> Try<T>,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(_) => capture_at(loc, move || Ok::<Try<T>, Cause>(other())).flatten(),
        }
    }
}

// ============================================================
// Side effects
// ============================================================

impl<T> Try<T> {
    /// Run `procedure` on a success value for its effect.
    ///
    /// The value is kept. If the procedure fails, that failure replaces the
    /// success. A `Failure` skips the procedure.
    #[track_caller]
    pub fn and_then<F>(self, procedure: F) -> Self
    where
        F: FnOnce(&T) -> Result<()>,
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => match capture_at(loc, || procedure(&value)) {
                Try::Success(()) => Try::Success(value),
                Try::Failure(cause) => Try::Failure(cause),
            },
            Try::Failure(cause) => Try::Failure(cause),
        }
    }

    /// Run `procedure` exactly once, whatever the state.
    ///
    /// A failing procedure turns a `Success` into a `Failure`. On a
    /// `Failure` the original cause is kept and the cleanup failure is
    /// recorded as suppressed.
    ///
    /// ```
    /// use try_this::{Cause, Try};
    ///
    /// let t = Try::<i32>::failure(Cause::msg("body"))
    ///     .and_finally(|| Err(Cause::msg("cleanup")));
    /// let cause = t.get_cause();
    /// assert_eq!(cause.message(), "body");
    /// assert_eq!(cause.suppressed()[0].message(), "cleanup");
    /// ```
    #[track_caller]
    pub fn and_finally<F>(self, procedure: F) -> Self
    where
        F: FnOnce() -> Result<()>,
    {
        let cleanup = capture_at(Location::caller(), procedure);
        match (self, cleanup) {
            (outcome, Try::Success(())) => outcome,
            (Try::Success(_), Try::Failure(cause)) => Try::Failure(cause),
            (Try::Failure(primary), Try::Failure(secondary)) => {
                log::suppressed(&primary, &secondary);
                Try::Failure(primary.suppress(secondary))
            }
        }
    }

    /// Peek at a success value. A panic in `f` becomes the cause.
    #[track_caller]
    pub fn on_success<F>(self, f: F) -> Self
    where
        F: FnOnce(&T),
    {
        self.and_then(|value| {
            f(value);
            Ok(())
        })
    }

    /// Peek at a failure's cause. A panic in `f` is recorded as suppressed.
    #[track_caller]
    pub fn on_failure<F>(self, f: F) -> Self
    where
        F: FnOnce(&Cause),
    {
        let loc = Location::caller();
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => match capture_at(loc, || Ok::<(), Cause>(f(&cause))) {
                Try::Success(()) => Try::Failure(cause),
                Try::Failure(raised) => {
                    log::suppressed(&cause, &raised);
                    Try::Failure(cause.suppress(raised))
                }
            },
        }
    }

    /// Add a context message to a failure at the caller's location.
    #[track_caller]
    pub fn context(self, msg: impl Into<String>) -> Self {
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => Try::Failure(cause.at(Location::caller()).ctx(msg)),
        }
    }

    /// Attach a key-value pair to a failure at the caller's location.
    #[track_caller]
    pub fn attach(self, key: &'static str, val: impl IntoValue) -> Self {
        match self {
            Try::Success(value) => Try::Success(value),
            Try::Failure(cause) => Try::Failure(cause.at(Location::caller()).kv(key, val)),
        }
    }
}

// ============================================================
// Trait impls
// ============================================================

/// Successes compare by value. A failure is never equal to anything, not
/// even itself: causes have identity, not value equality.
impl<T: PartialEq> PartialEq for Try<T> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Try::Success(a), Try::Success(b)) => a == b,
            _ => false,
        }
    }
}

impl<T, E> From<core::result::Result<T, E>> for Try<T>
where
    E: StdError + Send + Sync + 'static,
{
    fn from(result: core::result::Result<T, E>) -> Self {
        match result {
            Ok(value) => Try::Success(value),
            Err(e) => Try::Failure(Cause::wrap(e)),
        }
    }
}

impl<T> From<Try<T>> for core::result::Result<T, Cause> {
    fn from(t: Try<T>) -> Self {
        t.into_result()
    }
}
