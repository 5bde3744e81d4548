//! Scoped resources: acquire, use, release exactly once.
//!
//! ```
//! use try_this::{with_resources, Closing, Try};
//! use std::cell::Cell;
//!
//! let closed = Cell::new(false);
//! let lines: Try<String> = with_resources(|| {
//!     Ok::<_, std::io::Error>(Closing::new(vec!["1", "2", "3"], |_| {
//!         closed.set(true);
//!         Ok(())
//!     }))
//! })
//! .of(|lines| Ok(lines.join(",")));
//!
//! assert_eq!(lines.get(), "1,2,3");
//! assert!(closed.get());
//! ```

use std::error::Error as StdError;
use std::fs::File;
use std::io::{BufReader, BufWriter, Cursor, Read, Write};

use core::fmt;
use core::ops::{Deref, DerefMut};
use core::panic::Location;

use crate::cause::Cause;
use crate::log;
use crate::r#try::{capture, capture_at, Try};
use crate::Result;

// ============================================================
// Resource trait
// ============================================================

/// Something that must be released after use, and whose release can fail.
///
/// `Drop` cannot report failure; `close` can. It can be derived for structs
/// with `#[derive(Resource)]`, which closes fields in reverse declaration
/// order.
pub trait Resource {
    /// Release the resource.
    fn close(self) -> Result<()>;
}

/// Dropping a `File` closes it; the OS error of that close is not observable.
impl Resource for File {
    fn close(self) -> Result<()> {
        drop(self);
        Ok(())
    }
}

impl<T> Resource for Cursor<T> {
    fn close(self) -> Result<()> {
        Ok(())
    }
}

impl<R: Read + Resource> Resource for BufReader<R> {
    fn close(self) -> Result<()> {
        self.into_inner().close()
    }
}

/// Flushes the buffer before closing the inner writer; a failed flush is
/// the close error.
impl<W: Write + Resource> Resource for BufWriter<W> {
    fn close(self) -> Result<()> {
        let inner = self.into_inner().map_err(|e| Cause::wrap(e.into_error()))?;
        inner.close()
    }
}

impl<R: Resource> Resource for Option<R> {
    fn close(self) -> Result<()> {
        match self {
            Some(resource) => resource.close(),
            None => Ok(()),
        }
    }
}

/// Close `resource`, recording its failure in `first`.
///
/// The first failure recorded stays primary; later ones are suppressed
/// under it.
#[doc(hidden)]
#[track_caller]
pub fn __release_into<R: Resource>(first: &mut Option<Cause>, resource: R) {
    if let Try::Failure(cause) = capture(move || resource.close()) {
        *first = Some(match first.take() {
            Some(primary) => {
                log::suppressed(&primary, &cause);
                primary.suppress(cause)
            }
            None => cause,
        });
    }
}

#[doc(hidden)]
pub fn __released(first: Option<Cause>) -> Result<()> {
    match first {
        Some(cause) => Err(cause),
        None => Ok(()),
    }
}

macro_rules! impl_resource_tuple {
    ($($name:ident),+ ; $($rev:ident),+) => {
        /// Elements are closed last to first.
        impl<$($name: Resource),+> Resource for ($($name,)+) {
            #[allow(non_snake_case)]
            fn close(self) -> Result<()> {
                let ($($name,)+) = self;
                let mut first = None;
                $( __release_into(&mut first, $rev); )+
                __released(first)
            }
        }
    };
}

impl_resource_tuple!(A, B; B, A);
impl_resource_tuple!(A, B, C; C, B, A);
impl_resource_tuple!(A, B, C, D; D, C, B, A);

// ============================================================
// Closing adapter
// ============================================================

/// A value paired with the function that releases it.
///
/// Derefs to the value, so the body of [`WithResources::of`] can use it
/// directly.
pub struct Closing<T, F> {
    value: T,
    close: F,
}

impl<T, F> Closing<T, F>
where
    F: FnOnce(T) -> Result<()>,
{
    pub fn new(value: T, close: F) -> Self {
        Self { value, close }
    }
}

impl<T, F> Deref for Closing<T, F> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.value
    }
}

impl<T, F> DerefMut for Closing<T, F> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.value
    }
}

impl<T: fmt::Debug, F> fmt::Debug for Closing<T, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Closing").field("value", &self.value).finish_non_exhaustive()
    }
}

impl<T, F> Resource for Closing<T, F>
where
    F: FnOnce(T) -> Result<()>,
{
    fn close(self) -> Result<()> {
        (self.close)(self.value)
    }
}

// ============================================================
// Release guard
// ============================================================

/// Holds an acquired resource. Releases it on drop unless it was released
/// explicitly, so unwinding past the scope still releases it once.
struct ReleaseGuard<R: Resource> {
    resource: Option<R>,
}

impl<R: Resource> ReleaseGuard<R> {
    fn new(resource: R) -> Self {
        Self {
            resource: Some(resource),
        }
    }

    fn borrow(&mut self) -> Result<&mut R> {
        self.resource
            .as_mut()
            .ok_or_else(|| Cause::msg("resource already released"))
    }

    fn release(&mut self) -> Result<()> {
        match self.resource.take() {
            Some(resource) => resource.close(),
            None => Ok(()),
        }
    }
}

impl<R: Resource> Drop for ReleaseGuard<R> {
    fn drop(&mut self) {
        if self.resource.is_some() {
            let result = self.release();
            log::released_on_drop(&result);
        }
    }
}

// ============================================================
// Builder
// ============================================================

/// Resources waiting to be acquired. Created by [`with_resources`].
///
/// Nothing is acquired until [`of`](Self::of) runs.
#[must_use = "resources are only acquired by `.of(..)`"]
pub struct WithResources<A> {
    acquire: A,
}

/// Start a scoped-resource computation.
///
/// `acquire` runs when [`WithResources::of`] is called. If it fails, the
/// body never runs and the result carries the acquisition failure.
#[track_caller]
pub fn with_resources<R, E, F>(acquire: F) -> WithResources<impl FnOnce() -> Try<R>>
where
    R: Resource,
    F: FnOnce() -> core::result::Result<R, E>,
    E: StdError + Send + Sync + 'static,
{
    let loc = Location::caller();
    WithResources {
        acquire: move || capture_at(loc, acquire),
    }
}

impl<R, A> WithResources<A>
where
    R: Resource,
    A: FnOnce() -> Try<R>,
{
    /// Acquire one more resource after the ones already listed.
    ///
    /// The body receives them as a tuple. If `next` fails, the resources
    /// acquired before it are released and the body never runs.
    #[track_caller]
    pub fn and<R2, E, F>(self, next: F) -> WithResources<impl FnOnce() -> Try<(R, R2)>>
    where
        R2: Resource,
        F: FnOnce() -> core::result::Result<R2, E>,
        E: StdError + Send + Sync + 'static,
    {
        let loc = Location::caller();
        let first = self.acquire;
        WithResources {
            acquire: move || match first() {
                Try::Success(held) => match capture_at(loc, next) {
                    Try::Success(acquired) => Try::Success((held, acquired)),
                    Try::Failure(cause) => Try::Failure(release_under(cause, held)),
                },
                Try::Failure(cause) => Try::Failure(cause),
            },
        }
    }

    /// Acquire, run `body`, release.
    ///
    /// The resource is released exactly once, after the body, whether the
    /// body succeeded, failed or panicked. A release failure becomes the
    /// result only when the body succeeded; otherwise it is suppressed under
    /// the body's cause.
    #[track_caller]
    pub fn of<U, F>(self, body: F) -> Try<U>
    where
        F: FnOnce(&mut R) -> Result<U>,
    {
        let loc = Location::caller();
        let resource = match (self.acquire)() {
            Try::Success(resource) => resource,
            Try::Failure(cause) => return Try::Failure(cause),
        };

        let mut guard = ReleaseGuard::new(resource);
        let outcome = capture_at(loc, || body(guard.borrow()?));
        let released = capture_at(loc, || guard.release());

        match (outcome, released) {
            (outcome, Try::Success(())) => outcome,
            (Try::Success(_), Try::Failure(cause)) => Try::Failure(cause),
            (Try::Failure(primary), Try::Failure(secondary)) => {
                log::suppressed(&primary, &secondary);
                Try::Failure(primary.suppress(secondary))
            }
        }
    }
}

/// Release `resource` after `primary` already failed.
#[track_caller]
fn release_under<R: Resource>(primary: Cause, resource: R) -> Cause {
    let mut first = Some(primary);
    __release_into(&mut first, resource);
    first.unwrap_or_else(|| Cause::msg("resource release lost its primary cause"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_tuple_closes_in_reverse() {
        let order = RefCell::new(Vec::new());
        let a = Closing::new("a", |name| {
            order.borrow_mut().push(name);
            Ok(())
        });
        let b = Closing::new("b", |name| {
            order.borrow_mut().push(name);
            Ok(())
        });
        (a, b).close().unwrap();
        assert_eq!(*order.borrow(), vec!["b", "a"]);
    }

    #[test]
    fn test_tuple_first_close_failure_wins() {
        let a = Closing::new((), |_| Err(Cause::msg("a failed")));
        let b = Closing::new((), |_| Err(Cause::msg("b failed")));
        let cause = (a, b).close().unwrap_err();
        assert_eq!(cause.message(), "b failed");
        assert_eq!(cause.suppressed().len(), 1);
        assert_eq!(cause.suppressed()[0].message(), "a failed");
    }

    #[test]
    fn test_guard_releases_on_drop() {
        let closed = RefCell::new(0);
        {
            let _guard = ReleaseGuard::new(Closing::new((), |_| {
                *closed.borrow_mut() += 1;
                Ok(())
            }));
        }
        assert_eq!(*closed.borrow(), 1);
    }

    #[test]
    fn test_guard_releases_once() {
        let closed = RefCell::new(0);
        {
            let mut guard = ReleaseGuard::new(Closing::new((), |_| {
                *closed.borrow_mut() += 1;
                Ok(())
            }));
            guard.release().unwrap();
            assert!(guard.borrow().is_err());
        }
        assert_eq!(*closed.borrow(), 1);
    }
}
