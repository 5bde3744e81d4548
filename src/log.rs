//! Diagnostic events, emitted through `tracing` when the feature is on.

use crate::Cause;

#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn captured_panic(cause: &Cause) {
    tracing::debug!(error = %cause.message(), depth = cause.depth(), "captured panic as failure");
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub(crate) fn captured_panic(_cause: &Cause) {}

/// A cleanup or release failure was kept as suppressed under `primary`.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn suppressed(primary: &Cause, secondary: &Cause) {
    tracing::debug!(
        primary = %primary.message(),
        suppressed = %secondary.message(),
        "cleanup failure suppressed"
    );
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub(crate) fn suppressed(_primary: &Cause, _secondary: &Cause) {}

/// A resource was released by its guard instead of explicitly.
#[cfg(feature = "tracing")]
#[inline]
pub(crate) fn released_on_drop(result: &crate::Result<()>) {
    match result {
        Ok(()) => tracing::warn!("resource released during unwinding"),
        Err(cause) => tracing::warn!(
            error = %cause.message(),
            "resource release failed during unwinding"
        ),
    }
}

#[cfg(not(feature = "tracing"))]
#[inline(always)]
pub(crate) fn released_on_drop(_result: &crate::Result<()>) {}
