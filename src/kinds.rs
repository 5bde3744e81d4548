//! Error kinds synthesized by the crate itself.
//!
//! Everything else a [`Cause`](crate::Cause) carries comes from user code.

use core::any::Any;
use core::fmt;
use std::error::Error as StdError;

// ============================================================
// Message
// ============================================================

/// Plain text cause, created by [`Cause::msg`](crate::Cause::msg).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(pub(crate) String);

impl Message {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for Message {}

// ============================================================
// NoSuchElement
// ============================================================

/// A value that was asked for does not exist.
///
/// Produced by [`Try::failed`](crate::Try::failed) on a success and by
/// [`Try::filter_try`](crate::Try::filter_try) when the predicate does not hold.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoSuchElement(pub(crate) String);

impl NoSuchElement {
    pub(crate) fn predicate_failed<T: fmt::Debug>(value: &T) -> Self {
        Self(format!("Predicate does not hold for {:?}", value))
    }

    pub(crate) fn success_failed() -> Self {
        Self("Success.failed()".to_string())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NoSuchElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl StdError for NoSuchElement {}

// ============================================================
// Panicked
// ============================================================

/// A supplied closure panicked and the panic was captured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panicked(pub(crate) String);

impl Panicked {
    /// Build from a `catch_unwind` payload. Only `&str` and `String`
    /// payloads carry a readable message.
    pub(crate) fn from_payload(payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        Self(message)
    }

    /// The panic message.
    pub fn message(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Panicked {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "panicked: {}", self.0)
    }
}

impl StdError for Panicked {}
