//! The captured cause of a failed [`Try`](crate::Try).

use std::borrow::Cow;
use std::error::Error as StdError;
use std::sync::OnceLock;

use core::any::Any;
use core::fmt;
use core::panic::Location;

use smallvec::SmallVec;

use crate::kinds::{Message, Panicked};
use crate::value::{IntoValue, Value};

/// Boxed error accepted by [`Cause::from_box`].
pub type BoxedError = Box<dyn StdError + Send + Sync + 'static>;

/// Most frames a trace keeps; later captures are not recorded.
pub const DEFAULT_FRAME_LIMIT: usize = 32;
/// Most frames that can carry a note or attachments.
pub const DEFAULT_CONTEXT_LIMIT: usize = 8;

/// Frames stored without a heap allocation.
const INLINE_FRAMES: usize = 4;

type Attachments = Vec<(Cow<'static, str>, Value)>;

// ============================================================
// Core types
// ============================================================

/// Type-erased error captured by a failed computation.
///
/// The root error is kept exactly as it was raised. Around it a `Cause`
/// records:
/// - a trace of the call sites where it was captured or annotated
/// - context notes and key-value attachments on those frames
/// - suppressed causes: cleanup failures that happened after this cause
///   and were not allowed to replace it
///
/// Wrapping a `Cause` never nests it inside another `Cause`.
///
/// # Examples
///
/// ```
/// use try_this::{Cause, Try};
///
/// let parsed: Try<i32> = Try::of(|| "a".parse::<i32>());
/// let cause: &Cause = parsed.cause().unwrap();
/// assert!(cause.is::<std::num::ParseIntError>());
/// ```
#[derive(Debug)]
pub struct Cause {
    pub(crate) source: BoxedError,
    /// Rendered from `source` the first time it is asked for.
    pub(crate) message: OnceLock<String>,
    pub(crate) trace: SmallVec<[Frame; INLINE_FRAMES]>,
    pub(crate) suppressed: Vec<Cause>,
}

/// One call site in the trace, with whatever was attached there.
#[derive(Debug, Clone)]
pub(crate) struct Frame {
    pub(crate) file: Cow<'static, str>,
    pub(crate) line: u32,
    pub(crate) col: u32,
    pub(crate) note: Option<String>,
    pub(crate) attachments: Attachments,
}

impl Frame {
    fn new(file: Cow<'static, str>, line: u32, col: u32) -> Self {
        Self {
            file,
            line,
            col,
            note: None,
            attachments: Vec::new(),
        }
    }

    fn is_annotated(&self) -> bool {
        self.note.is_some() || !self.attachments.is_empty()
    }
}

/// Borrowed view of one trace frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameView<'a> {
    pub file: &'a str,
    pub line: u32,
    pub col: u32,
    /// Note added with [`Try::context`](crate::Try::context).
    pub context: Option<&'a str>,
    attached: &'a [(Cow<'static, str>, Value)],
}

impl<'a> FrameView<'a> {
    /// Key-value pairs added with [`Try::attach`](crate::Try::attach), in
    /// insertion order.
    pub fn attachments(&self) -> impl Iterator<Item = (&'a str, &'a Value)> {
        self.attached.iter().map(|(key, value)| (key.as_ref(), value))
    }
}

impl<'a> From<&'a Frame> for FrameView<'a> {
    fn from(frame: &'a Frame) -> Self {
        Self {
            file: &frame.file,
            line: frame.line,
            col: frame.col,
            context: frame.note.as_deref(),
            attached: &frame.attachments,
        }
    }
}

// ============================================================
// Construction
// ============================================================

impl Cause {
    /// Wrap any error. An error that already is a `Cause` is returned as is.
    pub fn wrap<E>(e: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self::from_box(Box::new(e))
    }

    /// Wrap a boxed error, unwrapping it if the box holds a `Cause`.
    pub fn from_box(e: BoxedError) -> Self {
        match e.downcast::<Self>() {
            Ok(cause) => *cause,
            Err(source) => Self::bare(source),
        }
    }

    /// A cause whose root is a [`Message`].
    pub fn msg(text: impl Into<String>) -> Self {
        let text = text.into();
        let cause = Self::bare(Box::new(Message(text.clone())));
        let _ = cause.message.set(text);
        cause
    }

    /// Build from a `catch_unwind` payload. A payload that is a `Cause`
    /// (raised by [`Try::get`](crate::Try::get)) is restored unchanged.
    pub(crate) fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        match payload.downcast::<Self>() {
            Ok(cause) => *cause,
            Err(payload) => Self::wrap(Panicked::from_payload(payload.as_ref())),
        }
    }

    fn bare(source: BoxedError) -> Self {
        Self {
            source,
            message: OnceLock::new(),
            trace: SmallVec::new(),
            suppressed: Vec::new(),
        }
    }

    // ============================================================
    // Trace and context
    // ============================================================

    /// Append a trace frame. Ignored once the trace is full.
    #[doc(hidden)]
    pub fn frame(self, file: &'static str, line: u32, col: u32) -> Self {
        self.push_frame(Frame::new(Cow::Borrowed(file), line, col))
    }

    fn push_frame(mut self, frame: Frame) -> Self {
        if self.trace.len() < DEFAULT_FRAME_LIMIT {
            self.trace.push(frame);
        }
        self
    }

    #[inline]
    pub(crate) fn at(self, loc: &'static Location<'static>) -> Self {
        self.frame(loc.file(), loc.line(), loc.column())
    }

    /// Append a frame at the caller's location.
    #[track_caller]
    pub fn here(self) -> Self {
        self.at(Location::caller())
    }

    /// Set the note on the most recent frame.
    ///
    /// A cause without a trace gets a frame at the caller first.
    #[doc(hidden)]
    #[track_caller]
    pub fn ctx(self, note: impl Into<String>) -> Self {
        let loc = Location::caller();
        self.annotate(loc, |frame| frame.note = Some(note.into()))
    }

    /// Attach a key-value pair to the most recent frame.
    #[doc(hidden)]
    #[track_caller]
    pub fn kv(self, key: &'static str, val: impl IntoValue) -> Self {
        let loc = Location::caller();
        self.annotate(loc, |frame| {
            frame.attachments.push((Cow::Borrowed(key), val.into_value()))
        })
    }

    /// Apply `edit` to the newest frame, unless that would annotate more
    /// than `DEFAULT_CONTEXT_LIMIT` frames.
    fn annotate(mut self, loc: &'static Location<'static>, edit: impl FnOnce(&mut Frame)) -> Self {
        if self.trace.is_empty() {
            self = self.at(loc);
        }
        let annotated = self.context_count();
        if let Some(frame) = self.trace.last_mut() {
            if frame.is_annotated() || annotated < DEFAULT_CONTEXT_LIMIT {
                edit(frame);
            }
        }
        self
    }

    /// Record a later failure that must not replace this one.
    pub fn suppress(mut self, other: Cause) -> Self {
        self.suppressed.push(other);
        self
    }

    // ============================================================
    // Accessors
    // ============================================================

    /// The root error's message.
    pub fn message(&self) -> &str {
        self.message.get_or_init(|| self.source.to_string())
    }

    /// The root error as a trait object.
    pub fn root(&self) -> &(dyn StdError + 'static) {
        &*self.source
    }

    /// Consume and return the root error.
    pub fn into_source(self) -> BoxedError {
        self.source
    }

    /// Whether the root error is an `E`.
    #[inline]
    pub fn is<E: StdError + 'static>(&self) -> bool {
        self.source.is::<E>()
    }

    #[inline]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }

    /// Take the root error out as an `E`. On mismatch the same cause comes
    /// back unchanged.
    pub fn downcast<E: StdError + 'static>(self) -> core::result::Result<E, Self> {
        let Self {
            source,
            message,
            trace,
            suppressed,
        } = self;
        source.downcast::<E>().map(|e| *e).map_err(|source| Self {
            source,
            message,
            trace,
            suppressed,
        })
    }

    /// First error of type `E` in the chain that starts at the root and
    /// follows `Error::source`.
    pub fn chain_any<E: StdError + 'static>(&self) -> Option<&E> {
        let mut link = Some(self.root());
        while let Some(err) = link {
            if let Some(found) = err.downcast_ref::<E>() {
                return Some(found);
            }
            link = err.source();
        }
        None
    }

    /// Causes suppressed in favour of this one, oldest first.
    pub fn suppressed(&self) -> &[Cause] {
        &self.suppressed
    }

    /// The trace, oldest frame first.
    pub fn frames(&self) -> impl Iterator<Item = FrameView<'_>> {
        self.trace.iter().map(FrameView::from)
    }

    /// Number of frames in the trace.
    pub fn depth(&self) -> usize {
        self.trace.len()
    }

    /// Number of frames carrying a note or attachments.
    pub fn context_count(&self) -> usize {
        self.trace.iter().filter(|frame| frame.is_annotated()).count()
    }
}

// ============================================================
// Display and Error
// ============================================================

impl fmt::Display for Cause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())?;

        if !self.trace.is_empty() {
            f.write_str("\n\nTrace (most recent last):")?;
            for frame in &self.trace {
                write!(f, "\n  {}:{}:{}", frame.file, frame.line, frame.col)?;
                if let Some(note) = &frame.note {
                    write!(f, "\n    \u{2192} {note}")?;
                }
                for (key, value) in &frame.attachments {
                    write!(f, "\n    {key}: {value}")?;
                }
            }
        }

        if !self.suppressed.is_empty() {
            f.write_str("\n\nSuppressed:")?;
            for cause in &self.suppressed {
                write!(f, "\n  - {}", cause.message())?;
            }
        }

        Ok(())
    }
}

impl StdError for Cause {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        Some(self.root())
    }
}

// ============================================================
// Conversions
// ============================================================

impl From<&str> for Cause {
    fn from(text: &str) -> Self {
        Self::msg(text)
    }
}

impl From<String> for Cause {
    fn from(text: String) -> Self {
        Self::msg(text)
    }
}

impl From<BoxedError> for Cause {
    fn from(e: BoxedError) -> Self {
        Self::from_box(e)
    }
}

// A blanket `From<E: Error>` would overlap `From<Cause> for Cause`, so `?`
// support is listed per type. Anything else goes through `Cause::wrap`.
macro_rules! cause_from {
    ($($t:ty),* $(,)?) => {
        $(
            impl From<$t> for Cause {
                #[inline]
                fn from(e: $t) -> Self {
                    Self::wrap(e)
                }
            }
        )*
    };
}

cause_from!(
    std::io::Error,
    std::fmt::Error,
    std::num::ParseIntError,
    std::num::ParseFloatError,
    std::num::TryFromIntError,
    std::str::ParseBoolError,
    std::str::Utf8Error,
    std::string::FromUtf8Error,
    crate::kinds::NoSuchElement,
    crate::kinds::Panicked,
    crate::kinds::Message,
);

// ============================================================
// Serde support
// ============================================================

#[cfg(feature = "serde")]
mod serde_impl {
    use super::*;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    #[derive(Serialize, Deserialize)]
    struct FrameRepr {
        file: String,
        line: u32,
        col: u32,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty", with = "attachment_map")]
        attachments: Vec<(String, Value)>,
    }

    #[derive(Serialize, Deserialize)]
    struct CauseRepr {
        message: String,
        trace: Vec<FrameRepr>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        suppressed: Vec<CauseRepr>,
    }

    /// Attachments as a JSON object, keeping insertion order.
    mod attachment_map {
        use super::Value;
        use serde::de::{MapAccess, Visitor};
        use serde::ser::SerializeMap;
        use serde::{Deserializer, Serializer};
        use core::fmt;

        pub fn serialize<S: Serializer>(pairs: &[(String, Value)], s: S) -> Result<S::Ok, S::Error> {
            let mut map = s.serialize_map(Some(pairs.len()))?;
            for (key, value) in pairs {
                map.serialize_entry(key, value)?;
            }
            map.end()
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<(String, Value)>, D::Error> {
            struct Pairs;

            impl<'de> Visitor<'de> for Pairs {
                type Value = Vec<(String, Value)>;

                fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str("a map of attachments")
                }

                fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                    let mut pairs = Vec::with_capacity(access.size_hint().unwrap_or(0));
                    while let Some(entry) = access.next_entry()? {
                        pairs.push(entry);
                    }
                    Ok(pairs)
                }
            }

            d.deserialize_map(Pairs)
        }
    }

    impl From<&Cause> for CauseRepr {
        fn from(cause: &Cause) -> Self {
            Self {
                message: cause.message().to_owned(),
                trace: cause
                    .trace
                    .iter()
                    .map(|frame| FrameRepr {
                        file: frame.file.clone().into_owned(),
                        line: frame.line,
                        col: frame.col,
                        message: frame.note.clone(),
                        attachments: frame
                            .attachments
                            .iter()
                            .map(|(key, value)| (key.clone().into_owned(), value.clone()))
                            .collect(),
                    })
                    .collect(),
                suppressed: cause.suppressed.iter().map(Self::from).collect(),
            }
        }
    }

    impl From<CauseRepr> for Cause {
        fn from(repr: CauseRepr) -> Self {
            let mut cause = Cause::msg(repr.message);
            for frame in repr.trace {
                cause = cause.push_frame(Frame {
                    file: Cow::Owned(frame.file),
                    line: frame.line,
                    col: frame.col,
                    note: frame.message,
                    attachments: frame
                        .attachments
                        .into_iter()
                        .map(|(key, value)| (Cow::Owned(key), value))
                        .collect(),
                });
            }
            cause.suppressed = repr.suppressed.into_iter().map(Cause::from).collect();
            cause
        }
    }

    impl Serialize for Cause {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            CauseRepr::from(self).serialize(serializer)
        }
    }

    /// The root error's type does not survive: a deserialized cause has a
    /// [`Message`] root.
    impl<'de> Deserialize<'de> for Cause {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            CauseRepr::deserialize(deserializer).map(Cause::from)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[test]
    fn test_wrap_does_not_nest() {
        let cause = Cause::msg("inner").frame("a.rs", 1, 2);
        let rewrapped = Cause::wrap(cause);
        assert_eq!(rewrapped.depth(), 1);
        assert!(rewrapped.is::<Message>());
    }

    #[test]
    fn test_from_box_unwraps_cause() {
        let boxed: BoxedError = Box::new(Cause::msg("boxed").frame("b.rs", 3, 4));
        let cause = Cause::from_box(boxed);
        assert_eq!(cause.message(), "boxed");
        assert_eq!(cause.depth(), 1);
    }

    #[test]
    fn test_downcast_mismatch_returns_same_cause() {
        let cause = Cause::wrap(io::Error::other("disk")).frame("c.rs", 5, 6).ctx("reading");
        let back = cause.downcast::<std::num::ParseIntError>().unwrap_err();
        assert_eq!(back.message(), "disk");
        assert_eq!(back.depth(), 1);
        assert_eq!(back.frames().next().unwrap().context, Some("reading"));
        assert!(back.downcast::<io::Error>().is_ok());
    }

    #[test]
    fn test_note_and_attachments_share_frame() {
        let cause = Cause::msg("x").frame("d.rs", 1, 1).ctx("loading").kv("id", 7_u32);
        assert_eq!(cause.context_count(), 1);
        let frame = cause.frames().next().unwrap();
        assert_eq!(frame.context, Some("loading"));
        let (key, value) = frame.attachments().next().unwrap();
        assert_eq!(key, "id");
        assert_eq!(*value, 7_u64);
    }

    #[test]
    fn test_annotating_untraced_cause_adds_frame() {
        let line = line!() + 1;
        let cause = Cause::msg("x").ctx("first note");
        assert_eq!(cause.depth(), 1);
        let frame = cause.frames().next().unwrap();
        assert_eq!(frame.line, line);
        assert_eq!(frame.context, Some("first note"));
    }

    #[test]
    fn test_frame_limit() {
        let mut cause = Cause::msg("deep");
        for line in 0..(DEFAULT_FRAME_LIMIT as u32 + 10) {
            cause = cause.frame("e.rs", line, 0);
        }
        assert_eq!(cause.depth(), DEFAULT_FRAME_LIMIT);
    }

    #[test]
    fn test_context_limit() {
        let mut cause = Cause::msg("noisy");
        for line in 0..(DEFAULT_CONTEXT_LIMIT as u32 + 3) {
            cause = cause.frame("h.rs", line, 0).ctx("layer");
        }
        assert_eq!(cause.context_count(), DEFAULT_CONTEXT_LIMIT);
    }

    #[test]
    fn test_display_lists_trace_and_suppressed() {
        let cause = Cause::msg("primary")
            .frame("f.rs", 10, 5)
            .ctx("opening")
            .suppress(Cause::msg("close failed"));
        let text = cause.to_string();
        assert!(text.starts_with("primary"));
        assert!(text.contains("f.rs:10:5"));
        assert!(text.contains("\u{2192} opening"));
        assert!(text.contains("Suppressed:\n  - close failed"));
    }

    #[test]
    fn test_chain_any_walks_sources() {
        #[derive(Debug)]
        struct Outer(io::Error);

        impl fmt::Display for Outer {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("outer")
            }
        }

        impl StdError for Outer {
            fn source(&self) -> Option<&(dyn StdError + 'static)> {
                Some(&self.0)
            }
        }

        let cause = Cause::wrap(Outer(io::Error::other("inner")));
        assert!(!cause.is::<io::Error>());
        assert_eq!(cause.chain_any::<io::Error>().unwrap().to_string(), "inner");
    }

    #[test]
    fn test_panic_payload_cause_is_restored() {
        let payload: Box<dyn Any + Send> = Box::new(Cause::msg("raised").frame("g.rs", 1, 1));
        let cause = Cause::from_panic(payload);
        assert!(cause.is::<Message>());
        assert_eq!(cause.depth(), 1);

        let payload: Box<dyn Any + Send> = Box::new("plain panic");
        let cause = Cause::from_panic(payload);
        assert_eq!(cause.downcast_ref::<Panicked>().unwrap().message(), "plain panic");
    }
}
