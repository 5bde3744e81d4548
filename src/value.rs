//! Typed values attached to a cause with [`Try::attach`](crate::Try::attach).

use std::borrow::Cow;
use core::fmt;

/// An attachment value.
///
/// Numbers, booleans and text keep their kind so a structured sink can tell
/// them apart. With the `serde` feature a value serializes as the bare JSON
/// scalar; non-negative integers read back as `Uint`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Bool(bool),
    Uint(u64),
    Int(i64),
    Float(f64),
    Text(String),
    /// An absent optional value.
    Null,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => fmt::Display::fmt(b, f),
            Value::Uint(n) => fmt::Display::fmt(n, f),
            Value::Int(n) => fmt::Display::fmt(n, f),
            Value::Float(n) => fmt::Display::fmt(n, f),
            Value::Text(s) => f.write_str(s),
            Value::Null => f.write_str("null"),
        }
    }
}

// Integer comparisons ignore the signedness the value was stored with.

impl PartialEq<i64> for Value {
    fn eq(&self, other: &i64) -> bool {
        match *self {
            Value::Int(n) => n == *other,
            Value::Uint(n) => i64::try_from(n).is_ok_and(|n| n == *other),
            _ => false,
        }
    }
}

impl PartialEq<u64> for Value {
    fn eq(&self, other: &u64) -> bool {
        match *self {
            Value::Uint(n) => n == *other,
            Value::Int(n) => u64::try_from(n).is_ok_and(|n| n == *other),
            _ => false,
        }
    }
}

impl PartialEq<bool> for Value {
    fn eq(&self, other: &bool) -> bool {
        *self == Value::Bool(*other)
    }
}

impl PartialEq<str> for Value {
    fn eq(&self, other: &str) -> bool {
        matches!(self, Value::Text(s) if s == other)
    }
}

impl PartialEq<&str> for Value {
    fn eq(&self, other: &&str) -> bool {
        *self == **other
    }
}

// ============================================================
// Conversions
// ============================================================

/// Anything that can be attached to a cause.
///
/// Implemented for every type `Value` converts from: integers, floats,
/// `bool`, strings and `Option`s of those.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl<T: Into<Value>> IntoValue for T {
    #[inline]
    fn into_value(self) -> Value {
        self.into()
    }
}

macro_rules! value_from_number {
    ($variant:ident($wide:ty) <- $($t:ty),+) => {
        $(
            impl From<$t> for Value {
                #[inline]
                fn from(n: $t) -> Self {
                    Value::$variant(n as $wide)
                }
            }
        )+
    };
}

value_from_number!(Int(i64) <- i8, i16, i32, i64, isize);
value_from_number!(Uint(u64) <- u8, u16, u32, u64, usize);
value_from_number!(Float(f64) <- f32, f64);

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_owned())
    }
}

impl From<Cow<'_, str>> for Value {
    fn from(s: Cow<'_, str>) -> Self {
        Value::Text(s.into_owned())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_kinds() {
        assert_eq!(7_u8.into_value(), Value::Uint(7));
        assert_eq!((-7_i32).into_value(), Value::Int(-7));
        assert_eq!(Value::Int(7), 7_u64);
        assert_eq!(Value::Uint(7), 7_i64);
        assert!(Value::Int(-1) != 1_u64);
    }

    #[test]
    fn test_option_and_text() {
        assert_eq!(None::<u32>.into_value(), Value::Null);
        assert_eq!(Some("id").into_value(), "id");
        assert_eq!(Value::Null.to_string(), "null");
        assert_eq!(Value::Float(1.5).to_string(), "1.5");
    }
}
