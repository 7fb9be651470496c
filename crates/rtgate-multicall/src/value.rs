//! Loosely-typed XML-RPC values as exchanged with rTorrent.

use std::collections::BTreeMap;

/// A single XML-RPC value.
///
/// `Nil` doubles as the absent marker: rTorrent (and some proxies in front of
/// it) report a missing attribute as `<nil/>`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RpcValue {
    /// Absent value.
    #[default]
    Nil,
    /// `i4`, `int` or `i8`.
    Int(i64),
    /// `boolean`.
    Bool(bool),
    /// `double`.
    Double(f64),
    /// `string`, or an untyped `<value>` body.
    String(String),
    /// Decoded `base64` payload.
    Base64(Vec<u8>),
    /// Raw `dateTime.iso8601` text.
    DateTime(String),
    /// `array`.
    Array(Vec<RpcValue>),
    /// `struct`.
    Struct(BTreeMap<String, RpcValue>),
}

impl RpcValue {
    /// Stable wire-type name used in error reports.
    #[must_use]
    pub const fn kind_name(&self) -> &'static str {
        match self {
            Self::Nil => "nil",
            Self::Int(_) => "int",
            Self::Bool(_) => "boolean",
            Self::Double(_) => "double",
            Self::String(_) => "string",
            Self::Base64(_) => "base64",
            Self::DateTime(_) => "dateTime.iso8601",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
        }
    }

    /// Whether the value is `nil`.
    #[must_use]
    pub const fn is_nil(&self) -> bool {
        matches!(self, Self::Nil)
    }

    /// Borrow array items.
    #[must_use]
    pub fn as_array(&self) -> Option<&[Self]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Borrow a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// Integer value; `i4` and `i8` both land here.
    #[must_use]
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Borrow struct members.
    #[must_use]
    pub const fn as_struct(&self) -> Option<&BTreeMap<String, Self>> {
        match self {
            Self::Struct(members) => Some(members),
            _ => None,
        }
    }

    /// Build a struct value from `(name, value)` pairs.
    #[must_use]
    pub fn structure<I, K>(members: I) -> Self
    where
        I: IntoIterator<Item = (K, Self)>,
        K: Into<String>,
    {
        Self::Struct(
            members
                .into_iter()
                .map(|(name, value)| (name.into(), value))
                .collect(),
        )
    }
}

impl From<&str> for RpcValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for RpcValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for RpcValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for RpcValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<bool> for RpcValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<Vec<Self>> for RpcValue {
    fn from(values: Vec<Self>) -> Self {
        Self::Array(values)
    }
}
