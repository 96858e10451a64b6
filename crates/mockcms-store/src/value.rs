//! Typed property values
//!
//! Node properties are a sorted map from name to [`PropertyValue`].
//! Binary values share their bytes, so cloning a node snapshot is cheap.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Property map of a node
pub type Properties = BTreeMap<String, PropertyValue>;

/// Build a [`Properties`] map from `(name, value)` pairs
///
/// ```rust,ignore
/// let props = properties([("jcr:title", "Hello".into()), ("rank", 3_i64.into())]);
/// ```
#[must_use]
pub fn properties<const N: usize>(entries: [(&str, PropertyValue); N]) -> Properties {
    entries
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

/// A single typed property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    /// UTF-8 string
    String(String),
    /// 64-bit signed integer
    Long(i64),
    /// Boolean flag
    Boolean(bool),
    /// Binary payload
    Binary(BinaryValue),
}

impl PropertyValue {
    /// String value, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Integer value, if this is a long
    #[inline]
    #[must_use]
    pub fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Boolean value, if this is a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    /// Binary value, if this is a binary
    #[inline]
    #[must_use]
    pub fn as_binary(&self) -> Option<&BinaryValue> {
        match self {
            Self::Binary(v) => Some(v),
            _ => None,
        }
    }

    /// Short type label, used in diagnostics
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String(_) => "String",
            Self::Long(_) => "Long",
            Self::Boolean(_) => "Boolean",
            Self::Binary(_) => "Binary",
        }
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Long(v) => write!(f, "{v}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Binary(b) => write!(f, "<binary {} bytes>", b.len()),
        }
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        Self::Long(i64::from(v))
    }
}

impl From<u32> for PropertyValue {
    fn from(v: u32) -> Self {
        Self::Long(i64::from(v))
    }
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<BinaryValue> for PropertyValue {
    fn from(v: BinaryValue) -> Self {
        Self::Binary(v)
    }
}

/// Immutable binary payload
///
/// Cheap to clone; the bytes are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct BinaryValue(Arc<[u8]>);

impl BinaryValue {
    /// Create from byte vector
    #[inline]
    #[must_use]
    pub fn new(data: Vec<u8>) -> Self {
        Self(data.into())
    }

    /// Get reference to bytes
    #[inline]
    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.0
    }

    /// Copy out as a byte vector
    #[inline]
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        self.0.to_vec()
    }

    /// Get content length
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for BinaryValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BinaryValue").field(&self.0.len()).finish()
    }
}

impl Default for BinaryValue {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl From<Vec<u8>> for BinaryValue {
    fn from(data: Vec<u8>) -> Self {
        Self::new(data)
    }
}

impl From<&[u8]> for BinaryValue {
    fn from(data: &[u8]) -> Self {
        Self(Arc::from(data))
    }
}
