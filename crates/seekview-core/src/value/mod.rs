mod compare;
mod float;
mod like;


use std::cmp::Ordering;
use ulid::Ulid;

// re-exports
pub use compare::{canonical_cmp, strict_order_cmp};
pub use float::Float64;
pub(crate) use like::like_matches;

///
/// Value
///
/// Literal and projected values exchanged with predicates, sort anchors and
/// the backing executor.
///
/// Null → the member holds no value (SQL NULL).
/// List → collection members, and embedded composites read as a whole
///        (components in declared order).
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Float(Float64),
    Text(String),
    Blob(Vec<u8>),
    Ulid(Ulid),
    List(Vec<Self>),
}

impl Value {
    /// Build a text value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Build a float value; non-finite input becomes `Null`.
    #[must_use]
    pub fn float(value: f64) -> Self {
        Float64::try_new(value).map_or(Self::Null, Self::Float)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text.as_str()),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_list(&self) -> Option<&[Self]> {
        match self {
            Self::List(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Collection emptiness; `None` for non-collection values.
    #[must_use]
    pub const fn is_empty_collection(&self) -> Option<bool> {
        match self {
            Self::List(items) => Some(items.is_empty()),
            Self::Blob(bytes) => Some(bytes.is_empty()),
            _ => None,
        }
    }

    /// Total canonical comparison (variant rank first, then payload).
    #[must_use]
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        canonical_cmp(self, other)
    }

    /// Stable rank of the variant family, `Null` lowest.
    #[must_use]
    pub(crate) const fn canonical_rank(&self) -> u8 {
        match self {
            Self::Null => 0,
            Self::Bool(_) => 1,
            Self::Int(_) | Self::Uint(_) | Self::Float(_) => 2,
            Self::Text(_) => 3,
            Self::Blob(_) => 4,
            Self::Ulid(_) => 5,
            Self::List(_) => 6,
        }
    }

    /// Short variant label for diagnostics.
    #[must_use]
    pub const fn kind_label(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Uint(_) => "uint",
            Self::Float(_) => "float",
            Self::Text(_) => "text",
            Self::Blob(_) => "blob",
            Self::Ulid(_) => "ulid",
            Self::List(_) => "list",
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for Value {
    fn from(value: u32) -> Self {
        Self::Uint(u64::from(value))
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Ulid> for Value {
    fn from(value: Ulid) -> Self {
        Self::Ulid(value)
    }
}

impl From<Float64> for Value {
    fn from(value: Float64) -> Self {
        Self::Float(value)
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl<T: Into<Self>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}
