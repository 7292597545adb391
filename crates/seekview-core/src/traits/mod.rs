//! Capabilities a type provides so the runtime can describe and access it
//! without reflection.
//!
//! - [`Mapped`] supplies the type's structural shape (the type-descriptor
//!   provider consumed by the metadata builder).
//! - [`Instance`] is the object-safe get/set-by-descriptor runtime used by
//!   the path resolver and the reference executor.
//! - [`FieldValue`] converts leaf member types to and from [`Value`].
//! - [`ObjectValue`] exposes embedded and referenced members as instances.

mod field_value;
mod object_value;


use crate::{
    model::{Accessor, TypeShape},
    value::Value,
};
use thiserror::Error as ThisError;

// re-exports
pub use field_value::FieldValue;
pub use object_value::ObjectValue;

///
/// Mapped
///
/// Type-descriptor provider. Implemented by `#[derive(Mapped)]` or by hand
/// through the `TypeShape` registration API.
///

pub trait Mapped: Instance + 'static {
    fn shape() -> TypeShape;
}

///
/// Member
/// Read view of one member of an instance.
///

pub enum Member<'a> {
    /// Leaf value (scalars, collections).
    Value(Value),
    /// Embedded or referenced sub-object; `None` is the null sentinel.
    Object(Option<&'a dyn Instance>),
}

///
/// MemberMut
/// Write view of one member; only sub-objects are reachable mutably.
///

pub enum MemberMut<'a> {
    Value,
    Object(Option<&'a mut dyn Instance>),
}

///
/// Instance
///
/// Get/set by descriptor. `None` from `member` / `member_mut` means the
/// instance has no member behind that accessor.
///

pub trait Instance {
    fn member(&self, accessor: &Accessor) -> Option<Member<'_>>;

    fn member_mut(&mut self, accessor: &Accessor) -> Option<MemberMut<'_>>;

    fn set_member(&mut self, accessor: &Accessor, value: Value) -> Result<(), AccessError>;
}

///
/// AccessError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum AccessError {
    #[error("no member '{name}' on this instance")]
    UnknownMember { name: String },

    #[error("member '{name}' is read-only")]
    ReadOnly { name: String },

    #[error("member '{name}' cannot hold a {found} value")]
    TypeMismatch { name: String, found: &'static str },

    #[error("member '{name}' is a sub-object and cannot be assigned a value")]
    ObjectMember { name: String },
}

impl AccessError {
    /// Build a type mismatch for `value` assigned to `name`.
    #[must_use]
    pub fn mismatch(name: &str, value: &Value) -> Self {
        Self::TypeMismatch {
            name: name.to_string(),
            found: value.kind_label(),
        }
    }

    #[must_use]
    pub fn unknown(name: &str) -> Self {
        Self::UnknownMember {
            name: name.to_string(),
        }
    }
}
