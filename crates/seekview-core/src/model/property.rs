use crate::model::{EntityModel, TypeRef};
use std::{
    fmt,
    sync::{Arc, Weak},
};

///
/// PropertyKind
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum PropertyKind {
    Simple,
    Embedded,
    Reference,
    Collection,
    /// Read-only convenience accessor; never persisted.
    Transient,
}

impl PropertyKind {
    /// Kinds whose descriptor carries a nested model.
    #[must_use]
    pub const fn is_nested(self) -> bool {
        matches!(self, Self::Embedded | Self::Reference)
    }

    #[must_use]
    pub const fn is_persistent(self) -> bool {
        !matches!(self, Self::Transient)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Simple => "simple",
            Self::Embedded => "embedded",
            Self::Reference => "reference",
            Self::Collection => "collection",
            Self::Transient => "transient",
        };
        write!(f, "{label}")
    }
}

///
/// AccessStrategy
/// Chosen once per type; every persistent member uses it.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AccessStrategy {
    Field,
    Accessor,
}

///
/// Accessor
///
/// Opaque read/write capability handed to `Instance` implementations.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Accessor {
    Field { name: String },
    Method { getter: String, setter: Option<String> },
}

impl Accessor {
    #[must_use]
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field { name: name.into() }
    }

    /// Accessor pair; the setter name follows the `set_<name>` convention.
    #[must_use]
    pub fn method(name: impl Into<String>, writable: bool) -> Self {
        let getter = name.into();
        let setter = writable.then(|| format!("set_{getter}"));

        Self::Method { getter, setter }
    }

    /// Member name this accessor reads.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Field { name } => name,
            Self::Method { getter, .. } => getter,
        }
    }

    #[must_use]
    pub const fn is_field(&self) -> bool {
        matches!(self, Self::Field { .. })
    }
}

///
/// NestedModel
///
/// Link from a property to the model of its embedded or referenced type.
///
/// Links to models that were already complete when the property was built
/// own their target, so a root model keeps its reachable graph alive without
/// the registry. Links that close a cycle (to a model still being built, the
/// type itself included) are weak; the cycle's root holds them up.
///

#[derive(Clone, Debug)]
pub struct NestedModel(Link);

#[derive(Clone, Debug)]
enum Link {
    Owned(Arc<EntityModel>),
    Cycle(Weak<EntityModel>),
}

impl NestedModel {
    pub(crate) fn new(model: &Arc<EntityModel>) -> Self {
        if model.is_complete() {
            Self(Link::Owned(Arc::clone(model)))
        } else {
            Self(Link::Cycle(Arc::downgrade(model)))
        }
    }

    /// True when this link closes a cycle and does not own its target.
    #[must_use]
    pub const fn is_cycle(&self) -> bool {
        matches!(self.0, Link::Cycle(_))
    }

    #[must_use]
    pub fn upgrade(&self) -> Option<Arc<EntityModel>> {
        match &self.0 {
            Link::Owned(model) => Some(Arc::clone(model)),
            Link::Cycle(model) => model.upgrade(),
        }
    }
}

///
/// PropertyDescriptor
///

#[derive(Clone, Debug)]
pub struct PropertyDescriptor {
    pub(crate) name: String,
    pub(crate) kind: PropertyKind,
    pub(crate) value_type: TypeRef,
    pub(crate) accessor: Accessor,
    pub(crate) writable: bool,
    pub(crate) nested: Option<NestedModel>,
}

impl PropertyDescriptor {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn kind(&self) -> PropertyKind {
        self.kind
    }

    #[must_use]
    pub const fn value_type(&self) -> TypeRef {
        self.value_type
    }

    #[must_use]
    pub const fn accessor(&self) -> &Accessor {
        &self.accessor
    }

    #[must_use]
    pub const fn is_writable(&self) -> bool {
        self.writable
    }

    #[must_use]
    pub const fn nested(&self) -> Option<&NestedModel> {
        self.nested.as_ref()
    }

    /// Nested model for embedded/reference properties.
    #[must_use]
    pub fn nested_model(&self) -> Option<Arc<EntityModel>> {
        self.nested.as_ref().and_then(NestedModel::upgrade)
    }
}
