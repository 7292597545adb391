//! Type-descriptor registration API.
//!
//! A `TypeShape` is the declarative input to the metadata builder: which
//! fields and accessors a type declares, how each one is marked, and which
//! mapped ancestor (if any) contributes members before it.

use crate::traits::Mapped;
use std::{
    any::TypeId,
    fmt,
    hash::{Hash, Hasher},
};

///
/// TypeKey
/// Runtime type identity plus a diagnostic name.
///

#[derive(Clone, Copy, Debug)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, for log lines.
    #[must_use]
    pub fn short_name(&self) -> &'static str {
        self.name.rsplit("::").next().unwrap_or(self.name)
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

///
/// TypeRef
///
/// A declared member or ancestor type. `shape` is present only for mapped
/// types and is what the builder recurses into.
///

#[derive(Clone, Copy, Debug)]
pub struct TypeRef {
    key: TypeKey,
    shape: Option<fn() -> TypeShape>,
}

impl TypeRef {
    /// Reference an unmapped (scalar or collection) type.
    #[must_use]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: None,
        }
    }

    /// Reference a mapped type whose shape the builder can resolve.
    #[must_use]
    pub fn mapped<T: Mapped>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: Some(T::shape),
        }
    }

    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    #[must_use]
    pub const fn is_mapped(&self) -> bool {
        self.shape.is_some()
    }

    pub(crate) fn shape(&self) -> Option<TypeShape> {
        self.shape.map(|provider| provider())
    }
}

impl PartialEq for TypeRef {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for TypeRef {}

///
/// TypeRole
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TypeRole {
    /// Aggregate root; must carry an identifier somewhere in its ancestry.
    Entity,
    /// Pure structure stored inside its owner.
    Embeddable,
    /// Contributes members to mapped subtypes; never stored on its own.
    MappedAncestor,
}

///
/// Markers
/// Persistence annotations on one declared member.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[allow(clippy::struct_excessive_bools)]
pub struct Markers {
    pub id: bool,
    pub embedded_id: bool,
    pub version: bool,
    pub embedded: bool,
    pub reference: bool,
    pub collection: bool,
    pub transient: bool,
}

impl Markers {
    #[must_use]
    pub const fn is_identifier(&self) -> bool {
        self.id || self.embedded_id
    }

    /// True when any marker is present at all.
    #[must_use]
    pub const fn is_annotated(&self) -> bool {
        self.id
            || self.embedded_id
            || self.version
            || self.embedded
            || self.reference
            || self.collection
            || self.transient
    }
}

///
/// MemberDecl
///
/// One declared field or accessor. For accessors `readable` means a getter
/// exists and `writable` means a setter exists.
///

#[derive(Clone, Debug)]
pub struct MemberDecl {
    pub(crate) name: String,
    pub(crate) value_type: TypeRef,
    pub(crate) target: Option<TypeRef>,
    pub(crate) markers: Markers,
    pub(crate) readable: bool,
    pub(crate) writable: bool,
}

impl MemberDecl {
    #[must_use]
    pub fn new(name: impl Into<String>, value_type: TypeRef) -> Self {
        Self {
            name: name.into(),
            value_type,
            target: None,
            markers: Markers::default(),
            readable: true,
            writable: true,
        }
    }

    /// Declare a member of an unmapped type.
    #[must_use]
    pub fn of<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::of::<T>())
    }

    /// Declare a member whose type is mapped.
    #[must_use]
    pub fn mapped<T: Mapped>(name: impl Into<String>) -> Self {
        Self::new(name, TypeRef::mapped::<T>())
    }

    /// Declare a read-only accessor (getter without setter).
    #[must_use]
    pub fn getter<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::of::<T>(name).read_only()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn markers(&self) -> Markers {
        self.markers
    }

    #[must_use]
    pub fn id(mut self) -> Self {
        self.markers.id = true;
        self
    }

    #[must_use]
    pub fn embedded_id(mut self) -> Self {
        self.markers.embedded_id = true;
        self
    }

    #[must_use]
    pub fn version(mut self) -> Self {
        self.markers.version = true;
        self
    }

    #[must_use]
    pub fn embedded(mut self) -> Self {
        self.markers.embedded = true;
        self
    }

    #[must_use]
    pub fn reference(mut self) -> Self {
        self.markers.reference = true;
        self
    }

    #[must_use]
    pub fn collection(mut self) -> Self {
        self.markers.collection = true;
        self
    }

    #[must_use]
    pub fn transient(mut self) -> Self {
        self.markers.transient = true;
        self
    }

    /// Override the type the builder resolves for embedded/reference members.
    #[must_use]
    pub fn target(mut self, target: TypeRef) -> Self {
        self.target = Some(target);
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.writable = false;
        self
    }

    #[must_use]
    pub fn with_setter(mut self) -> Self {
        self.writable = true;
        self
    }

    /// Resolved nested type: the declared target override, else the static type.
    pub(crate) fn resolved_type(&self) -> TypeRef {
        self.target.unwrap_or(self.value_type)
    }
}

///
/// TypeShape
///

#[derive(Clone, Debug)]
pub struct TypeShape {
    pub(crate) key: TypeKey,
    pub(crate) role: TypeRole,
    pub(crate) parent: Option<TypeRef>,
    pub(crate) fields: Vec<MemberDecl>,
    pub(crate) accessors: Vec<MemberDecl>,
}

impl TypeShape {
    #[must_use]
    pub fn new(key: TypeKey, role: TypeRole) -> Self {
        Self {
            key,
            role,
            parent: None,
            fields: Vec::new(),
            accessors: Vec::new(),
        }
    }

    #[must_use]
    pub fn entity<T: 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), TypeRole::Entity)
    }

    #[must_use]
    pub fn embeddable<T: 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), TypeRole::Embeddable)
    }

    #[must_use]
    pub fn ancestor<T: 'static>() -> Self {
        Self::new(TypeKey::of::<T>(), TypeRole::MappedAncestor)
    }

    /// Declare the nearest mapped ancestor.
    #[must_use]
    pub fn extends<P: Mapped>(mut self) -> Self {
        self.parent = Some(TypeRef::mapped::<P>());
        self
    }

    #[must_use]
    pub fn field(mut self, decl: MemberDecl) -> Self {
        self.fields.push(decl);
        self
    }

    #[must_use]
    pub fn accessor(mut self, decl: MemberDecl) -> Self {
        self.accessors.push(decl);
        self
    }

    #[must_use]
    pub const fn key(&self) -> TypeKey {
        self.key
    }

    #[must_use]
    pub const fn role(&self) -> TypeRole {
        self.role
    }

    #[must_use]
    pub fn fields(&self) -> &[MemberDecl] {
        &self.fields
    }

    #[must_use]
    pub fn accessors(&self) -> &[MemberDecl] {
        &self.accessors
    }
}
