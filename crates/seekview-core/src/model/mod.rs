//! Structural metadata: type shapes in, immutable entity models out.

mod build;
mod entity;
mod path;
mod property;
mod registry;
mod shape;

#[cfg(test)]
mod tests;

// re-exports
pub use build::BuildError;
pub use entity::EntityModel;
pub use path::{
    ResolveError, get_value, identifier_value, read_property, resolve, set_value, version_value,
};
pub use property::{AccessStrategy, Accessor, NestedModel, PropertyDescriptor, PropertyKind};
pub use registry::MetadataRegistry;
pub use shape::{Markers, MemberDecl, TypeKey, TypeRef, TypeRole, TypeShape};

pub(crate) use entity::ModelBody;
