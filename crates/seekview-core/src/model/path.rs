//! Dotted property path resolution.
//!
//! A path is walked one segment at a time; every segment but the last must
//! land on an embedded or reference property. Instance-level reads and writes
//! stop quietly at the first null intermediate and never allocate one.

use crate::{
    model::{EntityModel, PropertyDescriptor, PropertyKind},
    traits::{AccessError, Instance, Member, MemberMut},
    value::Value,
};
use std::sync::Arc;
use thiserror::Error as ThisError;

///
/// ResolveError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum ResolveError {
    #[error("property path is empty")]
    EmptyPath,

    #[error("unknown property '{segment}' on '{ty}' in path '{path}'")]
    UnknownProperty {
        ty: &'static str,
        segment: String,
        path: String,
    },

    #[error("property '{segment}' of '{ty}' is {kind} and cannot be traversed in path '{path}'")]
    NotNested {
        ty: &'static str,
        segment: String,
        kind: PropertyKind,
        path: String,
    },

    #[error("nested model for '{segment}' was dropped with its cycle root")]
    DetachedModel { segment: String },

    #[error(transparent)]
    Access(#[from] AccessError),
}

fn segments(path: &str) -> Result<Vec<&str>, ResolveError> {
    if path.is_empty() {
        return Err(ResolveError::EmptyPath);
    }

    Ok(path.split('.').collect())
}

fn lookup<'m>(
    model: &'m EntityModel,
    segment: &str,
    path: &str,
) -> Result<&'m PropertyDescriptor, ResolveError> {
    model
        .property(segment)
        .ok_or_else(|| ResolveError::UnknownProperty {
            ty: model.type_name(),
            segment: segment.to_string(),
            path: path.to_string(),
        })
}

fn descend(
    model: &EntityModel,
    prop: &PropertyDescriptor,
    path: &str,
) -> Result<Arc<EntityModel>, ResolveError> {
    if !prop.kind.is_nested() {
        return Err(ResolveError::NotNested {
            ty: model.type_name(),
            segment: prop.name.clone(),
            kind: prop.kind,
            path: path.to_string(),
        });
    }

    prop.nested_model()
        .ok_or_else(|| ResolveError::DetachedModel {
            segment: prop.name.clone(),
        })
}

/// Resolve a dotted path to the descriptor of its final segment.
pub fn resolve(model: &EntityModel, path: &str) -> Result<PropertyDescriptor, ResolveError> {
    let segments = segments(path)?;
    let (last, init) = segments.split_last().ok_or(ResolveError::EmptyPath)?;

    let mut nested: Option<Arc<EntityModel>> = None;
    for segment in init {
        let current = nested.as_deref().unwrap_or(model);
        let prop = lookup(current, segment, path)?;
        let next = descend(current, prop, path)?;
        nested = Some(next);
    }

    let current = nested.as_deref().unwrap_or(model);

    lookup(current, last, path).cloned()
}

/// Read the value at `path`.
///
/// `Ok(None)` means an intermediate object was null, so the path has no
/// value at all; a null terminal reads as `Some(Value::Null)`.
pub fn get_value(
    model: &EntityModel,
    instance: &dyn Instance,
    path: &str,
) -> Result<Option<Value>, ResolveError> {
    let segments = segments(path)?;

    read_path(model, instance, &segments, path)
}

fn read_path(
    model: &EntityModel,
    instance: &dyn Instance,
    segments: &[&str],
    path: &str,
) -> Result<Option<Value>, ResolveError> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(ResolveError::EmptyPath);
    };
    let prop = lookup(model, head, path)?;

    if rest.is_empty() {
        return read_property(prop, instance).map(Some);
    }

    let nested = descend(model, prop, path)?;
    match instance.member(&prop.accessor) {
        Some(Member::Object(Some(child))) => read_path(&nested, child, rest, path),
        Some(Member::Object(None)) => Ok(None),
        Some(Member::Value(value)) if value.is_null() => Ok(None),
        Some(Member::Value(value)) => Err(AccessError::mismatch(&prop.name, &value).into()),
        None => Err(AccessError::unknown(&prop.name).into()),
    }
}

/// Read one property of `instance` as a single value.
///
/// Embedded structures read as the list of their persistent components in
/// declared order; references read as the referenced entity's identifier.
pub fn read_property(
    prop: &PropertyDescriptor,
    instance: &dyn Instance,
) -> Result<Value, ResolveError> {
    let member = instance
        .member(&prop.accessor)
        .ok_or_else(|| AccessError::unknown(&prop.name))?;

    match (prop.kind, member) {
        (_, Member::Value(value)) => Ok(value),
        (_, Member::Object(None)) => Ok(Value::Null),

        (PropertyKind::Embedded, Member::Object(Some(child))) => {
            let nested = detached_guard(prop)?;
            let components = nested
                .persistent_properties()
                .map(|component| read_property(component, child))
                .collect::<Result<Vec<_>, _>>()?;

            Ok(Value::List(components))
        }

        (PropertyKind::Reference, Member::Object(Some(child))) => {
            let nested = detached_guard(prop)?;
            match nested.identifier() {
                Some(id) => read_property(id, child),
                None => Ok(Value::Null),
            }
        }

        (_, Member::Object(Some(_))) => Err(AccessError::ObjectMember {
            name: prop.name.clone(),
        }
        .into()),
    }
}

fn detached_guard(prop: &PropertyDescriptor) -> Result<Arc<EntityModel>, ResolveError> {
    prop.nested_model()
        .ok_or_else(|| ResolveError::DetachedModel {
            segment: prop.name.clone(),
        })
}

/// Write `value` at `path`.
///
/// Returns `Ok(false)` without writing when an intermediate object is null.
pub fn set_value(
    model: &EntityModel,
    instance: &mut dyn Instance,
    path: &str,
    value: Value,
) -> Result<bool, ResolveError> {
    let segments = segments(path)?;

    write_path(model, instance, &segments, path, value)
}

fn write_path(
    model: &EntityModel,
    instance: &mut dyn Instance,
    segments: &[&str],
    path: &str,
    value: Value,
) -> Result<bool, ResolveError> {
    let Some((head, rest)) = segments.split_first() else {
        return Err(ResolveError::EmptyPath);
    };
    let prop = lookup(model, head, path)?;

    if rest.is_empty() {
        if !prop.writable || prop.kind == PropertyKind::Transient {
            return Err(AccessError::ReadOnly {
                name: prop.name.clone(),
            }
            .into());
        }
        // sub-objects can only be cleared through a path, never assigned
        if prop.kind.is_nested() && !value.is_null() {
            return Err(AccessError::ObjectMember {
                name: prop.name.clone(),
            }
            .into());
        }

        instance.set_member(&prop.accessor, value)?;
        return Ok(true);
    }

    let nested = descend(model, prop, path)?;
    match instance.member_mut(&prop.accessor) {
        Some(MemberMut::Object(Some(child))) => write_path(&nested, child, rest, path, value),
        Some(MemberMut::Object(None)) => Ok(false),
        Some(MemberMut::Value) => Err(AccessError::TypeMismatch {
            name: prop.name.clone(),
            found: "value",
        }
        .into()),
        None => Err(AccessError::unknown(&prop.name).into()),
    }
}

/// Current optimistic-concurrency tag of `instance`, if the type has one.
pub fn version_value(
    model: &EntityModel,
    instance: &dyn Instance,
) -> Result<Option<Value>, ResolveError> {
    model
        .version()
        .map(|version| read_property(version, instance))
        .transpose()
}

/// Current identifier of `instance`; composite identifiers read as a list.
pub fn identifier_value(
    model: &EntityModel,
    instance: &dyn Instance,
) -> Result<Option<Value>, ResolveError> {
    model
        .identifier()
        .map(|id| read_property(id, instance))
        .transpose()
}
