//! Metadata builder.
//!
//! Invariants:
//! - A type's model is staged as a placeholder before any nested member is
//!   resolved, so cycles resolve to the same instance instead of recursing.
//! - Nothing is published to the registry unless the whole graph builds.
//! - Malformed metadata is an error, never a silent default.

use crate::{
    config::RegistryConfig,
    model::{
        AccessStrategy, Accessor, EntityModel, Markers, MemberDecl, ModelBody, NestedModel,
        PropertyDescriptor, PropertyKind, TypeKey, TypeRef, TypeRole, TypeShape,
    },
};
use std::{collections::HashMap, sync::Arc};
use thiserror::Error as ThisError;

///
/// BuildError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum BuildError {
    #[error("type '{ty}' has no type descriptor")]
    Unmapped { ty: &'static str },

    #[error("member '{member}' of '{ty}' targets unmapped type '{target}'")]
    UnmappedTarget {
        ty: &'static str,
        member: String,
        target: &'static str,
    },

    #[error("entity '{ty}' declares no identifier in its type or ancestors")]
    MissingIdentifier { ty: &'static str },

    #[error("type '{ty}' marks identifiers on both fields and accessors")]
    AmbiguousAccess { ty: &'static str },

    #[error("member '{member}' of '{ty}' carries contradictory markers")]
    ConflictingMarkers { ty: &'static str, member: String },

    #[error(
        "member '{member}' of '{ty}' is {field_kind} as a field but {accessor_kind} as an accessor"
    )]
    ConflictingKind {
        ty: &'static str,
        member: String,
        field_kind: PropertyKind,
        accessor_kind: PropertyKind,
    },

    #[error("accessor '{member}' of '{ty}' is persistent but has no getter")]
    UnreadableMember { ty: &'static str, member: String },

    #[error("type '{ty}' declares {count} identifiers; composite keys must be embedded")]
    MultipleIdentifiers { ty: &'static str, count: usize },

    #[error("type '{ty}' declares {count} version properties")]
    MultipleVersions { ty: &'static str, count: usize },

    #[error("embedded identifier '{member}' of '{ty}' has {found} of {total} key components")]
    PartialCompositeKey {
        ty: &'static str,
        member: String,
        found: usize,
        total: usize,
    },

    #[error("member '{member}' of '{ty}' must target {expected:?} type, found {found:?}")]
    InvalidNestedTarget {
        ty: &'static str,
        member: String,
        expected: TypeRole,
        found: TypeRole,
    },

    #[error("type '{ty}' extends '{ancestor}', which is not a mapped ancestor")]
    InvalidAncestor {
        ty: &'static str,
        ancestor: &'static str,
    },

    #[error("type '{ty}' appears in its own ancestry")]
    AncestorCycle { ty: &'static str },
}

///
/// Slot
/// One resolved property plus the markers that produced it.
///

struct Slot {
    descriptor: PropertyDescriptor,
    markers: Markers,
}

///
/// ModelBuilder
///
/// Stages every model produced while building one requested type. The
/// caller holds the registry lock for the builder's whole lifetime.
///

pub(crate) struct ModelBuilder<'a> {
    committed: &'a HashMap<TypeKey, Arc<EntityModel>>,
    staging: HashMap<TypeKey, Arc<EntityModel>>,
    config: &'a RegistryConfig,
}

impl<'a> ModelBuilder<'a> {
    pub(crate) fn new(
        committed: &'a HashMap<TypeKey, Arc<EntityModel>>,
        config: &'a RegistryConfig,
    ) -> Self {
        Self {
            committed,
            staging: HashMap::new(),
            config,
        }
    }

    /// Models built by this pass, ready to publish.
    pub(crate) fn into_staged(self) -> HashMap<TypeKey, Arc<EntityModel>> {
        self.staging
    }

    fn lookup(&self, key: TypeKey) -> Option<Arc<EntityModel>> {
        self.committed
            .get(&key)
            .or_else(|| self.staging.get(&key))
            .map(Arc::clone)
    }

    /// Fetch or build the model for `ty`.
    pub(crate) fn build(&mut self, ty: TypeRef) -> Result<Arc<EntityModel>, BuildError> {
        if let Some(model) = self.lookup(ty.key()) {
            return Ok(model);
        }

        let shape = ty.shape().ok_or(BuildError::Unmapped {
            ty: ty.key().name(),
        })?;

        self.build_shape(shape)
    }

    fn build_shape(&mut self, shape: TypeShape) -> Result<Arc<EntityModel>, BuildError> {
        let key = shape.key;
        let role = shape.role;
        let ty = key.short_name();

        let chain = ancestry(shape)?;
        let access = access_strategy(ty, role, &chain)?;

        // register before resolving members so cycles find this instance
        let model = Arc::new(EntityModel::placeholder(
            key,
            role,
            self.config.max_flatten_depth,
        ));
        self.staging.insert(key, Arc::clone(&model));

        let mut slots: Vec<Slot> = Vec::new();

        // structural pass, ancestors first
        for level in &chain {
            let (declared, other) = match access {
                AccessStrategy::Field => (&level.fields, &level.accessors),
                AccessStrategy::Accessor => (&level.accessors, &level.fields),
            };

            for decl in declared {
                let Some(kind) = classify(ty, decl)? else {
                    continue;
                };
                check_twin(ty, decl, kind, access, other)?;

                if access == AccessStrategy::Accessor && !decl.readable {
                    return Err(BuildError::UnreadableMember {
                        ty,
                        member: decl.name.clone(),
                    });
                }

                let descriptor = self.describe(ty, decl, kind, access)?;
                upsert(
                    &mut slots,
                    Slot {
                        descriptor,
                        markers: decl.markers,
                    },
                );
            }
        }

        // transient read accessors not claimed by a persistent property
        for level in &chain {
            for decl in &level.accessors {
                let claimed = slots.iter().any(|slot| {
                    slot.descriptor.name == decl.name && slot.descriptor.kind.is_persistent()
                });
                if !decl.readable || claimed {
                    continue;
                }

                upsert(
                    &mut slots,
                    Slot {
                        descriptor: PropertyDescriptor {
                            name: decl.name.clone(),
                            kind: PropertyKind::Transient,
                            value_type: decl.value_type,
                            accessor: Accessor::method(&decl.name, false),
                            writable: false,
                            nested: None,
                        },
                        markers: Markers::default(),
                    },
                );
            }
        }

        let (identifier, version) = bind_identity(ty, role, &slots)?;

        let body = ModelBody {
            access,
            properties: slots.into_iter().map(|slot| slot.descriptor).collect(),
            identifier,
            version,
        };
        model.complete(body);

        Ok(model)
    }

    fn describe(
        &mut self,
        ty: &'static str,
        decl: &MemberDecl,
        kind: PropertyKind,
        access: AccessStrategy,
    ) -> Result<PropertyDescriptor, BuildError> {
        let accessor = match access {
            AccessStrategy::Field => Accessor::field(&decl.name),
            AccessStrategy::Accessor => Accessor::method(&decl.name, decl.writable),
        };
        let writable = match kind {
            PropertyKind::Embedded | PropertyKind::Reference | PropertyKind::Collection => true,
            PropertyKind::Simple | PropertyKind::Transient => decl.writable,
        };

        let nested = if kind.is_nested() {
            let target = decl.resolved_type();
            if !target.is_mapped() {
                return Err(BuildError::UnmappedTarget {
                    ty,
                    member: decl.name.clone(),
                    target: target.key().name(),
                });
            }

            let nested = self.build(target)?;
            let expected = if kind == PropertyKind::Embedded {
                TypeRole::Embeddable
            } else {
                TypeRole::Entity
            };
            if nested.role() != expected {
                return Err(BuildError::InvalidNestedTarget {
                    ty,
                    member: decl.name.clone(),
                    expected,
                    found: nested.role(),
                });
            }

            Some(NestedModel::new(&nested))
        } else {
            None
        };

        Ok(PropertyDescriptor {
            name: decl.name.clone(),
            kind,
            value_type: decl.value_type,
            accessor,
            writable,
            nested,
        })
    }
}

// Ancestors first, the requested type last.
fn ancestry(shape: TypeShape) -> Result<Vec<TypeShape>, BuildError> {
    let ty = shape.key.short_name();
    let mut seen = vec![shape.key];
    let mut parent = shape.parent;
    let mut chain = vec![shape];

    while let Some(parent_ref) = parent {
        if seen.contains(&parent_ref.key()) {
            return Err(BuildError::AncestorCycle { ty });
        }

        let parent_shape = parent_ref.shape().ok_or(BuildError::Unmapped {
            ty: parent_ref.key().name(),
        })?;
        if parent_shape.role == TypeRole::Embeddable {
            return Err(BuildError::InvalidAncestor {
                ty,
                ancestor: parent_ref.key().short_name(),
            });
        }

        seen.push(parent_ref.key());
        parent = parent_shape.parent;
        chain.push(parent_shape);
    }

    chain.reverse();

    Ok(chain)
}

// Identifier marker on fields first, then accessors, then the nearest
// ancestor. Types without any marker default to field access unless they
// only declare accessors.
fn access_strategy(
    ty: &'static str,
    role: TypeRole,
    chain: &[TypeShape],
) -> Result<AccessStrategy, BuildError> {
    for level in chain.iter().rev() {
        let on_fields = level.fields.iter().any(|d| d.markers.is_identifier());
        let on_accessors = level.accessors.iter().any(|d| d.markers.is_identifier());

        match (on_fields, on_accessors) {
            (true, true) => return Err(BuildError::AmbiguousAccess { ty }),
            (true, false) => return Ok(AccessStrategy::Field),
            (false, true) => return Ok(AccessStrategy::Accessor),
            (false, false) => {}
        }
    }

    if role == TypeRole::Entity {
        return Err(BuildError::MissingIdentifier { ty });
    }

    let declares_fields = chain.iter().any(|level| !level.fields.is_empty());
    let declares_accessors = chain.iter().any(|level| !level.accessors.is_empty());

    if declares_accessors && !declares_fields {
        Ok(AccessStrategy::Accessor)
    } else {
        Ok(AccessStrategy::Field)
    }
}

// `None` for members excluded from persistence.
fn classify(ty: &'static str, decl: &MemberDecl) -> Result<Option<PropertyKind>, BuildError> {
    let m = decl.markers;
    let conflict = || BuildError::ConflictingMarkers {
        ty,
        member: decl.name.clone(),
    };

    if m.transient {
        if m.is_identifier() || m.version || m.embedded || m.reference || m.collection {
            return Err(conflict());
        }
        return Ok(None);
    }

    let relations = [m.embedded || m.embedded_id, m.reference, m.collection]
        .into_iter()
        .filter(|flag| *flag)
        .count();
    let contradictory = relations > 1
        || (m.id && m.embedded_id)
        || (m.id && relations > 0)
        || (m.version && (relations > 0 || m.is_identifier()));
    if contradictory {
        return Err(conflict());
    }

    let kind = if m.embedded || m.embedded_id {
        PropertyKind::Embedded
    } else if m.reference {
        PropertyKind::Reference
    } else if m.collection {
        PropertyKind::Collection
    } else {
        PropertyKind::Simple
    };

    Ok(Some(kind))
}

// A same-named member on the other access surface may restate the kind but
// never contradict it.
fn check_twin(
    ty: &'static str,
    decl: &MemberDecl,
    kind: PropertyKind,
    access: AccessStrategy,
    other: &[MemberDecl],
) -> Result<(), BuildError> {
    let Some(twin) = other.iter().find(|o| o.name == decl.name) else {
        return Ok(());
    };
    if !twin.markers.is_annotated() || twin.markers.transient {
        return Ok(());
    }

    let Some(twin_kind) = classify(ty, twin)? else {
        return Ok(());
    };
    if twin_kind == kind {
        return Ok(());
    }

    let (field_kind, accessor_kind) = match access {
        AccessStrategy::Field => (kind, twin_kind),
        AccessStrategy::Accessor => (twin_kind, kind),
    };

    Err(BuildError::ConflictingKind {
        ty,
        member: decl.name.clone(),
        field_kind,
        accessor_kind,
    })
}

// Subtype redeclarations replace the ancestor's slot in place.
fn upsert(slots: &mut Vec<Slot>, slot: Slot) {
    match slots
        .iter_mut()
        .find(|existing| existing.descriptor.name == slot.descriptor.name)
    {
        Some(existing) => *existing = slot,
        None => slots.push(slot),
    }
}

fn bind_identity(
    ty: &'static str,
    role: TypeRole,
    slots: &[Slot],
) -> Result<(Option<usize>, Option<usize>), BuildError> {
    let ids: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.markers.is_identifier())
        .map(|(index, _)| index)
        .collect();

    let identifier = match ids.as_slice() {
        [] if role == TypeRole::Entity => return Err(BuildError::MissingIdentifier { ty }),
        [] => None,
        [index] => Some(*index),
        _ => {
            return Err(BuildError::MultipleIdentifiers {
                ty,
                count: ids.len(),
            });
        }
    };

    if let Some(index) = identifier {
        let slot = &slots[index];
        if slot.markers.embedded_id {
            check_composite_key(ty, &slot.descriptor)?;
        }
    }

    let versions: Vec<usize> = slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| slot.markers.version)
        .map(|(index, _)| index)
        .collect();

    let version = match versions.as_slice() {
        [] => None,
        [index] => Some(*index),
        _ => {
            return Err(BuildError::MultipleVersions {
                ty,
                count: versions.len(),
            });
        }
    };

    Ok((identifier, version))
}

// Every persistent component of an embedded identifier must be a key leaf
// (simple, or a nested embedded structure of leaves).
fn check_composite_key(
    ty: &'static str,
    descriptor: &PropertyDescriptor,
) -> Result<(), BuildError> {
    let partial = |found, total| BuildError::PartialCompositeKey {
        ty,
        member: descriptor.name.clone(),
        found,
        total,
    };

    let Some(nested) = descriptor.nested_model() else {
        return Err(partial(0, 0));
    };

    let total = nested.persistent_properties().count();
    let found = nested
        .persistent_properties()
        .filter(|prop| matches!(prop.kind, PropertyKind::Simple | PropertyKind::Embedded))
        .count();

    if total == 0 || found < total {
        return Err(partial(found, total));
    }

    Ok(())
}
