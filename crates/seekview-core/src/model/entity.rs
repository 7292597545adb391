use crate::model::{AccessStrategy, PropertyDescriptor, PropertyKind, TypeKey, TypeRole};
use std::sync::OnceLock;

///
/// EntityModel
///
/// Structural description of one mapped type. Registered as a placeholder
/// before its members are resolved so cyclic graphs resolve to the same
/// instance; the body is set exactly once when the build completes and is
/// immutable afterwards.
///

#[derive(Debug)]
pub struct EntityModel {
    mapped_type: TypeKey,
    role: TypeRole,
    max_flatten_depth: usize,
    body: OnceLock<ModelBody>,
    flattened: OnceLock<Vec<String>>,
}

///
/// ModelBody
///

#[derive(Debug)]
pub(crate) struct ModelBody {
    pub(crate) access: AccessStrategy,
    pub(crate) properties: Vec<PropertyDescriptor>,
    pub(crate) identifier: Option<usize>,
    pub(crate) version: Option<usize>,
}

impl EntityModel {
    pub(crate) const fn placeholder(
        mapped_type: TypeKey,
        role: TypeRole,
        max_flatten_depth: usize,
    ) -> Self {
        Self {
            mapped_type,
            role,
            max_flatten_depth,
            body: OnceLock::new(),
            flattened: OnceLock::new(),
        }
    }

    /// Publish the body; returns false if it was already set.
    pub(crate) fn complete(&self, body: ModelBody) -> bool {
        self.body.set(body).is_ok()
    }

    fn body(&self) -> Option<&ModelBody> {
        self.body.get()
    }

    #[must_use]
    pub const fn mapped_type(&self) -> TypeKey {
        self.mapped_type
    }

    #[must_use]
    pub const fn role(&self) -> TypeRole {
        self.role
    }

    #[must_use]
    pub fn type_name(&self) -> &'static str {
        self.mapped_type.short_name()
    }

    /// False only while the builder is still resolving this type.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.body.get().is_some()
    }

    #[must_use]
    pub fn access_strategy(&self) -> Option<AccessStrategy> {
        self.body().map(|body| body.access)
    }

    /// All properties in declaration order (ancestors first).
    #[must_use]
    pub fn properties(&self) -> &[PropertyDescriptor] {
        self.body().map_or(&[], |body| body.properties.as_slice())
    }

    /// Look up a direct (non-dotted) property.
    #[must_use]
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties().iter().find(|prop| prop.name == name)
    }

    pub fn persistent_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties()
            .iter()
            .filter(|prop| prop.kind.is_persistent())
    }

    pub fn transient_properties(&self) -> impl Iterator<Item = &PropertyDescriptor> {
        self.properties()
            .iter()
            .filter(|prop| prop.kind == PropertyKind::Transient)
    }

    #[must_use]
    pub fn identifier(&self) -> Option<&PropertyDescriptor> {
        let body = self.body()?;
        body.identifier.map(|index| &body.properties[index])
    }

    #[must_use]
    pub fn version(&self) -> Option<&PropertyDescriptor> {
        let body = self.body()?;
        body.version.map(|index| &body.properties[index])
    }

    #[must_use]
    pub fn has_embedded_identifier(&self) -> bool {
        self.identifier()
            .is_some_and(|id| id.kind == PropertyKind::Embedded)
    }

    /// Leaf identifier paths in declared order; a composite identifier
    /// expands to one dotted path per component.
    #[must_use]
    pub fn identifier_paths(&self) -> Vec<String> {
        let Some(id) = self.identifier() else {
            return Vec::new();
        };

        if id.kind != PropertyKind::Embedded {
            return vec![id.name.clone()];
        }

        // every key component counts, so only the cycle guard bounds this
        let mut out = Vec::new();
        if let Some(nested) = id.nested_model() {
            let mut visited = vec![self.mapped_type];
            collect_leaf_paths(&nested, &id.name, false, usize::MAX, &mut visited, &mut out);
        }

        out
    }

    /// Dotted names of every persistent property, descending through
    /// embedded structures. Computed once on first use.
    #[must_use]
    pub fn flattened_paths(&self) -> &[String] {
        self.flattened.get_or_init(|| {
            let mut out = Vec::new();
            let mut visited = vec![self.mapped_type];
            flatten_into(self, "", self.max_flatten_depth, &mut visited, &mut out);
            out
        })
    }

    /// Leaf paths usable as sort keys: simple properties, reached directly
    /// or through embedded and referenced structures.
    #[must_use]
    pub fn sortable_paths(&self) -> Vec<String> {
        let mut out = Vec::new();
        let mut visited = vec![self.mapped_type];
        collect_leaf_paths(self, "", true, self.max_flatten_depth, &mut visited, &mut out);

        out
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

// Every persistent property, with nested embedded names interleaved after
// their owner.
fn flatten_into(
    model: &EntityModel,
    prefix: &str,
    depth: usize,
    visited: &mut Vec<TypeKey>,
    out: &mut Vec<String>,
) {
    for prop in model.persistent_properties() {
        let path = join(prefix, &prop.name);
        out.push(path.clone());

        if prop.kind != PropertyKind::Embedded || depth == 0 {
            continue;
        }
        let Some(nested) = prop.nested_model() else {
            continue;
        };
        if visited.contains(&nested.mapped_type) {
            continue;
        }

        visited.push(nested.mapped_type);
        flatten_into(&nested, &path, depth - 1, visited, out);
        visited.pop();
    }
}

// Simple leaves only. Embedded structures are always expanded; references
// only when `through_refs` is set.
fn collect_leaf_paths(
    model: &EntityModel,
    prefix: &str,
    through_refs: bool,
    depth: usize,
    visited: &mut Vec<TypeKey>,
    out: &mut Vec<String>,
) {
    for prop in model.persistent_properties() {
        let path = join(prefix, &prop.name);

        match prop.kind {
            PropertyKind::Simple => out.push(path),
            PropertyKind::Embedded | PropertyKind::Reference => {
                if depth == 0 || (prop.kind == PropertyKind::Reference && !through_refs) {
                    continue;
                }
                let Some(nested) = prop.nested_model() else {
                    continue;
                };
                if visited.contains(&nested.mapped_type) {
                    continue;
                }

                visited.push(nested.mapped_type);
                collect_leaf_paths(&nested, &path, through_refs, depth - 1, visited, out);
                visited.pop();
            }
            PropertyKind::Collection | PropertyKind::Transient => {}
        }
    }
}
