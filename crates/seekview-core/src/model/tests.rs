use super::*;
use crate::{
    config::RegistryConfig,
    test_fixtures::{Account, Address, Dept, Invoice, Line, Node, Person, opaque_instance},
    traits::{AccessError, Mapped},
    value::Value,
};
use std::sync::Arc;

///
/// Invalid shapes
///

opaque_instance!(
    NoId,
    BothAccess,
    TwoRelations,
    KindClash,
    TwoIds,
    TwoVersions,
    EmbedsEntity,
    EmbedsScalar,
    BagKey,
    BagKeyHolder,
    Holder,
    LoopA,
    LoopB,
    ExtendsEmbeddable,
    ZoneKey,
    ShardKey,
    Shard,
);

impl Mapped for NoId {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>().field(MemberDecl::of::<String>("name"))
    }
}

impl Mapped for BothAccess {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .accessor(MemberDecl::of::<u64>("key").id())
    }
}

impl Mapped for TwoRelations {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::mapped::<Address>("home").embedded().reference())
    }
}

impl Mapped for KindClash {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::mapped::<Address>("address").embedded())
            .accessor(MemberDecl::mapped::<Dept>("address").reference())
    }
}

impl Mapped for TwoIds {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("a").id())
            .field(MemberDecl::of::<u64>("b").id())
    }
}

impl Mapped for TwoVersions {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::of::<u64>("v1").version())
            .field(MemberDecl::of::<u64>("v2").version())
    }
}

impl Mapped for EmbedsEntity {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::mapped::<Dept>("dept").embedded())
    }
}

impl Mapped for EmbedsScalar {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::of::<String>("street").embedded())
    }
}

impl Mapped for BagKey {
    fn shape() -> TypeShape {
        TypeShape::embeddable::<Self>()
            .field(MemberDecl::of::<String>("region"))
            .field(MemberDecl::of::<Vec<String>>("items").collection())
    }
}

impl Mapped for BagKeyHolder {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>().field(MemberDecl::mapped::<BagKey>("key").embedded_id())
    }
}

impl Mapped for ZoneKey {
    fn shape() -> TypeShape {
        TypeShape::embeddable::<Self>().field(MemberDecl::of::<u64>("zone"))
    }
}

impl Mapped for ShardKey {
    fn shape() -> TypeShape {
        TypeShape::embeddable::<Self>()
            .field(MemberDecl::of::<String>("cluster"))
            .field(MemberDecl::mapped::<ZoneKey>("zone").embedded())
    }
}

impl Mapped for Shard {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::mapped::<ShardKey>("key").embedded_id())
            .field(MemberDecl::of::<u64>("load"))
    }
}

impl Mapped for Holder {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .field(MemberDecl::of::<u64>("id").id())
            .field(MemberDecl::mapped::<NoId>("ghost").reference())
    }
}

impl Mapped for LoopA {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .extends::<LoopB>()
            .field(MemberDecl::of::<u64>("id").id())
    }
}

impl Mapped for LoopB {
    fn shape() -> TypeShape {
        TypeShape::ancestor::<Self>().extends::<LoopA>()
    }
}

impl Mapped for ExtendsEmbeddable {
    fn shape() -> TypeShape {
        TypeShape::entity::<Self>()
            .extends::<Address>()
            .field(MemberDecl::of::<u64>("id").id())
    }
}

fn names(model: &EntityModel) -> Vec<&str> {
    model.properties().iter().map(PropertyDescriptor::name).collect()
}

fn person_model(registry: &MetadataRegistry) -> Arc<EntityModel> {
    registry
        .model_for::<Person>()
        .expect("person model should build")
}

///
/// BUILDER
///

#[test]
fn person_model_classifies_every_kind() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);

    assert_eq!(
        names(&model),
        vec!["id", "name", "age", "address", "dept", "tags", "version", "display_name"]
    );
    assert_eq!(model.access_strategy(), Some(AccessStrategy::Field));

    let kind = |name: &str| model.property(name).expect("property should exist").kind();
    assert_eq!(kind("id"), PropertyKind::Simple);
    assert_eq!(kind("address"), PropertyKind::Embedded);
    assert_eq!(kind("dept"), PropertyKind::Reference);
    assert_eq!(kind("tags"), PropertyKind::Collection);
    assert_eq!(kind("display_name"), PropertyKind::Transient);

    assert_eq!(model.identifier().map(PropertyDescriptor::name), Some("id"));
    assert_eq!(model.version().map(PropertyDescriptor::name), Some("version"));
    assert!(!model.has_embedded_identifier());
}

#[test]
fn transient_getter_is_read_only() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);
    let display = model
        .property("display_name")
        .expect("transient should be registered");

    assert!(!display.is_writable());
    assert_eq!(
        display.accessor(),
        &Accessor::Method {
            getter: "display_name".to_string(),
            setter: None,
        }
    );
    assert_eq!(model.transient_properties().count(), 1);
    assert_eq!(model.persistent_properties().count(), 7);
}

#[test]
fn nested_models_are_cached_and_shared() {
    let registry = MetadataRegistry::new();
    let first = person_model(&registry);
    let second = person_model(&registry);

    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(registry.len(), 3);

    let address = registry
        .model_for::<Address>()
        .expect("address should be cached");
    let nested = first
        .property("address")
        .and_then(PropertyDescriptor::nested_model)
        .expect("embedded property should carry a nested model");
    assert!(Arc::ptr_eq(&address, &nested));
}

#[test]
fn self_reference_resolves_to_the_same_instance() {
    let registry = MetadataRegistry::new();
    let node = registry.model_for::<Node>().expect("node should build");
    let parent = node
        .property("parent")
        .and_then(PropertyDescriptor::nested_model)
        .expect("parent should carry a nested model");

    assert!(Arc::ptr_eq(&node, &parent));
    assert!(parent.is_complete());
    assert_eq!(registry.len(), 1);
}

#[test]
fn composite_identifier_expands_to_components() {
    let registry = MetadataRegistry::new();
    let model = registry.model_for::<Line>().expect("line should build");

    assert!(model.has_embedded_identifier());
    assert_eq!(model.identifier_paths(), vec!["key.region", "key.serial"]);
}

#[test]
fn accessor_strategy_follows_identifier_marker() {
    let registry = MetadataRegistry::new();
    let model = registry.model_for::<Account>().expect("account should build");

    assert_eq!(model.access_strategy(), Some(AccessStrategy::Accessor));
    assert_eq!(names(&model), vec!["id", "balance", "label", "summary"]);

    let id = model.property("id").expect("id should exist");
    assert_eq!(
        id.accessor(),
        &Accessor::Method {
            getter: "id".to_string(),
            setter: Some("set_id".to_string()),
        }
    );

    let label = model.property("label").expect("label should exist");
    assert_eq!(label.kind(), PropertyKind::Simple);
    assert!(!label.is_writable());

    let summary = model.property("summary").expect("summary should exist");
    assert_eq!(summary.kind(), PropertyKind::Transient);
}

#[test]
fn ancestor_members_come_first_and_can_be_redeclared() {
    let registry = MetadataRegistry::new();
    let model = registry.model_for::<Invoice>().expect("invoice should build");

    assert_eq!(names(&model), vec!["id", "created", "note", "total"]);
    assert_eq!(model.identifier().map(PropertyDescriptor::name), Some("id"));

    let note = model.property("note").expect("note should exist");
    assert_eq!(note.value_type(), TypeRef::of::<Option<String>>());
}

#[test]
fn flattened_and_sortable_paths() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);

    assert_eq!(
        model.flattened_paths(),
        &[
            "id",
            "name",
            "age",
            "address",
            "address.street",
            "address.city",
            "dept",
            "tags",
            "version",
        ]
    );
    assert_eq!(
        model.sortable_paths(),
        vec![
            "id",
            "name",
            "age",
            "address.street",
            "address.city",
            "dept.id",
            "dept.name",
            "version",
        ]
    );
}

#[test]
fn cyclic_sortable_paths_terminate() {
    let registry = MetadataRegistry::new();
    let model = registry.model_for::<Node>().expect("node should build");

    assert_eq!(model.sortable_paths(), vec!["id", "label"]);
}

#[test]
fn concurrent_first_requests_share_one_model() {
    let registry = MetadataRegistry::new();

    let models: Vec<Arc<EntityModel>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| registry.model_for::<Person>()))
            .collect();

        handles
            .into_iter()
            .map(|handle| {
                handle
                    .join()
                    .expect("builder thread should not panic")
                    .expect("person should build")
            })
            .collect()
    });

    for model in &models[1..] {
        assert!(Arc::ptr_eq(&models[0], model));
    }
    assert_eq!(registry.len(), 3);
}

///
/// BUILD ERRORS
///

fn build_error<T: Mapped>() -> BuildError {
    let registry = MetadataRegistry::new();
    let err = registry
        .model_for::<T>()
        .expect_err("invalid shape should fail to build");
    assert!(registry.is_empty(), "failed builds must not publish models");

    err
}

#[test]
fn missing_identifier_is_rejected() {
    assert_eq!(
        build_error::<NoId>(),
        BuildError::MissingIdentifier { ty: "NoId" }
    );
}

#[test]
fn identifier_on_both_surfaces_is_ambiguous() {
    assert_eq!(
        build_error::<BothAccess>(),
        BuildError::AmbiguousAccess { ty: "BothAccess" }
    );
}

#[test]
fn multiple_relationship_markers_conflict() {
    assert_eq!(
        build_error::<TwoRelations>(),
        BuildError::ConflictingMarkers {
            ty: "TwoRelations",
            member: "home".to_string(),
        }
    );
}

#[test]
fn field_and_accessor_must_agree_on_kind() {
    assert_eq!(
        build_error::<KindClash>(),
        BuildError::ConflictingKind {
            ty: "KindClash",
            member: "address".to_string(),
            field_kind: PropertyKind::Embedded,
            accessor_kind: PropertyKind::Reference,
        }
    );
}

#[test]
fn identity_markers_are_unique() {
    assert_eq!(
        build_error::<TwoIds>(),
        BuildError::MultipleIdentifiers {
            ty: "TwoIds",
            count: 2
        }
    );
    assert_eq!(
        build_error::<TwoVersions>(),
        BuildError::MultipleVersions {
            ty: "TwoVersions",
            count: 2
        }
    );
}

#[test]
fn nested_targets_are_checked() {
    assert_eq!(
        build_error::<EmbedsEntity>(),
        BuildError::InvalidNestedTarget {
            ty: "EmbedsEntity",
            member: "dept".to_string(),
            expected: TypeRole::Embeddable,
            found: TypeRole::Entity,
        }
    );
    assert!(matches!(
        build_error::<EmbedsScalar>(),
        BuildError::UnmappedTarget { ty: "EmbedsScalar", .. }
    ));
}

#[test]
fn composite_key_components_must_be_leaves() {
    assert_eq!(
        build_error::<BagKeyHolder>(),
        BuildError::PartialCompositeKey {
            ty: "BagKeyHolder",
            member: "key".to_string(),
            found: 1,
            total: 2,
        }
    );
}

#[test]
fn nested_failure_discards_the_whole_graph() {
    assert_eq!(
        build_error::<Holder>(),
        BuildError::MissingIdentifier { ty: "NoId" }
    );
}

#[test]
fn ancestry_is_validated() {
    assert_eq!(
        build_error::<LoopA>(),
        BuildError::AncestorCycle { ty: "LoopA" }
    );
    assert_eq!(
        build_error::<ExtendsEmbeddable>(),
        BuildError::InvalidAncestor {
            ty: "ExtendsEmbeddable",
            ancestor: "Address",
        }
    );
}

#[test]
fn unmapped_type_has_no_model() {
    let registry = MetadataRegistry::new();
    let err = registry
        .build_metadata(TypeRef::of::<String>())
        .expect_err("scalar type should not build");

    assert!(matches!(err, BuildError::Unmapped { .. }));
}

#[test]
fn failed_build_can_be_retried_without_poisoning() {
    let registry = MetadataRegistry::new();
    registry
        .model_for::<Holder>()
        .expect_err("holder should fail");

    let person = person_model(&registry);
    assert!(person.is_complete());
    assert_eq!(registry.len(), 3);
}

///
/// PATHS
///

#[test]
fn resolve_walks_nested_models() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);

    let street = resolve(&model, "address.street").expect("street should resolve");
    assert_eq!(street.kind(), PropertyKind::Simple);
    assert_eq!(street.value_type(), TypeRef::of::<String>());

    let dept = resolve(&model, "dept.name").expect("dept name should resolve");
    assert_eq!(dept.name(), "name");
}

#[test]
fn resolve_reports_bad_paths() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);

    assert!(matches!(resolve(&model, ""), Err(ResolveError::EmptyPath)));
    assert!(matches!(
        resolve(&model, "nope"),
        Err(ResolveError::UnknownProperty { segment, .. }) if segment == "nope"
    ));
    assert!(matches!(
        resolve(&model, "age.value"),
        Err(ResolveError::NotNested { kind: PropertyKind::Simple, .. })
    ));
    assert!(matches!(
        resolve(&model, "tags.first"),
        Err(ResolveError::NotNested { kind: PropertyKind::Collection, .. })
    ));
    assert!(matches!(
        resolve(&model, "address.zip"),
        Err(ResolveError::UnknownProperty { ty: "Address", .. })
    ));
}

#[test]
fn get_value_distinguishes_absent_from_null() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);

    let bare = Person::new(1, None, 30);
    assert_eq!(
        get_value(&model, &bare, "address.street").expect("path should resolve"),
        None
    );
    assert_eq!(
        get_value(&model, &bare, "name").expect("path should resolve"),
        Some(Value::Null)
    );

    let housed = Person::new(2, Some("Ada"), 36).with_address(Address::new("Main", None));
    assert_eq!(
        get_value(&model, &housed, "address.street").expect("path should resolve"),
        Some(Value::text("Main"))
    );
    assert_eq!(
        get_value(&model, &housed, "address.city").expect("path should resolve"),
        Some(Value::Null)
    );
}

#[test]
fn terminal_nested_reads() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);
    let person = Person::new(3, Some("Lin"), 41)
        .with_address(Address::new("High", Some("Leeds")))
        .with_dept(9, "Ops");

    assert_eq!(
        get_value(&model, &person, "address").expect("path should resolve"),
        Some(Value::List(vec![Value::text("High"), Value::text("Leeds")]))
    );
    assert_eq!(
        get_value(&model, &person, "dept").expect("path should resolve"),
        Some(Value::Uint(9))
    );
    assert_eq!(
        get_value(&model, &person, "display_name").expect("path should resolve"),
        Some(Value::text("#3 Lin"))
    );
}

#[test]
fn composite_identifier_reads_as_list() {
    let registry = MetadataRegistry::new();
    let model = registry.model_for::<Line>().expect("line should build");
    let line = Line::new("eu", 7, 100);

    assert_eq!(
        identifier_value(&model, &line).expect("identifier should read"),
        Some(Value::List(vec![Value::text("eu"), Value::Uint(7)]))
    );
}

#[test]
fn set_value_never_allocates_intermediates() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);
    let mut person = Person::new(4, Some("Kit"), 22);

    let written = set_value(&model, &mut person, "address.street", Value::text("Side"))
        .expect("path should resolve");
    assert!(!written);
    assert_eq!(person.address, None);

    person.address = Some(Address::new("Old", None));
    let written = set_value(&model, &mut person, "address.street", Value::text("New"))
        .expect("path should resolve");
    assert!(written);
    assert_eq!(
        person.address.as_ref().map(|a| a.street.as_str()),
        Some("New")
    );

    set_value(&model, &mut person, "address", Value::Null).expect("embedded can be cleared");
    assert_eq!(person.address, None);
}

#[test]
fn set_value_enforces_writability() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);
    let mut person = Person::new(5, None, 50);

    let err = set_value(&model, &mut person, "display_name", Value::text("x"))
        .expect_err("transient should be read-only");
    assert!(matches!(err, ResolveError::Access(AccessError::ReadOnly { .. })));

    let err = set_value(&model, &mut person, "age", Value::text("old"))
        .expect_err("type mismatch should surface");
    assert!(matches!(
        err,
        ResolveError::Access(AccessError::TypeMismatch { found: "text", .. })
    ));

    let accounts = registry.model_for::<Account>().expect("account should build");
    let mut account = Account::new(1, 10, "main");
    let err = set_value(&accounts, &mut account, "label", Value::text("alt"))
        .expect_err("getter-only accessor should be read-only");
    assert!(matches!(err, ResolveError::Access(AccessError::ReadOnly { .. })));

    set_value(&accounts, &mut account, "balance", Value::Int(25)).expect("setter should write");
    assert_eq!(
        get_value(&accounts, &account, "summary").expect("summary should read"),
        Some(Value::text("main=25"))
    );
}

#[test]
fn version_value_reads_the_tag() {
    let registry = MetadataRegistry::new();
    let model = person_model(&registry);
    let mut person = Person::new(6, None, 1);
    person.version = 3;

    assert_eq!(
        version_value(&model, &person).expect("version should read"),
        Some(Value::Uint(3))
    );

    let line_model = registry.model_for::<Line>().expect("line should build");
    assert_eq!(
        version_value(&line_model, &Line::new("us", 1, 1)).expect("no version is fine"),
        None
    );
}

#[test]
fn identifier_paths_ignore_the_flatten_bound() {
    let registry = MetadataRegistry::with_config(RegistryConfig {
        max_flatten_depth: 0,
    });
    let shard = registry.model_for::<Shard>().expect("shard should build");

    assert_eq!(shard.identifier_paths(), vec!["key.cluster", "key.zone.zone"]);
    assert_eq!(shard.flattened_paths(), ["key", "load"]);
}

#[test]
fn root_model_outlives_its_registry() {
    let model = {
        let registry = MetadataRegistry::new();
        person_model(&registry)
    };

    let city =
        resolve(&model, "address.city").expect("embedded path should still resolve");
    assert_eq!(city.kind(), PropertyKind::Simple);
    let dept = resolve(&model, "dept.name").expect("reference path should resolve");
    assert_eq!(dept.name(), "name");

    let mut person =
        Person::new(1, Some("Ada"), 36).with_address(Address::new("2 Quay", None));
    set_value(&model, &mut person, "address.city", Value::text("Lima"))
        .expect("nested write should succeed");
    assert_eq!(
        get_value(&model, &person, "address.city").expect("nested read should succeed"),
        Some(Value::text("Lima"))
    );
}

#[test]
fn cycle_links_are_weak_and_tree_links_own() {
    let node = MetadataRegistry::new()
        .model_for::<Node>()
        .expect("node should build");
    let parent = node.property("parent").expect("parent should be mapped");

    assert!(parent.nested().is_some_and(NestedModel::is_cycle));
    let label =
        resolve(&node, "parent.parent.label").expect("self reference should resolve");
    assert_eq!(label.name(), "label");

    let registry = MetadataRegistry::new();
    let person = person_model(&registry);
    let address = person.property("address").expect("address should be mapped");
    assert!(address.nested().is_some_and(|nested| !nested.is_cycle()));
}
