use super::*;
use crate::{
    db::predicate::{DottedPath, JoinPath, PredicateError},
    model::MetadataRegistry,
    test_fixtures::{Line, Person},
};

fn people() -> (MemoryExecutor<Person>, MetadataRegistry) {
    let registry = MetadataRegistry::new();
    let model = registry
        .model_for::<Person>()
        .expect("should build person model");
    let rows = vec![
        Person::new(1, Some("Carol"), 40),
        Person::new(2, None, 31),
        Person::new(3, Some("Alice"), 25),
        Person::new(4, Some("Bob"), 31),
    ];

    (MemoryExecutor::new(model, rows), registry)
}

fn ids(executor: &MemoryExecutor<Person>, query: &StoreQuery) -> Vec<u64> {
    executor
        .select(query)
        .expect("should select")
        .into_iter()
        .map(|person| person.id)
        .collect()
}

#[test]
fn select_sorts_with_nulls_first_by_default() {
    let (executor, _registry) = people();
    let query =
        StoreQuery::new(None).order(SortSpec::new().asc("name").asc("id"), NullOrdering::First);

    assert_eq!(ids(&executor, &query), vec![2, 3, 4, 1]);
}

#[test]
fn select_places_nulls_last_when_configured() {
    let (executor, _registry) = people();
    let query = StoreQuery::new(None).order(SortSpec::new().asc("name"), NullOrdering::Last);

    assert_eq!(ids(&executor, &query), vec![3, 4, 1, 2]);
}

#[test]
fn descending_key_flips_null_placement() {
    let (executor, _registry) = people();
    let query = StoreQuery::new(None).order(SortSpec::new().desc("name"), NullOrdering::First);

    assert_eq!(ids(&executor, &query), vec![1, 4, 3, 2]);
}

#[test]
fn skip_and_limit_are_exact() {
    let (executor, _registry) = people();
    let query = StoreQuery::new(None)
        .order(SortSpec::new().asc("id"), NullOrdering::First)
        .skip(1)
        .limit(2);

    assert_eq!(ids(&executor, &query), vec![2, 3]);
    assert_eq!(executor.count(&query).expect("should count"), 2);
}

#[test]
fn filter_uses_three_valued_logic() {
    let (executor, _registry) = people();
    // null name is neither equal nor unequal to "Bob"
    let query = StoreQuery::new(Some(Predicate::ne("name", "Bob")));

    assert_eq!(executor.count(&query).expect("should count"), 2);
    assert!(executor.exists(&query).expect("should probe"));
    assert!(
        !executor
            .exists(&StoreQuery::new(Some(Predicate::gt("age", 90_i64))))
            .expect("should probe")
    );
}

#[test]
fn fetch_one_projects_requested_paths() {
    let (executor, _registry) = people();
    let query = StoreQuery::new(Some(Predicate::eq("age", 31_i64)))
        .order(SortSpec::new().desc("id"), NullOrdering::First)
        .project(vec!["id".to_string(), "name".to_string()]);

    let row = executor
        .fetch_one(&query)
        .expect("should fetch")
        .expect("should find a row");

    assert_eq!(row, vec![Value::Uint(4), Value::text("Bob")]);
}

#[test]
fn fetch_one_past_the_end_is_none() {
    let (executor, _registry) = people();
    let query = StoreQuery::new(None).skip(4).project(vec!["id".to_string()]);

    assert_eq!(executor.fetch_one(&query).expect("should fetch"), None);
}

#[test]
fn unknown_path_surfaces_as_store_error() {
    let (executor, _registry) = people();
    let query = StoreQuery::new(Some(Predicate::eq("nickname", "x")));

    let err = executor.count(&query).expect_err("unknown path should fail");
    assert!(err.to_string().contains("nickname"));
    assert!(err.downcast_ref::<PredicateError>().is_some());
}

#[test]
fn composite_key_components_sort_in_order() {
    let registry = MetadataRegistry::new();
    let model = registry.model_for::<Line>().expect("should build line model");
    let executor = MemoryExecutor::new(
        model,
        vec![
            Line::new("west", 1, 10),
            Line::new("east", 2, 20),
            Line::new("east", 1, 30),
        ],
    );
    let query = StoreQuery::new(None)
        .order(SortSpec::new().asc("key.region").asc("key.serial"), NullOrdering::First)
        .project(vec!["amount".to_string()]);

    let amounts: Vec<i64> = executor
        .select(&query)
        .expect("should select")
        .into_iter()
        .map(|line| line.amount)
        .collect();
    assert_eq!(amounts, vec![30, 20, 10]);
}

#[test]
fn render_locates_every_part() {
    let filter = Predicate::like("name", "S%") & Predicate::gt("dept.id", 2_u64);
    let query = StoreQuery::new(Some(filter))
        .order(SortSpec::new().desc("dept.name").asc("id"), NullOrdering::First)
        .skip(3)
        .limit(1)
        .project(vec!["id".to_string()]);

    let rendered = query.render(&JoinPath::new("e"));

    assert_eq!(rendered.select, vec!["e.id".to_string()]);
    assert_eq!(
        rendered.order_by,
        vec![
            "e_dept.name DESC NULLS LAST".to_string(),
            "e.id ASC NULLS FIRST".to_string(),
        ]
    );
    assert_eq!(rendered.params(), &[Value::text("S%"), Value::Uint(2)]);
    assert_eq!(
        rendered.statement("Person e"),
        "SELECT e.id FROM Person e WHERE (e.name LIKE ? AND e_dept.id > ?) \
         ORDER BY e_dept.name DESC NULLS LAST, e.id ASC NULLS FIRST LIMIT 1 OFFSET 3"
    );
}

#[test]
fn render_without_projection_counts() {
    let rendered = StoreQuery::new(None).render(&DottedPath::default());

    assert_eq!(rendered.statement("Person"), "SELECT COUNT(*) FROM Person");
    assert!(rendered.params().is_empty());
}
