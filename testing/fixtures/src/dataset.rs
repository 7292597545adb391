use crate::entity::{Address, Department, LedgerKey, LedgerLine, Node, Person};

/// Rows in the standard people dataset.
pub const STANDARD_SIZE: u64 = 40;

const FIRST_NAMES: [&str; 16] = [
    "Sam", "Alex", "Sasha", "Morgan", "Skyler", "Jordan", "Robin", "Sol", "Taylor", "Casey",
    "Sage", "Quinn", "Avery", "Shay", "Riley", "Drew",
];

const CITIES: [&str; 5] = ["Oslo", "Lima", "Kyoto", "Accra", "Quito"];

const DEPARTMENTS: [(u64, &str); 3] = [(1, "Engineering"), (2, "Operations"), (3, "Sales")];

// index -> stable pseudo-random spread without a generator
const fn spread(index: u64, modulus: u64) -> u64 {
    index.wrapping_mul(2_654_435_761) % modulus
}

/// Deterministic people: repeated names, some null names and cities, some
/// without a department.
#[must_use]
pub fn standard_people() -> Vec<Person> {
    (1..=STANDARD_SIZE)
        .map(|id| {
            let name_slot = usize::try_from(spread(id, 16)).unwrap_or(0);
            let mut person = Person::new(
                id,
                FIRST_NAMES[name_slot],
                18 + i64::try_from(spread(id, 47)).unwrap_or(0),
            );

            // every seventh row has no name
            if id % 7 == 0 {
                person.name = None;
            }

            let city = usize::try_from(spread(id, 6)).unwrap_or(0);
            person.address = Some(Address {
                street: format!("{} Harbour Road", id * 3),
                city: CITIES.get(city).map(ToString::to_string),
                postcode: None,
            });

            if id % 5 != 0 {
                let (dept_id, dept_name) = DEPARTMENTS[usize::try_from(id % 3).unwrap_or(0)];
                person.department = Some(Box::new(Department {
                    id: dept_id,
                    name: dept_name.to_string(),
                }));
            }

            person.tags = if id % 4 == 0 {
                Vec::new()
            } else {
                vec![format!("cohort-{}", id % 4)]
            };
            person.version = 1;

            person
        })
        .collect()
}

/// Ledger lines across two books with repeated amounts.
#[must_use]
pub fn standard_lines() -> Vec<LedgerLine> {
    ["north", "south"]
        .iter()
        .flat_map(|book| {
            (1..=6_u64).map(move |line| LedgerLine {
                key: LedgerKey {
                    book: (*book).to_string(),
                    line,
                },
                amount: i64::try_from(spread(line, 4)).unwrap_or(0) * 100,
                memo: (line % 2 == 0).then(|| format!("{book}-{line}")),
            })
        })
        .collect()
}

/// A three-level tree: root, two children, one grandchild.
#[must_use]
pub fn standard_nodes() -> Vec<Node> {
    let root = Node {
        id: 1,
        label: "root".to_string(),
        parent: None,
    };
    let left = Node {
        id: 2,
        label: "left".to_string(),
        parent: Some(Box::new(root.clone())),
    };
    let right = Node {
        id: 3,
        label: "right".to_string(),
        parent: Some(Box::new(root.clone())),
    };
    let leaf = Node {
        id: 4,
        label: "leaf".to_string(),
        parent: Some(Box::new(left.clone())),
    };

    vec![root, left, right, leaf]
}
