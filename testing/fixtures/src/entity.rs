use seekview::Mapped;

///
/// Address
///

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(embeddable)]
pub struct Address {
    pub street: String,
    pub city: Option<String>,
    pub postcode: Option<String>,
}

///
/// Department
///

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(entity)]
pub struct Department {
    #[mapped(id)]
    pub id: u64,
    pub name: String,
}

///
/// Person
///

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(entity)]
pub struct Person {
    #[mapped(id)]
    pub id: u64,
    pub name: Option<String>,
    pub age: i64,
    #[mapped(embedded)]
    pub address: Option<Address>,
    #[mapped(reference)]
    pub department: Option<Box<Department>>,
    #[mapped(collection)]
    pub tags: Vec<String>,
    #[mapped(version)]
    pub version: u64,
    #[mapped(skip)]
    pub scratch: Option<String>,
}

impl Person {
    #[must_use]
    pub fn new(id: u64, name: &str, age: i64) -> Self {
        Self {
            id,
            name: Some(name.to_string()),
            age,
            ..Self::default()
        }
    }
}

///
/// LedgerKey / LedgerLine
/// Composite identifier through an embedded key.
///

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(embeddable)]
pub struct LedgerKey {
    pub book: String,
    pub line: u64,
}

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(entity)]
pub struct LedgerLine {
    #[mapped(embedded_id)]
    pub key: LedgerKey,
    pub amount: i64,
    pub memo: Option<String>,
}

///
/// Node
/// Self-referencing entity.
///

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(entity)]
pub struct Node {
    #[mapped(id)]
    pub id: u64,
    pub label: String,
    #[mapped(reference)]
    pub parent: Option<Box<Node>>,
}

///
/// Audited / Invoice
/// Mapped ancestor composed into an entity.
///

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(ancestor)]
pub struct Audited {
    #[mapped(id)]
    pub id: u64,
    pub created: i64,
    pub note: String,
}

#[derive(Clone, Debug, Default, Eq, Mapped, PartialEq)]
#[mapped(entity)]
pub struct Invoice {
    #[mapped(parent)]
    pub audit: Audited,
    pub total: i64,
    #[mapped(rename = "note")]
    pub memo: Option<String>,
}
