//! Fixture entities and the deterministic standard dataset used by the
//! integration tests.

mod dataset;
mod entity;

pub use dataset::{STANDARD_SIZE, standard_lines, standard_nodes, standard_people};
pub use entity::{Address, Audited, Department, Invoice, LedgerKey, LedgerLine, Node, Person};
