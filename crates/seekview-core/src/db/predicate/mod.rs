mod ast;
mod eval;
mod fingerprint;
mod render;
mod validate;


use crate::model::{PropertyKind, ResolveError};
use thiserror::Error as ThisError;

// re-exports
pub use ast::{CompareOp, ComparePredicate, Predicate, RangePredicate};
pub use eval::Truth;
pub use render::{ALWAYS_FALSE, ALWAYS_TRUE, DottedPath, JoinPath, PathTranslator, QueryFragment};

pub(crate) use ast::conjoin;

///
/// PredicateError
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum PredicateError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("property '{field}' is {kind} and cannot be filtered on")]
    NotComparable { field: String, kind: PropertyKind },

    #[error("emptiness test on '{field}' requires a collection, found {kind}")]
    NotCollection { field: String, kind: PropertyKind },

    #[error("operator {op} on '{field}' requires a list operand")]
    ExpectedList { field: String, op: CompareOp },

    #[error("operator {op} on '{field}' requires a text pattern")]
    ExpectedPattern { field: String, op: CompareOp },

    #[error("equality with null on '{field}' never matches; use an is-null test")]
    NullComparison { field: String },
}
