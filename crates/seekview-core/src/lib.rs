//! Core runtime for seekview: values, metadata models, the filter tree and
//! the keyset navigator, plus the ergonomics exported via the `prelude`.
#![warn(unreachable_pub)]

extern crate self as seekview;

// public exports are one module level down
pub mod config;
pub mod db;
pub mod error;
pub mod model;
pub mod obs;
pub mod traits;
pub mod value;

// test
#[cfg(test)]
pub(crate) mod test_fixtures;

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, executors, or sinks are re-exported here.
///

pub mod prelude {
    pub use crate::{
        db::{Identifier, SortKey, SortSpec, predicate::Predicate},
        model::{EntityModel, MetadataRegistry},
        traits::{Instance, Mapped},
        value::Value,
    };
}
