//! ## Crate layout
//! - `core`: values, metadata models, filters, the keyset navigator and
//!   observability.
//! - `macros`: `#[derive(Mapped)]` for plain structs.
//!
//! The runtime modules are re-exported at the root so generated code and
//! callers share one set of paths (`seekview::model`, `seekview::db`, ...).

pub use seekview_core as core;
pub use seekview_derive as macros;

pub use seekview_core::{config, db, error, model, obs, traits, value};

// export so generated code resolves inside this crate too
extern crate self as seekview;

//
// Consts
//

/// Workspace version re-export for downstream tooling/tests.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use seekview_core::error::Error;
pub use seekview_derive::Mapped;

///
/// Prelude
/// using _ brings traits into scope and avoids name conflicts
///

pub mod prelude {
    pub use crate::{
        Mapped,
        core::{
            config::{NavigatorConfig, NullOrdering, SeekviewConfig},
            db::{
                Identifier, KeysetNavigator, MemoryExecutor, QueryExecutor as _, SortKey,
                SortSpec, predicate::Predicate,
            },
            model::{EntityModel, MetadataRegistry},
            traits::{FieldValue as _, Instance, Mapped, ObjectValue as _},
            value::Value,
        },
    };
}
