//! Filtered, sorted navigation over an externally stored collection.
//!
//! - `predicate` holds the filter tree and its interpretations
//! - `order` and `identifier` define the total order and row identity
//! - `executor` is the backing-store boundary
//! - `navigate` answers first/last/next/previous/at/count over both

mod cursor;
mod executor;
mod identifier;
mod navigate;
mod order;

pub mod predicate;


// re-exports
pub use executor::{MemoryExecutor, QueryExecutor, RenderedQuery, Row, StoreError, StoreQuery};
pub use identifier::Identifier;
pub use navigate::{KeysetNavigator, NavigateError};
pub use order::{Direction, SortKey, SortSpec};
