//! Backing query executor contract.
//!
//! The navigator hands executors a structured `StoreQuery`; backends that
//! speak a query language render it through their own path translator.

mod memory;

#[cfg(test)]
mod tests;

use crate::{
    config::NullOrdering,
    db::{
        order::SortSpec,
        predicate::{PathTranslator, Predicate, QueryFragment},
    },
    value::Value,
};
use std::{error::Error as StdError, fmt::Write};
use thiserror::Error as ThisError;

// re-exports
pub use memory::MemoryExecutor;

/// Projected values of one row, in projection order.
pub type Row = Vec<Value>;

///
/// StoreError
///
/// Failure of one executor round trip. The navigator never retries and
/// returns it to the caller unchanged.
///

#[derive(Debug, ThisError)]
#[error("store query failed: {source}")]
pub struct StoreError {
    #[source]
    source: Box<dyn StdError + Send + Sync + 'static>,
}

impl StoreError {
    pub fn new(source: impl Into<Box<dyn StdError + Send + Sync + 'static>>) -> Self {
        Self {
            source: source.into(),
        }
    }

    #[must_use]
    pub fn into_source(self) -> Box<dyn StdError + Send + Sync + 'static> {
        self.source
    }

    /// Borrow the backend error if it is of type `E`.
    #[must_use]
    pub fn downcast_ref<E: StdError + 'static>(&self) -> Option<&E> {
        self.source.downcast_ref::<E>()
    }
}

///
/// StoreQuery
///
/// One bounded request: optional predicate, total sort order, skip and limit,
/// and the paths to project from the matching row.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct StoreQuery {
    pub predicate: Option<Predicate>,
    pub order: SortSpec,
    pub nulls: NullOrdering,
    pub skip: u64,
    pub limit: Option<u64>,
    pub projection: Vec<String>,
}

impl StoreQuery {
    #[must_use]
    pub fn new(predicate: Option<Predicate>) -> Self {
        Self {
            predicate,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn order(mut self, order: SortSpec, nulls: NullOrdering) -> Self {
        self.order = order;
        self.nulls = nulls;
        self
    }

    #[must_use]
    pub const fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    #[must_use]
    pub const fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn project(mut self, paths: Vec<String>) -> Self {
        self.projection = paths;
        self
    }

    /// Render every part through a backend path translator.
    #[must_use]
    pub fn render(&self, translator: &dyn PathTranslator) -> RenderedQuery {
        let filter = self
            .predicate
            .as_ref()
            .map(|predicate| predicate.to_query_language(translator));

        let nulls = match self.nulls {
            NullOrdering::First => ("NULLS FIRST", "NULLS LAST"),
            NullOrdering::Last => ("NULLS LAST", "NULLS FIRST"),
        };
        let order_by = self
            .order
            .iter()
            .map(|key| {
                // null placement is defined for ascending keys and flips with them
                let placement = if key.direction.is_asc() { nulls.0 } else { nulls.1 };
                format!(
                    "{} {} {placement}",
                    translator.locate(&key.path),
                    key.direction.keyword()
                )
            })
            .collect();

        RenderedQuery {
            select: self
                .projection
                .iter()
                .map(|path| translator.locate(path))
                .collect(),
            filter,
            order_by,
            skip: self.skip,
            limit: self.limit,
        }
    }
}

///
/// RenderedQuery
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenderedQuery {
    pub select: Vec<String>,
    pub filter: Option<QueryFragment>,
    pub order_by: Vec<String>,
    pub skip: u64,
    pub limit: Option<u64>,
}

impl RenderedQuery {
    /// Assemble a SQL-like statement over `source`; parameters stay separate.
    #[must_use]
    pub fn statement(&self, source: &str) -> String {
        let mut out = String::from("SELECT ");
        if self.select.is_empty() {
            out.push_str("COUNT(*)");
        } else {
            out.push_str(&self.select.join(", "));
        }
        let _ = write!(out, " FROM {source}");

        if let Some(filter) = &self.filter {
            let _ = write!(out, " WHERE {}", filter.text);
        }
        if !self.order_by.is_empty() {
            let _ = write!(out, " ORDER BY {}", self.order_by.join(", "));
        }
        if let Some(limit) = self.limit {
            let _ = write!(out, " LIMIT {limit}");
        }
        if self.skip > 0 {
            let _ = write!(out, " OFFSET {}", self.skip);
        }

        out
    }

    /// Bound parameters in placeholder order.
    #[must_use]
    pub fn params(&self) -> &[Value] {
        self.filter
            .as_ref()
            .map_or(&[], |filter| filter.params.as_slice())
    }
}

///
/// QueryExecutor
///
/// Evaluates predicates with three-valued null semantics and honors skip and
/// limit exactly.
///

pub trait QueryExecutor {
    fn count(&self, query: &StoreQuery) -> Result<u64, StoreError>;

    fn exists(&self, query: &StoreQuery) -> Result<bool, StoreError>;

    /// First row after skipping, projected.
    fn fetch_one(&self, query: &StoreQuery) -> Result<Option<Row>, StoreError>;
}

impl<X: QueryExecutor + ?Sized> QueryExecutor for &X {
    fn count(&self, query: &StoreQuery) -> Result<u64, StoreError> {
        (**self).count(query)
    }

    fn exists(&self, query: &StoreQuery) -> Result<bool, StoreError> {
        (**self).exists(query)
    }

    fn fetch_one(&self, query: &StoreQuery) -> Result<Option<Row>, StoreError> {
        (**self).fetch_one(query)
    }
}
