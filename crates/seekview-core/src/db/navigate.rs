//! Keyset navigation over a filtered, sorted entity collection.
//!
//! Every call costs one executor round trip, plus one more when the anchor
//! row has to be located by identifier first. `at` and `window` are the
//! only offset-based operations.

use crate::{
    config::{NavigatorConfig, NullOrdering},
    db::{
        cursor::{Travel, seek_predicate},
        executor::{QueryExecutor, Row, StoreError, StoreQuery},
        identifier::Identifier,
        order::SortSpec,
        predicate::{Predicate, PredicateError, conjoin},
    },
    model::{EntityModel, PropertyKind, ResolveError, resolve},
    obs::sink::{MetricsEvent, NavigateKind, StoreCall, record},
    value::Value,
};
use std::sync::Arc;
use thiserror::Error as ThisError;
use tracing::{trace, warn};

///
/// NavigateError
///
/// Navigation misses are never errors; they are `Ok(None)`.
///

#[derive(Debug, ThisError)]
pub enum NavigateError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Predicate(#[from] PredicateError),

    #[error("sort order has {count} keys, at most {max} are supported")]
    TooManySortKeys { count: usize, max: usize },

    #[error("entity '{ty}' has no identifier to break ties with")]
    NoIdentifier { ty: &'static str },

    #[error("sort key '{path}' is {kind}; only simple properties can be sorted on")]
    UnsortableKey { path: String, kind: PropertyKind },

    #[error("executor returned a row of {found} values, expected {expected}")]
    MalformedRow { expected: usize, found: usize },

    #[error("anchor has {found} sort values, expected {expected}")]
    AnchorArity { expected: usize, found: usize },

    #[error("identifier has {found} components, expected {expected}")]
    IdentifierArity { expected: usize, found: usize },
}

///
/// KeysetNavigator
///
/// Navigator bound to one `(filter, order)` pair. The order is extended
/// with the identifier components once at construction, so every
/// operation sees the same total order.
///

pub struct KeysetNavigator<X: QueryExecutor> {
    model: Arc<EntityModel>,
    executor: X,
    filter: Option<Predicate>,
    order: SortSpec,
    declared: usize,
    id_paths: Vec<String>,
    id_columns: Vec<usize>,
    nulls: NullOrdering,
}

impl<X: QueryExecutor> KeysetNavigator<X> {
    pub fn new(
        model: Arc<EntityModel>,
        executor: X,
        filter: Option<Predicate>,
        order: &SortSpec,
        config: &NavigatorConfig,
    ) -> Result<Self, NavigateError> {
        let id_paths = model.identifier_paths();
        if id_paths.is_empty() {
            return Err(NavigateError::NoIdentifier {
                ty: model.type_name(),
            });
        }

        if let Some(filter) = &filter {
            filter.validate(&model)?;
        }

        let declared = order.deduped();
        for key in declared.iter() {
            let prop = resolve(&model, &key.path)?;
            if prop.kind() != PropertyKind::Simple {
                return Err(NavigateError::UnsortableKey {
                    path: key.path.clone(),
                    kind: prop.kind(),
                });
            }
        }

        let extended = declared.with_tiebreak(&id_paths);
        if extended.len() > config.max_sort_keys {
            return Err(NavigateError::TooManySortKeys {
                count: extended.len(),
                max: config.max_sort_keys,
            });
        }

        let id_columns = id_paths
            .iter()
            .filter_map(|path| extended.iter().position(|key| &key.path == path))
            .collect();

        Ok(Self {
            model,
            executor,
            filter,
            declared: declared.len(),
            order: extended,
            id_paths,
            id_columns,
            nulls: config.nulls,
        })
    }

    #[must_use]
    pub const fn model(&self) -> &Arc<EntityModel> {
        &self.model
    }

    #[must_use]
    pub const fn filter(&self) -> Option<&Predicate> {
        self.filter.as_ref()
    }

    /// The total order in effect: declared keys plus the identifier tiebreak.
    #[must_use]
    pub const fn order(&self) -> &SortSpec {
        &self.order
    }

    #[must_use]
    pub fn identifier_paths(&self) -> &[String] {
        &self.id_paths
    }

    pub fn first(&self) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::First, || {
            let query = self.query(self.filter.clone(), &self.order);
            self.fetch_identifier(&query)
        })
    }

    pub fn last(&self) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::Last, || {
            let query = self.query(self.filter.clone(), &self.order.reversed());
            self.fetch_identifier(&query)
        })
    }

    /// Successor of `id`; `None` at the end or when `id` no longer exists.
    pub fn next(&self, id: &Identifier) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::Next, || {
            let Some(anchor) = self.locate(NavigateKind::Next, id)? else {
                return Ok(None);
            };
            self.seek(&anchor, Travel::Forward)
        })
    }

    /// Predecessor of `id`; `None` at the start or when `id` no longer exists.
    pub fn previous(&self, id: &Identifier) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::Previous, || {
            let Some(anchor) = self.locate(NavigateKind::Previous, id)? else {
                return Ok(None);
            };
            self.seek(&anchor, Travel::Backward)
        })
    }

    /// Successor of a row whose declared sort-key values the caller already
    /// holds, skipping the anchor lookup.
    pub fn next_from(
        &self,
        id: &Identifier,
        values: &[Value],
    ) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::Next, || {
            let anchor = self.anchor_from(id, values)?;
            self.seek(&anchor, Travel::Forward)
        })
    }

    pub fn previous_from(
        &self,
        id: &Identifier,
        values: &[Value],
    ) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::Previous, || {
            let anchor = self.anchor_from(id, values)?;
            self.seek(&anchor, Travel::Backward)
        })
    }

    /// Row at zero-based `index`, or `None` past the end.
    pub fn at(&self, index: u64) -> Result<Option<Identifier>, NavigateError> {
        self.navigate(NavigateKind::At, || {
            let query = self.query(self.filter.clone(), &self.order).skip(index);
            self.fetch_identifier(&query)
        })
    }

    pub fn count(&self) -> Result<u64, NavigateError> {
        record(MetricsEvent::Navigate {
            kind: NavigateKind::Count,
            entity: self.model.type_name(),
        });

        self.count_where(self.filter.clone())
    }

    /// True when `id` exists and satisfies the filter.
    pub fn contains(&self, id: &Identifier) -> Result<bool, NavigateError> {
        record(MetricsEvent::Navigate {
            kind: NavigateKind::Contains,
            entity: self.model.type_name(),
        });

        self.contains_inner(id)
    }

    /// Position of `id` in the filtered order, or `None` if it is absent or
    /// filtered out.
    pub fn index_of(&self, id: &Identifier) -> Result<Option<u64>, NavigateError> {
        self.navigate(NavigateKind::IndexOf, || {
            if !self.contains_inner(id)? {
                return Ok(None);
            }
            let Some(anchor) = self.locate(NavigateKind::IndexOf, id)? else {
                return Ok(None);
            };

            let before = seek_predicate(&self.order, &anchor, Travel::Backward, self.nulls);
            let count = self.count_where(Some(conjoin(self.filter.as_ref(), before)))?;

            Ok(Some(count))
        })
    }

    /// Up to `len` identifiers starting at `start`: one offset fetch, then a
    /// seek chain from each returned row.
    pub fn window(&self, start: u64, len: usize) -> Result<Vec<Identifier>, NavigateError> {
        record(MetricsEvent::Navigate {
            kind: NavigateKind::Window,
            entity: self.model.type_name(),
        });

        let mut out = Vec::with_capacity(len);
        if len == 0 {
            return Ok(out);
        }

        let query = self.query(self.filter.clone(), &self.order).skip(start);
        let mut row = self.fetch_row(&query)?;

        while let Some(anchor) = row {
            out.push(self.identifier_of(&anchor));
            if out.len() == len {
                break;
            }

            let predicate = seek_predicate(&self.order, &anchor, Travel::Forward, self.nulls);
            let query = self.query(Some(conjoin(self.filter.as_ref(), predicate)), &self.order);
            row = self.fetch_row(&query)?;
        }

        if out.is_empty() {
            record(MetricsEvent::NavigateMiss {
                kind: NavigateKind::Window,
                entity: self.model.type_name(),
            });
        }

        Ok(out)
    }

    // Wraps one identifier-returning operation with its metrics.
    fn navigate<T>(
        &self,
        kind: NavigateKind,
        op: impl FnOnce() -> Result<Option<T>, NavigateError>,
    ) -> Result<Option<T>, NavigateError> {
        let entity = self.model.type_name();
        record(MetricsEvent::Navigate { kind, entity });

        let result = op()?;
        if result.is_none() {
            record(MetricsEvent::NavigateMiss { kind, entity });
        }

        Ok(result)
    }

    fn query(&self, predicate: Option<Predicate>, order: &SortSpec) -> StoreQuery {
        StoreQuery::new(predicate)
            .order(order.clone(), self.nulls)
            .limit(1)
            .project(self.order.paths())
    }

    fn seek(&self, anchor: &[Value], travel: Travel) -> Result<Option<Identifier>, NavigateError> {
        let predicate = seek_predicate(&self.order, anchor, travel, self.nulls);
        let order = match travel {
            Travel::Forward => self.order.clone(),
            Travel::Backward => self.order.reversed(),
        };
        let query = self.query(Some(conjoin(self.filter.as_ref(), predicate)), &order);

        self.fetch_identifier(&query)
    }

    // Current sort-key values of `id`, located without the filter so a row
    // that left the filter still has neighbours.
    fn locate(
        &self,
        kind: NavigateKind,
        id: &Identifier,
    ) -> Result<Option<Row>, NavigateError> {
        self.check_identifier(id)?;

        let query = StoreQuery::new(Some(id.predicate(&self.id_paths)))
            .limit(1)
            .project(self.order.paths());
        let anchor = self.fetch_row(&query)?;

        if anchor.is_none() {
            warn!(
                entity = self.model.type_name(),
                ?kind,
                id = %id,
                "seek anchor not found"
            );
        }

        Ok(anchor)
    }

    fn anchor_from(&self, id: &Identifier, values: &[Value]) -> Result<Row, NavigateError> {
        self.check_identifier(id)?;
        if values.len() != self.declared {
            return Err(NavigateError::AnchorArity {
                expected: self.declared,
                found: values.len(),
            });
        }

        let mut anchor = values.to_vec();
        for key in &self.order[self.declared..] {
            let component = self
                .id_paths
                .iter()
                .position(|path| path == &key.path)
                .and_then(|index| id.get(index).cloned())
                .unwrap_or(Value::Null);
            anchor.push(component);
        }

        Ok(anchor)
    }

    fn check_identifier(&self, id: &Identifier) -> Result<(), NavigateError> {
        if id.len() == self.id_paths.len() {
            Ok(())
        } else {
            Err(NavigateError::IdentifierArity {
                expected: self.id_paths.len(),
                found: id.len(),
            })
        }
    }

    fn contains_inner(&self, id: &Identifier) -> Result<bool, NavigateError> {
        self.check_identifier(id)?;

        let predicate = conjoin(self.filter.as_ref(), id.predicate(&self.id_paths));
        let query = StoreQuery::new(Some(predicate)).limit(1);
        trace!(entity = self.model.type_name(), ?query, "exists query");

        let found = self.executor.exists(&query)?;
        self.record_store(StoreCall::Exists, u64::from(found));

        Ok(found)
    }

    fn count_where(&self, predicate: Option<Predicate>) -> Result<u64, NavigateError> {
        let query = StoreQuery::new(predicate);
        trace!(entity = self.model.type_name(), ?query, "count query");

        let count = self.executor.count(&query)?;
        self.record_store(StoreCall::Count, count);

        Ok(count)
    }

    fn fetch_identifier(&self, query: &StoreQuery) -> Result<Option<Identifier>, NavigateError> {
        Ok(self.fetch_row(query)?.map(|row| self.identifier_of(&row)))
    }

    fn fetch_row(&self, query: &StoreQuery) -> Result<Option<Row>, NavigateError> {
        trace!(entity = self.model.type_name(), ?query, "fetch query");

        let row = self.executor.fetch_one(query)?;
        self.record_store(StoreCall::FetchOne, u64::from(row.is_some()));

        match row {
            Some(row) if row.len() != query.projection.len() => Err(NavigateError::MalformedRow {
                expected: query.projection.len(),
                found: row.len(),
            }),
            row => Ok(row),
        }
    }

    fn identifier_of(&self, row: &[Value]) -> Identifier {
        Identifier::new(
            self.id_columns
                .iter()
                .map(|&column| row.get(column).cloned().unwrap_or(Value::Null))
                .collect(),
        )
    }

    fn record_store(&self, call: StoreCall, rows: u64) {
        record(MetricsEvent::Store {
            call,
            entity: self.model.type_name(),
            rows,
        });
    }
}
