use crate::{
    config::NullOrdering,
    db::{
        executor::{QueryExecutor, Row, StoreError, StoreQuery},
        order::SortKey,
    },
    model::{EntityModel, get_value},
    traits::Instance,
    value::{Value, canonical_cmp},
};
use std::{cmp::Ordering, sync::Arc};

///
/// MemoryExecutor
///
/// Reference executor over an owned row set. Every call filters and sorts
/// the full set, so it is an oracle for tests rather than a store.
///

pub struct MemoryExecutor<E: Instance> {
    model: Arc<EntityModel>,
    rows: Vec<E>,
}

impl<E: Instance> MemoryExecutor<E> {
    #[must_use]
    pub const fn new(model: Arc<EntityModel>, rows: Vec<E>) -> Self {
        Self { model, rows }
    }

    #[must_use]
    pub fn rows(&self) -> &[E] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut Vec<E> {
        &mut self.rows
    }

    /// Matching rows in query order, with skip and limit applied.
    pub fn select(&self, query: &StoreQuery) -> Result<Vec<&E>, StoreError> {
        let mut matching = Vec::new();
        for row in &self.rows {
            let keep = match &query.predicate {
                Some(predicate) => predicate
                    .matches(&self.model, row)
                    .map_err(StoreError::new)?,
                None => true,
            };
            if keep {
                matching.push(row);
            }
        }

        let mut keyed = matching
            .into_iter()
            .map(|row| Ok((self.sort_values(row, &query.order)?, row)))
            .collect::<Result<Vec<_>, StoreError>>()?;
        keyed.sort_by(|(left, _), (right, _)| compare_keys(left, right, &query.order, query.nulls));

        let skip = usize::try_from(query.skip).unwrap_or(usize::MAX);
        let limit = query
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));

        Ok(keyed
            .into_iter()
            .skip(skip)
            .take(limit)
            .map(|(_, row)| row)
            .collect())
    }

    fn read(&self, row: &E, path: &str) -> Result<Value, StoreError> {
        get_value(&self.model, row, path)
            .map(|value| value.unwrap_or(Value::Null))
            .map_err(StoreError::new)
    }

    fn sort_values(&self, row: &E, order: &[SortKey]) -> Result<Vec<Value>, StoreError> {
        order.iter().map(|key| self.read(row, &key.path)).collect()
    }

    fn project(&self, row: &E, paths: &[String]) -> Result<Row, StoreError> {
        paths.iter().map(|path| self.read(row, path)).collect()
    }
}

fn compare_keys(
    left: &[Value],
    right: &[Value],
    order: &[SortKey],
    nulls: NullOrdering,
) -> Ordering {
    for ((left, right), key) in left.iter().zip(right).zip(order) {
        let ord = compare_with_nulls(left, right, nulls);
        let ord = if key.direction.is_asc() { ord } else { ord.reverse() };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    Ordering::Equal
}

// Ascending comparison with nulls placed per `nulls`.
fn compare_with_nulls(left: &Value, right: &Value, nulls: NullOrdering) -> Ordering {
    match (left.is_null(), right.is_null(), nulls) {
        (true, true, _) => Ordering::Equal,
        (true, false, NullOrdering::First) | (false, true, NullOrdering::Last) => Ordering::Less,
        (true, false, NullOrdering::Last) | (false, true, NullOrdering::First) => Ordering::Greater,
        (false, false, _) => canonical_cmp(left, right),
    }
}

impl<E: Instance> QueryExecutor for MemoryExecutor<E> {
    fn count(&self, query: &StoreQuery) -> Result<u64, StoreError> {
        let unbounded = StoreQuery {
            skip: query.skip,
            limit: query.limit,
            ..StoreQuery::new(query.predicate.clone())
        };
        let rows = self.select(&unbounded)?;

        Ok(u64::try_from(rows.len()).unwrap_or(u64::MAX))
    }

    fn exists(&self, query: &StoreQuery) -> Result<bool, StoreError> {
        let probe = StoreQuery {
            skip: query.skip,
            ..StoreQuery::new(query.predicate.clone())
        }
        .limit(1);

        Ok(!self.select(&probe)?.is_empty())
    }

    fn fetch_one(&self, query: &StoreQuery) -> Result<Option<Row>, StoreError> {
        let bounded = StoreQuery {
            limit: Some(1),
            ..query.clone()
        };

        self.select(&bounded)?
            .first()
            .map(|row| self.project(row, &query.projection))
            .transpose()
    }
}
