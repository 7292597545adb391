//! Seek predicate construction.
//!
//! For keys `k0..kn` with anchor values `v0..vn`, "strictly after the
//! anchor" is
//!
//!   OR over i of ( AND over j < i of kj = vj ) AND strict(ki, vi)
//!
//! where `strict` compares in the key's own direction for forward travel and
//! against it for backward travel. Nulls take part in the order (lowest or
//! highest per `NullOrdering`) so a null anchor value never drops rows.
//!
//! The anchor values are read before the seek query runs; a concurrent
//! update of a sort key in between can skip or repeat that row.

use crate::{
    config::NullOrdering,
    db::{order::SortKey, predicate::Predicate},
    value::Value,
};

///
/// Travel
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Travel {
    Forward,
    Backward,
}

/// Rows strictly after (`Forward`) or before (`Backward`) the anchor.
///
/// `keys` and `anchor` are parallel; the key list must already end in the
/// identifier tiebreak.
pub(crate) fn seek_predicate(
    keys: &[SortKey],
    anchor: &[Value],
    travel: Travel,
    nulls: NullOrdering,
) -> Predicate {
    let mut disjuncts = Vec::with_capacity(keys.len());

    for (index, (key, value)) in keys.iter().zip(anchor).enumerate() {
        // moving toward larger values in ascending terms?
        let upward = (travel == Travel::Forward) == key.direction.is_asc();
        let Some(strict) = strict(&key.path, value, upward, nulls) else {
            continue;
        };

        let mut terms: Vec<Predicate> = keys[..index]
            .iter()
            .zip(anchor)
            .map(|(prior, value)| equal(&prior.path, value))
            .collect();
        terms.push(strict);

        disjuncts.push(collapse_and(terms));
    }

    match disjuncts.len() {
        1 => disjuncts.remove(0),
        _ => Predicate::Or(disjuncts),
    }
}

fn collapse_and(mut terms: Vec<Predicate>) -> Predicate {
    if terms.len() == 1 {
        terms.remove(0)
    } else {
        Predicate::And(terms)
    }
}

fn equal(path: &str, value: &Value) -> Predicate {
    if value.is_null() {
        Predicate::is_null(path)
    } else {
        Predicate::eq(path, value.clone())
    }
}

// `None` when nothing can lie strictly beyond `value` in that direction.
fn strict(path: &str, value: &Value, upward: bool, nulls: NullOrdering) -> Option<Predicate> {
    let nulls_low = nulls == NullOrdering::First;

    if value.is_null() {
        // beyond null is every non-null value, or nothing
        return (upward == nulls_low).then(|| Predicate::is_not_null(path));
    }

    let beyond = if upward {
        Predicate::gt(path, value.clone())
    } else {
        Predicate::lt(path, value.clone())
    };

    if upward == nulls_low {
        Some(beyond)
    } else {
        Some(beyond | Predicate::is_null(path))
    }
}
