use crate::value::Value;
use std::cmp::Ordering;

/// Total canonical comparator used by sorting and the reference executor.
///
/// Ordering rules:
/// 1. Canonical variant rank (`Null` lowest)
/// 2. Variant-specific comparison for same-ranked values
///
/// Numeric variants share one rank and compare by magnitude; equal magnitudes
/// fall back to the variant so the order stays total.
#[must_use]
pub fn canonical_cmp(left: &Value, right: &Value) -> Ordering {
    let rank = left.canonical_rank().cmp(&right.canonical_rank());
    if rank != Ordering::Equal {
        return rank;
    }

    canonical_cmp_same_rank(left, right)
}

/// Strict comparator for orderable values of one family.
///
/// Returns `None` for `Null` on either side and for mismatched families, which
/// is what three-valued predicate evaluation treats as "unknown".
#[must_use]
pub fn strict_order_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Text(a), Value::Text(b)) => Some(a.cmp(b)),
        (Value::Blob(a), Value::Blob(b)) => Some(a.cmp(b)),
        (Value::Ulid(a), Value::Ulid(b)) => Some(a.cmp(b)),
        (Value::List(a), Value::List(b)) => strict_order_list(a, b),
        _ => numeric_cmp(left, right),
    }
}

fn canonical_cmp_same_rank(left: &Value, right: &Value) -> Ordering {
    match (left, right) {
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::Text(a), Value::Text(b)) => a.cmp(b),
        (Value::Blob(a), Value::Blob(b)) => a.cmp(b),
        (Value::Ulid(a), Value::Ulid(b)) => a.cmp(b),
        (Value::List(a), Value::List(b)) => canonical_cmp_list(a, b),
        (Value::Null, Value::Null) => Ordering::Equal,
        _ => numeric_cmp(left, right)
            .unwrap_or(Ordering::Equal)
            .then_with(|| numeric_variant_rank(left).cmp(&numeric_variant_rank(right))),
    }
}

fn canonical_cmp_list(left: &[Value], right: &[Value]) -> Ordering {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = canonical_cmp(left, right);
        if cmp != Ordering::Equal {
            return cmp;
        }
    }

    left.len().cmp(&right.len())
}

fn strict_order_list(left: &[Value], right: &[Value]) -> Option<Ordering> {
    for (left, right) in left.iter().zip(right.iter()) {
        let cmp = strict_order_cmp(left, right)?;
        if cmp != Ordering::Equal {
            return Some(cmp);
        }
    }

    Some(left.len().cmp(&right.len()))
}

#[allow(clippy::cast_precision_loss)]
fn numeric_cmp(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::Int(a), Value::Int(b)) => Some(a.cmp(b)),
        (Value::Uint(a), Value::Uint(b)) => Some(a.cmp(b)),
        (Value::Float(a), Value::Float(b)) => Some(a.cmp(b)),
        (Value::Int(a), Value::Uint(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
        (Value::Uint(a), Value::Int(b)) => Some(i128::from(*a).cmp(&i128::from(*b))),
        (Value::Int(a), Value::Float(b)) => Some((*a as f64).total_cmp(&b.get())),
        (Value::Float(a), Value::Int(b)) => Some(a.get().total_cmp(&(*b as f64))),
        (Value::Uint(a), Value::Float(b)) => Some((*a as f64).total_cmp(&b.get())),
        (Value::Float(a), Value::Uint(b)) => Some(a.get().total_cmp(&(*b as f64))),
        _ => None,
    }
}

const fn numeric_variant_rank(value: &Value) -> u8 {
    match value {
        Value::Int(_) => 0,
        Value::Uint(_) => 1,
        Value::Float(_) => 2,
        _ => 3,
    }
}
