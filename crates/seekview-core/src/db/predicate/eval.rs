//! Three-valued in-memory evaluation.
//!
//! Comparisons involving a null operand are `Unknown`, and a row matches a
//! filter only when the whole tree evaluates to `True`.

use crate::{
    db::predicate::{CompareOp, ComparePredicate, Predicate, PredicateError, RangePredicate},
    model::{EntityModel, get_value},
    traits::Instance,
    value::{Value, like_matches, strict_order_cmp},
};
use std::cmp::Ordering;

///
/// Truth
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Truth {
    True,
    False,
    Unknown,
}

impl Truth {
    #[must_use]
    pub const fn is_true(self) -> bool {
        matches!(self, Self::True)
    }

    #[must_use]
    pub const fn negate(self) -> Self {
        match self {
            Self::True => Self::False,
            Self::False => Self::True,
            Self::Unknown => Self::Unknown,
        }
    }
}

impl From<bool> for Truth {
    fn from(value: bool) -> Self {
        if value { Self::True } else { Self::False }
    }
}

impl Predicate {
    /// Evaluate against one instance of `model`'s type.
    pub fn eval(
        &self,
        model: &EntityModel,
        instance: &dyn Instance,
    ) -> Result<Truth, PredicateError> {
        let truth = match self {
            Self::Compare(compare) => {
                eval_compare(compare, &read(model, instance, &compare.field)?)
            }
            Self::Range(range) => eval_range(range, &read(model, instance, &range.field)?),
            Self::IsNull { field } => read(model, instance, field)?.is_null().into(),
            Self::IsEmpty { field } => {
                let value = read(model, instance, field)?;
                (value.is_null() || value.is_empty_collection() == Some(true)).into()
            }
            Self::And(children) => {
                let mut acc = Truth::True;
                for child in children {
                    match child.eval(model, instance)? {
                        Truth::False => return Ok(Truth::False),
                        Truth::Unknown => acc = Truth::Unknown,
                        Truth::True => {}
                    }
                }
                acc
            }
            Self::Or(children) => {
                let mut acc = Truth::False;
                for child in children {
                    match child.eval(model, instance)? {
                        Truth::True => return Ok(Truth::True),
                        Truth::Unknown => acc = Truth::Unknown,
                        Truth::False => {}
                    }
                }
                acc
            }
            Self::Not(inner) => inner.eval(model, instance)?.negate(),
        };

        Ok(truth)
    }

    /// Two-valued convenience: `Unknown` does not match.
    pub fn matches(
        &self,
        model: &EntityModel,
        instance: &dyn Instance,
    ) -> Result<bool, PredicateError> {
        self.eval(model, instance).map(Truth::is_true)
    }
}

// An absent intermediate object reads as null.
fn read(model: &EntityModel, instance: &dyn Instance, path: &str) -> Result<Value, PredicateError> {
    Ok(get_value(model, instance, path)?.unwrap_or(Value::Null))
}

fn eval_compare(compare: &ComparePredicate, left: &Value) -> Truth {
    let right = &compare.value;

    match compare.op {
        CompareOp::In => membership(left, right),
        CompareOp::NotIn => membership(left, right).negate(),
        _ if left.is_null() || right.is_null() => Truth::Unknown,
        CompareOp::Like | CompareOp::ILike => match (left.as_text(), right.as_text()) {
            (Some(text), Some(pattern)) => {
                like_matches(text, pattern, compare.op == CompareOp::ILike).into()
            }
            _ => Truth::False,
        },
        op => ordered(op, strict_order_cmp(left, right)),
    }
}

fn ordered(op: CompareOp, ord: Option<Ordering>) -> Truth {
    let Some(ord) = ord else {
        // distinct value families are simply unequal
        return (op == CompareOp::Ne).into();
    };

    let result = match op {
        CompareOp::Eq => ord == Ordering::Equal,
        CompareOp::Ne => ord != Ordering::Equal,
        CompareOp::Lt => ord == Ordering::Less,
        CompareOp::Lte => ord != Ordering::Greater,
        CompareOp::Gt => ord == Ordering::Greater,
        CompareOp::Gte => ord != Ordering::Less,
        CompareOp::Like | CompareOp::ILike | CompareOp::In | CompareOp::NotIn => false,
    };

    result.into()
}

fn membership(left: &Value, list: &Value) -> Truth {
    let items = list.as_list().unwrap_or(std::slice::from_ref(list));
    if items.is_empty() {
        return Truth::False;
    }
    if left.is_null() {
        return Truth::Unknown;
    }

    let mut saw_null = false;
    for item in items {
        if item.is_null() {
            saw_null = true;
        } else if strict_order_cmp(left, item) == Some(Ordering::Equal) {
            return Truth::True;
        }
    }

    if saw_null { Truth::Unknown } else { Truth::False }
}

fn eval_range(range: &RangePredicate, value: &Value) -> Truth {
    if value.is_null() || range.lo.is_null() || range.hi.is_null() {
        return Truth::Unknown;
    }

    let (Some(lo), Some(hi)) = (
        strict_order_cmp(value, &range.lo),
        strict_order_cmp(value, &range.hi),
    ) else {
        return Truth::False;
    };

    let above_lo = if range.lo_inclusive {
        lo != Ordering::Less
    } else {
        lo == Ordering::Greater
    };
    let below_hi = if range.hi_inclusive {
        hi != Ordering::Greater
    } else {
        hi == Ordering::Less
    };
    let inside = above_lo && below_hi;

    Truth::from(inside != range.outside)
}
