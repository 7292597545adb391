use crate::{
    db::predicate::{CompareOp, Predicate, PredicateError},
    model::{EntityModel, PropertyKind, resolve},
    value::Value,
};

impl Predicate {
    /// Check every path and operand against `model`.
    ///
    /// Comparisons need a persistent, non-collection path; `IsEmpty` needs
    /// a collection; pattern and membership operators need text and list
    /// operands respectively.
    pub fn validate(&self, model: &EntityModel) -> Result<(), PredicateError> {
        match self {
            Self::Compare(compare) => {
                comparable(model, &compare.field)?;

                if compare.op.is_pattern() && !matches!(compare.value, Value::Text(_)) {
                    return Err(PredicateError::ExpectedPattern {
                        field: compare.field.clone(),
                        op: compare.op,
                    });
                }
                if compare.op.is_membership() && !matches!(compare.value, Value::List(_)) {
                    return Err(PredicateError::ExpectedList {
                        field: compare.field.clone(),
                        op: compare.op,
                    });
                }
                if compare.op == CompareOp::Eq && compare.value.is_null() {
                    return Err(PredicateError::NullComparison {
                        field: compare.field.clone(),
                    });
                }

                Ok(())
            }
            Self::Range(range) => comparable(model, &range.field),
            Self::IsNull { field } => {
                let prop = resolve(model, field)?;
                if !prop.kind().is_persistent() {
                    return Err(PredicateError::NotComparable {
                        field: field.clone(),
                        kind: prop.kind(),
                    });
                }

                Ok(())
            }
            Self::IsEmpty { field } => {
                let prop = resolve(model, field)?;
                if prop.kind() != PropertyKind::Collection {
                    return Err(PredicateError::NotCollection {
                        field: field.clone(),
                        kind: prop.kind(),
                    });
                }

                Ok(())
            }
            Self::And(children) | Self::Or(children) => children
                .iter()
                .try_for_each(|child| child.validate(model)),
            Self::Not(inner) => inner.validate(model),
        }
    }
}

fn comparable(model: &EntityModel, field: &str) -> Result<(), PredicateError> {
    let prop = resolve(model, field)?;

    match prop.kind() {
        PropertyKind::Simple | PropertyKind::Embedded | PropertyKind::Reference => Ok(()),
        kind @ (PropertyKind::Collection | PropertyKind::Transient) => {
            Err(PredicateError::NotComparable {
                field: field.to_string(),
                kind,
            })
        }
    }
}
