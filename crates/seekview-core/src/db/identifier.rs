use crate::{
    db::predicate::Predicate,
    model::{EntityModel, ResolveError, get_value},
    traits::Instance,
    value::Value,
};
use derive_more::Deref;
use std::fmt;

///
/// Identifier
///
/// Identifier value of one entity as leaf components, in the order of the
/// model's identifier paths. Simple identifiers have one component.
///

#[derive(Clone, Debug, Deref, Eq, Hash, PartialEq)]
pub struct Identifier(Vec<Value>);

impl Identifier {
    #[must_use]
    pub const fn new(components: Vec<Value>) -> Self {
        Self(components)
    }

    #[must_use]
    pub fn single(value: impl Into<Value>) -> Self {
        Self(vec![value.into()])
    }

    /// Read the identifier of `instance`.
    pub fn of(model: &EntityModel, instance: &dyn Instance) -> Result<Self, ResolveError> {
        model
            .identifier_paths()
            .iter()
            .map(|path| Ok(get_value(model, instance, path)?.unwrap_or(Value::Null)))
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[must_use]
    pub fn components(&self) -> &[Value] {
        &self.0
    }

    #[must_use]
    pub fn into_components(self) -> Vec<Value> {
        self.0
    }

    /// Single component as-is; composites as a list.
    #[must_use]
    pub fn to_value(&self) -> Value {
        match self.0.as_slice() {
            [single] => single.clone(),
            components => Value::List(components.to_vec()),
        }
    }

    /// Equality on every component.
    pub(crate) fn predicate<S: AsRef<str>>(&self, paths: &[S]) -> Predicate {
        let mut terms: Vec<Predicate> = paths
            .iter()
            .zip(&self.0)
            .map(|(path, value)| {
                if value.is_null() {
                    Predicate::is_null(path.as_ref())
                } else {
                    Predicate::eq(path.as_ref(), value.clone())
                }
            })
            .collect();

        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Predicate::And(terms)
        }
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (index, value) in self.0.iter().enumerate() {
            if index > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value:?}")?;
        }
        f.write_str(")")
    }
}

impl From<Value> for Identifier {
    fn from(value: Value) -> Self {
        Self(vec![value])
    }
}

impl From<u64> for Identifier {
    fn from(value: u64) -> Self {
        Self::single(value)
    }
}

impl From<Vec<Value>> for Identifier {
    fn from(components: Vec<Value>) -> Self {
        Self(components)
    }
}
