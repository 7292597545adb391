use crate::value::Value;
use std::{
    fmt,
    ops::{BitAnd, BitOr},
};

///
/// Predicate AST
///
/// Pure, schema-agnostic filter tree over dotted property paths.
/// Structural equality and hashing compare tags and children only.
///
/// Interpretation happens in later passes:
///
/// - validation (model-aware)
/// - rendering (through a backend path translator)
/// - in-memory evaluation (reference executor)
///

///
/// CompareOp
///

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
#[repr(u8)]
pub enum CompareOp {
    Eq = 0x01,
    Ne = 0x02,
    Lt = 0x03,
    Lte = 0x04,
    Gt = 0x05,
    Gte = 0x06,
    Like = 0x07,
    ILike = 0x08,
    In = 0x09,
    NotIn = 0x0a,
}

impl CompareOp {
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Operator text in the rendered query language.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Like => "LIKE",
            Self::ILike => "ILIKE",
            Self::In => "IN",
            Self::NotIn => "NOT IN",
        }
    }

    /// True for operators whose operand is a list.
    #[must_use]
    pub const fn is_membership(self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }

    /// True for operators whose operand is a text pattern.
    #[must_use]
    pub const fn is_pattern(self) -> bool {
        matches!(self, Self::Like | Self::ILike)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

///
/// ComparePredicate
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ComparePredicate {
    pub field: String,
    pub op: CompareOp,
    pub value: Value,
}

impl ComparePredicate {
    #[must_use]
    pub fn new(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op,
            value: value.into(),
        }
    }
}

///
/// RangePredicate
///
/// `lo ≤/< field ≤/< hi`, or its complement when `outside` is set.
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct RangePredicate {
    pub field: String,
    pub lo: Value,
    pub hi: Value,
    pub lo_inclusive: bool,
    pub hi_inclusive: bool,
    pub outside: bool,
}

///
/// Predicate
///

#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Predicate {
    Compare(ComparePredicate),
    Range(RangePredicate),
    IsNull { field: String },
    /// Collection-valued paths only.
    IsEmpty { field: String },
    And(Vec<Self>),
    Or(Vec<Self>),
    Not(Box<Self>),
}

impl Predicate {
    /// Identity predicate for conjunction (renders as always true).
    #[must_use]
    pub const fn always() -> Self {
        Self::And(Vec::new())
    }

    /// Identity predicate for disjunction (renders as always false).
    #[must_use]
    pub const fn never() -> Self {
        Self::Or(Vec::new())
    }

    #[must_use]
    pub const fn and(preds: Vec<Self>) -> Self {
        Self::And(preds)
    }

    #[must_use]
    pub const fn or(preds: Vec<Self>) -> Self {
        Self::Or(preds)
    }

    #[expect(clippy::should_implement_trait)]
    #[must_use]
    pub fn not(pred: Self) -> Self {
        Self::Not(Box::new(pred))
    }

    #[must_use]
    pub fn compare(field: impl Into<String>, op: CompareOp, value: impl Into<Value>) -> Self {
        Self::Compare(ComparePredicate::new(field, op, value))
    }

    #[must_use]
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Eq, value)
    }

    #[must_use]
    pub fn ne(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Ne, value)
    }

    #[must_use]
    pub fn lt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lt, value)
    }

    #[must_use]
    pub fn lte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Lte, value)
    }

    #[must_use]
    pub fn gt(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gt, value)
    }

    #[must_use]
    pub fn gte(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::compare(field, CompareOp::Gte, value)
    }

    /// SQL-style pattern: `%` matches any run, `_` exactly one character.
    #[must_use]
    pub fn like(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::Like, Value::Text(pattern.into()))
    }

    #[must_use]
    pub fn ilike(field: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::compare(field, CompareOp::ILike, Value::Text(pattern.into()))
    }

    #[must_use]
    pub fn in_(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::compare(field, CompareOp::In, Value::List(values))
    }

    #[must_use]
    pub fn not_in(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::compare(field, CompareOp::NotIn, Value::List(values))
    }

    #[must_use]
    pub fn range(
        field: impl Into<String>,
        lo: impl Into<Value>,
        hi: impl Into<Value>,
        lo_inclusive: bool,
        hi_inclusive: bool,
    ) -> Self {
        Self::Range(RangePredicate {
            field: field.into(),
            lo: lo.into(),
            hi: hi.into(),
            lo_inclusive,
            hi_inclusive,
            outside: false,
        })
    }

    /// Inclusive on both ends.
    #[must_use]
    pub fn between(field: impl Into<String>, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Self::range(field, lo, hi, true, true)
    }

    /// Complement of `between` (null still never matches).
    #[must_use]
    pub fn outside(field: impl Into<String>, lo: impl Into<Value>, hi: impl Into<Value>) -> Self {
        Self::Range(RangePredicate {
            field: field.into(),
            lo: lo.into(),
            hi: hi.into(),
            lo_inclusive: true,
            hi_inclusive: true,
            outside: true,
        })
    }

    #[must_use]
    pub fn is_null(field: impl Into<String>) -> Self {
        Self::IsNull {
            field: field.into(),
        }
    }

    #[must_use]
    pub fn is_not_null(field: impl Into<String>) -> Self {
        Self::not(Self::is_null(field))
    }

    #[must_use]
    pub fn is_empty(field: impl Into<String>) -> Self {
        Self::IsEmpty {
            field: field.into(),
        }
    }

    /// Every property path the tree mentions, in visit order.
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_paths(&mut out);

        out
    }

    fn collect_paths<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Compare(compare) => out.push(&compare.field),
            Self::Range(range) => out.push(&range.field),
            Self::IsNull { field } | Self::IsEmpty { field } => out.push(field),
            Self::And(children) | Self::Or(children) => {
                for child in children {
                    child.collect_paths(out);
                }
            }
            Self::Not(inner) => inner.collect_paths(out),
        }
    }
}

// Conjunction of an optional filter with another predicate.
pub(crate) fn conjoin(filter: Option<&Predicate>, other: Predicate) -> Predicate {
    match filter {
        Some(filter) => Predicate::And(vec![filter.clone(), other]),
        None => other,
    }
}

impl BitAnd for Predicate {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self::Output {
        Self::And(vec![self, rhs])
    }
}

impl BitAnd for &Predicate {
    type Output = Predicate;

    fn bitand(self, rhs: Self) -> Self::Output {
        Predicate::And(vec![self.clone(), rhs.clone()])
    }
}

impl BitOr for Predicate {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self::Output {
        Self::Or(vec![self, rhs])
    }
}

impl BitOr for &Predicate {
    type Output = Predicate;

    fn bitor(self, rhs: Self) -> Self::Output {
        Predicate::Or(vec![self.clone(), rhs.clone()])
    }
}

impl std::ops::Not for Predicate {
    type Output = Self;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}
