//! Query-language rendering.
//!
//! Literals are never inlined: each one becomes a `?` placeholder and is
//! pushed onto the fragment's parameter list in placeholder order.

use crate::{
    db::predicate::{CompareOp, ComparePredicate, Predicate, RangePredicate},
    value::Value,
};
use std::fmt::Write;

pub const ALWAYS_TRUE: &str = "1 = 1";
pub const ALWAYS_FALSE: &str = "1 = 0";

///
/// PathTranslator
///
/// Backend-supplied mapping from a dotted property path to the locator
/// syntax the backend expects.
///

pub trait PathTranslator {
    fn locate(&self, path: &str) -> String;
}

///
/// DottedPath
/// Keeps the dotted path, optionally qualified by a root alias.
///

#[derive(Clone, Debug, Default)]
pub struct DottedPath {
    root: Option<String>,
}

impl DottedPath {
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }
}

impl PathTranslator for DottedPath {
    fn locate(&self, path: &str) -> String {
        match &self.root {
            Some(root) => format!("{root}.{path}"),
            None => path.to_string(),
        }
    }
}

///
/// JoinPath
///
/// Treats every intermediate segment as a join hop: `dept.boss.name` under
/// root `e` locates as `e_dept_boss.name`.
///

#[derive(Clone, Debug)]
pub struct JoinPath {
    root: String,
}

impl JoinPath {
    #[must_use]
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into() }
    }

    fn alias(&self, hops: &[&str]) -> String {
        let mut alias = self.root.clone();
        for hop in hops {
            alias.push('_');
            alias.push_str(hop);
        }

        alias
    }

    /// Join clauses needed to reach every path, deduplicated, in first-use order.
    #[must_use]
    pub fn joins<'a>(&self, paths: impl IntoIterator<Item = &'a str>) -> Vec<String> {
        let mut out = Vec::new();

        for path in paths {
            let segments: Vec<&str> = path.split('.').collect();
            for depth in 1..segments.len() {
                let parent = self.alias(&segments[..depth - 1]);
                let alias = self.alias(&segments[..depth]);
                let clause = format!("LEFT JOIN {parent}.{} {alias}", segments[depth - 1]);
                if !out.contains(&clause) {
                    out.push(clause);
                }
            }
        }

        out
    }
}

impl PathTranslator for JoinPath {
    fn locate(&self, path: &str) -> String {
        let segments: Vec<&str> = path.split('.').collect();
        let Some((leaf, hops)) = segments.split_last() else {
            return self.root.clone();
        };

        format!("{}.{leaf}", self.alias(hops))
    }
}

///
/// QueryFragment
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct QueryFragment {
    pub text: String,
    pub params: Vec<Value>,
}

impl Predicate {
    /// Render through a backend path translator.
    #[must_use]
    pub fn to_query_language(&self, translator: &dyn PathTranslator) -> QueryFragment {
        let mut renderer = Renderer {
            translator,
            out: QueryFragment::default(),
        };
        renderer.predicate(self);

        renderer.out
    }
}

struct Renderer<'a> {
    translator: &'a dyn PathTranslator,
    out: QueryFragment,
}

impl Renderer<'_> {
    fn text(&mut self, text: &str) {
        self.out.text.push_str(text);
    }

    fn param(&mut self, value: &Value) {
        self.out.params.push(value.clone());
        self.out.text.push('?');
    }

    fn predicate(&mut self, predicate: &Predicate) {
        match predicate {
            Predicate::Compare(compare) => self.compare(compare),
            Predicate::Range(range) => self.range(range),
            Predicate::IsNull { field } => {
                let locator = self.translator.locate(field);
                let _ = write!(self.out.text, "{locator} IS NULL");
            }
            Predicate::IsEmpty { field } => {
                let locator = self.translator.locate(field);
                let _ = write!(self.out.text, "{locator} IS EMPTY");
            }
            Predicate::And(children) => self.junction(children, " AND ", ALWAYS_TRUE),
            Predicate::Or(children) => self.junction(children, " OR ", ALWAYS_FALSE),
            Predicate::Not(inner) => {
                self.text("NOT (");
                self.predicate(inner);
                self.text(")");
            }
        }
    }

    fn junction(&mut self, children: &[Predicate], separator: &str, identity: &str) {
        match children {
            [] => self.text(identity),
            [only] => self.predicate(only),
            _ => {
                self.text("(");
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        self.text(separator);
                    }
                    self.predicate(child);
                }
                self.text(")");
            }
        }
    }

    fn compare(&mut self, compare: &ComparePredicate) {
        let locator = self.translator.locate(&compare.field);

        match compare.op {
            CompareOp::In | CompareOp::NotIn => {
                let items = compare
                    .value
                    .as_list()
                    .unwrap_or(std::slice::from_ref(&compare.value));

                // empty lists: nothing is in it, everything is outside it
                if items.is_empty() {
                    let identity = if compare.op == CompareOp::In {
                        ALWAYS_FALSE
                    } else {
                        ALWAYS_TRUE
                    };
                    self.text(identity);
                    return;
                }

                let _ = write!(self.out.text, "{locator} {} (", compare.op.symbol());
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        self.text(", ");
                    }
                    self.param(item);
                }
                self.text(")");
            }
            CompareOp::ILike => {
                let _ = write!(self.out.text, "LOWER({locator}) LIKE LOWER(");
                self.param(&compare.value);
                self.text(")");
            }
            op => {
                let _ = write!(self.out.text, "{locator} {} ", op.symbol());
                self.param(&compare.value);
            }
        }
    }

    fn range(&mut self, range: &RangePredicate) {
        let locator = self.translator.locate(&range.field);

        // the complement of an inclusive bound is a strict one, and vice versa
        let (lo_op, hi_op, joiner) = if range.outside {
            (
                if range.lo_inclusive { "<" } else { "<=" },
                if range.hi_inclusive { ">" } else { ">=" },
                " OR ",
            )
        } else {
            (
                if range.lo_inclusive { ">=" } else { ">" },
                if range.hi_inclusive { "<=" } else { "<" },
                " AND ",
            )
        };

        let _ = write!(self.out.text, "({locator} {lo_op} ");
        self.param(&range.lo);
        let _ = write!(self.out.text, "{joiner}{locator} {hi_op} ");
        self.param(&range.hi);
        self.text(")");
    }
}
