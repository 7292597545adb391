//! Stable predicate fingerprints.
//!
//! The hash stream is tag-prefixed and length-delimited so distinct trees
//! never share an encoding. The shape fingerprint elides literals but keeps
//! membership list lengths, because those change the rendered placeholders.

use crate::{db::predicate::Predicate, value::Value};
use sha2::{Digest, Sha256};

impl Predicate {
    /// SHA-256 over structure and literals.
    #[must_use]
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hash_predicate(&mut hasher, self, Literals::Include);

        hasher.finalize().into()
    }

    /// SHA-256 over structure only; equal for trees that render to the same
    /// query text.
    #[must_use]
    pub fn shape_fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        hash_predicate(&mut hasher, self, Literals::Elide);

        hasher.finalize().into()
    }
}

#[derive(Clone, Copy, Eq, PartialEq)]
enum Literals {
    Include,
    Elide,
}

fn hash_predicate(hasher: &mut Sha256, predicate: &Predicate, literals: Literals) {
    match predicate {
        Predicate::Compare(compare) => {
            write_tag(hasher, 0x21);
            write_str(hasher, &compare.field);
            write_tag(hasher, compare.op.tag());
            write_literal(hasher, &compare.value, literals);
        }
        Predicate::Range(range) => {
            write_tag(hasher, 0x22);
            write_str(hasher, &range.field);
            write_tag(hasher, u8::from(range.lo_inclusive));
            write_tag(hasher, u8::from(range.hi_inclusive));
            write_tag(hasher, u8::from(range.outside));
            write_literal(hasher, &range.lo, literals);
            write_literal(hasher, &range.hi, literals);
        }
        Predicate::IsNull { field } => {
            write_tag(hasher, 0x23);
            write_str(hasher, field);
        }
        Predicate::IsEmpty { field } => {
            write_tag(hasher, 0x24);
            write_str(hasher, field);
        }
        Predicate::And(children) => {
            write_tag(hasher, 0x25);
            write_len_u32(hasher, children.len());
            for child in children {
                hash_predicate(hasher, child, literals);
            }
        }
        Predicate::Or(children) => {
            write_tag(hasher, 0x26);
            write_len_u32(hasher, children.len());
            for child in children {
                hash_predicate(hasher, child, literals);
            }
        }
        Predicate::Not(inner) => {
            write_tag(hasher, 0x27);
            hash_predicate(hasher, inner, literals);
        }
    }
}

fn write_literal(hasher: &mut Sha256, value: &Value, literals: Literals) {
    match (literals, value) {
        (Literals::Include, _) => write_value(hasher, value),
        (Literals::Elide, Value::List(items)) => {
            write_tag(hasher, 0x3f);
            write_len_u32(hasher, items.len());
        }
        (Literals::Elide, _) => write_tag(hasher, 0x3e),
    }
}

///
/// Encode one value with its variant tag.
///

fn write_value(hasher: &mut Sha256, value: &Value) {
    match value {
        Value::Null => write_tag(hasher, 0x30),
        Value::Bool(v) => {
            write_tag(hasher, 0x31);
            write_tag(hasher, u8::from(*v));
        }
        Value::Int(v) => {
            write_tag(hasher, 0x32);
            hasher.update(v.to_be_bytes());
        }
        Value::Uint(v) => {
            write_tag(hasher, 0x33);
            hasher.update(v.to_be_bytes());
        }
        Value::Float(v) => {
            write_tag(hasher, 0x34);
            hasher.update(v.get().to_bits().to_be_bytes());
        }
        Value::Text(v) => {
            write_tag(hasher, 0x35);
            write_str(hasher, v);
        }
        Value::Blob(v) => {
            write_tag(hasher, 0x36);
            write_len_u32(hasher, v.len());
            hasher.update(v);
        }
        Value::Ulid(v) => {
            write_tag(hasher, 0x37);
            hasher.update(v.to_bytes());
        }
        Value::List(items) => {
            write_tag(hasher, 0x38);
            write_len_u32(hasher, items.len());
            for item in items {
                write_value(hasher, item);
            }
        }
    }
}

///
/// Encode one string with length prefix.
///

fn write_str(hasher: &mut Sha256, value: &str) {
    write_len_u32(hasher, value.len());
    hasher.update(value.as_bytes());
}

/// Encode a platform-sized length as u32 with deterministic saturation.
fn write_len_u32(hasher: &mut Sha256, len: usize) {
    let len = u32::try_from(len).unwrap_or(u32::MAX);
    hasher.update(len.to_be_bytes());
}

fn write_tag(hasher: &mut Sha256, tag: u8) {
    hasher.update([tag]);
}
