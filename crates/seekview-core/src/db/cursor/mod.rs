//! Keyset cursor construction.

mod seek;


pub(crate) use seek::{Travel, seek_predicate};
