//! Derive macros for seekview.

use proc_macro::TokenStream;

mod mapped;
mod util;

/// Generate `Mapped`, `Instance` and `ObjectValue` for a struct with named
/// fields, using field access.
///
/// Container: `#[mapped(entity | embeddable | ancestor)]`.
/// Fields: `#[mapped(id | embedded_id | version | embedded | reference |
/// collection | transient | skip | parent, target = "Type", rename = "name")]`.
///
/// A `parent` field composes a mapped ancestor: its members are declared
/// first and accessors this type does not know are forwarded to it.
#[proc_macro_derive(Mapped, attributes(mapped))]
pub fn derive_mapped(input: TokenStream) -> TokenStream {
    mapped::derive_mapped(input.into()).into()
}
