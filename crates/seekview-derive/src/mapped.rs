use crate::util::object_type;
use darling::{Error as DarlingError, FromDeriveInput, FromField, ast::Data, util::Ignored};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Generics, Ident, LitStr, Path, Type};

///
/// MappedInput
///

#[derive(Debug, FromDeriveInput)]
#[darling(attributes(mapped), supports(struct_named))]
struct MappedInput {
    ident: Ident,
    generics: Generics,
    data: Data<Ignored, MappedField>,

    #[darling(default)]
    entity: bool,

    #[darling(default)]
    embeddable: bool,

    #[darling(default)]
    ancestor: bool,
}

///
/// MappedField
///

#[derive(Debug, FromField)]
#[darling(attributes(mapped))]
#[allow(clippy::struct_excessive_bools)]
struct MappedField {
    ident: Option<Ident>,
    ty: Type,

    #[darling(default)]
    id: bool,

    #[darling(default)]
    embedded_id: bool,

    #[darling(default)]
    version: bool,

    #[darling(default)]
    embedded: bool,

    #[darling(default)]
    reference: bool,

    #[darling(default)]
    collection: bool,

    #[darling(default)]
    transient: bool,

    #[darling(default)]
    skip: bool,

    /// Composed ancestor: its members come first and unknown accessors
    /// are forwarded to it.
    #[darling(default)]
    parent: bool,

    #[darling(default)]
    target: Option<Path>,

    #[darling(default)]
    rename: Option<LitStr>,
}

///
/// Marker
///

#[remain::sorted]
#[derive(Clone, Copy, Debug)]
enum Marker {
    Collection,
    Embedded,
    EmbeddedId,
    Id,
    Reference,
    Transient,
    Version,
}

impl Marker {
    #[remain::check]
    fn builder_call(self) -> TokenStream {
        #[remain::sorted]
        match self {
            Self::Collection => quote!(.collection()),
            Self::Embedded => quote!(.embedded()),
            Self::EmbeddedId => quote!(.embedded_id()),
            Self::Id => quote!(.id()),
            Self::Reference => quote!(.reference()),
            Self::Transient => quote!(.transient()),
            Self::Version => quote!(.version()),
        }
    }
}

impl MappedField {
    fn markers(&self) -> Vec<Marker> {
        [
            (self.collection, Marker::Collection),
            (self.embedded, Marker::Embedded),
            (self.embedded_id, Marker::EmbeddedId),
            (self.id, Marker::Id),
            (self.reference, Marker::Reference),
            (self.transient, Marker::Transient),
            (self.version, Marker::Version),
        ]
        .into_iter()
        .filter_map(|(set, marker)| set.then_some(marker))
        .collect()
    }

    // Members that hold a sub-object rather than a value.
    const fn is_object(&self) -> bool {
        self.embedded || self.embedded_id || self.reference
    }

    fn member_name(&self, ident: &Ident) -> String {
        self.rename
            .as_ref()
            .map_or_else(|| ident.to_string(), LitStr::value)
    }

    fn declaration(&self, name: &str) -> TokenStream {
        let ty = &self.ty;
        let markers = self.markers().into_iter().map(Marker::builder_call);

        let decl = if self.is_object() {
            let object = match &self.target {
                Some(target) => quote!(#target),
                None => {
                    let inner = object_type(ty);
                    quote!(#inner)
                }
            };
            quote!(::seekview::model::MemberDecl::mapped::<#object>(#name))
        } else {
            quote!(::seekview::model::MemberDecl::of::<#ty>(#name))
        };

        quote!(.field(#decl #(#markers)*))
    }
}

impl MappedInput {
    fn shape_constructor(&self, parent: Option<&Type>) -> Result<TokenStream, DarlingError> {
        let roles = [self.entity, self.embeddable, self.ancestor];
        if roles.iter().filter(|set| **set).count() > 1 {
            return Err(DarlingError::custom(
                "at most one of `entity`, `embeddable`, `ancestor` may be set",
            )
            .with_span(&self.ident));
        }

        let base = if self.embeddable {
            quote!(::seekview::model::TypeShape::embeddable::<Self>())
        } else if self.ancestor {
            quote!(::seekview::model::TypeShape::ancestor::<Self>())
        } else {
            quote!(::seekview::model::TypeShape::entity::<Self>())
        };

        Ok(match parent {
            Some(parent) => quote!(#base.extends::<#parent>()),
            None => base,
        })
    }

    fn expand(&self) -> Result<TokenStream, DarlingError> {
        let Data::Struct(fields) = &self.data else {
            return Err(DarlingError::unsupported_shape("enum").with_span(&self.ident));
        };

        let mut errors = DarlingError::accumulator();

        let parents: Vec<&MappedField> = fields.iter().filter(|field| field.parent).collect();
        if let [_, extra, ..] = parents.as_slice() {
            errors.push(
                DarlingError::custom("at most one field can be the `parent`")
                    .with_span(&extra.ty),
            );
        }
        let parent = parents.first().copied();
        let shape = errors.handle(self.shape_constructor(parent.map(|field| &field.ty)));

        let mut declarations = Vec::new();
        let mut read_arms = Vec::new();
        let mut write_arms = Vec::new();
        let mut set_arms = Vec::new();

        for field in fields.iter() {
            let Some(ident) = &field.ident else {
                continue;
            };
            if field.skip || field.parent {
                if !field.markers().is_empty() {
                    errors.push(
                        DarlingError::custom("skipped and parent fields cannot carry markers")
                            .with_span(ident),
                    );
                }
                continue;
            }

            let name = field.member_name(ident);
            declarations.push(field.declaration(&name));

            if field.is_object() {
                read_arms.push(quote! {
                    #name => ::seekview::traits::Member::Object(
                        ::seekview::traits::ObjectValue::as_object(&self.#ident),
                    ),
                });
                write_arms.push(quote! {
                    #name => ::seekview::traits::MemberMut::Object(
                        ::seekview::traits::ObjectValue::as_object_mut(&mut self.#ident),
                    ),
                });
                set_arms.push(quote! {
                    #name => {
                        if value.is_null()
                            && ::seekview::traits::ObjectValue::clear_object(&mut self.#ident)
                        {
                            Ok(())
                        } else {
                            Err(::seekview::traits::AccessError::ObjectMember {
                                name: name.to_string(),
                            })
                        }
                    }
                });
            } else {
                read_arms.push(quote! {
                    #name => ::seekview::traits::Member::Value(
                        ::seekview::traits::FieldValue::to_value(&self.#ident),
                    ),
                });
                write_arms.push(quote! {
                    #name => ::seekview::traits::MemberMut::Value,
                });
                set_arms.push(quote! {
                    #name => {
                        self.#ident = ::seekview::traits::FieldValue::from_member(name, &value)?;
                        Ok(())
                    }
                });
            }
        }

        errors.finish()?;
        let shape = shape.unwrap_or_default();

        // unknown accessors fall through to the composed ancestor
        let base = parent.and_then(|f| f.ident.as_ref());
        let (read_fallback, write_fallback, set_fallback) = match base {
            Some(base) => (
                quote!(return ::seekview::traits::Instance::member(&self.#base, accessor)),
                quote!(
                    return ::seekview::traits::Instance::member_mut(&mut self.#base, accessor)
                ),
                quote!(
                    ::seekview::traits::Instance::set_member(&mut self.#base, accessor, value)
                ),
            ),
            None => (
                quote!(return None),
                quote!(return None),
                quote!(Err(::seekview::traits::AccessError::unknown(name))),
            ),
        };

        let ident = &self.ident;
        let (impl_generics, ty_generics, where_clause) = self.generics.split_for_impl();

        Ok(quote! {
            impl #impl_generics ::seekview::traits::Mapped for #ident #ty_generics #where_clause {
                fn shape() -> ::seekview::model::TypeShape {
                    #shape
                        #(#declarations)*
                }
            }

            impl #impl_generics ::seekview::traits::Instance for #ident #ty_generics #where_clause {
                fn member(
                    &self,
                    accessor: &::seekview::model::Accessor,
                ) -> Option<::seekview::traits::Member<'_>> {
                    Some(match accessor.name() {
                        #(#read_arms)*
                        _ => #read_fallback,
                    })
                }

                fn member_mut(
                    &mut self,
                    accessor: &::seekview::model::Accessor,
                ) -> Option<::seekview::traits::MemberMut<'_>> {
                    Some(match accessor.name() {
                        #(#write_arms)*
                        _ => #write_fallback,
                    })
                }

                fn set_member(
                    &mut self,
                    accessor: &::seekview::model::Accessor,
                    value: ::seekview::value::Value,
                ) -> Result<(), ::seekview::traits::AccessError> {
                    let name = accessor.name();
                    match name {
                        #(#set_arms)*
                        _ => #set_fallback,
                    }
                }
            }

            impl #impl_generics ::seekview::traits::ObjectValue
                for #ident #ty_generics #where_clause
            {
                fn as_object(&self) -> Option<&dyn ::seekview::traits::Instance> {
                    Some(self)
                }

                fn as_object_mut(&mut self) -> Option<&mut dyn ::seekview::traits::Instance> {
                    Some(self)
                }
            }
        })
    }
}

// derive_mapped
pub(crate) fn derive_mapped(input: TokenStream) -> TokenStream {
    let input: DeriveInput = match syn::parse2(input) {
        Ok(input) => input,
        Err(err) => return err.to_compile_error(),
    };

    match MappedInput::from_derive_input(&input).and_then(|mapped| mapped.expand()) {
        Ok(tokens) => tokens,
        Err(err) => err.write_errors(),
    }
}
