extern crate proc_macro;

use darling::{ast, FromDeriveInput, FromField};
use proc_macro2::TokenStream;
use quote::quote;
use syn::parse_macro_input;

#[derive(Debug, Clone, FromField)]
#[darling(attributes(attribute))]
struct Field {
    ident: Option<syn::Ident>,
    ty: syn::Type,
    /// Shader input name, defaults to the field name.
    #[darling(default)]
    name: Option<String>,
    #[darling(default)]
    normalize: bool,
    #[darling(default)]
    ignore: bool,
}

#[derive(Debug, FromDeriveInput)]
#[darling(supports(struct_named))]
struct VertexInput {
    ident: syn::Ident,
    generics: syn::Generics,
    data: ast::Data<(), Field>,
}

/// Implement `iris::vertex::Vertex` for a `#[repr(C)]` struct with named fields.
///
/// Each field becomes one attribute whose stride is the size of the struct and whose offset
/// is the field offset. Field attributes:
///
/// - `#[attribute(name = "vPosition")]` binds the field to a differently named shader input
/// - `#[attribute(normalize)]` maps integer fields to `[0, 1]`/`[-1, 1]`
/// - `#[attribute(ignore)]` leaves the field out of the layout
#[proc_macro_derive(Vertex, attributes(attribute))]
pub fn derive_vertex(item: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let input = parse_macro_input!(item as syn::DeriveInput);
    match VertexInput::from_derive_input(&input) {
        Ok(input) => expand(input).into(),
        Err(err) => err.write_errors().into(),
    }
}

fn expand(input: VertexInput) -> TokenStream {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let fields = input
        .data
        .take_struct()
        .map(|fields| fields.fields)
        .unwrap_or_default();

    let attributes = fields.iter().filter(|field| !field.ignore).map(|field| {
        let ty = &field.ty;
        // `supports(struct_named)` guarantees an identifier.
        let member = field.ident.as_ref().map(|ident| quote!(#ident));
        let name = field
            .name
            .clone()
            .or_else(|| field.ident.as_ref().map(ToString::to_string))
            .unwrap_or_default();
        let normalize = field.normalize;
        quote! {
            ::iris::attribute::VertexAttribute::for_field::<#ty>(
                #name,
                ::core::mem::size_of::<Self>(),
                ::core::mem::offset_of!(Self, #member),
            )
            .with_normalize(#normalize)
        }
    });

    quote! {
        impl #impl_generics ::iris::vertex::Vertex for #ident #ty_generics #where_clause {
            fn attributes() -> ::std::vec::Vec<::iris::attribute::VertexAttribute> {
                ::std::vec![#(#attributes),*]
            }
        }
    }
}
