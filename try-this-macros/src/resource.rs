//! `#[derive(Resource)]` - parsing and code generation.

use proc_macro2::TokenStream;
use quote::quote;
use syn::{Data, DeriveInput, Error, Field, Fields, Index, Member, Result};

/// Expand the derive for one item.
pub fn derive(input: TokenStream) -> Result<TokenStream> {
    let input: DeriveInput = syn::parse2(input)?;
    let members = closed_members(&input)?;

    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();
    let closes = members.iter().rev();

    Ok(quote! {
        impl #impl_generics ::try_this::Resource for #name #ty_generics #where_clause {
            fn close(self) -> ::try_this::Result<()> {
                #[allow(unused_mut)]
                let mut __first = ::core::option::Option::None;
                #( ::try_this::__release_into(&mut __first, self.#closes); )*
                ::try_this::__released(__first)
            }
        }
    })
}

/// Fields to close, in declaration order.
fn closed_members(input: &DeriveInput) -> Result<Vec<Member>> {
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(data) => {
            return Err(Error::new(
                data.enum_token.span,
                "Resource can only be derived for structs",
            ))
        }
        Data::Union(data) => {
            return Err(Error::new(
                data.union_token.span,
                "Resource can only be derived for structs",
            ))
        }
    };

    let mut members = Vec::new();
    match fields {
        Fields::Named(named) => {
            for field in &named.named {
                if !is_skipped(field)? {
                    if let Some(ident) = &field.ident {
                        members.push(Member::Named(ident.clone()));
                    }
                }
            }
        }
        Fields::Unnamed(unnamed) => {
            for (idx, field) in unnamed.unnamed.iter().enumerate() {
                if !is_skipped(field)? {
                    members.push(Member::Unnamed(Index::from(idx)));
                }
            }
        }
        Fields::Unit => {}
    }
    Ok(members)
}

/// Whether the field carries `#[resource(skip)]`.
fn is_skipped(field: &Field) -> Result<bool> {
    let mut skip = false;
    for attr in &field.attrs {
        if !attr.path().is_ident("resource") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("unknown resource attribute, expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn members_of(input: DeriveInput) -> Result<Vec<String>> {
        closed_members(&input).map(|members| {
            members
                .iter()
                .map(|m| quote!(#m).to_string())
                .collect()
        })
    }

    #[test]
    fn test_named_fields_in_order() {
        let members = members_of(parse_quote! {
            struct Conn { reader: R, writer: W }
        })
        .unwrap();
        assert_eq!(members, vec!["reader", "writer"]);
    }

    #[test]
    fn test_tuple_fields() {
        let members = members_of(parse_quote! {
            struct Pair(A, B);
        })
        .unwrap();
        assert_eq!(members, vec!["0", "1"]);
    }

    #[test]
    fn test_skip_attribute() {
        let members = members_of(parse_quote! {
            struct Conn {
                reader: R,
                #[resource(skip)]
                name: String,
                writer: W,
            }
        })
        .unwrap();
        assert_eq!(members, vec!["reader", "writer"]);
    }

    #[test]
    fn test_unknown_attribute_is_error() {
        let result = members_of(parse_quote! {
            struct Conn {
                #[resource(later)]
                reader: R,
            }
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_enum_is_error() {
        let result = members_of(parse_quote! {
            enum Either { A(R), B(W) }
        });
        assert!(result.unwrap_err().to_string().contains("only be derived for structs"));
    }

    #[test]
    fn test_expansion_closes_in_reverse() {
        let tokens = derive(quote! {
            struct Conn { reader: R, writer: W }
        })
        .unwrap()
        .to_string();
        let writer = tokens.find("self . writer").unwrap();
        let reader = tokens.find("self . reader").unwrap();
        assert!(writer < reader);
    }

    #[test]
    fn test_unit_struct_expands() {
        let tokens = derive(quote! { struct Nothing; }).unwrap().to_string();
        assert!(tokens.contains("__released"));
        assert!(!tokens.contains("__release_into"));
    }
}
