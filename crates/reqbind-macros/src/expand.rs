//! `#[derive(Bind)]` expansion.
//!
//! Generates a `Bindable` impl listing one `FieldDescriptor` per field.
//! Flattened fields splice in the descriptors of the embedded record,
//! projected through accessors of the embedding field.

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{FieldDef, RecordDef};

/// Expands the `Bind` derive.
pub fn expand_bind(input: &DeriveInput) -> syn::Result<TokenStream> {
    let record = RecordDef::from_derive_input(input)?;
    let ident = &record.ident;
    let (impl_generics, ty_generics, where_clause) = record.generics.split_for_impl();

    let pushes = record.fields.iter().map(field_tokens);

    Ok(quote! {
        #[automatically_derived]
        impl #impl_generics ::reqbind::Bindable for #ident #ty_generics #where_clause {
            fn fields() -> ::std::vec::Vec<::reqbind::FieldDescriptor<Self>> {
                let mut fields = ::std::vec::Vec::new();
                #(#pushes)*
                fields
            }
        }
    })
}

fn field_tokens(field: &FieldDef) -> TokenStream {
    let ident = &field.ident;
    let ty = &field.ty;
    let name = ident.to_string();
    let exported = field.exported;

    if field.flatten {
        return quote! {
            fields.extend(
                <#ty as ::reqbind::Bindable>::fields().into_iter().map(|field| {
                    field.project(
                        #exported,
                        #name,
                        |record: &Self| &record.#ident,
                        |record: &mut Self| &mut record.#ident,
                    )
                }),
            );
        };
    }

    // Private and JSON-only fields are never bound by string value, so their
    // types need no `FieldType` impl.
    let access = if !exported || field.json_only() {
        quote! { ::reqbind::FieldAccess::<Self>::opaque::<#ty>() }
    } else {
        quote! {
            ::reqbind::FieldAccess::<Self>::typed::<#ty>(
                |record: &Self| &record.#ident,
                |record: &mut Self| &mut record.#ident,
            )
        }
    };

    let json_setter = (exported && field.json_named()).then(|| {
        quote! {
            .with_json(|record: &mut Self, value: ::reqbind::__private::serde_json::Value| {
                record.#ident = ::reqbind::__private::serde_json::from_value(value)?;
                ::std::result::Result::Ok(())
            })
        }
    });
    let json_tag = field.json.as_ref().map(|tag| quote! { .json(#tag) });
    let form_tag = field.form.as_ref().map(|tag| quote! { .form(#tag) });

    quote! {
        fields.push(
            ::reqbind::FieldDescriptor::new(#name, #exported, #access #json_setter)
                #json_tag
                #form_tag
        );
    }
}
