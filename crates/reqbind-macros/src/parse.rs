//! Parsing of `#[derive(Bind)]` input.
//!
//! Collects each field's `#[json]`, `#[form]` and `#[bind]` annotations.
//! Annotation contents are validated later, when the runtime compiles the
//! record's schema under a configuration.

use syn::{
    spanned::Spanned, Data, DeriveInput, Expr, ExprLit, Fields, Generics, Ident, Lit, LitStr, Meta,
    Type, Visibility,
};

/// A parsed record.
#[derive(Debug)]
pub struct RecordDef {
    /// The record type name.
    pub ident: Ident,
    /// Generic parameters of the record.
    pub generics: Generics,
    /// Fields in declaration order.
    pub fields: Vec<FieldDef>,
}

/// A parsed record field.
#[derive(Debug)]
pub struct FieldDef {
    /// The field name.
    pub ident: Ident,
    /// The field type.
    pub ty: Type,
    /// Whether the field is `pub` or `pub(..)`.
    pub exported: bool,
    /// The `#[json = "..."]` directive.
    pub json: Option<LitStr>,
    /// The `#[form = "..."]` directive.
    pub form: Option<LitStr>,
    /// Whether the field carries `#[bind(flatten)]`.
    pub flatten: bool,
}

impl FieldDef {
    /// Whether the JSON directive names the field.
    pub fn json_named(&self) -> bool {
        self.json.as_ref().is_some_and(|tag| {
            let value = tag.value();
            let name = value.split(',').next().unwrap_or_default();
            !name.is_empty() && name != "-"
        })
    }

    /// Whether the form directive carries the `jsononly` modifier.
    pub fn json_only(&self) -> bool {
        self.form
            .as_ref()
            .is_some_and(|tag| tag.value().split(',').skip(1).any(|m| m == "jsononly"))
    }
}

impl RecordDef {
    /// Parses derive input into a record definition.
    pub fn from_derive_input(input: &DeriveInput) -> syn::Result<Self> {
        let named = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named,
                _ => {
                    return Err(syn::Error::new(
                        input.ident.span(),
                        "Bind can only be derived for structs with named fields",
                    ))
                }
            },
            _ => {
                return Err(syn::Error::new(
                    input.ident.span(),
                    "Bind can only be derived for structs",
                ))
            }
        };

        let fields = named
            .named
            .iter()
            .map(FieldDef::from_field)
            .collect::<syn::Result<Vec<_>>>()?;

        Ok(Self {
            ident: input.ident.clone(),
            generics: input.generics.clone(),
            fields,
        })
    }
}

impl FieldDef {
    fn from_field(field: &syn::Field) -> syn::Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| syn::Error::new(field.span(), "expected a named field"))?;

        let mut json = None;
        let mut form = None;
        let mut flatten = false;
        for attr in &field.attrs {
            if attr.path().is_ident("json") {
                set_once(&mut json, string_value(&attr.meta, "json")?, attr)?;
            } else if attr.path().is_ident("form") {
                set_once(&mut form, string_value(&attr.meta, "form")?, attr)?;
            } else if attr.path().is_ident("bind") {
                attr.parse_nested_meta(|meta| {
                    if meta.path.is_ident("flatten") {
                        flatten = true;
                        Ok(())
                    } else {
                        Err(meta.error("unknown bind option; expected `flatten`"))
                    }
                })?;
            }
        }

        if flatten && (json.is_some() || form.is_some()) {
            return Err(syn::Error::new(
                ident.span(),
                "a flattened field cannot also carry json or form annotations",
            ));
        }

        Ok(Self {
            ident,
            ty: field.ty.clone(),
            exported: !matches!(field.vis, Visibility::Inherited),
            json,
            form,
            flatten,
        })
    }
}

fn string_value(meta: &Meta, name: &str) -> syn::Result<LitStr> {
    match meta {
        Meta::NameValue(nv) => match &nv.value {
            Expr::Lit(ExprLit {
                lit: Lit::Str(s), ..
            }) => Ok(s.clone()),
            other => Err(syn::Error::new(other.span(), "expected string literal")),
        },
        _ => Err(syn::Error::new(
            meta.span(),
            format!("expected #[{name} = \"...\"]"),
        )),
    }
}

fn set_once(slot: &mut Option<LitStr>, value: LitStr, attr: &syn::Attribute) -> syn::Result<()> {
    if slot.is_some() {
        return Err(syn::Error::new(attr.span(), "duplicate annotation"));
    }
    *slot = Some(value);
    Ok(())
}
