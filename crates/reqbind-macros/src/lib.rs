//! # reqbind-macros
//!
//! Derive macro for reqbind records.
//!
//! `#[derive(Bind)]` records each field's binding annotations, visibility
//! and typed accessors. The annotations themselves are validated by the
//! reqbind runtime when it compiles the record's schema, because their
//! meaning depends on the binder's configuration.

mod expand;
mod parse;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derives `reqbind::Bindable` for a struct with named fields.
///
/// # Attributes
///
/// - `#[json = "name"]`: JSON and form name; `"-"` keeps JSON bodies away
///   from the field. Only the first comma-separated component counts.
/// - `#[form = "name,modifier,..."]`: form name plus modifiers. A name of
///   `"-"` skips the field.
/// - `#[bind(flatten)]`: splices in the fields of an embedded record.
///
/// Fields without `pub` are ignored. Fields with a JSON name must implement
/// `serde::de::DeserializeOwned`; fields bound by string must implement
/// `reqbind::FieldType`, unless their form directive says `jsononly`.
///
/// # Example
///
/// ```rust,ignore
/// use reqbind::Bind;
///
/// #[derive(Bind, Default)]
/// struct GetOrder {
///     #[json = "-"]
///     #[form = "id,path"]
///     pub id: u64,
///     #[json = "-"]
///     #[form = "If-None-Match,header,optional"]
///     pub etag: String,
///     #[json = "expand"]
///     #[form = "expand,sep=comma"]
///     pub expand: Vec<String>,
/// }
/// ```
#[proc_macro_derive(Bind, attributes(json, form, bind))]
pub fn derive_bind(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    expand::expand_bind(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
