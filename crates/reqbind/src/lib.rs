//! # reqbind
//!
//! Binds the parts of an HTTP request into typed records, and projects
//! records back into query strings and path templates.
//!
//! A record derives [`Bind`] and annotates each field with where its value
//! comes from. A [`Binder`] compiles the record's schema once, validating
//! the annotations under its [`BinderConfig`], and then merges every source
//! of a request into the record on each decode call.
//!
//! ## Sources
//!
//! | Annotation | Source | Notes |
//! |------------|--------|-------|
//! | `#[json = "name"]` | Query, form body or JSON body | The default source |
//! | `#[form = "name,path"]` | Route path parameter | Required unless `optional` |
//! | `#[form = "Name,header"]` | Request header | Required unless `optional` |
//! | `#[form = "name,cookie"]` | Request cookie | Always optional |
//! | `#[form = ",method"]` | Request method | `String` |
//! | `#[form = ",issave"]` | POST, PUT or PATCH | `bool` |
//! | `#[form = ",rawbody"]` | Unparsed body | `String`, `Bytes` or `Vec<u8>` |
//! | `#[form = ",fullbody"]` | JSON body | `serde_json::Value` |
//! | (field type) | `RequestHead`, `Uri`, `HeaderMap`, `FormValues` | Inferred |
//!
//! Other modifiers: `optional`, `notinbody`, `jsononly`, and `sep=comma`,
//! `sep=semicolon` or `sep=colon` for sequences. A form name of `-` skips
//! the field. While JSON bodies are allowed, every field not bound from the
//! form source must carry `#[json = "-"]`.
//!
//! ## Example
//!
//! ```rust
//! use reqbind::{Bind, Binder, Params, Request};
//! use http::Method;
//!
//! #[derive(Bind, Default)]
//! struct UpdateUser {
//!     #[json = "-"]
//!     #[form = "id,path"]
//!     pub id: u64,
//!     #[json = "-"]
//!     #[form = "X-Request-Id,header,optional"]
//!     pub request_id: String,
//!     #[json = "name"]
//!     pub name: String,
//!     #[json = "tags"]
//!     pub tags: Vec<String>,
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let mut request = Request::builder()
//!     .method(Method::PUT)
//!     .uri("/users/42")
//!     .header("content-type", "application/json")
//!     .body(r#"{"name":"Alice","tags":["admin"]}"#)
//!     .build()
//!     .unwrap();
//! let params: Params = [("id", "42")].into_iter().collect();
//!
//! let mut update = UpdateUser::default();
//! Binder::global().decode(&mut request, &params, &mut update).await.unwrap();
//!
//! assert_eq!(update.id, 42);
//! assert_eq!(update.name, "Alice");
//! assert_eq!(update.tags, ["admin"]);
//! # });
//! ```
//!
//! ## Errors
//!
//! A malformed request yields a [`BindError`] carrying an HTTP status.
//! Misuse of the API, such as a misannotated record or a route that does not
//! supply a required path parameter, is a contract violation: it is logged
//! and raised as a panic prefixed with [`VIOLATION_PREFIX`]. Use
//! [`Binder::try_schema`] to check records at startup.

#![doc(html_root_url = "https://docs.rs/reqbind/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Lets `#[derive(Bind)]` expand to `::reqbind::` paths inside this crate.
extern crate self as reqbind;

mod binder;
mod cache;
mod codec;
mod config;
mod contract;
mod cookie;
mod decode;
mod encode;
mod error;
mod form;
mod params;
mod request;
mod schema;
mod value;

pub use binder::Binder;
pub use codec::{
    parse_bool, resolve_parser, resolve_stringifier, CodecError, Parser, StringOptions, Stringifier,
};
pub use config::{BinderConfig, ConfigError, DEFAULT_JSON_BODY_FALLBACK_PARAM, DEFAULT_MAX_MULTIPART_MEMORY, MB};
pub use contract::VIOLATION_PREFIX;
pub use cookie::Cookies;
pub use error::{BindError, BoxError, FieldError};
pub use form::FormValues;
pub use params::{NoPathParams, Params, PathParams};
pub use request::{Body, BodyStream, ContentFamily, Request, RequestBuilder, RequestHead};
pub use schema::{
    Bindable, FieldAccess, FieldBinding, FieldDescriptor, JsonBindError, JsonSetter, Schema,
    SchemaError, SchemaErrorKind, Source,
};
pub use value::{FieldType, FloatWidth, IntWidth, TextCodec, TextHooks, UintWidth, Value, ValueKind};

/// Derives [`Bindable`] from `#[json]`, `#[form]` and `#[bind]` field annotations.
pub use reqbind_macros::Bind;

#[doc(hidden)]
pub mod __private {
    pub use serde_json;
}
