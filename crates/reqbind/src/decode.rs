//! Decoding a request into a record.
//!
//! Every field is filled by exactly one phase, chosen by its source:
//!
//! 1. the body (JSON, URL-encoded or multipart) and query string fill form
//!    fields, with a JSON document smuggled through the fallback form key
//!    as a last resort;
//! 2. path parameters, headers and cookies fill their named fields;
//! 3. request-derived values fill unnamed fields.
//!
//! The first request error ends the call. Contract violations panic.

use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::HeaderMap;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, trace};

use crate::binder::Binder;
use crate::codec::parse_bool_or;
use crate::config::BinderConfig;
use crate::contract;
use crate::cookie::Cookies;
use crate::error::BindError;
use crate::form::{self, FormValues};
use crate::params::PathParams;
use crate::request::{Body, ContentFamily, Request};
use crate::schema::{Bindable, FieldBinding, Schema, Source};
use crate::value::{Value, ValueKind};

/// Body state carried from the form phase to the unnamed phase.
#[derive(Debug, Default)]
struct BodyState {
    raw: Option<Bytes>,
    json_decoded: bool,
    full: Option<JsonValue>,
}

impl BodyState {
    /// Returns the buffered body, or consumes the request's body stream.
    async fn bytes(&self, request: &mut Request) -> Result<Bytes, BindError> {
        match &self.raw {
            Some(raw) => Ok(raw.clone()),
            None => request.read_body().await,
        }
    }

    fn stream(&self, request: &mut Request) -> Body {
        match &self.raw {
            Some(raw) => Body::Full(raw.clone()),
            None => request.take_body(),
        }
    }
}

impl Binder {
    /// Decodes a request into `dest`.
    ///
    /// Fields absent from the request keep their current values.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] when the request is malformed: an unparsable
    /// body or field value, a missing required header, or a body type this
    /// binder does not accept.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation when `T` is misannotated or a
    /// required path parameter is not supplied by `params`.
    pub async fn decode<T, P>(
        &self,
        request: &mut Request,
        params: &P,
        dest: &mut T,
    ) -> Result<(), BindError>
    where
        T: Bindable,
        P: PathParams + ?Sized,
    {
        let schema = self.schema::<T>();
        let result = decode_into(&self.config, &schema, request, params, dest).await;
        if let Err(err) = &result {
            debug!(
                record = schema.record(),
                status = err.status_code().as_u16(),
                error = %err,
                "request binding failed"
            );
        }
        result
    }
}

async fn decode_into<T, P>(
    config: &BinderConfig,
    schema: &Schema<T>,
    request: &mut Request,
    params: &P,
    dest: &mut T,
) -> Result<(), BindError>
where
    P: PathParams + ?Sized,
{
    let mut body = BodyState::default();
    if schema.needs_raw_body() {
        body.raw = Some(request.buffer_body().await?);
    }

    let family = if request.head().is_bodiless() {
        None
    } else {
        ContentFamily::detect(request.headers())
    };
    trace!(record = schema.record(), family = ?family, "decoding request");

    let values = match family {
        None => form::query_values(request.uri())?,
        Some(ContentFamily::Json) => {
            if !config.allow_json {
                return Err(BindError::unsupported_media_type("JSON input not allowed"));
            }
            let bytes = body.bytes(request).await?;
            decode_json(config, schema, request.headers(), &bytes, dest, &mut body)?;
            form::query_values(request.uri())?
        }
        Some(ContentFamily::UrlEncoded) => {
            if !config.allow_form {
                return Err(BindError::unsupported_media_type("form input not allowed"));
            }
            let bytes = body.bytes(request).await?;
            form::parse_urlencoded(&bytes, request.uri())?
        }
        Some(ContentFamily::Multipart) => {
            if !config.allow_multipart {
                return Err(BindError::unsupported_media_type(
                    "multipart input not allowed",
                ));
            }
            let content_type = request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
                .to_owned();
            let uri = request.uri().clone();
            form::parse_multipart(
                body.stream(request),
                &content_type,
                &uri,
                config.max_multipart_memory,
            )
            .await?
        }
        Some(ContentFamily::Other) => FormValues::new(),
    };

    for (key, raws) in values.iter() {
        let Some(field) = schema.named_field(Source::Form, key) else {
            continue;
        };
        if field.is_json_only() {
            continue;
        }
        field
            .assign_all(dest, raws)
            .map_err(BindError::invalid_field)?;
    }

    if !body.json_decoded {
        let fallback = config
            .json_body_fallback_param
            .as_deref()
            .and_then(|param| values.get(param))
            .filter(|text| !text.is_empty());
        if let Some(text) = fallback {
            trace!(record = schema.record(), "decoding fallback JSON body");
            decode_json(
                config,
                schema,
                request.headers(),
                text.as_bytes(),
                dest,
                &mut body,
            )?;
        }
    }

    let mut cookies: Option<Cookies> = None;
    for field in schema.named_fields() {
        match field.source() {
            Source::Path => bind_path(field, params, dest)?,
            Source::Header => bind_header(field, request.headers(), dest)?,
            Source::Cookie => {
                let jar = cookies.get_or_insert_with(|| request.cookies());
                if let Some(raw) = jar.get(field.name()) {
                    field
                        .assign_text(dest, raw)
                        .map_err(BindError::invalid_field)?;
                }
            }
            _ => {}
        }
    }

    for field in schema.unnamed_fields() {
        let value = match field.source() {
            Source::Request => Value::Request(request.head().clone()),
            Source::Url => Value::Url(request.uri().clone()),
            Source::QueryValues => {
                Value::Query(FormValues::from_query(request.uri()).unwrap_or_default())
            }
            Source::Headers => Value::Headers(request.headers().clone()),
            Source::Method => Value::Str(request.method().as_str().to_owned()),
            Source::IsWrite => Value::Bool(request.head().is_write()),
            Source::RawBody => raw_body_value(field, body.raw.clone().unwrap_or_default())?,
            Source::FullBody => Value::Json(body.full.clone().unwrap_or(JsonValue::Null)),
            Source::Path | Source::Form | Source::Cookie | Source::Header => continue,
        };
        field.assign(dest, value);
    }

    Ok(())
}

/// Applies a JSON document to the record and captures it for `fullbody`.
///
/// Nothing is parsed when no field depends on the document.
fn decode_json<T>(
    config: &BinderConfig,
    schema: &Schema<T>,
    headers: &HeaderMap,
    input: &[u8],
    dest: &mut T,
    body: &mut BodyState,
) -> Result<(), BindError> {
    body.json_decoded = true;
    if !schema.has_body_form() && !schema.has_full_body() {
        return Ok(());
    }

    // Only the first value is read; anything after it is ignored.
    let mut input = serde_json::Deserializer::from_slice(input);
    let document =
        JsonValue::deserialize(&mut input).map_err(|e| BindError::malformed("JSON input", e))?;
    if schema.has_full_body() {
        body.full = Some(document.clone());
    }
    if schema.has_body_form() {
        let reject_unknown = config.disallow_unknown_fields && !unknown_fields_allowed(config, headers);
        schema
            .apply_json(dest, document, reject_unknown)
            .map_err(|e| BindError::malformed("JSON input", e))?;
    }
    Ok(())
}

fn unknown_fields_allowed(config: &BinderConfig, headers: &HeaderMap) -> bool {
    config
        .allow_unknown_fields_header
        .as_deref()
        .and_then(|name| headers.get(name))
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| parse_bool_or(value, false))
}

fn bind_path<T, P>(field: &FieldBinding<T>, params: &P, dest: &mut T) -> Result<(), BindError>
where
    P: PathParams + ?Sized,
{
    match params.get(field.name()).filter(|raw| !raw.is_empty()) {
        Some(raw) => field
            .assign_text(dest, raw)
            .map_err(BindError::invalid_field),
        None if field.is_optional() => Ok(()),
        None => {
            let keys = params.keys();
            contract::violation(format!(
                "missing path parameter {:?} (got {} path params: {})",
                field.name(),
                keys.len(),
                keys.join(", ")
            ))
        }
    }
}

fn bind_header<T>(field: &FieldBinding<T>, headers: &HeaderMap, dest: &mut T) -> Result<(), BindError> {
    let raw = match headers.get(field.name()) {
        Some(value) => value
            .to_str()
            .map_err(|e| BindError::malformed(format!("invalid header {}", field.name()), e))?,
        None => "",
    };
    if raw.is_empty() {
        if field.is_optional() {
            return Ok(());
        }
        return Err(BindError::missing_header(field.name()));
    }
    field
        .assign_text(dest, raw)
        .map_err(BindError::invalid_field)
}

fn raw_body_value<T>(field: &FieldBinding<T>, raw: Bytes) -> Result<Value, BindError> {
    match field.kind() {
        ValueKind::Str => String::from_utf8(raw.to_vec())
            .map(Value::Str)
            .map_err(|e| BindError::malformed("raw body", e)),
        _ => Ok(Value::Bytes(raw)),
    }
}
