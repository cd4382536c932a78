//! Schema compilation.
//!
//! `#[derive(Bind)]` records what a record declares: each field's
//! annotations, visibility and typed accessors, as [`FieldDescriptor`]s.
//! [`Schema::compile`] turns those into validated [`FieldBinding`]s under a
//! [`BinderConfig`], resolving a source, a bound name and a codec per field.
//! Compilation is deterministic, so a compiled schema can be cached and
//! shared by every decode and encode call for the record type.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use std::any::type_name;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

use crate::codec::{resolve_parser, resolve_stringifier, Parser, StringOptions, Stringifier};
use crate::config::BinderConfig;
use crate::contract;
use crate::error::FieldError;
use crate::value::{FieldType, Value, ValueKind};

type Assign<T> = Arc<dyn Fn(&mut T, Value) -> bool + Send + Sync>;
type Read<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Deserializes one JSON value into a record field.
pub type JsonSetter<T> =
    Arc<dyn Fn(&mut T, JsonValue) -> Result<(), serde_json::Error> + Send + Sync>;

/// A record whose fields can be bound from a request.
///
/// Implemented by `#[derive(Bind)]`.
pub trait Bindable: Sized + 'static {
    /// Describes every field in declaration order.
    fn fields() -> Vec<FieldDescriptor<Self>>;
}

/// Typed access to one field of a record.
pub struct FieldAccess<T> {
    kind: ValueKind,
    assign: Option<Assign<T>>,
    read: Option<Read<T>>,
    json: Option<JsonSetter<T>>,
}

impl<T: 'static> FieldAccess<T> {
    /// Access to a field of a bindable type.
    pub fn typed<V: FieldType>(get: fn(&T) -> &V, get_mut: fn(&mut T) -> &mut V) -> Self {
        let assign: Assign<T> = Arc::new(move |record: &mut T, value: Value| {
            match V::from_value(value) {
                Some(v) => {
                    *get_mut(record) = v;
                    true
                }
                None => false,
            }
        });
        let read: Read<T> = Arc::new(move |record: &T| get(record).to_value());
        Self {
            kind: V::kind(),
            assign: Some(assign),
            read: Some(read),
            json: None,
        }
    }

    /// A field that is never bound by string value.
    pub fn opaque<V: ?Sized>() -> Self {
        Self {
            kind: ValueKind::Unsupported(type_name::<V>()),
            assign: None,
            read: None,
            json: None,
        }
    }

    /// Adds a JSON setter for the field.
    pub fn with_json(mut self, set: fn(&mut T, JsonValue) -> Result<(), serde_json::Error>) -> Self {
        let setter: JsonSetter<T> = Arc::new(set);
        self.json = Some(setter);
        self
    }

    /// Kind of the field's type.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    fn project<O: 'static>(self, get: fn(&O) -> &T, get_mut: fn(&mut O) -> &mut T) -> FieldAccess<O> {
        FieldAccess {
            kind: self.kind,
            assign: self.assign.map(|assign| -> Assign<O> {
                Arc::new(move |outer: &mut O, value: Value| assign(get_mut(outer), value))
            }),
            read: self.read.map(|read| -> Read<O> {
                Arc::new(move |outer: &O| read(get(outer)))
            }),
            json: self.json.map(|set| -> JsonSetter<O> {
                Arc::new(move |outer: &mut O, value: JsonValue| set(get_mut(outer), value))
            }),
        }
    }
}

/// What a record declares about one field.
pub struct FieldDescriptor<T> {
    path: String,
    exported: bool,
    json: Option<&'static str>,
    form: Option<&'static str>,
    access: FieldAccess<T>,
}

impl<T: 'static> FieldDescriptor<T> {
    /// Describes a field by identifier, visibility and accessors.
    pub fn new(ident: &'static str, exported: bool, access: FieldAccess<T>) -> Self {
        Self {
            path: ident.to_owned(),
            exported,
            json: None,
            form: None,
            access,
        }
    }

    /// Sets the JSON directive, e.g. `"name"`, `"-"` or `"name,omitempty"`.
    pub fn json(mut self, tag: &'static str) -> Self {
        self.json = Some(tag);
        self
    }

    /// Sets the form directive, e.g. `"X-Id,header,optional"`.
    pub fn form(mut self, tag: &'static str) -> Self {
        self.form = Some(tag);
        self
    }

    /// Lifts a field of an embedded record into the embedding record.
    pub fn project<O: 'static>(
        self,
        exported: bool,
        outer: &str,
        get: fn(&O) -> &T,
        get_mut: fn(&mut O) -> &mut T,
    ) -> FieldDescriptor<O> {
        FieldDescriptor {
            path: format!("{outer}.{}", self.path),
            exported: exported && self.exported,
            json: self.json,
            form: self.form,
            access: self.access.project(get, get_mut),
        }
    }

    /// Dotted path of the field from the record root.
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Where a field's value comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Source {
    /// Route path parameter
    Path,
    /// Query string, form body or JSON body
    Form,
    /// Request cookie
    Cookie,
    /// Request header
    Header,
    /// Whole request head
    Request,
    /// Request URI
    Url,
    /// Copy of the parsed query
    QueryValues,
    /// Whole header map
    Headers,
    /// Request method as a string
    Method,
    /// Whether the method is POST, PUT or PATCH
    IsWrite,
    /// Unparsed request body
    RawBody,
    /// JSON body as a generic value
    FullBody,
}

impl Source {
    /// Returns `true` for sources looked up by name.
    pub fn is_named(self) -> bool {
        matches!(self, Self::Path | Self::Form | Self::Cookie | Self::Header)
    }

    /// Name of the source as written in diagnostics.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Path => "path",
            Self::Form => "form",
            Self::Cookie => "cookie",
            Self::Header => "header",
            Self::Request => "request",
            Self::Url => "url",
            Self::QueryValues => "query values",
            Self::Headers => "headers",
            Self::Method => "method",
            Self::IsWrite => "issave",
            Self::RawBody => "rawbody",
            Self::FullBody => "fullbody",
        }
    }

    fn implicit(kind: &ValueKind) -> Option<Self> {
        match kind {
            ValueKind::Request => Some(Self::Request),
            ValueKind::Url => Some(Self::Url),
            ValueKind::Headers => Some(Self::Headers),
            ValueKind::Query => Some(Self::QueryValues),
            _ => None,
        }
    }

    fn accepts(self, kind: &ValueKind) -> bool {
        match self {
            Self::Path | Self::Form | Self::Cookie | Self::Header => true,
            Self::Request => matches!(kind, ValueKind::Request),
            Self::Url => matches!(kind, ValueKind::Url),
            Self::QueryValues => matches!(kind, ValueKind::Query),
            Self::Headers => matches!(kind, ValueKind::Headers),
            Self::Method => matches!(kind, ValueKind::Str),
            Self::IsWrite => matches!(kind, ValueKind::Bool),
            Self::RawBody => matches!(kind, ValueKind::Str | ValueKind::Bytes) || kind.is_byte_seq(),
            Self::FullBody => matches!(kind, ValueKind::Json),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A misannotated record field.
///
/// Compile errors are defects in the record declaration, not in a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid binding for {record}.{field}: {kind}")]
pub struct SchemaError {
    record: &'static str,
    field: String,
    kind: SchemaErrorKind,
}

impl SchemaError {
    /// Type name of the record.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Dotted path of the offending field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The rule the field breaks.
    pub fn kind(&self) -> &SchemaErrorKind {
        &self.kind
    }
}

/// The rule a misannotated field breaks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaErrorKind {
    /// Two modifiers of one form directive both set the source.
    #[error("form directive {tag:?} sets the source twice ({first}, then {second})")]
    ConflictingSource {
        /// The whole form directive.
        tag: String,
        /// Source set first, explicitly or by the field type.
        first: Source,
        /// Source that conflicts with it.
        second: Source,
    },

    /// A form directive modifier is not recognized.
    #[error("unknown modifier {modifier:?} in form directive {tag:?}")]
    UnknownModifier {
        /// The unrecognized modifier.
        modifier: String,
        /// The whole form directive.
        tag: String,
    },

    /// A named field carries neither a json nor a form annotation.
    #[error("field needs a json or form annotation; use form = \"-\" to skip it")]
    MissingAnnotation,

    /// A non-form field would also be filled from JSON bodies.
    #[error("field bound from {origin} must carry json = \"-\" while JSON bodies are allowed")]
    JsonNotSkipped {
        /// Source of the field.
        origin: Source,
    },

    /// A request-derived field declares a name.
    #[error("field bound from {origin} cannot declare the name {name:?}")]
    UnnamedWithName {
        /// Source of the field.
        origin: Source,
        /// The declared name.
        name: String,
    },

    /// A form field has no json name to share with JSON bodies.
    #[error("form field needs a json name while JSON bodies are allowed")]
    MissingJsonName,

    /// A form field names itself differently in its two annotations.
    #[error("form name {form:?} does not match json name {json:?}; drop the name from the form directive")]
    NameMismatch {
        /// Name from the form directive.
        form: String,
        /// Name from the json annotation.
        json: String,
    },

    /// A named field has no name.
    #[error("field bound from {origin} needs a name in its form directive")]
    MissingFormName {
        /// Source of the field.
        origin: Source,
    },

    /// The field type has no string parser.
    #[error("no string parser for type {kind}")]
    NoParser {
        /// Name of the field type.
        kind: String,
    },

    /// The field type has no string writer.
    #[error("no string writer for type {kind}")]
    NoStringifier {
        /// Name of the field type.
        kind: String,
    },

    /// A request-derived source cannot fill the field type.
    #[error("field bound from {origin} cannot have type {kind}")]
    IncompatibleKind {
        /// Source of the field.
        origin: Source,
        /// Name of the field type.
        kind: String,
    },

    /// Two fields share a name within one source.
    #[error("{origin} name {name:?} is already bound")]
    DuplicateName {
        /// Source both fields read from.
        origin: Source,
        /// The shared name.
        name: String,
    },
}

/// Modifiers parsed from a form directive.
#[derive(Debug, Default)]
struct FormDirective<'a> {
    name: Option<&'a str>,
    optional: bool,
    not_in_body: bool,
    json_only: bool,
    separator: Option<char>,
}

/// One compiled field.
pub struct FieldBinding<T> {
    path: String,
    name: String,
    source: Source,
    optional: bool,
    not_in_body: bool,
    json_only: bool,
    kind: ValueKind,
    parser: Option<Parser>,
    stringifier: Option<Stringifier>,
    assign: Option<Assign<T>>,
    read: Option<Read<T>>,
}

impl<T> FieldBinding<T> {
    /// Dotted path of the field from the record root.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bound name; empty for unnamed sources.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Where the field's value comes from.
    pub fn source(&self) -> Source {
        self.source
    }

    /// Whether an absent value is accepted.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// Whether the field is read from the query only.
    pub fn is_not_in_body(&self) -> bool {
        self.not_in_body
    }

    /// Whether the field is filled from JSON bodies only.
    pub fn is_json_only(&self) -> bool {
        self.json_only
    }

    /// Value kind of the field type.
    pub fn kind(&self) -> &ValueKind {
        &self.kind
    }

    pub(crate) fn parse(&self, raw: &str) -> Result<Value, FieldError> {
        let Some(parser) = &self.parser else {
            contract::violation(format!("field {} has no string parser", self.path));
        };
        parser(raw).map_err(|e| FieldError::new(&self.name, e))
    }

    /// Stores a value; a value that does not fit the field is a contract violation.
    pub(crate) fn assign(&self, record: &mut T, value: Value) {
        let found = value.describe();
        let assigned = self
            .assign
            .as_ref()
            .is_some_and(|assign| assign(record, value));
        if !assigned {
            contract::violation(format!(
                "cannot assign a {found} value to field {} of type {}",
                self.path, self.kind
            ));
        }
    }

    pub(crate) fn assign_text(&self, record: &mut T, raw: &str) -> Result<(), FieldError> {
        let value = self.parse(raw)?;
        self.assign(record, value);
        Ok(())
    }

    /// Assigns every value of a repeated key.
    ///
    /// Sequences collect the items of all values; scalars keep the last.
    pub(crate) fn assign_all(&self, record: &mut T, raws: &[String]) -> Result<(), FieldError> {
        if self.kind.is_seq() {
            let mut items = Vec::new();
            for raw in raws {
                match self.parse(raw)? {
                    Value::Seq(mut part) => items.append(&mut part),
                    other => items.push(other),
                }
            }
            self.assign(record, Value::Seq(items));
        } else {
            for raw in raws {
                self.assign_text(record, raw)?;
            }
        }
        Ok(())
    }

    pub(crate) fn stringify(&self, record: &T) -> String {
        let (Some(read), Some(stringifier)) = (&self.read, &self.stringifier) else {
            contract::violation(format!("field {} has no string writer", self.path));
        };
        match stringifier(&read(record)) {
            Ok(text) => text,
            Err(err) => contract::violation(format!("failed to encode field {}: {err}", self.path)),
        }
    }
}

impl<T> fmt::Debug for FieldBinding<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldBinding")
            .field("path", &self.path)
            .field("name", &self.name)
            .field("source", &self.source)
            .field("optional", &self.optional)
            .field("not_in_body", &self.not_in_body)
            .field("json_only", &self.json_only)
            .field("kind", &format_args!("{}", self.kind))
            .finish_non_exhaustive()
    }
}

/// Failure to apply a JSON document to a record.
#[derive(Debug, Error)]
pub enum JsonBindError {
    /// Object key that matches no field, while unknown keys are rejected
    #[error("json: unknown field {0:?}")]
    UnknownField(String),

    /// Document is neither an object nor null
    #[error("json: cannot decode {found} into {record}")]
    NotAnObject {
        /// JSON type of the document
        found: &'static str,
        /// Type name of the record
        record: &'static str,
    },

    /// Value that does not deserialize into its field
    #[error("json: field {key:?}: {source}")]
    Field {
        /// Object key of the value
        key: String,
        /// Deserialization failure
        source: serde_json::Error,
    },
}

/// Compiled binding description of a record type.
pub struct Schema<T> {
    record: &'static str,
    named: IndexMap<(Source, String), FieldBinding<T>>,
    unnamed: Vec<FieldBinding<T>>,
    json_fields: Vec<(String, JsonSetter<T>)>,
    has_raw_body: bool,
    has_full_body: bool,
    has_body_form: bool,
}

impl<T: Bindable> Schema<T> {
    /// Compiles the schema of `T` under a configuration.
    pub fn compile(config: &BinderConfig) -> Result<Self, SchemaError> {
        let mut schema = Self {
            record: type_name::<T>(),
            named: IndexMap::new(),
            unnamed: Vec::new(),
            json_fields: Vec::new(),
            has_raw_body: false,
            has_full_body: false,
            has_body_form: false,
        };
        for field in T::fields() {
            schema.add_field(field, config)?;
        }

        schema.has_raw_body = schema
            .unnamed
            .iter()
            .any(|f| f.source == Source::RawBody);
        schema.has_full_body = schema
            .unnamed
            .iter()
            .any(|f| f.source == Source::FullBody);
        schema.has_body_form = schema
            .named
            .values()
            .any(|f| f.source == Source::Form && !f.not_in_body);

        debug!(
            record = schema.record,
            named = schema.named.len(),
            unnamed = schema.unnamed.len(),
            raw_body = schema.has_raw_body,
            full_body = schema.has_full_body,
            body_form = schema.has_body_form,
            "compiled binding schema"
        );
        Ok(schema)
    }

    fn add_field(&mut self, field: FieldDescriptor<T>, config: &BinderConfig) -> Result<(), SchemaError> {
        let FieldDescriptor {
            path,
            exported,
            json,
            form,
            access,
        } = field;
        if !exported {
            return Ok(());
        }
        let FieldAccess {
            kind,
            assign,
            read,
            json: json_setter,
        } = access;

        let record = self.record;
        let fail = |kind: SchemaErrorKind| SchemaError {
            record,
            field: path.clone(),
            kind,
        };

        let json_name = json.map(|tag| tag.split(',').next().unwrap_or_default());
        let json_skipped = json_name == Some("-");
        let json_named = json_name.filter(|name| !name.is_empty() && *name != "-");
        let json_target = json_named.zip(json_setter);

        let mut source = Source::implicit(&kind);
        let mut directive = FormDirective::default();
        if let Some(tag) = form {
            let mut parts = tag.split(',');
            let name = parts.next().unwrap_or_default();
            if name == "-" {
                // Opted out of form binding; JSON bodies still reach it.
                if let Some((name, setter)) = json_target {
                    self.json_fields.push((name.to_owned(), setter));
                }
                return Ok(());
            }
            directive.name = Some(name).filter(|n| !n.is_empty());

            for modifier in parts {
                let explicit = match modifier {
                    "path" => Some(Source::Path),
                    "cookie" => Some(Source::Cookie),
                    "header" => Some(Source::Header),
                    "method" => Some(Source::Method),
                    "issave" => Some(Source::IsWrite),
                    "rawbody" => Some(Source::RawBody),
                    "fullbody" => Some(Source::FullBody),
                    "notinbody" => {
                        directive.not_in_body = true;
                        None
                    }
                    "jsononly" => {
                        directive.json_only = true;
                        None
                    }
                    "optional" => {
                        directive.optional = true;
                        None
                    }
                    "sep=comma" => {
                        directive.separator = Some(',');
                        None
                    }
                    "sep=semicolon" => {
                        directive.separator = Some(';');
                        None
                    }
                    "sep=colon" => {
                        directive.separator = Some(':');
                        None
                    }
                    other => {
                        return Err(fail(SchemaErrorKind::UnknownModifier {
                            modifier: other.to_owned(),
                            tag: tag.to_owned(),
                        }))
                    }
                };
                if let Some(second) = explicit {
                    if let Some(first) = source {
                        return Err(fail(SchemaErrorKind::ConflictingSource {
                            tag: tag.to_owned(),
                            first,
                            second,
                        }));
                    }
                    source = Some(second);
                }
            }
        }
        let source = source.unwrap_or(Source::Form);

        if json.is_none() && form.is_none() && source.is_named() {
            return Err(fail(SchemaErrorKind::MissingAnnotation));
        }
        if config.allow_json && source != Source::Form && !json_skipped {
            return Err(fail(SchemaErrorKind::JsonNotSkipped { origin: source }));
        }

        let name = if !source.is_named() {
            if let Some(name) = directive.name {
                return Err(fail(SchemaErrorKind::UnnamedWithName {
                    origin: source,
                    name: name.to_owned(),
                }));
            }
            if !source.accepts(&kind) {
                return Err(fail(SchemaErrorKind::IncompatibleKind {
                    origin: source,
                    kind: kind.to_string(),
                }));
            }
            ""
        } else if source == Source::Form && config.allow_json {
            let Some(json_name) = json_named else {
                return Err(fail(SchemaErrorKind::MissingJsonName));
            };
            if let Some(form_name) = directive.name {
                if form_name != json_name {
                    return Err(fail(SchemaErrorKind::NameMismatch {
                        form: form_name.to_owned(),
                        json: json_name.to_owned(),
                    }));
                }
            }
            json_name
        } else {
            directive
                .name
                .ok_or_else(|| fail(SchemaErrorKind::MissingFormName { origin: source }))?
        };

        let (parser, stringifier) = if source.is_named() && !directive.json_only {
            let opts = StringOptions {
                separator: directive.separator,
            };
            let parser = resolve_parser(&kind, opts).ok_or_else(|| {
                fail(SchemaErrorKind::NoParser {
                    kind: kind.to_string(),
                })
            })?;
            let stringifier = resolve_stringifier(&kind, opts).ok_or_else(|| {
                fail(SchemaErrorKind::NoStringifier {
                    kind: kind.to_string(),
                })
            })?;
            (Some(parser), Some(stringifier))
        } else {
            (None, None)
        };

        if source.is_named() && self.named.contains_key(&(source, name.to_owned())) {
            return Err(fail(SchemaErrorKind::DuplicateName {
                origin: source,
                name: name.to_owned(),
            }));
        }

        if source == Source::Form {
            if let Some((json_name, setter)) = json_target {
                self.json_fields.push((json_name.to_owned(), setter));
            }
        }

        let binding = FieldBinding {
            path,
            name: name.to_owned(),
            source,
            optional: directive.optional,
            not_in_body: directive.not_in_body,
            json_only: directive.json_only,
            kind,
            parser,
            stringifier,
            assign,
            read,
        };
        if source.is_named() {
            self.named.insert((source, binding.name.clone()), binding);
        } else {
            self.unnamed.push(binding);
        }
        Ok(())
    }
}

impl<T> Schema<T> {
    /// Type name of the record.
    pub fn record(&self) -> &'static str {
        self.record
    }

    /// Looks up a named field.
    pub fn named_field(&self, source: Source, name: &str) -> Option<&FieldBinding<T>> {
        self.named.get(&(source, name.to_owned()))
    }

    /// Named fields in declaration order.
    pub fn named_fields(&self) -> impl Iterator<Item = &FieldBinding<T>> {
        self.named.values()
    }

    /// Unnamed fields in declaration order.
    pub fn unnamed_fields(&self) -> &[FieldBinding<T>] {
        &self.unnamed
    }

    /// Whether a field takes the unparsed body.
    pub fn has_raw_body(&self) -> bool {
        self.has_raw_body
    }

    /// Whether a field takes the JSON body as a generic value.
    pub fn has_full_body(&self) -> bool {
        self.has_full_body
    }

    /// Whether any form field can be filled from a JSON body.
    pub fn has_body_form(&self) -> bool {
        self.has_body_form
    }

    /// Whether decoding must capture the body bytes before parsing them.
    pub fn needs_raw_body(&self) -> bool {
        self.has_raw_body || (self.has_body_form && self.has_full_body)
    }

    fn json_field(&self, key: &str) -> Option<&JsonSetter<T>> {
        self.json_fields
            .iter()
            .find(|(name, _)| name == key)
            .or_else(|| {
                self.json_fields
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(key))
            })
            .map(|(_, setter)| setter)
    }

    /// Applies a JSON document to the record's JSON-named fields.
    pub(crate) fn apply_json(
        &self,
        record: &mut T,
        document: JsonValue,
        reject_unknown: bool,
    ) -> Result<(), JsonBindError> {
        let object = match document {
            JsonValue::Null => return Ok(()),
            JsonValue::Object(object) => object,
            other => {
                return Err(JsonBindError::NotAnObject {
                    found: json_type(&other),
                    record: self.record,
                })
            }
        };
        for (key, value) in object {
            match self.json_field(&key) {
                Some(setter) => {
                    setter(record, value).map_err(|source| JsonBindError::Field { key, source })?;
                }
                None if reject_unknown => return Err(JsonBindError::UnknownField(key)),
                None => {}
            }
        }
        Ok(())
    }
}

fn json_type(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("record", &self.record)
            .field("named", &self.named.values().collect::<Vec<_>>())
            .field("unnamed", &self.unnamed)
            .field("has_raw_body", &self.has_raw_body)
            .field("has_full_body", &self.has_full_body)
            .field("has_body_form", &self.has_body_form)
            .finish_non_exhaustive()
    }
}
