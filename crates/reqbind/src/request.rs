//! The inbound request seen by the decoder.
//!
//! A [`Request`] is a [`RequestHead`] plus a [`Body`]. The body may be a
//! live stream; the decoder reads it at most once and, when a schema needs
//! the raw bytes, replaces it with a re-readable buffered view.

use bytes::{Bytes, BytesMut};
use futures_util::{future, stream, Stream, StreamExt};
use http::header::{HeaderName, HeaderValue, CONTENT_TYPE};
use http::{HeaderMap, Method, Uri};
use std::fmt;
use std::pin::Pin;

use crate::cookie::Cookies;
use crate::error::{BindError, BoxError};

/// A boxed stream of body chunks.
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes, BoxError>> + Send>>;

/// A request body.
#[derive(Default)]
pub enum Body {
    /// No body
    #[default]
    Empty,
    /// Fully buffered body
    Full(Bytes),
    /// Body still arriving from the transport
    Stream(BodyStream),
}

impl Body {
    /// Creates an empty body.
    pub fn empty() -> Self {
        Self::Empty
    }

    /// Wraps a stream of chunks.
    pub fn from_stream<S, E>(chunks: S) -> Self
    where
        S: Stream<Item = Result<Bytes, E>> + Send + 'static,
        E: Into<BoxError> + 'static,
    {
        Self::Stream(Box::pin(chunks.map(|chunk| chunk.map_err(Into::into))))
    }

    /// Reads the whole body into memory.
    pub async fn collect(self) -> Result<Bytes, BoxError> {
        match self {
            Self::Empty => Ok(Bytes::new()),
            Self::Full(bytes) => Ok(bytes),
            Self::Stream(mut chunks) => {
                let mut buf = BytesMut::new();
                while let Some(chunk) = chunks.next().await {
                    buf.extend_from_slice(&chunk?);
                }
                Ok(buf.freeze())
            }
        }
    }

    pub(crate) fn into_stream(self) -> BodyStream {
        match self {
            Self::Empty => Box::pin(stream::empty()),
            Self::Full(bytes) => Box::pin(stream::once(future::ready(Ok(bytes)))),
            Self::Stream(chunks) => chunks,
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => f.write_str("Body::Empty"),
            Self::Full(bytes) => write!(f, "Body::Full({} bytes)", bytes.len()),
            Self::Stream(_) => f.write_str("Body::Stream(..)"),
        }
    }
}

impl From<()> for Body {
    fn from((): ()) -> Self {
        Self::Empty
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Self::Full(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Full(Bytes::from(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Self::Full(Bytes::from(text))
    }
}

impl From<&'static str> for Body {
    fn from(text: &'static str) -> Self {
        Self::Full(Bytes::from_static(text.as_bytes()))
    }
}

/// Method, URI and headers of a request.
#[derive(Debug, Clone)]
pub struct RequestHead {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
}

impl RequestHead {
    /// Creates a head from its parts.
    pub fn new(method: Method, uri: Uri, headers: HeaderMap) -> Self {
        Self {
            method,
            uri,
            headers,
        }
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the raw query string, if any.
    pub fn query_string(&self) -> Option<&str> {
        self.uri.query()
    }

    /// Returns a header value as text, if present and visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns `true` for POST, PUT and PATCH.
    pub fn is_write(&self) -> bool {
        matches!(self.method, Method::POST | Method::PUT | Method::PATCH)
    }

    /// Returns `true` for methods whose body is never read.
    pub fn is_bodiless(&self) -> bool {
        matches!(self.method, Method::GET | Method::HEAD)
    }
}

impl Default for RequestHead {
    fn default() -> Self {
        Self::new(Method::GET, Uri::default(), HeaderMap::new())
    }
}

/// An inbound request.
///
/// # Example
///
/// ```rust
/// use reqbind::Request;
/// use http::Method;
///
/// let request = Request::builder()
///     .method(Method::POST)
///     .uri("/users?active=true")
///     .header("content-type", "application/json")
///     .body(r#"{"name":"Alice"}"#)
///     .build()
///     .unwrap();
///
/// assert_eq!(request.head().query_string(), Some("active=true"));
/// assert!(request.head().is_write());
/// ```
#[derive(Debug, Default)]
pub struct Request {
    head: RequestHead,
    body: Body,
}

impl Request {
    /// Creates a request from a head and a body.
    pub fn new(head: RequestHead, body: impl Into<Body>) -> Self {
        Self {
            head,
            body: body.into(),
        }
    }

    /// Starts a [`RequestBuilder`].
    pub fn builder() -> RequestBuilder {
        RequestBuilder::new()
    }

    /// Method, URI and headers.
    pub fn head(&self) -> &RequestHead {
        &self.head
    }

    /// Request method.
    pub fn method(&self) -> &Method {
        &self.head.method
    }

    /// Request URI.
    pub fn uri(&self) -> &Uri {
        &self.head.uri
    }

    /// Request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.head.headers
    }

    /// Mutable request headers.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.head.headers
    }

    /// The body in its current state.
    pub fn body(&self) -> &Body {
        &self.body
    }

    /// Parses the request cookies.
    pub fn cookies(&self) -> Cookies {
        Cookies::from_headers(&self.head.headers)
    }

    /// Takes the body, leaving it empty.
    pub fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    /// Reads the whole body and keeps a re-readable copy in its place.
    pub async fn buffer_body(&mut self) -> Result<Bytes, BindError> {
        let bytes = self.read_body().await?;
        self.body = Body::Full(bytes.clone());
        Ok(bytes)
    }

    /// Reads and consumes the whole body.
    pub(crate) async fn read_body(&mut self) -> Result<Bytes, BindError> {
        self.take_body()
            .collect()
            .await
            .map_err(|e| BindError::malformed("request body", e))
    }
}

impl<B: Into<Body>> From<http::Request<B>> for Request {
    fn from(request: http::Request<B>) -> Self {
        let (parts, body) = request.into_parts();
        Self {
            head: RequestHead::new(parts.method, parts.uri, parts.headers),
            body: body.into(),
        }
    }
}

/// Builder for [`Request`].
///
/// The first invalid URI, header name or header value is kept and
/// reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct RequestBuilder {
    head: RequestHead,
    body: Body,
    error: Option<http::Error>,
}

impl RequestBuilder {
    /// Creates a builder for a bodiless `GET /`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the method. Defaults to GET.
    pub fn method(mut self, method: Method) -> Self {
        self.head.method = method;
        self
    }

    /// Sets the URI. Defaults to `/`.
    pub fn uri(mut self, uri: &str) -> Self {
        match uri.parse::<Uri>() {
            Ok(uri) => self.head.uri = uri,
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Appends a header.
    pub fn header(self, name: &str, value: &str) -> Self {
        self.header_bytes(name, value.as_bytes())
    }

    /// Appends a header with a raw byte value.
    pub fn header_bytes(mut self, name: &str, value: &[u8]) -> Self {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(name) => name,
            Err(e) => {
                self.fail(e.into());
                return self;
            }
        };
        match HeaderValue::from_bytes(value) {
            Ok(value) => {
                self.head.headers.append(name, value);
            }
            Err(e) => self.fail(e.into()),
        }
        self
    }

    /// Sets the body. Defaults to empty.
    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = body.into();
        self
    }

    /// Finishes the request.
    ///
    /// # Errors
    ///
    /// Returns the first invalid URI, header name or header value passed to
    /// the builder.
    pub fn build(self) -> Result<Request, http::Error> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Request {
            head: self.head,
            body: self.body,
        })
    }

    fn fail(&mut self, err: http::Error) {
        if self.error.is_none() {
            self.error = Some(err);
        }
    }
}

/// Body format named by a request's `Content-Type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentFamily {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    UrlEncoded,
    /// `multipart/form-data`
    Multipart,
    /// Any other media type
    Other,
}

impl ContentFamily {
    /// Classifies the `Content-Type` header, ignoring parameters.
    ///
    /// Returns `None` when the header is absent, empty or unparsable.
    pub fn detect(headers: &HeaderMap) -> Option<Self> {
        let value = headers.get(CONTENT_TYPE)?.to_str().ok()?;
        if value.trim().is_empty() {
            return None;
        }
        let media: mime::Mime = value.parse().ok()?;
        Some(match media.essence_str() {
            "application/json" => Self::Json,
            "application/x-www-form-urlencoded" => Self::UrlEncoded,
            "multipart/form-data" => Self::Multipart,
            _ => Self::Other,
        })
    }
}
