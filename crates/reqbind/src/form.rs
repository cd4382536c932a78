//! Form values: the query/form string multimap.
//!
//! [`FormValues`] is both the merged input of the form phase and the output
//! of query encoding. Insertion order of keys is preserved.

use bytes::Bytes;
use http::Uri;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::BindError;
use crate::request::Body;

/// Ordered multimap of form or query values.
///
/// # Example
///
/// ```rust
/// use reqbind::FormValues;
///
/// let values = FormValues::parse("tag=a&tag=b&page=2").unwrap();
/// assert_eq!(values.get("page"), Some("2"));
/// assert_eq!(values.get_all("tag"), ["a", "b"]);
/// assert_eq!(values.to_query_string(), "tag=a&tag=b&page=2");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormValues {
    inner: IndexMap<String, Vec<String>>,
}

impl FormValues {
    /// Creates an empty multimap.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses URL-encoded `key=value` pairs.
    pub fn parse(input: &str) -> Result<Self, serde_urlencoded::de::Error> {
        Self::parse_bytes(input.as_bytes())
    }

    /// Parses URL-encoded `key=value` pairs from raw bytes.
    pub fn parse_bytes(input: &[u8]) -> Result<Self, serde_urlencoded::de::Error> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_bytes(input)?;
        Ok(pairs.into_iter().collect())
    }

    /// Parses the query string of a URI; a URI without one is empty.
    pub fn from_query(uri: &Uri) -> Result<Self, serde_urlencoded::de::Error> {
        uri.query().map_or_else(|| Ok(Self::new()), Self::parse)
    }

    /// Returns the first value for a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.inner
            .get(key)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Returns every value for a key, in insertion order.
    pub fn get_all(&self, key: &str) -> &[String] {
        self.inner.get(key).map_or(&[], Vec::as_slice)
    }

    /// Replaces all values of a key with one value.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.insert(key.into(), vec![value.into()]);
    }

    /// Adds a value to a key.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.inner.entry(key.into()).or_default().push(value.into());
    }

    /// Removes a key, returning its values.
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.inner.shift_remove(key)
    }

    /// Returns `true` if the key is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.inner.contains_key(key)
    }

    /// Number of distinct keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Returns `true` if there are no keys.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Iterates keys with all their values.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.inner
            .iter()
            .map(|(key, values)| (key.as_str(), values.as_slice()))
    }

    /// Iterates every `(key, value)` pair.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().flat_map(|(key, values)| {
            values
                .iter()
                .map(move |value| (key.as_str(), value.as_str()))
        })
    }

    /// Appends every value of `other` after the existing ones.
    pub fn merge(&mut self, other: Self) {
        for (key, values) in other.inner {
            self.inner.entry(key).or_default().extend(values);
        }
    }

    /// Renders the pairs as a URL-encoded query string.
    pub fn to_query_string(&self) -> String {
        let pairs: Vec<(&str, &str)> = self.pairs().collect();
        // A sequence of string pairs always serializes.
        serde_urlencoded::to_string(pairs).unwrap_or_default()
    }
}

impl FromIterator<(String, String)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        let mut values = Self::new();
        values.extend(iter);
        values
    }
}

impl Extend<(String, String)> for FormValues {
    fn extend<I: IntoIterator<Item = (String, String)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.append(key, value);
        }
    }
}

/// Parses the query string of a request URI.
pub(crate) fn query_values(uri: &Uri) -> Result<FormValues, BindError> {
    FormValues::from_query(uri).map_err(|e| BindError::malformed("query string", e))
}

/// Parses a URL-encoded body, followed by the query string.
pub(crate) fn parse_urlencoded(body: &Bytes, uri: &Uri) -> Result<FormValues, BindError> {
    let mut values =
        FormValues::parse_bytes(body).map_err(|e| BindError::malformed("form body", e))?;
    values.merge(query_values(uri)?);
    Ok(values)
}

/// Parses a multipart body, followed by the query string.
///
/// Text parts are buffered up to `max_memory` bytes in total. File parts
/// are skipped without being read into memory.
pub(crate) async fn parse_multipart(
    body: Body,
    content_type: &str,
    uri: &Uri,
    max_memory: usize,
) -> Result<FormValues, BindError> {
    let boundary = multer::parse_boundary(content_type)
        .map_err(|e| BindError::malformed("multipart form", e))?;
    let mut multipart = multer::Multipart::new(body.into_stream(), boundary);

    let mut values = FormValues::new();
    let mut buffered = 0usize;
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| BindError::malformed("multipart form", e))?
    {
        if field.file_name().is_some() {
            continue;
        }
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };

        let mut data = Vec::new();
        while let Some(chunk) = field
            .chunk()
            .await
            .map_err(|e| BindError::malformed("multipart form", e))?
        {
            buffered += chunk.len();
            if buffered > max_memory {
                return Err(BindError::bad_request(format!(
                    "multipart form exceeds {max_memory} bytes of in-memory values"
                )));
            }
            data.extend_from_slice(&chunk);
        }
        let text =
            String::from_utf8(data).map_err(|e| BindError::malformed("multipart form", e))?;
        values.append(name, text);
    }

    values.merge(query_values(uri)?);
    Ok(values)
}
