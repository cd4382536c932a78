//! Request cookies.

use http::{header, HeaderMap};
use std::collections::HashMap;

/// Cookies sent with a request.
///
/// Parsed from every `Cookie` header. When a name repeats, the last
/// occurrence wins. Headers that are not visible ASCII are ignored.
///
/// # Example
///
/// ```rust
/// use reqbind::Cookies;
/// use http::HeaderMap;
///
/// let mut headers = HeaderMap::new();
/// headers.insert("cookie", "session=abc123; theme=\"dark\"".parse().unwrap());
///
/// let cookies = Cookies::from_headers(&headers);
/// assert_eq!(cookies.get("session"), Some("abc123"));
/// assert_eq!(cookies.get("theme"), Some("dark"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct Cookies {
    cookies: HashMap<String, String>,
}

impl Cookies {
    /// Creates an empty jar.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses all `Cookie` headers. A repeated name keeps its last value.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let mut cookies = Self::new();
        for value in headers.get_all(header::COOKIE) {
            if let Ok(value) = value.to_str() {
                cookies.parse_header(value);
            }
        }
        cookies
    }

    fn parse_header(&mut self, header_value: &str) {
        for cookie in header_value.split(';') {
            let cookie = cookie.trim();
            if let Some((name, value)) = cookie.split_once('=') {
                let name = name.trim();
                if name.is_empty() {
                    continue;
                }
                let value = value.trim().trim_matches('"');
                self.cookies.insert(name.to_owned(), value.to_owned());
            }
        }
    }

    /// Returns a cookie value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies.get(name).map(String::as_str)
    }

    /// Returns `true` if a cookie with this name was sent.
    pub fn contains(&self, name: &str) -> bool {
        self.cookies.contains_key(name)
    }

    /// Iterates `(name, value)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of distinct cookie names.
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns `true` if no cookies were sent.
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}
