//! Path parameter sources.
//!
//! The decoder reads path-sourced fields through [`PathParams`], so any
//! router's capture storage can feed it. [`Params`] is a small-vector
//! implementation for routers that have none of their own.

use smallvec::SmallVec;
use std::collections::{BTreeMap, HashMap};

const INLINE_PARAMS: usize = 4;

/// Lookup capability over the path parameters captured by a router.
pub trait PathParams {
    /// Returns the value captured for `name`.
    fn get(&self, name: &str) -> Option<&str>;

    /// Returns every captured name, for diagnostics.
    fn keys(&self) -> Vec<&str>;
}

/// Path parameter source for requests that were not routed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPathParams;

impl PathParams for NoPathParams {
    fn get(&self, _name: &str) -> Option<&str> {
        None
    }

    fn keys(&self) -> Vec<&str> {
        Vec::new()
    }
}

/// Path parameters in capture order.
///
/// Stores up to four parameters inline.
///
/// # Example
///
/// ```rust
/// use reqbind::{Params, PathParams};
///
/// let mut params = Params::new();
/// params.push("id", "123");
///
/// assert_eq!(PathParams::get(&params, "id"), Some("123"));
/// assert_eq!(params.keys(), ["id"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Params {
    inner: SmallVec<[(String, String); INLINE_PARAMS]>,
}

impl Params {
    /// Creates an empty parameter list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a parameter in route order.
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.inner.push((name.into(), value.into()));
    }

    /// Returns `true` if the route captured nothing.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Number of captured parameters.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates `(name, value)` pairs in route order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl PathParams for Params {
    fn get(&self, name: &str) -> Option<&str> {
        self.inner
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn keys(&self) -> Vec<&str> {
        self.inner.iter().map(|(n, _)| n.as_str()).collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: iter
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

impl<S: std::hash::BuildHasher> PathParams for HashMap<String, String, S> {
    fn get(&self, name: &str) -> Option<&str> {
        HashMap::get(self, name).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = HashMap::keys(self).map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}

impl PathParams for BTreeMap<String, String> {
    fn get(&self, name: &str) -> Option<&str> {
        BTreeMap::get(self, name).map(String::as_str)
    }

    fn keys(&self) -> Vec<&str> {
        BTreeMap::keys(self).map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_push_and_get() {
        let mut params = Params::new();
        params.push("id", "123");
        params.push("name", "alice");

        assert_eq!(PathParams::get(&params, "id"), Some("123"));
        assert_eq!(PathParams::get(&params, "name"), Some("alice"));
        assert_eq!(PathParams::get(&params, "unknown"), None);
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_params_keys_in_capture_order() {
        let params: Params = [("b", "2"), ("a", "1")].into_iter().collect();
        assert_eq!(params.keys(), ["b", "a"]);
        let pairs: Vec<_> = params.iter().collect();
        assert_eq!(pairs, vec![("b", "2"), ("a", "1")]);
    }

    #[test]
    fn test_hash_map_keys_sorted() {
        let map: HashMap<String, String> = [("z", "1"), ("a", "2")]
            .into_iter()
            .map(|(k, v)| (k.to_owned(), v.to_owned()))
            .collect();
        assert_eq!(PathParams::get(&map, "z"), Some("1"));
        assert_eq!(PathParams::keys(&map), ["a", "z"]);
    }

    #[test]
    fn test_no_path_params() {
        assert_eq!(NoPathParams.get("id"), None);
        assert!(NoPathParams.keys().is_empty());
    }
}
