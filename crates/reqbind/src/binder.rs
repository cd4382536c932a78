//! The binder: a configuration paired with its schema cache.

use std::sync::{Arc, OnceLock};

use crate::cache::SchemaCache;
use crate::config::BinderConfig;
use crate::contract;
use crate::schema::{Bindable, Schema, SchemaError};

/// Decodes requests into records and encodes records into queries and paths.
///
/// A binder compiles each record type's schema once, on first use, and
/// reuses it for every later call. Schemas depend on the configuration, so
/// cloning a binder keeps the configuration but starts an empty cache.
///
/// # Example
///
/// ```rust
/// use reqbind::{Bind, Binder, NoPathParams, Request};
///
/// #[derive(Bind, Default)]
/// struct Search {
///     #[json = "q"]
///     pub query: String,
///     #[json = "page"]
///     pub page: u32,
/// }
///
/// # tokio_test_block(async {
/// let binder = Binder::default();
/// let mut request = Request::builder().uri("/search?q=rust&page=2").build().unwrap();
/// let mut search = Search::default();
///
/// binder.decode(&mut request, &NoPathParams, &mut search).await.unwrap();
/// assert_eq!(search.query, "rust");
/// assert_eq!(search.page, 2);
///
/// assert_eq!(binder.to_query(&search).to_query_string(), "q=rust&page=2");
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Debug)]
pub struct Binder {
    pub(crate) config: BinderConfig,
    cache: SchemaCache,
}

impl Binder {
    /// Creates a binder with an empty schema cache.
    pub fn new(config: BinderConfig) -> Self {
        Self {
            config,
            cache: SchemaCache::new(),
        }
    }

    /// Process-wide binder with the default configuration.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<Binder> = OnceLock::new();
        GLOBAL.get_or_init(Self::default)
    }

    /// A binder with this policy that rejects unknown JSON fields.
    pub fn strict(&self) -> Self {
        Self::new(self.config.clone().into_strict())
    }

    /// The binding policy.
    pub fn config(&self) -> &BinderConfig {
        &self.config
    }

    /// Returns the schema of `T`, compiling and caching it on first use.
    ///
    /// Call this at startup to surface misannotated records early.
    pub fn try_schema<T: Bindable>(&self) -> Result<Arc<Schema<T>>, SchemaError> {
        self.cache.get_or_compile::<T>(&self.config)
    }

    /// Returns the schema of `T`.
    ///
    /// # Panics
    ///
    /// Panics with a contract violation if `T` is misannotated.
    pub fn schema<T: Bindable>(&self) -> Arc<Schema<T>> {
        match self.try_schema::<T>() {
            Ok(schema) => schema,
            Err(err) => contract::violation(err),
        }
    }

    /// Number of record types compiled by this binder.
    pub fn cached_schemas(&self) -> usize {
        self.cache.len()
    }
}

impl Default for Binder {
    fn default() -> Self {
        Self::new(BinderConfig::default())
    }
}

impl Clone for Binder {
    fn clone(&self) -> Self {
        Self::new(self.config.clone())
    }
}
