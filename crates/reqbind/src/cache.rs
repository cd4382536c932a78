//! Per-binder cache of compiled schemas.

use dashmap::DashMap;
use std::any::{type_name, Any, TypeId};
use std::fmt;
use std::sync::Arc;
use tracing::trace;

use crate::config::BinderConfig;
use crate::contract;
use crate::schema::{Bindable, Schema, SchemaError};

type ErasedSchema = Arc<dyn Any + Send + Sync>;

/// Compiled schemas keyed by record type.
///
/// Concurrent first use of a type may compile it more than once; the first
/// stored schema is kept and every caller receives that one.
#[derive(Default)]
pub(crate) struct SchemaCache {
    schemas: DashMap<TypeId, ErasedSchema>,
}

impl SchemaCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn get_or_compile<T: Bindable>(
        &self,
        config: &BinderConfig,
    ) -> Result<Arc<Schema<T>>, SchemaError> {
        let key = TypeId::of::<T>();
        let cached = self.schemas.get(&key).map(|entry| Arc::clone(entry.value()));
        if let Some(schema) = cached {
            return Ok(downcast(schema));
        }

        // No shard lock is held while compiling.
        let compiled: ErasedSchema = Arc::new(Schema::<T>::compile(config)?);
        let stored = Arc::clone(self.schemas.entry(key).or_insert(compiled).value());
        trace!(record = type_name::<T>(), "cached binding schema");
        Ok(downcast(stored))
    }

    pub(crate) fn len(&self) -> usize {
        self.schemas.len()
    }
}

fn downcast<T: Bindable>(schema: ErasedSchema) -> Arc<Schema<T>> {
    match schema.downcast::<Schema<T>>() {
        Ok(schema) => schema,
        Err(_) => contract::violation(format!(
            "schema cache entry for {} holds another type",
            type_name::<T>()
        )),
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("schemas", &self.schemas.len())
            .finish()
    }
}
