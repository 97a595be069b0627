//! Compiled-model cache
//!
//! Entries are keyed by [`ModelKey`] and never mutated once inserted, so
//! readers only take the shared lock. Two threads compiling the same missing
//! key may both do the work; the first insert wins and both artifacts are
//! equal anyway.
//!
//! ```text
//! use sigmatics_compiler::{ModelCache, ModelDescriptor};
//!
//! let cache = ModelCache::new();
//! let model = cache.get_or_compile(&descriptor, Some(schema_text))?;
//! let outcome = model.run(&params)?;
//! ```

use crate::config::CompileOptions;
use crate::error::Result;
use crate::model::{compile_model_with, model_key, model_key_with, CompiledModel, ModelDescriptor, ModelKey};
use parking_lot::RwLock;
use sigmatics_tracing::perf_event;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Hit/miss counters and current size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
}

/// Thread-safe cache of compiled models
#[derive(Debug, Default)]
pub struct ModelCache {
    entries: RwLock<HashMap<ModelKey, Arc<CompiledModel>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl ModelCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a model, counting the hit or miss
    pub fn get(&self, key: &ModelKey) -> Option<Arc<CompiledModel>> {
        let found = self.entries.read().get(key).map(Arc::clone);
        match found {
            Some(_) => self.hits.fetch_add(1, Ordering::Relaxed),
            None => self.misses.fetch_add(1, Ordering::Relaxed),
        };
        found
    }

    /// Insert a model; an existing entry for the key is kept and returned
    pub fn insert(&self, key: ModelKey, model: CompiledModel) -> Arc<CompiledModel> {
        let mut entries = self.entries.write();
        Arc::clone(entries.entry(key).or_insert_with(|| Arc::new(model)))
    }

    pub fn contains(&self, key: &ModelKey) -> bool {
        self.entries.read().contains_key(key)
    }

    pub fn remove(&self, key: &ModelKey) -> Option<Arc<CompiledModel>> {
        self.entries.write().remove(key)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        self.entries.write().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            entries: self.len(),
        }
    }

    /// Cached model for the descriptor, compiling it on a miss
    pub fn get_or_compile(&self, descriptor: &ModelDescriptor, schema: Option<&str>) -> Result<Arc<CompiledModel>> {
        self.get_or_compile_with(descriptor, schema, &CompileOptions::default())
    }

    pub fn get_or_compile_with(
        &self,
        descriptor: &ModelDescriptor,
        schema: Option<&str>,
        options: &CompileOptions,
    ) -> Result<Arc<CompiledModel>> {
        let key = model_key_with(descriptor, schema, options);
        if let Some(model) = self.get(&key) {
            perf_event!("model_cache_hit", hits = self.hits.load(Ordering::Relaxed));
            return Ok(model);
        }

        // compile outside the lock
        let model = compile_model_with(descriptor, options)?;
        tracing::debug!(%key, "model cache insert");
        Ok(self.insert(key, model))
    }
}
