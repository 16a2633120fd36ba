//! In-memory cache of compiled posts.
//!
//! Markup compilation (and code highlighting in particular) is the expensive
//! step of serving a page. This module lets the post compiler skip it when a
//! post's source and the plugin configuration haven't changed since the last
//! compile.
//!
//! ## Cache keys
//!
//! The cache is **content-addressed**: a key is the slug plus
//!
//! - **`source_hash`**: SHA-256 of the post's source text.
//! - **`params_hash`**: SHA-256 of the [`PluginConfig`] (front-matter switch,
//!   theme pair, component allow-list). Changing any of them recompiles.
//!
//! Inserting a key for a slug drops every other key of that slug, so an
//! edited post never leaves its old compilation behind.
//!
//! ## Concurrency
//!
//! Each key owns an `Arc<OnceLock<…>>`. The map lock is held only to find or
//! create the slot; the compile runs outside it. Concurrent requests for the
//! same key block on the slot and receive the first request's outcome, so a
//! given key is compiled at most once. Errors are cached like successes.

use crate::error::PostError;
use crate::markup::PluginConfig;
use crate::types::CompiledPost;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

pub type CompileOutcome = Result<CompiledPost, PostError>;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub slug: String,
    pub source_hash: String,
    pub params_hash: String,
}

impl CacheKey {
    pub fn new(slug: &str, source: &str, params_hash: &str) -> Self {
        Self {
            slug: slug.to_string(),
            source_hash: hash_source(source),
            params_hash: params_hash.to_string(),
        }
    }
}

type Slot = Arc<OnceLock<CompileOutcome>>;

#[derive(Debug, Default)]
pub struct CompileCache {
    entries: Mutex<HashMap<CacheKey, Slot>>,
    hits: AtomicU32,
    misses: AtomicU32,
}

impl CompileCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the outcome cached under `key`, running `compile` if there is
    /// none yet.
    pub fn get_or_compile<F>(&self, key: CacheKey, compile: F) -> CompileOutcome
    where
        F: FnOnce() -> CompileOutcome,
    {
        let slot = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                Some(slot) => Arc::clone(slot),
                None => {
                    let before = entries.len();
                    entries.retain(|k, _| k.slug != key.slug);
                    if entries.len() < before {
                        log::debug!("dropped stale compilation of '{}'", key.slug);
                    }
                    let slot = Slot::default();
                    entries.insert(key, Arc::clone(&slot));
                    slot
                }
            }
        };

        let mut compiled_here = false;
        let outcome = slot.get_or_init(|| {
            compiled_here = true;
            compile()
        });
        if compiled_here {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        outcome.clone()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Number of cached keys.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// SHA-256 of a post's source text, as hex.
pub fn hash_source(source: &str) -> String {
    format!("{:x}", Sha256::digest(source.as_bytes()))
}

/// SHA-256 of the plugin configuration, as hex.
pub fn hash_plugins(plugins: &PluginConfig) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"plugins\0");
    hasher.update([u8::from(plugins.front_matter)]);
    hasher.update(plugins.highlight.dark.as_bytes());
    hasher.update(b"\0");
    hasher.update(plugins.highlight.light.as_bytes());
    hasher.update(b"\0");
    for component in &plugins.components {
        hasher.update(component.as_bytes());
        hasher.update(b"\0");
    }
    format!("{:x}", hasher.finalize())
}

/// Cache hit/miss counters since startup.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u32,
    pub misses: u32,
}

impl CacheStats {
    pub fn total(&self) -> u32 {
        self.hits + self.misses
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.hits > 0 {
            write!(
                f,
                "{} cached, {} compiled ({} total)",
                self.hits,
                self.misses,
                self.total()
            )
        } else {
            write!(f, "{} compiled", self.misses)
        }
    }
}
