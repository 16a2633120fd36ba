//! Post compilation: source text → [`CompiledPost`].
//!
//! For one slug the compiler looks the source up in the registry, hands it to
//! the [`MarkupCompiler`] with the configured plugins, and normalises the
//! extracted front-matter. Nothing is kept between calls unless a
//! [`CompileCache`] is attached.
//!
//! [`PostCompiler::compile_all`] fans out over the registry with rayon. The
//! result vector is in registry order whatever order the workers finish in.

use crate::cache::{CacheKey, CacheStats, CompileCache, CompileOutcome, hash_plugins};
use crate::error::PostError;
use crate::frontmatter::normalize;
use crate::markup::{MarkupCompiler, PluginConfig};
use crate::registry::PostRegistry;
use crate::types::CompiledPost;
use rayon::prelude::*;
use std::sync::Arc;

pub struct PostCompiler {
    registry: Arc<PostRegistry>,
    markup: Arc<dyn MarkupCompiler>,
    plugins: PluginConfig,
    plugins_hash: String,
    cache: Option<CompileCache>,
}

impl PostCompiler {
    pub fn new(
        registry: Arc<PostRegistry>,
        markup: Arc<dyn MarkupCompiler>,
        plugins: PluginConfig,
    ) -> Self {
        let plugins_hash = hash_plugins(&plugins);
        Self {
            registry,
            markup,
            plugins,
            plugins_hash,
            cache: None,
        }
    }

    pub fn with_cache(mut self, cache: CompileCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn registry(&self) -> &PostRegistry {
        &self.registry
    }

    pub fn plugins(&self) -> &PluginConfig {
        &self.plugins
    }

    /// Hit/miss counters, or `None` when caching is off.
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(CompileCache::stats)
    }

    /// Compile one post.
    ///
    /// Errors name the slug: `NotFound` for an unknown slug, `Compile` when
    /// the markup compiler rejects the source, `InvalidContent` when the
    /// front-matter lacks a title or a valid date.
    pub fn compile_one(&self, slug: &str) -> CompileOutcome {
        let source = self.registry.get_source(slug)?;
        match &self.cache {
            Some(cache) => {
                let key = CacheKey::new(slug, &source.raw_text, &self.plugins_hash);
                cache.get_or_compile(key, || self.compile_source(slug, &source.raw_text))
            }
            None => self.compile_source(slug, &source.raw_text),
        }
    }

    /// Compile every registered post, in registry order.
    pub fn compile_all(&self) -> Vec<CompileOutcome> {
        let outcomes: Vec<CompileOutcome> = self
            .registry
            .list_slugs()
            .par_iter()
            .map(|slug| self.compile_one(slug))
            .collect();
        if let Some(stats) = self.cache_stats() {
            log::debug!("compile cache: {stats}");
        }
        outcomes
    }

    fn compile_source(&self, slug: &str, raw_text: &str) -> CompileOutcome {
        log::debug!("compiling '{slug}'");
        let compiled = self
            .markup
            .compile(raw_text, &self.plugins)
            .map_err(|source| PostError::Compile {
                slug: slug.to_string(),
                source,
            })?;
        let metadata = normalize(slug, compiled.front_matter)?;
        Ok(CompiledPost {
            slug: slug.to_string(),
            metadata,
            body: compiled.html,
        })
    }
}
