//! A loaded site: config, post compiler, and stylesheet.
//!
//! [`Site::load`] is the startup step. It scans the content directory,
//! checks the highlight themes against the ones the highlighter ships, and
//! builds the compiler. Any problem here is fatal. After that the site is
//! immutable and shared across request workers.
//!
//! The page methods are what the server and the exporter call. Each takes
//! the origin to build canonical URLs with.

use crate::assemble::{Listing, PostPage, get_post, list_posts};
use crate::cache::CompileCache;
use crate::compile::PostCompiler;
use crate::config::{ConfigError, SiteConfig};
use crate::error::PostError;
use crate::markup::{CmarkCompiler, MarkupCompiler, PluginConfig};
use crate::registry::{PostRegistry, RegistryError};
use crate::render;
use crate::seo::canonical_url;
use maud::Markup;
use std::sync::Arc;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SiteError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("failed to load posts from {dir}: {source}")]
    Registry {
        dir: String,
        #[source]
        source: RegistryError,
    },
}

pub struct Site {
    config: SiteConfig,
    compiler: PostCompiler,
    css: String,
}

impl Site {
    /// Scan the content directory and build the default markup compiler.
    pub fn load(config: SiteConfig) -> Result<Self, SiteError> {
        let registry = PostRegistry::scan(&config.content_dir, &config.extensions).map_err(
            |source| SiteError::Registry {
                dir: config.content_dir.display().to_string(),
                source,
            },
        )?;

        let markup = CmarkCompiler::new();
        for theme in [&config.highlight.dark, &config.highlight.light] {
            if !markup.highlighter().has_theme(theme) {
                return Err(ConfigError::Validation(format!(
                    "unknown highlight theme '{theme}' (available: {})",
                    markup.highlighter().theme_names().join(", ")
                ))
                .into());
            }
        }

        log::info!(
            "loaded {} posts from {}",
            registry.len(),
            config.content_dir.display()
        );
        Ok(Self::with_compiler(config, registry, Arc::new(markup)))
    }

    /// Assemble a site from an existing registry and markup compiler.
    pub fn with_compiler(
        config: SiteConfig,
        registry: PostRegistry,
        markup: Arc<dyn MarkupCompiler>,
    ) -> Self {
        let plugins = PluginConfig::from_config(&config);
        let mut compiler = PostCompiler::new(Arc::new(registry), markup, plugins);
        if config.cache.enabled {
            compiler = compiler.with_cache(CompileCache::new());
        }
        let css = render::site_css(&config);
        Self {
            config,
            compiler,
            css,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn compiler(&self) -> &PostCompiler {
        &self.compiler
    }

    pub fn listing(&self, limit: Option<usize>) -> Listing {
        list_posts(&self.compiler, limit)
    }

    pub fn post(&self, slug: &str, origin: &str) -> Result<PostPage, PostError> {
        let url = canonical_url(origin, &format!("/blog/{slug}"));
        get_post(&self.compiler, slug, &url, &self.config)
    }

    // ------------------------------------------------------------------------
    // Pages
    // ------------------------------------------------------------------------

    pub fn home_page(&self, origin: &str) -> Markup {
        let recent = self.listing(Some(self.config.home.preview_count));
        render::render_home(
            &self.config,
            &self.css,
            &recent,
            &canonical_url(origin, "/"),
        )
    }

    pub fn blog_index(&self, origin: &str) -> Markup {
        let listing = self.listing(None);
        render::render_blog_index(
            &self.config,
            &self.css,
            &listing,
            &canonical_url(origin, "/blog"),
        )
    }

    pub fn post_page(&self, slug: &str, origin: &str) -> Result<Markup, PostError> {
        let page = self.post(slug, origin)?;
        Ok(render::render_post(&self.config, &self.css, &page))
    }

    pub fn not_found_page(&self) -> Markup {
        render::render_not_found(&self.config, &self.css)
    }

    pub fn error_page(&self, message: &str) -> Markup {
        render::render_error(&self.config, &self.css, message)
    }
}
