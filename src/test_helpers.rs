//! Shared test utilities for the folio test suite.
//!
//! Provides a scriptable [`FakeCompiler`], builders for front-matter and
//! compiled posts, and on-disk fixture setup.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let fake = FakeCompiler::new()
//!     .with_post("src-a", raw("Hello", "2024-03-01"))
//!     .failing("src-b");
//! let compiler = compiler_with(&fake, [("a", "src-a"), ("b", "src-b")]);
//!
//! assert!(compiler.compile_one("a").is_ok());
//! assert_eq!(fake.calls(), 1);
//! ```

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;

use crate::compile::PostCompiler;
use crate::frontmatter::{RawFrontMatter, normalize};
use crate::markup::{CompiledMarkup, MarkupCompiler, MarkupError, PluginConfig, ThemePair};
use crate::registry::PostRegistry;
use crate::types::CompiledPost;

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/` (content and public dirs) to a temp directory and
/// return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

/// Source text of a minimal post with the given title and date.
pub fn post_source(title: &str, date: &str) -> String {
    format!("---\ntitle: {title}\ndate: {date}\ndescription: About {title}\n---\n\nBody of {title}.\n")
}

/// Write `<dir>/<slug>.mdx` with [`post_source`] content.
pub fn write_post(dir: &Path, slug: &str, title: &str, date: &str) {
    std::fs::create_dir_all(dir).unwrap();
    std::fs::write(dir.join(format!("{slug}.mdx")), post_source(title, date)).unwrap();
}

// =========================================================================
// Value builders
// =========================================================================

pub fn raw(title: &str, date: &str) -> RawFrontMatter {
    RawFrontMatter {
        title: Some(title.to_string()),
        date: Some(date.to_string()),
        ..Default::default()
    }
}

/// A compiled post with a placeholder body. Panics on an invalid date.
pub fn compiled(slug: &str, title: &str, date: &str) -> CompiledPost {
    CompiledPost {
        slug: slug.to_string(),
        metadata: normalize(slug, raw(title, date)).unwrap(),
        body: format!("<p>{title}</p>"),
    }
}

pub fn test_plugins() -> PluginConfig {
    PluginConfig {
        front_matter: true,
        highlight: ThemePair {
            dark: "base16-ocean.dark".into(),
            light: "InspiredGitHub".into(),
        },
        components: vec!["Callout".into(), "Figure".into()],
    }
}

// =========================================================================
// Fake markup compiler
// =========================================================================

/// Markup compiler that maps source text to scripted front-matter.
///
/// Sources registered with [`with_post`](Self::with_post) return that
/// front-matter, sources registered with [`failing`](Self::failing) return a
/// `MarkupError`, anything else returns empty front-matter. The body is
/// always `<p>{source}</p>`. Clones share the call counter.
#[derive(Clone, Default)]
pub struct FakeCompiler {
    posts: HashMap<String, RawFrontMatter>,
    failing: HashSet<String>,
    calls: Arc<AtomicUsize>,
}

impl FakeCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_post(mut self, source: &str, front_matter: RawFrontMatter) -> Self {
        self.posts.insert(source.to_string(), front_matter);
        self
    }

    pub fn failing(mut self, source: &str) -> Self {
        self.failing.insert(source.to_string());
        self
    }

    /// Number of `compile` calls across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl MarkupCompiler for FakeCompiler {
    fn compile(
        &self,
        source: &str,
        _plugins: &PluginConfig,
    ) -> Result<CompiledMarkup, MarkupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(source) {
            return Err(MarkupError::UnknownComponent("Broken".into()));
        }
        Ok(CompiledMarkup {
            html: format!("<p>{source}</p>"),
            front_matter: self.posts.get(source).cloned().unwrap_or_default(),
        })
    }
}

/// A post compiler over in-memory `(slug, source)` pairs backed by `fake`.
pub fn compiler_with<const N: usize>(
    fake: &FakeCompiler,
    sources: [(&str, &str); N],
) -> PostCompiler {
    let registry = PostRegistry::from_sources(sources).unwrap();
    PostCompiler::new(Arc::new(registry), Arc::new(fake.clone()), test_plugins())
}
