//! Post source discovery.
//!
//! The registry is built once at startup by scanning the content directory
//! and is read-only afterwards. It is the only component that touches the
//! content files; everything downstream works from the in-memory sources.
//!
//! ## Directory Layout
//!
//! ```text
//! content/
//! ├── hello-world.mdx      # slug: hello-world
//! ├── shipping-small.mdx   # slug: shipping-small
//! ├── notes.md             # slug: notes (when "md" is a configured extension)
//! ├── .draft.mdx           # hidden, skipped
//! └── drafts/              # subdirectories are not scanned
//! ```
//!
//! ## Validation
//!
//! Content is a build-time dependency, so every problem is fatal:
//! - unreadable directory or file
//! - a file stem that is not a URL-safe slug
//! - two files mapping to the same slug (`a.md` and `a.mdx`)

use crate::error::PostError;
use crate::slug::{is_valid_slug, slug_from_path};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to scan content directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("file name is not a valid slug (use letters, digits, '-' or '_'): {0}")]
    InvalidSlug(PathBuf),
    #[error("more than one source file for slug '{0}'")]
    DuplicateSlug(String),
}

/// One post's source text.
#[derive(Debug, Clone)]
pub struct PostSource {
    pub slug: String,
    /// Where the source was read from; empty for in-memory sources.
    pub path: PathBuf,
    pub raw_text: String,
}

/// Immutable slug → source index.
#[derive(Debug, Default)]
pub struct PostRegistry {
    slugs: Vec<String>,
    sources: HashMap<String, PostSource>,
}

impl PostRegistry {
    /// Scan `dir` (non-recursively) for files whose extension is one of
    /// `extensions`, compared case-insensitively.
    ///
    /// Files are visited in file-name order so the registry order is the
    /// same on every filesystem.
    pub fn scan(dir: &Path, extensions: &[String]) -> Result<Self, RegistryError> {
        let mut registry = Self::default();

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();
            if !entry.file_type().is_file() || is_hidden(path) || !has_extension(path, extensions)
            {
                continue;
            }

            let slug = slug_from_path(path)
                .filter(|s| is_valid_slug(s))
                .ok_or_else(|| RegistryError::InvalidSlug(path.to_path_buf()))?;
            let raw_text = fs::read_to_string(path).map_err(|source| RegistryError::Io {
                path: path.to_path_buf(),
                source,
            })?;

            registry.insert(PostSource {
                slug,
                path: path.to_path_buf(),
                raw_text,
            })?;
        }

        log::debug!(
            "registered {} posts from {}",
            registry.len(),
            dir.display()
        );
        Ok(registry)
    }

    /// Build a registry from `(slug, source text)` pairs, keeping their order.
    pub fn from_sources<I, S, T>(sources: I) -> Result<Self, RegistryError>
    where
        I: IntoIterator<Item = (S, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let mut registry = Self::default();
        for (slug, text) in sources {
            let slug = slug.into();
            if !is_valid_slug(&slug) {
                return Err(RegistryError::InvalidSlug(PathBuf::from(slug)));
            }
            registry.insert(PostSource {
                slug,
                path: PathBuf::new(),
                raw_text: text.into(),
            })?;
        }
        Ok(registry)
    }

    fn insert(&mut self, source: PostSource) -> Result<(), RegistryError> {
        if self.sources.contains_key(&source.slug) {
            return Err(RegistryError::DuplicateSlug(source.slug));
        }
        self.slugs.push(source.slug.clone());
        self.sources.insert(source.slug.clone(), source);
        Ok(())
    }

    /// Slugs in scan order. Not a display order.
    pub fn list_slugs(&self) -> &[String] {
        &self.slugs
    }

    pub fn get_source(&self, slug: &str) -> Result<&PostSource, PostError> {
        self.sources
            .get(slug)
            .ok_or_else(|| PostError::NotFound(slug.to_string()))
    }

    pub fn len(&self) -> usize {
        self.slugs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slugs.is_empty()
    }
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .map(|n| n.to_string_lossy().starts_with('.'))
        .unwrap_or(false)
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| {
            let ext = e.to_string_lossy();
            extensions.iter().any(|x| ext.eq_ignore_ascii_case(x))
        })
        .unwrap_or(false)
}
