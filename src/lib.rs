//! # Folio
//!
//! A small server-rendered portfolio and blog. Posts are Markdown files with
//! a YAML front-matter block; the filesystem is the only data source.
//!
//! # Architecture: Request Pipeline
//!
//! Nothing is pre-built. Every request derives its page from the post
//! sources loaded at startup:
//!
//! ```text
//! content/*.mdx ─▶ registry ─▶ compile ─▶ frontmatter ─▶ assemble ─▶ render
//!   (startup)      slug → source   markup → html   validate    list/detail   maud
//!                                     + metadata     + date      + social
//! ```
//!
//! The same pipeline drives the HTTP server ([`serve`]) and the static
//! exporter ([`export`]).
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`registry`] | Slug → source text, scanned once at startup |
//! | [`markup`] | The `MarkupCompiler` seam and its pulldown-cmark implementation |
//! | [`highlight`] | Dual-theme syntax highlighting for fenced code |
//! | [`frontmatter`] | Raw front-matter, validation, and date handling |
//! | [`compile`] | Registry lookup + markup compile + normalisation, per post |
//! | [`cache`] | Optional compile cache keyed by content hash |
//! | [`assemble`] | Sorted listing (failures isolated) and the detail view |
//! | [`social`] | Social-image URL builder |
//! | [`seo`] | Meta tags, canonical URLs, request origin |
//! | [`render`] | Maud page templates |
//! | [`site`] | Loaded site: config + compiler + stylesheet |
//! | [`serve`] | `tiny_http` server and router |
//! | [`export`] | Writes every route to static files |
//! | [`config`] | `folio.toml` loading, validation, and CSS generation |
//! | [`output`] | CLI output formatting |
//!
//! # Failure Policy
//!
//! A post that fails to compile or has invalid front-matter never takes the
//! whole site down. The listing leaves it out and logs it; its own page is a
//! 500 (or a 404 when the slug is unknown). Startup problems (unreadable
//! content directory, bad config) are fatal.

pub mod assemble;
pub mod cache;
pub mod compile;
pub mod config;
pub mod error;
pub mod export;
pub mod frontmatter;
pub mod highlight;
pub mod markup;
pub mod output;
pub mod registry;
pub mod render;
pub mod seo;
pub mod serve;
pub mod site;
pub mod slug;
pub mod social;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
