//! Post values shared by the compiler, the assembler, and the renderers.
//!
//! All of these are derived per request from the registry's sources and are
//! never mutated after construction.

use crate::frontmatter::NormalizedFrontMatter;
use serde::Serialize;

/// A post after markup compilation and front-matter normalisation.
#[derive(Debug, Clone, Serialize)]
pub struct CompiledPost {
    pub slug: String,
    pub metadata: NormalizedFrontMatter,
    /// Rendered HTML body, ready to embed without escaping.
    pub body: String,
}

/// The listing view of a post: everything except the body.
#[derive(Debug, Clone, Serialize)]
pub struct PostSummary {
    pub slug: String,
    pub metadata: NormalizedFrontMatter,
}

impl From<CompiledPost> for PostSummary {
    fn from(post: CompiledPost) -> Self {
        Self {
            slug: post.slug,
            metadata: post.metadata,
        }
    }
}
