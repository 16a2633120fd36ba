//! Listing and detail views over compiled posts.
//!
//! The two views treat single-post failures differently:
//!
//! - **Listing** ([`list_posts`]) isolates them. A post that fails to compile
//!   or normalise is left out, logged at `warn`, and reported in
//!   [`Listing::failures`]; the other posts still render.
//! - **Detail** ([`get_post`]) returns the error. The caller turns it into a
//!   not-found or error page.
//!
//! Listings are ordered newest first by the parsed `date`. The sort is
//! stable, so posts published at the same moment keep registry order, and
//! any `limit` is applied after sorting.

use crate::compile::PostCompiler;
use crate::config::SiteConfig;
use crate::error::PostError;
use crate::seo::{MetaTag, SocialMeta, social_metas};
use crate::social::{SocialImageDescriptor, build_url};
use crate::types::{CompiledPost, PostSummary};

/// A sorted listing plus the posts that could not be listed.
#[derive(Debug, Default)]
pub struct Listing {
    pub posts: Vec<PostSummary>,
    pub failures: Vec<PostError>,
}

pub fn list_posts(compiler: &PostCompiler, limit: Option<usize>) -> Listing {
    let mut listing = Listing::default();
    for outcome in compiler.compile_all() {
        match outcome {
            Ok(post) => listing.posts.push(PostSummary::from(post)),
            Err(e) => {
                log::warn!("leaving '{}' out of the listing: {e}", e.slug());
                listing.failures.push(e);
            }
        }
    }

    sort_newest_first(&mut listing.posts);
    if let Some(limit) = limit {
        listing.posts.truncate(limit);
    }
    listing
}

/// Stable sort by publication time, most recent first.
pub fn sort_newest_first(posts: &mut [PostSummary]) {
    posts.sort_by(|a, b| b.metadata.published.cmp(&a.metadata.published));
}

/// A single post with the tags for its `<head>`.
#[derive(Debug, Clone)]
pub struct PostPage {
    pub post: CompiledPost,
    /// Canonical URL of the page.
    pub url: String,
    pub tags: Vec<MetaTag>,
}

/// Compile `slug` and build its SEO tags.
///
/// The social image is generated from the title, description and banner.
/// Every `meta` front-matter entry is appended as an extra tag, unless the
/// standard set already has a tag of that name (`keywords`).
pub fn get_post(
    compiler: &PostCompiler,
    slug: &str,
    url: &str,
    config: &SiteConfig,
) -> Result<PostPage, PostError> {
    let post = compiler.compile_one(slug)?;
    let metadata = &post.metadata;

    let image = build_url(
        &config.social,
        &SocialImageDescriptor {
            title: metadata.title.clone(),
            description: metadata.description.clone(),
            featured_image: metadata.banner_url.clone(),
            url: url.to_string(),
        },
    );
    let keywords = metadata.keywords();
    let mut tags = social_metas(&SocialMeta {
        url,
        title: &metadata.title,
        description: metadata.description.as_deref(),
        keywords: &keywords,
        image: Some(&image),
        twitter_handle: &config.site.twitter_handle,
    });
    let extras: Vec<MetaTag> = metadata
        .meta
        .iter()
        .filter(|(key, _)| !tags.iter().any(|t| &t.name == *key))
        .map(|(key, value)| MetaTag::new(key.as_str(), value.joined()))
        .collect();
    tags.extend(extras);

    Ok(PostPage {
        url: url.to_string(),
        tags,
        post,
    })
}
