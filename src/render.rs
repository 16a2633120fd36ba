//! HTML page rendering.
//!
//! ## Pages
//!
//! - **Home** (`/`): headline, intro, and a grid of the most recent posts
//! - **Blog index** (`/blog`): every listable post, newest first
//! - **Post** (`/blog/{slug}`): back link, title, date, banner, and body
//! - **Not found** and **error** pages
//!
//! ## CSS
//!
//! `static/style.css` is embedded at compile time. Color custom properties
//! generated from the config are prepended, and the result is inlined into
//! every page.
//!
//! ## HTML Generation
//!
//! Uses [maud](https://maud.lambda.xyz/) for compile-time HTML templating.
//! Everything is escaped except compiled post bodies, which are already HTML.

use crate::assemble::{Listing, PostPage};
use crate::config::{self, SiteConfig, SiteInfo};
use crate::seo::{MetaTag, not_found_metas, page_metas};
use crate::types::PostSummary;
use chrono::Datelike;
use maud::{DOCTYPE, Markup, PreEscaped, html};

const CSS_STATIC: &str = include_str!("../static/style.css");

/// Full stylesheet for a site: config colors, then the static rules.
pub fn site_css(config: &SiteConfig) -> String {
    format!(
        "{}\n\n{}",
        config::generate_color_css(&config.colors),
        CSS_STATIC
    )
}

/// Top-level section a page belongs to, for nav highlighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Home,
    Blog,
}

// ============================================================================
// HTML Components
// ============================================================================

/// Renders the base HTML document structure.
///
/// The `title` tag becomes `<title>`; the others become `<meta>` elements.
fn base_document(tags: &[MetaTag], canonical: Option<&str>, css: &str, content: Markup) -> Markup {
    let title = tags
        .iter()
        .find(|t| t.name == "title")
        .map(|t| t.content.as_str())
        .unwrap_or_default();

    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                @for tag in tags.iter().filter(|t| t.name != "title") {
                    @if tag.is_property() {
                        meta property=(tag.name) content=(tag.content);
                    } @else {
                        meta name=(tag.name) content=(tag.content);
                    }
                }
                @if let Some(href) = canonical {
                    link rel="canonical" href=(href);
                }
                style { (PreEscaped(css)) }
            }
            body {
                (content)
            }
        }
    }
}

fn site_header(site: &SiteInfo, current: Option<Section>) -> Markup {
    html! {
        header.site-header.container {
            a.site-name href="/" { (site.name) }
            nav.site-nav {
                ul {
                    li class=[(current == Some(Section::Home)).then_some("current")] {
                        a href="/" { "Home" }
                    }
                    li class=[(current == Some(Section::Blog)).then_some("current")] {
                        a href="/blog" { "Blog" }
                    }
                }
            }
        }
    }
}

fn site_footer(site: &SiteInfo) -> Markup {
    let year = chrono::Local::now().year();
    html! {
        footer.site-footer.container {
            p { "All rights reserved. © " (site.author) " " (year) }
        }
    }
}

/// Wraps page content in the header/footer chrome.
fn page_shell(config: &SiteConfig, current: Option<Section>, main: Markup) -> Markup {
    html! {
        (site_header(&config.site, current))
        main.container {
            (main)
        }
        (site_footer(&config.site))
    }
}

/// Grid of post cards: banner, date, title.
pub fn post_grid(posts: &[PostSummary]) -> Markup {
    html! {
        div.post-grid {
            @for post in posts {
                a.post-card href={ "/blog/" (post.slug) } {
                    @if let Some(banner) = &post.metadata.banner_url {
                        div.post-card-banner {
                            img src=(banner) alt=[post.metadata.banner_credit.as_deref()] loading="lazy";
                        }
                    }
                    p.post-date { (post.metadata.date) }
                    h4 { (post.metadata.title) }
                }
            }
        }
    }
}

fn titled(title: &str, site: &SiteInfo) -> String {
    format!("{title} — {}", site.name)
}

// ============================================================================
// Page Renderers
// ============================================================================

/// Landing page with the most recent posts.
pub fn render_home(config: &SiteConfig, css: &str, recent: &Listing, canonical: &str) -> Markup {
    let tags = page_metas(
        &titled(&config.home.headline, &config.site),
        &config.home.intro,
    );
    let main = html! {
        section.hero {
            h1 { (config.home.headline) }
            p { (config.home.intro) }
            a.button href="/blog" { "Read the blog" }
        }
        @if !recent.posts.is_empty() {
            section.recent-posts {
                h2 { "Latest posts" }
                (post_grid(&recent.posts))
            }
        }
    };
    base_document(
        &tags,
        Some(canonical),
        css,
        page_shell(config, Some(Section::Home), main),
    )
}

pub fn render_blog_index(
    config: &SiteConfig,
    css: &str,
    listing: &Listing,
    canonical: &str,
) -> Markup {
    let tags = page_metas(
        &titled(&config.blog.title, &config.site),
        &config.blog.description,
    );
    let main = html! {
        div.blog-index {
            h1 { (config.blog.heading) }
            p { (config.blog.description) }
            @if listing.posts.is_empty() {
                p.empty { "Nothing published yet." }
            } @else {
                (post_grid(&listing.posts))
            }
        }
    };
    base_document(
        &tags,
        Some(canonical),
        css,
        page_shell(config, Some(Section::Blog), main),
    )
}

pub fn render_post(config: &SiteConfig, css: &str, page: &PostPage) -> Markup {
    let metadata = &page.post.metadata;
    let main = html! {
        article.post {
            div.post-header {
                a.back-link href="/blog" { "← Back to blog" }
                h1 { (metadata.title) }
                p.post-date { (metadata.date) }
            }
            @if let Some(banner) = &metadata.banner_url {
                img.post-banner src=(banner) alt=[metadata.banner_credit.as_deref()];
            }
            div.post-body {
                (PreEscaped(&page.post.body))
            }
        }
    };
    base_document(
        &page.tags,
        Some(&page.url),
        css,
        page_shell(config, Some(Section::Blog), main),
    )
}

pub fn render_not_found(config: &SiteConfig, css: &str) -> Markup {
    let main = html! {
        div.error-page {
            h1 { "404" }
            p { "You landed on the wrong place buddy." }
            a.button href="/blog" { "Back to the blog" }
        }
    };
    base_document(&not_found_metas(), None, css, page_shell(config, None, main))
}

/// Page for a request that failed on our side. The message is shown as-is.
pub fn render_error(config: &SiteConfig, css: &str, message: &str) -> Markup {
    let tags = page_metas("Something went wrong", message);
    let main = html! {
        div.error-page {
            h1 { "Something went wrong" }
            p { (message) }
        }
    };
    base_document(&tags, None, css, page_shell(config, None, main))
}

// ============================================================================
// Tests
// ============================================================================
