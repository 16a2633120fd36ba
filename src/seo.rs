//! SEO and social metadata tags.
//!
//! Pages carry a flat list of [`MetaTag`]s. The `title` tag becomes the
//! document `<title>`, `og:*` tags are emitted with a `property` attribute,
//! everything else as `<meta name=… content=…>`.

use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MetaTag {
    pub name: String,
    pub content: String,
}

impl MetaTag {
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            content: content.into(),
        }
    }

    /// Open Graph tags use `property=` rather than `name=`.
    pub fn is_property(&self) -> bool {
        self.name.starts_with("og:")
    }
}

/// What a page says about itself to crawlers and link previews.
#[derive(Debug, Clone, Default)]
pub struct SocialMeta<'a> {
    pub url: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub keywords: &'a [&'a str],
    pub image: Option<&'a str>,
    pub twitter_handle: &'a str,
}

/// The standard tag set: title, description, keywords, Open Graph and
/// Twitter card.
pub fn social_metas(meta: &SocialMeta<'_>) -> Vec<MetaTag> {
    let description = meta.description.unwrap_or_default();
    let image = meta.image.unwrap_or_default();

    let mut tags = vec![
        MetaTag::new("title", meta.title),
        MetaTag::new("description", description),
    ];
    if !meta.keywords.is_empty() {
        tags.push(MetaTag::new("keywords", meta.keywords.join(", ")));
    }
    tags.extend([
        MetaTag::new("image", image),
        MetaTag::new("og:url", meta.url),
        MetaTag::new("og:title", meta.title),
        MetaTag::new("og:description", description),
        MetaTag::new("og:image", image),
        MetaTag::new(
            "twitter:card",
            if image.is_empty() {
                "summary"
            } else {
                "summary_large_image"
            },
        ),
    ]);
    if !meta.twitter_handle.is_empty() {
        tags.push(MetaTag::new("twitter:creator", meta.twitter_handle));
        tags.push(MetaTag::new("twitter:site", meta.twitter_handle));
    }
    tags.extend([
        MetaTag::new("twitter:title", meta.title),
        MetaTag::new("twitter:description", description),
        MetaTag::new("twitter:image", image),
        MetaTag::new("twitter:image:alt", meta.title),
    ]);
    tags
}

/// Just a title and a description, for pages without social cards.
pub fn page_metas(title: &str, description: &str) -> Vec<MetaTag> {
    vec![
        MetaTag::new("title", title),
        MetaTag::new("description", description),
    ]
}

pub fn not_found_metas() -> Vec<MetaTag> {
    page_metas("Not found", "You landed on the wrong place buddy")
}

/// `origin + path` without a trailing slash.
pub fn canonical_url(origin: &str, path: &str) -> String {
    let url = format!("{}{path}", origin.trim_end_matches('/'));
    match url.strip_suffix('/') {
        Some(stripped) => stripped.to_string(),
        None => url,
    }
}

/// Origin for canonical URLs: a proxy's `X-Forwarded-Host` is served over
/// https, a bare `Host` over http, and without either the configured origin
/// is used.
pub fn resolve_origin(forwarded_host: Option<&str>, host: Option<&str>, fallback: &str) -> String {
    if let Some(host) = nonempty(forwarded_host) {
        // A proxy chain appends hosts; the first one is the client-facing name.
        let first = host.split(',').next().unwrap_or(host).trim();
        return format!("https://{first}");
    }
    match nonempty(host) {
        Some(host) => format!("http://{host}"),
        None => fallback.to_string(),
    }
}

fn nonempty(header: Option<&str>) -> Option<&str> {
    header.map(str::trim).filter(|h| !h.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(tags: &'a [MetaTag], name: &str) -> Option<&'a str> {
        tags.iter()
            .find(|t| t.name == name)
            .map(|t| t.content.as_str())
    }

    #[test]
    fn social_metas_cover_open_graph_and_twitter() {
        let tags = social_metas(&SocialMeta {
            url: "https://x.dev/blog/a",
            title: "A",
            description: Some("About A"),
            keywords: &["rust", "blog"],
            image: Some("https://cdn/img"),
            twitter_handle: "@me",
        });
        assert_eq!(find(&tags, "title"), Some("A"));
        assert_eq!(find(&tags, "description"), Some("About A"));
        assert_eq!(find(&tags, "keywords"), Some("rust, blog"));
        assert_eq!(find(&tags, "og:url"), Some("https://x.dev/blog/a"));
        assert_eq!(find(&tags, "og:image"), Some("https://cdn/img"));
        assert_eq!(find(&tags, "twitter:card"), Some("summary_large_image"));
        assert_eq!(find(&tags, "twitter:creator"), Some("@me"));
        assert_eq!(find(&tags, "twitter:image:alt"), Some("A"));
    }

    #[test]
    fn without_image_card_is_summary() {
        let tags = social_metas(&SocialMeta {
            url: "u",
            title: "t",
            ..Default::default()
        });
        assert_eq!(find(&tags, "twitter:card"), Some("summary"));
        assert_eq!(find(&tags, "keywords"), None);
        assert_eq!(find(&tags, "twitter:site"), None);
    }

    #[test]
    fn og_tags_are_properties() {
        assert!(MetaTag::new("og:title", "x").is_property());
        assert!(!MetaTag::new("twitter:title", "x").is_property());
    }

    #[test]
    fn not_found_metas_match_copy() {
        let tags = not_found_metas();
        assert_eq!(find(&tags, "title"), Some("Not found"));
        assert_eq!(
            find(&tags, "description"),
            Some("You landed on the wrong place buddy")
        );
    }

    // =========================================================================
    // URLs and origins
    // =========================================================================

    #[test]
    fn canonical_url_strips_trailing_slash() {
        assert_eq!(
            canonical_url("https://lukasalvarez.com", "/blog/"),
            "https://lukasalvarez.com/blog"
        );
        assert_eq!(
            canonical_url("https://lukasalvarez.com", "/blog/a"),
            "https://lukasalvarez.com/blog/a"
        );
        assert_eq!(
            canonical_url("https://lukasalvarez.com", "/"),
            "https://lukasalvarez.com"
        );
    }

    #[test]
    fn canonical_url_joins_origin_with_trailing_slash() {
        assert_eq!(
            canonical_url("https://x.dev/", "/blog/a"),
            "https://x.dev/blog/a"
        );
        assert_eq!(canonical_url("https://x.dev/", "/"), "https://x.dev");
    }

    #[test]
    fn header_values_are_trimmed() {
        assert_eq!(
            resolve_origin(Some("  blog.example "), None, "https://f"),
            "https://blog.example"
        );
        assert_eq!(
            resolve_origin(Some(""), Some(" localhost:3000"), "https://f"),
            "http://localhost:3000"
        );
    }

    #[test]
    fn forwarded_host_wins_and_is_https() {
        assert_eq!(
            resolve_origin(Some("blog.example"), Some("10.0.0.1:3000"), "https://f"),
            "https://blog.example"
        );
    }

    #[test]
    fn forwarded_host_list_uses_first_entry() {
        assert_eq!(
            resolve_origin(Some("a.example, proxy.internal"), None, "https://f"),
            "https://a.example"
        );
    }

    #[test]
    fn host_header_is_http() {
        assert_eq!(
            resolve_origin(None, Some("localhost:3000"), "https://f"),
            "http://localhost:3000"
        );
    }

    #[test]
    fn no_headers_fall_back_to_config() {
        assert_eq!(
            resolve_origin(None, Some("  "), "https://lukasalvarez.com"),
            "https://lukasalvarez.com"
        );
    }
}
