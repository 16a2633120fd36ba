//! End-to-end tests over real post files: registry scan, markup compile,
//! normalisation, listing and detail views.

use folio::config::{SiteConfig, load_config};
use folio::error::PostError;
use folio::site::Site;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write(dir: &Path, slug: &str, front_matter: &str) {
    fs::create_dir_all(dir).unwrap();
    fs::write(
        dir.join(format!("{slug}.mdx")),
        format!("---\n{front_matter}---\n\nBody of {slug}.\n"),
    )
    .unwrap();
}

fn post(dir: &Path, slug: &str, date: &str) {
    write(dir, slug, &format!("title: Post {slug}\ndate: {date}\n"));
}

fn load(tmp: &TempDir) -> Site {
    Site::load(SiteConfig {
        content_dir: tmp.path().join("content"),
        public_dir: tmp.path().join("public"),
        ..SiteConfig::default()
    })
    .unwrap()
}

fn listed(site: &Site, limit: Option<usize>) -> Vec<String> {
    site.listing(limit)
        .posts
        .into_iter()
        .map(|p| p.slug)
        .collect()
}

// =========================================================================
// Listing
// =========================================================================

#[test]
fn listing_is_newest_first() {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    post(&content, "a", "2024-01-01");
    post(&content, "b", "2024-03-01");
    post(&content, "c", "2024-02-01");

    assert_eq!(listed(&load(&tmp), None), ["b", "c", "a"]);
}

#[test]
fn listing_limit_keeps_most_recent() {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    for (slug, date) in [
        ("p1", "2020-01-01"),
        ("p2", "2024-01-01"),
        ("p3", "2021-01-01"),
        ("p4", "2023-01-01"),
        ("p5", "2022-01-01"),
    ] {
        post(&content, slug, date);
    }

    assert_eq!(listed(&load(&tmp), Some(3)), ["p2", "p4", "p5"]);
}

#[test]
fn same_date_posts_keep_a_stable_order() {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    for slug in ["delta", "alpha", "charlie", "bravo"] {
        post(&content, slug, "2024-05-05");
    }
    let site = load(&tmp);

    let first = listed(&site, None);
    assert_eq!(first, ["alpha", "bravo", "charlie", "delta"]);
    for _ in 0..3 {
        assert_eq!(listed(&site, None), first);
    }
}

#[test]
fn post_without_date_is_left_out_of_listing() {
    let tmp = TempDir::new().unwrap();
    let content = tmp.path().join("content");
    post(&content, "dated", "2024-01-01");
    write(&content, "undated", "title: No date here\n");
    let site = load(&tmp);

    let listing = site.listing(None);
    assert_eq!(listing.posts.len(), 1);
    assert_eq!(listing.posts[0].slug, "dated");
    assert_eq!(listing.failures.len(), 1);
    assert!(matches!(
        &listing.failures[0],
        PostError::InvalidContent { slug, .. } if slug == "undated"
    ));
}

#[test]
fn empty_content_dir_lists_nothing() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir_all(tmp.path().join("content")).unwrap();
    let listing = load(&tmp).listing(Some(3));
    assert!(listing.posts.is_empty());
    assert!(listing.failures.is_empty());
}

// =========================================================================
// Detail
// =========================================================================

#[test]
fn detail_view_of_undated_post_names_the_slug() {
    let tmp = TempDir::new().unwrap();
    write(&tmp.path().join("content"), "undated", "title: No date here\n");
    let site = load(&tmp);

    let err = site.post("undated", "https://example.com").unwrap_err();
    assert!(matches!(err, PostError::InvalidContent { .. }));
    assert!(err.to_string().contains("undated"));
}

#[test]
fn unknown_slug_is_not_found() {
    let tmp = TempDir::new().unwrap();
    post(&tmp.path().join("content"), "a", "2024-01-01");
    let err = load(&tmp)
        .post("nonexistent-slug", "https://example.com")
        .unwrap_err();
    assert!(err.is_not_found());
}

#[test]
fn detail_view_carries_body_and_social_tags() {
    let tmp = TempDir::new().unwrap();
    write(
        &tmp.path().join("content"),
        "on-craft",
        "title: On craft\ndate: 2024-03-01\ndescription: Caring about the work\nbannerUrl: /images/craft.png\nmeta:\n  keywords: [craft, mindset]\n",
    );
    let site = load(&tmp);

    let page = site.post("on-craft", "https://example.com/").unwrap();
    assert_eq!(page.url, "https://example.com/blog/on-craft");
    assert!(page.post.body.contains("Body of on-craft."));
    assert_eq!(page.post.metadata.date, "March 1, 2024");

    let image = page.tags.iter().find(|t| t.name == "og:image").unwrap();
    assert!(image.content.contains("l_images:craft.png"));
    assert!(
        page.tags
            .iter()
            .any(|t| t.name == "keywords" && t.content == "craft, mindset")
    );
}

// =========================================================================
// Config
// =========================================================================

#[test]
fn config_dirs_resolve_against_config_file() {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("site");
    post(&root.join("posts"), "hello", "2024-01-01");
    fs::write(
        root.join("folio.toml"),
        "content_dir = \"posts\"\n\n[site]\nname = \"Test Site\"\n",
    )
    .unwrap();

    let config = load_config(&root.join("folio.toml")).unwrap();
    assert_eq!(config.site.name, "Test Site");
    let site = Site::load(config).unwrap();
    assert_eq!(listed(&site, None), ["hello"]);
}
