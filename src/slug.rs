//! Slug rules shared by the registry and the markup compiler.
//!
//! A post's slug is its file stem: `content/shipping-small.mdx` is served at
//! `/blog/shipping-small`. Slugs are restricted to ASCII letters, digits,
//! `-` and `_` so they survive URLs and output paths without escaping:
//!
//! - `"shipping-small"` → valid
//! - `"2024_retro"` → valid
//! - `"my post"` → invalid (space)
//! - `"café"` → invalid (non-ASCII)
//! - `""` → invalid
//!
//! Heading anchors use a looser rule ([`slugify`]) because they are derived
//! from arbitrary heading text rather than chosen by the author.

use std::path::Path;

/// Extract the slug candidate (file stem) from a post path.
///
/// Returns `None` for paths without a UTF-8 file stem.
pub fn slug_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(str::to_string)
}

/// Whether `slug` can be used verbatim in a `/blog/:slug` URL.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Turn heading text into an `id` attribute value.
///
/// Lowercases, replaces runs of non-alphanumeric characters with a single
/// hyphen, and strips leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut prev_hyphen = true;
    for ch in text.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            prev_hyphen = false;
        } else if !prev_hyphen {
            slug.push('-');
            prev_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_is_file_stem() {
        let slug = slug_from_path(Path::new("content/shipping-small.mdx"));
        assert_eq!(slug.as_deref(), Some("shipping-small"));
    }

    #[test]
    fn slug_keeps_inner_dots_of_stem() {
        let slug = slug_from_path(Path::new("content/v1.2-notes.md"));
        assert_eq!(slug.as_deref(), Some("v1.2-notes"));
    }

    #[test]
    fn dashes_and_underscores_are_valid() {
        assert!(is_valid_slug("shipping-small"));
        assert!(is_valid_slug("2024_retro"));
    }

    #[test]
    fn spaces_dots_and_unicode_are_invalid() {
        assert!(!is_valid_slug("my post"));
        assert!(!is_valid_slug("v1.2-notes"));
        assert!(!is_valid_slug("café"));
    }

    #[test]
    fn empty_slug_is_invalid() {
        assert!(!is_valid_slug(""));
    }

    #[test]
    fn slugify_collapses_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Why `Result` matters  "), "why-result-matters");
    }

    #[test]
    fn slugify_of_symbols_only_is_empty() {
        assert_eq!(slugify("???"), "");
    }
}
