//! Site configuration module.
//!
//! Handles loading, validating, and merging `folio.toml`. The file is sparse:
//! stock defaults are the base layer and user values are merged on top, so a
//! config only needs the keys it wants to change. A missing file means "use
//! the stock defaults".
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! content_dir = "content"       # Post sources (*.mdx, *.md)
//! public_dir = "public"         # Static files served as-is
//! extensions = ["mdx", "md"]    # Post file extensions
//!
//! [site]
//! name = "Lukas Alvarez"
//! origin = "https://lukasalvarez.com"  # Fallback when no Host header
//! author = "Lukas Alvarez"
//! twitter_handle = "@lukasalvarezdev"
//!
//! [home]
//! headline = "Going beyond software: ..."
//! intro = "..."
//! preview_count = 3             # Most recent posts on the landing page
//!
//! [blog]
//! title = "Blog: ..."
//! heading = "Thoughts on code, ..."
//! description = "..."
//!
//! [highlight]
//! dark = "base16-ocean.dark"    # syntect theme names
//! light = "InspiredGitHub"
//!
//! [markup]
//! components = ["Callout", "Figure"]
//!
//! [social]
//! base_url = "https://res.cloudinary.com/lukasalvarez/image/upload"
//! title_font = "lukasalvarez:Matter-Regular.woff2"
//! background = "lukasalvarez/social-background.png"
//! fallback_image = "lukasalvarez/default-banner.png"
//!
//! [server]
//! interface = "127.0.0.1"
//! port = 3000
//! workers = 4                   # Omit for auto = CPU cores
//!
//! [cache]
//! enabled = true
//!
//! [colors.light]
//! background = "#ffffff"
//! # ...
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Site configuration loaded from `folio.toml`.
///
/// All fields have defaults. Unknown keys are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteConfig {
    /// Directory holding the post sources.
    pub content_dir: PathBuf,
    /// Directory of static files (images, fonts, robots.txt).
    pub public_dir: PathBuf,
    /// File extensions recognised as posts, without the dot.
    pub extensions: Vec<String>,
    pub site: SiteInfo,
    pub home: HomeConfig,
    pub blog: BlogConfig,
    pub highlight: HighlightConfig,
    pub markup: MarkupConfig,
    pub social: SocialImageConfig,
    pub server: ServerConfig,
    pub cache: CacheConfig,
    /// Color schemes for light and dark modes.
    pub colors: ColorConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content"),
            public_dir: PathBuf::from("public"),
            extensions: vec!["mdx".to_string(), "md".to_string()],
            site: SiteInfo::default(),
            home: HomeConfig::default(),
            blog: BlogConfig::default(),
            highlight: HighlightConfig::default(),
            markup: MarkupConfig::default(),
            social: SocialImageConfig::default(),
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            colors: ColorConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Validate config values are within acceptable ranges.
    ///
    /// Highlight theme names are checked later, against the themes the
    /// highlighter actually has loaded.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "extensions must not be empty".into(),
            ));
        }
        if let Some(bad) = self
            .extensions
            .iter()
            .find(|e| e.is_empty() || e.starts_with('.'))
        {
            return Err(ConfigError::Validation(format!(
                "extensions must be bare names like \"mdx\", got {bad:?}"
            )));
        }
        if !is_http_origin(&self.site.origin) {
            return Err(ConfigError::Validation(
                "site.origin must start with http:// or https://".into(),
            ));
        }
        if self.site.origin.ends_with('/') {
            return Err(ConfigError::Validation(
                "site.origin must not end with '/'".into(),
            ));
        }
        if !is_http_origin(&self.social.base_url) {
            return Err(ConfigError::Validation(
                "social.base_url must start with http:// or https://".into(),
            ));
        }
        if self.server.workers == Some(0) {
            return Err(ConfigError::Validation(
                "server.workers must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn is_http_origin(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}

/// Identity of the site, used in page titles, the header, and SEO tags.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SiteInfo {
    /// Shown in the header and appended to page titles.
    pub name: String,
    /// Canonical origin when the request carries no host information.
    pub origin: String,
    pub author: String,
    /// Sent as `twitter:creator` and `twitter:site`.
    pub twitter_handle: String,
}

impl Default for SiteInfo {
    fn default() -> Self {
        Self {
            name: "Lukas Alvarez".to_string(),
            origin: "https://lukasalvarez.com".to_string(),
            author: "Lukas Alvarez".to_string(),
            twitter_handle: "@lukasalvarezdev".to_string(),
        }
    }
}

const DEFAULT_DESCRIPTION: &str = "Check out my latest insights, experiences, and experiments. \
It's not just about writing code, it's about how we think and approach building things.";

/// Landing page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HomeConfig {
    pub headline: String,
    pub intro: String,
    /// Number of most recent posts previewed on the landing page.
    pub preview_count: usize,
}

impl Default for HomeConfig {
    fn default() -> Self {
        Self {
            headline: "Going beyond software: Make something you're truly proud of.".to_string(),
            intro: DEFAULT_DESCRIPTION.to_string(),
            preview_count: 3,
        }
    }
}

/// Blog index page content.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BlogConfig {
    /// Document title of the index page.
    pub title: String,
    /// Visible page heading.
    pub heading: String,
    pub description: String,
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            title: "Blog: thoughts on code, mindset, and everything in between".to_string(),
            heading: "Thoughts on code, mindset, and everything in between".to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
        }
    }
}

/// Code highlighting theme pair (syntect theme names).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HighlightConfig {
    pub dark: String,
    pub light: String,
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            dark: "base16-ocean.dark".to_string(),
            light: "InspiredGitHub".to_string(),
        }
    }
}

/// Markup compiler settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkupConfig {
    /// Embedded component names that may appear in post bodies.
    pub components: Vec<String>,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            components: vec!["Callout".to_string(), "Figure".to_string()],
        }
    }
}

/// Social preview image CDN settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SocialImageConfig {
    /// Upload endpoint of the image CDN; transformations are appended to it.
    pub base_url: String,
    /// Font id for the text layers.
    pub title_font: String,
    /// Public id of the card background.
    pub background: String,
    /// Featured image used when a post has no banner.
    pub fallback_image: String,
}

impl Default for SocialImageConfig {
    fn default() -> Self {
        Self {
            base_url: "https://res.cloudinary.com/lukasalvarez/image/upload".to_string(),
            title_font: "lukasalvarez:Matter-Regular.woff2".to_string(),
            background: "lukasalvarez/social-background.png".to_string(),
            fallback_image: "lukasalvarez/default-banner.png".to_string(),
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub interface: String,
    /// First port to try; the next ones are tried when it is taken.
    pub port: u16,
    /// Request worker threads.
    /// When absent, defaults to the number of CPU cores.
    pub workers: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            interface: "127.0.0.1".to_string(),
            port: 3000,
            workers: None,
        }
    }
}

/// Resolve the effective worker count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `n`
pub fn effective_threads(config: &ServerConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config.workers.unwrap_or(cores).max(1)
}

/// Compiled-post cache settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CacheConfig {
    pub enabled: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// Color configuration for light and dark modes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorConfig {
    /// Light mode color scheme.
    pub light: ColorScheme,
    /// Dark mode color scheme.
    pub dark: ColorScheme,
}

impl Default for ColorConfig {
    fn default() -> Self {
        Self {
            light: ColorScheme::default_light(),
            dark: ColorScheme::default_dark(),
        }
    }
}

/// Individual color scheme (light or dark).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ColorScheme {
    pub background: String,
    pub text: String,
    /// Dates, captions, footer.
    pub text_muted: String,
    pub border: String,
    pub link: String,
    pub link_hover: String,
    /// Headline highlight and active nav entry.
    pub accent: String,
}

impl ColorScheme {
    pub fn default_light() -> Self {
        Self {
            background: "#ffffff".to_string(),
            text: "#1f2028".to_string(),
            text_muted: "#6b6f80".to_string(),
            border: "#e4e5eb".to_string(),
            link: "#1f2028".to_string(),
            link_hover: "#4b61d1".to_string(),
            accent: "#4b61d1".to_string(),
        }
    }

    pub fn default_dark() -> Self {
        Self {
            background: "#1f2028".to_string(),
            text: "#ffffff".to_string(),
            text_muted: "#a9adc1".to_string(),
            border: "#33343f".to_string(),
            link: "#ffffff".to_string(),
            link_hover: "#8a9cf3".to_string(),
            accent: "#8a9cf3".to_string(),
        }
    }
}

impl Default for ColorScheme {
    fn default() -> Self {
        Self::default_light()
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(SiteConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<SiteConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: SiteConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the file at `path`.
///
/// Merges user values on top of stock defaults, rejects unknown keys,
/// and validates the result. Relative `content_dir` and `public_dir` are
/// resolved against the config file's directory.
pub fn load_config(path: &Path) -> Result<SiteConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    let mut config = resolve_config(base, overlay)?;

    if let Some(root) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        if config.content_dir.is_relative() {
            config.content_dir = root.join(&config.content_dir);
        }
        if config.public_dir.is_relative() {
            config.public_dir = root.join(&config.public_dir);
        }
    }
    Ok(config)
}

/// Returns a fully-commented stock `folio.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Folio Configuration
# ===================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Unknown keys will cause an error.

# Directory holding the post sources, relative to this file.
content_dir = "content"

# Static files (images, fonts, robots.txt) served and exported as-is.
public_dir = "public"

# File extensions recognised as posts.
extensions = ["mdx", "md"]

# ---------------------------------------------------------------------------
# Site identity
# ---------------------------------------------------------------------------
[site]
name = "Lukas Alvarez"

# Canonical origin used when a request carries no Host header, and by
# `folio build`. No trailing slash.
origin = "https://lukasalvarez.com"

author = "Lukas Alvarez"
twitter_handle = "@lukasalvarezdev"

# ---------------------------------------------------------------------------
# Landing page
# ---------------------------------------------------------------------------
[home]
headline = "Going beyond software: Make something you're truly proud of."
intro = "Check out my latest insights, experiences, and experiments. It's not just about writing code, it's about how we think and approach building things."

# Number of most recent posts shown on the landing page.
preview_count = 3

# ---------------------------------------------------------------------------
# Blog index
# ---------------------------------------------------------------------------
[blog]
# Document title; the site name is appended.
title = "Blog: thoughts on code, mindset, and everything in between"
heading = "Thoughts on code, mindset, and everything in between"
description = "Check out my latest insights, experiences, and experiments. It's not just about writing code, it's about how we think and approach building things."

# ---------------------------------------------------------------------------
# Code highlighting (syntect theme names)
# ---------------------------------------------------------------------------
[highlight]
# Shown when the reader prefers a dark color scheme.
dark = "base16-ocean.dark"
# Shown otherwise.
light = "InspiredGitHub"

# ---------------------------------------------------------------------------
# Markup
# ---------------------------------------------------------------------------
[markup]
# Embedded components allowed in post bodies, e.g. <Callout>.
# Any other capitalised tag fails the post.
components = ["Callout", "Figure"]

# ---------------------------------------------------------------------------
# Social preview images
# ---------------------------------------------------------------------------
[social]
base_url = "https://res.cloudinary.com/lukasalvarez/image/upload"
title_font = "lukasalvarez:Matter-Regular.woff2"
background = "lukasalvarez/social-background.png"

# Featured image for posts without a banner.
fallback_image = "lukasalvarez/default-banner.png"

# ---------------------------------------------------------------------------
# HTTP server (`folio serve`)
# ---------------------------------------------------------------------------
[server]
interface = "127.0.0.1"

# First port to try; the next free one is used if it is taken.
port = 3000

# Request worker threads.
# Omit or comment out to auto-detect (= number of CPU cores).
# workers = 4

# ---------------------------------------------------------------------------
# Compiled-post cache
# ---------------------------------------------------------------------------
[cache]
# Reuse compiled posts while their source is unchanged.
enabled = true

# ---------------------------------------------------------------------------
# Colors - Light mode (prefers-color-scheme: light)
# ---------------------------------------------------------------------------
[colors.light]
background = "#ffffff"
text = "#1f2028"
text_muted = "#6b6f80"    # Dates, captions, footer
border = "#e4e5eb"
link = "#1f2028"
link_hover = "#4b61d1"
accent = "#4b61d1"

# ---------------------------------------------------------------------------
# Colors - Dark mode (prefers-color-scheme: dark)
# ---------------------------------------------------------------------------
[colors.dark]
background = "#1f2028"
text = "#ffffff"
text_muted = "#a9adc1"
border = "#33343f"
link = "#ffffff"
link_hover = "#8a9cf3"
accent = "#8a9cf3"
"##
}

/// Generate CSS custom properties from color config.
pub fn generate_color_css(colors: &ColorConfig) -> String {
    format!(
        r#":root {{
    --color-bg: {light_bg};
    --color-text: {light_text};
    --color-text-muted: {light_text_muted};
    --color-border: {light_border};
    --color-link: {light_link};
    --color-link-hover: {light_link_hover};
    --color-accent: {light_accent};
}}

@media (prefers-color-scheme: dark) {{
    :root {{
        --color-bg: {dark_bg};
        --color-text: {dark_text};
        --color-text-muted: {dark_text_muted};
        --color-border: {dark_border};
        --color-link: {dark_link};
        --color-link-hover: {dark_link_hover};
        --color-accent: {dark_accent};
    }}
}}"#,
        light_bg = colors.light.background,
        light_text = colors.light.text,
        light_text_muted = colors.light.text_muted,
        light_border = colors.light.border,
        light_link = colors.light.link,
        light_link_hover = colors.light.link_hover,
        light_accent = colors.light.accent,
        dark_bg = colors.dark.background,
        dark_text = colors.dark.text,
        dark_text_muted = colors.dark.text_muted,
        dark_border = colors.dark.border,
        dark_link = colors.dark.link,
        dark_link_hover = colors.dark.link_hover,
        dark_accent = colors.dark.accent,
    )
}
