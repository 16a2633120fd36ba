//! The markup compiler seam.
//!
//! The post pipeline only needs one capability from a markup compiler:
//! source text in, rendered body plus raw front-matter out. That capability
//! is the [`MarkupCompiler`] trait, so the pipeline can be driven by a fake
//! compiler in tests and by [`CmarkCompiler`] in production.
//!
//! ## CmarkCompiler
//!
//! Built on pulldown-cmark with GFM-style extensions. On top of plain
//! CommonMark → HTML it applies the configured plugins:
//!
//! - **Front-matter extraction**: a leading `---` YAML block is parsed into
//!   [`RawFrontMatter`] and removed from the body.
//! - **Syntax highlighting**: fenced code blocks are rendered by
//!   [`Highlighter`] with the configured dark/light theme pair.
//! - **Embedded components**: capitalised tags in inline or block HTML
//!   (`<Callout>`, `<Figure />`) must be listed in
//!   [`PluginConfig::components`]; anything else fails the compile instead of
//!   leaking an unrendered tag into the page.
//!
//! Headings without an explicit `{#id}` get an id derived from their text.

use crate::config::SiteConfig;
use crate::frontmatter::RawFrontMatter;
use crate::highlight::Highlighter;
use crate::slug::slugify;
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, html::push_html,
};
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while compiling a single source. Causes are held in `Arc`
/// so the error stays `Clone`.
#[derive(Error, Debug, Clone)]
pub enum MarkupError {
    #[error("malformed front-matter: {0}")]
    FrontMatter(#[source] Arc<serde_yaml::Error>),
    #[error("front-matter block opened with `---` is never closed")]
    UnterminatedFrontMatter,
    #[error("unknown embedded component <{0}>")]
    UnknownComponent(String),
    #[error("unknown highlight theme '{0}'")]
    UnknownTheme(String),
    #[error("failed to highlight {language} code block: {source}")]
    Highlight {
        language: String,
        #[source]
        source: Arc<syntect::Error>,
    },
}

/// Dark and light highlight themes, by syntect theme name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemePair {
    pub dark: String,
    pub light: String,
}

/// Transform plugins applied by the markup compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginConfig {
    /// Extract the leading YAML block as front-matter.
    pub front_matter: bool,
    /// Highlight themes for fenced code blocks.
    pub highlight: ThemePair,
    /// Embedded component names allowed in the body.
    pub components: Vec<String>,
}

impl PluginConfig {
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            front_matter: true,
            highlight: ThemePair {
                dark: config.highlight.dark.clone(),
                light: config.highlight.light.clone(),
            },
            components: config.markup.components.clone(),
        }
    }
}

/// Output of one compilation.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledMarkup {
    pub html: String,
    pub front_matter: RawFrontMatter,
}

pub trait MarkupCompiler: Send + Sync {
    fn compile(&self, source: &str, plugins: &PluginConfig)
    -> Result<CompiledMarkup, MarkupError>;
}

/// Markdown compiler backed by pulldown-cmark and syntect.
pub struct CmarkCompiler {
    highlighter: Highlighter,
}

impl CmarkCompiler {
    pub fn new() -> Self {
        Self {
            highlighter: Highlighter::new(),
        }
    }

    pub fn highlighter(&self) -> &Highlighter {
        &self.highlighter
    }
}

impl Default for CmarkCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl MarkupCompiler for CmarkCompiler {
    fn compile(
        &self,
        source: &str,
        plugins: &PluginConfig,
    ) -> Result<CompiledMarkup, MarkupError> {
        let mut options = Options::ENABLE_TABLES
            | Options::ENABLE_FOOTNOTES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_HEADING_ATTRIBUTES;
        if plugins.front_matter {
            if opens_front_matter(source) && !closes_front_matter(source) {
                return Err(MarkupError::UnterminatedFrontMatter);
            }
            options.insert(Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);
        }

        let mut events: Vec<Event<'_>> = Vec::new();
        let mut front_matter_text: Option<String> = None;
        let mut in_metadata = false;
        let mut code: Option<(Option<String>, String)> = None;
        let mut heading: Option<PendingHeading<'_>> = None;

        for event in Parser::new_ext(source, options) {
            match event {
                Event::Start(Tag::MetadataBlock(_)) => {
                    in_metadata = true;
                    front_matter_text.get_or_insert_with(String::new);
                }
                Event::End(TagEnd::MetadataBlock(_)) => in_metadata = false,
                Event::Text(text) if in_metadata => {
                    if let Some(buf) = front_matter_text.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::Start(Tag::CodeBlock(kind)) => {
                    let language = match kind {
                        CodeBlockKind::Fenced(info) => info
                            .split_whitespace()
                            .next()
                            .filter(|l| !l.is_empty())
                            .map(str::to_string),
                        CodeBlockKind::Indented => None,
                    };
                    code = Some((language, String::new()));
                }
                Event::Text(text) if code.is_some() => {
                    if let Some((_, buf)) = code.as_mut() {
                        buf.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some((language, text)) = code.take() {
                        let html = self.highlighter.highlight(
                            &text,
                            language.as_deref(),
                            &plugins.highlight,
                        )?;
                        events.push(Event::Html(html.into()));
                    }
                }
                Event::Html(ref html) | Event::InlineHtml(ref html) => {
                    check_components(html, &plugins.components)?;
                    push_event(&mut events, &mut heading, event);
                }
                Event::Start(Tag::Heading {
                    level,
                    id,
                    classes,
                    attrs,
                }) => {
                    heading = Some(PendingHeading {
                        level,
                        id,
                        classes,
                        attrs,
                        text: String::new(),
                        inner: Vec::new(),
                    });
                }
                Event::End(TagEnd::Heading(level)) => match heading.take() {
                    Some(pending) => pending.flush(&mut events),
                    None => events.push(Event::End(TagEnd::Heading(level))),
                },
                other => push_event(&mut events, &mut heading, other),
            }
        }

        let front_matter = match front_matter_text {
            Some(text) if !text.trim().is_empty() => serde_yaml::from_str(&text)
                .map_err(|e| MarkupError::FrontMatter(Arc::new(e)))?,
            _ => RawFrontMatter::default(),
        };

        let mut html = String::with_capacity(source.len() * 2);
        push_html(&mut html, events.into_iter());
        Ok(CompiledMarkup { html, front_matter })
    }
}

/// A heading whose events are buffered until its text is known.
struct PendingHeading<'a> {
    level: HeadingLevel,
    id: Option<CowStr<'a>>,
    classes: Vec<CowStr<'a>>,
    attrs: Vec<(CowStr<'a>, Option<CowStr<'a>>)>,
    text: String,
    inner: Vec<Event<'a>>,
}

impl<'a> PendingHeading<'a> {
    fn flush(self, events: &mut Vec<Event<'a>>) {
        let id = match self.id {
            Some(id) => Some(id),
            None => {
                let slug = slugify(&self.text);
                (!slug.is_empty()).then(|| CowStr::from(slug))
            }
        };
        events.push(Event::Start(Tag::Heading {
            level: self.level,
            id,
            classes: self.classes,
            attrs: self.attrs,
        }));
        events.extend(self.inner);
        events.push(Event::End(TagEnd::Heading(self.level)));
    }
}

fn push_event<'a>(
    events: &mut Vec<Event<'a>>,
    heading: &mut Option<PendingHeading<'a>>,
    event: Event<'a>,
) {
    match heading {
        Some(pending) => {
            if let Event::Text(text) | Event::Code(text) = &event {
                pending.text.push_str(text);
            }
            pending.inner.push(event);
        }
        None => events.push(event),
    }
}

/// Reject capitalised tags that are not registered components.
fn check_components(html: &str, allowed: &[String]) -> Result<(), MarkupError> {
    for name in component_tags(html) {
        if !allowed.iter().any(|a| a == name) {
            return Err(MarkupError::UnknownComponent(name.to_string()));
        }
    }
    Ok(())
}

/// Names of opening tags that start with an ASCII uppercase letter.
fn component_tags(html: &str) -> Vec<&str> {
    let mut names = Vec::new();
    let mut rest = html;
    while let Some(pos) = rest.find('<') {
        rest = &rest[pos + 1..];
        if rest.starts_with(|c: char| c.is_ascii_uppercase()) {
            let end = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '.' || c == '_'))
                .unwrap_or(rest.len());
            names.push(&rest[..end]);
        }
    }
    names
}

fn opens_front_matter(source: &str) -> bool {
    source.lines().next().is_some_and(|l| l.trim_end() == "---")
}

fn closes_front_matter(source: &str) -> bool {
    source
        .lines()
        .skip(1)
        .any(|l| matches!(l.trim_end(), "---" | "..."))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plugins() -> PluginConfig {
        PluginConfig {
            front_matter: true,
            highlight: ThemePair {
                dark: "base16-ocean.dark".into(),
                light: "InspiredGitHub".into(),
            },
            components: vec!["Callout".into()],
        }
    }

    #[test]
    fn extracts_front_matter_and_strips_it_from_body() {
        let src = "---\ntitle: Hello\ndate: 2024-01-01\n---\n\n# Heading\n\nBody text.\n";
        let out = CmarkCompiler::new().compile(src, &plugins()).unwrap();
        assert_eq!(out.front_matter.title.as_deref(), Some("Hello"));
        assert_eq!(out.front_matter.date.as_deref(), Some("2024-01-01"));
        assert!(!out.html.contains("title: Hello"));
        assert!(out.html.contains("Body text."));
    }

    #[test]
    fn numeric_meta_value_compiles() {
        let src = "---\ntitle: Hello\ndate: 2024-01-01\nmeta:\n  readingTime: 5\n---\n\nBody.\n";
        let out = CmarkCompiler::new().compile(src, &plugins()).unwrap();
        let meta = out.front_matter.meta.unwrap();
        assert_eq!(meta["readingTime"].joined(), "5");
    }

    #[test]
    fn no_front_matter_gives_empty_record() {
        let out = CmarkCompiler::new()
            .compile("Just a paragraph.\n", &plugins())
            .unwrap();
        assert_eq!(out.front_matter, RawFrontMatter::default());
    }

    #[test]
    fn malformed_yaml_is_front_matter_error() {
        let src = "---\ntitle: [unclosed\n---\n\nBody\n";
        let err = CmarkCompiler::new().compile(src, &plugins()).unwrap_err();
        assert!(matches!(err, MarkupError::FrontMatter(_)));
    }

    #[test]
    fn unterminated_front_matter_is_rejected() {
        let src = "---\ntitle: Hello\n\nBody without a closing fence\n";
        let err = CmarkCompiler::new().compile(src, &plugins()).unwrap_err();
        assert!(matches!(err, MarkupError::UnterminatedFrontMatter));
    }

    #[test]
    fn headings_get_generated_ids() {
        let out = CmarkCompiler::new()
            .compile("## Why `Result` matters\n", &plugins())
            .unwrap();
        assert!(out.html.contains(r#"<h2 id="why-result-matters">"#));
        assert!(out.html.contains("<code>Result</code>"));
    }

    #[test]
    fn explicit_heading_id_wins() {
        let out = CmarkCompiler::new()
            .compile("## Setup {#install}\n", &plugins())
            .unwrap();
        assert!(out.html.contains(r#"id="install""#));
    }

    #[test]
    fn fenced_code_is_highlighted_in_both_themes() {
        let src = "```rust\nfn main() {}\n```\n";
        let out = CmarkCompiler::new().compile(src, &plugins()).unwrap();
        assert!(out.html.contains(r#"class="code-block""#));
        assert!(out.html.contains(r#"data-theme="dark""#));
        assert!(out.html.contains(r#"data-theme="light""#));
    }

    #[test]
    fn registered_component_passes_through() {
        let src = "<Callout kind=\"tip\">\n\nRead this.\n\n</Callout>\n";
        let out = CmarkCompiler::new().compile(src, &plugins()).unwrap();
        assert!(out.html.contains("<Callout"));
    }

    #[test]
    fn unknown_component_fails_compile() {
        let src = "Inline <Chart data=\"x\" /> here.\n";
        let err = CmarkCompiler::new().compile(src, &plugins()).unwrap_err();
        assert!(matches!(err, MarkupError::UnknownComponent(ref n) if n == "Chart"));
    }

    #[test]
    fn lowercase_html_is_not_a_component() {
        let out = CmarkCompiler::new()
            .compile("<div class=\"note\">hi</div>\n", &plugins())
            .unwrap();
        assert!(out.html.contains("<div class=\"note\">"));
    }

    #[test]
    fn front_matter_plugin_disabled_leaves_block_in_body() {
        let mut p = plugins();
        p.front_matter = false;
        let out = CmarkCompiler::new()
            .compile("---\ntitle: Hello\n---\n", &p)
            .unwrap();
        assert_eq!(out.front_matter, RawFrontMatter::default());
        assert!(out.html.contains("title: Hello"));
    }

    #[test]
    fn component_tag_scanner_ignores_closing_tags() {
        assert_eq!(component_tags("<Callout>x</Callout>"), vec!["Callout"]);
        assert!(component_tags("<p>a < b</p>").is_empty());
    }
}
