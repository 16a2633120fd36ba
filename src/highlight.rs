//! Code block highlighting with a dark/light theme pair.
//!
//! Each fenced block is highlighted once per theme. The page stylesheet shows
//! the variant matching `prefers-color-scheme` and hides the other, so code
//! follows the reader's colour scheme without any client-side script:
//!
//! ```text
//! <div class="code-block" data-language="rust">
//!   <div data-theme="dark"><pre style="…">…</pre></div>
//!   <div data-theme="light"><pre style="…">…</pre></div>
//! </div>
//! ```
//!
//! Syntax and theme sets are syntect's bundled defaults, loaded once per
//! [`Highlighter`] (which is the expensive part) and shared read-only.

use crate::markup::{MarkupError, ThemePair};
use std::sync::Arc;
use syntect::highlighting::ThemeSet;
use syntect::html::highlighted_html_for_string;
use syntect::parsing::SyntaxSet;

pub struct Highlighter {
    syntaxes: SyntaxSet,
    themes: ThemeSet,
}

impl Highlighter {
    pub fn new() -> Self {
        Self {
            syntaxes: SyntaxSet::load_defaults_newlines(),
            themes: ThemeSet::load_defaults(),
        }
    }

    pub fn has_theme(&self, name: &str) -> bool {
        self.themes.themes.contains_key(name)
    }

    /// Names of all bundled themes, sorted.
    pub fn theme_names(&self) -> Vec<&str> {
        self.themes.themes.keys().map(String::as_str).collect()
    }

    /// Highlight `code` in both themes of `pair`.
    ///
    /// Unknown or missing languages fall back to plain text.
    pub fn highlight(
        &self,
        code: &str,
        language: Option<&str>,
        pair: &ThemePair,
    ) -> Result<String, MarkupError> {
        let syntax = language
            .and_then(|lang| self.syntaxes.find_syntax_by_token(lang))
            .unwrap_or_else(|| self.syntaxes.find_syntax_plain_text());

        let mut html = String::with_capacity(code.len() * 8);
        html.push_str("<div class=\"code-block\"");
        if let Some(lang) = language {
            html.push_str(" data-language=\"");
            html.push_str(&escape_attr(lang));
            html.push('"');
        }
        html.push('>');

        for (variant, theme_name) in [("dark", &pair.dark), ("light", &pair.light)] {
            let theme = self
                .themes
                .themes
                .get(theme_name)
                .ok_or_else(|| MarkupError::UnknownTheme(theme_name.clone()))?;
            let highlighted = highlighted_html_for_string(code, &self.syntaxes, syntax, theme)
                .map_err(|e| MarkupError::Highlight {
                    language: language.unwrap_or("text").to_string(),
                    source: Arc::new(e),
                })?;
            html.push_str("<div data-theme=\"");
            html.push_str(variant);
            html.push_str("\">");
            html.push_str(&highlighted);
            html.push_str("</div>");
        }

        html.push_str("</div>\n");
        Ok(html)
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
    }
}

fn escape_attr(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
