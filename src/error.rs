//! Per-post error taxonomy.
//!
//! Every failure that concerns a single post is a [`PostError`], and every
//! variant names the slug it belongs to. Callers decide whether a failure is
//! fatal for the request: the detail view turns any error into an error page,
//! the listing view drops the failing post and keeps rendering the rest.
//!
//! `PostError` is `Clone` so the compile cache can hand the same outcome to
//! every request waiting on a key.

use crate::markup::MarkupError;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum PostError {
    #[error("post not found: {0}")]
    NotFound(String),
    #[error("invalid content in post '{slug}': {issue}")]
    InvalidContent { slug: String, issue: ContentIssue },
    #[error("failed to compile post '{slug}': {source}")]
    Compile {
        slug: String,
        #[source]
        source: MarkupError,
    },
}

impl PostError {
    /// Slug of the post this error is about.
    pub fn slug(&self) -> &str {
        match self {
            PostError::NotFound(slug) => slug,
            PostError::InvalidContent { slug, .. } => slug,
            PostError::Compile { slug, .. } => slug,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PostError::NotFound(_))
    }
}

/// What is wrong with a post's front-matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentIssue {
    /// A required key (`title`, `date`) is absent or blank.
    MissingField(&'static str),
    /// `date` is present but is not a calendar date.
    InvalidDate(String),
}

impl fmt::Display for ContentIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContentIssue::MissingField(field) => {
                write!(f, "missing required front-matter field `{field}`")
            }
            ContentIssue::InvalidDate(raw) => write!(f, "`date` is not a valid date: {raw:?}"),
        }
    }
}
