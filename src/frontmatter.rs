//! Front-matter records and their normalisation.
//!
//! Posts open with a YAML block:
//!
//! ```text
//! ---
//! title: Shipping small
//! date: 2024-02-01
//! description: Why tiny releases beat big ones
//! bannerUrl: https://images.unsplash.com/photo-123
//! bannerCredit: Photo by Someone on Unsplash
//! meta:
//!   keywords: [shipping, process]
//! ---
//! ```
//!
//! The markup compiler deserializes that block into a [`RawFrontMatter`]
//! where every key is optional. [`normalize`] then enforces the required
//! keys, parses the date, and produces the [`NormalizedFrontMatter`] that the
//! rest of the pipeline works with.
//!
//! ## Dates
//!
//! `date` accepts `YYYY-MM-DD`, `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD HH:MM:SS`
//! and RFC 3339. The calendar date is displayed as written, in the author's
//! timezone: `2024-03-01T23:30:00-05:00` is "March 1, 2024". Sorting uses the
//! instant the date names, so that post still lists after one dated
//! `2024-03-02T01:00:00Z`. Dates without an offset are read as UTC.
//! An unparseable date is a content error for that post, never a silently
//! mis-sorted entry.

use crate::error::{ContentIssue, PostError};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Display format for dates: "March 1, 2024".
const DISPLAY_DATE_FORMAT: &str = "%B %-d, %Y";

/// Front-matter exactly as authored. Nothing is required at this stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFrontMatter {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub banner_url: Option<String>,
    #[serde(default)]
    pub banner_credit: Option<String>,
    #[serde(default)]
    pub meta: Option<BTreeMap<String, MetaValue>>,
}

/// A `meta` entry: either a single string or a list of strings.
///
/// Any YAML scalar is accepted and kept as text (`readingTime: 5` is `"5"`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum MetaValue {
    Text(String),
    List(Vec<String>),
}

impl<'de> Deserialize<'de> for MetaValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Value::deserialize(deserializer)? {
            Value::Sequence(items) => MetaValue::List(items.iter().map(yaml_text).collect()),
            other => MetaValue::Text(yaml_text(&other)),
        })
    }
}

fn yaml_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Tagged(tagged) => yaml_text(&tagged.value),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().to_string())
            .unwrap_or_default(),
    }
}

impl MetaValue {
    pub fn values(&self) -> Vec<&str> {
        match self {
            MetaValue::Text(s) => vec![s.as_str()],
            MetaValue::List(items) => items.iter().map(String::as_str).collect(),
        }
    }

    /// Comma-joined form, as used in `<meta content=…>`.
    pub fn joined(&self) -> String {
        self.values().join(",")
    }
}

/// Front-matter after validation, ready for display and sorting.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedFrontMatter {
    pub title: String,
    /// Human-readable date, e.g. "March 1, 2024".
    pub date: String,
    /// The date string exactly as authored.
    pub raw_date: String,
    /// The instant `raw_date` names; the chronological sort key.
    #[serde(skip)]
    pub published: DateTime<Utc>,
    pub description: Option<String>,
    pub banner_url: Option<String>,
    pub banner_credit: Option<String>,
    pub meta: BTreeMap<String, MetaValue>,
}

impl NormalizedFrontMatter {
    /// Flattened `meta.keywords`, empty when absent.
    pub fn keywords(&self) -> Vec<&str> {
        self.meta
            .get("keywords")
            .map(MetaValue::values)
            .unwrap_or_default()
    }
}

impl From<&NormalizedFrontMatter> for RawFrontMatter {
    fn from(normalized: &NormalizedFrontMatter) -> Self {
        Self {
            title: Some(normalized.title.clone()),
            date: Some(normalized.raw_date.clone()),
            description: normalized.description.clone(),
            banner_url: normalized.banner_url.clone(),
            banner_credit: normalized.banner_credit.clone(),
            meta: Some(normalized.meta.clone()),
        }
    }
}

/// Validate and normalise the front-matter of post `slug`.
pub fn normalize(slug: &str, raw: RawFrontMatter) -> Result<NormalizedFrontMatter, PostError> {
    let missing = |field| PostError::InvalidContent {
        slug: slug.to_string(),
        issue: ContentIssue::MissingField(field),
    };

    let title = raw
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| missing("title"))?;
    let raw_date = raw
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| missing("date"))?;

    let parsed = parse_date(&raw_date).ok_or_else(|| PostError::InvalidContent {
        slug: slug.to_string(),
        issue: ContentIssue::InvalidDate(raw_date.clone()),
    })?;

    Ok(NormalizedFrontMatter {
        title,
        date: format_date(parsed.written),
        raw_date,
        published: parsed.instant,
        description: raw.description,
        banner_url: raw.banner_url,
        banner_credit: raw.banner_credit,
        meta: raw.meta.unwrap_or_default(),
    })
}

/// A parsed `date`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthoredDate {
    /// Date and time as written, in the author's timezone.
    pub written: NaiveDateTime,
    /// The instant it names; offset-less dates are taken as UTC.
    pub instant: DateTime<Utc>,
}

pub fn parse_date(raw: &str) -> Option<AuthoredDate> {
    let s = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(AuthoredDate {
            written: dt.naive_local(),
            instant: dt.with_timezone(&Utc),
        });
    }
    let written = match NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        Ok(date) => date.and_hms_opt(0, 0, 0)?,
        Err(_) => NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
            .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
            .ok()?,
    };
    Some(AuthoredDate {
        written,
        instant: written.and_utc(),
    })
}

pub fn format_date(published: NaiveDateTime) -> String {
    published.format(DISPLAY_DATE_FORMAT).to_string()
}
