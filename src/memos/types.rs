//! Memo wire types
//!
//! Defines the memo record, its category set, request payloads and the
//! API error envelope. All types use camelCase JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel category value meaning "no category restriction"
pub const ALL_CATEGORIES: &str = "all";

/// Minimum trimmed content length before summaries or tags can be generated
pub const MIN_ENRICHMENT_CHARS: usize = 10;

/// Memo category
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemoCategory {
    #[default]
    Personal,
    Work,
    Study,
    Idea,
    Other,
}

impl MemoCategory {
    pub const ALL: [MemoCategory; 5] = [
        Self::Personal,
        Self::Work,
        Self::Study,
        Self::Idea,
        Self::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "personal",
            Self::Work => "work",
            Self::Study => "study",
            Self::Idea => "idea",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for MemoCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MemoCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personal" => Ok(Self::Personal),
            "work" => Ok(Self::Work),
            "study" => Ok(Self::Study),
            "idea" => Ok(Self::Idea),
            "other" => Ok(Self::Other),
            other => Err(format!("unknown memo category: {}", other)),
        }
    }
}

/// Category restriction for list queries and the client view.
///
/// `Unknown` keeps a category string that names no real category; it
/// matches nothing rather than failing the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(MemoCategory),
    Unknown(String),
}

impl CategoryFilter {
    /// Parse a query-string value; absent, blank and `all` mean no restriction
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some(ALL_CATEGORIES) => Self::All,
            Some(v) => match v.parse() {
                Ok(category) => Self::Only(category),
                Err(_) => Self::Unknown(v.to_string()),
            },
        }
    }

    pub fn matches(&self, category: MemoCategory) -> bool {
        match self {
            Self::All => true,
            Self::Only(c) => *c == category,
            Self::Unknown(_) => false,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::All => ALL_CATEGORIES,
            Self::Only(c) => c.as_str(),
            Self::Unknown(s) => s,
        }
    }
}

/// A single memo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memo {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: MemoCategory,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memo {
    /// Whether title, content or any tag contains the lowercased query
    pub fn matches_text(&self, query_lower: &str, include_tags: bool) -> bool {
        self.title.to_lowercase().contains(query_lower)
            || self.content.to_lowercase().contains(query_lower)
            || (include_tags
                && self
                    .tags
                    .iter()
                    .any(|t| t.to_lowercase().contains(query_lower)))
    }

    /// Whether the content is long enough for summaries and tag generation
    pub fn is_enrichable(&self) -> bool {
        self.content.trim().chars().count() >= MIN_ENRICHMENT_CHARS
    }
}

/// List query parameters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListMemosQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
}

/// Parsed list filter
#[derive(Debug, Clone, Default)]
pub struct MemoFilter {
    pub category: CategoryFilter,
    pub search: Option<String>,
}

impl From<ListMemosQuery> for MemoFilter {
    fn from(query: ListMemosQuery) -> Self {
        Self {
            category: CategoryFilter::parse(query.category.as_deref()),
            search: query.search.filter(|s| !s.trim().is_empty()),
        }
    }
}

/// Request body for creating a memo.
///
/// Title and content default to empty so a missing field is reported as a
/// validation failure instead of a body rejection.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateMemoRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MemoCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Partial update request; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateMemoRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<MemoCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

impl UpdateMemoRequest {
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Default::default()
        }
    }
}

/// Memo row ready to insert; the store assigns nothing beyond what is here
#[derive(Debug, Clone)]
pub struct NewMemo {
    pub id: String,
    pub title: String,
    pub content: String,
    pub category: MemoCategory,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Cached summary response (`summary` is null when none exists)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: Option<String>,
}

/// Delete acknowledgement
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub success: bool,
}

/// Seed outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skipped: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
}

impl SeedResponse {
    pub fn skipped() -> Self {
        Self {
            message: "Seed data already exists".to_string(),
            skipped: Some(true),
            count: None,
        }
    }

    pub fn created(count: usize) -> Self {
        Self {
            message: "Seed data created successfully".to_string(),
            skipped: None,
            count: Some(count),
        }
    }
}

/// API error response
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorDetail,
}

/// API error detail
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: String,
    pub message: String,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ApiErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new("BAD_REQUEST", message)
    }
}

/// Normalize a tag list: trim, drop empties, lowercase, and keep the first
/// occurrence of each tag.
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for tag in tags {
        let tag = tag.as_ref().trim();
        if tag.is_empty() {
            continue;
        }
        let tag = tag.to_lowercase();
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}
