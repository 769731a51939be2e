//! News articles and the fallback-filling validation applied to every feed item

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Summaries longer than this are truncated (an ellipsis is appended)
pub const MAX_SUMMARY_CHARS: usize = 250;

pub const DEFAULT_TITLE: &str = "Untitled Article";
pub const DEFAULT_SUMMARY: &str = "No summary available.";
pub const DEFAULT_CATEGORY: &str = "General";
pub const DEFAULT_AUTHOR: &str = "McpMart Editorial";
pub const DEFAULT_SOURCE: &str = "McpMart";
pub const FALLBACK_NEWS_IMAGE: &str = "/assets/images/news-placeholder.png";

/// Article as it arrives from the API or the local cache; anything may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawArticle {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "excerpt")]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default, alias = "published_at", alias = "publishedAt")]
    pub date: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, alias = "image", alias = "imageUrl")]
    pub image_url: Option<String>,
    #[serde(default, alias = "link")]
    pub url: Option<String>,
}

/// A news article with every display field populated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub summary: String,
    pub content: Option<String>,
    pub date: String,
    pub category: String,
    pub tags: Vec<String>,
    pub author: String,
    pub source: String,
    pub image_url: String,
    pub url: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn id_to_string(value: serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Truncate to [`MAX_SUMMARY_CHARS`] characters plus "..." when longer
pub fn truncate_summary(summary: &str) -> String {
    if summary.chars().count() > MAX_SUMMARY_CHARS {
        let mut truncated: String = summary.chars().take(MAX_SUMMARY_CHARS).collect();
        truncated.push_str("...");
        truncated
    } else {
        summary.to_string()
    }
}

/// Fill every missing field of a raw article with its fallback value.
pub fn validate_article(raw: RawArticle) -> NewsArticle {
    let id = raw
        .id
        .and_then(id_to_string)
        .unwrap_or_else(|| format!("news-{}", Uuid::new_v4()));

    let summary = non_blank(raw.summary)
        .map(|s| truncate_summary(&s))
        .unwrap_or_else(|| DEFAULT_SUMMARY.to_string());

    NewsArticle {
        id,
        title: non_blank(raw.title).unwrap_or_else(|| DEFAULT_TITLE.to_string()),
        summary,
        content: non_blank(raw.content),
        date: non_blank(raw.date).unwrap_or_else(|| Utc::now().format("%Y-%m-%d").to_string()),
        category: non_blank(raw.category).unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        tags: raw.tags.unwrap_or_default(),
        author: non_blank(raw.author).unwrap_or_else(|| DEFAULT_AUTHOR.to_string()),
        source: non_blank(raw.source).unwrap_or_else(|| DEFAULT_SOURCE.to_string()),
        image_url: non_blank(raw.image_url).unwrap_or_else(|| FALLBACK_NEWS_IMAGE.to_string()),
        url: non_blank(raw.url),
    }
}

/// Validate a whole feed
pub fn validate_articles(raw: Vec<RawArticle>) -> Vec<NewsArticle> {
    raw.into_iter().map(validate_article).collect()
}

/// Articles shown when neither the API nor the local cache has anything.
pub fn example_articles() -> Vec<NewsArticle> {
    let seed = [
        (
            "example-1",
            "Welcome to the McpMart marketplace",
            "Browse MCP servers, clients, AI agents and ready-to-use bundles in one catalog.",
            "Announcements",
            vec!["marketplace", "mcp"],
        ),
        (
            "example-2",
            "Choosing between an MCP server and an MCP client",
            "Servers expose tools and data to models; clients connect models to those servers. Here is how to pick.",
            "Guides",
            vec!["mcp", "guide"],
        ),
        (
            "example-3",
            "Official listings are now badged",
            "Listings published by the vendor behind the integrated service now carry an official badge.",
            "Product Updates",
            vec!["official", "catalog"],
        ),
    ];

    seed.into_iter()
        .map(|(id, title, summary, category, tags)| {
            validate_article(RawArticle {
                id: Some(serde_json::Value::String(id.to_string())),
                title: Some(title.to_string()),
                summary: Some(summary.to_string()),
                category: Some(category.to_string()),
                tags: Some(tags.into_iter().map(String::from).collect()),
                date: Some("2025-01-01".to_string()),
                ..RawArticle::default()
            })
        })
        .collect()
}

/// News category as returned by `GET /news/categories`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsCategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub count: Option<u32>,
}
