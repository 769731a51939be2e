//! Product entity - a catalog listing (MCP server, client, agent, bundle)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Placeholder shown when a product has no description
pub const DESCRIPTION_PLACEHOLDER: &str = "No description available.";

/// Asset used when a product has no image
pub const FALLBACK_PRODUCT_IMAGE: &str = "/assets/images/product-placeholder.png";

/// Product identifier.
///
/// The catalog API is inconsistent: some endpoints return numeric IDs,
/// others return strings. Both are accepted and kept as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl ProductId {
    /// Numeric value, if the ID is a number or a numeric string
    pub fn as_number(&self) -> Option<i64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for ProductId {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<i64> for ProductId {
    fn from(value: i64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for ProductId {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

/// Catalog taxonomy value
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ProductType {
    McpServer,
    McpClient,
    AiAgent,
    ReadyToUse,
    /// Anything the catalog sends that we don't know about yet
    Other(String),
}

impl ProductType {
    pub fn as_str(&self) -> &str {
        match self {
            Self::McpServer => "mcp_server",
            Self::McpClient => "mcp_client",
            Self::AiAgent => "ai_agent",
            Self::ReadyToUse => "ready_to_use",
            Self::Other(s) => s,
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mcp_server" => Self::McpServer,
            "mcp_client" => Self::McpClient,
            "ai_agent" => Self::AiAgent,
            "ready_to_use" => Self::ReadyToUse,
            _ => Self::Other(s.to_string()),
        }
    }

    /// Friendly label used in listings
    pub fn display_label(&self) -> &str {
        match self {
            Self::McpServer => "MCP Server",
            Self::McpClient => "MCP Client",
            Self::AiAgent => "AI Agent",
            Self::ReadyToUse => "Ready to Use",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for ProductType {
    fn from(value: String) -> Self {
        Self::from_str(&value)
    }
}

impl From<ProductType> for String {
    fn from(value: ProductType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for ProductType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_label())
    }
}

/// Raw `stars` value; the API sends either a number or a display string like "1.2k"
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StarsValue {
    Number(f64),
    Text(String),
}

impl StarsValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => parse_star_label(s),
        }
    }
}

/// Parse a star label such as "950", "1.2k" or "3M"
fn parse_star_label(label: &str) -> Option<f64> {
    let trimmed = label.trim().replace(',', "");
    let lower = trimmed.to_ascii_lowercase();
    let (digits, multiplier) = if let Some(rest) = lower.strip_suffix('k') {
        (rest, 1_000.0)
    } else if let Some(rest) = lower.strip_suffix('m') {
        (rest, 1_000_000.0)
    } else {
        (lower.as_str(), 1.0)
    };
    digits.trim().parse::<f64>().ok().map(|v| v * multiplier)
}

fn null_as_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0))
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// A catalog listing as returned by `GET /products`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Single category (older listings)
    #[serde(default)]
    pub category: Option<String>,

    /// Multiple categories (newer listings)
    #[serde(default, deserialize_with = "null_as_empty")]
    pub categories: Vec<String>,

    #[serde(default, rename = "type", alias = "product_type", alias = "productType")]
    pub product_type: Option<ProductType>,

    #[serde(default, alias = "starsNumeric")]
    pub stars_numeric: Option<f64>,

    #[serde(default)]
    pub stars: Option<StarsValue>,

    /// Price in USD, 0 means free
    #[serde(default, deserialize_with = "null_as_zero")]
    pub price: f64,

    #[serde(default, deserialize_with = "null_as_false")]
    pub official: bool,

    #[serde(default, alias = "isFeatured", deserialize_with = "null_as_false")]
    pub is_featured: bool,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: Vec<String>,

    #[serde(default, alias = "image", alias = "imageUrl")]
    pub image_url: Option<String>,

    /// Creation timestamp (RFC 3339), when the backend provides one
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

impl Product {
    /// Create a minimal product (mostly for tests and fixtures)
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            category: None,
            categories: Vec::new(),
            product_type: None,
            stars_numeric: None,
            stars: None,
            price: 0.0,
            official: false,
            is_featured: false,
            tags: Vec::new(),
            image_url: None,
            created_at: None,
        }
    }

    /// Popularity measure: `stars_numeric` if present, else a parsed `stars`
    pub fn popularity(&self) -> Option<f64> {
        self.stars_numeric
            .or_else(|| self.stars.as_ref().and_then(StarsValue::as_f64))
    }

    /// All categories this product belongs to (`category` first, then `categories`)
    pub fn all_categories(&self) -> impl Iterator<Item = &str> {
        self.category
            .iter()
            .map(String::as_str)
            .chain(self.categories.iter().map(String::as_str))
            .filter(|c| !c.trim().is_empty())
    }

    /// The category used for grouping rows
    pub fn primary_category(&self) -> Option<&str> {
        self.all_categories().next()
    }

    pub fn is_free(&self) -> bool {
        self.price <= 0.0
    }

    pub fn description_or_placeholder(&self) -> &str {
        match self.description.as_deref() {
            Some(d) if !d.trim().is_empty() => d,
            _ => DESCRIPTION_PLACEHOLDER,
        }
    }

    pub fn image_or_fallback(&self) -> &str {
        match self.image_url.as_deref() {
            Some(url) if !url.trim().is_empty() => url,
            _ => FALLBACK_PRODUCT_IMAGE,
        }
    }

    /// Parsed creation time, if present and well-formed
    pub fn created_at_time(&self) -> Option<DateTime<Utc>> {
        self.created_at
            .as_deref()
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Label for the product type, "Unknown" when missing
    pub fn type_label(&self) -> &str {
        self.product_type
            .as_ref()
            .map(ProductType::display_label)
            .unwrap_or("Unknown")
    }
}

/// Pagination metadata returned alongside a product page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationInfo {
    pub page: u32,
    pub limit: u32,
    #[serde(default)]
    pub total: u64,
    #[serde(default, alias = "totalPages")]
    pub total_pages: u32,
}

impl PaginationInfo {
    /// Build metadata for a page when the server did not send any
    pub fn derived(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        Self {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit as u64) as u32,
        }
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }
}
