//! Domain Events - what happened in the catalog client
//!
//! Events are emitted by the services and consumed by whatever renders
//! the catalog (the CLI, a UI bridge, tests). They replace ad hoc global
//! flags: anything that used to poke a shared flag now emits an event
//! and updates [`crate::AppState`].

use serde::{Deserialize, Serialize};

use super::DataStatus;

/// Kind of admin content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Course,
    News,
}

impl ContentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Course => "course",
            Self::News => "news",
        }
    }
}

/// Where a news feed was served from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NewsSource {
    Api,
    LocalCache,
    Examples,
}

/// All domain events.
///
/// Events serialize with a `type` field containing the snake_case variant name:
/// ```json
/// { "type": "data_status_changed", "previous": "unavailable", "current": "connected" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DomainEvent {
    // ════════════════════════════════════════════════════════════════════════
    // BACKEND STATUS
    // ════════════════════════════════════════════════════════════════════════
    /// The data status reported by the backend changed
    DataStatusChanged {
        previous: DataStatus,
        current: DataStatus,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
    },

    // ════════════════════════════════════════════════════════════════════════
    // PRODUCT FEED
    // ════════════════════════════════════════════════════════════════════════
    /// A product request completed and its result was applied
    ProductsLoaded {
        generation: u64,
        count: usize,
        page: u32,
    },

    /// A product request failed and the feed now shows the error banner
    ProductsLoadFailed { generation: u64, error: String },

    /// A response arrived after a newer request had been issued and was dropped
    StaleResponseDiscarded { generation: u64, latest: u64 },

    // ════════════════════════════════════════════════════════════════════════
    // NEWS
    // ════════════════════════════════════════════════════════════════════════
    /// A news feed was loaded
    NewsLoaded { source: NewsSource, count: usize },

    // ════════════════════════════════════════════════════════════════════════
    // ADMIN
    // ════════════════════════════════════════════════════════════════════════
    /// An image was uploaded for a form
    AssetUploaded { kind: ContentKind, url: String },

    /// Content was created on the backend
    ContentSubmitted { kind: ContentKind, slug: String },

    /// The upload succeeded but the submission did not, leaving the asset unreferenced
    AssetOrphaned { kind: ContentKind, url: String },
}

impl DomainEvent {
    /// Get the event type name (for logging/debugging)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::DataStatusChanged { .. } => "data_status_changed",
            Self::ProductsLoaded { .. } => "products_loaded",
            Self::ProductsLoadFailed { .. } => "products_load_failed",
            Self::StaleResponseDiscarded { .. } => "stale_response_discarded",
            Self::NewsLoaded { .. } => "news_loaded",
            Self::AssetUploaded { .. } => "asset_uploaded",
            Self::ContentSubmitted { .. } => "content_submitted",
            Self::AssetOrphaned { .. } => "asset_orphaned",
        }
    }

    /// Request generation, if this event belongs to a product request
    pub fn generation(&self) -> Option<u64> {
        match self {
            Self::ProductsLoaded { generation, .. }
            | Self::ProductsLoadFailed { generation, .. }
            | Self::StaleResponseDiscarded { generation, .. } => Some(*generation),
            _ => None,
        }
    }

    /// Whether a UI should surface this event to the user
    pub fn is_user_visible(&self) -> bool {
        matches!(
            self,
            Self::DataStatusChanged { .. }
                | Self::ProductsLoadFailed { .. }
                | Self::ContentSubmitted { .. }
                | Self::AssetOrphaned { .. }
        )
    }
}
