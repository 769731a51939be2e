//! Shared application status
//!
//! Owned state that the status monitor and the news service write and
//! that renderers read. Passed around as `Arc<AppState>`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::{DataStatus, NewsSource};

/// Point-in-time copy of the application status
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AppStatus {
    pub data_status: DataStatus,
    pub status_message: Option<String>,
    /// Set when either the backend or the news feed is serving fallback data
    pub using_fallback_data: bool,
    pub news_source: Option<NewsSource>,
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Debug, Default)]
pub struct AppState {
    inner: RwLock<AppStatus>,
}

pub type SharedAppState = Arc<AppState>;

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedAppState {
        Arc::new(Self::new())
    }

    pub async fn snapshot(&self) -> AppStatus {
        self.inner.read().await.clone()
    }

    pub async fn data_status(&self) -> DataStatus {
        self.inner.read().await.data_status
    }

    /// Record a status check. Returns the previous status if it changed.
    pub async fn record_data_status(
        &self,
        status: DataStatus,
        message: Option<String>,
    ) -> Option<DataStatus> {
        let mut inner = self.inner.write().await;
        let previous = inner.data_status;
        inner.data_status = status;
        inner.status_message = message;
        inner.last_checked = Some(Utc::now());
        inner.using_fallback_data = status != DataStatus::Connected
            || matches!(inner.news_source, Some(NewsSource::Examples | NewsSource::LocalCache));
        (previous != status).then_some(previous)
    }

    /// Record where the news feed was last served from
    pub async fn record_news_source(&self, source: NewsSource) {
        let mut inner = self.inner.write().await;
        inner.news_source = Some(source);
        inner.using_fallback_data = inner.data_status != DataStatus::Connected
            || matches!(source, NewsSource::Examples | NewsSource::LocalCache);
    }
}
