//! News feed with graceful degradation.
//!
//! Articles come from the API when it answers, otherwise from the last feed
//! cached locally, otherwise from the bundled example articles. The feed is
//! never empty-handed and never surfaces a transport error.

use anyhow::Result;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::api_client::CatalogApiClient;
use crate::domain::{
    example_articles, validate_articles, DomainEvent, NewsArticle, NewsCategory, NewsSource,
};
use crate::event_bus::EventSender;
use crate::repository::{cache_keys, CacheScope, ClientCacheRepository};
use crate::state::SharedAppState;

/// Articles plus where they came from
#[derive(Debug, Clone, PartialEq)]
pub struct NewsFeed {
    pub articles: Vec<NewsArticle>,
    pub source: NewsSource,
}

impl NewsFeed {
    pub fn is_fallback(&self) -> bool {
        self.source != NewsSource::Api
    }
}

pub struct NewsService {
    client: CatalogApiClient,
    cache: Arc<dyn ClientCacheRepository>,
    state: SharedAppState,
    events: EventSender,
}

impl NewsService {
    pub fn new(
        client: CatalogApiClient,
        cache: Arc<dyn ClientCacheRepository>,
        state: SharedAppState,
        events: EventSender,
    ) -> Self {
        Self {
            client,
            cache,
            state,
            events,
        }
    }

    pub async fn load_news(&self) -> NewsFeed {
        let feed = match self.from_api().await {
            Some(articles) => NewsFeed {
                articles,
                source: NewsSource::Api,
            },
            None => match self.from_cache().await {
                Some(articles) => NewsFeed {
                    articles,
                    source: NewsSource::LocalCache,
                },
                None => NewsFeed {
                    articles: example_articles(),
                    source: NewsSource::Examples,
                },
            },
        };

        info!(
            source = ?feed.source,
            count = feed.articles.len(),
            "[NewsService] News loaded"
        );
        self.state.record_news_source(feed.source).await;
        self.events.emit(DomainEvent::NewsLoaded {
            source: feed.source,
            count: feed.articles.len(),
        });
        feed
    }

    /// Categories from the API, or counted from `articles` when it fails
    pub async fn load_categories(&self, articles: &[NewsArticle]) -> Vec<NewsCategory> {
        match self.client.fetch_news_categories().await {
            Ok(categories) if !categories.is_empty() => categories,
            Ok(_) => categories_from_articles(articles),
            Err(e) => {
                debug!(error = %e, "[NewsService] Categories unavailable, deriving locally");
                categories_from_articles(articles)
            }
        }
    }

    /// Fetch and validate; `None` when the API fails or yields nothing.
    /// A usable response also refreshes the local cache.
    async fn from_api(&self) -> Option<Vec<NewsArticle>> {
        let raw = match self.client.fetch_news().await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "[NewsService] News API unavailable");
                return None;
            }
        };

        let articles = validate_articles(raw);
        if articles.is_empty() {
            return None;
        }

        if let Err(e) = self.write_cache(&articles).await {
            warn!(error = %e, "[NewsService] Failed to cache news");
        }
        Some(articles)
    }

    async fn from_cache(&self) -> Option<Vec<NewsArticle>> {
        let json = match self.cache.get(CacheScope::Local, cache_keys::NEWS_DATA).await {
            Ok(json) => json?,
            Err(e) => {
                warn!(error = %e, "[NewsService] Failed to read news cache");
                return None;
            }
        };

        match serde_json::from_str::<Vec<NewsArticle>>(&json) {
            Ok(articles) if !articles.is_empty() => Some(articles),
            Ok(_) => None,
            Err(e) => {
                warn!(error = %e, "[NewsService] Ignoring corrupt news cache");
                None
            }
        }
    }

    async fn write_cache(&self, articles: &[NewsArticle]) -> Result<()> {
        let json = serde_json::to_string(articles)?;
        self.cache
            .set(CacheScope::Local, cache_keys::NEWS_DATA, &json)
            .await
    }
}

/// Count articles per category, sorted by name
pub fn categories_from_articles(articles: &[NewsArticle]) -> Vec<NewsCategory> {
    let mut counts: BTreeMap<&str, u32> = BTreeMap::new();
    for article in articles {
        *counts.entry(article.category.as_str()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(name, count)| NewsCategory {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            count: Some(count),
        })
        .collect()
}
