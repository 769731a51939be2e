//! Product feed - fetch products from the API and hold the current result
//!
//! Each request draws a generation number before it is sent. Only the
//! response belonging to the newest generation is applied; anything older
//! that arrives late is discarded, so a slow search can never overwrite a
//! faster one issued after it.

use anyhow::{Context, Result};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use super::api_client::{CatalogApiClient, ProductQuery};
use crate::config::DEFAULT_PAGE_LIMIT;
use crate::domain::{DomainEvent, PaginationInfo, Product, ProductId, ProductType};
use crate::event_bus::EventSender;
use crate::repository::{cache_keys, CacheScope, ClientCacheRepository};

/// The only error text the feed ever exposes
pub const ERROR_MESSAGE: &str = "Failed to load products. Please try again later.";

/// Snapshot of what the feed currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub products: Vec<Product>,
    pub pagination: Option<PaginationInfo>,
    pub loading: bool,
    pub error: Option<String>,
    /// Generation of the response currently applied (0 = none yet)
    pub generation: u64,
}

pub struct ProductFeed {
    client: CatalogApiClient,
    events: EventSender,
    cache: Option<Arc<dyn ClientCacheRepository>>,
    state: RwLock<FeedState>,
    latest: AtomicU64,
    page_limit: u32,
}

impl ProductFeed {
    pub fn new(client: CatalogApiClient, events: EventSender) -> Self {
        Self {
            client,
            events,
            cache: None,
            state: RwLock::new(FeedState::default()),
            latest: AtomicU64::new(0),
            page_limit: DEFAULT_PAGE_LIMIT,
        }
    }

    /// Use a client cache for product detail lookups
    pub fn with_cache(mut self, cache: Arc<dyn ClientCacheRepository>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Page size used by search and filter requests
    pub fn with_page_limit(mut self, limit: u32) -> Self {
        self.page_limit = limit.max(1);
        self
    }

    pub async fn snapshot(&self) -> FeedState {
        self.state.read().await.clone()
    }

    /// Generation of the most recently issued request
    pub fn latest_generation(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }

    pub async fn fetch_products(&self, page: u32, limit: u32) -> FeedState {
        self.load(ProductQuery::page(page, limit)).await
    }

    pub async fn search_products(&self, query: &str) -> FeedState {
        let mut request = ProductQuery::page(1, self.page_limit);
        let query = query.trim();
        if !query.is_empty() {
            request = request.with_search(query);
        }
        self.load(request).await
    }

    pub async fn filter_by_category(&self, category: &str) -> FeedState {
        self.load(ProductQuery::page(1, self.page_limit).with_category(category))
            .await
    }

    pub async fn filter_by_product_type(&self, product_type: ProductType) -> FeedState {
        self.load(ProductQuery::page(1, self.page_limit).with_product_type(product_type))
            .await
    }

    pub async fn fetch_featured(&self, limit: u32) -> Result<Vec<Product>> {
        let products = self
            .client
            .fetch_featured(limit)
            .await
            .context("Failed to fetch featured products")?;
        info!("[ProductFeed] Loaded {} featured products", products.len());
        Ok(products)
    }

    /// Product detail: session cache, then the cached custom list, then the API.
    pub async fn get_product(&self, id: &ProductId) -> Result<Option<Product>> {
        if let Some(product) = self.cached_product(id).await {
            debug!(id = %id, "[ProductFeed] Product served from session cache");
            return Ok(Some(product));
        }

        let product = self
            .client
            .fetch_product(id)
            .await
            .with_context(|| format!("Failed to fetch product {}", id))?;

        if let (Some(product), Some(cache)) = (&product, &self.cache) {
            let json = serde_json::to_string(product)?;
            if let Err(e) = cache
                .set(CacheScope::Session, &cache_keys::product(id), &json)
                .await
            {
                warn!(id = %id, error = %e, "[ProductFeed] Failed to cache product");
            }
        }

        Ok(product)
    }

    async fn cached_product(&self, id: &ProductId) -> Option<Product> {
        let cache = self.cache.as_ref()?;

        match cache.get(CacheScope::Session, &cache_keys::product(id)).await {
            Ok(Some(json)) => match serde_json::from_str::<Product>(&json) {
                Ok(product) => return Some(product),
                Err(e) => warn!(id = %id, error = %e, "[ProductFeed] Ignoring corrupt cache entry"),
            },
            Ok(None) => {}
            Err(e) => warn!(error = %e, "[ProductFeed] Cache read failed"),
        }

        let list = cache
            .get(CacheScope::Session, cache_keys::CACHED_CUSTOM_PRODUCTS)
            .await
            .ok()
            .flatten()?;
        let wanted = id.to_string();
        serde_json::from_str::<Vec<Product>>(&list)
            .ok()?
            .into_iter()
            .find(|p| p.id.to_string() == wanted)
    }

    async fn load(&self, query: ProductQuery) -> FeedState {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.state.write().await.loading = true;

        debug!(generation, page = query.page, "[ProductFeed] Requesting products");
        let result = self.client.fetch_products(&query).await;

        let mut state = self.state.write().await;
        let latest = self.latest.load(Ordering::SeqCst);
        if generation != latest {
            debug!(generation, latest, "[ProductFeed] Discarding stale response");
            self.events
                .emit(DomainEvent::StaleResponseDiscarded { generation, latest });
            return state.clone();
        }

        match result {
            Ok(page) => {
                self.events.emit(DomainEvent::ProductsLoaded {
                    generation,
                    count: page.products.len(),
                    page: page.pagination.page,
                });
                state.products = page.products;
                state.pagination = Some(page.pagination);
                state.error = None;
            }
            Err(e) => {
                warn!(generation, error = %e, "[ProductFeed] Failed to load products");
                self.events.emit(DomainEvent::ProductsLoadFailed {
                    generation,
                    error: e.to_string(),
                });
                state.products.clear();
                state.pagination = None;
                state.error = Some(ERROR_MESSAGE.to_string());
            }
        }
        state.loading = false;
        state.generation = generation;
        state.clone()
    }
}
