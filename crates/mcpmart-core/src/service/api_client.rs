//! HTTP client for the McpMart REST API.
//!
//! Every endpoint the catalog front end talks to goes through here, against
//! one configured base URL. Failures keep a typed taxonomy ([`ApiError`]);
//! the services above decide how much of it the user gets to see.
//!
//! The backend is not consistent about envelopes: list endpoints answer
//! either with a bare JSON array or with `{ "data": [...], "pagination": {...} }`.
//! Both shapes are accepted.

use reqwest::{multipart, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ClientConfig;
use crate::domain::{
    CreatedRecord, DataStatusReport, ImageFile, NewsCategory, PaginationInfo, Product, ProductId,
    ProductType, RawArticle, UploadedAsset,
};

/// Transport-level failure
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("API returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(404)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else if err.is_builder() {
            Self::InvalidRequest(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEnvelope<T> {
    Wrapped {
        #[serde(alias = "products", alias = "articles", alias = "items", alias = "categories")]
        data: Vec<T>,
        #[serde(default)]
        pagination: Option<PaginationInfo>,
        #[serde(default)]
        total: Option<u64>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    fn into_parts(self) -> (Vec<T>, Option<PaginationInfo>, Option<u64>) {
        match self {
            Self::Wrapped {
                data,
                pagination,
                total,
            } => (data, pagination, total),
            Self::Bare(items) => (items, None, None),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ItemEnvelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> ItemEnvelope<T> {
    fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } => data,
            Self::Bare(item) => item,
        }
    }
}

/// News categories come back either as objects or as plain names
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CategoryEntry {
    Full(NewsCategory),
    Name(String),
}

impl From<CategoryEntry> for NewsCategory {
    fn from(entry: CategoryEntry) -> Self {
        match entry {
            CategoryEntry::Full(category) => category,
            CategoryEntry::Name(name) => NewsCategory {
                id: name.clone(),
                name,
                count: None,
            },
        }
    }
}

/// Query for `GET /products`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub language: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
    pub product_type: Option<ProductType>,
}

impl ProductQuery {
    pub fn page(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
            ..Self::default()
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_type = Some(product_type);
        self
    }

    /// Query-string pairs, in a stable order
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("page", self.page.to_string()), ("limit", self.limit.to_string())];
        if let Some(ref language) = self.language {
            pairs.push(("language", language.clone()));
        }
        if let Some(ref search) = self.search {
            pairs.push(("search", search.clone()));
        }
        if let Some(ref category) = self.category {
            pairs.push(("category", category.clone()));
        }
        if let Some(ref product_type) = self.product_type {
            pairs.push(("type", product_type.as_str().to_string()));
        }
        pairs
    }
}

/// One page of products with its pagination metadata
#[derive(Debug, Clone, PartialEq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub pagination: PaginationInfo,
}

/// Where an image upload goes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadTarget {
    /// `POST /admin/upload`
    Admin,
    /// `POST /media/upload/{kind}`
    Media(String),
}

impl UploadTarget {
    pub fn path(&self) -> String {
        match self {
            Self::Admin => "/admin/upload".to_string(),
            Self::Media(kind) => format!("/media/upload/{}", urlencoding::encode(kind)),
        }
    }
}

/// Client for the McpMart REST API
#[derive(Clone)]
pub struct CatalogApiClient {
    base_url: String,
    language: String,
    client: reqwest::Client,
}

impl CatalogApiClient {
    pub fn new(config: &ClientConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("McpMart/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Language sent with product requests when the query doesn't set one
    pub fn language(&self) -> &str {
        &self.language
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    async fn check_status(response: reqwest::Response) -> ApiResult<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            body: body.chars().take(200).collect(),
        })
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> ApiResult<T> {
        let url = self.url(path);
        tracing::debug!(url = %url, "[ApiClient] GET");

        let response = self.client.get(&url).query(query).send().await?;
        let response = Self::check_status(response).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// `GET /products?page&limit&language[&search][&category][&type]`
    pub async fn fetch_products(&self, query: &ProductQuery) -> ApiResult<ProductPage> {
        let mut query = query.clone();
        if query.language.is_none() {
            query.language = Some(self.language.clone());
        }

        let envelope: ListEnvelope<Product> = self.get_json("/products", &query.to_pairs()).await?;
        let (products, pagination, total) = envelope.into_parts();
        let pagination = pagination.unwrap_or_else(|| {
            PaginationInfo::derived(
                query.page,
                query.limit,
                total.unwrap_or(products.len() as u64),
            )
        });

        tracing::info!(
            "[ApiClient] Fetched {} products (page {}/{}, total {})",
            products.len(),
            pagination.page,
            pagination.total_pages,
            pagination.total
        );

        Ok(ProductPage {
            products,
            pagination,
        })
    }

    /// `GET /products/featured?limit`
    pub async fn fetch_featured(&self, limit: u32) -> ApiResult<Vec<Product>> {
        let envelope: ListEnvelope<Product> = self
            .get_json("/products/featured", &[("limit", limit.to_string())])
            .await?;
        Ok(envelope.into_parts().0)
    }

    /// `GET /products/{id}`; `None` on 404
    pub async fn fetch_product(&self, id: &ProductId) -> ApiResult<Option<Product>> {
        let path = format!("/products/{}", urlencoding::encode(&id.to_string()));
        match self.get_json::<ItemEnvelope<Product>>(&path, &[]).await {
            Ok(envelope) => Ok(Some(envelope.into_inner())),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// `GET /data-status`
    pub async fn fetch_data_status(&self) -> ApiResult<DataStatusReport> {
        let envelope: ItemEnvelope<DataStatusReport> = self.get_json("/data-status", &[]).await?;
        Ok(envelope.into_inner())
    }

    /// `GET /news` (articles are returned unvalidated)
    pub async fn fetch_news(&self) -> ApiResult<Vec<RawArticle>> {
        let envelope: ListEnvelope<RawArticle> = self.get_json("/news", &[]).await?;
        Ok(envelope.into_parts().0)
    }

    /// `GET /news/categories`
    pub async fn fetch_news_categories(&self) -> ApiResult<Vec<NewsCategory>> {
        let envelope: ListEnvelope<CategoryEntry> = self.get_json("/news/categories", &[]).await?;
        Ok(envelope
            .into_parts()
            .0
            .into_iter()
            .map(NewsCategory::from)
            .collect())
    }

    /// Multipart image upload with a bearer token
    pub async fn upload_image(
        &self,
        target: &UploadTarget,
        image: &ImageFile,
        token: Option<&str>,
    ) -> ApiResult<UploadedAsset> {
        let url = self.url(&target.path());
        let part = multipart::Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| ApiError::InvalidRequest(e.to_string()))?;
        let form = multipart::Form::new().part("image", part);

        tracing::info!(
            url = %url,
            file = %image.file_name,
            bytes = image.bytes.len(),
            "[ApiClient] Uploading image"
        );

        let mut request = self.client.post(&url).multipart(form);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = Self::check_status(request.send().await?).await?;
        let bytes = response.bytes().await?;
        let envelope: ItemEnvelope<UploadedAsset> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.into_inner())
    }

    /// POST a JSON body to an admin endpoint
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        token: Option<&str>,
    ) -> ApiResult<CreatedRecord> {
        let url = self.url(path);
        tracing::debug!(url = %url, "[ApiClient] POST");

        let mut request = self.client.post(&url).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = Self::check_status(request.send().await?).await?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(CreatedRecord { id: None, slug: None });
        }
        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Ok(CreatedRecord { id: None, slug: None });
        }
        let envelope: ItemEnvelope<CreatedRecord> =
            serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))?;
        Ok(envelope.into_inner())
    }
}
