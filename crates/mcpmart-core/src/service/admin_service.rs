//! Admin content submission (courses and news).
//!
//! A submission is validated locally first. If the form carries an image
//! it is uploaded before anything else and its URL replaces `image_url`;
//! a failed upload stops the submission there. If the upload worked but
//! the record POST then fails, the uploaded asset is reported as orphaned
//! so the caller can surface or clean it up.

use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::api_client::{CatalogApiClient, UploadTarget};
use crate::domain::{ContentKind, CourseForm, CreatedRecord, DomainEvent, ImageFile, NewsForm};
use crate::event_bus::EventSender;
use crate::repository::{cache_keys, CacheScope, ClientCacheRepository};
use crate::validation::{validate_course, validate_news, ValidationErrors};

pub const COURSES_PATH: &str = "/admin/courses";
pub const NEWS_PATH: &str = "/admin/news";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("no admin token stored")]
    MissingToken,

    #[error("image upload failed: {0}")]
    Upload(String),

    #[error("submission failed: {message}")]
    Submit {
        message: String,
        /// URL of an image uploaded for this submission that nothing references
        orphaned_asset: Option<String>,
    },

    #[error("local storage error: {0}")]
    Storage(String),
}

impl AdminError {
    pub fn orphaned_asset(&self) -> Option<&str> {
        match self {
            Self::Submit { orphaned_asset, .. } => orphaned_asset.as_deref(),
            _ => None,
        }
    }
}

/// Outcome of a successful submission
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub kind: ContentKind,
    pub slug: String,
    pub image_url: Option<String>,
    pub record: CreatedRecord,
}

pub struct AdminService {
    client: CatalogApiClient,
    cache: Arc<dyn ClientCacheRepository>,
    events: EventSender,
}

impl AdminService {
    pub fn new(
        client: CatalogApiClient,
        cache: Arc<dyn ClientCacheRepository>,
        events: EventSender,
    ) -> Self {
        Self {
            client,
            cache,
            events,
        }
    }

    /// Store the bearer token used for admin requests
    pub async fn set_token(&self, token: &str) -> Result<(), AdminError> {
        self.cache
            .set(CacheScope::Local, cache_keys::ADMIN_TOKEN, token.trim())
            .await
            .map_err(|e| AdminError::Storage(e.to_string()))
    }

    async fn token(&self) -> Result<String, AdminError> {
        self.cache
            .get(CacheScope::Local, cache_keys::ADMIN_TOKEN)
            .await
            .map_err(|e| AdminError::Storage(e.to_string()))?
            .filter(|t| !t.trim().is_empty())
            .ok_or(AdminError::MissingToken)
    }

    pub async fn submit_course(&self, form: &CourseForm) -> Result<Submission, AdminError> {
        let mut payload = validate_course(form)?;
        let token = self.token().await?;

        let uploaded = match form.image {
            Some(ref image) => Some(
                self.upload(ContentKind::Course, &UploadTarget::Admin, image, &token)
                    .await?,
            ),
            None => None,
        };
        if uploaded.is_some() {
            payload.image_url = uploaded.clone();
        }

        let record = self
            .post(ContentKind::Course, COURSES_PATH, &payload, &token, uploaded.as_deref())
            .await?;
        Ok(self.submitted(ContentKind::Course, payload.slug, payload.image_url, record))
    }

    pub async fn submit_news(&self, form: &NewsForm) -> Result<Submission, AdminError> {
        let mut payload = validate_news(form)?;
        let token = self.token().await?;

        let target = UploadTarget::Media(ContentKind::News.as_str().to_string());
        let uploaded = match form.image {
            Some(ref image) => Some(self.upload(ContentKind::News, &target, image, &token).await?),
            None => None,
        };
        if uploaded.is_some() {
            payload.image_url = uploaded.clone();
        }

        let record = self
            .post(ContentKind::News, NEWS_PATH, &payload, &token, uploaded.as_deref())
            .await?;
        Ok(self.submitted(ContentKind::News, payload.slug, payload.image_url, record))
    }

    async fn upload(
        &self,
        kind: ContentKind,
        target: &UploadTarget,
        image: &ImageFile,
        token: &str,
    ) -> Result<String, AdminError> {
        let asset = self
            .client
            .upload_image(target, image, Some(token))
            .await
            .map_err(|e| {
                warn!(kind = kind.as_str(), error = %e, "[Admin] Image upload failed");
                AdminError::Upload(e.to_string())
            })?;

        info!(kind = kind.as_str(), url = %asset.url, "[Admin] Image uploaded");
        self.events.emit(DomainEvent::AssetUploaded {
            kind,
            url: asset.url.clone(),
        });
        Ok(asset.url)
    }

    async fn post<B: Serialize>(
        &self,
        kind: ContentKind,
        path: &str,
        payload: &B,
        token: &str,
        uploaded: Option<&str>,
    ) -> Result<CreatedRecord, AdminError> {
        match self.client.post_json(path, payload, Some(token)).await {
            Ok(record) => Ok(record),
            Err(e) => {
                if let Some(url) = uploaded {
                    warn!(
                        kind = kind.as_str(),
                        url = %url,
                        "[Admin] Submission failed after upload, asset is orphaned"
                    );
                    self.events.emit(DomainEvent::AssetOrphaned {
                        kind,
                        url: url.to_string(),
                    });
                }
                Err(AdminError::Submit {
                    message: e.to_string(),
                    orphaned_asset: uploaded.map(str::to_string),
                })
            }
        }
    }

    fn submitted(
        &self,
        kind: ContentKind,
        slug: String,
        image_url: Option<String>,
        record: CreatedRecord,
    ) -> Submission {
        let slug = record.slug.clone().unwrap_or(slug);
        info!(kind = kind.as_str(), slug = %slug, "[Admin] Content submitted");
        self.events.emit(DomainEvent::ContentSubmitted {
            kind,
            slug: slug.clone(),
        });
        Submission {
            kind,
            slug,
            image_url,
            record,
        }
    }
}
