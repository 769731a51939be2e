//! Admin form validation
//!
//! Declarative rules (minimum lengths, enum membership, URL shape) applied
//! to course and news forms. All failures are collected so a form can show
//! every field error at once; a valid form is turned into its payload.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

use crate::domain::{CourseForm, CourseLevel, CoursePayload, NewsForm, NewsPayload};

lazy_static! {
    static ref NON_SLUG_CHARS: Regex = Regex::new(r"[^a-z0-9]+").unwrap();
}

pub const MIN_TITLE_LEN: usize = 5;
pub const MAX_TITLE_LEN: usize = 150;
pub const MIN_DESCRIPTION_LEN: usize = 20;
pub const MIN_SUMMARY_LEN: usize = 10;
pub const MIN_CONTENT_LEN: usize = 50;
pub const MAX_TAGS: usize = 10;

/// Field name → message for every failed rule
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    pub fields: BTreeMap<String, String>,
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "validation failed ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

impl ValidationErrors {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Record the first failure per field
    fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_insert_with(|| message.into());
    }

    fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// URL slug for a title: lowercase ASCII alphanumerics joined by single dashes.
///
/// Accented Latin letters are folded to their base letter first.
pub fn slugify(title: &str) -> String {
    let folded: String = title.to_lowercase().chars().map(fold_accent).collect();
    NON_SLUG_CHARS
        .replace_all(&folded, "-")
        .trim_matches('-')
        .to_string()
}

fn fold_accent(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        other => other,
    }
}

/// Whether `value` is an absolute http(s) URL or a site-relative path
pub fn is_valid_url(value: &str) -> bool {
    if value.starts_with('/') && !value.starts_with("//") {
        return true;
    }
    match Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

fn check_len(errors: &mut ValidationErrors, field: &str, value: &str, min: usize) {
    let len = value.trim().chars().count();
    if len == 0 {
        errors.add(field, "is required");
    } else if len < min {
        errors.add(field, format!("must be at least {} characters", min));
    }
}

fn check_title(errors: &mut ValidationErrors, title: &str) {
    check_len(errors, "title", title, MIN_TITLE_LEN);
    if title.trim().chars().count() > MAX_TITLE_LEN {
        errors.add("title", format!("must be at most {} characters", MAX_TITLE_LEN));
    }
    if !title.trim().is_empty() && slugify(title).is_empty() {
        errors.add("title", "must contain at least one letter or digit");
    }
}

fn check_tags(errors: &mut ValidationErrors, tags: &[String]) {
    if tags.len() > MAX_TAGS {
        errors.add("tags", format!("at most {} tags are allowed", MAX_TAGS));
    }
    if tags.iter().any(|t| t.trim().is_empty()) {
        errors.add("tags", "tags cannot be blank");
    }
}

fn check_optional_url(errors: &mut ValidationErrors, field: &str, value: Option<&str>) {
    if let Some(value) = value.filter(|v| !v.trim().is_empty()) {
        if !is_valid_url(value.trim()) {
            errors.add(field, "must be a valid URL");
        }
    }
}

fn clean_tags(tags: &[String]) -> Vec<String> {
    let mut cleaned: Vec<String> = Vec::new();
    for tag in tags.iter().map(|t| t.trim().to_lowercase()) {
        if !tag.is_empty() && !cleaned.contains(&tag) {
            cleaned.push(tag);
        }
    }
    cleaned
}

fn clean_url(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Validate a course form and build its payload
pub fn validate_course(form: &CourseForm) -> Result<CoursePayload, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_title(&mut errors, &form.title);
    check_len(&mut errors, "description", &form.description, MIN_DESCRIPTION_LEN);
    let level = CourseLevel::parse(&form.level);
    if level.is_none() {
        let allowed: Vec<&str> = CourseLevel::ALL.iter().map(CourseLevel::as_str).collect();
        errors.add("level", format!("must be one of: {}", allowed.join(", ")));
    }
    if form.duration_minutes == 0 {
        errors.add("duration_minutes", "must be greater than 0");
    }
    if !form.price.is_finite() || form.price < 0.0 {
        errors.add("price", "must be 0 or more");
    }
    check_tags(&mut errors, &form.tags);
    check_optional_url(&mut errors, "image_url", form.image_url.as_deref());

    errors.into_result()?;

    Ok(CoursePayload {
        title: form.title.trim().to_string(),
        slug: slugify(&form.title),
        description: form.description.trim().to_string(),
        level: level.unwrap_or_default(),
        duration_minutes: form.duration_minutes,
        price: form.price,
        tags: clean_tags(&form.tags),
        image_url: clean_url(form.image_url.as_deref()),
    })
}

/// Validate a news form and build its payload
pub fn validate_news(form: &NewsForm) -> Result<NewsPayload, ValidationErrors> {
    let mut errors = ValidationErrors::default();

    check_title(&mut errors, &form.title);
    check_len(&mut errors, "summary", &form.summary, MIN_SUMMARY_LEN);
    if form.summary.trim().chars().count() > crate::domain::MAX_SUMMARY_CHARS {
        errors.add(
            "summary",
            format!(
                "must be at most {} characters",
                crate::domain::MAX_SUMMARY_CHARS
            ),
        );
    }
    check_len(&mut errors, "content", &form.content, MIN_CONTENT_LEN);
    check_len(&mut errors, "category", &form.category, 1);
    check_len(&mut errors, "source", &form.source, 1);
    check_optional_url(&mut errors, "source_url", form.source_url.as_deref());
    check_tags(&mut errors, &form.tags);
    check_optional_url(&mut errors, "image_url", form.image_url.as_deref());

    errors.into_result()?;

    Ok(NewsPayload {
        title: form.title.trim().to_string(),
        slug: slugify(&form.title),
        summary: form.summary.trim().to_string(),
        content: form.content.trim().to_string(),
        category: form.category.trim().to_string(),
        source: form.source.trim().to_string(),
        source_url: clean_url(form.source_url.as_deref()),
        tags: clean_tags(&form.tags),
        image_url: clean_url(form.image_url.as_deref()),
    })
}
