//! Listing view state as URL query parameters.
//!
//! One schema serves both directions: [`BrowseState::from_query`] and
//! [`BrowseState::to_query`] share the parameter names below, so whatever
//! is written can be read back. `types` and `ratings` are comma-separated;
//! `categories` repeats its key once per value since category names may
//! contain commas. Defaults are omitted when writing. Unknown parameters
//! are ignored.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::criteria::{FilterCriteria, SortOrder};
use super::pagination::DEFAULT_ITEMS_PER_PAGE;
use crate::domain::ProductType;

pub mod params {
    pub const QUERY: &str = "q";
    pub const CATEGORY: &str = "category";
    pub const SORT: &str = "sort";
    pub const VIEW: &str = "view";
    pub const TYPES: &str = "types";
    pub const CATEGORIES: &str = "categories";
    pub const RATINGS: &str = "ratings";
    pub const PRICE_MIN: &str = "priceMin";
    pub const PRICE_MAX: &str = "priceMax";
    pub const PAGE: &str = "page";
    pub const PER_PAGE: &str = "perPage";
}

/// How the listing is laid out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ViewMode {
    #[default]
    Grid,
    List,
    /// Horizontal rows, one per category
    Rows,
}

impl ViewMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Grid => "grid",
            Self::List => "list",
            Self::Rows => "rows",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "grid" => Some(Self::Grid),
            "list" => Some(Self::List),
            "rows" => Some(Self::Rows),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryParseError {
    #[error("invalid value '{value}' for '{param}'")]
    InvalidValue { param: &'static str, value: String },
}

/// Everything a listing page keeps in its URL
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BrowseState {
    pub query: Option<String>,
    /// Single category picked from a category link
    pub category: Option<String>,
    pub sort: SortOrder,
    pub view: ViewMode,
    pub types: Vec<ProductType>,
    /// Categories picked in the filter drawer
    pub categories: Vec<String>,
    /// Star thresholds picked in the filter drawer; the lowest one applies
    pub ratings: Vec<u32>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub page: usize,
    pub per_page: usize,
}

impl Default for BrowseState {
    fn default() -> Self {
        Self {
            query: None,
            category: None,
            sort: SortOrder::default(),
            view: ViewMode::default(),
            types: Vec::new(),
            categories: Vec::new(),
            ratings: Vec::new(),
            price_min: None,
            price_max: None,
            page: 1,
            per_page: DEFAULT_ITEMS_PER_PAGE,
        }
    }
}

fn split_list(value: &str) -> impl Iterator<Item = &str> {
    value.split(',').map(str::trim).filter(|v| !v.is_empty())
}

fn invalid(param: &'static str, value: &str) -> QueryParseError {
    QueryParseError::InvalidValue {
        param,
        value: value.to_string(),
    }
}

fn parse_number<T: std::str::FromStr>(param: &'static str, value: &str) -> Result<T, QueryParseError> {
    value.trim().parse().map_err(|_| invalid(param, value))
}

fn parse_price(param: &'static str, value: &str) -> Result<f64, QueryParseError> {
    let price: f64 = parse_number(param, value)?;
    if price.is_finite() {
        Ok(price)
    } else {
        Err(invalid(param, value))
    }
}

impl BrowseState {
    /// Parse a query string (with or without the leading `?`)
    pub fn from_query(query: &str) -> Result<Self, QueryParseError> {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut state = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            let value = &*value;
            match &*key {
                params::QUERY => {
                    state.query = Some(value.to_string()).filter(|v| !v.trim().is_empty())
                }
                params::CATEGORY => {
                    state.category = Some(value.to_string()).filter(|v| !v.trim().is_empty())
                }
                params::SORT => {
                    state.sort = SortOrder::parse(value).ok_or_else(|| invalid(params::SORT, value))?
                }
                params::VIEW => {
                    state.view = ViewMode::parse(value).ok_or_else(|| invalid(params::VIEW, value))?
                }
                params::TYPES => state.types = split_list(value).map(ProductType::from_str).collect(),
                params::CATEGORIES => {
                    if !value.trim().is_empty() {
                        state.categories.push(value.to_string());
                    }
                }
                params::RATINGS => {
                    state.ratings = split_list(value)
                        .map(|v| parse_number(params::RATINGS, v))
                        .collect::<Result<_, _>>()?
                }
                params::PRICE_MIN => state.price_min = Some(parse_price(params::PRICE_MIN, value)?),
                params::PRICE_MAX => state.price_max = Some(parse_price(params::PRICE_MAX, value)?),
                params::PAGE => {
                    state.page = parse_number::<usize>(params::PAGE, value)?.max(1)
                }
                params::PER_PAGE => {
                    state.per_page = parse_number::<usize>(params::PER_PAGE, value)?.max(1)
                }
                _ => {}
            }
        }

        Ok(state)
    }

    /// Serialize to a query string (no leading `?`), omitting defaults
    pub fn to_query(&self) -> String {
        let defaults = Self::default();
        let mut out = url::form_urlencoded::Serializer::new(String::new());

        if let Some(ref q) = self.query {
            out.append_pair(params::QUERY, q);
        }
        if let Some(ref category) = self.category {
            out.append_pair(params::CATEGORY, category);
        }
        if self.sort != defaults.sort {
            out.append_pair(params::SORT, self.sort.as_str());
        }
        if self.view != defaults.view {
            out.append_pair(params::VIEW, self.view.as_str());
        }
        if !self.types.is_empty() {
            let types: Vec<&str> = self.types.iter().map(ProductType::as_str).collect();
            out.append_pair(params::TYPES, &types.join(","));
        }
        for category in &self.categories {
            out.append_pair(params::CATEGORIES, category);
        }
        if !self.ratings.is_empty() {
            let ratings: Vec<String> = self.ratings.iter().map(u32::to_string).collect();
            out.append_pair(params::RATINGS, &ratings.join(","));
        }
        // Display round-trips exactly and writes whole numbers without `.0`
        if let Some(min) = self.price_min {
            out.append_pair(params::PRICE_MIN, &min.to_string());
        }
        if let Some(max) = self.price_max {
            out.append_pair(params::PRICE_MAX, &max.to_string());
        }
        if self.page != defaults.page {
            out.append_pair(params::PAGE, &self.page.to_string());
        }
        if self.per_page != defaults.per_page {
            out.append_pair(params::PER_PAGE, &self.per_page.to_string());
        }

        out.finish()
    }

    /// Criteria for the filter/sort pipeline
    pub fn to_criteria(&self) -> FilterCriteria {
        let mut categories = self.categories.clone();
        if let Some(ref category) = self.category {
            if !categories.iter().any(|c| c.eq_ignore_ascii_case(category)) {
                categories.push(category.clone());
            }
        }

        FilterCriteria {
            search: self.query.clone(),
            categories,
            product_types: self.types.clone(),
            min_stars: self.ratings.iter().min().map(|r| f64::from(*r)),
            price_min: self.price_min,
            price_max: self.price_max,
            sort: self.sort,
            ..FilterCriteria::default()
        }
    }

    /// Change the page size; goes back to page 1
    pub fn set_per_page(&mut self, per_page: usize) {
        self.per_page = per_page.max(1);
        self.page = 1;
    }
}
