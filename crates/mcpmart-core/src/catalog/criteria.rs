//! Filter and sort criteria for the product list

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::ProductType;

/// Sort orders offered by the listing pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most stars first, products without stars last
    #[default]
    Popularity,
    NameAsc,
    NameDesc,
    /// Most recently created first
    Newest,
    PriceAsc,
    PriceDesc,
}

impl SortOrder {
    pub const ALL: [SortOrder; 6] = [
        Self::Popularity,
        Self::NameAsc,
        Self::NameDesc,
        Self::Newest,
        Self::PriceAsc,
        Self::PriceDesc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Popularity => "popularity",
            Self::NameAsc => "name_asc",
            Self::NameDesc => "name_desc",
            Self::Newest => "newest",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|order| order.as_str() == s.trim())
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Popularity => "Most popular",
            Self::NameAsc => "Name (A-Z)",
            Self::NameDesc => "Name (Z-A)",
            Self::Newest => "Newest",
            Self::PriceAsc => "Price: low to high",
            Self::PriceDesc => "Price: high to low",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a listing page can filter on, in one place.
///
/// Empty lists and `None` mean "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Free-text search over name, description and categories
    pub search: Option<String>,
    /// Match if the product is in ANY of these categories
    pub categories: Vec<String>,
    /// Match if the product type is ANY of these
    pub product_types: Vec<ProductType>,
    /// Inclusive lower bound on popularity
    pub min_stars: Option<f64>,
    pub official_only: bool,
    pub featured_only: bool,
    /// Match if the product carries ANY of these tags
    pub tags: Vec<String>,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub sort: SortOrder,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.search = if query.trim().is_empty() {
            None
        } else {
            Some(query)
        };
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn with_product_type(mut self, product_type: ProductType) -> Self {
        self.product_types.push(product_type);
        self
    }

    pub fn with_min_stars(mut self, min_stars: f64) -> Self {
        self.min_stars = Some(min_stars);
        self
    }

    pub fn with_official_only(mut self, official_only: bool) -> Self {
        self.official_only = official_only;
        self
    }

    pub fn with_featured_only(mut self, featured_only: bool) -> Self {
        self.featured_only = featured_only;
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_price_range(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.price_min = min;
        self.price_max = max;
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    /// True when no filter is active (sorting doesn't count)
    pub fn is_unfiltered(&self) -> bool {
        self.search.is_none()
            && self.categories.is_empty()
            && self.product_types.is_empty()
            && self.min_stars.is_none()
            && !self.official_only
            && !self.featured_only
            && self.tags.is_empty()
            && self.price_min.is_none()
            && self.price_max.is_none()
    }
}
