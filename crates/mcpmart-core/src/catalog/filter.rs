//! The product list pipeline: filter, then sort.
//!
//! Pure functions over an in-memory slice. Missing product fields simply
//! fail the corresponding condition; nothing is reported.

use std::cmp::Ordering;

use super::criteria::{FilterCriteria, SortOrder};
use crate::domain::{Product, ProductId};

/// Apply every filter in `criteria`, then sort by `criteria.sort`.
///
/// The sort is stable, so products that compare equal keep their input order.
pub fn filter_and_sort(products: &[Product], criteria: &FilterCriteria) -> Vec<Product> {
    let mut result: Vec<Product> = products
        .iter()
        .filter(|p| matches_criteria(p, criteria))
        .cloned()
        .collect();
    sort_products(&mut result, criteria.sort);
    result
}

/// Whether a single product passes every filter in `criteria`
pub fn matches_criteria(product: &Product, criteria: &FilterCriteria) -> bool {
    matches_search(product, criteria.search.as_deref())
        && matches_categories(product, &criteria.categories)
        && matches_types(product, criteria)
        && matches_min_stars(product, criteria.min_stars)
        && (!criteria.official_only || product.official)
        && (!criteria.featured_only || product.is_featured)
        && matches_tags(product, &criteria.tags)
        && matches_price(product, criteria.price_min, criteria.price_max)
}

fn matches_search(product: &Product, query: Option<&str>) -> bool {
    let Some(query) = query.map(str::trim).filter(|q| !q.is_empty()) else {
        return true;
    };
    let needle = query.to_lowercase();

    product.name.to_lowercase().contains(&needle)
        || product
            .description
            .as_ref()
            .is_some_and(|d| d.to_lowercase().contains(&needle))
        || product
            .all_categories()
            .any(|c| c.to_lowercase().contains(&needle))
}

fn matches_categories(product: &Product, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    product
        .all_categories()
        .any(|c| wanted.iter().any(|w| w.eq_ignore_ascii_case(c)))
}

fn matches_types(product: &Product, criteria: &FilterCriteria) -> bool {
    if criteria.product_types.is_empty() {
        return true;
    }
    product
        .product_type
        .as_ref()
        .is_some_and(|t| criteria.product_types.contains(t))
}

fn matches_min_stars(product: &Product, min_stars: Option<f64>) -> bool {
    match min_stars {
        None => true,
        Some(min) => product.popularity().is_some_and(|stars| stars >= min),
    }
}

// Any selected tag is enough (OR), not all of them.
fn matches_tags(product: &Product, wanted: &[String]) -> bool {
    if wanted.is_empty() {
        return true;
    }
    product
        .tags
        .iter()
        .any(|t| wanted.iter().any(|w| w.eq_ignore_ascii_case(t)))
}

fn matches_price(product: &Product, min: Option<f64>, max: Option<f64>) -> bool {
    min.map_or(true, |min| product.price >= min) && max.map_or(true, |max| product.price <= max)
}

/// Sort in place
pub fn sort_products(products: &mut [Product], order: SortOrder) {
    products.sort_by(|a, b| compare_products(a, b, order));
}

/// Ordering used by [`sort_products`]
pub fn compare_products(a: &Product, b: &Product, order: SortOrder) -> Ordering {
    match order {
        SortOrder::Popularity => compare_popularity(a, b),
        SortOrder::NameAsc => compare_names(&a.name, &b.name),
        SortOrder::NameDesc => compare_names(&b.name, &a.name),
        SortOrder::Newest => compare_newest(a, b),
        SortOrder::PriceAsc => a.price.total_cmp(&b.price),
        SortOrder::PriceDesc => b.price.total_cmp(&a.price),
    }
}

fn compare_popularity(a: &Product, b: &Product) -> Ordering {
    match (a.popularity(), b.popularity()) {
        (Some(x), Some(y)) => y.total_cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Case-insensitive comparison with a case-sensitive tiebreak
fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

// Timestamped products come first (newest first); the rest fall back to
// descending id order, numeric when both ids are numbers.
fn compare_newest(a: &Product, b: &Product) -> Ordering {
    match (a.created_at_time(), b.created_at_time()) {
        (Some(x), Some(y)) => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_ids_desc(&a.id, &b.id),
    }
}

fn compare_ids_desc(a: &ProductId, b: &ProductId) -> Ordering {
    match (a.as_number(), b.as_number()) {
        (Some(x), Some(y)) => y.cmp(&x),
        _ => b.to_string().cmp(&a.to_string()),
    }
}

/// A row of products sharing a primary category
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub category: String,
    pub products: Vec<Product>,
}

/// Label for products without any category
pub const UNCATEGORIZED: &str = "Other";

/// Group products into category rows, in first-seen order.
pub fn group_by_category(products: &[Product]) -> Vec<CategoryRow> {
    let mut rows: Vec<CategoryRow> = Vec::new();
    for product in products {
        let category = product.primary_category().unwrap_or(UNCATEGORIZED);
        match rows
            .iter_mut()
            .find(|row| row.category.eq_ignore_ascii_case(category))
        {
            Some(row) => row.products.push(product.clone()),
            None => rows.push(CategoryRow {
                category: category.to_string(),
                products: vec![product.clone()],
            }),
        }
    }
    rows
}

/// Distinct categories across all products, sorted
pub fn available_categories(products: &[Product]) -> Vec<String> {
    let mut categories: Vec<String> = products
        .iter()
        .flat_map(|p| p.all_categories().map(str::to_string))
        .collect();
    categories.sort_by(|a, b| compare_names(a, b));
    categories.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    categories
}

/// Distinct tags across all products, sorted
pub fn available_tags(products: &[Product]) -> Vec<String> {
    let mut tags: Vec<String> = products.iter().flat_map(|p| p.tags.clone()).collect();
    tags.sort_by(|a, b| compare_names(a, b));
    tags.dedup_by(|a, b| a.eq_ignore_ascii_case(b));
    tags
}
