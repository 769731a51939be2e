//! Catalog listing logic
//!
//! Everything the listing pages do to an in-memory product list:
//! filter, sort, group into rows, paginate, and round-trip the view
//! state through URL query parameters.

mod browse_state;
mod criteria;
mod filter;
mod pagination;

pub use browse_state::{params, BrowseState, QueryParseError, ViewMode};
pub use criteria::{FilterCriteria, SortOrder};
pub use filter::{
    available_categories, available_tags, compare_products, filter_and_sort, group_by_category,
    matches_criteria, sort_products, CategoryRow, UNCATEGORIZED,
};
pub use pagination::{paginate, total_pages, Page, PageState, DEFAULT_ITEMS_PER_PAGE};
