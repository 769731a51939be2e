//! Client-side pagination over an already-filtered list

use serde::{Deserialize, Serialize};

use super::criteria::FilterCriteria;

/// Default page size of the grid views
pub const DEFAULT_ITEMS_PER_PAGE: usize = 12;

/// One page of a list, with the totals recomputed from the full list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-based; clamped into `1..=total_pages`
    pub current_page: usize,
    pub total_pages: usize,
    pub total_items: usize,
    pub items_per_page: usize,
}

impl<T> Page<T> {
    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev(&self) -> bool {
        self.current_page > 1
    }

    /// 1-based index of the first item on this page (0 when empty)
    pub fn first_item_number(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.current_page - 1) * self.items_per_page + 1
        }
    }
}

/// Number of pages needed for `total_items`
pub fn total_pages(total_items: usize, items_per_page: usize) -> usize {
    total_items.div_ceil(items_per_page.max(1))
}

/// Slice out page `page` (1-based) of `items`.
///
/// Out-of-range pages are clamped, so the result is always a valid page.
pub fn paginate<T: Clone>(items: &[T], page: usize, items_per_page: usize) -> Page<T> {
    let items_per_page = items_per_page.max(1);
    let total_items = items.len();
    let total_pages = total_pages(total_items, items_per_page);
    let current_page = page.clamp(1, total_pages.max(1));

    let start = (current_page - 1) * items_per_page;
    let end = (start + items_per_page).min(total_items);
    let slice = if start < total_items {
        items[start..end].to_vec()
    } else {
        Vec::new()
    };

    Page {
        items: slice,
        current_page,
        total_pages,
        total_items,
        items_per_page,
    }
}

/// Page cursor of a listing view.
///
/// Anything that changes what is being listed (page size, criteria) sends
/// the view back to page 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageState {
    current_page: usize,
    items_per_page: usize,
    criteria: FilterCriteria,
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(DEFAULT_ITEMS_PER_PAGE)
    }
}

impl PageState {
    pub fn new(items_per_page: usize) -> Self {
        Self {
            current_page: 1,
            items_per_page: items_per_page.max(1),
            criteria: FilterCriteria::default(),
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn items_per_page(&self) -> usize {
        self.items_per_page
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_page(&mut self, page: usize) {
        self.current_page = page.max(1);
    }

    pub fn next_page(&mut self) {
        self.current_page += 1;
    }

    pub fn prev_page(&mut self) {
        self.current_page = self.current_page.saturating_sub(1).max(1);
    }

    /// Change the page size; always resets to page 1
    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.items_per_page = items_per_page.max(1);
        self.current_page = 1;
    }

    /// Replace the criteria; resets to page 1 when anything changed
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.current_page = 1;
        }
    }

    /// Run the pipeline on `products` and cut out the current page.
    ///
    /// The cursor is clamped to the resulting page count so a later
    /// `next_page` starts from a real page.
    pub fn apply(&mut self, products: &[crate::domain::Product]) -> Page<crate::domain::Product> {
        let filtered = super::filter_and_sort(products, &self.criteria);
        let page = paginate(&filtered, self.current_page, self.items_per_page);
        self.current_page = page.current_page;
        page
    }
}
