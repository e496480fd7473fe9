//! Pagination and sort primitives shared by the listing projections.

use serde::{Deserialize, Serialize};

const MAX_PAGE_SIZE: u32 = 100;
const DEFAULT_PAGE_SIZE: u32 = 20;

/// 1-based page request. Out-of-range values are clamped, never rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page_number: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page_number: u32, page_size: u32) -> Self {
        Self {
            page_number: page_number.max(1),
            page_size: page_size.clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> usize {
        ((self.page_number - 1) as usize) * (self.page_size as usize)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page_number: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of a listing plus the total match count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_count: u64,
    pub page_number: u32,
    pub page_size: u32,
}

impl<T> PagedResult<T> {
    /// Cut one page out of an already filtered and sorted listing.
    pub fn paginate(all: Vec<T>, pagination: Pagination) -> Self {
        let total_count = all.len() as u64;
        let items = all
            .into_iter()
            .skip(pagination.offset())
            .take(pagination.page_size as usize)
            .collect();
        Self {
            items,
            total_count,
            page_number: pagination.page_number,
            page_size: pagination.page_size,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_degenerate_requests() {
        let p = Pagination::new(0, 0);
        assert_eq!(p.page_number, 1);
        assert_eq!(p.page_size, 1);
        let p = Pagination::new(2, 10_000);
        assert_eq!(p.page_size, MAX_PAGE_SIZE);
    }

    #[test]
    fn paginate_slices_and_counts() {
        let page = PagedResult::paginate((1..=9).collect::<Vec<_>>(), Pagination::new(2, 4));
        assert_eq!(page.items, vec![5, 6, 7, 8]);
        assert_eq!(page.total_count, 9);
        let tail = PagedResult::paginate((1..=9).collect::<Vec<_>>(), Pagination::new(3, 4));
        assert_eq!(tail.items, vec![9]);
        let past_end = PagedResult::paginate((1..=9).collect::<Vec<_>>(), Pagination::new(4, 4));
        assert!(past_end.items.is_empty());
        assert_eq!(past_end.total_count, 9);
    }
}
