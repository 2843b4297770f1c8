//! Client-side pagination of a rendered list.

use serde::Serialize;

/// One page of a list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// 1-based page number after clamping.
    pub page: usize,
    /// Items per page.
    pub page_size: usize,
    /// Number of pages; at least 1 even for an empty list.
    pub total_pages: usize,
    /// Number of items across all pages.
    pub total_items: usize,
}

impl<T> Page<T> {
    /// Whether a later page exists.
    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    /// Whether an earlier page exists.
    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.page > 1
    }
}

/// Cut `items` into pages of `page_size` and return page `page` (1-based).
///
/// Out-of-range page numbers are clamped to the first or last page. A zero
/// page size is treated as 1.
#[must_use]
pub fn paginate<T>(items: Vec<T>, page: usize, page_size: usize) -> Page<T> {
    let page_size = page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let page = page.clamp(1, total_pages);

    let items = items.into_iter().skip((page - 1) * page_size).take(page_size).collect();
    Page { items, page, page_size, total_pages, total_items }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_middle_page() {
        let page = paginate((1..=25).collect(), 2, 10);
        assert_eq!(page.items, (11..=20).collect::<Vec<_>>());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 25);
        assert!(page.has_next());
        assert!(page.has_previous());
    }

    #[test]
    fn test_last_partial_page() {
        let page = paginate((1..=25).collect(), 3, 10);
        assert_eq!(page.items, vec![21, 22, 23, 24, 25]);
        assert!(!page.has_next());
    }

    #[test]
    fn test_page_is_clamped() {
        let page = paginate(vec!['a', 'b', 'c'], 9, 2);
        assert_eq!(page.page, 2);
        assert_eq!(page.items, vec!['c']);

        let page = paginate(vec!['a', 'b', 'c'], 0, 2);
        assert_eq!(page.page, 1);
        assert_eq!(page.items, vec!['a', 'b']);
    }

    #[test]
    fn test_empty_list_has_one_page() {
        let page: Page<u8> = paginate(Vec::new(), 1, 10);
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_zero_page_size() {
        let page = paginate(vec![1, 2], 2, 0);
        assert_eq!(page.page_size, 1);
        assert_eq!(page.items, vec![2]);
    }
}
