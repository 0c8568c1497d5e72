/// Dashtable Pagination
///
/// Client-side pagination over an already filtered and sorted row set.
/// Pages are 1-based. The slicing itself never clamps: a page past the end
/// is simply empty, and callers keep `current_page` in range.

use serde::Serialize;

/// `max(1, ceil(total_items / page_size))`. A zero page size counts as 1.
///
/// ```
/// use dashtable::total_pages;
///
/// assert_eq!(total_pages(23, 10), 3);
/// assert_eq!(total_pages(0, 10), 1);
/// ```
pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    total_items.div_ceil(page_size).max(1)
}

/// One page of rows plus the metadata the pagination footer needs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

impl<'a, T> Page<'a, T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// 1-based index of the first row shown, 0 when the page is empty
    pub fn first_item(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            (self.current_page - 1) * self.page_size + 1
        }
    }

    /// 1-based index of the last row shown, 0 when the page is empty
    pub fn last_item(&self) -> usize {
        if self.items.is_empty() {
            0
        } else {
            self.first_item() + self.items.len() - 1
        }
    }

    pub fn has_previous(&self) -> bool {
        self.current_page > 1 && self.total_items > 0
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages && self.total_items > 0
    }

    /// Footer text such as `"11-20 of 23"`.
    pub fn range_label(&self) -> String {
        format!("{}-{} of {}", self.first_item(), self.last_item(), self.total_items)
    }
}

/// Returns `items[(page-1)*size .. (page-1)*size + size]`, clipped to the input.
///
/// Page 0 and pages past `total_pages` yield an empty slice.
pub fn paginate<T>(items: &[T], current_page: usize, page_size: usize) -> Page<'_, T> {
    let page_size = page_size.max(1);
    let total_items = items.len();

    let slice = if current_page == 0 {
        &items[..0]
    } else {
        let start = (current_page - 1).saturating_mul(page_size).min(total_items);
        let end = start.saturating_add(page_size).min(total_items);
        &items[start..end]
    };

    Page {
        items: slice,
        current_page,
        page_size,
        total_items,
        total_pages: total_pages(total_items, page_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_third_page_of_23() {
        let rows: Vec<usize> = (0..23).collect();
        let page = paginate(&rows, 3, 10);
        assert_eq!(page.items, &[20, 21, 22]);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.total_items, 23);
        assert_eq!(page.range_label(), "21-23 of 23");
        assert!(page.has_previous());
        assert!(!page.has_next());
    }

    #[test]
    fn test_past_end_is_empty() {
        let rows: Vec<usize> = (0..5).collect();
        let page = paginate(&rows, 4, 2);
        assert!(page.is_empty());
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.first_item(), 0);
    }

    #[test]
    fn test_page_zero_is_empty() {
        let rows = vec!['a', 'b'];
        assert!(paginate(&rows, 0, 10).is_empty());
    }

    #[test]
    fn test_zero_page_size_treated_as_one() {
        let rows = vec!['a', 'b', 'c'];
        let page = paginate(&rows, 2, 0);
        assert_eq!(page.items, &['b']);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_empty_input() {
        let rows: Vec<u8> = Vec::new();
        let page = paginate(&rows, 1, 10);
        assert_eq!(page.total_pages, 1);
        assert_eq!(page.range_label(), "0-0 of 0");
        assert!(!page.has_next());
        assert!(!page.has_previous());
    }

    #[test]
    fn test_total_pages() {
        assert_eq!(total_pages(10, 10), 1);
        assert_eq!(total_pages(11, 10), 2);
        assert_eq!(total_pages(1, 1), 1);
        assert_eq!(total_pages(5, 0), 5);
    }

    #[test]
    fn test_huge_page_number_does_not_overflow() {
        let rows = vec![1, 2, 3];
        assert!(paginate(&rows, usize::MAX, usize::MAX).is_empty());
    }
}
