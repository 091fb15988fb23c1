//! Page windows for list views.

use serde::Serialize;

/// Rows per page for every dashboard list.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 20;

/// Builds the pager entries for `current_page`.
///
/// `None` marks a gap rendered as an ellipsis. The first `left_edge` and last
/// `right_edge` pages are always shown, together with a window around the
/// current page.
fn page_window(
    total_pages: usize,
    current_page: usize,
    left_edge: usize,
    left_current: usize,
    right_current: usize,
    right_edge: usize,
) -> Vec<Option<usize>> {
    if total_pages == 0 {
        return Vec::new();
    }

    let mut pages = Vec::new();

    let head_end = (1 + left_edge).min(total_pages + 1);
    pages.extend((1..head_end).map(Some));

    let window_start = head_end.max(current_page.saturating_sub(left_current));
    let window_end = current_page
        .saturating_add(right_current + 1)
        .min(total_pages + 1);
    if window_start > head_end {
        pages.push(None);
    }
    pages.extend((window_start..window_end).map(Some));

    let tail_start = window_end.max(total_pages.saturating_sub(right_edge) + 1);
    if tail_start > window_end {
        pages.push(None);
    }
    pages.extend((tail_start..=total_pages).map(Some));

    pages
}

/// One page of `items` with pager metadata for templates and JSON responses.
#[derive(Debug, Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    /// Wraps a page of items given the 1-based page number and the total
    /// number of matching rows.
    pub fn new(items: Vec<T>, current_page: usize, total: usize) -> Self {
        let page = current_page.max(1);
        let total_pages = total.div_ceil(DEFAULT_ITEMS_PER_PAGE);

        Self {
            items,
            pages: page_window(total_pages, page, 2, 2, 4, 2),
            page,
            total,
            total_pages,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Paginated<U> {
        Paginated {
            items: self.items.into_iter().map(f).collect(),
            pages: self.pages,
            page: self.page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_list_has_no_pages() {
        let page: Paginated<u8> = Paginated::new(vec![], 1, 0);
        assert!(page.pages.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn zero_page_is_treated_as_first() {
        let page: Paginated<u8> = Paginated::new(vec![], 0, 5);
        assert_eq!(page.page, 1);
        assert_eq!(page.pages, vec![Some(1)]);
    }

    #[test]
    fn pages_past_the_end_do_not_overflow() {
        let page: Paginated<u8> = Paginated::new(vec![], usize::MAX, 5);
        assert_eq!(page.page, usize::MAX);
        assert_eq!(page.pages, vec![Some(1), None]);
    }

    #[test]
    fn long_lists_collapse_into_gaps() {
        let page: Paginated<u8> = Paginated::new(vec![], 10, 20 * DEFAULT_ITEMS_PER_PAGE);
        assert_eq!(
            page.pages,
            vec![
                Some(1),
                Some(2),
                None,
                Some(8),
                Some(9),
                Some(10),
                Some(11),
                Some(12),
                Some(13),
                Some(14),
                None,
                Some(19),
                Some(20),
            ]
        );
    }
}
