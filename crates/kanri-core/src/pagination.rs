use serde::{Deserialize, Serialize};

/// Page sizes offered by list views.
pub const PAGE_SIZES: &[u32] = &[10, 25, 50, 100];

/// Position within a paged list. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub page_size: u32,
    pub total_items: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: PAGE_SIZES[0],
            total_items: 0,
        }
    }
}

impl Pagination {
    /// `page` is clamped to the pages that exist.
    pub fn new(page: u32, page_size: u32, total_items: u64) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            total_items,
        }
        .with_page(page)
    }

    pub fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(u64::from(self.page_size))
    }

    /// 1-based index of the first item on this page, 0 when empty.
    pub fn start_item(&self) -> u64 {
        if self.total_items == 0 {
            0
        } else {
            u64::from(self.page - 1) * u64::from(self.page_size) + 1
        }
    }

    pub fn end_item(&self) -> u64 {
        (u64::from(self.page) * u64::from(self.page_size)).min(self.total_items)
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.page) < self.total_pages()
    }

    /// Move to `page`, clamped to the pages that exist.
    pub fn with_page(self, page: u32) -> Self {
        let last = self.total_pages().clamp(1, u64::from(u32::MAX)) as u32;
        Self {
            page: page.clamp(1, last),
            ..self
        }
    }

    /// Change the page size. The view restarts at the first page.
    pub fn with_page_size(self, page_size: u32) -> Self {
        Self {
            page: 1,
            page_size: page_size.max(1),
            ..self
        }
    }

    pub fn summary(&self) -> String {
        if self.total_items == 0 {
            "No items to display".to_string()
        } else {
            format!(
                "Showing {} to {} of {} results",
                self.start_item(),
                self.end_item(),
                self.total_items
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_list() {
        let p = Pagination::default();
        assert_eq!(p.total_pages(), 0);
        assert_eq!(p.start_item(), 0);
        assert_eq!(p.end_item(), 0);
        assert!(!p.has_previous());
        assert!(!p.has_next());
        assert_eq!(p.summary(), "No items to display");
    }

    #[test]
    fn test_middle_and_last_page() {
        let p = Pagination::new(2, 10, 42);
        assert_eq!(p.total_pages(), 5);
        assert_eq!((p.start_item(), p.end_item()), (11, 20));
        assert!(p.has_previous() && p.has_next());

        let last = p.with_page(5);
        assert_eq!((last.start_item(), last.end_item()), (41, 42));
        assert!(!last.has_next());
        assert_eq!(last.summary(), "Showing 41 to 42 of 42 results");
    }

    #[test]
    fn test_page_moves_are_clamped() {
        let p = Pagination::new(1, 25, 60);
        assert_eq!(p.with_page(0).page, 1);
        assert_eq!(p.with_page(99).page, 3);
        assert_eq!(Pagination::default().with_page(4).page, 1);
    }

    #[test]
    fn test_page_past_the_end_shows_last_page() {
        let p = Pagination::new(10, 10, 42);
        assert_eq!(p.page, 5);
        assert!(p.start_item() <= p.end_item());
        assert_eq!(p.summary(), "Showing 41 to 42 of 42 results");

        assert_eq!(Pagination::new(3, 10, 0).page, 1);
        assert_eq!(Pagination::new(0, 10, 42).page, 1);
    }

    #[test]
    fn test_page_size_change_resets_page() {
        let p = Pagination::new(3, 10, 100).with_page_size(50);
        assert_eq!(p.page, 1);
        assert_eq!(p.page_size, 50);
        assert_eq!(p.total_pages(), 2);
    }
}
