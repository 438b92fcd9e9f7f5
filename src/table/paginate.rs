use serde::Serialize;

const PAGE_WINDOW: usize = 5;

/// 1-indexed page position. `page_size` is never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    pub current_page: usize,
    pub page_size: usize,
}

impl PageState {
    pub fn new(page_size: usize) -> Self {
        Self {
            current_page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Page size changes always return to the first page.
    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    pub fn go_to(&mut self, page: usize, total_items: usize) {
        self.current_page = clamp_page(page, total_items, self.page_size);
    }

    pub fn next(&mut self, total_items: usize) {
        self.go_to(self.current_page.saturating_add(1), total_items);
    }

    pub fn prev(&mut self, total_items: usize) {
        self.go_to(self.current_page.saturating_sub(1), total_items);
    }

    pub fn reset(&mut self) {
        self.current_page = 1;
    }
}

impl Default for PageState {
    fn default() -> Self {
        Self::new(10)
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size))
}

/// Slice `[(page-1)*size, page*size)` after clamping `page` into range.
pub fn paginate<T>(items: &[T], page: usize, page_size: usize) -> &[T] {
    let size = page_size.max(1);
    let page = clamp_page(page, items.len(), size);
    let start = ((page - 1) * size).min(items.len());
    let end = (start + size).min(items.len());
    &items[start..end]
}

/// Page buttons for pagination controls: every page when there are at most
/// five, otherwise a five-wide window centered on `current` where possible.
pub fn page_numbers(current: usize, total: usize) -> Vec<usize> {
    let total = total.max(1);
    if total <= PAGE_WINDOW {
        return (1..=total).collect();
    }
    let current = current.clamp(1, total);
    let half = PAGE_WINDOW / 2;
    let start = current
        .saturating_sub(half)
        .max(1)
        .min(total - PAGE_WINDOW + 1);
    (start..start + PAGE_WINDOW).collect()
}
