use serde::Serialize;

/// Up to this many pages every page number is shown.
pub const MAX_UNCOLLAPSED_PAGES: usize = 7;

/// Computes the page selector markers for the given position.
///
/// `Some(n)` is a clickable page, `None` an ellipsis gap. The inputs are not
/// validated: a `current_page` outside `1..=total_pages` still yields a window
/// computed from the given values.
pub fn compute_window(current_page: usize, total_pages: usize) -> Vec<Option<usize>> {
    if total_pages <= MAX_UNCOLLAPSED_PAGES {
        return (1..=total_pages).map(Some).collect();
    }

    let mut pages = vec![Some(1)];

    if current_page > 3 {
        pages.push(None);
    }

    let mid_start = current_page.saturating_sub(1).max(2);
    let mid_end = current_page.saturating_add(1).min(total_pages - 1);
    for page in mid_start..=mid_end {
        if !pages.contains(&Some(page)) {
            pages.push(Some(page));
        }
    }

    if current_page < total_pages.saturating_sub(2) {
        pages.push(None);
    }

    if !pages.contains(&Some(total_pages)) {
        pages.push(Some(total_pages));
    }

    pages
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pages: Vec<Option<usize>>,
    pub page: usize,
    pub total_pages: usize,
}

impl<T> Paginated<T> {
    pub fn new(items: Vec<T>, current_page: usize, total_pages: usize) -> Self {
        let current_page = if current_page == 0 { 1 } else { current_page };

        let pages = compute_window(current_page, total_pages);

        Self {
            items,
            pages,
            page: current_page,
            total_pages,
        }
    }

    /// A single page (or none) renders no selector at all.
    pub fn should_display(&self) -> bool {
        self.total_pages > 1
    }

    pub fn previous_page(&self) -> Option<usize> {
        (self.page > 1).then(|| self.page - 1)
    }

    pub fn next_page(&self) -> Option<usize> {
        (self.page < self.total_pages).then(|| self.page + 1)
    }
}
