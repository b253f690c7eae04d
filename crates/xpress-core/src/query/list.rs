// Transient list-screen state: search, filters, sort, page and selection.

use indexmap::IndexSet;

use super::paginate::{clamp_page, page_window, paginate, showing_text, total_pages};
use super::{ListItem, SortSpec, apply};
use crate::config::DEFAULT_PAGE_SIZE;

/// UI state driving [`apply`] and [`paginate`] for one list screen.
///
/// Changing the search text or the filters returns to page 1.
#[derive(Debug, Clone)]
pub struct ListState<T: ListItem> {
    search: String,
    filter: T::Filter,
    sort: Option<SortSpec<T::SortKey>>,
    page: usize,
    page_size: usize,
    selected: IndexSet<String>,
}

impl<T: ListItem> Default for ListState<T> {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

/// One rendered page plus the numbers around it.
#[derive(Debug)]
pub struct ListView<'a, T> {
    /// Every item that passed search and filters, sorted.
    pub filtered: Vec<&'a T>,
    /// The rows on the current page.
    pub rows: Vec<&'a T>,
    /// Current page after clamping.
    pub page: usize,
    pub total_pages: usize,
    /// Page buttons to offer.
    pub window: Vec<usize>,
    /// "Showing {start} to {end} of {total} entries".
    pub showing: String,
}

impl<T: ListItem> ListState<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            search: String::new(),
            filter: T::Filter::default(),
            sort: None,
            page: 1,
            page_size: page_size.max(1),
            selected: IndexSet::new(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn filter(&self) -> &T::Filter {
        &self.filter
    }

    pub fn sort(&self) -> Option<SortSpec<T::SortKey>> {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    // ── Search, filter, sort ─────────────────────────────────────────

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
        self.page = 1;
    }

    pub fn set_filter(&mut self, filter: T::Filter) {
        self.filter = filter;
        self.page = 1;
    }

    /// Apply `f` to a copy of the filters and store the result.
    pub fn update_filter(&mut self, f: impl FnOnce(&mut T::Filter)) {
        let mut filter = self.filter.clone();
        f(&mut filter);
        self.set_filter(filter);
    }

    pub fn set_sort(&mut self, sort: Option<SortSpec<T::SortKey>>) {
        self.sort = sort;
    }

    pub fn toggle_sort(&mut self, key: T::SortKey) {
        self.sort = Some(SortSpec::toggle(self.sort, key));
    }

    /// Reset filters, search and sort.
    pub fn clear_filters(&mut self) {
        self.filter = T::Filter::default();
        self.search.clear();
        self.sort = None;
        self.page = 1;
    }

    // ── Paging ───────────────────────────────────────────────────────

    pub fn go_to_page(&mut self, page: usize, total_pages: usize) {
        self.page = clamp_page(page, total_pages);
    }

    pub fn next_page(&mut self, total_pages: usize) {
        self.go_to_page(self.page.saturating_add(1), total_pages);
    }

    pub fn prev_page(&mut self) {
        self.page = self.page.saturating_sub(1).max(1);
    }

    // ── Selection ────────────────────────────────────────────────────

    pub fn toggle_select(&mut self, id: &str) {
        if !self.selected.shift_remove(id) {
            self.selected.insert(id.to_owned());
        }
    }

    /// Select exactly the rows of the current page, or clear the
    /// selection if every one of them is already selected.
    pub fn select_page(&mut self, view: &ListView<'_, T>) {
        let all_selected =
            !view.rows.is_empty() && view.rows.iter().all(|r| self.selected.contains(r.id()));
        self.selected.clear();
        if !all_selected {
            self.selected
                .extend(view.rows.iter().map(|r| r.id().to_owned()));
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.contains(id)
    }

    pub fn selected(&self) -> impl Iterator<Item = &str> {
        self.selected.iter().map(String::as_str)
    }

    pub fn selected_count(&self) -> usize {
        self.selected.len()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // ── View ─────────────────────────────────────────────────────────

    /// Run search, filters and sort over `items` and cut out the current
    /// page. `items` is not modified.
    pub fn view<'a>(&self, items: &'a [T]) -> ListView<'a, T> {
        let filtered = apply(items, &self.search, &self.filter, self.sort);
        let total_pages = total_pages(filtered.len(), self.page_size);
        let page = clamp_page(self.page, total_pages);
        let rows = paginate(&filtered, self.page_size, page).to_vec();
        ListView {
            window: page_window(page, total_pages),
            showing: showing_text(page, self.page_size, filtered.len()),
            filtered,
            rows,
            page,
            total_pages,
        }
    }
}
