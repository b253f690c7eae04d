//! Paged, searchable, sortable table shared by the products and vendors
//! screens.
//!
//! Wraps a core [`ListState`] with the loaded rows and a cursor into the
//! current page. The owning screen supplies the columns and cell text.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Cell, Paragraph, Row, Table};

use xpress_core::{ListItem, ListState, ListView, ResourceState, SortDirection, SortSpec};

use crate::theme;

/// One table column. Columns with a sort key take part in `s` cycling.
pub struct Column<K> {
    pub title: &'static str,
    pub sort: Option<K>,
    pub width: Constraint,
}

pub struct ListPane<T: ListItem> {
    pub state: ListState<T>,
    items: Arc<Vec<T>>,
    loading: bool,
    error: Option<String>,
    /// Row index within the current page.
    cursor: usize,
}

impl<T: ListItem> ListPane<T> {
    pub fn new(page_size: usize) -> Self {
        Self {
            state: ListState::new(page_size),
            items: Arc::new(Vec::new()),
            loading: false,
            error: None,
            cursor: 0,
        }
    }

    // ── Data ─────────────────────────────────────────────────────────

    pub fn apply_resource(&mut self, resource: &ResourceState<T>) {
        self.items = Arc::clone(&resource.data);
        self.loading = resource.loading;
        self.error.clone_from(&resource.error);
        self.clamp_cursor();
    }

    pub fn clear(&mut self) {
        self.apply_resource(&ResourceState::default());
        self.state.clear_selection();
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn view(&self) -> ListView<'_, T> {
        self.state.view(&self.items)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// The row under the cursor on the current page.
    pub fn cursor_item(&self) -> Option<&T> {
        self.view().rows.get(self.cursor).copied()
    }

    /// Ticked ids, falling back to nothing.
    pub fn selected_ids(&self) -> Vec<String> {
        self.state.selected().map(str::to_owned).collect()
    }

    // ── State changes ────────────────────────────────────────────────

    pub fn set_search(&mut self, query: &str) {
        self.state.set_search(query);
        self.cursor = 0;
    }

    pub fn update_filter(&mut self, f: impl FnOnce(&mut T::Filter)) {
        self.state.update_filter(f);
        self.cursor = 0;
    }

    /// Move the sort to the next sortable column, ascending. After the
    /// last column the list goes back to its natural order.
    pub fn cycle_sort(&mut self, columns: &[Column<T::SortKey>]) {
        let keys: Vec<T::SortKey> = columns.iter().filter_map(|c| c.sort).collect();
        let next = match self.state.sort() {
            None => keys.first().copied(),
            Some(spec) => keys
                .iter()
                .position(|&k| k == spec.key)
                .and_then(|i| keys.get(i + 1))
                .copied(),
        };
        self.state.set_sort(next.map(SortSpec::ascending));
    }

    /// Flip the direction of the active sort column.
    pub fn flip_sort(&mut self) {
        if let Some(spec) = self.state.sort() {
            self.state.toggle_sort(spec.key);
        }
    }

    fn move_cursor(&mut self, delta: isize) {
        let len = self.view().rows.len();
        if len == 0 {
            self.cursor = 0;
            return;
        }
        self.cursor = self.cursor.saturating_add_signed(delta).min(len - 1);
    }

    fn clamp_cursor(&mut self) {
        let len = self.view().rows.len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn change_page(&mut self, f: impl FnOnce(&mut ListState<T>, usize)) {
        let total = self.view().total_pages;
        f(&mut self.state, total);
        self.cursor = 0;
    }

    /// Navigation, paging, selection and sort keys shared by every list.
    /// Returns false when the key is not a list key.
    pub fn handle_key(&mut self, key: KeyEvent, columns: &[Column<T::SortKey>]) -> bool {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.move_cursor(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_cursor(-1),
            KeyCode::Char('g') => self.cursor = 0,
            KeyCode::Char('G') => self.move_cursor(isize::MAX),
            KeyCode::Right | KeyCode::Char(']') | KeyCode::PageDown => {
                self.change_page(|s, total| s.next_page(total));
            }
            KeyCode::Left | KeyCode::Char('[') | KeyCode::PageUp => {
                self.change_page(|s, _| s.prev_page());
            }
            KeyCode::Home => self.change_page(|s, total| s.go_to_page(1, total)),
            KeyCode::End => self.change_page(|s, total| s.go_to_page(total, total)),
            KeyCode::Char(' ') => {
                let id = self.cursor_item().map(|item| item.id().to_owned());
                if let Some(id) = id {
                    self.state.toggle_select(&id);
                }
            }
            KeyCode::Char('a') => {
                let view = self.state.view(&self.items);
                self.state.select_page(&view);
            }
            KeyCode::Char('s') => {
                self.cycle_sort(columns);
                self.cursor = 0;
            }
            KeyCode::Char('S') => {
                self.flip_sort();
                self.cursor = 0;
            }
            KeyCode::Char('C') => {
                self.state.clear_filters();
                self.cursor = 0;
            }
            _ => return false,
        }
        true
    }

    // ── Rendering ────────────────────────────────────────────────────

    /// The table body, or a loading / error / empty message in its place.
    pub fn render_table<F>(
        &self,
        frame: &mut Frame,
        area: Rect,
        columns: &[Column<T::SortKey>],
        view: &ListView<'_, T>,
        cells: F,
    ) where
        F: Fn(&T) -> Vec<Cell<'static>>,
    {
        if view.rows.is_empty() {
            let (text, style) = if let Some(ref err) = self.error {
                (format!("  {err}"), Style::default().fg(theme::ERROR_RED))
            } else if self.loading {
                ("  Loading\u{2026}".to_owned(), theme::key_hint())
            } else {
                ("  No entries found".to_owned(), theme::key_hint())
            };
            frame.render_widget(Paragraph::new(Span::styled(text, style)), area);
            return;
        }

        let sort = self.state.sort();
        let mut header = vec![Cell::from("").style(theme::table_header())];
        header.extend(columns.iter().map(|col| header_cell(col, sort)));

        let rows: Vec<Row> = view
            .rows
            .iter()
            .enumerate()
            .map(|(i, item)| {
                let selected = self.state.is_selected(item.id());
                let mark = if selected { "\u{25C9}" } else { "\u{25CB}" };
                let mut row_cells = vec![Cell::from(mark)];
                row_cells.extend(cells(item));
                let style = if i == self.cursor {
                    theme::table_cursor()
                } else if selected {
                    theme::table_selected()
                } else {
                    theme::table_row()
                };
                Row::new(row_cells).style(style)
            })
            .collect();

        let mut widths = vec![Constraint::Length(2)];
        widths.extend(columns.iter().map(|c| c.width));

        let table = Table::new(rows, widths).header(Row::new(header));
        frame.render_widget(table, area);
    }

    /// "Showing 1 to 10 of 42 entries", the page window and the selection.
    pub fn footer(&self, view: &ListView<'_, T>) -> Line<'static> {
        let mut spans = vec![Span::styled(format!("  {}", view.showing), theme::key_hint())];

        if view.total_pages > 1 {
            spans.push(Span::styled("   \u{2039} ", theme::key_hint()));
            for page in &view.window {
                if *page == view.page {
                    spans.push(Span::styled(format!("[{page}] "), theme::tab_active()));
                } else {
                    spans.push(Span::styled(format!("{page} "), theme::tab_inactive()));
                }
            }
            spans.push(Span::styled("\u{203A}", theme::key_hint()));
        }

        let selected = self.state.selected_count();
        if selected > 0 {
            spans.push(Span::styled(
                format!("   {selected} selected"),
                Style::default().fg(theme::ELECTRIC_PURPLE),
            ));
        }
        if self.loading && !view.rows.is_empty() {
            spans.push(Span::styled("   refreshing\u{2026}", theme::key_hint()));
        }

        Line::from(spans)
    }
}

/// Step a filter through `None`, each choice in order, then back to `None`.
pub fn cycle_choice<C: Clone + PartialEq>(current: Option<&C>, choices: &[C]) -> Option<C> {
    match current {
        None => choices.first().cloned(),
        Some(c) => choices
            .iter()
            .position(|x| x == c)
            .and_then(|i| choices.get(i + 1))
            .cloned(),
    }
}

fn header_cell<K: Copy + Eq>(col: &Column<K>, sort: Option<SortSpec<K>>) -> Cell<'static> {
    match (col.sort, sort) {
        (Some(key), Some(spec)) if key == spec.key => {
            let arrow = match spec.direction {
                SortDirection::Ascending => "\u{25B2}",
                SortDirection::Descending => "\u{25BC}",
            };
            Cell::from(format!("{} {arrow}", col.title)).style(theme::table_header_sorted())
        }
        _ => Cell::from(col.title).style(theme::table_header()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use xpress_core::{Priority, Vendor, VendorSortKey};

    use super::*;

    fn vendor(i: usize) -> Vendor {
        Vendor {
            id: format!("v{i}"),
            name: format!("Vendor {i:02}"),
            email: format!("v{i}@parts.test"),
            phone: String::new(),
            location: "Accra".into(),
            company: None,
            website: None,
            notes: None,
            priority: Some(Priority::Medium),
            is_active: true,
            category: None,
            date_published: None,
        }
    }

    fn loaded(n: usize, page_size: usize) -> ListPane<Vendor> {
        let mut pane = ListPane::new(page_size);
        pane.apply_resource(&ResourceState {
            data: Arc::new((1..=n).map(vendor).collect()),
            loading: false,
            error: None,
        });
        pane
    }

    fn press(pane: &mut ListPane<Vendor>, code: KeyCode) -> bool {
        pane.handle_key(KeyEvent::new(code, KeyModifiers::NONE), &COLUMNS)
    }

    const COLUMNS: [Column<VendorSortKey>; 3] = [
        Column { title: "Name", sort: Some(VendorSortKey::Name), width: Constraint::Fill(1) },
        Column { title: "Notes", sort: None, width: Constraint::Fill(1) },
        Column { title: "Email", sort: Some(VendorSortKey::Email), width: Constraint::Fill(1) },
    ];

    #[test]
    fn cursor_stays_on_the_page() {
        let mut pane = loaded(12, 5);
        press(&mut pane, KeyCode::Char('G'));
        assert_eq!(pane.cursor(), 4);
        press(&mut pane, KeyCode::Char('j'));
        assert_eq!(pane.cursor(), 4);
        press(&mut pane, KeyCode::Right);
        assert_eq!(pane.state.page(), 2);
        assert_eq!(pane.cursor(), 0);
        assert_eq!(pane.cursor_item().unwrap().id, "v6");
    }

    #[test]
    fn paging_stops_at_the_last_page() {
        let mut pane = loaded(12, 5);
        press(&mut pane, KeyCode::End);
        assert_eq!(pane.state.page(), 3);
        press(&mut pane, KeyCode::Right);
        assert_eq!(pane.state.page(), 3);
        assert_eq!(pane.view().rows.len(), 2);
    }

    #[test]
    fn sort_cycles_through_sortable_columns_then_off() {
        let mut pane = loaded(3, 10);
        press(&mut pane, KeyCode::Char('s'));
        assert_eq!(pane.state.sort(), Some(SortSpec::ascending(VendorSortKey::Name)));
        press(&mut pane, KeyCode::Char('S'));
        assert_eq!(
            pane.state.sort().map(|s| s.direction),
            Some(SortDirection::Descending)
        );
        assert_eq!(pane.cursor_item().unwrap().id, "v3");
        press(&mut pane, KeyCode::Char('s'));
        assert_eq!(pane.state.sort(), Some(SortSpec::ascending(VendorSortKey::Email)));
        press(&mut pane, KeyCode::Char('s'));
        assert_eq!(pane.state.sort(), None);
    }

    #[test]
    fn selection_toggles_and_covers_the_page() {
        let mut pane = loaded(7, 5);
        press(&mut pane, KeyCode::Char(' '));
        assert_eq!(pane.selected_ids(), vec!["v1".to_owned()]);
        press(&mut pane, KeyCode::Char('a'));
        assert_eq!(pane.state.selected_count(), 5);
        press(&mut pane, KeyCode::Char('a'));
        assert_eq!(pane.state.selected_count(), 0);
    }

    #[test]
    fn new_data_clamps_the_cursor() {
        let mut pane = loaded(5, 5);
        press(&mut pane, KeyCode::Char('G'));
        assert_eq!(pane.cursor(), 4);
        pane.apply_resource(&ResourceState {
            data: Arc::new(vec![vendor(1), vendor(2)]),
            loading: false,
            error: None,
        });
        assert_eq!(pane.cursor(), 1);
    }

    #[test]
    fn search_resets_cursor_and_narrows_rows() {
        let mut pane = loaded(12, 5);
        press(&mut pane, KeyCode::Char('j'));
        pane.set_search("vendor 1");
        assert_eq!(pane.cursor(), 0);
        // Vendor 10, 11, 12
        assert_eq!(pane.view().filtered.len(), 3);
    }

    #[test]
    fn footer_reports_range_and_selection() {
        let mut pane = loaded(12, 5);
        press(&mut pane, KeyCode::Char(' '));
        let view = pane.view();
        let text: String = pane
            .footer(&view)
            .spans
            .iter()
            .map(|s| s.content.as_ref())
            .collect();
        assert!(text.contains("Showing 1 to 5 of 12 entries"), "{text}");
        assert!(text.contains("[1]"));
        assert!(text.contains("1 selected"));
    }

    #[test]
    fn filter_choices_wrap_through_none() {
        let choices = ["Accra", "Lagos"];
        assert_eq!(cycle_choice(None, &choices), Some("Accra"));
        assert_eq!(cycle_choice(Some(&"Accra"), &choices), Some("Lagos"));
        assert_eq!(cycle_choice(Some(&"Lagos"), &choices), None);
        // A stale choice that vanished from the data resets the filter.
        assert_eq!(cycle_choice(Some(&"Kumasi"), &choices), None);
        assert_eq!(cycle_choice::<&str>(None, &[]), None);
    }

    #[test]
    fn unknown_keys_fall_through() {
        let mut pane = loaded(2, 5);
        assert!(!press(&mut pane, KeyCode::Char('e')));
    }
}
