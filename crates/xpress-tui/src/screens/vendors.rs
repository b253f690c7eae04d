//! Vendors screen: the vendor directory with status, priority and location
//! filters.

use std::path::PathBuf;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph};
use strum::IntoEnumIterator;

use xpress_core::query::{unique_locations, unique_priorities};
use xpress_core::{Invalidation, Vendor, VendorCounts, VendorSortKey, VendorStatus, export};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::list_pane::{Column, ListPane, cycle_choice};
use crate::widgets::sub_tabs;

const COLUMNS: [Column<VendorSortKey>; 8] = [
    Column { title: "ID", sort: Some(VendorSortKey::Id), width: Constraint::Length(10) },
    Column { title: "Name", sort: Some(VendorSortKey::Name), width: Constraint::Fill(2) },
    Column { title: "Email", sort: Some(VendorSortKey::Email), width: Constraint::Fill(2) },
    Column { title: "Phone", sort: Some(VendorSortKey::Phone), width: Constraint::Length(16) },
    Column { title: "Location", sort: Some(VendorSortKey::Location), width: Constraint::Fill(1) },
    Column { title: "Priority", sort: Some(VendorSortKey::Priority), width: Constraint::Length(10) },
    Column { title: "Status", sort: Some(VendorSortKey::Status), width: Constraint::Length(10) },
    Column {
        title: "Published",
        sort: Some(VendorSortKey::DatePublished),
        width: Constraint::Length(11),
    },
];

pub struct VendorsScreen {
    focused: bool,
    pane: ListPane<Vendor>,
}

impl VendorsScreen {
    pub fn new(page_size: usize) -> Self {
        Self {
            focused: false,
            pane: ListPane::new(page_size),
        }
    }

    fn cycle_status(&mut self) {
        let choices: Vec<VendorStatus> = VendorStatus::iter().collect();
        self.pane
            .update_filter(|f| f.status = cycle_choice(f.status.as_ref(), &choices));
    }

    fn cycle_priority(&mut self) {
        let mut choices = unique_priorities(self.pane.items());
        choices.sort();
        self.pane
            .update_filter(|f| f.priority = cycle_choice(f.priority.as_ref(), &choices));
    }

    fn cycle_location(&mut self) {
        let choices = unique_locations(self.pane.items());
        self.pane
            .update_filter(|f| f.location = cycle_choice(f.location.as_ref(), &choices));
    }

    fn export(&self) -> Action {
        let view = self.pane.view();
        match export::vendors_csv(view.filtered.iter().copied()) {
            Ok(contents) => Action::WriteExport {
                path: PathBuf::from(export::VENDORS_CSV_FILE),
                contents,
                rows: view.filtered.len(),
            },
            Err(e) => Action::Notify(Notification::error(format!("Export failed: {e}"))),
        }
    }

    fn delete_cursor(&self) -> Option<Action> {
        self.pane.cursor_item().map(|v| {
            Action::ShowConfirm(ConfirmAction::DeleteVendor {
                id: v.id.clone(),
                name: v.name.clone(),
            })
        })
    }

    fn delete_selected(&self) -> Action {
        let ids = self.pane.selected_ids();
        if ids.is_empty() {
            Action::Notify(Notification::info("Select vendors with Space first"))
        } else {
            Action::ShowConfirm(ConfirmAction::DeleteVendors { ids })
        }
    }

    fn filter_line(&self) -> Line<'static> {
        let filter = self.pane.state.filter();
        let active = match filter.status {
            None => 0,
            Some(VendorStatus::Active) => 1,
            Some(VendorStatus::Inactive) => 2,
        };
        let mut line = sub_tabs::render_sub_tabs(" Status: ", &["All", "Active", "Inactive"], active);
        if let Some(p) = filter.priority {
            line.spans.push(Span::styled("   Priority: ", theme::key_hint()));
            line.spans.push(Span::styled(
                p.to_string(),
                Style::default().fg(theme::priority_color(p)),
            ));
        }
        if let Some(ref loc) = filter.location {
            line.spans.push(Span::styled("   Location: ", theme::key_hint()));
            line.spans.push(Span::styled(
                loc.clone(),
                Style::default().fg(theme::NEON_CYAN),
            ));
        }
        line
    }
}

fn vendor_cells(v: &Vendor) -> Vec<Cell<'static>> {
    let status = v.status();
    let priority = v.priority.map_or_else(
        || Cell::from("\u{2500}"),
        |p| Cell::from(p.to_string()).style(Style::default().fg(theme::priority_color(p))),
    );
    vec![
        Cell::from(v.id.clone()).style(Style::default().fg(theme::DIM_WHITE)),
        Cell::from(v.name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
        Cell::from(v.email.clone()),
        Cell::from(v.phone.clone()),
        Cell::from(v.location.clone()),
        priority,
        Cell::from(status.to_string()).style(Style::default().fg(theme::vendor_status_color(status))),
        Cell::from(
            v.date_published
                .map_or_else(|| "\u{2500}".to_owned(), |d| d.to_string()),
        ),
    ]
}

impl Component for VendorsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('f') => {
                self.cycle_status();
                None
            }
            KeyCode::Char('p') => {
                self.cycle_priority();
                None
            }
            KeyCode::Char('l') => {
                self.cycle_location();
                None
            }
            KeyCode::Char('e') => Some(self.export()),
            KeyCode::Char('d') => self.delete_cursor(),
            KeyCode::Char('x') => Some(self.delete_selected()),
            KeyCode::Char('r') => Some(Action::LoadVendors),
            _ => {
                self.pane.handle_key(key, &COLUMNS);
                None
            }
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::VendorsUpdated(state) => self.pane.apply_resource(state),
            Action::Invalidated(Invalidation::Vendors) => self.pane.state.clear_selection(),
            Action::SearchInput(query) => self.pane.set_search(query),
            Action::CloseSearch => self.pane.set_search(""),
            Action::LoggedOut => {
                self.pane.state.clear_filters();
                self.pane.clear();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let search = self.pane.state.search();
        let title = if search.is_empty() {
            format!(" Vendors ({}) ", self.pane.items().len())
        } else {
            format!(" Vendors ({}) [\"{search}\"] ", self.pane.items().len())
        };
        let block = Block::default()
            .title(title)
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.focused {
                theme::border_focused()
            } else {
                theme::border_default()
            });

        let inner = block.inner(area);
        frame.render_widget(block, area);

        let layout = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let view = self.pane.view();
        let counts: VendorCounts = view.filtered.iter().copied().collect();

        frame.render_widget(Paragraph::new(self.filter_line()), layout[0]);
        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled(format!(" {} total", counts.total), theme::tab_inactive()),
                Span::styled("  \u{00B7}  ", theme::key_hint()),
                Span::styled(
                    format!("{} active", counts.active),
                    Style::default().fg(theme::vendor_status_color(VendorStatus::Active)),
                ),
                Span::styled("  \u{00B7}  ", theme::key_hint()),
                Span::styled(
                    format!("{} inactive", counts.inactive),
                    Style::default().fg(theme::vendor_status_color(VendorStatus::Inactive)),
                ),
            ])),
            layout[1],
        );
        self.pane
            .render_table(frame, layout[2], &COLUMNS, &view, vendor_cells);
        frame.render_widget(Paragraph::new(self.pane.footer(&view)), layout[3]);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("\u{2190}/\u{2192} ", theme::key_hint_key()),
            Span::styled("page  ", theme::key_hint()),
            Span::styled("s/S ", theme::key_hint_key()),
            Span::styled("sort  ", theme::key_hint()),
            Span::styled("f/p/l ", theme::key_hint_key()),
            Span::styled("status/priority/location  ", theme::key_hint()),
            Span::styled("Space/a ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("d/x ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("export", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[4]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Vendors"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use xpress_core::{Priority, ResourceState};

    use super::*;

    fn vendor(id: &str, location: &str, priority: Priority, active: bool) -> Vendor {
        Vendor {
            id: id.into(),
            name: format!("Vendor {id}"),
            email: format!("{id}@vendors.test"),
            phone: "+233 20 000 0000".into(),
            location: location.into(),
            company: None,
            website: None,
            notes: None,
            priority: Some(priority),
            is_active: active,
            category: None,
            date_published: None,
        }
    }

    fn screen() -> VendorsScreen {
        let mut screen = VendorsScreen::new(10);
        screen
            .update(&Action::VendorsUpdated(ResourceState {
                data: Arc::new(vec![
                    vendor("v1", "Accra", Priority::High, true),
                    vendor("v2", "Kumasi", Priority::Low, false),
                    vendor("v3", "Accra", Priority::Critical, true),
                ]),
                loading: false,
                error: None,
            }))
            .unwrap();
        screen
    }

    fn key(screen: &mut VendorsScreen, c: char) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
            .unwrap()
    }

    fn visible(screen: &VendorsScreen) -> Vec<String> {
        screen.pane.view().filtered.iter().map(|v| v.id.clone()).collect()
    }

    #[test]
    fn filters_combine() {
        let mut screen = screen();
        key(&mut screen, 'l');
        assert_eq!(visible(&screen), vec!["v1", "v3"]);
        // Priorities cycle in rank order: low, high, critical.
        key(&mut screen, 'p');
        assert!(visible(&screen).is_empty());
        key(&mut screen, 'p');
        assert_eq!(visible(&screen), vec!["v1"]);
        key(&mut screen, 'C');
        key(&mut screen, 'f');
        key(&mut screen, 'f');
        assert_eq!(visible(&screen), vec!["v2"]);
    }

    #[test]
    fn export_writes_the_vendor_file() {
        let mut screen = screen();
        key(&mut screen, 'f');
        let Some(Action::WriteExport { path, rows, contents }) = key(&mut screen, 'e') else {
            panic!("expected an export");
        };
        assert_eq!(path, PathBuf::from("vendors.csv"));
        assert_eq!(rows, 2);
        assert!(!contents.contains("v2@vendors.test"));
    }

    #[test]
    fn delete_confirms_the_cursor_vendor() {
        let mut screen = screen();
        let Some(Action::ShowConfirm(confirm)) = key(&mut screen, 'd') else {
            panic!("expected a confirmation");
        };
        assert_eq!(
            confirm,
            ConfirmAction::DeleteVendor {
                id: "v1".into(),
                name: "Vendor v1".into()
            }
        );
        assert!(matches!(key(&mut screen, 'r'), Some(Action::LoadVendors)));
    }

    #[test]
    fn search_matches_any_field() {
        let mut screen = screen();
        screen.update(&Action::SearchInput("kumasi".into())).unwrap();
        assert_eq!(visible(&screen), vec!["v2"]);
        screen.update(&Action::CloseSearch).unwrap();
        assert_eq!(visible(&screen).len(), 3);
    }
}
