//! Roles screen: every user account with its role. Enter opens a picker to
//! assign a new role, confirmed before it is sent.

use std::sync::Arc;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table};
use strum::IntoEnumIterator;

use xpress_core::{Role, User};

use crate::action::{Action, ConfirmAction};
use crate::component::Component;
use crate::theme;
use crate::widgets::list_pane::cycle_choice;
use crate::widgets::sub_tabs;

/// Role picker state for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Picker {
    uid: String,
    email: String,
    index: usize,
}

#[derive(Default)]
pub struct RolesScreen {
    focused: bool,
    users: Arc<Vec<User>>,
    loading: bool,
    error: Option<String>,
    search: String,
    role_filter: Option<Role>,
    cursor: usize,
    picker: Option<Picker>,
}

impl RolesScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn visible(&self) -> Vec<&User> {
        let needle = self.search.to_lowercase();
        self.users
            .iter()
            .filter(|u| {
                needle.is_empty()
                    || [&u.email, &u.display_name, &u.user_name]
                        .into_iter()
                        .flatten()
                        .any(|v| v.to_lowercase().contains(&needle))
            })
            .filter(|u| {
                self.role_filter
                    .is_none_or(|r| u.role_label().eq_ignore_ascii_case(&r.to_string()))
            })
            .collect()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    fn open_picker(&mut self) {
        let Some(user) = self.visible().get(self.cursor).copied() else {
            return;
        };
        let index = Role::iter()
            .position(|r| user.role_label().eq_ignore_ascii_case(&r.to_string()))
            .unwrap_or(0);
        self.picker = Some(Picker {
            uid: user.uid.clone(),
            email: user.email.clone().unwrap_or_else(|| user.uid.clone()),
            index,
        });
    }

    fn handle_picker_key(&mut self, key: KeyEvent) -> Option<Action> {
        let roles: Vec<Role> = Role::iter().collect();
        let picker = self.picker.as_mut()?;
        match key.code {
            KeyCode::Left | KeyCode::Char('h') => {
                picker.index = (picker.index + roles.len() - 1) % roles.len();
            }
            KeyCode::Right | KeyCode::Char('l') | KeyCode::Tab => {
                picker.index = (picker.index + 1) % roles.len();
            }
            KeyCode::Enter => {
                let picker = self.picker.take()?;
                return Some(Action::ShowConfirm(ConfirmAction::AssignRole {
                    uid: picker.uid,
                    email: picker.email,
                    role: roles[picker.index],
                }));
            }
            KeyCode::Esc => self.picker = None,
            _ => {}
        }
        None
    }

    fn render_picker(frame: &mut Frame, area: Rect, picker: &Picker) {
        let width = 56.min(area.width.saturating_sub(4));
        let height = 7;
        let popup = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );
        frame.render_widget(Clear, popup);

        let labels: Vec<String> = Role::iter().map(|r| r.to_string()).collect();
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        let lines = vec![
            Line::from(Span::styled(picker.email.clone(), theme::tab_inactive())),
            Line::from(""),
            sub_tabs::render_sub_tabs("", &label_refs, picker.index),
            Line::from(""),
            Line::from(vec![
                Span::styled("\u{2190}/\u{2192} ", theme::key_hint_key()),
                Span::styled("choose  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("assign  ", theme::key_hint()),
                Span::styled("Esc ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        let block = Block::default()
            .title(" Assign Role ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());
        frame.render_widget(
            Paragraph::new(lines)
                .block(block)
                .alignment(Alignment::Center),
            popup,
        );
    }
}

impl Component for RolesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.picker.is_some() {
            return Ok(self.handle_picker_key(key));
        }

        let last = self.visible().len().saturating_sub(1);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor = (self.cursor + 1).min(last),
            KeyCode::Char('k') | KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char('g') => self.cursor = 0,
            KeyCode::Char('G') => self.cursor = last,
            KeyCode::Char('f') => {
                let roles: Vec<Role> = Role::iter().collect();
                self.role_filter = cycle_choice(self.role_filter.as_ref(), &roles);
                self.cursor = 0;
            }
            KeyCode::Enter => self.open_picker(),
            KeyCode::Char('r') => return Ok(Some(Action::LoadUsers)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::UsersUpdated(state) => {
                self.users = Arc::clone(&state.data);
                self.loading = state.loading;
                self.error.clone_from(&state.error);
                self.clamp_cursor();
            }
            Action::SearchInput(query) => {
                self.search.clone_from(query);
                self.cursor = 0;
            }
            Action::CloseSearch => {
                self.search.clear();
                self.cursor = 0;
            }
            Action::LoggedOut => *self = Self::new(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let visible = self.visible();
        let title = if self.search.is_empty() {
            format!(" Users ({}) ", self.users.len())
        } else {
            format!(" Users ({}) [\"{}\"] ", self.users.len(), self.search)
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
            Constraint::Min(1),
            Constraint::Length(1),
        ])
        .split(inner);

        let active = self
            .role_filter
            .and_then(|r| Role::iter().position(|x| x == r))
            .map_or(0, |i| i + 1);
        let mut labels = vec!["All".to_owned()];
        labels.extend(Role::iter().map(|r| r.to_string()));
        let label_refs: Vec<&str> = labels.iter().map(String::as_str).collect();
        frame.render_widget(
            Paragraph::new(sub_tabs::render_sub_tabs(" Role: ", &label_refs, active)),
            layout[0],
        );

        if visible.is_empty() {
            let (text, style) = if let Some(ref err) = self.error {
                (format!("  {err}"), Style::default().fg(theme::ERROR_RED))
            } else if self.loading {
                ("  Loading\u{2026}".to_owned(), theme::key_hint())
            } else {
                ("  No users found".to_owned(), theme::key_hint())
            };
            frame.render_widget(Paragraph::new(Span::styled(text, style)), layout[1]);
        } else {
            let header = Row::new(
                ["Email", "Display Name", "User Name", "Role"]
                    .map(|h| Cell::from(h).style(theme::table_header())),
            );
            let rows: Vec<Row> = visible
                .iter()
                .enumerate()
                .map(|(i, u)| {
                    let role = u.role_label();
                    Row::new(vec![
                        Cell::from(u.email.clone().unwrap_or_default())
                            .style(Style::default().fg(theme::NEON_CYAN)),
                        Cell::from(u.display_name_or_na().to_owned()),
                        Cell::from(u.user_name.clone().unwrap_or_default()),
                        Cell::from(role.to_owned())
                            .style(Style::default().fg(theme::role_color(role))),
                    ])
                    .style(if i == self.cursor {
                        theme::table_cursor()
                    } else {
                        theme::table_row()
                    })
                })
                .collect();
            let table = Table::new(
                rows,
                [
                    Constraint::Fill(3),
                    Constraint::Fill(2),
                    Constraint::Fill(2),
                    Constraint::Length(12),
                ],
            )
            .header(header);
            frame.render_widget(table, layout[1]);
        }

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled("role filter  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("assign role  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[2]);

        if let Some(ref picker) = self.picker {
            Self::render_picker(frame, area, picker);
        }
    }

    fn captures_input(&self) -> bool {
        self.picker.is_some()
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Roles"
    }
}
