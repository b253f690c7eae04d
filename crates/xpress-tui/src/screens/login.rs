//! Sign-in screen. Shown at startup without an admin session and after
//! logout; it takes every key except Ctrl+C.

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};
use secrecy::{ExposeSecret, SecretString};
use throbber_widgets_tui::{Throbber, ThrobberState};
use tui_input::{Input, InputRequest};

use xpress_core::LoginForm;

use crate::action::Action;
use crate::app::LoginDefaults;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Email,
    Password,
}

pub struct LoginScreen {
    email: Input,
    password: Input,
    field: Field,
    /// A sign-in request is in flight.
    pending: bool,
    error: Option<String>,
    /// Neutral status line (reset link sent, signed out).
    info: Option<String>,
    throbber_state: ThrobberState,
}

impl LoginScreen {
    pub fn new(defaults: &LoginDefaults) -> Self {
        let password = defaults
            .password
            .as_ref()
            .map(|p| Input::new(p.expose_secret().to_owned()))
            .unwrap_or_default();
        let field = if defaults.email.is_empty() {
            Field::Email
        } else {
            Field::Password
        };
        Self {
            email: Input::new(defaults.email.clone()),
            password,
            field,
            pending: false,
            error: None,
            info: None,
            throbber_state: ThrobberState::default(),
        }
    }

    fn active_input(&mut self) -> &mut Input {
        match self.field {
            Field::Email => &mut self.email,
            Field::Password => &mut self.password,
        }
    }

    fn toggle_field(&mut self) {
        self.field = match self.field {
            Field::Email => Field::Password,
            Field::Password => Field::Email,
        };
    }

    fn submit(&mut self) -> Option<Action> {
        let form = LoginForm {
            email: self.email.value().to_owned(),
            password: self.password.value().to_owned(),
        };
        match form.validate() {
            Ok((email, password)) => {
                self.pending = true;
                self.error = None;
                self.info = None;
                Some(Action::LoginSubmit {
                    email: email.to_owned(),
                    password: SecretString::from(password.to_owned()),
                })
            }
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }

    fn request_reset(&mut self) -> Option<Action> {
        let email = self.email.value().trim();
        if email.is_empty() {
            self.field = Field::Email;
            self.error = Some("Enter your email to receive a reset link.".into());
            return None;
        }
        self.error = None;
        Some(Action::RequestPasswordReset(email.to_owned()))
    }

    fn edit(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        let request = match key.code {
            KeyCode::Char('w') if ctrl => InputRequest::DeletePrevWord,
            KeyCode::Char('u') if ctrl => InputRequest::DeleteLine,
            KeyCode::Char(c) if !ctrl => InputRequest::InsertChar(c),
            KeyCode::Backspace => InputRequest::DeletePrevChar,
            KeyCode::Delete => InputRequest::DeleteNextChar,
            KeyCode::Left => InputRequest::GoToPrevChar,
            KeyCode::Right => InputRequest::GoToNextChar,
            KeyCode::Home => InputRequest::GoToStart,
            KeyCode::End => InputRequest::GoToEnd,
            _ => return,
        };
        self.active_input().handle(request);
        self.error = None;
    }

    fn render_centered_panel(frame: &mut Frame, area: Rect) -> Rect {
        let width = 60.min(area.width.saturating_sub(4));
        let height = 16.min(area.height.saturating_sub(2));
        let panel = Rect::new(
            area.x + area.width.saturating_sub(width) / 2,
            area.y + area.height.saturating_sub(height) / 2,
            width,
            height,
        );

        let block = Block::default()
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(
                    "Xpress Admin",
                    Style::default()
                        .fg(theme::NEON_CYAN)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center)
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_PURPLE));

        let inner = block.inner(panel);
        frame.render_widget(block, panel);
        inner
    }

    fn render_input_field(
        frame: &mut Frame,
        area: Rect,
        label: &str,
        input: &Input,
        active: bool,
        masked: bool,
    ) {
        if area.height < 3 {
            return;
        }

        let label_style = if active {
            Style::default().fg(theme::NEON_CYAN)
        } else {
            Style::default().fg(theme::DIM_WHITE)
        };
        frame.render_widget(
            Paragraph::new(Span::styled(label, label_style)),
            Rect::new(area.x, area.y, area.width, 1),
        );

        let value = input.value();
        let display = if masked {
            "\u{25CF}".repeat(value.chars().count())
        } else {
            value.to_owned()
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(if active {
                theme::ELECTRIC_PURPLE
            } else {
                theme::BORDER_GRAY
            }));
        let block_area = Rect::new(area.x, area.y + 1, area.width, 3.min(area.height - 1));
        let inner = block.inner(block_area);
        frame.render_widget(block, block_area);

        // Keep the cursor in view on narrow panels.
        let width = usize::from(inner.width.saturating_sub(1)).max(1);
        let scroll = input.visual_scroll(width);
        frame.render_widget(
            Paragraph::new(Span::styled(display, Style::default().fg(theme::NEON_CYAN)))
                .scroll((0, u16::try_from(scroll).unwrap_or(u16::MAX))),
            inner,
        );
        if active {
            let offset = input.visual_cursor().saturating_sub(scroll);
            let x = inner.x.saturating_add(u16::try_from(offset).unwrap_or(u16::MAX));
            frame.set_cursor_position((x.min(inner.right().saturating_sub(1)), inner.y));
        }
    }
}

impl Component for LoginScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if self.pending {
            return Ok(None);
        }
        let action = match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('r')) => self.request_reset(),
            (_, KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down) => {
                self.toggle_field();
                None
            }
            (_, KeyCode::Enter) => {
                if self.field == Field::Email && self.password.value().is_empty() {
                    self.field = Field::Password;
                    None
                } else {
                    self.submit()
                }
            }
            _ => {
                self.edit(key);
                None
            }
        };
        Ok(action)
    }

    /// Insert at the cursor. Only the first line is kept, so a copied
    /// password with a trailing newline does not submit by accident.
    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        if self.pending {
            return Ok(None);
        }
        let line = text.lines().next().unwrap_or_default();
        let input = self.active_input();
        for c in line.chars().filter(|c| !c.is_control()) {
            input.handle(InputRequest::InsertChar(c));
        }
        self.error = None;
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::Tick if self.pending => self.throbber_state.calc_next(),
            Action::LoginFailed(message) => {
                self.pending = false;
                self.error = Some(message.clone());
                self.field = Field::Password;
            }
            Action::LoginSucceeded(_) => {
                self.pending = false;
                self.error = None;
                self.password.reset();
            }
            Action::LoggedOut => {
                self.pending = false;
                self.password.reset();
                self.field = Field::Password;
                self.info = Some("Signed out.".into());
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            area,
        );

        let inner = Self::render_centered_panel(frame, area);

        let layout = Layout::vertical([
            Constraint::Length(2), // subtitle
            Constraint::Length(4), // email
            Constraint::Length(4), // password
            Constraint::Length(1), // status
            Constraint::Min(0),
            Constraint::Length(1), // hints
        ])
        .split(inner);

        frame.render_widget(
            Paragraph::new(Span::styled(
                "Sign in with an admin account",
                theme::key_hint(),
            ))
            .alignment(Alignment::Center),
            layout[0],
        );

        Self::render_input_field(
            frame,
            layout[1],
            "  Email",
            &self.email,
            self.field == Field::Email && !self.pending,
            false,
        );
        Self::render_input_field(
            frame,
            layout[2],
            "  Password",
            &self.password,
            self.field == Field::Password && !self.pending,
            true,
        );

        if self.pending {
            let throbber = Throbber::default()
                .label("  Signing in...")
                .style(Style::default().fg(theme::NEON_CYAN))
                .throbber_style(Style::default().fg(theme::ELECTRIC_PURPLE));
            frame.render_stateful_widget(throbber, layout[3], &mut self.throbber_state.clone());
        } else if let Some(ref err) = self.error {
            frame.render_widget(
                Paragraph::new(Span::styled(err, Style::default().fg(theme::ERROR_RED)))
                    .alignment(Alignment::Center),
                layout[3],
            );
        } else if let Some(ref info) = self.info {
            frame.render_widget(
                Paragraph::new(Span::styled(info, Style::default().fg(theme::SUCCESS_GREEN)))
                    .alignment(Alignment::Center),
                layout[3],
            );
        }

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                Span::styled("Tab ", theme::key_hint_key()),
                Span::styled("switch field  ", theme::key_hint()),
                Span::styled("Enter ", theme::key_hint_key()),
                Span::styled("sign in  ", theme::key_hint()),
                Span::styled("Ctrl+R ", theme::key_hint_key()),
                Span::styled("reset password  ", theme::key_hint()),
                Span::styled("Ctrl+C ", theme::key_hint_key()),
                Span::styled("quit", theme::key_hint()),
            ]))
            .alignment(Alignment::Center),
            layout[5],
        );
    }

    fn captures_input(&self) -> bool {
        true
    }

    fn id(&self) -> &str {
        "Login"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn screen() -> LoginScreen {
        LoginScreen::new(&LoginDefaults {
            email: String::new(),
            password: None,
        })
    }

    fn type_text(screen: &mut LoginScreen, text: &str) {
        for c in text.chars() {
            screen
                .handle_key_event(KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE))
                .unwrap();
        }
    }

    fn press(screen: &mut LoginScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn empty_form_shows_the_required_message() {
        let mut screen = screen();
        press(&mut screen, KeyCode::Tab);
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        assert_eq!(
            screen.error.as_deref(),
            Some("Please enter your email and password.")
        );
        assert!(!screen.pending);
    }

    #[test]
    fn pasted_credentials_fill_the_focused_field() {
        let mut screen = screen();
        screen.handle_paste("admin@xpress.io").unwrap();
        press(&mut screen, KeyCode::Tab);
        screen.handle_paste("s3cret\nignored").unwrap();

        assert_eq!(screen.email.value(), "admin@xpress.io");
        assert_eq!(screen.password.value(), "s3cret");
        let Some(Action::LoginSubmit { email, .. }) = press(&mut screen, KeyCode::Enter) else {
            panic!("expected a sign-in request");
        };
        assert_eq!(email, "admin@xpress.io");

        screen.handle_paste("more").unwrap();
        assert_eq!(screen.password.value(), "s3cret");
    }

    #[test]
    fn enter_moves_to_password_then_submits() {
        let mut screen = screen();
        type_text(&mut screen, " admin@xpress.io ");
        assert!(press(&mut screen, KeyCode::Enter).is_none());
        assert_eq!(screen.field, Field::Password);
        type_text(&mut screen, "hunter22");

        let Some(Action::LoginSubmit { email, password }) = press(&mut screen, KeyCode::Enter)
        else {
            panic!("expected a sign-in request");
        };
        assert_eq!(email, "admin@xpress.io");
        assert_eq!(password.expose_secret(), "hunter22");
        assert!(screen.pending);

        // Input is ignored while the request is in flight.
        type_text(&mut screen, "x");
        assert_eq!(screen.password.value(), "hunter22");

        screen
            .update(&Action::LoginFailed("You do not have admin access".into()))
            .unwrap();
        assert!(!screen.pending);
        assert_eq!(screen.error.as_deref(), Some("You do not have admin access"));
    }

    #[test]
    fn defaults_prefill_and_focus_the_password() {
        let screen = LoginScreen::new(&LoginDefaults {
            email: "admin@xpress.io".into(),
            password: Some(SecretString::from("s3cret".to_owned())),
        });
        assert_eq!(screen.email.value(), "admin@xpress.io");
        assert_eq!(screen.password.value(), "s3cret");
        assert_eq!(screen.field, Field::Password);
    }

    #[test]
    fn reset_needs_an_email() {
        let mut screen = screen();
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert!(screen.handle_key_event(ctrl_r).unwrap().is_none());
        assert!(screen.error.is_some());

        type_text(&mut screen, "admin@xpress.io");
        let action = screen.handle_key_event(ctrl_r).unwrap();
        assert!(matches!(
            action,
            Some(Action::RequestPasswordReset(ref e)) if e == "admin@xpress.io"
        ));
    }

    #[test]
    fn success_and_logout_clear_the_password() {
        let mut screen = screen();
        type_text(&mut screen, "admin@xpress.io");
        press(&mut screen, KeyCode::Tab);
        type_text(&mut screen, "pw");
        press(&mut screen, KeyCode::Backspace);
        assert_eq!(screen.password.value(), "p");

        screen.update(&Action::LoginSucceeded(None)).unwrap();
        assert_eq!(screen.password.value(), "");

        screen.update(&Action::LoggedOut).unwrap();
        assert_eq!(screen.email.value(), "admin@xpress.io");
        assert_eq!(screen.info.as_deref(), Some("Signed out."));
    }
}
