//! Application core: event loop, screen management, action dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Tabs},
};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use xpress_core::{Command, Controller, CoreError, Invalidation, Product, ResourceState};

use crate::action::{Action, ConfirmAction, Notification, NotificationLevel};
use crate::component::Component;
use crate::event::{Event, EventRates, EventReader};
use crate::screen::ScreenId;
use crate::screens::create_screens;
use crate::theme;
use crate::tui::Tui;

/// Values pre-filled into the sign-in form from the active profile.
pub struct LoginDefaults {
    pub email: String,
    pub password: Option<SecretString>,
}

/// Errors after which the only way forward is signing in again.
fn needs_sign_in(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::NotAuthenticated
            | CoreError::SessionExpired
            | CoreError::AuthenticationFailed { .. }
            | CoreError::Forbidden { .. }
    )
}

/// Report a failed background request, ending the session when the
/// backend no longer accepts it.
fn report_failure(tx: &mpsc::UnboundedSender<Action>, prefix: &str, err: &CoreError) {
    warn!(error = %err, "{prefix}");
    let _ = tx.send(Action::Notify(Notification::error(format!("{prefix}: {err}"))));
    if needs_sign_in(err) {
        let _ = tx.send(Action::Logout);
    }
}

/// Top-level application state and event loop.
pub struct App {
    /// Current active screen.
    active_screen: ScreenId,
    /// Previous screen for GoBack.
    previous_screen: Option<ScreenId>,
    /// All screen components, keyed by ScreenId.
    screens: HashMap<ScreenId, Box<dyn Component>>,
    /// Whether the app should keep running.
    running: bool,
    /// Help overlay visibility.
    help_visible: bool,
    /// Search overlay visibility.
    search_active: bool,
    /// Current search query.
    search_query: String,
    /// Action sender. Components and background tasks dispatch through it.
    action_tx: mpsc::UnboundedSender<Action>,
    /// Action receiver, drained by the main loop.
    action_rx: mpsc::UnboundedReceiver<Action>,
    controller: Controller,
    /// Cancellation token for the data bridge task.
    data_cancel: CancellationToken,
    /// Pending confirmation dialog (blocks other input while active).
    pending_confirm: Option<ConfirmAction>,
    /// Active notification toast with display timestamp.
    notification: Option<(Notification, Instant)>,
    /// Last catalog state, kept so a reload shows old rows while loading.
    products: ResourceState<Product>,
    /// Number of the latest catalog request. Results tagged with an older
    /// number are dropped when they reach the main loop.
    products_request: u64,
}

impl App {
    pub fn new(controller: Controller, login: LoginDefaults, page_size: usize) -> Self {
        let (action_tx, action_rx) = mpsc::unbounded_channel();

        let screens: HashMap<ScreenId, Box<dyn Component>> =
            create_screens(page_size, &login).into_iter().collect();

        let signed_in = controller.session().is_some_and(|s| s.is_admin());
        let active_screen = if signed_in {
            ScreenId::Products
        } else {
            ScreenId::Login
        };

        Self {
            active_screen,
            previous_screen: None,
            screens,
            running: true,
            help_visible: false,
            search_active: false,
            search_query: String::new(),
            action_tx,
            action_rx,
            controller,
            data_cancel: CancellationToken::new(),
            pending_confirm: None,
            notification: None,
            products: ResourceState::default(),
            products_request: 0,
        }
    }

    /// Initialize all screen components with the action sender.
    fn init_screens(&mut self) -> Result<()> {
        for screen in self.screens.values_mut() {
            screen.init(self.action_tx.clone())?;
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
        Ok(())
    }

    /// Run the main event loop.
    pub async fn run(&mut self) -> Result<()> {
        let mut tui = Tui::new()?;
        tui.enter()?;
        self.init_screens()?;

        let cancel = self.data_cancel.clone();
        let tx = self.action_tx.clone();
        let controller = self.controller.clone();
        tokio::spawn(async move {
            crate::data_bridge::spawn_data_bridge(controller, tx, cancel).await;
        });

        if self.active_screen != ScreenId::Login {
            self.load_everything()?;
        }

        let mut events = EventReader::new(EventRates::default());

        let (width, height) = tui.size().unwrap_or((80, 24));
        info!(screen = %self.active_screen, width, height, "TUI event loop started");

        while self.running {
            let Some(event) = events.next().await else {
                break;
            };

            match event {
                Event::Key(key) => {
                    if let Some(action) = self.handle_key_event(key)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Paste(text) => {
                    if let Some(action) = self.handle_paste(&text)? {
                        self.action_tx.send(action)?;
                    }
                }
                Event::Resize(w, h) => {
                    self.action_tx.send(Action::Resize(w, h))?;
                }
                Event::Tick => {
                    self.action_tx.send(Action::Tick)?;
                }
                Event::Render => {
                    self.action_tx.send(Action::Render)?;
                }
            }

            while let Ok(action) = self.action_rx.try_recv() {
                self.process_action(&action)?;

                if let Action::Render = action {
                    tui.draw(|frame| self.render(frame))?;
                }
            }
        }

        self.data_cancel.cancel();
        events.stop();
        info!("TUI event loop ended");
        Ok(())
    }

    /// Pasted text goes to the search bar when it is open, else to a
    /// screen that owns the keyboard. Anywhere else it is dropped so a
    /// paste never fires global shortcuts.
    fn handle_paste(&mut self, text: &str) -> Result<Option<Action>> {
        if self.pending_confirm.is_some() {
            return Ok(None);
        }
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_paste(text);
            }
        }
        if self.search_active {
            let line = text.lines().next().unwrap_or_default();
            self.search_query.extend(line.chars().filter(|c| !c.is_control()));
            return Ok(Some(Action::SearchInput(self.search_query.clone())));
        }
        debug!(len = text.len(), "paste ignored outside a text field");
        Ok(None)
    }

    /// Map a key event to an action. Global keys are handled here;
    /// screen-specific keys are delegated to the active screen component.
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if key.modifiers == KeyModifiers::CONTROL && key.code == KeyCode::Char('c') {
            return Ok(Some(Action::Quit));
        }

        // Confirmation dialog captures all input
        if self.pending_confirm.is_some() {
            return match key.code {
                KeyCode::Char('y' | 'Y') => Ok(Some(Action::ConfirmYes)),
                KeyCode::Char('n' | 'N') | KeyCode::Esc => Ok(Some(Action::ConfirmNo)),
                _ => Ok(None),
            };
        }

        // Sign-in form and open pickers take every remaining key
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            if screen.captures_input() {
                return screen.handle_key_event(key);
            }
        }

        if self.search_active {
            return match key.code {
                KeyCode::Esc => {
                    self.search_query.clear();
                    Ok(Some(Action::CloseSearch))
                }
                KeyCode::Enter => Ok(Some(Action::SearchSubmit)),
                KeyCode::Backspace => {
                    self.search_query.pop();
                    Ok(Some(Action::SearchInput(self.search_query.clone())))
                }
                KeyCode::Char(c) => {
                    self.search_query.push(c);
                    Ok(Some(Action::SearchInput(self.search_query.clone())))
                }
                _ => Ok(None),
            };
        }

        if self.help_visible {
            return match key.code {
                KeyCode::Esc | KeyCode::Char('?') => Ok(Some(Action::ToggleHelp)),
                _ => Ok(None),
            };
        }

        match (key.modifiers, key.code) {
            (KeyModifiers::NONE, KeyCode::Char('q')) => return Ok(Some(Action::Quit)),
            (KeyModifiers::NONE, KeyCode::Char('?')) => return Ok(Some(Action::ToggleHelp)),
            (KeyModifiers::NONE, KeyCode::Char('/')) => return Ok(Some(Action::OpenSearch)),
            (KeyModifiers::SHIFT | KeyModifiers::NONE, KeyCode::Char('L')) => {
                return Ok(Some(Action::Logout));
            }

            (KeyModifiers::NONE, KeyCode::Char(c @ '1'..='4')) => {
                let n = c as u8 - b'0';
                if let Some(screen) = ScreenId::from_number(n) {
                    return Ok(Some(Action::SwitchScreen(screen)));
                }
            }

            (KeyModifiers::NONE, KeyCode::Tab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.next())));
            }
            (KeyModifiers::SHIFT, KeyCode::BackTab) => {
                return Ok(Some(Action::SwitchScreen(self.active_screen.prev())));
            }

            (KeyModifiers::NONE, KeyCode::Esc) => return Ok(Some(Action::GoBack)),

            _ => {}
        }

        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            return screen.handle_key_event(key);
        }

        Ok(None)
    }

    fn switch_to(&mut self, target: ScreenId) {
        if target == self.active_screen {
            return;
        }
        debug!("switching screen: {} → {}", self.active_screen, target);
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(false);
        }
        if self.active_screen != ScreenId::Login {
            self.previous_screen = Some(self.active_screen);
        }
        self.active_screen = target;
        self.search_active = false;
        self.search_query.clear();
        if let Some(screen) = self.screens.get_mut(&self.active_screen) {
            screen.set_focused(true);
        }
    }

    /// Send an action to every screen, queueing their follow-ups.
    fn broadcast(&mut self, action: &Action) -> Result<()> {
        for screen in self.screens.values_mut() {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    fn forward_to(&mut self, id: ScreenId, action: &Action) -> Result<()> {
        if let Some(screen) = self.screens.get_mut(&id) {
            if let Some(follow_up) = screen.update(action)? {
                self.action_tx.send(follow_up)?;
            }
        }
        Ok(())
    }

    /// Process a single action: update app state and propagate to components.
    #[allow(clippy::too_many_lines)]
    fn process_action(&mut self, action: &Action) -> Result<()> {
        match action {
            Action::Quit => {
                self.running = false;
            }

            Action::Resize(w, h) => debug!(width = w, height = h, "terminal resized"),

            Action::SwitchScreen(target) => self.switch_to(*target),

            Action::GoBack => {
                if let Some(prev) = self.previous_screen.take() {
                    self.action_tx.send(Action::SwitchScreen(prev))?;
                }
            }

            Action::BrowseCategory(slug) => {
                self.switch_to(ScreenId::Products);
                if slug.is_none() {
                    self.controller.category_products().skip();
                }
                self.forward_to(ScreenId::Products, action)?;
            }

            Action::ToggleHelp => {
                self.help_visible = !self.help_visible;
            }

            Action::OpenSearch => {
                self.search_active = true;
                self.search_query.clear();
            }

            Action::CloseSearch => {
                self.search_active = false;
                self.search_query.clear();
                self.forward_to(self.active_screen, action)?;
            }

            // The query stays applied; only the prompt closes.
            Action::SearchSubmit => {
                self.search_active = false;
            }

            Action::Render => {}

            Action::Tick => {
                if let Some((_, created)) = &self.notification {
                    if created.elapsed() > Duration::from_secs(3) {
                        self.notification = None;
                    }
                }
                // Throbber animation on the sign-in form
                if self.active_screen == ScreenId::Login {
                    self.forward_to(ScreenId::Login, action)?;
                }
            }

            // ── Session ──────────────────────────────────────────────
            Action::LoginSubmit { email, password } => self.login(email, password),

            Action::LoginSucceeded(user) => {
                self.forward_to(ScreenId::Login, action)?;
                let who = user
                    .as_ref()
                    .and_then(|u| u.email.clone())
                    .unwrap_or_else(|| "admin".into());
                self.switch_to(ScreenId::Products);
                self.previous_screen = None;
                self.load_everything()?;
                self.action_tx
                    .send(Action::Notify(Notification::success(format!("Signed in as {who}"))))?;
            }

            Action::LoginFailed(_) => self.forward_to(ScreenId::Login, action)?,

            Action::RequestPasswordReset(email) => self.reset_password(email.clone()),

            Action::Logout => {
                if self.active_screen != ScreenId::Login {
                    self.controller.logout();
                    self.products_request += 1;
                    self.products = ResourceState::default();
                    self.pending_confirm = None;
                    self.help_visible = false;
                    self.switch_to(ScreenId::Login);
                    self.previous_screen = None;
                    self.action_tx.send(Action::LoggedOut)?;
                }
            }

            Action::LoggedOut => self.broadcast(action)?,

            // ── Loads ────────────────────────────────────────────────
            Action::LoadProducts => self.fetch_products()?,
            Action::LoadCategory(slug) => self.load_category(*slug),
            Action::LoadVendors => self.load_vendors(),
            Action::LoadUsers => self.load_users(),

            // ── Data updates go to ALL screens so they stay in sync ──
            Action::ProductsUpdated(state) => {
                self.products = state.clone();
                self.broadcast(action)?;
            }

            Action::ProductsFetched { request, state } => {
                if *request == self.products_request {
                    self.products = state.clone();
                    self.broadcast(&Action::ProductsUpdated(state.clone()))?;
                } else {
                    debug!(request, latest = self.products_request, "dropping stale catalog");
                }
            }

            Action::CategoryProductsUpdated(_)
            | Action::VendorsUpdated(_)
            | Action::UsersUpdated(_) => self.broadcast(action)?,

            Action::Invalidated(stale) => {
                let reload = match stale {
                    Invalidation::Products => Action::LoadProducts,
                    Invalidation::Vendors => Action::LoadVendors,
                    Invalidation::Users => Action::LoadUsers,
                };
                self.action_tx.send(reload)?;
                self.broadcast(action)?;
            }

            // ── Confirmation dialog ──────────────────────────────────
            Action::ShowConfirm(confirm) => {
                self.pending_confirm = Some(confirm.clone());
            }

            Action::ConfirmYes => {
                if let Some(confirm) = self.pending_confirm.take() {
                    self.execute_confirm(confirm);
                }
            }

            Action::ConfirmNo => {
                self.pending_confirm = None;
            }

            Action::WriteExport {
                path,
                contents,
                rows,
            } => {
                let tx = self.action_tx.clone();
                let path = path.clone();
                let contents = contents.clone();
                let rows = *rows;
                tokio::spawn(async move {
                    let note = match tokio::fs::write(&path, contents).await {
                        Ok(()) => {
                            info!(path = %path.display(), rows, "exported CSV");
                            Notification::success(format!(
                                "Exported {rows} rows to {}",
                                path.display()
                            ))
                        }
                        Err(e) => {
                            warn!(error = %e, path = %path.display(), "export failed");
                            Notification::error(format!("Export failed: {e}"))
                        }
                    };
                    let _ = tx.send(Action::Notify(note));
                });
            }

            Action::Notify(n) => {
                self.notification = Some((n.clone(), Instant::now()));
            }

            // Everything else goes to the active screen only
            other => self.forward_to(self.active_screen, other)?,
        }

        Ok(())
    }

    // ── Background requests ─────────────────────────────────────────

    fn load_everything(&mut self) -> Result<()> {
        self.fetch_products()?;
        self.load_vendors();
        self.load_users();
        Ok(())
    }

    fn login(&self, email: &str, password: &SecretString) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        let email = email.to_owned();
        let password = password.clone();
        tokio::spawn(async move {
            match controller.login(&email, password.expose_secret()).await {
                Ok(session) => {
                    let _ = tx.send(Action::LoginSucceeded(session.user));
                }
                Err(e) => {
                    let _ = tx.send(Action::LoginFailed(e.to_string()));
                }
            }
        });
    }

    fn reset_password(&self, email: String) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let note = match controller.reset_password(&email).await {
                Ok(()) => Notification::success(format!("Password reset email sent to {email}")),
                Err(e) => {
                    warn!(error = %e, "password reset failed");
                    Notification::error(format!("Failed to send reset email: {e}"))
                }
            };
            let _ = tx.send(Action::Notify(note));
        });
    }

    /// Fetch the catalog in the background.
    ///
    /// The result comes back as `ProductsFetched` tagged with this
    /// request's number; the main loop ignores it if a newer request or a
    /// logout happened in the meantime.
    fn fetch_products(&mut self) -> Result<()> {
        self.products_request += 1;
        let request = self.products_request;

        let previous = Arc::clone(&self.products.data);
        self.action_tx.send(Action::ProductsUpdated(ResourceState {
            data: Arc::clone(&previous),
            loading: true,
            error: None,
        }))?;

        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let state = match controller.fetch_products().await {
                Ok(true) => ResourceState {
                    data: Arc::new(controller.products()),
                    loading: false,
                    error: None,
                },
                // A newer fetch owns the catalog now.
                Ok(false) => return,
                Err(e) => {
                    report_failure(&tx, "Failed to load products", &e);
                    ResourceState {
                        data: previous,
                        loading: false,
                        error: Some(e.to_string()),
                    }
                }
            };
            let _ = tx.send(Action::ProductsFetched { request, state });
        });
        Ok(())
    }

    fn load_category(&self, slug: &'static str) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.load_products_by_category(Some(slug)).await {
                report_failure(&tx, "Failed to load category", &e);
            }
        });
    }

    fn load_vendors(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.load_vendors().await {
                report_failure(&tx, "Failed to load vendors", &e);
            }
        });
    }

    fn load_users(&self) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = controller.load_users().await {
                report_failure(&tx, "Failed to load users", &e);
            }
        });
    }

    // ── Command execution ───────────────────────────────────────────

    /// Run commands one after another, stopping at the first failure.
    /// `summary` replaces the per-command success message for bulk runs.
    fn execute_commands(&self, cmds: Vec<Command>, summary: Option<String>) {
        let controller = self.controller.clone();
        let tx = self.action_tx.clone();
        tokio::spawn(async move {
            let total = cmds.len();
            let mut last_message = "Done";
            for (done, cmd) in cmds.into_iter().enumerate() {
                let prefix = cmd.failure_prefix();
                last_message = cmd.success_message();
                if let Err(e) = controller.execute(cmd).await {
                    let prefix = if total > 1 {
                        format!("{prefix} ({done} of {total} done)")
                    } else {
                        prefix.to_owned()
                    };
                    report_failure(&tx, &prefix, &e);
                    return;
                }
            }
            let message = summary.unwrap_or_else(|| last_message.to_owned());
            let _ = tx.send(Action::Notify(Notification::success(message)));
        });
    }

    /// Map a confirmed action to its commands and execute them.
    fn execute_confirm(&self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteProduct { id, hard, .. } => {
                self.execute_commands(vec![Command::DeleteProduct { id, hard }], None);
            }
            ConfirmAction::DeleteProducts { ids } => {
                let summary = format!("Deleted {} products", ids.len());
                let cmds = ids
                    .into_iter()
                    .map(|id| Command::DeleteProduct { id, hard: false })
                    .collect();
                self.execute_commands(cmds, Some(summary));
            }
            ConfirmAction::DeleteVendor { id, .. } => {
                self.execute_commands(vec![Command::DeleteVendor { id }], None);
            }
            ConfirmAction::DeleteVendors { ids } => {
                let summary = format!("Deleted {} vendors", ids.len());
                let cmds = ids
                    .into_iter()
                    .map(|id| Command::DeleteVendor { id })
                    .collect();
                self.execute_commands(cmds, Some(summary));
            }
            ConfirmAction::AssignRole { uid, role, .. } => {
                self.execute_commands(vec![Command::AssignRole { uid, role }], None);
            }
        }
    }

    // ── Rendering ───────────────────────────────────────────────────

    /// Render the full application frame.
    fn render(&self, frame: &mut Frame) {
        let area = frame.area();

        // The sign-in form gets the full frame, no tab bar or status bar
        if self.active_screen == ScreenId::Login {
            if let Some(screen) = self.screens.get(&ScreenId::Login) {
                screen.render(frame, area);
            }
            if let Some((ref notif, _)) = self.notification {
                Self::render_notification(frame, area, notif);
            }
            return;
        }

        let layout = Layout::vertical([
            Constraint::Min(1),    // Screen content
            Constraint::Length(1), // Tab bar
            Constraint::Length(1), // Status bar
        ])
        .split(area);

        if let Some(screen) = self.screens.get(&self.active_screen) {
            screen.render(frame, layout[0]);
        }

        self.render_tab_bar(frame, layout[1]);
        self.render_status_bar(frame, layout[2]);

        // Overlays, last = topmost
        if let Some((ref notif, _)) = self.notification {
            Self::render_notification(frame, area, notif);
        }
        if let Some(ref confirm) = self.pending_confirm {
            Self::render_confirm_dialog(frame, area, confirm);
        }
        if self.help_visible {
            Self::render_help_overlay(frame, area);
        }
    }

    fn render_tab_bar(&self, frame: &mut Frame, area: Rect) {
        let titles: Vec<Line> = ScreenId::ALL
            .iter()
            .map(|&id| {
                let style = if id == self.active_screen {
                    theme::tab_active()
                } else {
                    theme::tab_inactive()
                };
                Line::from(Span::styled(
                    format!(" {} {} ", id.number(), id.label()),
                    style,
                ))
            })
            .collect();

        let tabs = Tabs::new(titles)
            .divider(Span::styled(" ", theme::key_hint()))
            .select(
                ScreenId::ALL
                    .iter()
                    .position(|&s| s == self.active_screen)
                    .unwrap_or(0),
            );

        frame.render_widget(tabs, area);
    }

    /// Bottom status bar: the signed-in admin and global key hints, or the
    /// search prompt while searching.
    fn render_status_bar(&self, frame: &mut Frame, area: Rect) {
        if self.search_active {
            let line = Line::from(vec![
                Span::styled(" / ", Style::default().fg(theme::ELECTRIC_PURPLE)),
                Span::styled(&self.search_query, Style::default().fg(theme::NEON_CYAN)),
                Span::styled("█", Style::default().fg(theme::NEON_CYAN)),
                Span::styled("  Esc clear  Enter keep", theme::key_hint()),
            ]);
            frame.render_widget(Paragraph::new(line), area);
            return;
        }

        let who = match self.controller.session() {
            Some(session) => {
                let email = session
                    .user
                    .and_then(|u| u.email)
                    .unwrap_or_else(|| "admin".into());
                Span::styled(format!("● {email}"), Style::default().fg(theme::SUCCESS_GREEN))
            }
            None => Span::styled("○ session expired", Style::default().fg(theme::ERROR_RED)),
        };

        let hints = Span::styled(" │ ? help  / search  L sign out  q quit", theme::key_hint());
        let line = Line::from(vec![Span::raw(" "), who, hints]);
        frame.render_widget(Paragraph::new(line), area);
    }

    fn render_help_overlay(frame: &mut Frame, area: Rect) {
        let help_width = 64u16.min(area.width.saturating_sub(4));
        let help_height = 24u16.min(area.height.saturating_sub(4));

        let x = (area.width.saturating_sub(help_width)) / 2;
        let y = (area.height.saturating_sub(help_height)) / 2;
        let help_area = Rect::new(area.x + x, area.y + y, help_width, help_height);

        frame.render_widget(Clear, help_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            help_area,
        );

        let block = Block::default()
            .title(" Keyboard Shortcuts ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(theme::border_focused());

        let inner = block.inner(help_area);
        frame.render_widget(block, help_area);

        let row = |key: &'static str, what: &'static str| {
            Line::from(vec![
                Span::styled(format!("  {key:<10}"), theme::key_hint_key()),
                Span::styled(what, theme::key_hint()),
            ])
        };
        let heading = |title: &'static str| {
            Line::from(Span::styled(
                format!("  {title}"),
                Style::default().fg(theme::NEON_CYAN),
            ))
        };

        let help_text = vec![
            Line::from(""),
            heading("Navigation"),
            row("1-4", "Jump to screen"),
            row("Tab", "Next screen"),
            row("j/k ↑/↓", "Move up/down"),
            row("←/→ [ ]", "Previous / next page"),
            row("g/G", "Top / bottom of page"),
            row("Esc", "Back"),
            Line::from(""),
            heading("Lists"),
            row("/", "Search"),
            row("s / S", "Sort column / flip direction"),
            row("f c v p l", "Cycle filters"),
            row("C", "Clear filters and sort"),
            row("Space / a", "Select row / page"),
            row("d D x", "Delete / hard delete / delete selected"),
            row("e", "Export filtered rows to CSV"),
            row("r", "Refresh"),
            Line::from(""),
            heading("Global"),
            row("L", "Sign out"),
            row("q", "Quit"),
            Line::from(""),
            Line::from(Span::styled(
                "                         Esc or ? to close",
                theme::key_hint(),
            )),
        ];

        frame.render_widget(Paragraph::new(help_text), inner);
    }

    /// Render a centered confirmation dialog.
    fn render_confirm_dialog(frame: &mut Frame, area: Rect, confirm: &ConfirmAction) {
        let width = 60u16.min(area.width.saturating_sub(4));
        let height = 5u16;

        let x = (area.width.saturating_sub(width)) / 2;
        let y = (area.height.saturating_sub(height)) / 2;
        let dialog_area = Rect::new(area.x + x, area.y + y, width, height);

        frame.render_widget(Clear, dialog_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            dialog_area,
        );

        let block = Block::default()
            .title(" Confirm ")
            .title_style(theme::title_style())
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(theme::ELECTRIC_YELLOW));

        let inner = block.inner(dialog_area);
        frame.render_widget(block, dialog_area);

        let text = vec![
            Line::from(Span::styled(
                format!("  {confirm}"),
                Style::default().fg(theme::DIM_WHITE),
            )),
            Line::from(""),
            Line::from(vec![
                Span::styled("  y ", theme::key_hint_key()),
                Span::styled("confirm    ", theme::key_hint()),
                Span::styled("n ", theme::key_hint_key()),
                Span::styled("cancel", theme::key_hint()),
            ]),
        ];
        frame.render_widget(Paragraph::new(text), inner);
    }

    /// Render a notification toast in the bottom-right corner.
    fn render_notification(frame: &mut Frame, area: Rect, notif: &Notification) {
        let msg_len = u16::try_from(notif.message.chars().count()).unwrap_or(u16::MAX);
        let width = msg_len
            .saturating_add(6)
            .clamp(20, 72)
            .min(area.width);
        let height = 3u16;

        let x = area.width.saturating_sub(width + 1);
        let y = area.height.saturating_sub(height + 2); // above status bar
        let toast_area = Rect::new(area.x + x, area.y + y, width, height.min(area.height));

        let (border_color, icon) = match notif.level {
            NotificationLevel::Success => (theme::SUCCESS_GREEN, "✓"),
            NotificationLevel::Error => (theme::ERROR_RED, "✗"),
            NotificationLevel::Info => (theme::NEON_CYAN, "·"),
        };

        frame.render_widget(Clear, toast_area);
        frame.render_widget(
            Block::default().style(Style::default().bg(theme::BG_DARK)),
            toast_area,
        );

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border_color));

        let inner = block.inner(toast_area);
        frame.render_widget(block, toast_area);

        let line = Line::from(vec![
            Span::styled(format!(" {icon} "), Style::default().fg(border_color)),
            Span::styled(&notif.message, Style::default().fg(theme::DIM_WHITE)),
        ]);
        frame.render_widget(Paragraph::new(line), inner);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use xpress_core::{AuthMode, ControllerConfig, DisplayFlags, MemorySessionStore};

    use super::*;

    fn app() -> App {
        let config = ControllerConfig::new(
            "http://localhost:3001".parse().unwrap(),
            AuthMode::Backend,
        );
        let controller = Controller::new(config, Arc::new(MemorySessionStore::new())).unwrap();
        let login = LoginDefaults {
            email: String::new(),
            password: None,
        };
        App::new(controller, login, 10)
    }

    fn catalog(name: &str) -> ResourceState<Product> {
        ResourceState {
            data: Arc::new(vec![Product {
                id: "001".into(),
                name: name.into(),
                price: 10.0,
                stock: 5,
                vendor_id: None,
                vendor_name: None,
                category_id: None,
                brand: None,
                part_number: None,
                description: String::new(),
                condition: "new".into(),
                specifications: Vec::new(),
                compatibility: Vec::new(),
                flags: DisplayFlags::default(),
                priority: 0,
                main_image: None,
                additional_images: Vec::new(),
                date_posted: None,
                explicit_status: None,
            }]),
            loading: false,
            error: None,
        }
    }

    fn shown(app: &App) -> Vec<String> {
        app.products.data.iter().map(|p| p.name.clone()).collect()
    }

    #[test]
    fn paste_feeds_the_open_search_bar_only() {
        let mut app = app();
        app.active_screen = ScreenId::Products;
        assert!(app.handle_paste("brake").unwrap().is_none());

        app.search_active = true;
        let action = app.handle_paste("brake pads\nextra").unwrap();
        assert!(matches!(action, Some(Action::SearchInput(q)) if q == "brake pads"));
    }

    #[test]
    fn catalog_from_an_older_request_is_ignored() {
        let mut app = app();
        app.products_request = 2;
        app.products = ResourceState {
            loading: true,
            ..ResourceState::default()
        };

        app.process_action(&Action::ProductsFetched {
            request: 1,
            state: catalog("Old Pads"),
        })
        .unwrap();
        assert!(app.products.loading);
        assert!(app.products.data.is_empty());

        app.process_action(&Action::ProductsFetched {
            request: 2,
            state: catalog("New Pads"),
        })
        .unwrap();
        assert!(!app.products.loading);
        assert_eq!(shown(&app), vec!["New Pads".to_owned()]);
    }

    #[test]
    fn logout_outdates_a_catalog_in_flight() {
        let mut app = app();
        app.products_request = 1;
        app.active_screen = ScreenId::Products;

        app.process_action(&Action::Logout).unwrap();
        app.process_action(&Action::ProductsFetched {
            request: 1,
            state: catalog("Brake Pads"),
        })
        .unwrap();

        assert!(app.products.data.is_empty());
        assert_eq!(app.active_screen, ScreenId::Login);
    }

    #[test]
    fn only_session_errors_force_a_new_sign_in() {
        assert!(needs_sign_in(&CoreError::SessionExpired));
        assert!(needs_sign_in(&CoreError::Forbidden {
            role: "vendor".into()
        }));
        assert!(!needs_sign_in(&CoreError::Timeout { timeout_secs: 30 }));
        assert!(!needs_sign_in(&CoreError::Api {
            message: "Product not found".into(),
            status: Some(404),
        }));
    }

    #[test]
    fn session_failures_queue_a_logout() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        report_failure(&tx, "Failed to load vendors", &CoreError::NotAuthenticated);

        let Ok(Action::Notify(note)) = rx.try_recv() else {
            panic!("expected a notification");
        };
        assert_eq!(note.message, "Failed to load vendors: Not signed in");
        assert!(matches!(rx.try_recv(), Ok(Action::Logout)));

        report_failure(&tx, "Failed to load users", &CoreError::Timeout { timeout_secs: 5 });
        assert!(matches!(rx.try_recv(), Ok(Action::Notify(_))));
        assert!(rx.try_recv().is_err());
    }
}
