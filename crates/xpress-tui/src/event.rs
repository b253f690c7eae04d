//! Terminal input for the admin console.
//!
//! A background task turns crossterm's stream into [`Event`]s: key
//! presses, pasted text, resizes, and the two clocks that drive toast
//! expiry and redraws.

use std::time::Duration;

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

#[derive(Debug, PartialEq, Eq)]
pub enum Event {
    Key(KeyEvent),
    /// Bracketed paste, delivered whole so a pasted password never runs
    /// through the global key bindings one character at a time.
    Paste(String),
    Resize(u16, u16),
    /// Toast expiry and sign-in spinner.
    Tick,
    Render,
}

/// How often the two clocks fire.
#[derive(Debug, Clone, Copy)]
pub struct EventRates {
    pub tick: Duration,
    pub render: Duration,
}

impl Default for EventRates {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(250),
            render: Duration::from_millis(33),
        }
    }
}

/// Keep presses, pastes and resizes; drop releases, repeats, mouse and
/// focus changes.
fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Paste(text) if !text.is_empty() => Some(Event::Paste(text)),
        CrosstermEvent::Resize(w, h) => Some(Event::Resize(w, h)),
        _ => None,
    }
}

pub struct EventReader {
    rx: mpsc::UnboundedReceiver<Event>,
    cancel: CancellationToken,
}

impl EventReader {
    pub fn new(rates: EventRates) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        tokio::spawn(read_loop(tx, cancel.clone(), rates));
        Self { rx, cancel }
    }

    /// `None` once the reader task has stopped.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    pub fn stop(&self) {
        self.cancel.cancel();
    }
}

impl Drop for EventReader {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn read_loop(tx: mpsc::UnboundedSender<Event>, cancel: CancellationToken, rates: EventRates) {
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(rates.tick);
    let mut render = tokio::time::interval(rates.render);
    tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    render.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let event = tokio::select! {
            () = cancel.cancelled() => break,
            _ = tick.tick() => Event::Tick,
            _ = render.tick() => Event::Render,
            next = input.next() => match next {
                Some(Ok(raw)) => match translate(raw) {
                    Some(event) => event,
                    None => continue,
                },
                Some(Err(e)) => {
                    debug!(error = %e, "terminal read failed");
                    continue;
                }
                None => break,
            },
        };

        if tx.send(event).is_err() {
            break;
        }
    }
    debug!("event reader stopped");
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEventState, KeyModifiers, MouseEvent, MouseEventKind};
    use pretty_assertions::assert_eq;

    use super::*;

    fn key(kind: KeyEventKind) -> CrosstermEvent {
        CrosstermEvent::Key(KeyEvent {
            code: KeyCode::Char('q'),
            modifiers: KeyModifiers::NONE,
            kind,
            state: KeyEventState::NONE,
        })
    }

    #[test]
    fn only_key_presses_pass() {
        assert!(matches!(translate(key(KeyEventKind::Press)), Some(Event::Key(_))));
        assert_eq!(translate(key(KeyEventKind::Release)), None);
        assert_eq!(translate(key(KeyEventKind::Repeat)), None);
    }

    #[test]
    fn pastes_arrive_whole() {
        assert_eq!(
            translate(CrosstermEvent::Paste("admin@xpress.io".into())),
            Some(Event::Paste("admin@xpress.io".into()))
        );
        assert_eq!(translate(CrosstermEvent::Paste(String::new())), None);
    }

    #[test]
    fn mouse_and_focus_are_ignored() {
        let click = CrosstermEvent::Mouse(MouseEvent {
            kind: MouseEventKind::Moved,
            column: 1,
            row: 1,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(translate(click), None);
        assert_eq!(translate(CrosstermEvent::FocusLost), None);
        assert_eq!(translate(CrosstermEvent::Resize(120, 40)), Some(Event::Resize(120, 40)));
    }
}
