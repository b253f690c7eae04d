//! The screen contract. The app owns the loop; each tab (and the sign-in
//! form) is a `Component` that turns input into [`Action`]s and redraws
//! from its own state.

use color_eyre::eyre::Result;
use crossterm::event::KeyEvent;
use ratatui::{Frame, layout::Rect};
use tokio::sync::mpsc::UnboundedSender;

use crate::action::Action;

pub trait Component: Send {
    /// Called once before the first event, with the app's action sender.
    fn init(&mut self, _action_tx: UnboundedSender<Action>) -> Result<()> {
        Ok(())
    }

    /// Keys the app did not consume itself.
    fn handle_key_event(&mut self, _key: KeyEvent) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Pasted text, offered only while [`captures_input`](Self::captures_input)
    /// holds. Screens without a text field ignore it.
    fn handle_paste(&mut self, _text: &str) -> Result<Option<Action>> {
        Ok(None)
    }

    /// Every dispatched action the app forwards here; may answer with one
    /// follow-up.
    fn update(&mut self, _action: &Action) -> Result<Option<Action>> {
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect);

    /// True while the screen owns the keyboard (a text field or picker is
    /// open). Global keys other than Ctrl+C are not applied.
    fn captures_input(&self) -> bool {
        false
    }

    fn set_focused(&mut self, _focused: bool) {}

    /// Screen name for logs.
    fn id(&self) -> &str;
}
