//! Reusable widgets shared across screens.

pub mod list_pane;
pub mod sub_tabs;
