//! SilkCircuit Neon palette and semantic styling for the TUI.

use ratatui::style::{Color, Modifier, Style};

use xpress_core::{Priority, StockStatus, VendorStatus};

// ── Core Palette ──────────────────────────────────────────────────────

pub const ELECTRIC_PURPLE: Color = Color::Rgb(225, 53, 255); // #e135ff
pub const NEON_CYAN: Color = Color::Rgb(128, 255, 234); // #80ffea
pub const CORAL: Color = Color::Rgb(255, 106, 193); // #ff6ac1
pub const ELECTRIC_YELLOW: Color = Color::Rgb(241, 250, 140); // #f1fa8c
pub const SUCCESS_GREEN: Color = Color::Rgb(80, 250, 123); // #50fa7b
pub const ERROR_RED: Color = Color::Rgb(255, 99, 99); // #ff6363

// ── Extended Palette ──────────────────────────────────────────────────

pub const DIM_WHITE: Color = Color::Rgb(189, 193, 207); // #bdc1cf
pub const BORDER_GRAY: Color = Color::Rgb(98, 114, 164); // #6272a4
pub const BG_HIGHLIGHT: Color = Color::Rgb(40, 42, 54); // #282a36
pub const BG_DARK: Color = Color::Rgb(30, 31, 41); // #1e1f29
pub const BG_CURSOR: Color = Color::Rgb(50, 52, 68); // #323444

// ── Semantic Styles ───────────────────────────────────────────────────

/// Title text for blocks/panels.
pub fn title_style() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

pub fn border_focused() -> Style {
    Style::default().fg(ELECTRIC_PURPLE)
}

pub fn border_default() -> Style {
    Style::default().fg(BORDER_GRAY)
}

pub fn table_header() -> Style {
    Style::default()
        .fg(NEON_CYAN)
        .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
}

/// Header cell for the active sort column.
pub fn table_header_sorted() -> Style {
    table_header().bg(BG_CURSOR)
}

pub fn table_row() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Row under the cursor.
pub fn table_cursor() -> Style {
    Style::default().bg(BG_CURSOR).add_modifier(Modifier::BOLD)
}

/// Row ticked for a bulk action.
pub fn table_selected() -> Style {
    Style::default().fg(ELECTRIC_PURPLE).bg(BG_HIGHLIGHT)
}

pub fn tab_active() -> Style {
    Style::default()
        .fg(ELECTRIC_PURPLE)
        .add_modifier(Modifier::BOLD)
}

pub fn tab_inactive() -> Style {
    Style::default().fg(DIM_WHITE)
}

/// Key hint text (e.g., "q quit  ? help").
pub fn key_hint() -> Style {
    Style::default().fg(BORDER_GRAY)
}

/// Key hint key character.
pub fn key_hint_key() -> Style {
    Style::default().fg(NEON_CYAN).add_modifier(Modifier::BOLD)
}

// ── Domain colors ─────────────────────────────────────────────────────

pub fn stock_color(status: StockStatus) -> Color {
    match status {
        StockStatus::InStock => SUCCESS_GREEN,
        StockStatus::LowStock => ELECTRIC_YELLOW,
        StockStatus::OutOfStock => ERROR_RED,
    }
}

pub fn vendor_status_color(status: VendorStatus) -> Color {
    match status {
        VendorStatus::Active => SUCCESS_GREEN,
        VendorStatus::Inactive => BORDER_GRAY,
    }
}

pub fn priority_color(priority: Priority) -> Color {
    match priority {
        Priority::Low => DIM_WHITE,
        Priority::Medium => NEON_CYAN,
        Priority::High => CORAL,
        Priority::Critical => ERROR_RED,
    }
}

pub fn role_color(role: &str) -> Color {
    match role {
        "admin" => ELECTRIC_PURPLE,
        "moderator" => CORAL,
        "vendor" => NEON_CYAN,
        _ => DIM_WHITE,
    }
}
