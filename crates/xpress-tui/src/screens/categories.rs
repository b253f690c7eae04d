//! Categories screen: the fixed category registry with live product counts.
//! Enter opens the products screen scoped to the highlighted category.

use std::collections::HashMap;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table};

use xpress_core::{Category, StockStatus};

use crate::action::Action;
use crate::component::Component;
use crate::theme;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Tally {
    products: usize,
    out_of_stock: usize,
}

#[derive(Default)]
pub struct CategoriesScreen {
    focused: bool,
    cursor: usize,
    tallies: HashMap<&'static str, Tally>,
}

impl CategoriesScreen {
    pub fn new() -> Self {
        Self::default()
    }

    fn selected(&self) -> Option<&'static Category> {
        Category::all().get(self.cursor)
    }
}

impl Component for CategoriesScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let last = Category::all().len().saturating_sub(1);
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => self.cursor = (self.cursor + 1).min(last),
            KeyCode::Char('k') | KeyCode::Up => self.cursor = self.cursor.saturating_sub(1),
            KeyCode::Char('g') => self.cursor = 0,
            KeyCode::Char('G') => self.cursor = last,
            KeyCode::Enter => {
                return Ok(self.selected().map(|c| Action::BrowseCategory(Some(c.slug))));
            }
            KeyCode::Char('r') => return Ok(Some(Action::LoadProducts)),
            _ => {}
        }
        Ok(None)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsUpdated(state) => {
                self.tallies.clear();
                for product in state.data.iter() {
                    let Some(category) = product.category() else {
                        continue;
                    };
                    let tally = self.tallies.entry(category.slug).or_default();
                    tally.products += 1;
                    if product.status() == StockStatus::OutOfStock {
                        tally.out_of_stock += 1;
                    }
                }
            }
            Action::LoggedOut => self.tallies.clear(),
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(format!(" Categories ({}) ", Category::all().len()))
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

        let layout = Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).split(inner);

        let header = Row::new(["Category", "Slug", "Products", "Out of Stock"].map(|h| {
            Cell::from(h).style(theme::table_header())
        }));

        let rows: Vec<Row> = Category::all()
            .iter()
            .enumerate()
            .map(|(i, cat)| {
                let tally = self.tallies.get(cat.slug).copied().unwrap_or_default();
                let out = if tally.out_of_stock > 0 {
                    Cell::from(tally.out_of_stock.to_string())
                        .style(Style::default().fg(theme::stock_color(StockStatus::OutOfStock)))
                } else {
                    Cell::from("\u{2500}")
                };
                let style = if i == self.cursor {
                    theme::table_cursor()
                } else {
                    theme::table_row()
                };
                Row::new(vec![
                    Cell::from(cat.label).style(Style::default().fg(theme::NEON_CYAN)),
                    Cell::from(cat.slug),
                    Cell::from(tally.products.to_string()),
                    out,
                ])
                .style(style)
            })
            .collect();

        let table = Table::new(
            rows,
            [
                Constraint::Fill(2),
                Constraint::Fill(2),
                Constraint::Length(10),
                Constraint::Length(14),
            ],
        )
        .header(header);
        frame.render_widget(table, layout[0]);

        let hints = Line::from(vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("Enter ", theme::key_hint_key()),
            Span::styled("browse products  ", theme::key_hint()),
            Span::styled("r ", theme::key_hint_key()),
            Span::styled("refresh counts", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(hints), layout[1]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Categories"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyModifiers;
    use pretty_assertions::assert_eq;

    use xpress_core::{DisplayFlags, Product, ResourceState};

    use super::*;

    fn product(category: Option<&str>, stock: u32) -> Product {
        Product {
            id: "p".into(),
            name: "Part".into(),
            price: 1.0,
            stock,
            vendor_id: None,
            vendor_name: None,
            category_id: category.map(Into::into),
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
        }
    }

    fn press(screen: &mut CategoriesScreen, code: KeyCode) -> Option<Action> {
        screen
            .handle_key_event(KeyEvent::new(code, KeyModifiers::NONE))
            .unwrap()
    }

    #[test]
    fn counts_products_per_category() {
        let mut screen = CategoriesScreen::new();
        screen
            .update(&Action::ProductsUpdated(ResourceState {
                data: Arc::new(vec![
                    product(Some("wheels-tires"), 4),
                    product(Some("wheels-tires"), 0),
                    product(Some("cooling-ac"), 9),
                    product(Some("not-a-category"), 1),
                    product(None, 1),
                ]),
                loading: false,
                error: None,
            }))
            .unwrap();

        assert_eq!(
            screen.tallies.get("wheels-tires"),
            Some(&Tally {
                products: 2,
                out_of_stock: 1
            })
        );
        assert_eq!(screen.tallies.get("cooling-ac").map(|t| t.products), Some(1));
        assert_eq!(screen.tallies.len(), 2);
    }

    #[test]
    fn enter_browses_the_highlighted_category() {
        let mut screen = CategoriesScreen::new();
        press(&mut screen, KeyCode::Char('j'));
        let action = press(&mut screen, KeyCode::Enter);
        assert!(matches!(
            action,
            Some(Action::BrowseCategory(Some("engine-performance")))
        ));

        press(&mut screen, KeyCode::Char('G'));
        press(&mut screen, KeyCode::Char('j'));
        assert_eq!(screen.selected().map(|c| c.slug), Some("cooling-ac"));
    }
}
