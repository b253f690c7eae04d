//! Products screen: the whole catalog, or one category's products when
//! opened from the categories screen.

use std::path::PathBuf;

use color_eyre::eyre::Result;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Cell, Paragraph};
use strum::IntoEnumIterator;

use xpress_core::{
    Category, Invalidation, Product, ProductCounts, ProductSortKey, ResourceState, StockStatus,
    export,
};

use crate::action::{Action, ConfirmAction, Notification};
use crate::component::Component;
use crate::theme;
use crate::widgets::list_pane::{Column, ListPane, cycle_choice};
use crate::widgets::sub_tabs;

const COLUMNS: [Column<ProductSortKey>; 7] = [
    Column { title: "Item Name", sort: Some(ProductSortKey::Name), width: Constraint::Fill(3) },
    Column { title: "Price", sort: Some(ProductSortKey::Price), width: Constraint::Length(11) },
    Column { title: "Qty", sort: Some(ProductSortKey::Quantity), width: Constraint::Length(6) },
    Column { title: "Vendor Name", sort: Some(ProductSortKey::Vendor), width: Constraint::Fill(2) },
    Column { title: "Category", sort: Some(ProductSortKey::Category), width: Constraint::Fill(2) },
    Column { title: "Posted", sort: Some(ProductSortKey::DatePosted), width: Constraint::Length(11) },
    Column { title: "Status", sort: Some(ProductSortKey::Status), width: Constraint::Length(13) },
];

pub struct ProductsScreen {
    focused: bool,
    pane: ListPane<Product>,
    /// The whole catalog.
    catalog: ResourceState<Product>,
    /// Products of the category being browsed.
    category_items: ResourceState<Product>,
    category: Option<&'static Category>,
}

impl ProductsScreen {
    pub fn new(page_size: usize) -> Self {
        Self {
            focused: false,
            pane: ListPane::new(page_size),
            catalog: ResourceState::default(),
            category_items: ResourceState::default(),
            category: None,
        }
    }

    fn show_current(&mut self) {
        let current = if self.category.is_some() {
            &self.category_items
        } else {
            &self.catalog
        };
        self.pane.apply_resource(current);
    }

    fn browse(&mut self, slug: Option<&'static str>) -> Option<Action> {
        self.category = slug.and_then(Category::by_slug);
        self.pane.state.clear_filters();
        self.pane.state.clear_selection();
        self.show_current();
        self.category.map(|c| Action::LoadCategory(c.slug))
    }

    fn reload(&self) -> Action {
        match self.category {
            Some(c) => Action::LoadCategory(c.slug),
            None => Action::LoadProducts,
        }
    }

    fn cycle_status(&mut self) {
        let choices: Vec<StockStatus> = StockStatus::iter().collect();
        self.pane
            .update_filter(|f| f.status = cycle_choice(f.status.as_ref(), &choices));
    }

    fn cycle_category(&mut self) {
        let choices: Vec<String> = Category::all().iter().map(|c| c.id.to_owned()).collect();
        self.pane
            .update_filter(|f| f.category = cycle_choice(f.category.as_ref(), &choices));
    }

    fn cycle_vendor(&mut self) {
        let mut choices: Vec<String> = self
            .pane
            .items()
            .iter()
            .map(|p| p.vendor_display().to_owned())
            .collect();
        choices.sort();
        choices.dedup();
        self.pane
            .update_filter(|f| f.vendor = cycle_choice(f.vendor.as_ref(), &choices));
    }

    fn export(&self) -> Action {
        let view = self.pane.view();
        let path = match self.category {
            Some(c) => PathBuf::from(format!("products-{}.csv", c.slug)),
            None => PathBuf::from(export::PRODUCTS_CSV_FILE),
        };
        match export::products_csv(view.filtered.iter().copied()) {
            Ok(contents) => Action::WriteExport {
                path,
                contents,
                rows: view.filtered.len(),
            },
            Err(e) => Action::Notify(Notification::error(format!("Export failed: {e}"))),
        }
    }

    fn delete_cursor(&self, hard: bool) -> Option<Action> {
        self.pane.cursor_item().map(|p| {
            Action::ShowConfirm(ConfirmAction::DeleteProduct {
                id: p.id.clone(),
                name: p.name.clone(),
                hard,
            })
        })
    }

    fn delete_selected(&self) -> Option<Action> {
        let ids = self.pane.selected_ids();
        if ids.is_empty() {
            return Some(Action::Notify(Notification::info(
                "Select products with Space first",
            )));
        }
        Some(Action::ShowConfirm(ConfirmAction::DeleteProducts { ids }))
    }

    fn title(&self) -> String {
        let label = self.category.map_or("Products", |c| c.label);
        let total = self.pane.items().len();
        let search = self.pane.state.search();
        if search.is_empty() {
            format!(" {label} ({total}) ")
        } else {
            format!(" {label} ({total}) [\"{search}\"] ")
        }
    }

    fn filter_line(&self) -> Line<'static> {
        let filter = self.pane.state.filter();
        let active = filter
            .status
            .and_then(|s| StockStatus::iter().position(|x| x == s))
            .map_or(0, |i| i + 1);
        let mut line = sub_tabs::render_sub_tabs(
            " Stock: ",
            &["All", "In Stock", "Low Stock", "Out of Stock"],
            active,
        );
        if let Some(ref cat) = filter.category {
            line.spans.push(Span::styled("   Category: ", theme::key_hint()));
            line.spans.push(Span::styled(
                Category::label_for(cat).to_owned(),
                Style::default().fg(theme::NEON_CYAN),
            ));
        }
        if let Some(ref vendor) = filter.vendor {
            line.spans.push(Span::styled("   Vendor: ", theme::key_hint()));
            line.spans.push(Span::styled(
                vendor.clone(),
                Style::default().fg(theme::CORAL),
            ));
        }
        line
    }
}

fn counts_line(counts: &ProductCounts) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!(" {} total", counts.total), theme::tab_inactive()),
        Span::styled("  \u{00B7}  ", theme::key_hint()),
        Span::styled(
            format!("{} in stock", counts.in_stock),
            Style::default().fg(theme::stock_color(StockStatus::InStock)),
        ),
        Span::styled("  \u{00B7}  ", theme::key_hint()),
        Span::styled(
            format!("{} low", counts.low_stock),
            Style::default().fg(theme::stock_color(StockStatus::LowStock)),
        ),
        Span::styled("  \u{00B7}  ", theme::key_hint()),
        Span::styled(
            format!("{} out", counts.out_of_stock),
            Style::default().fg(theme::stock_color(StockStatus::OutOfStock)),
        ),
    ])
}

fn product_cells(p: &Product) -> Vec<Cell<'static>> {
    let status = p.status();
    vec![
        Cell::from(p.name.clone()).style(Style::default().fg(theme::NEON_CYAN)),
        Cell::from(format!("{:.2}", p.price)),
        Cell::from(p.stock.to_string()),
        Cell::from(p.vendor_display().to_owned()).style(Style::default().fg(theme::CORAL)),
        Cell::from(p.category_label().to_owned()),
        Cell::from(
            p.date_posted
                .map_or_else(|| "\u{2500}".to_owned(), |d| d.to_string()),
        ),
        Cell::from(status.to_string()).style(Style::default().fg(theme::stock_color(status))),
    ]
}

impl Component for ProductsScreen {
    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Char('f') => {
                self.cycle_status();
                None
            }
            KeyCode::Char('c') if self.category.is_none() => {
                self.cycle_category();
                None
            }
            KeyCode::Char('v') => {
                self.cycle_vendor();
                None
            }
            KeyCode::Char('e') => Some(self.export()),
            KeyCode::Char('d') => self.delete_cursor(false),
            KeyCode::Char('D') => self.delete_cursor(true),
            KeyCode::Char('x') => self.delete_selected(),
            KeyCode::Char('r') => Some(self.reload()),
            KeyCode::Char('b') if self.category.is_some() => Some(Action::BrowseCategory(None)),
            _ => {
                self.pane.handle_key(key, &COLUMNS);
                None
            }
        };
        Ok(action)
    }

    fn update(&mut self, action: &Action) -> Result<Option<Action>> {
        match action {
            Action::ProductsUpdated(state) => {
                self.catalog = state.clone();
                if self.category.is_none() {
                    self.show_current();
                }
            }
            Action::CategoryProductsUpdated(state) => {
                self.category_items = state.clone();
                if self.category.is_some() {
                    self.show_current();
                }
            }
            Action::BrowseCategory(slug) => return Ok(self.browse(*slug)),
            Action::Invalidated(Invalidation::Products) => {
                self.pane.state.clear_selection();
                // The app reloads the catalog; a browsed category is ours.
                return Ok(self.category.map(|c| Action::LoadCategory(c.slug)));
            }
            Action::SearchInput(query) => self.pane.set_search(query),
            Action::CloseSearch => self.pane.set_search(""),
            Action::LoggedOut => {
                self.catalog = ResourceState::default();
                self.category_items = ResourceState::default();
                self.category = None;
                self.pane.state.clear_filters();
                self.pane.clear();
            }
            _ => {}
        }
        Ok(None)
    }

    fn render(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .title(self.title())
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
            Constraint::Length(1), // filters
            Constraint::Length(1), // counts
            Constraint::Min(1),    // table
            Constraint::Length(1), // footer
            Constraint::Length(1), // hints
        ])
        .split(inner);

        let view = self.pane.view();
        let counts: ProductCounts = view.filtered.iter().copied().collect();

        frame.render_widget(Paragraph::new(self.filter_line()), layout[0]);
        frame.render_widget(Paragraph::new(counts_line(&counts)), layout[1]);
        self.pane
            .render_table(frame, layout[2], &COLUMNS, &view, product_cells);
        frame.render_widget(Paragraph::new(self.pane.footer(&view)), layout[3]);

        let mut hints = vec![
            Span::styled("  j/k ", theme::key_hint_key()),
            Span::styled("move  ", theme::key_hint()),
            Span::styled("\u{2190}/\u{2192} ", theme::key_hint_key()),
            Span::styled("page  ", theme::key_hint()),
            Span::styled("s/S ", theme::key_hint_key()),
            Span::styled("sort  ", theme::key_hint()),
            Span::styled("f ", theme::key_hint_key()),
            Span::styled("stock  ", theme::key_hint()),
        ];
        if self.category.is_none() {
            hints.push(Span::styled("c ", theme::key_hint_key()));
            hints.push(Span::styled("category  ", theme::key_hint()));
        } else {
            hints.push(Span::styled("b ", theme::key_hint_key()));
            hints.push(Span::styled("all products  ", theme::key_hint()));
        }
        hints.extend([
            Span::styled("v ", theme::key_hint_key()),
            Span::styled("vendor  ", theme::key_hint()),
            Span::styled("Space/a ", theme::key_hint_key()),
            Span::styled("select  ", theme::key_hint()),
            Span::styled("d/D/x ", theme::key_hint_key()),
            Span::styled("delete  ", theme::key_hint()),
            Span::styled("e ", theme::key_hint_key()),
            Span::styled("export", theme::key_hint()),
        ]);
        frame.render_widget(Paragraph::new(Line::from(hints)), layout[4]);
    }

    fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn id(&self) -> &str {
        "Products"
    }
}
