// ── Product domain types ──

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

use super::category::Category;
pub use xpress_api::models::ImageRef;

/// Stock above this count is "In Stock"; at or below it (but above zero)
/// is "Low Stock".
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Vendor label shown when neither the vendor directory nor the product
/// itself names one.
pub const UNKNOWN_VENDOR: &str = "Unknown Vendor";

/// Stock level label.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Display,
    EnumString, EnumIter,
)]
#[strum(ascii_case_insensitive)]
pub enum StockStatus {
    #[strum(to_string = "In Stock", serialize = "in-stock", serialize = "instock")]
    #[serde(rename = "In Stock")]
    InStock,
    #[strum(to_string = "Low Stock", serialize = "low-stock", serialize = "lowstock")]
    #[serde(rename = "Low Stock")]
    LowStock,
    #[strum(to_string = "Out of Stock", serialize = "out-of-stock", serialize = "outofstock")]
    #[serde(rename = "Out of Stock")]
    OutOfStock,
}

/// Status derived purely from a stock count.
pub fn stock_status(stock: u32) -> StockStatus {
    match stock {
        0 => StockStatus::OutOfStock,
        n if n <= LOW_STOCK_THRESHOLD => StockStatus::LowStock,
        _ => StockStatus::InStock,
    }
}

/// A labelled specification row (e.g. `Material: Ceramic`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub label: String,
    pub value: String,
}

/// Storefront placement flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisplayFlags {
    pub featured: bool,
    pub new_product: bool,
    pub hot_product: bool,
    pub show_on_home: bool,
    pub display_on_page: bool,
}

impl Default for DisplayFlags {
    fn default() -> Self {
        Self {
            featured: false,
            new_product: false,
            hot_product: false,
            show_on_home: true,
            display_on_page: false,
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub stock: u32,
    pub vendor_id: Option<String>,
    /// Resolved vendor display name (see `convert::enrich_vendor_names`).
    pub vendor_name: Option<String>,
    pub category_id: Option<String>,
    pub brand: Option<String>,
    pub part_number: Option<String>,
    pub description: String,
    pub condition: String,
    pub specifications: Vec<Specification>,
    pub compatibility: Vec<String>,
    pub flags: DisplayFlags,
    pub priority: u32,
    pub main_image: Option<ImageRef>,
    pub additional_images: Vec<ImageRef>,
    pub date_posted: Option<NaiveDate>,
    /// Status stored on the record, if any. Overrides the derived status.
    pub explicit_status: Option<StockStatus>,
}

impl Product {
    /// The explicit status when set, else the stock-derived one.
    pub fn status(&self) -> StockStatus {
        self.explicit_status
            .unwrap_or_else(|| stock_status(self.stock))
    }

    pub fn vendor_display(&self) -> &str {
        self.vendor_name.as_deref().unwrap_or(UNKNOWN_VENDOR)
    }

    pub fn category(&self) -> Option<&'static Category> {
        self.category_id.as_deref().and_then(Category::by_id)
    }

    pub fn category_label(&self) -> &str {
        self.category_id.as_deref().map_or("", Category::label_for)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_status_thresholds() {
        assert_eq!(stock_status(0), StockStatus::OutOfStock);
        assert_eq!(stock_status(1), StockStatus::LowStock);
        assert_eq!(stock_status(5), StockStatus::LowStock);
        assert_eq!(stock_status(10), StockStatus::LowStock);
        assert_eq!(stock_status(11), StockStatus::InStock);
    }

    #[test]
    fn status_labels_round_trip_through_strum() {
        assert_eq!(StockStatus::OutOfStock.to_string(), "Out of Stock");
        assert_eq!("low stock".parse::<StockStatus>().ok(), Some(StockStatus::LowStock));
        assert_eq!("in-stock".parse::<StockStatus>().ok(), Some(StockStatus::InStock));
    }

    #[test]
    fn show_on_home_defaults_on() {
        assert!(DisplayFlags::default().show_on_home);
    }
}
