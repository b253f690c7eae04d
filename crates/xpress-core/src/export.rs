// ── CSV export ──
//
// Renders the currently filtered list as CSV text. Fields are quoted by the
// csv writer whenever they contain a delimiter, quote or newline.

use csv::Writer;

use crate::error::CoreError;
use crate::model::{Product, Vendor};

pub const PRODUCTS_CSV_FILE: &str = "products.csv";
pub const VENDORS_CSV_FILE: &str = "vendors.csv";

const PRODUCT_HEADER: [&str; 8] = [
    "ID",
    "Item Name",
    "Price",
    "Quantity",
    "Vendor Name",
    "Category",
    "Status",
    "Date Posted",
];

const VENDOR_HEADER: [&str; 8] = [
    "ID",
    "Name",
    "Email",
    "Phone",
    "Location",
    "Priority",
    "Status",
    "Date Published",
];

fn csv_error(e: impl std::fmt::Display) -> CoreError {
    CoreError::Internal(format!("CSV export failed: {e}"))
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String, CoreError> {
    let bytes = writer.into_inner().map_err(csv_error)?;
    String::from_utf8(bytes).map_err(csv_error)
}

/// `ID,Item Name,Price,Quantity,Vendor Name,Category,Status,Date Posted`
pub fn products_csv<'a>(
    products: impl IntoIterator<Item = &'a Product>,
) -> Result<String, CoreError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(PRODUCT_HEADER).map_err(csv_error)?;

    for p in products {
        writer
            .write_record([
                p.id.as_str(),
                &p.name,
                &p.price.to_string(),
                &p.stock.to_string(),
                p.vendor_display(),
                p.category_label(),
                &p.status().to_string(),
                &p.date_posted.map(|d| d.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}

/// `ID,Name,Email,Phone,Location,Priority,Status,Date Published`
pub fn vendors_csv<'a>(vendors: impl IntoIterator<Item = &'a Vendor>) -> Result<String, CoreError> {
    let mut writer = Writer::from_writer(Vec::new());
    writer.write_record(VENDOR_HEADER).map_err(csv_error)?;

    for v in vendors {
        writer
            .write_record([
                v.id.as_str(),
                &v.name,
                &v.email,
                &v.phone,
                &v.location,
                &v.priority.map(|p| p.to_string()).unwrap_or_default(),
                &v.status().to_string(),
                &v.date_published.map(|d| d.to_string()).unwrap_or_default(),
            ])
            .map_err(csv_error)?;
    }

    finish(writer)
}
