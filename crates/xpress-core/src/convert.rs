// ── API-to-domain type conversions ──
//
// Bridges raw `xpress_api` records into canonical `xpress_core::model`
// types. Each `From` impl normalizes legacy field names, parses dates and
// statuses, and fills defaults for missing optional data.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::debug;

use xpress_api::models::{ProductRecord, UserRecord, VendorRecord};

use crate::model::{
    DisplayFlags, Priority, Product, SessionUser, Specification, StockStatus, User, Vendor,
};

// ── Helpers ────────────────────────────────────────────────────────

/// Parse the calendar date out of an RFC 3339 timestamp, a naive
/// `YYYY-MM-DDTHH:MM:SS` timestamp, or a bare `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.date_naive())
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").map(|dt| dt.date()))
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .ok()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

/// Clamp a possibly-negative wire count into a stock level.
fn to_stock(raw: Option<i64>) -> u32 {
    raw.map_or(0, |n| u32::try_from(n.max(0)).unwrap_or(u32::MAX))
}

// ── Product ────────────────────────────────────────────────────────

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        let explicit_status = non_empty(r.status).and_then(|s| match s.parse::<StockStatus>() {
            Ok(status) => Some(status),
            Err(_) => {
                debug!(status = %s, "ignoring unrecognized product status");
                None
            }
        });

        let date_posted = r
            .date_posted
            .as_deref()
            .and_then(parse_date)
            .or_else(|| r.created_at.as_deref().and_then(parse_date));

        let specifications = r
            .specifications
            .unwrap_or_default()
            .into_iter()
            .map(|s| Specification {
                label: s.label,
                value: s.value,
            })
            .collect();

        let defaults = DisplayFlags::default();

        Product {
            id: r.id.unwrap_or_default(),
            name: r.item_name.unwrap_or_default(),
            price: r.price.unwrap_or(0.0),
            stock: to_stock(r.stock.or(r.quantity)),
            vendor_id: non_empty(r.vendor_id),
            vendor_name: non_empty(r.vendor_name),
            category_id: non_empty(r.category_id).or_else(|| non_empty(r.category)),
            brand: non_empty(r.brand),
            part_number: non_empty(r.part_number),
            description: r.description.unwrap_or_default(),
            condition: non_empty(r.condition).unwrap_or_else(|| "new".into()),
            specifications,
            compatibility: r.compatibility.unwrap_or_default(),
            flags: DisplayFlags {
                featured: r.featured.unwrap_or(defaults.featured),
                new_product: r.new_product.unwrap_or(defaults.new_product),
                hot_product: r.hot_product.unwrap_or(defaults.hot_product),
                show_on_home: r.show_on_home.unwrap_or(defaults.show_on_home),
                display_on_page: r.display_on_page.unwrap_or(defaults.display_on_page),
            },
            priority: r
                .priority
                .and_then(|p| u32::try_from(p).ok())
                .unwrap_or(0),
            main_image: r.main_image,
            additional_images: r.additional_images.unwrap_or_default(),
            date_posted,
            explicit_status,
        }
    }
}

/// Resolve each product's vendor display name against the vendor users.
///
/// A product whose `vendor_id` matches a user's `uid` takes that user's
/// display name, else user name, else email. Products with no match keep
/// their own `vendor_name`; `Product::vendor_display` covers the rest.
pub fn enrich_vendor_names(products: &mut [Product], vendors: &[User]) {
    let labels: HashMap<&str, &str> = vendors
        .iter()
        .filter_map(|v| v.vendor_label().map(|label| (v.uid.as_str(), label)))
        .collect();

    for product in products {
        if let Some(label) = product
            .vendor_id
            .as_deref()
            .and_then(|id| labels.get(id))
        {
            product.vendor_name = Some((*label).to_owned());
        }
    }
}

// ── Vendor ─────────────────────────────────────────────────────────

impl From<VendorRecord> for Vendor {
    fn from(r: VendorRecord) -> Self {
        let priority = non_empty(r.priority).and_then(|p| match p.parse::<Priority>() {
            Ok(priority) => Some(priority),
            Err(_) => {
                debug!(priority = %p, "ignoring unrecognized vendor priority");
                None
            }
        });

        let date_published = r
            .date_published
            .as_deref()
            .and_then(parse_date)
            .or_else(|| r.created_at.as_deref().and_then(parse_date));

        Vendor {
            id: r.id.or(r.uid).unwrap_or_default(),
            name: non_empty(r.name)
                .or_else(|| non_empty(r.display_name))
                .unwrap_or_default(),
            email: r.email.unwrap_or_default(),
            phone: r.phone.unwrap_or_default(),
            location: r.location.unwrap_or_default(),
            company: non_empty(r.company),
            website: non_empty(r.website),
            notes: non_empty(r.notes),
            priority,
            is_active: r.is_active.unwrap_or(true),
            category: non_empty(r.category),
            date_published,
        }
    }
}

// ── User ───────────────────────────────────────────────────────────

impl From<UserRecord> for User {
    fn from(r: UserRecord) -> Self {
        User {
            uid: r.uid.or(r.id).unwrap_or_default(),
            email: non_empty(r.email),
            display_name: non_empty(r.display_name),
            user_name: non_empty(r.user_name),
            role: non_empty(r.role),
        }
    }
}

impl From<User> for SessionUser {
    fn from(u: User) -> Self {
        SessionUser {
            role: u
                .role
                .unwrap_or_else(|| xpress_api::claims::DEFAULT_ROLE.to_owned()),
            uid: u.uid,
            email: u.email,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn record(value: serde_json::Value) -> ProductRecord {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn legacy_product_fields_are_normalized() {
        let p = Product::from(record(json!({
            "id": "001",
            "itemName": "Premium Brake Pads",
            "price": "89.99",
            "quantity": 4,
            "category": "body-chassis",
            "createdAt": "2024-03-05T10:00:00.000Z"
        })));

        assert_eq!(p.stock, 4);
        assert_eq!(p.category_id.as_deref(), Some("body-chassis"));
        assert_eq!(p.condition, "new");
        assert!(p.flags.show_on_home);
        assert_eq!(p.date_posted, NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(p.status(), StockStatus::LowStock);
    }

    #[test]
    fn explicit_status_overrides_stock() {
        let p = Product::from(record(json!({ "id": "1", "stock": 50, "status": "Out of Stock" })));
        assert_eq!(p.status(), StockStatus::OutOfStock);
    }

    #[test]
    fn negative_stock_clamps_to_zero() {
        let p = Product::from(record(json!({ "id": "1", "stock": -3 })));
        assert_eq!(p.stock, 0);
        assert_eq!(p.status(), StockStatus::OutOfStock);
    }

    #[test]
    fn vendor_names_resolve_from_directory() {
        let mut products = vec![
            Product::from(record(json!({ "id": "1", "vendorId": "u1" }))),
            Product::from(record(json!({ "id": "2", "vendorId": "u2", "vendorName": "Legacy Co" }))),
            Product::from(record(json!({ "id": "3" }))),
        ];
        let vendors = vec![User {
            uid: "u1".into(),
            email: Some("ada@x.io".into()),
            display_name: None,
            user_name: Some("ada".into()),
            role: Some("vendor".into()),
        }];

        enrich_vendor_names(&mut products, &vendors);

        assert_eq!(products[0].vendor_display(), "ada");
        assert_eq!(products[1].vendor_display(), "Legacy Co");
        assert_eq!(products[2].vendor_display(), "Unknown Vendor");
    }

    #[test]
    fn vendor_record_defaults() {
        let v = Vendor::from(
            serde_json::from_value::<VendorRecord>(json!({
                "uid": "v9",
                "displayName": "Acme",
                "priority": "HIGH",
                "datePublished": "2024-01-15"
            }))
            .unwrap(),
        );
        assert_eq!(v.id, "v9");
        assert_eq!(v.name, "Acme");
        assert_eq!(v.priority, Some(Priority::High));
        assert!(v.is_active);
        assert_eq!(v.date_published, NaiveDate::from_ymd_opt(2024, 1, 15));
    }

    #[test]
    fn dates_parse_from_several_shapes() {
        let day = NaiveDate::from_ymd_opt(2024, 6, 1);
        assert_eq!(parse_date("2024-06-01"), day);
        assert_eq!(parse_date("2024-06-01T08:30:00Z"), day);
        assert_eq!(parse_date("2024-06-01T08:30:00.123"), day);
        assert_eq!(parse_date("June 1st"), None);
    }
}
