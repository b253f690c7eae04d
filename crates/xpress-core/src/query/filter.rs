// Product and vendor predicates, sort keys and aggregate counts.

use std::cmp::Ordering;

use indexmap::IndexSet;
use strum::{Display, EnumIter, EnumString};

use super::{DateRange, ListItem, RangeFilter, cmp_opt_text, cmp_text, contains_ci};
use crate::model::{Priority, Product, StockStatus, Vendor, VendorStatus};

// ── Products ────────────────────────────────────────────────────────

/// Structured product filter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub price: RangeFilter,
    pub quantity: RangeFilter,
    /// Exact vendor display name.
    pub vendor: Option<String>,
    /// Exact category id.
    pub category: Option<String>,
    pub status: Option<StockStatus>,
    pub posted: DateRange,
}

impl ProductFilter {
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum ProductSortKey {
    Name,
    Price,
    Quantity,
    Vendor,
    Category,
    DatePosted,
    Status,
}

impl ListItem for Product {
    type Filter = ProductFilter;
    type SortKey = ProductSortKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        contains_ci(&self.name, needle)
            || self.brand.as_deref().is_some_and(|b| contains_ci(b, needle))
            || self
                .part_number
                .as_deref()
                .is_some_and(|p| contains_ci(p, needle))
    }

    fn matches_filter(&self, f: &ProductFilter) -> bool {
        f.price.contains(self.price)
            && f.quantity.contains(f64::from(self.stock))
            && f.vendor.as_deref().is_none_or(|v| self.vendor_display() == v)
            && f.category
                .as_deref()
                .is_none_or(|c| self.category_id.as_deref() == Some(c))
            && f.status.is_none_or(|s| self.status() == s)
            && f.posted.contains(self.date_posted)
    }

    fn compare(&self, other: &Self, key: ProductSortKey) -> Ordering {
        match key {
            ProductSortKey::Name => cmp_text(&self.name, &other.name),
            ProductSortKey::Price => self.price.total_cmp(&other.price),
            ProductSortKey::Quantity => self.stock.cmp(&other.stock),
            ProductSortKey::Vendor => cmp_text(self.vendor_display(), other.vendor_display()),
            ProductSortKey::Category => {
                cmp_opt_text(self.category_id.as_deref(), other.category_id.as_deref())
            }
            ProductSortKey::DatePosted => self.date_posted.cmp(&other.date_posted),
            ProductSortKey::Status => self.status().cmp(&other.status()),
        }
    }
}

/// Totals over a filtered product set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductCounts {
    pub total: usize,
    pub in_stock: usize,
    pub low_stock: usize,
    pub out_of_stock: usize,
}

impl<'a> FromIterator<&'a Product> for ProductCounts {
    fn from_iter<I: IntoIterator<Item = &'a Product>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut c, p| {
            c.total += 1;
            match p.status() {
                StockStatus::InStock => c.in_stock += 1,
                StockStatus::LowStock => c.low_stock += 1,
                StockStatus::OutOfStock => c.out_of_stock += 1,
            }
            c
        })
    }
}

// ── Vendors ─────────────────────────────────────────────────────────

/// Structured vendor filter set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VendorFilter {
    pub location: Option<String>,
    pub priority: Option<Priority>,
    pub status: Option<VendorStatus>,
    pub published: DateRange,
}

impl VendorFilter {
    pub fn is_active(&self) -> bool {
        *self != Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, EnumIter)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VendorSortKey {
    Id,
    Name,
    Email,
    Phone,
    Location,
    Priority,
    Status,
    DatePublished,
}

impl ListItem for Vendor {
    type Filter = VendorFilter;
    type SortKey = VendorSortKey;

    fn id(&self) -> &str {
        &self.id
    }

    fn matches_search(&self, needle: &str) -> bool {
        self.field_texts().iter().any(|f| contains_ci(f, needle))
    }

    fn matches_filter(&self, f: &VendorFilter) -> bool {
        f.location.as_deref().is_none_or(|l| self.location == l)
            && f.priority.is_none_or(|p| self.priority == Some(p))
            && f.status.is_none_or(|s| self.status() == s)
            && f.published.contains(self.date_published)
    }

    fn compare(&self, other: &Self, key: VendorSortKey) -> Ordering {
        match key {
            VendorSortKey::Id => cmp_text(&self.id, &other.id),
            VendorSortKey::Name => cmp_text(&self.name, &other.name),
            VendorSortKey::Email => cmp_text(&self.email, &other.email),
            VendorSortKey::Phone => cmp_text(&self.phone, &other.phone),
            VendorSortKey::Location => cmp_text(&self.location, &other.location),
            VendorSortKey::Priority => self.priority.cmp(&other.priority),
            // Inactive (false) before active (true), like the boolean column.
            VendorSortKey::Status => self.is_active.cmp(&other.is_active),
            VendorSortKey::DatePublished => self.date_published.cmp(&other.date_published),
        }
    }
}

/// Active/inactive totals over a filtered vendor set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VendorCounts {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl<'a> FromIterator<&'a Vendor> for VendorCounts {
    fn from_iter<I: IntoIterator<Item = &'a Vendor>>(iter: I) -> Self {
        iter.into_iter().fold(Self::default(), |mut c, v| {
            c.total += 1;
            if v.is_active {
                c.active += 1;
            } else {
                c.inactive += 1;
            }
            c
        })
    }
}

/// Distinct non-empty locations, in first-seen order.
pub fn unique_locations<'a>(vendors: impl IntoIterator<Item = &'a Vendor>) -> Vec<String> {
    vendors
        .into_iter()
        .map(|v| v.location.as_str())
        .filter(|l| !l.is_empty())
        .collect::<IndexSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

/// Distinct priorities present, in first-seen order.
pub fn unique_priorities<'a>(vendors: impl IntoIterator<Item = &'a Vendor>) -> Vec<Priority> {
    vendors
        .into_iter()
        .filter_map(|v| v.priority)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::model::DisplayFlags;
    use crate::query::{SortDirection, SortSpec, apply};

    fn product(id: &str, name: &str, price: f64, stock: u32) -> Product {
        Product {
            id: id.into(),
            name: name.into(),
            price,
            stock,
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
        }
    }

    fn vendor(id: &str, name: &str, location: &str, active: bool) -> Vendor {
        Vendor {
            id: id.into(),
            name: name.into(),
            email: format!("{id}@vendors.test"),
            phone: "555-0100".into(),
            location: location.into(),
            company: None,
            website: None,
            notes: None,
            priority: None,
            is_active: active,
            category: None,
            date_published: None,
        }
    }

    fn ids<T: ListItem>(items: &[&T]) -> Vec<String> {
        items.iter().map(|i| i.id().to_owned()).collect()
    }

    #[test]
    fn search_brake_matches_only_brake_pads() {
        let items = vec![
            product("1", "Premium Brake Pads", 89.99, 20),
            product("2", "Engine Oil Filter", 12.5, 3),
        ];
        let out = apply(&items, "brake", &ProductFilter::default(), None);
        assert_eq!(ids(&out), vec!["1"]);
    }

    #[test]
    fn search_covers_brand_and_part_number() {
        let mut a = product("1", "Pads", 1.0, 1);
        a.brand = Some("Bosch".into());
        let mut b = product("2", "Filter", 1.0, 1);
        b.part_number = Some("BX-220".into());
        let items = vec![a, b];

        assert_eq!(ids(&apply(&items, "BOSCH", &ProductFilter::default(), None)), vec!["1"]);
        assert_eq!(ids(&apply(&items, "bx-2", &ProductFilter::default(), None)), vec!["2"]);
    }

    #[test]
    fn min_price_filter() {
        let items = vec![
            product("a", "A", 12.50, 1),
            product("b", "B", 89.99, 1),
            product("c", "C", 45.75, 1),
        ];
        let filter = ProductFilter {
            price: RangeFilter::parse("50", ""),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&apply(&items, "", &filter, None)), vec!["b"]);
    }

    #[test]
    fn filters_combine_with_and() {
        let mut a = product("a", "A", 30.0, 0);
        a.category_id = Some("cooling-ac".into());
        let mut b = product("b", "B", 30.0, 50);
        b.category_id = Some("cooling-ac".into());
        let c = product("c", "C", 30.0, 0);
        let items = vec![a, b, c];

        let filter = ProductFilter {
            category: Some("cooling-ac".into()),
            status: Some(StockStatus::OutOfStock),
            ..ProductFilter::default()
        };
        assert_eq!(ids(&apply(&items, "", &filter, None)), vec!["a"]);
    }

    #[test]
    fn filtered_result_is_sound_and_complete() {
        let items: Vec<Product> = (0..40_u32)
            .map(|i| product(&i.to_string(), &format!("Part {i}"), f64::from(i) * 2.5, i % 15))
            .collect();
        let filter = ProductFilter {
            price: RangeFilter::parse("10", "70"),
            quantity: RangeFilter::parse("3", ""),
            ..ProductFilter::default()
        };

        let out = apply(&items, "", &filter, None);
        let expected: Vec<&Product> = items
            .iter()
            .filter(|p| (10.0..=70.0).contains(&p.price) && p.stock >= 3)
            .collect();
        assert_eq!(out, expected);
    }

    #[test]
    fn sort_is_case_insensitive_and_stable() {
        let items = vec![
            product("1", "beta", 5.0, 1),
            product("2", "Alpha", 5.0, 1),
            product("3", "alpha", 1.0, 1),
        ];

        let by_name = apply(
            &items,
            "",
            &ProductFilter::default(),
            Some(SortSpec::ascending(ProductSortKey::Name)),
        );
        assert_eq!(ids(&by_name), vec!["2", "3", "1"]);

        let by_price_desc = apply(
            &items,
            "",
            &ProductFilter::default(),
            Some(SortSpec {
                key: ProductSortKey::Price,
                direction: SortDirection::Descending,
            }),
        );
        assert_eq!(ids(&by_price_desc), vec!["1", "2", "3"]);
    }

    #[test]
    fn apply_leaves_source_untouched() {
        let items = vec![product("1", "b", 1.0, 1), product("2", "a", 1.0, 1)];
        let before = items.clone();
        let _ = apply(
            &items,
            "",
            &ProductFilter::default(),
            Some(SortSpec::ascending(ProductSortKey::Name)),
        );
        assert_eq!(items, before);
    }

    #[test]
    fn product_counts_by_status() {
        let items = vec![
            product("1", "a", 1.0, 0),
            product("2", "b", 1.0, 5),
            product("3", "c", 1.0, 11),
            product("4", "d", 1.0, 12),
        ];
        let counts: ProductCounts = items.iter().collect();
        assert_eq!(
            counts,
            ProductCounts {
                total: 4,
                in_stock: 2,
                low_stock: 1,
                out_of_stock: 1
            }
        );
    }

    #[test]
    fn vendor_search_matches_any_field() {
        let items = vec![
            vendor("v1", "Acme", "Lagos", true),
            vendor("v2", "Globex", "Accra", false),
        ];
        assert_eq!(ids(&apply(&items, "accra", &VendorFilter::default(), None)), vec!["v2"]);
        assert_eq!(ids(&apply(&items, "v1@", &VendorFilter::default(), None)), vec!["v1"]);
    }

    #[test]
    fn vendor_status_and_date_filters() {
        let mut a = vendor("v1", "Acme", "Lagos", true);
        a.date_published = NaiveDate::from_ymd_opt(2024, 5, 2);
        let mut b = vendor("v2", "Globex", "Lagos", true);
        b.date_published = NaiveDate::from_ymd_opt(2023, 1, 1);
        let c = vendor("v3", "Initech", "Lagos", false);
        let items = vec![a, b, c];

        let filter = VendorFilter {
            status: Some(VendorStatus::Active),
            published: DateRange::parse("2024-01-01", ""),
            ..VendorFilter::default()
        };
        assert_eq!(ids(&apply(&items, "", &filter, None)), vec!["v1"]);

        let counts: VendorCounts = items.iter().collect();
        assert_eq!((counts.active, counts.inactive), (2, 1));
    }

    #[test]
    fn vendors_sort_by_id() {
        let items = vec![
            vendor("v-20", "Acme", "Lagos", true),
            vendor("V-03", "Globex", "Accra", true),
            vendor("v-11", "Initech", "Abuja", true),
        ];
        let key: VendorSortKey = "id".parse().unwrap();
        let asc = SortSpec::ascending(key);
        let none = VendorFilter::default();

        assert_eq!(ids(&apply(&items, "", &none, Some(asc))), vec!["V-03", "v-11", "v-20"]);
        let desc = SortSpec::toggle(Some(asc), key);
        assert_eq!(ids(&apply(&items, "", &none, Some(desc))), vec!["v-20", "v-11", "V-03"]);
    }

    #[test]
    fn unique_choices_keep_first_seen_order() {
        let mut a = vendor("1", "A", "Lagos", true);
        a.priority = Some(Priority::High);
        let mut b = vendor("2", "B", "Accra", true);
        b.priority = Some(Priority::Low);
        let mut c = vendor("3", "C", "Lagos", true);
        c.priority = Some(Priority::High);
        let d = vendor("4", "D", "", true);
        let items = vec![a, b, c, d];

        assert_eq!(unique_locations(&items), vec!["Lagos", "Accra"]);
        assert_eq!(unique_priorities(&items), vec![Priority::High, Priority::Low]);
    }
}
