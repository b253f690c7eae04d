//! Search, filter, sort and paginate for list screens.
//!
//! Everything here is pure and synchronous: [`apply`] turns a borrowed
//! source list into a filtered, sorted `Vec<&T>` without touching the
//! source, and [`paginate`] slices a page out of it. [`ListState`] holds the
//! transient UI state (search text, filters, sort, page, selection) that
//! drives both.
//!
//! Filter semantics:
//!
//! - Search is a case-insensitive substring match. Empty search matches all.
//! - Numeric ranges are inclusive. A bound that is empty or fails to parse
//!   is unbounded.
//! - Categorical filters are exact matches; `None` matches all.
//! - Date ranges compare calendar dates inclusively. A record with no date
//!   fails any active date range.
//! - All active predicates combine with AND.

mod filter;
mod list;
mod paginate;

use std::cmp::Ordering;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use tracing::debug;

pub use filter::{
    ProductCounts, ProductFilter, ProductSortKey, VendorCounts, VendorFilter, VendorSortKey,
    unique_locations, unique_priorities,
};
pub use list::{ListState, ListView};
pub use paginate::{PAGE_WINDOW, page_window, paginate, showing_text, total_pages};

// ── Item contract ───────────────────────────────────────────────────

/// A record that list screens can search, filter and sort.
pub trait ListItem {
    type Filter: Clone + Default + PartialEq;
    type SortKey: Copy + Eq;

    fn id(&self) -> &str;

    /// `needle` is already lowercased and non-empty.
    fn matches_search(&self, needle: &str) -> bool;

    fn matches_filter(&self, filter: &Self::Filter) -> bool;

    /// Ascending order for `key`.
    fn compare(&self, other: &Self, key: Self::SortKey) -> Ordering;
}

/// Search, filter and sort `items` without mutating them.
///
/// The sort is stable, so ties keep their order in `items`.
pub fn apply<'a, T: ListItem>(
    items: &'a [T],
    search: &str,
    filter: &T::Filter,
    sort: Option<SortSpec<T::SortKey>>,
) -> Vec<&'a T> {
    let needle = search.trim().to_lowercase();

    let mut out: Vec<&T> = items
        .iter()
        .filter(|item| needle.is_empty() || item.matches_search(&needle))
        .filter(|item| item.matches_filter(filter))
        .collect();

    if let Some(spec) = sort {
        out.sort_by(|a, b| {
            let ord = a.compare(b, spec.key);
            match spec.direction {
                SortDirection::Ascending => ord,
                SortDirection::Descending => ord.reverse(),
            }
        });
    }

    out
}

// ── Sort spec ───────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    #[strum(serialize = "asc", serialize = "ascending")]
    Ascending,
    #[strum(serialize = "desc", serialize = "descending")]
    Descending,
}

/// The single active sort column and its direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec<K> {
    pub key: K,
    pub direction: SortDirection,
}

impl<K: Copy + Eq> SortSpec<K> {
    pub fn ascending(key: K) -> Self {
        Self {
            key,
            direction: SortDirection::Ascending,
        }
    }

    /// Next sort after clicking `key`: the same key ascending flips to
    /// descending, anything else starts ascending on `key`.
    pub fn toggle(current: Option<Self>, key: K) -> Self {
        match current {
            Some(spec) if spec.key == key && spec.direction == SortDirection::Ascending => Self {
                key,
                direction: SortDirection::Descending,
            },
            _ => Self::ascending(key),
        }
    }
}

// ── Range filters ───────────────────────────────────────────────────

/// Inclusive numeric range. `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RangeFilter {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl RangeFilter {
    /// Build from raw text inputs. An empty or unparsable bound is
    /// unbounded, never zero.
    pub fn parse(min: &str, max: &str) -> Self {
        Self {
            min: parse_bound(min),
            max: parse_bound(max),
        }
    }

    pub fn is_active(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: f64) -> bool {
        self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
    }
}

fn parse_bound(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Some(v),
        _ => {
            debug!(bound = raw, "unparsable range bound treated as unbounded");
            None
        }
    }
}

/// Inclusive calendar-date range. `None` bounds are open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

impl DateRange {
    /// Build from `YYYY-MM-DD` inputs; empty or malformed bounds are open.
    pub fn parse(from: &str, to: &str) -> Self {
        Self {
            from: crate::convert::parse_date(from),
            to: crate::convert::parse_date(to),
        }
    }

    pub fn is_active(&self) -> bool {
        self.from.is_some() || self.to.is_some()
    }

    pub fn contains(&self, date: Option<NaiveDate>) -> bool {
        if !self.is_active() {
            return true;
        }
        date.is_some_and(|d| self.from.is_none_or(|f| d >= f) && self.to.is_none_or(|t| d <= t))
    }
}

// ── Comparators ─────────────────────────────────────────────────────

pub(crate) fn cmp_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase().cmp(&b.to_lowercase())
}

pub(crate) fn cmp_opt_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => cmp_text(a, b),
        (a, b) => a.is_some().cmp(&b.is_some()),
    }
}

pub(crate) fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_same_key_flips_then_restores() {
        let once = SortSpec::toggle(None, 1_u8);
        assert_eq!(once.direction, SortDirection::Ascending);
        let twice = SortSpec::toggle(Some(once), 1);
        assert_eq!(twice.direction, SortDirection::Descending);
        let thrice = SortSpec::toggle(Some(twice), 1);
        assert_eq!(thrice, once);
    }

    #[test]
    fn toggle_new_key_resets_to_ascending() {
        let desc = SortSpec {
            key: 1_u8,
            direction: SortDirection::Descending,
        };
        assert_eq!(SortSpec::toggle(Some(desc), 2), SortSpec::ascending(2));
    }

    #[test]
    fn unparsable_bounds_are_unbounded() {
        let r = RangeFilter::parse("abc", "");
        assert!(!r.is_active());
        assert!(r.contains(-1.0));

        let r = RangeFilter::parse("50", "x");
        assert_eq!(r.min, Some(50.0));
        assert_eq!(r.max, None);
    }

    #[test]
    fn range_bounds_are_inclusive() {
        let r = RangeFilter::parse("10", "20");
        assert!(r.contains(10.0));
        assert!(r.contains(20.0));
        assert!(!r.contains(20.01));
    }

    #[test]
    fn date_range_excludes_undated_records_only_when_active() {
        let open = DateRange::default();
        assert!(open.contains(None));

        let r = DateRange::parse("2024-01-01", "2024-01-31");
        assert!(!r.contains(None));
        assert!(r.contains(NaiveDate::from_ymd_opt(2024, 1, 31)));
        assert!(!r.contains(NaiveDate::from_ymd_opt(2024, 2, 1)));
    }

    #[test]
    fn none_sorts_before_some() {
        assert_eq!(cmp_opt_text(None, Some("a")), Ordering::Less);
        assert_eq!(cmp_opt_text(Some("B"), Some("a")), Ordering::Greater);
    }
}
