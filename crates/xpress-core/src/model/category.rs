// ── Category registry ──
//
// The fixed set of product categories. Immutable at runtime; the id of each
// entry equals its slug.

use serde::Serialize;

use crate::error::CoreError;

/// One product category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Category {
    pub id: &'static str,
    pub label: &'static str,
    /// Icon name (lucide set) used by graphical front-ends.
    pub icon: &'static str,
    pub slug: &'static str,
}

const fn category(slug: &'static str, label: &'static str, icon: &'static str) -> Category {
    Category {
        id: slug,
        label,
        icon,
        slug,
    }
}

pub const CATEGORIES: [Category; 8] = [
    category("body-chassis", "Body & Parts", "car"),
    category("engine-performance", "Engine & Performance", "cpu"),
    category("wheels-tires", "Wheels & Tires", "disc"),
    category("lighting-electronics", "Lighting & Electronics", "zap"),
    category("accessories", "Accessories", "sparkles"),
    category("automotive-tools", "Automotive Tools", "wrench"),
    category("fluids-care", "Fluids & Car Care", "droplet"),
    category("cooling-ac", "Cooling & AC", "thermometer"),
];

impl Category {
    pub fn all() -> &'static [Category] {
        &CATEGORIES
    }

    pub fn by_slug(slug: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.slug == slug)
    }

    pub fn by_id(id: &str) -> Option<&'static Category> {
        CATEGORIES.iter().find(|c| c.id == id)
    }

    /// Like [`by_slug`](Self::by_slug), but a miss is an error carrying
    /// "Category not found: {slug}".
    pub fn require(slug: &str) -> Result<&'static Category, CoreError> {
        Self::by_slug(slug).ok_or_else(|| CoreError::not_found("Category", slug))
    }

    /// Display label for a category id, falling back to the raw id for
    /// categories outside the registry.
    pub fn label_for(id: &str) -> &str {
        Self::by_id(id).map_or(id, |c| c.label)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn ids_equal_slugs_and_are_unique() {
        for (i, cat) in CATEGORIES.iter().enumerate() {
            assert_eq!(cat.id, cat.slug);
            assert!(CATEGORIES[i + 1..].iter().all(|other| other.slug != cat.slug));
        }
    }

    #[test]
    fn lookups() {
        assert_eq!(Category::by_slug("fluids-care").map(|c| c.label), Some("Fluids & Car Care"));
        assert_eq!(Category::by_id("cooling-ac").map(|c| c.icon), Some("thermometer"));
        assert!(Category::by_slug("brakes").is_none());
    }

    #[test]
    fn unknown_slug_message() {
        let err = Category::require("brakes").unwrap_err();
        assert_eq!(err.to_string(), "Category not found: brakes");
    }

    #[test]
    fn label_falls_back_to_id() {
        assert_eq!(Category::label_for("wheels-tires"), "Wheels & Tires");
        assert_eq!(Category::label_for("legacy-bucket"), "legacy-bucket");
    }
}
