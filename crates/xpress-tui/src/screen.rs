//! Screen identifier enum.

use std::fmt;

/// Identifies each primary TUI screen, navigable by number keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScreenId {
    #[default]
    Products, // 1
    Vendors,    // 2
    Categories, // 3
    Roles,      // 4
    /// Sign-in form. Not in the tab bar, not navigable by number keys.
    Login,
}

impl ScreenId {
    /// All screens in tab-bar order.
    pub const ALL: [ScreenId; 4] = [Self::Products, Self::Vendors, Self::Categories, Self::Roles];

    /// Numeric key (1-4) for this screen. Login has no number key.
    pub fn number(self) -> u8 {
        match self {
            Self::Products => 1,
            Self::Vendors => 2,
            Self::Categories => 3,
            Self::Roles => 4,
            Self::Login => 0,
        }
    }

    /// Screen from a numeric key (1-4). Returns None for out-of-range.
    pub fn from_number(n: u8) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == n && n != 0)
    }

    /// Next screen in tab order (wraps around).
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Previous screen in tab order (wraps around).
    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|&s| s == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }

    /// Short label for the tab bar.
    pub fn label(self) -> &'static str {
        match self {
            Self::Products => "Products",
            Self::Vendors => "Vendors",
            Self::Categories => "Categories",
            Self::Roles => "Roles",
            Self::Login => "Sign in",
        }
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn number_keys_round_trip() {
        for screen in ScreenId::ALL {
            assert_eq!(ScreenId::from_number(screen.number()), Some(screen));
        }
        assert_eq!(ScreenId::from_number(0), None);
        assert_eq!(ScreenId::from_number(5), None);
    }

    #[test]
    fn tab_order_wraps() {
        assert_eq!(ScreenId::Roles.next(), ScreenId::Products);
        assert_eq!(ScreenId::Products.prev(), ScreenId::Roles);
        assert_eq!(ScreenId::Vendors.next(), ScreenId::Categories);
    }

    #[test]
    fn login_cycles_into_the_tab_bar() {
        assert!(!ScreenId::ALL.contains(&ScreenId::Login));
        assert_eq!(ScreenId::Login.next(), ScreenId::Vendors);
    }
}
