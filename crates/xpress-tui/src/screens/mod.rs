//! Screen implementations. Each screen is a top-level Component.

pub mod categories;
pub mod login;
pub mod products;
pub mod roles;
pub mod vendors;

use crate::app::LoginDefaults;
use crate::component::Component;
use crate::screen::ScreenId;

/// Create every screen component, the sign-in form included.
pub fn create_screens(
    page_size: usize,
    login: &LoginDefaults,
) -> Vec<(ScreenId, Box<dyn Component>)> {
    vec![
        (
            ScreenId::Products,
            Box::new(products::ProductsScreen::new(page_size)),
        ),
        (
            ScreenId::Vendors,
            Box::new(vendors::VendorsScreen::new(page_size)),
        ),
        (
            ScreenId::Categories,
            Box::new(categories::CategoriesScreen::new()),
        ),
        (ScreenId::Roles, Box::new(roles::RolesScreen::new())),
        (ScreenId::Login, Box::new(login::LoginScreen::new(login))),
    ]
}
