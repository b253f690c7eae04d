// ── Domain model ──
//
// Canonical representations of marketplace entities. Wire records from
// `xpress-api` are normalized into these types by `crate::convert`.

pub mod category;
pub mod product;
pub mod user;
pub mod vendor;

pub use category::{CATEGORIES, Category};
pub use product::{
    DisplayFlags, ImageRef, LOW_STOCK_THRESHOLD, Product, Specification, StockStatus,
    UNKNOWN_VENDOR, stock_status,
};
pub use user::{ADMIN_ROLE, DEFAULT_USER_ROLE, Role, Session, SessionUser, User};
pub use vendor::{Priority, Vendor, VendorStatus};
