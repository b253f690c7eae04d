// xpress-core: domain layer between xpress-api and consumers (CLI/TUI).

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod export;
pub mod form;
pub mod model;
pub mod query;
pub mod resource;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::{Command, CommandResult};
pub use config::{AuthMode, ControllerConfig, TlsVerification};
pub use controller::Controller;
pub use error::CoreError;
pub use form::{ImageUpload, LoginForm, ProductForm, VendorForm, load_images};
pub use query::{
    DateRange, ListItem, ListState, ListView, ProductCounts, ProductFilter, ProductSortKey,
    RangeFilter, SortDirection, SortSpec, VendorCounts, VendorFilter, VendorSortKey,
};
pub use resource::{Invalidation, Resource, ResourceState};
pub use store::{
    Action, AppState, MemorySessionStore, PersistedSession, RequestStatus, SessionStore, Store,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    CATEGORIES, Category, DisplayFlags, ImageRef, Priority, Product, Role, Session, SessionUser,
    Specification, StockStatus, User, Vendor, VendorStatus, stock_status,
};
