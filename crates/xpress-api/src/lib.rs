// xpress-api: Async Rust client for the Xpress marketplace backend and its identity provider

pub mod auth;
pub mod claims;
pub mod client;
pub mod error;
pub mod identity;
pub mod models;
pub mod products;
pub mod transport;
pub mod users;
pub mod vendors;

pub use client::Client;
pub use error::Error;
pub use identity::{IdentityClient, IdentitySession};
pub use products::{ExistingImages, ImageFile, ProductUpload};
pub use transport::{TlsMode, TransportConfig};
