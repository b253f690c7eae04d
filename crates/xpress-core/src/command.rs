// ── Command API ──
//
// All write operations flow through a unified `Command` enum. The
// controller requires an admin session, performs the request, updates the
// store, and announces which cached lists went stale.

use xpress_api::ProductUpload;
use xpress_api::models::VendorPayload;

use crate::model::{Product, Role, Vendor};

/// All possible write operations against the backend.
#[derive(Debug, Clone)]
pub enum Command {
    // ── Products ─────────────────────────────────────────────────────
    AddProduct(ProductUpload),
    UpdateProduct {
        id: String,
        upload: ProductUpload,
    },
    DeleteProduct {
        id: String,
        /// Remove the record instead of flagging it deleted.
        hard: bool,
    },

    // ── Vendors ──────────────────────────────────────────────────────
    CreateVendor(VendorPayload),
    UpdateVendor {
        id: String,
        payload: VendorPayload,
    },
    DeleteVendor {
        id: String,
    },

    // ── Users ────────────────────────────────────────────────────────
    AssignRole {
        uid: String,
        role: Role,
    },
}

impl Command {
    /// Confirmation shown after the command succeeds.
    pub fn success_message(&self) -> &'static str {
        match self {
            Self::AddProduct(_) => "Product added successfully!",
            Self::UpdateProduct { .. } => "Product updated successfully!",
            Self::DeleteProduct { .. } => "Product deleted successfully!",
            Self::CreateVendor(_) => "Vendor added successfully!",
            Self::UpdateVendor { .. } => "Vendor updated successfully!",
            Self::DeleteVendor { .. } => "Vendor deleted successfully!",
            Self::AssignRole { .. } => "Role assigned successfully",
        }
    }

    /// Prefix for the failure message, e.g. "Failed to add product".
    pub fn failure_prefix(&self) -> &'static str {
        match self {
            Self::AddProduct(_) => "Failed to add product",
            Self::UpdateProduct { .. } => "Failed to update product",
            Self::DeleteProduct { .. } => "Failed to delete product",
            Self::CreateVendor(_) => "Failed to add vendor",
            Self::UpdateVendor { .. } => "Failed to update vendor",
            Self::DeleteVendor { .. } => "Failed to delete vendor",
            Self::AssignRole { .. } => "Failed to assign role",
        }
    }
}

/// Result of a command execution.
#[derive(Debug)]
pub enum CommandResult {
    Ok,
    /// The product as echoed by the backend, when it echoes one.
    Product(Option<Product>),
    Vendor(Option<Vendor>),
}
