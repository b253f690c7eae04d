//! Clap derive structures for the `xpress` CLI.
//!
//! Defines the complete command tree, global flags, and shared types.
//! This file is also compiled by `build.rs` for man pages, so it may only
//! depend on clap and std.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

// ── Top-Level CLI ────────────────────────────────────────────────────

/// xpress -- admin CLI for the Xpress auto-parts marketplace
#[derive(Debug, Parser)]
#[command(
    name = "xpress",
    version,
    about = "Administer the Xpress auto-parts marketplace from the command line",
    long_about = "Manage the product catalog, vendor directory and user roles of an\n\
        Xpress marketplace backend. Sign in once with `xpress login`; the\n\
        session is kept for an hour.",
    propagate_version = true,
    subcommand_required = true,
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Command,
}

// ── Global Options ───────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct GlobalOpts {
    /// Configuration profile to use
    #[arg(long, short = 'p', env = "XPRESS_PROFILE", global = true)]
    pub profile: Option<String>,

    /// Backend base URL (overrides profile)
    #[arg(long, env = "XPRESS_API_URL", global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(
        long,
        short = 'o',
        env = "XPRESS_OUTPUT",
        default_value = "table",
        global = true
    )]
    pub output: OutputFormat,

    /// When to use color output
    #[arg(long, default_value = "auto", global = true)]
    pub color: ColorMode,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(long, short = 'v', action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    /// Skip confirmation prompts
    #[arg(long, short = 'y', global = true)]
    pub yes: bool,

    /// Accept invalid TLS certificates
    #[arg(long, short = 'k', env = "XPRESS_INSECURE", global = true)]
    pub insecure: bool,

    /// Request timeout in seconds
    #[arg(long, env = "XPRESS_TIMEOUT", global = true)]
    pub timeout: Option<u64>,
}

// ── Output & Color Enums ─────────────────────────────────────────────

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    /// Pretty table (default, interactive)
    Table,
    /// Pretty-printed JSON
    Json,
    /// Compact single-line JSON
    JsonCompact,
    /// YAML
    Yaml,
    /// Plain text, one value per line (scripting)
    Plain,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum ColorMode {
    /// Auto-detect (color if terminal is interactive)
    Auto,
    /// Always emit color codes
    Always,
    /// Never emit color codes
    Never,
}

// ── Top-Level Command Enum ───────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in as an admin
    Login(LoginArgs),

    /// Sign out and forget the saved session
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Send a password-reset email
    ResetPassword(ResetPasswordArgs),

    /// Manage the product catalog
    #[command(alias = "p")]
    Products(ProductsArgs),

    /// Manage the vendor directory
    #[command(alias = "v")]
    Vendors(VendorsArgs),

    /// List users and assign roles
    #[command(alias = "u")]
    Users(UsersArgs),

    /// Browse product categories
    #[command(alias = "cat")]
    Categories(CategoriesArgs),

    /// Manage CLI configuration and profiles
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

// ── Auth ─────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct LoginArgs {
    /// Account email (defaults to the profile's email)
    #[arg(long, short = 'e')]
    pub email: Option<String>,

    /// Sign in with an OAuth provider ID token (Google) instead of a password
    #[arg(long, env = "XPRESS_PROVIDER_TOKEN", hide_env_values = true)]
    pub provider_token: Option<String>,
}

#[derive(Debug, Args)]
pub struct ResetPasswordArgs {
    /// Account email (defaults to the profile's email)
    #[arg(long, short = 'e')]
    pub email: Option<String>,
}

// ── Shared list arguments ────────────────────────────────────────────

/// Sort, paging and search shared by every list command.
#[derive(Debug, Args)]
pub struct PageArgs {
    /// Free-text search
    #[arg(long, short = 's')]
    pub search: Option<String>,

    /// Sort column
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort descending
    #[arg(long, requires = "sort")]
    pub desc: bool,

    /// Page number (1-based)
    #[arg(long, default_value = "1")]
    pub page: usize,

    /// Rows per page (overrides profile)
    #[arg(long)]
    pub page_size: Option<usize>,

    /// Show every row instead of one page
    #[arg(long, short = 'a', conflicts_with_all = ["page", "page_size"])]
    pub all: bool,
}

// ── Products ─────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ProductsArgs {
    #[command(subcommand)]
    pub command: ProductsCommand,
}

#[derive(Debug, Subcommand)]
pub enum ProductsCommand {
    /// List products
    #[command(alias = "ls")]
    List(ProductListArgs),

    /// Show one product
    Get {
        /// Product ID
        id: String,
    },

    /// Add a product
    Add(ProductInput),

    /// Edit a product; omitted fields keep their current value
    Edit {
        /// Product ID
        id: String,

        #[command(flatten)]
        input: ProductInput,

        /// Drop the current images instead of keeping them
        #[arg(long)]
        replace_images: bool,
    },

    /// Delete one or more products
    #[command(alias = "rm")]
    Delete {
        /// Product IDs
        #[arg(required = true)]
        ids: Vec<String>,

        /// Remove the record instead of flagging it deleted
        #[arg(long)]
        hard: bool,
    },

    /// Export the filtered product list as CSV
    Export {
        #[command(flatten)]
        filter: ProductFilterArgs,

        /// Free-text search
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output file
        #[arg(long, short = 'f', default_value = "products.csv")]
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct ProductListArgs {
    #[command(flatten)]
    pub filter: ProductFilterArgs,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Args)]
pub struct ProductFilterArgs {
    /// Minimum price
    #[arg(long)]
    pub min_price: Option<String>,

    /// Maximum price
    #[arg(long)]
    pub max_price: Option<String>,

    /// Minimum quantity
    #[arg(long)]
    pub min_qty: Option<String>,

    /// Maximum quantity
    #[arg(long)]
    pub max_qty: Option<String>,

    /// Vendor name (exact)
    #[arg(long)]
    pub vendor: Option<String>,

    /// Category slug
    #[arg(long)]
    pub category: Option<String>,

    /// Stock status: in-stock, low-stock, out-of-stock
    #[arg(long)]
    pub status: Option<String>,

    /// Posted on or after (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Posted on or before (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

/// Product fields. All optional so `edit` can patch.
#[derive(Debug, Args)]
pub struct ProductInput {
    /// Item name
    #[arg(long)]
    pub name: Option<String>,

    /// Price
    #[arg(long)]
    pub price: Option<String>,

    /// Quantity in stock
    #[arg(long, alias = "stock")]
    pub quantity: Option<String>,

    /// Vendor ID
    #[arg(long)]
    pub vendor_id: Option<String>,

    /// Category slug
    #[arg(long)]
    pub category: Option<String>,

    /// Condition (new, used, refurbished)
    #[arg(long)]
    pub condition: Option<String>,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub brand: Option<String>,

    #[arg(long)]
    pub part_number: Option<String>,

    /// Specification row as LABEL=VALUE (repeatable)
    #[arg(long = "spec", value_name = "LABEL=VALUE")]
    pub specs: Vec<String>,

    /// Compatible vehicle (repeatable)
    #[arg(long = "compat", value_name = "VEHICLE")]
    pub compatibility: Vec<String>,

    /// Mark as featured
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub featured: Option<bool>,

    /// Mark as new
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub new_product: Option<bool>,

    /// Mark as hot
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub hot_product: Option<bool>,

    /// Show on the home page
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub show_on_home: Option<bool>,

    /// Show on the category page
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub display_on_page: Option<bool>,

    /// Display priority
    #[arg(long)]
    pub priority: Option<String>,

    /// Image file (repeatable; the first becomes the main image)
    #[arg(long = "image", value_name = "PATH")]
    pub images: Vec<PathBuf>,
}

// ── Vendors ──────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct VendorsArgs {
    #[command(subcommand)]
    pub command: VendorsCommand,
}

#[derive(Debug, Subcommand)]
pub enum VendorsCommand {
    /// List vendors
    #[command(alias = "ls")]
    List(VendorListArgs),

    /// Add a vendor
    Add(VendorInput),

    /// Edit a vendor; omitted fields keep their current value
    Edit {
        /// Vendor ID
        id: String,

        #[command(flatten)]
        input: VendorInput,
    },

    /// Delete one or more vendors
    #[command(alias = "rm")]
    Delete {
        /// Vendor IDs
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Export the filtered vendor list as CSV
    Export {
        #[command(flatten)]
        filter: VendorFilterArgs,

        /// Free-text search
        #[arg(long, short = 's')]
        search: Option<String>,

        /// Output file
        #[arg(long, short = 'f', default_value = "vendors.csv")]
        file: PathBuf,
    },
}

#[derive(Debug, Args)]
pub struct VendorListArgs {
    #[command(flatten)]
    pub filter: VendorFilterArgs,

    #[command(flatten)]
    pub page: PageArgs,
}

#[derive(Debug, Args)]
pub struct VendorFilterArgs {
    /// Location (exact)
    #[arg(long)]
    pub location: Option<String>,

    /// Priority: low, medium, high, critical
    #[arg(long)]
    pub priority: Option<String>,

    /// Status: active, inactive
    #[arg(long)]
    pub status: Option<String>,

    /// Published on or after (YYYY-MM-DD)
    #[arg(long)]
    pub from: Option<String>,

    /// Published on or before (YYYY-MM-DD)
    #[arg(long)]
    pub to: Option<String>,
}

#[derive(Debug, Args)]
pub struct VendorInput {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub email: Option<String>,

    #[arg(long)]
    pub phone: Option<String>,

    #[arg(long)]
    pub location: Option<String>,

    #[arg(long)]
    pub company: Option<String>,

    #[arg(long)]
    pub website: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Priority: low, medium, high, critical
    #[arg(long)]
    pub priority: Option<String>,

    /// Whether the vendor is active
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub active: Option<bool>,

    #[arg(long)]
    pub category: Option<String>,
}

// ── Users ────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct UsersArgs {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[derive(Debug, Subcommand)]
pub enum UsersCommand {
    /// List users
    #[command(alias = "ls")]
    List {
        /// Only users with this role
        #[arg(long, short = 'r')]
        role: Option<String>,
    },

    /// Assign a role to a user
    Assign {
        /// User ID
        uid: String,

        /// Role: customer, vendor, admin, moderator
        role: String,
    },
}

// ── Categories ───────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CategoriesArgs {
    #[command(subcommand)]
    pub command: CategoriesCommand,
}

#[derive(Debug, Subcommand)]
pub enum CategoriesCommand {
    /// List the product categories
    #[command(alias = "ls")]
    List,

    /// List the products in one category
    Show {
        /// Category slug
        slug: String,

        #[command(flatten)]
        page: PageArgs,
    },
}

// ── Config ───────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Interactive configuration wizard
    Init,

    /// Show the resolved configuration
    Show,

    /// Set a profile value
    Set {
        /// Key (api_url, auth, email, identity_api_key_env, ...)
        key: String,
        value: String,
    },

    /// List profiles
    Profiles,

    /// Switch the default profile
    Use {
        /// Profile name
        name: String,
    },

    /// Store a password in the system keyring
    SetPassword {
        /// Profile (defaults to the active one)
        #[arg(long)]
        profile: Option<String>,
    },
}

// ── Completions ──────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: clap_complete::Shell,
}
