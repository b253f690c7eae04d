//! Product command handlers.

use tabled::Tabled;

use xpress_core::{
    Category, Command as CoreCommand, CommandResult, DateRange, Product, ProductCounts,
    ProductFilter, ProductForm, RangeFilter, Specification, StockStatus, export, load_images,
};

use crate::cli::{
    GlobalOpts, OutputFormat, ProductFilterArgs, ProductInput, ProductsArgs, ProductsCommand,
};
use crate::error::CliError;
use crate::output;

use super::{CliContext, util};

pub(super) const SORT_KEYS: &str = "name, price, quantity, vendor, category, date-posted, status";
const STATUSES: &str = "in-stock, low-stock, out-of-stock";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
pub(super) struct ProductRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Item Name")]
    name: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Quantity")]
    quantity: u32,
    #[tabled(rename = "Vendor Name")]
    vendor: String,
    #[tabled(rename = "Date Posted")]
    posted: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl ProductRow {
    pub(super) fn new(p: &Product, color: bool) -> Self {
        Self {
            id: p.id.clone(),
            name: p.name.clone(),
            price: format_price(p.price),
            quantity: p.stock,
            vendor: p.vendor_display().to_owned(),
            posted: p.date_posted.map(|d| d.to_string()).unwrap_or_default(),
            status: output::paint_stock(p.status(), color),
        }
    }
}

fn format_price(price: f64) -> String {
    format!("{price:.2}")
}

fn detail(p: &Product) -> String {
    let specs = p
        .specifications
        .iter()
        .map(|s| format!("{}: {}", s.label, s.value))
        .collect::<Vec<_>>()
        .join("; ");
    let flags = [
        ("featured", p.flags.featured),
        ("new", p.flags.new_product),
        ("hot", p.flags.hot_product),
        ("home", p.flags.show_on_home),
        ("page", p.flags.display_on_page),
    ]
    .iter()
    .filter(|(_, on)| *on)
    .map(|(name, _)| *name)
    .collect::<Vec<_>>()
    .join(", ");

    output::detail_lines(&[
        ("ID", p.id.clone()),
        ("Item Name", p.name.clone()),
        ("Price", format_price(p.price)),
        ("Quantity", p.stock.to_string()),
        ("Status", p.status().to_string()),
        ("Vendor", p.vendor_display().to_owned()),
        ("Vendor ID", p.vendor_id.clone().unwrap_or_default()),
        ("Category", p.category_label().to_owned()),
        ("Brand", p.brand.clone().unwrap_or_default()),
        ("Part Number", p.part_number.clone().unwrap_or_default()),
        ("Condition", p.condition.clone()),
        ("Specifications", specs),
        ("Compatibility", p.compatibility.join(", ")),
        ("Flags", flags),
        ("Priority", p.priority.to_string()),
        (
            "Main Image",
            p.main_image.as_ref().map(|i| i.url().to_owned()).unwrap_or_default(),
        ),
        ("More Images", p.additional_images.len().to_string()),
        (
            "Date Posted",
            p.date_posted.map(|d| d.to_string()).unwrap_or_default(),
        ),
        ("Description", p.description.clone()),
    ])
}

// ── Filters and form input ──────────────────────────────────────────

fn product_filter(args: &ProductFilterArgs) -> Result<ProductFilter, CliError> {
    let category = args
        .category
        .as_deref()
        .map(|slug| Category::require(slug).map(|c| c.id.to_owned()))
        .transpose()?;
    Ok(ProductFilter {
        price: RangeFilter::parse(
            args.min_price.as_deref().unwrap_or_default(),
            args.max_price.as_deref().unwrap_or_default(),
        ),
        quantity: RangeFilter::parse(
            args.min_qty.as_deref().unwrap_or_default(),
            args.max_qty.as_deref().unwrap_or_default(),
        ),
        vendor: args.vendor.clone(),
        category,
        status: util::parse_opt::<StockStatus>("status", args.status.as_deref(), STATUSES)?,
        posted: DateRange::parse(
            args.from.as_deref().unwrap_or_default(),
            args.to.as_deref().unwrap_or_default(),
        ),
    })
}

fn parse_spec(raw: &str) -> Result<Specification, CliError> {
    let (label, value) = raw.split_once('=').ok_or_else(|| CliError::Validation {
        field: "spec".into(),
        reason: format!("expected LABEL=VALUE, got '{raw}'"),
    })?;
    Ok(Specification {
        label: label.trim().to_owned(),
        value: value.trim().to_owned(),
    })
}

/// Overlay the flags that were given onto `form`.
async fn apply_input(form: &mut ProductForm, input: ProductInput) -> Result<(), CliError> {
    if let Some(v) = input.name {
        form.item_name = v;
    }
    if let Some(v) = input.price {
        form.price = v;
    }
    if let Some(v) = input.quantity {
        form.quantity = v;
    }
    if let Some(v) = input.vendor_id {
        form.vendor_id = v;
    }
    if let Some(slug) = input.category {
        form.category_id = Category::require(&slug)?.id.to_owned();
    }
    if let Some(v) = input.condition {
        form.condition = v;
    }
    if let Some(v) = input.description {
        form.description = v;
    }
    if let Some(v) = input.brand {
        form.brand = v;
    }
    if let Some(v) = input.part_number {
        form.part_number = v;
    }
    if !input.specs.is_empty() {
        form.specifications = input
            .specs
            .iter()
            .map(|s| parse_spec(s))
            .collect::<Result<_, _>>()?;
    }
    if !input.compatibility.is_empty() {
        form.compatibility = input.compatibility;
    }
    if let Some(v) = input.featured {
        form.flags.featured = v;
    }
    if let Some(v) = input.new_product {
        form.flags.new_product = v;
    }
    if let Some(v) = input.hot_product {
        form.flags.hot_product = v;
    }
    if let Some(v) = input.show_on_home {
        form.flags.show_on_home = v;
    }
    if let Some(v) = input.display_on_page {
        form.flags.display_on_page = v;
    }
    if let Some(v) = input.priority {
        form.priority = v;
    }
    if !input.images.is_empty() {
        form.images = load_images(&input.images).await?;
    }
    Ok(())
}

async fn fetch(ctx: &CliContext, global: &GlobalOpts) -> Result<Vec<Product>, CliError> {
    let bar = util::spinner("Loading products", global);
    let result = ctx.controller.fetch_products().await;
    bar.finish_and_clear();
    result?;
    Ok(ctx.controller.products())
}

/// Run a write and phrase failures the way the admin screens do.
async fn execute(
    ctx: &CliContext,
    cmd: CoreCommand,
    global: &GlobalOpts,
) -> Result<CommandResult, CliError> {
    let success = cmd.success_message();
    let prefix = cmd.failure_prefix();
    let result = ctx
        .controller
        .execute(cmd)
        .await
        .map_err(|e| ctx.auth_error(e).with_prefix(prefix))?;
    output::notice(success, global.quiet);
    Ok(result)
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &CliContext,
    args: ProductsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ctx.require_admin()?;

    match args.command {
        ProductsCommand::List(list) => {
            let products = fetch(ctx, global).await?;
            let filter = product_filter(&list.filter)?;
            let state = util::list_state(
                &products,
                filter,
                list.page.search.as_deref(),
                &list.page,
                ctx.page_size,
                SORT_KEYS,
            )?;
            let view = state.view(&products);
            let color = output::should_color(&global.color);

            let out = output::render_list(
                &global.output,
                &view.rows,
                |p| ProductRow::new(p, color),
                |p| p.id.clone(),
            )?;
            output::print_output(&out, global.quiet);

            if matches!(global.output, OutputFormat::Table) {
                let counts: ProductCounts = view.filtered.iter().copied().collect();
                output::print_output(
                    &format!(
                        "In Stock: {}  Low Stock: {}  Out of Stock: {}\n{}",
                        counts.in_stock,
                        counts.low_stock,
                        counts.out_of_stock,
                        util::page_footer(&view)
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        ProductsCommand::Get { id } => {
            let product = ctx.controller.product(&id).await?;
            let out = output::render_single(&global.output, &product, detail, |p| p.id.clone())?;
            output::print_output(&out, global.quiet);
            Ok(())
        }

        ProductsCommand::Add(input) => {
            let mut form = ProductForm::default();
            apply_input(&mut form, input).await?;
            let upload = form.validate_new()?;
            if let CommandResult::Product(Some(created)) =
                execute(ctx, CoreCommand::AddProduct(upload), global).await?
            {
                output::print_output(&created.id, global.quiet);
            }
            Ok(())
        }

        ProductsCommand::Edit {
            id,
            input,
            replace_images,
        } => {
            let current = ctx.controller.product(&id).await?;
            let mut form = ProductForm::from_product(&current);
            if replace_images {
                form.existing_main = None;
                form.existing_additional.clear();
            }
            apply_input(&mut form, input).await?;
            let upload = form.validate_edit()?;
            execute(ctx, CoreCommand::UpdateProduct { id, upload }, global).await?;
            Ok(())
        }

        ProductsCommand::Delete { ids, hard } => {
            let what = if hard { "Permanently delete" } else { "Delete" };
            let prompt = format!("{what} {} product(s)?", ids.len());
            if !util::confirm(&prompt, "products delete", global.yes)? {
                return Ok(());
            }
            for id in ids {
                execute(ctx, CoreCommand::DeleteProduct { id, hard }, global).await?;
            }
            Ok(())
        }

        ProductsCommand::Export {
            filter,
            search,
            file,
        } => {
            let products = fetch(ctx, global).await?;
            let mut state = xpress_core::ListState::<Product>::new(products.len().max(1));
            state.set_filter(product_filter(&filter)?);
            if let Some(search) = search {
                state.set_search(search);
            }
            let view = state.view(&products);
            let csv = export::products_csv(view.filtered.iter().copied())?;
            util::write_export(&file, &csv)?;
            output::notice(
                &format!("Exported {} products to {}", view.filtered.len(), file.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn filter_args() -> ProductFilterArgs {
        ProductFilterArgs {
            min_price: None,
            max_price: None,
            min_qty: None,
            max_qty: None,
            vendor: None,
            category: None,
            status: None,
            from: None,
            to: None,
        }
    }

    #[test]
    fn filter_flags_map_onto_product_filter() {
        let args = ProductFilterArgs {
            min_price: Some("10".into()),
            max_price: Some("abc".into()),
            category: Some("cooling-ac".into()),
            status: Some("low-stock".into()),
            ..filter_args()
        };
        let filter = product_filter(&args).unwrap();
        assert_eq!(filter.price.min, Some(10.0));
        assert_eq!(filter.price.max, None);
        assert_eq!(filter.category.as_deref(), Some("cooling-ac"));
        assert_eq!(filter.status, Some(StockStatus::LowStock));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let args = ProductFilterArgs {
            category: Some("boats".into()),
            ..filter_args()
        };
        let err = product_filter(&args).unwrap_err();
        assert_eq!(err.to_string(), "Category 'boats' not found");
    }

    #[test]
    fn spec_needs_equals_sign() {
        let spec = parse_spec("Material = Ceramic").unwrap();
        assert_eq!(spec.label, "Material");
        assert_eq!(spec.value, "Ceramic");
        assert!(parse_spec("Material").is_err());
    }
}
