//! Category command handlers.

use tabled::Tabled;

use xpress_core::{Category, ProductFilter};

use crate::cli::{CategoriesArgs, CategoriesCommand, GlobalOpts, OutputFormat};
use crate::error::CliError;
use crate::output;

use super::products::{ProductRow, SORT_KEYS};
use super::{CliContext, util};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Slug")]
    slug: &'static str,
    #[tabled(rename = "Label")]
    label: &'static str,
    #[tabled(rename = "Icon")]
    icon: &'static str,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        Self {
            slug: c.slug,
            label: c.label,
            icon: c.icon,
        }
    }
}

/// The registry is static, so listing needs no backend or session.
pub fn list(global: &GlobalOpts) -> Result<(), CliError> {
    let out = output::render_list(
        &global.output,
        Category::all(),
        |c| CategoryRow::from(c),
        |c| c.slug.to_owned(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}

pub async fn handle(
    ctx: &CliContext,
    args: CategoriesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        CategoriesCommand::List => list(global),

        CategoriesCommand::Show { slug, page } => {
            let category = Category::require(&slug)?;
            ctx.require_admin()?;

            let bar = util::spinner(&format!("Loading {}", category.label), global);
            let result = ctx
                .controller
                .load_products_by_category(Some(category.slug))
                .await;
            bar.finish_and_clear();
            result?;

            let products = ctx.controller.category_products().data();
            let state = util::list_state(
                &products,
                ProductFilter::default(),
                page.search.as_deref(),
                &page,
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
                output::print_output(
                    &format!("{}: {}", category.label, util::page_footer(&view)),
                    global.quiet,
                );
            }
            Ok(())
        }
    }
}
