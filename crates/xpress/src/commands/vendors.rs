//! Vendor command handlers.

use std::sync::Arc;

use tabled::Tabled;

use xpress_core::{
    Command as CoreCommand, DateRange, ListState, Priority, Vendor, VendorCounts, VendorFilter,
    VendorForm, VendorStatus, export,
};

use crate::cli::{
    GlobalOpts, OutputFormat, VendorFilterArgs, VendorInput, VendorsArgs, VendorsCommand,
};
use crate::error::CliError;
use crate::output;

use super::{CliContext, util};

const SORT_KEYS: &str = "id, name, email, phone, location, priority, status, date-published";
const PRIORITIES: &str = "low, medium, high, critical";
const STATUSES: &str = "active, inactive";

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct VendorRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Priority")]
    priority: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Date Published")]
    published: String,
}

impl VendorRow {
    fn new(v: &Vendor, color: bool) -> Self {
        Self {
            id: v.id.clone(),
            name: v.name.clone(),
            email: v.email.clone(),
            phone: v.phone.clone(),
            location: v.location.clone(),
            priority: v.priority.map(|p| p.to_string()).unwrap_or_default(),
            status: output::paint_vendor_status(v.status(), color),
            published: v.date_published.map(|d| d.to_string()).unwrap_or_default(),
        }
    }
}

fn vendor_filter(args: &VendorFilterArgs) -> Result<VendorFilter, CliError> {
    Ok(VendorFilter {
        location: args.location.clone(),
        priority: util::parse_opt::<Priority>("priority", args.priority.as_deref(), PRIORITIES)?,
        status: util::parse_opt::<VendorStatus>("status", args.status.as_deref(), STATUSES)?,
        published: DateRange::parse(
            args.from.as_deref().unwrap_or_default(),
            args.to.as_deref().unwrap_or_default(),
        ),
    })
}

fn apply_input(form: &mut VendorForm, input: VendorInput) -> Result<(), CliError> {
    let VendorInput {
        name,
        email,
        phone,
        location,
        company,
        website,
        notes,
        priority,
        active,
        category,
    } = input;

    for (slot, value) in [
        (&mut form.name, name),
        (&mut form.email, email),
        (&mut form.phone, phone),
        (&mut form.location, location),
        (&mut form.company, company),
        (&mut form.website, website),
        (&mut form.notes, notes),
        (&mut form.category, category),
    ] {
        if let Some(value) = value {
            *slot = value;
        }
    }
    if let Some(p) = util::parse_opt::<Priority>("priority", priority.as_deref(), PRIORITIES)? {
        form.priority = p;
    }
    if let Some(active) = active {
        form.is_active = active;
    }
    Ok(())
}

async fn fetch(ctx: &CliContext, global: &GlobalOpts) -> Result<Arc<Vec<Vendor>>, CliError> {
    let bar = util::spinner("Loading vendors", global);
    let result = ctx.controller.load_vendors().await;
    bar.finish_and_clear();
    result?;
    Ok(ctx.controller.vendors().data())
}

async fn execute(ctx: &CliContext, cmd: CoreCommand, global: &GlobalOpts) -> Result<(), CliError> {
    let success = cmd.success_message();
    let prefix = cmd.failure_prefix();
    ctx.controller
        .execute(cmd)
        .await
        .map_err(|e| ctx.auth_error(e).with_prefix(prefix))?;
    output::notice(success, global.quiet);
    Ok(())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    ctx: &CliContext,
    args: VendorsArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    ctx.require_admin()?;

    match args.command {
        VendorsCommand::List(list) => {
            let vendors = fetch(ctx, global).await?;
            let state = util::list_state(
                &vendors,
                vendor_filter(&list.filter)?,
                list.page.search.as_deref(),
                &list.page,
                ctx.page_size,
                SORT_KEYS,
            )?;
            let view = state.view(&vendors);
            let color = output::should_color(&global.color);

            let out = output::render_list(
                &global.output,
                &view.rows,
                |v| VendorRow::new(v, color),
                |v| v.id.clone(),
            )?;
            output::print_output(&out, global.quiet);

            if matches!(global.output, OutputFormat::Table) {
                let counts: VendorCounts = view.filtered.iter().copied().collect();
                output::print_output(
                    &format!(
                        "Active: {}  Inactive: {}\n{}",
                        counts.active,
                        counts.inactive,
                        util::page_footer(&view)
                    ),
                    global.quiet,
                );
            }
            Ok(())
        }

        VendorsCommand::Add(input) => {
            let mut form = VendorForm::default();
            apply_input(&mut form, input)?;
            let payload = form.validate()?;
            execute(ctx, CoreCommand::CreateVendor(payload), global).await
        }

        VendorsCommand::Edit { id, input } => {
            let vendors = fetch(ctx, global).await?;
            let current = vendors
                .iter()
                .find(|v| v.id == id)
                .ok_or_else(|| CliError::NotFound {
                    resource_type: "Vendor".into(),
                    identifier: id.clone(),
                    list_command: "vendors list".into(),
                })?;
            let mut form = VendorForm::from_vendor(current);
            apply_input(&mut form, input)?;
            let payload = form.validate()?;
            execute(ctx, CoreCommand::UpdateVendor { id, payload }, global).await
        }

        VendorsCommand::Delete { ids } => {
            let prompt = format!("Delete {} vendor(s)?", ids.len());
            if !util::confirm(&prompt, "vendors delete", global.yes)? {
                return Ok(());
            }
            for id in ids {
                execute(ctx, CoreCommand::DeleteVendor { id }, global).await?;
            }
            Ok(())
        }

        VendorsCommand::Export {
            filter,
            search,
            file,
        } => {
            let vendors = fetch(ctx, global).await?;
            let mut state = ListState::<Vendor>::new(vendors.len().max(1));
            state.set_filter(vendor_filter(&filter)?);
            if let Some(search) = search {
                state.set_search(search);
            }
            let view = state.view(&vendors);
            let csv = export::vendors_csv(view.filtered.iter().copied())?;
            util::write_export(&file, &csv)?;
            output::notice(
                &format!("Exported {} vendors to {}", view.filtered.len(), file.display()),
                global.quiet,
            );
            Ok(())
        }
    }
}
