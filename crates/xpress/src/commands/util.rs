//! Shared helpers for command handlers.

use std::io::IsTerminal;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use xpress_core::{ListItem, ListState, ListView, SortDirection, SortSpec};

use crate::cli::{GlobalOpts, PageArgs};
use crate::error::CliError;

/// Prompt for confirmation, auto-approving if `--yes` was passed.
///
/// Without a terminal there is nobody to ask, so `--yes` becomes mandatory.
pub fn confirm(message: &str, action: &str, yes_flag: bool) -> Result<bool, CliError> {
    if yes_flag {
        return Ok(true);
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    let confirmed = dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(|e| CliError::Io(std::io::Error::other(e)))?;
    Ok(confirmed)
}

/// Parse a flag value through its `FromStr` impl.
pub fn parse_flag<T: FromStr>(field: &str, value: &str, expected: &str) -> Result<T, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: format!("'{value}' is not one of: {expected}"),
    })
}

pub fn parse_opt<T: FromStr>(
    field: &str,
    value: Option<&str>,
    expected: &str,
) -> Result<Option<T>, CliError> {
    value.map(|v| parse_flag(field, v, expected)).transpose()
}

/// Build list state from `--search/--sort/--desc/--page/--page-size/--all`.
pub fn list_state<T>(
    items: &[T],
    filter: T::Filter,
    search: Option<&str>,
    page: &PageArgs,
    default_page_size: usize,
    sort_keys: &str,
) -> Result<ListState<T>, CliError>
where
    T: ListItem,
    T::SortKey: FromStr,
{
    let page_size = if page.all {
        items.len().max(1)
    } else {
        page.page_size.unwrap_or(default_page_size)
    };

    let mut state = ListState::new(page_size);
    state.set_filter(filter);
    if let Some(search) = search {
        state.set_search(search);
    }
    if let Some(ref key) = page.sort {
        let key = parse_flag("sort", key, sort_keys)?;
        state.set_sort(Some(SortSpec {
            key,
            direction: if page.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        }));
    }
    state.go_to_page(page.page, usize::MAX);
    Ok(state)
}

/// Footer printed under a paged table.
pub fn page_footer<T>(view: &ListView<'_, T>) -> String {
    format!("{}  (page {} of {})", view.showing, view.page, view.total_pages)
}

/// Spinner on stderr while a request is in flight. Hidden when quiet or
/// when stderr is not a terminal.
pub fn spinner(message: &str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !std::io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.set_message(message.to_owned());
    bar.enable_steady_tick(Duration::from_millis(90));
    bar
}

/// Write CSV text to `path`.
pub fn write_export(path: &Path, body: &str) -> Result<(), CliError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body)?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use xpress_core::{Priority, Vendor, VendorFilter};

    use super::*;

    fn vendor(i: usize) -> Vendor {
        Vendor {
            id: format!("v{i}"),
            name: format!("Vendor {i:02}"),
            email: String::new(),
            phone: String::new(),
            location: "Accra".into(),
            company: None,
            website: None,
            notes: None,
            priority: Some(Priority::Low),
            is_active: true,
            category: None,
            date_published: None,
        }
    }

    fn page_args(page: usize, all: bool) -> PageArgs {
        PageArgs {
            search: None,
            sort: Some("name".into()),
            desc: true,
            page,
            page_size: Some(4),
            all,
        }
    }

    #[test]
    fn sort_and_page_from_flags() {
        let items: Vec<Vendor> = (1..=10).map(vendor).collect();
        let args = page_args(2, false);
        let state =
            list_state(&items, VendorFilter::default(), None, &args, 10, "name").unwrap();
        let view = state.view(&items);
        assert_eq!(view.page, 2);
        assert_eq!(view.rows[0].name, "Vendor 06");
        assert_eq!(view.showing, "Showing 5 to 8 of 10 entries");
    }

    #[test]
    fn all_flag_shows_everything() {
        let items: Vec<Vendor> = (1..=12).map(vendor).collect();
        let state =
            list_state(&items, VendorFilter::default(), None, &page_args(1, true), 10, "name")
                .unwrap();
        assert_eq!(state.view(&items).rows.len(), 12);
    }

    #[test]
    fn unknown_sort_key_is_rejected() {
        let items = vec![vendor(1)];
        let mut args = page_args(1, false);
        args.sort = Some("colour".into());
        let err = list_state::<Vendor>(&items, VendorFilter::default(), None, &args, 10, "name")
            .unwrap_err();
        assert!(matches!(err, CliError::Validation { .. }));
    }
}
