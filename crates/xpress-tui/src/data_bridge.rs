//! Data bridge: forwards [`Controller`] resource changes to TUI actions.
//!
//! Runs as a background task. Every change to the vendor, user and
//! category-product resources and every cache invalidation becomes an
//! [`Action`] on the TUI's action channel, until cancelled.

use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use xpress_core::Controller;

use crate::action::Action;

pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    cancel: CancellationToken,
) {
    let mut vendors = controller.vendors().subscribe();
    let mut users = controller.users().subscribe();
    let mut category = controller.category_products().subscribe();
    let mut invalidations = controller.invalidations();

    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Ok(()) = vendors.changed() => {
                let state = vendors.borrow_and_update().clone();
                let _ = action_tx.send(Action::VendorsUpdated(state));
            }
            Ok(()) = users.changed() => {
                let state = users.borrow_and_update().clone();
                let _ = action_tx.send(Action::UsersUpdated(state));
            }
            Ok(()) = category.changed() => {
                let state = category.borrow_and_update().clone();
                let _ = action_tx.send(Action::CategoryProductsUpdated(state));
            }
            result = invalidations.recv() => match result {
                Ok(stale) => {
                    debug!(%stale, "cache invalidated");
                    let _ = action_tx.send(Action::Invalidated(stale));
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "invalidation stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
        }
    }

    debug!("data bridge shut down");
}
