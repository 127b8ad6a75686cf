//! Checkout and order history commands.

use tracing::{info, warn};

use bazaar_core::{Order, OrderHistory};
use bazaar_storefront::services::StatusSync;

use super::{CommandError, Context};

fn print_order(order: &Order) {
    info!(
        "#{}  {}  {:>3} items  {:>10}  {:<10} {}",
        order.id.short(),
        order
            .created_at
            .map_or_else(|| "-".to_string(), |at| at.format("%Y-%m-%d").to_string()),
        order.item_count(),
        order.total_amount.to_string(),
        order.status.to_string(),
        order.payment_status
    );
}

/// Place an order for the cart.
///
/// With `wait`, stays around until the simulated payment update has run so
/// the local history reflects it. Without it the update task is dropped when
/// the process exits.
///
/// # Errors
///
/// Returns `CommandError::Checkout` if the cart is empty, no address is
/// selected or the backend rejects the order.
pub async fn checkout(ctx: &Context, wait: bool) -> Result<(), CommandError> {
    let placed = ctx.checkout.place_order().await?;
    info!("Order placed successfully!");
    print_order(&placed.order);

    if !wait {
        return Ok(());
    }

    info!("Waiting for payment confirmation...");
    match placed.status_update.await {
        Ok(StatusSync::Synced) => info!("Payment confirmed, order is processing"),
        Ok(StatusSync::LocalOnly) => {
            warn!("Backend did not accept the status update; local history updated");
        }
        Err(e) => warn!(error = %e, "Status update task did not finish"),
    }
    if let Some(order) = ctx.shop.orders().read(|history| history.get(&placed.order.id).cloned()) {
        print_order(&order);
    }
    Ok(())
}

/// List orders from the backend, or the local history with `local`.
///
/// # Errors
///
/// Returns an error if the backend can't be reached.
pub async fn list(ctx: &Context, local: bool) -> Result<(), CommandError> {
    let orders = if local {
        ctx.shop.orders().read(OrderHistory::newest_first)
    } else {
        ctx.client.orders().await?
    };

    if orders.is_empty() {
        info!("No orders yet");
        return Ok(());
    }
    for order in &orders {
        print_order(order);
    }
    Ok(())
}
