//! Cart commands.

use tracing::info;

use bazaar_core::ProductId;

use super::{CommandError, Context, report};

/// Print the cart with its price breakdown.
pub fn show(ctx: &Context) {
    let cart = ctx.shop.cart().snapshot();
    if cart.is_empty() {
        info!("Your cart is empty");
        return;
    }

    for item in cart.items() {
        info!(
            "{:<26} {:<40} {:>3} x {:>10} = {:>10}",
            item.product.id.as_str(),
            item.product.name,
            item.quantity,
            item.product.price.to_string(),
            item.line_total().to_string()
        );
    }

    let summary = ctx.checkout.summary();
    info!("");
    info!("Subtotal ({} items): {}", summary.item_count, summary.subtotal);
    if summary.free_shipping() {
        info!("Shipping: FREE");
    } else {
        info!("Shipping: {}", summary.shipping);
    }
    info!("Tax: {}", summary.tax);
    info!("Total: {}", summary.total);
}

/// Add a product, fetching a fresh snapshot from the backend.
///
/// # Errors
///
/// Returns an error if the product can't be fetched.
pub async fn add(ctx: &Context, id: &str, quantity: u32) -> Result<(), CommandError> {
    let product = ctx.client.product(&ProductId::new(id)).await?;
    report(&ctx.shop.add_to_cart(product, quantity));
    Ok(())
}

pub fn remove(ctx: &Context, id: &str) {
    report(&ctx.shop.remove_from_cart(&ProductId::new(id)));
}

pub fn set(ctx: &Context, id: &str, quantity: i64) {
    report(&ctx.shop.set_cart_quantity(&ProductId::new(id), quantity));
}

pub fn clear(ctx: &Context) {
    report(&ctx.shop.clear_cart());
}
