//! Wishlist commands.

use tracing::info;

use bazaar_core::ProductId;

use super::{CommandError, Context, report};

pub fn show(ctx: &Context) {
    let wishlist = ctx.shop.wishlist().snapshot();
    if wishlist.is_empty() {
        info!("Your wishlist is empty");
        return;
    }
    for product in wishlist.items() {
        info!(
            "{:<26} {:<40} {:>10}",
            product.id.as_str(),
            product.name,
            product.price.to_string()
        );
    }
}

/// Add a product, fetching a fresh snapshot from the backend.
///
/// # Errors
///
/// Returns an error if the product can't be fetched.
pub async fn add(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let product = ctx.client.product(&ProductId::new(id)).await?;
    report(&ctx.shop.add_to_wishlist(product));
    Ok(())
}

pub fn remove(ctx: &Context, id: &str) {
    report(&ctx.shop.remove_from_wishlist(&ProductId::new(id)));
}

/// Move a product from the wishlist into the cart.
///
/// # Errors
///
/// Returns `CommandError::NotFound` if the product isn't on the wishlist.
pub fn move_to_cart(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let id = ProductId::new(id);
    let notice = ctx
        .shop
        .move_to_cart(&id)
        .ok_or_else(|| CommandError::NotFound(format!("Product {id} is not on the wishlist")))?;
    report(&notice);
    Ok(())
}

pub fn clear(ctx: &Context) {
    report(&ctx.shop.clear_wishlist());
}
