//! Catalog commands: listing, detail, categories.

use tracing::info;

use bazaar_core::catalog::{NewProduct, known_categories};
use bazaar_core::{Product, ProductFilter, ProductId, ProductQuery, SortOrder};

use super::{CommandError, Context};

/// Listing options as given on the command line.
#[derive(Debug, Default)]
pub struct Listing {
    pub search: Option<String>,
    pub category: Option<String>,
    pub arrivals: Option<String>,
    pub rating: Option<f64>,
    pub sort: Option<String>,
}

fn print_product(product: &Product) {
    info!(
        "{:<26} {:<40} {:>10}  {:<14} {}",
        product.id.as_str(),
        product.name,
        product.price.to_string(),
        product.category,
        product.review_label()
    );
}

/// List products, applying client-side filters on top of the backend query.
///
/// # Errors
///
/// Returns an error if the backend can't be reached.
pub async fn products(ctx: &Context, listing: Listing) -> Result<(), CommandError> {
    let categories = ctx.client.categories().await;
    let selected = listing
        .category
        .as_deref()
        .map(|param| known_categories(param, &categories))
        .unwrap_or_default();

    let query = ProductQuery {
        search: listing.search.filter(|s| !s.trim().is_empty()),
        category: match selected.as_slice() {
            [only] => Some(only.clone()),
            _ => None,
        },
        arrivals: listing.arrivals,
    };
    let filter = ProductFilter {
        categories: selected,
        min_rating: listing.rating.filter(|r| *r > 0.0),
        sort: listing.sort.as_deref().and_then(SortOrder::parse),
    };

    let products = filter.apply(ctx.client.products(&query).await?);
    if products.is_empty() {
        info!("No products match");
        return Ok(());
    }
    for product in &products {
        print_product(product);
    }
    info!("{} products", products.len());
    Ok(())
}

/// Show one product.
///
/// # Errors
///
/// Returns an error if the product doesn't exist or the backend can't be
/// reached.
pub async fn product(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let product = ctx.client.product(&ProductId::new(id)).await?;
    info!("{}", product.name);
    info!("  Category: {}", product.category);
    info!("  Price:    {}", product.price);
    info!("  Rating:   {}", product.review_label());
    if product.in_stock() {
        info!("  Stock:    {}", product.stock);
    } else {
        info!("  Stock:    out of stock");
    }
    if !product.description.is_empty() {
        info!("");
        info!("{}", product.description);
    }
    Ok(())
}

/// Create a product on the backend.
///
/// # Errors
///
/// Returns an error if the backend rejects the product.
pub async fn create_product(ctx: &Context, product: NewProduct) -> Result<(), CommandError> {
    let created = ctx.client.create_product(&product).await?;
    info!("Created product {}", created.id);
    print_product(&created);
    Ok(())
}

/// List categories. Falls back to the built-in list when the backend is down.
pub async fn categories(ctx: &Context) {
    for category in ctx.client.categories().await {
        info!("{}", category.name);
    }
}
