//! Bazaar CLI - headless client over the storefront's stores.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! bazaar products --category Books --sort lowtohigh
//! bazaar product 66b1f0c2a9d3e4f5a6b7c8d9
//!
//! # Fill the cart and check out
//! bazaar cart add 66b1f0c2a9d3e4f5a6b7c8d9 --quantity 2
//! bazaar address add --full-name "Ada Lovelace" --street "1 Analytical Way" \
//!     --city London --state LDN --zip-code N1 --country UK --phone 555-0100
//! bazaar checkout
//!
//! # Order history
//! bazaar orders
//! ```
//!
//! State is shared with the storefront server when both point at the same
//! `BAZAAR_DATA_DIR`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rust_decimal::Decimal;

use bazaar_storefront::config::DEFAULT_DEMO_USER_ID;

mod commands;

#[derive(Parser)]
#[command(name = "bazaar")]
#[command(author, version, about = "Bazaar storefront command-line client")]
struct Cli {
    /// Base URL of the REST backend
    #[arg(long, env = "BAZAAR_API_URL")]
    api_url: String,

    /// Directory holding the persisted cart, wishlist, addresses and orders
    #[arg(long, env = "BAZAAR_DATA_DIR", default_value = ".bazaar")]
    data_dir: PathBuf,

    /// User attached to placed orders
    #[arg(long, env = "BAZAAR_DEMO_USER_ID", default_value = DEFAULT_DEMO_USER_ID)]
    user_id: String,

    /// Seconds before the simulated payment update runs
    #[arg(long, env = "BAZAAR_ORDER_STATUS_DELAY_SECS", default_value_t = 5)]
    status_delay_secs: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List products
    Products(ListingArgs),
    /// Show one product
    Product {
        /// Product ID
        id: String,
    },
    /// Create a product on the backend
    CreateProduct(NewProductArgs),
    /// List categories
    Categories,
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Manage delivery addresses
    Address {
        #[command(subcommand)]
        action: AddressAction,
    },
    /// Place an order for the cart
    ///
    /// Stays until the simulated payment update has been sent and recorded
    /// locally. With `--no-wait` the command exits right after the order is
    /// placed and that update never runs.
    Checkout {
        /// Exit once the order is placed, skipping the payment update
        #[arg(long)]
        no_wait: bool,
    },
    /// List orders
    Orders {
        /// Show the local order history instead of asking the backend
        #[arg(long)]
        local: bool,
    },
}

#[derive(Args)]
struct ListingArgs {
    /// Free-text search
    #[arg(short, long)]
    search: Option<String>,
    /// Category, or a comma-separated list of categories
    #[arg(short, long)]
    category: Option<String>,
    /// New-arrivals collection
    #[arg(long)]
    arrivals: Option<String>,
    /// Minimum rating
    #[arg(long)]
    rating: Option<f64>,
    /// Price sort (`lowtohigh` or `hightolow`)
    #[arg(long)]
    sort: Option<String>,
}

#[derive(Args)]
struct NewProductArgs {
    #[arg(long)]
    name: String,
    #[arg(long, default_value = "")]
    description: String,
    #[arg(long)]
    price: Decimal,
    #[arg(long)]
    image: Option<String>,
    #[arg(long)]
    category: String,
    #[arg(long, default_value_t = 0.0)]
    rating: f64,
    #[arg(long, default_value_t = 0)]
    stock: u32,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its price breakdown
    Show,
    /// Add a product
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a product
    Remove { id: String },
    /// Set a product's quantity (0 or less removes it)
    Set {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a product
    Add { id: String },
    /// Remove a product
    Remove { id: String },
    /// Move a product into the cart
    Move { id: String },
    /// Empty the wishlist
    Clear,
}

#[derive(Subcommand)]
enum AddressAction {
    /// List saved addresses
    List,
    /// Add an address
    Add(AddressArgs),
    /// Delete an address
    Remove { id: String },
    /// Use an address for checkout
    Select { id: String },
    /// Make an address the default
    Default { id: String },
}

#[derive(Args)]
struct AddressArgs {
    #[arg(long)]
    full_name: String,
    #[arg(long)]
    street: String,
    #[arg(long)]
    city: String,
    #[arg(long)]
    state: String,
    #[arg(long)]
    zip_code: String,
    #[arg(long)]
    country: String,
    #[arg(long)]
    phone: String,
    /// Make this the default address
    #[arg(long)]
    default: bool,
}

#[tokio::main]
async fn main() {
    // Load .env before clap reads the environment
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    let ctx = commands::Context::new(
        &cli.api_url,
        &cli.data_dir,
        &cli.user_id,
        std::time::Duration::from_secs(cli.status_delay_secs),
    )?;

    match cli.command {
        Commands::Products(args) => {
            commands::catalog::products(
                &ctx,
                commands::catalog::Listing {
                    search: args.search,
                    category: args.category,
                    arrivals: args.arrivals,
                    rating: args.rating,
                    sort: args.sort,
                },
            )
            .await?;
        }
        Commands::Product { id } => commands::catalog::product(&ctx, &id).await?,
        Commands::CreateProduct(args) => {
            commands::catalog::create_product(
                &ctx,
                bazaar_core::catalog::NewProduct {
                    name: args.name,
                    description: args.description,
                    price: args.price.into(),
                    image: args.image,
                    category: args.category,
                    rating: args.rating,
                    stock: args.stock,
                },
            )
            .await?;
        }
        Commands::Categories => commands::catalog::categories(&ctx).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&ctx),
            CartAction::Add { id, quantity } => commands::cart::add(&ctx, &id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, &id),
            CartAction::Set { id, quantity } => commands::cart::set(&ctx, &id, quantity),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => commands::wishlist::show(&ctx),
            WishlistAction::Add { id } => commands::wishlist::add(&ctx, &id).await?,
            WishlistAction::Remove { id } => commands::wishlist::remove(&ctx, &id),
            WishlistAction::Move { id } => commands::wishlist::move_to_cart(&ctx, &id)?,
            WishlistAction::Clear => commands::wishlist::clear(&ctx),
        },
        Commands::Address { action } => match action {
            AddressAction::List => commands::address::list(&ctx),
            AddressAction::Add(args) => commands::address::add(
                &ctx,
                bazaar_core::AddressInput {
                    full_name: args.full_name,
                    street: args.street,
                    city: args.city,
                    state: args.state,
                    zip_code: args.zip_code,
                    country: args.country,
                    phone: args.phone,
                    is_default: args.default,
                },
            )?,
            AddressAction::Remove { id } => commands::address::remove(&ctx, &id)?,
            AddressAction::Select { id } => commands::address::select(&ctx, &id)?,
            AddressAction::Default { id } => commands::address::set_default(&ctx, &id)?,
        },
        Commands::Checkout { no_wait } => commands::orders::checkout(&ctx, !no_wait).await?,
        Commands::Orders { local } => commands::orders::list(&ctx, local).await?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkout_waits(extra: &[&str]) -> bool {
        let args = ["bazaar", "--api-url", "http://localhost:4000/api", "checkout"]
            .into_iter()
            .chain(extra.iter().copied());
        match Cli::try_parse_from(args).map(|cli| cli.command) {
            Ok(Commands::Checkout { no_wait }) => !no_wait,
            Ok(_) => panic!("expected the checkout command"),
            Err(e) => panic!("{e}"),
        }
    }

    #[test]
    fn test_checkout_waits_for_status_update_by_default() {
        assert!(checkout_waits(&[]));
    }

    #[test]
    fn test_checkout_no_wait_opts_out() {
        assert!(!checkout_waits(&["--no-wait"]));
    }
}
