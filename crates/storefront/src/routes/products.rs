//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::catalog::{known_categories, related_products};
use bazaar_core::{Category, Product, ProductFilter, ProductId, ProductQuery, SortOrder};

use super::PageChrome;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Image shown when a product or category has none.
#[must_use]
pub fn placeholder_image(label: &str) -> String {
    format!(
        "https://placehold.co/500x500/4a6cf7/ffffff?text={}",
        urlencoding::encode(label)
    )
}

/// Star icons for a rating: `full`, `half` or `empty`, five in total.
fn star_classes(product: &Product) -> Vec<&'static str> {
    let stars = product.stars();
    std::iter::repeat_n("full", usize::from(stars.full))
        .chain(stars.half.then_some("half"))
        .chain(std::iter::repeat_n("empty", usize::from(stars.empty)))
        .collect()
}

/// Product card display data for templates.
#[derive(Clone)]
pub struct ProductCardView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub category: String,
    pub category_href: String,
    pub price: String,
    pub image: String,
    pub stars: Vec<&'static str>,
    pub review_label: String,
    pub in_stock: bool,
    pub in_cart: bool,
    pub in_wishlist: bool,
}

impl ProductCardView {
    /// Build a card, marking whether the shopper already holds the product.
    #[must_use]
    pub fn new(product: &Product, state: &AppState) -> Self {
        let shop = state.shop();
        Self {
            id: product.id.to_string(),
            href: format!("/products/{}", urlencoding::encode(product.id.as_str())),
            name: product.name.clone(),
            category: product.category.clone(),
            category_href: format!(
                "/products?category={}",
                urlencoding::encode(&product.category)
            ),
            price: product.price.to_string(),
            image: product
                .image
                .clone()
                .unwrap_or_else(|| placeholder_image(&product.name)),
            stars: star_classes(product),
            review_label: product.review_label(),
            in_stock: product.in_stock(),
            in_cart: shop.cart().read(|cart| cart.contains(&product.id)),
            in_wishlist: shop
                .wishlist()
                .read(|wishlist| wishlist.contains(&product.id)),
        }
    }

    #[must_use]
    pub fn list(products: &[Product], state: &AppState) -> Vec<Self> {
        products.iter().map(|p| Self::new(p, state)).collect()
    }
}

/// Product detail display data for templates.
#[derive(Clone)]
pub struct ProductDetailView {
    pub card: ProductCardView,
    pub description: String,
    pub stock: u32,
    pub cart_quantity: u32,
}

/// Sidebar category checkbox.
#[derive(Clone)]
pub struct CategoryOption {
    pub name: String,
    pub checked: bool,
}

/// Minimum-rating radio option.
#[derive(Clone)]
pub struct RatingOption {
    pub value: u8,
    pub checked: bool,
}

/// Sort dropdown option.
#[derive(Clone)]
pub struct SortOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Listing query parameters.
///
/// `category` may hold a comma-separated list; a single category is also
/// sent to the backend.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub arrivals: Option<String>,
    pub rating: Option<f64>,
    pub sort: Option<String>,
}

impl ListingQuery {
    /// Split into the backend query and the client-side filter.
    fn split(&self, categories: &[Category]) -> (ProductQuery, ProductFilter) {
        let selected = self
            .category
            .as_deref()
            .map(|param| known_categories(param, categories))
            .unwrap_or_default();

        let query = ProductQuery {
            search: self.search.clone().filter(|s| !s.trim().is_empty()),
            category: match selected.as_slice() {
                [only] => Some(only.clone()),
                _ => None,
            },
            arrivals: self.arrivals.clone().filter(|a| !a.is_empty()),
        };
        let filter = ProductFilter {
            categories: selected,
            min_rating: self.rating.filter(|r| *r > 0.0),
            sort: self.sort.as_deref().and_then(SortOrder::parse),
        };
        (query, filter)
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductCardView>,
    pub categories: Vec<CategoryOption>,
    pub ratings: Vec<RatingOption>,
    pub sorts: Vec<SortOption>,
    pub search: String,
    pub arrivals: Option<String>,
    pub filters_active: bool,
    pub error: Option<String>,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: PageChrome,
    pub product: ProductDetailView,
    pub related_products: Vec<ProductCardView>,
}

/// Display product listing page.
///
/// Backend failures render an empty listing with an inline error.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(params): Query<ListingQuery>,
) -> impl IntoResponse {
    let categories = state.client().categories().await;
    let (query, filter) = params.split(&categories);

    let (products, error) = match state.client().products(&query).await {
        Ok(products) => (filter.apply(products), None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load products");
            (Vec::new(), Some(e.user_message()))
        }
    };

    let min_rating = filter.min_rating.unwrap_or(0.0);
    ProductsIndexTemplate {
        chrome: PageChrome::gather(&state),
        products: ProductCardView::list(&products, &state),
        categories: categories
            .iter()
            .map(|c| CategoryOption {
                name: c.name.clone(),
                checked: filter.categories.contains(&c.name),
            })
            .collect(),
        ratings: (1..=4u8)
            .rev()
            .map(|value| RatingOption {
                value,
                checked: (f64::from(value) - min_rating).abs() < f64::EPSILON,
            })
            .collect(),
        sorts: [SortOrder::LowToHigh, SortOrder::HighToLow]
            .into_iter()
            .map(|s| SortOption {
                value: s.as_str(),
                label: s.label(),
                selected: filter.sort == Some(s),
            })
            .collect(),
        search: query.search.clone().unwrap_or_default(),
        arrivals: query.arrivals.clone(),
        filters_active: filter.is_active(),
        error,
    }
}

/// Display product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse> {
    let product = state.client().product(&ProductId::new(id)).await?;

    // Related products are best-effort
    let related = match state
        .client()
        .products(&ProductQuery::in_category(&product.category))
        .await
    {
        Ok(candidates) => related_products(&product, candidates),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load related products");
            Vec::new()
        }
    };

    let cart_quantity = state
        .shop()
        .cart()
        .read(|cart| cart.get(&product.id).map_or(0, |item| item.quantity));

    Ok(ProductShowTemplate {
        chrome: PageChrome::gather(&state),
        product: ProductDetailView {
            card: ProductCardView::new(&product, &state),
            description: product.description.clone(),
            stock: product.stock,
            cart_quantity,
        },
        related_products: ProductCardView::list(&related, &state),
    })
}

#[cfg(test)]
mod tests {
    use bazaar_core::catalog::fallback_categories;

    use super::*;

    #[test]
    fn test_single_category_goes_to_backend() {
        let params = ListingQuery {
            category: Some("Books".to_string()),
            ..ListingQuery::default()
        };
        let (query, filter) = params.split(&fallback_categories());
        assert_eq!(query.category.as_deref(), Some("Books"));
        assert_eq!(filter.categories, ["Books"]);
    }

    #[test]
    fn test_multiple_categories_filter_client_side() {
        let params = ListingQuery {
            category: Some("Books,Sports,Unknown".to_string()),
            sort: Some("hightolow".to_string()),
            rating: Some(3.0),
            ..ListingQuery::default()
        };
        let (query, filter) = params.split(&fallback_categories());
        assert_eq!(query.category, None);
        assert_eq!(filter.categories, ["Books", "Sports"]);
        assert_eq!(filter.sort, Some(SortOrder::HighToLow));
        assert_eq!(filter.min_rating, Some(3.0));
    }

    #[test]
    fn test_blank_search_is_dropped() {
        let params = ListingQuery {
            search: Some("  ".to_string()),
            ..ListingQuery::default()
        };
        let (query, _) = params.split(&fallback_categories());
        assert_eq!(query.search, None);
    }

    #[test]
    fn test_placeholder_image_encodes_label() {
        assert_eq!(
            placeholder_image("Home & Garden"),
            "https://placehold.co/500x500/4a6cf7/ffffff?text=Home%20%26%20Garden"
        );
    }
}
