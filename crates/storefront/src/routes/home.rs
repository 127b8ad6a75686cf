//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use bazaar_core::ProductQuery;
use bazaar_core::catalog::{fallback_categories, new_arrivals};

use super::PageChrome;
use super::products::{ProductCardView, placeholder_image};
use crate::filters;
use crate::state::AppState;

/// Products featured below the collections.
const FEATURED_LIMIT: usize = 8;

/// Category tile display data for templates.
#[derive(Clone)]
pub struct CategoryTileView {
    pub name: String,
    pub href: String,
    pub image: String,
}

/// New-arrivals collection display data for templates.
#[derive(Clone)]
pub struct CollectionView {
    pub name: &'static str,
    pub description: &'static str,
    pub href: String,
}

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: PageChrome,
    pub categories: Vec<CategoryTileView>,
    pub demo_categories: bool,
    pub collections: Vec<CollectionView>,
    pub featured: Vec<ProductCardView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> impl IntoResponse {
    let categories = state.client().categories().await;
    let demo_categories = categories == fallback_categories();

    let featured = match state.client().products(&ProductQuery::default()).await {
        Ok(mut products) => {
            products.truncate(FEATURED_LIMIT);
            ProductCardView::list(&products, &state)
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load featured products");
            Vec::new()
        }
    };

    HomeTemplate {
        chrome: PageChrome::gather(&state),
        categories: categories
            .into_iter()
            .map(|c| CategoryTileView {
                href: format!("/products?category={}", urlencoding::encode(&c.name)),
                image: c.image.unwrap_or_else(|| placeholder_image(&c.name)),
                name: c.name,
            })
            .collect(),
        demo_categories,
        collections: new_arrivals()
            .iter()
            .map(|c| CollectionView {
                name: c.name,
                description: c.description,
                href: format!("/products?arrivals={}", urlencoding::encode(c.name)),
            })
            .collect(),
        featured,
    }
}
