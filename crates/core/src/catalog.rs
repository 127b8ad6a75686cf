//! Products, categories and the client-side listing filters.
//!
//! The backend owns the catalog. The client narrows what it gets back by
//! category, minimum rating and price order, mirroring the listing page's
//! sidebar controls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::{CategoryId, Price, ProductId};

/// Number of related products shown on a product page.
pub const RELATED_PRODUCTS_LIMIT: usize = 4;

/// A product as served by the backend.
///
/// Only `_id` and `name` are mandatory; everything else falls back to an
/// empty default so one sloppy record doesn't break a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    #[serde(rename = "_id", alias = "id")]
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub price: Price,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "ratings", alias = "rating", default)]
    pub rating: f64,
    #[serde(rename = "reviewCount", default, skip_serializing_if = "Option::is_none")]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub stock: u32,
}

impl Product {
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }

    #[must_use]
    pub fn stars(&self) -> StarRating {
        StarRating::from_rating(self.rating)
    }

    /// Review count shown next to the stars, falling back to the rating.
    #[must_use]
    pub fn review_label(&self) -> String {
        self.review_count
            .map_or_else(|| self.rating.to_string(), |count| count.to_string())
    }
}

/// Payload for `POST /products`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub category: String,
    #[serde(rename = "ratings")]
    pub rating: f64,
    pub stock: u32,
}

/// Five-star breakdown of a numeric rating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StarRating {
    pub full: u8,
    pub half: bool,
    pub empty: u8,
}

impl StarRating {
    /// Split a 0–5 rating into full, half and empty stars.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_rating(rating: f64) -> Self {
        let rating = if rating.is_finite() {
            rating.clamp(0.0, 5.0)
        } else {
            0.0
        };
        let full = rating.floor() as u8;
        let half = full < 5 && rating.fract() >= 0.5;
        let empty = 5 - full - u8::from(half);
        Self { full, half, empty }
    }
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Categories shown when the backend can't provide any.
#[must_use]
pub fn fallback_categories() -> Vec<Category> {
    [
        "Electronics",
        "Clothing",
        "Books",
        "Home & Garden",
        "Sports",
        "Beauty",
    ]
    .iter()
    .enumerate()
    .map(|(idx, name)| Category {
        id: CategoryId::new((idx + 1).to_string()),
        name: (*name).to_string(),
        image: None,
    })
    .collect()
}

/// Interpret a `/categories` response of unknown shape.
///
/// Accepts a bare array, `{ "categories": [...] }` or `{ "data": [...] }`.
/// Entries that don't parse are skipped. Any other shape yields `None`, and
/// callers fall back to [`fallback_categories`].
#[must_use]
pub fn coerce_categories(value: Value) -> Option<Vec<Category>> {
    let entries = match value {
        Value::Array(entries) => entries,
        Value::Object(mut map) => match (map.remove("categories"), map.remove("data")) {
            (Some(Value::Array(entries)), _) | (_, Some(Value::Array(entries))) => entries,
            _ => return None,
        },
        _ => return None,
    };

    Some(
        entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
    )
}

/// Parse a product list, dropping entries that don't match the schema.
#[must_use]
pub fn coerce_products(value: Value) -> Vec<Product> {
    match value {
        Value::Array(entries) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        Value::Object(mut map) => map
            .remove("products")
            .or_else(|| map.remove("data"))
            .map_or_else(Vec::new, coerce_products),
        _ => Vec::new(),
    }
}

/// Price ordering for the listing page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    LowToHigh,
    HighToLow,
}

impl SortOrder {
    /// Parse the `sort` query value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "lowtohigh" => Some(Self::LowToHigh),
            "hightolow" => Some(Self::HighToLow),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::LowToHigh => "lowtohigh",
            Self::HighToLow => "hightolow",
        }
    }

    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::LowToHigh => "Low to High",
            Self::HighToLow => "High to Low",
        }
    }
}

/// Server-side listing parameters for `GET /products`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ProductQuery {
    pub search: Option<String>,
    pub category: Option<String>,
    pub arrivals: Option<String>,
}

impl ProductQuery {
    /// Non-empty parameters as query pairs.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("search", self.search.as_deref()),
            ("category", self.category.as_deref()),
            ("arrivals", self.arrivals.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.filter(|v| !v.is_empty()).map(|v| (key, v)))
        .collect()
    }

    /// Products in one category, used for the related-products strip.
    #[must_use]
    pub fn in_category(category: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            ..Self::default()
        }
    }
}

/// Client-side narrowing applied on top of the server's answer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductFilter {
    pub categories: Vec<String>,
    pub min_rating: Option<f64>,
    pub sort: Option<SortOrder>,
}

impl ProductFilter {
    /// Filter and sort a product list.
    #[must_use]
    pub fn apply(&self, mut products: Vec<Product>) -> Vec<Product> {
        if !self.categories.is_empty() {
            products.retain(|p| self.categories.iter().any(|c| *c == p.category));
        }
        if let Some(min) = self.min_rating {
            products.retain(|p| p.rating >= min);
        }
        match self.sort {
            Some(SortOrder::LowToHigh) => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Some(SortOrder::HighToLow) => products.sort_by(|a, b| b.price.cmp(&a.price)),
            None => {}
        }
        products
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.categories.is_empty() || self.min_rating.is_some() || self.sort.is_some()
    }
}

/// Split a comma-separated category parameter, keeping only known names.
#[must_use]
pub fn known_categories(param: &str, categories: &[Category]) -> Vec<String> {
    param
        .split(',')
        .map(str::trim)
        .filter(|name| categories.iter().any(|c| c.name == *name))
        .map(ToString::to_string)
        .collect()
}

/// Up to [`RELATED_PRODUCTS_LIMIT`] other products from the same category.
#[must_use]
pub fn related_products(current: &Product, candidates: Vec<Product>) -> Vec<Product> {
    candidates
        .into_iter()
        .filter(|p| p.id != current.id && p.category == current.category)
        .take(RELATED_PRODUCTS_LIMIT)
        .collect()
}

/// A curated collection featured on the home page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    pub name: &'static str,
    pub description: &'static str,
}

/// The home page's "new arrivals" collections.
#[must_use]
pub const fn new_arrivals() -> &'static [Collection] {
    &[
        Collection {
            name: "Summer Collection",
            description: "Fresh styles for the season",
        },
        Collection {
            name: "Winter Specials",
            description: "Cozy winter essentials",
        },
        Collection {
            name: "Limited Edition",
            description: "Exclusive items",
        },
        Collection {
            name: "Bestsellers",
            description: "Customer favorites",
        },
    ]
}
