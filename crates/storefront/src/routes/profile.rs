//! Profile page: the demo shopper and their order history.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use bazaar_core::{Order, OrderHistory};

use super::PageChrome;
use super::addresses::AddressView;
use crate::filters;
use crate::state::AppState;

/// The static demo shopper.
#[derive(Clone)]
pub struct DemoUser {
    pub id: String,
    pub name: &'static str,
    pub email: &'static str,
    pub phone: &'static str,
    pub avatar: &'static str,
}

/// Order row display data for templates.
#[derive(Clone)]
pub struct OrderView {
    pub id: String,
    pub short_id: String,
    pub placed_on: String,
    pub item_count: u32,
    pub total: String,
    pub status: String,
    pub status_badge: &'static str,
    pub payment_status: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.to_string(),
            short_id: order.id.short().to_string(),
            placed_on: order
                .created_at
                .map_or_else(|| "-".to_string(), |at| at.format("%b %-d, %Y").to_string()),
            item_count: order.item_count(),
            total: order.total_amount.to_string(),
            status: order.status.to_string(),
            status_badge: order.status.badge(),
            payment_status: order.payment_status.to_string(),
        }
    }
}

/// Profile page template.
#[derive(Template, WebTemplate)]
#[template(path = "profile.html")]
pub struct ProfileTemplate {
    pub chrome: PageChrome,
    pub user: DemoUser,
    pub default_address: Option<AddressView>,
    pub orders: Vec<OrderView>,
    /// Set when the backend couldn't be reached and the local copy is shown.
    pub orders_error: Option<String>,
}

/// Display the profile page.
///
/// Orders come from the backend; when that fails the locally mirrored
/// history is shown with an inline error.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>) -> impl IntoResponse {
    let (orders, orders_error) = match state.client().orders().await {
        Ok(orders) => (orders, None),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch orders, showing local history");
            (
                state.shop().orders().read(OrderHistory::newest_first),
                Some(format!("Could not load orders: {}", e.user_message())),
            )
        }
    };

    let default_address = state.shop().addresses().read(|book| {
        book.default_address()
            .map(|a| AddressView::new(a, book.selected_id()))
    });

    ProfileTemplate {
        chrome: PageChrome::gather(&state),
        user: DemoUser {
            id: state.config().demo_user_id.to_string(),
            name: "John Doe",
            email: "john.doe@example.com",
            phone: "+1 (555) 123-4567",
            avatar: "https://placehold.co/100x100",
        },
        default_address,
        orders: orders.iter().map(OrderView::from).collect(),
        orders_error,
    }
}
