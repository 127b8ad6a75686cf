//! Address book route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{Address, AddressError, AddressId, AddressInput, AddressUpdate};

use super::{PageChrome, redirect_back};
use crate::error::{AppError, Result};
use crate::filters;
use crate::state::AppState;

/// Address display data for templates.
#[derive(Clone)]
pub struct AddressView {
    pub id: String,
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    pub is_default: bool,
    pub is_selected: bool,
}

impl AddressView {
    #[must_use]
    pub fn new(address: &Address, selected: Option<&AddressId>) -> Self {
        Self {
            id: address.id.to_string(),
            full_name: address.full_name.clone(),
            street: address.street.clone(),
            city: address.city.clone(),
            state: address.state.clone(),
            zip_code: address.zip_code.clone(),
            country: address.country.clone(),
            phone: address.phone.clone(),
            is_default: address.is_default,
            is_selected: selected == Some(&address.id),
        }
    }

    /// Every saved address, marking the one checkout will use.
    #[must_use]
    pub fn gather(state: &AppState) -> Vec<Self> {
        state.shop().addresses().read(|book| {
            let selected = book.selected().map(|a| a.id.clone());
            book.addresses()
                .iter()
                .map(|a| Self::new(a, selected.as_ref()))
                .collect()
        })
    }
}

/// Address form data.
///
/// Checkboxes are only submitted when ticked.
#[derive(Debug, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub phone: String,
    pub is_default: Option<String>,
    pub return_to: Option<String>,
}

impl AddressForm {
    fn input(&self) -> AddressInput {
        AddressInput {
            full_name: self.full_name.trim().to_string(),
            street: self.street.trim().to_string(),
            city: self.city.trim().to_string(),
            state: self.state.trim().to_string(),
            zip_code: self.zip_code.trim().to_string(),
            country: self.country.trim().to_string(),
            phone: self.phone.trim().to_string(),
            is_default: self.is_default.is_some(),
        }
    }
}

/// Form action target carried back to the shopper.
#[derive(Debug, Default, Deserialize)]
pub struct ReturnTo {
    pub return_to: Option<String>,
}

/// Address book template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/index.html")]
pub struct AddressesIndexTemplate {
    pub chrome: PageChrome,
    pub addresses: Vec<AddressView>,
}

/// Add/edit address form template.
#[derive(Template, WebTemplate)]
#[template(path = "addresses/form.html")]
pub struct AddressFormTemplate {
    pub chrome: PageChrome,
    pub action: String,
    pub title: &'static str,
    pub form: AddressView,
    pub error: Option<String>,
    pub return_to: String,
}

impl AddressFormTemplate {
    fn blank(state: &AppState, return_to: Option<String>) -> Self {
        Self {
            chrome: PageChrome::gather(state),
            action: "/addresses".to_string(),
            title: "Add New Address",
            form: AddressView::new(
                &Address {
                    id: AddressId::new(""),
                    full_name: String::new(),
                    street: String::new(),
                    city: String::new(),
                    state: String::new(),
                    zip_code: String::new(),
                    country: String::new(),
                    phone: String::new(),
                    is_default: false,
                },
                None,
            ),
            error: None,
            return_to: return_to.unwrap_or_default(),
        }
    }

    /// Re-render a rejected submission with the shopper's input intact.
    fn rejected(
        state: &AppState,
        action: String,
        title: &'static str,
        form: &AddressForm,
        error: &AddressError,
    ) -> Response {
        let input = form.input();
        let view = AddressView {
            id: String::new(),
            full_name: input.full_name,
            street: input.street,
            city: input.city,
            state: input.state,
            zip_code: input.zip_code,
            country: input.country,
            phone: input.phone,
            is_default: input.is_default,
            is_selected: false,
        };
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Self {
                chrome: PageChrome::gather(state),
                action,
                title,
                form: view,
                error: Some(error.to_string()),
                return_to: form.return_to.clone().unwrap_or_default(),
            },
        )
            .into_response()
    }
}

/// Display the address book.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    AddressesIndexTemplate {
        addresses: AddressView::gather(&state),
        chrome: PageChrome::gather(&state),
    }
}

/// Display the new address form.
#[instrument(skip(state))]
pub async fn new_address(
    State(state): State<AppState>,
    Query(query): Query<ReturnTo>,
) -> impl IntoResponse {
    AddressFormTemplate::blank(&state, query.return_to)
}

/// Create an address.
#[instrument(skip(state))]
pub async fn create(State(state): State<AppState>, Form(form): Form<AddressForm>) -> Response {
    let input = form.input();
    if let Err(e) = input.validate() {
        return AddressFormTemplate::rejected(
            &state,
            "/addresses".to_string(),
            "Add New Address",
            &form,
            &e,
        );
    }

    let address = state.shop().add_address(input);
    tracing::info!(address_id = %address.id, "Address added");
    redirect_back(form.return_to.as_deref(), "/addresses").into_response()
}

/// Display the edit form for an address.
#[instrument(skip(state))]
pub async fn edit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<ReturnTo>,
) -> Result<impl IntoResponse> {
    let id = AddressId::new(id);
    let address = state
        .shop()
        .addresses()
        .read(|book| book.get(&id).cloned())
        .ok_or_else(|| AppError::NotFound(format!("Address {id}")))?;

    Ok(AddressFormTemplate {
        chrome: PageChrome::gather(&state),
        action: format!("/addresses/{}", urlencoding::encode(id.as_str())),
        title: "Edit Address",
        form: AddressView::new(&address, None),
        error: None,
        return_to: query.return_to.unwrap_or_default(),
    })
}

/// Update an address.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<AddressForm>,
) -> Result<Response> {
    let id = AddressId::new(id);
    let input = form.input();
    if let Err(e) = input.validate() {
        return Ok(AddressFormTemplate::rejected(
            &state,
            format!("/addresses/{}", urlencoding::encode(id.as_str())),
            "Edit Address",
            &form,
            &e,
        ));
    }

    state
        .shop()
        .update_address(&id, AddressUpdate::from(input))?;
    Ok(redirect_back(form.return_to.as_deref(), "/addresses").into_response())
}

/// Delete an address.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ReturnTo>,
) -> Result<impl IntoResponse> {
    state.shop().delete_address(&AddressId::new(id))?;
    Ok(redirect_back(form.return_to.as_deref(), "/addresses"))
}

/// Use an address for checkout.
#[instrument(skip(state))]
pub async fn select(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ReturnTo>,
) -> Result<impl IntoResponse> {
    state.shop().select_address(&AddressId::new(id))?;
    Ok(redirect_back(form.return_to.as_deref(), "/addresses"))
}

/// Make an address the default.
#[instrument(skip(state))]
pub async fn set_default(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ReturnTo>,
) -> Result<impl IntoResponse> {
    state.shop().set_default_address(&AddressId::new(id))?;
    Ok(redirect_back(form.return_to.as_deref(), "/addresses"))
}
