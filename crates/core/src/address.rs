//! Address book with the single-default invariant.
//!
//! At most one address carries `is_default`. The mutators here maintain that;
//! storage never checks it. The book also tracks which address is selected for
//! the current checkout, which is independent of the default.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::AddressId;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("Address not found: {0}")]
    NotFound(AddressId),
    #[error("{0} is required")]
    MissingField(&'static str),
}

/// A saved delivery address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(alias = "_id")]
    pub id: AddressId,
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
    #[serde(default)]
    pub is_default: bool,
}

impl Address {
    /// One-line summary, e.g. for the order confirmation.
    #[must_use]
    pub fn summary(&self) -> String {
        format!("{}, {}", self.street, self.city)
    }
}

/// Address fields as entered in the address form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressInput {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    pub phone: String,
    #[serde(default)]
    pub is_default: bool,
}

impl AddressInput {
    /// Check that every field the address form marks as required is filled.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::MissingField` naming the first blank field.
    pub fn validate(&self) -> Result<(), AddressError> {
        let fields = [
            ("Full name", &self.full_name),
            ("Street", &self.street),
            ("City", &self.city),
            ("State", &self.state),
            ("ZIP code", &self.zip_code),
            ("Country", &self.country),
            ("Phone", &self.phone),
        ];
        match fields.iter().find(|(_, value)| value.trim().is_empty()) {
            Some((label, _)) => Err(AddressError::MissingField(*label)),
            None => Ok(()),
        }
    }

    fn into_address(self, id: AddressId) -> Address {
        Address {
            id,
            full_name: self.full_name,
            street: self.street,
            city: self.city,
            state: self.state,
            zip_code: self.zip_code,
            country: self.country,
            phone: self.phone,
            is_default: self.is_default,
        }
    }
}

/// Partial update merged into an existing address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressUpdate {
    pub full_name: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub is_default: Option<bool>,
}

impl From<AddressInput> for AddressUpdate {
    fn from(input: AddressInput) -> Self {
        Self {
            full_name: Some(input.full_name),
            street: Some(input.street),
            city: Some(input.city),
            state: Some(input.state),
            zip_code: Some(input.zip_code),
            country: Some(input.country),
            phone: Some(input.phone),
            is_default: Some(input.is_default),
        }
    }
}

impl AddressUpdate {
    fn apply(self, address: &mut Address) {
        fn merge(slot: &mut String, value: Option<String>) {
            if let Some(value) = value {
                *slot = value;
            }
        }
        merge(&mut address.full_name, self.full_name);
        merge(&mut address.street, self.street);
        merge(&mut address.city, self.city);
        merge(&mut address.state, self.state);
        merge(&mut address.zip_code, self.zip_code);
        merge(&mut address.country, self.country);
        merge(&mut address.phone, self.phone);
        if let Some(is_default) = self.is_default {
            address.is_default = is_default;
        }
    }
}

/// The shopper's saved addresses plus the checkout selection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressBook {
    addresses: Vec<Address>,
    selected: Option<AddressId>,
}

impl AddressBook {
    /// Rebuild a book from persisted parts.
    ///
    /// A persisted list that violates the single-default rule keeps only its
    /// first default.
    #[must_use]
    pub fn new(mut addresses: Vec<Address>, selected: Option<AddressId>) -> Self {
        let mut seen_default = false;
        for address in &mut addresses {
            if address.is_default {
                address.is_default = !seen_default;
                seen_default = true;
            }
        }
        Self {
            addresses,
            selected,
        }
    }

    #[must_use]
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.addresses.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &AddressId) -> Option<&Address> {
        self.addresses.iter().find(|a| a.id == *id)
    }

    #[must_use]
    pub fn default_address(&self) -> Option<&Address> {
        self.addresses.iter().find(|a| a.is_default)
    }

    /// The explicit selection pointer, as persisted.
    #[must_use]
    pub const fn selected_id(&self) -> Option<&AddressId> {
        self.selected.as_ref()
    }

    /// The address used for checkout.
    ///
    /// The explicit selection wins; otherwise the default, otherwise the first
    /// saved address.
    #[must_use]
    pub fn selected(&self) -> Option<&Address> {
        self.selected
            .as_ref()
            .and_then(|id| self.get(id))
            .or_else(|| self.default_address())
            .or_else(|| self.addresses.first())
    }

    /// Save a new address under a fresh ID.
    pub fn add(&mut self, input: AddressInput) -> Address {
        let address = input.into_address(AddressId::generate());
        if address.is_default {
            self.clear_default();
        }
        if self.addresses.is_empty() || address.is_default {
            self.selected = Some(address.id.clone());
        }
        self.addresses.push(address.clone());
        address
    }

    /// Merge fields into an existing address.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown ID.
    pub fn update(&mut self, id: &AddressId, update: AddressUpdate) -> Result<Address, AddressError> {
        let idx = self.position(id)?;
        if update.is_default == Some(true) {
            self.clear_default();
        }
        let address = self
            .addresses
            .get_mut(idx)
            .ok_or_else(|| AddressError::NotFound(id.clone()))?;
        update.apply(address);
        Ok(address.clone())
    }

    /// Remove an address, promoting a new default if the removed one was it.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown ID.
    pub fn delete(&mut self, id: &AddressId) -> Result<Address, AddressError> {
        let idx = self.position(id)?;
        let removed = self.addresses.remove(idx);

        if removed.is_default
            && let Some(first) = self.addresses.first_mut()
        {
            first.is_default = true;
        }
        if self.selected.as_ref() == Some(id) {
            self.selected = self.addresses.first().map(|a| a.id.clone());
        }
        Ok(removed)
    }

    /// Point checkout at an address without touching the default.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown ID.
    pub fn select(&mut self, id: &AddressId) -> Result<(), AddressError> {
        self.position(id)?;
        self.selected = Some(id.clone());
        Ok(())
    }

    /// Make an address the default.
    ///
    /// # Errors
    ///
    /// Returns `AddressError::NotFound` for an unknown ID.
    pub fn set_default(&mut self, id: &AddressId) -> Result<Address, AddressError> {
        self.update(
            id,
            AddressUpdate {
                is_default: Some(true),
                ..AddressUpdate::default()
            },
        )
    }

    fn clear_default(&mut self) {
        for address in &mut self.addresses {
            address.is_default = false;
        }
    }

    fn position(&self, id: &AddressId) -> Result<usize, AddressError> {
        self.addresses
            .iter()
            .position(|a| a.id == *id)
            .ok_or_else(|| AddressError::NotFound(id.clone()))
    }
}
