//! Address book commands.

use tracing::info;

use bazaar_core::{AddressId, AddressInput};

use super::{CommandError, Context};

pub fn list(ctx: &Context) {
    ctx.shop.addresses().read(|book| {
        if book.is_empty() {
            info!("No saved addresses");
            return;
        }
        let selected = book.selected_id();
        for address in book.addresses() {
            let mut flags = Vec::new();
            if address.is_default {
                flags.push("default");
            }
            if selected == Some(&address.id) {
                flags.push("selected");
            }
            info!(
                "{}  {}  {}",
                address.id,
                address.summary(),
                if flags.is_empty() {
                    String::new()
                } else {
                    format!("[{}]", flags.join(", "))
                }
            );
        }
    });
}

/// Validate and save a new address.
///
/// # Errors
///
/// Returns `CommandError::Address` if a required field is blank.
pub fn add(ctx: &Context, input: AddressInput) -> Result<(), CommandError> {
    input.validate()?;
    let address = ctx.shop.add_address(input);
    info!("Saved address {}", address.id);
    Ok(())
}

/// # Errors
///
/// Returns `CommandError::Address` if the address doesn't exist.
pub fn remove(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let removed = ctx.shop.delete_address(&AddressId::new(id))?;
    info!("Deleted address for {}", removed.full_name);
    Ok(())
}

/// # Errors
///
/// Returns `CommandError::Address` if the address doesn't exist.
pub fn select(ctx: &Context, id: &str) -> Result<(), CommandError> {
    ctx.shop.select_address(&AddressId::new(id))?;
    info!("Orders will be delivered to {id}");
    Ok(())
}

/// # Errors
///
/// Returns `CommandError::Address` if the address doesn't exist.
pub fn set_default(ctx: &Context, id: &str) -> Result<(), CommandError> {
    let address = ctx.shop.set_default_address(&AddressId::new(id))?;
    info!("Default address is now {}", address.summary());
    Ok(())
}
