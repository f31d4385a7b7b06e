use rust_decimal::Decimal;
use thiserror::Error;

use super::model::{BoxOrder, Order, SaladOrder};
use crate::menu::{Category, MAX_TOPPINGS};

/// Local, pre-network order errors. None of them touch the provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("You can only select up to {} toppings", MAX_TOPPINGS)]
    TooManySelections,

    #[error("Please select a dressing")]
    MissingDressing,

    #[error("Please select at least one topping")]
    NoToppingsSelected,

    #[error("Please enter your {}", .0.prompt())]
    MissingContactField(ContactField),

    #[error("Unknown {category}: {name}")]
    UnknownMenuItem { category: Category, name: String },

    #[error("Order amount {submitted} does not match computed total {computed}")]
    AmountMismatch { submitted: Decimal, computed: Decimal },

    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),

    #[error("Order could not be read: {0}")]
    MalformedRequest(String),
}

/// Contact fields a Shabbos Box order cannot be submitted without,
/// in the order they are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactField {
    Name,
    Phone,
    Address,
}

impl ContactField {
    pub fn prompt(self) -> &'static str {
        match self {
            ContactField::Name => "name",
            ContactField::Phone => "phone number",
            ContactField::Address => "delivery address",
        }
    }
}

impl Order {
    /// Checks the order is complete enough to send to checkout.
    pub fn validate_for_submission(&self) -> Result<(), ValidationError> {
        match self {
            Order::Salad(salad) => validate_salad(salad),
            Order::ShabbosBox(order) => validate_box(order),
        }
    }
}

fn validate_salad(salad: &SaladOrder) -> Result<(), ValidationError> {
    if salad.topping_count() == 0 {
        return Err(ValidationError::NoToppingsSelected);
    }
    if salad.dressing().is_none() {
        return Err(ValidationError::MissingDressing);
    }
    Ok(())
}

fn validate_box(order: &BoxOrder) -> Result<(), ValidationError> {
    let fields = [
        (ContactField::Name, &order.customer_name),
        (ContactField::Phone, &order.customer_phone),
        (ContactField::Address, &order.customer_address),
    ];
    match fields.iter().find(|(_, value)| value.trim().is_empty()) {
        Some((field, _)) => Err(ValidationError::MissingContactField(*field)),
        None => Ok(()),
    }
}
