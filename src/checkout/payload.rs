//! Renders a priced order into a provider-neutral checkout request.
//!
//! Everything here is synchronous and pure: the same order and customer info
//! always produce the same request. The provider-specific wire shape lives in
//! `square.rs`.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use serde::Serialize;

use crate::menu::{BAKERY_PACKAGE_NAME, BAKERY_PACKAGE_PRICE, MAX_TOPPINGS};
use crate::orders::money::{format_usd, to_cents};
use crate::orders::{BoxOrder, CustomerInfo, Order, SaladOrder, ValidationError};

/// Order notes longer than this are cut; the provider rejects them otherwise.
pub const MAX_NOTE_CHARS: usize = 500;

/// The provider's limit on a line-item name.
pub const MAX_ITEM_NAME_CHARS: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
}

impl LineItem {
    pub fn total_cents(&self) -> i64 {
        self.unit_price_cents * i64::from(self.quantity)
    }
}

/// Buyer details that survived normalization. Anything malformed is simply
/// absent rather than an error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerBlock {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub special_requests: Option<String>,
}

/// Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub amount: Decimal,
    pub line_items: Vec<LineItem>,
    pub note: String,
    pub customer: CustomerBlock,
}

impl CheckoutRequest {
    pub fn amount_cents(&self) -> Result<i64, ValidationError> {
        to_cents(self.amount)
    }
}

/// One priced component of an order: short label for the note, price.
struct Component {
    label: String,
    price: Decimal,
}

fn components(order: &Order) -> Vec<Component> {
    match order {
        Order::Salad(salad) => vec![Component {
            label: "Custom Salad".to_string(),
            price: salad.total(),
        }],
        Order::ShabbosBox(order) => {
            let mut parts = vec![Component {
                label: box_label(order),
                price: order.main_course_price(),
            }];
            if order.variant.includes_bakery_add_on {
                parts.push(Component {
                    label: BAKERY_PACKAGE_NAME.to_string(),
                    price: BAKERY_PACKAGE_PRICE,
                });
            }
            parts
        }
    }
}

fn box_label(order: &BoxOrder) -> String {
    format!("Shabbos Box with {}", order.variant.main_course)
}

/// The salad is sold as a single line; protein is folded in and the choices
/// are spelled out in the item name so they show on the receipt.
fn salad_item_name(salad: &SaladOrder) -> String {
    let mut name = format!("Custom Salad - {}", format_usd(salad.total()));
    if let Some(protein) = salad.protein() {
        name.push_str(&format!(
            "\nProtein: {} (+{})",
            protein.name,
            format_usd(protein.unit_price)
        ));
    }
    if salad.topping_count() > 0 {
        name.push_str(&format!(
            "\nToppings ({}/{}): {}",
            salad.topping_count(),
            MAX_TOPPINGS,
            topping_list(salad)
        ));
    }
    if let Some(dressing) = salad.dressing() {
        name.push_str(&format!("\nDressing: {}", dressing.name));
    }
    if let Some(requests) = salad.special_requests() {
        name.push_str(&format!("\nSpecial Requests: {requests}"));
    }
    truncate_chars(name, MAX_ITEM_NAME_CHARS)
}

fn topping_list(salad: &SaladOrder) -> String {
    salad
        .toppings()
        .map(|t| t.name)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn build_line_items(order: &Order) -> Result<Vec<LineItem>, ValidationError> {
    components(order)
        .into_iter()
        .map(|part| -> Result<LineItem, ValidationError> {
            let name = match order {
                Order::Salad(salad) => salad_item_name(salad),
                Order::ShabbosBox(_) => part.label,
            };
            Ok(LineItem {
                name,
                quantity: 1,
                unit_price_cents: to_cents(part.price)?,
            })
        })
        .collect()
}

/// Human-readable summary attached to the provider order. Only its presence
/// matters downstream; the layout is for the kitchen.
pub fn format_order_note(order: &Order) -> String {
    let mut note = String::from("Order Details:\n\nItems:\n");
    for part in components(order) {
        note.push_str(&format!("- {} x1: {}\n", part.label, format_usd(part.price)));
    }

    note.push_str("\nOrder Specifics:\n");
    match order {
        Order::Salad(salad) => {
            if let Some(protein) = salad.protein() {
                note.push_str(&format!("- Protein: {}\n", protein.name));
            }
            let toppings = if salad.topping_count() == 0 {
                "None selected".to_string()
            } else {
                topping_list(salad)
            };
            note.push_str(&format!("- Toppings: {toppings}\n"));
            if let Some(dressing) = salad.dressing() {
                note.push_str(&format!("- Dressing: {}\n", dressing.name));
            }
        }
        Order::ShabbosBox(order) => {
            note.push_str(&format!("- Main Course: {}\n", order.variant.main_course));
            if order.variant.includes_bakery_add_on {
                note.push_str("- Bakery Package: Included\n");
            }
            for (label, value) in [
                ("Name", &order.customer_name),
                ("Phone", &order.customer_phone),
                ("Delivery Address", &order.customer_address),
            ] {
                if !value.is_empty() {
                    note.push_str(&format!("- {label}: {value}\n"));
                }
            }
        }
    }
    if let Some(requests) = order.special_requests() {
        note.push_str(&format!("- Special Requests: {requests}\n"));
    }

    truncate_chars(note, MAX_NOTE_CHARS)
}

fn truncate_chars(mut text: String, max: usize) -> String {
    if let Some((idx, _)) = text.char_indices().nth(max) {
        text.truncate(idx);
    }
    text
}

pub fn build_checkout_request(
    order: &Order,
    customer: &CustomerInfo,
) -> Result<CheckoutRequest, ValidationError> {
    let amount = order.compute_total();
    let line_items = build_line_items(order)?;

    let customer = match order {
        Order::Salad(_) => CustomerBlock {
            name: non_blank(customer.name.as_deref()),
            phone: customer.phone.as_deref().and_then(normalize_phone),
            email: customer.email.as_deref().and_then(normalize_email),
            address: non_blank(customer.address.as_deref()),
            special_requests: order.special_requests().map(str::to_string),
        },
        Order::ShabbosBox(order) => CustomerBlock {
            name: non_blank(Some(order.customer_name.as_str())),
            phone: normalize_phone(&order.customer_phone),
            email: customer.email.as_deref().and_then(normalize_email),
            address: non_blank(Some(order.customer_address.as_str())),
            special_requests: order.special_requests.clone(),
        },
    };

    let request = CheckoutRequest {
        amount,
        line_items,
        note: format_order_note(order),
        customer,
    };
    let line_total: i64 = request.line_items.iter().map(LineItem::total_cents).sum();
    if line_total != request.amount_cents()? {
        return Err(ValidationError::AmountMismatch {
            submitted: Decimal::new(line_total, 2),
            computed: amount,
        });
    }
    Ok(request)
}

/// Normalizes to `+<country><digits>`. Ten-digit numbers are taken as North
/// American and get a leading `1`. Returns `None` for anything that is not a
/// plausible E.164 number afterwards.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let mut digits: String = raw.chars().filter(char::is_ascii_digit).collect();
    if digits.len() == 10 {
        digits.insert(0, '1');
    }
    if !(11..=15).contains(&digits.len()) {
        return None;
    }
    Some(format!("+{digits}"))
}

pub fn normalize_email(raw: &str) -> Option<String> {
    let email = raw.trim().to_lowercase();
    is_valid_email(&email).then_some(email)
}

fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
