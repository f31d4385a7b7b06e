use std::collections::BTreeMap;

use tracing::debug;

use super::dto::{CustomerInfo, OrderSelection};
use super::validation::ValidationError;
use crate::menu::{self, Category, MainCourse, MenuItem, MAX_TOPPINGS};

/// A build-your-own salad.
///
/// Toppings are keyed by their catalog position, so the selection always
/// iterates in menu order and a double toggle restores the previous state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SaladOrder {
    toppings: BTreeMap<usize, MenuItem>,
    dressing: Option<MenuItem>,
    protein: Option<MenuItem>,
    special_requests: Option<String>,
}

impl SaladOrder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn toppings(&self) -> impl Iterator<Item = &MenuItem> + '_ {
        self.toppings.values()
    }

    pub fn topping_count(&self) -> usize {
        self.toppings.len()
    }

    pub fn dressing(&self) -> Option<&MenuItem> {
        self.dressing.as_ref()
    }

    pub fn protein(&self) -> Option<&MenuItem> {
        self.protein.as_ref()
    }

    pub fn special_requests(&self) -> Option<&str> {
        self.special_requests.as_deref()
    }

    pub fn set_special_requests(&mut self, text: Option<&str>) {
        self.special_requests = non_blank(text);
    }

    /// Adds the topping if absent, removes it if present. Adding a fifth
    /// topping fails and leaves the selection as it was.
    pub fn toggle_topping(&mut self, name: &str) -> Result<(), ValidationError> {
        let (pos, item) = find(Category::Topping, name)?;
        if self.toppings.remove(&pos).is_some() {
            debug!(topping = item.name, "topping deselected");
            return Ok(());
        }
        if self.toppings.len() >= MAX_TOPPINGS {
            return Err(ValidationError::TooManySelections);
        }
        self.toppings.insert(pos, item);
        debug!(topping = item.name, count = self.toppings.len(), "topping selected");
        Ok(())
    }

    /// Single choice; the latest pick replaces any earlier one.
    pub fn select_dressing(&mut self, name: &str) -> Result<(), ValidationError> {
        let (_, item) = find(Category::Dressing, name)?;
        self.dressing = Some(item);
        Ok(())
    }

    /// Single choice; picking the current protein again clears it.
    pub fn select_protein(&mut self, name: &str) -> Result<(), ValidationError> {
        let (_, item) = find(Category::Protein, name)?;
        if self.protein.map(|p| p.name) == Some(item.name) {
            self.protein = None;
        } else {
            self.protein = Some(item);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoxVariant {
    pub main_course: MainCourse,
    pub includes_bakery_add_on: bool,
}

impl Default for BoxVariant {
    fn default() -> Self {
        Self {
            main_course: MainCourse::Shnitzel,
            includes_bakery_add_on: false,
        }
    }
}

/// The fixed-menu Shabbos Box, delivered to the given address.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxOrder {
    pub variant: BoxVariant,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_address: String,
    pub special_requests: Option<String>,
}

impl BoxOrder {
    pub fn select_variant(&mut self, main_course: MainCourse, includes_bakery_add_on: bool) {
        self.variant = BoxVariant {
            main_course,
            includes_bakery_add_on,
        };
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Order {
    Salad(SaladOrder),
    ShabbosBox(BoxOrder),
}

impl Order {
    pub fn kind(&self) -> &'static str {
        match self {
            Order::Salad(_) => "salad",
            Order::ShabbosBox(_) => "shabbos_box",
        }
    }

    pub fn special_requests(&self) -> Option<&str> {
        match self {
            Order::Salad(salad) => salad.special_requests(),
            Order::ShabbosBox(order) => order.special_requests.as_deref(),
        }
    }

    /// Replays the submitted choices through the same operations the ordering
    /// page uses, so API input obeys every selection rule.
    pub fn from_selection(
        selection: &OrderSelection,
        customer: &CustomerInfo,
    ) -> Result<Self, ValidationError> {
        match selection {
            OrderSelection::Salad {
                toppings,
                dressing,
                protein,
            } => {
                let mut salad = SaladOrder::new();
                for name in toppings {
                    let (pos, _) = find(Category::Topping, name)?;
                    if !salad.toppings.contains_key(&pos) {
                        salad.toggle_topping(name)?;
                    }
                }
                if let Some(name) = dressing.as_deref().filter(|n| !n.trim().is_empty()) {
                    salad.select_dressing(name)?;
                }
                if let Some(name) = protein.as_deref().filter(|n| !n.trim().is_empty()) {
                    salad.select_protein(name)?;
                }
                salad.set_special_requests(customer.special_requests.as_deref());
                Ok(Order::Salad(salad))
            }
            OrderSelection::ShabbosBox {
                main_course,
                bakery_package,
            } => {
                let mut order = BoxOrder {
                    customer_name: trimmed(customer.name.as_deref()),
                    customer_phone: trimmed(customer.phone.as_deref()),
                    customer_address: trimmed(customer.address.as_deref()),
                    special_requests: non_blank(customer.special_requests.as_deref()),
                    ..BoxOrder::default()
                };
                order.select_variant(*main_course, *bakery_package);
                Ok(Order::ShabbosBox(order))
            }
        }
    }
}

fn find(category: Category, name: &str) -> Result<(usize, MenuItem), ValidationError> {
    menu::lookup(category, name).ok_or_else(|| ValidationError::UnknownMenuItem {
        category,
        name: name.trim().to_string(),
    })
}

fn trimmed(text: Option<&str>) -> String {
    text.map(str::trim).unwrap_or_default().to_string()
}

fn non_blank(text: Option<&str>) -> Option<String> {
    text.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
