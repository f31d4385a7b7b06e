use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::orders::money::usd;

pub const SALAD_BASE_PRICE: Decimal = usd(1200);
pub const BOX_BASE_PRICE: Decimal = usd(8900);
pub const CAPON_UPCHARGE: Decimal = usd(1000);
pub const BAKERY_PACKAGE_PRICE: Decimal = usd(2500);
pub const MAX_TOPPINGS: usize = 4;

pub const BAKERY_PACKAGE_NAME: &str = "Bakery Package";

/// A priced entry in one menu category. Dressings always carry a zero price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub name: &'static str,
    pub unit_price: Decimal,
}

impl MenuItem {
    const fn free(name: &'static str) -> Self {
        Self {
            name,
            unit_price: Decimal::ZERO,
        }
    }

    const fn priced(name: &'static str, cents: u32) -> Self {
        Self {
            name,
            unit_price: usd(cents),
        }
    }
}

pub const TOPPINGS: &[MenuItem] = &[
    MenuItem::free("Red Pepper"),
    MenuItem::free("Pickles"),
    MenuItem::free("Cucumbers"),
    MenuItem::free("Grape tomatoes"),
    MenuItem::free("Caesar croutons"),
    MenuItem::free("Craisins"),
    MenuItem::free("Baby Corn"),
    MenuItem::free("Chickpeas"),
    MenuItem::free("Hard boiled egg"),
];

pub const DRESSINGS: &[MenuItem] = &[
    MenuItem::free("Caesar"),
    MenuItem::free("Light Caesar"),
    MenuItem::free("Fat free Italian"),
    MenuItem::free("Honey Dijon"),
];

pub const PROTEINS: &[MenuItem] = &[
    MenuItem::priced("Tuna", 400),
    MenuItem::priced("Smoked Turkey Breast", 400),
    MenuItem::priced("Grilled Chicken", 600),
    MenuItem::priced("Fried Shnitzel", 600),
];

/// Sides included in every Shabbos Box; shown on the menu only.
pub const BOX_SIDES: &[&str] = &[
    "COLESLAW (1 LB)",
    "GEFILTE FISH (4 SLICES)",
    "CHICKEN SOUP (1 QT)",
    "MATZAH BALLS",
    "POTATO KUGEL",
    "SUGAR SNAP PEAS",
    "CHOPPED LIVER (1/2 LB)",
    "EGG SALAD (1/2 LB)",
    "CHOLENT (2 LB)",
    "DELI ROLL (4 SLICES)",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Topping,
    Dressing,
    Protein,
}

impl Category {
    pub fn items(self) -> &'static [MenuItem] {
        match self {
            Category::Topping => TOPPINGS,
            Category::Dressing => DRESSINGS,
            Category::Protein => PROTEINS,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::Topping => "topping",
            Category::Dressing => "dressing",
            Category::Protein => "protein",
        };
        f.write_str(s)
    }
}

/// Finds an item by name, ignoring case and surrounding whitespace.
/// Returns the catalog position along with the item.
pub fn lookup(category: Category, name: &str) -> Option<(usize, MenuItem)> {
    let name = name.trim();
    category
        .items()
        .iter()
        .position(|item| item.name.eq_ignore_ascii_case(name))
        .map(|pos| (pos, category.items()[pos]))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MainCourse {
    #[serde(rename = "FRIED SHNITZEL")]
    Shnitzel,
    #[serde(rename = "GRILLED CHICKEN BREAST")]
    Chicken,
    #[serde(rename = "STUFFED CAPONS")]
    Capons,
}

impl MainCourse {
    pub const ALL: [MainCourse; 3] = [MainCourse::Shnitzel, MainCourse::Chicken, MainCourse::Capons];

    pub fn label(self) -> &'static str {
        match self {
            MainCourse::Shnitzel => "FRIED SHNITZEL",
            MainCourse::Chicken => "GRILLED CHICKEN BREAST",
            MainCourse::Capons => "STUFFED CAPONS",
        }
    }

    pub fn upcharge(self) -> Decimal {
        match self {
            MainCourse::Capons => CAPON_UPCHARGE,
            _ => Decimal::ZERO,
        }
    }
}

impl fmt::Display for MainCourse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MainCourseEntry {
    pub name: MainCourse,
    pub upcharge: Decimal,
}

/// Everything the ordering pages render, in one payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCatalog {
    pub salad_base_price: Decimal,
    pub max_toppings: usize,
    pub toppings: &'static [MenuItem],
    pub dressings: &'static [MenuItem],
    pub proteins: &'static [MenuItem],
    pub box_base_price: Decimal,
    pub main_courses: Vec<MainCourseEntry>,
    pub box_sides: &'static [&'static str],
    pub bakery_package_price: Decimal,
}

pub fn catalog() -> MenuCatalog {
    MenuCatalog {
        salad_base_price: SALAD_BASE_PRICE,
        max_toppings: MAX_TOPPINGS,
        toppings: TOPPINGS,
        dressings: DRESSINGS,
        proteins: PROTEINS,
        box_base_price: BOX_BASE_PRICE,
        main_courses: MainCourse::ALL
            .iter()
            .map(|&name| MainCourseEntry {
                name,
                upcharge: name.upcharge(),
            })
            .collect(),
        box_sides: BOX_SIDES,
        bakery_package_price: BAKERY_PACKAGE_PRICE,
    }
}
