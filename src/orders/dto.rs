use serde::Deserialize;

use crate::menu::MainCourse;

/// Contact details typed into the order form. Every field is optional on the
/// wire; which ones are required depends on the product being ordered.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
}

/// The raw choices made on one of the ordering pages.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OrderSelection {
    Salad {
        #[serde(default)]
        toppings: Vec<String>,
        #[serde(default)]
        dressing: Option<String>,
        #[serde(default)]
        protein: Option<String>,
    },
    ShabbosBox {
        #[serde(rename = "mainCourse")]
        main_course: MainCourse,
        #[serde(rename = "bakeryPackage", default)]
        bakery_package: bool,
    },
}
