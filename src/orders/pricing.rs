use rust_decimal::Decimal;

use super::model::{BoxOrder, Order, SaladOrder};
use crate::menu::{BAKERY_PACKAGE_PRICE, BOX_BASE_PRICE, SALAD_BASE_PRICE};

impl SaladOrder {
    /// Base price plus the protein. Toppings and dressing are included.
    pub fn total(&self) -> Decimal {
        SALAD_BASE_PRICE + self.protein().map_or(Decimal::ZERO, |p| p.unit_price)
    }
}

impl BoxOrder {
    /// The box itself with the main-course upcharge folded in.
    pub fn main_course_price(&self) -> Decimal {
        BOX_BASE_PRICE + self.variant.main_course.upcharge()
    }

    pub fn total(&self) -> Decimal {
        let bakery = if self.variant.includes_bakery_add_on {
            BAKERY_PACKAGE_PRICE
        } else {
            Decimal::ZERO
        };
        self.main_course_price() + bakery
    }
}

impl Order {
    /// Always derived from the current selections; nothing caches it.
    pub fn compute_total(&self) -> Decimal {
        match self {
            Order::Salad(salad) => salad.total(),
            Order::ShabbosBox(order) => order.total(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::menu::{MainCourse, PROTEINS, TOPPINGS};
    use crate::orders::money::usd;

    #[test]
    fn plain_salad_costs_base_price() {
        assert_eq!(Order::Salad(SaladOrder::new()).compute_total(), usd(1200));
    }

    #[test]
    fn salad_total_ignores_toppings_and_dressing() {
        for protein in PROTEINS {
            let mut salad = SaladOrder::new();
            salad.select_protein(protein.name).unwrap();
            let expected = usd(1200) + protein.unit_price;
            assert_eq!(salad.total(), expected);

            for topping in TOPPINGS.iter().take(4) {
                salad.toggle_topping(topping.name).unwrap();
                assert_eq!(salad.total(), expected);
            }
            salad.select_dressing("Light Caesar").unwrap();
            assert_eq!(salad.total(), expected);
        }
    }

    #[test]
    fn salad_total_follows_protein_changes() {
        let mut salad = SaladOrder::new();
        salad.select_protein("Grilled Chicken").unwrap();
        assert_eq!(salad.total(), usd(1800));
        salad.select_protein("Tuna").unwrap();
        assert_eq!(salad.total(), usd(1600));
        salad.select_protein("Tuna").unwrap();
        assert_eq!(salad.total(), usd(1200));
    }

    #[test]
    fn box_totals() {
        let mut order = BoxOrder::default();
        assert_eq!(order.total(), usd(8900));

        order.select_variant(MainCourse::Capons, false);
        assert_eq!(order.total(), usd(9900));

        order.select_variant(MainCourse::Capons, true);
        assert_eq!(order.main_course_price(), usd(9900));
        assert_eq!(Order::ShabbosBox(order).compute_total(), usd(12400));
    }
}
