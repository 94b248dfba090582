//! The cart engine.
//!
//! An ordered list of line items keyed by product id. Every operation is
//! total: there is nothing to report as an error, only guard conditions.
//!
//! # Invariants
//!
//! - At most one line per product id.
//! - Every line has `quantity >= 1`. An adjustment that would take a line to
//!   zero (or below) is ignored rather than removing the line.
//! - [`Cart::total`] is always computed from the current lines.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// One product's entry in the cart.
///
/// Name, price and image are copied when the line is created and are not
/// refreshed if the catalog changes afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Price,
    pub image: String,
    quantity: u32,
}

impl CartLine {
    fn snapshot(product: &Product) -> Self {
        Self {
            product_id: product.id.clone(),
            name: product.name.clone(),
            unit_price: product.price,
            image: product.image.clone(),
            quantity: 1,
        }
    }

    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// `unit_price * quantity`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.unit_price.times(self.quantity)
    }
}

/// The shopping cart of one sales screen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { lines: Vec::new() }
    }

    /// Add one unit of `product`.
    ///
    /// Increments the existing line or appends a new line with quantity 1.
    pub fn add_item(&mut self, product: &Product) {
        match self.line_mut(&product.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::snapshot(product)),
        }
    }

    /// Remove the line for `product_id`. Absent ids are ignored.
    pub fn remove_item(&mut self, product_id: &ProductId) {
        self.lines.retain(|line| &line.product_id != product_id);
    }

    /// Change a line's quantity by `delta`.
    ///
    /// The change is applied only if the result is at least 1; otherwise the
    /// line is left untouched. Absent ids are ignored.
    pub fn adjust_quantity(&mut self, product_id: &ProductId, delta: i32) {
        let Some(line) = self.line_mut(product_id) else {
            return;
        };
        let next = i64::from(line.quantity) + i64::from(delta);
        if next > 0
            && let Ok(quantity) = u32::try_from(next)
        {
            line.quantity = quantity;
        }
    }

    /// Remove every line.
    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Sum of `unit_price * quantity` over all lines.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn line(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| &line.product_id == product_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Number of distinct products.
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Summarize the cart for the checkout confirmation.
    ///
    /// Checkout does not mutate the cart.
    #[must_use]
    pub fn checkout(&self) -> CheckoutSummary {
        CheckoutSummary {
            total: self.total(),
            line_count: self.line_count(),
            item_count: self.item_count(),
        }
    }

    fn line_mut(&mut self, product_id: &ProductId) -> Option<&mut CartLine> {
        self.lines
            .iter_mut()
            .find(|line| &line.product_id == product_id)
    }
}

/// What the operator sees when charging the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckoutSummary {
    pub total: Price,
    pub line_count: usize,
    pub item_count: u64,
}

impl CheckoutSummary {
    /// Confirmation text shown after checkout.
    #[must_use]
    pub fn message(&self) -> String {
        format!("ชำระเงินเรียบร้อย! ยอดเงิน: {} บาท", self.total)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(id: &str, name: &str, price: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: name.to_string(),
            price: Price::whole(price),
            image: format!("https://img.test/{id}.png"),
            category: "กาแฟ".to_string(),
            description: None,
        }
    }

    fn latte() -> Product {
        product("1", "Latte", 50)
    }

    fn quantity_of(cart: &Cart, id: &str) -> Option<u32> {
        cart.line(&ProductId::new(id)).map(CartLine::quantity)
    }

    #[test]
    fn test_empty_cart_totals_zero() {
        let cart = Cart::new();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_one_line_per_distinct_product() {
        let menu = [
            product("a", "Espresso", 40),
            product("b", "Mocha", 55),
            product("c", "Croissant", 35),
        ];
        let mut cart = Cart::new();
        // a x3, b x1, c x2, interleaved
        for idx in [0, 1, 0, 2, 0, 2] {
            cart.add_item(&menu[idx]);
        }

        assert_eq!(cart.line_count(), 3);
        assert_eq!(quantity_of(&cart, "a"), Some(3));
        assert_eq!(quantity_of(&cart, "b"), Some(1));
        assert_eq!(quantity_of(&cart, "c"), Some(2));
        let order: Vec<_> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
        assert_eq!(order, ["a", "b", "c"]);
    }

    #[test]
    fn test_double_add_increments_single_line() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.add_item(&latte());
        assert_eq!(cart.line_count(), 1);
        assert_eq!(quantity_of(&cart, "1"), Some(2));
    }

    #[test]
    fn test_decrement_at_one_is_blocked() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.adjust_quantity(&ProductId::new("1"), -1);
        assert_eq!(quantity_of(&cart, "1"), Some(1));
    }

    #[test]
    fn test_adjust_below_zero_leaves_quantity_and_total() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.add_item(&latte());
        cart.adjust_quantity(&ProductId::new("1"), -5);
        assert_eq!(quantity_of(&cart, "1"), Some(2));
        assert_eq!(cart.total(), Price::whole(100));
    }

    #[test]
    fn test_adjust_applies_positive_results() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.adjust_quantity(&ProductId::new("1"), 4);
        assert_eq!(quantity_of(&cart, "1"), Some(5));
        cart.adjust_quantity(&ProductId::new("1"), -3);
        assert_eq!(quantity_of(&cart, "1"), Some(2));
    }

    #[test]
    fn test_adjust_overflow_is_blocked() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.adjust_quantity(&ProductId::new("1"), i32::MAX);
        cart.adjust_quantity(&ProductId::new("1"), i32::MAX);
        cart.adjust_quantity(&ProductId::new("1"), i32::MAX);
        assert_eq!(quantity_of(&cart, "1"), Some(1 + 2 * i32::MAX.unsigned_abs()));
    }

    #[test]
    fn test_adjust_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        let before = cart.clone();
        cart.adjust_quantity(&ProductId::new("missing"), 1);
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        let before = cart.clone();
        cart.remove_item(&ProductId::new("missing"));
        assert_eq!(cart, before);
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.add_item(&product("2", "Cake", 80));
        cart.remove_item(&ProductId::new("1"));
        assert_eq!(cart.line_count(), 1);
        assert_eq!(quantity_of(&cart, "1"), None);

        cart.clear();
        assert!(cart.is_empty());
        assert_eq!(cart.total(), Price::ZERO);
    }

    #[test]
    fn test_total_tracks_every_mutation() {
        let cake = product("2", "Cake", 80);
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.add_item(&cake);
        cart.add_item(&cake);
        assert_eq!(cart.total(), Price::whole(50 + 160));

        cart.adjust_quantity(&ProductId::new("1"), 2);
        assert_eq!(cart.total(), Price::whole(150 + 160));

        cart.remove_item(&ProductId::new("2"));
        assert_eq!(cart.total(), Price::whole(150));
    }

    #[test]
    fn test_line_keeps_snapshot() {
        let mut cart = Cart::new();
        let mut original = latte();
        cart.add_item(&original);

        original.price = Price::whole(999);
        original.name = "Renamed".to_string();
        cart.add_item(&original);

        let line = cart.line(&ProductId::new("1")).unwrap();
        assert_eq!(line.name, "Latte");
        assert_eq!(line.unit_price, Price::whole(50));
        assert_eq!(line.image, "https://img.test/1.png");
        assert_eq!(line.line_total(), Price::whole(100));
    }

    #[test]
    fn test_checkout_does_not_mutate() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.add_item(&latte());
        cart.add_item(&product("2", "Cake", 900));
        let before = cart.clone();

        let summary = cart.checkout();
        assert_eq!(cart, before);
        assert_eq!(summary.total, Price::whole(1000));
        assert_eq!(summary.line_count, 2);
        assert_eq!(summary.item_count, 3);
        assert_eq!(summary.message(), "ชำระเงินเรียบร้อย! ยอดเงิน: 1,000 บาท");
    }

    #[test]
    fn test_serde_round_trip_preserves_quantities() {
        let mut cart = Cart::new();
        cart.add_item(&latte());
        cart.adjust_quantity(&ProductId::new("1"), 2);
        let json = serde_json::to_string(&cart).unwrap();
        let restored: Cart = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, cart);
    }

    #[test]
    fn test_total_saturates_for_huge_prices() {
        let mut cart = Cart::new();
        let gold = Product {
            price: Price::new(rust_decimal::Decimal::MAX / rust_decimal::Decimal::TWO).unwrap(),
            ..product("gold", "Gold Bar", 0)
        };
        for _ in 0..3 {
            cart.add_item(&gold);
        }

        assert_eq!(cart.line(&ProductId::new("gold")).unwrap().line_total(), Price::MAX);
        assert_eq!(cart.total(), Price::MAX);
        assert_eq!(cart.checkout().total, Price::MAX);
    }

    mod properties {
        use proptest::prelude::*;

        use super::*;

        fn menu() -> [Product; 4] {
            [
                product("a", "Espresso", 40),
                product("b", "Mocha", 55),
                product("c", "Croissant", 35),
                product("d", "Matcha", 70),
            ]
        }

        proptest! {
            #[test]
            fn prop_add_sequence_keeps_one_line_per_product(
                picks in prop::collection::vec(0..4_usize, 0..64)
            ) {
                let menu = menu();
                let mut cart = Cart::new();
                for &idx in &picks {
                    cart.add_item(&menu[idx]);
                }

                let mut first_seen: Vec<usize> = Vec::new();
                for &idx in &picks {
                    if !first_seen.contains(&idx) {
                        first_seen.push(idx);
                    }
                }

                prop_assert_eq!(cart.line_count(), first_seen.len());
                let order: Vec<&str> = cart.lines().iter().map(|l| l.product_id.as_str()).collect();
                let expected: Vec<&str> = first_seen.iter().map(|&i| menu[i].id.as_str()).collect();
                prop_assert_eq!(order, expected);

                for (idx, item) in menu.iter().enumerate() {
                    let added = u32::try_from(picks.iter().filter(|&&p| p == idx).count()).unwrap();
                    let expected = (added > 0).then_some(added);
                    prop_assert_eq!(quantity_of(&cart, item.id.as_str()), expected);
                }

                let expected_total: Price = picks.iter().map(|&i| menu[i].price).sum();
                prop_assert_eq!(cart.total(), expected_total);
                prop_assert_eq!(cart.item_count(), u64::try_from(picks.len()).unwrap());
            }

            #[test]
            fn prop_adjust_never_drops_below_one(
                adds in 1..10_u32,
                delta in -20..20_i32
            ) {
                let mut cart = Cart::new();
                let latte = latte();
                for _ in 0..adds {
                    cart.add_item(&latte);
                }

                cart.adjust_quantity(&latte.id, delta);

                let expected = i64::from(adds) + i64::from(delta);
                let quantity = quantity_of(&cart, "1").unwrap();
                if expected > 0 {
                    prop_assert_eq!(i64::from(quantity), expected);
                } else {
                    prop_assert_eq!(quantity, adds);
                }
                prop_assert_eq!(cart.total(), latte.price.times(quantity));
            }
        }
    }
}
