//! The state behind one open sales screen.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use cafe_pos_core::{Cart, Catalog, Product, ProductId};

/// Identifies a mounted sales screen. Stored in the operator's session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScreenId(Uuid);

impl ScreenId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ScreenId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ScreenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Catalog, cart and search term of one sales screen.
///
/// Created empty on mount and dropped on unmount.
#[derive(Debug, Clone)]
pub struct PosScreen {
    catalog: Catalog,
    cart: Cart,
    search_term: String,
}

impl PosScreen {
    #[must_use]
    pub const fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            cart: Cart::new(),
            search_term: String::new(),
        }
    }

    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &Cart {
        &self.cart
    }

    pub const fn cart_mut(&mut self) -> &mut Cart {
        &mut self.cart
    }

    #[must_use]
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Catalog products matching the current search term.
    #[must_use]
    pub fn visible_products(&self) -> Vec<&Product> {
        self.catalog.visible(&self.search_term)
    }

    /// Add one unit of the catalog product `id`.
    ///
    /// Returns `false` if the catalog has no such product.
    pub fn add_product(&mut self, id: &ProductId) -> bool {
        match self.catalog.find(id) {
            Some(product) => {
                self.cart.add_item(product);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cafe_pos_core::Price;

    use super::*;

    #[test]
    fn test_new_screen_is_empty() {
        let screen = PosScreen::new(Catalog::fallback());
        assert!(screen.cart().is_empty());
        assert_eq!(screen.search_term(), "");
        assert_eq!(screen.visible_products().len(), 6);
    }

    #[test]
    fn test_add_product_uses_catalog_snapshot() {
        let mut screen = PosScreen::new(Catalog::fallback());

        assert!(screen.add_product(&ProductId::new("3")));
        assert!(screen.add_product(&ProductId::new("3")));
        assert!(!screen.add_product(&ProductId::new("99")));

        let line = screen.cart().line(&ProductId::new("3")).unwrap();
        assert_eq!(line.name, "Roblox Gift card");
        assert_eq!(line.quantity(), 2);
        assert_eq!(screen.cart().total(), Price::whole(200));
    }

    #[test]
    fn test_search_term_filters_visible_products() {
        let mut screen = PosScreen::new(Catalog::fallback());
        screen.set_search_term("GIFT");
        let names: Vec<_> = screen
            .visible_products()
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, ["Roblox Gift card", "Minecraft Gift Card"]);

        screen.set_search_term("espresso");
        assert!(screen.visible_products().is_empty());
    }

    #[test]
    fn test_screen_id_serializes_as_uuid_string() {
        let id = ScreenId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
        let restored: ScreenId = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, id);
    }
}
