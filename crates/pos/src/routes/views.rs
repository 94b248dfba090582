//! Template view models.
//!
//! Prices are formatted here so templates only print strings.

use cafe_pos_core::{Cart, CartLine, CheckoutSummary, Product};

/// Edge length of product card thumbnails.
const THUMBNAIL_SIZE: u32 = 200;

/// Edge length of the lightbox image.
const LIGHTBOX_SIZE: u32 = 400;

/// A product card in the grid.
#[derive(Debug, Clone)]
pub struct ProductCard {
    pub id: String,
    pub name: String,
    /// Plain grouped amount, rendered as `{price} บาท`.
    pub price: String,
    pub category: String,
    pub description: Option<String>,
    pub image: String,
    pub fallback_image: String,
    pub zoom_image: String,
    pub zoom_fallback_image: String,
}

impl From<&Product> for ProductCard {
    fn from(product: &Product) -> Self {
        let fallback_image = product.placeholder_image(THUMBNAIL_SIZE);
        let zoom_fallback_image = product.placeholder_image(LIGHTBOX_SIZE);
        let (image, zoom_image) = if product.image.is_empty() {
            (fallback_image.clone(), zoom_fallback_image.clone())
        } else {
            (product.image.clone(), product.image.clone())
        };

        Self {
            id: product.id.to_string(),
            name: product.name.clone(),
            price: product.price.format_plain(),
            category: product.category.clone(),
            description: product.description.clone(),
            image,
            fallback_image,
            zoom_image,
            zoom_fallback_image,
        }
    }
}

/// Build cards for `products`, keeping their order.
pub fn product_cards<'a>(products: impl IntoIterator<Item = &'a Product>) -> Vec<ProductCard> {
    products.into_iter().map(ProductCard::from).collect()
}

/// One row of the cart table.
#[derive(Debug, Clone)]
pub struct CartLineView {
    pub product_id: String,
    pub name: String,
    pub image: String,
    pub unit_price: String,
    pub quantity: u32,
    pub line_total: String,
    /// Decrementing a line at quantity 1 is blocked, so the button is disabled.
    pub can_decrement: bool,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.to_string(),
            name: line.name.clone(),
            image: line.image.clone(),
            unit_price: line.unit_price.format_plain(),
            quantity: line.quantity(),
            line_total: line.line_total().format_plain(),
            can_decrement: line.quantity() > 1,
        }
    }
}

/// The cart panel: lines, counts and the total.
#[derive(Debug, Clone)]
pub struct CartView {
    pub lines: Vec<CartLineView>,
    pub total: String,
    pub item_count: u64,
    pub is_empty: bool,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            lines: cart.lines().iter().map(CartLineView::from).collect(),
            total: cart.total().format_currency(),
            item_count: cart.item_count(),
            is_empty: cart.is_empty(),
        }
    }
}

/// The checkout confirmation.
#[derive(Debug, Clone)]
pub struct CheckoutView {
    pub message: String,
    pub total: String,
    pub line_count: usize,
    pub item_count: u64,
}

impl From<&CheckoutSummary> for CheckoutView {
    fn from(summary: &CheckoutSummary) -> Self {
        Self {
            message: summary.message(),
            total: summary.total.format_currency(),
            line_count: summary.line_count,
            item_count: summary.item_count,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cafe_pos_core::{Price, ProductId, fallback_products};

    use super::*;

    fn americano(image: &str) -> Product {
        Product {
            id: ProductId::new("7"),
            name: "Americano".to_string(),
            price: Price::whole(1250),
            image: image.to_string(),
            category: "กาแฟ".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_card_without_image_uses_placeholders() {
        let card = ProductCard::from(&americano(""));
        assert_eq!(card.image, "https://picsum.photos/seed/7/200/200");
        assert_eq!(card.zoom_image, "https://picsum.photos/seed/7/400/400");
        assert_eq!(card.price, "1,250");
    }

    #[test]
    fn test_card_keeps_catalog_image_with_fallbacks() {
        let card = ProductCard::from(&americano("https://img.test/a.png"));
        assert_eq!(card.image, "https://img.test/a.png");
        assert_eq!(card.zoom_image, "https://img.test/a.png");
        assert_eq!(card.fallback_image, "https://picsum.photos/seed/7/200/200");
        assert_eq!(card.zoom_fallback_image, "https://picsum.photos/seed/7/400/400");
    }

    #[test]
    fn test_cart_view() {
        let products = fallback_products();
        let mut cart = Cart::new();
        cart.add_item(&products[0]);
        cart.add_item(&products[0]);
        cart.add_item(&products[1]);

        let view = CartView::from(&cart);

        assert!(!view.is_empty);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.total, "฿300.00");
        assert_eq!(view.lines[0].quantity, 2);
        assert!(view.lines[0].can_decrement);
        assert!(!view.lines[1].can_decrement);
        assert_eq!(view.lines[0].line_total, "200");
    }
}
