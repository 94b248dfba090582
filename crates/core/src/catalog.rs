//! Product catalog, fallback policy and product filter.
//!
//! The remote catalog is best effort. An empty result and a failed fetch
//! are treated the same way: the bundled fallback list is used so the sales
//! screen always has something to sell.

use serde::{Deserialize, Serialize};

use crate::product::Product;
use crate::types::{Price, ProductId};

/// Where the products of a [`Catalog`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogOrigin {
    /// Loaded from the remote document store.
    Remote,
    /// Bundled products substituted for an empty or failed load.
    Fallback,
}

impl CatalogOrigin {
    /// Label used in logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Fallback => "fallback",
        }
    }
}

/// The full set of products for one sales screen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    products: Vec<Product>,
    origin: CatalogOrigin,
}

impl Catalog {
    /// The bundled fallback catalog.
    #[must_use]
    pub fn fallback() -> Self {
        Self {
            products: fallback_products(),
            origin: CatalogOrigin::Fallback,
        }
    }

    /// Resolve the outcome of a remote load into a catalog.
    ///
    /// `Ok` with at least one product keeps the remote products in order.
    /// An empty `Ok` or any `Err` yields [`Catalog::fallback`].
    pub fn resolve<E>(loaded: Result<Vec<Product>, E>) -> Self {
        match loaded {
            Ok(products) if !products.is_empty() => Self {
                products,
                origin: CatalogOrigin::Remote,
            },
            Ok(_) | Err(_) => Self::fallback(),
        }
    }

    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    #[must_use]
    pub const fn origin(&self) -> CatalogOrigin {
        self.origin
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Look up a product by id.
    #[must_use]
    pub fn find(&self, id: &ProductId) -> Option<&Product> {
        self.products.iter().find(|p| &p.id == id)
    }

    /// Products whose name matches `search_term`. See [`visible_products`].
    #[must_use]
    pub fn visible(&self, search_term: &str) -> Vec<&Product> {
        visible_products(&self.products, search_term)
    }
}

/// Products whose name contains `search_term`, ignoring case.
///
/// Order is preserved. An empty term returns every product; no match
/// returns an empty vector.
#[must_use]
pub fn visible_products<'a>(catalog: &'a [Product], search_term: &str) -> Vec<&'a Product> {
    if search_term.is_empty() {
        return catalog.iter().collect();
    }
    let needle = search_term.to_lowercase();
    catalog
        .iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect()
}

const FALLBACK_DESCRIPTION: &str = "ส่วนผสม: กาแฟเข้มข้น + น้ำร้อน";

/// The bundled product list.
#[must_use]
pub fn fallback_products() -> Vec<Product> {
    let entries: [(&str, &str, &str, &str); 6] = [
        (
            "1",
            "Steam Wallet",
            "กาแฟ",
            "https://res.cloudinary.com/dopinbt23/image/upload/v1770189389/NNitKLBl1mnkmMq28XmwlJYxR2ts5zEQOl3B8UJ5_pnbdct.avif",
        ),
        (
            "2",
            "Cookierun Kingdom",
            "กาแฟ",
            "https://res.cloudinary.com/dopinbt23/image/upload/v1770192611/UErVK8U2nxJZrMcV9AUcJxhXrwHrqU2r82MbtbzG_n9eqpv.avif",
        ),
        (
            "3",
            "Roblox Gift card",
            "ของหวาน",
            "https://res.cloudinary.com/dopinbt23/image/upload/v1770192331/DW2JErmyGRSAv1hTWjRddStfxlIlKb6cTfdqJPdv_dzkpiw.avif",
        ),
        (
            "4",
            "Fate Grand Order",
            "เบเกอรี่",
            "https://res.cloudinary.com/dopinbt23/image/upload/v1770189453/MsqUxFXOcVFqLEm6mccfyf3nK9AwYWEGdnGgolx5_yk689z.avif",
        ),
        (
            "5",
            "Minecraft Gift Card",
            "เบเกอรี่",
            "https://res.cloudinary.com/dopinbt23/image/upload/v1770189440/F6M4CAZmmYlLI4S2zSynl5AuinUxBvtlJWAKXvMa_gcsiny.avif",
        ),
        (
            "6",
            "Uma Musume Pretty Derby",
            "กาแฟ",
            "https://res.cloudinary.com/dopinbt23/image/upload/v1770189429/RyYKSUb59sBIp9AH7MiIVfXD6A1Of5WrZDDAjOiH_ttxgbz.avif",
        ),
    ];

    entries
        .into_iter()
        .map(|(id, name, category, image)| Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Price::whole(100),
            image: image.to_owned(),
            category: category.to_owned(),
            description: Some(FALLBACK_DESCRIPTION.to_owned()),
        })
        .collect()
}
