//! Products and the raw records they are decoded from.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{Price, PriceError, ProductId};

/// Category label used when a record has none.
pub const DEFAULT_CATEGORY: &str = "อื่นๆ";

/// A purchasable product.
///
/// Loaded once per screen and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Image URI. May be empty, in which case the placeholder is shown.
    pub image: String,
    pub category: String,
    pub description: Option<String>,
}

impl Product {
    /// Placeholder image for this product at the given square size.
    ///
    /// Used when the product has no image or the image fails to load.
    #[must_use]
    pub fn placeholder_image(&self, size: u32) -> String {
        format!("https://picsum.photos/seed/{}/{size}/{size}", self.id)
    }
}

/// A loosely-typed product record as it arrives from the catalog store.
///
/// Every field except the id is optional; [`Product::try_from`] decides
/// which gaps are fatal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductRecord {
    pub id: String,
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub image: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
}

/// Reasons a [`ProductRecord`] cannot become a [`Product`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ProductRecordError {
    #[error("record has an empty id")]
    MissingId,
    #[error("record {0} has no name")]
    MissingName(String),
    #[error("record {0} has no price")]
    MissingPrice(String),
    #[error("record {id} has an invalid price: {source}")]
    InvalidPrice {
        id: String,
        #[source]
        source: PriceError,
    },
}

impl TryFrom<ProductRecord> for Product {
    type Error = ProductRecordError;

    fn try_from(record: ProductRecord) -> Result<Self, Self::Error> {
        if record.id.is_empty() {
            return Err(ProductRecordError::MissingId);
        }
        let name = record
            .name
            .filter(|n| !n.trim().is_empty())
            .ok_or_else(|| ProductRecordError::MissingName(record.id.clone()))?;
        let amount = record
            .price
            .ok_or_else(|| ProductRecordError::MissingPrice(record.id.clone()))?;
        let price = Price::new(amount).map_err(|source| ProductRecordError::InvalidPrice {
            id: record.id.clone(),
            source,
        })?;

        Ok(Self {
            id: ProductId::new(record.id),
            name,
            price,
            image: record.image.unwrap_or_default(),
            category: record
                .category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CATEGORY.to_owned()),
            description: record.description.filter(|d| !d.is_empty()),
        })
    }
}
