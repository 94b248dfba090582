//! Catalog loading with fallback.
//!
//! The remote store is best-effort: an error, an empty collection or a
//! collection of unusable records all produce the bundled fallback catalog,
//! and none of them is shown to the operator.

use async_trait::async_trait;
use thiserror::Error;
use tracing::instrument;

use cafe_pos_core::{Catalog, Product, ProductRecord};

use crate::firebase::FirebaseError;

/// Errors that can occur while fetching product records.
#[derive(Debug, Error)]
pub enum CatalogLoadError {
    /// The document store call failed.
    #[error("catalog store error: {0}")]
    Store(#[from] FirebaseError),

    /// The source cannot serve requests at all.
    #[error("catalog source unavailable: {0}")]
    Unavailable(String),
}

/// Where product records come from.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Fetch every record of `collection`, authenticated as `id_token`.
    ///
    /// # Errors
    ///
    /// Returns `CatalogLoadError` if the records cannot be fetched.
    async fn fetch_all(
        &self,
        collection: &str,
        id_token: Option<&str>,
    ) -> Result<Vec<ProductRecord>, CatalogLoadError>;
}

/// Load the catalog for a screen, falling back to the bundled products.
#[instrument(skip(source, id_token))]
pub async fn load_catalog(
    source: &dyn CatalogSource,
    collection: &str,
    id_token: Option<&str>,
) -> Catalog {
    let fetched = source.fetch_all(collection, id_token).await;
    if let Err(e) = &fetched {
        tracing::warn!(error = %e, "Catalog fetch failed, using fallback products");
    }

    let catalog = Catalog::resolve(fetched.map(decode_records));

    tracing::info!(
        origin = catalog.origin().as_str(),
        products = catalog.len(),
        "Catalog loaded"
    );

    catalog
}

/// Convert raw records, skipping the ones that are not sellable.
fn decode_records(records: Vec<ProductRecord>) -> Vec<Product> {
    records
        .into_iter()
        .filter_map(|record| match Product::try_from(record) {
            Ok(product) => Some(product),
            Err(e) => {
                tracing::warn!(error = %e, "Skipping invalid product record");
                None
            }
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Mutex;

    use cafe_pos_core::{CatalogOrigin, ProductId, fallback_products};
    use rust_decimal::Decimal;

    use super::*;

    struct StubSource {
        result: Mutex<Option<Result<Vec<ProductRecord>, CatalogLoadError>>>,
        seen: Mutex<Vec<(String, Option<String>)>>,
    }

    impl StubSource {
        fn new(result: Result<Vec<ProductRecord>, CatalogLoadError>) -> Self {
            Self {
                result: Mutex::new(Some(result)),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl CatalogSource for StubSource {
        async fn fetch_all(
            &self,
            collection: &str,
            id_token: Option<&str>,
        ) -> Result<Vec<ProductRecord>, CatalogLoadError> {
            self.seen
                .lock()
                .unwrap()
                .push((collection.to_string(), id_token.map(String::from)));
            self.result.lock().unwrap().take().unwrap()
        }
    }

    fn record(id: &str, name: &str, price: Option<i64>) -> ProductRecord {
        ProductRecord {
            id: id.to_string(),
            name: Some(name.to_string()),
            price: price.map(Decimal::from),
            image: None,
            category: None,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_remote_records_are_used() {
        let source = StubSource::new(Ok(vec![
            record("a", "Latte", Some(55)),
            record("b", "Mocha", Some(60)),
        ]));

        let catalog = load_catalog(&source, "cafe", Some("token")).await;

        assert_eq!(catalog.origin(), CatalogOrigin::Remote);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.find(&ProductId::new("b")).is_some());
        assert_eq!(
            source.seen.lock().unwrap().as_slice(),
            [("cafe".to_string(), Some("token".to_string()))]
        );
    }

    #[tokio::test]
    async fn test_fetch_failure_falls_back_exactly() {
        let source = StubSource::new(Err(CatalogLoadError::Unavailable(
            "offline".to_string(),
        )));

        let catalog = load_catalog(&source, "cafe", None).await;

        assert_eq!(catalog.origin(), CatalogOrigin::Fallback);
        assert_eq!(catalog.products(), fallback_products().as_slice());
    }

    #[tokio::test]
    async fn test_empty_collection_falls_back() {
        let source = StubSource::new(Ok(Vec::new()));
        let catalog = load_catalog(&source, "cafe", None).await;
        assert_eq!(catalog.origin(), CatalogOrigin::Fallback);
        assert_eq!(catalog.len(), 6);
    }

    #[tokio::test]
    async fn test_invalid_records_are_skipped() {
        let source = StubSource::new(Ok(vec![
            record("a", "Latte", Some(55)),
            record("b", "No price", None),
            record("c", "Refund", Some(-10)),
        ]));

        let catalog = load_catalog(&source, "cafe", None).await;

        assert_eq!(catalog.origin(), CatalogOrigin::Remote);
        let ids: Vec<_> = catalog.products().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["a"]);
    }

    #[tokio::test]
    async fn test_all_invalid_records_fall_back() {
        let source = StubSource::new(Ok(vec![record("b", "No price", None)]));
        let catalog = load_catalog(&source, "cafe", None).await;
        assert_eq!(catalog.origin(), CatalogOrigin::Fallback);
    }
}
