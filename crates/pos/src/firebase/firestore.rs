//! Firestore client (product catalog).

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use cafe_pos_core::ProductRecord;

use super::{FirebaseError, send_json};
use crate::config::FirebaseConfig;
use crate::services::catalog::{CatalogLoadError, CatalogSource};

const FIRESTORE_BASE: &str = "https://firestore.googleapis.com/v1";

/// Documents requested per page.
const PAGE_SIZE: u32 = 300;

/// Firestore REST client.
///
/// Cheaply cloneable; clones share the underlying HTTP connection pool.
#[derive(Clone)]
pub struct FirestoreClient {
    inner: Arc<FirestoreClientInner>,
}

struct FirestoreClientInner {
    client: reqwest::Client,
    api_key: SecretString,
    project_id: String,
}

/// `documents.list` response. An empty collection comes back as `{}`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListDocumentsResponse {
    #[serde(default)]
    documents: Vec<Document>,
    #[serde(default)]
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Document {
    /// `projects/{p}/databases/(default)/documents/{collection}/{id}`
    name: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
}

/// A Firestore typed value. Only the kinds the catalog uses are decoded;
/// any other kind reads as absent.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Value {
    string_value: Option<String>,
    /// int64 values are JSON strings.
    integer_value: Option<String>,
    double_value: Option<f64>,
}

impl Value {
    fn as_text(&self) -> Option<String> {
        self.string_value.clone()
    }

    /// Numeric reading; numeric strings are accepted too.
    fn as_decimal(&self) -> Option<Decimal> {
        if let Some(int) = &self.integer_value {
            return int.trim().parse().ok();
        }
        if let Some(double) = self.double_value {
            return Decimal::try_from(double).ok();
        }
        self.string_value
            .as_deref()
            .and_then(|s| s.trim().parse().ok())
    }
}

impl Document {
    fn id(&self) -> &str {
        self.name.rsplit('/').next().unwrap_or_default()
    }

    fn text(&self, field: &str) -> Option<String> {
        self.fields.get(field).and_then(Value::as_text)
    }

    fn into_record(self) -> ProductRecord {
        ProductRecord {
            id: self.id().to_string(),
            name: self.text("name"),
            price: self.fields.get("price").and_then(Value::as_decimal),
            image: self.text("image"),
            category: self.text("category"),
            description: self.text("description"),
        }
    }
}

impl FirestoreClient {
    /// Create a client for the project in `config`.
    #[must_use]
    pub fn new(config: &FirebaseConfig) -> Self {
        Self {
            inner: Arc::new(FirestoreClientInner {
                client: reqwest::Client::new(),
                api_key: config.api_key.clone(),
                project_id: config.project_id.clone(),
            }),
        }
    }

    fn collection_url(
        &self,
        collection: &str,
        page_token: Option<&str>,
    ) -> Result<Url, FirebaseError> {
        let mut url = Url::parse(&format!(
            "{FIRESTORE_BASE}/projects/{}/databases/(default)/documents/{collection}",
            self.inner.project_id
        ))?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("key", self.inner.api_key.expose_secret());
            query.append_pair("pageSize", &PAGE_SIZE.to_string());
            if let Some(token) = page_token {
                query.append_pair("pageToken", token);
            }
        }
        Ok(url)
    }

    /// List every document of `collection`, following page tokens.
    async fn list_documents(
        &self,
        collection: &str,
        id_token: Option<&str>,
    ) -> Result<Vec<Document>, FirebaseError> {
        let mut documents = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let url = self.collection_url(collection, page_token.as_deref())?;
            let mut request = self.inner.client.get(url);
            if let Some(token) = id_token {
                request = request.bearer_auth(token);
            }

            let page: ListDocumentsResponse = send_json(request).await?;
            documents.extend(page.documents);

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) => page_token = Some(next),
                None => break,
            }
        }

        Ok(documents)
    }
}

#[async_trait]
impl CatalogSource for FirestoreClient {
    #[instrument(skip(self, id_token))]
    async fn fetch_all(
        &self,
        collection: &str,
        id_token: Option<&str>,
    ) -> Result<Vec<ProductRecord>, CatalogLoadError> {
        let documents = self.list_documents(collection, id_token).await?;
        tracing::debug!(documents = documents.len(), "Fetched catalog documents");
        Ok(documents.into_iter().map(Document::into_record).collect())
    }
}
