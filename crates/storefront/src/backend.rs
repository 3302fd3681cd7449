//! Persistence-service client for product rows.
//!
//! The service is an opaque relational store exposed PostgREST-style: one
//! product table, filter-by-id updates, and `Prefer: return=representation`
//! so writes hand back the stored row. The engine consumes it through the
//! [`ProductBackend`] trait so the cache and admin workflow can be exercised
//! against an in-memory fake.
//!
//! Failures are surfaced, never retried automatically.

use std::sync::Arc;

use secrecy::ExposeSecret;
use thiserror::Error;
use tracing::instrument;
use url::Url;

use headshop_core::{Product, ProductDraft, ProductId};

use crate::config::CatalogConfig;

/// Errors from the persistence service.
#[derive(Debug, Error)]
pub enum BackendError {
    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// The response body did not parse as product rows.
    #[error("Parse error: {0}")]
    Parse(String),

    /// A returning write came back with no rows.
    #[error("write returned no row")]
    EmptyReturn,
}

/// Operations the engine needs from the product store.
///
/// Matches the five operations consumed from the remote service:
/// select-active, select-all, insert-one-returning, update-by-id-returning,
/// delete-by-id (plus the stock-only update used by the bulk-stock
/// workflow).
pub trait ProductBackend: Send + Sync {
    fn select_active(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, BackendError>> + Send;

    fn select_all(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<Product>, BackendError>> + Send;

    fn insert_returning(
        &self,
        draft: &ProductDraft,
    ) -> impl std::future::Future<Output = Result<Product, BackendError>> + Send;

    fn update_returning(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> impl std::future::Future<Output = Result<Product, BackendError>> + Send;

    fn update_stock_returning(
        &self,
        id: ProductId,
        stock: u32,
    ) -> impl std::future::Future<Output = Result<Product, BackendError>> + Send;

    fn delete(
        &self,
        id: ProductId,
    ) -> impl std::future::Future<Output = Result<(), BackendError>> + Send;
}

// =============================================================================
// RestBackend
// =============================================================================

/// REST client for the product persistence service.
#[derive(Clone)]
pub struct RestBackend {
    inner: Arc<RestBackendInner>,
}

struct RestBackendInner {
    client: reqwest::Client,
    table_url: Url,
    api_key: String,
}

impl RestBackend {
    /// Create a new client from catalog configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Parse`] if the base URL cannot absorb the
    /// table segment.
    pub fn new(config: &CatalogConfig) -> Result<Self, BackendError> {
        let mut table_url = config.base_url.clone();
        table_url
            .path_segments_mut()
            .map_err(|()| BackendError::Parse("catalog base URL cannot be a base".to_owned()))?
            .pop_if_empty()
            .push(&config.table);

        Ok(Self {
            inner: Arc::new(RestBackendInner {
                client: reqwest::Client::new(),
                table_url,
                api_key: config.api_key.expose_secret().to_owned(),
            }),
        })
    }

    fn request(&self, method: reqwest::Method, query: &str) -> reqwest::RequestBuilder {
        let mut url = self.inner.table_url.clone();
        url.set_query(Some(query));
        self.inner
            .client
            .request(method, url)
            .header("apikey", &self.inner.api_key)
            .header(
                "Authorization",
                format!("Bearer {}", &self.inner.api_key),
            )
    }

    async fn read_rows(response: reqwest::Response) -> Result<Vec<Product>, BackendError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::error!(
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "catalog service returned non-success status"
            );
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        serde_json::from_str(&body).map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn read_single(response: reqwest::Response) -> Result<Product, BackendError> {
        Self::read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or(BackendError::EmptyReturn)
    }
}

impl ProductBackend for RestBackend {
    #[instrument(skip(self))]
    async fn select_active(&self) -> Result<Vec<Product>, BackendError> {
        let response = self
            .request(reqwest::Method::GET, "select=*&active=eq.true&order=sku.asc")
            .send()
            .await?;
        Self::read_rows(response).await
    }

    #[instrument(skip(self))]
    async fn select_all(&self) -> Result<Vec<Product>, BackendError> {
        let response = self
            .request(reqwest::Method::GET, "select=*&order=sku.asc")
            .send()
            .await?;
        Self::read_rows(response).await
    }

    #[instrument(skip(self, draft), fields(sku = %draft.sku))]
    async fn insert_returning(&self, draft: &ProductDraft) -> Result<Product, BackendError> {
        let response = self
            .request(reqwest::Method::POST, "select=*")
            .header("Prefer", "return=representation")
            .json(&[draft])
            .send()
            .await?;
        Self::read_single(response).await
    }

    #[instrument(skip(self, draft), fields(sku = %draft.sku))]
    async fn update_returning(
        &self,
        id: ProductId,
        draft: &ProductDraft,
    ) -> Result<Product, BackendError> {
        let query = format!("select=*&id=eq.{id}");
        let response = self
            .request(reqwest::Method::PATCH, &query)
            .header("Prefer", "return=representation")
            .json(draft)
            .send()
            .await?;
        Self::read_single(response).await
    }

    #[instrument(skip(self))]
    async fn update_stock_returning(
        &self,
        id: ProductId,
        stock: u32,
    ) -> Result<Product, BackendError> {
        let query = format!("select=*&id=eq.{id}");
        let response = self
            .request(reqwest::Method::PATCH, &query)
            .header("Prefer", "return=representation")
            .json(&serde_json::json!({ "stock": stock }))
            .send()
            .await?;
        Self::read_single(response).await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: ProductId) -> Result<(), BackendError> {
        let query = format!("id=eq.{id}");
        let response = self.request(reqwest::Method::DELETE, &query).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(BackendError::Api {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(())
    }
}

// =============================================================================
// Testing support
// =============================================================================

/// In-memory [`ProductBackend`] with failure injection.
///
/// Used by the engine's own tests and by the integration-tests crate; never
/// constructed on a production path.
pub mod testing {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use super::{Arc, BackendError, Product, ProductBackend, ProductDraft, ProductId};

    /// In-memory product table.
    #[derive(Clone, Default)]
    pub struct MockBackend {
        inner: Arc<MockInner>,
    }

    #[derive(Default)]
    struct MockInner {
        products: Mutex<Vec<Product>>,
        fail_next: AtomicBool,
        fetch_count: AtomicUsize,
    }

    impl MockBackend {
        /// Start with a seeded product table.
        #[must_use]
        pub fn with_products(products: Vec<Product>) -> Self {
            let backend = Self::default();
            *backend.inner.products.lock().unwrap_or_else(std::sync::PoisonError::into_inner) =
                products;
            backend
        }

        /// Make the next operation fail with a provider error.
        pub fn fail_next(&self) {
            self.inner.fail_next.store(true, Ordering::SeqCst);
        }

        /// Number of list fetches served so far.
        #[must_use]
        pub fn fetch_count(&self) -> usize {
            self.inner.fetch_count.load(Ordering::SeqCst)
        }

        /// Snapshot of the stored rows.
        #[must_use]
        pub fn rows(&self) -> Vec<Product> {
            self.inner
                .products
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .clone()
        }

        fn check_fail(&self) -> Result<(), BackendError> {
            if self.inner.fail_next.swap(false, Ordering::SeqCst) {
                return Err(BackendError::Api {
                    status: 503,
                    message: "injected failure".to_owned(),
                });
            }
            Ok(())
        }

        fn apply_draft(product: &mut Product, draft: &ProductDraft) {
            product.sku = draft.sku.clone();
            product.title = draft.title.clone();
            product.price = draft.price;
            product.description = draft.description.clone();
            product.image_url = draft.image_url.clone();
            product.stock = draft.stock;
            product.active = draft.active;
            product.category = draft.category.clone();
        }
    }

    impl ProductBackend for MockBackend {
        async fn select_active(&self) -> Result<Vec<Product>, BackendError> {
            self.check_fail()?;
            self.inner.fetch_count.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows().into_iter().filter(|p| p.active).collect())
        }

        async fn select_all(&self) -> Result<Vec<Product>, BackendError> {
            self.check_fail()?;
            self.inner.fetch_count.fetch_add(1, Ordering::SeqCst);
            Ok(self.rows())
        }

        async fn insert_returning(&self, draft: &ProductDraft) -> Result<Product, BackendError> {
            self.check_fail()?;
            let mut product = Product {
                id: ProductId::generate(),
                sku: draft.sku.clone(),
                title: String::new(),
                price: draft.price,
                description: String::new(),
                image_url: String::new(),
                stock: 0,
                active: true,
                category: None,
            };
            Self::apply_draft(&mut product, draft);
            self.inner
                .products
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .push(product.clone());
            Ok(product)
        }

        async fn update_returning(
            &self,
            id: ProductId,
            draft: &ProductDraft,
        ) -> Result<Product, BackendError> {
            self.check_fail()?;
            let mut products = self
                .inner
                .products
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(BackendError::EmptyReturn)?;
            Self::apply_draft(product, draft);
            Ok(product.clone())
        }

        async fn update_stock_returning(
            &self,
            id: ProductId,
            stock: u32,
        ) -> Result<Product, BackendError> {
            self.check_fail()?;
            let mut products = self
                .inner
                .products
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let product = products
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or(BackendError::EmptyReturn)?;
            product.stock = stock;
            Ok(product.clone())
        }

        async fn delete(&self, id: ProductId) -> Result<(), BackendError> {
            self.check_fail()?;
            self.inner
                .products
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .retain(|p| p.id != id);
            Ok(())
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn config() -> CatalogConfig {
        CatalogConfig {
            base_url: Url::parse("https://example.supabase.co/rest/v1").unwrap(),
            api_key: SecretString::from("key".to_owned()),
            table: "produtos".to_owned(),
        }
    }

    #[test]
    fn test_table_url_appends_table_segment() {
        let backend = RestBackend::new(&config()).unwrap();
        assert_eq!(
            backend.inner.table_url.as_str(),
            "https://example.supabase.co/rest/v1/produtos"
        );
    }

    #[test]
    fn test_table_url_handles_trailing_slash() {
        let mut cfg = config();
        cfg.base_url = Url::parse("https://example.supabase.co/rest/v1/").unwrap();
        let backend = RestBackend::new(&cfg).unwrap();
        assert_eq!(
            backend.inner.table_url.as_str(),
            "https://example.supabase.co/rest/v1/produtos"
        );
    }
}
