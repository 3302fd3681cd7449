//! Read-through product cache.
//!
//! Single source of truth for product records in a running session. Two
//! layers:
//!
//! - a `moka` list cache (5-minute TTL) memoizing the storefront and admin
//!   list fetches, dropped wholesale by [`ProductCache::invalidate`];
//! - a local mirror indexed by id and SKU, giving the synchronous
//!   [`ProductCache::get_product_by_sku`] lookup the cart renders against on
//!   every read, with no network round-trip.
//!
//! Consistency contract: after a confirmed remote write the caller patches
//! the mirror via [`ProductCache::update_local_product`] /
//! [`ProductCache::remove_local_product`] so in-flight cart and pricing
//! reads reflect the change immediately, then calls
//! [`ProductCache::invalidate`] and reloads so the next full list fetch is
//! not served stale data. A failed remote write must patch nothing.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::sync::Cache;
use tokio::sync::watch;
use tracing::{debug, instrument};

use headshop_core::{Product, ProductId, Sku};

use crate::backend::{BackendError, ProductBackend};
use crate::notify::ChangeNotifier;

/// How long a memoized list fetch stays fresh without explicit invalidation.
const LIST_TTL: Duration = Duration::from_secs(300);

/// Cache key for the two list views.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq)]
enum ListKey {
    /// Active products only (storefront view).
    Active,
    /// All products regardless of active flag (admin view).
    All,
}

#[derive(Default)]
struct Mirror {
    by_id: HashMap<ProductId, Product>,
    sku_index: HashMap<Sku, ProductId>,
}

impl Mirror {
    fn patch(&mut self, product: Product) {
        // The sku can change on an update; drop the old index entry first.
        if let Some(existing) = self.by_id.get(&product.id)
            && existing.sku != product.sku
        {
            self.sku_index.remove(&existing.sku);
        }
        self.sku_index.insert(product.sku.clone(), product.id);
        self.by_id.insert(product.id, product);
    }

    fn remove(&mut self, id: ProductId) -> Option<Product> {
        let removed = self.by_id.remove(&id)?;
        self.sku_index.remove(&removed.sku);
        Some(removed)
    }
}

/// Read-through cache over the persistence service.
pub struct ProductCache<B> {
    backend: B,
    lists: Cache<ListKey, Arc<Vec<Product>>>,
    mirror: RwLock<Mirror>,
    notifier: ChangeNotifier,
}

impl<B: ProductBackend> ProductCache<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            lists: Cache::builder()
                .max_capacity(8)
                .time_to_live(LIST_TTL)
                .build(),
            mirror: RwLock::new(Mirror::default()),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Active products for the storefront view.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the memoized list is gone and the refetch
    /// fails; the mirror keeps whatever it already held.
    #[instrument(skip(self))]
    pub async fn get_products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        self.get_list(ListKey::Active).await
    }

    /// All products regardless of active flag, for the admin view.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError`] if the refetch fails.
    #[instrument(skip(self))]
    pub async fn get_admin_products(&self) -> Result<Arc<Vec<Product>>, BackendError> {
        self.get_list(ListKey::All).await
    }

    async fn get_list(&self, key: ListKey) -> Result<Arc<Vec<Product>>, BackendError> {
        if let Some(cached) = self.lists.get(&key) {
            debug!(?key, "list served from cache");
            return Ok(cached);
        }

        let fetched = match key {
            ListKey::Active => self.backend.select_active().await?,
            ListKey::All => self.backend.select_all().await?,
        };
        debug!(?key, count = fetched.len(), "list fetched from backend");

        {
            let mut mirror = self.mirror.write().unwrap_or_else(std::sync::PoisonError::into_inner);
            for product in &fetched {
                mirror.patch(product.clone());
            }
        }
        self.notifier.notify();

        let fetched = Arc::new(fetched);
        self.lists.insert(key, Arc::clone(&fetched));
        Ok(fetched)
    }

    /// Synchronous local lookup by SKU; no network round-trip.
    ///
    /// Returns `None` for SKUs the mirror has never seen (or whose products
    /// were removed), which callers treat as a skippable stale line.
    #[must_use]
    pub fn get_product_by_sku(&self, sku: &Sku) -> Option<Product> {
        let mirror = self.mirror.read().unwrap_or_else(std::sync::PoisonError::into_inner);
        let id = mirror.sku_index.get(sku)?;
        mirror.by_id.get(id).cloned()
    }

    /// Patch the mirror with a server-returned row after a confirmed write.
    ///
    /// Keyed by identifier; re-indexes the SKU if it changed. Does not touch
    /// the memoized lists - pair with [`Self::invalidate`].
    pub fn update_local_product(&self, product: Product) {
        let mut mirror = self.mirror.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        mirror.patch(product);
        drop(mirror);
        self.notifier.notify();
    }

    /// Drop a product from the mirror after a confirmed remote delete.
    pub fn remove_local_product(&self, id: ProductId) {
        let mut mirror = self.mirror.write().unwrap_or_else(std::sync::PoisonError::into_inner);
        let removed = mirror.remove(id);
        drop(mirror);
        if removed.is_some() {
            self.notifier.notify();
        }
    }

    /// The backend this cache reads from, for write paths that patch the
    /// mirror afterwards.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Drop the memoized lists; the next list call refetches.
    pub fn invalidate(&self) {
        self.lists.invalidate_all();
    }

    /// Subscribe to mirror changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.notifier.watch()
    }
}
