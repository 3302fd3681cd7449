//! Admin inventory workflow: gate, panel mode machine, forms, write flows.
//!
//! Every write follows the same discipline: the persistence service is the
//! authority, so the flow is backend write first, then patch the local
//! mirror with the returned row, then invalidate the memoized lists. A
//! failed write leaves all local state untouched.

use serde::Deserialize;
use tracing::{info, instrument};
use url::Url;

use headshop_core::{Category, Product, ProductDraft, ProductId, Sku};

use crate::Result;
use crate::backend::ProductBackend;
use crate::cache::ProductCache;
use crate::error::{StoreError, ValidationError};

/// Verifies an admin credential before the panel unlocks.
pub trait AdminGate: Send + Sync {
    /// Decide whether `token` may administer the catalog.
    ///
    /// # Errors
    ///
    /// [`StoreError::Gate`] when the token is rejected or cannot be
    /// verified.
    fn authorize(&self, token: &str) -> impl std::future::Future<Output = Result<()>> + Send;
}

#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
}

/// [`AdminGate`] backed by an RFC 7662-style token introspection endpoint.
#[derive(Debug, Clone)]
pub struct TokenIntrospectionGate {
    client: reqwest::Client,
    url: Url,
}

impl TokenIntrospectionGate {
    #[must_use]
    pub fn new(url: Url) -> Self {
        Self {
            client: reqwest::Client::new(),
            url,
        }
    }
}

impl AdminGate for TokenIntrospectionGate {
    async fn authorize(&self, token: &str) -> Result<()> {
        let response = self
            .client
            .post(self.url.clone())
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| StoreError::Gate(format!("introspection request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StoreError::Gate(format!(
                "introspection endpoint returned {status}"
            )));
        }

        let body: IntrospectionResponse = response
            .json()
            .await
            .map_err(|e| StoreError::Gate(format!("malformed introspection response: {e}")))?;

        if body.active {
            Ok(())
        } else {
            Err(StoreError::Gate("token is not active".to_owned()))
        }
    }
}

/// Outcome of a panel mode transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use]
pub enum ModeChange {
    Entered,
    /// Another form is already open; unsaved input is never replaced.
    Rejected,
}

impl ModeChange {
    #[must_use]
    pub const fn is_entered(self) -> bool {
        matches!(self, Self::Entered)
    }
}

/// Which row an open product form writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditTarget {
    /// Insert a new row.
    New,
    /// Update the identified row.
    Existing(ProductId),
}

/// What the admin panel is currently showing.
///
/// At most one form is open at a time; opening another while one is active
/// is rejected rather than silently replacing unsaved input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AdminMode {
    #[default]
    Idle,
    Editing(EditTarget),
    BulkStock,
}

/// String-typed product form, validated into a [`ProductDraft`] on save.
///
/// Fields hold raw user input so partially-typed values survive a failed
/// validation round.
#[derive(Debug, Clone, Default)]
pub struct ProductForm {
    pub sku: String,
    pub title: String,
    pub price: String,
    pub description: String,
    pub image_url: String,
    pub stock: String,
    pub active: bool,
    pub category: Option<Category>,
}

impl ProductForm {
    /// Pre-fill from an existing row for editing.
    #[must_use]
    pub fn from_product(product: &Product) -> Self {
        Self {
            sku: product.sku.to_string(),
            title: product.title.clone(),
            price: product.price.to_string(),
            description: product.description.clone(),
            image_url: product.image_url.clone(),
            stock: product.stock.to_string(),
            active: product.active,
            category: product.category.clone(),
        }
    }

    /// Validate the raw input into a write-ready draft.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] naming the first offending field; the form itself
    /// is left untouched so the user can correct it.
    pub fn validate(&self) -> std::result::Result<ProductDraft, ValidationError> {
        let sku = self.sku.trim();
        if sku.is_empty() {
            return Err(ValidationError::MissingField("sku"));
        }
        let sku = Sku::parse(sku)?;

        let title = self.title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title"));
        }

        let price_raw = self.price.trim();
        if price_raw.is_empty() {
            return Err(ValidationError::MissingField("price"));
        }
        let price: rust_decimal::Decimal =
            price_raw.parse().map_err(|_| ValidationError::InvalidPrice {
                value: price_raw.to_owned(),
            })?;
        if price.is_sign_negative() {
            return Err(ValidationError::InvalidPrice {
                value: price_raw.to_owned(),
            });
        }

        let stock_raw = self.stock.trim();
        let stock = if stock_raw.is_empty() {
            0
        } else {
            stock_raw.parse().map_err(|_| ValidationError::InvalidStock {
                value: stock_raw.to_owned(),
            })?
        };

        Ok(ProductDraft {
            sku,
            title: title.to_owned(),
            price,
            description: self.description.trim().to_owned(),
            image_url: self.image_url.trim().to_owned(),
            stock,
            active: self.active,
            category: self.category.clone(),
        })
    }
}

/// Single-field stock adjustment used by the bulk-stock view.
#[derive(Debug, Clone, Default)]
pub struct StockForm {
    pub stock: String,
}

impl StockForm {
    /// # Errors
    ///
    /// [`ValidationError::InvalidStock`] unless the input is a non-negative
    /// integer.
    pub fn validate(&self) -> std::result::Result<u32, ValidationError> {
        let raw = self.stock.trim();
        raw.parse().map_err(|_| ValidationError::InvalidStock {
            value: raw.to_owned(),
        })
    }
}

/// The admin inventory panel.
///
/// Unlocks through an [`AdminGate`], then drives catalog writes against the
/// shared [`ProductCache`].
pub struct AdminPanel<'a, B> {
    cache: &'a ProductCache<B>,
    mode: AdminMode,
    unlocked: bool,
}

impl<'a, B: ProductBackend> AdminPanel<'a, B> {
    #[must_use]
    pub const fn new(cache: &'a ProductCache<B>) -> Self {
        Self {
            cache,
            mode: AdminMode::Idle,
            unlocked: false,
        }
    }

    /// Verify `token` against the gate and unlock catalog writes.
    ///
    /// # Errors
    ///
    /// Propagates the gate's rejection; the panel stays locked.
    pub async fn unlock<G: AdminGate>(&mut self, gate: &G, token: &str) -> Result<()> {
        gate.authorize(token).await?;
        self.unlocked = true;
        info!("admin panel unlocked");
        Ok(())
    }

    /// Lock the panel and discard any open form state.
    pub fn lock(&mut self) {
        self.unlocked = false;
        self.mode = AdminMode::Idle;
    }

    #[must_use]
    pub const fn is_unlocked(&self) -> bool {
        self.unlocked
    }

    #[must_use]
    pub const fn mode(&self) -> AdminMode {
        self.mode
    }

    /// Open the new-product form.
    pub fn open_add(&mut self) -> ModeChange {
        self.open(AdminMode::Editing(EditTarget::New))
    }

    /// Open the edit form for `id`.
    pub fn open_edit(&mut self, id: ProductId) -> ModeChange {
        self.open(AdminMode::Editing(EditTarget::Existing(id)))
    }

    /// Open the bulk stock view.
    pub fn open_bulk_stock(&mut self) -> ModeChange {
        self.open(AdminMode::BulkStock)
    }

    fn open(&mut self, mode: AdminMode) -> ModeChange {
        if self.mode != AdminMode::Idle {
            return ModeChange::Rejected;
        }
        self.mode = mode;
        ModeChange::Entered
    }

    /// Close the open form without saving.
    pub fn close(&mut self) {
        self.mode = AdminMode::Idle;
    }

    fn ensure_unlocked(&self) -> Result<()> {
        if self.unlocked {
            Ok(())
        } else {
            Err(StoreError::Gate("admin panel is locked".to_owned()))
        }
    }

    /// Save the open product form: insert or update per the edit target.
    ///
    /// On success the form closes, the mirror is patched with the returned
    /// row, and the memoized lists are invalidated.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for bad input, [`StoreError::Gate`] when locked or
    /// no form is open, or the backend's failure; local state is untouched
    /// and the form stays open in every error case.
    #[instrument(skip(self, form), fields(mode = ?self.mode))]
    pub async fn save(&mut self, form: &ProductForm) -> Result<Product> {
        self.ensure_unlocked()?;
        let AdminMode::Editing(target) = self.mode else {
            return Err(StoreError::Gate("no product form is open".to_owned()));
        };

        let draft = form.validate().map_err(StoreError::Validation)?;

        let saved = match target {
            EditTarget::New => self.cache.backend().insert_returning(&draft).await?,
            EditTarget::Existing(id) => self.cache.backend().update_returning(id, &draft).await?,
        };

        info!(id = %saved.id, sku = %saved.sku, "product saved");
        self.cache.update_local_product(saved.clone());
        self.cache.invalidate();
        self.mode = AdminMode::Idle;
        Ok(saved)
    }

    /// Delete the identified row.
    ///
    /// # Errors
    ///
    /// [`StoreError::Gate`] when locked, or the backend's failure; the
    /// mirror is untouched on failure.
    #[instrument(skip(self))]
    pub async fn delete(&mut self, id: ProductId) -> Result<()> {
        self.ensure_unlocked()?;
        self.cache.backend().delete(id).await?;

        info!(%id, "product deleted");
        self.cache.remove_local_product(id);
        self.cache.invalidate();
        Ok(())
    }

    /// Write a single stock level from the bulk-stock view.
    ///
    /// # Errors
    ///
    /// [`ValidationError::InvalidStock`], [`StoreError::Gate`] when locked,
    /// or the backend's failure.
    #[instrument(skip(self, form))]
    pub async fn set_stock(&mut self, id: ProductId, form: &StockForm) -> Result<Product> {
        self.ensure_unlocked()?;
        let stock = form.validate().map_err(StoreError::Validation)?;

        let saved = self.cache.backend().update_stock_returning(id, stock).await?;

        info!(%id, stock, "stock updated");
        self.cache.update_local_product(saved.clone());
        self.cache.invalidate();
        self.mode = AdminMode::Idle;
        Ok(saved)
    }
}
