//! Session orchestrator tying the stores together.
//!
//! [`StorefrontSession`] owns the per-visitor state (cart, shipping,
//! notices, filters) and borrows the shared [`ProductCache`] through an
//! `Arc`. Its methods mirror the user-facing actions one-to-one; a UI layer
//! calls them and re-reads state on watch notifications.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info, instrument};

use headshop_core::{
    Category, Email, OrderRef, PostalCode, Product, ProductId, ServiceLevel, Sku, Totals,
};

use crate::Result;
use crate::backend::ProductBackend;
use crate::cache::ProductCache;
use crate::cart::{AddOutcome, CartStore};
use crate::error::{StoreError, ValidationError};
use crate::notice::NoticeBoard;
use crate::pricing;
use crate::shipping::{RateClient, ShippingState, parcel_weight_grams};

/// Notice shown after a successful cart add.
const NOTICE_ADDED: &str = "Produto adicionado ao carrinho";
/// Notice shown when an add would exceed the known stock.
const NOTICE_OUT_OF_STOCK: &str = "Estoque máximo atingido";
/// Notice shown after a completed checkout.
const NOTICE_ORDER_PLACED: &str = "Pedido realizado com sucesso";
/// Notice shown after a non-empty cart is emptied.
const NOTICE_CART_CLEARED: &str = "Carrinho limpo";

/// Maximum related products shown under a product view.
const RELATED_LIMIT: usize = 6;

/// Receipt of a completed (simulated) checkout.
#[derive(Debug, Clone)]
pub struct OrderSummary {
    pub order_ref: OrderRef,
    pub email: Email,
    pub destination: PostalCode,
    pub service: ServiceLevel,
    pub totals: Totals,
    pub placed_at: DateTime<Utc>,
}

/// Per-visitor storefront state.
pub struct StorefrontSession<B> {
    cache: Arc<ProductCache<B>>,
    cart: CartStore,
    shipping: ShippingState,
    notices: NoticeBoard,
    category_filter: Option<Category>,
}

impl<B: ProductBackend> StorefrontSession<B> {
    #[must_use]
    pub fn new(cache: Arc<ProductCache<B>>) -> Self {
        Self {
            cache,
            cart: CartStore::new(),
            shipping: ShippingState::new(),
            notices: NoticeBoard::new(),
            category_filter: None,
        }
    }

    // ------------------------------------------------------------------
    // Catalog views
    // ------------------------------------------------------------------

    /// Active products, narrowed by the category filter when one is set.
    ///
    /// # Errors
    ///
    /// Propagates the cache's backend failure when a refetch is needed.
    pub async fn products(&self) -> Result<Vec<Product>> {
        let all = self.cache.get_products().await?;
        let filtered = all
            .iter()
            .filter(|p| {
                self.category_filter
                    .as_ref()
                    .is_none_or(|wanted| p.category.as_ref() == Some(wanted))
            })
            .cloned()
            .collect();
        Ok(filtered)
    }

    /// Up to six other active products to show under a product view.
    ///
    /// # Errors
    ///
    /// Propagates the cache's backend failure when a refetch is needed.
    pub async fn related_products(&self, viewed: ProductId) -> Result<Vec<Product>> {
        let all = self.cache.get_products().await?;
        Ok(all
            .iter()
            .filter(|p| p.id != viewed)
            .take(RELATED_LIMIT)
            .cloned()
            .collect())
    }

    /// Set or clear the category filter; selecting the active category
    /// again clears it, as the filter bar toggles.
    pub fn toggle_category(&mut self, category: Category) {
        if self.category_filter.as_ref() == Some(&category) {
            self.category_filter = None;
        } else {
            self.category_filter = Some(category);
        }
    }

    #[must_use]
    pub const fn category_filter(&self) -> Option<&Category> {
        self.category_filter.as_ref()
    }

    // ------------------------------------------------------------------
    // Cart
    // ------------------------------------------------------------------

    /// Add one unit of `sku` to the cart, bounded by known stock.
    ///
    /// Resolves the product from the local mirror first and falls back to a
    /// list fetch for a cold cache. Posts the outcome as a notice either
    /// way.
    ///
    /// # Errors
    ///
    /// [`StoreError::NotFound`] when the SKU is unknown even after the
    /// fallback fetch, or the fetch's own failure.
    #[instrument(skip(self, now), fields(sku = %sku))]
    pub async fn add_to_cart(&mut self, sku: &Sku, now: Instant) -> Result<AddOutcome> {
        let product = match self.cache.get_product_by_sku(sku) {
            Some(product) => product,
            None => {
                debug!("sku not mirrored, falling back to list fetch");
                self.cache.get_products().await?;
                self.cache
                    .get_product_by_sku(sku)
                    .ok_or_else(|| StoreError::NotFound(format!("sku {sku}")))?
            }
        };

        let outcome = self.cart.add(sku, product.stock);
        match outcome {
            AddOutcome::Added(quantity) => {
                debug!(quantity, "cart line incremented");
                self.notices.post(NOTICE_ADDED, now);
            }
            AddOutcome::OutOfStock => {
                self.notices.post(NOTICE_OUT_OF_STOCK, now);
            }
        }
        Ok(outcome)
    }

    /// Remove one unit of `sku`; the line disappears at zero.
    pub fn decrement(&mut self, sku: &Sku) {
        self.cart.decrement(sku);
    }

    /// Drop a whole cart line regardless of quantity.
    pub fn remove_line(&mut self, sku: &Sku) {
        self.cart.remove_line(sku);
    }

    /// Empty the cart and forget the shipping quote, which was computed for
    /// the old contents. Clearing an already-empty cart stays silent.
    pub fn clear_cart(&mut self, now: Instant) {
        if self.cart.clear() {
            self.shipping.reset();
            self.notices.post(NOTICE_CART_CLEARED, now);
        }
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    // ------------------------------------------------------------------
    // Pricing and shipping
    // ------------------------------------------------------------------

    /// Current totals from cart, mirror prices, and the shipping selection.
    #[must_use]
    pub fn totals(&self) -> Totals {
        pricing::compute_totals(
            self.cart.lines(),
            |sku| self.cache.get_product_by_sku(sku),
            self.shipping.selection(),
            self.shipping.quote(),
        )
    }

    /// Subtotal still missing for the free-shipping progress display.
    #[must_use]
    pub fn free_shipping_gap(&self) -> Decimal {
        pricing::free_shipping_gap(self.totals().subtotal)
    }

    /// Fetch a shipping quote for the current cart.
    ///
    /// The request carries the cart weight at call time; if the cart weight
    /// changed while the request was in flight, the arriving quote is stale
    /// and is discarded instead of replacing the state.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for a bad postal code or an empty cart;
    /// [`QuoteError`](crate::shipping::QuoteError) on provider failure, in
    /// which case any previous quote and selection are cleared.
    #[instrument(skip(self, client))]
    pub async fn fetch_quote(&mut self, client: &RateClient, destination: &str) -> Result<()> {
        let destination = PostalCode::parse(destination)
            .map_err(|e| StoreError::Validation(ValidationError::PostalCode(e)))?;
        if self.cart.is_empty() {
            return Err(StoreError::Validation(ValidationError::EmptyCart));
        }

        let item_count = self.cart.item_count();
        match client.quote(&destination, item_count).await {
            Ok(quote) => {
                self.apply_quote(quote);
                Ok(())
            }
            Err(e) => {
                // No stale price may display after a failed fetch.
                self.shipping.reset();
                let err = StoreError::Quote(e);
                crate::error::report(&err);
                Err(err)
            }
        }
    }

    /// Install an arrived quote unless the cart weight moved on from the
    /// one it was computed for.
    ///
    /// Public for callers that drive the rate transport themselves; the
    /// staleness check applies either way.
    pub fn apply_quote(&mut self, quote: headshop_core::ShippingQuote) {
        let current_weight = parcel_weight_grams(self.cart.item_count());
        if quote.weight_grams != current_weight {
            debug!(
                quoted = quote.weight_grams,
                current = current_weight,
                "discarding stale shipping quote"
            );
            return;
        }
        self.shipping.set_quote(quote);
    }

    /// Choose a shipping option from the fetched quote.
    ///
    /// # Errors
    ///
    /// [`ValidationError::ShippingNotQuoted`] when no quote is held.
    pub fn select_shipping(&mut self, level: ServiceLevel) -> Result<()> {
        self.shipping.select(level).map_err(StoreError::Validation)
    }

    #[must_use]
    pub const fn shipping(&self) -> &ShippingState {
        &self.shipping
    }

    // ------------------------------------------------------------------
    // Checkout
    // ------------------------------------------------------------------

    /// Place the order: validate, log it, and reset cart and shipping.
    ///
    /// Checkout is a simulated sink; the order goes to the log only, and
    /// the returned [`OrderSummary`] is the caller's receipt.
    ///
    /// # Errors
    ///
    /// [`ValidationError`] for an empty cart, a bad email or postal code,
    /// or a missing quote or selection. Nothing is cleared on failure.
    #[instrument(skip_all)]
    pub fn checkout(&mut self, email: &str, postal_code: &str, now: Instant) -> Result<OrderSummary> {
        if self.cart.is_empty() {
            return Err(StoreError::Validation(ValidationError::EmptyCart));
        }
        let email = Email::parse(email)
            .map_err(|e| StoreError::Validation(ValidationError::Email(e)))?;
        let destination = PostalCode::parse(postal_code)
            .map_err(|e| StoreError::Validation(ValidationError::PostalCode(e)))?;
        let (Some(service), Some(_)) = (self.shipping.selection(), self.shipping.quote()) else {
            return Err(StoreError::Validation(ValidationError::ShippingNotQuoted));
        };

        let totals = self.totals();
        let order_ref = OrderRef::issue();
        info!(
            order = %order_ref,
            email = %email,
            destination = %destination,
            service = service.label(),
            total = %totals.total,
            items = self.cart.item_count(),
            "order placed"
        );

        self.cart.clear();
        self.shipping.reset();
        self.notices.post(NOTICE_ORDER_PLACED, now);

        Ok(OrderSummary {
            order_ref,
            email,
            destination,
            service,
            totals,
            placed_at: Utc::now(),
        })
    }

    // ------------------------------------------------------------------
    // Notices
    // ------------------------------------------------------------------

    /// The live notice, if any.
    pub fn notice(&mut self, now: Instant) -> Option<&str> {
        self.notices.current(now)
    }

    #[must_use]
    pub const fn notices(&self) -> &NoticeBoard {
        &self.notices
    }

    #[must_use]
    pub fn cache(&self) -> &ProductCache<B> {
        &self.cache
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use headshop_core::ShippingQuote;

    use crate::backend::testing::MockBackend;

    use super::*;

    fn product(sku: &str, price: Decimal, stock: u32, category: Option<Category>) -> Product {
        Product {
            id: ProductId::generate(),
            sku: Sku::parse(sku).unwrap(),
            title: format!("Product {sku}"),
            price,
            description: String::new(),
            image_url: String::new(),
            stock,
            active: true,
            category,
        }
    }

    fn session_with(products: Vec<Product>) -> (StorefrontSession<MockBackend>, MockBackend) {
        let backend = MockBackend::with_products(products);
        let cache = Arc::new(ProductCache::new(backend.clone()));
        (StorefrontSession::new(cache), backend)
    }

    fn quote_for_weight(weight_grams: u32) -> ShippingQuote {
        ShippingQuote {
            standard_rate: Decimal::new(25, 0),
            standard_days: "6".to_owned(),
            express_rate: Decimal::new(40, 0),
            express_days: "2".to_owned(),
            weight_grams,
            destination: PostalCode::parse("01310100").unwrap(),
            fetched_at: Utc::now(),
        }
    }

    fn sku(raw: &str) -> Sku {
        Sku::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_add_to_cart_falls_back_to_list_fetch_on_cold_cache() {
        let (mut session, backend) =
            session_with(vec![product("TS-01", Decimal::new(50, 0), 3, None)]);
        let now = Instant::now();

        let outcome = session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        assert_eq!(outcome, AddOutcome::Added(1));
        assert_eq!(backend.fetch_count(), 1);
        assert_eq!(session.notice(now), Some(NOTICE_ADDED));

        // mirror is warm now, no second fetch
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        assert_eq!(backend.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_add_to_cart_unknown_sku_is_not_found() {
        let (mut session, _) = session_with(vec![]);
        let err = session
            .add_to_cart(&sku("NOPE-01"), Instant::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
        assert!(session.cart().is_empty());
    }

    #[tokio::test]
    async fn test_add_past_stock_posts_out_of_stock_notice() {
        let (mut session, _) = session_with(vec![product("TS-01", Decimal::new(50, 0), 1, None)]);
        let now = Instant::now();

        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        let outcome = session.add_to_cart(&sku("TS-01"), now).await.unwrap();

        assert_eq!(outcome, AddOutcome::OutOfStock);
        assert_eq!(session.cart().item_count(), 1);
        assert_eq!(session.notice(now), Some(NOTICE_OUT_OF_STOCK));
    }

    #[tokio::test]
    async fn test_category_toggle_narrows_and_clears() {
        let (mut session, _) = session_with(vec![
            product("BG-01", Decimal::new(100, 0), 5, Some(Category::Bong)),
            product("GR-01", Decimal::new(60, 0), 5, Some(Category::Grinder)),
        ]);

        session.toggle_category(Category::Bong);
        let listed = session.products().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].sku.as_str(), "BG-01");

        session.toggle_category(Category::Bong);
        assert_eq!(session.category_filter(), None);
        assert_eq!(session.products().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_related_products_exclude_viewed_and_cap_at_six() {
        let products: Vec<Product> = (0..9)
            .map(|i| product(&format!("TS-{i:02}"), Decimal::new(10, 0), 1, None))
            .collect();
        let viewed = products[0].id;
        let (session, _) = session_with(products);

        let related = session.related_products(viewed).await.unwrap();
        assert_eq!(related.len(), 6);
        assert!(related.iter().all(|p| p.id != viewed));
    }

    #[tokio::test]
    async fn test_fresh_quote_applies_and_stale_quote_is_discarded() {
        let (mut session, _) = session_with(vec![product("TS-01", Decimal::new(50, 0), 5, None)]);
        let now = Instant::now();
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();

        // quoted for the current two-item cart
        session.apply_quote(quote_for_weight(700));
        assert!(session.shipping().quote().is_some());

        // cart moved on while another quote was in flight
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        session.apply_quote(quote_for_weight(700));
        assert_eq!(session.shipping().quote().unwrap().weight_grams, 700);

        session.apply_quote(quote_for_weight(1050));
        assert_eq!(session.shipping().quote().unwrap().weight_grams, 1050);
    }

    #[tokio::test]
    async fn test_totals_follow_selection() {
        let (mut session, _) = session_with(vec![product("TS-01", Decimal::new(50, 0), 5, None)]);
        let now = Instant::now();
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();

        assert_eq!(session.totals().shipping, Decimal::ZERO);

        session.apply_quote(quote_for_weight(350));
        session.select_shipping(ServiceLevel::Standard).unwrap();

        // 25 quoted - 4 discount = 21
        let totals = session.totals();
        assert_eq!(totals.shipping, Decimal::new(21, 0));
        assert_eq!(totals.total, Decimal::new(71, 0));
    }

    #[tokio::test]
    async fn test_checkout_requires_cart_email_and_selection() {
        let (mut session, _) = session_with(vec![product("TS-01", Decimal::new(50, 0), 5, None)]);
        let now = Instant::now();

        let err = session.checkout("a@b.com", "01310100", now).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::EmptyCart)
        ));

        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        let err = session.checkout("not-an-email", "01310100", now).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::Email(_))
        ));

        let err = session.checkout("a@b.com", "01310100", now).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::ShippingNotQuoted)
        ));

        // nothing was cleared by the failures
        assert_eq!(session.cart().item_count(), 1);
    }

    #[tokio::test]
    async fn test_checkout_clears_cart_and_shipping() {
        let (mut session, _) = session_with(vec![product("TS-01", Decimal::new(50, 0), 5, None)]);
        let now = Instant::now();
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        session.apply_quote(quote_for_weight(350));
        session.select_shipping(ServiceLevel::Express).unwrap();

        let summary = session.checkout("a@b.com", "01310-100", now).unwrap();

        assert_eq!(summary.service, ServiceLevel::Express);
        // express floor 28 dominates 40 - 4 = 36 -> 36
        assert_eq!(summary.totals.shipping, Decimal::new(36, 0));
        assert!(session.cart().is_empty());
        assert!(session.shipping().quote().is_none());
        assert_eq!(session.notice(now), Some(NOTICE_ORDER_PLACED));
    }

    #[tokio::test]
    async fn test_clear_cart_resets_shipping() {
        let (mut session, _) = session_with(vec![product("TS-01", Decimal::new(50, 0), 5, None)]);
        let now = Instant::now();
        session.add_to_cart(&sku("TS-01"), now).await.unwrap();
        session.apply_quote(quote_for_weight(350));

        session.clear_cart(now);
        assert!(session.cart().is_empty());
        assert!(session.shipping().quote().is_none());
        assert_eq!(session.notice(now), Some(NOTICE_CART_CLEARED));
    }

    #[tokio::test]
    async fn test_clear_cart_on_empty_cart_posts_no_notice() {
        let (mut session, _) = session_with(vec![]);
        let now = Instant::now();

        session.clear_cart(now);
        assert_eq!(session.notice(now), None);
    }
}
