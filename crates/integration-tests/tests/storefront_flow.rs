//! Visitor journey: browse, filter, cart, quote, checkout.
//!
//! Drives a [`StorefrontSession`] over the in-memory mock backend from a
//! cold cache to a completed checkout.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use rust_decimal::Decimal;

use headshop_core::{Category, PostalCode, ServiceLevel, ShippingQuote, Sku};
use headshop_integration_tests::product;
use headshop_storefront::backend::testing::MockBackend;
use headshop_storefront::cache::ProductCache;
use headshop_storefront::cart::AddOutcome;
use headshop_storefront::error::{StoreError, ValidationError};
use headshop_storefront::pricing::FREE_SHIPPING_THRESHOLD;
use headshop_storefront::session::StorefrontSession;
use headshop_storefront::shipping::parcel_weight_grams;

fn sku(raw: &str) -> Sku {
    Sku::parse(raw).unwrap()
}

fn quote_for(items: u32, standard: Decimal, express: Decimal) -> ShippingQuote {
    ShippingQuote {
        standard_rate: standard,
        standard_days: "6".to_owned(),
        express_rate: express,
        express_days: "2".to_owned(),
        weight_grams: parcel_weight_grams(items),
        destination: PostalCode::parse("01310100").unwrap(),
        fetched_at: Utc::now(),
    }
}

fn seeded_session() -> (StorefrontSession<MockBackend>, MockBackend) {
    let backend = MockBackend::with_products(vec![
        product("BG-30", Decimal::new(18990, 2), 4, Some(Category::Bong)),
        product("GR-01", Decimal::new(5990, 2), 10, Some(Category::Grinder)),
        product("SD-10", Decimal::new(990, 2), 50, Some(Category::RollingPaper)),
    ]);
    let cache = Arc::new(ProductCache::new(backend.clone()));
    (StorefrontSession::new(cache), backend)
}

#[tokio::test]
async fn test_browse_filter_and_add_from_cold_cache() {
    let (mut session, backend) = seeded_session();
    let now = Instant::now();

    // cold cache: the first add falls back to one list fetch
    let outcome = session.add_to_cart(&sku("GR-01"), now).await.unwrap();
    assert_eq!(outcome, AddOutcome::Added(1));
    assert_eq!(backend.fetch_count(), 1);

    // browsing reuses the memoized list
    assert_eq!(session.products().await.unwrap().len(), 3);
    assert_eq!(backend.fetch_count(), 1);

    session.toggle_category(Category::Bong);
    let bongs = session.products().await.unwrap();
    assert_eq!(bongs.len(), 1);
    assert_eq!(bongs[0].sku.as_str(), "BG-30");
}

#[tokio::test]
async fn test_cart_to_checkout_journey() {
    let (mut session, _backend) = seeded_session();
    let now = Instant::now();

    // two bongs and one grinder: 2 * 189.90 + 59.90 = 439.70
    session.add_to_cart(&sku("BG-30"), now).await.unwrap();
    session.add_to_cart(&sku("BG-30"), now).await.unwrap();
    session.add_to_cart(&sku("GR-01"), now).await.unwrap();

    let totals = session.totals();
    assert_eq!(totals.subtotal, Decimal::new(43970, 2));
    assert_eq!(totals.shipping, Decimal::ZERO);
    assert!(totals.subtotal > FREE_SHIPPING_THRESHOLD);
    assert_eq!(session.free_shipping_gap(), Decimal::ZERO);

    // checkout refuses until shipping is quoted and chosen
    let err = session.checkout("ana@example.com", "01310100", now).unwrap_err();
    assert!(matches!(
        err,
        StoreError::Validation(ValidationError::ShippingNotQuoted)
    ));

    session.apply_quote(quote_for(3, Decimal::new(25, 0), Decimal::new(40, 0)));
    session.select_shipping(ServiceLevel::Standard).unwrap();

    // 25 - 4 discount = 21
    let totals = session.totals();
    assert_eq!(totals.shipping, Decimal::new(21, 0));
    assert_eq!(totals.total, Decimal::new(46070, 2));

    let summary = session.checkout("ana@example.com", "01310100", now).unwrap();
    assert_eq!(summary.totals.total, Decimal::new(46070, 2));
    assert_eq!(summary.service, ServiceLevel::Standard);

    // the session is reset for the next order
    assert!(session.cart().is_empty());
    assert!(session.shipping().quote().is_none());
    assert_eq!(session.totals().subtotal, Decimal::ZERO);
}

#[tokio::test]
async fn test_stock_bound_holds_across_the_journey() {
    let (mut session, _backend) = seeded_session();
    let now = Instant::now();
    let bong = sku("BG-30");

    for _ in 0..4 {
        assert!(matches!(
            session.add_to_cart(&bong, now).await.unwrap(),
            AddOutcome::Added(_)
        ));
    }
    assert_eq!(
        session.add_to_cart(&bong, now).await.unwrap(),
        AddOutcome::OutOfStock
    );
    assert_eq!(session.cart().quantity(&bong), 4);

    // decrement reopens exactly one slot
    session.decrement(&bong);
    assert_eq!(
        session.add_to_cart(&bong, now).await.unwrap(),
        AddOutcome::Added(4)
    );
}

#[tokio::test]
async fn test_stale_quote_is_discarded_after_cart_change() {
    let (mut session, _backend) = seeded_session();
    let now = Instant::now();

    session.add_to_cart(&sku("SD-10"), now).await.unwrap();
    let stale = quote_for(1, Decimal::new(25, 0), Decimal::new(40, 0));

    // the cart grows while the quote is "in flight"
    session.add_to_cart(&sku("SD-10"), now).await.unwrap();
    session.apply_quote(stale);
    assert!(session.shipping().quote().is_none());

    // a quote matching the current weight lands normally
    session.apply_quote(quote_for(2, Decimal::new(25, 0), Decimal::new(40, 0)));
    assert_eq!(
        session.shipping().quote().unwrap().weight_grams,
        parcel_weight_grams(2)
    );
}

#[tokio::test]
async fn test_new_quote_resets_service_selection() {
    let (mut session, _backend) = seeded_session();
    let now = Instant::now();

    session.add_to_cart(&sku("SD-10"), now).await.unwrap();
    session.apply_quote(quote_for(1, Decimal::new(25, 0), Decimal::new(40, 0)));
    session.select_shipping(ServiceLevel::Express).unwrap();
    assert_eq!(session.shipping().selection(), Some(ServiceLevel::Express));

    session.apply_quote(quote_for(1, Decimal::new(30, 0), Decimal::new(45, 0)));
    assert_eq!(session.shipping().selection(), None);
    assert_eq!(session.totals().shipping, Decimal::ZERO);
}
