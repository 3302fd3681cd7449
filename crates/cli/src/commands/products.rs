//! Catalog read commands.
//!
//! # Usage
//!
//! ```bash
//! # Active products, the storefront view
//! headshop products list
//!
//! # Every row, the admin view
//! headshop products list --all
//!
//! # One product by SKU
//! headshop products show BG-30
//! ```
//!
//! # Environment Variables
//!
//! - `HEADSHOP_CATALOG_URL` - Persistence-service base URL
//! - `HEADSHOP_CATALOG_API_KEY` - Persistence-service API key

use tracing::info;

use headshop_core::Sku;
use headshop_storefront::backend::RestBackend;
use headshop_storefront::cache::ProductCache;

/// List the catalog, active rows only unless `all`.
///
/// # Errors
///
/// Returns an error if configuration is incomplete or the fetch fails.
pub async fn list(all: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = super::load_config()?;
    let cache = ProductCache::new(RestBackend::new(&config.catalog)?);

    let products = if all {
        cache.get_admin_products().await?
    } else {
        cache.get_products().await?
    };

    info!(count = products.len(), all, "catalog fetched");
    for product in products.iter() {
        info!(
            sku = %product.sku,
            title = %product.title,
            price = %product.price,
            stock = product.stock,
            active = product.active,
            category = product.category.as_ref().map(headshop_core::Category::id),
            id = %product.id,
            "product"
        );
    }
    Ok(())
}

/// Show one product by SKU.
///
/// # Errors
///
/// Returns an error if configuration is incomplete, the fetch fails, or the
/// SKU is unknown.
pub async fn show(sku: &str) -> Result<(), Box<dyn std::error::Error>> {
    let sku = Sku::parse(sku)?;
    let config = super::load_config()?;
    let cache = ProductCache::new(RestBackend::new(&config.catalog)?);

    // warm the mirror with the full table so inactive rows resolve too
    cache.get_admin_products().await?;

    let product = cache
        .get_product_by_sku(&sku)
        .ok_or_else(|| format!("No product with SKU {sku}"))?;

    info!(
        sku = %product.sku,
        title = %product.title,
        price = %product.price,
        stock = product.stock,
        active = product.active,
        description = %product.description,
        image_url = %product.image_url,
        id = %product.id,
        "product"
    );
    Ok(())
}
