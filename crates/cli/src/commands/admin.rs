//! Catalog write commands, gated by token introspection.
//!
//! # Usage
//!
//! ```bash
//! headshop admin -t $TOKEN create -s BG-30 --title "Glass Bong 30cm" -p 189.90 --stock 5
//! headshop admin -t $TOKEN update <id> -s BG-30 --title "Glass Bong 30cm" -p 159.90
//! headshop admin -t $TOKEN stock <id> 12
//! headshop admin -t $TOKEN delete <id>
//! ```
//!
//! # Environment Variables
//!
//! - `HEADSHOP_CATALOG_URL` / `HEADSHOP_CATALOG_API_KEY` - Persistence service
//! - `HEADSHOP_ADMIN_INTROSPECTION_URL` - Token introspection endpoint; all
//!   commands here refuse to run without it

use thiserror::Error;
use tracing::info;

use headshop_core::{Category, ProductId};
use headshop_storefront::admin::{AdminPanel, ProductForm, StockForm, TokenIntrospectionGate};
use headshop_storefront::backend::{BackendError, RestBackend};
use headshop_storefront::cache::ProductCache;
use headshop_storefront::config::{ConfigError, StorefrontConfig};

/// Errors specific to the admin commands.
#[derive(Debug, Error)]
pub enum AdminCommandError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Backend(#[from] BackendError),

    #[error(transparent)]
    Store(#[from] headshop_storefront::StoreError),

    /// The gate cannot run without an introspection endpoint.
    #[error("HEADSHOP_ADMIN_INTROSPECTION_URL is not set; admin commands are disabled")]
    GateNotConfigured,
}

/// Product fields shared by `create` and `update`.
#[derive(Debug, clap::Args)]
pub struct ProductArgs {
    /// Product SKU
    #[arg(short, long)]
    pub sku: String,

    /// Display title
    #[arg(long)]
    pub title: String,

    /// Unit price, e.g. 189.90
    #[arg(short, long)]
    pub price: String,

    /// Long description
    #[arg(long, default_value = "")]
    pub description: String,

    /// Image URL
    #[arg(long, default_value = "")]
    pub image_url: String,

    /// Units on hand
    #[arg(long, default_value_t = 0)]
    pub stock: u32,

    /// Hide the product from the storefront view
    #[arg(long)]
    pub inactive: bool,

    /// Category id (dichavador, bong, seda, vaporizador, or free text)
    #[arg(long)]
    pub category: Option<String>,
}

impl From<ProductArgs> for ProductForm {
    fn from(args: ProductArgs) -> Self {
        Self {
            sku: args.sku,
            title: args.title,
            price: args.price,
            description: args.description,
            image_url: args.image_url,
            stock: args.stock.to_string(),
            active: !args.inactive,
            category: args.category.map(Category::from),
        }
    }
}

struct Workbench {
    cache: ProductCache<RestBackend>,
    gate: TokenIntrospectionGate,
}

impl Workbench {
    fn from_env() -> Result<Self, AdminCommandError> {
        let config: StorefrontConfig = super::load_config()?;
        let gate_url = config
            .admin_introspection_url
            .clone()
            .ok_or(AdminCommandError::GateNotConfigured)?;

        Ok(Self {
            cache: ProductCache::new(RestBackend::new(&config.catalog)?),
            gate: TokenIntrospectionGate::new(gate_url),
        })
    }

    async fn unlocked_panel(
        &self,
        token: &str,
    ) -> Result<AdminPanel<'_, RestBackend>, AdminCommandError> {
        let mut panel = AdminPanel::new(&self.cache);
        panel.unlock(&self.gate, token).await?;
        Ok(panel)
    }
}

/// Create a product.
///
/// # Errors
///
/// Returns an error if the gate refuses the token, the fields fail
/// validation, or the write fails.
pub async fn create(token: &str, fields: ProductArgs) -> Result<(), AdminCommandError> {
    let bench = Workbench::from_env()?;
    let mut panel = bench.unlocked_panel(token).await?;

    let _ = panel.open_add();
    let saved = panel.save(&ProductForm::from(fields)).await?;

    info!(id = %saved.id, sku = %saved.sku, "product created");
    Ok(())
}

/// Update a product in place.
///
/// # Errors
///
/// Returns an error if the gate refuses the token, the fields fail
/// validation, or the write fails.
pub async fn update(
    token: &str,
    id: uuid::Uuid,
    fields: ProductArgs,
) -> Result<(), AdminCommandError> {
    let bench = Workbench::from_env()?;
    let mut panel = bench.unlocked_panel(token).await?;

    let _ = panel.open_edit(ProductId::new(id));
    let saved = panel.save(&ProductForm::from(fields)).await?;

    info!(id = %saved.id, sku = %saved.sku, "product updated");
    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns an error if the gate refuses the token or the delete fails.
pub async fn delete(token: &str, id: uuid::Uuid) -> Result<(), AdminCommandError> {
    let bench = Workbench::from_env()?;
    let mut panel = bench.unlocked_panel(token).await?;

    panel.delete(ProductId::new(id)).await?;

    info!(%id, "product deleted");
    Ok(())
}

/// Set a product's stock level.
///
/// # Errors
///
/// Returns an error if the gate refuses the token or the write fails.
pub async fn set_stock(token: &str, id: uuid::Uuid, stock: u32) -> Result<(), AdminCommandError> {
    let bench = Workbench::from_env()?;
    let mut panel = bench.unlocked_panel(token).await?;

    let saved = panel
        .set_stock(
            ProductId::new(id),
            &StockForm {
                stock: stock.to_string(),
            },
        )
        .await?;

    info!(id = %saved.id, stock = saved.stock, "stock updated");
    Ok(())
}
