//! The product record mirrored from the persistence service.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{ProductId, Sku};

/// A product row as owned by the persistence service.
///
/// The storefront holds a read-only mirror of these records plus pending
/// local patches applied after confirmed remote writes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Opaque row identifier (persistence-service key).
    pub id: ProductId,
    /// Stable user-facing key, unique across the catalog.
    pub sku: Sku,
    pub title: String,
    /// Unit price in currency units; never negative.
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    /// Units on hand; the cart's stock bound is checked against this.
    pub stock: u32,
    /// Inactive products are hidden from the storefront view but still
    /// visible to the admin view.
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Product {
    /// Whether the storefront view should list this product.
    #[must_use]
    pub const fn is_storefront_visible(&self) -> bool {
        self.active
    }
}

/// A validated product payload for a create or update write.
///
/// Drafts carry no identifier: the persistence service assigns one on insert
/// and the update path addresses the row separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDraft {
    pub sku: Sku,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    pub stock: u32,
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

/// Product category.
///
/// The persistence service stores categories as free strings; the four known
/// values get their own variants and anything else round-trips through
/// [`Category::Other`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Grinder,
    Bong,
    RollingPaper,
    Vaporizer,
    Other(String),
}

impl Category {
    /// Stable identifier as stored by the persistence service.
    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Grinder => "dichavador",
            Self::Bong => "bong",
            Self::RollingPaper => "seda",
            Self::Vaporizer => "vaporizador",
            Self::Other(s) => s,
        }
    }

    /// Human-readable label for display.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Grinder => "Grinders",
            Self::Bong => "Bongs",
            Self::RollingPaper => "Rolling Papers",
            Self::Vaporizer => "Vaporizers",
            Self::Other(s) => s,
        }
    }

    /// The categories offered by the storefront filter bar.
    #[must_use]
    pub const fn known() -> [Self; 4] {
        [Self::Grinder, Self::Bong, Self::RollingPaper, Self::Vaporizer]
    }
}

impl From<String> for Category {
    fn from(s: String) -> Self {
        match s.as_str() {
            "dichavador" => Self::Grinder,
            "bong" => Self::Bong,
            "seda" => Self::RollingPaper,
            "vaporizador" => Self::Vaporizer,
            _ => Self::Other(s),
        }
    }
}

impl From<Category> for String {
    fn from(c: Category) -> Self {
        c.id().to_owned()
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn product(sku: &str, stock: u32, active: bool) -> Product {
        Product {
            id: ProductId::generate(),
            sku: Sku::parse(sku).unwrap(),
            title: format!("Product {sku}"),
            price: Decimal::new(4500, 2),
            description: String::new(),
            image_url: String::new(),
            stock,
            active,
            category: None,
        }
    }

    #[test]
    fn test_storefront_visibility_follows_active_flag() {
        assert!(product("TS-01", 3, true).is_storefront_visible());
        assert!(!product("TS-02", 3, false).is_storefront_visible());
    }

    #[test]
    fn test_category_roundtrip_known() {
        let json = "\"bong\"";
        let cat: Category = serde_json::from_str(json).unwrap();
        assert_eq!(cat, Category::Bong);
        assert_eq!(serde_json::to_string(&cat).unwrap(), json);
    }

    #[test]
    fn test_category_roundtrip_unknown() {
        let json = "\"incense\"";
        let cat: Category = serde_json::from_str(json).unwrap();
        assert_eq!(cat, Category::Other("incense".to_owned()));
        assert_eq!(serde_json::to_string(&cat).unwrap(), json);
    }

    #[test]
    fn test_product_serde_defaults_optional_fields() {
        let json = serde_json::json!({
            "id": uuid::Uuid::new_v4(),
            "sku": "VP-09",
            "title": "Desktop Vaporizer",
            "price": "349.90",
            "stock": 2,
            "active": true
        });
        let product: Product = serde_json::from_value(json).unwrap();
        assert_eq!(product.description, "");
        assert_eq!(product.category, None);
        assert_eq!(product.price, Decimal::new(34990, 2));
    }
}
