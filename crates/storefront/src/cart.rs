//! Cart store: SKU -> quantity with the stock-bound invariant.
//!
//! Quantities are strictly positive; a decrement that would reach zero
//! removes the line. `add` enforces the stock bound on every increment, not
//! just at checkout. All mutations are synchronous and total - they can
//! never leave the map holding a zero or negative quantity.
//!
//! The cart exists only for the session: created empty, cleared on
//! successful checkout or explicit clear, never persisted.

use std::collections::BTreeMap;

use tokio::sync::watch;

use headshop_core::Sku;

use crate::notify::ChangeNotifier;

/// Result of an [`CartStore::add`] attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Quantity after the increment.
    Added(u32),
    /// Known stock already reached; the cart is unchanged.
    OutOfStock,
}

/// The session cart.
#[derive(Debug, Default)]
pub struct CartStore {
    lines: BTreeMap<Sku, u32>,
    notifier: ChangeNotifier,
}

impl CartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one unit of `sku`, bounded by `stock`.
    ///
    /// Returns [`AddOutcome::OutOfStock`] (leaving the cart unchanged) when
    /// the current quantity already equals the known stock.
    pub fn add(&mut self, sku: &Sku, stock: u32) -> AddOutcome {
        let current = self.quantity(sku);
        if current >= stock {
            return AddOutcome::OutOfStock;
        }

        let next = current + 1;
        self.lines.insert(sku.clone(), next);
        self.notifier.notify();
        AddOutcome::Added(next)
    }

    /// Reduce the quantity for `sku` by one; removes the line at zero.
    ///
    /// A decrement of an absent SKU is a no-op.
    pub fn decrement(&mut self, sku: &Sku) {
        match self.lines.get_mut(sku) {
            Some(qty) if *qty > 1 => {
                *qty -= 1;
                self.notifier.notify();
            }
            Some(_) => {
                self.lines.remove(sku);
                self.notifier.notify();
            }
            None => {}
        }
    }

    /// Remove the whole line regardless of quantity; no-op for absent SKUs.
    pub fn remove_line(&mut self, sku: &Sku) {
        if self.lines.remove(sku).is_some() {
            self.notifier.notify();
        }
    }

    /// Empty the cart. Returns `false` (and notifies nobody) when already
    /// empty, so callers can skip the user-facing notice.
    pub fn clear(&mut self) -> bool {
        if self.lines.is_empty() {
            return false;
        }
        self.lines.clear();
        self.notifier.notify();
        true
    }

    /// Quantity currently in the cart for `sku` (zero when absent).
    #[must_use]
    pub fn quantity(&self, sku: &Sku) -> u32 {
        self.lines.get(sku).copied().unwrap_or(0)
    }

    /// Iterate over the lines in SKU order.
    pub fn lines(&self) -> impl Iterator<Item = (&Sku, u32)> {
        self.lines.iter().map(|(sku, qty)| (sku, *qty))
    }

    /// Total unit count across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.values().sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Subscribe to cart changes.
    #[must_use]
    pub fn watch(&self) -> watch::Receiver<u64> {
        self.notifier.watch()
    }
}
