//! The shopper's cart. Local to one browsing session; every mutation is
//! written through to a [`KeyValueStore`] snapshot.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::domain::{CartLine, MenuItem};
use crate::storage::KeyValueStore;

/// Key of the persisted cart snapshot.
pub const CART_SNAPSHOT_KEY: &str = "restaurant-cart";

pub struct CartStore {
    lines: Vec<CartLine>,
    storage: Arc<dyn KeyValueStore>,
}

impl CartStore {
    /// Restores the cart from `storage`. A missing, unparsable or non-array
    /// snapshot gives an empty cart; lines that break the quantity or price
    /// rules are dropped.
    pub fn restore(storage: Arc<dyn KeyValueStore>) -> Self {
        let lines = storage
            .get(CART_SNAPSHOT_KEY)
            .map(|raw| parse_snapshot(&raw))
            .unwrap_or_default();
        debug!(line_count = lines.len(), "Cart restored");
        Self { lines, storage }
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Adds one unit of `item`. Items without a positive, finite price or
    /// without an id or name are ignored.
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    pub fn add_item(&mut self, item: &MenuItem) {
        if !is_valid_price(item.price) || item.id.is_empty() || item.name.is_empty() {
            debug!(price = item.price, "Ignoring invalid menu item");
            return;
        }
        match self.lines.iter_mut().find(|line| line.item_id == item.id) {
            Some(line) => line.quantity = line.quantity.saturating_add(1),
            None => self.lines.push(CartLine::from(item)),
        }
        self.persist();
    }

    pub fn remove_item(&mut self, id: &str) {
        let before = self.lines.len();
        self.lines.retain(|line| line.item_id != id);
        if self.lines.len() != before {
            self.persist();
        }
    }

    /// Sets the quantity to `⌊quantity⌋`. Anything that is not a finite number
    /// of at least 1 removes the line instead.
    pub fn update_quantity(&mut self, id: &str, quantity: f64) {
        if !quantity.is_finite() || quantity < 1.0 {
            self.remove_item(id);
            return;
        }
        let quantity = quantity.floor().min(f64::from(u32::MAX)) as u32;
        if let Some(line) = self.lines.iter_mut().find(|line| line.item_id == id) {
            line.quantity = quantity;
            self.persist();
        }
    }

    pub fn clear_cart(&mut self) {
        self.lines.clear();
        self.persist();
    }

    /// Saturates at `u32::MAX`.
    pub fn total_items(&self) -> u32 {
        self.lines.iter().fold(0u32, |total, line| total.saturating_add(line.quantity))
    }

    pub fn total_price(&self) -> f64 {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.lines) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "Could not serialise cart");
                return;
            }
        };
        if let Err(e) = self.storage.set(CART_SNAPSHOT_KEY, json) {
            warn!(error = %e, "Could not persist cart snapshot");
        }
    }
}

fn is_valid_price(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn parse_snapshot(raw: &str) -> Vec<CartLine> {
    let value: serde_json::Value = match serde_json::from_str(raw) {
        Ok(value) => value,
        Err(e) => {
            warn!(error = %e, "Cart snapshot is not JSON; starting empty");
            return Vec::new();
        }
    };
    if !value.is_array() {
        warn!("Cart snapshot is not an array; starting empty");
        return Vec::new();
    }
    match serde_json::from_value::<Vec<CartLine>>(value) {
        Ok(lines) => lines
            .into_iter()
            .filter(|line| line.quantity >= 1 && is_valid_price(line.unit_price))
            .collect(),
        Err(e) => {
            warn!(error = %e, "Cart snapshot has malformed lines; starting empty");
            Vec::new()
        }
    }
}
