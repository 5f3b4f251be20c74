use core::convert::Infallible;

use serde::{Deserialize, Serialize};

use storefront_core::{Aggregate, Amount, Entity, ProductId};
use storefront_events::Event;

use crate::item::CartItem;

/// Aggregate: the cart.
///
/// Holds the ordered item list plus the two derived totals. The totals are
/// recomputed from `items` after every applied event and are never patched
/// incrementally.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CartState {
    items: Vec<CartItem>,
    subtotal: Amount,
    unit_count: u64,
}

/// Largest quantity a single line can hold. `SetQuantity` clamps to it and
/// `AddItem` stops incrementing there.
pub const MAX_LINE_QUANTITY: u32 = u32::MAX;

impl CartState {
    /// Empty cart (the defaults).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Seed a cart from previously persisted items.
    ///
    /// Input is normalised so the invariants hold even for hand-edited or
    /// stale records: zero-quantity lines are dropped and only the first line
    /// for a given product id is kept.
    pub fn from_items(items: impl IntoIterator<Item = CartItem>) -> Self {
        let mut state = Self::default();
        for item in items {
            if item.quantity == 0 {
                tracing::warn!(product_id = %item.id, "dropping zero-quantity cart line");
                continue;
            }
            if state.position(item.id).is_some() {
                tracing::warn!(product_id = %item.id, "dropping duplicate cart line");
                continue;
            }
            state.items.push(item);
        }
        state.recompute();
        state
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn subtotal(&self) -> Amount {
        self.subtotal
    }

    /// Total units across all lines. Widened so the sum of line quantities
    /// is always exact.
    pub fn unit_count(&self) -> u64 {
        self.unit_count
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: ProductId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn position(&self, id: ProductId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    fn recompute(&mut self) {
        self.subtotal = self.items.iter().map(CartItem::line_total).sum();
        self.unit_count = self.items.iter().map(|item| u64::from(item.quantity)).sum();
    }
}

/// Commands accepted by the cart. All of them are total: they never fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartCommand {
    /// Add one unit of a product. The payload's `quantity` is ignored.
    AddItem(CartItem),
    RemoveItem { id: ProductId },
    /// Replace the quantity of a line; `quantity <= 0` removes it and values
    /// above [`MAX_LINE_QUANTITY`] are clamped to it.
    SetQuantity { id: ProductId, quantity: i64 },
    ClearCart,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CartEvent {
    /// A new line, always with quantity 1.
    ItemAdded(CartItem),
    QuantityIncremented { id: ProductId, quantity: u32 },
    QuantityChanged { id: ProductId, quantity: u32 },
    ItemRemoved { id: ProductId },
    CartCleared,
}

impl Event for CartEvent {
    fn event_type(&self) -> &'static str {
        match self {
            CartEvent::ItemAdded(_) => "cart.item_added",
            CartEvent::QuantityIncremented { .. } => "cart.quantity_incremented",
            CartEvent::QuantityChanged { .. } => "cart.quantity_changed",
            CartEvent::ItemRemoved { .. } => "cart.item_removed",
            CartEvent::CartCleared => "cart.cleared",
        }
    }

    fn version(&self) -> u32 {
        1
    }
}

impl Aggregate for CartState {
    type Command = CartCommand;
    type Event = CartEvent;
    type Error = Infallible;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            CartEvent::ItemAdded(item) => {
                // First line per id wins, same rule as `from_items`.
                if item.quantity > 0 && self.position(item.id).is_none() {
                    self.items.push(item.clone());
                }
            }
            CartEvent::QuantityIncremented { id, quantity }
            | CartEvent::QuantityChanged { id, quantity } => {
                if let Some(pos) = self.position(*id) {
                    if *quantity == 0 {
                        self.items.remove(pos);
                    } else {
                        self.items[pos].quantity = *quantity;
                    }
                }
            }
            CartEvent::ItemRemoved { id } => {
                self.items.retain(|item| item.id() != *id);
            }
            CartEvent::CartCleared => {
                self.items.clear();
            }
        }

        self.recompute();
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        let events = match command {
            CartCommand::AddItem(item) => self.handle_add(item),
            CartCommand::RemoveItem { id } => self.handle_remove(*id),
            CartCommand::SetQuantity { id, quantity } => {
                self.handle_set_quantity(*id, *quantity)
            }
            CartCommand::ClearCart => vec![CartEvent::CartCleared],
        };
        Ok(events)
    }
}

impl CartState {
    fn handle_add(&self, item: &CartItem) -> Vec<CartEvent> {
        match self.get(item.id) {
            Some(existing) if existing.quantity >= MAX_LINE_QUANTITY => Vec::new(),
            // Existing line keeps its own metadata; only the count moves.
            Some(existing) => vec![CartEvent::QuantityIncremented {
                id: existing.id,
                quantity: existing.quantity + 1,
            }],
            None => vec![CartEvent::ItemAdded(CartItem {
                quantity: 1,
                ..item.clone()
            })],
        }
    }

    fn handle_remove(&self, id: ProductId) -> Vec<CartEvent> {
        if self.position(id).is_none() {
            return Vec::new();
        }
        vec![CartEvent::ItemRemoved { id }]
    }

    fn handle_set_quantity(&self, id: ProductId, quantity: i64) -> Vec<CartEvent> {
        let Some(existing) = self.get(id) else {
            return Vec::new();
        };

        if quantity <= 0 {
            return vec![CartEvent::ItemRemoved { id }];
        }

        let quantity = u32::try_from(quantity).unwrap_or(MAX_LINE_QUANTITY);
        if quantity == existing.quantity {
            return Vec::new();
        }

        vec![CartEvent::QuantityChanged { id, quantity }]
    }
}
