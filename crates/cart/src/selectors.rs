//! Read projections over a cart snapshot.
//!
//! These never sum anything themselves; totals come from the derived fields
//! stored on the snapshot.

use storefront_core::{Amount, ProductId};

use crate::cart::CartState;
use crate::item::CartItem;

pub fn items(state: &CartState) -> &[CartItem] {
    state.items()
}

pub fn subtotal(state: &CartState) -> Amount {
    state.subtotal()
}

/// Badge count for the cart icon.
pub fn unit_count(state: &CartState) -> u64 {
    state.unit_count()
}

pub fn find_item(state: &CartState, id: ProductId) -> Option<&CartItem> {
    state.get(id)
}

pub fn is_empty(state: &CartState) -> bool {
    state.is_empty()
}

/// Non-empty and every line still had stock when it was added.
///
/// The order service re-checks stock authoritatively; this only gates the
/// checkout button.
pub fn is_checkout_ready(state: &CartState) -> bool {
    !state.is_empty() && state.items().iter().all(CartItem::is_in_stock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::CategoryId;

    fn line(id: i64, price: f64, quantity: u32, stock: u32) -> CartItem {
        let mut item = CartItem::new(
            ProductId::from_raw(id),
            "x",
            Amount::new(price),
            stock,
            CategoryId::from_raw(1),
        );
        item.quantity = quantity;
        item
    }

    #[test]
    fn projections_read_stored_totals() {
        let state = CartState::from_items(vec![line(1, 100.0, 1, 3), line(2, 50.0, 2, 3)]);

        assert_eq!(items(&state).len(), 2);
        assert_eq!(subtotal(&state), Amount::new(200.0));
        assert_eq!(unit_count(&state), 3);
        assert_eq!(find_item(&state, ProductId::from_raw(2)).unwrap().quantity, 2);
        assert!(find_item(&state, ProductId::from_raw(9)).is_none());
    }

    #[test]
    fn checkout_requires_items_with_stock() {
        assert!(!is_checkout_ready(&CartState::empty()));
        assert!(is_empty(&CartState::empty()));

        let ready = CartState::from_items(vec![line(1, 1.0, 1, 2)]);
        assert!(is_checkout_ready(&ready));

        let sold_out = CartState::from_items(vec![line(1, 1.0, 1, 2), line(2, 1.0, 1, 0)]);
        assert!(!is_checkout_ready(&sold_out));
    }
}
