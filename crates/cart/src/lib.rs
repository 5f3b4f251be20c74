//! Client-side shopping cart (state container).
//!
//! This crate contains the cart's rules, implemented purely as deterministic
//! logic (no IO, no HTTP, no storage). Persistence subscribes to the store
//! from the outside.

pub mod cart;
pub mod checkout;
pub mod item;
pub mod selectors;
pub mod store;

pub use cart::{CartCommand, CartEvent, CartState, MAX_LINE_QUANTITY};
pub use checkout::{
    CheckoutDetails, CheckoutError, GuestContact, OrderLineRequest, OrderReceipt, OrderRequest,
    OrderService, PaymentMethod, submit_order,
};
pub use item::CartItem;
pub use store::{CartChange, CartStore};
