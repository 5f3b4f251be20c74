//! Checkout boundary.
//!
//! The order service is the authority on stock and price; the cart only
//! hands over what the shopper picked. A successful order empties the cart.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use storefront_core::{Amount, DomainError, DomainResult, ProductId};

use crate::cart::{CartCommand, CartState};
use crate::store::CartStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Card,
    Cash,
    Online,
}

/// Contact details for orders placed without an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestContact {
    pub email: String,
    pub name: String,
    pub phone: String,
}

/// Everything the shopper fills in on the checkout form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutDetails {
    pub shipping_address: String,
    pub billing_address: String,
    pub payment_method: PaymentMethod,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guest: Option<GuestContact>,
}

impl CheckoutDetails {
    pub fn validate(&self) -> DomainResult<()> {
        if self.shipping_address.trim().is_empty() {
            return Err(DomainError::validation("shipping address is required"));
        }
        if self.billing_address.trim().is_empty() {
            return Err(DomainError::validation("billing address is required"));
        }
        if let Some(guest) = &self.guest {
            if !guest.email.contains('@') {
                return Err(DomainError::validation("guest email is malformed"));
            }
            if guest.name.trim().is_empty() {
                return Err(DomainError::validation("guest name is required"));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLineRequest {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Payload handed to the order service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub items: Vec<OrderLineRequest>,
    #[serde(flatten)]
    pub details: CheckoutDetails,
}

impl OrderRequest {
    pub fn from_snapshot(state: &CartState, details: CheckoutDetails) -> Self {
        Self {
            items: state
                .items()
                .iter()
                .map(|item| OrderLineRequest {
                    product_id: item.id,
                    quantity: item.quantity,
                })
                .collect(),
            details,
        }
    }
}

/// What the order service returns for an accepted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderReceipt {
    pub order_id: i64,
    pub total_amount: Amount,
}

/// Remote order creation (implemented by the HTTP client outside this crate).
pub trait OrderService {
    type Error: std::error::Error + Send + Sync + 'static;

    fn create_order(&self, request: &OrderRequest) -> Result<OrderReceipt, Self::Error>;
}

#[derive(Debug, Error)]
pub enum CheckoutError<E>
where
    E: std::error::Error + 'static,
{
    #[error("cannot check out an empty cart")]
    EmptyCart,

    #[error(transparent)]
    Invalid(#[from] DomainError),

    #[error("order service rejected the order: {0}")]
    Service(#[source] E),
}

/// Submit the current cart as an order; clears the cart on success.
///
/// On failure the cart is left exactly as it was.
pub fn submit_order<S>(
    store: &CartStore,
    service: &S,
    details: CheckoutDetails,
) -> Result<OrderReceipt, CheckoutError<S::Error>>
where
    S: OrderService,
{
    details.validate()?;

    let snapshot = store.snapshot();
    if snapshot.is_empty() {
        return Err(CheckoutError::EmptyCart);
    }

    let request = OrderRequest::from_snapshot(&snapshot, details);
    let receipt = service
        .create_order(&request)
        .map_err(CheckoutError::Service)?;

    tracing::info!(order_id = receipt.order_id, lines = request.items.len(), "order placed");
    store.dispatch(CartCommand::ClearCart);

    Ok(receipt)
}
