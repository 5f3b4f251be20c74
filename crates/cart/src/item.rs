use serde::{Deserialize, Serialize};

use storefront_core::{Amount, CategoryId, Entity, ProductId};

/// One line of the cart.
///
/// Field names on the wire match the catalog's product payload (`price`,
/// `stock`), so catalog data can be handed to the cart verbatim. Only
/// `id`, `unit_price` and `quantity` take part in any invariant; everything
/// else is carried for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ProductId,
    pub name: String,
    #[serde(rename = "price")]
    pub unit_price: Amount,
    /// Always >= 1 while the item is in a cart.
    pub quantity: u32,
    /// Advisory stock level supplied by the catalog when the item was added.
    #[serde(rename = "stock")]
    pub stock_ceiling: u32,
    pub category_id: CategoryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_name: Option<String>,
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: String,
    #[serde(default)]
    pub stock_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
}

impl CartItem {
    /// Minimal item with empty display metadata and a quantity of one.
    pub fn new(
        id: ProductId,
        name: impl Into<String>,
        unit_price: Amount,
        stock_ceiling: u32,
        category_id: CategoryId,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            unit_price,
            quantity: 1,
            stock_ceiling,
            category_id,
            category_name: None,
            sku: String::new(),
            description: String::new(),
            image_url: String::new(),
            stock_type: String::new(),
            color: None,
            size: None,
        }
    }

    pub fn line_total(&self) -> Amount {
        self.unit_price.times(self.quantity)
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock_ceiling > 0
    }
}

impl Entity for CartItem {
    type Id = ProductId;

    fn id(&self) -> Self::Id {
        self.id
    }
}
