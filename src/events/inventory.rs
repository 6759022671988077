use async_trait::async_trait;
use tracing::{info, instrument};

use super::{EventError, OrderEvent, OrderEventHandler};
use crate::clients::ProductClient;
use crate::domain::Order;
use crate::product_actor::ProductError;

/// Outcome of one inventory decrement.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryUpdate {
    pub product_id: String,
    pub product_name: String,
    pub new_quantity: u32,
}

impl InventoryUpdate {
    pub fn message(&self) -> String {
        format!(
            "Quantity updated for {}. New quantity: {}",
            self.product_name, self.new_quantity
        )
    }
}

/// Decrements a product's stock by the ordered quantity whenever an order is
/// confirmed.
///
/// Not idempotent: each delivery of the same notification decrements again.
/// Stock that would go below zero is refused.
#[derive(Clone)]
pub struct InventoryUpdater {
    product_client: ProductClient,
}

impl InventoryUpdater {
    pub fn new(product_client: ProductClient) -> Self {
        Self { product_client }
    }

    #[instrument(fields(order_id = %order.id, product_id = %order.product_id, quantity = order.quantity), skip(self, order))]
    pub async fn apply(&self, order: &Order) -> Result<InventoryUpdate, ProductError> {
        let product = self
            .product_client
            .decrement_stock(order.product_id.clone(), order.quantity)
            .await?;

        let update = InventoryUpdate {
            product_id: product.id,
            product_name: product.name,
            new_quantity: product.quantity,
        };
        info!(product_id = %update.product_id, "{}", update.message());
        Ok(update)
    }
}

#[async_trait]
impl OrderEventHandler for InventoryUpdater {
    fn name(&self) -> &'static str {
        "inventory_updater"
    }

    async fn handle(&self, event: &OrderEvent) -> Result<(), EventError> {
        match event {
            OrderEvent::Confirmed(order) => {
                self.apply(order).await?;
                Ok(())
            }
        }
    }
}
