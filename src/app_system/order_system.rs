use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{error, info, instrument};
use crate::actor_framework::{Entity, FrameworkError, ResourceActor, ResourceClient};
use crate::clients::{OrderClient, ProductClient};
use crate::domain::{Order, Product};
use crate::events::{EventDispatcher, InventoryUpdater};
use crate::product_actor::ProductError;
use super::{SystemConfig, SystemError};

fn sequential_ids(prefix: &'static str) -> impl Fn() -> String + Send + Sync + 'static {
    let counter = Arc::new(AtomicU64::new(1));
    move || format!("{}_{}", prefix, counter.fetch_add(1, Ordering::SeqCst))
}

/// The application system: both stores, their clients, and the
/// order-confirmed subscribers.
///
/// Startup order:
/// 1. Product store (no dependencies)
/// 2. Event dispatcher, with the inventory updater subscribed
/// 3. Order store, whose client gets the product client and the dispatcher
pub struct OrderSystem {
    pub order_client: OrderClient,
    pub product_client: ProductClient,
    order_store: ResourceClient<Order>,
    product_store: ResourceClient<Product>,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl Default for OrderSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderSystem {
    pub fn new() -> Self {
        Self::with_config(&SystemConfig::default())
    }

    #[instrument(name = "order_system", skip(config), fields(buffer_size = config.buffer_size))]
    pub fn with_config(config: &SystemConfig) -> Self {
        info!("Starting order system");

        let (product_actor, product_store) =
            ResourceActor::<Product>::new(config.buffer_size, sequential_ids("product"));
        let product_handle = tokio::spawn(product_actor.run());
        let product_client = ProductClient::new(product_store.clone());

        let mut dispatcher = EventDispatcher::new();
        dispatcher.subscribe(Arc::new(InventoryUpdater::new(product_client.clone())));
        info!(handlers = ?dispatcher.handler_names(), "Order confirmed subscribers wired");

        let (order_actor, order_store) =
            ResourceActor::<Order>::new(config.buffer_size, sequential_ids("order"));
        let order_handle = tokio::spawn(order_actor.run());
        let order_client = OrderClient::new(order_store.clone(), product_client.clone(), Arc::new(dispatcher));

        info!("Order system started successfully");

        Self {
            order_client,
            product_client,
            order_store,
            product_store,
            handles: vec![product_handle, order_handle],
        }
    }

    /// Deletes a product together with every order that references it.
    /// Returns the ids of the removed orders.
    ///
    /// The product goes first, so orders created from then on fail their
    /// product lookup instead of landing after the sweep.
    #[instrument(skip(self))]
    pub async fn delete_product(&self, product_id: String) -> Result<Vec<String>, SystemError> {
        if self.product_client.get_product(product_id.clone()).await?.is_none() {
            return Err(ProductError::NotFound(product_id).into());
        }
        self.product_client.delete_product(product_id.clone()).await?;
        let removed = self.order_client.delete_orders_for_product(product_id).await?;
        info!(removed_orders = removed.len(), "Product deleted");
        Ok(removed)
    }

    /// Stops the order store before the product store, then waits for both.
    #[instrument(skip(self))]
    pub async fn shutdown(self) -> Result<(), SystemError> {
        info!("Shutting down order system");

        stop(&self.order_store).await;
        stop(&self.product_store).await;

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!(error = ?e, "Actor task failed");
                return Err(SystemError::Shutdown(e.to_string()));
            }
        }

        info!("Order system shutdown complete");
        Ok(())
    }
}

async fn stop<T: Entity>(store: &ResourceClient<T>) {
    // Already gone is as good as stopped.
    if let Err(FrameworkError::ActorClosed) = store.shutdown().await {
        info!("Store already stopped");
    }
}
