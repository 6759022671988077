mod domain;
mod clients;
mod events;

mod app_system;

#[cfg(test)]
mod mock_framework;

mod actor_framework;
mod product_actor;
mod order_actor;

use rust_decimal::Decimal;
use tracing::{info, Instrument};
use crate::domain::{Product, ProductPatch};
use crate::app_system::{setup_tracing, OrderSystem, SystemConfig, SystemError};

#[tokio::main]
async fn main() -> Result<(), SystemError> {
    let config = SystemConfig::from_env()?;
    setup_tracing(&config.log_filter);

    info!("Starting application with complete order system");

    let system = OrderSystem::with_config(&config);

    let widget = Product::new("temp_id", "Widget", Decimal::new(999, 2), 100);
    let product_id = system.product_client.create_product(widget).await?;
    info!(product_id = %product_id, "Product created successfully");

    let span = tracing::info_span!("order_processing");
    let order = async {
        let order_id = system.order_client.create_order(product_id.clone(), 3).await?;
        system.order_client.confirm_order(order_id).await
    }
    .instrument(span)
    .await?;

    let stock = system.product_client.check_stock(product_id.clone()).await?;
    info!(order_id = %order.id, total_price = %order.total_price(), stock, "Order processed successfully");

    // A price change reaches the order total on its next save.
    let patch = ProductPatch { price: Some(Decimal::new(1049, 2)), ..Default::default() };
    let product = system.product_client.update_product(product_id.clone(), patch).await?;
    let order = system.order_client.save_order(order).await?;
    info!(order = %order.describe(&product), total_price = %order.total_price(), "Order re-saved");

    let removed = system.delete_product(product_id).await?;
    info!(removed_orders = removed.len(), "Catalog cleaned up");

    system.shutdown().await?;

    info!("Application completed successfully");
    Ok(())
}
