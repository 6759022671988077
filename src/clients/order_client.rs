use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, instrument, warn};
use crate::domain::{compute_total, Order, OrderCreate, Product};
use crate::order_actor::{OrderAction, OrderActionResult, OrderError};
use crate::actor_framework::{FrameworkError, ResourceClient};
use crate::clients::ProductClient;
use crate::events::{EventDispatcher, OrderEvent};

const CONFIRM_RETRY_DELAY: Duration = Duration::from_millis(1);

/// Client for interacting with the Order actor.
///
/// Besides plain store access it owns the order workflow: looking up the
/// referenced product, computing totals before anything is persisted, and
/// publishing the confirmation notification.
#[derive(Clone)]
pub struct OrderClient {
    inner: ResourceClient<Order>,
    product_client: ProductClient,
    dispatcher: Arc<EventDispatcher>,
}

impl_client_methods!(OrderClient, Order, OrderError, order);

impl OrderClient {
    pub fn new(
        inner: ResourceClient<Order>,
        product_client: ProductClient,
        dispatcher: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            inner,
            product_client,
            dispatcher,
        }
    }

    /// The referenced product must exist; an order never points at nothing.
    async fn referenced_product(&self, product_id: &str) -> Result<Product, OrderError> {
        match self.product_client.get_product(product_id.to_string()).await {
            Ok(Some(product)) => {
                debug!(product_name = %product.name, price = %product.price, "Product found");
                Ok(product)
            }
            Ok(None) => {
                error!(product_id = %product_id, "Product not found");
                Err(OrderError::InvalidProduct(product_id.to_string()))
            }
            Err(e) => {
                error!(error = %e, "Product lookup failed");
                Err(OrderError::InvalidProduct(format!("Product lookup failed: {}", e)))
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn create_order(&self, product_id: String, quantity: u32) -> Result<String, OrderError> {
        info!("Processing create_order request");
        if quantity == 0 {
            return Err(OrderError::InvalidQuantity(quantity));
        }

        let product = self.referenced_product(&product_id).await?;
        let total_price = compute_total(product.price, quantity)
            .map_err(|e| OrderError::from_total(e, quantity, &product_id))?;

        let params = OrderCreate {
            product_id: product_id.clone(),
            quantity,
            total_price,
        };
        let id = self.inner.create(params).await.map_err(OrderError::from)?;

        // The product may have been deleted since the lookup; its orders were
        // swept before this one existed.
        if !matches!(self.product_client.get_product(product_id.clone()).await, Ok(Some(_))) {
            warn!(order_id = %id, "Product deleted during create, discarding order");
            match self.inner.delete(id).await {
                Ok(()) | Err(FrameworkError::NotFound(_)) => {}
                Err(e) => return Err(OrderError::from(e)),
            }
            return Err(OrderError::InvalidProduct(product_id));
        }

        info!(order_id = %id, total_price = %total_price, "Order created");
        Ok(id)
    }

    /// Persists `order`, first recomputing its total from the product's
    /// current price. Runs on every save, whatever field changed.
    #[instrument(fields(order_id = %order.id), skip(self, order))]
    pub async fn save_order(&self, mut order: Order) -> Result<Order, OrderError> {
        debug!("Processing save_order request");
        let product = self.referenced_product(&order.product_id).await?;
        order
            .recompute_total(&product)
            .map_err(|e| OrderError::from_total(e, order.quantity, &order.product_id))?;

        let saved = self.inner.save(order).await.map_err(OrderError::from)?;
        info!(total_price = %saved.total_price(), "Order saved");
        Ok(saved)
    }

    /// Confirms the order and notifies subscribers, once.
    ///
    /// Only the unconfirmed -> confirmed transition publishes
    /// [`OrderEvent::Confirmed`]; confirming a confirmed order returns it
    /// unchanged. The order reads as confirmed only after every subscriber
    /// succeeded. If one fails, the pending confirmation is dropped and the
    /// subscriber's error is returned. A caller that races another
    /// confirmation waits for its outcome and retries if it was dropped.
    #[instrument(skip(self))]
    pub async fn confirm_order(&self, id: String) -> Result<Order, OrderError> {
        info!("Processing confirm_order request");
        let order = self
            .get_order(id.clone())
            .await?
            .ok_or_else(|| OrderError::NotFound(id.clone()))?;
        if order.confirmed {
            info!("Order already confirmed");
            return Ok(order);
        }

        let pending = loop {
            let product = self.referenced_product(&order.product_id).await?;
            match self
                .inner
                .perform_action(id.clone(), OrderAction::Confirm(product))
                .await
                .map_err(OrderError::from)?
            {
                OrderActionResult::Pending(order) => break order,
                OrderActionResult::AlreadyConfirmed(order) => {
                    info!("Order confirmed concurrently");
                    return Ok(order);
                }
                OrderActionResult::InProgress => {
                    debug!("Confirmation in progress elsewhere, waiting");
                    tokio::time::sleep(CONFIRM_RETRY_DELAY).await;
                }
                other => {
                    return Err(OrderError::ActorCommunicationError(format!("Unexpected result: {:?}", other)));
                }
            }
        };

        if let Err(e) = self.dispatcher.publish(&OrderEvent::Confirmed(pending)).await {
            warn!(error = %e, "Confirmation notification failed, reverting");
            self.inner
                .perform_action(id, OrderAction::RevertConfirmation)
                .await
                .map_err(OrderError::from)?;
            return Err(OrderError::Notification(e));
        }

        match self
            .inner
            .perform_action(id, OrderAction::CompleteConfirmation)
            .await
            .map_err(OrderError::from)?
        {
            OrderActionResult::Confirmed(confirmed) => {
                info!(total_price = %confirmed.total_price(), "Order confirmed");
                Ok(confirmed)
            }
            other => Err(OrderError::ActorCommunicationError(format!("Unexpected result: {:?}", other))),
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_order(&self, id: String) -> Result<(), OrderError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(OrderError::from)
    }

    /// Removes every order that references `product_id`.
    #[instrument(skip(self))]
    pub async fn delete_orders_for_product(&self, product_id: String) -> Result<Vec<String>, OrderError> {
        debug!("Sending request");
        let removed = self
            .inner
            .delete_where(move |order: &Order| order.product_id == product_id)
            .await
            .map_err(OrderError::from)?;
        info!(removed = removed.len(), "Orders removed with their product");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::ResourceRequest;
    use crate::mock_framework::{create_mock_client, expect_action, expect_create, expect_get, expect_save};
    use rust_decimal_macros::dec;

    fn client_with_mocks() -> (
        OrderClient,
        tokio::sync::mpsc::Receiver<ResourceRequest<Order>>,
        tokio::sync::mpsc::Receiver<ResourceRequest<Product>>,
    ) {
        let (order_inner, order_rx) = create_mock_client::<Order>(10);
        let (product_inner, product_rx) = create_mock_client::<Product>(10);
        let client = OrderClient::new(
            order_inner,
            ProductClient::new(product_inner),
            Arc::new(EventDispatcher::new()),
        );
        (client, order_rx, product_rx)
    }

    #[tokio::test]
    async fn test_create_order_computes_total() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        let task = tokio::spawn(async move { client.create_order("product_1".into(), 3).await });

        let (product_id, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        assert_eq!(product_id, "product_1");
        let widget = Product::new("product_1", "Widget", dec!(9.99), 100);
        responder.send(Ok(Some(widget))).unwrap();

        let (params, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        assert_eq!(params.product_id, "product_1");
        assert_eq!(params.quantity, 3);
        assert_eq!(params.total_price, dec!(29.97));
        responder.send(Ok("order_1".to_string())).unwrap();

        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(Some(Product::new("product_1", "Widget", dec!(9.99), 100)))).unwrap();

        assert_eq!(task.await.unwrap(), Ok("order_1".to_string()));
    }

    #[tokio::test]
    async fn test_create_order_discarded_when_product_vanishes() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        let task = tokio::spawn(async move { client.create_order("product_1".into(), 3).await });

        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(Some(Product::new("product_1", "Widget", dec!(9.99), 100)))).unwrap();
        let (_, responder) = expect_create(&mut order_rx).await.expect("Expected Order Create");
        responder.send(Ok("order_1".to_string())).unwrap();

        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(None)).unwrap();

        match order_rx.recv().await {
            Some(ResourceRequest::Delete { id, respond_to }) => {
                assert_eq!(id, "order_1");
                respond_to.send(Ok(())).unwrap();
            }
            other => panic!("Expected Order Delete, got {:?}", other),
        }

        assert_eq!(task.await.unwrap(), Err(OrderError::InvalidProduct("product_1".into())));
    }

    #[tokio::test]
    async fn test_create_order_missing_product() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        let task = tokio::spawn(async move { client.create_order("product_9".into(), 1).await });

        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(None)).unwrap();

        assert_eq!(task.await.unwrap(), Err(OrderError::InvalidProduct("product_9".into())));
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_create_order_zero_quantity() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();
        assert_eq!(
            client.create_order("product_1".into(), 0).await,
            Err(OrderError::InvalidQuantity(0))
        );
        assert!(order_rx.try_recv().is_err());
        assert!(product_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_confirm_already_confirmed_skips_product() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        let task = tokio::spawn(async move { client.confirm_order("order_1".into()).await });

        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        let mut order = Order::new("order_1", "product_1", 3);
        order.confirmed = true;
        responder.send(Ok(Some(order.clone()))).unwrap();

        assert_eq!(task.await.unwrap(), Ok(order));
        assert!(product_rx.try_recv().is_err());
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_confirm_sends_product_snapshot() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        let task = tokio::spawn(async move { client.confirm_order("order_1".into()).await });

        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        responder.send(Ok(Some(Order::new("order_1", "product_1", 3)))).unwrap();

        let widget = Product::new("product_1", "Widget", dec!(9.99), 100);
        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(Some(widget.clone()))).unwrap();

        let (id, action, responder) = expect_action(&mut order_rx).await.expect("Expected Order Action");
        assert_eq!(id, "order_1");
        match action {
            OrderAction::Confirm(snapshot) => assert_eq!(snapshot, widget),
            other => panic!("Unexpected action: {:?}", other),
        }
        let mut confirmed = Order::new("order_1", "product_1", 3);
        confirmed.confirmed = true;
        responder.send(Ok(OrderActionResult::Pending(confirmed.clone()))).unwrap();

        // No subscribers on this dispatcher, so the confirmation completes next.
        let (_, action, responder) = expect_action(&mut order_rx).await.expect("Expected Order Action");
        assert!(matches!(action, OrderAction::CompleteConfirmation));
        responder.send(Ok(OrderActionResult::Confirmed(confirmed.clone()))).unwrap();

        assert_eq!(task.await.unwrap(), Ok(confirmed));
    }

    #[tokio::test]
    async fn test_confirm_waits_for_pending_confirmation() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        let task = tokio::spawn(async move { client.confirm_order("order_1".into()).await });

        let (_, responder) = expect_get(&mut order_rx).await.expect("Expected Order Get");
        responder.send(Ok(Some(Order::new("order_1", "product_1", 3)))).unwrap();

        let widget = Product::new("product_1", "Widget", dec!(9.99), 100);
        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(Some(widget.clone()))).unwrap();
        let (_, _, responder) = expect_action(&mut order_rx).await.expect("Expected Order Action");
        responder.send(Ok(OrderActionResult::InProgress)).unwrap();

        // Retried once the other confirmation settles.
        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        responder.send(Ok(Some(widget))).unwrap();
        let (_, action, responder) = expect_action(&mut order_rx).await.expect("Expected Order Action");
        assert!(matches!(action, OrderAction::Confirm(_)));
        let mut confirmed = Order::new("order_1", "product_1", 3);
        confirmed.confirmed = true;
        responder.send(Ok(OrderActionResult::AlreadyConfirmed(confirmed.clone()))).unwrap();

        assert_eq!(task.await.unwrap(), Ok(confirmed));
        assert!(order_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_save_recomputes_before_persisting() {
        let (client, mut order_rx, mut product_rx) = client_with_mocks();

        // Stale total from an earlier price.
        let order = Order::from_create(
            "order_1".into(),
            OrderCreate { product_id: "product_1".into(), quantity: 3, total_price: dec!(29.97) },
        );
        let task = tokio::spawn(async move { client.save_order(order).await });

        let (_, responder) = expect_get(&mut product_rx).await.expect("Expected Product Get");
        let repriced = Product::new("product_1", "Widget", dec!(11.00), 100);
        responder.send(Ok(Some(repriced))).unwrap();

        let (item, responder) = expect_save(&mut order_rx).await.expect("Expected Order Save");
        assert_eq!(item.total_price(), dec!(33.00));
        responder.send(Ok(item.clone())).unwrap();

        assert_eq!(task.await.unwrap().unwrap().total_price(), dec!(33));
    }
}
