use rust_decimal::Decimal;
use tracing::{debug, instrument};
use crate::domain::{Product, ProductCreate, ProductPatch};
use crate::product_actor::{ProductAction, ProductActionResult, ProductError};
use crate::actor_framework::ResourceClient;

/// Client for interacting with the Product actor.
#[derive(Clone)]
pub struct ProductClient {
    inner: ResourceClient<Product>,
}

impl_basic_client!(ProductClient, Product, ProductError, product);

impl ProductClient {
    // Price is checked here so a bad product never reaches the store.
    #[instrument(skip(self, product), fields(product_name = %product.name))]
    pub async fn create_product(&self, product: Product) -> Result<String, ProductError> {
        debug!("Sending request");
        if product.price < Decimal::ZERO {
            return Err(ProductError::InvalidPrice(product.price));
        }
        self.inner.create(ProductCreate::from(product)).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn update_product(&self, id: String, patch: ProductPatch) -> Result<Product, ProductError> {
        debug!("Sending request");
        if let Some(price) = patch.price.filter(|p| *p < Decimal::ZERO) {
            return Err(ProductError::InvalidPrice(price));
        }
        self.inner.update(id, patch).await.map_err(ProductError::from)
    }

    /// Removes the product record only. Orders referencing it are removed by
    /// [`crate::app_system::OrderSystem::delete_product`].
    #[instrument(skip(self))]
    pub(crate) async fn delete_product(&self, id: String) -> Result<(), ProductError> {
        debug!("Sending request");
        self.inner.delete(id).await.map_err(ProductError::from)
    }

    #[instrument(skip(self))]
    pub async fn check_stock(&self, id: String) -> Result<u32, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::CheckStock).await {
            Ok(ProductActionResult::CheckStock(level)) => Ok(level),
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(ProductError::from(e)),
        }
    }

    /// Decrements stock in a single store round-trip and returns the product
    /// as persisted afterwards.
    #[instrument(skip(self))]
    pub async fn decrement_stock(&self, id: String, quantity: u32) -> Result<Product, ProductError> {
        debug!("Sending request");
        match self.inner.perform_action(id, ProductAction::DecrementStock(quantity)).await {
            Ok(ProductActionResult::DecrementStock(product)) => Ok(product),
            Ok(ProductActionResult::StockShortfall { requested, available }) => {
                Err(ProductError::InsufficientStock { requested, available })
            }
            Ok(_) => Err(ProductError::ActorCommunicationError("Unexpected result".to_string())),
            Err(e) => Err(ProductError::from(e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock_framework::{create_mock_client, expect_action, expect_create};
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_create_product_sends_params() {
        let (inner, mut rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let task = tokio::spawn(async move {
            client.create_product(Product::new("ignored", "Widget", dec!(9.99), 100)).await
        });

        let (params, responder) = expect_create(&mut rx).await.expect("Expected Product Create");
        assert_eq!(params.name, "Widget");
        assert_eq!(params.price, dec!(9.99));
        assert_eq!(params.quantity, 100);
        responder.send(Ok("product_1".to_string())).unwrap();

        assert_eq!(task.await.unwrap(), Ok("product_1".to_string()));
    }

    #[tokio::test]
    async fn test_negative_price_never_reaches_store() {
        let (inner, mut rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let err = client.create_product(Product::new("ignored", "Bad", dec!(-1), 1)).await;
        assert_eq!(err, Err(ProductError::InvalidPrice(dec!(-1))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_check_stock_unexpected_result() {
        let (inner, mut rx) = create_mock_client::<Product>(10);
        let client = ProductClient::new(inner);

        let task = tokio::spawn(async move { client.check_stock("product_1".into()).await });

        let (_, action, responder) = expect_action(&mut rx).await.expect("Expected Product Action");
        assert!(matches!(action, ProductAction::CheckStock));
        responder
            .send(Ok(ProductActionResult::StockShortfall { requested: 1, available: 0 }))
            .unwrap();

        assert!(matches!(task.await.unwrap(), Err(ProductError::ActorCommunicationError(_))));
    }
}
