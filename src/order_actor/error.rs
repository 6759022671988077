use thiserror::Error;

use crate::actor_framework::FrameworkError;
use crate::domain::TotalPriceError;
use crate::events::EventError;

/// Errors that can occur during order operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum OrderError {
    #[error("Order not found: {0}")]
    NotFound(String),
    #[error("Invalid product: {0}")]
    InvalidProduct(String),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(u32),
    #[error("Order total exceeds 10 digits")]
    TotalOutOfRange,
    #[error("Order validation error: {0}")]
    ValidationError(String),
    #[error("Order confirmed notification failed: {0}")]
    Notification(#[from] EventError),
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl OrderError {
    pub(crate) fn from_total(error: TotalPriceError, order_quantity: u32, product_id: &str) -> Self {
        match error {
            TotalPriceError::ZeroQuantity => OrderError::InvalidQuantity(order_quantity),
            TotalPriceError::ProductMismatch => OrderError::InvalidProduct(product_id.to_string()),
            TotalPriceError::OutOfRange => OrderError::TotalOutOfRange,
        }
    }
}

impl From<FrameworkError> for OrderError {
    fn from(error: FrameworkError) -> Self {
        match error {
            FrameworkError::NotFound(id) => OrderError::NotFound(id),
            FrameworkError::Rejected(msg) => OrderError::ValidationError(msg),
            other => OrderError::ActorCommunicationError(other.to_string()),
        }
    }
}
