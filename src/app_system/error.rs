use thiserror::Error;

use crate::order_actor::OrderError;
use crate::product_actor::ProductError;

/// Top-level error for system wiring and the binary's entry point.
#[derive(Debug, Error)]
pub enum SystemError {
    #[error("Configuration error: {0}")]
    Config(String),
    #[error(transparent)]
    Product(#[from] ProductError),
    #[error(transparent)]
    Order(#[from] OrderError),
    #[error("Actor task failed: {0}")]
    Shutdown(String),
}
