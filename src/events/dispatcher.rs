use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use super::{EventError, OrderEvent};

/// A subscriber to order notifications.
#[async_trait]
pub trait OrderEventHandler: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn handle(&self, event: &OrderEvent) -> Result<(), EventError>;
}

/// In-process publish/subscribe hub for [`OrderEvent`]s.
///
/// - Handlers run in registration order
/// - `publish` returns only after every handler finished
/// - The first failing handler stops delivery and its error is returned
#[derive(Clone, Default)]
pub struct EventDispatcher {
    handlers: Vec<Arc<dyn OrderEventHandler>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Arc<dyn OrderEventHandler>) -> &mut Self {
        debug!(handler = handler.name(), "Handler subscribed");
        self.handlers.push(handler);
        self
    }

    pub fn handler_names(&self) -> Vec<&'static str> {
        self.handlers.iter().map(|h| h.name()).collect()
    }

    #[instrument(fields(order_id = %event.order().id), skip(self, event))]
    pub async fn publish(&self, event: &OrderEvent) -> Result<(), EventError> {
        debug!(handlers = self.handlers.len(), "Publishing order event");
        for handler in &self.handlers {
            if let Err(e) = handler.handle(event).await {
                error!(handler = handler.name(), error = %e, "Order event handler failed");
                return Err(e);
            }
        }
        Ok(())
    }
}
