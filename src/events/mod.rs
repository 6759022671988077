//! Order notifications and their subscribers.
//!
//! Subscriptions are explicit: handlers are registered on an
//! [`EventDispatcher`] during system wiring, and the order client publishes
//! through the dispatcher it was given.

pub mod dispatcher;
pub mod inventory;

pub use dispatcher::*;
pub use inventory::*;

use thiserror::Error;

use crate::domain::Order;
use crate::product_actor::ProductError;

/// Something that happened to an order.
#[derive(Debug, Clone, PartialEq)]
pub enum OrderEvent {
    /// The order moved from unconfirmed to confirmed.
    Confirmed(Order),
}

impl OrderEvent {
    pub fn order(&self) -> &Order {
        match self {
            OrderEvent::Confirmed(order) => order,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum EventError {
    #[error("Inventory update failed: {0}")]
    Inventory(#[from] ProductError),
}
