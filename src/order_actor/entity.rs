use crate::actor_framework::Entity;
use crate::domain::{Order, OrderCreate, Product};

/// Custom actions for Order entities.
#[derive(Debug, Clone)]
pub enum OrderAction {
    /// Starts confirming an unconfirmed order, recomputing the total from the
    /// given product snapshot as any save does. The order stays unconfirmed
    /// until `CompleteConfirmation`.
    Confirm(Product),
    /// Marks a pending order confirmed once its notification was delivered.
    CompleteConfirmation,
    /// Drops a pending confirmation whose notification could not be delivered.
    RevertConfirmation,
}

#[derive(Debug, Clone)]
pub enum OrderActionResult {
    /// The caller now owns the pending confirmation. Carries the order as it
    /// will read once confirmed.
    Pending(Order),
    /// Another caller's confirmation is still being delivered.
    InProgress,
    /// The order went from unconfirmed to confirmed.
    Confirmed(Order),
    /// The order was confirmed already; nothing changed.
    AlreadyConfirmed(Order),
    Reverted,
}

impl Entity for Order {
    type Id = String;
    type CreateParams = OrderCreate;
    type Patch = (); // Orders change through `save` or actions
    type Action = OrderAction;
    type ActionResult = OrderActionResult;

    fn id(&self) -> &String { &self.id }

    /// Creates a new, unconfirmed Order.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the order
    /// * `params` - product reference, quantity and the total computed by the caller
    fn from_create_params(id: String, params: OrderCreate) -> Result<Self, String> {
        if params.quantity == 0 {
            return Err("Order quantity must be positive".to_string());
        }
        Ok(Order::from_create(id, params))
    }

    fn on_update(&mut self, _patch: ()) -> Result<(), String> {
        Ok(())
    }

    /// Saves may change the product reference or quantity, but never the
    /// confirmation flag.
    fn on_save(&self, incoming: &Self) -> Result<(), String> {
        if self.confirming || incoming.confirming {
            return Err("Order confirmation in progress".to_string());
        }
        if incoming.quantity == 0 {
            return Err("Order quantity must be positive".to_string());
        }
        if incoming.confirmed != self.confirmed {
            return Err("Confirmation can only change through confirm_order".to_string());
        }
        Ok(())
    }

    /// Handles order-specific actions.
    ///
    /// `Confirm` checks and claims the pending state in one step, so only one
    /// of several concurrent confirmations publishes. The others see
    /// `InProgress` until it is completed or reverted.
    fn handle_action(&mut self, action: OrderAction) -> Result<OrderActionResult, String> {
        match action {
            OrderAction::Confirm(product) => {
                if self.confirmed {
                    return Ok(OrderActionResult::AlreadyConfirmed(self.clone()));
                }
                if self.confirming {
                    return Ok(OrderActionResult::InProgress);
                }
                self.recompute_total(&product)
                    .map_err(|e| format!("Cannot compute total: {}", e))?;
                self.confirming = true;

                let mut snapshot = self.clone();
                snapshot.confirming = false;
                snapshot.confirmed = true;
                Ok(OrderActionResult::Pending(snapshot))
            }
            OrderAction::CompleteConfirmation => {
                if !self.confirming {
                    return Err("No confirmation pending".to_string());
                }
                self.confirming = false;
                self.confirmed = true;
                Ok(OrderActionResult::Confirmed(self.clone()))
            }
            OrderAction::RevertConfirmation => {
                self.confirming = false;
                self.confirmed = false;
                Ok(OrderActionResult::Reverted)
            }
        }
    }
}
