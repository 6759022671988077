use rust_decimal::Decimal;

use crate::actor_framework::Entity;
use crate::domain::{Product, ProductCreate, ProductPatch};
use super::actions::{ProductAction, ProductActionResult};

fn check_price(price: Decimal) -> Result<(), String> {
    if price < Decimal::ZERO {
        return Err(format!("Invalid price: {}", price));
    }
    Ok(())
}

impl Entity for Product {
    type Id = String;
    type CreateParams = ProductCreate;
    type Patch = ProductPatch;
    type Action = ProductAction;
    type ActionResult = ProductActionResult;

    fn id(&self) -> &String { &self.id }

    /// Creates a new Product from creation parameters.
    ///
    /// # Arguments
    /// * `id` - Unique identifier for the product
    /// * `params` - Product creation parameters containing name, price, and quantity
    fn from_create_params(id: String, params: ProductCreate) -> Result<Self, String> {
        check_price(params.price)?;
        Ok(Self {
            id,
            name: params.name,
            price: params.price,
            quantity: params.quantity,
        })
    }

    /// Updates the product's name, price and/or quantity.
    ///
    /// Orders are not touched here; their totals follow the new price the
    /// next time each order is saved.
    fn on_update(&mut self, patch: ProductPatch) -> Result<(), String> {
        if let Some(price) = patch.price {
            check_price(price)?;
            self.price = price;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(quantity) = patch.quantity {
            self.quantity = quantity;
        }
        Ok(())
    }

    fn on_save(&self, incoming: &Self) -> Result<(), String> {
        check_price(incoming.price)
    }

    /// Handles product-specific actions.
    ///
    /// # Actions
    /// - `CheckStock`: Returns the current stock level
    /// - `DecrementStock(amount)`: Decrements stock by the specified amount
    fn handle_action(&mut self, action: ProductAction) -> Result<ProductActionResult, String> {
        match action {
            ProductAction::CheckStock => {
                Ok(ProductActionResult::CheckStock(self.quantity))
            }
            ProductAction::DecrementStock(amount) => match self.quantity.checked_sub(amount) {
                Some(remaining) => {
                    self.quantity = remaining;
                    Ok(ProductActionResult::DecrementStock(self.clone()))
                }
                None => Ok(ProductActionResult::StockShortfall {
                    requested: amount,
                    available: self.quantity,
                }),
            },
        }
    }
}
