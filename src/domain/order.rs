use std::fmt;

use rust_decimal::Decimal;
use thiserror::Error;

use super::Product;

/// Fractional digits kept on an order total.
pub const TOTAL_PRICE_SCALE: u32 = 2;

/// Largest total an order can carry: ten digits, two of them fractional.
pub const MAX_TOTAL_PRICE: Decimal = Decimal::from_parts(1_410_065_407, 2, 0, false, 2);

/// A request to purchase a quantity of a single product.
///
/// `total_price` is derived: it only changes through [`Order::recompute_total`].
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: String,
    pub product_id: String,
    pub quantity: u32,
    total_price: Decimal,
    pub confirmed: bool,
    /// Set while a confirmation is being delivered to subscribers.
    pub(crate) confirming: bool,
}

/// Payload for creating a new order. The total is computed by the order
/// client from the referenced product before the payload reaches the store.
#[derive(Debug, Clone)]
pub struct OrderCreate {
    pub product_id: String,
    pub quantity: u32,
    pub total_price: Decimal,
}

/// Why a total could not be computed.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum TotalPriceError {
    #[error("Order quantity must be positive")]
    ZeroQuantity,
    #[error("Product does not match the order")]
    ProductMismatch,
    #[error("Order total exceeds 10 digits")]
    OutOfRange,
}

impl Order {
    #[cfg(test)]
    pub fn new(id: impl Into<String>, product_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            id: id.into(),
            product_id: product_id.into(),
            quantity,
            total_price: Decimal::ZERO,
            confirmed: false,
            confirming: false,
        }
    }

    pub(crate) fn from_create(id: String, params: OrderCreate) -> Self {
        Self {
            id,
            product_id: params.product_id,
            quantity: params.quantity,
            total_price: params.total_price,
            confirmed: false,
            confirming: false,
        }
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    /// Overwrites `total_price` with `product.price * quantity`.
    pub fn recompute_total(&mut self, product: &Product) -> Result<Decimal, TotalPriceError> {
        if product.id != self.product_id {
            return Err(TotalPriceError::ProductMismatch);
        }
        self.total_price = compute_total(product.price, self.quantity)?;
        Ok(self.total_price)
    }

    /// Renders the order the way it reads on a receipt, e.g. `3 x Widget`.
    pub fn describe<'a>(&'a self, product: &'a Product) -> OrderLine<'a> {
        OrderLine { order: self, product }
    }
}

/// `price * quantity`, rounded to cents, bounded by [`MAX_TOTAL_PRICE`].
pub fn compute_total(price: Decimal, quantity: u32) -> Result<Decimal, TotalPriceError> {
    if quantity == 0 {
        return Err(TotalPriceError::ZeroQuantity);
    }
    let total = price
        .checked_mul(Decimal::from(quantity))
        .ok_or(TotalPriceError::OutOfRange)?
        .round_dp(TOTAL_PRICE_SCALE);
    if total > MAX_TOTAL_PRICE || total.is_sign_negative() {
        return Err(TotalPriceError::OutOfRange);
    }
    Ok(total)
}

pub struct OrderLine<'a> {
    order: &'a Order,
    product: &'a Product,
}

impl fmt::Display for OrderLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} x {}", self.order.quantity, self.product.name)
    }
}
