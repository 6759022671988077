use crate::domain::Product;

/// Custom actions for Product entities.
///
/// These run inside the product store, so each one reads and writes the
/// product in a single step.
#[derive(Debug, Clone)]
pub enum ProductAction {
    /// Checks the current stock level without modifying it.
    CheckStock,
    /// Removes `u32` units from stock.
    ///
    /// Refused without touching the product when stock is short.
    DecrementStock(u32),
}

/// Results from ProductActions
#[derive(Debug, Clone)]
pub enum ProductActionResult {
    /// Result from CheckStock - the current stock level
    CheckStock(u32),
    /// Result from DecrementStock - the product as persisted after the decrement
    DecrementStock(Product),
    /// DecrementStock was refused; nothing changed
    StockShortfall { requested: u32, available: u32 },
}
