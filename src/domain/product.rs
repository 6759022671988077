use rust_decimal::Decimal;

/// Represents a catalog item with its on-hand stock.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Payload for creating a new product.
#[derive(Debug, Clone)]
pub struct ProductCreate {
    pub name: String,
    pub price: Decimal,
    pub quantity: u32,
}

/// Payload for updating an existing product.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub quantity: Option<u32>,
}

impl Product {
    /// The `id` is assigned by the product store; the one given here is ignored on create.
    pub fn new(id: impl Into<String>, name: impl Into<String>, price: Decimal, quantity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
            quantity,
        }
    }
}

impl From<Product> for ProductCreate {
    fn from(product: Product) -> Self {
        Self {
            name: product.name,
            price: product.price,
            quantity: product.quantity,
        }
    }
}
