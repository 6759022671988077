//! Typed handles over the store actors. Clients are cheap to clone and are
//! the only way the rest of the system talks to a store.

#[macro_use]
mod macros;

pub mod product_client;
pub mod order_client;

pub use product_client::ProductClient;
pub use order_client::OrderClient;
