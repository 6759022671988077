//! Order store logic: creation rules, save checks and the confirmation edge.

pub mod entity;
pub mod error;

pub use entity::*;
pub use error::*;
