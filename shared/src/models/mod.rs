//! Domain models for the Apparel Stock Management Platform

mod movement;
mod stock;
mod transfer;

pub use movement::*;
pub use stock::*;
pub use transfer::*;
