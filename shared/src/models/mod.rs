//! Domain models for FertiStock

mod sale;
mod stock;

pub use sale::*;
pub use stock::*;
