//! Shared types and models for FertiStock
//!
//! Domain models and the pure business rules (FIFO allocation, sale totals,
//! day boundaries, expiry classification) used by the backend.

pub mod fifo;
pub mod models;
pub mod types;
pub mod validation;

pub use models::*;
pub use types::*;
pub use validation::*;
