//! Agora Core Domain
//!
//! Pure domain types for the Agora continuous double auction simulator.
//! This crate contains no async, no I/O, and is 100% unit testable.

pub mod entities;
pub mod error;
pub mod params;
pub mod values;

// Re-export commonly used types at crate root
pub use entities::{
    NewOrder, Order, OrderSeq, PrivateValues, Quote, QuoteStatus, Side, Transaction,
    TransactionKey,
};
pub use error::ConfigError;
pub use params::MarketParams;
pub use values::{AgentId, Price, Timestamp};
