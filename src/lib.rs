//! # Aggregator
//!
//! Execution engine for batched token swaps.
//!
//! A batch is an ordered list of [`Command`]s paired index-for-index with
//! ABI-encoded payloads. The [`Aggregator`] validates the batch shape,
//! decodes each payload against its instruction's schema, routes it to a
//! permit-transfer, swap, fee or wrap handler, and commits the resulting
//! balance changes only if every instruction in the batch succeeded.
//!
//! [`Command`]: types::Command
//! [`Aggregator`]: dispatcher::Aggregator

pub mod amm;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod fee;
pub mod permit;
pub mod state;
pub mod types;

pub use config::AggregatorConfig;
pub use dispatcher::Aggregator;
pub use error::AggregatorError;
pub use state::ChainState;
