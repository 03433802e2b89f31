//! Wire and message types of the aggregator.
mod command;
pub use command::*;

mod payload;
pub use payload::*;

mod permit;
pub use permit::*;
