use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Errors surfaced by the fee and wrap handlers.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FeeError {
    /// The fee slice exceeds the output amount available to pay it from.
    #[error("insufficient output for fee: need {needed} of {token}, have {available}")]
    InsufficientOutput {
        /// The fee token.
        token: Address,
        /// The combined fee slices.
        needed: U256,
        /// The amount held by the running context.
        available: U256,
    },
    /// The wrapped-currency contract call failed.
    #[error("wrap call failed: {0}")]
    WrapFailed(String),
}
