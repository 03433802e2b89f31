use alloy::primitives::{Address, U256};
use thiserror::Error;

/// Errors surfaced by balance bookkeeping.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StateError {
    /// A token debit exceeded the holder's balance.
    #[error("insufficient balance of {token} for {holder}: need {needed}, have {available}")]
    InsufficientBalance {
        /// The token being debited.
        token: Address,
        /// The account being debited.
        holder: Address,
        /// The debit amount.
        needed: U256,
        /// The balance on hand.
        available: U256,
    },
    /// A native-currency debit exceeded the holder's balance.
    #[error("insufficient native balance for {holder}: need {needed}, have {available}")]
    InsufficientNative {
        /// The account being debited.
        holder: Address,
        /// The debit amount.
        needed: U256,
        /// The balance on hand.
        available: U256,
    },
}
