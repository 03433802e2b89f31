use crate::types::AmmKind;
use alloy::primitives::U256;
use thiserror::Error;

/// Errors surfaced while routing a swap to an AMM backend.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SwapError {
    /// The backend cannot serve the requested direction.
    ///
    /// Stable-pool math is not invertible, so `EXACT_OUT` is rejected
    /// outright for [`AmmKind::Stable`].
    #[error("{amm:?} backend does not support the requested swap direction")]
    UnsupportedDirection {
        /// The rejecting backend.
        amm: AmmKind,
    },
    /// No backend is registered for the requested AMM kind.
    #[error("no backend registered for {amm:?}")]
    NoBackend {
        /// The unroutable AMM kind.
        amm: AmmKind,
    },
    /// The realized amount violated the caller's slippage limit.
    #[error("slippage limit violated: limit {limit}, realized {realized}")]
    SlippageExceeded {
        /// The caller's bound.
        limit: U256,
        /// The realized amount.
        realized: U256,
    },
    /// The swap backend reverted; the reason is passed through unchanged.
    #[error("swap backend reverted: {0}")]
    AdapterFailure(String),
}
