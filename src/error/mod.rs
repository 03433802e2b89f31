//! Aggregator error types.
use thiserror::Error;

mod fee;
pub use fee::FeeError;

mod permit;
pub use permit::PermitError;

mod state;
pub use state::StateError;

mod swap;
pub use swap::SwapError;

/// The overarching error type returned by [`Aggregator::execute`].
///
/// Any variant aborts the entire batch: there is no local recovery and no
/// partial application, the caller resubmits a corrected batch.
///
/// [`Aggregator::execute`]: crate::dispatcher::Aggregator::execute
#[derive(Debug, Error)]
pub enum AggregatorError {
    /// The command and payload arrays differ in length.
    ///
    /// Checked before any decoding or adapter call; the message string is
    /// part of the external interface.
    #[error("Amount of commands must match inputs.")]
    LengthMismatch,
    /// An instruction or AMM tag is outside the supported range.
    #[error("unsupported instruction tag {tag}")]
    UnsupportedInstruction {
        /// The unrecognized raw tag.
        tag: u8,
    },
    /// A payload did not match its instruction's schema.
    #[error(transparent)]
    Decode(#[from] alloy::sol_types::Error),
    /// Errors from the signature-transfer authority.
    #[error(transparent)]
    Permit(#[from] PermitError),
    /// Errors from swap routing.
    #[error(transparent)]
    Swap(#[from] SwapError),
    /// Errors from the fee and wrap handlers.
    #[error(transparent)]
    Fee(#[from] FeeError),
    /// Errors from balance bookkeeping.
    #[error(transparent)]
    State(#[from] StateError),
}
