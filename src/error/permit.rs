use alloy::primitives::U256;
use thiserror::Error;

/// Errors surfaced by the signature-transfer authority.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PermitError {
    /// The permit's deadline has passed.
    #[error("permit expired: deadline {deadline}, now {now}")]
    Expired {
        /// The deadline carried in the signed message.
        deadline: U256,
        /// The current timestamp, seconds.
        now: u64,
    },
    /// Signature recovery failed or recovered a different owner.
    #[error("invalid permit signature")]
    InvalidSignature,
    /// The permit's nonce was already consumed.
    #[error("permit nonce {nonce} already used")]
    NonceReuse {
        /// The reused nonce.
        nonce: U256,
    },
    /// More was requested than the signed message permits.
    #[error("requested {requested} exceeds permitted {permitted}")]
    AmountExceeded {
        /// The requested transfer amount.
        requested: U256,
        /// The amount the owner signed.
        permitted: U256,
    },
    /// A batched permit payload listed a different number of tokens and
    /// amounts.
    #[error("permit batch shape mismatch: {tokens} tokens, {amounts} amounts")]
    BatchShape {
        /// Number of tokens listed.
        tokens: usize,
        /// Number of amounts listed.
        amounts: usize,
    },
}
