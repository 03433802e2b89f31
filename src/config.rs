//! Aggregator configuration.
use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

/// Basis points denominator.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Constructor-time configuration of an aggregator deployment.
///
/// Fixed once the aggregator is built; there is no admin-update path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatorConfig {
    /// The aggregator's own account, used as permit spender and as the
    /// holder of intermediate balances.
    pub aggregator: Address,
    /// Recipient of the protocol fee slice.
    pub fee_recipient: Address,
    /// Recipient of the gasless-service slice.
    pub gasless_recipient: Address,
    /// Deployed address of the signature-transfer authority, part of its
    /// EIP-712 domain.
    pub authority: Address,
    /// The wrapped representation of the chain's native currency.
    pub wrapped_native: Address,
    /// Chain id, part of the authority's EIP-712 domain.
    pub chain_id: U256,
    /// Protocol fee in basis points of the amount a `PAY_FEE` instruction
    /// names.
    #[serde(default)]
    pub fee_bps: u64,
    /// Gasless-service fee in basis points.
    #[serde(default)]
    pub service_bps: u64,
}

impl AggregatorConfig {
    /// Sets the protocol fee.
    pub fn with_fee_bps(mut self, fee_bps: u64) -> Self {
        self.fee_bps = fee_bps;
        self
    }

    /// Sets the gasless-service fee.
    pub fn with_service_bps(mut self, service_bps: u64) -> Self {
        self.service_bps = service_bps;
        self
    }
}
