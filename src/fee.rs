//! Protocol fee slices and native currency wrapping.

use crate::{
    config::{AggregatorConfig, BPS_DENOMINATOR},
    error::FeeError,
    state::ChainState,
};
use alloy::primitives::{Address, U256};

/// The wrapped-native-currency contract boundary.
///
/// Exchanges native currency for its wrapped ERC-20 representation 1:1.
/// Injected so the dispatcher never hardcodes a deployment.
pub trait WrappedNative {
    /// The wrapped token's address.
    fn token(&self) -> Address;

    /// Deposits `amount` of `holder`'s native currency, crediting wrapped
    /// tokens.
    fn wrap(&self, state: &mut ChainState, holder: Address, amount: U256) -> Result<(), FeeError>;

    /// Withdraws `amount` of `holder`'s wrapped tokens back to native.
    fn unwrap(&self, state: &mut ChainState, holder: Address, amount: U256)
        -> Result<(), FeeError>;
}

/// Ledger-backed wrapped-native implementation.
#[derive(Debug, Clone, Copy)]
pub struct Weth {
    token: Address,
}

impl Weth {
    /// A wrapped-native contract deployed at `token`.
    pub const fn new(token: Address) -> Self {
        Self { token }
    }
}

impl WrappedNative for Weth {
    fn token(&self) -> Address {
        self.token
    }

    fn wrap(&self, state: &mut ChainState, holder: Address, amount: U256) -> Result<(), FeeError> {
        state.burn_native(holder, amount).map_err(|err| FeeError::WrapFailed(err.to_string()))?;
        state.mint(self.token, holder, amount);
        Ok(())
    }

    fn unwrap(
        &self,
        state: &mut ChainState,
        holder: Address,
        amount: U256,
    ) -> Result<(), FeeError> {
        state
            .burn(self.token, holder, amount)
            .map_err(|err| FeeError::WrapFailed(err.to_string()))?;
        state.mint_native(holder, amount);
        Ok(())
    }
}

/// The `(protocol fee, gasless-service fee)` slices of `amount`, per the
/// configured basis points.
pub fn fee_slices(config: &AggregatorConfig, amount: U256) -> (U256, U256) {
    let denominator = U256::from(BPS_DENOMINATOR);
    (
        amount * U256::from(config.fee_bps) / denominator,
        amount * U256::from(config.service_bps) / denominator,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const WNATIVE: Address = address!("0xAcc15dC74880C9944775448304B263D191c6077F");
    const ALICE: Address = address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045");

    #[test]
    fn wrap_and_unwrap_are_one_to_one() {
        let weth = Weth::new(WNATIVE);
        let mut state = ChainState::new();
        state.mint_native(ALICE, U256::from(100));

        weth.wrap(&mut state, ALICE, U256::from(60)).unwrap();
        assert_eq!(state.native_balance_of(ALICE), U256::from(40));
        assert_eq!(state.balance_of(WNATIVE, ALICE), U256::from(60));

        weth.unwrap(&mut state, ALICE, U256::from(60)).unwrap();
        assert_eq!(state.native_balance_of(ALICE), U256::from(100));
        assert_eq!(state.balance_of(WNATIVE, ALICE), U256::ZERO);
    }

    #[test]
    fn wrap_beyond_balance_fails() {
        let weth = Weth::new(WNATIVE);
        let mut state = ChainState::new();
        state.mint_native(ALICE, U256::from(10));
        let err = weth.wrap(&mut state, ALICE, U256::from(11)).unwrap_err();
        assert!(matches!(err, FeeError::WrapFailed(_)));
    }

    #[test]
    fn slices_follow_configured_bps() {
        let config = AggregatorConfig {
            aggregator: Address::ZERO,
            fee_recipient: Address::ZERO,
            gasless_recipient: Address::ZERO,
            authority: Address::ZERO,
            wrapped_native: WNATIVE,
            chain_id: U256::from(1),
            fee_bps: 30,
            service_bps: 10,
        };
        let (fee, service) = fee_slices(&config, U256::from(10_000));
        assert_eq!(fee, U256::from(30));
        assert_eq!(service, U256::from(10));
    }
}
