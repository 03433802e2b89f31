//! Shared environment for the execution scenario tests.

use aggregator::{
    amm::{AmmBackend, AmmRouter, SwapDirection, SwapOutcome, SwapRequest},
    error::SwapError,
    permit::Permit2,
    state::ChainState,
    types::{
        AmmKind, PermitBatchTransferFrom, PermitTransferFrom, TokenPermissions, Witness,
    },
    Aggregator, AggregatorConfig,
};
use alloy::{
    primitives::{address, Address, Bytes, U256},
    signers::{local::PrivateKeySigner, SignerSync},
};

pub const USDC: Address = address!("0x0000000000000000000000000000000000000a01");
pub const DAI: Address = address!("0x0000000000000000000000000000000000000a02");
pub const WNATIVE: Address = address!("0xAcc15dC74880C9944775448304B263D191c6077F");
pub const AGGREGATOR: Address = address!("0x307AF7d28AfEE82092aA95D35644898311CA5360");
pub const AUTHORITY: Address = address!("0x000000000022D473030F116dDEE9F6B43aC78BA3");
pub const FEE_RECIPIENT: Address = address!("0x0000000000000000000000000000000000000f01");
pub const GASLESS_RECIPIENT: Address = address!("0x0000000000000000000000000000000000000f02");
pub const CHAIN_ID: u64 = 31337;

/// A single-pair pool trading `token_in` for `token_out` at a fixed
/// `numerator / denominator` rate. Stands in for the external pool math.
pub struct FixedRatePool {
    pub kind: AmmKind,
    pub token_in: Address,
    pub token_out: Address,
    pub numerator: u64,
    pub denominator: u64,
}

impl AmmBackend for FixedRatePool {
    fn kind(&self) -> AmmKind {
        self.kind
    }

    fn swap(&self, state: &mut ChainState, request: &SwapRequest) -> Result<SwapOutcome, SwapError> {
        if request.token_in != self.token_in {
            return Err(SwapError::AdapterFailure(format!(
                "pool does not trade {}",
                request.token_in
            )));
        }
        let num = U256::from(self.numerator);
        let den = U256::from(self.denominator);
        let (amount_in, amount_out) = match request.direction {
            SwapDirection::ExactIn => (request.amount, request.amount * num / den),
            SwapDirection::ExactOut => {
                // Round the consumed input up.
                let amount_in = (request.amount * den + num - U256::from(1)) / num;
                (amount_in, request.amount)
            }
        };
        state
            .burn(self.token_in, request.payer, amount_in)
            .map_err(|err| SwapError::AdapterFailure(err.to_string()))?;
        state.mint(self.token_out, request.recipient, amount_out);
        Ok(SwapOutcome { token_out: self.token_out, amount_in, amount_out })
    }
}

/// A pool that always reverts, for atomicity scenarios.
pub struct RevertingPool(pub AmmKind);

impl AmmBackend for RevertingPool {
    fn kind(&self) -> AmmKind {
        self.0
    }

    fn swap(&self, _: &mut ChainState, _: &SwapRequest) -> Result<SwapOutcome, SwapError> {
        Err(SwapError::AdapterFailure("pool is out of liquidity".into()))
    }
}

pub struct TestEnv {
    pub aggregator: Aggregator,
    pub state: ChainState,
    pub owner: PrivateKeySigner,
    pub caller: Address,
}

pub fn config() -> AggregatorConfig {
    AggregatorConfig {
        aggregator: AGGREGATOR,
        fee_recipient: FEE_RECIPIENT,
        gasless_recipient: GASLESS_RECIPIENT,
        authority: AUTHORITY,
        wrapped_native: WNATIVE,
        chain_id: U256::from(CHAIN_ID),
        fee_bps: 30,
        service_bps: 10,
    }
}

impl TestEnv {
    /// An environment with a USDC/DAI constant-rate V2 pool (1:2), a
    /// WNATIVE/USDC V3 pool (1:1) and a USDC/DAI stable pool (1:1), plus a
    /// funded owner and caller.
    pub fn setup() -> eyre::Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();

        let router = AmmRouter::new()
            .with_backend(Box::new(FixedRatePool {
                kind: AmmKind::V2,
                token_in: USDC,
                token_out: DAI,
                numerator: 2,
                denominator: 1,
            }))
            .with_backend(Box::new(FixedRatePool {
                kind: AmmKind::V3,
                token_in: WNATIVE,
                token_out: USDC,
                numerator: 1,
                denominator: 1,
            }))
            .with_backend(Box::new(FixedRatePool {
                kind: AmmKind::Stable,
                token_in: USDC,
                token_out: DAI,
                numerator: 1,
                denominator: 1,
            }));

        let owner = PrivateKeySigner::random();
        let caller = owner.address();
        let mut state = ChainState::new();
        state.set_timestamp(1_700_000_000);
        state.mint(USDC, caller, U256::from(1_000_000));
        state.mint_native(caller, U256::from(1_000_000));

        Ok(Self { aggregator: Aggregator::new(config(), router), state, owner, caller })
    }
    pub fn authority(&self) -> &Permit2 {
        self.aggregator.authority()
    }

    /// Signs a witness-bound single permit for `recipient`.
    pub fn sign_permit(
        &self,
        token: Address,
        amount: U256,
        nonce: u64,
        deadline: U256,
        recipient: Address,
    ) -> Bytes {
        let permit = PermitTransferFrom {
            permitted: TokenPermissions { token, amount },
            spender: AGGREGATOR,
            nonce: U256::from(nonce),
            deadline,
        };
        let digest = permit
            .witness_signing_hash(self.authority().domain(), &Witness { user: recipient });
        self.owner.sign_hash_sync(&digest).unwrap().as_bytes().into()
    }

    /// Signs a witness-bound batched permit for `recipient`.
    pub fn sign_permit_batch(
        &self,
        permitted: Vec<(Address, U256)>,
        nonce: u64,
        deadline: U256,
        recipient: Address,
    ) -> Bytes {
        let permit = PermitBatchTransferFrom {
            permitted: permitted
                .into_iter()
                .map(|(token, amount)| TokenPermissions { token, amount })
                .collect(),
            spender: AGGREGATOR,
            nonce: U256::from(nonce),
            deadline,
        };
        let digest = permit
            .witness_signing_hash(self.authority().domain(), &Witness { user: recipient });
        self.owner.sign_hash_sync(&digest).unwrap().as_bytes().into()
    }
}
