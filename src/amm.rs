//! Uniform routing over the AMM backends.
//!
//! Price computation belongs to the backends; this module only normalizes
//! the three pool families behind one call shape, picks the backend by tag
//! and enforces the caller's slippage limit on the realized amounts.

use crate::{error::SwapError, state::ChainState, types::AmmKind};
use alloy::primitives::{Address, U256};
use std::collections::HashMap;
use tracing::debug;

/// Which leg of the trade is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwapDirection {
    /// Fixed input, output bounded below by the limit.
    ExactIn,
    /// Fixed output, input bounded above by the limit.
    ExactOut,
}

/// One normalized swap request.
#[derive(Debug, Clone, Copy)]
pub struct SwapRequest {
    /// Fixed or bounded-input direction.
    pub direction: SwapDirection,
    /// Token sold into the pool.
    pub token_in: Address,
    /// The fixed leg: input amount for [`SwapDirection::ExactIn`], demanded
    /// output for [`SwapDirection::ExactOut`].
    pub amount: U256,
    /// Slippage bound on the other leg.
    pub limit: U256,
    /// Account providing `token_in`.
    pub payer: Address,
    /// Account receiving the output token.
    pub recipient: Address,
}

/// Realized amounts of an executed swap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwapOutcome {
    /// The token the pool paid out.
    pub token_out: Address,
    /// Input actually consumed.
    pub amount_in: U256,
    /// Output actually produced.
    pub amount_out: U256,
}

/// A liquidity backend serving one AMM family.
///
/// Implementations move the balances in [`ChainState`] and report the
/// realized amounts; the counter-asset for a given input token is the
/// backend's to resolve.
pub trait AmmBackend {
    /// The pool family this backend serves.
    fn kind(&self) -> AmmKind;

    /// Executes the trade. Backend-internal failures are reported as
    /// [`SwapError::AdapterFailure`] and passed through unchanged.
    fn swap(&self, state: &mut ChainState, request: &SwapRequest) -> Result<SwapOutcome, SwapError>;
}

/// Routes swap requests to the backend registered for each [`AmmKind`].
#[derive(Default)]
pub struct AmmRouter {
    backends: HashMap<AmmKind, Box<dyn AmmBackend>>,
}

impl std::fmt::Debug for AmmRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AmmRouter").field("backends", &self.backends.keys()).finish()
    }
}

impl AmmRouter {
    /// An empty router.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `backend` under its own [`AmmBackend::kind`], replacing any
    /// previous backend for that kind.
    pub fn with_backend(mut self, backend: Box<dyn AmmBackend>) -> Self {
        self.backends.insert(backend.kind(), backend);
        self
    }

    /// Executes `request` on the backend registered for `amm`.
    ///
    /// Stable pools cannot serve a fixed-output request, so `ExactOut` on
    /// [`AmmKind::Stable`] is rejected before the backend is consulted.
    pub fn swap(
        &self,
        state: &mut ChainState,
        amm: AmmKind,
        request: &SwapRequest,
    ) -> Result<SwapOutcome, SwapError> {
        if amm == AmmKind::Stable && request.direction == SwapDirection::ExactOut {
            return Err(SwapError::UnsupportedDirection { amm });
        }
        let backend = self.backends.get(&amm).ok_or(SwapError::NoBackend { amm })?;
        let outcome = backend.swap(state, request)?;
        match request.direction {
            SwapDirection::ExactIn => {
                if outcome.amount_out < request.limit {
                    return Err(SwapError::SlippageExceeded {
                        limit: request.limit,
                        realized: outcome.amount_out,
                    });
                }
            }
            SwapDirection::ExactOut => {
                if outcome.amount_in > request.limit {
                    return Err(SwapError::SlippageExceeded {
                        limit: request.limit,
                        realized: outcome.amount_in,
                    });
                }
            }
        }
        debug!(
            amm = ?amm,
            token_in = %request.token_in,
            token_out = %outcome.token_out,
            amount_in = %outcome.amount_in,
            amount_out = %outcome.amount_out,
            "swap executed"
        );
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    const IN: Address = address!("0x0000000000000000000000000000000000000001");
    const OUT: Address = address!("0x0000000000000000000000000000000000000002");
    const AGG: Address = address!("0x307AF7d28AfEE82092aA95D35644898311CA5360");

    /// Pays out twice the input, or demands half the output.
    struct DoubleRate(AmmKind);

    impl AmmBackend for DoubleRate {
        fn kind(&self) -> AmmKind {
            self.0
        }

        fn swap(
            &self,
            state: &mut ChainState,
            request: &SwapRequest,
        ) -> Result<SwapOutcome, SwapError> {
            let (amount_in, amount_out) = match request.direction {
                SwapDirection::ExactIn => (request.amount, request.amount * U256::from(2)),
                SwapDirection::ExactOut => (request.amount / U256::from(2), request.amount),
            };
            state
                .burn(request.token_in, request.payer, amount_in)
                .map_err(|err| SwapError::AdapterFailure(err.to_string()))?;
            state.mint(OUT, request.recipient, amount_out);
            Ok(SwapOutcome { token_out: OUT, amount_in, amount_out })
        }
    }

    fn request(direction: SwapDirection, amount: u64, limit: u64) -> SwapRequest {
        SwapRequest {
            direction,
            token_in: IN,
            amount: U256::from(amount),
            limit: U256::from(limit),
            payer: AGG,
            recipient: AGG,
        }
    }

    #[test]
    fn exact_in_routes_and_credits_output() {
        let router = AmmRouter::new().with_backend(Box::new(DoubleRate(AmmKind::V2)));
        let mut state = ChainState::new();
        state.mint(IN, AGG, U256::from(10));
        let outcome =
            router.swap(&mut state, AmmKind::V2, &request(SwapDirection::ExactIn, 10, 20)).unwrap();
        assert_eq!(outcome, SwapOutcome {
            token_out: OUT,
            amount_in: U256::from(10),
            amount_out: U256::from(20)
        });
        assert_eq!(state.balance_of(OUT, AGG), U256::from(20));
    }

    #[test]
    fn slippage_floor_is_enforced() {
        let router = AmmRouter::new().with_backend(Box::new(DoubleRate(AmmKind::V2)));
        let mut state = ChainState::new();
        state.mint(IN, AGG, U256::from(10));
        let err = router
            .swap(&mut state, AmmKind::V2, &request(SwapDirection::ExactIn, 10, 21))
            .unwrap_err();
        assert_eq!(err, SwapError::SlippageExceeded {
            limit: U256::from(21),
            realized: U256::from(20)
        });
    }

    #[test]
    fn stable_rejects_exact_out_before_the_backend() {
        // No stable backend registered at all: the direction check fires first.
        let router = AmmRouter::new();
        let mut state = ChainState::new();
        let err = router
            .swap(&mut state, AmmKind::Stable, &request(SwapDirection::ExactOut, 10, 100))
            .unwrap_err();
        assert_eq!(err, SwapError::UnsupportedDirection { amm: AmmKind::Stable });
    }

    #[test]
    fn unregistered_backend_is_reported() {
        let router = AmmRouter::new();
        let mut state = ChainState::new();
        let err = router
            .swap(&mut state, AmmKind::V3, &request(SwapDirection::ExactIn, 1, 0))
            .unwrap_err();
        assert_eq!(err, SwapError::NoBackend { amm: AmmKind::V3 });
    }
}
