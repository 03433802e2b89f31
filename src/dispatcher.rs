//! The batch dispatcher.
//!
//! Validates the batch shape, decodes each payload against its command's
//! instruction schema, routes to the permit, swap, fee and wrap handlers,
//! and commits the resulting state only if every instruction succeeded.
//!
//! Atomicity is realized without a ledger's automatic revert: the batch
//! runs against a scratch clone of [`ChainState`], which replaces the
//! caller's state only on full success. A failure anywhere leaves the
//! original state untouched.

use crate::{
    amm::{AmmRouter, SwapDirection, SwapRequest},
    config::AggregatorConfig,
    error::{AggregatorError, FeeError, StateError},
    fee::{fee_slices, WrappedNative, Weth},
    permit::{pull_batch_with_permit, pull_with_permit, Permit2, SignatureTransfer},
    state::ChainState,
    types::{
        decode, Command, DecodedInstruction, ExactInParams, ExactOutParams, PayFeeParams,
        RawCommand, WrapParams,
    },
};
use alloy::primitives::{Address, Bytes, U256};
use std::collections::HashMap;
use tracing::{debug, trace};

/// Intermediate balances produced by earlier steps of the running batch.
///
/// Owned exclusively by the dispatcher for the duration of one call and
/// dropped afterwards; a step with `isInAggregator = true` draws its input
/// from here instead of pulling it from the caller.
#[derive(Debug, Default)]
struct ExecutionContext {
    held: HashMap<Address, U256>,
}

impl ExecutionContext {
    fn held(&self, token: Address) -> U256 {
        self.held.get(&token).copied().unwrap_or_default()
    }

    fn credit(&mut self, token: Address, amount: U256) {
        let held = self.held.entry(token).or_default();
        *held = held.saturating_add(amount);
    }

    /// Consumes `amount` of the running balance; `holder` only labels the
    /// error.
    fn debit(&mut self, token: Address, amount: U256, holder: Address) -> Result<(), StateError> {
        let available = self.held(token);
        if available < amount {
            return Err(StateError::InsufficientBalance {
                token,
                holder,
                needed: amount,
                available,
            });
        }
        self.held.insert(token, available - amount);
        Ok(())
    }
}

/// The token-swap aggregator.
///
/// Holds the fixed deployment configuration and the injected collaborators:
/// the signature-transfer authority, the wrapped-native contract and the
/// AMM backends.
#[derive(Debug)]
pub struct Aggregator<A = Permit2, W = Weth>
where
    A: SignatureTransfer,
    W: WrappedNative,
{
    config: AggregatorConfig,
    authority: A,
    wrapped: W,
    router: AmmRouter,
}

impl Aggregator {
    /// An aggregator with the default collaborators derived from `config`:
    /// a [`Permit2`] authority and a ledger-backed wrapped-native contract.
    pub fn new(config: AggregatorConfig, router: AmmRouter) -> Self {
        Self {
            authority: Permit2::new(config.chain_id, config.authority),
            wrapped: Weth::new(config.wrapped_native),
            config,
            router,
        }
    }
}

impl<A, W> Aggregator<A, W>
where
    A: SignatureTransfer,
    W: WrappedNative,
{
    /// An aggregator with explicitly injected collaborators.
    pub fn with_parts(config: AggregatorConfig, authority: A, wrapped: W, router: AmmRouter) -> Self {
        Self { config, authority, wrapped, router }
    }

    /// The deployment configuration.
    pub fn config(&self) -> &AggregatorConfig {
        &self.config
    }

    /// The signature-transfer authority.
    pub fn authority(&self) -> &A {
        &self.authority
    }

    /// Validates raw command tags and executes the batch.
    pub fn execute_raw(
        &self,
        state: &mut ChainState,
        caller: Address,
        commands: &[RawCommand],
        inputs: &[Bytes],
    ) -> Result<(), AggregatorError> {
        if commands.len() != inputs.len() {
            return Err(AggregatorError::LengthMismatch);
        }
        let commands =
            commands.iter().map(Command::try_from).collect::<Result<Vec<_>, _>>()?;
        self.execute(state, caller, &commands, inputs)
    }

    /// Executes an instruction batch atomically.
    ///
    /// The command and payload slices are paired index-for-index; a length
    /// mismatch fails before anything is decoded. Instructions run in
    /// submission order and any failure aborts the whole batch with no
    /// observable effect on `state`. An empty batch is a valid no-op.
    pub fn execute(
        &self,
        state: &mut ChainState,
        caller: Address,
        commands: &[Command],
        inputs: &[Bytes],
    ) -> Result<(), AggregatorError> {
        if commands.len() != inputs.len() {
            return Err(AggregatorError::LengthMismatch);
        }

        let mut scratch = state.clone();
        let mut ctx = ExecutionContext::default();

        for (index, (command, input)) in commands.iter().zip(inputs).enumerate() {
            trace!(index, instruction = ?command.instruction, "executing instruction");
            self.step(&mut scratch, &mut ctx, caller, command, input)?;
        }

        debug!(steps = commands.len(), caller = %caller, "batch committed");
        *state = scratch;
        Ok(())
    }

    /// Decodes and runs one instruction against the scratch state.
    fn step(
        &self,
        state: &mut ChainState,
        ctx: &mut ExecutionContext,
        caller: Address,
        command: &Command,
        input: &Bytes,
    ) -> Result<(), AggregatorError> {
        match decode(command.instruction, input)? {
            DecodedInstruction::ExactIn(params) => self.exact_in(state, ctx, caller, command, &params),
            DecodedInstruction::ExactOut(params) => {
                self.exact_out(state, ctx, caller, command, &params)
            }
            DecodedInstruction::Permit2Transfer(params) => {
                let amount =
                    pull_with_permit(&self.authority, state, self.config.aggregator, &params)?;
                if params.recipient == self.config.aggregator {
                    ctx.credit(params.token, amount);
                }
                Ok(())
            }
            DecodedInstruction::Permit2Batch(params) => {
                let amounts =
                    pull_batch_with_permit(&self.authority, state, self.config.aggregator, &params)?;
                if params.recipient == self.config.aggregator {
                    for (&token, amount) in params.tokens.iter().zip(amounts) {
                        ctx.credit(token, amount);
                    }
                }
                Ok(())
            }
            DecodedInstruction::PayFee(params) => self.pay_fee(state, ctx, &params),
            DecodedInstruction::WrapNative(params) => self.wrap(state, ctx, caller, &params),
            DecodedInstruction::UnwrapNative(params) => self.unwrap(state, ctx, caller, &params),
        }
    }

    fn exact_in(
        &self,
        state: &mut ChainState,
        ctx: &mut ExecutionContext,
        caller: Address,
        command: &Command,
        params: &ExactInParams,
    ) -> Result<(), AggregatorError> {
        let aggregator = self.config.aggregator;
        if params.useAggregatorBalance {
            ctx.debit(params.tokenIn, params.amountIn, aggregator)?;
        } else {
            state.transfer(params.tokenIn, caller, aggregator, params.amountIn)?;
        }
        let outcome = self.router.swap(state, command.amm, &SwapRequest {
            direction: SwapDirection::ExactIn,
            token_in: params.tokenIn,
            amount: params.amountIn,
            limit: params.amountOutMin,
            payer: aggregator,
            recipient: aggregator,
        })?;
        ctx.credit(outcome.token_out, outcome.amount_out);
        Ok(())
    }

    fn exact_out(
        &self,
        state: &mut ChainState,
        ctx: &mut ExecutionContext,
        caller: Address,
        command: &Command,
        params: &ExactOutParams,
    ) -> Result<(), AggregatorError> {
        let aggregator = self.config.aggregator;
        // The consumed input is only known after the trade. Callers paying
        // from their own account front the maximum and get the unspent part
        // back; context-funded steps settle against the running balance.
        if !params.useAggregatorBalance {
            state.transfer(params.tokenIn, caller, aggregator, params.amountInMax)?;
        }
        let outcome = self.router.swap(state, command.amm, &SwapRequest {
            direction: SwapDirection::ExactOut,
            token_in: params.tokenIn,
            amount: params.amountOut,
            limit: params.amountInMax,
            payer: aggregator,
            recipient: aggregator,
        })?;
        if params.useAggregatorBalance {
            ctx.debit(params.tokenIn, outcome.amount_in, aggregator)?;
        } else {
            let refund = params.amountInMax - outcome.amount_in;
            if refund > U256::ZERO {
                state.transfer(params.tokenIn, aggregator, caller, refund)?;
            }
        }
        ctx.credit(outcome.token_out, outcome.amount_out);
        Ok(())
    }

    fn pay_fee(
        &self,
        state: &mut ChainState,
        ctx: &mut ExecutionContext,
        params: &PayFeeParams,
    ) -> Result<(), AggregatorError> {
        let (fee, service) = fee_slices(&self.config, params.amount);
        let total = fee.saturating_add(service);
        let available = ctx.held(params.token);
        if total > available {
            return Err(FeeError::InsufficientOutput {
                token: params.token,
                needed: total,
                available,
            }
            .into());
        }
        let aggregator = self.config.aggregator;
        state.transfer(params.token, aggregator, self.config.fee_recipient, fee)?;
        state.transfer(params.token, aggregator, self.config.gasless_recipient, service)?;
        ctx.debit(params.token, total, aggregator)?;
        trace!(token = %params.token, fee = %fee, service = %service, "fee paid");
        Ok(())
    }

    fn wrap(
        &self,
        state: &mut ChainState,
        ctx: &mut ExecutionContext,
        caller: Address,
        params: &WrapParams,
    ) -> Result<(), AggregatorError> {
        let aggregator = self.config.aggregator;
        state
            .transfer_native(caller, aggregator, params.amount)
            .map_err(|err| FeeError::WrapFailed(err.to_string()))?;
        self.wrapped.wrap(state, aggregator, params.amount)?;
        ctx.credit(self.wrapped.token(), params.amount);
        Ok(())
    }

    fn unwrap(
        &self,
        state: &mut ChainState,
        ctx: &mut ExecutionContext,
        caller: Address,
        params: &WrapParams,
    ) -> Result<(), AggregatorError> {
        let aggregator = self.config.aggregator;
        ctx.debit(self.wrapped.token(), params.amount, aggregator)?;
        self.wrapped.unwrap(state, aggregator, params.amount)?;
        state.transfer_native(aggregator, caller, params.amount)?;
        Ok(())
    }
}
