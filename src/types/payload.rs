//! Instruction payload schemas and the decoder keyed by instruction tag.
//!
//! Every [`InstructionKind`] maps to exactly one fixed positional tuple
//! schema. Payloads are produced by ABI parameter encoding (the shape
//! `defaultAbiCoder.encode` emits), so they are decoded with
//! `abi_decode_params` rather than as a single wrapped tuple.

use crate::types::InstructionKind;
use alloy::{
    sol,
    sol_types::{Error, SolValue},
};

sol! {
    /// Payload for [`InstructionKind::ExactIn`].
    #[derive(Debug, PartialEq, Eq)]
    struct ExactInParams {
        /// Token being sold.
        address tokenIn;
        /// Fixed input amount.
        uint256 amountIn;
        /// Slippage floor on the realized output.
        uint256 amountOutMin;
        /// Whether the input is drawn from the aggregator's running balance.
        bool useAggregatorBalance;
    }

    /// Payload for [`InstructionKind::ExactOut`].
    #[derive(Debug, PartialEq, Eq)]
    struct ExactOutParams {
        /// Token being sold.
        address tokenIn;
        /// Fixed output amount demanded.
        uint256 amountOut;
        /// Slippage ceiling on the consumed input.
        uint256 amountInMax;
        /// Whether the input is drawn from the aggregator's running balance.
        bool useAggregatorBalance;
    }

    /// Payload for [`InstructionKind::Permit2Transfer`].
    #[derive(Debug, PartialEq, Eq)]
    struct PermitTransferParams {
        /// The account that signed the permit and owns the tokens.
        address owner;
        /// Recipient of the pulled tokens, bound into the witness.
        address recipient;
        /// Token to pull.
        address token;
        /// Amount signed and transferred.
        uint256 amount;
        /// Unordered permit nonce.
        uint256 nonce;
        /// Signature expiry, seconds.
        uint256 deadline;
        /// EIP-712 signature over the permit message.
        bytes signature;
    }

    /// Payload for [`InstructionKind::Permit2Batch`].
    #[derive(Debug, PartialEq, Eq)]
    struct PermitBatchParams {
        /// The account that signed the permit and owns the tokens.
        address owner;
        /// Recipient of the pulled tokens, bound into the witness.
        address recipient;
        /// Tokens to pull, pairwise with `amounts`.
        address[] tokens;
        /// Amounts to pull, pairwise with `tokens`.
        uint256[] amounts;
        /// Unordered permit nonce covering the whole batch.
        uint256 nonce;
        /// Signature expiry, seconds.
        uint256 deadline;
        /// EIP-712 signature over the batched permit message.
        bytes signature;
    }

    /// Payload for [`InstructionKind::PayFee`].
    #[derive(Debug, PartialEq, Eq)]
    struct PayFeeParams {
        /// Token the fee is taken in.
        address token;
        /// Output amount the fee slices are computed from.
        uint256 amount;
    }

    /// Payload for [`InstructionKind::WrapNative`] and
    /// [`InstructionKind::UnwrapNative`].
    #[derive(Debug, PartialEq, Eq)]
    struct WrapParams {
        /// Amount exchanged 1:1.
        uint256 amount;
    }
}

/// A payload decoded against its instruction's schema.
#[derive(Debug, PartialEq, Eq)]
pub enum DecodedInstruction {
    /// Fixed-input swap.
    ExactIn(ExactInParams),
    /// Fixed-output swap.
    ExactOut(ExactOutParams),
    /// Single-token permit pull.
    Permit2Transfer(PermitTransferParams),
    /// Multi-token permit pull.
    Permit2Batch(PermitBatchParams),
    /// Protocol fee payment.
    PayFee(PayFeeParams),
    /// Native-to-wrapped exchange.
    WrapNative(WrapParams),
    /// Wrapped-to-native exchange.
    UnwrapNative(WrapParams),
}

/// Decodes `payload` against the schema of `instruction`.
///
/// Pure and stateless: decoding the same bytes twice yields identical
/// results. Truncated or misshapen payloads surface the ABI decode error.
pub fn decode(instruction: InstructionKind, payload: &[u8]) -> Result<DecodedInstruction, Error> {
    Ok(match instruction {
        InstructionKind::ExactIn => {
            DecodedInstruction::ExactIn(ExactInParams::abi_decode_params(payload)?)
        }
        InstructionKind::ExactOut => {
            DecodedInstruction::ExactOut(ExactOutParams::abi_decode_params(payload)?)
        }
        InstructionKind::Permit2Transfer => {
            DecodedInstruction::Permit2Transfer(PermitTransferParams::abi_decode_params(payload)?)
        }
        InstructionKind::Permit2Batch => {
            DecodedInstruction::Permit2Batch(PermitBatchParams::abi_decode_params(payload)?)
        }
        InstructionKind::PayFee => {
            DecodedInstruction::PayFee(PayFeeParams::abi_decode_params(payload)?)
        }
        InstructionKind::WrapNative => {
            DecodedInstruction::WrapNative(WrapParams::abi_decode_params(payload)?)
        }
        InstructionKind::UnwrapNative => {
            DecodedInstruction::UnwrapNative(WrapParams::abi_decode_params(payload)?)
        }
    })
}
