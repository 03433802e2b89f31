//! Batch command types.

use crate::error::AggregatorError;
use alloy::sol;

sol! {
    /// One entry of an instruction batch as it arrives over the ABI.
    ///
    /// ```solidity
    /// struct Command { uint8 ammType; uint8 instruction; bool isInAggregator; }
    /// ```
    #[derive(Debug)]
    struct RawCommand {
        /// AMM backend tag, see [`AmmKind`].
        uint8 ammType;
        /// Instruction tag, see [`InstructionKind`].
        uint8 instruction;
        /// Whether the instruction's input is already held by the aggregator.
        bool isInAggregator;
    }
}

/// Which AMM backend a swap instruction targets.
///
/// Irrelevant for non-swap instructions, but always present on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AmmKind {
    /// Constant-product pools.
    V2,
    /// Concentrated-liquidity pools.
    V3,
    /// StableSwap pools for pegged assets.
    Stable,
}

impl TryFrom<u8> for AmmKind {
    type Error = AggregatorError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::V2),
            1 => Ok(Self::V3),
            2 => Ok(Self::Stable),
            _ => Err(AggregatorError::UnsupportedInstruction { tag }),
        }
    }
}

/// The operation tag of a batch entry.
///
/// Determines the schema the paired payload is decoded against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstructionKind {
    /// Swap a fixed input amount, demanding a minimum output.
    ExactIn,
    /// Swap for a fixed output amount, bounding the input.
    ExactOut,
    /// Pull a single token from its owner via a signed permit.
    Permit2Transfer,
    /// Pull several tokens at once under one signed permit.
    Permit2Batch,
    /// Pay the protocol fee slice out of an output amount.
    PayFee,
    /// Exchange native currency for its wrapped representation.
    WrapNative,
    /// Exchange wrapped currency back to native.
    UnwrapNative,
}

impl TryFrom<u8> for InstructionKind {
    type Error = AggregatorError;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(Self::ExactIn),
            1 => Ok(Self::ExactOut),
            2 => Ok(Self::Permit2Transfer),
            3 => Ok(Self::Permit2Batch),
            4 => Ok(Self::PayFee),
            5 => Ok(Self::WrapNative),
            6 => Ok(Self::UnwrapNative),
            _ => Err(AggregatorError::UnsupportedInstruction { tag }),
        }
    }
}

/// A validated batch command.
///
/// Produced from [`RawCommand`] before dispatch; unknown tags are rejected
/// at conversion time so the dispatch loop only ever sees closed enums.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Command {
    /// The AMM backend a swap instruction routes to.
    pub amm: AmmKind,
    /// The operation to perform.
    pub instruction: InstructionKind,
    /// Whether the input token is already held by the aggregator as the
    /// output of an earlier step, instead of being pulled from the caller.
    pub is_in_aggregator: bool,
}

impl Command {
    /// Convenience constructor.
    pub const fn new(amm: AmmKind, instruction: InstructionKind, is_in_aggregator: bool) -> Self {
        Self { amm, instruction, is_in_aggregator }
    }
}

impl TryFrom<&RawCommand> for Command {
    type Error = AggregatorError;

    fn try_from(raw: &RawCommand) -> Result<Self, Self::Error> {
        Ok(Self {
            amm: raw.ammType.try_into()?,
            instruction: raw.instruction.try_into()?,
            is_in_aggregator: raw.isInAggregator,
        })
    }
}
