//! Permit-based token pulls.
//!
//! The aggregator never takes a plain allowance: callers authorize pulls
//! with one off-chain EIP-712 signature, and the signature-transfer
//! authority verifies it and moves the tokens. The authority is an injected
//! capability so tests can substitute a deterministic double.

use crate::{
    error::{AggregatorError, PermitError},
    state::ChainState,
    types::{
        PermitBatchParams, PermitBatchTransferFrom, PermitTransferFrom, PermitTransferParams,
        TokenPermissions, Witness,
    },
};
use alloy::{
    primitives::{Address, Signature, B256, U256},
    sol_types::Eip712Domain,
};
use tracing::trace;

/// Destination and size of one permitted pull.
#[derive(Debug, Clone, Copy)]
pub struct TransferDetails {
    /// Recipient of the pulled tokens.
    pub to: Address,
    /// Requested amount, at most the signed amount.
    pub requested_amount: U256,
}

/// A signature-transfer authority: verifies a signed permit and performs
/// the pull.
///
/// Single and batched pulls share the same verification discipline. The
/// optional witness extends the signed message with application context;
/// a signature produced without the witness the verifier binds is invalid.
pub trait SignatureTransfer {
    /// Verifies `signature` over `permit` (and `witness`, when given),
    /// consumes the permit's nonce and transfers the requested amount from
    /// `owner`. Returns the transferred amount.
    fn permit_transfer_from(
        &self,
        state: &mut ChainState,
        permit: &PermitTransferFrom,
        details: &TransferDetails,
        owner: Address,
        witness: Option<&Witness>,
        signature: &[u8],
    ) -> Result<U256, AggregatorError>;

    /// Batched variant of [`Self::permit_transfer_from`]: one nonce and one
    /// signature cover every listed token; all transfers happen or none.
    fn permit_batch_transfer_from(
        &self,
        state: &mut ChainState,
        permit: &PermitBatchTransferFrom,
        details: &[TransferDetails],
        owner: Address,
        witness: Option<&Witness>,
        signature: &[u8],
    ) -> Result<Vec<U256>, AggregatorError>;
}

/// A Permit2-modeled signature-transfer authority.
///
/// Verification recomputes the canonical permit digest for this
/// deployment's domain, recovers the signer and consumes the unordered
/// nonce tracked in [`ChainState`].
#[derive(Debug, Clone)]
pub struct Permit2 {
    domain: Eip712Domain,
}

impl Permit2 {
    /// An authority deployed at `address` on `chain_id`.
    pub fn new(chain_id: U256, address: Address) -> Self {
        Self { domain: crate::types::authority_domain(chain_id, address) }
    }

    /// The authority's EIP-712 domain.
    pub fn domain(&self) -> &Eip712Domain {
        &self.domain
    }

    /// Common verification: deadline, signer recovery, nonce consumption.
    fn verify(
        &self,
        state: &mut ChainState,
        digest: B256,
        owner: Address,
        nonce: U256,
        deadline: U256,
        signature: &[u8],
    ) -> Result<(), PermitError> {
        let now = state.timestamp();
        if U256::from(now) > deadline {
            return Err(PermitError::Expired { deadline, now });
        }
        let recovered = Signature::from_raw(signature)
            .and_then(|sig| sig.recover_address_from_prehash(&digest))
            .map_err(|_| PermitError::InvalidSignature)?;
        if recovered != owner {
            return Err(PermitError::InvalidSignature);
        }
        if !state.try_use_nonce(owner, nonce) {
            return Err(PermitError::NonceReuse { nonce });
        }
        Ok(())
    }
}

impl SignatureTransfer for Permit2 {
    fn permit_transfer_from(
        &self,
        state: &mut ChainState,
        permit: &PermitTransferFrom,
        details: &TransferDetails,
        owner: Address,
        witness: Option<&Witness>,
        signature: &[u8],
    ) -> Result<U256, AggregatorError> {
        if details.requested_amount > permit.permitted.amount {
            return Err(PermitError::AmountExceeded {
                requested: details.requested_amount,
                permitted: permit.permitted.amount,
            }
            .into());
        }
        let digest = match witness {
            Some(witness) => permit.witness_signing_hash(&self.domain, witness),
            None => permit.signing_hash(&self.domain),
        };
        self.verify(state, digest, owner, permit.nonce, permit.deadline, signature)?;
        state.transfer(permit.permitted.token, owner, details.to, details.requested_amount)?;
        trace!(
            token = %permit.permitted.token,
            owner = %owner,
            to = %details.to,
            amount = %details.requested_amount,
            "permit transfer"
        );
        Ok(details.requested_amount)
    }

    fn permit_batch_transfer_from(
        &self,
        state: &mut ChainState,
        permit: &PermitBatchTransferFrom,
        details: &[TransferDetails],
        owner: Address,
        witness: Option<&Witness>,
        signature: &[u8],
    ) -> Result<Vec<U256>, AggregatorError> {
        if permit.permitted.len() != details.len() {
            return Err(PermitError::BatchShape {
                tokens: permit.permitted.len(),
                amounts: details.len(),
            }
            .into());
        }
        for (permission, detail) in permit.permitted.iter().zip(details) {
            if detail.requested_amount > permission.amount {
                return Err(PermitError::AmountExceeded {
                    requested: detail.requested_amount,
                    permitted: permission.amount,
                }
                .into());
            }
        }
        let digest = match witness {
            Some(witness) => permit.witness_signing_hash(&self.domain, witness),
            None => permit.signing_hash(&self.domain),
        };
        self.verify(state, digest, owner, permit.nonce, permit.deadline, signature)?;
        let mut transferred = Vec::with_capacity(details.len());
        for (permission, detail) in permit.permitted.iter().zip(details) {
            state.transfer(permission.token, owner, detail.to, detail.requested_amount)?;
            transferred.push(detail.requested_amount);
        }
        Ok(transferred)
    }
}

/// Assembles the permit message for a decoded `PERMIT2_TRANSFER` payload
/// and forwards it to the authority, binding the recipient as witness.
pub fn pull_with_permit<A: SignatureTransfer + ?Sized>(
    authority: &A,
    state: &mut ChainState,
    spender: Address,
    params: &PermitTransferParams,
) -> Result<U256, AggregatorError> {
    let permit = PermitTransferFrom {
        permitted: TokenPermissions { token: params.token, amount: params.amount },
        spender,
        nonce: params.nonce,
        deadline: params.deadline,
    };
    let witness = Witness { user: params.recipient };
    authority.permit_transfer_from(
        state,
        &permit,
        &TransferDetails { to: params.recipient, requested_amount: params.amount },
        params.owner,
        Some(&witness),
        &params.signature,
    )
}

/// Assembles the batched permit message for a decoded `PERMIT2_BATCH`
/// payload and forwards it to the authority.
pub fn pull_batch_with_permit<A: SignatureTransfer + ?Sized>(
    authority: &A,
    state: &mut ChainState,
    spender: Address,
    params: &PermitBatchParams,
) -> Result<Vec<U256>, AggregatorError> {
    if params.tokens.len() != params.amounts.len() {
        return Err(PermitError::BatchShape {
            tokens: params.tokens.len(),
            amounts: params.amounts.len(),
        }
        .into());
    }
    let permit = PermitBatchTransferFrom {
        permitted: params
            .tokens
            .iter()
            .zip(&params.amounts)
            .map(|(&token, &amount)| TokenPermissions { token, amount })
            .collect(),
        spender,
        nonce: params.nonce,
        deadline: params.deadline,
    };
    let witness = Witness { user: params.recipient };
    let details: Vec<_> = params
        .amounts
        .iter()
        .map(|&amount| TransferDetails { to: params.recipient, requested_amount: amount })
        .collect();
    authority.permit_batch_transfer_from(
        state,
        &permit,
        &details,
        params.owner,
        Some(&witness),
        &params.signature,
    )
}
