//! Permit2-style signature-transfer message types and digests.
//!
//! The plain transfer variants hash through [`SolStruct`], whose generated
//! encode-type matches the canonical Permit2 type strings. The witness-bound
//! variants extend the signed message with application context (here: the
//! intended recipient), so their type strings are not derivable from a
//! `sol!` struct and are hashed manually.

use alloy::{
    primitives::{keccak256, Address, Keccak256, B256, U256},
    sol,
    sol_types::{Eip712Domain, SolStruct},
};

/// Canonical type string of the witness-bound single transfer.
const PERMIT_WITNESS_TRANSFER_TYPE: &str =
    "PermitWitnessTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline,Witness witness)TokenPermissions(address token,uint256 amount)Witness(address user)";

/// Canonical type string of the witness-bound batched transfer.
const PERMIT_BATCH_WITNESS_TRANSFER_TYPE: &str =
    "PermitBatchWitnessTransferFrom(TokenPermissions[] permitted,address spender,uint256 nonce,uint256 deadline,Witness witness)TokenPermissions(address token,uint256 amount)Witness(address user)";

sol! {
    /// A token/amount pair the owner permits to be transferred.
    #[derive(Debug, PartialEq, Eq)]
    struct TokenPermissions {
        /// The permitted token.
        address token;
        /// The maximum amount that may be pulled.
        uint256 amount;
    }

    /// The signed message of a single permit transfer.
    #[derive(Debug, PartialEq, Eq)]
    struct PermitTransferFrom {
        /// What may be transferred.
        TokenPermissions permitted;
        /// Who may execute the transfer.
        address spender;
        /// Unordered nonce, consumed on use.
        uint256 nonce;
        /// Expiry of the signature, seconds.
        uint256 deadline;
    }

    /// The signed message of a batched permit transfer.
    #[derive(Debug, PartialEq, Eq)]
    struct PermitBatchTransferFrom {
        /// What may be transferred, per token.
        TokenPermissions[] permitted;
        /// Who may execute the transfers.
        address spender;
        /// Unordered nonce covering the whole batch.
        uint256 nonce;
        /// Expiry of the signature, seconds.
        uint256 deadline;
    }

    /// Application context bound into a witness-carrying permit.
    ///
    /// Binding the recipient into the signed message stops a permit from
    /// being replayed towards a different destination.
    #[derive(Debug, PartialEq, Eq)]
    struct Witness {
        /// The account the pulled tokens are destined for.
        address user;
    }
}

/// The EIP-712 domain of a signature-transfer authority deployment.
///
/// Permit2 domains carry no version field.
pub fn authority_domain(chain_id: U256, verifying_contract: Address) -> Eip712Domain {
    Eip712Domain::new(
        Some("Permit2".into()),
        None,
        Some(chain_id),
        Some(verifying_contract),
        None,
    )
}

/// Finalizes `0x1901 || domainSeparator || structHash`.
fn eip712_digest(domain: &Eip712Domain, struct_hash: B256) -> B256 {
    let mut hasher = Keccak256::new();
    hasher.update([0x19, 0x01]);
    hasher.update(domain.separator());
    hasher.update(struct_hash);
    hasher.finalize()
}

impl PermitTransferFrom {
    /// Digest the owner signs for a plain transfer.
    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.eip712_signing_hash(domain)
    }

    /// Digest the owner signs for a witness-bound transfer.
    pub fn witness_signing_hash(&self, domain: &Eip712Domain, witness: &Witness) -> B256 {
        let mut hasher = Keccak256::new();
        hasher.update(keccak256(PERMIT_WITNESS_TRANSFER_TYPE));
        hasher.update(self.permitted.eip712_hash_struct());
        hasher.update(self.spender.into_word());
        hasher.update(self.nonce.to_be_bytes::<32>());
        hasher.update(self.deadline.to_be_bytes::<32>());
        hasher.update(witness.eip712_hash_struct());
        eip712_digest(domain, hasher.finalize())
    }
}

impl PermitBatchTransferFrom {
    /// Digest the owner signs for a plain batched transfer.
    pub fn signing_hash(&self, domain: &Eip712Domain) -> B256 {
        self.eip712_signing_hash(domain)
    }

    /// Digest the owner signs for a witness-bound batched transfer.
    pub fn witness_signing_hash(&self, domain: &Eip712Domain, witness: &Witness) -> B256 {
        let permitted_hash = {
            let mut hasher = Keccak256::new();
            for permission in &self.permitted {
                hasher.update(permission.eip712_hash_struct());
            }
            hasher.finalize()
        };
        let mut hasher = Keccak256::new();
        hasher.update(keccak256(PERMIT_BATCH_WITNESS_TRANSFER_TYPE));
        hasher.update(permitted_hash);
        hasher.update(self.spender.into_word());
        hasher.update(self.nonce.to_be_bytes::<32>());
        hasher.update(self.deadline.to_be_bytes::<32>());
        hasher.update(witness.eip712_hash_struct());
        eip712_digest(domain, hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn sample_permit() -> PermitTransferFrom {
        PermitTransferFrom {
            permitted: TokenPermissions {
                token: address!("0xc7183455a4c133ae270771860664b6b7ec320bb1"),
                amount: U256::from(1_000u64),
            },
            spender: address!("0x307AF7d28AfEE82092aA95D35644898311CA5360"),
            nonce: U256::from(0),
            deadline: U256::MAX,
        }
    }

    #[test]
    fn plain_encode_type_is_canonical() {
        assert_eq!(
            PermitTransferFrom::eip712_encode_type(),
            "PermitTransferFrom(TokenPermissions permitted,address spender,uint256 nonce,uint256 deadline)TokenPermissions(address token,uint256 amount)"
        );
    }

    #[test]
    fn witness_changes_the_digest() {
        let domain = authority_domain(
            U256::from(31337),
            address!("0x000000000022D473030F116dDEE9F6B43aC78BA3"),
        );
        let permit = sample_permit();
        let plain = permit.signing_hash(&domain);
        let bound = permit
            .witness_signing_hash(&domain, &Witness { user: permit.spender });
        assert_ne!(plain, bound);
    }

    #[test]
    fn witness_digest_commits_to_the_user() {
        let domain = authority_domain(
            U256::from(31337),
            address!("0x000000000022D473030F116dDEE9F6B43aC78BA3"),
        );
        let permit = sample_permit();
        let a = permit.witness_signing_hash(&domain, &Witness { user: permit.spender });
        let b = permit.witness_signing_hash(
            &domain,
            &Witness { user: address!("0xd8dA6BF26964aF9D7eEd9e03E53415D37aA96045") },
        );
        assert_ne!(a, b);
    }
}
