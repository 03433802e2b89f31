//! In-memory model of the ledger state the aggregator executes against.
//!
//! On chain, token balances, native balances and permit nonces live in
//! external contracts and the ledger reverts them wholesale on failure. Here
//! they are modeled in one cloneable value so the dispatcher can realize
//! all-or-nothing semantics by executing a batch against a scratch clone and
//! committing it back only on full success.

use crate::error::StateError;
use alloy::primitives::{Address, U256};
use std::collections::HashMap;

/// Balances, permit nonces and the clock, as one snapshot.
#[derive(Debug, Clone, Default)]
pub struct ChainState {
    /// ERC-20 balances keyed by `(token, holder)`.
    balances: HashMap<(Address, Address), U256>,
    /// Native currency balances.
    native: HashMap<Address, U256>,
    /// Unordered permit nonces: `(owner, word index) -> bitmap`.
    nonce_bitmap: HashMap<(Address, U256), U256>,
    /// Current block timestamp, seconds.
    timestamp: u64,
}

impl ChainState {
    /// An empty state at timestamp zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current block timestamp, seconds.
    pub fn timestamp(&self) -> u64 {
        self.timestamp
    }

    /// Advances the clock.
    pub fn set_timestamp(&mut self, timestamp: u64) {
        self.timestamp = timestamp;
    }

    /// The `holder`'s balance of `token`.
    pub fn balance_of(&self, token: Address, holder: Address) -> U256 {
        self.balances.get(&(token, holder)).copied().unwrap_or_default()
    }

    /// The `holder`'s native currency balance.
    pub fn native_balance_of(&self, holder: Address) -> U256 {
        self.native.get(&holder).copied().unwrap_or_default()
    }

    /// Credits `holder` with `amount` of `token` out of thin air.
    ///
    /// Stands in for the token contract's own supply; used to seed
    /// scenarios.
    pub fn mint(&mut self, token: Address, holder: Address, amount: U256) {
        let balance = self.balances.entry((token, holder)).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Credits `holder` with `amount` of native currency.
    pub fn mint_native(&mut self, holder: Address, amount: U256) {
        let balance = self.native.entry(holder).or_default();
        *balance = balance.saturating_add(amount);
    }

    /// Moves `amount` of `token` from `from` to `to`.
    pub fn transfer(
        &mut self,
        token: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), StateError> {
        let available = self.balance_of(token, from);
        if available < amount {
            return Err(StateError::InsufficientBalance {
                token,
                holder: from,
                needed: amount,
                available,
            });
        }
        self.balances.insert((token, from), available - amount);
        self.mint(token, to, amount);
        Ok(())
    }

    /// Moves `amount` of native currency from `from` to `to`.
    pub fn transfer_native(
        &mut self,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), StateError> {
        let available = self.native_balance_of(from);
        if available < amount {
            return Err(StateError::InsufficientNative { holder: from, needed: amount, available });
        }
        self.native.insert(from, available - amount);
        self.mint_native(to, amount);
        Ok(())
    }

    /// Burns `amount` of `token` held by `holder`.
    pub fn burn(
        &mut self,
        token: Address,
        holder: Address,
        amount: U256,
    ) -> Result<(), StateError> {
        let available = self.balance_of(token, holder);
        if available < amount {
            return Err(StateError::InsufficientBalance {
                token,
                holder,
                needed: amount,
                available,
            });
        }
        self.balances.insert((token, holder), available - amount);
        Ok(())
    }

    /// Burns `amount` of native currency held by `holder`.
    pub fn burn_native(&mut self, holder: Address, amount: U256) -> Result<(), StateError> {
        let available = self.native_balance_of(holder);
        if available < amount {
            return Err(StateError::InsufficientNative { holder, needed: amount, available });
        }
        self.native.insert(holder, available - amount);
        Ok(())
    }

    /// Whether `owner`'s permit nonce has been consumed.
    pub fn is_nonce_used(&self, owner: Address, nonce: U256) -> bool {
        let (word, mask) = Self::nonce_slot(nonce);
        self.nonce_bitmap.get(&(owner, word)).is_some_and(|bitmap| bitmap & mask != U256::ZERO)
    }

    /// Consumes `owner`'s permit nonce. Returns `false` if already used.
    pub fn try_use_nonce(&mut self, owner: Address, nonce: U256) -> bool {
        let (word, mask) = Self::nonce_slot(nonce);
        let bitmap = self.nonce_bitmap.entry((owner, word)).or_default();
        if *bitmap & mask != U256::ZERO {
            return false;
        }
        *bitmap |= mask;
        true
    }

    /// Unordered-nonce bitmap position: the high 248 bits select the word,
    /// the low 8 bits the bit within it.
    fn nonce_slot(nonce: U256) -> (U256, U256) {
        (nonce >> 8, U256::from(1u8) << (nonce.as_limbs()[0] & 0xff) as usize)
    }
}
