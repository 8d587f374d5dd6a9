//! # In-Memory Asset Ledger
//!
//! Ownership ledger for tests and single-process deployments.
//! Production deployments would bind `AssetLedger` to the chain's NFT state.

use crate::domain::value_objects::{Address, Credential};
use crate::errors::LedgerError;
use crate::ports::outbound::AssetLedger;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// In-memory token ownership.
#[derive(Debug, Default)]
pub struct InMemoryAssetLedger {
    /// Token → holder.
    holders: RwLock<HashMap<Credential, Address>>,
    /// Collections whose transfers are refused.
    frozen: RwLock<HashSet<Address>>,
}

impl InMemoryAssetLedger {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `token` to `holder`, replacing any previous holder.
    pub fn set_holder(&self, token: Credential, holder: Address) {
        self.holders.write().insert(token, holder);
    }

    /// Refuse every transfer in `collection` until thawed.
    pub fn freeze_collection(&self, collection: Address) {
        self.frozen.write().insert(collection);
    }

    /// Allow transfers in `collection` again.
    pub fn thaw_collection(&self, collection: Address) {
        self.frozen.write().remove(&collection);
    }

    /// Number of tokens held by `holder` in `collection`.
    #[must_use]
    pub fn balance_of(&self, collection: Address, holder: Address) -> usize {
        self.holders
            .read()
            .iter()
            .filter(|(token, owner)| token.collection == collection && **owner == holder)
            .count()
    }
}

impl AssetLedger for InMemoryAssetLedger {
    fn owner_of(&self, token: &Credential) -> Option<Address> {
        self.holders.read().get(token).copied()
    }

    fn transfer(&self, token: &Credential, from: Address, to: Address) -> Result<(), LedgerError> {
        if self.frozen.read().contains(&token.collection) {
            return Err(LedgerError::Refused(format!(
                "collection {} is frozen",
                token.collection
            )));
        }

        let mut holders = self.holders.write();
        match holders.get(token) {
            None => Err(LedgerError::TokenNotFound(*token)),
            Some(holder) if *holder != from => Err(LedgerError::NotHolder {
                credential: *token,
                from,
            }),
            Some(_) => {
                holders.insert(*token, to);
                Ok(())
            }
        }
    }

    fn mint(&self, token: &Credential, to: Address) -> Result<(), LedgerError> {
        let mut holders = self.holders.write();
        if holders.contains_key(token) {
            return Err(LedgerError::AlreadyMinted(*token));
        }
        holders.insert(*token, to);
        Ok(())
    }

    fn burn(&self, token: &Credential) -> Result<(), LedgerError> {
        self.holders
            .write()
            .remove(token)
            .map(|_| ())
            .ok_or(LedgerError::TokenNotFound(*token))
    }
}

// =============================================================================
// TESTS
// =============================================================================
