//! # In-Memory Distributor Factory
//!
//! Registers payee/share tables and hands out deterministic addresses.
//! Splitting incoming funds is out of scope; the table is only recorded.

use crate::domain::entities::SHARE_SCALE;
use crate::domain::value_objects::{keccak256, Address};
use crate::errors::DistributorError;
use crate::ports::outbound::DistributorFactory;
use parking_lot::RwLock;

/// A registered distributor.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DistributorRecord {
    /// Distributor address.
    pub address: Address,
    /// Payees in registration order.
    pub payees: Vec<Address>,
    /// Share per payee, scaled by 100.
    pub shares: Vec<u32>,
}

/// In-memory distributor registry.
#[derive(Debug)]
pub struct InMemoryDistributorFactory {
    /// Address mixed into every derived distributor address.
    factory_address: Address,
    /// Registered distributors, in creation order.
    records: RwLock<Vec<DistributorRecord>>,
}

impl InMemoryDistributorFactory {
    /// Create a factory deploying from `factory_address`.
    #[must_use]
    pub fn new(factory_address: Address) -> Self {
        Self {
            factory_address,
            records: RwLock::new(Vec::new()),
        }
    }

    /// Look up a distributor by address.
    #[must_use]
    pub fn get(&self, address: Address) -> Option<DistributorRecord> {
        self.records
            .read()
            .iter()
            .find(|record| record.address == address)
            .cloned()
    }

    /// Number of distributors created.
    #[must_use]
    pub fn count(&self) -> usize {
        self.records.read().len()
    }

    /// Address = keccak256(factory || nonce)[12..32].
    fn derive_address(&self, nonce: u64) -> Address {
        let hash = keccak256(&[self.factory_address.as_bytes(), &nonce.to_be_bytes()]);
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&hash.as_bytes()[12..32]);
        Address::new(bytes)
    }
}

impl Default for InMemoryDistributorFactory {
    fn default() -> Self {
        Self::new(Address::ZERO)
    }
}

impl DistributorFactory for InMemoryDistributorFactory {
    fn create_distributor(
        &self,
        payees: &[Address],
        shares: &[u32],
    ) -> Result<Address, DistributorError> {
        if payees.is_empty() || payees.len() != shares.len() {
            return Err(DistributorError::LengthMismatch {
                payees: payees.len(),
                shares: shares.len(),
            });
        }
        if let Some((payee, _)) = payees.iter().zip(shares).find(|(_, share)| **share == 0) {
            return Err(DistributorError::ZeroShare(*payee));
        }
        let total: u64 = shares.iter().map(|share| u64::from(*share)).sum();
        if total > u64::from(SHARE_SCALE) {
            return Err(DistributorError::DeploymentFailed(format!(
                "shares sum to {total}, above {SHARE_SCALE}"
            )));
        }

        let mut records = self.records.write();
        let address = self.derive_address(records.len() as u64);
        records.push(DistributorRecord {
            address,
            payees: payees.to_vec(),
            shares: shares.to_vec(),
        });
        Ok(address)
    }
}

// =============================================================================
// TESTS
// =============================================================================
