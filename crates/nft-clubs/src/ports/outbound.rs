//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the club service depends on. External adapters implement them
//! to provide:
//! - Asset ownership and custody transfer
//! - Revenue distributor deployment
//! - Allowlist proof verification
//! - Current time
//! - Notification delivery
//!
//! All ports are synchronous: a club operation runs to completion inside one
//! ledger call and never suspends.

use crate::domain::value_objects::{Address, Credential, Hash, Timestamp};
use crate::errors::{DistributorError, LedgerError};
use crate::events::ClubEvent;

// =============================================================================
// ASSET LEDGER
// =============================================================================

/// Ownership ledger for club identities and external credentials.
///
/// ## Implementation Notes
///
/// `transfer` may hand control to code outside the service (collection
/// hooks). Such code may call back into the service; the service guards
/// against that itself.
pub trait AssetLedger: Send + Sync {
    /// Current holder of a token.
    ///
    /// # Returns
    ///
    /// * `Some(Address)` - The holder
    /// * `None` - The token was never minted or was burned
    fn owner_of(&self, token: &Credential) -> Option<Address>;

    /// Moves a token from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Fails if `from` is not the current holder or the ledger refuses.
    fn transfer(&self, token: &Credential, from: Address, to: Address) -> Result<(), LedgerError>;

    /// Mints a new token to `to`.
    ///
    /// # Errors
    ///
    /// Fails if the token already exists.
    fn mint(&self, token: &Credential, to: Address) -> Result<(), LedgerError>;

    /// Destroys a token.
    ///
    /// The service only burns club identities it minted earlier in the same
    /// call, to roll back a claim that failed part way.
    ///
    /// # Errors
    ///
    /// Fails if the token does not exist.
    fn burn(&self, token: &Credential) -> Result<(), LedgerError>;
}

// =============================================================================
// DISTRIBUTOR FACTORY
// =============================================================================

/// Deploys revenue distribution targets.
pub trait DistributorFactory: Send + Sync {
    /// Registers a distributor splitting incoming funds between `payees`
    /// according to `shares`.
    ///
    /// # Returns
    ///
    /// Address of the new distributor.
    ///
    /// # Errors
    ///
    /// Fails on mismatched inputs or a failed deployment.
    fn create_distributor(
        &self,
        payees: &[Address],
        shares: &[u32],
    ) -> Result<Address, DistributorError>;
}

// =============================================================================
// PROOF VERIFIER
// =============================================================================

/// Verifies allowlist membership proofs.
pub trait ProofVerifier: Send + Sync {
    /// Returns true if `proof` links `leaf` to `root`.
    fn verify(&self, proof: &[Hash], root: &Hash, leaf: &Hash) -> bool;
}

// =============================================================================
// CLOCK
// =============================================================================

/// Source of the current ledger time.
pub trait Clock: Send + Sync {
    /// Current unix time in seconds.
    fn now(&self) -> Timestamp;
}

// =============================================================================
// EVENT SINK
// =============================================================================

/// Receives committed notifications.
pub trait EventSink: Send + Sync {
    /// Delivers one event. Delivery failures are the sink's concern.
    fn publish(&self, event: ClubEvent);
}
