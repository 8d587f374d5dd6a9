//! # NFT Clubs - Custodied Membership Subsystem
//!
//! Capacity-bounded, time-locked clubs whose admission tokens are externally
//! owned NFTs.
//!
//! ## Purpose
//!
//! A club is itself an NFT; whoever holds it administers the club. Holders of
//! NFTs from any collection ask to join, the administrator accepts or rejects,
//! and accepted credentials are held in custody until a minimum residency has
//! elapsed. New club identities are minted through an allowlist gate with a
//! per-address lifetime quota.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Members never exceed `max_capacity` | `service.rs` - `accept_join` / `check_capacity_invariant()` |
//! | A credential is never both pending and accepted in one club | `Club::admit()` / `check_disjoint_sets_invariant()` |
//! | Accepted members carry a join timestamp | `check_join_timestamp_invariant()` |
//! | `already_minted <= max_amount` for every claimant | `remaining_quota()` / `check_quota_invariant()` |
//! | One join lineage per credential, ever | `service.rs` - `request_join` (`MemberUnavailable`) |
//! | No state change on a failed call | check, then external calls, then commit |
//!
//! ## Access Control
//!
//! | Operation | Authorized Caller | Resolution |
//! |-----------|-------------------|------------|
//! | `claim_club` | Anyone on the allowlist | Merkle proof of `(caller, max_amount)` |
//! | `set_merkle_root` | Contract owner | `ClubServiceConfig::contract_owner` |
//! | `accept_join`, `reject_join` | Club administrator | Live `owner_of(club identity)` |
//! | `request_join`, `cancel_join` | Credential holder | Live `owner_of(credential)` |
//! | `leave_club` | Recorded requester | `Member::owner` |
//!
//! ## Outbound Dependencies
//!
//! | Port | Purpose |
//! |------|---------|
//! | `AssetLedger` | NFT ownership, custody transfers, identity mints and rollback burns |
//! | `DistributorFactory` | Per-club payment receivers |
//! | `ProofVerifier` | Allowlist membership proofs |
//! | `Clock` | Join timestamps and residency checks |
//! | `EventSink` | Committed state transitions |
//!
//! ## Usage Example
//!
//! ```ignore
//! use nft_clubs::prelude::*;
//!
//! let service = ClubService::new(config, ledger, distributors, clock, events)?;
//! let clubs = service.claim_club(founder, 1, 3, &proof)?;
//! service.request_join(holder, clubs[0], credential)?;
//! service.accept_join(founder, clubs[0], credential)?;
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

// =============================================================================
// MODULES
// =============================================================================

pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Domain entities
    pub use crate::domain::entities::{
        Club, ClubParameters, ClubSnapshot, Member, MemberSet, MembershipState,
    };

    // Value objects
    pub use crate::domain::value_objects::{
        keccak256, Address, ClubId, Credential, Hash, MemberKey, Timestamp, SECONDS_PER_DAY, U256,
    };

    // Eligibility
    pub use crate::domain::eligibility::{
        allowlist_leaf, remaining_quota, verify_proof, AllowlistTree, MerkleProof,
    };

    // Invariants
    pub use crate::domain::invariants::{
        check_club_invariants, InvariantCheckResult, InvariantViolation,
    };

    // Ports
    pub use crate::ports::inbound::ClubMembershipApi;
    pub use crate::ports::outbound::{
        AssetLedger, Clock, DistributorFactory, EventSink, ProofVerifier,
    };

    // Events
    pub use crate::events::{ClubEvent, EventTopic};

    // Errors
    pub use crate::errors::{ClubError, ConfigError, DistributorError, LedgerError};

    // Adapters
    pub use crate::adapters::{
        BroadcastEventSink, InMemoryAssetLedger, InMemoryDistributorFactory,
        KeccakProofVerifier, ManualClock, RecordingEventSink, SystemClock,
    };

    // Configuration & service
    pub use crate::config::{ClubDefaults, ClubServiceConfig};
    pub use crate::service::{ClubService, ClubServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Subsystem name.
pub const SUBSYSTEM_NAME: &str = "NFT Clubs";

// =============================================================================
// TESTS
// =============================================================================
