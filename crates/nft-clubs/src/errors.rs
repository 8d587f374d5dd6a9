//! # Error Types
//!
//! All error types for club membership operations.
//!
//! A failed operation reports exactly one `ClubError` and commits nothing.

use crate::domain::value_objects::{Address, ClubId, Credential, Timestamp};
use thiserror::Error;

// =============================================================================
// CLUB ERRORS
// =============================================================================

/// Errors returned by club operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClubError {
    /// The club identity has no current holder.
    #[error("club not found: {0}")]
    ClubNotFound(ClubId),

    /// Caller does not hold the club identity.
    #[error("caller {caller} is not the owner of {club_id}")]
    NoClubOwner { club_id: ClubId, caller: Address },

    /// Caller does not hold the referenced credential.
    #[error("caller {caller} does not own credential {credential}")]
    NoCredentialOwner {
        credential: Credential,
        caller: Address,
    },

    /// The credential already has a join lineage.
    #[error("credential {0} has already been used to request membership")]
    MemberUnavailable(Credential),

    /// A request for this credential is already pending in this club.
    #[error("join request already sent for {credential} in {club_id}")]
    RequestAlreadySent {
        club_id: ClubId,
        credential: Credential,
    },

    /// No pending request for this credential in this club.
    #[error("no join request for {credential} in {club_id}")]
    NoJoinRequest {
        club_id: ClubId,
        credential: Credential,
    },

    /// The credential is not an accepted member of this club.
    #[error("{credential} is not a member of {club_id}")]
    NotMember {
        club_id: ClubId,
        credential: Credential,
    },

    /// The club reached its capacity.
    #[error("{club_id} is full: {max_capacity} members")]
    ClubFull { club_id: ClubId, max_capacity: u32 },

    /// The member joined too recently to leave.
    #[error("minimum residency not elapsed: leave allowed at {allowed_at}, now {now}")]
    MinimumResidencyNotElapsed { allowed_at: Timestamp, now: Timestamp },

    /// The mint would exceed the caller's proven allowance.
    #[error("quota exceeded: requested {requested}, remaining {remaining}")]
    QuotaExceeded { requested: u64, remaining: u64 },

    /// The allowlist proof does not match the current root.
    #[error("invalid allowlist proof")]
    InvalidProof,

    /// A mint of zero identities was requested.
    #[error("amount must be at least one")]
    ZeroAmount,

    /// Caller is not the contract administrator.
    #[error("caller {0} is not the contract owner")]
    NotContractOwner(Address),

    /// A mutating call arrived while another one was still running.
    #[error("reentrant call rejected")]
    ReentrantCall,

    /// The ledger refused to move the credential into custody.
    #[error("custody transfer failed: {0}")]
    CustodyTransferFailed(LedgerError),

    /// Other ledger failure.
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    /// Revenue distributor could not be created.
    #[error("distributor error: {0}")]
    Distributor(#[from] DistributorError),
}

impl ClubError {
    /// Returns true if the caller may succeed by resubmitting later without
    /// changing the arguments.
    #[must_use]
    pub fn is_time_dependent(&self) -> bool {
        matches!(
            self,
            Self::MinimumResidencyNotElapsed { .. } | Self::ReentrantCall
        )
    }

    /// Returns true if this error is an authorization failure.
    #[must_use]
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            Self::NoClubOwner { .. } | Self::NoCredentialOwner { .. } | Self::NotContractOwner(_)
        )
    }
}

// =============================================================================
// LEDGER ERRORS
// =============================================================================

/// Errors from the external asset ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// `from` is not the current holder of the token.
    #[error("{from} does not hold {credential}")]
    NotHolder {
        credential: Credential,
        from: Address,
    },

    /// The token does not exist.
    #[error("token not found: {0}")]
    TokenNotFound(Credential),

    /// The token already exists (mint collision).
    #[error("token already minted: {0}")]
    AlreadyMinted(Credential),

    /// The ledger rejected the transfer for another reason.
    #[error("transfer refused: {0}")]
    Refused(String),
}

// =============================================================================
// DISTRIBUTOR ERRORS
// =============================================================================

/// Errors from the revenue distributor factory.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DistributorError {
    /// Payees and shares differ in length or are empty.
    #[error("payees/shares mismatch: {payees} payees, {shares} shares")]
    LengthMismatch { payees: usize, shares: usize },

    /// A share of zero was supplied.
    #[error("zero share for payee {0}")]
    ZeroShare(Address),

    /// Deployment failed.
    #[error("distributor deployment failed: {0}")]
    DeploymentFailed(String),
}

// =============================================================================
// CONFIG ERRORS
// =============================================================================

/// Errors while loading service configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// File I/O error.
    #[error("failed to read {path}: {error}")]
    Io { path: String, error: String },

    /// TOML parse error.
    #[error("parse error: {0}")]
    Parse(String),

    /// Malformed hex value.
    #[error("invalid hex for {field}: {value}")]
    InvalidHex { field: &'static str, value: String },

    /// Value out of range.
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

// =============================================================================
// TESTS
// =============================================================================
