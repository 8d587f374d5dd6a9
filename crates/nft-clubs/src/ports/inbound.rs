//! # Driving Ports (API - Inbound)
//!
//! The public surface of the club service. Every mutating call carries the
//! calling identity as its first argument; nothing in the arguments is
//! trusted as identity.

use crate::domain::entities::{ClubSnapshot, Member, MembershipState};
use crate::domain::value_objects::{Address, ClubId, Credential, Hash, MemberKey};
use crate::errors::ClubError;

/// Club membership API.
///
/// ## Usage
///
/// ```ignore
/// let clubs = api.claim_club(caller, 1, 3, &proof)?;
/// api.request_join(member, clubs[0], credential)?;
/// api.accept_join(caller, clubs[0], credential)?;
/// ```
pub trait ClubMembershipApi: Send + Sync {
    // -------------------------------------------------------------------------
    // Eligibility gate
    // -------------------------------------------------------------------------

    /// Mints `amount` club identities to `caller` after checking its quota
    /// and allowlist proof. Returns the new club ids in mint order.
    ///
    /// # Errors
    ///
    /// `ZeroAmount`, `QuotaExceeded`, `InvalidProof`, or a ledger/distributor
    /// failure.
    fn claim_club(
        &self,
        caller: Address,
        amount: u64,
        max_amount: u64,
        proof: &[Hash],
    ) -> Result<Vec<ClubId>, ClubError>;

    /// Replaces the allowlist root.
    ///
    /// # Errors
    ///
    /// `NotContractOwner` unless `caller` is the contract administrator.
    fn set_merkle_root(&self, caller: Address, root: Hash) -> Result<(), ClubError>;

    // -------------------------------------------------------------------------
    // Membership state machine
    // -------------------------------------------------------------------------

    /// Asks to join `club_id` with `credential`.
    ///
    /// # Errors
    ///
    /// `NoCredentialOwner`, `ClubNotFound`, `MemberUnavailable`,
    /// `RequestAlreadySent`.
    fn request_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError>;

    /// Accepts a pending request and takes custody of the credential.
    ///
    /// # Errors
    ///
    /// `ClubNotFound`, `NoClubOwner`, `NoJoinRequest`, `ClubFull`,
    /// `NoCredentialOwner`, `CustodyTransferFailed`, `ReentrantCall`.
    fn accept_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError>;

    /// Drops a pending request. Succeeds even if nothing is pending.
    ///
    /// # Errors
    ///
    /// `ClubNotFound`, `NoClubOwner`.
    fn reject_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError>;

    /// Withdraws the caller's own pending request.
    ///
    /// # Errors
    ///
    /// `NoCredentialOwner`, `ClubNotFound`, `NoJoinRequest`.
    fn cancel_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError>;

    /// Leaves a club once the residency period has elapsed.
    ///
    /// # Errors
    ///
    /// `NoCredentialOwner`, `ClubNotFound`, `NotMember`,
    /// `MinimumResidencyNotElapsed`.
    fn leave_club(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError>;

    // -------------------------------------------------------------------------
    // Rewards (no-op)
    // -------------------------------------------------------------------------

    /// Member-side reward claim. Does nothing.
    fn claim_member_rewards(&self, caller: Address, club_id: ClubId, credential: Credential);

    /// Owner-side reward claim. Does nothing.
    fn claim_owner_rewards(&self, caller: Address, club_id: ClubId);

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// True if the club identity currently has a holder.
    fn club_exists(&self, club_id: ClubId) -> bool;

    /// Snapshot of a club record.
    fn club(&self, club_id: ClubId) -> Option<ClubSnapshot>;

    /// Minimum residency in days.
    fn min_duration(&self, club_id: ClubId) -> Option<u64>;

    /// Administrator share, scaled by 100.
    fn owners_share(&self, club_id: ClubId) -> Option<u32>;

    /// Maximum concurrent members.
    fn max_capacity(&self, club_id: ClubId) -> Option<u32>;

    /// Revenue distribution target.
    fn payment_receiver(&self, club_id: ClubId) -> Option<Address>;

    /// Accepted members of a club, in acceptance order.
    fn members(&self, club_id: ClubId) -> Vec<MemberKey>;

    /// Pending join requests of a club.
    fn join_requests(&self, club_id: ClubId) -> Vec<MemberKey>;

    /// Global member record for a credential key.
    fn member(&self, key: &MemberKey) -> Option<Member>;

    /// Position of a credential in one club.
    fn membership_state(&self, club_id: ClubId, credential: &Credential) -> MembershipState;

    /// Identities minted so far by `account`.
    fn already_minted(&self, account: Address) -> u64;

    /// Current allowlist root.
    fn merkle_root(&self) -> Hash;

    /// Number of clubs ever created.
    fn total_clubs(&self) -> u64;
}
