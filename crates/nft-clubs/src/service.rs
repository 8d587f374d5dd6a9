//! # Club Service
//!
//! The membership state machine wired to its driven ports.
//!
//! ## Execution Model
//!
//! Every mutating operation runs to completion or fails without committing
//! anything. Preconditions are checked first, external ledger calls run next,
//! and the in-memory state plus notifications are committed last. The state
//! lock is never held across an external call.
//!
//! ## Reentrancy
//!
//! Mutating operations enter an operation guard, one at a time; callers on
//! other threads wait their turn. External calls made while it is held
//! (custody transfers, identity mints) may call back into the service; any
//! mutating call arriving that way fails with `ReentrantCall`. The guard is
//! released by `Drop` on every exit path.

use crate::adapters::KeccakProofVerifier;
use crate::config::ClubServiceConfig;
use crate::domain::access::{is_administrator, is_credential_owner};
use crate::domain::eligibility::{allowlist_leaf, remaining_quota};
use crate::domain::entities::{Club, ClubParameters, ClubSnapshot, Member, MembershipState};
use crate::domain::invariants::{check_club_invariants, check_quota_invariant, InvariantCheckResult};
use crate::domain::value_objects::{Address, ClubId, Credential, Hash, MemberKey};
use crate::errors::{ClubError, ConfigError};
use crate::events::ClubEvent;
use crate::ports::inbound::ClubMembershipApi;
use crate::ports::outbound::{AssetLedger, Clock, DistributorFactory, EventSink, ProofVerifier};

use parking_lot::{Mutex, ReentrantMutex, ReentrantMutexGuard, RwLock};
use std::collections::HashMap;
use std::cell::Cell;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Counters for the club service.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ClubServiceStats {
    /// Club records created.
    pub clubs_created: u64,
    /// Join requests recorded.
    pub join_requests: u64,
    /// Requests accepted.
    pub joins_accepted: u64,
    /// Reject calls that went through.
    pub joins_rejected: u64,
    /// Requests withdrawn.
    pub joins_canceled: u64,
    /// Members that left.
    pub departures: u64,
    /// Calls that failed with an error.
    pub rejected_calls: u64,
}

/// Durable state owned by the service.
#[derive(Debug, Default)]
struct ClubState {
    clubs: HashMap<ClubId, Club>,
    members: HashMap<MemberKey, Member>,
    already_minted: HashMap<Address, u64>,
    merkle_root: Hash,
    total_clubs: u64,
}

/// Held for the duration of one mutating operation.
///
/// The mutex serializes operations across threads. It is reentrant so that a
/// callback on the same thread reaches the flag and is refused instead of
/// deadlocking.
struct OperationGuard<'a>(ReentrantMutexGuard<'a, Cell<bool>>);

impl<'a> OperationGuard<'a> {
    fn enter(lock: &'a ReentrantMutex<Cell<bool>>) -> Result<Self, ClubError> {
        let held = lock.lock();
        if held.replace(true) {
            return Err(ClubError::ReentrantCall);
        }
        Ok(Self(held))
    }
}

impl Drop for OperationGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// The club service.
///
/// Owns club records, the global member index, mint quotas and the allowlist
/// root. Ownership of club identities and credentials lives in the ledger and
/// is read live on every gated call.
pub struct ClubService<L, D, C, E>
where
    L: AssetLedger,
    D: DistributorFactory,
    C: Clock,
    E: EventSink,
{
    config: ClubServiceConfig,
    ledger: Arc<L>,
    distributors: Arc<D>,
    clock: Arc<C>,
    events: Arc<E>,
    verifier: Arc<dyn ProofVerifier>,
    state: RwLock<ClubState>,
    operation: ReentrantMutex<Cell<bool>>,
    stats: Mutex<ClubServiceStats>,
}

impl<L, D, C, E> ClubService<L, D, C, E>
where
    L: AssetLedger,
    D: DistributorFactory,
    C: Clock,
    E: EventSink,
{
    /// Create a new club service.
    ///
    /// # Errors
    ///
    /// Returns the `ConfigError` from `ClubServiceConfig::validate`.
    pub fn new(
        config: ClubServiceConfig,
        ledger: Arc<L>,
        distributors: Arc<D>,
        clock: Arc<C>,
        events: Arc<E>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let state = ClubState {
            merkle_root: config.initial_merkle_root,
            ..ClubState::default()
        };
        Ok(Self {
            config,
            ledger,
            distributors,
            clock,
            events,
            verifier: Arc::new(KeccakProofVerifier),
            state: RwLock::new(state),
            operation: ReentrantMutex::new(Cell::new(false)),
            stats: Mutex::new(ClubServiceStats::default()),
        })
    }

    /// Replace the allowlist proof verifier.
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn ProofVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    /// Service configuration.
    pub fn config(&self) -> &ClubServiceConfig {
        &self.config
    }

    /// Current counters.
    pub fn stats(&self) -> ClubServiceStats {
        self.stats.lock().clone()
    }

    /// The club identity token for `club_id`.
    pub fn club_identity(&self, club_id: ClubId) -> Credential {
        Credential::new(self.config.club_collection, club_id.token_id())
    }

    /// Checks every invariant of one club against the member index.
    pub fn audit_club(&self, club_id: ClubId) -> Option<InvariantCheckResult> {
        let state = self.state.read();
        state
            .clubs
            .get(&club_id)
            .map(|club| check_club_invariants(club, &state.members))
    }

    // -------------------------------------------------------------------------
    // Access control
    // -------------------------------------------------------------------------

    /// Resolves the live administrator and checks it is `caller`.
    fn authorize_administrator(&self, club_id: ClubId, caller: Address) -> Result<(), ClubError> {
        let holder = self.ledger.owner_of(&self.club_identity(club_id));
        if holder.is_none() {
            return Err(ClubError::ClubNotFound(club_id));
        }
        if !is_administrator(holder, caller) {
            return Err(ClubError::NoClubOwner { club_id, caller });
        }
        Ok(())
    }

    /// Checks that `caller` holds `credential` right now.
    fn authorize_credential_holder(
        &self,
        credential: &Credential,
        caller: Address,
    ) -> Result<(), ClubError> {
        if is_credential_owner(self.ledger.owner_of(credential), caller) {
            Ok(())
        } else {
            Err(ClubError::NoCredentialOwner {
                credential: *credential,
                caller,
            })
        }
    }

    fn ensure_club_exists(&self, club_id: ClubId) -> Result<(), ClubError> {
        if self.ledger.owner_of(&self.club_identity(club_id)).is_some() {
            Ok(())
        } else {
            Err(ClubError::ClubNotFound(club_id))
        }
    }

    // -------------------------------------------------------------------------
    // Outcome bookkeeping
    // -------------------------------------------------------------------------

    fn finish<T>(&self, operation: &'static str, result: Result<T, ClubError>) -> Result<T, ClubError> {
        if let Err(error) = &result {
            self.stats.lock().rejected_calls += 1;
            warn!(operation, %error, "Club operation rejected");
        }
        result
    }

    fn publish_all(&self, events: Vec<ClubEvent>) {
        for event in events {
            self.events.publish(event);
        }
    }

    // -------------------------------------------------------------------------
    // Eligibility gate & registry
    // -------------------------------------------------------------------------

    fn claim_club_inner(
        &self,
        caller: Address,
        amount: u64,
        max_amount: u64,
        proof: &[Hash],
    ) -> Result<Vec<ClubId>, ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        if amount == 0 {
            return Err(ClubError::ZeroAmount);
        }

        let (root, minted, first_id) = {
            let state = self.state.read();
            (
                state.merkle_root,
                state.already_minted.get(&caller).copied().unwrap_or(0),
                state.total_clubs + 1,
            )
        };

        // Quota before proof: an exhausted quota fails whatever the proof.
        let remaining = remaining_quota(max_amount, minted);
        if amount > remaining {
            return Err(ClubError::QuotaExceeded {
                requested: amount,
                remaining,
            });
        }

        let leaf = allowlist_leaf(caller, max_amount);
        if !self.verifier.verify(proof, &root, &leaf) {
            return Err(ClubError::InvalidProof);
        }

        let parameters = ClubParameters::from(self.config.defaults);

        // Distributors first: they leave nothing on the ledger if a later one fails.
        let mut created = Vec::new();
        for offset in 0..amount {
            let payment_receiver = self
                .distributors
                .create_distributor(&[caller], &[parameters.owners_share])?;
            created.push((ClubId(first_id + offset), payment_receiver));
        }

        for (minted_so_far, (club_id, _)) in created.iter().enumerate() {
            if let Err(error) = self.ledger.mint(&self.club_identity(*club_id), caller) {
                self.burn_identities(&created[..minted_so_far]);
                return Err(error.into());
            }
        }

        {
            let mut state = self.state.write();
            let total_minted = state.already_minted.entry(caller).or_insert(0);
            *total_minted += amount;
            debug_assert!(check_quota_invariant(*total_minted, max_amount));
            for (club_id, payment_receiver) in &created {
                state
                    .clubs
                    .insert(*club_id, Club::new(parameters, *payment_receiver));
            }
            state.total_clubs += amount;
        }
        self.stats.lock().clubs_created += amount;

        let events = created
            .iter()
            .map(|(club_id, payment_receiver)| ClubEvent::ClubCreated {
                club_id: *club_id,
                owner: caller,
                payment_receiver: *payment_receiver,
            })
            .collect();
        self.publish_all(events);

        info!(%caller, amount, first = first_id, "Clubs created");
        Ok(created.into_iter().map(|(club_id, _)| club_id).collect())
    }

    /// Rolls back identities minted earlier in a failed claim.
    fn burn_identities(&self, minted: &[(ClubId, Address)]) {
        for (club_id, _) in minted {
            if let Err(error) = self.ledger.burn(&self.club_identity(*club_id)) {
                warn!(%club_id, %error, "Failed to roll back club identity");
            }
        }
    }

    fn set_merkle_root_inner(&self, caller: Address, root: Hash) -> Result<(), ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        if caller != self.config.contract_owner {
            return Err(ClubError::NotContractOwner(caller));
        }

        let previous = std::mem::replace(&mut self.state.write().merkle_root, root);
        self.events.publish(ClubEvent::MerkleRootUpdated {
            previous,
            current: root,
        });

        info!(%previous, current = %root, "Allowlist root updated");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Membership state machine
    // -------------------------------------------------------------------------

    fn request_join_inner(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        self.authorize_credential_holder(&credential, caller)?;
        self.ensure_club_exists(club_id)?;

        let key = credential.key();
        {
            let mut guard = self.state.write();
            let state = &mut *guard;

            // One join lineage per credential, ever.
            if state.members.contains_key(&key) {
                return Err(ClubError::MemberUnavailable(credential));
            }
            let club = state
                .clubs
                .get_mut(&club_id)
                .ok_or(ClubError::ClubNotFound(club_id))?;
            if club.join_requests.contains(&key) {
                return Err(ClubError::RequestAlreadySent {
                    club_id,
                    credential,
                });
            }

            state
                .members
                .insert(key, Member::requested(credential, caller));
            club.join_requests.insert(key);
        }
        self.stats.lock().join_requests += 1;

        self.events.publish(ClubEvent::JoinRequested {
            club_id,
            credential,
            requester: caller,
        });
        info!(%club_id, %credential, requester = %caller, "Join requested");
        Ok(())
    }

    fn accept_join_inner(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        self.authorize_administrator(club_id, caller)?;

        let key = credential.key();
        let requester = {
            let state = self.state.read();
            let club = state
                .clubs
                .get(&club_id)
                .ok_or(ClubError::ClubNotFound(club_id))?;
            if !club.join_requests.contains(&key) {
                return Err(ClubError::NoJoinRequest {
                    club_id,
                    credential,
                });
            }
            if club.is_full() {
                return Err(ClubError::ClubFull {
                    club_id,
                    max_capacity: club.parameters.max_capacity,
                });
            }
            state
                .members
                .get(&key)
                .map(|member| member.owner)
                .ok_or(ClubError::NoJoinRequest {
                    club_id,
                    credential,
                })?
        };

        // The requester may have parted with the credential since asking.
        self.authorize_credential_holder(&credential, requester)?;

        // Hands control to the credential's collection; the guard stays held.
        self.ledger
            .transfer(&credential, requester, self.config.custody_account)
            .map_err(ClubError::CustodyTransferFailed)?;

        let joined_at = self.clock.now();
        {
            let mut guard = self.state.write();
            let state = &mut *guard;
            if let Some(member) = state.members.get_mut(&key) {
                member.join_timestamp = Some(joined_at);
            }
            if let Some(club) = state.clubs.get_mut(&club_id) {
                club.admit(key);
                debug_assert!(check_club_invariants(club, &state.members).is_valid());
            }
        }
        self.stats.lock().joins_accepted += 1;

        self.events.publish(ClubEvent::JoinAccepted {
            club_id,
            credential,
            joined_at,
        });
        info!(%club_id, %credential, joined_at, "Join accepted, credential in custody");
        Ok(())
    }

    fn reject_join_inner(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        self.authorize_administrator(club_id, caller)?;

        let removed = {
            let mut state = self.state.write();
            let club = state
                .clubs
                .get_mut(&club_id)
                .ok_or(ClubError::ClubNotFound(club_id))?;
            club.join_requests.remove(&credential.key())
        };
        self.stats.lock().joins_rejected += 1;

        self.events.publish(ClubEvent::JoinRejected {
            club_id,
            credential,
        });
        info!(%club_id, %credential, removed, "Join rejected");
        Ok(())
    }

    fn cancel_join_inner(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        self.authorize_credential_holder(&credential, caller)?;
        self.ensure_club_exists(club_id)?;

        {
            let mut state = self.state.write();
            let club = state
                .clubs
                .get_mut(&club_id)
                .ok_or(ClubError::ClubNotFound(club_id))?;
            if !club.join_requests.remove(&credential.key()) {
                return Err(ClubError::NoJoinRequest {
                    club_id,
                    credential,
                });
            }
        }
        self.stats.lock().joins_canceled += 1;

        self.events.publish(ClubEvent::JoinCanceled {
            club_id,
            credential,
        });
        info!(%club_id, %credential, "Join canceled");
        Ok(())
    }

    fn leave_club_inner(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let _guard = OperationGuard::enter(&self.operation)?;

        let key = credential.key();

        // The credential sits in custody, so the recorded requester is the
        // party entitled to leave.
        let member = self.state.read().members.get(&key).copied();
        let Some(member) = member.filter(|member| member.owner == caller) else {
            return Err(ClubError::NoCredentialOwner { credential, caller });
        };

        self.ensure_club_exists(club_id)?;

        let now = self.clock.now();
        {
            let mut state = self.state.write();
            let club = state
                .clubs
                .get_mut(&club_id)
                .ok_or(ClubError::ClubNotFound(club_id))?;
            if !club.members.contains(&key) {
                return Err(ClubError::NotMember {
                    club_id,
                    credential,
                });
            }
            let allowed_at = member
                .leave_allowed_at(&club.parameters)
                .ok_or(ClubError::NotMember {
                    club_id,
                    credential,
                })?;
            if now < allowed_at {
                return Err(ClubError::MinimumResidencyNotElapsed { allowed_at, now });
            }
            club.members.remove(&key);
        }
        self.stats.lock().departures += 1;

        self.events.publish(ClubEvent::MemberLeft {
            club_id,
            credential,
        });
        info!(%club_id, %credential, "Member left");
        Ok(())
    }
}

// =============================================================================
// ClubMembershipApi Implementation
// =============================================================================

impl<L, D, C, E> ClubMembershipApi for ClubService<L, D, C, E>
where
    L: AssetLedger,
    D: DistributorFactory,
    C: Clock,
    E: EventSink,
{
    #[instrument(skip(self, proof))]
    fn claim_club(
        &self,
        caller: Address,
        amount: u64,
        max_amount: u64,
        proof: &[Hash],
    ) -> Result<Vec<ClubId>, ClubError> {
        let result = self.claim_club_inner(caller, amount, max_amount, proof);
        self.finish("claim_club", result)
    }

    #[instrument(skip(self))]
    fn set_merkle_root(&self, caller: Address, root: Hash) -> Result<(), ClubError> {
        let result = self.set_merkle_root_inner(caller, root);
        self.finish("set_merkle_root", result)
    }

    #[instrument(skip(self))]
    fn request_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let result = self.request_join_inner(caller, club_id, credential);
        self.finish("request_join", result)
    }

    #[instrument(skip(self))]
    fn accept_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let result = self.accept_join_inner(caller, club_id, credential);
        self.finish("accept_join", result)
    }

    #[instrument(skip(self))]
    fn reject_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let result = self.reject_join_inner(caller, club_id, credential);
        self.finish("reject_join", result)
    }

    #[instrument(skip(self))]
    fn cancel_join(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let result = self.cancel_join_inner(caller, club_id, credential);
        self.finish("cancel_join", result)
    }

    #[instrument(skip(self))]
    fn leave_club(
        &self,
        caller: Address,
        club_id: ClubId,
        credential: Credential,
    ) -> Result<(), ClubError> {
        let result = self.leave_club_inner(caller, club_id, credential);
        self.finish("leave_club", result)
    }

    fn claim_member_rewards(&self, caller: Address, club_id: ClubId, credential: Credential) {
        debug!(%caller, %club_id, %credential, "Member reward claim (no rewards distributed)");
    }

    fn claim_owner_rewards(&self, caller: Address, club_id: ClubId) {
        debug!(%caller, %club_id, "Owner reward claim (no rewards distributed)");
    }

    fn club_exists(&self, club_id: ClubId) -> bool {
        self.ensure_club_exists(club_id).is_ok()
    }

    fn club(&self, club_id: ClubId) -> Option<ClubSnapshot> {
        self.state.read().clubs.get(&club_id).map(ClubSnapshot::from)
    }

    fn min_duration(&self, club_id: ClubId) -> Option<u64> {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map(|club| club.parameters.min_duration_days)
    }

    fn owners_share(&self, club_id: ClubId) -> Option<u32> {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map(|club| club.parameters.owners_share)
    }

    fn max_capacity(&self, club_id: ClubId) -> Option<u32> {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map(|club| club.parameters.max_capacity)
    }

    fn payment_receiver(&self, club_id: ClubId) -> Option<Address> {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map(|club| club.payment_receiver)
    }

    fn members(&self, club_id: ClubId) -> Vec<MemberKey> {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map(|club| club.members.as_slice().to_vec())
            .unwrap_or_default()
    }

    fn join_requests(&self, club_id: ClubId) -> Vec<MemberKey> {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map(|club| club.join_requests.as_slice().to_vec())
            .unwrap_or_default()
    }

    fn member(&self, key: &MemberKey) -> Option<Member> {
        self.state.read().members.get(key).copied()
    }

    fn membership_state(&self, club_id: ClubId, credential: &Credential) -> MembershipState {
        self.state
            .read()
            .clubs
            .get(&club_id)
            .map_or(MembershipState::None, |club| club.state_of(&credential.key()))
    }

    fn already_minted(&self, account: Address) -> u64 {
        self.state
            .read()
            .already_minted
            .get(&account)
            .copied()
            .unwrap_or(0)
    }

    fn merkle_root(&self) -> Hash {
        self.state.read().merkle_root
    }

    fn total_clubs(&self) -> u64 {
        self.state.read().total_clubs
    }
}

// =============================================================================
// TESTS
// =============================================================================
