//! # Brutal Security Tests for NFT Clubs
//!
//! These tests attempt to break the membership invariants.
//!
//! ## Test Categories
//!
//! 1. **Reentrancy Attacks** - callbacks from the ledger during custody and mints
//! 2. **Identity Spoofing** - acting on credentials or clubs the caller does not hold
//! 3. **Allowlist Attacks** - forged proofs, replayed proofs, quota overflow
//! 4. **Atomicity** - refused transfers and failed claims leave no trace

use nft_clubs::prelude::*;
use parking_lot::Mutex;
use std::sync::{Arc, OnceLock, Weak};

// =============================================================================
// TEST HELPERS
// =============================================================================

const START: Timestamp = 1_700_000_000;
const CREDENTIALS: Address = Address([0xCC; 20]);

fn account(n: u8) -> Address {
    Address::new([n; 20])
}

fn founder() -> Address {
    account(1)
}

fn credential(n: u64) -> Credential {
    Credential::new(CREDENTIALS, U256::from(n))
}

/// A hostile reentry performed from inside a ledger call.
#[derive(Clone, Copy)]
enum Reentry {
    RejectJoin { caller: Address, club: ClubId, credential: Credential },
    CancelJoin { caller: Address, club: ClubId, credential: Credential },
    ClaimClub { caller: Address, max_amount: u64 },
}

#[derive(Debug, PartialEq, Eq)]
struct Observation {
    result: Result<(), ClubError>,
    state_seen: Option<MembershipState>,
}

/// Ledger that calls back into the service before completing a transfer or
/// a mint, the way a hostile token contract would.
#[derive(Default)]
struct ReentrantLedger {
    inner: InMemoryAssetLedger,
    service: OnceLock<Weak<dyn ClubMembershipApi>>,
    on_transfer: Mutex<Option<Reentry>>,
    on_mint: Mutex<Option<Reentry>>,
    observed: Mutex<Vec<Observation>>,
}

impl ReentrantLedger {
    fn attack(&self, reentry: Reentry) {
        let Some(api) = self.service.get().and_then(Weak::upgrade) else {
            return;
        };
        let observation = match reentry {
            Reentry::RejectJoin {
                caller,
                club,
                credential,
            } => Observation {
                result: api.reject_join(caller, club, credential),
                state_seen: Some(api.membership_state(club, &credential)),
            },
            Reentry::CancelJoin {
                caller,
                club,
                credential,
            } => Observation {
                result: api.cancel_join(caller, club, credential),
                state_seen: Some(api.membership_state(club, &credential)),
            },
            Reentry::ClaimClub { caller, max_amount } => Observation {
                result: api.claim_club(caller, 1, max_amount, &[]).map(|_| ()),
                state_seen: None,
            },
        };
        self.observed.lock().push(observation);
    }
}

impl AssetLedger for ReentrantLedger {
    fn owner_of(&self, token: &Credential) -> Option<Address> {
        self.inner.owner_of(token)
    }

    fn transfer(&self, token: &Credential, from: Address, to: Address) -> Result<(), LedgerError> {
        let reentry = self.on_transfer.lock().take();
        if let Some(reentry) = reentry {
            self.attack(reentry);
        }
        self.inner.transfer(token, from, to)
    }

    fn mint(&self, token: &Credential, to: Address) -> Result<(), LedgerError> {
        let reentry = self.on_mint.lock().take();
        if let Some(reentry) = reentry {
            self.attack(reentry);
        }
        self.inner.mint(token, to)
    }

    fn burn(&self, token: &Credential) -> Result<(), LedgerError> {
        self.inner.burn(token)
    }
}

type HostileService =
    ClubService<ReentrantLedger, InMemoryDistributorFactory, ManualClock, RecordingEventSink>;

struct HostileWorld {
    service: Arc<HostileService>,
    ledger: Arc<ReentrantLedger>,
    allowlist: AllowlistTree,
}

fn hostile_world() -> HostileWorld {
    let allowlist = AllowlistTree::from_entries(&[(founder(), 3), (account(2), 1)]);
    let config = ClubServiceConfig {
        initial_merkle_root: allowlist.root(),
        ..ClubServiceConfig::default()
    };
    let ledger = Arc::new(ReentrantLedger::default());
    let service = Arc::new(ClubService::new(
        config,
        ledger.clone(),
        Arc::new(InMemoryDistributorFactory::default()),
        Arc::new(ManualClock::new(START)),
        Arc::new(RecordingEventSink::new()),
    )
    .unwrap());
    let api: Arc<dyn ClubMembershipApi> = service.clone();
    let _ = ledger.service.set(Arc::downgrade(&api));
    HostileWorld {
        service,
        ledger,
        allowlist,
    }
}

type Service =
    ClubService<InMemoryAssetLedger, InMemoryDistributorFactory, ManualClock, RecordingEventSink>;

struct World {
    service: Service,
    ledger: Arc<InMemoryAssetLedger>,
    events: Arc<RecordingEventSink>,
    allowlist: AllowlistTree,
}

fn world() -> World {
    let allowlist = AllowlistTree::from_entries(&[(founder(), 3), (account(2), 1)]);
    let config = ClubServiceConfig {
        contract_owner: account(0xAD),
        initial_merkle_root: allowlist.root(),
        ..ClubServiceConfig::default()
    };
    let ledger = Arc::new(InMemoryAssetLedger::new());
    let events = Arc::new(RecordingEventSink::new());
    let service = ClubService::new(
        config,
        ledger.clone(),
        Arc::new(InMemoryDistributorFactory::default()),
        Arc::new(ManualClock::new(START)),
        events.clone(),
    )
    .unwrap();
    World {
        service,
        ledger,
        events,
        allowlist,
    }
}

fn world_with_request() -> (World, ClubId) {
    let world = world();
    let proof = world.allowlist.proof(0).unwrap();
    let club = world.service.claim_club(founder(), 1, 3, &proof).unwrap()[0];
    world.ledger.set_holder(credential(1), account(10));
    world
        .service
        .request_join(account(10), club, credential(1))
        .unwrap();
    world.events.clear();
    (world, club)
}

// =============================================================================
// REENTRANCY ATTACKS
// =============================================================================

/// ATTACK: The credential's collection calls back during custody transfer
/// and rejects the very request being accepted.
#[test]
fn test_reentrant_reject_during_accept_is_refused() {
    let world = hostile_world();
    let proof = world.allowlist.proof(0).unwrap();
    let club = world.service.claim_club(founder(), 1, 3, &proof).unwrap()[0];
    world.ledger.inner.set_holder(credential(1), account(10));
    world
        .service
        .request_join(account(10), club, credential(1))
        .unwrap();

    *world.ledger.on_transfer.lock() = Some(Reentry::RejectJoin {
        caller: founder(),
        club,
        credential: credential(1),
    });
    world
        .service
        .accept_join(founder(), club, credential(1))
        .unwrap();

    assert_eq!(
        *world.ledger.observed.lock(),
        vec![Observation {
            result: Err(ClubError::ReentrantCall),
            state_seen: Some(MembershipState::Requested),
        }]
    );
    assert_eq!(
        world.service.membership_state(club, &credential(1)),
        MembershipState::Member
    );
    assert_eq!(world.service.audit_club(club), Some(InvariantCheckResult::Valid));
}

/// ATTACK: The requester's own collection cancels mid-transfer, trying to
/// end up both in custody and out of the request set.
#[test]
fn test_reentrant_cancel_during_accept_is_refused() {
    let world = hostile_world();
    let proof = world.allowlist.proof(0).unwrap();
    let club = world.service.claim_club(founder(), 1, 3, &proof).unwrap()[0];
    world.ledger.inner.set_holder(credential(1), account(10));
    world
        .service
        .request_join(account(10), club, credential(1))
        .unwrap();

    *world.ledger.on_transfer.lock() = Some(Reentry::CancelJoin {
        caller: account(10),
        club,
        credential: credential(1),
    });
    world
        .service
        .accept_join(founder(), club, credential(1))
        .unwrap();

    let observed = world.ledger.observed.lock();
    assert_eq!(observed.len(), 1);
    assert_eq!(observed[0].result, Err(ClubError::ReentrantCall));
    assert_eq!(world.service.members(club), vec![credential(1).key()]);
}

/// ATTACK: A mint callback claims again before the quota is committed.
#[test]
fn test_reentrant_claim_during_mint_is_refused() {
    let world = hostile_world();
    let proof = world.allowlist.proof(0).unwrap();

    *world.ledger.on_mint.lock() = Some(Reentry::ClaimClub {
        caller: founder(),
        max_amount: 3,
    });
    let clubs = world.service.claim_club(founder(), 3, 3, &proof).unwrap();

    assert_eq!(clubs.len(), 3);
    assert_eq!(
        world.ledger.observed.lock()[0].result,
        Err(ClubError::ReentrantCall)
    );
    assert_eq!(world.service.already_minted(founder()), 3);
    assert_eq!(world.service.total_clubs(), 3);
}

/// The guard is released after every call, failed or not.
#[test]
fn test_guard_released_after_reentry() {
    let world = hostile_world();
    let proof = world.allowlist.proof(0).unwrap();
    *world.ledger.on_mint.lock() = Some(Reentry::ClaimClub {
        caller: founder(),
        max_amount: 3,
    });
    let club = world.service.claim_club(founder(), 1, 3, &proof).unwrap()[0];

    world.ledger.inner.set_holder(credential(1), account(10));
    world
        .service
        .request_join(account(10), club, credential(1))
        .unwrap();
    assert_eq!(world.service.stats().rejected_calls, 1);
}

// =============================================================================
// IDENTITY SPOOFING
// =============================================================================

/// ATTACK: Request membership with someone else's credential.
#[test]
fn test_request_with_foreign_credential() {
    let world = world();
    let proof = world.allowlist.proof(0).unwrap();
    let club = world.service.claim_club(founder(), 1, 3, &proof).unwrap()[0];
    world.ledger.set_holder(credential(1), account(10));

    assert_eq!(
        world.service.request_join(account(66), club, credential(1)),
        Err(ClubError::NoCredentialOwner {
            credential: credential(1),
            caller: account(66)
        })
    );
    assert!(world.service.member(&credential(1).key()).is_none());
    assert!(world.service.join_requests(club).is_empty());

    // The rightful holder is not locked out by the failed attempt.
    world
        .service
        .request_join(account(10), club, credential(1))
        .unwrap();
}

/// ATTACK: Request with a credential that was never minted.
#[test]
fn test_request_with_unminted_credential() {
    let world = world();
    let proof = world.allowlist.proof(0).unwrap();
    let club = world.service.claim_club(founder(), 1, 3, &proof).unwrap()[0];

    assert!(matches!(
        world.service.request_join(account(66), club, credential(404)),
        Err(ClubError::NoCredentialOwner { .. })
    ));
}

/// ATTACK: A non-administrator accepts or rejects.
#[test]
fn test_non_administrator_cannot_decide() {
    let (world, club) = world_with_request();

    for attacker in [account(10), account(66), world.service.config().custody_account] {
        assert!(matches!(
            world.service.accept_join(attacker, club, credential(1)),
            Err(ClubError::NoClubOwner { .. })
        ));
        assert!(matches!(
            world.service.reject_join(attacker, club, credential(1)),
            Err(ClubError::NoClubOwner { .. })
        ));
    }
    assert_eq!(
        world.service.membership_state(club, &credential(1)),
        MembershipState::Requested
    );
    assert!(world.events.is_empty());
}

/// ATTACK: Administer a club whose identity was burned.
#[test]
fn test_burned_club_is_gone() {
    let (world, club) = world_with_request();
    world.ledger.burn(&world.service.club_identity(club)).unwrap();

    assert_eq!(
        world.service.accept_join(founder(), club, credential(1)),
        Err(ClubError::ClubNotFound(club))
    );
    assert_eq!(
        world.service.reject_join(founder(), club, credential(1)),
        Err(ClubError::ClubNotFound(club))
    );
}

/// ATTACK: Sell the credential after requesting, then have the stale
/// request accepted against the new holder.
#[test]
fn test_accept_after_credential_sold() {
    let (world, club) = world_with_request();
    world
        .ledger
        .transfer(&credential(1), account(10), account(77))
        .unwrap();

    assert_eq!(
        world.service.accept_join(founder(), club, credential(1)),
        Err(ClubError::NoCredentialOwner {
            credential: credential(1),
            caller: account(10)
        })
    );
    assert_eq!(world.ledger.owner_of(&credential(1)), Some(account(77)));
    assert!(world.service.members(club).is_empty());
}

/// ATTACK: Someone other than the requester walks the member out.
#[test]
fn test_only_requester_can_leave() {
    let (world, club) = world_with_request();
    world
        .service
        .accept_join(founder(), club, credential(1))
        .unwrap();

    for attacker in [founder(), account(66)] {
        assert!(matches!(
            world.service.leave_club(attacker, club, credential(1)),
            Err(ClubError::NoCredentialOwner { .. })
        ));
    }
    assert_eq!(world.service.members(club).len(), 1);
}

/// ATTACK: Leave a club the credential never joined.
#[test]
fn test_leave_other_club() {
    let world = world();
    let proof = world.allowlist.proof(0).unwrap();
    let clubs = world.service.claim_club(founder(), 2, 3, &proof).unwrap();
    world.ledger.set_holder(credential(1), account(10));
    world
        .service
        .request_join(account(10), clubs[0], credential(1))
        .unwrap();
    world
        .service
        .accept_join(founder(), clubs[0], credential(1))
        .unwrap();

    assert_eq!(
        world.service.leave_club(account(10), clubs[1], credential(1)),
        Err(ClubError::NotMember {
            club_id: clubs[1],
            credential: credential(1)
        })
    );
}

/// ATTACK: Replace the allowlist root without being the contract owner.
#[test]
fn test_root_takeover() {
    let world = world();
    let before = world.service.merkle_root();
    let forged = AllowlistTree::from_entries(&[(account(66), 1_000)]);

    for attacker in [account(66), founder(), Address::ZERO] {
        assert_eq!(
            world.service.set_merkle_root(attacker, forged.root()),
            Err(ClubError::NotContractOwner(attacker))
        );
    }
    assert_eq!(world.service.merkle_root(), before);
}

// =============================================================================
// ALLOWLIST ATTACKS
// =============================================================================

/// ATTACK: Replay another claimant's proof.
#[test]
fn test_replayed_proof() {
    let world = world();
    let proof = world.allowlist.proof(0).unwrap();

    assert_eq!(
        world.service.claim_club(account(66), 1, 3, &proof),
        Err(ClubError::InvalidProof)
    );
}

/// ATTACK: Tamper with one sibling of a valid proof.
#[test]
fn test_tampered_proof() {
    let world = world();
    let mut proof = world.allowlist.proof(0).unwrap();
    proof[0] = Hash::new([0xEE; 32]);

    assert_eq!(
        world.service.claim_club(founder(), 1, 3, &proof),
        Err(ClubError::InvalidProof)
    );
}

/// ATTACK: Present the root itself as a leaf with an empty proof.
#[test]
fn test_empty_proof_against_multi_leaf_root() {
    let world = world();
    assert_eq!(
        world.service.claim_club(founder(), 1, 3, &[]),
        Err(ClubError::InvalidProof)
    );
}

/// ATTACK: Ask for more than `u64::MAX` in total.
#[test]
fn test_quota_overflow() {
    let world = world();
    let proof = world.allowlist.proof(0).unwrap();
    world.service.claim_club(founder(), 1, 3, &proof).unwrap();

    assert!(matches!(
        world.service.claim_club(founder(), u64::MAX, 3, &proof),
        Err(ClubError::QuotaExceeded { remaining: 2, .. })
    ));
    assert_eq!(world.service.already_minted(founder()), 1);
}

// =============================================================================
// ATOMICITY
// =============================================================================

/// ATTACK: The credential's collection refuses the custody transfer.
#[test]
fn test_refused_transfer_changes_nothing() {
    let (world, club) = world_with_request();
    world.ledger.freeze_collection(CREDENTIALS);
    let before = world.service.club(club);

    assert!(matches!(
        world.service.accept_join(founder(), club, credential(1)),
        Err(ClubError::CustodyTransferFailed(LedgerError::Refused(_)))
    ));
    assert_eq!(world.service.club(club), before);
    assert_eq!(
        world.service.member(&credential(1).key()).unwrap().join_timestamp,
        None
    );
    assert_eq!(world.ledger.owner_of(&credential(1)), Some(account(10)));
    assert!(world.events.is_empty());
}

/// ATTACK: Burn the credential between request and acceptance.
#[test]
fn test_burned_credential_cannot_be_accepted() {
    let (world, club) = world_with_request();
    world.ledger.burn(&credential(1)).unwrap();

    assert!(matches!(
        world.service.accept_join(founder(), club, credential(1)),
        Err(ClubError::NoCredentialOwner { .. })
    ));
    assert_eq!(
        world.service.membership_state(club, &credential(1)),
        MembershipState::Requested
    );
}

/// Failed calls never publish.
#[test]
fn test_failures_are_silent() {
    let (world, club) = world_with_request();

    let _ = world.service.request_join(account(10), club, credential(1));
    let _ = world.service.cancel_join(account(66), club, credential(1));
    let _ = world.service.leave_club(account(10), club, credential(1));
    let _ = world.service.claim_club(account(66), 1, 1, &[]);

    assert!(world.events.is_empty());
    assert_eq!(world.service.stats().rejected_calls, 4);
}
