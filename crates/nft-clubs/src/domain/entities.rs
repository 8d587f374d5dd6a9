//! # Core Domain Entities
//!
//! Club records, member records and the per-credential membership state.

use crate::domain::value_objects::{Address, Credential, MemberKey, Timestamp, SECONDS_PER_DAY};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// =============================================================================
// CLUB PARAMETERS
// =============================================================================

/// Default maximum number of concurrent members.
pub const DEFAULT_MAX_CAPACITY: u32 = 30;

/// Default minimum residency, in days.
pub const DEFAULT_MIN_DURATION_DAYS: u64 = 30;

/// Default administrator share, percentage scaled by 100 (40.00%).
pub const DEFAULT_OWNERS_SHARE: u32 = 4_000;

/// Share scale: 10_000 == 100.00%.
pub const SHARE_SCALE: u32 = 10_000;

/// Parameters fixed when a club is created.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubParameters {
    /// Maximum concurrent accepted members.
    pub max_capacity: u32,
    /// Minimum residency in days before a member may leave.
    pub min_duration_days: u64,
    /// Administrator share of revenue, scaled by 100.
    pub owners_share: u32,
}

impl ClubParameters {
    /// Minimum residency in seconds.
    #[must_use]
    pub fn min_duration_secs(&self) -> u64 {
        self.min_duration_days.saturating_mul(SECONDS_PER_DAY)
    }
}

impl Default for ClubParameters {
    fn default() -> Self {
        Self {
            max_capacity: DEFAULT_MAX_CAPACITY,
            min_duration_days: DEFAULT_MIN_DURATION_DAYS,
            owners_share: DEFAULT_OWNERS_SHARE,
        }
    }
}

// =============================================================================
// MEMBER SET
// =============================================================================

/// Unique set of member keys with O(1) insert, remove and lookup.
///
/// Removal swaps the last element into the hole, so iteration order is not
/// stable across removals.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MemberSet {
    keys: Vec<MemberKey>,
    positions: HashMap<MemberKey, usize>,
}

impl MemberSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `key`. Returns false if it was already present.
    pub fn insert(&mut self, key: MemberKey) -> bool {
        if self.positions.contains_key(&key) {
            return false;
        }
        self.positions.insert(key, self.keys.len());
        self.keys.push(key);
        true
    }

    /// Removes `key`. Returns false if it was absent.
    pub fn remove(&mut self, key: &MemberKey) -> bool {
        let Some(index) = self.positions.remove(key) else {
            return false;
        };
        self.keys.swap_remove(index);
        if let Some(moved) = self.keys.get(index) {
            self.positions.insert(*moved, index);
        }
        true
    }

    /// Returns true if `key` is in the set.
    #[must_use]
    pub fn contains(&self, key: &MemberKey) -> bool {
        self.positions.contains_key(key)
    }

    /// Number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Returns true if the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Keys in the set.
    #[must_use]
    pub fn as_slice(&self) -> &[MemberKey] {
        &self.keys
    }
}

// =============================================================================
// CLUB
// =============================================================================

/// A club record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Club {
    /// Parameters fixed at creation.
    pub parameters: ClubParameters,
    /// Revenue distribution target registered for this club.
    pub payment_receiver: Address,
    /// Accepted credentials.
    pub members: MemberSet,
    /// Pending join requests.
    pub join_requests: MemberSet,
}

impl Club {
    /// Creates an empty club.
    #[must_use]
    pub fn new(parameters: ClubParameters, payment_receiver: Address) -> Self {
        Self {
            parameters,
            payment_receiver,
            members: MemberSet::new(),
            join_requests: MemberSet::new(),
        }
    }

    /// Returns true if no more members can be accepted.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.members.len() >= self.parameters.max_capacity as usize
    }

    /// Membership state of `key` within this club.
    #[must_use]
    pub fn state_of(&self, key: &MemberKey) -> MembershipState {
        if self.members.contains(key) {
            MembershipState::Member
        } else if self.join_requests.contains(key) {
            MembershipState::Requested
        } else {
            MembershipState::None
        }
    }

    /// Moves `key` from pending requests to members.
    ///
    /// Returns false and changes nothing if `key` was not pending.
    pub fn admit(&mut self, key: MemberKey) -> bool {
        if !self.join_requests.remove(&key) {
            return false;
        }
        self.members.insert(key);
        true
    }
}

/// Read-only snapshot of a club handed out by accessors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClubSnapshot {
    /// Parameters fixed at creation.
    pub parameters: ClubParameters,
    /// Revenue distribution target.
    pub payment_receiver: Address,
    /// Accepted credentials.
    pub members: Vec<MemberKey>,
    /// Pending join requests.
    pub join_requests: Vec<MemberKey>,
}

impl From<&Club> for ClubSnapshot {
    fn from(club: &Club) -> Self {
        Self {
            parameters: club.parameters,
            payment_receiver: club.payment_receiver,
            members: club.members.as_slice().to_vec(),
            join_requests: club.join_requests.as_slice().to_vec(),
        }
    }
}

// =============================================================================
// MEMBER
// =============================================================================

/// Global record of a credential that has been used to request membership.
///
/// Records are never deleted: a credential gets exactly one join lineage.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    /// The credential this record describes.
    pub credential: Credential,
    /// Account that sent the join request.
    pub owner: Address,
    /// Acceptance time; `None` while only requested.
    pub join_timestamp: Option<Timestamp>,
}

impl Member {
    /// Creates a freshly requested member record.
    #[must_use]
    pub const fn requested(credential: Credential, owner: Address) -> Self {
        Self {
            credential,
            owner,
            join_timestamp: None,
        }
    }

    /// Earliest time the member may leave, if accepted.
    #[must_use]
    pub fn leave_allowed_at(&self, params: &ClubParameters) -> Option<Timestamp> {
        self.join_timestamp
            .map(|joined| joined.saturating_add(params.min_duration_secs()))
    }
}

/// Position of a credential in one club's lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MembershipState {
    /// Neither pending nor accepted.
    None,
    /// Join request pending.
    Requested,
    /// Accepted member.
    Member,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::{MemberKey, U256};

    fn key(n: u64) -> MemberKey {
        MemberKey::derive(Address::new([9u8; 20]), U256::from(n))
    }

    #[test]
    fn test_default_parameters() {
        let p = ClubParameters::default();
        assert_eq!(p.max_capacity, 30);
        assert_eq!(p.min_duration_days, 30);
        assert_eq!(p.owners_share, 4000);
        assert_eq!(p.min_duration_secs(), 30 * 86_400);
    }

    #[test]
    fn test_member_set_uniqueness() {
        let mut set = MemberSet::new();
        assert!(set.insert(key(1)));
        assert!(!set.insert(key(1)));
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_member_set_remove_keeps_positions() {
        let mut set = MemberSet::new();
        for n in 1..=4 {
            set.insert(key(n));
        }
        assert!(set.remove(&key(2)));
        assert!(!set.remove(&key(2)));
        assert_eq!(set.len(), 3);
        for n in [1, 3, 4] {
            assert!(set.contains(&key(n)));
            assert!(set.remove(&key(n)));
        }
        assert!(set.is_empty());
    }

    #[test]
    fn test_admit_moves_between_sets() {
        let mut club = Club::new(ClubParameters::default(), Address::ZERO);
        club.join_requests.insert(key(1));
        assert_eq!(club.state_of(&key(1)), MembershipState::Requested);

        assert!(club.admit(key(1)));
        assert_eq!(club.state_of(&key(1)), MembershipState::Member);
        assert!(club.join_requests.is_empty());

        assert!(!club.admit(key(2)));
        assert_eq!(club.members.len(), 1);
    }

    #[test]
    fn test_is_full() {
        let params = ClubParameters {
            max_capacity: 1,
            ..ClubParameters::default()
        };
        let mut club = Club::new(params, Address::ZERO);
        assert!(!club.is_full());
        club.members.insert(key(1));
        assert!(club.is_full());
    }

    #[test]
    fn test_leave_allowed_at() {
        let credential = Credential::new(Address::ZERO, U256::one());
        let mut member = Member::requested(credential, Address::ZERO);
        let params = ClubParameters::default();
        assert_eq!(member.leave_allowed_at(&params), None);

        member.join_timestamp = Some(1_000);
        assert_eq!(member.leave_allowed_at(&params), Some(1_000 + 30 * 86_400));
    }
}
