//! # Domain Invariants
//!
//! Conditions that MUST hold for every committed club and quota record.
//!
//! | Invariant | Check |
//! |-----------|-------|
//! | Capacity bound | `check_capacity_invariant()` |
//! | Request/member disjointness | `check_disjoint_sets_invariant()` |
//! | Quota bound | `check_quota_invariant()` |
//! | Accepted members carry a join time | `check_join_timestamp_invariant()` |

use crate::domain::entities::{Club, Member};
use crate::domain::value_objects::MemberKey;
use std::collections::HashMap;

/// `members.len() <= max_capacity`.
#[must_use]
pub fn check_capacity_invariant(club: &Club) -> bool {
    club.members.len() <= club.parameters.max_capacity as usize
}

/// No key is both pending and accepted in the same club.
#[must_use]
pub fn check_disjoint_sets_invariant(club: &Club) -> bool {
    club.members
        .as_slice()
        .iter()
        .all(|key| !club.join_requests.contains(key))
}

/// An account never minted more than its proven allowance.
#[must_use]
pub fn check_quota_invariant(already_minted: u64, max_amount: u64) -> bool {
    already_minted <= max_amount
}

/// Every accepted key has a global record with a join time.
#[must_use]
pub fn check_join_timestamp_invariant(club: &Club, members: &HashMap<MemberKey, Member>) -> bool {
    club.members.as_slice().iter().all(|key| {
        members
            .get(key)
            .is_some_and(|member| member.join_timestamp.is_some())
    })
}

/// Checks every club invariant at once.
#[must_use]
pub fn check_club_invariants(
    club: &Club,
    members: &HashMap<MemberKey, Member>,
) -> InvariantCheckResult {
    let mut violations = Vec::new();

    if !check_capacity_invariant(club) {
        violations.push(InvariantViolation::CapacityExceeded {
            members: club.members.len(),
            max: club.parameters.max_capacity,
        });
    }

    if !check_disjoint_sets_invariant(club) {
        violations.push(InvariantViolation::PendingAndAccepted);
    }

    if !check_join_timestamp_invariant(club, members) {
        violations.push(InvariantViolation::MissingJoinTimestamp);
    }

    if violations.is_empty() {
        InvariantCheckResult::Valid
    } else {
        InvariantCheckResult::Invalid(violations)
    }
}

/// Result of checking all invariants.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantCheckResult {
    /// All invariants hold.
    Valid,
    /// One or more invariants violated.
    Invalid(Vec<InvariantViolation>),
}

impl InvariantCheckResult {
    /// Returns true if all invariants hold.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}

/// Specific invariant violation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InvariantViolation {
    /// More members than the club allows.
    CapacityExceeded { members: usize, max: u32 },
    /// A key sits in both sets.
    PendingAndAccepted,
    /// An accepted key has no join time.
    MissingJoinTimestamp,
}

impl std::fmt::Display for InvariantViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CapacityExceeded { members, max } => {
                write!(f, "capacity exceeded: {members} > {max}")
            }
            Self::PendingAndAccepted => write!(f, "credential both pending and accepted"),
            Self::MissingJoinTimestamp => write!(f, "accepted member without join time"),
        }
    }
}
