//! # Event Schema
//!
//! Notifications published after an operation commits. Observers read them;
//! the service never consumes its own events.
//!
//! | Event | Published by |
//! |-------|--------------|
//! | `ClubCreated` | `claim_club` (one per minted identity) |
//! | `JoinRequested` | `request_join` |
//! | `JoinAccepted` | `accept_join` |
//! | `JoinRejected` | `reject_join` |
//! | `JoinCanceled` | `cancel_join` |
//! | `MemberLeft` | `leave_club` |
//! | `MerkleRootUpdated` | `set_merkle_root` |

use crate::domain::value_objects::{Address, ClubId, Credential, Hash, Timestamp};
use serde::{Deserialize, Serialize};

/// Topic an event is routed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Club lifecycle.
    Clubs,
    /// Join requests and memberships.
    Membership,
    /// Allowlist administration.
    Admin,
}

/// A committed state change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClubEvent {
    /// A club identity was minted and its record created.
    ClubCreated {
        club_id: ClubId,
        owner: Address,
        payment_receiver: Address,
    },
    /// A credential holder asked to join.
    JoinRequested {
        club_id: ClubId,
        credential: Credential,
        requester: Address,
    },
    /// The club owner accepted a request.
    JoinAccepted {
        club_id: ClubId,
        credential: Credential,
        joined_at: Timestamp,
    },
    /// The club owner rejected a request.
    JoinRejected {
        club_id: ClubId,
        credential: Credential,
    },
    /// The requester withdrew a request.
    JoinCanceled {
        club_id: ClubId,
        credential: Credential,
    },
    /// A member left the club.
    MemberLeft {
        club_id: ClubId,
        credential: Credential,
    },
    /// The allowlist root was replaced.
    MerkleRootUpdated { previous: Hash, current: Hash },
}

impl ClubEvent {
    /// Topic for routing.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::ClubCreated { .. } => EventTopic::Clubs,
            Self::MerkleRootUpdated { .. } => EventTopic::Admin,
            _ => EventTopic::Membership,
        }
    }

    /// Club the event concerns, if any.
    #[must_use]
    pub fn club_id(&self) -> Option<ClubId> {
        match self {
            Self::ClubCreated { club_id, .. }
            | Self::JoinRequested { club_id, .. }
            | Self::JoinAccepted { club_id, .. }
            | Self::JoinRejected { club_id, .. }
            | Self::JoinCanceled { club_id, .. }
            | Self::MemberLeft { club_id, .. } => Some(*club_id),
            Self::MerkleRootUpdated { .. } => None,
        }
    }

    /// JSON encoding for external observers.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if encoding fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

// =============================================================================
// TESTS
// =============================================================================
