//! # Value Objects
//!
//! Immutable domain primitives for club membership.
//! These types represent concepts that are defined by their value, not identity.

use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::fmt;

// Re-export U256 from primitive-types for 256-bit token ids
pub use primitive_types::U256;

/// Seconds in one residency day.
pub const SECONDS_PER_DAY: u64 = 86_400;

/// Unix time in seconds.
pub type Timestamp = u64;

// =============================================================================
// ADDRESS (20 bytes)
// =============================================================================

/// A 20-byte account or collection address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The zero address (0x0000...0000).
    pub const ZERO: Self = Self([0u8; 20]);

    /// Creates an address from a 20-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an address from a slice. Returns None if wrong length.
    #[must_use]
    pub fn from_slice(slice: &[u8]) -> Option<Self> {
        <[u8; 20]>::try_from(slice).ok().map(Self)
    }

    /// Parses a hex string, with or without a `0x` prefix.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).ok()?;
        Self::from_slice(&bytes)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns true if this is the zero address.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...{}", hex::encode(&self.0[..4]), hex::encode(&self.0[18..]))
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

// =============================================================================
// HASH (32 bytes)
// =============================================================================

/// A 32-byte Keccak-256 digest.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Hash(pub [u8; 32]);

impl Hash {
    /// The zero hash.
    pub const ZERO: Self = Self([0u8; 32]);

    /// Creates a hash from a 32-byte array.
    #[must_use]
    pub const fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parses a hex string, with or without a `0x` prefix.
    #[must_use]
    pub fn from_hex(s: &str) -> Option<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).ok()?;
        <[u8; 32]>::try_from(bytes.as_slice()).ok().map(Self)
    }

    /// Returns the underlying bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Returns true if this is the zero hash.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 32]
    }
}

impl fmt::Debug for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}...{}", hex::encode(&self.0[..4]), hex::encode(&self.0[28..]))
    }
}

impl From<[u8; 32]> for Hash {
    fn from(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }
}

/// Keccak-256 of the concatenation of `parts`.
#[must_use]
pub fn keccak256(parts: &[&[u8]]) -> Hash {
    let mut hasher = Keccak256::new();
    for part in parts {
        hasher.update(part);
    }
    Hash(hasher.finalize().into())
}

// =============================================================================
// CLUB ID
// =============================================================================

/// Identifier of a club, equal to the token id of the club identity NFT.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct ClubId(pub u64);

impl ClubId {
    /// Token id of the club identity inside the club collection.
    #[must_use]
    pub fn token_id(self) -> U256 {
        U256::from(self.0)
    }
}

impl fmt::Display for ClubId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "club#{}", self.0)
    }
}

// =============================================================================
// CREDENTIAL & MEMBER KEY
// =============================================================================

/// An externally issued NFT presented as a membership credential.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct Credential {
    /// Collection the token belongs to.
    pub collection: Address,
    /// Token id inside the collection.
    pub token_id: U256,
}

impl Credential {
    /// Creates a credential reference.
    #[must_use]
    pub const fn new(collection: Address, token_id: U256) -> Self {
        Self {
            collection,
            token_id,
        }
    }

    /// Deterministic key of this credential.
    #[must_use]
    pub fn key(&self) -> MemberKey {
        MemberKey::derive(self.collection, self.token_id)
    }
}

impl fmt::Display for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.collection, self.token_id)
    }
}

/// Key of a credential in both per-club sets and the global member index.
///
/// `keccak256(collection || token_id as 32 big-endian bytes)`
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberKey(pub Hash);

impl MemberKey {
    /// Derives the key for `(collection, token_id)`.
    #[must_use]
    pub fn derive(collection: Address, token_id: U256) -> Self {
        let mut id_bytes = [0u8; 32];
        token_id.to_big_endian(&mut id_bytes);
        Self(keccak256(&[collection.as_bytes(), &id_bytes]))
    }
}

impl fmt::Debug for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MemberKey({:?})", self.0)
    }
}

impl fmt::Display for MemberKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_address_hex_roundtrip() {
        let addr = Address::new([0xAB; 20]);
        let parsed = Address::from_hex(&format!("{addr:?}")).unwrap();
        assert_eq!(parsed, addr);
        assert!(Address::from_hex("0x1234").is_none());
        assert!(Address::from_hex("zz").is_none());
    }

    #[test]
    fn test_address_display_is_abbreviated() {
        let addr = Address::new([0x11; 20]);
        assert_eq!(addr.to_string(), "0x11111111...1111");
    }

    #[test]
    fn test_member_key_is_deterministic() {
        let collection = Address::new([7u8; 20]);
        let a = MemberKey::derive(collection, U256::from(42));
        let b = Credential::new(collection, U256::from(42)).key();
        assert_eq!(a, b);
    }

    #[test]
    fn test_member_key_distinguishes_collection_and_token() {
        let c1 = Address::new([1u8; 20]);
        let c2 = Address::new([2u8; 20]);
        let k = MemberKey::derive(c1, U256::from(1));
        assert_ne!(k, MemberKey::derive(c2, U256::from(1)));
        assert_ne!(k, MemberKey::derive(c1, U256::from(2)));
    }

    #[test]
    fn test_keccak_empty_input() {
        // keccak256("") is a well-known constant
        let expected =
            Hash::from_hex("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470")
                .unwrap();
        assert_eq!(keccak256(&[]), expected);
    }

    #[test]
    fn test_club_id_token_id() {
        assert_eq!(ClubId(9).token_id(), U256::from(9u64));
        assert_eq!(ClubId(3).to_string(), "club#3");
    }
}
