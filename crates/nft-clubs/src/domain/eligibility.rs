//! # Eligibility
//!
//! Allowlist leaves, Merkle path verification and mint quota arithmetic.
//!
//! ## Algorithm
//!
//! Leaves are `keccak256(caller || decimal(max_amount))`. Interior nodes hash
//! their two children in ascending byte order, so a proof is just the list of
//! sibling hashes from leaf to root with no left/right markers.

use crate::domain::value_objects::{keccak256, Address, Hash};

/// Sibling hashes from a leaf up to the root.
pub type MerkleProof = Vec<Hash>;

/// Leaf committed for `account` with a lifetime allowance of `max_amount`.
#[must_use]
pub fn allowlist_leaf(account: Address, max_amount: u64) -> Hash {
    let amount_text = max_amount.to_string();
    keccak256(&[account.as_bytes(), amount_text.as_bytes()])
}

/// Hash of two nodes in ascending order.
#[must_use]
pub fn hash_sorted_pair(a: &Hash, b: &Hash) -> Hash {
    if a <= b {
        keccak256(&[a.as_bytes(), b.as_bytes()])
    } else {
        keccak256(&[b.as_bytes(), a.as_bytes()])
    }
}

/// Recomputes the root from `leaf` and `proof`.
#[must_use]
pub fn process_proof(proof: &[Hash], leaf: Hash) -> Hash {
    proof
        .iter()
        .fold(leaf, |node, sibling| hash_sorted_pair(&node, sibling))
}

/// Returns true if `proof` links `leaf` to `root`.
#[must_use]
pub fn verify_proof(proof: &[Hash], root: &Hash, leaf: &Hash) -> bool {
    process_proof(proof, *leaf) == *root
}

/// How many more identities an account may mint.
///
/// Zero when the account already minted `max_amount` or more.
#[must_use]
pub fn remaining_quota(max_amount: u64, already_minted: u64) -> u64 {
    max_amount.saturating_sub(already_minted)
}

// =============================================================================
// ALLOWLIST TREE (offline tooling)
// =============================================================================

/// Builds allowlist roots and proofs.
///
/// Runs off-ledger: the service only ever stores a root and verifies proofs.
/// An odd node at the end of a level is promoted to the next level unchanged.
#[derive(Clone, Debug)]
pub struct AllowlistTree {
    /// Levels from leaves (index 0) to the root level.
    levels: Vec<Vec<Hash>>,
}

impl AllowlistTree {
    /// Builds a tree over `(account, max_amount)` entries.
    #[must_use]
    pub fn from_entries(entries: &[(Address, u64)]) -> Self {
        let leaves = entries
            .iter()
            .map(|(account, max_amount)| allowlist_leaf(*account, *max_amount))
            .collect();
        Self::from_leaves(leaves)
    }

    /// Builds a tree over precomputed leaves.
    #[must_use]
    pub fn from_leaves(leaves: Vec<Hash>) -> Self {
        let mut levels = vec![leaves];
        while levels.last().map_or(0, Vec::len) > 1 {
            let next = levels
                .last()
                .map(|level| {
                    level
                        .chunks(2)
                        .map(|pair| match pair {
                            [left, right] => hash_sorted_pair(left, right),
                            [single] => *single,
                            _ => Hash::ZERO,
                        })
                        .collect()
                })
                .unwrap_or_default();
            levels.push(next);
        }
        Self { levels }
    }

    /// Root of the tree. Zero for an empty tree.
    #[must_use]
    pub fn root(&self) -> Hash {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(Hash::ZERO)
    }

    /// Proof for the leaf at `index`, or `None` if out of range.
    #[must_use]
    pub fn proof(&self, index: usize) -> Option<MerkleProof> {
        let leaf_count = self.levels.first().map_or(0, Vec::len);
        if index >= leaf_count {
            return None;
        }

        let mut proof = Vec::new();
        let mut position = index;
        for level in &self.levels[..self.levels.len() - 1] {
            if let Some(sibling) = level.get(position ^ 1) {
                proof.push(*sibling);
            }
            position /= 2;
        }
        Some(proof)
    }
}

// =============================================================================
// TESTS
// =============================================================================
