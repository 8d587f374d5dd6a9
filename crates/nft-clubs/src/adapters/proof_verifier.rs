//! # Proof Verifier Adapter

use crate::domain::eligibility;
use crate::domain::value_objects::Hash;
use crate::ports::outbound::ProofVerifier;

/// Sorted-pair Keccak-256 Merkle verification.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeccakProofVerifier;

impl ProofVerifier for KeccakProofVerifier {
    fn verify(&self, proof: &[Hash], root: &Hash, leaf: &Hash) -> bool {
        eligibility::verify_proof(proof, root, leaf)
    }
}
