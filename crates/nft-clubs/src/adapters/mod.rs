//! # Adapters Layer (Outer Hexagon)
//!
//! Concrete implementations of the driven ports. The in-memory ones back the
//! test suite and single-process deployments.

pub mod clock;
pub mod distributor;
pub mod event_sink;
pub mod memory_ledger;
pub mod proof_verifier;

pub use clock::*;
pub use distributor::*;
pub use event_sink::*;
pub use memory_ledger::*;
pub use proof_verifier::*;
