//! # Domain Layer (Inner Hexagon)
//!
//! Pure club and membership logic.
//! NO I/O, NO locking, NO ledger calls.

pub mod access;
pub mod eligibility;
pub mod entities;
pub mod invariants;
pub mod value_objects;

pub use access::*;
pub use eligibility::*;
pub use entities::*;
pub use invariants::*;
pub use value_objects::*;
