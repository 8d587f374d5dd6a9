//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the club service.
//!
//! - **Driving Port (Inbound)**: `ClubMembershipApi`
//! - **Driven Ports (Outbound)**: `AssetLedger`, `DistributorFactory`,
//!   `ProofVerifier`, `Clock`, `EventSink`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
