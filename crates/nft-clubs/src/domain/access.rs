//! # Access Control
//!
//! Both predicates take the *live* holder returned by the asset ledger at call
//! time. Nothing here caches a role.

use crate::domain::value_objects::Address;

/// Caller currently holds the club identity.
#[must_use]
pub fn is_administrator(current_holder: Option<Address>, caller: Address) -> bool {
    current_holder == Some(caller)
}

/// Caller currently holds the credential.
#[must_use]
pub fn is_credential_owner(current_holder: Option<Address>, caller: Address) -> bool {
    current_holder == Some(caller)
}
